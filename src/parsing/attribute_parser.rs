/// # Attribute parsing
///
/// List of codes describing additional offers (e.g.: bicycles allowed) or
/// restrictions (e.g.: no boarding) of a service.
///
/// The columns contain the following:
///
/// - The attribute code (0..4)
/// - The processing code (5..9)
/// - The description (10..40)
///
/// ## Example (excerpt):
///
/// `
/// ...
/// NIIN,0000,Niet instappen
/// NIUI,0000,Niet uitstappen
/// ...
/// `
///
/// File(s) read by the parser:
/// trnsattr.dat
use crate::{
    error::{IffError, IffResult},
    models::{Attribute, IdentificationRecord},
    parsing::{
        delivery_parser::split_identification,
        error::PResult,
        helpers::{collect_unique, i32_field, text_field, trailing_text_field},
    },
    source::IffSource,
    storage::ResourceStorage,
};

fn parse_line(line: &str) -> PResult<Attribute> {
    Ok(Attribute::new(
        text_field(line, 0..4)?,
        i32_field(line, 5..9)?,
        trailing_text_field(line, 10..40)?,
    ))
}

pub fn parse(
    source: &IffSource,
    file: &str,
) -> IffResult<(IdentificationRecord, ResourceStorage<Attribute>)> {
    log::info!("Parsing {file}...");
    let lines = source.read_lines(file)?;
    let (delivery, rows) = split_identification(&lines, file)?;

    let attributes = rows
        .into_iter()
        .map(|(line_number, line)| {
            parse_line(line).map_err(|e| IffError::parsing(e, file, line, line_number))
        })
        .collect::<IffResult<Vec<_>>>()?;

    Ok((delivery, ResourceStorage::new(collect_unique(attributes, file))))
}
