/// # Transport mode parsing
///
/// The columns contain the following:
///
/// - The transport mode code (0..4)
/// - The description (5..35)
///
/// ## Example (excerpt):
///
/// `
/// ...
/// IC  ,Intercity
/// SPR ,Sprinter
/// ...
/// `
///
/// File(s) read by the parser:
/// trnsmode.dat
use crate::{
    error::{IffError, IffResult},
    models::{IdentificationRecord, TransportMode},
    parsing::{
        delivery_parser::split_identification,
        error::PResult,
        helpers::{collect_unique, text_field, trailing_text_field},
    },
    source::IffSource,
    storage::ResourceStorage,
};

fn parse_line(line: &str) -> PResult<TransportMode> {
    Ok(TransportMode::new(
        text_field(line, 0..4)?,
        trailing_text_field(line, 5..35)?,
    ))
}

pub fn parse(
    source: &IffSource,
    file: &str,
) -> IffResult<(IdentificationRecord, ResourceStorage<TransportMode>)> {
    log::info!("Parsing {file}...");
    let lines = source.read_lines(file)?;
    let (delivery, rows) = split_identification(&lines, file)?;

    let transport_modes = rows
        .into_iter()
        .map(|(line_number, line)| {
            parse_line(line).map_err(|e| IffError::parsing(e, file, line, line_number))
        })
        .collect::<IffResult<Vec<_>>>()?;

    Ok((
        delivery,
        ResourceStorage::new(collect_unique(transport_modes, file)),
    ))
}
