/// # Country parsing
///
/// The columns contain the following:
///
/// - The country code (0..4)
/// - `1` if the country is the home country of the delivery, `0` otherwise (5..6)
/// - The country name (7..37)
///
/// ## Example (excerpt):
///
/// `
/// ...
/// D   ,0,Duitsland
/// NL  ,1,Nederland
/// ...
/// `
///
/// File(s) read by the parser:
/// country.dat
use crate::{
    error::{IffError, IffResult},
    models::{Country, IdentificationRecord},
    parsing::{
        delivery_parser::split_identification,
        error::PResult,
        helpers::{collect_unique, flag_field, text_field, trailing_text_field},
    },
    source::IffSource,
    storage::ResourceStorage,
};

fn parse_line(line: &str) -> PResult<Country> {
    Ok(Country::new(
        text_field(line, 0..4)?,
        flag_field(line, 5..6)?,
        trailing_text_field(line, 7..37)?,
    ))
}

pub fn parse(
    source: &IffSource,
    file: &str,
) -> IffResult<(IdentificationRecord, ResourceStorage<Country>)> {
    log::info!("Parsing {file}...");
    let lines = source.read_lines(file)?;
    let (delivery, rows) = split_identification(&lines, file)?;

    let countries = rows
        .into_iter()
        .map(|(line_number, line)| {
            parse_line(line).map_err(|e| IffError::parsing(e, file, line, line_number))
        })
        .collect::<IffResult<Vec<_>>>()?;

    Ok((delivery, ResourceStorage::new(collect_unique(countries, file))))
}
