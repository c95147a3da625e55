/// # Company parsing
///
/// List of the transport companies running the services of the delivery.
///
/// The columns contain the following:
///
/// - The company number (0..3)
/// - The company code (4..14)
/// - The company name (15..45)
/// - The time at which the operating day of the company changes, `HHMM` (46..50)
///
/// ## Example (excerpt):
///
/// `
/// ...
/// 100,ns        ,NS                            ,0400
/// 200,db        ,Deutsche Bahn AG              ,0400
/// ...
/// `
///
/// File(s) read by the parser:
/// company.dat
use crate::{
    error::{IffError, IffResult},
    models::{Company, IdentificationRecord},
    parsing::{
        delivery_parser::split_identification,
        error::PResult,
        helpers::{collect_unique, i32_field, text_field, time_field},
    },
    source::IffSource,
    storage::ResourceStorage,
};

fn parse_line(line: &str) -> PResult<Company> {
    Ok(Company::new(
        i32_field(line, 0..3)?,
        text_field(line, 4..14)?,
        text_field(line, 15..45)?,
        time_field(line, 46..50)?,
    ))
}

pub fn parse(
    source: &IffSource,
    file: &str,
) -> IffResult<(IdentificationRecord, ResourceStorage<Company>)> {
    log::info!("Parsing {file}...");
    let lines = source.read_lines(file)?;
    let (delivery, rows) = split_identification(&lines, file)?;

    let companies = rows
        .into_iter()
        .map(|(line_number, line)| {
            parse_line(line).map_err(|e| IffError::parsing(e, file, line, line_number))
        })
        .collect::<IffResult<Vec<_>>>()?;

    Ok((delivery, ResourceStorage::new(collect_unique(companies, file))))
}
