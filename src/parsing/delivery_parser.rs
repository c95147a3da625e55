/// # Identification record parsing
///
/// Every file of a delivery starts with the same identification record. The
/// delivery file contains nothing else.
///
/// The columns contain the following:
///
/// - `@`
/// - The company number (1..4)
/// - The first day of validity of the delivery, `DDMMYYYY` (5..13)
/// - The last day of validity of the delivery, `DDMMYYYY` (14..22)
/// - The version number (23..27)
/// - A free description (28..58)
///
/// ## Example:
///
/// `
/// @100,09122017,08122018,0038,Dienstregeling 2018
/// `
///
/// File(s) read by the parser:
/// delivery.dat
use crate::{
    error::{IffError, IffResult},
    models::IdentificationRecord,
    parsing::{
        error::{PResult, ParsingError},
        helpers::{
            date_field, i32_field, numbered_rows, record_identifier, trailing_text_field,
        },
    },
    source::IffSource,
};

fn parse_identification(line: &str) -> PResult<IdentificationRecord> {
    if record_identifier(line) != Some('@') {
        return Err(ParsingError::MissingIdentificationRecord);
    }

    Ok(IdentificationRecord::new(
        i32_field(line, 1..4)?,
        date_field(line, 5..13)?,
        date_field(line, 14..22)?,
        i32_field(line, 23..27)?,
        trailing_text_field(line, 28..58)?,
    ))
}

/// Decodes the identification record opening `lines` and hands back the
/// numbered rows following it.
pub(crate) fn split_identification<'a>(
    lines: &'a [String],
    file: &str,
) -> IffResult<(IdentificationRecord, Vec<(usize, &'a str)>)> {
    let mut rows = numbered_rows(lines);
    let (line_number, line) = rows.next().ok_or_else(|| {
        IffError::parsing(ParsingError::MissingIdentificationRecord, file, "", 1)
    })?;
    let delivery =
        parse_identification(line).map_err(|e| IffError::parsing(e, file, line, line_number))?;

    Ok((delivery, rows.collect()))
}

pub fn parse(source: &IffSource, file: &str) -> IffResult<IdentificationRecord> {
    log::info!("Parsing {file}...");
    let lines = source.read_lines(file)?;
    let (delivery, rows) = split_identification(&lines, file)?;

    if !rows.is_empty() {
        log::warn!("{file}: {} line(s) after the identification record ignored", rows.len());
    }

    Ok(delivery)
}
