/// # Footnote parsing
///
/// Day-specific definition of the validity of the services. A footnote is a
/// header line followed by a bit pattern, one character per day of the
/// delivery: `1` the service runs that day, anything else it does not.
/// The first character is the first day of the delivery.
///
/// The file contains:
///
/// - The footnote number, after `#` (1..6)
/// - The bit pattern, on the following line(s)
///
/// ## Example (excerpt):
///
/// `
/// ...
/// #00001
/// 1100110011
/// #00002
/// 0011001100
/// ...
/// `
///
/// File(s) read by the parser:
/// footnote.dat
use chrono::NaiveDate;

use crate::{
    error::{IffError, IffResult},
    models::{Calendar, IdentificationRecord},
    parsing::{
        delivery_parser::split_identification,
        error::{PResult, ParsingError},
        helpers::{collect_unique, i32_field, record_identifier},
    },
    source::IffSource,
    storage::ResourceStorage,
};

/// Accumulates the bit lines of the open footnote until the next header.
struct FootnoteBuilder {
    first_day: NaiveDate,
    last_day: NaiveDate,
    open: Option<(i32, Vec<bool>)>,
    data: Vec<Calendar>,
}

impl FootnoteBuilder {
    fn new(delivery: &IdentificationRecord) -> Self {
        Self {
            first_day: delivery.first_day(),
            last_day: delivery.last_day(),
            open: None,
            data: Vec::new(),
        }
    }

    fn push(&mut self, line: &str) -> PResult<()> {
        match record_identifier(line) {
            Some('#') => {
                let id = i32_field(line, 1..6)?;
                self.commit();
                self.open = Some((id, Vec::new()));
            }
            _ => {
                let (_, bits) = self
                    .open
                    .as_mut()
                    .ok_or(ParsingError::ProtocolViolation("no footnote selected"))?;
                bits.extend(line.trim_end().chars().map(|c| c == '1'));
            }
        }

        Ok(())
    }

    fn commit(&mut self) {
        if let Some((id, bits)) = self.open.take() {
            self.data
                .push(Calendar::new(id, self.first_day, self.last_day, bits));
        }
    }

    fn finish(mut self) -> Vec<Calendar> {
        self.commit();
        self.data
    }
}

pub fn parse(
    source: &IffSource,
    file: &str,
) -> IffResult<(IdentificationRecord, ResourceStorage<Calendar>)> {
    log::info!("Parsing {file}...");
    let lines = source.read_lines(file)?;
    let (delivery, rows) = split_identification(&lines, file)?;

    let mut builder = FootnoteBuilder::new(&delivery);
    rows.into_iter().try_for_each(|(line_number, line)| {
        builder
            .push(line)
            .map_err(|e| IffError::parsing(e, file, line, line_number))
    })?;
    let footnotes = builder.finish();

    Ok((delivery, ResourceStorage::new(collect_unique(footnotes, file))))
}
