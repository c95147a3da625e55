/// # Timezone parsing
///
/// Offsets, in hours, of the local time of a group of stations relative to
/// the time used in the timetable. A timezone is a header line followed by
/// its periods, each period having its own offset.
///
/// The file contains:
///
/// - The timezone number, after `#` (1..5)
/// - Its periods, after `-` for a negative offset or `+` for a positive one:
///     - The offset, in hours (1..3)
///     - The first day of the period, `DDMMYYYY` (4..12)
///     - The last day of the period, `DDMMYYYY` (13..21)
///
/// ## Example (excerpt):
///
/// `
/// ...
/// #0001
/// +01,09122017,24032018
/// +02,25032018,27102018
/// ...
/// `
///
/// File(s) read by the parser:
/// timezone.dat
use crate::{
    error::{IffError, IffResult},
    models::{IdentificationRecord, TimezonePeriod, TimezoneSchedule},
    parsing::{
        delivery_parser::split_identification,
        error::{PResult, ParsingError},
        helpers::{collect_unique, date_field, i32_field, record_identifier},
    },
    source::IffSource,
    storage::ResourceStorage,
};

enum TimezoneLine {
    Header { id: i32 },
    Period(TimezonePeriod),
}

fn period_from_line(line: &str, sign: i32) -> PResult<TimezoneLine> {
    Ok(TimezoneLine::Period(TimezonePeriod::new(
        sign * i32_field(line, 1..3)?,
        date_field(line, 4..12)?,
        date_field(line, 13..21)?,
    )))
}

fn parse_line(line: &str) -> PResult<TimezoneLine> {
    match record_identifier(line) {
        Some('#') => Ok(TimezoneLine::Header {
            id: i32_field(line, 1..5)?,
        }),
        Some('-') => period_from_line(line, -1),
        Some('+') => period_from_line(line, 1),
        Some(identifier) => Err(ParsingError::UnknownRecordType(identifier)),
        None => Err(ParsingError::ProtocolViolation("empty record")),
    }
}

#[derive(Default)]
struct TimezoneBuilder {
    open: Option<(i32, Vec<TimezonePeriod>)>,
    data: Vec<TimezoneSchedule>,
}

impl TimezoneBuilder {
    fn push(&mut self, line: &str) -> PResult<()> {
        match parse_line(line)? {
            TimezoneLine::Header { id } => {
                self.commit();
                self.open = Some((id, Vec::new()));
            }
            TimezoneLine::Period(period) => {
                let (_, periods) = self
                    .open
                    .as_mut()
                    .ok_or(ParsingError::ProtocolViolation("no timezone selected"))?;
                periods.push(period);
            }
        }

        Ok(())
    }

    fn commit(&mut self) {
        if let Some((id, periods)) = self.open.take() {
            self.data.push(TimezoneSchedule::new(id, periods));
        }
    }

    fn finish(mut self) -> Vec<TimezoneSchedule> {
        self.commit();
        self.data
    }
}

pub fn parse(
    source: &IffSource,
    file: &str,
) -> IffResult<(IdentificationRecord, ResourceStorage<TimezoneSchedule>)> {
    log::info!("Parsing {file}...");
    let lines = source.read_lines(file)?;
    let (delivery, rows) = split_identification(&lines, file)?;

    let mut builder = TimezoneBuilder::default();
    rows.into_iter().try_for_each(|(line_number, line)| {
        builder
            .push(line)
            .map_err(|e| IffError::parsing(e, file, line, line_number))
    })?;
    let timezones = builder.finish();

    Ok((delivery, ResourceStorage::new(collect_unique(timezones, file))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::tests::date, parsing::tests::get_json_value};
    use pretty_assertions::assert_eq;

    fn build(lines: &[&str]) -> PResult<Vec<TimezoneSchedule>> {
        let mut builder = TimezoneBuilder::default();
        for line in lines {
            builder.push(line)?;
        }
        Ok(builder.finish())
    }

    #[test]
    fn periods_are_signed() {
        let timezones = build(&[
            "#0001",
            "+01,09122017,24032018",
            "-02,25032018,27102018",
            "#0002",
        ])
        .unwrap();
        assert_eq!(timezones.len(), 2);

        let reference = r#"
            {
                "id": 1,
                "periods": [
                    {
                        "offset_hours": 1,
                        "first_day": "2017-12-09",
                        "last_day": "2018-03-24"
                    },
                    {
                        "offset_hours": -2,
                        "first_day": "2018-03-25",
                        "last_day": "2018-10-27"
                    }
                ]
            }"#;
        let (timezone, reference) = get_json_value(&timezones[0], reference).unwrap();
        assert_eq!(timezone, reference);

        assert_eq!(timezones[0].offset_on(date(1, 6, 2018)), Some(-2));
        assert!(timezones[1].periods().is_empty());
    }

    #[test]
    fn unknown_record_type() {
        match build(&["#0001", "*01,09122017,24032018"]) {
            Err(ParsingError::UnknownRecordType('*')) => {}
            other => panic!("Expected UnknownRecordType but got {other:?}"),
        }
    }

    #[test]
    fn period_without_header() {
        match build(&["+01,09122017,24032018"]) {
            Err(ParsingError::ProtocolViolation(_)) => {}
            other => panic!("Expected ProtocolViolation but got {other:?}"),
        }
    }
}
