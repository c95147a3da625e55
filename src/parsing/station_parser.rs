/// # Station parsing
///
/// List of the stations served (or passed) by the services of the delivery.
///
/// The columns contain the following:
///
/// - Whether trains can be changed: `0` no, `1` yes, `2` virtual station (0..1)
/// - The station code (2..9)
/// - The minimum change time, in minutes (10..12)
/// - The maximum change time, in minutes (13..15)
/// - The country code (16..20)
/// - The timezone number (21..25)
/// - An attribute code (26..28)
/// - The x coordinate (29..35)
/// - The y coordinate (36..42)
/// - The station name (43..73)
///
/// ## Example (excerpt):
///
/// `
/// ...
/// 1,rtd    ,03,05,NL  ,0000,  ,092050,437150,Rotterdam Centraal
/// 1,ut     ,03,05,NL  ,0000,  ,136240,455840,Utrecht Centraal
/// ...
/// `
///
/// File(s) read by the parser:
/// stations.dat
use std::str::FromStr;

use crate::{
    error::{IffError, IffResult},
    models::{Country, IdentificationRecord, Station, TimezoneSchedule, TrainChanges},
    parsing::{
        delivery_parser::split_identification,
        error::{ExpectedType, PResult, ParsingError},
        helpers::{collect_unique, i32_field, text_field, trailing_text_field},
    },
    source::IffSource,
    storage::ResourceStorage,
};

fn parse_line(
    line: &str,
    countries: &ResourceStorage<Country>,
    timezones: &ResourceStorage<TimezoneSchedule>,
) -> PResult<Station> {
    let train_changes = text_field(line, 0..1)?;
    let train_changes = TrainChanges::from_str(&train_changes)
        .map_err(|_| ParsingError::malformed(0..1, ExpectedType::Integer, &train_changes))?;
    let code = text_field(line, 2..9)?;

    let country_code = text_field(line, 16..20)?;
    let country = countries.find(country_code.as_str()).cloned();
    if country.is_none() {
        log::warn!("Station {code}: unknown country {country_code}");
    }

    let timezone_id = i32_field(line, 21..25)?;
    let timezone = timezones.find(&timezone_id).cloned();
    if timezone.is_none() {
        log::warn!("Station {code}: unknown timezone {timezone_id}");
    }

    Ok(Station::new(
        code,
        train_changes,
        i32_field(line, 10..12)?,
        i32_field(line, 13..15)?,
        country,
        timezone,
        text_field(line, 26..28)?,
        i32_field(line, 29..35)?,
        i32_field(line, 36..42)?,
        trailing_text_field(line, 43..73)?,
    ))
}

pub fn parse(
    source: &IffSource,
    file: &str,
    countries: &ResourceStorage<Country>,
    timezones: &ResourceStorage<TimezoneSchedule>,
) -> IffResult<(IdentificationRecord, ResourceStorage<Station>)> {
    log::info!("Parsing {file}...");
    let lines = source.read_lines(file)?;
    let (delivery, rows) = split_identification(&lines, file)?;

    let stations = rows
        .into_iter()
        .map(|(line_number, line)| {
            parse_line(line, countries, timezones)
                .map_err(|e| IffError::parsing(e, file, line, line_number))
        })
        .collect::<IffResult<Vec<_>>>()?;

    Ok((delivery, ResourceStorage::new(collect_unique(stations, file))))
}
