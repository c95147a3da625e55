// Here we will define all the fixed-field helper functions.
// Every IFF record is positional: a field is a half-open range of character
// columns, never a separator-delimited token.
use std::ops::Range;

use chrono::NaiveDate;
use nom::{
    IResult, Parser,
    bytes::complete::{take, take_while_m_n},
    combinator::map_res,
    sequence::preceded,
};
use rustc_hash::FxHashMap;

use crate::{
    models::{Model, TimeOfDay},
    parsing::error::{ExpectedType, PResult, ParsingError},
};

fn column_parser<'a>(
    columns: &Range<usize>,
) -> impl Parser<&'a str, Output = &'a str, Error = nom::error::Error<&'a str>> + use<'a> {
    preceded(take(columns.start), take(columns.len()))
}

fn trailing_column_parser<'a>(
    columns: &Range<usize>,
) -> impl Parser<&'a str, Output = &'a str, Error = nom::error::Error<&'a str>> + use<'a> {
    preceded(
        take(columns.start),
        take_while_m_n(0, columns.len(), |_| true),
    )
}

fn raw_field<'a>(
    line: &'a str,
    columns: &Range<usize>,
    expected: ExpectedType,
) -> PResult<&'a str> {
    column_parser(columns)
        .parse(line)
        .map(|(_, value)| value)
        .map_err(|_| ParsingError::malformed(columns.clone(), expected, line))
}

pub(crate) fn text_field(line: &str, columns: Range<usize>) -> PResult<String> {
    Ok(raw_field(line, &columns, ExpectedType::Text)?.trim().to_string())
}

/// Like [`text_field`], but the line may stop before the end of the range.
/// Used for the free text (names, descriptions) closing a record, whose
/// padding is often stripped by producers.
pub(crate) fn trailing_text_field(line: &str, columns: Range<usize>) -> PResult<String> {
    trailing_column_parser(&columns)
        .parse(line)
        .map(|(_, value)| value.trim().to_string())
        .map_err(|_| ParsingError::malformed(columns, ExpectedType::Text, line))
}

pub(crate) fn i32_field(line: &str, columns: Range<usize>) -> PResult<i32> {
    let value = raw_field(line, &columns, ExpectedType::Integer)?;
    value
        .trim()
        .parse::<i32>()
        .map_err(|_| ParsingError::malformed(columns, ExpectedType::Integer, value))
}

/// `DDMMYYYY`
pub(crate) fn date_field(line: &str, columns: Range<usize>) -> PResult<NaiveDate> {
    let value = raw_field(line, &columns, ExpectedType::Date)?;
    NaiveDate::parse_from_str(value.trim(), "%d%m%Y")
        .map_err(|_| ParsingError::malformed(columns, ExpectedType::Date, value))
}

fn hhmm_parser(input: &str) -> IResult<&str, (u32, u32)> {
    (
        map_res(take(2usize), |hours: &str| hours.trim().parse::<u32>()),
        map_res(take(2usize), |minutes: &str| minutes.parse::<u32>()),
    )
        .parse(input)
}

/// `HHMM`, the hours are not limited to 0-23 (a service continuing after
/// midnight keeps counting: 2530 is 25:30).
pub(crate) fn time_field(line: &str, columns: Range<usize>) -> PResult<TimeOfDay> {
    let value = raw_field(line, &columns, ExpectedType::Time)?;
    match hhmm_parser(value) {
        Ok(("", (hours, minutes))) if minutes < 60 => Ok(TimeOfDay::new(hours, minutes)),
        _ => Err(ParsingError::malformed(columns, ExpectedType::Time, value)),
    }
}

/// `1` is true, `0` or a blank is false.
pub(crate) fn flag_field(line: &str, columns: Range<usize>) -> PResult<bool> {
    let value = raw_field(line, &columns, ExpectedType::Flag)?;
    match value.trim() {
        "1" => Ok(true),
        "0" | "" => Ok(false),
        _ => Err(ParsingError::malformed(columns, ExpectedType::Flag, value)),
    }
}

pub(crate) fn record_identifier(line: &str) -> Option<char> {
    line.chars().next()
}

/// Numbers the lines from 1 and drops the blank ones.
pub(crate) fn numbered_rows(lines: &[String]) -> impl Iterator<Item = (usize, &str)> {
    lines
        .iter()
        .enumerate()
        .map(|(index, line)| (index + 1, line.as_str()))
        .filter(|(_, line)| !line.trim().is_empty())
}

/// Keys every row by its id. A duplicated id replaces the previous row.
pub(crate) fn collect_unique<M: Model<M>>(rows: Vec<M>, file: &str) -> FxHashMap<M::K, M> {
    let mut data = FxHashMap::default();
    for row in rows {
        let id = row.id();
        if data.insert(id.clone(), row).is_some() {
            log::warn!("{file}: id {id} is defined more than once, the last definition is kept");
        }
    }
    data
}
