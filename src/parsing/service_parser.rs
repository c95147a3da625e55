/// # Service parser
///
/// List of the services of the delivery and by far the largest file of it.
///
/// A service definition starts with a `#` line and describes a sequence of
/// stops shared by one or more numbered trains (the variants, one `%` line
/// each). A variant only runs over a part of the stops, given by the indexes
/// of its first and last stop. Pass-through stops are not counted.
///
/// This file contains:
///
/// - `#` the service definition header
/// - `%` the variants
/// - `-` the footnote (validity) of the service
/// - `&` the transport mode of the service
/// - `*` the attributes of the service
/// - `>` `.` `;` `+` `<` the stops
/// - `?` the platforms of the stop on the previous line
///
/// ## Example (excerpt):
///
/// `
/// #00000001
/// %100,02735,      ,001,004,
/// -00001,000,999
/// &IC  ,001,004
/// >rtd    ,1200
/// ?1    ,1    ,00001
/// .sdm    ,1210
/// ;dt
/// +gv     ,1225,1227
/// ?5    ,5    ,00001
/// <ledn   ,1245
/// `
///
/// File(s) read by the parser:
/// timetbls.dat
use std::sync::Arc;

use crate::{
    error::{IffError, IffResult},
    models::{
        Attribute, Calendar, Company, IdentificationRecord, Service, Station, StopEvent,
        TimeOfDay, TransportMode,
    },
    parsing::{
        delivery_parser::split_identification,
        error::{PResult, ParsingError},
        helpers::{
            i32_field, record_identifier, text_field, time_field, trailing_text_field,
        },
    },
    source::IffSource,
    storage::ResourceStorage,
    timetable::ServiceList,
};

#[derive(Debug)]
enum ServiceLine {
    Header {
        id: i32,
    },
    Definition(DefinitionLine),
    Stop(StopLine),
    Platform {
        arrival_platform: String,
        departure_platform: String,
        #[allow(unused)]
        footnote: String,
    },
}

#[derive(Debug)]
enum DefinitionLine {
    Number {
        company: i32,
        number: i32,
        variant: String,
        first_stop: i32,
        last_stop: i32,
        name: String,
    },
    Footnote {
        footnote: i32,
        #[allow(unused)]
        first_stop: i32,
        #[allow(unused)]
        last_stop: i32,
    },
    TransportMode {
        code: String,
        #[allow(unused)]
        first_stop: i32,
        #[allow(unused)]
        last_stop: i32,
    },
    Attribute {
        code: String,
        #[allow(unused)]
        first_stop: i32,
        #[allow(unused)]
        last_stop: i32,
    },
}

#[derive(Debug)]
enum StopLine {
    Start {
        station: String,
        departure: TimeOfDay,
    },
    Continuation {
        station: String,
        time: TimeOfDay,
    },
    PassThrough {
        station: String,
    },
    Interval {
        station: String,
        arrival: TimeOfDay,
        departure: TimeOfDay,
    },
    Final {
        station: String,
        arrival: TimeOfDay,
    },
}

/// ## #-lines
///
/// - The service definition number (1..9)
///
/// ### Example:
///
/// `
/// #00000001
/// `
fn row_header(line: &str) -> PResult<ServiceLine> {
    Ok(ServiceLine::Header {
        id: i32_field(line, 1..9)?,
    })
}

/// ## %-lines
///
/// - The company number (1..4)
/// - The train number (5..10)
/// - The variant (11..17), mostly blank
/// - The index of the first stop of the train (18..21)
/// - The index of the last stop of the train (22..25)
/// - The name of the train (26..56), mostly blank
///
/// ### Example:
///
/// `
/// %100,02735,      ,001,004,                              % Company 100, train 2735 from the 1st to the 4th stop
/// `
fn row_number(line: &str) -> PResult<ServiceLine> {
    Ok(ServiceLine::Definition(DefinitionLine::Number {
        company: i32_field(line, 1..4)?,
        number: i32_field(line, 5..10)?,
        variant: text_field(line, 11..17)?,
        first_stop: i32_field(line, 18..21)?,
        last_stop: i32_field(line, 22..25)?,
        name: trailing_text_field(line, 26..56)?,
    }))
}

/// ## --lines
///
/// `
/// -00001,000,999 % Footnote 1, for the whole service
/// `
fn row_footnote(line: &str) -> PResult<ServiceLine> {
    Ok(ServiceLine::Definition(DefinitionLine::Footnote {
        footnote: i32_field(line, 1..6)?,
        first_stop: i32_field(line, 7..10)?,
        last_stop: i32_field(line, 11..14)?,
    }))
}

/// ## &-lines
///
/// `
/// &IC  ,001,004 % Intercity from the 1st to the 4th stop
/// `
fn row_transport_mode(line: &str) -> PResult<ServiceLine> {
    Ok(ServiceLine::Definition(DefinitionLine::TransportMode {
        code: text_field(line, 1..5)?,
        first_stop: i32_field(line, 6..9)?,
        last_stop: i32_field(line, 10..13)?,
    }))
}

/// ## *-lines
///
/// `
/// *NIIN,001,004 % No boarding from the 1st to the 4th stop
/// `
fn row_attribute(line: &str) -> PResult<ServiceLine> {
    Ok(ServiceLine::Definition(DefinitionLine::Attribute {
        code: text_field(line, 1..5)?,
        first_stop: i32_field(line, 6..9)?,
        last_stop: i32_field(line, 10..13)?,
    }))
}

/// ## Stop lines
///
/// - The station code (1..8)
/// - Then, depending on the kind of stop:
///     - `>` first stop: the departure time (9..13)
///     - `.` short stop: a single time, both arrival and departure (9..13)
///     - `;` pass-through: nothing
///     - `+` stop: the arrival (9..13) and the departure (14..18) times
///     - `<` last stop: the arrival time (9..13)
///
/// ### Example:
///
/// `
/// >rtd    ,1200
/// .sdm    ,1210
/// ;dt
/// +gv     ,1225,1227
/// <ledn   ,1245
/// `
fn row_stop(identifier: char, line: &str) -> PResult<ServiceLine> {
    let stop = match identifier {
        '>' => StopLine::Start {
            station: text_field(line, 1..8)?,
            departure: time_field(line, 9..13)?,
        },
        '.' => StopLine::Continuation {
            station: text_field(line, 1..8)?,
            time: time_field(line, 9..13)?,
        },
        // Nothing follows the station code, its padding is often stripped.
        ';' => StopLine::PassThrough {
            station: trailing_text_field(line, 1..8)?,
        },
        '+' => StopLine::Interval {
            station: text_field(line, 1..8)?,
            arrival: time_field(line, 9..13)?,
            departure: time_field(line, 14..18)?,
        },
        '<' => StopLine::Final {
            station: text_field(line, 1..8)?,
            arrival: time_field(line, 9..13)?,
        },
        _ => return Err(ParsingError::UnknownRecordType(identifier)),
    };
    Ok(ServiceLine::Stop(stop))
}

/// ## ?-lines
///
/// - The arrival platform (1..6)
/// - The departure platform (7..12)
/// - The footnote during which the platforms apply (13..18)
///
/// ### Example:
///
/// `
/// ?1    ,1    ,00001
/// `
fn row_platform(line: &str) -> PResult<ServiceLine> {
    Ok(ServiceLine::Platform {
        arrival_platform: text_field(line, 1..6)?,
        departure_platform: text_field(line, 7..12)?,
        footnote: trailing_text_field(line, 13..18)?,
    })
}

fn parse_line(line: &str) -> PResult<ServiceLine> {
    match record_identifier(line) {
        Some('#') => row_header(line),
        Some('%') => row_number(line),
        Some('-') => row_footnote(line),
        Some('&') => row_transport_mode(line),
        Some('*') => row_attribute(line),
        Some(identifier @ ('>' | '.' | ';' | '+' | '<')) => row_stop(identifier, line),
        Some('?') => row_platform(line),
        Some(identifier) => Err(ParsingError::UnknownRecordType(identifier)),
        None => Err(ParsingError::ProtocolViolation("empty record")),
    }
}

// ------------------------------------------------------------------------------------------------
// --- References
// ------------------------------------------------------------------------------------------------

/// The registries the services refer to.
pub struct ServiceReferences<'a> {
    pub companies: &'a ResourceStorage<Company>,
    pub footnotes: &'a ResourceStorage<Calendar>,
    pub transport_modes: &'a ResourceStorage<TransportMode>,
    pub attributes: &'a ResourceStorage<Attribute>,
    pub stations: &'a ResourceStorage<Station>,
}

impl ServiceReferences<'_> {
    fn station(&self, code: &str) -> PResult<Arc<Station>> {
        self.stations
            .find(code)
            .cloned()
            .ok_or_else(|| ParsingError::ReferenceNotFound {
                kind: "station",
                id: code.to_string(),
            })
    }

    fn company(&self, id: i32) -> Option<Arc<Company>> {
        let company = self.companies.find(&id).cloned();
        if company.is_none() {
            log::warn!("Unknown company {id}");
        }
        company
    }

    fn footnote(&self, id: i32) -> Option<Arc<Calendar>> {
        let footnote = self.footnotes.find(&id).cloned();
        if footnote.is_none() {
            log::warn!("Unknown footnote {id}");
        }
        footnote
    }

    fn transport_mode(&self, code: &str) -> Option<Arc<TransportMode>> {
        let transport_mode = self.transport_modes.find(code).cloned();
        if transport_mode.is_none() {
            log::warn!("Unknown transport mode {code}");
        }
        transport_mode
    }

    fn attribute(&self, code: &str) -> Option<Arc<Attribute>> {
        let attribute = self.attributes.find(code).cloned();
        if attribute.is_none() {
            log::warn!("Unknown attribute {code}, skipped");
        }
        attribute
    }
}

// ------------------------------------------------------------------------------------------------
// --- ServiceDefinition
// ------------------------------------------------------------------------------------------------

#[derive(Debug)]
struct VariantDescriptor {
    company: Option<Arc<Company>>,
    number: i32,
    variant: String,
    name: String,
    first_stop: i32,
    last_stop: i32,
}

/// A service definition being read: the stops shared by its variants.
#[derive(Debug)]
struct ServiceDefinition {
    id: i32,
    variants: Vec<VariantDescriptor>,
    footnote: Option<Arc<Calendar>>,
    transport_mode: Option<Arc<TransportMode>>,
    attributes: Vec<Arc<Attribute>>,
    stops: Vec<StopEvent>,
}

impl ServiceDefinition {
    fn new(id: i32) -> Self {
        Self {
            id,
            variants: Vec::new(),
            footnote: None,
            transport_mode: None,
            attributes: Vec::new(),
            stops: Vec::new(),
        }
    }

    // The footnote, transport mode and attributes are applied to the whole
    // definition, whatever their stop range.
    fn apply(&mut self, line: DefinitionLine, references: &ServiceReferences) {
        match line {
            DefinitionLine::Number {
                company,
                number,
                variant,
                first_stop,
                last_stop,
                name,
            } => self.variants.push(VariantDescriptor {
                company: references.company(company),
                number,
                variant,
                name,
                first_stop,
                last_stop,
            }),
            DefinitionLine::Footnote { footnote, .. } => {
                self.footnote = references.footnote(footnote);
            }
            DefinitionLine::TransportMode { code, .. } => {
                self.transport_mode = references.transport_mode(&code);
            }
            DefinitionLine::Attribute { code, .. } => {
                self.attributes.extend(references.attribute(&code));
            }
        }
    }

    /// The stops of a variant, copied. Pass-through stops share the index of
    /// the stop before them, the ones after the last stop are left out.
    fn stops_of(&self, variant: &VariantDescriptor) -> Vec<StopEvent> {
        let mut index = 0;
        let mut stops: Vec<StopEvent> = self
            .stops
            .iter()
            .filter(|stop| {
                if !stop.is_passing() {
                    index += 1;
                }
                (variant.first_stop..=variant.last_stop).contains(&index)
            })
            .cloned()
            .collect();

        while stops.last().is_some_and(StopEvent::is_passing) {
            stops.pop();
        }
        stops
    }

    /// Cuts one service per variant.
    fn commit(self) -> PResult<Vec<Service>> {
        let services = self
            .variants
            .iter()
            .map(|variant| {
                let stops = self.stops_of(variant);
                if stops.len() < 2 {
                    return Err(ParsingError::ProtocolViolation(
                        "a variant must cover at least two stops",
                    ));
                }

                Service::new(
                    self.id,
                    variant.number,
                    variant.company.clone(),
                    variant.variant.clone(),
                    variant.name.clone(),
                    self.footnote.clone(),
                    self.transport_mode.clone(),
                    self.attributes.clone(),
                    stops,
                )
                .map_err(ParsingError::from)
            })
            .collect::<PResult<Vec<_>>>()?;

        log::debug!(
            "Service definition {}: {} service(s) committed",
            self.id,
            services.len()
        );
        Ok(services)
    }
}

// ------------------------------------------------------------------------------------------------
// --- AssemblerState
// ------------------------------------------------------------------------------------------------

/// A stop stays open for one line, so that a `?` line can set its platforms.
#[derive(Debug)]
enum AssemblerState {
    Idle,
    OpenService(ServiceDefinition),
    OpenStop(ServiceDefinition, StopEvent),
}

impl AssemblerState {
    /// Hands back the open definition, the open stop included.
    fn close(self) -> Option<ServiceDefinition> {
        match self {
            Self::Idle => None,
            Self::OpenService(definition) => Some(definition),
            Self::OpenStop(mut definition, stop) => {
                definition.stops.push(stop);
                Some(definition)
            }
        }
    }

    /// Returns the next state, and the definition closed by a new header.
    fn advance(
        self,
        record: ServiceLine,
        references: &ServiceReferences,
    ) -> PResult<(Self, Option<ServiceDefinition>)> {
        const NO_SERVICE: ParsingError = ParsingError::ProtocolViolation("no service selected");

        match record {
            ServiceLine::Header { id } => {
                Ok((Self::OpenService(ServiceDefinition::new(id)), self.close()))
            }
            ServiceLine::Definition(line) => {
                let mut definition = self.close().ok_or(NO_SERVICE)?;
                definition.apply(line, references);
                Ok((Self::OpenService(definition), None))
            }
            ServiceLine::Stop(line) => {
                let definition = self.close().ok_or(NO_SERVICE)?;
                let stop = stop_event(line, references)?;
                Ok((Self::OpenStop(definition, stop), None))
            }
            ServiceLine::Platform {
                arrival_platform,
                departure_platform,
                ..
            } => match self {
                Self::OpenStop(mut definition, mut stop) => {
                    if stop.is_passing() {
                        return Err(ParsingError::ProtocolViolation(
                            "no platform for a pass-through stop",
                        ));
                    }
                    stop.set_platforms(non_empty(arrival_platform), non_empty(departure_platform));
                    definition.stops.push(stop);
                    Ok((Self::OpenService(definition), None))
                }
                Self::OpenService(_) => Err(ParsingError::ProtocolViolation("no stop selected")),
                Self::Idle => Err(NO_SERVICE),
            },
        }
    }
}

fn stop_event(line: StopLine, references: &ServiceReferences) -> PResult<StopEvent> {
    let stop = match line {
        StopLine::Start { station, departure } => {
            StopEvent::new(references.station(&station)?, None, Some(departure))
        }
        StopLine::Continuation { station, time } => {
            StopEvent::new(references.station(&station)?, Some(time), Some(time))
        }
        StopLine::PassThrough { station } => StopEvent::passing(references.station(&station)?),
        StopLine::Interval {
            station,
            arrival,
            departure,
        } => StopEvent::new(references.station(&station)?, Some(arrival), Some(departure)),
        StopLine::Final { station, arrival } => {
            StopEvent::new(references.station(&station)?, Some(arrival), None)
        }
    };
    Ok(stop)
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

fn assemble<'a>(
    rows: impl IntoIterator<Item = (usize, &'a str)>,
    references: &ServiceReferences,
) -> Result<Vec<Service>, (ParsingError, usize, &'a str)> {
    let mut state = AssemblerState::Idle;
    let mut services = Vec::new();
    let mut last_row = (0, "");

    for (line_number, line) in rows {
        let error = |e| (e, line_number, line);
        let record = parse_line(line).map_err(error)?;
        let (next, committed) = state.advance(record, references).map_err(error)?;
        state = next;
        if let Some(definition) = committed {
            services.extend(definition.commit().map_err(error)?);
        }
        last_row = (line_number, line);
    }

    if let Some(definition) = state.close() {
        let (line_number, line) = last_row;
        services.extend(definition.commit().map_err(|e| (e, line_number, line))?);
    }

    Ok(services)
}

pub fn parse(
    source: &IffSource,
    file: &str,
    references: &ServiceReferences,
) -> IffResult<(IdentificationRecord, ServiceList)> {
    log::info!("Parsing {file}...");
    let lines = source.read_lines(file)?;
    let (delivery, rows) = split_identification(&lines, file)?;

    let services = assemble(rows, references).map_err(|(error, line_number, line)| {
        IffError::parsing(error, file, line, line_number)
    })?;

    Ok((
        delivery,
        ServiceList::new(services.into_iter().map(Arc::new).collect()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{Model, tests::date},
        parsing::tests::get_json_value,
    };
    use pretty_assertions::assert_eq;
    use rustc_hash::FxHashMap;
    use test_log::test;

    struct Registries {
        companies: ResourceStorage<Company>,
        footnotes: ResourceStorage<Calendar>,
        transport_modes: ResourceStorage<TransportMode>,
        attributes: ResourceStorage<Attribute>,
        stations: ResourceStorage<Station>,
    }

    impl Registries {
        fn references(&self) -> ServiceReferences<'_> {
            ServiceReferences {
                companies: &self.companies,
                footnotes: &self.footnotes,
                transport_modes: &self.transport_modes,
                attributes: &self.attributes,
                stations: &self.stations,
            }
        }
    }

    fn storage<M: Model<M>>(items: Vec<M>) -> ResourceStorage<M> {
        let data: FxHashMap<_, _> = items.into_iter().map(|item| (item.id(), item)).collect();
        ResourceStorage::new(data)
    }

    fn build_registries() -> Registries {
        let stations = ["rtd", "sdm", "dt", "gv", "ledn"]
            .iter()
            .map(|code| {
                Arc::try_unwrap(crate::models::tests::build_station(code)).unwrap()
            })
            .collect();

        Registries {
            companies: storage(vec![Company::new(
                100,
                "ns".to_string(),
                "NS".to_string(),
                TimeOfDay::new(4, 0),
            )]),
            footnotes: storage(vec![Calendar::new(
                1,
                date(1, 1, 2018),
                date(10, 1, 2018),
                vec![true; 10],
            )]),
            transport_modes: storage(vec![TransportMode::new(
                "IC".to_string(),
                "Intercity".to_string(),
            )]),
            attributes: storage(vec![Attribute::new(
                "NIIN".to_string(),
                0,
                "Niet instappen".to_string(),
            )]),
            stations: storage(stations),
        }
    }

    fn numbered(lines: &[&'static str]) -> Vec<(usize, &'static str)> {
        lines
            .iter()
            .enumerate()
            .map(|(index, line)| (index + 1, *line))
            .collect()
    }

    fn run(lines: &[&'static str]) -> Result<Vec<Service>, (ParsingError, usize, &'static str)> {
        let registries = build_registries();
        assemble(numbered(lines), &registries.references())
    }

    fn codes(service: &Service) -> Vec<&str> {
        service
            .stops()
            .iter()
            .map(|stop| stop.station().code())
            .collect()
    }

    #[test]
    fn row_parsers() {
        match parse_line("%100,02735,      ,001,004,Intercity").unwrap() {
            ServiceLine::Definition(DefinitionLine::Number {
                company,
                number,
                variant,
                first_stop,
                last_stop,
                name,
            }) => {
                assert_eq!(company, 100);
                assert_eq!(number, 2735);
                assert_eq!(variant, "");
                assert_eq!((first_stop, last_stop), (1, 4));
                assert_eq!(name, "Intercity");
            }
            other => panic!("Expected a % line but got {other:?}"),
        }

        match parse_line("+ut     ,2359,2401").unwrap() {
            ServiceLine::Stop(StopLine::Interval {
                station,
                arrival,
                departure,
            }) => {
                assert_eq!(station, "ut");
                assert_eq!(arrival.total_minutes(), 23 * 60 + 59);
                assert_eq!(departure.total_minutes(), 24 * 60 + 1);
            }
            other => panic!("Expected a + line but got {other:?}"),
        }

        match parse_line(";dt").unwrap() {
            ServiceLine::Stop(StopLine::PassThrough { station }) => assert_eq!(station, "dt"),
            other => panic!("Expected a ; line but got {other:?}"),
        }

        match parse_line("?1    ,2a   ,00001").unwrap() {
            ServiceLine::Platform {
                arrival_platform,
                departure_platform,
                ..
            } => {
                assert_eq!(arrival_platform, "1");
                assert_eq!(departure_platform, "2a");
            }
            other => panic!("Expected a ? line but got {other:?}"),
        }
    }

    #[test]
    fn unknown_record_type() {
        match parse_line("$rtd    ,1200") {
            Err(ParsingError::UnknownRecordType('$')) => {}
            other => panic!("Expected UnknownRecordType but got {other:?}"),
        }
    }

    #[test]
    fn single_variant_service() {
        let services = run(&[
            "#00000001",
            "%100,02735,      ,001,004,",
            "-00001,000,999",
            "&IC  ,001,004",
            "*NIIN,001,001",
            ">rtd    ,1200",
            "?1    ,1    ,00001",
            ".sdm    ,1210",
            ";dt",
            "+gv     ,1225,1227",
            "?5    ,5    ,00001",
            "<ledn   ,1245",
        ])
        .unwrap();
        assert_eq!(services.len(), 1);

        let reference = r#"
            {
                "definition_id": 1,
                "number": 2735,
                "company": {
                    "id": 100,
                    "code": "ns",
                    "name": "NS",
                    "day_change_time": 240
                },
                "variant": "",
                "name": "",
                "footnote": {
                    "id": 1,
                    "first_day": "2018-01-01",
                    "last_day": "2018-01-10",
                    "bits": [true, true, true, true, true, true, true, true, true, true]
                },
                "transport_mode": {
                    "code": "IC",
                    "description": "Intercity"
                },
                "attributes": [
                    {
                        "code": "NIIN",
                        "processing_code": 0,
                        "description": "Niet instappen"
                    }
                ],
                "stops": [
                    {
                        "station": {"code": "rtd", "train_changes": "Possible", "change_time": 3, "maximum_change_time": 5, "country": null, "timezone": null, "attribute": "", "x": 0, "y": 0, "name": "RTD"},
                        "arrival": null,
                        "departure": {"time": 720, "platform": "1"}
                    },
                    {
                        "station": {"code": "sdm", "train_changes": "Possible", "change_time": 3, "maximum_change_time": 5, "country": null, "timezone": null, "attribute": "", "x": 0, "y": 0, "name": "SDM"},
                        "arrival": {"time": 730, "platform": null},
                        "departure": {"time": 730, "platform": null}
                    },
                    {
                        "station": {"code": "dt", "train_changes": "Possible", "change_time": 3, "maximum_change_time": 5, "country": null, "timezone": null, "attribute": "", "x": 0, "y": 0, "name": "DT"},
                        "arrival": null,
                        "departure": null
                    },
                    {
                        "station": {"code": "gv", "train_changes": "Possible", "change_time": 3, "maximum_change_time": 5, "country": null, "timezone": null, "attribute": "", "x": 0, "y": 0, "name": "GV"},
                        "arrival": {"time": 745, "platform": "5"},
                        "departure": {"time": 747, "platform": "5"}
                    },
                    {
                        "station": {"code": "ledn", "train_changes": "Possible", "change_time": 3, "maximum_change_time": 5, "country": null, "timezone": null, "attribute": "", "x": 0, "y": 0, "name": "LEDN"},
                        "arrival": {"time": 765, "platform": null},
                        "departure": null
                    }
                ]
            }"#;
        let (service, reference) = get_json_value(&services[0], reference).unwrap();
        assert_eq!(service, reference);
    }

    #[test]
    fn two_variants_split_the_shared_stops() {
        let services = run(&[
            "#00000001",
            "%100,02735,      ,001,003,",
            "%100,02737,      ,002,004,",
            "-00001,000,999",
            ">rtd    ,1200",
            "+sdm    ,1210,1211",
            "+gv     ,1225,1227",
            "<ledn   ,1245",
        ])
        .unwrap();
        assert_eq!(services.len(), 2);

        let first = &services[0];
        assert_eq!(first.number(), 2735);
        assert_eq!(codes(first), vec!["rtd", "sdm", "gv"]);
        assert!(first.stops()[0].arrival().is_none());
        assert!(first.stops()[2].departure().is_none());
        assert_eq!(
            first.stops()[2].arrival().unwrap().time(),
            TimeOfDay::new(12, 25)
        );

        let second = &services[1];
        assert_eq!(second.number(), 2737);
        assert_eq!(codes(second), vec!["sdm", "gv", "ledn"]);
        assert!(second.stops()[0].arrival().is_none());
        assert_eq!(
            second.stops()[0].departure().unwrap().time(),
            TimeOfDay::new(12, 11)
        );
        assert!(second.stops()[2].departure().is_none());

        // Each variant owns its stops: the boundaries cut in one are intact
        // in the other.
        assert!(first.stops()[2].departure().is_none());
        assert_eq!(
            second.stops()[1].departure().unwrap().time(),
            TimeOfDay::new(12, 27)
        );
        assert!(second.stops()[0].arrival().is_none());
        assert_eq!(
            first.stops()[1].arrival().unwrap().time(),
            TimeOfDay::new(12, 10)
        );
    }

    #[test]
    fn pass_through_stops_are_not_counted() {
        let services = run(&[
            "#00000001",
            "%100,02735,      ,001,002,",
            "%100,02737,      ,002,003,",
            ">rtd    ,1200",
            ";sdm",
            "+dt     ,1210,1211",
            ";gv",
            "<ledn   ,1245",
        ])
        .unwrap();
        assert_eq!(codes(&services[0]), vec!["rtd", "sdm", "dt"]);
        assert_eq!(codes(&services[1]), vec!["dt", "gv", "ledn"]);
        assert!(services[1].passes(services[1].stops()[1].station()));
    }

    #[test]
    fn consecutive_headers_commit_each_definition() {
        let services = run(&[
            "#00000001",
            "%100,00001,      ,001,002,",
            ">rtd    ,1200",
            "<sdm    ,1210",
            "#00000002",
            "%100,00002,      ,001,002,",
            ">sdm    ,1300",
            "<rtd    ,1310",
        ])
        .unwrap();
        let ids: Vec<_> = services
            .iter()
            .map(|service| (service.definition_id(), service.number()))
            .collect();
        assert_eq!(ids, vec![(1, 1), (2, 2)]);
    }

    #[test]
    fn platform_without_stop() {
        match run(&["#00000001", "%100,02735,      ,001,002,", "?1    ,1    ,00001"]) {
            Err((ParsingError::ProtocolViolation(_), line_number, _)) => {
                assert_eq!(line_number, 3)
            }
            other => panic!("Expected ProtocolViolation but got {other:?}"),
        }
    }

    #[test]
    fn platform_is_scoped_to_the_previous_line() {
        match run(&[
            "#00000001",
            ">rtd    ,1200",
            "?1    ,1    ,00001",
            "?2    ,2    ,00001",
        ]) {
            Err((ParsingError::ProtocolViolation(_), 4, _)) => {}
            other => panic!("Expected ProtocolViolation but got {other:?}"),
        }

        match run(&["#00000001", ";rtd", "?1    ,1    ,00001"]) {
            Err((ParsingError::ProtocolViolation(_), 3, _)) => {}
            other => panic!("Expected ProtocolViolation but got {other:?}"),
        }
    }

    #[test]
    fn record_before_any_header() {
        match run(&[">rtd    ,1200"]) {
            Err((ParsingError::ProtocolViolation("no service selected"), 1, _)) => {}
            other => panic!("Expected ProtocolViolation but got {other:?}"),
        }
    }

    #[test]
    fn unknown_station_is_fatal() {
        match run(&["#00000001", ">asd    ,1200"]) {
            Err((ParsingError::ReferenceNotFound { kind, id }, 2, _)) => {
                assert_eq!(kind, "station");
                assert_eq!(id, "asd");
            }
            other => panic!("Expected ReferenceNotFound but got {other:?}"),
        }
    }

    #[test]
    fn unknown_optional_references_are_left_empty() {
        let services = run(&[
            "#00000001",
            "%999,02735,      ,001,002,",
            "-00042,000,999",
            "&XX  ,001,002",
            "*XXXX,001,002",
            ">rtd    ,1200",
            "<sdm    ,1210",
        ])
        .unwrap();
        let service = &services[0];
        assert!(service.company().is_none());
        assert!(service.footnote().is_none());
        assert!(service.transport_mode().is_none());
        assert!(service.attributes().is_empty());
        assert!(!service.valid_on(date(1, 1, 2018)));
    }

    #[test]
    fn variant_covering_a_single_stop() {
        match run(&[
            "#00000001",
            "%100,02735,      ,004,009,",
            ">rtd    ,1200",
            "+sdm    ,1210,1211",
            "+gv     ,1225,1227",
            "<ledn   ,1245",
        ]) {
            Err((ParsingError::ProtocolViolation(_), 6, _)) => {}
            other => panic!("Expected ProtocolViolation but got {other:?}"),
        }
    }
}
