use std::{fmt, hash::Hash, sync::Arc};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::Serialize;
use strum_macros::EnumString;
use thiserror::Error;

use crate::utils::count_days_between_two_dates;

// ------------------------------------------------------------------------------------------------
// --- Model
// ------------------------------------------------------------------------------------------------

pub trait Model<M: Model<M>> {
    // Primary key type.
    type K: Clone + Eq + Hash + fmt::Debug + fmt::Display;

    fn id(&self) -> M::K;
}

macro_rules! impl_Model {
    ($m:ty) => {
        impl Model<$m> for $m {
            type K = i32;

            fn id(&self) -> Self::K {
                self.id
            }
        }
    };
    // Models keyed by a trimmed textual code.
    ($m:ty, $field:ident) => {
        impl Model<$m> for $m {
            type K = String;

            fn id(&self) -> Self::K {
                self.$field.clone()
            }
        }
    };
}

// ------------------------------------------------------------------------------------------------
// --- Attribute
// ------------------------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Serialize)]
pub struct Attribute {
    code: String,
    processing_code: i32,
    description: String,
}

impl_Model!(Attribute, code);

impl Attribute {
    pub fn new(code: String, processing_code: i32, description: String) -> Self {
        Self {
            code,
            processing_code,
            description,
        }
    }

    // Getters/Setters

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn processing_code(&self) -> i32 {
        self.processing_code
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description)
    }
}

// ------------------------------------------------------------------------------------------------
// --- Calendar
// ------------------------------------------------------------------------------------------------

/// The validity of a footnote: one bit per day of the window
/// `[first_day, last_day]`, the first bit being `first_day`.
#[derive(Debug, PartialEq, Serialize)]
pub struct Calendar {
    id: i32,
    first_day: NaiveDate,
    last_day: NaiveDate,
    bits: Vec<bool>,
}

impl_Model!(Calendar);

impl Calendar {
    /// Missing days are invalid, bits past `last_day` are dropped.
    pub fn new(id: i32, first_day: NaiveDate, last_day: NaiveDate, mut bits: Vec<bool>) -> Self {
        bits.resize(count_days_between_two_dates(first_day, last_day), false);

        Self {
            id,
            first_day,
            last_day,
            bits,
        }
    }

    // Getters/Setters

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    pub fn last_day(&self) -> NaiveDate {
        self.last_day
    }

    pub fn bits(&self) -> &Vec<bool> {
        &self.bits
    }

    // Functions

    pub fn valid_on(&self, date: NaiveDate) -> bool {
        if date < self.first_day || date > self.last_day {
            return false;
        }

        usize::try_from((date - self.first_day).num_days())
            .ok()
            .and_then(|index| self.bits.get(index).copied())
            .unwrap_or(false)
    }
}

// ------------------------------------------------------------------------------------------------
// --- Company
// ------------------------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Serialize)]
pub struct Company {
    id: i32,
    code: String,
    name: String,
    day_change_time: TimeOfDay,
}

impl_Model!(Company);

impl Company {
    pub fn new(id: i32, code: String, name: String, day_change_time: TimeOfDay) -> Self {
        Self {
            id,
            code,
            name,
            day_change_time,
        }
    }

    // Getters/Setters

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn day_change_time(&self) -> TimeOfDay {
        self.day_change_time
    }
}

impl fmt::Display for Company {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

// ------------------------------------------------------------------------------------------------
// --- Country
// ------------------------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Serialize)]
pub struct Country {
    code: String,
    inland: bool,
    name: String,
}

impl_Model!(Country, code);

impl Country {
    pub fn new(code: String, inland: bool, name: String) -> Self {
        Self { code, inland, name }
    }

    // Getters/Setters

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn is_inland(&self) -> bool {
        self.inland
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

// ------------------------------------------------------------------------------------------------
// --- IdentificationRecord
// ------------------------------------------------------------------------------------------------

/// First line of every file of a delivery. All the files of one delivery
/// carry the same record.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct IdentificationRecord {
    company_number: i32,
    first_day: NaiveDate,
    last_day: NaiveDate,
    version_number: i32,
    description: String,
}

impl IdentificationRecord {
    pub fn new(
        company_number: i32,
        first_day: NaiveDate,
        last_day: NaiveDate,
        version_number: i32,
        description: String,
    ) -> Self {
        Self {
            company_number,
            first_day,
            last_day,
            version_number,
            description,
        }
    }

    // Getters/Setters

    pub fn company_number(&self) -> i32 {
        self.company_number
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    pub fn last_day(&self) -> NaiveDate {
        self.last_day
    }

    pub fn version_number(&self) -> i32 {
        self.version_number
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    // Functions

    pub fn is_compatible_with(&self, other: &IdentificationRecord) -> bool {
        self == other
    }
}

// ------------------------------------------------------------------------------------------------
// --- Service
// ------------------------------------------------------------------------------------------------

/// One numbered train running over its own stops. The first stop only has
/// a departure and the last stop only has an arrival, pass-through stops
/// appear between the two.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Service {
    definition_id: i32,
    number: i32,
    company: Option<Arc<Company>>,
    variant: String,
    name: String,
    footnote: Option<Arc<Calendar>>,
    transport_mode: Option<Arc<TransportMode>>,
    attributes: Vec<Arc<Attribute>>,
    stops: Vec<StopEvent>,
}

impl Service {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        definition_id: i32,
        number: i32,
        company: Option<Arc<Company>>,
        variant: String,
        name: String,
        footnote: Option<Arc<Calendar>>,
        transport_mode: Option<Arc<TransportMode>>,
        attributes: Vec<Arc<Attribute>>,
        mut stops: Vec<StopEvent>,
    ) -> Result<Self, ServiceError> {
        // The journey runs from the first departure to the last arrival.
        let first = stops
            .iter()
            .position(|stop| stop.departure().is_some())
            .unwrap_or(stops.len());
        stops.drain(..first);
        let last = stops.iter().rposition(|stop| stop.arrival().is_some());
        stops.truncate(last.map_or(0, |i| i + 1));

        if stops.len() < 2 {
            return Err(ServiceError::TooFewStops(stops.len()));
        }

        if let Some(first) = stops.first_mut() {
            first.clear_arrival();
        }
        if let Some(last) = stops.last_mut() {
            last.clear_departure();
        }

        Ok(Self {
            definition_id,
            number,
            company,
            variant,
            name,
            footnote,
            transport_mode,
            attributes,
            stops,
        })
    }

    // Getters/Setters

    pub fn definition_id(&self) -> i32 {
        self.definition_id
    }

    pub fn number(&self) -> i32 {
        self.number
    }

    pub fn company(&self) -> Option<&Arc<Company>> {
        self.company.as_ref()
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn footnote(&self) -> Option<&Arc<Calendar>> {
        self.footnote.as_ref()
    }

    pub fn transport_mode(&self) -> Option<&Arc<TransportMode>> {
        self.transport_mode.as_ref()
    }

    pub fn attributes(&self) -> &Vec<Arc<Attribute>> {
        &self.attributes
    }

    pub fn stops(&self) -> &Vec<StopEvent> {
        &self.stops
    }

    // Functions

    /// A service without a footnote never runs.
    pub fn valid_on(&self, date: NaiveDate) -> bool {
        self.footnote
            .as_ref()
            .is_some_and(|footnote| footnote.valid_on(date))
    }

    pub fn destination(&self) -> Option<&Arc<Station>> {
        self.stops.last().map(|stop| stop.station())
    }

    fn find_stop<P>(&self, station: &Station, predicate: P) -> Option<&StopEvent>
    where
        P: Fn(&StopEvent) -> bool,
    {
        // Loop routes visit a station more than once, the first visit wins.
        self.stops
            .iter()
            .find(|stop| stop.station().code() == station.code() && predicate(*stop))
    }

    /// Any visit of `station`, pass-through included.
    pub fn get_stops_at(&self, station: &Station) -> Option<&StopEvent> {
        self.find_stop(station, |_| true)
    }

    pub fn stops_at(&self, station: &Station) -> bool {
        self.get_stops_at(station).is_some()
    }

    /// A visit of `station` with an arrival or a departure.
    pub fn get_calls_at(&self, station: &Station) -> Option<&StopEvent> {
        self.find_stop(station, |stop| !stop.is_passing())
    }

    pub fn calls_at(&self, station: &Station) -> bool {
        self.get_calls_at(station).is_some()
    }

    pub fn get_departs_from(&self, station: &Station) -> Option<&StopEvent> {
        self.find_stop(station, |stop| stop.departure().is_some())
    }

    pub fn departs_from(&self, station: &Station) -> bool {
        self.get_departs_from(station).is_some()
    }

    pub fn get_arrives_at(&self, station: &Station) -> Option<&StopEvent> {
        self.find_stop(station, |stop| stop.arrival().is_some())
    }

    pub fn arrives_at(&self, station: &Station) -> bool {
        self.get_arrives_at(station).is_some()
    }

    pub fn get_passes(&self, station: &Station) -> Option<&StopEvent> {
        self.find_stop(station, StopEvent::is_passing)
    }

    pub fn passes(&self, station: &Station) -> bool {
        self.get_passes(station).is_some()
    }

    fn position_of<P>(&self, station: &Station, from: usize, predicate: P) -> Option<usize>
    where
        P: Fn(&StopEvent) -> bool,
    {
        self.stops
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, stop)| stop.station().code() == station.code() && predicate(stop))
            .map(|(i, _)| i)
    }

    /// The part of the journey between `start` and `end`, both included.
    /// The slice starts at the visit [`Service::get_departs_from`] returns and
    /// ends at the first later visit arriving at `end`. A missing bound stands
    /// for the matching end of the journey.
    pub fn slice(
        &self,
        start: Option<&Station>,
        end: Option<&Station>,
    ) -> Result<Service, ServiceError> {
        let departs = |stop: &StopEvent| stop.departure().is_some();
        let arrives = |stop: &StopEvent| stop.arrival().is_some();

        let start_index = match start {
            Some(station) => self
                .position_of(station, 0, departs)
                .ok_or_else(|| self.unusable_bound(station))?,
            None => 0,
        };

        let end_index = match end {
            Some(station) => match self.position_of(station, start_index + 1, arrives) {
                Some(index) => index,
                None if self.position_of(station, 0, arrives).is_some() => {
                    return Err(self.invalid_bounds(start_index, station.code()));
                }
                None => return Err(self.unusable_bound(station)),
            },
            None => self.stops.len() - 1,
        };

        Service::new(
            self.definition_id,
            self.number,
            self.company.clone(),
            self.variant.clone(),
            self.name.clone(),
            self.footnote.clone(),
            self.transport_mode.clone(),
            self.attributes.clone(),
            self.stops[start_index..=end_index].to_vec(),
        )
    }

    fn unusable_bound(&self, station: &Station) -> ServiceError {
        let code = station.code().to_string();
        if self.stops_at(station) {
            ServiceError::UnusableBound(code)
        } else {
            ServiceError::StationNotOnService(code)
        }
    }

    fn invalid_bounds(&self, start_index: usize, end: &str) -> ServiceError {
        ServiceError::InvalidSliceBounds {
            start: self.stops[start_index].station().code().to_string(),
            end: end.to_string(),
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(company) = &self.company {
            write!(f, "{company} ")?;
        }
        if let Some(transport_mode) = &self.transport_mode {
            write!(f, "{transport_mode} ")?;
        }
        // Number 0 stands for an unnumbered train.
        if self.number != 0 {
            write!(f, "{} ", self.number)?;
        }
        if let Some(destination) = self.destination() {
            write!(f, "to {destination}")?;
        }
        if !self.attributes.is_empty() {
            let attributes: Vec<_> = self.attributes.iter().map(|a| a.to_string()).collect();
            write!(f, " ({})", attributes.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ServiceError {
    #[error("A service needs at least two stops, got {0}")]
    TooFewStops(usize),
    #[error("Station {0} is not on the service")]
    StationNotOnService(String),
    #[error("The journey can not start or end at {0}")]
    UnusableBound(String),
    #[error("Slicing from {start} to {end} leaves less than two stops")]
    InvalidSliceBounds { start: String, end: String },
}

// ------------------------------------------------------------------------------------------------
// --- Station
// ------------------------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Serialize)]
pub struct Station {
    code: String,
    train_changes: TrainChanges,
    change_time: i32,
    maximum_change_time: i32,
    country: Option<Arc<Country>>,
    timezone: Option<Arc<TimezoneSchedule>>,
    attribute: String,
    x: i32,
    y: i32,
    name: String,
}

impl_Model!(Station, code);

impl Station {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        code: String,
        train_changes: TrainChanges,
        change_time: i32,
        maximum_change_time: i32,
        country: Option<Arc<Country>>,
        timezone: Option<Arc<TimezoneSchedule>>,
        attribute: String,
        x: i32,
        y: i32,
        name: String,
    ) -> Self {
        Self {
            code,
            train_changes,
            change_time,
            maximum_change_time,
            country,
            timezone,
            attribute,
            x,
            y,
            name,
        }
    }

    // Getters/Setters

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn train_changes(&self) -> TrainChanges {
        self.train_changes
    }

    pub fn change_time(&self) -> i32 {
        self.change_time
    }

    pub fn maximum_change_time(&self) -> i32 {
        self.maximum_change_time
    }

    pub fn country(&self) -> Option<&Arc<Country>> {
        self.country.as_ref()
    }

    pub fn timezone(&self) -> Option<&Arc<TimezoneSchedule>> {
        self.timezone.as_ref()
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Rijksdriehoek coordinates, in meters.
    pub fn coordinates(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // Functions

    pub fn offset_on(&self, date: NaiveDate) -> Option<i32> {
        self.timezone
            .as_ref()
            .and_then(|timezone| timezone.offset_on(date))
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

// ------------------------------------------------------------------------------------------------
// --- StopEvent
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StopEvent {
    station: Arc<Station>,
    arrival: Option<StopTime>,
    departure: Option<StopTime>,
}

impl StopEvent {
    pub fn new(
        station: Arc<Station>,
        arrival: Option<TimeOfDay>,
        departure: Option<TimeOfDay>,
    ) -> Self {
        Self {
            station,
            arrival: arrival.map(StopTime::new),
            departure: departure.map(StopTime::new),
        }
    }

    pub fn passing(station: Arc<Station>) -> Self {
        Self::new(station, None, None)
    }

    // Getters/Setters

    pub fn station(&self) -> &Arc<Station> {
        &self.station
    }

    pub fn arrival(&self) -> Option<&StopTime> {
        self.arrival.as_ref()
    }

    pub fn departure(&self) -> Option<&StopTime> {
        self.departure.as_ref()
    }

    /// Only the times present receive their platform.
    pub(crate) fn set_platforms(&mut self, arrival: Option<String>, departure: Option<String>) {
        if let Some(stop_time) = self.arrival.as_mut() {
            stop_time.platform = arrival;
        }
        if let Some(stop_time) = self.departure.as_mut() {
            stop_time.platform = departure;
        }
    }

    pub(crate) fn clear_arrival(&mut self) {
        self.arrival = None;
    }

    pub(crate) fn clear_departure(&mut self) {
        self.departure = None;
    }

    // Functions

    pub fn role(&self) -> StopRole {
        match (&self.arrival, &self.departure) {
            (None, Some(_)) => StopRole::Departure,
            (Some(_), None) => StopRole::Arrival,
            (Some(_), Some(_)) => StopRole::Intermediate,
            (None, None) => StopRole::Passing,
        }
    }

    pub fn is_passing(&self) -> bool {
        self.role() == StopRole::Passing
    }

    /// The departure time, or the arrival time at the end of the journey.
    pub fn time(&self) -> Option<TimeOfDay> {
        self.departure
            .as_ref()
            .or(self.arrival.as_ref())
            .map(StopTime::time)
    }

    pub fn platform(&self) -> Option<&str> {
        self.departure
            .as_ref()
            .or(self.arrival.as_ref())
            .and_then(StopTime::platform)
    }
}

impl fmt::Display for StopEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.time() {
            Some(time) => write!(f, "{time:>5} {}", self.station)?,
            None => write!(f, "    - {}", self.station)?,
        }
        if let Some(platform) = self.platform() {
            write!(f, " (platform {platform})")?;
        }
        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// --- StopRole
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum StopRole {
    Departure,
    Arrival,
    Intermediate,
    Passing,
}

// ------------------------------------------------------------------------------------------------
// --- StopTime
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StopTime {
    time: TimeOfDay,
    platform: Option<String>,
}

impl StopTime {
    pub fn new(time: TimeOfDay) -> Self {
        Self {
            time,
            platform: None,
        }
    }

    // Getters/Setters

    pub fn time(&self) -> TimeOfDay {
        self.time
    }

    pub fn platform(&self) -> Option<&str> {
        self.platform.as_deref()
    }
}

// ------------------------------------------------------------------------------------------------
// --- TimeOfDay
// ------------------------------------------------------------------------------------------------

/// Minutes since the local midnight of the operating day. Not reduced to a
/// single day: a train leaving at 25:30 runs on the next calendar day.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct TimeOfDay(u32);

impl TimeOfDay {
    pub fn new(hours: u32, minutes: u32) -> Self {
        Self(hours * 60 + minutes)
    }

    pub fn from_minutes(minutes: u32) -> Self {
        Self(minutes)
    }

    pub fn total_minutes(&self) -> u32 {
        self.0
    }

    pub fn duration(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.0))
    }

    /// The moment this time designates on the operating day `date`.
    pub fn at(&self, date: NaiveDate) -> Option<NaiveDateTime> {
        date.and_time(NaiveTime::MIN)
            .checked_add_signed(self.duration())
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = format!("{}:{:02}", (self.0 / 60) % 24, self.0 % 60);
        f.pad(&value)
    }
}

// ------------------------------------------------------------------------------------------------
// --- TimezonePeriod
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimezonePeriod {
    offset_hours: i32,
    first_day: NaiveDate,
    last_day: NaiveDate,
}

impl TimezonePeriod {
    pub fn new(offset_hours: i32, first_day: NaiveDate, last_day: NaiveDate) -> Self {
        Self {
            offset_hours,
            first_day,
            last_day,
        }
    }

    // Getters/Setters

    pub fn offset_hours(&self) -> i32 {
        self.offset_hours
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    pub fn last_day(&self) -> NaiveDate {
        self.last_day
    }

    // Functions

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first_day <= date && date <= self.last_day
    }
}

// ------------------------------------------------------------------------------------------------
// --- TimezoneSchedule
// ------------------------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Serialize)]
pub struct TimezoneSchedule {
    id: i32,
    periods: Vec<TimezonePeriod>,
}

impl_Model!(TimezoneSchedule);

impl TimezoneSchedule {
    pub fn new(id: i32, periods: Vec<TimezonePeriod>) -> Self {
        Self { id, periods }
    }

    // Getters/Setters

    pub fn periods(&self) -> &Vec<TimezonePeriod> {
        &self.periods
    }

    // Functions

    /// Offset in hours of the first period containing `date`.
    pub fn offset_on(&self, date: NaiveDate) -> Option<i32> {
        self.periods
            .iter()
            .find(|period| period.contains(date))
            .map(TimezonePeriod::offset_hours)
    }

    /// `time` on `date`, shifted by the offset in force that day.
    pub fn apply(&self, date: NaiveDate, time: TimeOfDay) -> Option<NaiveDateTime> {
        let offset = self.offset_on(date).unwrap_or(0);
        time.at(date)?
            .checked_add_signed(TimeDelta::hours(i64::from(offset)))
    }
}

// ------------------------------------------------------------------------------------------------
// --- TrainChanges
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, EnumString, Eq, Hash, PartialEq, Serialize)]
pub enum TrainChanges {
    #[strum(serialize = "0")]
    NotPossible,
    #[default]
    #[strum(serialize = "1")]
    Possible,
    // Not a real station, only used to model connections.
    #[strum(serialize = "2")]
    Virtual,
}

// ------------------------------------------------------------------------------------------------
// --- TransportMode
// ------------------------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Serialize)]
pub struct TransportMode {
    code: String,
    description: String,
}

impl_Model!(TransportMode, code);

impl TransportMode {
    pub fn new(code: String, description: String) -> Self {
        Self { code, description }
    }

    // Getters/Setters

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description)
    }
}
