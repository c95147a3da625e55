use std::{fmt, ops::Add, slice::Iter, sync::Arc};

use chrono::NaiveDate;

use crate::models::{Service, Station, StopEvent, TimeOfDay};

// ------------------------------------------------------------------------------------------------
// --- ServiceList
// ------------------------------------------------------------------------------------------------

/// The services of a delivery, in file order. Filtering keeps that order and
/// never modifies the list it is called on.
#[derive(Clone, Debug, Default)]
pub struct ServiceList {
    services: Vec<Arc<Service>>,
}

impl ServiceList {
    pub fn new(services: Vec<Arc<Service>>) -> Self {
        Self { services }
    }

    // Getters/Setters

    pub fn services(&self) -> &Vec<Arc<Service>> {
        &self.services
    }

    // Functions

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, Arc<Service>> {
        self.services.iter()
    }

    pub fn filter<P>(&self, predicate: P) -> ServiceList
    where
        P: Fn(&Service) -> bool,
    {
        self.services
            .iter()
            .filter(|service| predicate(service))
            .cloned()
            .collect()
    }

    pub fn filter_valid_on(&self, date: NaiveDate) -> ServiceList {
        self.filter(|service| service.valid_on(date))
    }

    pub fn filter_stops_at(&self, station: &Station) -> ServiceList {
        self.filter(|service| service.stops_at(station))
    }

    pub fn filter_departs_from(&self, station: &Station) -> ServiceList {
        self.filter(|service| service.departs_from(station))
    }

    pub fn filter_arrives_at(&self, station: &Station) -> ServiceList {
        self.filter(|service| service.arrives_at(station))
    }

    pub fn filter_passes(&self, station: &Station) -> ServiceList {
        self.filter(|service| service.passes(station))
    }

    fn timetable<'a, L>(&'a self, date: NaiveDate, station: &Station, lookup: L) -> Timetable<'a>
    where
        L: Fn(&'a Service, &Station) -> Option<&'a StopEvent>,
    {
        self.services
            .iter()
            .map(Arc::as_ref)
            .filter(|service| service.valid_on(date))
            .filter_map(|service| {
                lookup(service, station).map(|stop| TimetableEntry::new(stop, service))
            })
            .collect()
    }

    /// The services running on `date` and calling at `station`, by time.
    /// Services only passing through have no time there and are left out.
    pub fn timetable_stops_at(&self, date: NaiveDate, station: &Station) -> Timetable<'_> {
        self.timetable(date, station, Service::get_calls_at)
    }

    pub fn timetable_departs_from(&self, date: NaiveDate, station: &Station) -> Timetable<'_> {
        self.timetable(date, station, Service::get_departs_from)
    }

    pub fn timetable_arrives_at(&self, date: NaiveDate, station: &Station) -> Timetable<'_> {
        self.timetable(date, station, Service::get_arrives_at)
    }
}

impl FromIterator<Arc<Service>> for ServiceList {
    fn from_iter<I: IntoIterator<Item = Arc<Service>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ServiceList {
    type Item = &'a Arc<Service>;
    type IntoIter = Iter<'a, Arc<Service>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ------------------------------------------------------------------------------------------------
// --- TimetableEntry
// ------------------------------------------------------------------------------------------------

/// A service at one of its stops.
#[derive(Clone, Copy, Debug)]
pub struct TimetableEntry<'a> {
    stop: &'a StopEvent,
    service: &'a Service,
}

impl<'a> TimetableEntry<'a> {
    pub fn new(stop: &'a StopEvent, service: &'a Service) -> Self {
        Self { stop, service }
    }

    // Getters/Setters

    pub fn stop(&self) -> &'a StopEvent {
        self.stop
    }

    pub fn service(&self) -> &'a Service {
        self.service
    }

    // Functions

    /// Entries are sorted by time, then by station code and name.
    pub fn key(&self) -> (Option<TimeOfDay>, &'a str, &'a str) {
        let station = self.stop.station();
        (self.stop.time(), station.code(), station.name())
    }
}

impl fmt::Display for TimetableEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let time = self.stop.time().map(|time| time.to_string()).unwrap_or_default();
        // Services ending here are flagged with an A.
        let flag = if self.stop.departure().is_none() { "A" } else { " " };
        let platform = self.stop.platform().unwrap_or_default();
        write!(f, "{time:>5} {flag}  {platform:>3}  {}", self.service)
    }
}

// ------------------------------------------------------------------------------------------------
// --- Timetable
// ------------------------------------------------------------------------------------------------

/// Entries kept sorted by [`TimetableEntry::key`]. Entries with equal keys
/// keep their insertion order.
#[derive(Clone, Debug, Default)]
pub struct Timetable<'a> {
    entries: Vec<TimetableEntry<'a>>,
}

impl<'a> Timetable<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    // Getters/Setters

    pub fn entries(&self) -> &Vec<TimetableEntry<'a>> {
        &self.entries
    }

    // Functions

    pub fn insert(&mut self, entry: TimetableEntry<'a>) {
        let key = entry.key();
        let index = self.entries.partition_point(|other| other.key() <= key);
        self.entries.insert(index, entry);
    }

    /// Both timetables interleaved. On equal keys the entries of `self` come
    /// first. Nothing is deduplicated.
    pub fn merge(self, other: Timetable<'a>) -> Timetable<'a> {
        let mut entries = Vec::with_capacity(self.len() + other.len());
        let mut left = self.entries.into_iter().peekable();
        let mut right = other.entries.into_iter().peekable();

        loop {
            let take_left = match (left.peek(), right.peek()) {
                (Some(l), Some(r)) => l.key() <= r.key(),
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => break,
            };
            entries.extend(if take_left { left.next() } else { right.next() });
        }

        Timetable { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, TimetableEntry<'a>> {
        self.entries.iter()
    }
}

impl<'a> FromIterator<TimetableEntry<'a>> for Timetable<'a> {
    fn from_iter<I: IntoIterator<Item = TimetableEntry<'a>>>(iter: I) -> Self {
        let mut entries: Vec<_> = iter.into_iter().collect();
        entries.sort_by_key(TimetableEntry::key);
        Self { entries }
    }
}

impl<'a> Add for Timetable<'a> {
    type Output = Timetable<'a>;

    fn add(self, rhs: Timetable<'a>) -> Self::Output {
        self.merge(rhs)
    }
}

impl<'a> IntoIterator for Timetable<'a> {
    type Item = TimetableEntry<'a>;
    type IntoIter = std::vec::IntoIter<TimetableEntry<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, 'b> IntoIterator for &'b Timetable<'a> {
    type Item = &'b TimetableEntry<'a>;
    type IntoIter = Iter<'b, TimetableEntry<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
