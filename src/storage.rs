use std::{borrow::Borrow, hash::Hash, sync::Arc};

use rustc_hash::FxHashMap;

use crate::{
    models::{
        Attribute, Calendar, Company, Country, IdentificationRecord, Model, Station,
        TimezoneSchedule, TransportMode,
    },
    timetable::ServiceList,
};

// ------------------------------------------------------------------------------------------------
// --- DataStorage
// ------------------------------------------------------------------------------------------------

/// Everything a delivery contains, once loaded. Nothing is mutated afterwards.
#[derive(Debug)]
pub struct DataStorage {
    delivery: IdentificationRecord,
    attributes: ResourceStorage<Attribute>,
    companies: ResourceStorage<Company>,
    countries: ResourceStorage<Country>,
    footnotes: ResourceStorage<Calendar>,
    stations: ResourceStorage<Station>,
    timezones: ResourceStorage<TimezoneSchedule>,
    transport_modes: ResourceStorage<TransportMode>,
    services: ServiceList,
}

impl DataStorage {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        delivery: IdentificationRecord,
        attributes: ResourceStorage<Attribute>,
        companies: ResourceStorage<Company>,
        countries: ResourceStorage<Country>,
        footnotes: ResourceStorage<Calendar>,
        stations: ResourceStorage<Station>,
        timezones: ResourceStorage<TimezoneSchedule>,
        transport_modes: ResourceStorage<TransportMode>,
        services: ServiceList,
    ) -> Self {
        Self {
            delivery,
            attributes,
            companies,
            countries,
            footnotes,
            stations,
            timezones,
            transport_modes,
            services,
        }
    }

    // Getters/Setters

    pub fn delivery(&self) -> &IdentificationRecord {
        &self.delivery
    }

    pub fn attributes(&self) -> &ResourceStorage<Attribute> {
        &self.attributes
    }

    pub fn companies(&self) -> &ResourceStorage<Company> {
        &self.companies
    }

    pub fn countries(&self) -> &ResourceStorage<Country> {
        &self.countries
    }

    pub fn footnotes(&self) -> &ResourceStorage<Calendar> {
        &self.footnotes
    }

    pub fn stations(&self) -> &ResourceStorage<Station> {
        &self.stations
    }

    pub fn timezones(&self) -> &ResourceStorage<TimezoneSchedule> {
        &self.timezones
    }

    pub fn transport_modes(&self) -> &ResourceStorage<TransportMode> {
        &self.transport_modes
    }

    pub fn services(&self) -> &ServiceList {
        &self.services
    }
}

// ------------------------------------------------------------------------------------------------
// --- ResourceStorage
// ------------------------------------------------------------------------------------------------

#[derive(Debug)]
pub struct ResourceStorage<M: Model<M>> {
    data: FxHashMap<M::K, Arc<M>>,
}

impl<M: Model<M>> ResourceStorage<M> {
    pub fn new(data: FxHashMap<M::K, M>) -> Self {
        Self {
            data: data.into_iter().map(|(k, v)| (k, Arc::new(v))).collect(),
        }
    }

    // Getters/Setters

    pub fn data(&self) -> &FxHashMap<M::K, Arc<M>> {
        &self.data
    }

    // Functions

    pub fn find<Q>(&self, k: &Q) -> Option<&Arc<M>>
    where
        M::K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.data.get(k)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
