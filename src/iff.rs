use std::time::Instant;

use tokio::task;

use crate::{
    error::{IffError, IffResult},
    models::IdentificationRecord,
    parsing::{self, ServiceReferences},
    source::{FileNames, IffSource},
    storage::DataStorage,
};

/// A fully loaded IFF delivery.
#[derive(Debug)]
pub struct Iff {
    data_storage: DataStorage,
}

impl Iff {
    /// Loads the delivery found in `source`, using the default file names.
    pub async fn new(source: IffSource) -> IffResult<Self> {
        Self::with_file_names(source, FileNames::default()).await
    }

    /// Loads the delivery found in `source`.
    ///
    /// The files without dependencies are decoded in parallel, the stations
    /// and the timetable afterwards, once every registry they refer to is
    /// complete. Every file must carry the identification record of the
    /// delivery file.
    pub async fn with_file_names(source: IffSource, names: FileNames) -> IffResult<Self> {
        let now = Instant::now();

        let delivery = load(&source, &names.delivery, parsing::load_delivery).await?;
        log::info!(
            "Delivery {} of company {}, valid from {} to {}",
            delivery.version_number(),
            delivery.company_number(),
            delivery.first_day(),
            delivery.last_day(),
        );

        let (attributes, timezones, countries, companies, transport_modes, footnotes) = tokio::try_join!(
            load(&source, &names.attributes, parsing::load_attributes),
            load(&source, &names.timezones, parsing::load_timezones),
            load(&source, &names.countries, parsing::load_countries),
            load(&source, &names.companies, parsing::load_companies),
            load(&source, &names.transport_modes, parsing::load_transport_modes),
            load(&source, &names.footnotes, parsing::load_footnotes),
        )?;

        let attributes = checked(&delivery, &names.attributes, attributes)?;
        let timezones = checked(&delivery, &names.timezones, timezones)?;
        let countries = checked(&delivery, &names.countries, countries)?;
        let companies = checked(&delivery, &names.companies, companies)?;
        let transport_modes = checked(&delivery, &names.transport_modes, transport_modes)?;
        let footnotes = checked(&delivery, &names.footnotes, footnotes)?;

        let data_storage = task::spawn_blocking(move || -> IffResult<DataStorage> {
            let stations = parsing::load_stations(&source, &names.stations, &countries, &timezones)?;
            let stations = checked(&delivery, &names.stations, stations)?;

            let references = ServiceReferences {
                companies: &companies,
                footnotes: &footnotes,
                transport_modes: &transport_modes,
                attributes: &attributes,
                stations: &stations,
            };
            let services = parsing::load_services(&source, &names.timetable, &references)?;
            let services = checked(&delivery, &names.timetable, services)?;

            Ok(DataStorage::new(
                delivery,
                attributes,
                companies,
                countries,
                footnotes,
                stations,
                timezones,
                transport_modes,
                services,
            ))
        })
        .await??;

        log::info!(
            "{} services and {} stations loaded in {:.2?}",
            data_storage.services().len(),
            data_storage.stations().len(),
            now.elapsed(),
        );

        Ok(Self { data_storage })
    }

    // Getters/Setters

    pub fn data_storage(&self) -> &DataStorage {
        &self.data_storage
    }
}

/// Runs `loader` on a blocking worker thread.
async fn load<T, F>(source: &IffSource, file: &str, loader: F) -> IffResult<T>
where
    T: Send + 'static,
    F: FnOnce(&IffSource, &str) -> IffResult<T> + Send + 'static,
{
    let source = source.clone();
    let file = file.to_string();
    task::spawn_blocking(move || loader(&source, &file)).await?
}

fn checked<T>(
    delivery: &IdentificationRecord,
    file: &str,
    (record, data): (IdentificationRecord, T),
) -> IffResult<T> {
    if !record.is_compatible_with(delivery) {
        return Err(IffError::DeliveryMismatch {
            file: file.to_string(),
        });
    }
    Ok(data)
}
