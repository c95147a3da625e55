mod attribute_parser;
mod company_parser;
mod country_parser;
mod delivery_parser;
pub(crate) mod error;
mod footnote_parser;
mod helpers;
mod service_parser;
mod station_parser;
mod timezone_parser;
mod transport_mode_parser;

pub use attribute_parser::parse as load_attributes;
pub use company_parser::parse as load_companies;
pub use country_parser::parse as load_countries;
pub use delivery_parser::parse as load_delivery;
pub use footnote_parser::parse as load_footnotes;
pub use service_parser::ServiceReferences;
pub use service_parser::parse as load_services;
pub use station_parser::parse as load_stations;
pub use timezone_parser::parse as load_timezones;
pub use transport_mode_parser::parse as load_transport_modes;

#[cfg(test)]
pub(crate) mod tests {
    use std::error::Error;

    use serde::Serialize;

    pub(crate) fn get_json_value<F>(
        lhs: &F,
        rhs: &str,
    ) -> Result<(serde_json::Value, serde_json::Value), Box<dyn Error>>
    where
        F: Serialize,
    {
        let serialized = serde_json::to_value(lhs)?;
        println!("{serialized:#}");
        let reference = rhs.parse::<serde_json::Value>()?;
        Ok((serialized, reference))
    }
}
