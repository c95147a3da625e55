use std::{error::Error, path::PathBuf};

use chrono::{Local, NaiveDate};
use clap::Parser;
use iff_parser::{Iff, IffSource, Station, StopEvent};

#[derive(Parser, Debug)]
#[command(name = "departures")]
#[command(about = "Print the trains calling at a station on one day")]
struct Args {
    /// Delivery directory or zip archive
    #[arg(value_name = "DELIVERY")]
    path: PathBuf,

    /// Station code, as found in stations.dat
    station: String,

    /// Operating day (YYYY-MM-DD), today if not given
    date: Option<NaiveDate>,
}

impl Args {
    fn source(&self) -> IffSource {
        if self.path.is_dir() {
            IffSource::directory(&self.path)
        } else {
            IffSource::archive(&self.path)
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    simple_logger::init_with_level(log::Level::Info)?;

    let date = args.date.unwrap_or_else(|| Local::now().date_naive());

    let iff = Iff::new(args.source()).await?;
    let data_storage = iff.data_storage();
    let station: Option<&Station> = data_storage
        .stations()
        .find(args.station.as_str())
        .map(AsRef::as_ref);
    let Some(station) = station else {
        return Err(format!("Unknown station {}", args.station).into());
    };

    println!("{station} on {date}");
    for entry in data_storage.services().timetable_stops_at(date, station) {
        println!("{entry}");

        // A service ending here has no remaining stops.
        let Ok(remaining) = entry.service().slice(Some(station), None) else {
            continue;
        };
        remaining
            .stops()
            .iter()
            .skip(1)
            .filter(|stop| !stop.is_passing())
            .for_each(|stop: &StopEvent| println!("{:16}{stop}", ""));
    }

    Ok(())
}
