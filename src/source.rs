use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use zip::ZipArchive;

use crate::error::IffResult;

/// Where the files of a delivery are read from. Deliveries are usually
/// distributed as a zip archive.
#[derive(Clone, Debug)]
pub enum IffSource {
    Directory(PathBuf),
    Archive(PathBuf),
}

impl IffSource {
    pub fn directory(path: impl AsRef<Path>) -> Self {
        Self::Directory(path.as_ref().to_path_buf())
    }

    pub fn archive(path: impl AsRef<Path>) -> Self {
        Self::Archive(path.as_ref().to_path_buf())
    }

    pub fn read_lines(&self, file_name: &str) -> IffResult<Vec<String>> {
        let mut contents = Vec::new();

        match self {
            Self::Directory(path) => {
                let file = File::open(path.join(file_name))?;
                BufReader::new(file).read_to_end(&mut contents)?;
            }
            Self::Archive(path) => {
                let file = File::open(path)?;
                let mut archive = ZipArchive::new(BufReader::new(file))?;
                archive.by_name(file_name)?.read_to_end(&mut contents)?;
            }
        }

        Ok(decode(contents)
            .trim_start_matches('\u{feff}')
            .lines()
            .map(String::from)
            .collect())
    }
}

// Older deliveries are Latin-1 encoded, every byte maps to the same code point.
fn decode(contents: Vec<u8>) -> String {
    String::from_utf8(contents)
        .unwrap_or_else(|e| e.into_bytes().into_iter().map(char::from).collect())
}

/// The name of every file of a delivery.
#[derive(Clone, Debug)]
pub struct FileNames {
    pub delivery: String,
    pub attributes: String,
    pub timezones: String,
    pub countries: String,
    pub companies: String,
    pub stations: String,
    pub footnotes: String,
    pub transport_modes: String,
    pub timetable: String,
}

impl Default for FileNames {
    fn default() -> Self {
        Self {
            delivery: "delivery.dat".to_string(),
            attributes: "trnsattr.dat".to_string(),
            timezones: "timezone.dat".to_string(),
            countries: "country.dat".to_string(),
            companies: "company.dat".to_string(),
            stations: "stations.dat".to_string(),
            footnotes: "footnote.dat".to_string(),
            transport_modes: "trnsmode.dat".to_string(),
            timetable: "timetbls.dat".to_string(),
        }
    }
}
