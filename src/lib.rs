#![doc = include_str!("../README.md")]
mod error;
mod iff;
mod models;
mod parsing;
mod source;
mod storage;
mod timetable;
mod utils;

pub use error::{IffError, IffResult};
pub use iff::Iff;
pub use models::*;
pub use parsing::error::{ExpectedType, ParsingError};
pub use source::{FileNames, IffSource};
pub use storage::{DataStorage, ResourceStorage};
pub use timetable::{ServiceList, Timetable, TimetableEntry};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::{fs::File, io::Write, path::Path};
    use test_log::test;
    use zip::write::SimpleFileOptions;

    const IDENTIFICATION: &str = "@100,01012018,10012018,0001,Test delivery";

    fn delivery_files() -> Vec<(&'static str, Vec<&'static str>)> {
        vec![
            ("delivery.dat", vec![]),
            ("trnsattr.dat", vec!["NIIN,0000,Niet instappen"]),
            ("timezone.dat", vec!["#0000", "+01,09122017,24032018"]),
            ("country.dat", vec!["NL  ,1,Nederland"]),
            (
                "company.dat",
                vec!["100,ns        ,NS                            ,0400"],
            ),
            ("trnsmode.dat", vec!["IC  ,Intercity", "SPR ,Sprinter"]),
            (
                "footnote.dat",
                vec!["#00001", "1111111111", "#00002", "0000000000"],
            ),
            (
                "stations.dat",
                vec![
                    "1,rtd    ,03,05,NL  ,0000,  ,092050,437150,Rotterdam Centraal",
                    "1,ut     ,03,05,NL  ,0000,  ,136240,455840,Utrecht Centraal",
                    "1,gv     ,03,05,NL  ,0000,  ,081210,455350,Den Haag Centraal",
                ],
            ),
            (
                "timetbls.dat",
                vec![
                    "#00000001",
                    "%100,02735,      ,001,002,",
                    "-00001,000,999",
                    "&IC  ,001,002",
                    ">rtd    ,1200",
                    "?1    ,1    ,00001",
                    "<ut     ,1240",
                    "?5    ,5    ,00001",
                    "#00000002",
                    "%100,05735,      ,001,003,",
                    "-00001,000,999",
                    "&SPR ,001,003",
                    ">gv     ,1130",
                    "+rtd    ,1150,1152",
                    "<ut     ,1230",
                    "#00000003",
                    "%100,07735,      ,001,002,",
                    "-00002,000,999",
                    "&SPR ,001,002",
                    ">rtd    ,1100",
                    "<gv     ,1120",
                ],
            ),
        ]
    }

    fn contents(lines: &[&str]) -> String {
        std::iter::once(IDENTIFICATION)
            .chain(lines.iter().copied())
            .map(|line| format!("{line}\r\n"))
            .collect()
    }

    fn write_directory(path: &Path) {
        for (file, lines) in delivery_files() {
            std::fs::write(path.join(file), contents(&lines)).unwrap();
        }
    }

    fn date(day: u32, month: u32, year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn assert_delivery(iff: &Iff) {
        let data_storage = iff.data_storage();
        assert_eq!(data_storage.delivery().company_number(), 100);
        assert_eq!(data_storage.stations().len(), 3);
        assert_eq!(data_storage.footnotes().len(), 2);
        assert_eq!(data_storage.services().len(), 3);

        let rtd = data_storage.stations().find("rtd").unwrap();
        assert_eq!(rtd.offset_on(date(1, 1, 2018)), Some(1));
        assert_eq!(rtd.country().unwrap().name(), "Nederland");

        let timetable = data_storage
            .services()
            .timetable_stops_at(date(1, 1, 2018), rtd);
        let lines: Vec<_> = timetable
            .iter()
            .map(|entry| entry.service().to_string())
            .collect();
        // 7735 never runs.
        assert_eq!(
            lines,
            vec![
                "NS Sprinter 5735 to Utrecht Centraal",
                "NS Intercity 2735 to Utrecht Centraal",
            ]
        );
        assert_eq!(timetable.entries()[1].stop().platform(), Some("1"));
    }

    #[test(tokio::test)]
    async fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_directory(dir.path());

        let iff = Iff::new(IffSource::directory(dir.path())).await.unwrap();
        assert_delivery(&iff);
    }

    #[test(tokio::test)]
    async fn load_from_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("iff.zip");
        let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());
        for (file, lines) in delivery_files() {
            writer.start_file(file, SimpleFileOptions::default()).unwrap();
            writer.write_all(contents(&lines).as_bytes()).unwrap();
        }
        writer.finish().unwrap();

        let iff = Iff::new(IffSource::archive(&path)).await.unwrap();
        assert_delivery(&iff);
    }

    #[test(tokio::test)]
    async fn custom_file_names() {
        let dir = tempfile::tempdir().unwrap();
        write_directory(dir.path());
        std::fs::rename(dir.path().join("timetbls.dat"), dir.path().join("timetable.dat")).unwrap();

        let source = IffSource::directory(dir.path());
        assert!(Iff::new(source.clone()).await.is_err());

        let names = FileNames {
            timetable: "timetable.dat".to_string(),
            ..Default::default()
        };
        let iff = Iff::with_file_names(source, names).await.unwrap();
        assert_delivery(&iff);
    }

    #[test(tokio::test)]
    async fn delivery_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        write_directory(dir.path());
        std::fs::write(
            dir.path().join("country.dat"),
            "@100,01012018,10012018,0002,Test delivery\r\nNL  ,1,Nederland\r\n",
        )
        .unwrap();

        match Iff::new(IffSource::directory(dir.path())).await {
            Err(IffError::DeliveryMismatch { file }) => assert_eq!(file, "country.dat"),
            other => panic!("Expected DeliveryMismatch but got {other:?}"),
        }
    }

    #[test(tokio::test)]
    async fn parsing_error_locates_the_line() {
        let dir = tempfile::tempdir().unwrap();
        write_directory(dir.path());
        std::fs::write(
            dir.path().join("timetbls.dat"),
            contents(&["#00000001", "%100,02735,      ,001,002,", "?1    ,1    ,00001"]),
        )
        .unwrap();

        match Iff::new(IffSource::directory(dir.path())).await {
            Err(IffError::Parsing {
                error: ParsingError::ProtocolViolation(_),
                file,
                line,
                line_number,
            }) => {
                assert_eq!(file, "timetbls.dat");
                assert_eq!(line, "?1    ,1    ,00001");
                assert_eq!(line_number, 4);
            }
            other => panic!("Expected a parsing error but got {other:?}"),
        }
    }
}
