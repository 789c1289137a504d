#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const FIELD_SEPARATOR: char = '\u{4}';

/// Joins values into one record line, keeping the trailing separator.
pub fn record(values: &[&str]) -> String {
    let mut line = String::new();
    for value in values {
        line.push_str(value);
        line.push(FIELD_SEPARATOR);
    }
    line
}

/// A record in the default 14-field layout.
#[derive(Debug, Clone)]
pub struct Rec {
    pub authors: String,
    pub genres: String,
    pub title: String,
    pub series: String,
    pub series_no: String,
    pub file: String,
    pub size: String,
    pub lib_id: String,
    pub deleted: String,
    pub ext: String,
    pub date: String,
    pub lang: String,
}

impl Rec {
    pub fn new(lib_id: &str, title: &str) -> Self {
        Rec {
            authors: "Doe,Jane:".to_string(),
            genres: "prose:".to_string(),
            title: title.to_string(),
            series: String::new(),
            series_no: "0".to_string(),
            file: lib_id.to_string(),
            size: "1024".to_string(),
            lib_id: lib_id.to_string(),
            deleted: "0".to_string(),
            ext: "fb2".to_string(),
            date: "2020-01-01".to_string(),
            lang: "en".to_string(),
        }
    }

    pub fn authors(mut self, authors: &str) -> Self {
        self.authors = authors.to_string();
        self
    }

    pub fn series(mut self, series: &str, number: i32) -> Self {
        self.series = series.to_string();
        self.series_no = number.to_string();
        self
    }

    pub fn date(mut self, date: &str) -> Self {
        self.date = date.to_string();
        self
    }

    pub fn deleted(mut self) -> Self {
        self.deleted = "1".to_string();
        self
    }

    pub fn line(&self) -> String {
        let values: [&str; 14] = [
            &self.authors,
            &self.genres,
            &self.title,
            &self.series,
            &self.series_no,
            &self.file,
            &self.size,
            &self.lib_id,
            &self.deleted,
            &self.ext,
            &self.date,
            &self.lang,
            "",
            "",
        ];
        record(&values)
    }
}

/// Builds `.inpx` archives for tests.
pub struct InpxBuilder {
    collection_info: Option<String>,
    version_info: Option<String>,
    structure_info: Option<String>,
    entries: Vec<(String, Vec<u8>)>,
}

impl InpxBuilder {
    pub fn new() -> Self {
        InpxBuilder {
            collection_info: Some("Test Library\ntest.inpx\n65536\nBooks for tests\n".to_string()),
            version_info: Some("20240101\n".to_string()),
            structure_info: None,
            entries: Vec::new(),
        }
    }

    pub fn collection_info(mut self, text: Option<&str>) -> Self {
        self.collection_info = text.map(str::to_string);
        self
    }

    pub fn version_info(mut self, text: Option<&str>) -> Self {
        self.version_info = text.map(str::to_string);
        self
    }

    pub fn structure(mut self, text: &str) -> Self {
        self.structure_info = Some(text.to_string());
        self
    }

    /// Adds a record file `<archive>.inp` with the given lines.
    pub fn inp(mut self, archive: &str, lines: &[String]) -> Self {
        let mut data = String::new();
        for line in lines {
            data.push_str(line);
            data.push_str("\r\n");
        }
        self.entries.push((format!("{}.inp", archive), data.into_bytes()));
        self
    }

    pub fn recs(self, archive: &str, recs: &[Rec]) -> Self {
        let lines: Vec<String> = recs.iter().map(Rec::line).collect();
        self.inp(archive, &lines)
    }

    pub fn entry(mut self, name: &str, data: &[u8]) -> Self {
        self.entries.push((name.to_string(), data.to_vec()));
        self
    }

    pub fn write(&self, path: &Path) -> PathBuf {
        let file = File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default();

        let control = [
            ("collection.info", &self.collection_info),
            ("version.info", &self.version_info),
            ("structure.info", &self.structure_info),
        ];
        for (name, text) in control {
            if let Some(text) = text {
                zip.start_file(name, options).unwrap();
                zip.write_all(text.as_bytes()).unwrap();
            }
        }
        for (name, data) in &self.entries {
            zip.start_file(name.as_str(), options).unwrap();
            zip.write_all(data).unwrap();
        }

        zip.finish().unwrap();
        path.to_path_buf()
    }
}
