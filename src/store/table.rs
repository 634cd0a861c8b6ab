//! CSV backing file with read-modify-rewrite append semantics.

use std::path::{Path, PathBuf};

use super::record::{Record, RecordStatus};
use super::StoreError;

const HEADERS: [&str; 9] = [
    "filename",
    "title",
    "abstract",
    "method",
    "objectives",
    "categories",
    "summary",
    "status",
    "processed_at",
];

/// The summary table on disk.
///
/// Every append reloads the whole file, adds the row and rewrites the file
/// from scratch. Rows are never updated or deleted, and duplicates are not
/// filtered. The `categories` column holds a JSON array string so the typed
/// list survives the round trip.
pub struct CsvTable {
    path: PathBuf,
}

impl CsvTable {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every row. A missing file is an empty table.
    pub fn load(&self) -> Result<Vec<Record>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            records.push(row_to_record(&row)?);
        }
        Ok(records)
    }

    /// Load, append one row, rewrite.
    pub fn append(&self, record: &Record) -> Result<(), StoreError> {
        let mut records = self.load()?;
        records.push(record.clone());
        self.rewrite(&records)
    }

    fn rewrite(&self, records: &[Record]) -> Result<(), StoreError> {
        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(HEADERS)?;
        for record in records {
            let categories = serde_json::to_string(&record.categories)?;
            writer.write_record([
                record.filename.as_str(),
                record.title.as_str(),
                record.abstract_text.as_str(),
                record.method.as_str(),
                record.objectives.as_str(),
                categories.as_str(),
                record.summary.as_str(),
                record.status.as_str(),
                record.processed_at.as_str(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn row_to_record(row: &csv::StringRecord) -> Result<Record, StoreError> {
    let field = |i: usize| row.get(i).unwrap_or("").to_string();

    let categories_raw = row.get(5).unwrap_or("");
    let categories: Vec<String> = if categories_raw.is_empty() {
        Vec::new()
    } else {
        serde_json::from_str(categories_raw)?
    };

    Ok(Record {
        filename: field(0),
        title: field(1),
        abstract_text: field(2),
        method: field(3),
        objectives: field(4),
        categories,
        summary: field(6),
        status: RecordStatus::parse(row.get(7).unwrap_or(""))?,
        processed_at: field(8),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(filename: &str) -> Record {
        Record {
            filename: filename.to_string(),
            title: "Sample Title".into(),
            abstract_text: "An abstract, with a comma.".into(),
            method: "method".into(),
            objectives: "objectives".into(),
            categories: vec!["ml".into(), "nlp".into()],
            summary: "summary".into(),
            status: RecordStatus::Ok,
            processed_at: "2025-01-01 12:00:00".into(),
        }
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let table = CsvTable::new(&dir.path().join("out.csv"));
        assert!(table.load().unwrap().is_empty());
    }

    #[test]
    fn append_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let table = CsvTable::new(&dir.path().join("out.csv"));

        table.append(&sample("a.pdf")).unwrap();
        table.append(&sample("b.pdf")).unwrap();

        let records = table.load().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].filename, "a.pdf");
        assert_eq!(records[1].filename, "b.pdf");
        assert_eq!(records[0].categories, vec!["ml", "nlp"]);
        assert_eq!(records[0].abstract_text, "An abstract, with a comma.");
    }

    #[test]
    fn duplicate_filenames_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let table = CsvTable::new(&dir.path().join("out.csv"));

        table.append(&sample("same.pdf")).unwrap();
        table.append(&sample("same.pdf")).unwrap();
        assert_eq!(table.load().unwrap().len(), 2);
    }

    #[test]
    fn empty_categories_survive_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let table = CsvTable::new(&dir.path().join("out.csv"));

        let mut record = sample("empty.pdf");
        record.categories = Vec::new();
        table.append(&record).unwrap();

        let records = table.load().unwrap();
        assert!(records[0].categories.is_empty());
    }

    #[test]
    fn header_is_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let table = CsvTable::new(&path);

        table.append(&sample("a.pdf")).unwrap();
        table.append(&sample("b.pdf")).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw.matches("filename,title").count(), 1);
    }

    #[test]
    fn corrupted_status_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(
            &path,
            "filename,title,abstract,method,objectives,categories,summary,status,processed_at\n\
             x.pdf,,,,,[],,bogus,\n",
        )
        .unwrap();

        let table = CsvTable::new(&path);
        assert!(matches!(
            table.load(),
            Err(StoreError::UnknownStatus(_))
        ));
    }
}
