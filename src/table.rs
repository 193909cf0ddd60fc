use polars::prelude::*;
use rayon::prelude::*;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::domain::DashError;
use crate::records::{ProjectField, ProjectRecord, seed_records};

#[derive(Debug)]
enum FileType {
    CSV,
    PARQUET,
    ARROW,
}

/// The immutable list of projects the dashboard works on.
#[derive(Debug, Default)]
pub struct SourceList {
    name: String,
    records: Vec<ProjectRecord>,
}

impl SourceList {
    pub fn new(name: impl Into<String>, records: Vec<ProjectRecord>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }

    pub fn seed() -> Self {
        Self::new("projects", seed_records())
    }

    /// Load projects from a csv, parquet or arrow file.
    ///
    /// Columns are matched to fields by name, ignoring case. Missing
    /// columns and null cells become empty strings.
    pub fn load(path: &str) -> Result<Self, DashError> {
        let expanded = shellexpand::full(path)
            .map_err(|e| DashError::LoadingFailed(e.to_string()))?
            .into_owned();
        let path = PathBuf::from(expanded);
        Self::check_file(&path)?;

        let frame = match Self::detect_file_type(&path)? {
            FileType::CSV => Self::load_csv(&path)?,
            FileType::PARQUET => Self::load_parquet(&path)?,
            FileType::ARROW => Self::load_arrow(&path)?,
        };

        let start_time = Instant::now();
        let df = frame.collect()?;
        let records = Self::records_from_frame(&df)?;
        info!(
            "Loaded {} projects from {:?} in {}ms",
            records.len(),
            path,
            start_time.elapsed().as_millis()
        );

        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("???")
            .to_string();
        Ok(Self::new(name, records))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn records(&self) -> &[ProjectRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    // Each field is extracted in its own thread, then zipped into records.
    fn records_from_frame(df: &DataFrame) -> Result<Vec<ProjectRecord>, DashError> {
        let nrows = df.height();
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();

        let columns: Result<Vec<(ProjectField, Vec<String>)>, PolarsError> = ProjectField::ALL
            .par_iter()
            .map(|&field| -> Result<(ProjectField, Vec<String>), PolarsError> {
                let data = match names.iter().find(|n| n.eq_ignore_ascii_case(field.name())) {
                    Some(col_name) => Self::load_column(df, col_name)?,
                    None => {
                        warn!("Column \"{}\" missing, using empty values", field.name());
                        vec![String::new(); nrows]
                    }
                };
                Ok((field, data))
            })
            .collect();

        let mut records = vec![ProjectRecord::default(); nrows];
        for (field, data) in columns? {
            debug!("Field {}: {} rows", field, data.len());
            for (record, value) in records.iter_mut().zip(data) {
                record.set(field, value);
            }
        }
        Ok(records)
    }

    fn load_column(df: &DataFrame, col_name: &str) -> Result<Vec<String>, PolarsError> {
        let col = df.column(col_name)?.cast(&DataType::String)?;
        let series = col.str()?;
        Ok(series
            .into_iter()
            .map(|value| match value {
                Some(s) => s.replace("\r\n", " ").replace('\n', " "),
                None => String::new(),
            })
            .collect())
    }

    fn check_file(path: &Path) -> Result<(), DashError> {
        let metadata = fs::metadata(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => DashError::FileNotFound,
            ErrorKind::PermissionDenied => DashError::PermissionDenied,
            _ => DashError::IoError(e),
        })?;
        if !metadata.is_file() {
            return Err(DashError::LoadingFailed("Not a file!".into()));
        }
        Ok(())
    }

    fn detect_file_type(path: &Path) -> Result<FileType, DashError> {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_uppercase())
            .as_deref()
        {
            Some("CSV") => Ok(FileType::CSV),
            Some("PARQUET") | Some("PQ") => Ok(FileType::PARQUET),
            Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::ARROW),
            _ => Err(DashError::UnknownFileType),
        }
    }

    fn load_csv(path: &Path) -> Result<LazyFrame, PolarsError> {
        LazyCsvReader::new(PlPath::Local(path.into()))
            .with_has_header(true)
            .finish()
    }

    fn load_parquet(path: &Path) -> Result<LazyFrame, PolarsError> {
        LazyFrame::scan_parquet(PlPath::Local(path.into()), ScanArgsParquet::default())
    }

    fn load_arrow(path: &Path) -> Result<LazyFrame, PolarsError> {
        LazyFrame::scan_ipc(
            PlPath::Local(path.into()),
            polars::io::ipc::IpcScanOptions,
            UnifiedScanArgs::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> String {
        format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    #[test]
    fn seed_source_is_named_projects() {
        let source = SourceList::seed();
        assert_eq!(source.name(), "projects");
        assert_eq!(source.len(), 20);
    }

    #[test]
    fn load_csv_maps_columns_by_name() {
        let source = SourceList::load(&fixture("projects.csv")).unwrap();
        assert_eq!(source.name(), "projects.csv");
        assert_eq!(source.len(), 10);

        let first = &source.records()[0];
        assert_eq!(first.client, "Ava Thompson");
        assert_eq!(first.country, "US");
        assert_eq!(first.email, "ava.thompson@example.com");
        assert_eq!(first.progress, "75%");
        assert_eq!(first.date, "2024-03-12");
    }

    #[test]
    fn load_csv_missing_column_and_nulls_are_empty() {
        let source = SourceList::load(&fixture("projects_partial.csv")).unwrap();
        assert_eq!(source.len(), 3);
        assert!(source.records().iter().all(|r| r.image.is_empty()));
        assert_eq!(source.records()[1].status, "");
        assert_eq!(source.records()[1].client, "Lucas Martin");
    }

    #[test]
    fn load_rejects_missing_file() {
        assert!(matches!(
            SourceList::load(&fixture("does_not_exist.csv")),
            Err(DashError::FileNotFound)
        ));
    }

    #[test]
    fn load_rejects_unknown_extension() {
        assert!(matches!(
            SourceList::load(&fixture("projects.txt")),
            Err(DashError::UnknownFileType)
        ));
    }

    #[test]
    fn load_rejects_directories() {
        let dir = format!("{}/tests/fixtures", env!("CARGO_MANIFEST_DIR"));
        assert!(matches!(
            SourceList::load(&dir),
            Err(DashError::LoadingFailed(_))
        ));
    }

    #[test]
    fn detect_file_type_ignores_case() {
        assert!(matches!(
            SourceList::detect_file_type(Path::new("a.CSV")),
            Ok(FileType::CSV)
        ));
        assert!(matches!(
            SourceList::detect_file_type(Path::new("a.pq")),
            Ok(FileType::PARQUET)
        ));
        assert!(matches!(
            SourceList::detect_file_type(Path::new("a.feather")),
            Ok(FileType::ARROW)
        ));
    }
}
