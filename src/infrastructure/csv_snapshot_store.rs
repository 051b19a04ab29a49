// CSV snapshot store - Most recent fetch as a single overwritable file
//
// Layout: a `# captured_at=<RFC 3339>` line, then a header row matching the row
// attributes, then one record per row. Writes go to `<name>.csv.tmp` and are
// renamed into place, so readers never see a half-written file.

use crate::application::snapshot_store::{LoadError, SaveError, SnapshotStore};
use crate::domain::observation::Snapshot;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

const CAPTURED_AT_PREFIX: &str = "# captured_at=";

/// An absent optional value and an empty string are both an empty field, so
/// `Some("")` reads back as `None`. Fetchers never produce empty text.
pub struct CsvSnapshotStore<R> {
    path: PathBuf,
    _rows: PhantomData<fn() -> R>,
}

impl<R> CsvSnapshotStore<R> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _rows: PhantomData,
        }
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("csv.tmp")
    }
}

impl<R: Serialize> CsvSnapshotStore<R> {
    fn write_file(&self, target: &Path, snapshot: &Snapshot<R>) -> Result<(), SaveError> {
        let mut file = File::create(target)?;
        writeln!(
            file,
            "{}{}",
            CAPTURED_AT_PREFIX,
            snapshot
                .captured_at
                .to_rfc3339_opts(SecondsFormat::AutoSi, true)
        )?;

        let mut writer = csv::Writer::from_writer(file);
        for row in &snapshot.rows {
            writer
                .serialize(row)
                .map_err(|e| SaveError::Encode(e.to_string()))?;
        }
        writer.flush()?;

        let file = writer
            .into_inner()
            .map_err(|e| SaveError::Encode(e.to_string()))?;
        file.sync_all()?;
        Ok(())
    }
}

impl<R> SnapshotStore<R> for CsvSnapshotStore<R>
where
    R: Serialize + DeserializeOwned,
{
    fn save(&self, snapshot: &Snapshot<R>) -> Result<(), SaveError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.tmp_path();
        if let Err(e) = self.write_file(&tmp_path, snapshot) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            SaveError::Io(e)
        })?;

        tracing::debug!(
            "Saved {} rows to {}",
            snapshot.len(),
            self.path.display()
        );
        Ok(())
    }

    fn load(&self) -> Result<Snapshot<R>, LoadError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(LoadError::Missing),
            Err(e) => return Err(LoadError::Malformed(e.to_string())),
        };

        let (first_line, table) = content.split_once('\n').unwrap_or((content.as_str(), ""));
        let captured_at = first_line
            .trim_end_matches('\r')
            .strip_prefix(CAPTURED_AT_PREFIX)
            .ok_or_else(|| LoadError::Malformed("missing capture time line".to_string()))
            .and_then(|raw| {
                DateTime::parse_from_rfc3339(raw)
                    .map_err(|e| LoadError::Malformed(format!("bad capture time: {}", e)))
            })?
            .with_timezone(&Utc);

        let mut reader = csv::Reader::from_reader(table.as_bytes());
        let rows = reader
            .deserialize()
            .collect::<Result<Vec<R>, _>>()
            .map_err(|e| LoadError::Malformed(e.to_string()))?;

        Ok(Snapshot::with_capture_time(captured_at, rows))
    }
}
