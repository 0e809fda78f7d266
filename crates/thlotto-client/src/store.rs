use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use serde::Serialize as _;

use crate::models::{Dataset, PrizeCategory};

pub mod lock;

pub use lock::InstanceLock;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Dataset file {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to read dataset file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write dataset file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize dataset: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Draw {date} already exists in {category}")]
    DuplicateDate {
        category: PrizeCategory,
        date: String,
    },
}

/// JSON file holding the full [`Dataset`].
#[derive(Debug, Clone)]
pub struct DrawStore {
    path: PathBuf,
}

impl DrawStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the dataset. A missing file is an empty dataset.
    pub fn load(&self) -> Result<Dataset, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!(
                    "No dataset at {}, starting empty",
                    self.path.display()
                );
                return Ok(Dataset::empty());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let mut dataset: Dataset =
            serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;

        if dataset.metadata.total_draws != dataset.total_draws() {
            log::warn!(
                "Dataset metadata claims {} draws but {} holds {}, recomputing",
                dataset.metadata.total_draws,
                PrizeCategory::CANONICAL,
                dataset.total_draws()
            );
            dataset.refresh_metadata();
        }

        log::debug!(
            "Loaded {} draws from {}",
            dataset.total_draws(),
            self.path.display()
        );
        Ok(dataset)
    }

    /// Like [`Self::load`], but a corrupt file is moved aside and replaced
    /// by an empty dataset. Read failures are still returned: falling back
    /// there would let the next save overwrite data we could not see.
    pub fn load_or_empty(&self) -> Result<Dataset, StoreError> {
        match self.load() {
            Err(StoreError::Corrupt { path, source }) => {
                let backup = self.corrupt_backup_path();
                log::error!(
                    "Dataset {} is corrupt ({source}); moving it to {} and starting empty",
                    path.display(),
                    backup.display()
                );
                fs::rename(&path, &backup).map_err(|source| StoreError::Write {
                    path: backup.clone(),
                    source,
                })?;
                Ok(Dataset::empty())
            }
            other => other,
        }
    }

    /// Write the dataset atomically: serialise to a sibling temp file, sync,
    /// then rename over the target.
    pub fn save(&self, dataset: &Dataset) -> Result<(), StoreError> {
        let bytes = to_pretty_json(dataset)?;
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let tmp = self.temp_path();
        let result = (|| {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
            fs::rename(&tmp, &self.path)
        })();

        if let Err(e) = result {
            if tmp.exists() {
                if let Err(e) = fs::remove_file(&tmp) {
                    log::warn!("Failed to remove temp file {}: {e}", tmp.display());
                }
            }
            return Err(write_err(e));
        }

        log::info!(
            "Saved {} draws to {}",
            dataset.total_draws(),
            self.path.display()
        );
        Ok(())
    }

    /// Take the single-writer lock for this dataset.
    pub fn lock(&self) -> anyhow::Result<InstanceLock> {
        InstanceLock::acquire(self.sibling("lock"))
    }

    fn temp_path(&self) -> PathBuf {
        self.sibling("tmp")
    }

    fn corrupt_backup_path(&self) -> PathBuf {
        let stamp = chrono::Utc::now().format("%Y%m%d%H%M%S");
        self.sibling(&format!("corrupt-{stamp}"))
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "dataset.json".into());
        name.push(".");
        name.push(suffix);
        self.path.with_file_name(name)
    }
}

/// Four-space indented JSON, matching the published dataset files.
fn to_pretty_json(dataset: &Dataset) -> Result<Vec<u8>, StoreError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    dataset.serialize(&mut ser).map_err(StoreError::Serialize)?;
    buf.push(b'\n');
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DrawRecord;

    fn sample_dataset() -> anyhow::Result<Dataset> {
        let mut dataset = Dataset::empty();
        dataset.append(
            PrizeCategory::First,
            DrawRecord {
                date: "16/12/2568".to_owned(),
                numbers: vec!["123456".to_owned()],
            },
        )?;
        dataset.append(
            PrizeCategory::Second,
            DrawRecord {
                date: "16/12/2568".to_owned(),
                numbers: vec!["000001".to_owned(), "654321".to_owned()],
            },
        )?;
        Ok(dataset)
    }

    #[test]
    fn missing_file_loads_empty() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = DrawStore::new(dir.path().join("nope.json"));
        let dataset = store.load()?;
        assert_eq!(dataset.total_draws(), 0);
        assert_eq!(dataset.categories().count(), 6);
        Ok(())
    }

    #[test]
    fn save_then_load_round_trips() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = DrawStore::new(dir.path().join("data").join("lotto.json"));
        let dataset = sample_dataset()?;

        store.save(&dataset)?;
        assert!(!store.temp_path().exists(), "temp file must be renamed away");

        let loaded = store.load()?;
        for category in PrizeCategory::ALL {
            assert_eq!(loaded.category(category), dataset.category(category));
        }
        assert_eq!(loaded.metadata, dataset.metadata);
        Ok(())
    }

    #[test]
    fn saved_file_has_expected_shape() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = DrawStore::new(dir.path().join("lotto.json"));
        store.save(&sample_dataset()?)?;

        let text = fs::read_to_string(store.path())?;
        assert!(text.starts_with("{\n    \"metadata\""), "four-space indent expected");

        let value: serde_json::Value = serde_json::from_str(&text)?;
        assert_eq!(value["metadata"]["totalDraws"], 1);
        assert_eq!(value["metadata"]["dateRange"]["from"], "16/12/2568");
        for key in [
            "prizeFirst",
            "prizeFirstNear",
            "prizeSecond",
            "prizeThird",
            "prizeForth",
            "prizeFifth",
        ] {
            assert!(value[key]["draws"].is_array(), "{key} missing");
            assert!(value[key]["name"].is_string());
            assert!(value[key]["reward"].is_string());
        }
        assert_eq!(value["prizeSecond"]["draws"][0]["numbers"][0], "000001");
        Ok(())
    }

    #[test]
    fn corrupt_file_is_reported() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("lotto.json");
        fs::write(&path, "{ not json")?;
        let store = DrawStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Corrupt { .. })));
        Ok(())
    }

    #[test]
    fn wrong_shape_is_corrupt() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("lotto.json");
        fs::write(&path, r#"{ "prizeFirst": { "draws": "nope" } }"#)?;
        let store = DrawStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Corrupt { .. })));
        Ok(())
    }

    #[test]
    fn corrupt_file_falls_back_to_empty_and_is_kept() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("lotto.json");
        fs::write(&path, "garbage")?;
        let store = DrawStore::new(&path);

        let dataset = store.load_or_empty()?;
        assert_eq!(dataset.total_draws(), 0);
        assert!(!path.exists());

        let backups: Vec<_> = fs::read_dir(dir.path())?
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().contains(".corrupt-"))
            .collect();
        assert_eq!(backups.len(), 1, "corrupt file must be preserved");
        Ok(())
    }

    #[test]
    fn write_failure_is_surfaced() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        // A directory where the file should go makes the rename fail.
        let path = dir.path().join("lotto.json");
        fs::create_dir(&path)?;
        fs::write(path.join("keep"), "x")?;
        let store = DrawStore::new(&path);
        assert!(matches!(
            store.save(&Dataset::empty()),
            Err(StoreError::Write { .. })
        ));
        Ok(())
    }
}
