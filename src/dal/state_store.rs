use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use crate::domain::cache_record::CacheRecord;

/// Where the last acted-upon signal is kept between runs.
///
/// A record that cannot be read is reported as absent.
pub trait StateStore: Send + Sync {
    fn load(&self) -> Option<CacheRecord>;
    fn save(&self, record: &CacheRecord) -> io::Result<()>;
}

pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStateStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temporary_path(&self) -> PathBuf {
        let mut file_name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        file_name.push(".tmp");
        self.path.with_file_name(file_name)
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> Option<CacheRecord> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                log::warn!(
                    "Could not read cache file {}, treating as empty. Error: {:?}",
                    self.path.display(),
                    e
                );
                return None;
            }
        };

        match content.parse::<CacheRecord>() {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Ignoring cache file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn save(&self, record: &CacheRecord) -> io::Result<()> {
        let temporary_path = self.temporary_path();
        fs::write(&temporary_path, record.to_string())?;
        fs::rename(&temporary_path, &self.path).inspect_err(|_| {
            fs::remove_file(&temporary_path).ok();
        })
    }
}

#[derive(Default)]
pub struct InMemoryStateStore {
    record: Mutex<Option<CacheRecord>>,
}

impl InMemoryStateStore {
    pub fn new(record: Option<CacheRecord>) -> Self {
        InMemoryStateStore {
            record: Mutex::new(record),
        }
    }
}

impl StateStore for InMemoryStateStore {
    fn load(&self) -> Option<CacheRecord> {
        match self.record.lock() {
            Ok(record) => *record,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn save(&self, record: &CacheRecord) -> io::Result<()> {
        match self.record.lock() {
            Ok(mut current) => *current = Some(*record),
            Err(poisoned) => *poisoned.into_inner() = Some(*record),
        }
        Ok(())
    }
}
