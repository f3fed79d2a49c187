//! Flat-file persistence.
//!
//! Each store is a single JSON object holding one array of records under a
//! fixed key. Every mutation reads the whole document, changes it in memory
//! and writes it back. A per-file mutex serializes those cycles inside this
//! process; nothing coordinates separate processes sharing a file, so there
//! the last writer wins.
//!
//! Records are decoded one by one. A record that does not decode is skipped on
//! reads but written back verbatim, and a file that is not a JSON document at
//! all is moved aside before the first write replaces it.

pub mod todo;
pub mod user;

use std::{
    io::ErrorKind,
    marker::PhantomData,
    path::{Path, PathBuf},
};

use chrono::Utc;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{fs, sync::Mutex};

use crate::error::Result;

pub use todo::TodoStore;
pub use user::UserStore;

pub struct JsonFile<R> {
    path: PathBuf,
    key: &'static str,
    write_lock: Mutex<()>,
    _record: PhantomData<fn() -> R>,
}

enum Loaded {
    Document(Map<String, Value>),
    Corrupt,
}

impl<R> JsonFile<R>
where
    R: Serialize + DeserializeOwned,
{
    /// Opens the document at `path` whose records live under `key`, creating
    /// an empty one (and any missing parent directories) if the file does not
    /// exist yet.
    pub async fn open(path: impl Into<PathBuf>, key: &'static str) -> Result<Self> {
        let path = path.into();

        match fs::metadata(&path).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).await?;
                }
                let mut document = Map::new();
                document.insert(key.to_string(), Value::Array(Vec::new()));
                write_atomic(&path, &Value::Object(document)).await?;
                tracing::info!("created empty store at {}", path.display());
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Self {
            path,
            key,
            write_lock: Mutex::new(()),
            _record: PhantomData,
        })
    }

    /// Reads every record that decodes. A missing or unparsable file reads as
    /// empty.
    pub async fn read(&self) -> Result<Vec<R>> {
        match self.load().await? {
            Loaded::Document(document) => Ok(self.decode(&document).0),
            Loaded::Corrupt => Ok(Vec::new()),
        }
    }

    /// Runs one read-modify-write cycle. `mutate` sees the decoded records and
    /// the raw entries that did not decode. Nothing is written if it fails.
    pub async fn update<T>(
        &self,
        mutate: impl FnOnce(&mut Vec<R>, &[Value]) -> Result<T>,
    ) -> Result<T> {
        let _guard = self.write_lock.lock().await;

        let (mut document, corrupt) = match self.load().await? {
            Loaded::Document(document) => (document, false),
            Loaded::Corrupt => (Map::new(), true),
        };

        let (mut records, mut entries) = self.decode(&document);
        let result = mutate(&mut records, &entries)?;

        if corrupt {
            self.quarantine().await?;
        }

        for record in &records {
            entries.push(serde_json::to_value(record)?);
        }
        document.insert(self.key.to_string(), Value::Array(entries));
        write_atomic(&self.path, &Value::Object(document)).await?;

        Ok(result)
    }

    async fn load(&self) -> Result<Loaded> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Loaded::Document(Map::new())),
            Err(e) => return Err(e.into()),
        };

        let document = match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(document)) => document,
            Ok(_) => {
                tracing::warn!("store {} is not a JSON object", self.path.display());
                return Ok(Loaded::Corrupt);
            }
            Err(e) => {
                tracing::warn!("store {} is not valid JSON: {}", self.path.display(), e);
                return Ok(Loaded::Corrupt);
            }
        };

        match document.get(self.key) {
            None | Some(Value::Array(_)) => Ok(Loaded::Document(document)),
            Some(_) => {
                tracing::warn!("store {}: `{}` is not an array", self.path.display(), self.key);
                Ok(Loaded::Corrupt)
            }
        }
    }

    /// Splits the record array into decoded records and the raw entries that
    /// failed to decode.
    fn decode(&self, document: &Map<String, Value>) -> (Vec<R>, Vec<Value>) {
        let mut records = Vec::new();
        let mut unreadable = Vec::new();

        if let Some(Value::Array(entries)) = document.get(self.key) {
            for (index, entry) in entries.iter().enumerate() {
                match R::deserialize(entry) {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        tracing::warn!(
                            "store {}: skipping unreadable record #{} ({})",
                            self.path.display(),
                            index,
                            e
                        );
                        unreadable.push(entry.clone());
                    }
                }
            }
        }

        (records, unreadable)
    }

    async fn quarantine(&self) -> Result<()> {
        let mut backup = self.path.as_os_str().to_owned();
        backup.push(format!(".corrupt-{}", Utc::now().format("%Y%m%dT%H%M%S%.f")));
        let backup = PathBuf::from(backup);

        fs::rename(&self.path, &backup).await?;
        tracing::warn!(
            "moved unreadable store {} to {}",
            self.path.display(),
            backup.display()
        );
        Ok(())
    }
}

async fn write_atomic(path: &Path, document: &Value) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(document)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, bytes).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}
