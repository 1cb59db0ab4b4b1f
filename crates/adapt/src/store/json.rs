use async_trait::async_trait;
use serde_json::Value as Json;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use super::{Collection, DocumentStore, Documents};
use crate::{Error, Result};

/// One `<collection>.json` array per collection under `dir`.
///
/// Every operation reads the file fresh and every mutation rewrites it
/// atomically. Operations are serialized per store; two processes pointed
/// at the same directory are last-write-wins.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, collection: Collection) -> PathBuf {
        self.dir.join(format!("{}.json", collection.as_str()))
    }

    async fn load(&self, collection: Collection) -> Result<Documents> {
        let path = self.path_for(collection);
        let raw = match fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Documents::default()),
            Err(e) => return Err(e.into()),
        };
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Documents::default());
        }
        match serde_json::from_slice::<Json>(&raw)? {
            Json::Array(docs) => Ok(Documents::from_vec(docs)),
            _ => Err(Error::store(format!(
                "{} does not hold a JSON array",
                path.display()
            ))),
        }
    }

    async fn persist(&self, collection: Collection, docs: &Documents) -> Result<()> {
        let data = serde_json::to_vec_pretty(docs.as_slice())?;
        write_atomic(&self.path_for(collection), &data).await
    }
}

/// Atomic write: write to .tmp, fsync, set 0600 (unix), rename.
#[tracing::instrument(skip_all)]
pub async fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("json.tmp");

    {
        let mut f = File::create(&tmp).await?;
        f.write_all(data).await?;
        f.sync_all().await?;
    }

    #[cfg(unix)]
    {
        fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600)).await?;
    }

    fs::rename(&tmp, path).await?;
    debug!("wrote {} bytes to {}", data.len(), path.display());
    Ok(())
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn create(&self, collection: Collection, record: Json) -> Result<String> {
        let _guard = self.lock.lock().await;
        let mut docs = self.load(collection).await?;
        let id = docs.insert(collection, record)?;
        self.persist(collection, &docs).await?;
        Ok(id)
    }

    async fn read(&self, collection: Collection, id: &str) -> Result<Option<Json>> {
        let _guard = self.lock.lock().await;
        Ok(self.load(collection).await?.get(id).cloned())
    }

    async fn update(&self, collection: Collection, id: &str, partial: Json) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut docs = self.load(collection).await?;
        docs.merge(collection, id, partial)?;
        self.persist(collection, &docs).await
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut docs = self.load(collection).await?;
        if docs.remove(id) {
            self.persist(collection, &docs).await?;
        }
        Ok(())
    }

    async fn list_all(&self, collection: Collection) -> Result<Vec<Json>> {
        let _guard = self.lock.lock().await;
        Ok(self.load(collection).await?.as_slice().to_vec())
    }
}
