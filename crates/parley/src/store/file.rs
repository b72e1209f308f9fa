//! File-based conversation store.
//!
//! Layout: `{root}/{user_id}/{conversation_id}.yaml`, one YAML document per
//! conversation. All writes are atomic (temp file + fsync + rename).

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use futures::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, warn};

use super::error::{StorageError, StorageResult};
use super::{ConversationId, ConversationRecord, ConversationStore, HistoryFeed};
use crate::auth::UserId;
use crate::llm::Message;

const EXTENSION: &str = "yaml";

/// Conversation store backed by a directory tree.
pub struct FileConversationStore {
    root: PathBuf,
    /// Per-user version counters, bumped after every write or delete of that
    /// user's documents; they drive history feeds.
    changes: Mutex<HashMap<UserId, watch::Sender<u64>>>,
}

impl FileConversationStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            changes: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn user_dir(&self, user: &UserId) -> PathBuf {
        user_dir(&self.root, user)
    }

    fn document_path(&self, user: &UserId, id: &ConversationId) -> PathBuf {
        self.user_dir(user).join(format!("{id}.{EXTENSION}"))
    }

    fn changes(&self, user: &UserId) -> watch::Sender<u64> {
        let mut changes = self.changes.lock().unwrap_or_else(PoisonError::into_inner);
        changes
            .entry(user.clone())
            .or_insert_with(|| watch::channel(0).0)
            .clone()
    }

    fn notify(&self, user: &UserId) {
        self.changes(user).send_modify(|version| *version += 1);
    }

    async fn write(&self, user: &UserId, record: &ConversationRecord) -> StorageResult<()> {
        let dir = self.user_dir(user);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StorageError::file_io(&dir, e))?;

        let yaml =
            serde_saphyr::to_string(record).map_err(|e| StorageError::Serialize(e.to_string()))?;
        let path = self.document_path(user, &record.id);
        atomic_write_file(&path, yaml.as_bytes()).await?;

        self.notify(user);
        debug!(user = %user, conversation = %record.id, "Saved conversation");
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for FileConversationStore {
    async fn create(
        &self,
        user: &UserId,
        messages: &[Message],
        model: &str,
    ) -> StorageResult<ConversationId> {
        let record =
            ConversationRecord::new(ConversationId::new(), model.to_string(), messages.to_vec());
        self.write(user, &record).await?;
        Ok(record.id)
    }

    async fn merge(
        &self,
        user: &UserId,
        id: &ConversationId,
        messages: &[Message],
        model: &str,
    ) -> StorageResult<()> {
        let record = match self.load(user, id).await? {
            Some(mut existing) => {
                existing.messages = messages.to_vec();
                existing.model = model.to_string();
                existing.updated_at = Utc::now();
                existing
            }
            None => ConversationRecord::new(*id, model.to_string(), messages.to_vec()),
        };
        self.write(user, &record).await
    }

    async fn load(
        &self,
        user: &UserId,
        id: &ConversationId,
    ) -> StorageResult<Option<ConversationRecord>> {
        let path = self.document_path(user, id);
        match read_record(&path).await {
            Ok(record) => Ok(Some(record)),
            Err(StorageError::FileIo { source, .. }) if source.kind() == ErrorKind::NotFound => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn list(&self, user: &UserId) -> StorageResult<Vec<ConversationRecord>> {
        list_records(&self.user_dir(user)).await
    }

    async fn delete(&self, user: &UserId, id: &ConversationId) -> StorageResult<bool> {
        let path = self.document_path(user, id);
        match fs::remove_file(&path).await {
            Ok(()) => {
                self.notify(user);
                debug!(user = %user, conversation = %id, "Deleted conversation");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::file_io(&path, e)),
        }
    }

    fn subscribe(&self, user: &UserId) -> HistoryFeed {
        let dir = self.user_dir(user);
        let changes = WatchStream::new(self.changes(user).subscribe());

        let feed = changes.then(move |_| {
            let dir = dir.clone();
            async move { list_records(&dir).await }
        });

        Box::pin(feed)
    }
}

fn user_dir(root: &Path, user: &UserId) -> PathBuf {
    root.join(user.as_str())
}

async fn read_record(path: &Path) -> StorageResult<ConversationRecord> {
    let contents = fs::read_to_string(path)
        .await
        .map_err(|e| StorageError::file_io(path, e))?;

    let record: ConversationRecord =
        serde_saphyr::from_str(&contents).map_err(|source| StorageError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    if !record.is_compatible() {
        return Err(StorageError::IncompatibleSchema {
            path: path.to_path_buf(),
            found: record.schema_version,
        });
    }

    Ok(record)
}

/// Read every document in a user directory, newest first.
///
/// Documents that fail to parse are skipped. A missing directory is an empty
/// listing.
async fn list_records(dir: &Path) -> StorageResult<Vec<ConversationRecord>> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StorageError::file_io(dir, e)),
    };

    let mut records = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| StorageError::file_io(dir, e))?
    {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
            continue;
        }

        match read_record(&path).await {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable conversation");
            }
        }
    }

    records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
    Ok(records)
}

/// Write data to a temp file, fsync it, then atomically rename to the final path.
///
/// The temp file name is generated internally using a ULID to avoid collisions
/// from concurrent writers targeting the same final path.
async fn atomic_write_file(final_path: &Path, data: &[u8]) -> StorageResult<()> {
    let file_name = final_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file");
    let temp_path = final_path.with_file_name(format!("{}.{}.tmp", file_name, ulid::Ulid::new()));

    let mut file = fs::File::create(&temp_path)
        .await
        .map_err(|e| StorageError::file_io(&temp_path, e))?;
    file.write_all(data)
        .await
        .map_err(|e| StorageError::file_io(&temp_path, e))?;
    file.sync_all()
        .await
        .map_err(|e| StorageError::file_io(&temp_path, e))?;
    fs::rename(&temp_path, final_path)
        .await
        .map_err(|e| StorageError::file_io(final_path, e))?;
    Ok(())
}
