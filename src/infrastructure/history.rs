//! Swap history persistence
//!
//! One JSON array file shared by every wallet of a run. The whole
//! read-append-rewrite cycle holds an async mutex, so concurrent runners in
//! this process cannot drop each other's appends; a second process writing
//! the same file is still last-writer-wins (best effort by design).

use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::warn;

use crate::shared::errors::HistoryError;
use crate::shared::types::SwapRecord;

pub struct HistoryLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl HistoryLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all records. A missing or unparsable file reads as empty so a
    /// corrupt log never blocks trading.
    async fn load_unlocked(&self) -> Vec<SwapRecord> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!("history file {} is unparsable ({}), starting over", self.path.display(), e);
                Vec::new()
            }
        }
    }

    pub async fn load(&self) -> Vec<SwapRecord> {
        let _guard = self.lock.lock().await;
        self.load_unlocked().await
    }

    /// Append one record: read the array, push, rewrite the file.
    pub async fn append(&self, record: SwapRecord) -> Result<(), HistoryError> {
        let _guard = self.lock.lock().await;
        let mut records = self.load_unlocked().await;
        records.push(record);
        let serialized = serde_json::to_string_pretty(&records)?;
        tokio::fs::write(&self.path, serialized).await?;
        Ok(())
    }

    /// Number of recorded swaps for one wallet.
    pub async fn count_for(&self, wallet: &str) -> usize {
        self.load()
            .await
            .iter()
            .filter(|r| r.wallet == wallet)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::pubkey::Pubkey;

    fn record(wallet: &Pubkey) -> SwapRecord {
        SwapRecord::new(
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            42,
            "sig",
            wallet,
        )
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("history.json"));
        assert!(log.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_appends_accumulate() {
        let dir = tempfile::tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("history.json"));
        let wallet = Pubkey::new_unique();
        log.append(record(&wallet)).await.unwrap();
        log.append(record(&wallet)).await.unwrap();

        let records = log.load().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].amount, 42);
    }

    #[tokio::test]
    async fn test_count_for_filters_by_wallet() {
        let dir = tempfile::tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("history.json"));
        let ours = Pubkey::new_unique();
        let theirs = Pubkey::new_unique();
        log.append(record(&ours)).await.unwrap();
        log.append(record(&theirs)).await.unwrap();
        log.append(record(&ours)).await.unwrap();

        assert_eq!(log.count_for(&ours.to_string()).await, 2);
        assert_eq!(log.count_for(&theirs.to_string()).await, 1);
    }

    #[tokio::test]
    async fn test_corrupt_file_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        tokio::fs::write(&path, "not json at all").await.unwrap();

        let log = HistoryLog::new(&path);
        assert!(log.load().await.is_empty());
        // A subsequent append replaces the corrupt content
        log.append(record(&Pubkey::new_unique())).await.unwrap();
        assert_eq!(log.load().await.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_appends_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let log = std::sync::Arc::new(HistoryLog::new(dir.path().join("history.json")));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let log = log.clone();
            handles.push(tokio::spawn(async move {
                log.append(record(&Pubkey::new_unique())).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(log.load().await.len(), 8);
    }
}
