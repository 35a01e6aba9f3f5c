//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` so binaries prepare the directories the
//! JSON stores and blob store write into.

/// Ensure the data directory and blob root exist.
pub async fn ensure_env(data_dir: &str, blob_root: &str) -> anyhow::Result<()> {
    common::env::ensure_dirs(&[data_dir, blob_root]).await
}
