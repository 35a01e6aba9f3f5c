//! Environment/runtime helpers
//!
//! Sanity checks to ensure writable data directories exist at startup.

use tracing::{debug, warn};

/// Create every directory in `dirs`, failing on the first one that cannot be created.
pub async fn ensure_dirs(dirs: &[&str]) -> anyhow::Result<()> {
    for dir in dirs {
        if dir.trim().is_empty() {
            warn!("skipping empty data directory entry");
            continue;
        }
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| anyhow::anyhow!("cannot create {dir}: {e}"))?;
        debug!(%dir, "data directory ready");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_nested_directories() -> anyhow::Result<()> {
        let base = std::env::temp_dir().join(format!("ensure_dirs_{}", std::process::id()));
        let nested = base.join("a/b");
        let nested_str = nested.to_string_lossy().to_string();
        ensure_dirs(&[nested_str.as_str(), ""]).await?;
        assert!(tokio::fs::metadata(&nested).await?.is_dir());
        let _ = tokio::fs::remove_dir_all(&base).await;
        Ok(())
    }
}
