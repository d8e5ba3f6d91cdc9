//! Persistence of the aggregated records

use crate::results::VideoRecord;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Serialize records as a pretty-printed JSON array. Non-ASCII text is kept as-is.
pub fn to_json_string(records: &[VideoRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Write records to `path`, creating parent directories as needed
pub fn write_json<P: AsRef<Path>>(path: P, records: &[VideoRecord]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let json = to_json_string(records)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;

    info!("Wrote {} videos to {}", records.len(), path.display());
    Ok(())
}
