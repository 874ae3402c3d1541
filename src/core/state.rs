//! IG-005: Local persisted state: the parameter snapshot and artifact paths.
//!
//! The snapshot is a fixed-name JSON file overwritten on every run.
//! Artifacts are timestamp-qualified and accumulate in the output directory.

use super::types::RawParameters;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default snapshot file name.
pub const SNAPSHOT_FILE: &str = "variables.json";

/// Timestamp format embedded in artifact names.
pub const ARTIFACT_STAMP: &str = "%Y%m%d-%H%M";

/// Snapshot persistence failures.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid snapshot {}: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },
}

/// Derive the artifact path for a kind at a point in time:
/// `<output_dir>/<kind>-<YYYYMMDD-HHMM>.tf`.
pub fn artifact_path(output_dir: &Path, kind: &str, at: &DateTime<Local>) -> PathBuf {
    output_dir.join(format!("{}-{}.tf", kind, at.format(ARTIFACT_STAMP)))
}

/// Save the snapshot atomically (write to temp, then rename).
pub fn save_snapshot(path: &Path, params: &RawParameters) -> Result<(), SnapshotError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| SnapshotError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let json = serde_json::to_string_pretty(params).map_err(|e| SnapshotError::Invalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json).map_err(|source| SnapshotError::Write {
        path: tmp_path.clone(),
        source,
    })?;
    std::fs::rename(&tmp_path, path).map_err(|source| SnapshotError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

/// Load a snapshot. The file must hold a JSON object.
pub fn load_snapshot(path: &Path) -> Result<RawParameters, SnapshotError> {
    let content = std::fs::read_to_string(path).map_err(|source| SnapshotError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|e| SnapshotError::Invalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn params() -> RawParameters {
        json!({"region": "us-east-1", "name": "my-bucket"})
            .as_object()
            .unwrap()
            .clone()
    }

    #[test]
    fn test_ig005_artifact_path() {
        let at = Local.with_ymd_and_hms(2026, 3, 7, 9, 5, 59).unwrap();
        let p = artifact_path(Path::new("terraform"), "s3", &at);
        assert_eq!(p, PathBuf::from("terraform/s3-20260307-0905.tf"));
    }

    #[test]
    fn test_ig005_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SNAPSHOT_FILE);
        save_snapshot(&path, &params()).unwrap();

        let loaded = load_snapshot(&path).unwrap();
        assert_eq!(loaded, params());
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  \"region\": \"us-east-1\""));
    }

    #[test]
    fn test_ig005_atomic_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SNAPSHOT_FILE);
        save_snapshot(&path, &params()).unwrap();
        assert!(!dir.path().join("variables.json.tmp").exists());
        assert!(path.exists());
    }

    #[test]
    fn test_ig005_overwrites_previous() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SNAPSHOT_FILE);
        save_snapshot(&path, &params()).unwrap();
        let mut second = RawParameters::new();
        second.insert("name".to_string(), json!("other"));
        save_snapshot(&path, &second).unwrap();
        assert_eq!(load_snapshot(&path).unwrap(), second);
    }

    #[test]
    fn test_ig005_preserves_key_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SNAPSHOT_FILE);
        let mut ordered = RawParameters::new();
        ordered.insert("zeta".to_string(), json!("1"));
        ordered.insert("alpha".to_string(), json!("2"));
        save_snapshot(&path, &ordered).unwrap();
        let loaded = load_snapshot(&path).unwrap();
        let keys: Vec<_> = loaded.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_ig005_load_missing() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_snapshot(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(SnapshotError::Read { .. })));
    }

    #[test]
    fn test_ig005_load_not_an_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SNAPSHOT_FILE);
        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(load_snapshot(&path), Err(SnapshotError::Invalid { .. })));
    }
}
