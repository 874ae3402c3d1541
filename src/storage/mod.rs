//! IG-008: Object storage archive of rendered artifacts.
//!
//! Upload is best-effort: [`upload_best_effort`] logs every failure and
//! reports it as an [`UploadOutcome`] so the pipeline can carry on to
//! provisioning.

pub mod s3;

use crate::core::types::UploadOutcome;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info, warn};

/// Errors from an upload attempt.
#[derive(Debug, Clone, Error)]
pub enum UploadError {
    #[error("cannot read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("credentials error: {0}")]
    Credentials(String),

    #[error("transport error: {0}")]
    Transport(String),
}

/// A remote object store.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Copy the bytes of `path` to `bucket/key`.
    async fn upload(&self, path: &Path, bucket: &str, key: &str) -> Result<(), UploadError>;
}

/// Object key for a file: `key` when given, else the file's base name.
pub fn object_key(path: &Path, key: Option<&str>) -> String {
    match key {
        Some(k) => k.to_string(),
        None => path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string()),
    }
}

/// Upload without propagating failure.
pub async fn upload_best_effort(
    uploader: &dyn Uploader,
    path: &Path,
    bucket: Option<&str>,
    key: Option<&str>,
) -> UploadOutcome {
    let Some(bucket) = bucket.filter(|b| !b.is_empty()) else {
        warn!("S3_BUCKET_NAME not set; skipping archive upload");
        return UploadOutcome::Skipped {
            reason: "no bucket configured".to_string(),
        };
    };

    let key = object_key(path, key);
    match uploader.upload(path, bucket, &key).await {
        Ok(()) => {
            info!(bucket, key = %key, "uploaded {}", path.display());
            UploadOutcome::Uploaded {
                bucket: bucket.to_string(),
                key,
            }
        }
        Err(e) => {
            error!(bucket, key = %key, "error uploading {}: {}", path.display(), e);
            UploadOutcome::Failed {
                reason: e.to_string(),
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::mock::MockUploader;
    use super::*;

    #[test]
    fn test_ig008_object_key_defaults_to_basename() {
        let key = object_key(Path::new("terraform/s3-20260101-1200.tf"), None);
        assert_eq!(key, "s3-20260101-1200.tf");
    }

    #[test]
    fn test_ig008_object_key_explicit() {
        let key = object_key(Path::new("terraform/s3.tf"), Some("archive/s3.tf"));
        assert_eq!(key, "archive/s3.tf");
    }

    #[tokio::test]
    async fn test_ig008_best_effort_success() {
        let uploader = MockUploader::default();
        let outcome =
            upload_best_effort(&uploader, Path::new("terraform/s3.tf"), Some("bucket"), None).await;
        assert_eq!(
            outcome,
            UploadOutcome::Uploaded {
                bucket: "bucket".to_string(),
                key: "s3.tf".to_string()
            }
        );
        assert_eq!(uploader.uploads.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ig008_best_effort_swallows_failure() {
        let uploader = MockUploader::failing(UploadError::Credentials("no credentials".into()));
        let outcome =
            upload_best_effort(&uploader, Path::new("terraform/s3.tf"), Some("bucket"), None).await;
        match outcome {
            UploadOutcome::Failed { reason } => assert!(reason.contains("no credentials")),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ig008_best_effort_skips_without_bucket() {
        let uploader = MockUploader::default();
        for bucket in [None, Some("")] {
            let outcome = upload_best_effort(&uploader, Path::new("a.tf"), bucket, None).await;
            assert!(matches!(outcome, UploadOutcome::Skipped { .. }));
        }
        assert!(uploader.uploads.lock().unwrap().is_empty());
    }
}
