//! IG-008: Amazon S3 uploader.
//!
//! Credentials come from the SDK default chain (`AWS_ACCESS_KEY_ID`,
//! `AWS_SECRET_ACCESS_KEY`, profiles, ...). The region is taken from the
//! explicit setting when present, otherwise from `AWS_REGION`.

use super::{UploadError, Uploader};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3::primitives::ByteStream;
use std::path::Path;

const CREDENTIAL_ERROR_CODES: &[&str] = &[
    "InvalidAccessKeyId",
    "SignatureDoesNotMatch",
    "ExpiredToken",
    "InvalidToken",
    "AccessDenied",
];

/// S3-backed uploader.
#[derive(Debug, Clone)]
pub struct S3Uploader {
    client: aws_sdk_s3::Client,
}

impl S3Uploader {
    /// Build a client from the environment.
    pub async fn from_env(region: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(r) = region {
            loader = loader.region(Region::new(r.to_string()));
        }
        let sdk_config = loader.load().await;
        Self {
            client: aws_sdk_s3::Client::new(&sdk_config),
        }
    }
}

#[async_trait]
impl Uploader for S3Uploader {
    async fn upload(&self, path: &Path, bucket: &str, key: &str) -> Result<(), UploadError> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| UploadError::Read {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                let message = DisplayErrorContext(&e).to_string();
                let is_credentials = e
                    .code()
                    .map(|c| CREDENTIAL_ERROR_CODES.contains(&c))
                    .unwrap_or(false)
                    || message.contains("credentials");
                if is_credentials {
                    UploadError::Credentials(message)
                } else {
                    UploadError::Transport(message)
                }
            })?;

        Ok(())
    }
}
