//! # S3 single-file upload
//! Upload one local file to Amazon S3, with the target bucket, key and credentials taken from
//! the environment.
//!
//! - Read the configuration with `S3Config::from_env`.
//! - Read the file with `ObjectSource::load`.
//! - Upload the bytes with `Uploader::upload`, which picks a single `PutObject` or a multipart
//! upload depending on the payload size.
//!
//! The `upload` binary wraps this in a command line tool, see the `cli` module.

use futures::prelude::*;
use futures_stopwatch::try_stopwatch;
use snafu::{ensure, ResultExt};
use std::{ops::Range, path::PathBuf, time::Duration};
use tracing::{debug, info, warn};

pub use bytes::Bytes;

pub mod cli;
mod config;
pub mod err;
pub mod store;
mod upload;

pub use config::*;
pub use err::Error;
pub use store::{s3_client, ObjectStore};
pub use upload::*;

#[cfg(test)]
mod mock;

/// Managed upload client: uploads whole in-memory payloads through an [`ObjectStore`].
#[derive(Clone)]
pub struct Uploader<S> {
    s3: S,
    config: UploadConfig,
}
impl<S> Uploader<S> {
    pub fn new(s3: S) -> Self {
        Self {
            s3,
            config: UploadConfig::default(),
        }
    }
    pub fn with_config(s3: S, config: UploadConfig) -> Self {
        Self { s3, config }
    }
}

/// Result of one completed upload.
#[derive(Debug, Clone, Copy)]
pub struct UploadReport {
    /// Size of the payload in bytes
    pub size: u64,
    /// Number of parts of a multipart upload, `0` if the payload went up in a single request
    pub parts: usize,
    /// Time from the first request until the upload was complete
    pub total_time: Duration,
}
