use crate::err::Error;
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};
use std::fmt;

pub const ENV_ACCESS_KEY: &str = "ACCESSKEY";
pub const ENV_SECRET: &str = "SECRET";
pub const ENV_BUCKET: &str = "BUCKET";
pub const ENV_REGION: &str = "REGION";
pub const ENV_FOLDER: &str = "FOLDER";

pub const DEFAULT_REGION: &str = "us-east-1";
/// Uploads go to the root of the bucket unless `FOLDER` says otherwise.
pub const DEFAULT_FOLDER: &str = "/";

const MIB: usize = 1024 * 1024;
/// Memory reserved for parts that are in flight during a multipart upload.
pub const BUFFER_POOL_SIZE: usize = 256 * MIB;
/// 80 MiB, i.e. 83_886_080 bytes (about 83.9 MB).
pub const PART_SIZE: usize = 80 * MIB;
/// Smallest part size S3 accepts for all but the last part.
pub const MIN_PART_SIZE: usize = 5 * MIB;
/// Largest number of parts in one multipart upload.
pub const MAX_PARTS: usize = 10_000;

/// Where and as whom to upload. Read once at startup and never changed.
#[derive(Clone, PartialEq, Eq)]
pub struct S3Config {
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    /// Object key the file is stored under.
    pub folder: String,
}

impl S3Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable lookup. Unset and empty values are treated the
    /// same: `region` and `folder` fall back to their defaults, the rest stay empty.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.is_empty());
        Self {
            region: var(ENV_REGION).unwrap_or_else(|| DEFAULT_REGION.to_owned()),
            access_key: var(ENV_ACCESS_KEY).unwrap_or_default(),
            secret_key: var(ENV_SECRET).unwrap_or_default(),
            bucket: var(ENV_BUCKET).unwrap_or_default(),
            folder: var(ENV_FOLDER).unwrap_or_else(|| DEFAULT_FOLDER.to_owned()),
        }
    }

    /// Names of the required variables that have no value.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (ENV_ACCESS_KEY, &self.access_key),
            (ENV_SECRET, &self.secret_key),
            (ENV_BUCKET, &self.bucket),
        ]
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| *name)
        .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}

impl fmt::Debug for S3Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(value: &str) -> &'static str {
            if value.is_empty() {
                ""
            } else {
                "<redacted>"
            }
        }
        f.debug_struct("S3Config")
            .field("region", &self.region)
            .field("access_key", &redact(&self.access_key))
            .field("secret_key", &redact(&self.secret_key))
            .field("bucket", &self.bucket)
            .field("folder", &self.folder)
            .finish()
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(default))]
pub struct UploadConfig {
    /// Bytes of part data allowed in flight at once. Together with `part_size` this decides how
    /// many parts are uploaded concurrently.
    pub buffer_pool_size: usize,
    /// Size of every part but the last. Payloads no larger than this go up in a single request.
    pub part_size: usize,
}
impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            buffer_pool_size: BUFFER_POOL_SIZE,
            part_size: PART_SIZE,
        }
    }
}
impl UploadConfig {
    /// Number of parts uploaded simultaneously, never less than one.
    pub fn concurrency(&self) -> usize {
        (self.buffer_pool_size / self.part_size.max(1)).max(1)
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        snafu::ensure!(
            self.part_size >= MIN_PART_SIZE,
            crate::err::PartSizeTooSmall {
                part_size: self.part_size,
                min: MIN_PART_SIZE,
            }
        );
        Ok(())
    }
}
