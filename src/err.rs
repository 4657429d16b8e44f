use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::operation::abort_multipart_upload::AbortMultipartUploadError;
use aws_sdk_s3::operation::complete_multipart_upload::CompleteMultipartUploadError;
use aws_sdk_s3::operation::create_multipart_upload::CreateMultipartUploadError;
use aws_sdk_s3::operation::put_object::PutObjectError;
use aws_sdk_s3::operation::upload_part::UploadPartError;
use snafu::{Backtrace, Snafu};
use std::io;

#[derive(Snafu, Debug)]
#[snafu(visibility = "pub")]
pub enum Error {
    #[snafu(display("Io error: {}: {}", description, source))]
    Io {
        source: io::Error,
        description: String,
        backtrace: Backtrace,
    },
    #[snafu(display("No file to upload, pass one with -f <path>"))]
    MissingFile,
    #[snafu(display("{}", source))]
    Cli { source: clap::Error },

    #[snafu(display("Part size of {} bytes is below the S3 minimum of {} bytes", part_size, min))]
    PartSizeTooSmall { part_size: usize, min: usize },
    #[snafu(display(
        "Uploading {} bytes in parts of {} bytes needs {} parts, S3 allows at most {}",
        size,
        part_size,
        parts,
        max
    ))]
    TooManyParts {
        size: usize,
        part_size: usize,
        parts: usize,
        max: usize,
    },
    #[snafu(display("CreateMultipartUpload s3://{}/{} returned no upload id", bucket, key))]
    MissingUploadId { bucket: String, key: String },

    // AWS SDK Errors
    #[snafu(display("S3 'put object' error on s3://{}/{}: {}", bucket, key, DisplayErrorContext(source)))]
    PutObject {
        source: SdkError<PutObjectError>,
        bucket: String,
        key: String,
    },
    #[snafu(display(
        "S3 'create multipart upload' error on s3://{}/{}: {}",
        bucket,
        key,
        DisplayErrorContext(source)
    ))]
    CreateMultipartUpload {
        source: SdkError<CreateMultipartUploadError>,
        bucket: String,
        key: String,
    },
    #[snafu(display(
        "S3 'upload part' error on part {} of s3://{}/{}: {}",
        part_number,
        bucket,
        key,
        DisplayErrorContext(source)
    ))]
    UploadPart {
        source: SdkError<UploadPartError>,
        bucket: String,
        key: String,
        part_number: i32,
    },
    #[snafu(display(
        "S3 'complete multipart upload' error on s3://{}/{}: {}",
        bucket,
        key,
        DisplayErrorContext(source)
    ))]
    CompleteMultipartUpload {
        source: SdkError<CompleteMultipartUploadError>,
        bucket: String,
        key: String,
    },
    #[snafu(display(
        "S3 'abort multipart upload' error on s3://{}/{}: {}",
        bucket,
        key,
        DisplayErrorContext(source)
    ))]
    AbortMultipartUpload {
        source: SdkError<AbortMultipartUploadError>,
        bucket: String,
        key: String,
    },

    #[snafu(display("{}", source))]
    AnyError {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    /// Process exit code for this error when it reaches the top of the binary.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Cli { source } => source.exit_code(),
            _ => 1,
        }
    }
}

impl From<clap::Error> for Error {
    fn from(source: clap::Error) -> Self {
        Self::Cli { source }
    }
}
