//! The S3 requests an upload is made of, behind a trait so the upload algorithm can run against
//! the real client or a mock.
use crate::config::S3Config;
use crate::err::{self, Error};
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use aws_sdk_s3::Client;
use bytes::Bytes;
use futures::future::{BoxFuture, Future, FutureExt};
use snafu::{OptionExt, ResultExt};

pub trait ObjectStore: Send + Sync {
    fn put_object<'a>(
        &'a self,
        bucket: &'a str,
        key: &'a str,
        body: Bytes,
    ) -> BoxFuture<'a, Result<(), Error>>;

    /// Returns the upload id.
    fn create_multipart_upload<'a>(
        &'a self,
        bucket: &'a str,
        key: &'a str,
    ) -> BoxFuture<'a, Result<String, Error>>;

    fn upload_part<'a>(
        &'a self,
        bucket: &'a str,
        key: &'a str,
        upload_id: &'a str,
        part_number: i32,
        body: Bytes,
    ) -> BoxFuture<'a, Result<CompletedPart, Error>>;

    fn complete_multipart_upload<'a>(
        &'a self,
        bucket: &'a str,
        key: &'a str,
        upload_id: &'a str,
        parts: Vec<CompletedPart>,
    ) -> BoxFuture<'a, Result<(), Error>>;

    fn abort_multipart_upload<'a>(
        &'a self,
        bucket: &'a str,
        key: &'a str,
        upload_id: &'a str,
    ) -> BoxFuture<'a, Result<(), Error>>;
}

impl ObjectStore for Client {
    fn put_object<'a>(
        &'a self,
        bucket: &'a str,
        key: &'a str,
        body: Bytes,
    ) -> BoxFuture<'a, Result<(), Error>> {
        async move {
            let len = body.len() as i64;
            self.put_object()
                .bucket(bucket)
                .key(key)
                .content_length(len)
                .body(ByteStream::from(body))
                .send()
                .await
                .context(err::PutObject { bucket, key })
                .map(drop)
        }
        .boxed()
    }

    fn create_multipart_upload<'a>(
        &'a self,
        bucket: &'a str,
        key: &'a str,
    ) -> BoxFuture<'a, Result<String, Error>> {
        async move {
            let output = self
                .create_multipart_upload()
                .bucket(bucket)
                .key(key)
                .send()
                .await
                .context(err::CreateMultipartUpload { bucket, key })?;
            output
                .upload_id()
                .map(str::to_owned)
                .context(err::MissingUploadId { bucket, key })
        }
        .boxed()
    }

    fn upload_part<'a>(
        &'a self,
        bucket: &'a str,
        key: &'a str,
        upload_id: &'a str,
        part_number: i32,
        body: Bytes,
    ) -> BoxFuture<'a, Result<CompletedPart, Error>> {
        async move {
            let len = body.len() as i64;
            let output = self
                .upload_part()
                .bucket(bucket)
                .key(key)
                .upload_id(upload_id)
                .part_number(part_number)
                .content_length(len)
                .body(ByteStream::from(body))
                .send()
                .await
                .context(err::UploadPart {
                    bucket,
                    key,
                    part_number,
                })?;
            Ok(CompletedPart::builder()
                .set_e_tag(output.e_tag().map(str::to_owned))
                .part_number(part_number)
                .build())
        }
        .boxed()
    }

    fn complete_multipart_upload<'a>(
        &'a self,
        bucket: &'a str,
        key: &'a str,
        upload_id: &'a str,
        parts: Vec<CompletedPart>,
    ) -> BoxFuture<'a, Result<(), Error>> {
        async move {
            self.complete_multipart_upload()
                .bucket(bucket)
                .key(key)
                .upload_id(upload_id)
                .multipart_upload(
                    CompletedMultipartUpload::builder()
                        .set_parts(Some(parts))
                        .build(),
                )
                .send()
                .await
                .context(err::CompleteMultipartUpload { bucket, key })
                .map(drop)
        }
        .boxed()
    }

    fn abort_multipart_upload<'a>(
        &'a self,
        bucket: &'a str,
        key: &'a str,
        upload_id: &'a str,
    ) -> BoxFuture<'a, Result<(), Error>> {
        async move {
            self.abort_multipart_upload()
                .bucket(bucket)
                .key(key)
                .upload_id(upload_id)
                .send()
                .await
                .context(err::AbortMultipartUpload { bucket, key })
                .map(drop)
        }
        .boxed()
    }
}

/// S3 client for `config.region`, signing with the static key pair from `config`.
///
/// The returned future does not borrow `config`.
pub fn s3_client(config: &S3Config) -> impl Future<Output = Client> {
    let credentials = Credentials::new(
        config.access_key.clone(),
        config.secret_key.clone(),
        None,
        None,
        "environment",
    );
    let region = Region::new(config.region.clone());
    async move {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .credentials_provider(credentials)
            .load()
            .await;
        Client::new(&sdk_config)
    }
}
