use super::*;

impl<S: ObjectStore> Uploader<S> {
    /// Upload `body` to `s3://bucket/key`.
    ///
    /// Bodies no larger than `part_size` go up in one `PutObject` request. Larger bodies are
    /// split into `part_size` parts (the last one shorter) and sent as a multipart upload, with at
    /// most [`UploadConfig::concurrency`] parts in flight. Every part is a slice of `body`, so no
    /// part data is copied. If any part or the completion fails, the multipart upload is aborted
    /// and the first error is returned. Nothing is retried.
    pub async fn upload(&self, bucket: &str, key: &str, body: Bytes) -> Result<UploadReport, Error> {
        self.config.validate()?;
        let size = body.len();
        let part_size = self.config.part_size;
        info!(bucket, key, size, "upload started");

        let (parts, total_time) = try_stopwatch(async move {
            if size <= part_size {
                self.s3.put_object(bucket, key, body).await.map(|_| 0)
            } else {
                self.upload_multipart(bucket, key, body).await
            }
        })
        .await?;

        info!(bucket, key, size, parts, elapsed_ms = total_time.as_millis() as u64, "upload finished");
        Ok(UploadReport {
            size: size as u64,
            parts,
            total_time,
        })
    }

    async fn upload_multipart(&self, bucket: &str, key: &str, body: Bytes) -> Result<usize, Error> {
        let ranges = part_ranges(body.len(), self.config.part_size)?;
        let upload_id = self.s3.create_multipart_upload(bucket, key).await?;
        debug!(bucket, key, upload_id = upload_id.as_str(), parts = ranges.len(), "multipart upload created");

        let uploaded = {
            let (s3, upload_id, body) = (&self.s3, upload_id.as_str(), &body);
            stream::iter(ranges.into_iter().enumerate())
                .map(move |(i, range)| {
                    let part_number = i as i32 + 1;
                    debug!(part_number, start = range.start, end = range.end, "uploading part");
                    s3.upload_part(bucket, key, upload_id, part_number, body.slice(range))
                })
                .buffered(self.config.concurrency())
                .try_collect::<Vec<_>>()
                .await
        };

        let result = match uploaded {
            Ok(parts) => {
                let n = parts.len();
                self.s3
                    .complete_multipart_upload(bucket, key, &upload_id, parts)
                    .await
                    .map(|_| n)
            }
            Err(e) => Err(e),
        };

        if let Err(ref e) = result {
            warn!(bucket, key, upload_id = upload_id.as_str(), error = %e, "multipart upload failed, aborting");
            if let Err(abort) = self.s3.abort_multipart_upload(bucket, key, &upload_id).await {
                warn!(bucket, key, error = %abort, "aborting multipart upload failed");
            }
        }
        result
    }
}

/// Byte ranges of the parts a payload of `size` bytes is split into.
pub(crate) fn part_ranges(size: usize, part_size: usize) -> Result<Vec<Range<usize>>, Error> {
    let parts = (size + part_size - 1) / part_size;
    ensure!(
        parts <= MAX_PARTS,
        err::TooManyParts {
            size,
            part_size,
            parts,
            max: MAX_PARTS,
        }
    );
    Ok((0..size)
        .step_by(part_size)
        .map(|start| start..(start + part_size).min(size))
        .collect())
}

/// A local file to upload, and the key to store it under.
#[derive(Clone, Debug)]
pub struct ObjectSource {
    path: PathBuf,
    key: String,
}
impl ObjectSource {
    pub fn file(path: PathBuf, key: String) -> Self {
        Self { path, key }
    }
    /// The whole file as one contiguous buffer. The file is read in a single gulp, so a file
    /// larger than free memory cannot be uploaded.
    pub async fn load(&self) -> Result<Bytes, Error> {
        let path = &self.path;
        let data = tokio::fs::read(path).await.with_context(|| err::Io {
            description: path.display().to_string(),
        })?;
        debug!(path = %path.display(), size = data.len(), "file loaded");
        Ok(Bytes::from(data))
    }
    pub fn get_key(&self) -> &str {
        &self.key
    }
}
