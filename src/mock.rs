use crate::*;
use aws_sdk_s3::types::CompletedPart;
use futures::future::BoxFuture;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

/// One request as seen by the mock.
#[derive(Clone, Debug, PartialEq)]
pub enum Request {
    PutObject {
        bucket: String,
        key: String,
        body: Bytes,
    },
    CreateMultipartUpload {
        bucket: String,
        key: String,
    },
    UploadPart {
        upload_id: String,
        part_number: i32,
        body: Bytes,
    },
    CompleteMultipartUpload {
        upload_id: String,
        part_numbers: Vec<i32>,
    },
    AbortMultipartUpload {
        upload_id: String,
    },
}

fn fail<T>(what: &str) -> Result<T, Error> {
    Err(Error::AnyError {
        source: format!("mock: {} failed", what).into(),
    })
}

/// Records every request and succeeds, unless told to fail a given part, the single put, the
/// completion or the abort. Part uploads yield once before finishing, so several can be in
/// flight at the same time; the highest number seen is kept.
#[derive(Clone, Debug, Default)]
pub struct S3MockRecord {
    requests: Arc<Mutex<Vec<Request>>>,
    fail_part: Option<i32>,
    fail_put: bool,
    fail_complete: bool,
    fail_abort: bool,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}
impl S3MockRecord {
    pub fn new() -> S3MockRecord {
        S3MockRecord::default()
    }
    pub fn failing_part(part_number: i32) -> S3MockRecord {
        S3MockRecord {
            fail_part: Some(part_number),
            ..Default::default()
        }
    }
    pub fn failing_put() -> S3MockRecord {
        S3MockRecord {
            fail_put: true,
            ..Default::default()
        }
    }
    pub fn fail_complete(self) -> S3MockRecord {
        S3MockRecord {
            fail_complete: true,
            ..self
        }
    }
    pub fn fail_abort(self) -> S3MockRecord {
        S3MockRecord {
            fail_abort: true,
            ..self
        }
    }
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
    fn record(&self, request: Request) {
        self.requests.lock().unwrap().push(request);
    }
}

pub const UPLOAD_ID: &str = "mock-upload-id";

impl ObjectStore for S3MockRecord {
    fn put_object<'a>(
        &'a self,
        bucket: &'a str,
        key: &'a str,
        body: Bytes,
    ) -> BoxFuture<'a, Result<(), Error>> {
        self.record(Request::PutObject {
            bucket: bucket.into(),
            key: key.into(),
            body,
        });
        let fail_put = self.fail_put;
        Box::pin(async move {
            if fail_put {
                fail("put_object")
            } else {
                Ok(())
            }
        })
    }

    fn create_multipart_upload<'a>(
        &'a self,
        bucket: &'a str,
        key: &'a str,
    ) -> BoxFuture<'a, Result<String, Error>> {
        self.record(Request::CreateMultipartUpload {
            bucket: bucket.into(),
            key: key.into(),
        });
        Box::pin(async move { Ok(UPLOAD_ID.to_owned()) })
    }

    fn upload_part<'a>(
        &'a self,
        _bucket: &'a str,
        _key: &'a str,
        upload_id: &'a str,
        part_number: i32,
        body: Bytes,
    ) -> BoxFuture<'a, Result<CompletedPart, Error>> {
        self.record(Request::UploadPart {
            upload_id: upload_id.into(),
            part_number,
            body,
        });
        let failing = self.fail_part == Some(part_number);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        let in_flight = self.in_flight.clone();
        Box::pin(async move {
            tokio::task::yield_now().await;
            in_flight.fetch_sub(1, Ordering::SeqCst);
            if failing {
                fail("upload_part")
            } else {
                Ok(CompletedPart::builder()
                    .e_tag(format!("etag-{}", part_number))
                    .part_number(part_number)
                    .build())
            }
        })
    }

    fn complete_multipart_upload<'a>(
        &'a self,
        _bucket: &'a str,
        _key: &'a str,
        upload_id: &'a str,
        parts: Vec<CompletedPart>,
    ) -> BoxFuture<'a, Result<(), Error>> {
        self.record(Request::CompleteMultipartUpload {
            upload_id: upload_id.into(),
            part_numbers: parts.iter().filter_map(|p| p.part_number()).collect(),
        });
        let fail_complete = self.fail_complete;
        Box::pin(async move {
            if fail_complete {
                fail("complete_multipart_upload")
            } else {
                Ok(())
            }
        })
    }

    fn abort_multipart_upload<'a>(
        &'a self,
        _bucket: &'a str,
        _key: &'a str,
        upload_id: &'a str,
    ) -> BoxFuture<'a, Result<(), Error>> {
        self.record(Request::AbortMultipartUpload {
            upload_id: upload_id.into(),
        });
        let fail_abort = self.fail_abort;
        Box::pin(async move {
            if fail_abort {
                fail("abort_multipart_upload")
            } else {
                Ok(())
            }
        })
    }
}
