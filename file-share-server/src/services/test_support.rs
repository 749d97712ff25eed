use std::path::Path;
use std::sync::Arc;
use actix_web::http::header;
use actix_web::test::TestRequest;
use actix_web::web;
use blob_store::LocalFileBlobStore;
use crate::services::AppState;

pub(crate) const BOUNDARY: &str = "----file-share-test-boundary";

pub(crate) struct Part<'a> {
    pub(crate) name: &'a str,
    pub(crate) filename: Option<&'a str>,
    pub(crate) content: &'a [u8],
}

impl<'a> Part<'a> {
    pub(crate) fn file(filename: &'a str, content: &'a [u8]) -> Self {
        Self { name: "file", filename: Some(filename), content }
    }

    pub(crate) fn text(name: &'a str, content: &'a str) -> Self {
        Self { name, filename: None, content: content.as_bytes() }
    }
}

pub(crate) fn test_state(upload_dir: &Path, max_upload_bytes: u64) -> web::Data<AppState> {
    let store = LocalFileBlobStore::open(upload_dir).unwrap();
    web::Data::new(AppState::new(Arc::new(store), max_upload_bytes))
}

pub(crate) fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let headers = match part.filename {
            Some(filename) => format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                part.name, filename
            ),
            None => format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name),
        };
        body.extend_from_slice(headers.as_bytes());
        body.extend_from_slice(part.content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub(crate) fn upload_request(parts: &[Part<'_>]) -> TestRequest {
    TestRequest::post()
        .uri("/upload")
        .insert_header((header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}")))
        .set_payload(multipart_body(parts))
}

pub(crate) fn stored_files(upload_dir: &Path) -> Vec<String> {
    std::fs::read_dir(upload_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}
