//! In-memory transport shared by the integration tests

#![allow(dead_code)]

use modfetch::{Body, FetchConfig, HttpError, Transport};
use std::collections::HashMap;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Mutex;

pub const API: &str = "https://api.test";

#[derive(Clone)]
enum Response {
    Body(Vec<u8>),
    Status(u16),
    /// Sends this many bytes, then the connection drops
    Truncated(usize),
}

/// Serves canned responses and records every request
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, Response>>,
    calls: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, url: &str, body: impl Into<Vec<u8>>) {
        self.insert(url, Response::Body(body.into()));
    }

    pub fn fail(&self, url: &str, status: u16) {
        self.insert(url, Response::Status(status));
    }

    pub fn truncate(&self, url: &str, after: usize) {
        self.insert(url, Response::Truncated(after));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn insert(&self, url: &str, response: Response) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), response);
    }

    fn respond(&self, url: &str) -> Result<Response, HttpError> {
        self.calls.lock().unwrap().push(url.to_string());
        match self.responses.lock().unwrap().get(url).cloned() {
            Some(Response::Status(status)) => Err(HttpError::Status {
                status,
                url: url.to_string(),
            }),
            None => Err(HttpError::Status {
                status: 404,
                url: url.to_string(),
            }),
            Some(other) => Ok(other),
        }
    }
}

impl Transport for MockTransport {
    fn get_text(&self, url: &str) -> Result<String, HttpError> {
        match self.respond(url)? {
            Response::Body(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            _ => Err(HttpError::Io(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "connection reset",
            ))),
        }
    }

    fn open(&self, url: &str) -> Result<Body, HttpError> {
        match self.respond(url)? {
            Response::Body(bytes) => Ok(Box::new(io::Cursor::new(bytes))),
            Response::Truncated(after) => Ok(Box::new(TruncatedBody { remaining: after })),
            Response::Status(status) => Err(HttpError::Status {
                status,
                url: url.to_string(),
            }),
        }
    }
}

struct TruncatedBody {
    remaining: usize,
}

impl Read for TruncatedBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "connection reset",
            ));
        }
        let n = buf.len().min(self.remaining);
        buf[..n].fill(b'x');
        self.remaining -= n;
        Ok(n)
    }
}

/// Settings rooted in a test directory, pointing at the mock API
pub fn test_config(dir: &Path) -> FetchConfig {
    FetchConfig::with_cache_root(dir.join("cache")).with_api_base(API)
}

pub fn release_json(tag: &str, assets: &[&str]) -> String {
    let assets: Vec<String> = assets
        .iter()
        .map(|name| {
            format!(
                r#"{{"name":"{}","browser_download_url":"https://dl.test/{}/{}"}}"#,
                name, tag, name
            )
        })
        .collect();
    format!(
        r#"{{"tag_name":"{}","url":"{}/releases/{}","assets":[{}]}}"#,
        tag,
        API,
        tag,
        assets.join(",")
    )
}
