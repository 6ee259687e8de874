//! HTTP transport seam and its libcurl implementation.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use url::Url;

use super::error::AttemptError;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A fully built POST, ready to hand to a transport. Built fresh for every attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl PreparedRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status, `Content-Type` and fully read body of one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u32,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// `charset` parameter of the `Content-Type` header, unquoted.
    pub fn charset(&self) -> Option<&str> {
        self.content_type
            .as_deref()?
            .split(';')
            .skip(1)
            .filter_map(|param| param.split_once('='))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("charset"))
            .map(|(_, value)| value.trim().trim_matches('"'))
    }
}

/// Sends one request and reads the whole response. Blocking; the engine
/// calls it from `spawn_blocking`.
pub trait Transport: Send + Sync {
    fn send(&self, request: &PreparedRequest) -> Result<HttpResponse, AttemptError>;
}

/// libcurl transport owning a single Easy handle, so connections are reused
/// across the attempts of one engine and never shared with other engines.
pub struct CurlTransport {
    easy: Mutex<curl::easy::Easy>,
    attempt_timeout: Duration,
    connect_timeout: Option<Duration>,
}

impl CurlTransport {
    pub fn new(attempt_timeout: Duration, connect_timeout: Option<Duration>) -> Self {
        Self {
            easy: Mutex::new(curl::easy::Easy::new()),
            attempt_timeout,
            connect_timeout,
        }
    }
}

impl Transport for CurlTransport {
    fn send(&self, request: &PreparedRequest) -> Result<HttpResponse, AttemptError> {
        // Every option is set again below, so a poisoned handle is still usable.
        let mut easy = self.easy.lock().unwrap_or_else(PoisonError::into_inner);
        easy.reset();

        easy.url(request.url.as_str())?;
        easy.post(true)?;
        easy.post_fields_copy(&request.body)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.timeout(self.attempt_timeout)?;
        if let Some(connect) = self.connect_timeout {
            easy.connect_timeout(connect)?;
        }

        let mut list = curl::easy::List::new();
        for (k, v) in &request.headers {
            list.append(&format!("{}: {}", k.trim(), v.trim()))?;
        }
        // Drop the headers libcurl would add on its own.
        list.append("Accept:")?;
        list.append("Expect:")?;
        easy.http_headers(list)?;

        let mut body = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        let content_type = easy.content_type()?.map(str::to_string);
        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}
