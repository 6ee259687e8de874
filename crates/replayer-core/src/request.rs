//! Request descriptor: what one target sends and how its results are read.
//!
//! The descriptor is immutable. It builds an identical form POST for every
//! attempt, decides success from the first line of the response body, and
//! hands attempt failures to its error policy.

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use std::borrow::Cow;
use std::sync::Arc;
use url::Url;

use crate::replay::{
    AlwaysRetry, AttemptError, ErrorPolicy, HttpResponse, MarkerPolicy, Outcome,
    PreparedRequest, SuccessPolicy, FORM_CONTENT_TYPE,
};
use crate::targets::TargetRecord;

/// "Succeeded". Present on the first response line once the target accepted the request.
pub const DEFAULT_SUCCESS_MARKER: &str = "成功";

/// Column width of the label in log lines.
pub const DEFAULT_LABEL_WIDTH: usize = 15;

#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    label: String,
    destination: Url,
    payload: Vec<u8>,
    success_policy: Arc<dyn SuccessPolicy>,
    label_width: usize,
    error_policy: Arc<dyn ErrorPolicy>,
}

impl RequestDescriptor {
    pub fn new(label: impl Into<String>, destination: Url, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            label: label.into(),
            destination,
            payload: payload.into(),
            success_policy: Arc::new(MarkerPolicy::new(DEFAULT_SUCCESS_MARKER)),
            label_width: DEFAULT_LABEL_WIDTH,
            error_policy: Arc::new(AlwaysRetry),
        }
    }

    /// Descriptor for a target record. Fails if the record's URL is not absolute.
    pub fn from_target(target: &TargetRecord) -> Result<Self, url::ParseError> {
        Ok(Self::new(
            target.name.clone(),
            target.destination()?,
            target.content.as_bytes(),
        ))
    }

    pub fn with_success_marker(self, marker: impl Into<String>) -> Self {
        self.with_success_policy(Arc::new(MarkerPolicy::new(marker)))
    }

    pub fn with_success_policy(mut self, policy: Arc<dyn SuccessPolicy>) -> Self {
        self.success_policy = policy;
        self
    }

    pub fn with_label_width(mut self, width: usize) -> Self {
        self.label_width = width;
        self
    }

    pub fn with_error_policy(mut self, policy: Arc<dyn ErrorPolicy>) -> Self {
        self.error_policy = policy;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn destination(&self) -> &Url {
        &self.destination
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// POST to the destination with `Referer` set to the destination and the
    /// payload sent verbatim as a form body. Some servers check the Referer.
    pub fn build_request(&self) -> PreparedRequest {
        PreparedRequest {
            url: self.destination.clone(),
            headers: vec![
                ("Referer".to_string(), self.destination.to_string()),
                ("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()),
            ],
            body: self.payload.clone(),
        }
    }

    /// Hands the first body line to the success policy (by default: `Stop`
    /// iff it contains the success marker). A first line that is not valid
    /// text is an attempt error for the engine to classify.
    pub fn classify_response(&self, response: &HttpResponse) -> Result<Outcome, AttemptError> {
        let line = decode_first_line(response)?;
        tracing::debug!("{} HTTP {}", self.padded_label(), response.status);
        tracing::info!("{} {}", self.padded_label(), line);
        Ok(self.success_policy.classify(&line))
    }

    pub fn classify_exception(&self, err: &AttemptError) -> Outcome {
        tracing::warn!("{} {} {}", self.padded_label(), err.kind(), err);
        self.error_policy.classify(err)
    }

    fn padded_label(&self) -> String {
        fit_label(&self.label, self.label_width)
    }
}

/// First body line, decoded with the `Content-Type` charset (UTF-8 when
/// missing or unknown; a BOM overrides both). For ASCII-compatible charsets
/// the bytes after the first line break are never decoded.
pub fn decode_first_line(response: &HttpResponse) -> Result<Cow<'_, str>, AttemptError> {
    let declared = response
        .charset()
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    let (encoding, bom_len) = Encoding::for_bom(&response.body).unwrap_or((declared, 0));
    let body = &response.body[bom_len..];

    if encoding == UTF_16LE || encoding == UTF_16BE {
        // Line breaks are two bytes wide here; decode first, then split.
        let (text, _) = encoding.decode_without_bom_handling(body);
        return Ok(Cow::Owned(first_line(&text).to_string()));
    }

    let end = body
        .iter()
        .position(|&b| b == b'\n' || b == b'\r')
        .unwrap_or(body.len());
    encoding
        .decode_without_bom_handling_and_without_replacement(&body[..end])
        .ok_or(AttemptError::Decode {
            charset: encoding.name(),
        })
}

/// Text up to the first line break (`\n`, `\r\n` or `\r`), or all of it.
pub fn first_line(text: &str) -> &str {
    match text.find(|c: char| c == '\r' || c == '\n') {
        Some(end) => &text[..end],
        None => text,
    }
}

/// Left-aligns `label` in a column of `width` characters, truncating longer labels.
pub fn fit_label(label: &str, width: usize) -> String {
    format!("{:<width$.width$}", label, width = width)
}
