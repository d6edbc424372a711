//! Now Lambda response types and the platform response seam.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use http::{HeaderMap, StatusCode};
use serde_derive::{Deserialize, Serialize};
use std::collections::HashMap;

/// What the adapter needs from the host's outgoing response.
///
/// The host accepts exactly one `write_head`, any number of `write`s and a
/// single `end`, which consumes the response and yields whatever the host
/// expects the function to return.
pub trait PlatformResponse {
    type Output;

    fn write_head(&mut self, status: StatusCode, headers: &HeaderMap);

    fn write(&mut self, chunk: &[u8]);

    fn end(self) -> Self::Output;
}

/// The response shape Now expects back from the Lambda function.
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NowResponse {
    pub status_code: u16,
    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub headers: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

/// Collects a response for Now and finalizes it into a [`NowResponse`].
#[derive(Debug, Default)]
pub struct ResponseWriter {
    status: StatusCode,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl PlatformResponse for ResponseWriter {
    type Output = NowResponse;

    fn write_head(&mut self, status: StatusCode, headers: &HeaderMap) {
        self.status = status;
        for name in headers.keys() {
            // Values may carry opaque bytes (e.g. UTF-8 filenames).
            let values: Vec<_> = headers
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()))
                .collect();
            self.headers.insert(name.as_str().to_owned(), values.join(", "));
        }
    }

    fn write(&mut self, chunk: &[u8]) {
        self.body.extend_from_slice(chunk);
    }

    fn end(self) -> NowResponse {
        let (body, encoding) = match String::from_utf8(self.body) {
            Ok(s) if s.is_empty() => (None, None),
            Ok(s) => (Some(s), None),
            Err(e) => (Some(STANDARD.encode(e.into_bytes())), Some("base64".to_owned())),
        };
        NowResponse {
            status_code: self.status.as_u16(),
            headers: self.headers,
            body,
            encoding,
        }
    }
}
