use log::warn;
use std::sync::Arc;

use crate::{
    request::PlatformRequest,
    strmap::{HeaderValue, StrMap},
};

const JSON_CONTENT_TYPE: &str = "application/json";

/// The read-only view of an inbound request handed to a handler.
///
/// Method, url and headers are copied from the platform request when the
/// message is built. The body is left on the platform request and only
/// materialized by [`IncomingMessage::array_buffer`].
#[derive(Clone)]
pub struct IncomingMessage {
    method: String,
    url: String,
    headers: StrMap,
    request: Arc<dyn PlatformRequest>,
}

impl IncomingMessage {
    pub fn new<P>(request: P) -> Self
    where
        P: PlatformRequest + 'static,
    {
        IncomingMessage {
            method: request.method().unwrap_or("GET").to_owned(),
            url: request.url().unwrap_or_default().to_owned(),
            headers: request.headers().clone(),
            request: Arc::new(request),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &StrMap {
        &self.headers
    }

    /// Materializes the request body.
    ///
    /// Only requests with a single `application/json` content type carry a
    /// body; a list-valued content type counts as none. The platform's parsed
    /// value is re-serialized to JSON text. Anything that cannot produce a
    /// usable JSON object or array yields an empty buffer, never an error.
    pub fn array_buffer(&self) -> Vec<u8> {
        let is_json = matches!(
            self.headers.get_value("content-type"),
            Some(HeaderValue::One(ct)) if ct.starts_with(JSON_CONTENT_TYPE)
        );
        if !is_json {
            return Vec::new();
        }

        let value = match self.request.parsed_body() {
            Ok(Some(value)) if value.is_object() || value.is_array() => value,
            Ok(_) => return Vec::new(),
            Err(e) => {
                warn!("discarding unreadable request body: {}", e);
                return Vec::new();
            }
        };

        serde_json::to_vec(&value).unwrap_or_else(|e| {
            warn!("discarding request body that failed to serialize: {}", e);
            Vec::new()
        })
    }
}

impl std::fmt::Debug for IncomingMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IncomingMessage")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::BodyError, request::NowRequest};
    use serde_json::{json, Value};

    /// A platform request whose parsed body is fixed up front.
    struct Fixture {
        headers: StrMap,
        body: Option<Value>,
        malformed: bool,
    }

    impl Fixture {
        fn new(content_type: Option<&str>, body: Option<Value>) -> Self {
            Fixture {
                headers: content_type
                    .map(|ct| ("content-type", ct))
                    .into_iter()
                    .collect(),
                body,
                malformed: false,
            }
        }
    }

    impl PlatformRequest for Fixture {
        fn method(&self) -> Option<&str> {
            None
        }

        fn url(&self) -> Option<&str> {
            None
        }

        fn headers(&self) -> &StrMap {
            &self.headers
        }

        fn parsed_body(&self) -> Result<Option<Value>, BodyError> {
            if self.malformed {
                return Err(serde_json::from_str::<Value>("{").unwrap_err().into());
            }
            Ok(self.body.clone())
        }
    }

    #[test]
    fn defaults_method_and_url() {
        let msg = IncomingMessage::new(Fixture::new(None, None));
        assert_eq!(msg.method(), "GET");
        assert_eq!(msg.url(), "");
    }

    #[test]
    fn copies_request_line_and_headers() {
        let req = NowRequest {
            method: Some("POST".into()),
            path: Some("/api/interactions?x=1".into()),
            headers: vec![
                ("content-type", HeaderValue::from("application/json")),
                ("accept", HeaderValue::Many(vec!["a".into(), "b".into()])),
            ]
            .into_iter()
            .collect(),
            ..NowRequest::default()
        };
        let msg = IncomingMessage::new(req);
        assert_eq!(msg.method(), "POST");
        assert_eq!(msg.url(), "/api/interactions?x=1");
        assert_eq!(msg.headers().get("content-type"), Some("application/json"));
        assert_eq!(msg.headers().get_all("accept"), vec!["a", "b"]);
    }

    #[test]
    fn json_body_is_reserialized() {
        let msg = IncomingMessage::new(Fixture::new(Some("application/json"), Some(json!({"a": 1}))));
        assert_eq!(msg.array_buffer(), br#"{"a":1}"#.to_vec());
    }

    #[test]
    fn json_with_charset_is_accepted() {
        let msg = IncomingMessage::new(Fixture::new(
            Some("application/json; charset=utf-8"),
            Some(json!([1, 2])),
        ));
        assert_eq!(msg.array_buffer(), b"[1,2]".to_vec());
    }

    #[test]
    fn non_json_content_type_has_no_body() {
        let msg = IncomingMessage::new(Fixture::new(Some("text/plain"), Some(json!({"a": 1}))));
        assert!(msg.array_buffer().is_empty());

        let msg = IncomingMessage::new(Fixture::new(None, Some(json!({"a": 1}))));
        assert!(msg.array_buffer().is_empty());
    }

    #[test]
    fn list_content_type_has_no_body() {
        let mut fixture = Fixture::new(None, Some(json!({"a": 1})));
        fixture.headers = vec![(
            "content-type",
            HeaderValue::Many(vec!["application/json".into()]),
        )]
        .into_iter()
        .collect();
        assert!(IncomingMessage::new(fixture).array_buffer().is_empty());
    }

    #[test]
    fn scalar_or_missing_body_is_empty() {
        for body in vec![None, Some(Value::Null), Some(json!("text")), Some(json!(3))] {
            let msg = IncomingMessage::new(Fixture::new(Some("application/json"), body));
            assert!(msg.array_buffer().is_empty());
        }
    }

    #[test]
    fn malformed_body_is_absorbed() {
        let mut fixture = Fixture::new(Some("application/json"), None);
        fixture.malformed = true;
        assert!(IncomingMessage::new(fixture).array_buffer().is_empty());

        let req = NowRequest {
            headers: vec![("content-type", "application/json")].into_iter().collect(),
            body: Some("{\"a\":".into()),
            ..NowRequest::default()
        };
        assert!(IncomingMessage::new(req).array_buffer().is_empty());
    }
}
