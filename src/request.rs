//! Now Lambda request types and the platform request seam.
//!
//! Now invokes the function with a [`NowEvent`] whose `body` field is itself
//! a JSON encoded [`NowRequest`]. The request body arrives as a string,
//! optionally base64 encoded, and is only parsed as JSON when asked for.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_derive::{Deserialize, Serialize};
use serde_json::Value;

use crate::{error::BodyError, strmap::StrMap};

/// What the adapter needs from the host's incoming request.
pub trait PlatformRequest: Send + Sync {
    /// HTTP method, if the host reported one.
    fn method(&self) -> Option<&str>;

    /// Request target (path and query), if the host reported one.
    fn url(&self) -> Option<&str>;

    fn headers(&self) -> &StrMap;

    /// The host's pre-parsed body.
    ///
    /// `Ok(None)` means there was no body. `Err` means accessing it failed,
    /// e.g. the client sent malformed JSON.
    fn parsed_body(&self) -> Result<Option<Value>, BodyError>;
}

/// The envelope Now hands to the Lambda function.
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct NowEvent {
    #[serde(rename = "Action")]
    pub action: String,
    pub body: String,
}

/// The HTTP request carried inside a [`NowEvent`].
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct NowRequest {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub headers: StrMap,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
}

impl NowRequest {
    /// Raw body bytes, base64 decoded when the request says so.
    pub fn raw_body(&self) -> Result<Option<Vec<u8>>, BodyError> {
        match (&self.body, self.encoding.as_deref()) {
            (None, _) => Ok(None),
            (Some(b), Some("base64")) => Ok(Some(STANDARD.decode(b)?)),
            (Some(b), _) => Ok(Some(b.clone().into_bytes())),
        }
    }
}

impl PlatformRequest for NowRequest {
    fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    fn url(&self) -> Option<&str> {
        self.path.as_deref()
    }

    fn headers(&self) -> &StrMap {
        &self.headers
    }

    fn parsed_body(&self) -> Result<Option<Value>, BodyError> {
        match self.raw_body()? {
            Some(bytes) if !bytes.is_empty() => Ok(Some(serde_json::from_slice(&bytes)?)),
            _ => Ok(None),
        }
    }
}
