/// A chunk handed to `ServerResponse::finish`.
///
/// Handlers written against a streaming response may end it with text, raw
/// bytes or nothing at all. `Body` covers all three so `finish` can take any
/// of them through `Into<Body>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Body {
    /// No chunk
    #[default]
    Empty,
    /// Text, encoded as UTF-8 when buffered
    Text(String),
    /// Raw bytes
    Binary(Vec<u8>),
}

impl Body {
    /// Returns `true` when there are no bytes to buffer.
    pub fn is_empty(&self) -> bool {
        match self {
            Body::Empty => true,
            Body::Text(s) => s.is_empty(),
            Body::Binary(b) => b.is_empty(),
        }
    }

    /// The bytes to buffer; text is encoded as UTF-8.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Body::Empty => Vec::new(),
            Body::Text(s) => s.into_bytes(),
            Body::Binary(b) => b,
        }
    }
}

impl From<()> for Body {
    fn from(_: ()) -> Self {
        Body::Empty
    }
}

impl<B> From<Option<B>> for Body
where
    B: Into<Body>,
{
    fn from(b: Option<B>) -> Self {
        b.map(Into::into).unwrap_or_default()
    }
}

impl<'a> From<&'a str> for Body {
    fn from(s: &'a str) -> Self {
        Body::Text(s.into())
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::Text(s)
    }
}

impl<'a> From<&'a [u8]> for Body {
    fn from(b: &'a [u8]) -> Self {
        Body::Binary(b.to_vec())
    }
}

impl From<Vec<u8>> for Body {
    fn from(b: Vec<u8>) -> Self {
        Body::Binary(b)
    }
}
