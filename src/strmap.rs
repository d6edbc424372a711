use serde_derive::{Deserialize, Serialize};
use std::{
    collections::{hash_map::Iter, HashMap},
    sync::Arc,
};

/// A header value as the platform reports it: a single string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum HeaderValue {
    One(String),
    Many(Vec<String>),
}

impl HeaderValue {
    /// The first value, if any.
    pub fn first(&self) -> Option<&str> {
        match self {
            HeaderValue::One(v) => Some(v),
            HeaderValue::Many(vs) => vs.first().map(String::as_str),
        }
    }

    /// Every value, in order.
    pub fn all(&self) -> Vec<&str> {
        match self {
            HeaderValue::One(v) => vec![v.as_str()],
            HeaderValue::Many(vs) => vs.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(v: &str) -> Self {
        HeaderValue::One(v.into())
    }
}

impl From<Vec<String>> for HeaderValue {
    fn from(vs: Vec<String>) -> Self {
        HeaderValue::Many(vs)
    }
}

/// A read-only view into a map of header names to string-or-list values.
///
/// Names are kept exactly as the platform sent them. Lookups try the exact
/// name first and fall back to an ASCII case-insensitive match.
#[derive(Default, Debug, PartialEq, Clone, Deserialize, Serialize)]
#[serde(transparent)]
pub struct StrMap(pub(crate) Arc<HashMap<String, HeaderValue>>);

impl StrMap {
    /// Return the first value for a name, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.lookup(key).and_then(HeaderValue::first)
    }

    /// Return every value for a name.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.lookup(key).map(HeaderValue::all).unwrap_or_default()
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Return the raw value for a name, keeping single and list values apart.
    pub fn get_value(&self, key: &str) -> Option<&HeaderValue> {
        self.lookup(key)
    }

    pub fn iter(&self) -> Iter<'_, String, HeaderValue> {
        self.0.iter()
    }

    fn lookup(&self, key: &str) -> Option<&HeaderValue> {
        self.0.get(key).or_else(|| {
            self.0
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(key))
                .map(|(_, value)| value)
        })
    }
}

impl From<HashMap<String, HeaderValue>> for StrMap {
    fn from(inner: HashMap<String, HeaderValue>) -> Self {
        StrMap(Arc::new(inner))
    }
}

impl<K, V> std::iter::FromIterator<(K, V)> for StrMap
where
    K: Into<String>,
    V: Into<HeaderValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        StrMap(Arc::new(
            iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        ))
    }
}
