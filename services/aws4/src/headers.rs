use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// Headers is an ordered list of request headers.
///
/// Names keep the casing the caller gave them, lookups ignore case. The same
/// name may appear more than once; canonicalization joins those values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    /// Create an empty header list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of header entries, counting repeated names separately.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no headers.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the first value of `name`, ignoring case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if `name` is present, ignoring case.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set `name` to `value`.
    ///
    /// An existing entry keeps its position and casing; other entries with
    /// the same name are dropped. A new name is appended.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        match self.0.iter().position(|(k, _)| k.eq_ignore_ascii_case(&name)) {
            Some(idx) => {
                self.0[idx].1 = value;
                let mut i = 0;
                self.0.retain(|(k, _)| {
                    let keep = i <= idx || !k.eq_ignore_ascii_case(&name);
                    i += 1;
                    keep
                });
            }
            None => self.0.push((name, value)),
        }
    }

    /// Append another value for `name` without touching existing entries.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// Remove every entry of `name`, ignoring case.
    pub fn remove(&mut self, name: &str) {
        self.0.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for Headers {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HeadersVisitor;

        impl<'de> Visitor<'de> for HeadersVisitor {
            type Value = Headers;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of header names to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Headers, A::Error> {
                let mut headers = Headers::new();
                // Keep document order, duplicates included.
                while let Some((k, v)) = map.next_entry::<String, TextValue>()? {
                    headers.append(k, v.0);
                }
                Ok(headers)
            }
        }

        deserializer.deserialize_map(HeadersVisitor)
    }
}

/// Header and query values may be given as strings or numbers (`Content-Length`).
pub(crate) struct TextValue(pub(crate) String);

impl<'de> Deserialize<'de> for TextValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Str(String),
            Int(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Str(v) => TextValue(v),
            Raw::Int(v) => TextValue(v.to_string()),
        })
    }
}
