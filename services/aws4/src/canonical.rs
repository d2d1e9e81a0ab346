//! Canonical form of a request as defined by SigV4.
//!
//! - [Create a canonical request](https://docs.aws.amazon.com/IAM/latest/UserGuide/create-signed-request.html#create-canonical-request)

use crate::constants::{AWS_QUERY_ENCODE_SET, RAW_PATH_ENCODE_SET, RAW_PATH_SAFE_SET};
use crate::endpoint::UriPolicy;
use crate::headers::Headers;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Query parameters in the order they appeared, values not escaped.
pub type Query = Vec<(String, String)>;

/// A raw request path split into its path and query parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPath {
    /// Path without query, escapes as given (after raw path normalization).
    pub path: String,
    /// `None` if the raw path had no `?` at all.
    pub query: Option<Query>,
}

impl ParsedPath {
    /// Parse a raw path as given by the caller.
    ///
    /// A path holding characters that are not allowed in a URI gets its
    /// escapes normalized and is re-escaped as UTF-8 before splitting.
    pub fn parse(raw: &str) -> Self {
        let raw = if raw.is_empty() { "/" } else { raw };
        let normalized = normalize_raw_path(raw);

        match normalized.split_once('?') {
            Some((path, query)) => Self {
                path: path.to_string(),
                query: Some(
                    form_urlencoded::parse(query.as_bytes())
                        .map(|(k, v)| (k.into_owned(), v.into_owned()))
                        .collect(),
                ),
            },
            None => Self {
                path: normalized.into_owned(),
                query: None,
            },
        }
    }

    /// Set `name` to `value`, replacing the first existing value in place.
    pub fn set_query(&mut self, name: &str, value: impl Into<String>) {
        let query = self.query.get_or_insert_with(Vec::new);
        let value = value.into();
        match query.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => query.push((name.to_string(), value)),
        }
    }

    /// Get the first value of `name` in the query.
    pub fn get_query(&self, name: &str) -> Option<&str> {
        self.query
            .as_ref()?
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Format the path the way it is sent on the wire.
    ///
    /// Query parameters are escaped strictly and grouped by name, names
    /// ordered by first appearance.
    pub fn format(&self) -> String {
        let Some(query) = &self.query else {
            return self.path.clone();
        };

        let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
        for (k, v) in query.iter().filter(|(k, v)| !(k.is_empty() && v.is_empty())) {
            match groups.iter_mut().find(|(name, _)| name == k) {
                Some((_, values)) => values.push(v),
                None => groups.push((k, vec![v])),
            }
        }

        let query = groups
            .iter()
            .flat_map(|(k, values)| values.iter().map(move |v| (*k, *v)))
            .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.path, query)
    }
}

/// Escape a path segment or query component with the SigV4 unreserved set.
pub fn encode(s: &str) -> String {
    utf8_percent_encode(s, &AWS_QUERY_ENCODE_SET).to_string()
}

/// Build the canonical URI of `path`.
///
/// `decode` unescapes every segment once before escaping it again, which is
/// always the case for S3 and optional for everything else.
pub fn canonical_uri(path: &str, policy: UriPolicy, decode: bool) -> String {
    if path.is_empty() || path == "/" {
        return "/".to_string();
    }

    let normalize = policy == UriPolicy::Strict;
    let path: Cow<str> = if normalize {
        Cow::Owned(collapse_slashes(path))
    } else {
        Cow::Borrowed(path)
    };

    let mut segments: Vec<String> = Vec::new();
    for piece in path.split('/') {
        if normalize && piece == ".." {
            segments.pop();
            continue;
        }
        if normalize && piece == "." {
            continue;
        }

        if decode {
            segments.push(encode(&decode_segment(piece)));
        } else {
            segments.push(encode(piece));
        }
    }

    let mut uri = segments.join("/");
    if !uri.starts_with('/') {
        uri.insert(0, '/');
    }
    if policy == UriPolicy::RawPreserving {
        uri = uri.replace("%2F", "/");
    }
    uri
}

/// Build the canonical query string.
///
/// Names and values are escaped strictly and sorted by name then value.
/// With `first_value_only` only the first value of each name is kept.
pub fn canonical_query(query: &[(String, String)], first_value_only: bool) -> String {
    let mut pairs: Vec<(String, String)> = Vec::with_capacity(query.len());
    for (k, v) in query {
        if k.is_empty() && v.is_empty() {
            continue;
        }
        let k = encode(k);
        if first_value_only && pairs.iter().any(|(name, _)| *name == k) {
            continue;
        }
        pairs.push((k, encode(v)));
    }
    pairs.sort();

    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Group headers by lower-cased name, values trimmed with inner whitespace
/// collapsed, repeated names keeping their insertion order.
fn group_headers(headers: &Headers) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (k, v) in headers.iter() {
        grouped
            .entry(k.to_ascii_lowercase())
            .or_default()
            .push(v.split_whitespace().collect::<Vec<_>>().join(" "));
    }
    grouped
}

/// Build the canonical headers block, one `name:value` line per header name.
///
/// The block is not terminated by a newline.
pub fn canonical_headers(headers: &Headers) -> String {
    group_headers(headers)
        .into_iter()
        .map(|(k, v)| format!("{k}:{}", v.join(",")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// List of signed header names, lower-cased, sorted and joined with `;`.
pub fn signed_headers(headers: &Headers) -> String {
    group_headers(headers)
        .into_keys()
        .collect::<Vec<_>>()
        .join(";")
}

/// Apply `encodeURI(decodeURI(path))` to paths holding characters a URI
/// can't carry.
fn normalize_raw_path(raw: &str) -> Cow<'_, str> {
    if raw.bytes().all(is_raw_path_safe) {
        return Cow::Borrowed(raw);
    }

    let decoded = decode_unreserved_escapes(raw);
    match String::from_utf8(decoded) {
        Ok(decoded) => Cow::Owned(encode_with(&decoded, &RAW_PATH_ENCODE_SET)),
        // Escapes that don't form valid UTF-8 stay as they are.
        Err(_) => Cow::Owned(encode_with(raw, &RAW_PATH_SAFE_SET)),
    }
}

fn encode_with(s: &str, set: &'static AsciiSet) -> String {
    utf8_percent_encode(s, set).to_string()
}

fn is_raw_path_safe(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b";,/?:@&=+$-_.!~*'()#%".contains(&b)
}

fn is_reserved(b: u8) -> bool {
    matches!(
        b,
        b';' | b'/' | b'?' | b':' | b'@' | b'&' | b'=' | b'+' | b'$' | b',' | b'#'
    )
}

/// Decode `%XX` escapes except those that stand for a reserved character.
fn decode_unreserved_escapes(raw: &str) -> Vec<u8> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());

    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(h), Some(l)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                let b = h << 4 | l;
                if is_reserved(b) {
                    out.extend_from_slice(&bytes[i..i + 3]);
                } else {
                    out.push(b);
                }
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

fn hex_value(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|v| v as u8)
}

fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    out
}

/// Unescape one path segment, `+` meaning space. Segments that don't decode
/// to UTF-8 are kept raw.
fn decode_segment(piece: &str) -> Cow<'_, str> {
    let replaced = piece.replace('+', " ");
    match percent_decode_str(&replaced).decode_utf8() {
        Ok(v) => Cow::Owned(v.into_owned()),
        Err(_) => Cow::Borrowed(piece),
    }
}
