use crate::constants::{AUTHORIZATION, X_AMZ_SECURITY_TOKEN};
use crate::headers::{Headers, TextValue};
use aws4_core::time::DateTime;
use aws4_core::{Error, Result};
use bytes::Bytes;
use http::header::HeaderName;
use http::request::Parts;
use http::{HeaderMap, HeaderValue, Method, Uri};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// SigningRequest describes the request to be signed.
///
/// Only `path` is required, everything else can be inferred. The signer takes
/// ownership of the request and hands it back with the signature applied.
///
/// ```
/// use aws4::SigningRequest;
///
/// let req = SigningRequest::new()
///     .with_service("sqs")
///     .with_region("us-west-2")
///     .with_path("/?Action=ListQueues");
/// assert_eq!(req.path, "/?Action=ListQueues");
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SigningRequest {
    /// HTTP method, `GET` (or `POST` with a body) if left empty.
    pub method: String,
    /// `http` or `https`, only used to tell whether a port is the default one.
    #[serde(alias = "protocol")]
    pub scheme: Option<String>,
    /// Host to send the request to.
    #[serde(alias = "host")]
    pub hostname: Option<String>,
    /// Port to send the request to.
    #[serde(deserialize_with = "deserialize_port")]
    pub port: Option<u16>,
    /// Raw path, may carry a query string.
    pub path: String,
    /// Query string appended to `path`.
    ///
    /// Described requests may give it as an object of names to values.
    #[serde(deserialize_with = "deserialize_query")]
    pub query: Option<String>,
    /// Request headers.
    pub headers: Headers,
    /// Request body.
    #[serde(deserialize_with = "deserialize_body")]
    pub body: Bytes,
    /// Signing name of the service, inferred from the hostname if missing.
    pub service: Option<String>,
    /// Signing region, inferred from the hostname if missing.
    pub region: Option<String>,
    /// Signing time, taken from the request or the clock if missing.
    #[serde(skip)]
    pub datetime: Option<DateTime>,
    /// Place the signature in the query string instead of `Authorization`.
    pub sign_query: bool,
    /// Sign the headers exactly as given.
    pub do_not_modify_headers: bool,
    /// Decode path segments before escaping them for the canonical path.
    pub do_not_encode_path: bool,
}

fn deserialize_body<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Bytes, D::Error> {
    Option::<String>::deserialize(deserializer).map(|v| v.map(Bytes::from).unwrap_or_default())
}

fn deserialize_port<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<u16>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u16),
        Str(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Int(v)) => Ok(Some(v)),
        Some(Raw::Str(v)) if v.is_empty() => Ok(None),
        Some(Raw::Str(v)) => v
            .parse()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid port {v:?}: {e}"))),
        None => Ok(None),
    }
}

fn deserialize_query<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Params(QueryParams),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Str(v)) => Some(v),
        Some(Raw::Params(v)) => Some(v.0),
        None => None,
    })
}

/// An object of query parameters, already serialized as a query string.
///
/// Values are strings, numbers or lists of those; a list repeats the name.
struct QueryParams(String);

impl<'de> Deserialize<'de> for QueryParams {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Values {
            One(TextValue),
            Many(Vec<TextValue>),
        }

        struct QueryParamsVisitor;

        impl<'de> Visitor<'de> for QueryParamsVisitor {
            type Value = QueryParams;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of query parameters")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<QueryParams, A::Error> {
                let mut query = form_urlencoded::Serializer::new(String::new());
                while let Some((k, v)) = map.next_entry::<String, Values>()? {
                    match v {
                        Values::One(v) => {
                            query.append_pair(&k, &v.0);
                        }
                        Values::Many(vs) => {
                            for v in vs {
                                query.append_pair(&k, &v.0);
                            }
                        }
                    }
                }
                Ok(QueryParams(query.finish()))
            }
        }

        deserializer.deserialize_map(QueryParamsVisitor)
    }
}

impl SigningRequest {
    /// Create an empty request for `/`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a request from an URL like `https://sqs.us-east-1.amazonaws.com/?Action=ListQueues`.
    pub fn from_url(url: &str) -> Result<Self> {
        let uri = Uri::from_str(url).map_err(|e| {
            Error::request_invalid(format!("url {url} is not valid")).with_source(e)
        })?;
        Ok(Self::from_uri(&uri))
    }

    fn from_uri(uri: &Uri) -> Self {
        Self {
            scheme: uri.scheme_str().map(str::to_string),
            hostname: uri.host().map(str::to_string),
            port: uri.port_u16(),
            path: uri
                .path_and_query()
                .map(|v| v.as_str().to_string())
                .unwrap_or_else(|| "/".to_string()),
            ..Default::default()
        }
    }

    /// Build a request from `http::request::Parts` and its body.
    pub fn from_parts(parts: &Parts, body: impl Into<Bytes>) -> Result<Self> {
        let mut req = Self::from_uri(&parts.uri);
        req.method = parts.method.as_str().to_string();
        req.body = body.into();

        for (name, value) in parts.headers.iter() {
            req.headers.append(name.as_str(), value.to_str()?);
        }
        Ok(req)
    }

    /// Write the request back into `http::request::Parts`.
    ///
    /// Method, uri and headers of `parts` are replaced.
    pub fn apply(self, parts: &mut Parts) -> Result<()> {
        if !self.method.is_empty() {
            parts.method = Method::from_bytes(self.method.as_bytes())?;
        }

        parts.uri = match &self.hostname {
            Some(hostname) => {
                let authority = match self.port {
                    Some(port) => format!("{hostname}:{port}"),
                    None => hostname.clone(),
                };
                Uri::builder()
                    .scheme(self.scheme.as_deref().unwrap_or("https"))
                    .authority(authority)
                    .path_and_query(self.path.as_str())
                    .build()?
            }
            None => Uri::from_str(&self.path)?,
        };

        let mut headers = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in self.headers.iter() {
            let name = HeaderName::from_bytes(name.as_bytes())?;
            let mut value = HeaderValue::from_str(value)?;
            if name.as_str().eq_ignore_ascii_case(AUTHORIZATION)
                || name.as_str().eq_ignore_ascii_case(X_AMZ_SECURITY_TOKEN)
            {
                value.set_sensitive(true);
            }
            headers.append(name, value);
        }
        parts.headers = headers;

        Ok(())
    }

    /// Set the HTTP method.
    pub fn with_method(mut self, method: &str) -> Self {
        self.method = method.to_string();
        self
    }

    /// Set the scheme, `http` or `https`.
    pub fn with_scheme(mut self, scheme: &str) -> Self {
        self.scheme = Some(scheme.to_string());
        self
    }

    /// Set the hostname.
    pub fn with_hostname(mut self, hostname: &str) -> Self {
        self.hostname = Some(hostname.to_string());
        self
    }

    /// Set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the raw path, query included.
    pub fn with_path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    /// Set a query string to append to the path.
    pub fn with_query(mut self, query: &str) -> Self {
        self.query = Some(query.to_string());
        self
    }

    /// Append a query parameter, `name` and `value` not escaped yet.
    pub fn with_query_param(mut self, name: &str, value: &str) -> Self {
        let query = self.query.take().unwrap_or_default();
        self.query = Some(
            form_urlencoded::Serializer::new(query)
                .append_pair(name, value)
                .finish(),
        );
        self
    }

    /// Append a header.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Set the body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Set the signing name of the service.
    pub fn with_service(mut self, service: &str) -> Self {
        self.service = Some(service.to_string());
        self
    }

    /// Set the signing region.
    pub fn with_region(mut self, region: &str) -> Self {
        self.region = Some(region.to_string());
        self
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.datetime = Some(time);
        self
    }

    /// Sign into the query string, producing a presigned url.
    pub fn with_sign_query(mut self, sign_query: bool) -> Self {
        self.sign_query = sign_query;
        self
    }

    /// Don't add any default headers before signing.
    pub fn with_do_not_modify_headers(mut self, v: bool) -> Self {
        self.do_not_modify_headers = v;
        self
    }

    /// Decode path segments before building the canonical path.
    pub fn with_do_not_encode_path(mut self, v: bool) -> Self {
        self.do_not_encode_path = v;
        self
    }
}

impl FromStr for SigningRequest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_url(s)
    }
}
