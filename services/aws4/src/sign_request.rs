use crate::canonical::{
    canonical_headers, canonical_query, canonical_uri, signed_headers, ParsedPath,
};
use crate::constants::*;
use crate::endpoint::{Endpoint, ServiceKind};
use crate::key_cache::SigningKeyCache;
use crate::provide_credential::EnvCredentialProvider;
use crate::{Credential, SigningRequest};
use aws4_core::hash::{hex_hmac_sha256, hex_sha256};
use aws4_core::time::{format_iso8601, now, parse_rfc2822};
use aws4_core::{Context, Error, ProvideCredential, Result, SigningCredential};
use log::debug;
use std::sync::Arc;

/// RequestSigner that implement AWS SigV4.
///
/// The signer owns the request for its whole life: construction resolves the
/// endpoint, fills in `Host`, the method and the signing time, then adds the
/// headers or query parameters that take part in the signature. [`sign`]
/// hands the request back with the signature applied.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
///
/// [`sign`]: RequestSigner::sign
#[derive(Debug)]
pub struct RequestSigner {
    request: SigningRequest,
    credential: Credential,
    endpoint: Endpoint,
    parsed_path: ParsedPath,
    datetime: String,
    is_codecommit_git: bool,
    key_cache: Arc<SigningKeyCache>,
}

impl RequestSigner {
    /// Create a signer for `request` using `credential`.
    pub fn new(request: SigningRequest, credential: Credential) -> Self {
        let mut signer = Self::construct(request, credential);
        signer.prepare();
        signer
    }

    /// Create a signer that loads its credential from `provider`.
    pub fn from_provider<P>(ctx: &Context, request: SigningRequest, provider: &P) -> Result<Self>
    where
        P: ProvideCredential<Credential = Credential>,
    {
        let credential = provider
            .provide_credential(ctx)?
            .filter(|cred| cred.is_valid())
            .ok_or_else(|| {
                Error::credential_invalid(format!("no valid credential found by {provider:?}"))
            })?;
        Ok(Self::new(request, credential))
    }

    /// Use `cache` for signing keys instead of the process wide one.
    pub fn with_key_cache(mut self, cache: Arc<SigningKeyCache>) -> Self {
        self.key_cache = cache;
        self
    }

    fn construct(mut request: SigningRequest, credential: Credential) -> Self {
        request.hostname = request.hostname.filter(|v| !v.is_empty());
        if request.path.is_empty() {
            request.path = "/".to_string();
        }
        if let Some(query) = request.query.take() {
            let sep = if request.path.contains('?') { '&' } else { '?' };
            request.path = format!("{}{sep}{query}", request.path);
        }

        let endpoint = Endpoint::resolve(
            request.service.as_deref(),
            request.region.as_deref(),
            request.hostname.as_deref(),
        );
        debug!(
            "resolved endpoint: service {:?}, region {:?}",
            endpoint.service, endpoint.region
        );

        if request.method.is_empty() {
            request.method = if request.body.is_empty() { "GET" } else { "POST" }.to_string();
        }

        if !request.headers.contains(HOST) {
            let mut host = request
                .hostname
                .clone()
                .unwrap_or_else(|| endpoint.hostname());
            if let Some(port) = request.port {
                if Some(port) != default_port(request.scheme.as_deref()) {
                    host = format!("{host}:{port}");
                }
            }
            request.headers.insert(HOST, host);
        }
        if request.hostname.is_none() {
            request.hostname = request.headers.get(HOST).map(str::to_string);
        }

        let is_codecommit_git = endpoint.service == "codecommit" && request.method == "GIT";
        let parsed_path = ParsedPath::parse(&request.path);
        let datetime = Self::capture_datetime(&request, &parsed_path, is_codecommit_git);

        Self {
            request,
            credential,
            endpoint,
            parsed_path,
            datetime,
            is_codecommit_git,
            key_cache: SigningKeyCache::global(),
        }
    }

    /// Pick the signing time, first match wins:
    ///
    /// - the explicit time of the request
    /// - `X-Amz-Date` from the query (presign) or the headers, verbatim
    /// - the `Date` header
    /// - now
    fn capture_datetime(req: &SigningRequest, path: &ParsedPath, is_codecommit_git: bool) -> String {
        let given = if req.sign_query {
            path.get_query(X_AMZ_DATE)
        } else {
            req.headers.get(X_AMZ_DATE)
        };
        if let (None, Some(v)) = (req.datetime, given) {
            return v.to_string();
        }

        let time = req.datetime.unwrap_or_else(|| {
            match req.headers.get(DATE).map(parse_rfc2822) {
                Some(Ok(t)) => t,
                Some(Err(err)) => {
                    debug!("ignore unparsable date header: {err}");
                    now()
                }
                None => now(),
            }
        });

        let mut datetime = format_iso8601(time);
        // Git over CodeCommit signs without the zone designator.
        if is_codecommit_git {
            datetime.pop();
        }
        datetime
    }

    fn prepare(&mut self) {
        if self.request.sign_query {
            if let Some(token) = self.credential.session_token.clone() {
                self.parsed_path.set_query(X_AMZ_SECURITY_TOKEN, token);
            }
            if self.endpoint.kind == ServiceKind::S3
                && self.parsed_path.get_query(X_AMZ_EXPIRES).is_none()
            {
                self.parsed_path
                    .set_query(X_AMZ_EXPIRES, DEFAULT_EXPIRES_SECONDS.to_string());
            }
            if self.request.datetime.is_some() || self.parsed_path.get_query(X_AMZ_DATE).is_none() {
                self.parsed_path.set_query(X_AMZ_DATE, self.datetime.clone());
            }
            self.parsed_path.set_query(X_AMZ_ALGORITHM, ALGORITHM);
            self.parsed_path.set_query(
                X_AMZ_CREDENTIAL,
                format!(
                    "{}/{}",
                    self.credential.access_key_id,
                    self.credential_scope()
                ),
            );
            self.parsed_path
                .set_query(X_AMZ_SIGNED_HEADERS, signed_headers(&self.request.headers));
            return;
        }

        if !self.request.do_not_modify_headers && !self.is_codecommit_git {
            let headers = &mut self.request.headers;
            let body = &self.request.body;

            if !body.is_empty() && !headers.contains(CONTENT_TYPE) {
                headers.insert(CONTENT_TYPE, DEFAULT_CONTENT_TYPE);
            }
            if !body.is_empty() && !headers.contains(CONTENT_LENGTH) {
                headers.insert(CONTENT_LENGTH, body.len().to_string());
            }
            if let Some(token) = &self.credential.session_token {
                if !headers.contains(X_AMZ_SECURITY_TOKEN) {
                    headers.insert(X_AMZ_SECURITY_TOKEN, token.as_str());
                }
            }
            if self.endpoint.kind == ServiceKind::S3 && !headers.contains(X_AMZ_CONTENT_SHA_256)
            {
                headers.insert(X_AMZ_CONTENT_SHA_256, hex_sha256(body));
            }
            if !headers.contains(X_AMZ_DATE) {
                headers.insert(X_AMZ_DATE, self.datetime.as_str());
            }
        }

        // An explicit signing time replaces the date the caller sent.
        if self.request.datetime.is_some() && self.request.headers.contains(X_AMZ_DATE) {
            self.request.headers.insert(X_AMZ_DATE, self.datetime.as_str());
        }
        self.request.headers.remove(AUTHORIZATION);
    }

    /// Signing name of the service, may be empty.
    pub fn service(&self) -> &str {
        &self.endpoint.service
    }

    /// Signing region.
    pub fn region(&self) -> &str {
        &self.endpoint.region
    }

    /// Resolved endpoint.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// The request as it will be signed.
    pub fn request(&self) -> &SigningRequest {
        &self.request
    }

    /// Signing time: `20220313T072004Z`.
    pub fn datetime(&self) -> &str {
        &self.datetime
    }

    /// Signing date: `20220313`.
    pub fn date(&self) -> &str {
        self.datetime.get(..8).unwrap_or(&self.datetime)
    }

    /// Scope: `20220313/<region>/<service>/aws4_request`.
    pub fn credential_scope(&self) -> String {
        format!(
            "{}/{}/{}/{SCOPE_TERMINATOR}",
            self.date(),
            self.endpoint.region,
            self.endpoint.service
        )
    }

    fn payload_hash(&self) -> String {
        if self.endpoint.kind == ServiceKind::S3 && self.request.sign_query {
            UNSIGNED_PAYLOAD.to_string()
        } else if self.is_codecommit_git {
            String::new()
        } else if let Some(v) = self.request.headers.get(X_AMZ_CONTENT_SHA_256) {
            v.to_string()
        } else {
            hex_sha256(&self.request.body)
        }
    }

    /// Build the canonical request.
    ///
    /// ```text
    /// GET
    /// /
    /// Action=ListUsers&Version=2010-05-08
    /// host:iam.amazonaws.com
    /// x-amz-date:20150830T123600Z
    ///
    /// host;x-amz-date
    /// e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855
    /// ```
    pub fn canonical_string(&self) -> String {
        let kind = self.endpoint.kind;
        let decode_path = kind == ServiceKind::S3 || self.request.do_not_encode_path;
        let query = self
            .parsed_path
            .query
            .as_deref()
            .map(|q| canonical_query(q, kind == ServiceKind::S3))
            .unwrap_or_default();

        [
            self.request.method.clone(),
            canonical_uri(&self.parsed_path.path, kind.uri_policy(), decode_path),
            query,
            canonical_headers(&self.request.headers) + "\n",
            signed_headers(&self.request.headers),
            self.payload_hash(),
        ]
        .join("\n")
    }

    /// Build the string to sign.
    ///
    /// ```text
    /// AWS4-HMAC-SHA256
    /// 20220313T072004Z
    /// 20220313/<region>/<service>/aws4_request
    /// <hashed_canonical_request>
    /// ```
    pub fn string_to_sign(&self) -> String {
        self.string_to_sign_of(&self.canonical_string())
    }

    fn string_to_sign_of(&self, creq: &str) -> String {
        format!(
            "{ALGORITHM}\n{}\n{}\n{}",
            self.datetime,
            self.credential_scope(),
            hex_sha256(creq.as_bytes())
        )
    }

    /// Hex encoded signature of this request.
    pub fn signature(&self) -> String {
        self.signature_of(&self.string_to_sign())
    }

    fn signature_of(&self, string_to_sign: &str) -> String {
        let key = self.key_cache.derive(
            &self.credential.secret_access_key,
            self.date(),
            &self.endpoint.region,
            &self.endpoint.service,
        );
        hex_hmac_sha256(&key, string_to_sign.as_bytes())
    }

    /// Value of the `Authorization` header for this request.
    pub fn auth_header(&self) -> String {
        self.auth_header_of(&self.signature())
    }

    fn auth_header_of(&self, signature: &str) -> String {
        format!(
            "{ALGORITHM} Credential={}/{}, SignedHeaders={}, Signature={signature}",
            self.credential.access_key_id,
            self.credential_scope(),
            signed_headers(&self.request.headers),
        )
    }

    /// Sign the request and hand it back.
    ///
    /// The signature lands in `Authorization`, or in `X-Amz-Signature` for
    /// presigned requests; `path` is rewritten to the normalized path and
    /// query that were signed.
    pub fn sign(mut self) -> SigningRequest {
        let creq = self.canonical_string();
        debug!("calculated canonical request: {creq}");
        let string_to_sign = self.string_to_sign_of(&creq);
        debug!("calculated string to sign: {string_to_sign}");
        let signature = self.signature_of(&string_to_sign);

        if self.request.sign_query {
            self.parsed_path.set_query(X_AMZ_SIGNATURE, signature);
        } else {
            let authorization = self.auth_header_of(&signature);
            self.request.headers.insert(AUTHORIZATION, authorization);
        }

        self.request.path = self.parsed_path.format();
        self.request
    }
}

fn default_port(scheme: Option<&str>) -> Option<u16> {
    match scheme.unwrap_or("https") {
        "https" => Some(443),
        "http" => Some(80),
        _ => None,
    }
}

/// Sign `request` and return it.
///
/// Without an explicit credential, keys are loaded from the environment
/// variables visible through `ctx`.
///
/// ```
/// use aws4::{sign, Credential, SigningRequest};
/// use aws4_core::Context;
///
/// let req = SigningRequest::new().with_service("sqs").with_path("/");
/// let signed = sign(&Context::new(), req, Some(Credential::new("ak", "sk"))).unwrap();
/// assert!(signed.headers.get("Authorization").unwrap().starts_with("AWS4-HMAC-SHA256 "));
/// ```
pub fn sign(
    ctx: &Context,
    request: SigningRequest,
    credential: Option<Credential>,
) -> Result<SigningRequest> {
    let signer = match credential {
        Some(cred) => RequestSigner::new(request, cred),
        None => RequestSigner::from_provider(ctx, request, &EnvCredentialProvider::new())?,
    };
    Ok(signer.sign())
}
