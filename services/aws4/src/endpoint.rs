//! Infer the target service, region and hostname of a request.
//!
//! - [Service endpoints](https://docs.aws.amazon.com/general/latest/gr/rande.html)

use crate::constants::{DEFAULT_DOMAIN, DEFAULT_REGION};

/// Services that only answer on a global endpoint without region segment.
const GLOBAL_SERVICES: &[&str] = &["cloudfront", "ls", "route53", "iam", "importexport", "sts"];

/// How the path of a request is turned into its canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UriPolicy {
    /// Keep the path structure as given, only normalize existing escapes.
    RawPreserving,
    /// Normalize dot segments and duplicate slashes, then escape every segment again.
    Strict,
}

/// ServiceKind groups services by how they deviate from the common case.
///
/// The kind is resolved once per request and decides the URI policy, the
/// hostname shape and whether the hostname carries a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    /// Object storage (`s3`).
    S3,
    /// The simple key-value domain store (`sdb`).
    SimpleDb,
    /// Email (`ses`), served from `email.<region>`.
    Ses,
    /// Services that only exist on a global endpoint.
    Global,
    /// Everything else.
    Standard,
}

impl ServiceKind {
    /// Classify a service name.
    pub fn from_service(service: &str) -> Self {
        match service {
            "s3" => ServiceKind::S3,
            "sdb" => ServiceKind::SimpleDb,
            "ses" => ServiceKind::Ses,
            s if GLOBAL_SERVICES.contains(&s) => ServiceKind::Global,
            _ => ServiceKind::Standard,
        }
    }

    /// URI policy used while canonicalizing the path.
    pub fn uri_policy(self) -> UriPolicy {
        match self {
            ServiceKind::S3 => UriPolicy::RawPreserving,
            _ => UriPolicy::Strict,
        }
    }

    /// Returns true if the hostname of this service in `region` carries no region segment.
    pub fn is_regionless(self, region: &str) -> bool {
        match self {
            ServiceKind::S3 | ServiceKind::SimpleDb => region == DEFAULT_REGION,
            ServiceKind::Global => true,
            ServiceKind::Ses | ServiceKind::Standard => false,
        }
    }
}

/// Endpoint is the resolved identity of a request's target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Signing name of the service, may be empty.
    pub service: String,
    /// Signing region.
    pub region: String,
    /// Behaviour group of the service.
    pub kind: ServiceKind,
}

impl Endpoint {
    /// Resolve the endpoint from whatever the caller knows.
    ///
    /// Explicit `service` and `region` always win. Missing parts are taken
    /// from the hostname; anything still missing falls back to an empty
    /// service and the default region. This never fails.
    pub fn resolve(service: Option<&str>, region: Option<&str>, hostname: Option<&str>) -> Self {
        let (host_service, host_region) = hostname.map(match_host).unwrap_or_default();

        let mut service = service
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .or(host_service)
            .unwrap_or_default();
        let region = region
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .or(host_region)
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        // SES uses a different domain from the service name.
        if service == "email" {
            service = "ses".to_string();
        }

        let kind = ServiceKind::from_service(&service);
        Self {
            service,
            region,
            kind,
        }
    }

    /// Build the hostname of this endpoint.
    ///
    /// ```
    /// use aws4::Endpoint;
    ///
    /// let ep = Endpoint::resolve(Some("s3"), Some("us-west-1"), None);
    /// assert_eq!(ep.hostname(), "s3-us-west-1.amazonaws.com");
    /// ```
    pub fn hostname(&self) -> String {
        let service = match self.kind {
            ServiceKind::Ses => "email",
            _ => self.service.as_str(),
        };

        if self.kind.is_regionless(&self.region) {
            format!("{service}.{DEFAULT_DOMAIN}")
        } else if self.kind == ServiceKind::S3 {
            format!("{service}-{}.{DEFAULT_DOMAIN}", self.region)
        } else {
            format!("{service}.{}.{DEFAULT_DOMAIN}", self.region)
        }
    }
}

/// Split an AWS hostname into `(service, region)` candidates.
///
/// Only the two labels in front of `amazonaws.com` (or `amazonaws.com.cn`)
/// are considered, anything further left is a bucket or cluster name.
fn match_host(host: &str) -> (Option<String>, Option<String>) {
    let prefix = host
        .strip_suffix(".amazonaws.com")
        .or_else(|| host.strip_suffix(".amazonaws.com.cn"));
    let Some(prefix) = prefix else {
        return (None, None);
    };

    let labels: Vec<&str> = prefix.split('.').collect();
    let (first, second) = match labels.as_slice() {
        [.., a, b] if !a.is_empty() => (a.to_string(), Some(b.to_string())),
        [.., b] if !b.is_empty() => (b.to_string(), None),
        _ => return (None, None),
    };

    // Search clusters put the region in front of `es`, e.g.
    // `search-cluster-aaaa.us-east-1.es.amazonaws.com`.
    let (first, second) = match second {
        Some(s) if s == "es" => (s, Some(first)),
        _ => (first, second),
    };

    if second.as_deref() == Some("s3") {
        return (Some("s3".to_string()), Some(DEFAULT_REGION.to_string()));
    }
    if let Some(region) = first.strip_prefix("s3-") {
        return (Some("s3".to_string()), Some(region.to_string()));
    }

    // An empty region label means no region at all.
    (Some(first), second.filter(|v| !v.is_empty()))
}
