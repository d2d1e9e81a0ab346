use super::{cred, init, time};
use aws4::{RequestSigner, SigningRequest};
use pretty_assertions::assert_eq;
use test_case::test_case;

/// Returns the canonical path, the canonical query and the signed path.
fn canonicalize(service: &str, path: &str) -> (String, String, String) {
    init();
    let signer = RequestSigner::new(
        SigningRequest::new().with_service(service).with_path(path),
        cred(),
    );

    let canonical = signer.canonical_string();
    let lines: Vec<&str> = canonical.split('\n').collect();
    let (uri, query) = (lines[1].to_string(), lines[2].to_string());
    (uri, query, signer.sign().path)
}

#[test_case("s3", "/ü", "/%C3%BC", "", "/%C3%BC"; "latin1 s3")]
#[test_case("es", "/ü", "/%25C3%25BC", "", "/%C3%BC"; "latin1 non s3")]
#[test_case("s3", "/€", "/%E2%82%AC", "", "/%E2%82%AC"; "multibyte s3")]
#[test_case("es", "/€", "/%25E2%2582%25AC", "", "/%E2%82%AC"; "multibyte non s3")]
#[test_case("s3", "/%41", "/A", "", "/%41"; "unreserved escape s3")]
#[test_case("es", "/%41", "/%2541", "", "/%41"; "unreserved escape non s3")]
#[test_case("s3", "/!'()*%21%27%28%29%2A", "/%21%27%28%29%2A%21%27%28%29%2A", "", "/!'()*%21%27%28%29%2A"; "rfc3986 s3")]
#[test_case("es", "/!'()*%21%27%28%29%2A", "/%21%27%28%29%2A%2521%2527%2528%2529%252A", "", "/!'()*%21%27%28%29%2A"; "rfc3986 non s3")]
#[test_case("s3", "/%2a", "/%2A", "", "/%2a"; "escape casing s3")]
#[test_case("es", "/%2a", "/%252a", "", "/%2a"; "escape casing non s3")]
#[test_case("s3", "/%2f%2f", "///", "", "/%2f%2f"; "escaped slashes s3")]
#[test_case("es", "/%2f%2f", "/%252f%252f", "", "/%2f%2f"; "escaped slashes non s3")]
#[test_case("s3", "/ü%41", "/%C3%BCA", "", "/%C3%BCA"; "mixed s3")]
#[test_case("es", "/ü%41", "/%25C3%25BCA", "", "/%C3%BCA"; "mixed non s3")]
#[test_case("s3", "/ü%41?a=%41ü", "/%C3%BCA", "a=A%C3%BC", "/%C3%BCA?a=A%C3%BC"; "mixed with query s3")]
#[test_case("es", "/ü%41?a=%41ü", "/%25C3%25BCA", "a=A%C3%BC", "/%C3%BCA?a=A%C3%BC"; "mixed with query non s3")]
#[test_case("s3", "/€ü%41?€ü=%41€ü", "/%E2%82%AC%C3%BCA", "%E2%82%AC%C3%BC=A%E2%82%AC%C3%BC", "/%E2%82%AC%C3%BCA?%E2%82%AC%C3%BC=A%E2%82%AC%C3%BC"; "multibyte with query s3")]
#[test_case("es", "/€ü%41?€ü=%41€ü", "/%25E2%2582%25AC%25C3%25BCA", "%E2%82%AC%C3%BC=A%E2%82%AC%C3%BC", "/%E2%82%AC%C3%BCA?%E2%82%AC%C3%BC=A%E2%82%AC%C3%BC"; "multibyte with query non s3")]
#[test_case("s3", "/%2f?a=/&/=%2f", "//", "%2F=%2F&a=%2F", "/%2f?a=%2F&%2F=%2F"; "slashes in query s3")]
#[test_case("es", "/%2f?a=/&/=%2f", "/%252f", "%2F=%2F&a=%2F", "/%2f?a=%2F&%2F=%2F"; "slashes in query non s3")]
#[test_case("s3", "/?a=b&a=B&a=b&a=c", "/", "a=b", "/?a=b&a=B&a=b&a=c"; "query order s3")]
#[test_case("es", "/?a=b&a=B&a=b&a=c", "/", "a=B&a=b&a=b&a=c", "/?a=b&a=B&a=b&a=c"; "query order non s3")]
#[test_case("s3", "//a/b/..//c/.?a=b", "//a/b/..//c/.", "a=b", "//a/b/..//c/.?a=b"; "no path normalization s3")]
#[test_case("es", "//a/b/..//c/.?a=b", "/a/c", "a=b", "//a/b/..//c/.?a=b"; "path normalization non s3")]
#[test_case("es", "//a/b/..//c/./?a=b", "/a/c/", "a=b", "//a/b/..//c/./?a=b"; "path normalization with trailing slash")]
#[test_case("s3", "/?&a=&&=&%41&", "/", "A=&a=", "/?a=&A="; "complex query s3")]
#[test_case("es", "/?&a=&&=&%41&", "/", "A=&a=", "/?a=&A="; "complex query non s3")]
fn test_canonicalize(service: &str, path: &str, uri: &str, query: &str, signed_path: &str) {
    let actual = canonicalize(service, path);
    assert_eq!(
        actual,
        (uri.to_string(), query.to_string(), signed_path.to_string())
    );
}

#[test_case("s3", "X-Amz-Expires=86400&"; "s3")]
#[test_case("es", ""; "non s3")]
fn test_canonical_query_when_presigning(service: &str, expires: &str) {
    init();
    let req = SigningRequest::new()
        .with_service(service)
        .with_path("/€")
        .with_time(time())
        .with_sign_query(true);
    let signer = RequestSigner::new(req, cred());

    let canonical = signer.canonical_string();
    let lines: Vec<&str> = canonical.split('\n').collect();
    assert_eq!(
        lines[2],
        format!(
            "X-Amz-Algorithm=AWS4-HMAC-SHA256&\
             X-Amz-Credential=ABCDEF%2F20121226%2Fus-east-1%2F{service}%2Faws4_request&\
             X-Amz-Date=20121226T061030Z&{expires}X-Amz-SignedHeaders=host"
        )
    );
}
