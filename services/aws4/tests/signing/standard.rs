use super::{cred, init, sign, time, DATE, ISO, SQS_AUTH};
use anyhow::Result;
use aws4::{RequestSigner, SigningRequest};
use pretty_assertions::assert_eq;
use test_case::test_case;

#[test]
fn test_sign_from_url() -> Result<()> {
    let req = SigningRequest::from_url("http://sqs.us-east-1.amazonaws.com/")?.with_header("Date", DATE);
    let signed = sign(req);
    assert_eq!(signed.headers.get("Authorization"), Some(SQS_AUTH));
    Ok(())
}

#[test]
fn test_sign_elasticsearch_url() -> Result<()> {
    let req = SigningRequest::from_url(
        "https://search-cluster-name-aaaaaa0aa00aa0aaaaaaa00aaa.eu-west-1.es.amazonaws.com",
    )?
    .with_header("Date", DATE);

    let signed = sign(req);
    assert_eq!(
        signed.headers.get("Authorization"),
        Some(
            "AWS4-HMAC-SHA256 Credential=ABCDEF/20121226/eu-west-1/es/aws4_request, \
             SignedHeaders=date;host;x-amz-date, \
             Signature=2dba21885bd7ccb0c5775c578c18a5c81fd30db84d4a2911933152df01de5260"
        )
    );
    Ok(())
}

#[test_case(r#"{"service": "sqs"}"#; "service only")]
#[test_case(r#"{"hostname": "sqs.us-east-1.amazonaws.com"}"#; "hostname")]
#[test_case(r#"{"host": "sqs.us-east-1.amazonaws.com"}"#; "host")]
fn test_sign_described_request(desc: &str) -> Result<()> {
    let req: SigningRequest = serde_json::from_str(desc)?;
    let signed = sign(req.with_header("Date", DATE));
    assert_eq!(signed.headers.get("Authorization"), Some(SQS_AUTH));
    Ok(())
}

#[test]
fn test_sign_with_passed_credential() {
    init();
    let req = SigningRequest::new()
        .with_service("sqs")
        .with_header("Date", DATE);
    let signed = RequestSigner::new(req, aws4::Credential::new("A", "B")).sign();

    assert_eq!(
        signed.headers.get("Authorization"),
        Some(
            "AWS4-HMAC-SHA256 Credential=A/20121226/us-east-1/sqs/aws4_request, \
             SignedHeaders=date;host;x-amz-date, \
             Signature=5d8d587b6e3011935837d670e682646012977960d8a8d992503d852726af71b9"
        )
    );
}

#[test_case(SigningRequest::new().with_hostname("localhost").with_port(9000); "hostname")]
#[test_case(serde_json::from_str(r#"{"host": "localhost", "port": 9000}"#).expect("must be valid"); "host")]
#[test_case(serde_json::from_str(r#"{"host": "localhost", "port": "9000"}"#).expect("must be valid"); "string port")]
fn test_sign_local_s3(req: SigningRequest) {
    let req = req
        .with_service("s3")
        .with_header("Date", DATE);

    let signed = sign(req);
    assert_eq!(signed.headers.get("Host"), Some("localhost:9000"));
    assert_eq!(
        signed.headers.get("Authorization"),
        Some(
            "AWS4-HMAC-SHA256 Credential=ABCDEF/20121226/us-east-1/s3/aws4_request, \
             SignedHeaders=date;host;x-amz-content-sha256;x-amz-date, \
             Signature=6fda8a58c01edfcb6773c15ad5a276a893ce52978a8f5cd1705fae14df78cfd4"
        )
    );
}

#[test]
fn test_sign_with_many_options() {
    let req = SigningRequest::new()
        .with_service("dynamodb")
        .with_region("ap-southeast-2")
        .with_method("DELETE")
        .with_path("/Some/Path?param=key&param=otherKey")
        .with_body("SomeAction=SomeThing&Whatever=SomeThingElse")
        .with_header("Date", DATE)
        .with_header("Content-Type", "application/x-amz-json-1.0")
        .with_header("X-Amz-Target", "DynamoDB_20111205.ListTables");

    let signed = sign(req);
    assert_eq!(signed.headers.get("X-Amz-Date"), Some(ISO));
    assert_eq!(
        signed.headers.get("Authorization"),
        Some(
            "AWS4-HMAC-SHA256 Credential=ABCDEF/20121226/ap-southeast-2/dynamodb/aws4_request, \
             SignedHeaders=content-length;content-type;date;host;x-amz-date;x-amz-target, \
             Signature=f9a00417d284dfe2cfdef809652c1d54add4e159835a0c69ac8cbdaa227a5000"
        )
    );
}

#[test_case("X-Amz-Content-Sha256"; "canonical casing")]
#[test_case("x-amz-content-sha256"; "lower casing")]
fn test_sign_with_given_content_sha256(name: &str) {
    let req = SigningRequest::new()
        .with_service("s3")
        .with_method("PUT")
        .with_path("/some-bucket/file.txt")
        .with_body("Test Body")
        .with_header("Date", DATE)
        .with_header(name, "My-Generated-Body-Hash");

    let signed = sign(req);
    assert_eq!(
        signed.headers.get("X-Amz-Content-Sha256"),
        Some("My-Generated-Body-Hash")
    );
    assert_eq!(
        signed.headers.get("Authorization"),
        Some(
            "AWS4-HMAC-SHA256 Credential=ABCDEF/20121226/us-east-1/s3/aws4_request, \
             SignedHeaders=content-length;content-type;date;host;x-amz-content-sha256;x-amz-date, \
             Signature=afa4074a64185317be81ed18953c6df9ee3a63507e6711ad79a7534f4c0b0c54"
        )
    );
}

#[test]
fn test_sign_codecommit_git() {
    init();
    let req = SigningRequest::new()
        .with_service("codecommit")
        .with_hostname("git-codecommit.us-east-1.amazonaws.com")
        .with_method("GIT")
        .with_path("/v1/repos/MyAwesomeRepo")
        .with_time(time());

    let signer = RequestSigner::new(req, cred());
    assert_eq!(signer.datetime(), "20121226T061030");
    assert_eq!(
        signer.signature(),
        "2a9a182eb6afc3859ee590af942564b53b0c4e5beac2893052515401d06af92a"
    );

    let signed = signer.sign();
    assert_eq!(signed.headers.len(), 2);
    assert!(signed
        .headers
        .get("Authorization")
        .is_some_and(|v| v.ends_with("2a9a182eb6afc3859ee590af942564b53b0c4e5beac2893052515401d06af92a")));
}

#[test]
fn test_signing_is_deterministic() {
    let req = SigningRequest::new()
        .with_service("sqs")
        .with_path("/?Action=ListQueues")
        .with_time(time());

    let first = sign(req.clone());
    let second = sign(req);
    assert_eq!(
        first.headers.get("Authorization"),
        second.headers.get("Authorization")
    );
}

#[test]
fn test_sign_into_http_parts() -> Result<()> {
    init();
    let (mut parts, _) = http::Request::get("http://sqs.us-east-1.amazonaws.com/")
        .header("date", DATE)
        .body(())?
        .into_parts();

    let req = SigningRequest::from_parts(&parts, "")?;
    RequestSigner::new(req, cred()).sign().apply(&mut parts)?;

    assert_eq!(parts.headers["authorization"], SQS_AUTH);
    assert!(parts.headers["authorization"].is_sensitive());
    assert_eq!(parts.headers["x-amz-date"], ISO);
    assert_eq!(parts.uri.to_string(), "http://sqs.us-east-1.amazonaws.com/");
    Ok(())
}

#[test]
fn test_query_params_sign_like_query_string() -> Result<()> {
    let base = || {
        SigningRequest::new()
            .with_service("sqs")
            .with_header("Date", DATE)
    };
    let expected = sign(base().with_path("/?Action=ListQueues&QueueNamePrefix=my%20queue"));

    let from_params = sign(
        base()
            .with_query_param("Action", "ListQueues")
            .with_query_param("QueueNamePrefix", "my queue"),
    );
    assert_eq!(
        from_params.headers.get("Authorization"),
        expected.headers.get("Authorization")
    );
    assert_eq!(from_params.path, expected.path);

    let described: SigningRequest = serde_json::from_str(
        r#"{"service": "sqs", "query": {"QueueNamePrefix": "my queue", "Action": "ListQueues"}}"#,
    )?;
    let from_json = sign(described.with_header("Date", DATE));
    assert_eq!(
        from_json.headers.get("Authorization"),
        expected.headers.get("Authorization")
    );
    Ok(())
}
