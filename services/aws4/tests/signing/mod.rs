mod presigned;
mod special_chars;
mod standard;

use aws4::{Credential, RequestSigner, SigningRequest};
use aws4_core::time::DateTime;
use chrono::{TimeZone, Utc};

pub const DATE: &str = "Wed, 26 Dec 2012 06:10:30 GMT";
pub const ISO: &str = "20121226T061030Z";
pub const SQS_AUTH: &str = "AWS4-HMAC-SHA256 Credential=ABCDEF/20121226/us-east-1/sqs/aws4_request, \
     SignedHeaders=date;host;x-amz-date, \
     Signature=d847efb54cd60f0a256174848f26e43af4b5168dbec3118dc9fd84e942285791";

/// Initialize test environment
pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn cred() -> Credential {
    Credential::new("ABCDEF", "abcdef1234567890")
}

/// The moment `DATE` and `ISO` describe.
pub fn time() -> DateTime {
    Utc.with_ymd_and_hms(2012, 12, 26, 6, 10, 30)
        .single()
        .expect("time must be valid")
}

/// Sign `req` with the shared test credential.
pub fn sign(req: SigningRequest) -> SigningRequest {
    init();
    RequestSigner::new(req, cred()).sign()
}
