// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

// Headers used in aws services.
pub const AUTHORIZATION: &str = "Authorization";
pub const CONTENT_LENGTH: &str = "Content-Length";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const DATE: &str = "Date";
pub const HOST: &str = "Host";
pub const X_AMZ_CONTENT_SHA_256: &str = "X-Amz-Content-Sha256";
pub const X_AMZ_DATE: &str = "X-Amz-Date";
pub const X_AMZ_SECURITY_TOKEN: &str = "X-Amz-Security-Token";

// Query parameters used by presigned requests.
pub const X_AMZ_ALGORITHM: &str = "X-Amz-Algorithm";
pub const X_AMZ_CREDENTIAL: &str = "X-Amz-Credential";
pub const X_AMZ_EXPIRES: &str = "X-Amz-Expires";
pub const X_AMZ_SIGNED_HEADERS: &str = "X-Amz-SignedHeaders";
pub const X_AMZ_SIGNATURE: &str = "X-Amz-Signature";

// Env values used in aws services.
pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_ACCESS_KEY: &str = "AWS_ACCESS_KEY";
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const AWS_SECRET_KEY: &str = "AWS_SECRET_KEY";
pub const AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";

// Protocol labels.
pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";
pub const SCOPE_TERMINATOR: &str = "aws4_request";
pub const SIGNING_KEY_PREFIX: &str = "AWS4";
pub const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_DOMAIN: &str = "amazonaws.com";
pub const DEFAULT_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";
/// Presigned s3 urls stay valid for one day unless the caller says otherwise.
pub const DEFAULT_EXPIRES_SECONDS: u64 = 86400;
pub const DEFAULT_KEY_CACHE_CAPACITY: usize = 1000;

/// AsciiSet for [AWS UriEncode](https://docs.aws.amazon.com/AmazonS3/latest/API/sig-v4-header-based-auth.html)
///
/// - URI encode every byte except the unreserved characters: 'A'-'Z', 'a'-'z', '0'-'9', '-', '.', '_', and '~'.
///
/// Applied to single path segments and to query names and values.
pub static AWS_QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Characters that survive a raw path untouched: unreserved and reserved
/// URI characters, `#`, and `%` itself.
///
/// A raw path holding anything else gets re-escaped as a whole before it is
/// split into path and query.
pub static RAW_PATH_SAFE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'#')
    .remove(b'%');

/// Same as [`RAW_PATH_SAFE_SET`] but escapes `%` too, used once existing
/// escapes have been decoded.
pub static RAW_PATH_ENCODE_SET: AsciiSet = RAW_PATH_SAFE_SET.add(b'%');
