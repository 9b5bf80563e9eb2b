//! Common constants used throughout the crate.
//!
//! This helps ensure the entire crate is on the same page about these constant values. If a value
//! is spelled incorrectly, at least it can be fixed in one spot.
//!
//! Tests that are testing the content of an error code or message should not use these constants;
//! they should use hard-coded strings so the tests are also testing for misspellings.
//!
//! Please keep this file organized alphabetically.

/// Credential scope location used when none is configured.
pub(crate) const DEFAULT_LOCATION: &str = "auto";

/// Host serving the Cloud Storage XML API.
pub(crate) const DEFAULT_SERVICE_HOST: &str = "storage.googleapis.com";

/// Expiration used by [`download_url`][crate::download_url], in seconds.
pub(crate) const DOWNLOAD_EXPIRATION_SECS: u64 = 900;

/// Canned ACL attached to download URLs.
pub(crate) const DOWNLOAD_GOOG_ACL: &str = "public-read";

/// Error code: ExpiredSignature
pub(crate) const ERR_CODE_EXPIRED_SIGNATURE: &str = "ExpiredSignature";

/// Error code: IncompleteSignature
pub(crate) const ERR_CODE_INCOMPLETE_SIGNATURE: &str = "IncompleteSignature";

/// Error code: InvalidExpiration
pub(crate) const ERR_CODE_INVALID_EXPIRATION: &str = "InvalidExpiration";

/// Error code: InvalidURIPath
pub(crate) const ERR_CODE_INVALID_URI_PATH: &str = "InvalidURIPath";

/// Error code: MalformedHeader
pub(crate) const ERR_CODE_MALFORMED_HEADER: &str = "MalformedHeader";

/// Error code: MalformedQueryString
pub(crate) const ERR_CODE_MALFORMED_QUERY_STRING: &str = "MalformedQueryString";

/// Error code: MissingIdentity
pub(crate) const ERR_CODE_MISSING_IDENTITY: &str = "MissingIdentity";

/// Error code: SignatureDoesNotMatch
pub(crate) const ERR_CODE_SIGNATURE_DOES_NOT_MATCH: &str = "SignatureDoesNotMatch";

/// Error code: SigningFailure
pub(crate) const ERR_CODE_SIGNING_FAILURE: &str = "SigningFailure";

/// Algorithm name for V4 signatures made with an RSA service account key.
pub(crate) const GOOG4_RSA_SHA256: &str = "GOOG4-RSA-SHA256";

/// String included at the end of the V4 credential scope.
pub(crate) const GOOG4_REQUEST: &str = "goog4_request";

/// Header for the canned ACL applied to the object.
pub(crate) const HDR_X_GOOG_ACL: &str = "x-goog-acl";

/// Uppercase hex digits.
pub(crate) const HEX_DIGITS_UPPER: [u8; 16] =
    [b'0', b'1', b'2', b'3', b'4', b'5', b'6', b'7', b'8', b'9', b'A', b'B', b'C', b'D', b'E', b'F'];

/// Compact ISO8601 format used for `X-Goog-Date` and the string to sign.
pub(crate) const ISO8601_COMPACT_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Short date format used in the credential scope.
pub(crate) const ISO8601_DATE_FORMAT: &str = "%Y%m%d";

/// Length of a compact ISO8601 timestamp in the UTC time zone.
pub(crate) const ISO8601_UTC_LENGTH: usize = 16;

/// Longest lifetime Cloud Storage accepts for a signed URL: seven days.
pub(crate) const MAX_EXPIRATION_SECS: u64 = 7 * 24 * 60 * 60;

/// Error message: `"Illegal hex character in escape % pattern: %"`
pub(crate) const MSG_ILLEGAL_HEX_CHAR: &str = "Illegal hex character in escape % pattern: %";

/// Error message: `"Incomplete trailing escape % sequence"`
pub(crate) const MSG_INCOMPLETE_TRAILING_ESCAPE: &str = "Incomplete trailing escape % sequence";

/// Error message: `"Re-examine the query-string parameters."`
pub(crate) const MSG_REEXAMINE_QUERY_STRING_PARAMS: &str = "Re-examine the query-string parameters.";

/// Error message: `"The request signature we calculated does not match the signature you provided. Check your Google secret key and signing method."`
pub(crate) const MSG_REQUEST_SIGNATURE_MISMATCH: &str =
    "The request signature we calculated does not match the signature you provided. Check your Google secret key and signing method.";

/// Literal hashed in place of the payload; signed URLs never cover the body.
pub(crate) const PAYLOAD_UNSIGNED: &str = "UNSIGNED-PAYLOAD";

/// Query parameter for the signature algorithm
pub(crate) const QP_X_GOOG_ALGORITHM: &str = "X-Goog-Algorithm";

/// Query parameter for delivering the credential
pub(crate) const QP_X_GOOG_CREDENTIAL: &str = "X-Goog-Credential";

/// Query parameter for delivering the date
pub(crate) const QP_X_GOOG_DATE: &str = "X-Goog-Date";

/// Query parameter for delivering the lifetime of the URL, in seconds
pub(crate) const QP_X_GOOG_EXPIRES: &str = "X-Goog-Expires";

/// Query parameter for delivering the signature. Appended after signing; never canonicalized.
pub(crate) const QP_X_GOOG_SIGNATURE: &str = "x-goog-signature";

/// Query parameter specifying the signed headers
pub(crate) const QP_X_GOOG_SIGNED_HEADERS: &str = "X-Goog-SignedHeaders";

/// Service name in the credential scope.
pub(crate) const STORAGE_SERVICE: &str = "storage";

/// Expiration used by [`upload_url`][crate::upload_url], in seconds.
pub(crate) const UPLOAD_EXPIRATION_SECS: u64 = 300;

/// Canned ACL attached to upload URLs.
pub(crate) const UPLOAD_GOOG_ACL: &str = "private";
