//! Canonicalization functionality for V4 signed URL generation and verification.
//!
//! This includes the percent-encoder, header and query-string canonicalization, and the
//! construction of the canonical request whose hash is signed.
//!
//! **Stability of this module is not guaranteed except for items exposed at the crate root**.
//! The functions and types are subject to change in minor/patch versions. This is exposed for
//! testing purposes only.

use {
    crate::{
        constants::{
            GOOG4_RSA_SHA256, HEX_DIGITS_UPPER, MSG_ILLEGAL_HEX_CHAR, MSG_INCOMPLETE_TRAILING_ESCAPE,
            PAYLOAD_UNSIGNED,
        },
        crypto::sha256_hex,
        SigningError,
    },
    http::header::{HeaderMap, HeaderValue},
    log::trace,
    qualifier_attr::qualifiers,
    std::fmt::{Debug, Formatter, Result as FmtResult},
};

/// Indicates whether we are encoding a URI path or a query string element. This selects the set of
/// characters left alone and the error reported for bad escapes.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum UriElement {
    /// URI element represents a resource path; `/` and `~` pass through.
    Path,

    /// URI element represents a query string key or value; `/` and `~` are escaped.
    Query,
}

/// A canonicalized request for V4 signing.
///
/// **The stability of this struct is not guaranteed.** The fields and methods are subject to
/// change in minor/patch versions.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
#[derive(Clone)]
struct CanonicalRequest {
    /// The HTTP method for the request (e.g., "GET", "PUT", etc.)
    request_method: String,

    /// The percent-encoded resource path, starting with `/`. This is guaranteed to be ASCII.
    canonical_path: String,

    /// The sorted, percent-encoded query string, without `x-goog-signature`.
    canonical_query_string: String,

    /// Lower-cased header names and normalized values, sorted by name.
    headers: Vec<(String, String)>,
}

impl CanonicalRequest {
    /// Create a `CanonicalRequest` from its already-canonical parts.
    #[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
    #[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
    fn new(
        request_method: &str,
        canonical_path: String,
        canonical_query_string: String,
        headers: Vec<(String, String)>,
    ) -> Self {
        Self {
            request_method: request_method.to_string(),
            canonical_path,
            canonical_query_string,
            headers,
        }
    }

    /// Retrieve the HTTP request method.
    #[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
    #[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
    #[inline(always)]
    fn request_method(&self) -> &str {
        &self.request_method
    }

    /// Retrieve the canonical resource path.
    #[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
    #[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
    #[inline(always)]
    fn canonical_path(&self) -> &str {
        &self.canonical_path
    }

    /// Retrieve the canonical query string.
    #[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
    #[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
    #[inline(always)]
    fn canonical_query_string(&self) -> &str {
        &self.canonical_query_string
    }

    /// The `name:value\n` block for all headers.
    #[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
    #[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
    fn canonical_headers(&self) -> String {
        canonical_headers_to_string(&self.headers)
    }

    /// The semicolon-separated list of header names.
    #[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
    #[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
    fn signed_headers(&self) -> String {
        signed_headers_to_string(&self.headers)
    }

    /// Get the [canonical request](https://cloud.google.com/storage/docs/authentication/canonical-requests)
    /// for the request.
    ///
    /// The header block already ends with a newline, so a blank line separates it from the signed
    /// headers list.
    #[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
    #[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
    fn canonical_request(&self) -> String {
        let canonical_request = [
            self.request_method(),
            self.canonical_path(),
            self.canonical_query_string(),
            self.canonical_headers().as_str(),
            self.signed_headers().as_str(),
            PAYLOAD_UNSIGNED,
        ]
        .join("\n");

        trace!("Canonical request:\n{}", canonical_request);
        canonical_request
    }

    /// Get the hex-encoded SHA-256 hash of the canonical request.
    #[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
    #[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
    fn canonical_request_sha256(&self) -> String {
        sha256_hex(self.canonical_request().as_bytes())
    }

    /// Get the string to sign for the given request timestamp and credential scope.
    #[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
    #[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
    fn string_to_sign(&self, request_timestamp: &str, credential_scope: &str) -> String {
        let hashed_canonical_request = self.canonical_request_sha256();
        trace!("Canonical request hash: {}", hashed_canonical_request);
        [GOOG4_RSA_SHA256, request_timestamp, credential_scope, hashed_canonical_request.as_str()].join("\n")
    }
}

impl Debug for CanonicalRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CanonicalRequest")
            .field("request_method", &self.request_method)
            .field("canonical_path", &self.canonical_path)
            .field("canonical_query_string", &self.canonical_query_string)
            .field("headers", &self.headers)
            .finish()
    }
}

/// Lower-case and sort the headers. Values are lower-cased and trimmed; repeated header names have
/// their values joined with `,` in the order they were added.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn canonicalize_headers(headers: &HeaderMap<HeaderValue>) -> Result<Vec<(String, String)>, SigningError> {
    let mut result = Vec::with_capacity(headers.keys_len());

    for key in headers.keys() {
        let mut values = Vec::new();
        for value in headers.get_all(key) {
            values.push(normalize_header_value(key.as_str(), value)?);
        }

        // HeaderName is always lower-case.
        result.push((key.as_str().to_string(), values.join(",")));
    }

    result.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
    Ok(result)
}

/// Lower-case and trim a header value.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn normalize_header_value(name: &str, value: &HeaderValue) -> Result<String, SigningError> {
    match value.to_str() {
        Ok(s) => Ok(s.trim().to_ascii_lowercase()),
        Err(_) => Err(SigningError::MalformedHeader(format!("Header '{}' value is not visible ASCII", name))),
    }
}

/// Emit `name:value\n` for each canonicalized header.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn canonical_headers_to_string(headers: &[(String, String)]) -> String {
    let mut result = String::new();
    for (name, value) in headers {
        result.push_str(name);
        result.push(':');
        result.push_str(value);
        result.push('\n');
    }
    result
}

/// Emit `name;name;...` for each canonicalized header.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn signed_headers_to_string(headers: &[(String, String)]) -> String {
    headers.iter().map(|(name, _)| name.as_str()).collect::<Vec<&str>>().join(";")
}

/// Sort raw (unencoded) query parameters by key, then percent-encode and join them as
/// `key=value&key=value`.
///
/// Parameters with the same key keep a deterministic order by sorting on the value as well.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn canonicalize_query_to_string(query_parameters: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = query_parameters.iter().collect();
    sorted.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()).then_with(|| a.1.as_bytes().cmp(b.1.as_bytes())));

    sorted
        .into_iter()
        .map(|(key, value)| format!("{}={}", uri_encode(key, UriElement::Query), uri_encode(value, UriElement::Query)))
        .collect::<Vec<String>>()
        .join("&")
}

/// Indicates whether the specified byte is RFC3986 unreserved -- i.e., can be represented without being
/// percent-encoded, e.g. '?' -> '%3F'.
#[inline(always)]
fn is_rfc3986_unreserved(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'.' || c == b'_' || c == b'~'
}

/// Indicates whether the specified byte passes through [`uri_encode`] unescaped for the given element.
#[inline(always)]
fn is_safe(c: u8, uri_el_type: UriElement) -> bool {
    match uri_el_type {
        UriElement::Path => is_rfc3986_unreserved(c) || c == b'/',
        UriElement::Query => c.is_ascii_alphanumeric() || c == b'-' || c == b'.' || c == b'_',
    }
}

/// Percent-encode a string for the given URI element.
///
/// * Alpha, digit, and the symbols `-`, `.`, `_` are always left alone.
/// * In paths, `~` and `/` are also left alone.
/// * All other bytes of the UTF-8 encoding are percent-encoded with upper-case hex digits.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn uri_encode(uri_el: &str, uri_el_type: UriElement) -> String {
    let mut result = String::with_capacity(uri_el.len());

    for c in uri_el.bytes() {
        if is_safe(c, uri_el_type) {
            result.push(c as char);
        } else {
            let hex = u8_to_upper_hex(c);
            result.push('%');
            result.push(hex[0] as char);
            result.push(hex[1] as char);
        }
    }

    result
}

/// Convert a byte to uppercase hex representation.
#[inline(always)]
const fn u8_to_upper_hex(b: u8) -> [u8; 2] {
    let result: [u8; 2] = [HEX_DIGITS_UPPER[((b >> 4) & 0xf) as usize], HEX_DIGITS_UPPER[(b & 0xf) as usize]];
    result
}

/// Unescapes a URI percent-encoded string. In query elements, `+` is decoded as a space.
///
/// Bad or truncated escapes, and escapes that do not decode to UTF-8, are reported as
/// [`SigningError::InvalidURIPath`] or [`SigningError::MalformedQueryString`] depending on the
/// element type.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn unescape_uri_encoding(s: &str, uri_el_type: UriElement) -> Result<String, SigningError> {
    let make_err = |message: String| match uri_el_type {
        UriElement::Path => SigningError::InvalidURIPath(message),
        UriElement::Query => SigningError::MalformedQueryString(message),
    };

    let bytes = s.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];

        if c == b'%' {
            if i + 2 >= bytes.len() {
                return Err(make_err(MSG_INCOMPLETE_TRAILING_ESCAPE.to_string()));
            }

            let hex_digits = &bytes[i + 1..i + 3];
            match hex::decode(hex_digits) {
                Ok(value) => result.push(value[0]),
                Err(_) => {
                    return Err(make_err(format!(
                        "{}{}{}",
                        MSG_ILLEGAL_HEX_CHAR, hex_digits[0] as char, hex_digits[1] as char
                    )))
                }
            }
            i += 3;
        } else if c == b'+' && uri_el_type == UriElement::Query {
            result.push(b' ');
            i += 1;
        } else {
            result.push(c);
            i += 1;
        }
    }

    String::from_utf8(result).map_err(|_| make_err(format!("Percent-encoded value is not valid UTF-8: {}", s)))
}

/// Split a raw query string into decoded `(key, value)` pairs, in the order they appear.
///
/// Empty components (e.g. from `a=1&&b=2`) are skipped; a component without `=` has an empty value.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn query_string_to_pairs(query_string: &str) -> Result<Vec<(String, String)>, SigningError> {
    let mut result = Vec::new();

    for component in query_string.split('&') {
        if component.is_empty() {
            continue;
        }

        let (key, value) = component.split_once('=').unwrap_or((component, ""));
        result.push((unescape_uri_encoding(key, UriElement::Query)?, unescape_uri_encoding(value, UriElement::Query)?));
    }

    Ok(result)
}
