//! Verification of V4 signed URLs.
//!
//! This is the check a storage service performs on a signed URL: rebuild the canonical request
//! from the URL and the headers actually sent, rebuild the string to sign, then check the RSA
//! signature against the signer's public key. It is mainly useful for debugging signature
//! mismatches and for testing.

use {
    crate::{
        canonical::{
            canonicalize_headers, canonicalize_query_to_string, query_string_to_pairs, signed_headers_to_string,
            unescape_uri_encoding, uri_encode, CanonicalRequest, UriElement,
        },
        chronoutil::parse_compact_iso8601,
        constants::*,
        crypto::rsa_sha256_verify,
        SigningError,
    },
    chrono::{DateTime, Duration, Utc},
    http::{
        header::{HeaderMap, HeaderName, HeaderValue, HOST},
        method::Method,
        uri::Uri,
    },
    log::{debug, trace},
    rsa::RsaPublicKey,
};

/// The outcome of a successful verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedUrl {
    /// The principal that signed the URL.
    client_email: String,

    /// When the URL became valid.
    request_timestamp: DateTime<Utc>,

    /// The lifetime of the URL in seconds.
    expiration: u64,

    /// The hex-encoded SHA-256 hash of the reconstructed canonical request.
    canonical_request_sha256: String,
}

impl VerifiedUrl {
    /// Retrieve the principal that signed the URL.
    #[inline]
    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    /// Retrieve when the URL became valid.
    #[inline]
    pub fn request_timestamp(&self) -> DateTime<Utc> {
        self.request_timestamp
    }

    /// Retrieve the lifetime of the URL in seconds.
    #[inline]
    pub fn expiration(&self) -> u64 {
        self.expiration
    }

    /// Retrieve the hash of the reconstructed canonical request.
    #[inline]
    pub fn canonical_request_sha256(&self) -> &str {
        &self.canonical_request_sha256
    }
}

/// The `X-Goog-*` parameters pulled out of a signed URL.
struct UrlAuthParams {
    credential: String,
    request_timestamp_str: String,
    expires_str: String,
    signed_headers: String,
    signature: String,
}

impl UrlAuthParams {
    /// Extract the authentication parameters, reporting every missing one at once.
    fn from_query_pairs(pairs: &[(String, String)]) -> Result<Self, SigningError> {
        let find = |name: &str| pairs.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone());

        let algorithm = find(QP_X_GOOG_ALGORITHM);
        if let Some(ref algorithm) = algorithm {
            if algorithm != GOOG4_RSA_SHA256 {
                return Err(SigningError::IncompleteSignature(format!(
                    "Unsupported 'X-Goog-Algorithm': '{}'.",
                    algorithm
                )));
            }
        }

        let signature = pairs.iter().find(|(k, _)| k.eq_ignore_ascii_case(QP_X_GOOG_SIGNATURE)).map(|(_, v)| v.clone());

        let mut missing = Vec::new();
        let mut require = |name: &str, value: Option<String>| match value {
            Some(value) => value,
            None => {
                missing.push(format!("Query-string parameters must include '{}'.", name));
                String::new()
            }
        };

        require(QP_X_GOOG_ALGORITHM, algorithm);
        let credential = require(QP_X_GOOG_CREDENTIAL, find(QP_X_GOOG_CREDENTIAL));
        let request_timestamp_str = require(QP_X_GOOG_DATE, find(QP_X_GOOG_DATE));
        let expires_str = require(QP_X_GOOG_EXPIRES, find(QP_X_GOOG_EXPIRES));
        let signed_headers = require(QP_X_GOOG_SIGNED_HEADERS, find(QP_X_GOOG_SIGNED_HEADERS));
        let signature = require("X-Goog-Signature", signature);

        if !missing.is_empty() {
            return Err(SigningError::IncompleteSignature(format!(
                "{} {}",
                missing.join(" "),
                MSG_REEXAMINE_QUERY_STRING_PARAMS
            )));
        }

        Ok(Self {
            credential,
            request_timestamp_str,
            expires_str,
            signed_headers,
            signature,
        })
    }
}

/// Verify a signed URL as a storage service would.
///
/// # Parameters
/// * `public_key` - The public key of the service account that signed the URL.
/// * `method` - The HTTP method of the incoming request.
/// * `url` - The full signed URL, including `x-goog-signature`.
/// * `headers` - The headers sent with the request. `host` is taken from the URL if absent.
/// * `now` - The time the request was received. Usually this is `Utc::now()`.
///
/// # Errors
/// * [`SigningError::InvalidURIPath`] if the URL cannot be parsed or its path has bad escapes.
/// * [`SigningError::MalformedQueryString`] if the query string has bad escapes.
/// * [`SigningError::IncompleteSignature`] if an `X-Goog-*` parameter is missing or unparseable.
/// * [`SigningError::ExpiredSignature`] if `now` is outside the validity window.
/// * [`SigningError::SignatureDoesNotMatch`] if the signature is not valid for the request.
pub fn verify_signed_url(
    public_key: &RsaPublicKey,
    method: &Method,
    url: &str,
    headers: &HeaderMap,
    now: DateTime<Utc>,
) -> Result<VerifiedUrl, SigningError> {
    let uri: Uri = url.parse().map_err(|e| SigningError::InvalidURIPath(format!("Invalid URL '{}': {}", url, e)))?;
    let canonical_path = uri_encode(&unescape_uri_encoding(uri.path(), UriElement::Path)?, UriElement::Path);

    let mut query_parameters = query_string_to_pairs(uri.query().unwrap_or(""))?;
    let auth = UrlAuthParams::from_query_pairs(&query_parameters)?;
    query_parameters.retain(|(k, _)| !k.eq_ignore_ascii_case(QP_X_GOOG_SIGNATURE));

    let request_timestamp = parse_compact_iso8601(&auth.request_timestamp_str).ok_or_else(|| {
        SigningError::IncompleteSignature(format!(
            "X-Goog-Date must be in ISO-8601 'basic format'. Got '{}'.",
            auth.request_timestamp_str
        ))
    })?;

    let expiration: u64 = auth.expires_str.parse().map_err(|_| {
        SigningError::IncompleteSignature(format!("X-Goog-Expires must be an integer. Got '{}'.", auth.expires_str))
    })?;
    if expiration > MAX_EXPIRATION_SECS {
        return Err(SigningError::InvalidExpiration(expiration));
    }

    // Credential is email/date/location/storage/goog4_request.
    let bad_credential = || {
        SigningError::IncompleteSignature(format!(
            "Credential must have the form email/date/location/storage/goog4_request with the date matching X-Goog-Date. Got '{}'.",
            auth.credential
        ))
    };
    let (client_email, credential_scope) = auth.credential.split_once('/').ok_or_else(bad_credential)?;
    let scope_parts: Vec<&str> = credential_scope.split('/').collect();
    if client_email.is_empty()
        || scope_parts.len() != 4
        || scope_parts[0] != request_timestamp.format(ISO8601_DATE_FORMAT).to_string()
        || scope_parts[2] != STORAGE_SERVICE
        || scope_parts[3] != GOOG4_REQUEST
    {
        return Err(bad_credential());
    }

    let window_end = request_timestamp + Duration::seconds(expiration as i64);
    if now < request_timestamp {
        return Err(SigningError::ExpiredSignature(format!(
            "Signature not yet current: {} is still later than {}",
            auth.request_timestamp_str,
            now.format(ISO8601_COMPACT_FORMAT)
        )));
    }
    if now >= window_end {
        return Err(SigningError::ExpiredSignature(format!(
            "Signature expired: {} + {} sec is now earlier than {}",
            auth.request_timestamp_str,
            expiration,
            now.format(ISO8601_COMPACT_FORMAT)
        )));
    }

    // Only the headers named in X-Goog-SignedHeaders take part in the canonical request.
    let mut request_headers = headers.clone();
    if !request_headers.contains_key(HOST) {
        if let Some(authority) = uri.authority() {
            let host = HeaderValue::from_str(authority.as_str())
                .map_err(|_| SigningError::InvalidURIPath(format!("Invalid host in URL '{}'", url)))?;
            request_headers.insert(HOST, host);
        }
    }

    let mut signed_header_map = HeaderMap::new();
    for name in auth.signed_headers.split(';') {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
            SigningError::IncompleteSignature(format!("Invalid header name in X-Goog-SignedHeaders: '{}'", name))
        })?;
        let mut present = false;
        for value in request_headers.get_all(&header_name) {
            signed_header_map.append(header_name.clone(), value.clone());
            present = true;
        }
        if !present {
            return Err(SigningError::SignatureDoesNotMatch(Some(format!(
                "'{}' is listed in X-Goog-SignedHeaders but was not sent.",
                name
            ))));
        }
    }
    let canonical_headers = canonicalize_headers(&signed_header_map)?;
    if signed_headers_to_string(&canonical_headers) != auth.signed_headers {
        return Err(SigningError::SignatureDoesNotMatch(Some(format!(
            "X-Goog-SignedHeaders is not in canonical form: '{}'",
            auth.signed_headers
        ))));
    }

    let canonical_query_string = canonicalize_query_to_string(&query_parameters);
    let canonical_request =
        CanonicalRequest::new(method.as_str(), canonical_path, canonical_query_string, canonical_headers);
    let canonical_request_sha256 = canonical_request.canonical_request_sha256();
    let string_to_sign = canonical_request.string_to_sign(&auth.request_timestamp_str, credential_scope);

    let signature = match hex::decode(&auth.signature) {
        Ok(signature) => signature,
        Err(_) => {
            trace!("Signature is not valid hex");
            return Err(SigningError::SignatureDoesNotMatch(Some(MSG_REQUEST_SIGNATURE_MISMATCH.to_string())));
        }
    };

    if !rsa_sha256_verify(public_key, string_to_sign.as_bytes(), &signature) {
        debug!("Signature mismatch for {} {} signed by {}", method, canonical_request.canonical_path(), client_email);
        return Err(SigningError::SignatureDoesNotMatch(Some(MSG_REQUEST_SIGNATURE_MISMATCH.to_string())));
    }

    Ok(VerifiedUrl {
        client_email: client_email.to_string(),
        request_timestamp,
        expiration,
        canonical_request_sha256,
    })
}
