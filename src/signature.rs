//! V4 signed URL generation.
//!
//! This implements the Cloud Storage [V4 signing process](https://cloud.google.com/storage/docs/access-control/signing-urls-manually)
//! for service accounts (`GOOG4-RSA-SHA256`).

use {
    crate::{
        canonical::{
            canonicalize_headers, canonicalize_query_to_string, signed_headers_to_string, uri_encode,
            CanonicalRequest, UriElement,
        },
        chronoutil::{Clock, RequestTimestamp, SystemClock},
        constants::*,
        crypto::rsa_sha256_sign,
        SigningError, SigningIdentity,
    },
    chrono::{DateTime, Utc},
    derive_builder::Builder,
    http::{
        header::{HeaderMap, HeaderName, HeaderValue, HOST},
        method::Method,
    },
    log::debug,
    std::{collections::HashMap, sync::Arc},
};

/// How the bucket is addressed in a signed URL.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UrlStyle {
    /// `https://{bucket}.storage.googleapis.com/{object}`
    #[default]
    VirtualHosted,

    /// `https://storage.googleapis.com/{bucket}/{object}`
    PathStyle,
}

/// Options that can be used to configure URL signing.
#[derive(Clone, Debug)]
pub struct SigningOptions {
    /// How the bucket is addressed.
    pub url_style: UrlStyle,

    /// The host serving the XML API. Override this to sign URLs for an emulator.
    pub service_host: String,

    /// The location component of the credential scope.
    pub location: String,
}

impl Default for SigningOptions {
    fn default() -> Self {
        Self {
            url_style: UrlStyle::default(),
            service_host: DEFAULT_SERVICE_HOST.to_string(),
            location: DEFAULT_LOCATION.to_string(),
        }
    }
}

impl SigningOptions {
    /// Create a `SigningOptions` that addresses buckets in the path rather than the host name.
    pub fn path_style() -> Self {
        Self {
            url_style: UrlStyle::PathStyle,
            ..Self::default()
        }
    }

    /// The host name requests for `bucket` are sent to.
    pub fn host(&self, bucket: &str) -> String {
        match self.url_style {
            UrlStyle::VirtualHosted => format!("{}.{}", bucket, self.service_host),
            UrlStyle::PathStyle => self.service_host.clone(),
        }
    }

    /// The percent-encoded resource path for `object` in `bucket`, starting with `/`.
    pub fn canonical_path(&self, bucket: &str, object: &str) -> String {
        match self.url_style {
            UrlStyle::VirtualHosted => format!("/{}", uri_encode(object, UriElement::Path)),
            UrlStyle::PathStyle => {
                format!("/{}/{}", uri_encode(bucket, UriElement::Path), uri_encode(object, UriElement::Path))
            }
        }
    }
}

/// The parameters of a single signed URL.
///
/// SignRequest structs are immutable. Use [SignRequestBuilder] to construct a new request.
#[derive(Builder, Clone, Debug)]
#[builder(derive(Debug))]
pub struct SignRequest {
    /// The bucket holding the object.
    #[builder(setter(into))]
    bucket: String,

    /// The object name, unencoded, e.g. `reports/jan.csv`.
    #[builder(setter(into))]
    object: String,

    /// The HTTP method the URL may be used with.
    #[builder(default = "Method::GET")]
    method: Method,

    /// A subresource such as `uploads`, signed as a query parameter with an empty value.
    #[builder(setter(into, strip_option), default)]
    subresource: Option<String>,

    /// The lifetime of the URL in seconds. At most 604800 (seven days).
    #[builder(default = "MAX_EXPIRATION_SECS")]
    expiration: u64,

    /// Headers the client must send with the request. `host` is added if absent.
    #[builder(setter(custom), default)]
    headers: HeaderMap,

    /// Additional query parameters to sign. Reserved `X-Goog-*` parameters always take precedence.
    #[builder(setter(custom), default)]
    query_parameters: HashMap<String, String>,
}

impl SignRequestBuilder {
    /// Add a header the client must send. Repeated names are signed as a comma-joined list.
    pub fn header(&mut self, name: HeaderName, value: HeaderValue) -> &mut Self {
        self.headers.get_or_insert_with(HeaderMap::new).append(name, value);
        self
    }

    /// Replace all headers.
    pub fn headers(&mut self, headers: HeaderMap) -> &mut Self {
        self.headers = Some(headers);
        self
    }

    /// Add a query parameter to sign.
    pub fn query_parameter<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) -> &mut Self {
        self.query_parameters.get_or_insert_with(HashMap::new).insert(key.into(), value.into());
        self
    }

    /// Replace all query parameters.
    pub fn query_parameters(&mut self, query_parameters: HashMap<String, String>) -> &mut Self {
        self.query_parameters = Some(query_parameters);
        self
    }
}

impl SignRequest {
    /// Create a [SignRequestBuilder] to construct a [SignRequest].
    #[inline]
    pub fn builder() -> SignRequestBuilder {
        SignRequestBuilder::default()
    }

    /// A request for a `PUT` upload URL valid for five minutes, creating a private object.
    pub fn upload<B: Into<String>, O: Into<String>>(bucket: B, object: O) -> Self {
        Self::canned(bucket.into(), object.into(), Method::PUT, UPLOAD_EXPIRATION_SECS, UPLOAD_GOOG_ACL)
    }

    /// A request for a `GET` download URL valid for fifteen minutes, with the `public-read` ACL header.
    pub fn download<B: Into<String>, O: Into<String>>(bucket: B, object: O) -> Self {
        Self::canned(bucket.into(), object.into(), Method::GET, DOWNLOAD_EXPIRATION_SECS, DOWNLOAD_GOOG_ACL)
    }

    fn canned(bucket: String, object: String, method: Method, expiration: u64, acl: &'static str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(HDR_X_GOOG_ACL), HeaderValue::from_static(acl));

        Self {
            bucket,
            object,
            method,
            subresource: None,
            expiration,
            headers,
            query_parameters: HashMap::new(),
        }
    }

    /// Retrieve the bucket name.
    #[inline]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Retrieve the object name.
    #[inline]
    pub fn object(&self) -> &str {
        &self.object
    }

    /// Retrieve the HTTP method.
    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Retrieve the subresource, if any.
    #[inline]
    pub fn subresource(&self) -> Option<&str> {
        self.subresource.as_deref()
    }

    /// Retrieve the expiration in seconds.
    #[inline]
    pub fn expiration(&self) -> u64 {
        self.expiration
    }

    /// Retrieve the headers to sign, not including the injected `host`.
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Retrieve the extra query parameters.
    #[inline]
    pub fn query_parameters(&self) -> &HashMap<String, String> {
        &self.query_parameters
    }
}

/// A signed URL together with the canonical request hash that was signed. Handy when comparing
/// against the canonical request a verifying service reports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Presigned {
    pub(crate) url: String,
    pub(crate) canonical_request_sha256: String,
}

/// Build the signed URL for `request` as of `timestamp`.
pub(crate) fn presign(
    identity: &SigningIdentity,
    request: &SignRequest,
    options: &SigningOptions,
    timestamp: DateTime<Utc>,
) -> Result<Presigned, SigningError> {
    if request.expiration() > MAX_EXPIRATION_SECS {
        return Err(SigningError::InvalidExpiration(request.expiration()));
    }

    identity.validate()?;

    let ts = RequestTimestamp::from(timestamp);
    let host = options.host(request.bucket());
    let canonical_path = options.canonical_path(request.bucket(), request.object());

    let mut headers = request.headers().clone();
    if !headers.contains_key(HOST) {
        let host_value = HeaderValue::from_str(&host)
            .map_err(|_| SigningError::MalformedHeader(format!("Invalid host header value: {}", host)))?;
        headers.insert(HOST, host_value);
    }
    let headers = canonicalize_headers(&headers)?;
    let signed_headers = signed_headers_to_string(&headers);

    let credential_scope = format!("{}/{}/{}/{}", ts.datestamp, options.location, STORAGE_SERVICE, GOOG4_REQUEST);
    let credential = format!("{}/{}", identity.client_email(), credential_scope);

    // Later inserts win: caller parameters, then the subresource, then the reserved parameters.
    let mut query_parameters = request.query_parameters().clone();
    if let Some(subresource) = request.subresource() {
        query_parameters.insert(subresource.to_string(), String::new());
    }
    for (key, value) in [
        (QP_X_GOOG_ALGORITHM, GOOG4_RSA_SHA256.to_string()),
        (QP_X_GOOG_CREDENTIAL, credential),
        (QP_X_GOOG_DATE, ts.request_timestamp.clone()),
        (QP_X_GOOG_EXPIRES, request.expiration().to_string()),
        (QP_X_GOOG_SIGNED_HEADERS, signed_headers),
    ] {
        query_parameters.insert(key.to_string(), value);
    }
    let query_parameters: Vec<(String, String)> = query_parameters.into_iter().collect();
    let canonical_query_string = canonicalize_query_to_string(&query_parameters);

    let canonical_request =
        CanonicalRequest::new(request.method().as_str(), canonical_path, canonical_query_string, headers);
    let canonical_request_sha256 = canonical_request.canonical_request_sha256();
    let string_to_sign = canonical_request.string_to_sign(&ts.request_timestamp, &credential_scope);
    let signature = hex::encode(rsa_sha256_sign(identity.private_key(), string_to_sign.as_bytes())?);

    let url = format!(
        "https://{}{}?{}&{}={}",
        host,
        canonical_request.canonical_path(),
        canonical_request.canonical_query_string(),
        QP_X_GOOG_SIGNATURE,
        signature
    );

    debug!(
        "Signed {} URL for gs://{}/{} as {} (expires in {} sec)",
        request.method(),
        request.bucket(),
        request.object(),
        identity.client_email(),
        request.expiration()
    );

    Ok(Presigned {
        url,
        canonical_request_sha256,
    })
}

/// Produce a signed URL for `request`, valid from the current system time.
///
/// # Errors
/// * [`SigningError::InvalidExpiration`] if the expiration exceeds seven days.
/// * [`SigningError::MissingIdentity`] if the identity's client email is empty or malformed.
/// * [`SigningError::MalformedHeader`] if a header value is not visible ASCII.
/// * [`SigningError::SigningFailure`] if the RSA signing operation fails.
pub fn sign(identity: &SigningIdentity, request: &SignRequest) -> Result<String, SigningError> {
    sign_at(identity, request, SystemClock.now())
}

/// Produce a signed URL for `request`, valid from `timestamp`. Identical inputs produce identical
/// output.
///
/// # Errors
/// See [`sign`].
pub fn sign_at(
    identity: &SigningIdentity,
    request: &SignRequest,
    timestamp: DateTime<Utc>,
) -> Result<String, SigningError> {
    presign(identity, request, &SigningOptions::default(), timestamp).map(|p| p.url)
}

/// Produce a `PUT` URL for uploading `object` into `bucket`: five minutes, `x-goog-acl: private`.
pub fn upload_url(identity: &SigningIdentity, bucket: &str, object: &str) -> Result<String, SigningError> {
    sign(identity, &SignRequest::upload(bucket, object))
}

/// Produce a `GET` URL for downloading `object` from `bucket`: fifteen minutes,
/// `x-goog-acl: public-read`.
pub fn download_url(identity: &SigningIdentity, bucket: &str, object: &str) -> Result<String, SigningError> {
    sign(identity, &SignRequest::download(bucket, object))
}

/// A reusable signer bound to one identity, clock, and set of options.
///
/// `UrlSigner` holds no mutable state and is cheap to clone; share one across threads.
#[derive(Clone, Debug)]
pub struct UrlSigner<C = SystemClock> {
    identity: Arc<SigningIdentity>,
    clock: C,
    options: SigningOptions,
}

impl UrlSigner<SystemClock> {
    /// Create a signer using the system clock and default options.
    pub fn new(identity: Arc<SigningIdentity>) -> Self {
        Self::with_clock(identity, SystemClock)
    }
}

impl<C: Clock> UrlSigner<C> {
    /// Create a signer using the given clock and default options.
    pub fn with_clock(identity: Arc<SigningIdentity>, clock: C) -> Self {
        Self {
            identity,
            clock,
            options: SigningOptions::default(),
        }
    }

    /// Replace the signing options.
    pub fn with_options(mut self, options: SigningOptions) -> Self {
        self.options = options;
        self
    }

    /// Retrieve the signing identity.
    #[inline]
    pub fn identity(&self) -> &SigningIdentity {
        &self.identity
    }

    /// Retrieve the signing options.
    #[inline]
    pub fn options(&self) -> &SigningOptions {
        &self.options
    }

    /// Produce a signed URL for `request`.
    ///
    /// # Errors
    /// See [`sign`].
    pub fn sign(&self, request: &SignRequest) -> Result<String, SigningError> {
        presign(&self.identity, request, &self.options, self.clock.now()).map(|p| p.url)
    }

    /// Produce a `PUT` URL for uploading `object` into `bucket`.
    pub fn upload_url(&self, bucket: &str, object: &str) -> Result<String, SigningError> {
        self.sign(&SignRequest::upload(bucket, object))
    }

    /// Produce a `GET` URL for downloading `object` from `bucket`.
    pub fn download_url(&self, bucket: &str, object: &str) -> Result<String, SigningError> {
        self.sign(&SignRequest::download(bucket, object))
    }
}
