use {
    crate::constants::*,
    http::status::StatusCode,
    std::{
        error::Error,
        fmt::{Display, Formatter, Result as FmtResult},
    },
};

/// Error returned when a signed URL cannot be produced or fails verification.
#[derive(Debug)]
#[non_exhaustive]
pub enum SigningError {
    /// The signed URL is outside its validity window. Sample messages:
    /// `Signature expired: 20240115T000000Z + 900 sec is now earlier than 20240115T001500Z`
    /// `Signature not yet current: 20240115T000000Z is still later than 20240114T235959Z`
    ExpiredSignature(/* message */ String),

    /// The signed URL lacks one of the `X-Goog-*` parameters, or one of them cannot be parsed.
    IncompleteSignature(/* message */ String),

    /// The requested expiration exceeds 604800 seconds (seven days).
    InvalidExpiration(/* requested seconds */ u64),

    /// The URI path of a signed URL contains an invalid percent-encoding.
    InvalidURIPath(/* message */ String),

    /// A header value could not be represented as visible ASCII.
    MalformedHeader(/* message */ String),

    /// A query parameter was malformed; typically a bad or incomplete `%` escape.
    ///
    /// `Incomplete trailing escape % sequence`
    MalformedQueryString(/* message */ String),

    /// The signing identity is absent or malformed: an empty client email, or key material that
    /// could not be loaded.
    MissingIdentity(/* message */ String),

    /// Signature did not match the calculated signature value.
    SignatureDoesNotMatch(Option</* message */ String>),

    /// The RSA signing primitive failed.
    SigningFailure(rsa::signature::Error),
}

impl SigningError {
    /// Stable, machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ExpiredSignature(_) => ERR_CODE_EXPIRED_SIGNATURE,
            Self::IncompleteSignature(_) => ERR_CODE_INCOMPLETE_SIGNATURE,
            Self::InvalidExpiration(_) => ERR_CODE_INVALID_EXPIRATION,
            Self::InvalidURIPath(_) => ERR_CODE_INVALID_URI_PATH,
            Self::MalformedHeader(_) => ERR_CODE_MALFORMED_HEADER,
            Self::MalformedQueryString(_) => ERR_CODE_MALFORMED_QUERY_STRING,
            Self::MissingIdentity(_) => ERR_CODE_MISSING_IDENTITY,
            Self::SignatureDoesNotMatch(_) => ERR_CODE_SIGNATURE_DOES_NOT_MATCH,
            Self::SigningFailure(_) => ERR_CODE_SIGNING_FAILURE,
        }
    }

    /// HTTP status a service wrapping this crate should report for this error.
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::IncompleteSignature(_)
            | Self::InvalidExpiration(_)
            | Self::InvalidURIPath(_)
            | Self::MalformedHeader(_)
            | Self::MalformedQueryString(_) => StatusCode::BAD_REQUEST,
            Self::MissingIdentity(_) | Self::SigningFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::FORBIDDEN,
        }
    }
}

impl Display for SigningError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::ExpiredSignature(msg) => f.write_str(msg),
            Self::IncompleteSignature(msg) => f.write_str(msg),
            Self::InvalidExpiration(secs) => write!(
                f,
                "Expiration Time can't be longer than {} seconds (7 days); got {}.",
                MAX_EXPIRATION_SECS, secs
            ),
            Self::InvalidURIPath(msg) => f.write_str(msg),
            Self::MalformedHeader(msg) => f.write_str(msg),
            Self::MalformedQueryString(msg) => f.write_str(msg),
            Self::MissingIdentity(msg) => f.write_str(msg),
            Self::SignatureDoesNotMatch(msg) => {
                if let Some(msg) = msg {
                    f.write_str(msg)
                } else {
                    Ok(())
                }
            }
            Self::SigningFailure(ref e) => write!(f, "RSA signing failed: {}", e),
        }
    }
}

impl Error for SigningError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::SigningFailure(ref e) => Some(e),
            _ => None,
        }
    }
}

impl From<rsa::signature::Error> for SigningError {
    fn from(e: rsa::signature::Error) -> SigningError {
        SigningError::SigningFailure(e)
    }
}
