//! The `goog4_signed_url` crate generates Google Cloud Storage V4 signed URLs: time-limited URLs that grant
//! whoever holds them access to a single object with a single HTTP method, without further credentials.
//!
//! URLs are signed with the RSA private key of a service account (`GOOG4-RSA-SHA256`). Nothing here performs
//! network I/O; the signature is computed entirely from the request parameters, the signing time, and the key.
//!
//! # Workflow
//! 1. Load a [`SigningIdentity`] once, usually from a service account JSON key file.
//! 2. Describe the access to grant with a [`SignRequest`], or use [`upload_url`]/[`download_url`] for the common
//!    cases.
//! 3. Call [`sign`] (or [`UrlSigner::sign`] if you need a non-default host, addressing style, or clock) and hand the
//!    URL to the client.
//!
//! [`verify_signed_url`] performs the reverse check, as the storage service would, which is handy when debugging a
//! `SignatureDoesNotMatch` response.
//!
//! ## Example
//! ```rust,no_run
//! use goog4_signed_url::{sign, upload_url, SignRequest, SigningIdentity};
//! use http::{header::HeaderName, HeaderValue, Method};
//! use std::error::Error;
//!
//! # fn main() -> Result<(), Box<dyn Error>> {
//! let json = std::fs::read_to_string("service-account.json")?;
//! let identity = SigningIdentity::from_service_account_json(&json)?;
//!
//! // A five-minute PUT URL with `x-goog-acl: private`. The uploader must send that header.
//! let put_url = upload_url(&identity, "example-bucket", "incoming/report.csv")?;
//! println!("{}", put_url);
//!
//! // Anything else goes through the request builder.
//! let request = SignRequest::builder()
//!     .bucket("example-bucket")
//!     .object("reports/2024/jan.csv")
//!     .method(Method::GET)
//!     .expiration(3600)
//!     .header(HeaderName::from_static("x-goog-meta-owner"), HeaderValue::from_static("finance"))
//!     .query_parameter("response-content-disposition", "attachment")
//!     .build()?;
//! println!("{}", sign(&identity, &request)?);
//! # Ok(())
//! # }
//! ```
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(rustdoc::missing_crate_level_docs)]

#[cfg(any(doc, feature = "unstable"))]
pub mod canonical;
#[cfg(not(any(doc, feature = "unstable")))]
mod canonical;

mod chronoutil;
mod constants;
mod crypto;
mod error;
mod identity;
mod signature;
mod verify;

pub use crate::{
    chronoutil::{Clock, FixedClock, RequestTimestamp, SystemClock},
    error::SigningError,
    identity::SigningIdentity,
    signature::{
        download_url, sign, sign_at, upload_url, SignRequest, SignRequestBuilder, SignRequestBuilderError,
        SigningOptions, UrlSigner, UrlStyle,
    },
    verify::{verify_signed_url, VerifiedUrl},
};

#[cfg(test)]
mod unittest;
