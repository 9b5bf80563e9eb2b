use {
    crate::SigningError,
    rsa::{
        pkcs1v15::{Signature, SigningKey, VerifyingKey},
        signature::{SignatureEncoding, Signer, Verifier},
        RsaPrivateKey, RsaPublicKey,
    },
    sha2::{Digest, Sha256},
};

/// The length of a SHA-256 digest in bytes.
pub(crate) const SHA256_OUTPUT_LEN: usize = 32;

#[inline(always)]
pub(crate) fn sha256(value: &[u8]) -> [u8; SHA256_OUTPUT_LEN] {
    let mut result = [0; SHA256_OUTPUT_LEN];
    result.copy_from_slice(Sha256::digest(value).as_slice());
    result
}

#[inline(always)]
pub(crate) fn sha256_hex(value: &[u8]) -> String {
    hex::encode(sha256(value))
}

/// RSASSA-PKCS1-v1_5 over SHA-256 of `value`.
pub(crate) fn rsa_sha256_sign(key: &RsaPrivateKey, value: &[u8]) -> Result<Vec<u8>, SigningError> {
    let signing_key = SigningKey::<Sha256>::new(key.clone());
    let signature = signing_key.try_sign(value)?;
    Ok(signature.to_vec())
}

/// Check an RSASSA-PKCS1-v1_5/SHA-256 signature. Returns `false` for malformed signatures.
pub(crate) fn rsa_sha256_verify(key: &RsaPublicKey, value: &[u8], signature: &[u8]) -> bool {
    let verifying_key = VerifyingKey::<Sha256>::new(key.clone());
    match Signature::try_from(signature) {
        Ok(signature) => verifying_key.verify(value, &signature).is_ok(),
        Err(_) => false,
    }
}
