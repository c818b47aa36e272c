// Copyright 2025-, EET-rs Contributors
// SPDX-License-Identifier: Apache-2.0

//! # EET security codes
//!
//! This crate contains the signing primitive of the EET registration
//! protocol: the PKP signature code and the BKP security code derived from
//! it.
//!
//! The PKP is an RSA-SHA256 (PKCS#1 v1.5) signature over a canonical
//! plaintext supplied by the message being signed. The BKP is the uppercase
//! hexadecimal SHA-1 digest of the PKP with a dash inserted every eight
//! characters. Both codes are deterministic: the same message and key always
//! produce the same pair, which is what makes local re-verification of a
//! previously signed record possible.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rsa::{
    pkcs1v15::SigningKey,
    signature::{SignatureEncoding, Signer},
    RsaPrivateKey,
};
use sha1::{Digest as _, Sha1};
use sha2::Sha256;

/// Errors returned while producing security codes.
#[derive(thiserror::Error, Debug)]
pub enum SigningError {
    /// The key material could not produce a signature.
    #[error("signing key cannot produce a signature: {detail}")]
    Signature { detail: String },
}

/// Supplies the protocol-fixed plaintext a signature is computed over.
///
/// The concatenation order and field encodings are part of the wire protocol;
/// any deviation produces a signature the registration service rejects.
pub trait CanonicalForm {
    fn canonical_plaintext(&self) -> String;
}

/// Signs `message` with RSA-SHA256 (PKCS#1 v1.5).
pub fn sign_sha256(key: &RsaPrivateKey, message: &[u8]) -> Result<Vec<u8>, SigningError> {
    let signing_key = SigningKey::<Sha256>::new(key.clone());
    let signature = signing_key
        .try_sign(message)
        .map_err(|err| SigningError::Signature {
            detail: err.to_string(),
        })?;
    Ok(signature.to_vec())
}

/// Formats a PKP into its BKP security code.
///
/// Uppercase hex SHA-1 digest, one dash every eight characters.
pub fn bkp_from_pkp(pkp: &[u8]) -> String {
    let digest = hex::encode_upper(Sha1::digest(pkp));
    let mut bkp = String::with_capacity(digest.len() + digest.len() / 8);
    for (index, character) in digest.chars().enumerate() {
        if index > 0 && index % 8 == 0 {
            bkp.push('-');
        }
        bkp.push(character);
    }
    bkp
}

/// The derived PKP/BKP pair for one signed message.
///
/// The BKP is a pure function of the PKP; the pair is constructed together so
/// the two can never drift apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityCodes {
    pkp: Vec<u8>,
    bkp: String,
}

impl SecurityCodes {
    /// Derives the code pair for `message` using `signing_key`.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::Signature`] if the key cannot sign the
    /// canonical plaintext.
    pub fn derive<M>(message: &M, signing_key: &RsaPrivateKey) -> Result<Self, SigningError>
    where
        M: CanonicalForm + ?Sized,
    {
        let plaintext = message.canonical_plaintext();
        let pkp = sign_sha256(signing_key, plaintext.as_bytes())?;
        Ok(Self::from_pkp(pkp))
    }

    /// Rebuilds the pair from a previously stored PKP.
    pub fn from_pkp(pkp: Vec<u8>) -> Self {
        let bkp = bkp_from_pkp(&pkp);
        Self { pkp, bkp }
    }

    /// Raw signature bytes.
    pub fn pkp(&self) -> &[u8] {
        &self.pkp
    }

    /// Base64 rendering of the signature, as carried in the wire payload.
    ///
    /// The encoding is presentational; the underlying bytes are unchanged.
    pub fn pkp_base64(&self) -> String {
        BASE64.encode(&self.pkp)
    }

    /// Dash-grouped security code.
    pub fn bkp(&self) -> &str {
        &self.bkp
    }
}
