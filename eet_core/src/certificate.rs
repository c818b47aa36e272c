// Copyright 2025-, EET-rs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Holder certificate material.
//!
//! A [`Certificate`] bundles the RSA signing key with the X.509 chain
//! (DER-encoded, leaf first) carried in the payload's security token. Both
//! are read-only for the lifetime of the dispatcher that holds them.

use std::{fmt, fs, path::Path};

use rsa::{pkcs8::DecodePrivateKey, RsaPrivateKey};

/// Errors raised while loading certificate material.
#[derive(thiserror::Error, Debug)]
pub enum CertificateError {
    #[error("cannot read `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// Bad passphrase and corrupt key material both end up here; PKCS#8
    /// decryption cannot tell the two apart.
    #[error("private key is unusable: {detail}")]
    Key { detail: String },
    #[error("certificate chain is unusable: {detail}")]
    Chain { detail: String },
}

/// The holder's signing key and certificate chain.
#[derive(Clone)]
pub struct Certificate {
    key: RsaPrivateKey,
    chain: Vec<Vec<u8>>,
}

impl Certificate {
    /// Loads key and chain from PEM files, decrypting the key with
    /// `passphrase` when one is given.
    pub fn from_pem_files(
        key_path: impl AsRef<Path>,
        chain_path: impl AsRef<Path>,
        passphrase: Option<&str>,
    ) -> Result<Self, CertificateError> {
        let key_pem = read(key_path.as_ref())?;
        let chain_pem = read(chain_path.as_ref())?;
        Self::from_pem(&key_pem, &chain_pem, passphrase)
    }

    /// Parses key and chain from PEM text.
    pub fn from_pem(
        key_pem: &str,
        chain_pem: &str,
        passphrase: Option<&str>,
    ) -> Result<Self, CertificateError> {
        let key = match passphrase {
            Some(passphrase) => {
                RsaPrivateKey::from_pkcs8_encrypted_pem(key_pem, passphrase.as_bytes())
            }
            None => RsaPrivateKey::from_pkcs8_pem(key_pem),
        }
        .map_err(|err| CertificateError::Key {
            detail: err.to_string(),
        })?;

        let chain = pem::parse_many(chain_pem)
            .map_err(|err| CertificateError::Chain {
                detail: err.to_string(),
            })?
            .into_iter()
            .filter(|block| block.tag() == "CERTIFICATE")
            .map(pem::Pem::into_contents)
            .collect();

        Ok(Self { key, chain })
    }

    /// Builds a certificate from already-decoded material.
    pub fn from_parts(key: RsaPrivateKey, chain: Vec<Vec<u8>>) -> Self {
        Self { key, chain }
    }

    pub fn signing_key(&self) -> &RsaPrivateKey {
        &self.key
    }

    /// DER-encoded chain, leaf first.
    pub fn chain(&self) -> &[Vec<u8>] {
        &self.chain
    }

    /// DER-encoded leaf certificate, if a chain was loaded.
    pub fn leaf(&self) -> Option<&[u8]> {
        self.chain.first().map(Vec::as_slice)
    }
}

// Key material stays out of logs.
impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("chain_len", &self.chain.len())
            .finish_non_exhaustive()
    }
}

fn read(path: &Path) -> Result<String, CertificateError> {
    fs::read_to_string(path).map_err(|source| CertificateError::Io {
        path: path.display().to_string(),
        source,
    })
}
