// Copyright 2025-, EET-rs Contributors
// SPDX-License-Identifier: Apache-2.0

//! WS-Security header: binary security token plus a signature over the
//! rendered body bytes.
//!
//! The reference digests the body exactly as this client rendered it; the
//! rendering is deterministic, so no separate canonicalization pass runs
//! before signing.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use sha2::{Digest as _, Sha256};

use super::{request::PayloadError, DS_NS, WSSE_NS, WSU_NS};
use crate::certificate::Certificate;

const EXC_C14N: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";
const RSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256";
const XMLENC_SHA256: &str = "http://www.w3.org/2001/04/xmlenc#sha256";
const X509_V3: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-x509-token-profile-1.0#X509v3";
const BASE64_BINARY: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-soap-message-security-1.0#Base64Binary";

/// Renders the `wsse:Security` header for a rendered body.
pub(super) fn security_header(
    body: &[u8],
    certificate: &Certificate,
) -> Result<String, PayloadError> {
    let digest = BASE64.encode(Sha256::digest(body));
    let signed_info = format!(
        r##"<ds:SignedInfo xmlns:ds="{DS_NS}"><ds:CanonicalizationMethod Algorithm="{EXC_C14N}"/><ds:SignatureMethod Algorithm="{RSA_SHA256}"/><ds:Reference URI="#Body"><ds:Transforms><ds:Transform Algorithm="{EXC_C14N}"/></ds:Transforms><ds:DigestMethod Algorithm="{XMLENC_SHA256}"/><ds:DigestValue>{digest}</ds:DigestValue></ds:Reference></ds:SignedInfo>"##
    );
    let signature_value = BASE64.encode(eet_signing::sign_sha256(
        certificate.signing_key(),
        signed_info.as_bytes(),
    )?);

    let mut header = format!(
        r#"<wsse:Security xmlns:wsse="{WSSE_NS}" xmlns:wsu="{WSU_NS}" soapenv:mustUnderstand="1">"#
    );
    if let Some(leaf) = certificate.leaf() {
        let token = BASE64.encode(leaf);
        header.push_str(&format!(
            r#"<wsse:BinarySecurityToken wsu:Id="Token" EncodingType="{BASE64_BINARY}" ValueType="{X509_V3}">{token}</wsse:BinarySecurityToken>"#
        ));
    }
    header.push_str(&format!(
        r##"<ds:Signature xmlns:ds="{DS_NS}">{signed_info}<ds:SignatureValue>{signature_value}</ds:SignatureValue><ds:KeyInfo><wsse:SecurityTokenReference><wsse:Reference URI="#Token" ValueType="{X509_V3}"/></wsse:SecurityTokenReference></ds:KeyInfo></ds:Signature>"##
    ));
    header.push_str("</wsse:Security>");
    Ok(header)
}
