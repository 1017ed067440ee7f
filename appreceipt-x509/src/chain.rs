// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Certificate-chain validation against caller-provided roots.
//!
//! Trust anchors are always explicit DER certificates handed in by the
//! caller; there is no system trust store. A chain is valid when every link
//! verifies and the terminating issuer is byte-for-byte one of the anchors.

use p256::elliptic_curve::sec1::ToEncodedPoint as _;
use rsa::pkcs1v15;
use rsa::pkcs8::DecodePublicKey as _;
use rsa::RsaPublicKey;
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};
use signature::Verifier as _;

use crate::VerifyError;

#[derive(Debug, Clone)]
pub(crate) struct ParsedCert {
    pub(crate) der: Vec<u8>,
    pub(crate) subject_raw: Vec<u8>,
    pub(crate) issuer_raw: Vec<u8>,
    pub(crate) serial: Vec<u8>,
    pub(crate) spki_der: Vec<u8>,
    tbs_der: Vec<u8>,
    signature_oid: String,
    signature: Vec<u8>,
}

pub(crate) fn parse_cert_der(der: &[u8]) -> Result<ParsedCert, VerifyError> {
    let (_, cert) = x509_parser::parse_x509_certificate(der)
        .map_err(|e| VerifyError::InvalidCertificate(format!("invalid cert DER: {e}")))?;

    Ok(ParsedCert {
        der: der.to_vec(),
        subject_raw: cert.tbs_certificate.subject.as_raw().to_vec(),
        issuer_raw: cert.tbs_certificate.issuer.as_raw().to_vec(),
        serial: cert.raw_serial().to_vec(),
        spki_der: cert.tbs_certificate.subject_pki.raw.to_vec(),
        // `x509-parser` keeps the raw DER for TBSCertificate; expose it via `AsRef`.
        tbs_der: cert.tbs_certificate.as_ref().to_vec(),
        signature_oid: cert.signature_algorithm.algorithm.to_string(),
        signature: cert.signature_value.data.to_vec(),
    })
}

fn rsa_public_key_from_spki(spki_der: &[u8]) -> Result<RsaPublicKey, VerifyError> {
    RsaPublicKey::from_public_key_der(spki_der)
        .map_err(|e| VerifyError::InvalidCertificate(format!("bad RSA public key: {e}")))
}

/// Verify one chain link: `current`'s TBS bytes against its issuer's key.
fn verify_cert_signature(
    issuer_spki_der: &[u8],
    tbs_der: &[u8],
    signature_oid: &str,
    signature: &[u8],
) -> Result<(), VerifyError> {
    match signature_oid {
        // sha1/sha256/sha384/sha512 WithRSAEncryption
        "1.2.840.113549.1.1.5" => {
            let key = rsa_public_key_from_spki(issuer_spki_der)?;
            let vk = pkcs1v15::VerifyingKey::<Sha1>::new(key);
            let sig = pkcs1v15::Signature::try_from(signature)
                .map_err(|_| VerifyError::BadSignature)?;
            vk.verify(tbs_der, &sig).map_err(|_| VerifyError::BadSignature)
        }
        "1.2.840.113549.1.1.11" => {
            let key = rsa_public_key_from_spki(issuer_spki_der)?;
            let vk = pkcs1v15::VerifyingKey::<Sha256>::new(key);
            let sig = pkcs1v15::Signature::try_from(signature)
                .map_err(|_| VerifyError::BadSignature)?;
            vk.verify(tbs_der, &sig).map_err(|_| VerifyError::BadSignature)
        }
        "1.2.840.113549.1.1.12" => {
            let key = rsa_public_key_from_spki(issuer_spki_der)?;
            let vk = pkcs1v15::VerifyingKey::<Sha384>::new(key);
            let sig = pkcs1v15::Signature::try_from(signature)
                .map_err(|_| VerifyError::BadSignature)?;
            vk.verify(tbs_der, &sig).map_err(|_| VerifyError::BadSignature)
        }
        "1.2.840.113549.1.1.13" => {
            let key = rsa_public_key_from_spki(issuer_spki_der)?;
            let vk = pkcs1v15::VerifyingKey::<Sha512>::new(key);
            let sig = pkcs1v15::Signature::try_from(signature)
                .map_err(|_| VerifyError::BadSignature)?;
            vk.verify(tbs_der, &sig).map_err(|_| VerifyError::BadSignature)
        }

        // ecdsa-with-SHA256 / SHA384
        "1.2.840.10045.4.3.2" => {
            let pk = p256::PublicKey::from_public_key_der(issuer_spki_der)
                .map_err(|e| VerifyError::InvalidCertificate(format!("bad P-256 issuer key: {e}")))?;
            let ep = pk.to_encoded_point(false);
            let vk = p256::ecdsa::VerifyingKey::from_sec1_bytes(ep.as_bytes())
                .map_err(|e| VerifyError::InvalidCertificate(format!("bad P-256 issuer key: {e}")))?;
            let sig = p256::ecdsa::Signature::from_der(signature)
                .map_err(|_| VerifyError::BadSignature)?;
            vk.verify(tbs_der, &sig).map_err(|_| VerifyError::BadSignature)
        }
        "1.2.840.10045.4.3.3" => {
            let pk = p384::PublicKey::from_public_key_der(issuer_spki_der)
                .map_err(|e| VerifyError::InvalidCertificate(format!("bad P-384 issuer key: {e}")))?;
            let ep = pk.to_encoded_point(false);
            let vk = p384::ecdsa::VerifyingKey::from_sec1_bytes(ep.as_bytes())
                .map_err(|e| VerifyError::InvalidCertificate(format!("bad P-384 issuer key: {e}")))?;
            let sig = p384::ecdsa::Signature::from_der(signature)
                .map_err(|_| VerifyError::BadSignature)?;
            vk.verify(tbs_der, &sig).map_err(|_| VerifyError::BadSignature)
        }

        _ => Err(VerifyError::UnsupportedAlgorithm(signature_oid.to_string())),
    }
}

/// Validate a chain from `leaf_der` to one of `trusted_roots_der`.
///
/// `intermediates_der` are the other certificates the envelope shipped;
/// issuers are searched there first, then among the anchors.
pub fn validate_certificate_chain(
    leaf_der: &[u8],
    intermediates_der: &[&[u8]],
    trusted_roots_der: &[Vec<u8>],
) -> Result<(), VerifyError> {
    if trusted_roots_der.is_empty() {
        return Err(VerifyError::NoTrustAnchors);
    }

    let leaf = parse_cert_der(leaf_der)?;

    // A leaf that is itself one of the anchors is trusted as-is.
    if trusted_roots_der.iter().any(|r| r.as_slice() == leaf_der) {
        return Ok(());
    }

    let mut intermediates = Vec::new();
    for der in intermediates_der {
        if der.is_empty() {
            continue;
        }
        // Unparseable extras are skipped, not fatal; they just cannot help
        // the chain terminate.
        if let Ok(cert) = parse_cert_der(der) {
            intermediates.push(cert);
        }
    }

    let mut anchors = Vec::new();
    for root_der in trusted_roots_der {
        anchors.push(parse_cert_der(root_der)?);
    }

    // Walk leaf -> ... -> anchor, verifying each link.
    let mut current = leaf;
    let mut depth = 0usize;
    const MAX_DEPTH: usize = 16;
    while depth < MAX_DEPTH {
        depth += 1;

        let mut found: Option<ParsedCert> = None;
        for issuer in intermediates.iter().chain(anchors.iter()) {
            if issuer.subject_raw != current.issuer_raw {
                continue;
            }
            if verify_cert_signature(
                &issuer.spki_der,
                &current.tbs_der,
                &current.signature_oid,
                &current.signature,
            )
            .is_ok()
            {
                found = Some(issuer.clone());
                break;
            }
        }

        let Some(issuer) = found else {
            return Err(VerifyError::UntrustedChain);
        };

        if anchors.iter().any(|a| a.der == issuer.der) {
            return Ok(());
        }

        current = issuer;
    }

    Err(VerifyError::UntrustedChain)
}
