// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! PKCS7 signer verification.
//!
//! For each SignerInfo in the envelope:
//! 1. Locate the signer certificate among the embedded certificates by
//!    issuer name and serial number.
//! 2. Chain that certificate to one of the trust anchors.
//! 3. Verify the signature: over the content octets directly, or — when
//!    authenticated attributes are present — over the attribute SET, after
//!    checking the message-digest attribute against the content.
//!
//! Every signer must verify; a container is never partially trusted.

use appreceipt_asn1::{Decoder, Encoder};
use appreceipt_pkcs7::{ReceiptContainer, SignerInfo, OID_PKCS9_MESSAGE_DIGEST};
use p256::elliptic_curve::sec1::ToEncodedPoint as _;
use rsa::pkcs1v15;
use rsa::pkcs8::DecodePublicKey as _;
use rsa::RsaPublicKey;
use sha1::Sha1;
use sha2::{Digest as _, Sha256};
use signature::Verifier as _;

use crate::chain::{parse_cert_der, validate_certificate_chain};
use crate::VerifyError;

/// rsaEncryption, 1.2.840.113549.1.1.1
const OID_RSA_ENCRYPTION: &[u8] = &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x01];
/// sha1WithRSAEncryption, 1.2.840.113549.1.1.5
const OID_SHA1_WITH_RSA: &[u8] = &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x05];
/// sha256WithRSAEncryption, 1.2.840.113549.1.1.11
const OID_SHA256_WITH_RSA: &[u8] = &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x0B];
/// id-sha1, 1.3.14.3.2.26
const OID_SHA1: &[u8] = &[0x2B, 0x0E, 0x03, 0x02, 0x1A];
/// id-sha256, 2.16.840.1.101.3.4.2.1
const OID_SHA256: &[u8] = &[0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x01];
/// ecdsa-with-SHA256, 1.2.840.10045.4.3.2
const OID_ECDSA_SHA256: &[u8] = &[0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x04, 0x03, 0x02];
/// ecdsa-with-SHA384, 1.2.840.10045.4.3.3
const OID_ECDSA_SHA384: &[u8] = &[0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x04, 0x03, 0x03];

/// Verify every signer of a parsed envelope against the trust anchors.
pub fn verify_signed_container(
    container: &ReceiptContainer<'_>,
    trusted_roots_der: &[Vec<u8>],
) -> Result<(), VerifyError> {
    if trusted_roots_der.is_empty() {
        return Err(VerifyError::NoTrustAnchors);
    }

    let signers = container.signer_infos();
    if signers.is_empty() {
        return Err(VerifyError::NoSigners);
    }

    // The envelope parser guarantees content for signed containers.
    let content = container.content().ok_or(VerifyError::BadSignature)?;

    for signer in signers {
        verify_signer(signer, content, container.certificates(), trusted_roots_der)?;
    }
    Ok(())
}

fn verify_signer(
    signer: &SignerInfo<'_>,
    content: &[u8],
    certificates: &[&[u8]],
    trusted_roots_der: &[Vec<u8>],
) -> Result<(), VerifyError> {
    let cert_der = find_signer_certificate(signer, certificates)?;
    let cert = parse_cert_der(cert_der)?;

    let intermediates: Vec<&[u8]> = certificates
        .iter()
        .copied()
        .filter(|der| *der != cert_der)
        .collect();
    validate_certificate_chain(cert_der, &intermediates, trusted_roots_der)?;

    match signer.signed_attributes {
        None => verify_signature(signer, &cert.spki_der, content),
        Some(attrs) => {
            // The digest attribute binds the attributes to the content; the
            // signature then covers the attributes re-encoded as a SET.
            let digest = digest_content(signer.digest_alg_oid, content)?;
            let declared = find_message_digest(attrs.raw)?;
            if declared != digest.as_slice() {
                return Err(VerifyError::DigestMismatch);
            }
            let mut enc = Encoder::new();
            enc.write_set(attrs.raw);
            verify_signature(signer, &cert.spki_der, &enc.finish())
        }
    }
}

/// Find the embedded certificate matching a signer's issuer and serial.
fn find_signer_certificate<'a>(
    signer: &SignerInfo<'_>,
    certificates: &[&'a [u8]],
) -> Result<&'a [u8], VerifyError> {
    let wanted_serial = strip_leading_zeros(signer.serial);
    for der in certificates {
        let Ok(cert) = parse_cert_der(der) else {
            continue;
        };
        if cert.issuer_raw == signer.issuer_raw
            && strip_leading_zeros(&cert.serial) == wanted_serial
        {
            return Ok(der);
        }
    }
    Err(VerifyError::SignerCertificateNotFound)
}

fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().take_while(|&&b| b == 0).count();
    &bytes[start.min(bytes.len().saturating_sub(1))..]
}

fn digest_content(digest_alg_oid: &[u8], content: &[u8]) -> Result<Vec<u8>, VerifyError> {
    match digest_alg_oid {
        OID_SHA1 => Ok(Sha1::digest(content).to_vec()),
        OID_SHA256 => Ok(Sha256::digest(content).to_vec()),
        other => Err(VerifyError::UnsupportedAlgorithm(oid_hex(other))),
    }
}

/// Extract the message-digest attribute value from an attribute block.
fn find_message_digest(attrs_raw: &[u8]) -> Result<Vec<u8>, VerifyError> {
    let mut attrs = Decoder::new(attrs_raw);
    while !attrs.is_empty() {
        let mut attr = attrs
            .read_sequence()
            .map_err(|_| VerifyError::DigestMismatch)?;
        let oid = attr.read_oid().map_err(|_| VerifyError::DigestMismatch)?;
        if oid == OID_PKCS9_MESSAGE_DIGEST {
            let mut values = attr.read_set().map_err(|_| VerifyError::DigestMismatch)?;
            let digest = values
                .read_octet_string()
                .map_err(|_| VerifyError::DigestMismatch)?;
            return Ok(digest.to_vec());
        }
    }
    Err(VerifyError::DigestMismatch)
}

/// Verify a signer's signature over `message` with the certificate's key.
fn verify_signature(
    signer: &SignerInfo<'_>,
    spki_der: &[u8],
    message: &[u8],
) -> Result<(), VerifyError> {
    match signer.signature_alg_oid {
        // Plain rsaEncryption defers the digest choice to digestAlgorithm.
        OID_RSA_ENCRYPTION => match signer.digest_alg_oid {
            OID_SHA1 => verify_rsa_sha1(spki_der, message, signer.signature),
            OID_SHA256 => verify_rsa_sha256(spki_der, message, signer.signature),
            other => Err(VerifyError::UnsupportedAlgorithm(oid_hex(other))),
        },
        OID_SHA1_WITH_RSA => verify_rsa_sha1(spki_der, message, signer.signature),
        OID_SHA256_WITH_RSA => verify_rsa_sha256(spki_der, message, signer.signature),
        OID_ECDSA_SHA256 => verify_ecdsa_p256(spki_der, message, signer.signature),
        OID_ECDSA_SHA384 => verify_ecdsa_p384(spki_der, message, signer.signature),
        other => Err(VerifyError::UnsupportedAlgorithm(oid_hex(other))),
    }
}

fn rsa_public_key(spki_der: &[u8]) -> Result<RsaPublicKey, VerifyError> {
    RsaPublicKey::from_public_key_der(spki_der)
        .map_err(|e| VerifyError::InvalidCertificate(format!("bad RSA public key: {e}")))
}

fn verify_rsa_sha1(spki_der: &[u8], message: &[u8], signature: &[u8]) -> Result<(), VerifyError> {
    let vk = pkcs1v15::VerifyingKey::<Sha1>::new(rsa_public_key(spki_der)?);
    let sig = pkcs1v15::Signature::try_from(signature).map_err(|_| VerifyError::BadSignature)?;
    vk.verify(message, &sig).map_err(|_| VerifyError::BadSignature)
}

fn verify_rsa_sha256(spki_der: &[u8], message: &[u8], signature: &[u8]) -> Result<(), VerifyError> {
    let vk = pkcs1v15::VerifyingKey::<Sha256>::new(rsa_public_key(spki_der)?);
    let sig = pkcs1v15::Signature::try_from(signature).map_err(|_| VerifyError::BadSignature)?;
    vk.verify(message, &sig).map_err(|_| VerifyError::BadSignature)
}

fn verify_ecdsa_p256(spki_der: &[u8], message: &[u8], signature: &[u8]) -> Result<(), VerifyError> {
    let pk = p256::PublicKey::from_public_key_der(spki_der)
        .map_err(|e| VerifyError::InvalidCertificate(format!("bad P-256 public key: {e}")))?;
    let ep = pk.to_encoded_point(false);
    let vk = p256::ecdsa::VerifyingKey::from_sec1_bytes(ep.as_bytes())
        .map_err(|e| VerifyError::InvalidCertificate(format!("bad P-256 public key: {e}")))?;
    let sig = p256::ecdsa::Signature::from_der(signature).map_err(|_| VerifyError::BadSignature)?;
    vk.verify(message, &sig).map_err(|_| VerifyError::BadSignature)
}

fn verify_ecdsa_p384(spki_der: &[u8], message: &[u8], signature: &[u8]) -> Result<(), VerifyError> {
    let pk = p384::PublicKey::from_public_key_der(spki_der)
        .map_err(|e| VerifyError::InvalidCertificate(format!("bad P-384 public key: {e}")))?;
    let ep = pk.to_encoded_point(false);
    let vk = p384::ecdsa::VerifyingKey::from_sec1_bytes(ep.as_bytes())
        .map_err(|e| VerifyError::InvalidCertificate(format!("bad P-384 public key: {e}")))?;
    let sig = p384::ecdsa::Signature::from_der(signature).map_err(|_| VerifyError::BadSignature)?;
    vk.verify(message, &sig).map_err(|_| VerifyError::BadSignature)
}

fn oid_hex(oid: &[u8]) -> String {
    oid.iter().map(|b| format!("{b:02x}")).collect()
}
