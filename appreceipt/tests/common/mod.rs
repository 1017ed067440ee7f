// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Shared helpers for `appreceipt` integration tests.
//!
//! The integration tests focus on exercising the full pipeline — envelope,
//! signature, attribute decoding — against envelopes built here from real
//! certificates and real signatures. Fixture construction mirrors what the
//! vendor's signing service produces: a PKCS7 signed-data envelope whose
//! content octets hold the receipt attribute SET.

#![allow(dead_code)]

use appreceipt::VerifyOptions;
use appreceipt_asn1::{Decoder, Encoder};
use appreceipt_pkcs7::{
    OID_PKCS7_DATA, OID_PKCS7_SIGNED_DATA, OID_PKCS9_CONTENT_TYPE, OID_PKCS9_MESSAGE_DIGEST,
};
use p256::pkcs8::DecodePrivateKey as _;
use sha2::Digest as _;
use signature::Signer as _;

/// id-sha256, 2.16.840.1.101.3.4.2.1
pub const OID_SHA256: &[u8] = &[0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x01];
/// ecdsa-with-SHA256, 1.2.840.10045.4.3.2
pub const OID_ECDSA_SHA256: &[u8] = &[0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x04, 0x03, 0x02];

// Attribute type numbers, as the vendor assigns them.
pub const ATTR_BUNDLE_IDENTIFIER: i64 = 2;
pub const ATTR_APP_VERSION: i64 = 3;
pub const ATTR_OPAQUE_VALUE: i64 = 4;
pub const ATTR_SHA1_HASH: i64 = 5;
pub const ATTR_RECEIPT_CREATION_DATE: i64 = 12;
pub const ATTR_IN_APP_PURCHASE: i64 = 17;
pub const ATTR_ORIGINAL_APP_VERSION: i64 = 19;
pub const ATTR_RECEIPT_EXPIRATION_DATE: i64 = 21;

pub const IAP_QUANTITY: i64 = 1701;
pub const IAP_PRODUCT_IDENTIFIER: i64 = 1702;
pub const IAP_TRANSACTION_IDENTIFIER: i64 = 1703;
pub const IAP_PURCHASE_DATE: i64 = 1704;
pub const IAP_ORIGINAL_TRANSACTION_IDENTIFIER: i64 = 1705;
pub const IAP_ORIGINAL_PURCHASE_DATE: i64 = 1706;
pub const IAP_WEB_ORDER_LINE_ITEM_ID: i64 = 1711;

/// A certificate plus the key that can sign as it.
pub struct TestSigner {
    pub cert_der: Vec<u8>,
    pub key: p256::ecdsa::SigningKey,
}

/// Creates a self-signed P-256 certificate and matching signing key.
pub fn self_signed_signer() -> TestSigner {
    let certified = rcgen::generate_simple_self_signed(["receipts.example.test".to_string()])
        .unwrap();
    let key_der = certified.key_pair.serialize_der();
    TestSigner {
        cert_der: certified.cert.der().to_vec(),
        key: p256::ecdsa::SigningKey::from_pkcs8_der(&key_der).unwrap(),
    }
}

/// Creates a root CA plus a leaf signer issued by it.
pub fn root_and_issued_signer() -> (Vec<u8>, TestSigner) {
    let root_key = rcgen::KeyPair::generate().unwrap();
    let mut root_params = rcgen::CertificateParams::new(vec!["Receipt Root".to_string()]).unwrap();
    root_params.is_ca = rcgen::IsCa::Ca(rcgen::BasicConstraints::Unconstrained);
    let root_cert = root_params.self_signed(&root_key).unwrap();

    let leaf_key = rcgen::KeyPair::generate().unwrap();
    let leaf_params = rcgen::CertificateParams::new(vec!["receipt-signer.test".to_string()]).unwrap();
    let leaf_cert = leaf_params
        .signed_by(&leaf_key, &root_cert, &root_key)
        .unwrap();

    let signer = TestSigner {
        cert_der: leaf_cert.der().to_vec(),
        key: p256::ecdsa::SigningKey::from_pkcs8_der(&leaf_key.serialize_der()).unwrap(),
    };
    (root_cert.der().to_vec(), signer)
}

/// Extracts (issuer Name raw DER, serial content bytes) from a certificate.
pub fn cert_issuer_and_serial(cert_der: &[u8]) -> (Vec<u8>, Vec<u8>) {
    let mut dec = Decoder::new(cert_der);
    let mut cert = dec.read_sequence().unwrap();
    let tbs = cert.read_tlv().unwrap();
    let mut tbs = Decoder::new(tbs.value);
    let _version = tbs.try_read_context_specific(0, true).unwrap();
    let serial = tbs.read_integer_bytes().unwrap().to_vec();
    let _signature_alg = tbs.read_tlv().unwrap();
    let issuer = tbs.read_tlv().unwrap().raw.to_vec();
    (issuer, serial)
}

fn algorithm_identifier(oid: &[u8]) -> Vec<u8> {
    let mut body = Encoder::new();
    body.write_oid(oid).write_null();
    let mut seq = Encoder::new();
    seq.write_sequence(&body.finish());
    seq.finish()
}

fn ecdsa_sign(key: &p256::ecdsa::SigningKey, message: &[u8]) -> Vec<u8> {
    let sig: p256::ecdsa::Signature = key.sign(message);
    sig.to_der().as_bytes().to_vec()
}

fn signer_info_der(
    cert_der: &[u8],
    signed_attrs_content: Option<&[u8]>,
    signature: &[u8],
) -> Vec<u8> {
    let (issuer, serial) = cert_issuer_and_serial(cert_der);

    let mut body = Encoder::new();
    body.write_i64(1); // SignerInfo version

    let mut ias = Encoder::new();
    ias.write_raw(&issuer).write_integer(&serial);
    body.write_sequence(&ias.finish());

    body.write_raw(&algorithm_identifier(OID_SHA256));
    if let Some(attrs) = signed_attrs_content {
        body.write_context_specific(0, true, attrs);
    }
    body.write_raw(&algorithm_identifier(OID_ECDSA_SHA256));
    body.write_octet_string(signature);

    let mut seq = Encoder::new();
    seq.write_sequence(&body.finish());
    seq.finish()
}

fn assemble_envelope(content: &[u8], certificates: &[&[u8]], signer_infos: &[&[u8]]) -> Vec<u8> {
    let mut sd = Encoder::new();
    sd.write_i64(1); // SignedData version

    let mut digest_algs = Encoder::new();
    digest_algs.write_raw(&algorithm_identifier(OID_SHA256));
    sd.write_set(&digest_algs.finish());

    let mut octets = Encoder::new();
    octets.write_octet_string(content);
    let mut explicit = Encoder::new();
    explicit.write_context_specific(0, true, &octets.finish());
    let mut eci = Encoder::new();
    eci.write_oid(OID_PKCS7_DATA).write_raw(&explicit.finish());
    sd.write_sequence(&eci.finish());

    if !certificates.is_empty() {
        let mut certs = Encoder::new();
        for cert in certificates {
            certs.write_raw(cert);
        }
        sd.write_context_specific(0, true, &certs.finish());
    }

    let mut signer_set = Encoder::new();
    for signer in signer_infos {
        signer_set.write_raw(signer);
    }
    sd.write_set(&signer_set.finish());

    let mut signed_data = Encoder::new();
    signed_data.write_sequence(&sd.finish());
    let mut wrapped = Encoder::new();
    wrapped.write_context_specific(0, true, &signed_data.finish());

    let mut ci = Encoder::new();
    ci.write_oid(OID_PKCS7_SIGNED_DATA)
        .write_raw(&wrapped.finish());
    let mut out = Encoder::new();
    out.write_sequence(&ci.finish());
    out.finish()
}

/// Builds a signed envelope; the signature covers the content directly.
pub fn sign_envelope(content: &[u8], extra_certs: &[&[u8]], signer: &TestSigner) -> Vec<u8> {
    let signature = ecdsa_sign(&signer.key, content);
    let si = signer_info_der(&signer.cert_der, None, &signature);

    let mut certs: Vec<&[u8]> = vec![&signer.cert_der];
    certs.extend_from_slice(extra_certs);
    assemble_envelope(content, &certs, &[&si])
}

/// Like [`sign_envelope`], but the signer may carry a corrupted signature.
pub fn sign_envelope_with_flipped_signature_byte(
    content: &[u8],
    signer: &TestSigner,
) -> Vec<u8> {
    let mut signature = ecdsa_sign(&signer.key, content);
    let last = signature.len() - 1;
    signature[last] ^= 0x01;
    let si = signer_info_der(&signer.cert_der, None, &signature);
    assemble_envelope(content, &[&signer.cert_der], &[&si])
}

/// Builds a signed envelope using authenticated attributes: the signature
/// covers the attribute SET, which binds the content digest.
pub fn sign_envelope_with_authenticated_attributes(
    content: &[u8],
    signer: &TestSigner,
) -> Vec<u8> {
    let digest = sha2::Sha256::digest(content);

    let mut attrs = Encoder::new();
    let mut ct = Encoder::new();
    ct.write_oid(OID_PKCS9_CONTENT_TYPE);
    let mut ct_values = Encoder::new();
    ct_values.write_oid(OID_PKCS7_DATA);
    ct.write_set(&ct_values.finish());
    attrs.write_sequence(&ct.finish());

    let mut md = Encoder::new();
    md.write_oid(OID_PKCS9_MESSAGE_DIGEST);
    let mut md_values = Encoder::new();
    md_values.write_octet_string(&digest);
    md.write_set(&md_values.finish());
    attrs.write_sequence(&md.finish());
    let attrs_content = attrs.finish();

    // The signed message is the attributes re-encoded under a SET tag.
    let mut message = Encoder::new();
    message.write_set(&attrs_content);
    let signature = ecdsa_sign(&signer.key, &message.finish());

    let si = signer_info_der(&signer.cert_der, Some(&attrs_content), &signature);
    assemble_envelope(content, &[&signer.cert_der], &[&si])
}

/// Builds an envelope with signed-data structure but no signers at all.
pub fn envelope_without_signers(content: &[u8], signer: &TestSigner) -> Vec<u8> {
    assemble_envelope(content, &[&signer.cert_der], &[])
}

/// Builds an unsigned plain-data envelope.
pub fn data_envelope(content: &[u8]) -> Vec<u8> {
    let mut octets = Encoder::new();
    octets.write_octet_string(content);
    let mut explicit = Encoder::new();
    explicit.write_context_specific(0, true, &octets.finish());
    let mut ci = Encoder::new();
    ci.write_oid(OID_PKCS7_DATA).write_raw(&explicit.finish());
    let mut out = Encoder::new();
    out.write_sequence(&ci.finish());
    out.finish()
}

/// Encodes one receipt attribute SEQUENCE.
pub fn attribute(attribute_type: i64, value_der: &[u8]) -> Vec<u8> {
    let mut body = Encoder::new();
    body.write_i64(attribute_type)
        .write_i64(1)
        .write_octet_string(value_der);
    let mut seq = Encoder::new();
    seq.write_sequence(&body.finish());
    seq.finish()
}

pub fn utf8(s: &str) -> Vec<u8> {
    let mut enc = Encoder::new();
    enc.write_utf8_string(s);
    enc.finish()
}

pub fn int(v: i64) -> Vec<u8> {
    let mut enc = Encoder::new();
    enc.write_i64(v);
    enc.finish()
}

pub fn set_of(attrs: &[Vec<u8>]) -> Vec<u8> {
    let mut content = Encoder::new();
    for attr in attrs {
        content.write_raw(attr);
    }
    let mut set = Encoder::new();
    set.write_set(&content.finish());
    set.finish()
}

/// The minimal valid receipt payload: all required top-level attributes, no
/// purchases, no expiration.
pub fn minimal_receipt_attributes() -> Vec<Vec<u8>> {
    vec![
        attribute(ATTR_BUNDLE_IDENTIFIER, &utf8("com.example.app")),
        attribute(ATTR_APP_VERSION, &utf8("1.0")),
        attribute(ATTR_RECEIPT_CREATION_DATE, &utf8("2020-01-01T00:00:00Z")),
        attribute(ATTR_ORIGINAL_APP_VERSION, &utf8("1.0")),
        attribute(ATTR_OPAQUE_VALUE, &[0xA5; 16]),
        attribute(ATTR_SHA1_HASH, &[0x5A; 20]),
    ]
}

/// A complete in-app purchase attribute list.
pub fn purchase_attributes(product: &str) -> Vec<Vec<u8>> {
    vec![
        attribute(IAP_QUANTITY, &int(1)),
        attribute(IAP_PRODUCT_IDENTIFIER, &utf8(product)),
        attribute(IAP_TRANSACTION_IDENTIFIER, &utf8("txn-100")),
        attribute(IAP_ORIGINAL_TRANSACTION_IDENTIFIER, &utf8("txn-001")),
        attribute(IAP_PURCHASE_DATE, &utf8("2021-06-15T10:30:00Z")),
        attribute(IAP_ORIGINAL_PURCHASE_DATE, &utf8("2021-06-01T08:00:00Z")),
        attribute(IAP_WEB_ORDER_LINE_ITEM_ID, &int(9001)),
    ]
}

pub fn options_with_root(root_der: Vec<u8>) -> VerifyOptions {
    VerifyOptions::new().with_trusted_root(root_der)
}
