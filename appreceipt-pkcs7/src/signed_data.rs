// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The envelope unwrapper.
//!
//! ```text
//! ContentInfo ::= SEQUENCE {
//!     contentType OBJECT IDENTIFIER,
//!     content     [0] EXPLICIT ANY OPTIONAL }
//!
//! SignedData ::= SEQUENCE {
//!     version          INTEGER,
//!     digestAlgorithms SET OF AlgorithmIdentifier,
//!     contentInfo      SEQUENCE { OID pkcs7-data, [0] EXPLICIT OCTET STRING },
//!     certificates     [0] IMPLICIT SET OF Certificate OPTIONAL,
//!     crls             [1] IMPLICIT OPTIONAL,
//!     signerInfos      SET OF SignerInfo }
//! ```
//!
//! Parsing is strict about structure but indifferent to cryptography: a
//! parsed container says what it claims, not whether the claim verifies.

use appreceipt_asn1::{DecodeError, Decoder};

use crate::oid::{OID_PKCS7_DATA, OID_PKCS7_SIGNED_DATA};

/// Failures while unwrapping the envelope.
#[derive(Debug, thiserror::Error)]
pub enum Pkcs7Error {
    /// The bytes were not a decodable ContentInfo/SignedData structure.
    #[error("envelope is not a decodable PKCS7 structure")]
    Decode(#[from] DecodeError),

    /// The outer content type was neither signed-data nor data.
    #[error("envelope carries an unsupported content type")]
    UnsupportedContentType,

    /// The signed-data's encapsulated content type was not pkcs7-data.
    #[error("signed-data payload is not a data content type")]
    UnexpectedInnerContentType,

    /// The signed-data carried no encapsulated content octets.
    #[error("signed-data payload is absent")]
    MissingContent,

    /// Bytes remained after the outer ContentInfo.
    #[error("trailing bytes after the envelope")]
    TrailingBytes,
}

/// The authenticated-attributes block of a signer, kept raw.
///
/// The signature covers these bytes re-encoded under a SET tag, so the
/// verifier needs the original content region untouched.
#[derive(Debug, Clone, Copy)]
pub struct SignedAttributes<'a> {
    /// Content region of the `[0] IMPLICIT` block (a series of Attribute
    /// SEQUENCEs).
    pub raw: &'a [u8],
}

/// One SignerInfo record.
#[derive(Debug, Clone, Copy)]
pub struct SignerInfo<'a> {
    /// Raw DER of the issuer Name, for matching against certificates.
    pub issuer_raw: &'a [u8],
    /// Content bytes of the serial number INTEGER.
    pub serial: &'a [u8],
    /// Digest algorithm OID content bytes.
    pub digest_alg_oid: &'a [u8],
    /// Authenticated attributes, when present.
    pub signed_attributes: Option<SignedAttributes<'a>>,
    /// Signature algorithm OID content bytes.
    pub signature_alg_oid: &'a [u8],
    /// The encryptedDigest signature bytes.
    pub signature: &'a [u8],
}

/// A parsed receipt envelope.
///
/// Owns nothing: every field borrows from the caller's buffer, so the
/// container is as cheap to discard as it was to build.
#[derive(Debug)]
pub struct ReceiptContainer<'a> {
    is_signed: bool,
    content: Option<&'a [u8]>,
    certificates: Vec<&'a [u8]>,
    signer_infos: Vec<SignerInfo<'a>>,
}

impl<'a> ReceiptContainer<'a> {
    /// Parse a receipt envelope from DER bytes.
    pub fn from_der(input: &'a [u8]) -> Result<Self, Pkcs7Error> {
        let mut dec = Decoder::new(input);
        let mut content_info = dec.read_sequence()?;
        if !dec.is_empty() {
            return Err(Pkcs7Error::TrailingBytes);
        }

        let content_type = content_info.read_oid()?;
        if content_type == OID_PKCS7_SIGNED_DATA {
            let explicit = content_info.read_context_specific(0, true)?;
            Self::parse_signed_data(explicit.value)
        } else if content_type == OID_PKCS7_DATA {
            // A bare data envelope: decodable, but it fails the pipeline's
            // signature requirement downstream.
            let content = match content_info.try_read_context_specific(0, true)? {
                Some(explicit) => Some(Decoder::new(explicit.value).read_octet_string()?),
                None => None,
            };
            Ok(Self {
                is_signed: false,
                content,
                certificates: Vec::new(),
                signer_infos: Vec::new(),
            })
        } else {
            Err(Pkcs7Error::UnsupportedContentType)
        }
    }

    fn parse_signed_data(input: &'a [u8]) -> Result<Self, Pkcs7Error> {
        let mut sd = Decoder::new(input).read_sequence()?;

        let _version = sd.read_integer_bytes()?;
        let _digest_algorithms = sd.read_set()?;

        // Encapsulated content: must be pkcs7-data with present octets.
        let mut eci = sd.read_sequence()?;
        let inner_type = eci.read_oid()?;
        if inner_type != OID_PKCS7_DATA {
            return Err(Pkcs7Error::UnexpectedInnerContentType);
        }
        let content = match eci.try_read_context_specific(0, true)? {
            Some(explicit) => Decoder::new(explicit.value).read_octet_string()?,
            None => return Err(Pkcs7Error::MissingContent),
        };

        // certificates [0] IMPLICIT: collect each certificate's full DER.
        let mut certificates = Vec::new();
        if let Some(block) = sd.try_read_context_specific(0, true)? {
            let mut certs = Decoder::new(block.value);
            while !certs.is_empty() {
                certificates.push(certs.read_tlv()?.raw);
            }
        }

        // crls [1] IMPLICIT: present in some envelopes, never consulted.
        let _ = sd.try_read_context_specific(1, true)?;

        let mut signer_infos = Vec::new();
        let mut sis = sd.read_set()?;
        while !sis.is_empty() {
            signer_infos.push(Self::parse_signer_info(&mut sis)?);
        }

        Ok(Self {
            is_signed: true,
            content: Some(content),
            certificates,
            signer_infos,
        })
    }

    fn parse_signer_info(set: &mut Decoder<'a>) -> Result<SignerInfo<'a>, Pkcs7Error> {
        let mut si = set.read_sequence()?;

        let _version = si.read_integer_bytes()?;

        let mut issuer_and_serial = si.read_sequence()?;
        let issuer_raw = issuer_and_serial.read_tlv()?.raw;
        let serial = issuer_and_serial.read_integer_bytes()?;

        let mut digest_alg = si.read_sequence()?;
        let digest_alg_oid = digest_alg.read_oid()?;

        let signed_attributes = si
            .try_read_context_specific(0, true)?
            .map(|block| SignedAttributes { raw: block.value });

        let mut signature_alg = si.read_sequence()?;
        let signature_alg_oid = signature_alg.read_oid()?;

        let signature = si.read_octet_string()?;

        // unauthenticatedAttributes [1] and anything after it are ignored.

        Ok(SignerInfo {
            issuer_raw,
            serial,
            digest_alg_oid,
            signed_attributes,
            signature_alg_oid,
            signature,
        })
    }

    /// True only when the outer content type was signed-data.
    pub fn is_signed(&self) -> bool {
        self.is_signed
    }

    /// The inner content octets, when present.
    pub fn content(&self) -> Option<&'a [u8]> {
        self.content
    }

    /// Full DER of each certificate embedded in the envelope.
    pub fn certificates(&self) -> &[&'a [u8]] {
        &self.certificates
    }

    /// The envelope's signer records.
    pub fn signer_infos(&self) -> &[SignerInfo<'a>] {
        &self.signer_infos
    }
}
