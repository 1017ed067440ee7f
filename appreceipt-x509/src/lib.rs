// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Signature verification for purchase-receipt envelopes.
//!
//! Two layers live here:
//! - `chain` builds and verifies a certificate chain from the envelope's
//!   signer certificate to one of the caller-provided trust anchors.
//! - `signer` verifies the PKCS7 signer records themselves: locate the
//!   signer certificate by issuer and serial, check the authenticated
//!   attributes when present, and verify the signature over the content.
//!
//! The verdict is deliberately binary. Any successfully-chaining signature
//! is accepted; there are no certificate-purpose constraints, no revocation
//! checks, and no validity-window checks.

mod chain;
mod signer;

pub use chain::validate_certificate_chain;
pub use signer::verify_signed_container;

/// Why signature verification failed.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// The envelope carried no signer records.
    #[error("envelope has no signers")]
    NoSigners,

    /// No trust anchors were supplied.
    #[error("at least one trusted root certificate is required")]
    NoTrustAnchors,

    /// No embedded certificate matched a signer's issuer and serial.
    #[error("signer certificate not found in envelope")]
    SignerCertificateNotFound,

    /// A certificate (anchor or embedded) was not decodable DER.
    #[error("invalid certificate: {0}")]
    InvalidCertificate(String),

    /// An algorithm OID this verifier does not support.
    #[error("unsupported algorithm OID: {0}")]
    UnsupportedAlgorithm(String),

    /// The signer certificate does not chain to a trust anchor.
    #[error("certificate chain does not terminate at a trusted root")]
    UntrustedChain,

    /// The authenticated message-digest attribute did not match the content.
    #[error("authenticated attribute digest does not match content")]
    DigestMismatch,

    /// The signature bytes did not verify.
    #[error("signature verification failed")]
    BadSignature,
}
