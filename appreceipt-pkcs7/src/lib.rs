// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! PKCS7 signed-data envelope parsing.
//!
//! This crate unwraps the outer container of a purchase receipt:
//! - Parse the `ContentInfo` / `SignedData` structures from DER.
//! - Report whether the envelope carries a signature at all.
//! - Expose the inner content octets, embedded certificates, and signer
//!   records as borrowed views for the verification and decoding layers.
//!
//! No cryptography happens here; see `appreceipt-x509` for signature and
//! chain verification.

mod oid;
mod signed_data;

pub use oid::{
    OID_PKCS7_DATA, OID_PKCS7_SIGNED_DATA, OID_PKCS9_CONTENT_TYPE, OID_PKCS9_MESSAGE_DIGEST,
};
pub use signed_data::{Pkcs7Error, ReceiptContainer, SignedAttributes, SignerInfo};
