// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Purchase-receipt decoding and validation.
//!
//! This crate is the primary entry point. Given the raw bytes of a
//! vendor-issued receipt (a PKCS7 signed-data envelope wrapping a DER SET of
//! typed attributes) and one or more trusted root certificates, it either
//! produces a fully-populated [`PurchaseReceipt`] or a single typed
//! [`ReceiptError`] — there is no partially-valid receipt.
//!
//! ```no_run
//! use appreceipt::{decode_receipt, VerifyOptions};
//!
//! let receipt_bytes = std::fs::read("receipt")?;
//! let root = std::fs::read("root-certificate.der")?;
//! let options = VerifyOptions::new().with_trusted_root(root);
//! let receipt = decode_receipt(&receipt_bytes, &options)?;
//! println!("{}", receipt.bundle_identifier);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Design note: to keep the public API simple, decoding and verification are
//! exposed directly at the crate root (no submodule paths).

// Internal implementation modules.
mod attributes;
mod parser;

// Public API organization (lib.rs is a publisher).
mod api;
mod error;
mod options;
mod receipt;
mod source;

pub use api::{decode_receipt, load_and_decode};
pub use attributes::{AttributeSet, ReceiptAttribute};
pub use error::ReceiptError;
pub use options::VerifyOptions;
pub use receipt::{InAppPurchaseReceipt, PurchaseReceipt};
pub use source::{FileReceiptSource, ReceiptSource};

// Verification failure detail carried by `ReceiptError::InvalidSignature`.
pub use appreceipt_x509::VerifyError;
