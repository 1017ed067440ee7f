// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use appreceipt_asn1::DecodeError;
use appreceipt_pkcs7::Pkcs7Error;
use appreceipt_x509::VerifyError;

/// Why a receipt could not be decoded.
///
/// Every variant is terminal: callers must treat any failure as "no usable
/// receipt", never as partial data. Retrying, if appropriate at all, is a
/// caller policy applied to the whole decode.
#[derive(Debug, thiserror::Error)]
pub enum ReceiptError {
    /// No receipt bytes exist at the configured location.
    #[error("no receipt is present")]
    NotFound,

    /// Receipt bytes exist but could not be read.
    #[error("the receipt could not be read")]
    NotLoadable(#[source] std::io::Error),

    /// The envelope could not be parsed, or its content type is not the
    /// expected data type.
    #[error("the receipt container is empty or not a data payload")]
    EmptyContents,

    /// The envelope parsed but carries no signature.
    #[error("the receipt container is not signed")]
    NotSigned,

    /// A signature is present but does not verify against the trust anchors.
    #[error("the receipt signature does not verify against the trusted roots")]
    InvalidSignature(#[source] VerifyError),

    /// Any structural violation in the attribute payload: a wrong tag where
    /// a specific tag was required, a truncated buffer, or a required field
    /// absent from the decoded attribute set. Deliberately coarse.
    #[error("the receipt payload is not in a valid format")]
    Malformed,

    /// A string field's bytes were not valid for its declared encoding.
    #[error("a receipt field used an invalid string encoding")]
    InvalidEncoding,

    /// A date field held a non-empty string outside the receipt's fixed
    /// timestamp format.
    #[error("a receipt date field is not in the expected format")]
    MalformedTimestamp,
}

impl From<DecodeError> for ReceiptError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::InvalidEncoding => ReceiptError::InvalidEncoding,
            _ => ReceiptError::Malformed,
        }
    }
}

impl From<Pkcs7Error> for ReceiptError {
    fn from(_: Pkcs7Error) -> Self {
        ReceiptError::EmptyContents
    }
}

impl From<VerifyError> for ReceiptError {
    fn from(err: VerifyError) -> Self {
        ReceiptError::InvalidSignature(err)
    }
}
