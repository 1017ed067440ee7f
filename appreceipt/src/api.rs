// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::{parser, PurchaseReceipt, ReceiptError, ReceiptSource, VerifyOptions};

/// Decode and validate a receipt from its raw envelope bytes.
///
/// Either every required field decodes and the signature chains to a trust
/// anchor, or the whole decode fails with a single typed error.
pub fn decode_receipt(
    data: &[u8],
    options: &VerifyOptions,
) -> Result<PurchaseReceipt, ReceiptError> {
    parser::decode_receipt(data, options)
}

/// Load receipt bytes from a source, then decode and validate them.
pub fn load_and_decode(
    source: &dyn ReceiptSource,
    options: &VerifyOptions,
) -> Result<PurchaseReceipt, ReceiptError> {
    let data = source.load()?;
    decode_receipt(&data, options)
}
