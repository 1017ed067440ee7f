// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The receipt assembler.
//!
//! A single decode pass with no backtracking:
//! 1. Unwrap the envelope (fail `EmptyContents`).
//! 2. Require a signed envelope (fail `NotSigned`).
//! 3. Verify every signer against the trust anchors (fail
//!    `InvalidSignature`).
//! 4. Walk the top-level attribute SET, dispatching each attribute type to
//!    its primitive decoder; unrecognized types are skipped for forward
//!    compatibility.
//! 5. Recurse once per embedded purchase (attribute 17).
//! 6./7. Validate required-field presence, per receipt and per purchase.

use appreceipt_pkcs7::ReceiptContainer;
use appreceipt_x509::verify_signed_container;
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{debug, warn};

use appreceipt_asn1::Decoder;

use crate::attributes::AttributeSet;
use crate::receipt::{InAppPurchaseFields, PurchaseReceiptFields};
use crate::{InAppPurchaseReceipt, PurchaseReceipt, ReceiptError, VerifyOptions};

// Top-level attribute types.
const ATTR_BUNDLE_IDENTIFIER: i64 = 2;
const ATTR_APP_VERSION: i64 = 3;
const ATTR_OPAQUE_VALUE: i64 = 4;
const ATTR_SHA1_HASH: i64 = 5;
const ATTR_RECEIPT_CREATION_DATE: i64 = 12;
const ATTR_IN_APP_PURCHASE: i64 = 17;
const ATTR_ORIGINAL_APP_VERSION: i64 = 19;
const ATTR_RECEIPT_EXPIRATION_DATE: i64 = 21;

// In-app purchase attribute types.
const IAP_QUANTITY: i64 = 1701;
const IAP_PRODUCT_IDENTIFIER: i64 = 1702;
const IAP_TRANSACTION_IDENTIFIER: i64 = 1703;
const IAP_PURCHASE_DATE: i64 = 1704;
const IAP_ORIGINAL_TRANSACTION_IDENTIFIER: i64 = 1705;
const IAP_ORIGINAL_PURCHASE_DATE: i64 = 1706;
const IAP_SUBSCRIPTION_EXPIRATION_DATE: i64 = 1708;
const IAP_WEB_ORDER_LINE_ITEM_ID: i64 = 1711;
const IAP_CANCELLATION_DATE: i64 = 1712;
const IAP_INTRODUCTORY_PRICE_PERIOD: i64 = 1719;

/// Receipt dates are a fixed ASCII format in UTC, no locale involved.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub(crate) fn decode_receipt(
    data: &[u8],
    options: &VerifyOptions,
) -> Result<PurchaseReceipt, ReceiptError> {
    let container = ReceiptContainer::from_der(data)?;

    if options.require_signature {
        if !container.is_signed() {
            return Err(ReceiptError::NotSigned);
        }
        verify_signed_container(&container, &options.trusted_roots_der)?;
        debug!("receipt signature verified");
    }

    let content = container.content().ok_or(ReceiptError::Malformed)?;
    parse_payload(content)
}

/// Decode the attribute payload of an already-verified envelope.
pub(crate) fn parse_payload(content: &[u8]) -> Result<PurchaseReceipt, ReceiptError> {
    let mut fields = PurchaseReceiptFields::default();

    for attribute in AttributeSet::parse(content)? {
        let attribute = attribute?;
        match attribute.attribute_type {
            ATTR_BUNDLE_IDENTIFIER => {
                fields.bundle_identifier = Some(decode_string(attribute.value)?);
            }
            ATTR_APP_VERSION => {
                fields.app_version = Some(decode_string(attribute.value)?);
            }
            ATTR_OPAQUE_VALUE => {
                fields.opaque_value = Some(attribute.value.to_vec());
            }
            ATTR_SHA1_HASH => {
                fields.sha1 = Some(attribute.value.to_vec());
            }
            ATTR_IN_APP_PURCHASE => {
                fields
                    .in_app_purchases
                    .push(parse_in_app_purchase(attribute.value)?);
            }
            ATTR_RECEIPT_CREATION_DATE => {
                fields.receipt_creation_date = decode_timestamp(attribute.value)?;
            }
            ATTR_ORIGINAL_APP_VERSION => {
                fields.original_application_version = Some(decode_string(attribute.value)?);
            }
            ATTR_RECEIPT_EXPIRATION_DATE => {
                fields.receipt_expiration_date = decode_optional_timestamp(attribute.value)?;
            }
            other => {
                debug!(attribute_type = other, "skipping unrecognized attribute");
            }
        }
    }

    fields.finish()
}

/// Decode one embedded purchase from the value of a type-17 attribute.
fn parse_in_app_purchase(payload: &[u8]) -> Result<InAppPurchaseReceipt, ReceiptError> {
    let mut fields = InAppPurchaseFields::default();

    for attribute in AttributeSet::parse(payload)? {
        let attribute = attribute?;
        match attribute.attribute_type {
            IAP_QUANTITY => {
                fields.quantity = Some(decode_i64(attribute.value)?);
            }
            IAP_PRODUCT_IDENTIFIER => {
                fields.product_identifier = Some(decode_string(attribute.value)?);
            }
            IAP_TRANSACTION_IDENTIFIER => {
                fields.transaction_identifier = Some(decode_string(attribute.value)?);
            }
            IAP_ORIGINAL_TRANSACTION_IDENTIFIER => {
                fields.original_transaction_identifier = Some(decode_string(attribute.value)?);
            }
            IAP_PURCHASE_DATE => {
                fields.purchase_date = decode_timestamp(attribute.value)?;
            }
            IAP_ORIGINAL_PURCHASE_DATE => {
                fields.original_purchase_date = decode_timestamp(attribute.value)?;
            }
            IAP_SUBSCRIPTION_EXPIRATION_DATE => {
                fields.subscription_expiration_date = decode_optional_timestamp(attribute.value)?;
            }
            IAP_INTRODUCTORY_PRICE_PERIOD => {
                fields.subscription_introductory_price_period = Some(decode_i64(attribute.value)?);
            }
            IAP_CANCELLATION_DATE => {
                fields.cancellation_date = decode_optional_timestamp(attribute.value)?;
            }
            IAP_WEB_ORDER_LINE_ITEM_ID => {
                fields.web_order_line_item_id = Some(decode_i64(attribute.value)?);
            }
            other => {
                debug!(attribute_type = other, "skipping unrecognized purchase attribute");
            }
        }
    }

    fields.finish()
}

/// Decode a nested INTEGER from an attribute value.
fn decode_i64(value: &[u8]) -> Result<i64, ReceiptError> {
    Ok(Decoder::new(value).read_i64()?)
}

/// Decode a nested UTF8String/IA5String from an attribute value.
fn decode_string(value: &[u8]) -> Result<String, ReceiptError> {
    Ok(Decoder::new(value).read_string()?)
}

/// Decode a nested timestamp string from an attribute value.
///
/// The empty string means "no value" and is a success, not a parse failure.
fn decode_timestamp(value: &[u8]) -> Result<Option<DateTime<Utc>>, ReceiptError> {
    let s = decode_string(value)?;
    if s.is_empty() {
        return Ok(None);
    }
    NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT)
        .map(|dt| Some(dt.and_utc()))
        .map_err(|_| ReceiptError::MalformedTimestamp)
}

/// Like [`decode_timestamp`], for fields where a malformed value means
/// "no value" rather than a failed decode.
fn decode_optional_timestamp(value: &[u8]) -> Result<Option<DateTime<Utc>>, ReceiptError> {
    match decode_timestamp(value) {
        Err(ReceiptError::MalformedTimestamp) => {
            warn!("discarding malformed optional date field");
            Ok(None)
        }
        other => other,
    }
}
