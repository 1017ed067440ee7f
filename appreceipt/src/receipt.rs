// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The decoded receipt data model.
//!
//! These types own all of their fields; once constructed they are
//! independent of the buffer they were decoded from and are immutable.

use chrono::{DateTime, Utc};

use crate::ReceiptError;

/// One embedded in-app purchase.
#[derive(Debug, Clone, PartialEq)]
pub struct InAppPurchaseReceipt {
    /// The number of items purchased.
    pub quantity: i64,

    /// The product identifier of the item that was purchased.
    pub product_identifier: String,

    /// The transaction identifier of the item that was purchased.
    pub transaction_identifier: String,

    /// For a transaction that restores a previous transaction, the
    /// transaction identifier of the original transaction. Otherwise,
    /// identical to the transaction identifier.
    pub original_transaction_identifier: String,

    /// The date and time the item was purchased.
    pub purchase_date: DateTime<Utc>,

    /// For a transaction that restores a previous transaction, the date of
    /// the original transaction.
    pub original_purchase_date: DateTime<Utc>,

    /// The expiration date for an auto-renewable subscription. Absent for
    /// non-subscription purchases.
    pub subscription_expiration_date: Option<DateTime<Utc>>,

    /// For an auto-renewable subscription, whether it is in the
    /// introductory price period. Absent for non-subscription purchases.
    pub subscription_introductory_price_period: Option<i64>,

    /// The time and date of a cancellation by customer support, when one
    /// occurred.
    pub cancellation_date: Option<DateTime<Utc>>,

    /// The primary key for identifying subscription purchases.
    pub web_order_line_item_id: i64,
}

/// A validated, fully-decoded purchase receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseReceipt {
    /// The bundle identifier the receipt was generated for. Compare against
    /// your own identifier to confirm the receipt belongs to this app.
    pub bundle_identifier: String,

    /// The app version the receipt was generated for.
    pub app_version: String,

    /// An opaque value used, with other data, to compute the SHA-1 hash
    /// during device-level validation.
    pub opaque_value: Vec<u8>,

    /// A SHA-1 hash, used to validate the receipt.
    pub sha1: Vec<u8>,

    /// The embedded in-app purchases, in the order they appear in the
    /// envelope. May be empty.
    pub in_app_purchases: Vec<InAppPurchaseReceipt>,

    /// The version of the app that was originally purchased.
    pub original_application_version: String,

    /// The date the receipt was created.
    pub receipt_creation_date: DateTime<Utc>,

    /// The date the receipt expires, for receipts that expire.
    pub receipt_expiration_date: Option<DateTime<Utc>>,
}

/// Accumulator for top-level attributes.
///
/// The decode pass fills optional slots as attributes are encountered;
/// [`PurchaseReceiptFields::finish`] converts a complete accumulator into
/// the immutable record, or reports the aggregate failure.
#[derive(Debug, Default)]
pub(crate) struct PurchaseReceiptFields {
    pub(crate) bundle_identifier: Option<String>,
    pub(crate) app_version: Option<String>,
    pub(crate) opaque_value: Option<Vec<u8>>,
    pub(crate) sha1: Option<Vec<u8>>,
    pub(crate) in_app_purchases: Vec<InAppPurchaseReceipt>,
    pub(crate) original_application_version: Option<String>,
    pub(crate) receipt_creation_date: Option<DateTime<Utc>>,
    pub(crate) receipt_expiration_date: Option<DateTime<Utc>>,
}

impl PurchaseReceiptFields {
    pub(crate) fn finish(self) -> Result<PurchaseReceipt, ReceiptError> {
        // All-or-nothing: which field is missing is deliberately not
        // reported.
        let (
            Some(bundle_identifier),
            Some(app_version),
            Some(opaque_value),
            Some(sha1),
            Some(original_application_version),
            Some(receipt_creation_date),
        ) = (
            self.bundle_identifier,
            self.app_version,
            self.opaque_value,
            self.sha1,
            self.original_application_version,
            self.receipt_creation_date,
        )
        else {
            return Err(ReceiptError::Malformed);
        };

        Ok(PurchaseReceipt {
            bundle_identifier,
            app_version,
            opaque_value,
            sha1,
            in_app_purchases: self.in_app_purchases,
            original_application_version,
            receipt_creation_date,
            receipt_expiration_date: self.receipt_expiration_date,
        })
    }
}

/// Accumulator for one embedded purchase.
#[derive(Debug, Default)]
pub(crate) struct InAppPurchaseFields {
    pub(crate) quantity: Option<i64>,
    pub(crate) product_identifier: Option<String>,
    pub(crate) transaction_identifier: Option<String>,
    pub(crate) original_transaction_identifier: Option<String>,
    pub(crate) purchase_date: Option<DateTime<Utc>>,
    pub(crate) original_purchase_date: Option<DateTime<Utc>>,
    pub(crate) subscription_expiration_date: Option<DateTime<Utc>>,
    pub(crate) subscription_introductory_price_period: Option<i64>,
    pub(crate) cancellation_date: Option<DateTime<Utc>>,
    pub(crate) web_order_line_item_id: Option<i64>,
}

impl InAppPurchaseFields {
    pub(crate) fn finish(self) -> Result<InAppPurchaseReceipt, ReceiptError> {
        let (
            Some(quantity),
            Some(product_identifier),
            Some(transaction_identifier),
            Some(original_transaction_identifier),
            Some(purchase_date),
            Some(original_purchase_date),
            Some(web_order_line_item_id),
        ) = (
            self.quantity,
            self.product_identifier,
            self.transaction_identifier,
            self.original_transaction_identifier,
            self.purchase_date,
            self.original_purchase_date,
            self.web_order_line_item_id,
        )
        else {
            return Err(ReceiptError::Malformed);
        };

        Ok(InAppPurchaseReceipt {
            quantity,
            product_identifier,
            transaction_identifier,
            original_transaction_identifier,
            purchase_date,
            original_purchase_date,
            // Subscription-only fields; absent on ordinary purchases.
            subscription_expiration_date: self.subscription_expiration_date,
            subscription_introductory_price_period: self.subscription_introductory_price_period,
            cancellation_date: self.cancellation_date,
            web_order_line_item_id,
        })
    }
}
