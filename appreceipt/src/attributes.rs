// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The attribute-set iterator.
//!
//! A receipt payload is a SET of SEQUENCEs, each SEQUENCE one attribute:
//!
//! ```text
//! ReceiptAttribute ::= SEQUENCE {
//!     type    INTEGER,
//!     version INTEGER,   -- required by the format, semantically unused
//!     value   OCTET STRING,
//!     ...     -- later receipt versions append fields here
//! }
//! ```
//!
//! Iteration is lazy and one-shot: the sequence ends when the SET's declared
//! content is exhausted, a structural error ends it permanently, and
//! restarting means re-parsing the payload bytes.

use appreceipt_asn1::{DecodeError, Decoder};

/// One attribute, borrowed from the payload buffer.
///
/// `value` is the OCTET STRING content; its interpretation (nested string,
/// integer, date, or raw bytes) depends on `attribute_type`.
#[derive(Debug, Clone, Copy)]
pub struct ReceiptAttribute<'a> {
    pub attribute_type: i64,
    pub value: &'a [u8],
}

/// Lazy iterator over the attributes of a receipt SET.
#[derive(Debug)]
pub struct AttributeSet<'a> {
    inner: Decoder<'a>,
    done: bool,
}

impl<'a> AttributeSet<'a> {
    /// Parse the SET header of `data` and position the iterator at its
    /// first attribute.
    pub fn parse(data: &'a [u8]) -> Result<Self, DecodeError> {
        let mut dec = Decoder::new(data);
        let inner = dec.read_set()?;
        Ok(Self { inner, done: false })
    }

    fn read_attribute(&mut self) -> Result<ReceiptAttribute<'a>, DecodeError> {
        let mut seq = self.inner.read_sequence()?;
        let attribute_type = seq.read_i64()?;
        let _version = seq.read_i64()?;
        let value = seq.read_octet_string()?;
        // Dropping `seq` skips any trailing fields in the SEQUENCE; the
        // outer cursor already sits past the SEQUENCE's declared end.
        Ok(ReceiptAttribute {
            attribute_type,
            value,
        })
    }
}

impl<'a> Iterator for AttributeSet<'a> {
    type Item = Result<ReceiptAttribute<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.inner.is_empty() {
            self.done = true;
            return None;
        }
        let item = self.read_attribute();
        if item.is_err() {
            self.done = true;
        }
        Some(item)
    }
}
