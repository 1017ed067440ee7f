// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Receipt byte sources.
//!
//! The decoder itself is a pure function over a byte buffer; where those
//! bytes come from is a collaborator concern. A source distinguishes "there
//! is no receipt" from "there is one but it could not be read".

use std::io::ErrorKind;
use std::path::PathBuf;

use crate::ReceiptError;

/// Supplies raw receipt bytes.
pub trait ReceiptSource {
    /// Load the receipt bytes.
    ///
    /// Returns [`ReceiptError::NotFound`] when no receipt exists and
    /// [`ReceiptError::NotLoadable`] when one exists but reading failed.
    fn load(&self) -> Result<Vec<u8>, ReceiptError>;
}

/// Reads the receipt from a file path (the platform's receipt location).
#[derive(Debug, Clone)]
pub struct FileReceiptSource {
    path: PathBuf,
}

impl FileReceiptSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReceiptSource for FileReceiptSource {
    fn load(&self) -> Result<Vec<u8>, ReceiptError> {
        std::fs::read(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ReceiptError::NotFound,
            _ => ReceiptError::NotLoadable(e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_not_found() {
        let source = FileReceiptSource::new("/nonexistent/receipt/path");
        assert!(matches!(source.load().unwrap_err(), ReceiptError::NotFound));
    }
}
