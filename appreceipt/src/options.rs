// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// Options for receipt verification.
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    /// Trusted root certificates (DER). The signer chain must terminate at
    /// one of these, byte-for-byte.
    pub trusted_roots_der: Vec<Vec<u8>>,

    /// If true, require a signed envelope and verify its signature. If
    /// false, skip both checks.
    ///
    /// This is useful for tooling and fixtures that inspect receipt
    /// payloads without holding the vendor root; production callers should
    /// leave it on.
    pub require_signature: bool,
}

impl VerifyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a trusted root certificate (DER).
    pub fn with_trusted_root(mut self, root_der: Vec<u8>) -> Self {
        self.trusted_roots_der.push(root_der);
        self
    }

    /// Skip signature requirements entirely (NOT for production).
    pub fn without_signature_verification(mut self) -> Self {
        self.require_signature = false;
        self
    }
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            trusted_roots_der: Vec::new(),
            require_signature: true,
        }
    }
}
