// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Raw DER object identifiers used by the envelope format.

/// pkcs7-data, 1.2.840.113549.1.7.1
pub const OID_PKCS7_DATA: &[u8] = &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x07, 0x01];

/// pkcs7-signedData, 1.2.840.113549.1.7.2
pub const OID_PKCS7_SIGNED_DATA: &[u8] = &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x07, 0x02];

/// pkcs9-contentType, 1.2.840.113549.1.9.3
pub const OID_PKCS9_CONTENT_TYPE: &[u8] = &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x09, 0x03];

/// pkcs9-messageDigest, 1.2.840.113549.1.9.4
pub const OID_PKCS9_MESSAGE_DIGEST: &[u8] =
    &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x09, 0x04];
