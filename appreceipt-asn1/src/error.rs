// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// Failures raised while decoding DER from an untrusted buffer.
///
/// These are deliberately coarse: callers map them onto their own error
/// domains, and the distinction that matters at this layer is "the buffer
/// lied about a length" versus "the buffer held the wrong kind of value".
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// A declared length would extend past the end of the enclosing buffer,
    /// or the buffer ended in the middle of a tag or length.
    #[error("value extends past the end of its buffer")]
    Truncated,

    /// The next value did not carry the tag the caller required.
    #[error("unexpected ASN.1 tag")]
    UnexpectedType,

    /// The length octets were not a valid DER encoding (indefinite form, or
    /// a long form wider than this decoder supports).
    #[error("invalid DER length encoding")]
    InvalidLength,

    /// An INTEGER was empty or too wide to represent as `i64`.
    #[error("INTEGER value out of range")]
    IntegerOutOfRange,

    /// String content bytes were not valid for the declared string type.
    #[error("string content is not valid for its declared encoding")]
    InvalidEncoding,
}
