#![deny(clippy::all, clippy::pedantic)]
//! # Tether Wire Format
//!
//! The wire format shared by the robot and supervisor processes: one packet
//! per message, delimiter-joined UTF-8 text, no length prefix and no
//! checksum. Framing is left entirely to the underlying transport.
//!
//! A message is an ordered sequence of scalar fields. Encoding joins the
//! fields with a comma after string-converting each one; decoding splits on
//! the comma and hands the resulting string fields to the caller. Decoding
//! never re-infers numeric types — the receiving handler is responsible for
//! parsing.

use std::fmt::Write as _;
use thiserror::Error;

/// Field separator used on the wire.
pub const DELIMITER: char = ',';

/// Errors raised while framing a message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// A text field contains the delimiter and cannot be represented as a
    /// delimiter-free string. There is no escaping scheme on this wire.
    #[error("field `{0}` contains the delimiter `{DELIMITER}` and cannot be framed")]
    DelimiterInField(String),
}

/// A single scalar field of a message.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// Numeric value, rendered with `Display` (so `1.0` travels as `"1"`).
    Num(f64),
    /// Short text value. Must not contain the delimiter.
    Text(String),
}

impl From<f64> for Field {
    fn from(v: f64) -> Self {
        Field::Num(v)
    }
}

impl From<f32> for Field {
    fn from(v: f32) -> Self {
        Field::Num(f64::from(v))
    }
}

impl From<&str> for Field {
    fn from(v: &str) -> Self {
        Field::Text(v.to_owned())
    }
}

/// An outbound message: either an ordered field list or a string the caller
/// has already joined.
///
/// The two variants mirror the two accepted forms of a handler result; any
/// other shape is unrepresentable by construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Fields to be joined with [`DELIMITER`]. Text fields are checked for
    /// embedded delimiters at encode time.
    Fields(Vec<Field>),
    /// A pre-joined string, sent as-is. No delimiter check is performed, so
    /// a stray delimiter inside what the caller meant as one value silently
    /// corrupts framing. Documented limitation, not corrected here.
    Joined(String),
}

impl Message {
    /// Builds a field message from a slice of numeric values.
    #[must_use]
    pub fn from_values(values: &[f32]) -> Self {
        Message::Fields(values.iter().map(|&v| Field::from(v)).collect())
    }

    /// Encodes the message into wire bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::DelimiterInField`] if a [`Field::Text`] value
    /// contains the delimiter.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        match self {
            Message::Joined(s) => Ok(s.clone().into_bytes()),
            Message::Fields(fields) => {
                let mut out = String::new();
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        out.push(DELIMITER);
                    }
                    match field {
                        Field::Num(v) => {
                            let _ = write!(out, "{v}");
                        }
                        Field::Text(s) => {
                            if s.contains(DELIMITER) {
                                return Err(EncodeError::DelimiterInField(s.clone()));
                            }
                            out.push_str(s);
                        }
                    }
                }
                Ok(out.into_bytes())
            }
        }
    }
}

/// Decodes wire bytes into string fields.
///
/// Never fails: invalid UTF-8 is replaced lossily and any byte sequence
/// splits into at least one field. In particular an empty packet decodes to
/// a single empty-string field, `[""]`, not an empty sequence — callers that
/// care must check for that shape explicitly.
#[must_use]
pub fn decode(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .split(DELIMITER)
        .map(str::to_owned)
        .collect()
}
