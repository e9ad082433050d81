//! # Safe Names: Instance and WAL Segment Identifiers
//!
//! Every name that becomes a path segment under the backup root passes
//! through [`is_valid_name`]. The grammar is
//! `^[A-Za-z0-9_-][A-Za-z0-9_.-]*$`: non-empty, the first character is
//! alphanumeric, `_` or `-`, and later characters may additionally be `.`.
//!
//! ## Security Invariant
//!
//! The grammar admits no `/`, no whitespace and no leading `.`, so a valid
//! name can never be `.`, `..`, an absolute path, or a hidden file. The
//! newtypes below can only be built through the validator, which makes an
//! unvalidated name unrepresentable at the storage boundary.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Which kind of name failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    /// A database instance name.
    Instance,
    /// A WAL segment name.
    WalSegment,
}

impl NameKind {
    fn label(self) -> &'static str {
        match self {
            Self::Instance => "instance",
            Self::WalSegment => "WAL segment",
        }
    }
}

/// A name was rejected by the safe-name grammar.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {} name: {value:?}", .kind.label())]
pub struct NameError {
    /// Which name was rejected.
    pub kind: NameKind,
    /// The rejected input.
    pub value: String,
}

/// Returns whether `name` fully matches `^[A-Za-z0-9_-][A-Za-z0-9_.-]*$`.
///
/// Pure and total; performs no I/O.
pub fn is_valid_name(name: &str) -> bool {
    let mut bytes = name.bytes();
    match bytes.next() {
        Some(first) if is_leading_byte(first) => bytes.all(|b| is_leading_byte(b) || b == b'.'),
        _ => false,
    }
}

fn is_leading_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

macro_rules! validated_name {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            /// Validate `value` and wrap it.
            pub fn parse(value: impl Into<String>) -> Result<Self, NameError> {
                let value = value.into();
                if is_valid_name(&value) {
                    Ok(Self(value))
                } else {
                    Err(NameError { kind: $kind, value })
                }
            }

            /// The validated name.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = NameError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0)
            }
        }
    };
}

validated_name!(
    /// Name of a database installation whose backups are kept apart from others.
    InstanceName,
    NameKind::Instance
);

validated_name!(
    /// Caller-assigned name of a WAL segment, e.g. `000000010000000000000003`.
    SegmentName,
    NameKind::WalSegment
);
