//! Node numbers.
//!
//! Every device on the mesh is addressed by a 32-bit node number. Users see
//! it as `!` followed by eight lowercase hex digits (`!a1b2c3d4`), which is
//! also the form accepted on the console alongside decimal and `0x` hex.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a node on the mesh.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Wrap a raw node number.
    pub const fn new(num: u32) -> Self {
        Self(num)
    }

    /// The raw node number.
    pub const fn num(self) -> u32 {
        self.0
    }
}

impl From<u32> for NodeId {
    fn from(num: u32) -> Self {
        Self(num)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "!{:08x}", self.0)
    }
}

/// Error returned when a node id string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdParseError {
    input: String,
}

impl fmt::Display for NodeIdParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid node id '{}': expected decimal, 0x<hex> or !<hex>",
            self.input
        )
    }
}

impl std::error::Error for NodeIdParseError {}

impl FromStr for NodeId {
    type Err = NodeIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let err = || NodeIdParseError {
            input: trimmed.to_string(),
        };

        let hex = trimmed
            .strip_prefix('!')
            .or_else(|| trimmed.strip_prefix("0x"))
            .or_else(|| trimmed.strip_prefix("0X"));

        let num = match hex {
            Some(digits) if !digits.is_empty() => {
                u32::from_str_radix(digits, 16).map_err(|_| err())?
            }
            Some(_) => return Err(err()),
            None => trimmed.parse::<u32>().map_err(|_| err())?,
        };

        Ok(Self(num))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_bang_hex() {
        assert_eq!(NodeId::new(0xa1b2c3d4).to_string(), "!a1b2c3d4");
        assert_eq!(NodeId::new(1).to_string(), "!00000001");
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!("42".parse::<NodeId>(), Ok(NodeId::new(42)));
    }

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!("!a1b2c3d4".parse::<NodeId>(), Ok(NodeId::new(0xa1b2c3d4)));
        assert_eq!("0xFF".parse::<NodeId>(), Ok(NodeId::new(0xff)));
    }

    #[test]
    fn test_display_parse_agree() {
        let id = NodeId::new(0xdeadbeef);
        assert_eq!(id.to_string().parse::<NodeId>(), Ok(id));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<NodeId>().is_err());
        assert!("!".parse::<NodeId>().is_err());
        assert!("node".parse::<NodeId>().is_err());
        assert!("!1234567890".parse::<NodeId>().is_err());
    }

    #[test]
    fn test_parse_error_display() {
        let err = "xyz".parse::<NodeId>().unwrap_err();
        assert!(err.to_string().contains("'xyz'"));
    }
}
