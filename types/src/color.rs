//! RGBA colours parsed from `#RRGGBBAA` / `#RRGGBB` hex strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexColorError {
    #[error("hex colour must start with '#'")]
    MissingHash,
    #[error("hex colour must be 7 or 9 characters long, got {0}")]
    InvalidLength(usize),
    #[error("invalid hex digit '{0}'")]
    InvalidDigit(char),
}

/// An 8-bit-per-channel colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RRGGBBAA`, or `#RRGGBB` with an implied opaque alpha.
    pub fn from_hex(hex: &str) -> Result<Self, HexColorError> {
        let digits = hex.strip_prefix('#').ok_or(HexColorError::MissingHash)?;

        let len = hex.chars().count();
        if len != 7 && len != 9 {
            return Err(HexColorError::InvalidLength(len));
        }
        if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(HexColorError::InvalidDigit(bad));
        }

        let value = u32::from_str_radix(digits, 16).map_err(|_| HexColorError::InvalidLength(len))?;
        let value = if len == 7 { (value << 8) | 0xff } else { value };
        let [r, g, b, a] = value.to_be_bytes();
        Ok(Self { r, g, b, a })
    }

    /// `#RRGGBBAA`, upper-case.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }

    #[must_use]
    pub fn red(self) -> f64 {
        unit(self.r)
    }

    #[must_use]
    pub fn green(self) -> f64 {
        unit(self.g)
    }

    #[must_use]
    pub fn blue(self) -> f64 {
        unit(self.b)
    }

    #[must_use]
    pub fn alpha(self) -> f64 {
        unit(self.a)
    }
}

fn unit(channel: u8) -> f64 {
    f64::from(channel) / 255.0
}

impl FromStr for Rgba {
    type Err = HexColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Rgba {
    type Error = HexColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Rgba> for String {
    fn from(value: Rgba) -> Self {
        value.to_hex()
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
