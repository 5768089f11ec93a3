//! Hardware (MAC) address type and extraction from interface status text.
//!
//! The configuration utility reports the live hardware address only inside
//! its human-readable status output, so the address is recovered by scanning
//! that text for a six-octet colon-separated hex token.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error parsing a MAC address from text.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid MAC address: {0}")]
pub struct ParseMacError(String);

/// A 6-octet hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddr([u8; 6]);

impl MacAddr {
    /// Create from raw octets.
    pub fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// Get the raw octets.
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            o[0], o[1], o[2], o[3], o[4], o[5]
        )
    }
}

impl FromStr for MacAddr {
    type Err = ParseMacError;

    /// Parse six colon-separated hex octets. One or two digits per octet are
    /// accepted, matching what `ifconfig` prints across platforms.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut octets = [0u8; 6];
        let mut count = 0;

        for part in s.split(':') {
            if count == 6 || part.is_empty() || part.len() > 2 {
                return Err(ParseMacError(s.to_string()));
            }
            octets[count] =
                u8::from_str_radix(part, 16).map_err(|_| ParseMacError(s.to_string()))?;
            count += 1;
        }

        if count != 6 {
            return Err(ParseMacError(s.to_string()));
        }

        Ok(Self(octets))
    }
}

/// Scan interface status text for the first whitespace-separated token that
/// parses as a MAC address.
///
/// Returns `None` when the text carries no such token, including when it is
/// empty. Callers decide how severe that is.
pub fn find_mac(text: &str) -> Option<MacAddr> {
    text.split_whitespace()
        .find_map(|token| token.parse::<MacAddr>().ok())
}
