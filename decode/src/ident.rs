// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! Decoding of transceiver identifying information.

use crate::Error;
use chrono::NaiveDate;
use std::fmt;
pub use tcv_bus::mgmt::ManagementInterface;

crate::bitfield_enum! {
    name = Identifier,
    description = "The SFF-8024 identifier for a transceiver module.

This identifier is used as the main description of the kind of module, and
indicates the standard that it should conform to. It is required to interpret
the remainder of the memory map.",
    variants = {
        0x00, Unknown, "Unknown or unspecified",
        0x01, Gbic, "GBIC",
        0x02, Soldered, "Module/connector soldered to motherboard",
        0x03, Sfp, "SFP/SFP+/SFP28",
        0x04, Xbi, "XBI",
        0x05, Xenpak, "XENPAK",
        0x06, Xfp, "XFP",
        0x07, Xff, "XFF",
        0x08, XffE, "XFP-E",
        0x09, Xpak, "XPAK",
        0x0a, X2, "X2",
        0x0b, DwdmSfp, "DWDM-SFP/SFP+",
        0x0c, Qsfp, "QSFP",
        0x0d, QsfpPlusSff8636, "QSFP+ or later with SFF-8636",
        0x0e, Cxp, "CXP or later",
        0x0f, ShieldedMultiLane4, "Shielded mini multi-lane 4X",
        0x10, ShieldedMultiLane8, "Shielded mini multi-lane 8X",
        0x11, Qsfp28, "QSFP28 or later with SFF-8636",
        0x12, Cxp2, "CXP2",
        0x13, Cdfp, "CDFP (Style 1 or 2)",
        0x14, ShieldedMultiLane4Fanout, "Shielded mini multi-lane 4X fanout",
        0x15, ShieldedMultiLane8Fanout, "Shielded mini multi-lane 8X fanout",
        0x16, Cdfp3, "CDFP (Style 3)",
        0x17, MicroQsfp, "MicroQSFP",
        0x18, QsfpDD, "QSFP-DD",
        0x19, Osfp, "OSFP 8X",
        0x1a, SfpDD, "SFP-DD",
        0x1b, Dsfp, "DSFP",
        0x1c, X4MiniLink, "x4 MiniLink/OcuLink",
        0x1d, X8MiniLink, "x8 MiniLink",
        0x1e, QsfpPlusCmis, "QSFP+ or later with CMIS",
    },
    other_variants = {
        Reserved: 0x1f..=0x7f,
        VendorSpecific: 0x80..=0xff,
    }
}

impl Identifier {
    /// Return the management interface a module with this identifier
    /// implements, if it is one we can decode.
    pub const fn management_interface(&self) -> Result<ManagementInterface, Error> {
        use Identifier::*;
        match self {
            Sfp | DwdmSfp => Ok(ManagementInterface::Sff8472),
            Xfp => Ok(ManagementInterface::Inf8077),
            _ => Err(Error::UnsupportedIdentifier(*self)),
        }
    }

    /// Return true if the identifier byte carries no information at all.
    ///
    /// Unprogrammed EEPROMs read as all zeros, and an empty bus commonly
    /// floats high and reads as all ones.
    pub const fn is_blank(&self) -> bool {
        matches!(self, Identifier::Unknown | Identifier::VendorSpecific(0xff))
    }
}

/// An Organization Unique Identifier.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(
    any(feature = "api-traits", test),
    derive(serde::Deserialize, serde::Serialize, schemars::JsonSchema)
)]
#[cfg_attr(
    any(feature = "api-traits", test),
    serde(try_from = "String", into = "String")
)]
pub struct Oui(pub [u8; 3]);

impl std::str::FromStr for Oui {
    type Err = Error;

    // Three hex octets separated by `-`, as displayed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut out = [0u8; 3];
        let mut parts = s.split('-');
        for octet in out.iter_mut() {
            let part = parts.next().ok_or(Error::InvalidOui)?;
            if part.len() != 2 {
                return Err(Error::InvalidOui);
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| Error::InvalidOui)?;
        }
        if parts.next().is_some() {
            return Err(Error::InvalidOui);
        }
        Ok(Oui(out))
    }
}

impl TryFrom<String> for Oui {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Oui> for String {
    fn from(o: Oui) -> String {
        o.to_string()
    }
}

impl fmt::Display for Oui {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02x}-{:02x}-{:02x}", self.0[0], self.0[1], self.0[2])
    }
}

/// A vendor's manufacturing date code.
///
/// Both SFF-8472 and INF-8077i use the same 8-octet layout:
///
/// - Two ASCII digits for the year, relative to 2000.
/// - Two digits for the month number.
/// - Two digits for the day of the month.
/// - An optional two-character vendor lot code, space-padded.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
    any(feature = "api-traits", test),
    derive(serde::Deserialize, serde::Serialize, schemars::JsonSchema)
)]
pub struct DateCode {
    pub date: NaiveDate,
    pub lot: Option<String>,
}

impl DateCode {
    /// The size of an encoded date code.
    pub const SIZE: usize = 8;
}

impl TryFrom<&[u8]> for DateCode {
    type Error = Error;

    fn try_from(buf: &[u8]) -> Result<Self, Self::Error> {
        if buf.len() < Self::SIZE {
            return Err(Error::ParseFailed);
        }
        let digits = |range: std::ops::Range<usize>| -> Result<u32, Error> {
            std::str::from_utf8(&buf[range])
                .ok()
                .and_then(|s| s.parse().ok())
                .ok_or(Error::ParseFailed)
        };
        // Bounded by the two-digit field, so the cast cannot overflow.
        let year = 2000 + digits(0..2)? as i32;
        let month = digits(2..4)?;
        let day = digits(4..6)?;
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or(Error::ParseFailed)?;
        let lot = crate::utils::ascii_to_string(&buf[6..8])?;
        Ok(Self {
            date,
            lot: (!lot.is_empty()).then_some(lot),
        })
    }
}

impl fmt::Display for DateCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const FMT: &str = "%d %b %Y";
        match &self.lot {
            Some(lot) => write!(f, "{} (Lot {})", self.date.format(FMT), lot),
            None => write!(f, "{}", self.date.format(FMT)),
        }
    }
}

/// Identity and vendor information for a transceiver module.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    any(feature = "api-traits", test),
    derive(serde::Deserialize, serde::Serialize, schemars::JsonSchema)
)]
pub struct VendorInfo {
    /// The SFF-8024 identifier.
    pub identifier: Identifier,
    pub name: String,
    pub oui: Oui,
    pub part: String,
    pub revision: String,
    pub serial: String,
    /// The date code, if it could be parsed.
    pub date: Option<DateCode>,
}

impl fmt::Display for VendorInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", &self.name, &self.part)
    }
}
