// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! Decode transceiver module memory maps.
//!
//! Each supported management interface provides one [`Decoder`], a stateless
//! table of operations. The decoder reads everything it needs from a module
//! once, in [`Decoder::load`], and stores it in an [`Eeprom`]. Every
//! operation then takes a [`Module`], which pairs that data with the bus for
//! any live readings.

pub mod codes;
mod decoder;
#[cfg(any(test, feature = "testing"))]
pub mod fixtures;
mod ident;
pub mod inf8077;
pub mod monitors;
pub mod options;
pub mod sff8472;
pub mod utils;

pub use decoder::Decoder;
pub use decoder::Module;
pub use decoder::Operation;
pub use ident::DateCode;
pub use ident::Identifier;
pub use ident::ManagementInterface;
pub use ident::Oui;
pub use ident::VendorInfo;
pub use monitors::Monitors;

/// An error related to decoding a transceiver memory map.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unsupported SFF-8024 Identifier: '{0}'")]
    UnsupportedIdentifier(Identifier),

    #[error("Operation '{0}' is not supported by the module")]
    Unsupported(Operation),

    #[error("Bus error")]
    Bus(#[from] tcv_bus::Error),

    #[error("Memory map parsing failed")]
    ParseFailed,

    #[error("Check code mismatch: stored 0x{stored:02x}, computed 0x{computed:02x}")]
    ChecksumMismatch { stored: u8, computed: u8 },

    #[error("Bit index out of range")]
    BitOutOfRange,

    #[error("Invalid OUI")]
    InvalidOui,
}

/// The decoder-private copy of a module's memory maps, tagged by management
/// interface.
#[derive(Clone, Debug, PartialEq)]
pub enum Eeprom {
    Sff8472(sff8472::Eeprom),
    Inf8077(inf8077::Eeprom),
}

impl Eeprom {
    /// The management interface whose layout this data follows.
    pub const fn interface(&self) -> ManagementInterface {
        match self {
            Eeprom::Sff8472(_) => ManagementInterface::Sff8472,
            Eeprom::Inf8077(_) => ManagementInterface::Inf8077,
        }
    }
}

static SFF8472: sff8472::Sff8472 = sff8472::Sff8472;
static INF8077: inf8077::Inf8077 = inf8077::Inf8077;

/// Return the decoder for a management interface.
pub fn decoder(interface: ManagementInterface) -> &'static dyn Decoder {
    match interface {
        ManagementInterface::Sff8472 => &SFF8472,
        ManagementInterface::Inf8077 => &INF8077,
    }
}

/// Return the decoder for modules with the given SFF-8024 identifier.
pub fn decoder_for(id: Identifier) -> Result<&'static dyn Decoder, Error> {
    id.management_interface().map(decoder)
}
