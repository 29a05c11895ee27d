// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! Configuration of transceiver handles.

use crate::Error;
use tcv_bus::DIAGNOSTICS_ADDRESS;
use tcv_bus::ID_ADDRESS;
use tcv_bus::MAX_TRANSFER_SIZE;

/// Return the default address of the identification device.
pub const fn default_id_address() -> u8 {
    ID_ADDRESS
}

/// Return the default address of the diagnostics device.
pub const fn default_diagnostics_address() -> u8 {
    DIAGNOSTICS_ADDRESS
}

/// Return the default maximum number of bytes per bus transaction.
pub const fn default_max_transfer() -> u8 {
    MAX_TRANSFER_SIZE
}

// The largest 7-bit two-wire address.
const MAX_ADDRESS: u8 = 0x7f;

/// Configuration for a [`crate::Transceiver`].
///
/// The [`ConfigBuilder`] can be used to construct this with defaults that
/// match the standard module addresses.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "api-traits",
    derive(serde::Deserialize, serde::Serialize, schemars::JsonSchema)
)]
pub struct Config {
    /// The 7-bit address of the serial ID device.
    pub id_address: u8,

    /// The 7-bit address of the diagnostics device, on modules which have
    /// one.
    pub diagnostics_address: u8,

    /// The maximum number of bytes moved by one bus transaction.
    ///
    /// Larger accesses are split into several.
    pub max_transfer: u8,

    /// Fail initialization if the stored base check code does not match
    /// the one computed from the serial ID data.
    pub verify_checksums: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            id_address: default_id_address(),
            diagnostics_address: default_diagnostics_address(),
            max_transfer: default_max_transfer(),
            verify_checksums: false,
        }
    }
}

/// A builder interface for generating handle configuration.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    id_address: Option<u8>,
    diagnostics_address: Option<u8>,
    max_transfer: Option<u8>,
    verify_checksums: bool,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the address of the serial ID device.
    pub fn id_address(mut self, address: u8) -> Self {
        self.id_address = Some(address);
        self
    }

    /// Set the address of the diagnostics device.
    pub fn diagnostics_address(mut self, address: u8) -> Self {
        self.diagnostics_address = Some(address);
        self
    }

    /// Set the maximum size of a single bus transaction.
    pub fn max_transfer(mut self, max_transfer: u8) -> Self {
        self.max_transfer = Some(max_transfer);
        self
    }

    /// Verify the base check code when initializing.
    pub fn verify_checksums(mut self, verify: bool) -> Self {
        self.verify_checksums = verify;
        self
    }

    /// Build a `Config` from `self`.
    pub fn build(self) -> Result<Config, Error> {
        let id_address = self.id_address.unwrap_or_else(default_id_address);
        let diagnostics_address = self
            .diagnostics_address
            .unwrap_or_else(default_diagnostics_address);
        let max_transfer = self.max_transfer.unwrap_or_else(default_max_transfer);
        if id_address > MAX_ADDRESS || diagnostics_address > MAX_ADDRESS {
            return Err(Error::InvalidArgument("bus addresses must be 7-bit"));
        }
        if id_address == diagnostics_address {
            return Err(Error::InvalidArgument("bus addresses must be distinct"));
        }
        if max_transfer == 0 {
            return Err(Error::InvalidArgument("maximum transfer size must be nonzero"));
        }
        Ok(Config {
            id_address,
            diagnostics_address,
            max_transfer,
            verify_checksums: self.verify_checksums,
        })
    }
}
