// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! Types for working with transceivers conforming to the INF-8077i (XFP)
//! management interface specification.

use crate::Error;

/// The byte in the lower memory map that selects the upper table.
pub const TABLE_SELECT: u8 = 127;

/// An upper memory table of an XFP module.
///
/// The upper 128 bytes of the map at `0xA0` are swapped in by writing the
/// table number to [`TABLE_SELECT`].
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd)]
pub struct Table(u8);

impl Table {
    /// The serial ID table.
    pub const SERIAL_ID: Table = Table(0x01);

    /// The user-writable EEPROM table.
    pub const USER_EEPROM: Table = Table(0x02);

    pub fn new(table: u8) -> Result<Self, Error> {
        if matches!(
        table,
        // Lower-page mirror, serial ID, and user EEPROM.
        0x00..=0x02 |
        // Vendor-specific functions.
        0x80..=0xFF
        ) {
            Ok(Self(table))
        } else {
            Err(Error::InvalidTable(table))
        }
    }

    pub fn table(&self) -> u8 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::Error;
    use super::Table;

    #[test]
    fn test_table() {
        assert!(Table::new(0x00).is_ok());
        assert_eq!(Table::new(0x01).unwrap(), Table::SERIAL_ID);
        assert_eq!(Table::new(0x02).unwrap(), Table::USER_EEPROM);
        assert!(Table::new(0xFF).is_ok());
        assert!(matches!(Table::new(0x03), Err(Error::InvalidTable(0x03))));
        assert!(matches!(Table::new(0x7F), Err(Error::InvalidTable(_))));
    }
}
