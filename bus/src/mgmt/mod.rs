// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! Specifications for transceiver management interfaces.

pub mod inf8077;

use crate::Error;
use crate::MAP_SIZE;
use core::fmt;

/// The specification to which a transceiver's management interface conforms.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ManagementInterface {
    /// SFF-8472, which covers SFP, SFP+ and SFP28 modules.
    Sff8472,
    /// INF-8077i, which covers XFP modules.
    Inf8077,
}

impl fmt::Display for ManagementInterface {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ManagementInterface::Sff8472 => write!(f, "SFF-8472"),
            ManagementInterface::Inf8077 => write!(f, "INF-8077i"),
        }
    }
}

/// One of the two logical devices a module exposes on its two-wire bus.
///
/// SFP modules conforming to SFF-8472 place their serial ID data at `0xA0`
/// and their digital diagnostics at `0xA2` (8-bit addressing). XFP modules
/// use only the first, paging the upper half of the map instead. The actual
/// 7-bit addresses are configurable on the [`crate::Bus`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Device {
    /// The serial ID device, `0xA0`.
    Id,
    /// The diagnostics device, `0xA2`.
    Diagnostics,
}

/// A description of a region of one device's memory map.
///
/// This type performs validation against the offset / length, to ensure
/// they're a valid access for the 256-byte memory map behind each device
/// address.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MemoryRegion {
    device: Device,
    offset: u8,
    len: usize,
}

impl MemoryRegion {
    /// Construct a new memory region.
    pub fn new(device: Device, offset: u8, len: usize) -> Result<Self, Error> {
        // A valid access may end exactly at the end of the map (e.g.,
        // offset = 192 and len = 64), so compute the end in a wider type.
        if usize::from(offset) + len > MAP_SIZE {
            return Err(Error::InvalidMemoryAccess { offset, len });
        }
        Ok(Self {
            device,
            offset,
            len,
        })
    }

    /// Return the device this region lives on.
    pub fn device(&self) -> Device {
        self.device
    }

    /// Return the offset into the device memory map.
    pub fn offset(&self) -> u8 {
        self.offset
    }

    /// Return the length of the region.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Return true if the region covers no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Split this region into consecutive chunks of at most `max` bytes.
    ///
    /// Many modules generate bus errors on very large accesses, so callers
    /// issue one transaction per chunk. A `max` of zero is treated as one.
    pub fn split(&self, max: u8) -> impl Iterator<Item = MemoryRegion> + '_ {
        let max = usize::from(max.max(1));
        let start = usize::from(self.offset);
        let stop = start + self.len;
        (start..stop).step_by(max).map(move |offset| MemoryRegion {
            device: self.device,
            // `offset < stop <= MAP_SIZE`, so this fits in a u8.
            offset: offset as u8,
            len: max.min(stop - offset),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Device;
    use super::MemoryRegion;
    use crate::Error;

    #[test]
    fn test_memory_region() {
        let region = MemoryRegion::new(Device::Id, 0, 10).unwrap();
        assert_eq!(region.device(), Device::Id);
        assert_eq!(region.offset(), 0);
        assert_eq!(region.len(), 10);

        // Ends exactly at the end of the map.
        assert!(MemoryRegion::new(Device::Diagnostics, 192, 64).is_ok());

        // Would read past map end.
        assert!(matches!(
            MemoryRegion::new(Device::Id, 1, 256).unwrap_err(),
            Error::InvalidMemoryAccess { .. }
        ));
        assert!(matches!(
            MemoryRegion::new(Device::Id, 255, 2).unwrap_err(),
            Error::InvalidMemoryAccess { .. }
        ));
    }

    #[test]
    fn test_split_even() {
        let region = MemoryRegion::new(Device::Id, 0, 128).unwrap();
        let chunks: Vec<_> = region.split(32).collect();
        assert_eq!(chunks.len(), 4);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(usize::from(chunk.offset()), i * 32);
            assert_eq!(chunk.len(), 32);
        }
    }

    #[test]
    fn test_split_uneven_to_end_of_map() {
        let region = MemoryRegion::new(Device::Diagnostics, 200, 56).unwrap();
        let chunks: Vec<_> = region.split(24).collect();
        assert_eq!(
            chunks.iter().map(|c| (c.offset(), c.len())).collect::<Vec<_>>(),
            vec![(200, 24), (224, 24), (248, 8)]
        );
        assert!(chunks.iter().all(|c| c.device() == Device::Diagnostics));
    }

    #[test]
    fn test_split_empty_region() {
        let region = MemoryRegion::new(Device::Id, 16, 0).unwrap();
        assert!(region.is_empty());
        assert_eq!(region.split(8).count(), 0);
    }
}
