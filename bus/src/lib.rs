// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! The two-wire bus contract used to reach transceiver memory maps.
//!
//! The embedding application owns the actual I2C driver for each physical
//! port. It hands us two capabilities, a byte-range read and a byte-range
//! write, each addressed by device address, register offset, and length. This
//! crate describes those capabilities as traits, and provides [`Bus`], a small
//! facade that borrows them and performs validated, chunked accesses on behalf
//! of the decoders.

pub mod mgmt;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

use mgmt::Device;
use mgmt::MemoryRegion;

/// The default 7-bit address of the serial ID device, `0xA0` in 8-bit form.
pub const ID_ADDRESS: u8 = 0x50;

/// The default 7-bit address of the diagnostics device, `0xA2` in 8-bit form.
pub const DIAGNOSTICS_ADDRESS: u8 = 0x51;

/// The default maximum number of bytes moved in a single bus transaction.
pub const MAX_TRANSFER_SIZE: u8 = 128;

/// The size of the memory map behind any single device address.
pub const MAP_SIZE: usize = 256;

/// An error accessing a transceiver over its two-wire bus.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// The addressed device did not acknowledge.
    #[error("Device 0x{device:02x} did not acknowledge")]
    Nack { device: u8 },

    /// The transaction did not complete in time.
    #[error("Bus transaction timed out")]
    Timeout,

    /// Another controller won arbitration for the bus.
    #[error("Bus arbitration lost")]
    ArbitrationLost,

    /// Any other non-success status reported by the bus implementation.
    #[error("Bus transaction failed with status {0}")]
    Status(i32),

    /// An access to memory outside of a device's 256-byte memory map.
    #[error("Invalid memory access: offset {offset}, length {len}")]
    InvalidMemoryAccess { offset: u8, len: usize },

    /// An access to a device address that is not part of the module.
    #[error("Invalid device address: 0x{0:02x}")]
    InvalidDevice(u8),

    /// Selected an invalid upper memory table.
    #[error("Invalid upper memory table: 0x{0:02x}")]
    InvalidTable(u8),
}

impl Error {
    /// Return true if this error was reported by the bus implementation
    /// itself, rather than by validating a request before it was issued.
    pub const fn is_transaction_failure(&self) -> bool {
        matches!(
            self,
            Error::Nack { .. } | Error::Timeout | Error::ArbitrationLost | Error::Status(_)
        )
    }
}

/// The read half of the bus contract.
///
/// Implementations fill `buf` with `buf.len()` bytes starting at `register`
/// of the device at the 7-bit address `device`. Any failure aborts the
/// current operation. Implementations may block, but should bound how long
/// they do so: a handle is unavailable to every other caller while one of its
/// accesses is outstanding.
pub trait BusRead: Send + Sync {
    fn read(&self, device: u8, register: u8, buf: &mut [u8]) -> Result<(), Error>;
}

/// The write half of the bus contract.
///
/// See [`BusRead`] for the blocking requirements.
pub trait BusWrite: Send + Sync {
    fn write(&self, device: u8, register: u8, buf: &[u8]) -> Result<(), Error>;
}

impl<F> BusRead for F
where
    F: Fn(u8, u8, &mut [u8]) -> Result<(), Error> + Send + Sync,
{
    fn read(&self, device: u8, register: u8, buf: &mut [u8]) -> Result<(), Error> {
        self(device, register, buf)
    }
}

impl<F> BusWrite for F
where
    F: Fn(u8, u8, &[u8]) -> Result<(), Error> + Send + Sync,
{
    fn write(&self, device: u8, register: u8, buf: &[u8]) -> Result<(), Error> {
        self(device, register, buf)
    }
}

/// A borrowed view of one port's bus callbacks.
///
/// The callbacks are never owned here. The lifetime `'a` ties every `Bus` to
/// the embedder's callbacks, so the compiler rejects any use after they are
/// gone.
#[derive(Clone, Copy)]
pub struct Bus<'a> {
    read: &'a dyn BusRead,
    write: &'a dyn BusWrite,
    id_address: u8,
    diagnostics_address: u8,
    max_transfer: u8,
}

impl core::fmt::Debug for Bus<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Bus")
            .field("id_address", &format_args!("0x{:02x}", self.id_address))
            .field(
                "diagnostics_address",
                &format_args!("0x{:02x}", self.diagnostics_address),
            )
            .field("max_transfer", &self.max_transfer)
            .finish_non_exhaustive()
    }
}

impl<'a> Bus<'a> {
    /// Create a bus over the provided callbacks, using the default device
    /// addresses and transfer size.
    pub fn new(read: &'a dyn BusRead, write: &'a dyn BusWrite) -> Self {
        Self {
            read,
            write,
            id_address: ID_ADDRESS,
            diagnostics_address: DIAGNOSTICS_ADDRESS,
            max_transfer: MAX_TRANSFER_SIZE,
        }
    }

    /// Use non-default 7-bit addresses for the two devices.
    pub fn with_addresses(mut self, id: u8, diagnostics: u8) -> Self {
        self.id_address = id;
        self.diagnostics_address = diagnostics;
        self
    }

    /// Limit the number of bytes moved in a single transaction.
    ///
    /// A limit of zero is treated as one.
    pub fn with_max_transfer(mut self, max_transfer: u8) -> Self {
        self.max_transfer = max_transfer.max(1);
        self
    }

    /// Return the bus address of a logical device.
    pub const fn address(&self, device: Device) -> u8 {
        match device {
            Device::Id => self.id_address,
            Device::Diagnostics => self.diagnostics_address,
        }
    }

    /// Map a raw bus address back to the logical device it names.
    pub fn device(&self, address: u8) -> Result<Device, Error> {
        if address == self.id_address {
            Ok(Device::Id)
        } else if address == self.diagnostics_address {
            Ok(Device::Diagnostics)
        } else {
            Err(Error::InvalidDevice(address))
        }
    }

    /// Return the maximum size of a single transaction.
    pub const fn max_transfer(&self) -> u8 {
        self.max_transfer
    }

    /// Read a validated region into `buf`, which must be exactly as long as
    /// the region.
    pub fn read(&self, region: MemoryRegion, buf: &mut [u8]) -> Result<(), Error> {
        if buf.len() != region.len() {
            return Err(Error::InvalidMemoryAccess {
                offset: region.offset(),
                len: buf.len(),
            });
        }
        let address = self.address(region.device());
        let mut rest = buf;
        for chunk in region.split(self.max_transfer) {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(chunk.len());
            self.read.read(address, chunk.offset(), head)?;
            rest = tail;
        }
        Ok(())
    }

    /// Read `len` bytes from `offset` of a device into a new buffer.
    pub fn read_vec(&self, device: Device, offset: u8, len: usize) -> Result<Vec<u8>, Error> {
        let region = MemoryRegion::new(device, offset, len)?;
        let mut buf = vec![0; len];
        self.read(region, &mut buf)?;
        Ok(buf)
    }

    /// Read a big-endian 16-bit word from a device.
    pub fn read_word(&self, device: Device, offset: u8) -> Result<[u8; 2], Error> {
        let region = MemoryRegion::new(device, offset, 2)?;
        let mut buf = [0u8; 2];
        self.read(region, &mut buf)?;
        Ok(buf)
    }

    /// Write `buf` to a validated region.
    pub fn write(&self, region: MemoryRegion, buf: &[u8]) -> Result<(), Error> {
        if buf.len() != region.len() {
            return Err(Error::InvalidMemoryAccess {
                offset: region.offset(),
                len: buf.len(),
            });
        }
        let address = self.address(region.device());
        let mut rest = buf;
        for chunk in region.split(self.max_transfer) {
            let (head, tail) = rest.split_at(chunk.len());
            self.write.write(address, chunk.offset(), head)?;
            rest = tail;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::mgmt::Device;
    use super::mgmt::MemoryRegion;
    use super::mock::MockModule;
    use super::Bus;
    use super::Error;
    use super::DIAGNOSTICS_ADDRESS;
    use super::ID_ADDRESS;

    #[test]
    fn test_bus_chunks_reads() {
        let module = MockModule::new();
        for (i, byte) in module.id_map_mut().iter_mut().enumerate() {
            *byte = i as u8;
        }
        let bus = Bus::new(&module, &module).with_max_transfer(16);
        let data = bus.read_vec(Device::Id, 8, 40).unwrap();
        assert_eq!(data, (8..48).collect::<Vec<u8>>());
        assert_eq!(module.n_reads(), 3);
    }

    #[test]
    fn test_bus_chunks_writes() {
        let module = MockModule::new();
        let bus = Bus::new(&module, &module).with_max_transfer(4);
        let region = MemoryRegion::new(Device::Diagnostics, 128, 10).unwrap();
        bus.write(region, &[0xaa; 10]).unwrap();
        assert_eq!(module.n_writes(), 3);
        assert_eq!(&module.diagnostics_map()[128..138], &[0xaa; 10]);
    }

    #[test]
    fn test_bus_read_aborts_on_first_failure() {
        let module = MockModule::new();
        module.fail_reads_after(1, Error::Nack { device: ID_ADDRESS });
        let bus = Bus::new(&module, &module).with_max_transfer(8);
        assert_eq!(
            bus.read_vec(Device::Id, 0, 32).unwrap_err(),
            Error::Nack { device: ID_ADDRESS }
        );
        // One successful chunk, then the failing one. Nothing further.
        assert_eq!(module.n_reads(), 2);
    }

    #[test]
    fn test_bus_rejects_mismatched_buffer() {
        let module = MockModule::new();
        let bus = Bus::new(&module, &module);
        let region = MemoryRegion::new(Device::Id, 0, 4).unwrap();
        let mut buf = [0u8; 3];
        assert!(matches!(
            bus.read(region, &mut buf),
            Err(Error::InvalidMemoryAccess { .. })
        ));
        assert_eq!(module.n_reads(), 0);
    }

    #[test]
    fn test_bus_device_addresses() {
        let module = MockModule::new();
        let bus = Bus::new(&module, &module);
        assert_eq!(bus.device(ID_ADDRESS).unwrap(), Device::Id);
        assert_eq!(bus.device(DIAGNOSTICS_ADDRESS).unwrap(), Device::Diagnostics);
        assert_eq!(bus.device(0x20).unwrap_err(), Error::InvalidDevice(0x20));

        let bus = bus.with_addresses(0x10, 0x11);
        assert_eq!(bus.address(Device::Diagnostics), 0x11);
        assert!(bus.device(ID_ADDRESS).is_err());
    }

    #[test]
    fn test_closures_implement_bus_traits() {
        let read = |device: u8, register: u8, buf: &mut [u8]| -> Result<(), Error> {
            buf.fill(device ^ register);
            Ok(())
        };
        let write = |_: u8, _: u8, _: &[u8]| -> Result<(), Error> { Err(Error::Status(-5)) };
        let bus = Bus::new(&read, &write);
        assert_eq!(bus.read_word(Device::Id, 0x01).unwrap(), [0x51, 0x51]);
        let region = MemoryRegion::new(Device::Id, 0, 1).unwrap();
        assert_eq!(bus.write(region, &[0]).unwrap_err(), Error::Status(-5));
    }

    #[test]
    fn test_transaction_failure_classification() {
        assert!(Error::Timeout.is_transaction_failure());
        assert!(Error::Status(3).is_transaction_failure());
        assert!(!Error::InvalidDevice(0).is_transaction_failure());
        assert!(!Error::InvalidMemoryAccess { offset: 0, len: 0 }.is_transaction_failure());
    }
}
