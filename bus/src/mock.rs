// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! An in-memory transceiver module, for testing.
//!
//! [`MockModule`] implements both halves of the bus contract over two
//! 256-byte device maps. It can optionally page the upper half of the ID
//! device the way XFP modules do, inject bus failures, and detect overlapping
//! transactions.

use crate::mgmt::inf8077::TABLE_SELECT;
use crate::BusRead;
use crate::BusWrite;
use crate::Error;
use crate::DIAGNOSTICS_ADDRESS;
use crate::ID_ADDRESS;
use crate::MAP_SIZE;
use parking_lot::MappedMutexGuard;
use parking_lot::Mutex;
use parking_lot::MutexGuard;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

const HALF: usize = MAP_SIZE / 2;

#[derive(Debug)]
struct Maps {
    id: [u8; MAP_SIZE],
    diagnostics: [u8; MAP_SIZE],
    // Upper tables for paged (XFP) modules, keyed by table number. `None`
    // means the module is flat.
    tables: Option<BTreeMap<u8, [u8; HALF]>>,
}

// Reads succeed this many more times, then fail with the error.
#[derive(Debug)]
struct ReadFault {
    remaining: usize,
    error: Error,
}

/// A fake transceiver module backed by memory.
#[derive(Debug)]
pub struct MockModule {
    id_address: u8,
    diagnostics_address: u8,
    maps: Mutex<Maps>,
    read_fault: Mutex<Option<ReadFault>>,
    write_fault: Mutex<Option<Error>>,
    latency: Option<Duration>,
    n_reads: AtomicUsize,
    n_writes: AtomicUsize,
    busy: AtomicBool,
    n_overlaps: AtomicUsize,
}

impl Default for MockModule {
    fn default() -> Self {
        Self::new()
    }
}

impl MockModule {
    /// Create a flat module with zeroed maps at the default addresses.
    pub fn new() -> Self {
        Self {
            id_address: ID_ADDRESS,
            diagnostics_address: DIAGNOSTICS_ADDRESS,
            maps: Mutex::new(Maps {
                id: [0; MAP_SIZE],
                diagnostics: [0; MAP_SIZE],
                tables: None,
            }),
            read_fault: Mutex::new(None),
            write_fault: Mutex::new(None),
            latency: None,
            n_reads: AtomicUsize::new(0),
            n_writes: AtomicUsize::new(0),
            busy: AtomicBool::new(false),
            n_overlaps: AtomicUsize::new(0),
        }
    }

    /// Create a module whose ID device pages its upper half through the
    /// table-select byte, with tables 0x01 and 0x02 present.
    pub fn paged() -> Self {
        let module = Self::new();
        {
            let mut maps = module.maps.lock();
            maps.id[usize::from(TABLE_SELECT)] = 0x01;
            maps.tables = Some(BTreeMap::from([(0x01, [0; HALF]), (0x02, [0; HALF])]));
        }
        module
    }

    /// Answer on different 7-bit addresses.
    pub fn with_addresses(mut self, id: u8, diagnostics: u8) -> Self {
        self.id_address = id;
        self.diagnostics_address = diagnostics;
        self
    }

    /// Sleep for `latency` inside every transaction.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Mutable access to the whole ID device map.
    ///
    /// For paged modules, the upper half here is not visible on the bus; use
    /// [`MockModule::table_mut`] instead.
    pub fn id_map_mut(&self) -> MappedMutexGuard<'_, [u8; MAP_SIZE]> {
        MutexGuard::map(self.maps.lock(), |maps| &mut maps.id)
    }

    /// Mutable access to the whole diagnostics device map.
    pub fn diagnostics_map_mut(&self) -> MappedMutexGuard<'_, [u8; MAP_SIZE]> {
        MutexGuard::map(self.maps.lock(), |maps| &mut maps.diagnostics)
    }

    /// Return a copy of the diagnostics device map.
    pub fn diagnostics_map(&self) -> [u8; MAP_SIZE] {
        self.maps.lock().diagnostics
    }

    /// Mutable access to an upper table of a paged module, creating it if
    /// needed.
    ///
    /// # Panics
    ///
    /// Panics if the module is flat.
    pub fn table_mut(&self, table: u8) -> MappedMutexGuard<'_, [u8; HALF]> {
        MutexGuard::map(self.maps.lock(), |maps| {
            maps.tables
                .as_mut()
                .expect("table access on a flat mock module")
                .entry(table)
                .or_insert([0; HALF])
        })
    }

    /// Remove an upper table, so that selecting it fails.
    pub fn remove_table(&self, table: u8) {
        if let Some(tables) = self.maps.lock().tables.as_mut() {
            tables.remove(&table);
        }
    }

    /// Let the next `n` reads succeed, then fail every read with `error`.
    pub fn fail_reads_after(&self, n: usize, error: Error) {
        *self.read_fault.lock() = Some(ReadFault {
            remaining: n,
            error,
        });
    }

    /// Fail every write with `error`.
    pub fn fail_writes(&self, error: Error) {
        *self.write_fault.lock() = Some(error);
    }

    /// Remove any injected faults.
    pub fn clear_faults(&self) {
        *self.read_fault.lock() = None;
        *self.write_fault.lock() = None;
    }

    /// The number of read transactions attempted so far.
    pub fn n_reads(&self) -> usize {
        self.n_reads.load(Ordering::SeqCst)
    }

    /// The number of write transactions attempted so far.
    pub fn n_writes(&self) -> usize {
        self.n_writes.load(Ordering::SeqCst)
    }

    /// The number of transactions that started while another was still in
    /// flight.
    pub fn n_overlaps(&self) -> usize {
        self.n_overlaps.load(Ordering::SeqCst)
    }

    // Mark a transaction as in flight, and record if another already was.
    fn enter(&self) {
        if self.busy.swap(true, Ordering::SeqCst) {
            self.n_overlaps.fetch_add(1, Ordering::SeqCst);
        }
        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }
    }

    fn exit(&self) {
        self.busy.store(false, Ordering::SeqCst);
    }

    fn check_access(&self, device: u8, register: u8, len: usize) -> Result<(), Error> {
        if device != self.id_address && device != self.diagnostics_address {
            return Err(Error::Nack { device });
        }
        if usize::from(register) + len > MAP_SIZE {
            return Err(Error::InvalidMemoryAccess {
                offset: register,
                len,
            });
        }
        Ok(())
    }

    fn do_read(&self, device: u8, register: u8, buf: &mut [u8]) -> Result<(), Error> {
        self.n_reads.fetch_add(1, Ordering::SeqCst);
        if let Some(fault) = self.read_fault.lock().as_mut() {
            if fault.remaining == 0 {
                return Err(fault.error);
            }
            fault.remaining -= 1;
        }
        self.check_access(device, register, buf.len())?;
        let guard = self.maps.lock();
        let maps = &*guard;
        if device == self.diagnostics_address {
            let start = usize::from(register);
            buf.copy_from_slice(&maps.diagnostics[start..start + buf.len()]);
            return Ok(());
        }
        for (i, byte) in buf.iter_mut().enumerate() {
            let addr = usize::from(register) + i;
            *byte = match &maps.tables {
                Some(tables) if addr >= HALF => {
                    let table = maps.id[usize::from(TABLE_SELECT)];
                    let upper = tables.get(&table).ok_or(Error::Nack { device })?;
                    upper[addr - HALF]
                }
                _ => maps.id[addr],
            };
        }
        Ok(())
    }

    fn do_write(&self, device: u8, register: u8, buf: &[u8]) -> Result<(), Error> {
        self.n_writes.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = *self.write_fault.lock() {
            return Err(error);
        }
        self.check_access(device, register, buf.len())?;
        let mut guard = self.maps.lock();
        let maps = &mut *guard;
        if device == self.diagnostics_address {
            let start = usize::from(register);
            maps.diagnostics[start..start + buf.len()].copy_from_slice(buf);
            return Ok(());
        }
        for (i, byte) in buf.iter().enumerate() {
            let addr = usize::from(register) + i;
            let table = maps.id[usize::from(TABLE_SELECT)];
            match maps.tables.as_mut() {
                Some(tables) if addr >= HALF => {
                    let upper = tables.get_mut(&table).ok_or(Error::Nack { device })?;
                    upper[addr - HALF] = *byte;
                }
                _ => maps.id[addr] = *byte,
            }
        }
        Ok(())
    }
}

impl BusRead for MockModule {
    fn read(&self, device: u8, register: u8, buf: &mut [u8]) -> Result<(), Error> {
        self.enter();
        let result = self.do_read(device, register, buf);
        self.exit();
        result
    }
}

impl BusWrite for MockModule {
    fn write(&self, device: u8, register: u8, buf: &[u8]) -> Result<(), Error> {
        self.enter();
        let result = self.do_write(device, register, buf);
        self.exit();
        result
    }
}
