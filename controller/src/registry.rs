// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! Manage the transceiver handles of many ports.

use crate::config::Config;
use crate::results::AckResult;
use crate::results::IdentifierResult;
use crate::results::InitializeResult;
use crate::results::MonitorResult;
use crate::results::PortResult;
use crate::results::VendorInfoResult;
use crate::transceiver::Transceiver;
use crate::Error;
use parking_lot::Mutex;
use slog::debug;
use slog::Logger;
use std::collections::BTreeMap;
use std::sync::Arc;
use tcv_bus::BusRead;
use tcv_bus::BusWrite;
use tcv_decode::ManagementInterface;

/// A set of transceiver handles, keyed by port.
///
/// Each handle keeps its own lock, so operations on different ports proceed
/// independently. The registry lock only guards the set of handles, and is
/// never held while a handle is operated on.
pub struct Registry<'a> {
    config: Config,
    log: Logger,
    handles: Mutex<BTreeMap<u8, Arc<Transceiver<'a>>>>,
}

impl core::fmt::Debug for Registry<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("ports", &self.ports())
            .finish_non_exhaustive()
    }
}

impl<'a> Registry<'a> {
    /// Create an empty registry, whose handles all use `config`.
    pub fn new(config: Config, log: Logger) -> Self {
        Self {
            config,
            log,
            handles: Mutex::new(BTreeMap::new()),
        }
    }

    /// Create a handle for `port`, bound to a pair of bus callbacks.
    ///
    /// Fails with [`Error::InvalidArgument`] if the port already has one.
    pub fn create(
        &self,
        port: u8,
        read: &'a dyn BusRead,
        write: &'a dyn BusWrite,
    ) -> Result<Arc<Transceiver<'a>>, Error> {
        let mut handles = self.handles.lock();
        if handles.contains_key(&port) {
            return Err(Error::InvalidArgument("port already has a handle"));
        }
        let handle = Transceiver::builder(port)
            .read(read)
            .write(write)
            .config(self.config)
            .log(self.log.clone())
            .build()
            .map(Arc::new)?;
        handles.insert(port, Arc::clone(&handle));
        Ok(handle)
    }

    /// Return the handle for `port`.
    pub fn get(&self, port: u8) -> Result<Arc<Transceiver<'a>>, Error> {
        self.handles.lock().get(&port).cloned().ok_or(Error::NotCreated)
    }

    /// Return the ports which have a handle, in order.
    pub fn ports(&self) -> Vec<u8> {
        self.handles.lock().keys().copied().collect()
    }

    /// Initialize the handle for `port`.
    pub fn initialize(&self, port: u8) -> Result<ManagementInterface, Error> {
        self.get(port)?.initialize()
    }

    /// Destroy the handle for `port`, and remove it from the registry.
    ///
    /// Callers still holding the handle see [`Error::Destroyed`] from every
    /// later operation.
    pub fn destroy(&self, port: u8) -> Result<(), Error> {
        let handle = self
            .handles
            .lock()
            .remove(&port)
            .ok_or(Error::NotCreated)?;
        debug!(self.log, "removed transceiver handle"; "port" => port);
        handle.destroy()
    }

    // Snapshot the handles, so none of the per-port work happens with the
    // registry locked.
    fn handles(&self) -> Vec<Arc<Transceiver<'a>>> {
        self.handles.lock().values().cloned().collect()
    }

    /// Run `f` against every handle, collecting the result from each port.
    pub fn query<T, F>(&self, f: F) -> PortResult<T>
    where
        F: Fn(&Transceiver<'a>) -> Result<T, Error>,
    {
        self.handles()
            .iter()
            .map(|handle| (handle.port(), f(handle.as_ref())))
            .collect()
    }

    /// Initialize every handle which has not yet been initialized.
    pub fn initialize_all(&self) -> InitializeResult {
        self.query(|handle| handle.initialize())
    }

    /// Destroy and remove every handle.
    pub fn destroy_all(&self) -> AckResult {
        let handles = std::mem::take(&mut *self.handles.lock());
        handles
            .into_iter()
            .map(|(port, handle)| (port, handle.destroy()))
            .collect()
    }

    /// Read the SFF-8024 identifier of every module.
    pub fn identifiers(&self) -> IdentifierResult {
        self.query(|handle| handle.identifier())
    }

    /// Read the vendor information of every module.
    pub fn vendor_info(&self) -> VendorInfoResult {
        self.query(|handle| handle.vendor_info())
    }

    /// Read the live monitors of every module.
    pub fn monitors(&self) -> MonitorResult {
        self.query(|handle| handle.monitors())
    }
}
