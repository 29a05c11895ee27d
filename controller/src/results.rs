// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! Types for handling data returned by accessing multiple ports.
//!
//! An operation fanned out over every port of a [`crate::Registry`] may
//! succeed on some ports and fail on others. Rather than a `Result`, which is
//! either a value _or_ an error, these operations return a [`PortResult`],
//! which carries both: the data from each port that succeeded, and the error
//! from each port that did not.

use crate::Error;
use std::collections::BTreeMap;
use tcv_decode::Identifier;
use tcv_decode::ManagementInterface;
use tcv_decode::Monitors;
use tcv_decode::VendorInfo;

/// A generic type for accessing port-specific data and failures.
///
/// One should generally use the type aliases for this, such as
/// [`IdentifierResult`].
#[derive(Clone, Debug, PartialEq)]
pub struct PortResult<P> {
    /// The data from each port that succeeded.
    pub data: BTreeMap<u8, P>,
    /// The error from each port that failed.
    pub failures: BTreeMap<u8, Error>,
}

impl<P> Default for PortResult<P> {
    fn default() -> Self {
        Self {
            data: BTreeMap::new(),
            failures: BTreeMap::new(),
        }
    }
}

impl<P> PortResult<P> {
    /// Record the outcome for one port.
    pub fn insert(&mut self, port: u8, result: Result<P, Error>) {
        match result {
            Ok(data) => {
                self.failures.remove(&port);
                self.data.insert(port, data);
            }
            Err(e) => {
                self.data.remove(&port);
                self.failures.insert(port, e);
            }
        }
    }

    /// Return an iterator over the port indices and the corresponding data.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &P)> + '_ {
        self.data.iter().map(|(port, item)| (*port, item))
    }

    /// Return an iterator over the _errors_ in the result, with the port
    /// indices and the corresponding error.
    pub fn error_iter(&self) -> impl Iterator<Item = (u8, &Error)> + '_ {
        self.failures.iter().map(|(port, e)| (*port, e))
    }

    /// Return the data for the provided port, if it succeeded.
    pub fn nth(&self, port: u8) -> Option<&P> {
        self.data.get(&port)
    }

    /// Return the error for the provided port, if it failed.
    pub fn nth_err(&self, port: u8) -> Option<&Error> {
        self.failures.get(&port)
    }

    /// Return true if no port failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Return every port addressed, successful or not.
    pub fn ports(&self) -> Vec<u8> {
        let mut ports: Vec<_> = self.data.keys().chain(self.failures.keys()).copied().collect();
        ports.sort_unstable();
        ports
    }
}

impl<P> FromIterator<(u8, Result<P, Error>)> for PortResult<P> {
    fn from_iter<I: IntoIterator<Item = (u8, Result<P, Error>)>>(iter: I) -> Self {
        let mut out = Self::default();
        for (port, result) in iter {
            out.insert(port, result);
        }
        out
    }
}

/// The result of initializing a set of handles.
pub type InitializeResult = PortResult<ManagementInterface>;

/// The result of an operation with no data on success, but which may fail.
pub type AckResult = PortResult<()>;

/// The result of reading the SFF-8024 identifiers of a set of modules.
pub type IdentifierResult = PortResult<Identifier>;

impl IdentifierResult {
    /// Return the identifiers read from the modules.
    pub fn identifiers(&self) -> impl Iterator<Item = (u8, &Identifier)> + '_ {
        self.iter()
    }
}

/// The result of reading the vendor information of a set of modules.
pub type VendorInfoResult = PortResult<VendorInfo>;

impl VendorInfoResult {
    /// Return the vendor information read from the modules.
    pub fn vendor_info(&self) -> impl Iterator<Item = (u8, &VendorInfo)> + '_ {
        self.iter()
    }
}

/// The result of reading the monitors of a set of modules.
pub type MonitorResult = PortResult<Monitors>;

impl MonitorResult {
    /// Return the monitored values read from the modules.
    pub fn monitors(&self) -> impl Iterator<Item = (u8, &Monitors)> + '_ {
        self.iter()
    }
}
