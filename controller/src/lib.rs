// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! A uniform handle for querying transceiver modules.
//!
//! A [`Transceiver`] is bound to one physical port and a pair of bus
//! callbacks supplied by the embedder. Initializing it probes the module,
//! selects the decoder for its management interface, and reads the module's
//! memory maps once. Every query is then dispatched through that decoder,
//! with the handle locked for the whole operation.
//!
//! A [`Registry`] manages the handles of many ports at once.

mod config;
mod registry;
mod results;
mod transceiver;

pub use config::*;
pub use registry::Registry;
pub use results::*;
pub use tcv_bus::BusRead;
pub use tcv_bus::BusWrite;
pub use tcv_decode::Identifier;
pub use tcv_decode::ManagementInterface;
pub use tcv_decode::Operation;
pub use transceiver::Lifecycle;
pub use transceiver::Transceiver;
pub use transceiver::TransceiverBuilder;

/// The reason a module could not be probed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ProbeFailure {
    /// Reading the identifier failed.
    #[error("Bus error reading identifier")]
    Bus(#[source] tcv_bus::Error),

    /// The identifier read indicates there is nothing to identify.
    #[error("Blank identifier 0x{0:02x}")]
    Blank(u8),
}

/// An error operating on a transceiver handle.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("Transceiver handle has not been created")]
    NotCreated,

    #[error("Transceiver handle is already initialized")]
    AlreadyInitialized,

    #[error("Transceiver handle is not initialized")]
    NotInitialized,

    #[error("Transceiver handle has been destroyed")]
    Destroyed,

    #[error("Probing the module failed: {0}")]
    ProbeFailed(ProbeFailure),

    #[error("Unsupported device with SFF-8024 identifier '{0}'")]
    UnsupportedDevice(Identifier),

    #[error("Bus error")]
    Bus(#[source] tcv_bus::Error),

    #[error("Decode error")]
    Decode(#[source] tcv_decode::Error),

    #[error("Operation '{0}' is not supported by the module")]
    Unsupported(Operation),
}

impl From<tcv_decode::Error> for Error {
    fn from(e: tcv_decode::Error) -> Self {
        match e {
            tcv_decode::Error::Unsupported(op) => Error::Unsupported(op),
            tcv_decode::Error::Bus(e) => Error::Bus(e),
            other => Error::Decode(other),
        }
    }
}

impl From<tcv_bus::Error> for Error {
    fn from(e: tcv_bus::Error) -> Self {
        Error::Bus(e)
    }
}


#[cfg(test)]
mod tests {
    use super::Error;
    use super::Operation;
    use tcv_decode::Identifier;

    #[test]
    fn test_decode_errors_map_to_handle_errors() {
        assert_eq!(
            Error::from(tcv_decode::Error::Unsupported(Operation::SupplyVoltage)),
            Error::Unsupported(Operation::SupplyVoltage)
        );
        assert_eq!(
            Error::from(tcv_decode::Error::Bus(tcv_bus::Error::Timeout)),
            Error::Bus(tcv_bus::Error::Timeout)
        );
        assert_eq!(
            Error::from(tcv_decode::Error::ParseFailed),
            Error::Decode(tcv_decode::Error::ParseFailed)
        );
        assert_eq!(
            Error::from(tcv_decode::Error::UnsupportedIdentifier(Identifier::Qsfp)),
            Error::Decode(tcv_decode::Error::UnsupportedIdentifier(Identifier::Qsfp))
        );
    }
}
