// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! The transceiver handle and its lifecycle.

use crate::config::Config;
use crate::Error;
use crate::ProbeFailure;
use parking_lot::Mutex;
use slog::debug;
use slog::trace;
use slog::warn;
use slog::Logger;
use tcv_bus::mgmt::Device;
use tcv_bus::mgmt::MemoryRegion;
use tcv_bus::Bus;
use tcv_bus::BusRead;
use tcv_bus::BusWrite;
use tcv_decode::codes::CableTechnology;
use tcv_decode::codes::Connector;
use tcv_decode::codes::Encoding;
use tcv_decode::codes::EsconCompliance;
use tcv_decode::codes::EthernetCompliance;
use tcv_decode::codes::FibreChannelLinkLength;
use tcv_decode::codes::FibreChannelMedia;
use tcv_decode::codes::FibreChannelSpeed;
use tcv_decode::codes::FibreChannelTechnology;
use tcv_decode::codes::InfinibandCompliance;
use tcv_decode::codes::RateIdentifier;
use tcv_decode::codes::SonetCompliance;
use tcv_decode::codes::TenGigEthernetCompliance;
use tcv_decode::options::ActiveCableCompliance;
use tcv_decode::options::DiagnosticType;
use tcv_decode::options::EnhancedOptions;
use tcv_decode::options::ImplementedOptions;
use tcv_decode::options::PassiveCableCompliance;
use tcv_decode::DateCode;
use tcv_decode::Decoder;
use tcv_decode::Eeprom;
use tcv_decode::Error as DecodeError;
use tcv_decode::Identifier;
use tcv_decode::ManagementInterface;
use tcv_decode::Module;
use tcv_decode::Monitors;
use tcv_decode::Operation;
use tcv_decode::Oui;
use tcv_decode::VendorInfo;

// The decoder selected for a module, and the data it read from it.
#[derive(Debug)]
struct Binding {
    decoder: &'static dyn Decoder,
    eeprom: Eeprom,
}

#[derive(Debug)]
enum State {
    Created,
    Initialized(Binding),
    Destroyed,
}

/// The lifecycle state of a [`Transceiver`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Lifecycle {
    /// Created, but not yet bound to a decoder.
    Created,
    /// Bound to the decoder for a management interface.
    Initialized(ManagementInterface),
    /// Torn down. Every further operation fails.
    Destroyed,
}

// Map an unsupported reading to `None`.
fn supported<T>(result: Result<T, DecodeError>) -> Result<Option<T>, DecodeError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(DecodeError::Unsupported(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

// Operations which take no arguments and forward directly to the decoder
// method of the same name.
macro_rules! operations {
    ($($(#[$attr:meta])* $method:ident => $op:ident -> $ty:ty;)*) => {
        $(
            $(#[$attr])*
            pub fn $method(&self) -> Result<$ty, Error> {
                self.dispatch(Operation::$op, |d, m| d.$method(m))
            }
        )*
    };
}

/// A handle to the transceiver module in one port.
///
/// The handle borrows the embedder's bus callbacks for its whole lifetime,
/// and never owns them. All operations, including [`Transceiver::initialize`]
/// and [`Transceiver::destroy`], lock the handle for their full duration, so
/// operations on one handle never overlap, and bus callbacks are always
/// invoked with the lock held. Handles for different ports are independent.
pub struct Transceiver<'a> {
    port: u8,
    read: &'a dyn BusRead,
    write: &'a dyn BusWrite,
    config: Config,
    log: Logger,
    state: Mutex<State>,
}

impl core::fmt::Debug for Transceiver<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Transceiver")
            .field("port", &self.port)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// A builder for a [`Transceiver`].
pub struct TransceiverBuilder<'a> {
    port: u8,
    read: Option<&'a dyn BusRead>,
    write: Option<&'a dyn BusWrite>,
    config: Config,
    log: Option<Logger>,
}

impl<'a> TransceiverBuilder<'a> {
    /// Start building a handle for the module in `port`.
    pub fn new(port: u8) -> Self {
        Self {
            port,
            read: None,
            write: None,
            config: Config::default(),
            log: None,
        }
    }

    /// Set the read callback. Required.
    pub fn read(mut self, read: &'a dyn BusRead) -> Self {
        self.read = Some(read);
        self
    }

    /// Set the write callback. Required.
    pub fn write(mut self, write: &'a dyn BusWrite) -> Self {
        self.write = Some(write);
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Log to `log`. By default, log messages are discarded.
    pub fn log(mut self, log: Logger) -> Self {
        self.log = Some(log);
        self
    }

    /// Create the handle.
    ///
    /// No bus access occurs until the handle is initialized.
    pub fn build(self) -> Result<Transceiver<'a>, Error> {
        let read = self
            .read
            .ok_or(Error::InvalidArgument("missing read callback"))?;
        let write = self
            .write
            .ok_or(Error::InvalidArgument("missing write callback"))?;
        let log = self
            .log
            .unwrap_or_else(|| Logger::root(slog::Discard, slog::o!()))
            .new(slog::o!("port" => self.port));
        debug!(log, "created transceiver handle"; "config" => ?self.config);
        Ok(Transceiver {
            port: self.port,
            read,
            write,
            config: self.config,
            log,
            state: Mutex::new(State::Created),
        })
    }
}

impl<'a> Transceiver<'a> {
    /// Start building a handle for the module in `port`.
    pub fn builder(port: u8) -> TransceiverBuilder<'a> {
        TransceiverBuilder::new(port)
    }

    /// Return the port index this handle was created for.
    pub fn port(&self) -> u8 {
        self.port
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Return the current lifecycle state.
    pub fn lifecycle(&self) -> Lifecycle {
        match &*self.state.lock() {
            State::Created => Lifecycle::Created,
            State::Initialized(binding) => Lifecycle::Initialized(binding.decoder.interface()),
            State::Destroyed => Lifecycle::Destroyed,
        }
    }

    fn bus(&self) -> Bus<'a> {
        Bus::new(self.read, self.write)
            .with_addresses(self.config.id_address, self.config.diagnostics_address)
            .with_max_transfer(self.config.max_transfer)
    }

    /// Probe the module, and bind it to the decoder for its management
    /// interface.
    ///
    /// On failure, the handle remains in the created state and may be
    /// initialized again.
    pub fn initialize(&self) -> Result<ManagementInterface, Error> {
        let mut state = self.state.lock();
        match *state {
            State::Created => {}
            State::Initialized(_) => return Err(Error::AlreadyInitialized),
            State::Destroyed => return Err(Error::Destroyed),
        }
        let binding = self.bind().inspect_err(|e| {
            warn!(self.log, "failed to initialize transceiver"; "reason" => %e);
        })?;
        let interface = binding.decoder.interface();
        *state = State::Initialized(binding);
        debug!(self.log, "initialized transceiver"; "interface" => %interface);
        Ok(interface)
    }

    fn bind(&self) -> Result<Binding, Error> {
        let bus = self.bus();
        let mut byte = [0u8; 1];
        MemoryRegion::new(Device::Id, 0, byte.len())
            .and_then(|region| bus.read(region, &mut byte))
            .map_err(|e| Error::ProbeFailed(ProbeFailure::Bus(e)))?;
        let identifier = Identifier::from(byte[0]);
        if identifier.is_blank() {
            return Err(Error::ProbeFailed(ProbeFailure::Blank(byte[0])));
        }
        let decoder = tcv_decode::decoder_for(identifier)
            .map_err(|_| Error::UnsupportedDevice(identifier))?;
        trace!(
            self.log,
            "probed module";
            "identifier" => %identifier,
            "interface" => %decoder.interface(),
        );

        let eeprom = decoder.load(&bus)?;
        if self.config.verify_checksums {
            let module = Module::new(&eeprom, bus);
            let stored = decoder.base_checksum(&module)?;
            let computed = decoder.calculate_base_checksum(&module)?;
            if stored != computed {
                return Err(Error::Decode(DecodeError::ChecksumMismatch {
                    stored,
                    computed,
                }));
            }
        }
        Ok(Binding { decoder, eeprom })
    }

    /// Tear down the handle, releasing the data read from the module.
    ///
    /// Every later operation on the handle fails with [`Error::Destroyed`],
    /// including a second call to this method.
    pub fn destroy(&self) -> Result<(), Error> {
        let mut state = self.state.lock();
        if matches!(*state, State::Destroyed) {
            return Err(Error::Destroyed);
        }
        *state = State::Destroyed;
        debug!(self.log, "destroyed transceiver");
        Ok(())
    }

    /// Return the management interface of the bound decoder.
    pub fn interface(&self) -> Result<ManagementInterface, Error> {
        match self.lifecycle() {
            Lifecycle::Initialized(interface) => Ok(interface),
            Lifecycle::Created => Err(Error::NotInitialized),
            Lifecycle::Destroyed => Err(Error::Destroyed),
        }
    }

    // Run `f` against the bound decoder, with the handle locked.
    fn dispatch<T, F>(&self, op: Operation, f: F) -> Result<T, Error>
    where
        F: FnOnce(&dyn Decoder, &Module<'_>) -> Result<T, DecodeError>,
    {
        let state = self.state.lock();
        let binding = match &*state {
            State::Initialized(binding) => binding,
            State::Created => return Err(Error::NotInitialized),
            State::Destroyed => return Err(Error::Destroyed),
        };
        trace!(self.log, "dispatching operation"; "op" => %op);
        let module = Module::new(&binding.eeprom, self.bus());
        f(binding.decoder, &module).map_err(|e| {
            if let DecodeError::Bus(bus) = e {
                if bus.is_transaction_failure() {
                    warn!(self.log, "bus access failed"; "op" => %op, "reason" => %bus);
                }
            }
            Error::from(e)
        })
    }

    operations! {
        /// The SFF-8024 identifier read when the module was bound.
        identifier => Identifier -> Identifier;
        ext_identifier => ExtIdentifier -> u8;
        connector => Connector -> Connector;
        vendor_name => VendorName -> String;
        vendor_oui => VendorOui -> Oui;
        vendor_revision => VendorRevision -> String;
        vendor_part_number => VendorPartNumber -> String;
        vendor_serial_number => VendorSerialNumber -> String;
        vendor_date_code => VendorDateCode -> DateCode;
        vendor_rom_size => VendorRomSize -> usize;
        user_writable_eeprom_size => UserWritableEepromSize -> usize;
        ten_gig_ethernet_compliance => TenGigEthernetCompliance -> TenGigEthernetCompliance;
        infiniband_compliance => InfinibandCompliance -> InfinibandCompliance;
        escon_compliance => EsconCompliance -> EsconCompliance;
        sonet_compliance => SonetCompliance -> SonetCompliance;
        ethernet_compliance => EthernetCompliance -> EthernetCompliance;
        fibre_channel_link_length => FibreChannelLinkLength -> FibreChannelLinkLength;
        fibre_channel_technology => FibreChannelTechnology -> FibreChannelTechnology;
        cable_technology => CableTechnology -> CableTechnology;
        fibre_channel_media => FibreChannelMedia -> FibreChannelMedia;
        fibre_channel_speed => FibreChannelSpeed -> FibreChannelSpeed;
        encoding => Encoding -> Encoding;
        /// Nominal signalling rate, in MBd.
        nominal_bit_rate => NominalBitRate -> u32;
        rate_identifier => RateIdentifier -> RateIdentifier;
        /// Supported single-mode fiber length, in meters.
        single_mode_length => SingleModeLength -> u32;
        /// Maximum signalling rate, in MBd.
        max_bit_rate => MaxBitRate -> u32;
        /// Minimum signalling rate, in MBd.
        min_bit_rate => MinBitRate -> u32;
        diagnostic_type => DiagnosticType -> DiagnosticType;
        enhanced_options => EnhancedOptions -> EnhancedOptions;
        extended_checksum => ExtendedChecksum -> u8;
        calculate_extended_checksum => CalculateExtendedChecksum -> u8;
        /// Supported OM1 fiber length, in meters.
        om1_length => Om1Length -> u32;
        /// Supported OM2 fiber length, in meters.
        om2_length => Om2Length -> u32;
        /// Supported OM3 fiber length, in meters.
        om3_length => Om3Length -> u32;
        /// Supported OM4 fiber or copper cable length, in meters.
        om4_copper_length => Om4CopperLength -> u32;
        /// Nominal laser wavelength, in nm.
        wavelength => Wavelength -> f32;
        passive_cable_compliance => PassiveCableCompliance -> PassiveCableCompliance;
        active_cable_compliance => ActiveCableCompliance -> ActiveCableCompliance;
        base_checksum => BaseChecksum -> u8;
        calculate_base_checksum => CalculateBaseChecksum -> u8;
        implemented_options => ImplementedOptions -> ImplementedOptions;
        /// Received optical power, in mW.
        rx_power => RxPower -> f32;
        /// Transmitted optical power, in mW.
        tx_power => TxPower -> f32;
        /// Laser bias current, in mA.
        tx_bias_current => TxBiasCurrent -> f32;
        /// Module temperature, in degrees C.
        temperature => Temperature -> f32;
        /// Supply voltage, in V.
        supply_voltage => SupplyVoltage -> f32;
        temperature_high_warning => TemperatureHighWarning -> f32;
        tx_power_high_warning => TxPowerHighWarning -> f32;
        rx_power_high_warning => RxPowerHighWarning -> f32;
    }

    /// Call `f` with the vendor ROM area.
    ///
    /// The handle stays locked while `f` runs, so `f` must not call back into
    /// it.
    pub fn with_vendor_rom<R>(&self, f: impl FnOnce(&[u8]) -> R) -> Result<R, Error> {
        self.dispatch(Operation::VendorRom, |d, m| d.vendor_rom(m).map(f))
    }

    /// Call `f` with the user-writable EEPROM, as read when the module was
    /// bound.
    ///
    /// See [`Transceiver::with_vendor_rom`] for the locking requirements.
    pub fn with_user_writable_eeprom<R>(&self, f: impl FnOnce(&[u8]) -> R) -> Result<R, Error> {
        self.dispatch(Operation::UserWritableEeprom, |d, m| {
            d.user_writable_eeprom(m).map(f)
        })
    }

    /// Call `f` with the SFF-8079 ROM area.
    ///
    /// See [`Transceiver::with_vendor_rom`] for the locking requirements.
    pub fn with_sff8079_rom<R>(&self, f: impl FnOnce(&[u8]) -> R) -> Result<R, Error> {
        self.dispatch(Operation::Sff8079Rom, |d, m| d.sff8079_rom(m).map(f))
    }

    /// Read directly from `offset` of the device at bus address `device`.
    pub fn raw_read(&self, device: u8, offset: u8, buf: &mut [u8]) -> Result<(), Error> {
        self.dispatch(Operation::RawRead, |d, m| d.raw_read(m, device, offset, buf))
    }

    /// Write directly to `offset` of the device at bus address `device`.
    ///
    /// The data read when the module was bound is not updated.
    pub fn raw_write(&self, device: u8, offset: u8, buf: &[u8]) -> Result<(), Error> {
        self.dispatch(Operation::RawWrite, |d, m| d.raw_write(m, device, offset, buf))
    }

    /// Return the identity and vendor information of the module.
    pub fn vendor_info(&self) -> Result<VendorInfo, Error> {
        self.dispatch(Operation::VendorName, |d, m| {
            Ok(VendorInfo {
                identifier: d.identifier(m)?,
                name: d.vendor_name(m)?,
                oui: d.vendor_oui(m)?,
                part: d.vendor_part_number(m)?,
                revision: d.vendor_revision(m)?,
                serial: d.vendor_serial_number(m)?,
                date: d.vendor_date_code(m).ok(),
            })
        })
    }

    /// Read every live monitor the module supports, under one lock.
    pub fn monitors(&self) -> Result<Monitors, Error> {
        self.dispatch(Operation::Temperature, |d, m| {
            Ok(Monitors {
                temperature: supported(d.temperature(m))?,
                supply_voltage: supported(d.supply_voltage(m))?,
                tx_bias_current: supported(d.tx_bias_current(m))?,
                tx_power: supported(d.tx_power(m))?,
                rx_power: supported(d.rx_power(m))?,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Lifecycle;
    use super::Transceiver;
    use crate::test_utils::test_logger;
    use crate::ConfigBuilder;
    use crate::Error;
    use crate::ProbeFailure;
    use std::sync::atomic::AtomicBool;
    use std::sync::atomic::Ordering;
    use std::time::Duration;
    use tcv_bus::mock::MockModule;
    use tcv_decode::fixtures;
    use tcv_decode::Identifier;
    use tcv_decode::ManagementInterface;
    use tcv_decode::Operation;

    fn handle(mock: &MockModule) -> Transceiver<'_> {
        Transceiver::builder(0)
            .read(mock)
            .write(mock)
            .log(test_logger())
            .build()
            .unwrap()
    }

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-3, "{a} != {b}");
    }

    #[test]
    fn test_create_requires_both_callbacks() {
        let mock = MockModule::new();
        assert!(matches!(
            Transceiver::builder(0).write(&mock).build(),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            Transceiver::builder(0).read(&mock).build(),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_create_does_no_bus_access() {
        let mock = fixtures::sfp();
        let xcvr = handle(&mock);
        assert_eq!(xcvr.port(), 0);
        assert_eq!(xcvr.lifecycle(), Lifecycle::Created);
        assert_eq!(mock.n_reads(), 0);
        assert_eq!(mock.n_writes(), 0);
    }

    #[test]
    fn test_query_before_initialize_fails() {
        let mock = fixtures::sfp();
        let xcvr = handle(&mock);
        assert_eq!(xcvr.identifier().unwrap_err(), Error::NotInitialized);
        assert_eq!(xcvr.temperature().unwrap_err(), Error::NotInitialized);
        assert_eq!(
            xcvr.with_vendor_rom(|rom| rom.len()).unwrap_err(),
            Error::NotInitialized
        );
        assert_eq!(xcvr.interface().unwrap_err(), Error::NotInitialized);
        assert_eq!(mock.n_reads(), 0);
    }

    #[test]
    fn test_initialize_binds_sff8472() {
        let mock = fixtures::sfp();
        let xcvr = handle(&mock);
        assert_eq!(xcvr.initialize().unwrap(), ManagementInterface::Sff8472);
        assert_eq!(
            xcvr.lifecycle(),
            Lifecycle::Initialized(ManagementInterface::Sff8472)
        );
        assert_eq!(xcvr.identifier().unwrap(), Identifier::Sfp);
        assert_eq!(xcvr.vendor_name().unwrap(), fixtures::SFP_VENDOR_NAME);
        assert_eq!(xcvr.nominal_bit_rate().unwrap(), 10_300);
        assert_close(xcvr.temperature().unwrap(), 25.5);
    }

    #[test]
    fn test_initialize_binds_inf8077() {
        let mock = fixtures::xfp();
        let xcvr = handle(&mock);
        assert_eq!(xcvr.initialize().unwrap(), ManagementInterface::Inf8077);
        assert_eq!(xcvr.identifier().unwrap(), Identifier::Xfp);
        assert_eq!(xcvr.vendor_name().unwrap(), fixtures::XFP_VENDOR_NAME);
        assert_eq!(
            xcvr.supply_voltage().unwrap_err(),
            Error::Unsupported(Operation::SupplyVoltage)
        );
        assert_eq!(
            xcvr.with_sff8079_rom(|rom| rom.len()).unwrap_err(),
            Error::Unsupported(Operation::Sff8079Rom)
        );
    }

    #[test]
    fn test_initialize_twice_fails_and_keeps_binding() {
        let mock = fixtures::sfp();
        let xcvr = handle(&mock);
        xcvr.initialize().unwrap();
        let reads = mock.n_reads();

        // Rebinding to a different module is not possible in place.
        mock.id_map_mut()[0] = 0x06;
        assert_eq!(xcvr.initialize().unwrap_err(), Error::AlreadyInitialized);
        assert_eq!(mock.n_reads(), reads);
        assert_eq!(xcvr.identifier().unwrap(), Identifier::Sfp);
        assert_eq!(xcvr.interface().unwrap(), ManagementInterface::Sff8472);
    }

    #[test]
    fn test_destroy() {
        let mock = fixtures::sfp();
        let xcvr = handle(&mock);
        xcvr.initialize().unwrap();
        xcvr.destroy().unwrap();
        assert_eq!(xcvr.lifecycle(), Lifecycle::Destroyed);

        let reads = mock.n_reads();
        assert_eq!(xcvr.identifier().unwrap_err(), Error::Destroyed);
        assert_eq!(xcvr.temperature().unwrap_err(), Error::Destroyed);
        assert_eq!(
            xcvr.with_user_writable_eeprom(|e| e.to_vec()).unwrap_err(),
            Error::Destroyed
        );
        assert_eq!(xcvr.initialize().unwrap_err(), Error::Destroyed);
        assert_eq!(xcvr.destroy().unwrap_err(), Error::Destroyed);
        assert_eq!(mock.n_reads(), reads);
    }

    #[test]
    fn test_destroy_before_initialize() {
        let mock = fixtures::sfp();
        let xcvr = handle(&mock);
        xcvr.destroy().unwrap();
        assert_eq!(xcvr.initialize().unwrap_err(), Error::Destroyed);
        assert_eq!(mock.n_reads(), 0);
    }

    #[test]
    fn test_unsupported_device_stays_created() {
        let mock = fixtures::sfp();
        mock.id_map_mut()[0] = 0x0d;
        let xcvr = handle(&mock);
        assert_eq!(
            xcvr.initialize().unwrap_err(),
            Error::UnsupportedDevice(Identifier::QsfpPlusSff8636)
        );
        assert_eq!(xcvr.lifecycle(), Lifecycle::Created);
        assert_eq!(xcvr.vendor_name().unwrap_err(), Error::NotInitialized);

        // The module was swapped for a supported one.
        mock.id_map_mut()[0] = 0x03;
        assert_eq!(xcvr.initialize().unwrap(), ManagementInterface::Sff8472);
    }

    #[test]
    fn test_blank_identifier_fails_probe() {
        for blank in [0x00, 0xff] {
            let mock = fixtures::sfp();
            mock.id_map_mut()[0] = blank;
            let xcvr = handle(&mock);
            assert_eq!(
                xcvr.initialize().unwrap_err(),
                Error::ProbeFailed(ProbeFailure::Blank(blank))
            );
            assert_eq!(xcvr.lifecycle(), Lifecycle::Created);
        }
    }

    #[test]
    fn test_probe_bus_failure() {
        let mock = fixtures::sfp();
        let xcvr = handle(&mock);
        let nack = tcv_bus::Error::Nack { device: 0x50 };
        mock.fail_reads_after(0, nack);
        assert_eq!(
            xcvr.initialize().unwrap_err(),
            Error::ProbeFailed(ProbeFailure::Bus(nack))
        );
        assert_eq!(xcvr.lifecycle(), Lifecycle::Created);

        mock.clear_faults();
        xcvr.initialize().unwrap();
    }

    #[test]
    fn test_load_bus_failure() {
        let mock = fixtures::sfp();
        let xcvr = handle(&mock);
        // The probe succeeds, the bulk read does not.
        mock.fail_reads_after(1, tcv_bus::Error::Timeout);
        assert_eq!(
            xcvr.initialize().unwrap_err(),
            Error::Bus(tcv_bus::Error::Timeout)
        );
        assert_eq!(xcvr.lifecycle(), Lifecycle::Created);
    }

    #[test]
    fn test_verify_checksums() {
        let mock = fixtures::sfp();
        mock.id_map_mut()[30] ^= 0x01;

        // Not verified by default.
        let xcvr = handle(&mock);
        xcvr.initialize().unwrap();
        assert_ne!(
            xcvr.base_checksum().unwrap(),
            xcvr.calculate_base_checksum().unwrap()
        );

        let config = ConfigBuilder::new().verify_checksums(true).build().unwrap();
        let xcvr = Transceiver::builder(1)
            .read(&mock)
            .write(&mock)
            .config(config)
            .log(test_logger())
            .build()
            .unwrap();
        assert!(matches!(
            xcvr.initialize().unwrap_err(),
            Error::Decode(tcv_decode::Error::ChecksumMismatch { .. })
        ));
        assert_eq!(xcvr.lifecycle(), Lifecycle::Created);

        mock.id_map_mut()[30] ^= 0x01;
        xcvr.initialize().unwrap();
    }

    #[test]
    fn test_failed_query_keeps_state() {
        let mock = fixtures::sfp();
        let xcvr = handle(&mock);
        xcvr.initialize().unwrap();
        mock.fail_reads_after(0, tcv_bus::Error::ArbitrationLost);
        assert_eq!(
            xcvr.rx_power().unwrap_err(),
            Error::Bus(tcv_bus::Error::ArbitrationLost)
        );
        assert_eq!(
            xcvr.lifecycle(),
            Lifecycle::Initialized(ManagementInterface::Sff8472)
        );
        // Queries of the loaded data need no bus access.
        assert_eq!(xcvr.identifier().unwrap(), Identifier::Sfp);

        mock.clear_faults();
        assert_close(xcvr.rx_power().unwrap(), 0.4);
    }

    #[test]
    fn test_scoped_rom_access() {
        let mock = fixtures::sfp();
        let xcvr = handle(&mock);
        xcvr.initialize().unwrap();
        assert_eq!(xcvr.with_vendor_rom(|rom| rom.to_vec()).unwrap(), [0x5a; 32]);
        assert_eq!(xcvr.vendor_rom_size().unwrap(), 32);
        assert!(xcvr
            .with_user_writable_eeprom(|e| e.iter().all(|b| *b == 0xee))
            .unwrap());
        assert_eq!(xcvr.user_writable_eeprom_size().unwrap(), 120);
        assert_eq!(xcvr.with_sff8079_rom(|rom| rom[5]).unwrap(), 5);
    }

    #[test]
    fn test_raw_access() {
        let mock = fixtures::sfp();
        let xcvr = handle(&mock);
        xcvr.initialize().unwrap();

        let mut buf = [0u8; 3];
        xcvr.raw_read(0x50, 0, &mut buf).unwrap();
        assert_eq!(buf, [0x03, 0x04, 0x07]);

        xcvr.raw_write(0x51, 200, &[9, 8, 7]).unwrap();
        xcvr.raw_read(0x51, 200, &mut buf).unwrap();
        assert_eq!(buf, [9, 8, 7]);

        assert_eq!(
            xcvr.raw_read(0x52, 0, &mut buf).unwrap_err(),
            Error::Bus(tcv_bus::Error::InvalidDevice(0x52))
        );
        assert!(matches!(
            xcvr.raw_write(0x50, 254, &buf).unwrap_err(),
            Error::Bus(tcv_bus::Error::InvalidMemoryAccess { .. })
        ));
    }

    #[test]
    fn test_configured_addresses_and_transfer_size() {
        let mock = fixtures::sfp().with_addresses(0x10, 0x11);
        let config = ConfigBuilder::new()
            .id_address(0x10)
            .diagnostics_address(0x11)
            .max_transfer(16)
            .build()
            .unwrap();
        let xcvr = Transceiver::builder(3)
            .read(&mock)
            .write(&mock)
            .config(config)
            .build()
            .unwrap();
        xcvr.initialize().unwrap();
        // One probe read, then both maps in 16-byte chunks.
        assert_eq!(mock.n_reads(), 1 + 16 + 16);
        assert_close(xcvr.supply_voltage().unwrap(), 3.3);

        let mut buf = [0u8; 1];
        xcvr.raw_read(0x11, 128, &mut buf).unwrap();
        assert_eq!(buf, [0xee]);
        assert_eq!(
            xcvr.raw_read(0x50, 0, &mut buf).unwrap_err(),
            Error::Bus(tcv_bus::Error::InvalidDevice(0x50))
        );
    }

    #[test]
    fn test_vendor_info_and_monitors() {
        let mock = fixtures::sfp();
        let xcvr = handle(&mock);
        xcvr.initialize().unwrap();
        let info = xcvr.vendor_info().unwrap();
        assert_eq!(info.identifier, Identifier::Sfp);
        assert_eq!(info.part, fixtures::SFP_PART_NUMBER);
        assert_eq!(info.serial, fixtures::SFP_SERIAL_NUMBER);
        assert!(info.date.is_some());
        let monitors = xcvr.monitors().unwrap();
        assert_close(monitors.temperature.unwrap(), 25.5);
        assert_close(monitors.tx_bias_current.unwrap(), 8.0);

        let mock = fixtures::xfp();
        let xcvr = handle(&mock);
        xcvr.initialize().unwrap();
        let monitors = xcvr.monitors().unwrap();
        assert!(monitors.supply_voltage.is_none());
        assert_close(monitors.temperature.unwrap(), 32.0);
        assert_close(monitors.rx_power.unwrap(), 0.2);
    }

    #[test]
    fn test_concurrent_queries_are_serialized() {
        let mock = fixtures::sfp().with_latency(Duration::from_millis(1));
        let xcvr = handle(&mock);
        xcvr.initialize().unwrap();
        let expected_name = xcvr.vendor_name().unwrap();

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..10 {
                        assert_close(xcvr.temperature().unwrap(), 25.5);
                        assert_eq!(xcvr.vendor_name().unwrap(), expected_name);
                        let mut buf = [0u8; 2];
                        xcvr.raw_read(0x50, 0, &mut buf).unwrap();
                        assert_eq!(buf, [0x03, 0x04]);
                    }
                });
            }
        });
        assert_eq!(mock.n_overlaps(), 0);
    }

    #[test]
    fn test_concurrent_initialize_binds_once() {
        let mock = fixtures::sfp().with_latency(Duration::from_millis(1));
        let xcvr = handle(&mock);
        let results: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4).map(|_| s.spawn(|| xcvr.initialize())).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| *e == Error::AlreadyInitialized));
        assert_eq!(mock.n_overlaps(), 0);
    }

    #[test]
    fn test_destroy_races_with_queries() {
        let mock = fixtures::sfp().with_latency(Duration::from_micros(200));
        let xcvr = handle(&mock);
        xcvr.initialize().unwrap();
        let started = AtomicBool::new(false);

        std::thread::scope(|s| {
            let readers: Vec<_> = (0..4)
                .map(|_| {
                    s.spawn(|| loop {
                        started.store(true, Ordering::SeqCst);
                        match xcvr.temperature() {
                            Ok(t) => assert_close(t, 25.5),
                            Err(Error::Destroyed) => break,
                            Err(e) => panic!("unexpected error: {e}"),
                        }
                    })
                })
                .collect();
            while !started.load(Ordering::SeqCst) {
                std::hint::spin_loop();
            }
            xcvr.destroy().unwrap();
            for reader in readers {
                reader.join().unwrap();
            }
        });
        assert_eq!(xcvr.lifecycle(), Lifecycle::Destroyed);
        assert_eq!(mock.n_overlaps(), 0);
    }

    #[test]
    fn test_handles_on_different_ports_are_independent() {
        let sfp = fixtures::sfp().with_latency(Duration::from_micros(500));
        let xfp = fixtures::xfp().with_latency(Duration::from_micros(500));
        let a = Transceiver::builder(0).read(&sfp).write(&sfp).build().unwrap();
        let b = Transceiver::builder(1).read(&xfp).write(&xfp).build().unwrap();

        std::thread::scope(|s| {
            s.spawn(|| {
                assert_eq!(a.initialize().unwrap(), ManagementInterface::Sff8472);
                for _ in 0..20 {
                    assert_eq!(a.vendor_name().unwrap(), fixtures::SFP_VENDOR_NAME);
                    assert_close(a.tx_power().unwrap(), 0.5);
                }
            });
            s.spawn(|| {
                assert_eq!(b.initialize().unwrap(), ManagementInterface::Inf8077);
                for _ in 0..20 {
                    assert_eq!(b.vendor_name().unwrap(), fixtures::XFP_VENDOR_NAME);
                    assert_close(b.tx_power().unwrap(), 0.5);
                }
            });
        });
        assert_eq!(sfp.n_overlaps(), 0);
        assert_eq!(xfp.n_overlaps(), 0);

        a.destroy().unwrap();
        assert_eq!(b.vendor_name().unwrap(), fixtures::XFP_VENDOR_NAME);
    }
}
