// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! The common operation set shared by every management interface.
//!
//! A [`Decoder`] is the table of operations for one management interface.
//! Each method has a default body that fails with
//! [`Error::Unsupported`], so an interface implements only the operations
//! that are meaningful for it and every other slot still answers.

use crate::codes::CableTechnology;
use crate::codes::Connector;
use crate::codes::Encoding;
use crate::codes::EsconCompliance;
use crate::codes::EthernetCompliance;
use crate::codes::FibreChannelLinkLength;
use crate::codes::FibreChannelMedia;
use crate::codes::FibreChannelSpeed;
use crate::codes::FibreChannelTechnology;
use crate::codes::InfinibandCompliance;
use crate::codes::RateIdentifier;
use crate::codes::SonetCompliance;
use crate::codes::TenGigEthernetCompliance;
use crate::ident::DateCode;
use crate::ident::Identifier;
use crate::ident::ManagementInterface;
use crate::ident::Oui;
use crate::options::ActiveCableCompliance;
use crate::options::DiagnosticType;
use crate::options::EnhancedOptions;
use crate::options::ImplementedOptions;
use crate::options::PassiveCableCompliance;
use crate::Eeprom;
use crate::Error;
use tcv_bus::Bus;

/// An operation in the common operation set.
///
/// The variants are listed in the common table order, which is also the
/// order of the methods on [`Decoder`].
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    strum::Display,
    strum::EnumCount,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum Operation {
    Identifier,
    ExtIdentifier,
    Connector,
    VendorName,
    VendorOui,
    VendorRevision,
    VendorPartNumber,
    VendorSerialNumber,
    VendorDateCode,
    VendorRom,
    VendorRomSize,
    UserWritableEeprom,
    UserWritableEepromSize,
    TenGigEthernetCompliance,
    InfinibandCompliance,
    EsconCompliance,
    SonetCompliance,
    EthernetCompliance,
    FibreChannelLinkLength,
    FibreChannelTechnology,
    CableTechnology,
    FibreChannelMedia,
    FibreChannelSpeed,
    Encoding,
    NominalBitRate,
    RateIdentifier,
    SingleModeLength,
    MaxBitRate,
    MinBitRate,
    DiagnosticType,
    EnhancedOptions,
    ExtendedChecksum,
    CalculateExtendedChecksum,
    Om1Length,
    Om2Length,
    Om3Length,
    Om4CopperLength,
    Wavelength,
    PassiveCableCompliance,
    ActiveCableCompliance,
    BaseChecksum,
    CalculateBaseChecksum,
    ImplementedOptions,
    Sff8079Rom,
    RawRead,
    RawWrite,
    RxPower,
    TxPower,
    TxBiasCurrent,
    Temperature,
    SupplyVoltage,
    TemperatureHighWarning,
    TxPowerHighWarning,
    RxPowerHighWarning,
}

/// The view of a bound module that an operation works against: the
/// decoder-private copy of its memory maps, and its bus.
#[derive(Clone, Copy, Debug)]
pub struct Module<'m> {
    eeprom: &'m Eeprom,
    bus: Bus<'m>,
}

impl<'m> Module<'m> {
    pub fn new(eeprom: &'m Eeprom, bus: Bus<'m>) -> Self {
        Self { eeprom, bus }
    }

    /// The data read from the module when it was bound.
    pub fn eeprom(&self) -> &'m Eeprom {
        self.eeprom
    }

    /// The bus for any live accesses.
    pub fn bus(&self) -> &Bus<'m> {
        &self.bus
    }
}

fn unsupported<T>(op: Operation) -> Result<T, Error> {
    Err(Error::Unsupported(op))
}

/// The table of operations for one management interface.
///
/// Implementations are stateless singletons shared by every module of their
/// kind. All state lives in the [`Eeprom`] returned from [`Decoder::load`],
/// which is handed back in through the [`Module`] of every call. Lengths are
/// in meters, bit rates in MBd, and monitored values in the units of
/// [`crate::monitors::Quantity`].
pub trait Decoder: core::fmt::Debug + Send + Sync {
    /// The management interface this decoder implements.
    fn interface(&self) -> ManagementInterface;

    /// Perform the initial bulk read of a module's memory maps.
    fn load(&self, bus: &Bus<'_>) -> Result<Eeprom, Error>;

    fn identifier(&self, _module: &Module<'_>) -> Result<Identifier, Error> {
        unsupported(Operation::Identifier)
    }

    fn ext_identifier(&self, _module: &Module<'_>) -> Result<u8, Error> {
        unsupported(Operation::ExtIdentifier)
    }

    fn connector(&self, _module: &Module<'_>) -> Result<Connector, Error> {
        unsupported(Operation::Connector)
    }

    fn vendor_name(&self, _module: &Module<'_>) -> Result<String, Error> {
        unsupported(Operation::VendorName)
    }

    fn vendor_oui(&self, _module: &Module<'_>) -> Result<Oui, Error> {
        unsupported(Operation::VendorOui)
    }

    fn vendor_revision(&self, _module: &Module<'_>) -> Result<String, Error> {
        unsupported(Operation::VendorRevision)
    }

    fn vendor_part_number(&self, _module: &Module<'_>) -> Result<String, Error> {
        unsupported(Operation::VendorPartNumber)
    }

    fn vendor_serial_number(&self, _module: &Module<'_>) -> Result<String, Error> {
        unsupported(Operation::VendorSerialNumber)
    }

    fn vendor_date_code(&self, _module: &Module<'_>) -> Result<DateCode, Error> {
        unsupported(Operation::VendorDateCode)
    }

    /// The vendor-specific ROM area, borrowed from the loaded maps.
    fn vendor_rom<'m>(&self, _module: &Module<'m>) -> Result<&'m [u8], Error> {
        unsupported(Operation::VendorRom)
    }

    fn vendor_rom_size(&self, module: &Module<'_>) -> Result<usize, Error> {
        match self.vendor_rom(module) {
            Ok(rom) => Ok(rom.len()),
            Err(Error::Unsupported(_)) => unsupported(Operation::VendorRomSize),
            Err(e) => Err(e),
        }
    }

    /// The user-writable EEPROM area, as it was when the module was bound.
    fn user_writable_eeprom<'m>(&self, _module: &Module<'m>) -> Result<&'m [u8], Error> {
        unsupported(Operation::UserWritableEeprom)
    }

    fn user_writable_eeprom_size(&self, module: &Module<'_>) -> Result<usize, Error> {
        match self.user_writable_eeprom(module) {
            Ok(rom) => Ok(rom.len()),
            Err(Error::Unsupported(_)) => unsupported(Operation::UserWritableEepromSize),
            Err(e) => Err(e),
        }
    }

    fn ten_gig_ethernet_compliance(
        &self,
        _module: &Module<'_>,
    ) -> Result<TenGigEthernetCompliance, Error> {
        unsupported(Operation::TenGigEthernetCompliance)
    }

    fn infiniband_compliance(&self, _module: &Module<'_>) -> Result<InfinibandCompliance, Error> {
        unsupported(Operation::InfinibandCompliance)
    }

    fn escon_compliance(&self, _module: &Module<'_>) -> Result<EsconCompliance, Error> {
        unsupported(Operation::EsconCompliance)
    }

    fn sonet_compliance(&self, _module: &Module<'_>) -> Result<SonetCompliance, Error> {
        unsupported(Operation::SonetCompliance)
    }

    fn ethernet_compliance(&self, _module: &Module<'_>) -> Result<EthernetCompliance, Error> {
        unsupported(Operation::EthernetCompliance)
    }

    fn fibre_channel_link_length(
        &self,
        _module: &Module<'_>,
    ) -> Result<FibreChannelLinkLength, Error> {
        unsupported(Operation::FibreChannelLinkLength)
    }

    fn fibre_channel_technology(
        &self,
        _module: &Module<'_>,
    ) -> Result<FibreChannelTechnology, Error> {
        unsupported(Operation::FibreChannelTechnology)
    }

    fn cable_technology(&self, _module: &Module<'_>) -> Result<CableTechnology, Error> {
        unsupported(Operation::CableTechnology)
    }

    fn fibre_channel_media(&self, _module: &Module<'_>) -> Result<FibreChannelMedia, Error> {
        unsupported(Operation::FibreChannelMedia)
    }

    fn fibre_channel_speed(&self, _module: &Module<'_>) -> Result<FibreChannelSpeed, Error> {
        unsupported(Operation::FibreChannelSpeed)
    }

    fn encoding(&self, _module: &Module<'_>) -> Result<Encoding, Error> {
        unsupported(Operation::Encoding)
    }

    fn nominal_bit_rate(&self, _module: &Module<'_>) -> Result<u32, Error> {
        unsupported(Operation::NominalBitRate)
    }

    fn rate_identifier(&self, _module: &Module<'_>) -> Result<RateIdentifier, Error> {
        unsupported(Operation::RateIdentifier)
    }

    fn single_mode_length(&self, _module: &Module<'_>) -> Result<u32, Error> {
        unsupported(Operation::SingleModeLength)
    }

    fn max_bit_rate(&self, _module: &Module<'_>) -> Result<u32, Error> {
        unsupported(Operation::MaxBitRate)
    }

    fn min_bit_rate(&self, _module: &Module<'_>) -> Result<u32, Error> {
        unsupported(Operation::MinBitRate)
    }

    fn diagnostic_type(&self, _module: &Module<'_>) -> Result<DiagnosticType, Error> {
        unsupported(Operation::DiagnosticType)
    }

    fn enhanced_options(&self, _module: &Module<'_>) -> Result<EnhancedOptions, Error> {
        unsupported(Operation::EnhancedOptions)
    }

    /// The stored extended check code.
    fn extended_checksum(&self, _module: &Module<'_>) -> Result<u8, Error> {
        unsupported(Operation::ExtendedChecksum)
    }

    /// The extended check code recomputed over the loaded maps.
    fn calculate_extended_checksum(&self, _module: &Module<'_>) -> Result<u8, Error> {
        unsupported(Operation::CalculateExtendedChecksum)
    }

    fn om1_length(&self, _module: &Module<'_>) -> Result<u32, Error> {
        unsupported(Operation::Om1Length)
    }

    fn om2_length(&self, _module: &Module<'_>) -> Result<u32, Error> {
        unsupported(Operation::Om2Length)
    }

    fn om3_length(&self, _module: &Module<'_>) -> Result<u32, Error> {
        unsupported(Operation::Om3Length)
    }

    fn om4_copper_length(&self, _module: &Module<'_>) -> Result<u32, Error> {
        unsupported(Operation::Om4CopperLength)
    }

    /// The nominal laser wavelength, in nm.
    fn wavelength(&self, _module: &Module<'_>) -> Result<f32, Error> {
        unsupported(Operation::Wavelength)
    }

    fn passive_cable_compliance(
        &self,
        _module: &Module<'_>,
    ) -> Result<PassiveCableCompliance, Error> {
        unsupported(Operation::PassiveCableCompliance)
    }

    fn active_cable_compliance(
        &self,
        _module: &Module<'_>,
    ) -> Result<ActiveCableCompliance, Error> {
        unsupported(Operation::ActiveCableCompliance)
    }

    /// The stored base check code.
    fn base_checksum(&self, _module: &Module<'_>) -> Result<u8, Error> {
        unsupported(Operation::BaseChecksum)
    }

    /// The base check code recomputed over the loaded maps.
    fn calculate_base_checksum(&self, _module: &Module<'_>) -> Result<u8, Error> {
        unsupported(Operation::CalculateBaseChecksum)
    }

    fn implemented_options(&self, _module: &Module<'_>) -> Result<ImplementedOptions, Error> {
        unsupported(Operation::ImplementedOptions)
    }

    /// The SFF-8079 ROM area, borrowed from the loaded maps.
    fn sff8079_rom<'m>(&self, _module: &Module<'m>) -> Result<&'m [u8], Error> {
        unsupported(Operation::Sff8079Rom)
    }

    /// Read directly from the module, bypassing the loaded maps.
    ///
    /// `device` is a 7-bit bus address, and the access must lie within the
    /// address space the interface defines for it.
    fn raw_read(
        &self,
        _module: &Module<'_>,
        _device: u8,
        _offset: u8,
        _buf: &mut [u8],
    ) -> Result<(), Error> {
        unsupported(Operation::RawRead)
    }

    /// Write directly to the module. The loaded maps are not updated.
    fn raw_write(
        &self,
        _module: &Module<'_>,
        _device: u8,
        _offset: u8,
        _buf: &[u8],
    ) -> Result<(), Error> {
        unsupported(Operation::RawWrite)
    }

    fn rx_power(&self, _module: &Module<'_>) -> Result<f32, Error> {
        unsupported(Operation::RxPower)
    }

    fn tx_power(&self, _module: &Module<'_>) -> Result<f32, Error> {
        unsupported(Operation::TxPower)
    }

    fn tx_bias_current(&self, _module: &Module<'_>) -> Result<f32, Error> {
        unsupported(Operation::TxBiasCurrent)
    }

    fn temperature(&self, _module: &Module<'_>) -> Result<f32, Error> {
        unsupported(Operation::Temperature)
    }

    fn supply_voltage(&self, _module: &Module<'_>) -> Result<f32, Error> {
        unsupported(Operation::SupplyVoltage)
    }

    fn temperature_high_warning(&self, _module: &Module<'_>) -> Result<f32, Error> {
        unsupported(Operation::TemperatureHighWarning)
    }

    fn tx_power_high_warning(&self, _module: &Module<'_>) -> Result<f32, Error> {
        unsupported(Operation::TxPowerHighWarning)
    }

    fn rx_power_high_warning(&self, _module: &Module<'_>) -> Result<f32, Error> {
        unsupported(Operation::RxPowerHighWarning)
    }
}

static_assertions::assert_obj_safe!(Decoder);

#[cfg(test)]
mod tests {
    use super::Operation;
    use strum::EnumCount;
    use strum::IntoEnumIterator;

    #[test]
    fn test_operations_are_in_table_order() {
        assert_eq!(Operation::COUNT, 54);
        for (i, op) in Operation::iter().enumerate() {
            assert_eq!(op as usize, i);
        }
        assert_eq!(Operation::iter().next(), Some(Operation::Identifier));
        assert_eq!(Operation::iter().last(), Some(Operation::RxPowerHighWarning));
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::VendorName.to_string(), "vendor_name");
        assert_eq!(
            <&'static str>::from(Operation::TenGigEthernetCompliance),
            "ten_gig_ethernet_compliance"
        );
    }
}
