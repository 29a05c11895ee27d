// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! Decoding for SFP, SFP+ and SFP28 modules, which conform to SFF-8472.
//!
//! The serial ID map lives at `0xA0`. When digital diagnostics are
//! implemented, the monitoring map lives at `0xA2`. Both are read in full
//! when the module is bound; only live monitor readings go back to the bus.

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
use crate::decoder::Decoder;
use crate::decoder::Module;
use crate::decoder::Operation;
use crate::ident::DateCode;
use crate::ident::Identifier;
use crate::ident::ManagementInterface;
use crate::ident::Oui;
use crate::monitors::Calibration;
use crate::monitors::Quantity;
use crate::options::ActiveCableCompliance;
use crate::options::DiagnosticType;
use crate::options::EnhancedOptions;
use crate::options::ImplementedOptions;
use crate::options::PassiveCableCompliance;
use crate::utils::ascii_to_string;
use crate::utils::checksum;
use crate::utils::extract_bit;
use crate::utils::word;
use crate::Error;
use std::ops::Range;
use tcv_bus::mgmt::Device;
use tcv_bus::mgmt::MemoryRegion;
use tcv_bus::Bus;
use tcv_bus::MAP_SIZE;

// Serial ID map, SFF-8472 rev 12.4 Table 4-1.
const IDENTIFIER: usize = 0;
const EXT_IDENTIFIER: usize = 1;
const CONNECTOR: usize = 2;
const TRANSCEIVER_CODES: usize = 3;
const ENCODING: usize = 11;
const NOMINAL_BIT_RATE: usize = 12;
const RATE_IDENTIFIER: usize = 13;
const LENGTH_SMF_KM: usize = 14;
const LENGTH_SMF: usize = 15;
const LENGTH_OM2: usize = 16;
const LENGTH_OM1: usize = 17;
const LENGTH_OM4_COPPER: usize = 18;
const LENGTH_OM3: usize = 19;
const VENDOR_NAME: Range<usize> = 20..36;
const VENDOR_OUI: Range<usize> = 37..40;
const VENDOR_PN: Range<usize> = 40..56;
const VENDOR_REV: Range<usize> = 56..60;
const WAVELENGTH: usize = 60;
const CC_BASE: usize = 63;
const OPTIONS: usize = 64;
const BR_MAX: usize = 66;
const BR_MIN: usize = 67;
const VENDOR_SN: Range<usize> = 68..84;
const DATE_CODE: Range<usize> = 84..92;
const DIAGNOSTIC_TYPE: usize = 92;
const ENHANCED_OPTIONS: usize = 93;
const CC_EXT: usize = 95;
const VENDOR_ROM: Range<usize> = 96..128;
const SFF8079_ROM: Range<usize> = 128..256;

// Diagnostics map, SFF-8472 rev 12.4 Table 9-5.
const TEMPERATURE_HIGH_WARNING: usize = 4;
const TX_POWER_HIGH_WARNING: usize = 28;
const RX_POWER_HIGH_WARNING: usize = 36;
const TEMPERATURE: u8 = 96;
const SUPPLY_VOLTAGE: u8 = 98;
const TX_BIAS: u8 = 100;
const TX_POWER: u8 = 102;
const RX_POWER: u8 = 104;
const USER_EEPROM: Range<usize> = 128..248;

static_assertions::const_assert!(SFF8079_ROM.end == MAP_SIZE);
static_assertions::const_assert!(USER_EEPROM.end <= MAP_SIZE);
static_assertions::const_assert!(DATE_CODE.end - DATE_CODE.start == DateCode::SIZE);

// Byte 12 is saturated, and the rate is in byte 66 instead.
const BIT_RATE_EXTENDED: u8 = 0xff;

/// The decoder-private copy of an SFF-8472 module's memory maps.
#[derive(Clone, Debug, PartialEq)]
pub struct Eeprom {
    a0: [u8; MAP_SIZE],
    a2: Option<[u8; MAP_SIZE]>,
    calibration: Option<Calibration>,
}

impl Eeprom {
    /// The serial ID map.
    pub fn id_map(&self) -> &[u8; MAP_SIZE] {
        &self.a0
    }

    /// The diagnostics map, if the module implements digital diagnostics.
    pub fn diagnostics_map(&self) -> Option<&[u8; MAP_SIZE]> {
        self.a2.as_ref()
    }

    fn diagnostic_type(&self) -> DiagnosticType {
        DiagnosticType::from_bits_retain(self.a0[DIAGNOSTIC_TYPE])
    }

    fn cable(&self) -> CableTechnology {
        CableTechnology::from_bits_truncate(self.a0[TRANSCEIVER_CODES + 5])
    }

    // Nominal and extended rates are in different units.
    fn nominal_bit_rate(&self) -> u32 {
        match self.a0[NOMINAL_BIT_RATE] {
            BIT_RATE_EXTENDED => u32::from(self.a0[BR_MAX]) * 250,
            rate => u32::from(rate) * 100,
        }
    }

    // Percentages above and below nominal.
    fn bit_rate_margins(&self) -> (u32, u32) {
        match self.a0[NOMINAL_BIT_RATE] {
            BIT_RATE_EXTENDED => (u32::from(self.a0[BR_MIN]), u32::from(self.a0[BR_MIN])),
            _ => (u32::from(self.a0[BR_MAX]), u32::from(self.a0[BR_MIN])),
        }
    }
}

/// The SFF-8472 operation table.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sff8472;

fn eeprom<'m>(module: &Module<'m>) -> &'m Eeprom {
    match module.eeprom() {
        crate::Eeprom::Sff8472(e) => e,
        other => unreachable!("SFF-8472 decoder bound to {} data", other.interface()),
    }
}

// The diagnostics map, for operations which need it.
fn a2<'m>(module: &Module<'m>, op: Operation) -> Result<&'m [u8; MAP_SIZE], Error> {
    eeprom(module).a2.as_ref().ok_or(Error::Unsupported(op))
}

// Decode a reading, applying any external calibration.
fn monitor(e: &Eeprom, quantity: Quantity, raw: [u8; 2]) -> f32 {
    match &e.calibration {
        Some(cal) => cal.decode(quantity, raw),
        None => quantity.decode(raw),
    }
}

fn live(module: &Module<'_>, op: Operation, quantity: Quantity, offset: u8) -> Result<f32, Error> {
    a2(module, op)?;
    let raw = module.bus().read_word(Device::Diagnostics, offset)?;
    Ok(monitor(eeprom(module), quantity, raw))
}

fn threshold(
    module: &Module<'_>,
    op: Operation,
    quantity: Quantity,
    offset: usize,
) -> Result<f32, Error> {
    let map = a2(module, op)?;
    Ok(monitor(eeprom(module), quantity, word(map, offset)))
}

impl Decoder for Sff8472 {
    fn interface(&self) -> ManagementInterface {
        ManagementInterface::Sff8472
    }

    fn load(&self, bus: &Bus<'_>) -> Result<crate::Eeprom, Error> {
        let mut a0 = [0u8; MAP_SIZE];
        bus.read(MemoryRegion::new(Device::Id, 0, MAP_SIZE)?, &mut a0)?;
        let diag = DiagnosticType::from_bits_retain(a0[DIAGNOSTIC_TYPE]);
        let a2 = if diag.contains(DiagnosticType::DDM_IMPLEMENTED) {
            let mut a2 = [0u8; MAP_SIZE];
            bus.read(MemoryRegion::new(Device::Diagnostics, 0, MAP_SIZE)?, &mut a2)?;
            Some(a2)
        } else {
            None
        };
        let calibration = match &a2 {
            Some(map) if diag.contains(DiagnosticType::EXTERNALLY_CALIBRATED) => {
                Some(Calibration::parse(map))
            }
            _ => None,
        };
        Ok(crate::Eeprom::Sff8472(Eeprom {
            a0,
            a2,
            calibration,
        }))
    }

    fn identifier(&self, module: &Module<'_>) -> Result<Identifier, Error> {
        Ok(Identifier::from(eeprom(module).a0[IDENTIFIER]))
    }

    fn ext_identifier(&self, module: &Module<'_>) -> Result<u8, Error> {
        Ok(eeprom(module).a0[EXT_IDENTIFIER])
    }

    fn connector(&self, module: &Module<'_>) -> Result<Connector, Error> {
        Ok(Connector::from(eeprom(module).a0[CONNECTOR]))
    }

    fn vendor_name(&self, module: &Module<'_>) -> Result<String, Error> {
        ascii_to_string(&eeprom(module).a0[VENDOR_NAME])
    }

    fn vendor_oui(&self, module: &Module<'_>) -> Result<Oui, Error> {
        let a0 = &eeprom(module).a0;
        Ok(Oui([
            a0[VENDOR_OUI.start],
            a0[VENDOR_OUI.start + 1],
            a0[VENDOR_OUI.start + 2],
        ]))
    }

    fn vendor_revision(&self, module: &Module<'_>) -> Result<String, Error> {
        ascii_to_string(&eeprom(module).a0[VENDOR_REV])
    }

    fn vendor_part_number(&self, module: &Module<'_>) -> Result<String, Error> {
        ascii_to_string(&eeprom(module).a0[VENDOR_PN])
    }

    fn vendor_serial_number(&self, module: &Module<'_>) -> Result<String, Error> {
        ascii_to_string(&eeprom(module).a0[VENDOR_SN])
    }

    fn vendor_date_code(&self, module: &Module<'_>) -> Result<DateCode, Error> {
        DateCode::try_from(&eeprom(module).a0[DATE_CODE])
    }

    fn vendor_rom<'m>(&self, module: &Module<'m>) -> Result<&'m [u8], Error> {
        Ok(&eeprom(module).a0[VENDOR_ROM])
    }

    fn user_writable_eeprom<'m>(&self, module: &Module<'m>) -> Result<&'m [u8], Error> {
        Ok(&a2(module, Operation::UserWritableEeprom)?[USER_EEPROM])
    }

    fn user_writable_eeprom_size(&self, module: &Module<'_>) -> Result<usize, Error> {
        a2(module, Operation::UserWritableEepromSize)?;
        Ok(USER_EEPROM.len())
    }

    fn ten_gig_ethernet_compliance(
        &self,
        module: &Module<'_>,
    ) -> Result<TenGigEthernetCompliance, Error> {
        // The low nibble holds the Infiniband codes.
        let byte = eeprom(module).a0[TRANSCEIVER_CODES] & 0xf0;
        Ok(TenGigEthernetCompliance::from_bits_truncate(byte))
    }

    fn infiniband_compliance(&self, module: &Module<'_>) -> Result<InfinibandCompliance, Error> {
        Ok(InfinibandCompliance::from_bits_truncate(
            eeprom(module).a0[TRANSCEIVER_CODES],
        ))
    }

    fn escon_compliance(&self, module: &Module<'_>) -> Result<EsconCompliance, Error> {
        Ok(EsconCompliance::from_bits_truncate(
            eeprom(module).a0[TRANSCEIVER_CODES + 1],
        ))
    }

    fn sonet_compliance(&self, module: &Module<'_>) -> Result<SonetCompliance, Error> {
        let a0 = &eeprom(module).a0;
        let bits = u16::from_be_bytes([a0[TRANSCEIVER_CODES + 1] & 0x3f, a0[TRANSCEIVER_CODES + 2]]);
        Ok(SonetCompliance::from_bits_truncate(bits))
    }

    fn ethernet_compliance(&self, module: &Module<'_>) -> Result<EthernetCompliance, Error> {
        Ok(EthernetCompliance::from_bits_truncate(
            eeprom(module).a0[TRANSCEIVER_CODES + 3],
        ))
    }

    fn fibre_channel_link_length(
        &self,
        module: &Module<'_>,
    ) -> Result<FibreChannelLinkLength, Error> {
        Ok(FibreChannelLinkLength::from_bits_truncate(
            eeprom(module).a0[TRANSCEIVER_CODES + 4],
        ))
    }

    fn fibre_channel_technology(
        &self,
        module: &Module<'_>,
    ) -> Result<FibreChannelTechnology, Error> {
        let a0 = &eeprom(module).a0;
        Ok(FibreChannelTechnology::from_bytes(
            a0[TRANSCEIVER_CODES + 4],
            a0[TRANSCEIVER_CODES + 5],
        ))
    }

    fn cable_technology(&self, module: &Module<'_>) -> Result<CableTechnology, Error> {
        Ok(eeprom(module).cable())
    }

    fn fibre_channel_media(&self, module: &Module<'_>) -> Result<FibreChannelMedia, Error> {
        Ok(FibreChannelMedia::from_bits_truncate(
            eeprom(module).a0[TRANSCEIVER_CODES + 6],
        ))
    }

    fn fibre_channel_speed(&self, module: &Module<'_>) -> Result<FibreChannelSpeed, Error> {
        Ok(FibreChannelSpeed::from_bits_truncate(
            eeprom(module).a0[TRANSCEIVER_CODES + 7],
        ))
    }

    fn encoding(&self, module: &Module<'_>) -> Result<Encoding, Error> {
        Ok(Encoding::from(eeprom(module).a0[ENCODING]))
    }

    fn nominal_bit_rate(&self, module: &Module<'_>) -> Result<u32, Error> {
        Ok(eeprom(module).nominal_bit_rate())
    }

    fn rate_identifier(&self, module: &Module<'_>) -> Result<RateIdentifier, Error> {
        Ok(RateIdentifier::from(eeprom(module).a0[RATE_IDENTIFIER]))
    }

    fn single_mode_length(&self, module: &Module<'_>) -> Result<u32, Error> {
        let a0 = &eeprom(module).a0;
        // Kilometer units when the link is long enough to need them.
        Ok(match a0[LENGTH_SMF_KM] {
            0 => u32::from(a0[LENGTH_SMF]) * 100,
            km => u32::from(km) * 1000,
        })
    }

    fn max_bit_rate(&self, module: &Module<'_>) -> Result<u32, Error> {
        let e = eeprom(module);
        let (above, _) = e.bit_rate_margins();
        Ok(e.nominal_bit_rate() * (100 + above) / 100)
    }

    fn min_bit_rate(&self, module: &Module<'_>) -> Result<u32, Error> {
        let e = eeprom(module);
        let (_, below) = e.bit_rate_margins();
        Ok(e.nominal_bit_rate() * 100u32.saturating_sub(below) / 100)
    }

    fn diagnostic_type(&self, module: &Module<'_>) -> Result<DiagnosticType, Error> {
        Ok(eeprom(module).diagnostic_type())
    }

    fn enhanced_options(&self, module: &Module<'_>) -> Result<EnhancedOptions, Error> {
        Ok(EnhancedOptions::from_bits_truncate(
            eeprom(module).a0[ENHANCED_OPTIONS],
        ))
    }

    fn extended_checksum(&self, module: &Module<'_>) -> Result<u8, Error> {
        Ok(eeprom(module).a0[CC_EXT])
    }

    fn calculate_extended_checksum(&self, module: &Module<'_>) -> Result<u8, Error> {
        Ok(checksum(&eeprom(module).a0[OPTIONS..CC_EXT]))
    }

    fn om1_length(&self, module: &Module<'_>) -> Result<u32, Error> {
        Ok(u32::from(eeprom(module).a0[LENGTH_OM1]) * 10)
    }

    fn om2_length(&self, module: &Module<'_>) -> Result<u32, Error> {
        Ok(u32::from(eeprom(module).a0[LENGTH_OM2]) * 10)
    }

    fn om3_length(&self, module: &Module<'_>) -> Result<u32, Error> {
        Ok(u32::from(eeprom(module).a0[LENGTH_OM3]) * 10)
    }

    fn om4_copper_length(&self, module: &Module<'_>) -> Result<u32, Error> {
        let e = eeprom(module);
        let length = u32::from(e.a0[LENGTH_OM4_COPPER]);
        // Cable assemblies report meters, optical modules 10 m units.
        if e.cable().is_empty() {
            Ok(length * 10)
        } else {
            Ok(length)
        }
    }

    fn wavelength(&self, module: &Module<'_>) -> Result<f32, Error> {
        let e = eeprom(module);
        if !e.cable().is_empty() {
            return Err(Error::Unsupported(Operation::Wavelength));
        }
        Ok(f32::from(u16::from_be_bytes(word(&e.a0, WAVELENGTH))))
    }

    fn passive_cable_compliance(
        &self,
        module: &Module<'_>,
    ) -> Result<PassiveCableCompliance, Error> {
        let e = eeprom(module);
        if !extract_bit(e.a0[TRANSCEIVER_CODES + 5], 2)? {
            return Err(Error::Unsupported(Operation::PassiveCableCompliance));
        }
        Ok(PassiveCableCompliance::from_bits_truncate(e.a0[WAVELENGTH]))
    }

    fn active_cable_compliance(
        &self,
        module: &Module<'_>,
    ) -> Result<ActiveCableCompliance, Error> {
        let e = eeprom(module);
        if !extract_bit(e.a0[TRANSCEIVER_CODES + 5], 3)? {
            return Err(Error::Unsupported(Operation::ActiveCableCompliance));
        }
        Ok(ActiveCableCompliance::from_bits_truncate(e.a0[WAVELENGTH]))
    }

    fn base_checksum(&self, module: &Module<'_>) -> Result<u8, Error> {
        Ok(eeprom(module).a0[CC_BASE])
    }

    fn calculate_base_checksum(&self, module: &Module<'_>) -> Result<u8, Error> {
        Ok(checksum(&eeprom(module).a0[..CC_BASE]))
    }

    fn implemented_options(&self, module: &Module<'_>) -> Result<ImplementedOptions, Error> {
        let bits = u16::from_be_bytes(word(&eeprom(module).a0, OPTIONS));
        Ok(ImplementedOptions::from_bits_truncate(bits))
    }

    fn sff8079_rom<'m>(&self, module: &Module<'m>) -> Result<&'m [u8], Error> {
        Ok(&eeprom(module).a0[SFF8079_ROM])
    }

    fn raw_read(
        &self,
        module: &Module<'_>,
        device: u8,
        offset: u8,
        buf: &mut [u8],
    ) -> Result<(), Error> {
        let bus = module.bus();
        let region = MemoryRegion::new(bus.device(device)?, offset, buf.len())?;
        bus.read(region, buf).map_err(Error::from)
    }

    fn raw_write(
        &self,
        module: &Module<'_>,
        device: u8,
        offset: u8,
        buf: &[u8],
    ) -> Result<(), Error> {
        let bus = module.bus();
        let region = MemoryRegion::new(bus.device(device)?, offset, buf.len())?;
        bus.write(region, buf).map_err(Error::from)
    }

    fn rx_power(&self, module: &Module<'_>) -> Result<f32, Error> {
        live(module, Operation::RxPower, Quantity::RxPower, RX_POWER)
    }

    fn tx_power(&self, module: &Module<'_>) -> Result<f32, Error> {
        live(module, Operation::TxPower, Quantity::TxPower, TX_POWER)
    }

    fn tx_bias_current(&self, module: &Module<'_>) -> Result<f32, Error> {
        live(
            module,
            Operation::TxBiasCurrent,
            Quantity::TxBiasCurrent,
            TX_BIAS,
        )
    }

    fn temperature(&self, module: &Module<'_>) -> Result<f32, Error> {
        live(
            module,
            Operation::Temperature,
            Quantity::Temperature,
            TEMPERATURE,
        )
    }

    fn supply_voltage(&self, module: &Module<'_>) -> Result<f32, Error> {
        live(
            module,
            Operation::SupplyVoltage,
            Quantity::SupplyVoltage,
            SUPPLY_VOLTAGE,
        )
    }

    fn temperature_high_warning(&self, module: &Module<'_>) -> Result<f32, Error> {
        threshold(
            module,
            Operation::TemperatureHighWarning,
            Quantity::Temperature,
            TEMPERATURE_HIGH_WARNING,
        )
    }

    fn tx_power_high_warning(&self, module: &Module<'_>) -> Result<f32, Error> {
        threshold(
            module,
            Operation::TxPowerHighWarning,
            Quantity::TxPower,
            TX_POWER_HIGH_WARNING,
        )
    }

    fn rx_power_high_warning(&self, module: &Module<'_>) -> Result<f32, Error> {
        threshold(
            module,
            Operation::RxPowerHighWarning,
            Quantity::RxPower,
            RX_POWER_HIGH_WARNING,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Sff8472;
    use crate::codes::CableTechnology;
    use crate::codes::Connector;
    use crate::codes::Encoding;
    use crate::codes::TenGigEthernetCompliance;
    use crate::decoder::Decoder;
    use crate::decoder::Module;
    use crate::decoder::Operation;
    use crate::fixtures;
    use crate::ident::Identifier;
    use crate::options::ActiveCableCompliance;
    use crate::options::DiagnosticType;
    use crate::options::ImplementedOptions;
    use crate::Eeprom;
    use crate::Error;
    use chrono::NaiveDate;
    use tcv_bus::mock::MockModule;
    use tcv_bus::Bus;
    use tcv_bus::ID_ADDRESS;

    fn load(mock: &MockModule) -> Eeprom {
        Sff8472.load(&Bus::new(mock, mock)).unwrap()
    }

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-3, "{a} != {b}");
    }

    #[test]
    fn test_identity_and_vendor_data() {
        let mock = fixtures::sfp();
        let eeprom = load(&mock);
        let module = Module::new(&eeprom, Bus::new(&mock, &mock));
        let d = Sff8472;

        assert_eq!(d.identifier(&module).unwrap(), Identifier::Sfp);
        assert_eq!(d.ext_identifier(&module).unwrap(), 0x04);
        assert_eq!(d.connector(&module).unwrap(), Connector::Lc);
        assert_eq!(d.vendor_name(&module).unwrap(), fixtures::SFP_VENDOR_NAME);
        assert_eq!(d.vendor_oui(&module).unwrap().to_string(), "00-90-65");
        assert_eq!(d.vendor_part_number(&module).unwrap(), fixtures::SFP_PART_NUMBER);
        assert_eq!(d.vendor_revision(&module).unwrap(), "A1");
        assert_eq!(d.vendor_serial_number(&module).unwrap(), fixtures::SFP_SERIAL_NUMBER);
        let date = d.vendor_date_code(&module).unwrap();
        assert_eq!(date.date, NaiveDate::from_ymd_opt(2023, 6, 15).unwrap());
        assert_eq!(date.lot.as_deref(), Some("01"));
    }

    #[test]
    fn test_codes_rates_and_lengths() {
        let mock = fixtures::sfp();
        let eeprom = load(&mock);
        let module = Module::new(&eeprom, Bus::new(&mock, &mock));
        let d = Sff8472;

        assert_eq!(
            d.ten_gig_ethernet_compliance(&module).unwrap(),
            TenGigEthernetCompliance::BASE_SR
        );
        assert!(d.infiniband_compliance(&module).unwrap().is_empty());
        assert!(d.cable_technology(&module).unwrap().is_empty());
        assert_eq!(d.encoding(&module).unwrap(), Encoding::B64B66);
        assert_eq!(d.nominal_bit_rate(&module).unwrap(), 10_300);
        assert_eq!(d.max_bit_rate(&module).unwrap(), 10_300);
        assert_eq!(d.min_bit_rate(&module).unwrap(), 10_300);
        assert_eq!(d.om1_length(&module).unwrap(), 30);
        assert_eq!(d.om2_length(&module).unwrap(), 80);
        assert_eq!(d.om3_length(&module).unwrap(), 300);
        assert_eq!(d.om4_copper_length(&module).unwrap(), 150);
        assert_eq!(d.single_mode_length(&module).unwrap(), 0);
        assert_eq!(d.wavelength(&module).unwrap(), 850.0);
        assert_eq!(
            d.passive_cable_compliance(&module).unwrap_err(),
            Error::Unsupported(Operation::PassiveCableCompliance)
        );
        let opts = d.implemented_options(&module).unwrap();
        assert!(opts.contains(ImplementedOptions::TX_DISABLE | ImplementedOptions::LOS));
        assert!(d
            .diagnostic_type(&module)
            .unwrap()
            .contains(DiagnosticType::DDM_IMPLEMENTED));
    }

    #[test]
    fn test_extended_bit_rate_and_long_reach() {
        let mock = fixtures::sfp();
        {
            let mut map = mock.id_map_mut();
            map[12] = 0xff;
            // 25.78 GBd, +/- 3%.
            map[66] = 103;
            map[67] = 3;
            map[14] = 40;
        }
        let eeprom = load(&mock);
        let module = Module::new(&eeprom, Bus::new(&mock, &mock));
        let d = Sff8472;
        assert_eq!(d.nominal_bit_rate(&module).unwrap(), 25_750);
        assert_eq!(d.max_bit_rate(&module).unwrap(), 26_522);
        assert_eq!(d.min_bit_rate(&module).unwrap(), 24_977);
        assert_eq!(d.single_mode_length(&module).unwrap(), 40_000);
    }

    #[test]
    fn test_active_cable_assembly() {
        let mock = fixtures::sfp();
        {
            let mut map = mock.id_map_mut();
            map[8] = 0b0000_1000;
            map[18] = 7;
            map[60] = 0b0000_0101;
            map[61] = 0;
        }
        let eeprom = load(&mock);
        let module = Module::new(&eeprom, Bus::new(&mock, &mock));
        let d = Sff8472;
        assert_eq!(d.cable_technology(&module).unwrap(), CableTechnology::ACTIVE);
        assert_eq!(d.om4_copper_length(&module).unwrap(), 7);
        assert_eq!(
            d.active_cable_compliance(&module).unwrap(),
            ActiveCableCompliance::SFF8431_LIMITING | ActiveCableCompliance::SFF8431_APPENDIX_E
        );
        assert_eq!(
            d.wavelength(&module).unwrap_err(),
            Error::Unsupported(Operation::Wavelength)
        );
    }

    #[test]
    fn test_checksums() {
        let mock = fixtures::sfp();
        let eeprom = load(&mock);
        let module = Module::new(&eeprom, Bus::new(&mock, &mock));
        let d = Sff8472;
        assert_eq!(
            d.base_checksum(&module).unwrap(),
            d.calculate_base_checksum(&module).unwrap()
        );
        assert_eq!(
            d.extended_checksum(&module).unwrap(),
            d.calculate_extended_checksum(&module).unwrap()
        );

        mock.id_map_mut()[30] ^= 0x01;
        let eeprom = load(&mock);
        let module = Module::new(&eeprom, Bus::new(&mock, &mock));
        assert_ne!(
            d.base_checksum(&module).unwrap(),
            d.calculate_base_checksum(&module).unwrap()
        );
    }

    #[test]
    fn test_roms() {
        let mock = fixtures::sfp();
        let eeprom = load(&mock);
        let module = Module::new(&eeprom, Bus::new(&mock, &mock));
        let d = Sff8472;
        assert_eq!(d.vendor_rom(&module).unwrap(), &[0x5a; 32][..]);
        assert_eq!(d.vendor_rom_size(&module).unwrap(), 32);
        let rom = d.sff8079_rom(&module).unwrap();
        assert_eq!(rom.len(), 128);
        assert_eq!(rom[1], 1);
        assert_eq!(d.user_writable_eeprom(&module).unwrap(), &[0xee; 120][..]);
        assert_eq!(d.user_writable_eeprom_size(&module).unwrap(), 120);
    }

    #[test]
    fn test_live_monitors() {
        let mock = fixtures::sfp();
        let eeprom = load(&mock);
        let module = Module::new(&eeprom, Bus::new(&mock, &mock));
        let d = Sff8472;

        let reads = mock.n_reads();
        assert_close(d.temperature(&module).unwrap(), 25.5);
        assert_close(d.supply_voltage(&module).unwrap(), 3.3);
        assert_close(d.tx_bias_current(&module).unwrap(), 8.0);
        assert_close(d.tx_power(&module).unwrap(), 0.5);
        assert_close(d.rx_power(&module).unwrap(), 0.4);
        assert_eq!(mock.n_reads(), reads + 5);

        // Readings are live.
        mock.diagnostics_map_mut()[96] = 0x20;
        assert_close(d.temperature(&module).unwrap(), 32.5);

        // Thresholds come from the loaded copy.
        assert_close(d.temperature_high_warning(&module).unwrap(), 75.0);
        assert_close(d.tx_power_high_warning(&module).unwrap(), 1.0);
        assert_close(d.rx_power_high_warning(&module).unwrap(), 1.5);
        assert_eq!(mock.n_reads(), reads + 6);
    }

    #[test]
    fn test_externally_calibrated_monitors() {
        let mock = fixtures::sfp();
        mock.id_map_mut()[92] = 0b0101_1000;
        {
            let mut map = mock.diagnostics_map_mut();
            // T slope 1.0, offset -2 C.
            map[84..86].copy_from_slice(&0x0100u16.to_be_bytes());
            map[86..88].copy_from_slice(&(-512i16).to_be_bytes());
        }
        let eeprom = load(&mock);
        let module = Module::new(&eeprom, Bus::new(&mock, &mock));
        assert_close(Sff8472.temperature(&module).unwrap(), 23.5);
        assert_close(Sff8472.temperature_high_warning(&module).unwrap(), 73.0);
    }

    #[test]
    fn test_no_diagnostics() {
        let mock = fixtures::sfp();
        mock.id_map_mut()[92] = 0;
        let eeprom = load(&mock);
        // Only the serial ID map was read.
        assert_eq!(mock.n_reads(), 2);
        let module = Module::new(&eeprom, Bus::new(&mock, &mock));
        let d = Sff8472;
        assert_eq!(
            d.rx_power(&module).unwrap_err(),
            Error::Unsupported(Operation::RxPower)
        );
        assert_eq!(
            d.user_writable_eeprom(&module).unwrap_err(),
            Error::Unsupported(Operation::UserWritableEeprom)
        );
        assert_eq!(
            d.user_writable_eeprom_size(&module).unwrap_err(),
            Error::Unsupported(Operation::UserWritableEepromSize)
        );
        assert_eq!(
            d.temperature_high_warning(&module).unwrap_err(),
            Error::Unsupported(Operation::TemperatureHighWarning)
        );
        assert_eq!(mock.n_reads(), 2);
    }

    #[test]
    fn test_raw_access() {
        let mock = fixtures::sfp();
        let eeprom = load(&mock);
        let module = Module::new(&eeprom, Bus::new(&mock, &mock));
        let d = Sff8472;

        let mut buf = [0u8; 2];
        d.raw_read(&module, ID_ADDRESS, 0, &mut buf).unwrap();
        assert_eq!(buf, [0x03, 0x04]);

        d.raw_write(&module, 0x51, 128, &[1, 2, 3]).unwrap();
        assert_eq!(&mock.diagnostics_map()[128..131], &[1, 2, 3]);

        assert_eq!(
            d.raw_read(&module, 0x33, 0, &mut buf).unwrap_err(),
            Error::Bus(tcv_bus::Error::InvalidDevice(0x33))
        );
        assert!(matches!(
            d.raw_read(&module, ID_ADDRESS, 255, &mut buf).unwrap_err(),
            Error::Bus(tcv_bus::Error::InvalidMemoryAccess { .. })
        ));
    }

    #[test]
    fn test_bus_failure_propagates() {
        let mock = fixtures::sfp();
        let eeprom = load(&mock);
        let module = Module::new(&eeprom, Bus::new(&mock, &mock));
        mock.fail_reads_after(0, tcv_bus::Error::Timeout);
        assert_eq!(
            Sff8472.temperature(&module).unwrap_err(),
            Error::Bus(tcv_bus::Error::Timeout)
        );
        // Loaded data is still available.
        assert_eq!(Sff8472.identifier(&module).unwrap(), Identifier::Sfp);
    }
}
