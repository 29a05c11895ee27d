// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! Decoding for XFP modules, which conform to INF-8077i.
//!
//! XFP modules expose a single device. The lower 128 bytes hold monitoring
//! data and thresholds, and the upper 128 bytes are paged: table 01h holds
//! the serial ID data and table 02h the user EEPROM.

use crate::codes::Connector;
use crate::codes::TenGigEthernetCompliance;
use crate::decoder::Decoder;
use crate::decoder::Module;
use crate::ident::DateCode;
use crate::ident::Identifier;
use crate::ident::ManagementInterface;
use crate::ident::Oui;
use crate::monitors::Quantity;
use crate::options::DiagnosticType;
use crate::utils::ascii_to_string;
use crate::utils::checksum;
use crate::utils::word;
use crate::Error;
use std::ops::Range;
use tcv_bus::mgmt::inf8077::Table;
use tcv_bus::mgmt::inf8077::TABLE_SELECT;
use tcv_bus::mgmt::Device;
use tcv_bus::mgmt::MemoryRegion;
use tcv_bus::Bus;

const PAGE_SIZE: usize = 128;

// Lower memory map, INF-8077i rev 4.5 Table 28.
const IDENTIFIER: usize = 0;
const TEMPERATURE_HIGH_WARNING: usize = 6;
const TX_POWER_HIGH_WARNING: usize = 30;
const RX_POWER_HIGH_WARNING: usize = 38;
const TEMPERATURE: u8 = 96;
const TX_BIAS: u8 = 100;
const TX_POWER: u8 = 102;
const RX_POWER: u8 = 104;

// Serial ID table 01h, INF-8077i rev 4.5 Table 47. Offsets are relative to
// the start of the upper page, byte 128.
const EXT_IDENTIFIER: usize = 1;
const CONNECTOR: usize = 2;
const TEN_GIG_ETHERNET: usize = 3;
const BR_MIN: usize = 12;
const BR_MAX: usize = 13;
const LENGTH_SMF_KM: usize = 14;
const LENGTH_E50: usize = 15;
const LENGTH_50: usize = 16;
const LENGTH_62_5: usize = 17;
const LENGTH_COPPER: usize = 18;
const VENDOR_NAME: Range<usize> = 20..36;
const VENDOR_OUI: Range<usize> = 37..40;
const VENDOR_PN: Range<usize> = 40..56;
const VENDOR_REV: Range<usize> = 56..58;
const WAVELENGTH: usize = 58;
const CC_BASE: usize = 63;
const VENDOR_SN: Range<usize> = 68..84;
const DATE_CODE: Range<usize> = 84..92;
const DIAGNOSTIC_TYPE: usize = 92;
const CC_EXT: usize = 95;
const CC_EXT_START: usize = 64;
const VENDOR_ROM: Range<usize> = 96..128;

static_assertions::const_assert!(VENDOR_ROM.end == PAGE_SIZE);
static_assertions::const_assert!(DATE_CODE.end - DATE_CODE.start == DateCode::SIZE);

// Wavelength is in units of 0.05 nm.
const WAVELENGTH_RESOLUTION: f32 = 0.05;

/// The decoder-private copy of an XFP module's memory maps.
#[derive(Clone, Debug, PartialEq)]
pub struct Eeprom {
    lower: [u8; PAGE_SIZE],
    serial_id: [u8; PAGE_SIZE],
    user: [u8; PAGE_SIZE],
}

impl Eeprom {
    /// The lower memory map.
    pub fn lower(&self) -> &[u8; PAGE_SIZE] {
        &self.lower
    }

    /// Upper table 01h.
    pub fn serial_id(&self) -> &[u8; PAGE_SIZE] {
        &self.serial_id
    }
}

/// The INF-8077i operation table.
#[derive(Clone, Copy, Debug, Default)]
pub struct Inf8077;

fn eeprom<'m>(module: &Module<'m>) -> &'m Eeprom {
    match module.eeprom() {
        crate::Eeprom::Inf8077(e) => e,
        other => unreachable!("INF-8077i decoder bound to {} data", other.interface()),
    }
}

fn select_table(bus: &Bus<'_>, table: Table) -> Result<(), Error> {
    let region = MemoryRegion::new(Device::Id, TABLE_SELECT, 1)?;
    bus.write(region, &[table.table()])?;
    Ok(())
}

fn read_table(bus: &Bus<'_>, table: Table) -> Result<[u8; PAGE_SIZE], Error> {
    select_table(bus, table)?;
    let mut page = [0u8; PAGE_SIZE];
    // The upper half starts at 128, which fits in a byte.
    let start = PAGE_SIZE as u8;
    bus.read(MemoryRegion::new(Device::Id, start, PAGE_SIZE)?, &mut page)?;
    Ok(page)
}

fn live(module: &Module<'_>, quantity: Quantity, offset: u8) -> Result<f32, Error> {
    let raw = module.bus().read_word(Device::Id, offset)?;
    Ok(quantity.decode(raw))
}

// Raw access covers the single device, with whatever table is selected.
fn raw_region(bus: &Bus<'_>, device: u8, offset: u8, len: usize) -> Result<MemoryRegion, Error> {
    match bus.device(device)? {
        Device::Id => Ok(MemoryRegion::new(Device::Id, offset, len)?),
        Device::Diagnostics => Err(tcv_bus::Error::InvalidDevice(device).into()),
    }
}

impl Decoder for Inf8077 {
    fn interface(&self) -> ManagementInterface {
        ManagementInterface::Inf8077
    }

    fn load(&self, bus: &Bus<'_>) -> Result<crate::Eeprom, Error> {
        let mut lower = [0u8; PAGE_SIZE];
        bus.read(MemoryRegion::new(Device::Id, 0, PAGE_SIZE)?, &mut lower)?;
        let serial_id = read_table(bus, Table::SERIAL_ID)?;
        let user = read_table(bus, Table::USER_EEPROM);
        // Leave the serial ID table selected, even if reading the user
        // EEPROM failed.
        let restored = select_table(bus, Table::SERIAL_ID);
        let user = user?;
        restored?;
        Ok(crate::Eeprom::Inf8077(Eeprom {
            lower,
            serial_id,
            user,
        }))
    }

    fn identifier(&self, module: &Module<'_>) -> Result<Identifier, Error> {
        Ok(Identifier::from(eeprom(module).lower[IDENTIFIER]))
    }

    fn ext_identifier(&self, module: &Module<'_>) -> Result<u8, Error> {
        Ok(eeprom(module).serial_id[EXT_IDENTIFIER])
    }

    fn connector(&self, module: &Module<'_>) -> Result<Connector, Error> {
        Ok(Connector::from(eeprom(module).serial_id[CONNECTOR]))
    }

    fn vendor_name(&self, module: &Module<'_>) -> Result<String, Error> {
        ascii_to_string(&eeprom(module).serial_id[VENDOR_NAME])
    }

    fn vendor_oui(&self, module: &Module<'_>) -> Result<Oui, Error> {
        let oui = &eeprom(module).serial_id[VENDOR_OUI];
        Ok(Oui([oui[0], oui[1], oui[2]]))
    }

    fn vendor_revision(&self, module: &Module<'_>) -> Result<String, Error> {
        ascii_to_string(&eeprom(module).serial_id[VENDOR_REV])
    }

    fn vendor_part_number(&self, module: &Module<'_>) -> Result<String, Error> {
        ascii_to_string(&eeprom(module).serial_id[VENDOR_PN])
    }

    fn vendor_serial_number(&self, module: &Module<'_>) -> Result<String, Error> {
        ascii_to_string(&eeprom(module).serial_id[VENDOR_SN])
    }

    fn vendor_date_code(&self, module: &Module<'_>) -> Result<DateCode, Error> {
        DateCode::try_from(&eeprom(module).serial_id[DATE_CODE])
    }

    fn vendor_rom<'m>(&self, module: &Module<'m>) -> Result<&'m [u8], Error> {
        Ok(&eeprom(module).serial_id[VENDOR_ROM])
    }

    fn user_writable_eeprom<'m>(&self, module: &Module<'m>) -> Result<&'m [u8], Error> {
        Ok(&eeprom(module).user[..])
    }

    fn ten_gig_ethernet_compliance(
        &self,
        module: &Module<'_>,
    ) -> Result<TenGigEthernetCompliance, Error> {
        const MAP: [(u8, TenGigEthernetCompliance); 7] = [
            (7, TenGigEthernetCompliance::BASE_SR),
            (6, TenGigEthernetCompliance::BASE_LR),
            (5, TenGigEthernetCompliance::BASE_ER),
            (4, TenGigEthernetCompliance::BASE_LRM),
            (3, TenGigEthernetCompliance::BASE_SW),
            (2, TenGigEthernetCompliance::BASE_LW),
            (1, TenGigEthernetCompliance::BASE_EW),
        ];
        let byte = eeprom(module).serial_id[TEN_GIG_ETHERNET];
        Ok(MAP
            .iter()
            .filter(|(bit, _)| byte & (1u8 << *bit) != 0)
            .fold(TenGigEthernetCompliance::empty(), |acc, (_, flag)| {
                acc | *flag
            }))
    }

    fn single_mode_length(&self, module: &Module<'_>) -> Result<u32, Error> {
        Ok(u32::from(eeprom(module).serial_id[LENGTH_SMF_KM]) * 1000)
    }

    fn max_bit_rate(&self, module: &Module<'_>) -> Result<u32, Error> {
        Ok(u32::from(eeprom(module).serial_id[BR_MAX]) * 100)
    }

    fn min_bit_rate(&self, module: &Module<'_>) -> Result<u32, Error> {
        Ok(u32::from(eeprom(module).serial_id[BR_MIN]) * 100)
    }

    fn diagnostic_type(&self, module: &Module<'_>) -> Result<DiagnosticType, Error> {
        Ok(DiagnosticType::from_bits_retain(
            eeprom(module).serial_id[DIAGNOSTIC_TYPE],
        ))
    }

    fn extended_checksum(&self, module: &Module<'_>) -> Result<u8, Error> {
        Ok(eeprom(module).serial_id[CC_EXT])
    }

    fn calculate_extended_checksum(&self, module: &Module<'_>) -> Result<u8, Error> {
        Ok(checksum(&eeprom(module).serial_id[CC_EXT_START..CC_EXT]))
    }

    fn om1_length(&self, module: &Module<'_>) -> Result<u32, Error> {
        Ok(u32::from(eeprom(module).serial_id[LENGTH_62_5]))
    }

    fn om2_length(&self, module: &Module<'_>) -> Result<u32, Error> {
        Ok(u32::from(eeprom(module).serial_id[LENGTH_50]))
    }

    fn om3_length(&self, module: &Module<'_>) -> Result<u32, Error> {
        Ok(u32::from(eeprom(module).serial_id[LENGTH_E50]) * 2)
    }

    fn om4_copper_length(&self, module: &Module<'_>) -> Result<u32, Error> {
        Ok(u32::from(eeprom(module).serial_id[LENGTH_COPPER]))
    }

    fn wavelength(&self, module: &Module<'_>) -> Result<f32, Error> {
        let raw = u16::from_be_bytes(word(&eeprom(module).serial_id, WAVELENGTH));
        Ok(f32::from(raw) * WAVELENGTH_RESOLUTION)
    }

    fn base_checksum(&self, module: &Module<'_>) -> Result<u8, Error> {
        Ok(eeprom(module).serial_id[CC_BASE])
    }

    fn calculate_base_checksum(&self, module: &Module<'_>) -> Result<u8, Error> {
        Ok(checksum(&eeprom(module).serial_id[..CC_BASE]))
    }

    fn raw_read(
        &self,
        module: &Module<'_>,
        device: u8,
        offset: u8,
        buf: &mut [u8],
    ) -> Result<(), Error> {
        let region = raw_region(module.bus(), device, offset, buf.len())?;
        module.bus().read(region, buf).map_err(Error::from)
    }

    fn raw_write(
        &self,
        module: &Module<'_>,
        device: u8,
        offset: u8,
        buf: &[u8],
    ) -> Result<(), Error> {
        let region = raw_region(module.bus(), device, offset, buf.len())?;
        module.bus().write(region, buf).map_err(Error::from)
    }

    fn rx_power(&self, module: &Module<'_>) -> Result<f32, Error> {
        live(module, Quantity::RxPower, RX_POWER)
    }

    fn tx_power(&self, module: &Module<'_>) -> Result<f32, Error> {
        live(module, Quantity::TxPower, TX_POWER)
    }

    fn tx_bias_current(&self, module: &Module<'_>) -> Result<f32, Error> {
        live(module, Quantity::TxBiasCurrent, TX_BIAS)
    }

    fn temperature(&self, module: &Module<'_>) -> Result<f32, Error> {
        live(module, Quantity::Temperature, TEMPERATURE)
    }

    fn temperature_high_warning(&self, module: &Module<'_>) -> Result<f32, Error> {
        let raw = word(&eeprom(module).lower, TEMPERATURE_HIGH_WARNING);
        Ok(Quantity::Temperature.decode(raw))
    }

    fn tx_power_high_warning(&self, module: &Module<'_>) -> Result<f32, Error> {
        let raw = word(&eeprom(module).lower, TX_POWER_HIGH_WARNING);
        Ok(Quantity::TxPower.decode(raw))
    }

    fn rx_power_high_warning(&self, module: &Module<'_>) -> Result<f32, Error> {
        let raw = word(&eeprom(module).lower, RX_POWER_HIGH_WARNING);
        Ok(Quantity::RxPower.decode(raw))
    }
}
