// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! Decode transceiver health and monitoring data.
//!
//! Both SFF-8472 and INF-8077i encode monitored values as 16-bit big-endian
//! words with the same resolutions. SFF-8472 modules may instead report raw
//! A/D counts which must be converted with calibration constants stored in
//! the diagnostics map.

use crate::utils::decode_with_scale;
use crate::utils::word;

/// Temperature resolution, in degrees C per LSB.
pub const TEMPERATURE_RESOLUTION: f32 = 1.0 / 256.0;

/// Supply voltage resolution, in Volts per LSB.
pub const SUPPLY_VOLTAGE_RESOLUTION: f32 = 100e-6;

/// Transmitter bias current resolution, in Amps per LSB.
pub const TX_BIAS_CURRENT_RESOLUTION: f32 = 2e-6;

/// Optical power resolution, in Watts per LSB.
pub const OPTICAL_POWER_RESOLUTION: f32 = 0.1e-6;

const WATT_TO_MW: f32 = 1000.0;
const AMP_TO_MA: f32 = 1000.0;

/// A monitored quantity.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Quantity {
    /// Module temperature, reported in degrees C.
    Temperature,
    /// Supply voltage, reported in Volts.
    SupplyVoltage,
    /// Laser bias current, reported in milliamps.
    TxBiasCurrent,
    /// Transmitted optical power, reported in milliwatts.
    TxPower,
    /// Received optical power, reported in milliwatts.
    RxPower,
}

impl Quantity {
    /// Decode an internally-calibrated reading.
    pub fn decode(self, raw: [u8; 2]) -> f32 {
        match self {
            Quantity::Temperature => decode_with_scale::<i16>(raw, TEMPERATURE_RESOLUTION),
            other => other.scale(f32::from(u16::from_be_bytes(raw))),
        }
    }

    // Scale a value in LSBs into reporting units.
    fn scale(self, lsbs: f32) -> f32 {
        match self {
            Quantity::Temperature => lsbs * TEMPERATURE_RESOLUTION,
            Quantity::SupplyVoltage => lsbs * SUPPLY_VOLTAGE_RESOLUTION,
            Quantity::TxBiasCurrent => lsbs * TX_BIAS_CURRENT_RESOLUTION * AMP_TO_MA,
            Quantity::TxPower | Quantity::RxPower => {
                lsbs * OPTICAL_POWER_RESOLUTION * WATT_TO_MW
            }
        }
    }
}

// A slope / offset pair, SFF-8472 section 9.3.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Linear {
    // Unsigned fixed-point, 8 integer and 8 fractional bits.
    slope: f32,
    // Signed, in LSBs of the result.
    offset: f32,
}

impl Linear {
    fn parse(map: &[u8], offset: usize) -> Self {
        Self {
            slope: decode_with_scale::<u16>(word(map, offset), 1.0 / 256.0),
            offset: f32::from(i16::from_be_bytes(word(map, offset + 2))),
        }
    }

    fn apply(&self, raw: f32) -> f32 {
        self.slope * raw + self.offset
    }
}

/// External calibration constants, SFF-8472 diagnostics bytes 56-91.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Calibration {
    // Coefficients of the received power polynomial, constant term first.
    rx_power: [f32; 5],
    tx_bias: Linear,
    tx_power: Linear,
    temperature: Linear,
    supply_voltage: Linear,
}

impl Calibration {
    const RX_POWER: usize = 56;
    const TX_BIAS: usize = 76;
    const TX_POWER: usize = 80;
    const TEMPERATURE: usize = 84;
    const SUPPLY_VOLTAGE: usize = 88;

    /// Parse the constants from a copy of the diagnostics map.
    pub fn parse(map: &[u8; 256]) -> Self {
        let mut rx_power = [0.0; 5];
        // Stored highest order first, Rx_PWR(4) down to Rx_PWR(0).
        for (i, coeff) in rx_power.iter_mut().rev().enumerate() {
            let start = Self::RX_POWER + 4 * i;
            let bytes = [map[start], map[start + 1], map[start + 2], map[start + 3]];
            *coeff = f32::from_be_bytes(bytes);
        }
        Self {
            rx_power,
            tx_bias: Linear::parse(map, Self::TX_BIAS),
            tx_power: Linear::parse(map, Self::TX_POWER),
            temperature: Linear::parse(map, Self::TEMPERATURE),
            supply_voltage: Linear::parse(map, Self::SUPPLY_VOLTAGE),
        }
    }

    /// Convert a raw A/D reading into reporting units.
    pub fn decode(&self, quantity: Quantity, raw: [u8; 2]) -> f32 {
        let lsbs = match quantity {
            Quantity::Temperature => {
                self.temperature.apply(f32::from(i16::from_be_bytes(raw)))
            }
            Quantity::SupplyVoltage => {
                self.supply_voltage.apply(f32::from(u16::from_be_bytes(raw)))
            }
            Quantity::TxBiasCurrent => self.tx_bias.apply(f32::from(u16::from_be_bytes(raw))),
            Quantity::TxPower => self.tx_power.apply(f32::from(u16::from_be_bytes(raw))),
            Quantity::RxPower => {
                let x = f32::from(u16::from_be_bytes(raw));
                // Horner's method, highest order coefficient first.
                self.rx_power.iter().rev().fold(0.0, |acc, c| acc * x + c)
            }
        };
        quantity.scale(lsbs)
    }
}

/// A snapshot of the live monitored values of a module.
///
/// Values the module does not monitor are `None`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(
    any(feature = "api-traits", test),
    derive(serde::Deserialize, serde::Serialize, schemars::JsonSchema)
)]
pub struct Monitors {
    /// Degrees C.
    #[cfg_attr(
        any(feature = "api-traits", test),
        serde(skip_serializing_if = "Option::is_none", default)
    )]
    pub temperature: Option<f32>,

    /// Volts.
    #[cfg_attr(
        any(feature = "api-traits", test),
        serde(skip_serializing_if = "Option::is_none", default)
    )]
    pub supply_voltage: Option<f32>,

    /// Milliamps.
    #[cfg_attr(
        any(feature = "api-traits", test),
        serde(skip_serializing_if = "Option::is_none", default)
    )]
    pub tx_bias_current: Option<f32>,

    /// Milliwatts.
    #[cfg_attr(
        any(feature = "api-traits", test),
        serde(skip_serializing_if = "Option::is_none", default)
    )]
    pub tx_power: Option<f32>,

    /// Milliwatts.
    #[cfg_attr(
        any(feature = "api-traits", test),
        serde(skip_serializing_if = "Option::is_none", default)
    )]
    pub rx_power: Option<f32>,
}
