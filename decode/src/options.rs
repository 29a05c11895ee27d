// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! Advertised module options and capabilities.

bitflags::bitflags! {
    /// The kind of digital diagnostics a module implements, SFF-8472 byte 92.
    ///
    /// XFP modules report INF-8077i byte 220 here, which shares the
    /// measurement-type bit.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    #[cfg_attr(
        any(feature = "api-traits", test),
        derive(serde::Deserialize, serde::Serialize)
    )]
    pub struct DiagnosticType: u8 {
        /// Digital diagnostic monitoring is implemented.
        const DDM_IMPLEMENTED = 1 << 6;
        /// Readings are calibrated by the module.
        const INTERNALLY_CALIBRATED = 1 << 5;
        /// Readings must be calibrated with the constants at A2h 56-91.
        const EXTERNALLY_CALIBRATED = 1 << 4;
        /// Received power is an average, rather than OMA.
        const AVERAGE_POWER = 1 << 3;
        /// The diagnostics device requires an address change sequence.
        const ADDRESS_CHANGE_REQUIRED = 1 << 2;
    }
}

bitflags::bitflags! {
    /// Optional features implemented through the diagnostics device,
    /// SFF-8472 byte 93.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    #[cfg_attr(
        any(feature = "api-traits", test),
        derive(serde::Deserialize, serde::Serialize)
    )]
    pub struct EnhancedOptions: u8 {
        const ALARM_WARNING_FLAGS = 1 << 7;
        const SOFT_TX_DISABLE = 1 << 6;
        const SOFT_TX_FAULT = 1 << 5;
        const SOFT_RX_LOS = 1 << 4;
        const SOFT_RATE_SELECT = 1 << 3;
        const APPLICATION_SELECT = 1 << 2;
        const SOFT_RATE_SELECT_SFF8431 = 1 << 1;
    }
}

bitflags::bitflags! {
    /// Implemented hardware signals and options, SFF-8472 bytes 64-65 read as
    /// a big-endian word.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    #[cfg_attr(
        any(feature = "api-traits", test),
        derive(serde::Deserialize, serde::Serialize)
    )]
    pub struct ImplementedOptions: u16 {
        const HIGH_POWER_LEVEL = 1 << 13;
        const PAGING = 1 << 12;
        const RETIMER = 1 << 11;
        const COOLED_LASER = 1 << 10;
        const POWER_LEVEL_2 = 1 << 9;
        const LINEAR_RECEIVER_OUTPUT = 1 << 8;
        const RECEIVER_DECISION_THRESHOLD = 1 << 7;
        const TUNABLE_TRANSMITTER = 1 << 6;
        const RATE_SELECT = 1 << 5;
        const TX_DISABLE = 1 << 4;
        const TX_FAULT = 1 << 3;
        const LOS_INVERTED = 1 << 2;
        const LOS = 1 << 1;
    }
}

bitflags::bitflags! {
    /// Passive cable specification compliance, SFF-8472 byte 60.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    #[cfg_attr(
        any(feature = "api-traits", test),
        derive(serde::Deserialize, serde::Serialize)
    )]
    pub struct PassiveCableCompliance: u8 {
        const FC_PI_4_APPENDIX_H = 1 << 1;
        const SFF8431_APPENDIX_E = 1 << 0;
    }
}

bitflags::bitflags! {
    /// Active cable specification compliance, SFF-8472 byte 60.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    #[cfg_attr(
        any(feature = "api-traits", test),
        derive(serde::Deserialize, serde::Serialize)
    )]
    pub struct ActiveCableCompliance: u8 {
        const FC_PI_4_LIMITING = 1 << 3;
        const SFF8431_LIMITING = 1 << 2;
        const FC_PI_4_APPENDIX_H = 1 << 1;
        const SFF8431_APPENDIX_E = 1 << 0;
    }
}

#[cfg(test)]
mod tests {
    use super::DiagnosticType;
    use super::ImplementedOptions;

    #[test]
    fn test_diagnostic_type_retains_unknown_bits() {
        let diag = DiagnosticType::from_bits_retain(0b0110_1001);
        assert!(diag.contains(DiagnosticType::DDM_IMPLEMENTED));
        assert!(diag.contains(DiagnosticType::INTERNALLY_CALIBRATED));
        assert!(diag.contains(DiagnosticType::AVERAGE_POWER));
        assert!(!diag.contains(DiagnosticType::EXTERNALLY_CALIBRATED));
        assert_eq!(diag.bits(), 0b0110_1001);
    }

    #[test]
    fn test_implemented_options_word() {
        let opts = ImplementedOptions::from_bits_truncate(u16::from_be_bytes([0x10, 0x1a]));
        assert!(opts.contains(ImplementedOptions::PAGING));
        assert!(opts.contains(ImplementedOptions::TX_DISABLE));
        assert!(opts.contains(ImplementedOptions::TX_FAULT));
        assert!(opts.contains(ImplementedOptions::LOS));
        assert!(!opts.contains(ImplementedOptions::LOS_INVERTED));
    }
}
