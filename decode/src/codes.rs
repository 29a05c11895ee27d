// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! Connector, encoding and compliance codes.
//!
//! The one-byte codes are assigned in SFF-8024. The compliance code sets are
//! bit fields whose layout follows SFF-8472 bytes 3-10, which INF-8077i
//! modules map onto where they have an equivalent.

crate::bitfield_enum! {
    name = Connector,
    description = "The type of media connector on a module, from SFF-8024 Table 4-3.",
    variants = {
        0x00, Unknown, "Unknown or unspecified",
        0x01, Sc, "SC (Subscriber Connector)",
        0x02, FibreChannelStyle1Copper, "Fibre Channel Style 1 copper connector",
        0x03, FibreChannelStyle2Copper, "Fibre Channel Style 2 copper connector",
        0x04, BncTnc, "BNC/TNC (Bayonet/Threaded Neill-Concelman)",
        0x05, FibreChannelCoax, "Fibre Channel coax headers",
        0x06, FiberJack, "Fiber Jack",
        0x07, Lc, "LC (Lucent Connector)",
        0x08, MtRj, "MT-RJ (Mechanical Transfer - Registered Jack)",
        0x09, Mu, "MU (Multiple Optical)",
        0x0a, Sg, "SG",
        0x0b, OpticalPigtail, "Optical Pigtail",
        0x0c, Mpo1x12, "MPO 1x12 (Multifiber Parallel Optic)",
        0x0d, Mpo2x16, "MPO 2x16",
        0x20, HssdcII, "HSSDC II (High Speed Serial Data Connector)",
        0x21, CopperPigtail, "Copper pigtail",
        0x22, Rj45, "RJ45 (Registered Jack)",
        0x23, NoSeparableConnector, "No separable connector",
        0x24, Mxc2x16, "MXC 2x16",
        0x25, Cs, "CS optical connector",
        0x26, Sn, "SN optical connector",
        0x27, Mpo2x12, "MPO 2x12",
        0x28, Mpo1x16, "MPO 1x16",
    },
    other_variants = {
        Reserved: 0x0e..=0x1f | 0x29..=0x7f,
        VendorSpecific: 0x80..=0xff,
    }
}

crate::bitfield_enum! {
    name = Encoding,
    description = "The serial encoding algorithm, from SFF-8024 Table 4-2.",
    variants = {
        0x00, Unspecified, "Unspecified",
        0x01, B8B10, "8B/10B",
        0x02, B4B5, "4B/5B",
        0x03, Nrz, "NRZ",
        0x04, Manchester, "Manchester",
        0x05, SonetScrambled, "SONET Scrambled",
        0x06, B64B66, "64B/66B",
        0x07, B256B257, "256B/257B (transcoded FEC-enabled data)",
        0x08, Pam4, "PAM4",
    },
    other_variants = {
        Reserved: 0x09..=0xff,
    }
}

crate::bitfield_enum! {
    name = RateIdentifier,
    description = "The rate select functionality a module implements, from SFF-8472 Table 5-6.",
    variants = {
        0x00, Unspecified, "Unspecified",
        0x01, Sff8079, "SFF-8079 (4/2/1G Rate_Select & AS0/AS1)",
        0x02, Sff8431RxOnly, "SFF-8431 (8/4/2G Rx Rate_Select only)",
        0x04, Sff8431TxOnly, "SFF-8431 (8/4/2G Tx Rate_Select only)",
        0x06, Sff8431Independent, "SFF-8431 (8/4/2G Independent Rx & Tx Rate_select)",
        0x08, FcPi5RxOnly, "FC-PI-5 (16/8/4G Rx Rate_select only)",
        0x0a, FcPi5Independent, "FC-PI-5 (16/8/4G Independent Rx, Tx Rate_select)",
        0x0c, FcPi6Independent, "FC-PI-6 (32/16/8G Independent Rx, Tx Rate_Select)",
        0x0e, TenEightRxTx, "10/8G Rx and Tx Rate_Select",
        0x10, FcPi7Independent, "FC-PI-7 (64/32/16G Independent Rx, Tx Rate Select)",
    },
    other_variants = {
        Reserved: 0x03 | 0x05 | 0x07 | 0x09 | 0x0b | 0x0d | 0x0f | 0x11..=0xff,
    }
}

bitflags::bitflags! {
    /// 10G Ethernet compliance codes.
    ///
    /// The upper nibble matches SFF-8472 byte 3. The WAN and short-wave
    /// variants only exist on XFP modules.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    #[cfg_attr(
        any(feature = "api-traits", test),
        derive(serde::Deserialize, serde::Serialize)
    )]
    pub struct TenGigEthernetCompliance: u8 {
        const BASE_ER = 1 << 7;
        const BASE_LRM = 1 << 6;
        const BASE_LR = 1 << 5;
        const BASE_SR = 1 << 4;
        const BASE_SW = 1 << 2;
        const BASE_LW = 1 << 1;
        const BASE_EW = 1 << 0;
    }
}

bitflags::bitflags! {
    /// Infiniband compliance codes, SFF-8472 byte 3 bits 3-0.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    #[cfg_attr(
        any(feature = "api-traits", test),
        derive(serde::Deserialize, serde::Serialize)
    )]
    pub struct InfinibandCompliance: u8 {
        const SX_1X = 1 << 3;
        const LX_1X = 1 << 2;
        const COPPER_ACTIVE_1X = 1 << 1;
        const COPPER_PASSIVE_1X = 1 << 0;
    }
}

bitflags::bitflags! {
    /// ESCON compliance codes, SFF-8472 byte 4 bits 7-6.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    #[cfg_attr(
        any(feature = "api-traits", test),
        derive(serde::Deserialize, serde::Serialize)
    )]
    pub struct EsconCompliance: u8 {
        const SMF = 1 << 7;
        const MMF = 1 << 6;
    }
}

bitflags::bitflags! {
    /// SONET compliance codes, SFF-8472 byte 4 bits 5-0 followed by byte 5.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    #[cfg_attr(
        any(feature = "api-traits", test),
        derive(serde::Deserialize, serde::Serialize)
    )]
    pub struct SonetCompliance: u16 {
        const OC192_SHORT_REACH = 1 << 13;
        const REACH_SPECIFIER_1 = 1 << 12;
        const REACH_SPECIFIER_2 = 1 << 11;
        const OC48_LONG_REACH = 1 << 10;
        const OC48_INTERMEDIATE_REACH = 1 << 9;
        const OC48_SHORT_REACH = 1 << 8;
        const OC12_SINGLE_MODE_LONG_REACH = 1 << 6;
        const OC12_SINGLE_MODE_INTERMEDIATE_REACH = 1 << 5;
        const OC12_SHORT_REACH = 1 << 4;
        const OC3_SINGLE_MODE_LONG_REACH = 1 << 2;
        const OC3_SINGLE_MODE_INTERMEDIATE_REACH = 1 << 1;
        const OC3_SHORT_REACH = 1 << 0;
    }
}

bitflags::bitflags! {
    /// Ethernet compliance codes, SFF-8472 byte 6.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    #[cfg_attr(
        any(feature = "api-traits", test),
        derive(serde::Deserialize, serde::Serialize)
    )]
    pub struct EthernetCompliance: u8 {
        const BASE_PX = 1 << 7;
        const BASE_BX10 = 1 << 6;
        const BASE_FX_100 = 1 << 5;
        const BASE_LX_100 = 1 << 4;
        const BASE_T_1000 = 1 << 3;
        const BASE_CX_1000 = 1 << 2;
        const BASE_LX_1000 = 1 << 1;
        const BASE_SX_1000 = 1 << 0;
    }
}

bitflags::bitflags! {
    /// Fibre Channel link length, SFF-8472 byte 7 bits 7-3.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    #[cfg_attr(
        any(feature = "api-traits", test),
        derive(serde::Deserialize, serde::Serialize)
    )]
    pub struct FibreChannelLinkLength: u8 {
        const VERY_LONG = 1 << 7;
        const SHORT = 1 << 6;
        const INTERMEDIATE = 1 << 5;
        const LONG = 1 << 4;
        const MEDIUM = 1 << 3;
    }
}

bitflags::bitflags! {
    /// Fibre Channel transmitter technology.
    ///
    /// Bits 6-4 are SFF-8472 byte 7 bits 2-0, and bits 3-0 are byte 8 bits
    /// 7-4.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    #[cfg_attr(
        any(feature = "api-traits", test),
        derive(serde::Deserialize, serde::Serialize)
    )]
    pub struct FibreChannelTechnology: u8 {
        const SHORTWAVE_LINEAR_RX = 1 << 6;
        const LONGWAVE_LC = 1 << 5;
        const ELECTRICAL_INTER_ENCLOSURE = 1 << 4;
        const ELECTRICAL_INTRA_ENCLOSURE = 1 << 3;
        const SHORTWAVE_WITHOUT_OFC = 1 << 2;
        const SHORTWAVE_WITH_OFC = 1 << 1;
        const LONGWAVE_LL = 1 << 0;
    }
}

impl FibreChannelTechnology {
    /// Assemble the technology set from SFF-8472 bytes 7 and 8.
    pub const fn from_bytes(byte7: u8, byte8: u8) -> Self {
        Self::from_bits_truncate(((byte7 & 0b111) << 4) | (byte8 >> 4))
    }
}

bitflags::bitflags! {
    /// SFP+ cable technology, SFF-8472 byte 8 bits 3-2.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    #[cfg_attr(
        any(feature = "api-traits", test),
        derive(serde::Deserialize, serde::Serialize)
    )]
    pub struct CableTechnology: u8 {
        const ACTIVE = 1 << 3;
        const PASSIVE = 1 << 2;
    }
}

bitflags::bitflags! {
    /// Fibre Channel transmission media, SFF-8472 byte 9.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    #[cfg_attr(
        any(feature = "api-traits", test),
        derive(serde::Deserialize, serde::Serialize)
    )]
    pub struct FibreChannelMedia: u8 {
        const TWIN_AXIAL_PAIR = 1 << 7;
        const TWISTED_PAIR = 1 << 6;
        const MINIATURE_COAX = 1 << 5;
        const VIDEO_COAX = 1 << 4;
        const MULTIMODE_62_5_UM = 1 << 3;
        const MULTIMODE_50_UM = 1 << 2;
        const SINGLE_MODE = 1 << 0;
    }
}

bitflags::bitflags! {
    /// Fibre Channel speed, SFF-8472 byte 10.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    #[cfg_attr(
        any(feature = "api-traits", test),
        derive(serde::Deserialize, serde::Serialize)
    )]
    pub struct FibreChannelSpeed: u8 {
        const MBPS_1200 = 1 << 7;
        const MBPS_800 = 1 << 6;
        const MBPS_1600 = 1 << 5;
        const MBPS_400 = 1 << 4;
        const MBPS_3200 = 1 << 3;
        const MBPS_200 = 1 << 2;
        /// See byte 62 of the ID map.
        const EXTENDED = 1 << 1;
        const MBPS_100 = 1 << 0;
    }
}
