// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2026 Oxide Computer Company

//! Programmed mock modules, for testing.

use crate::utils::checksum;
use tcv_bus::mock::MockModule;

pub const SFP_VENDOR_NAME: &str = "ACME OPTICS";
pub const SFP_PART_NUMBER: &str = "SFP-10G-SR";
pub const SFP_SERIAL_NUMBER: &str = "SN0123456789";
pub const XFP_VENDOR_NAME: &str = "XFP VENDOR";

// Copy `s` into `buf`, space-padded.
fn put_ascii(buf: &mut [u8], s: &str) {
    buf.fill(b' ');
    buf[..s.len()].copy_from_slice(s.as_bytes());
}

fn put_word(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
}

/// A 10GBASE-SR SFP+ module with internally calibrated diagnostics.
///
/// Live readings are 25.5 C, 3.3 V, 8 mA bias, 0.5 mW Tx and 0.4 mW Rx.
/// High warnings are 75 C, 1.0 mW Tx and 1.5 mW Rx.
pub fn sfp() -> MockModule {
    let module = MockModule::new();
    {
        let mut a0 = module.id_map_mut();
        a0[0] = 0x03;
        a0[1] = 0x04;
        a0[2] = 0x07;
        a0[3] = 0x10;
        a0[11] = 0x06;
        a0[12] = 103;
        a0[16] = 8;
        a0[17] = 3;
        a0[18] = 15;
        a0[19] = 30;
        put_ascii(&mut a0[20..36], SFP_VENDOR_NAME);
        a0[37..40].copy_from_slice(&[0x00, 0x90, 0x65]);
        put_ascii(&mut a0[40..56], SFP_PART_NUMBER);
        put_ascii(&mut a0[56..60], "A1");
        put_word(&mut a0[..], 60, 850);
        a0[63] = checksum(&a0[..63]);
        a0[64..66].copy_from_slice(&[0x00, 0x1a]);
        put_ascii(&mut a0[68..84], SFP_SERIAL_NUMBER);
        a0[84..92].copy_from_slice(b"23061501");
        a0[92] = 0x68;
        a0[93] = 0xf0;
        a0[94] = 0x08;
        a0[95] = checksum(&a0[64..95]);
        a0[96..128].fill(0x5a);
        for (i, byte) in a0[128..].iter_mut().enumerate() {
            *byte = i as u8;
        }
    }
    {
        let mut a2 = module.diagnostics_map_mut();
        put_word(&mut a2[..], 4, 75 * 256);
        put_word(&mut a2[..], 28, 10_000);
        put_word(&mut a2[..], 36, 15_000);
        put_word(&mut a2[..], 96, 0x1980);
        put_word(&mut a2[..], 98, 33_000);
        put_word(&mut a2[..], 100, 4_000);
        put_word(&mut a2[..], 102, 5_000);
        put_word(&mut a2[..], 104, 4_000);
        a2[128..248].fill(0xee);
    }
    module
}

/// A 10GBASE-LR XFP module.
///
/// Live readings are 32 C, 12 mA bias, 0.5 mW Tx and 0.2 mW Rx. High
/// warnings are 70 C, 2.0 mW Tx and 1.0 mW Rx.
pub fn xfp() -> MockModule {
    let module = MockModule::paged();
    {
        let mut lower = module.id_map_mut();
        lower[0] = 0x06;
        put_word(&mut lower[..], 6, 70 * 256);
        put_word(&mut lower[..], 30, 20_000);
        put_word(&mut lower[..], 38, 10_000);
        put_word(&mut lower[..], 96, 32 * 256);
        put_word(&mut lower[..], 100, 6_000);
        put_word(&mut lower[..], 102, 5_000);
        put_word(&mut lower[..], 104, 2_000);
    }
    {
        let mut serial = module.table_mut(0x01);
        serial[0] = 0x06;
        serial[1] = 0x90;
        serial[2] = 0x07;
        serial[3] = 0x44;
        serial[12] = 99;
        serial[13] = 105;
        serial[14] = 10;
        serial[15] = 150;
        serial[16] = 82;
        serial[17] = 33;
        put_ascii(&mut serial[20..36], XFP_VENDOR_NAME);
        serial[37..40].copy_from_slice(&[0x00, 0x17, 0x6a]);
        put_ascii(&mut serial[40..56], "XFP-10G-LR");
        put_ascii(&mut serial[56..58], "B2");
        put_word(&mut serial[..], 58, 26_200);
        serial[63] = checksum(&serial[..63]);
        put_ascii(&mut serial[68..84], "XFPSN0001");
        serial[84..92].copy_from_slice(b"220101  ");
        serial[92] = 0x08;
        serial[95] = checksum(&serial[64..95]);
        serial[96..128].fill(0x3c);
    }
    module.table_mut(0x02).fill(0x77);
    module
}
