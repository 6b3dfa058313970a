// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Frame builders shared by the integration tests.

#![allow(dead_code)]

use tm2_common::ubx::{self, class, id, NAV_PVT_LEN, TIM_TM2_LEN};

pub fn frame(class: u8, id: u8, payload: &[u8]) -> Vec<u8> {
    let mut out: heapless::Vec<u8, 512> = heapless::Vec::new();
    ubx::build_frame(class, id, payload, &mut out).expect("test frame fits");
    out.to_vec()
}

pub fn tim_tm2_payload(
    count: u16,
    week: u16,
    tow_ms: u32,
    tow_sub_ms: u32,
    acc_est: u32,
) -> [u8; TIM_TM2_LEN] {
    let mut p = [0u8; TIM_TM2_LEN];
    p[0] = 0; // channel
    p[1] = 0x80; // new rising edge
    p[2..4].copy_from_slice(&count.to_le_bytes());
    p[4..6].copy_from_slice(&week.to_le_bytes());
    p[6..8].copy_from_slice(&week.to_le_bytes());
    p[8..12].copy_from_slice(&tow_ms.to_le_bytes());
    p[12..16].copy_from_slice(&tow_sub_ms.to_le_bytes());
    p[16..20].copy_from_slice(&(tow_ms + 1).to_le_bytes());
    p[20..24].copy_from_slice(&0u32.to_le_bytes());
    p[24..28].copy_from_slice(&acc_est.to_le_bytes());
    p
}

pub fn tim_tm2_frame(count: u16, week: u16, tow_ms: u32, tow_sub_ms: u32, acc_est: u32) -> Vec<u8> {
    frame(
        class::TIM,
        id::TIM_TM2,
        &tim_tm2_payload(count, week, tow_ms, tow_sub_ms, acc_est),
    )
}

pub fn nav_pvt_frame(fix_type: u8, num_sv: u8) -> Vec<u8> {
    let mut p = [0u8; NAV_PVT_LEN];
    p[20] = fix_type;
    p[23] = num_sv;
    frame(class::NAV, id::NAV_PVT, &p)
}

pub fn ack_frame(acked_class: u8, acked_id: u8) -> Vec<u8> {
    frame(class::ACK, id::ACK_ACK, &[acked_class, acked_id])
}

pub fn nak_frame(nacked_class: u8, nacked_id: u8) -> Vec<u8> {
    frame(class::ACK, id::ACK_NAK, &[nacked_class, nacked_id])
}

pub fn cfg_rate_frame() -> Vec<u8> {
    // measRate = 1000 ms, navRate = 1, timeRef = GPS
    frame(class::CFG, id::CFG_RATE, &[0xE8, 0x03, 0x01, 0x00, 0x01, 0x00])
}
