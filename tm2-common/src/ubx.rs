// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! UBX protocol framing for u-blox receivers.
//!
//! Builds the configuration commands sent during bring-up and decodes the
//! messages the relay cares about (TIM-TM2, NAV-PVT, ACK/NAK).

use heapless::Vec;
use thiserror::Error;

pub const SYNC_1: u8 = 0xB5;
pub const SYNC_2: u8 = 0x62;

/// Sync bytes, class, id and length.
pub const HEADER_LEN: usize = 6;
pub const CHECKSUM_LEN: usize = 2;

/// Largest outgoing command frame.
pub const MAX_COMMAND_FRAME: usize = 64;
const MAX_COMMAND_PAYLOAD: usize = MAX_COMMAND_FRAME - HEADER_LEN - CHECKSUM_LEN;

/// Largest payload length the parser accepts.
///
/// A header announcing more is treated as a false sync: the parser drops it and
/// rescans from the byte after the `0xB5`.
pub const MAX_PAYLOAD: usize = 100;

pub mod class {
    pub const NAV: u8 = 0x01;
    pub const ACK: u8 = 0x05;
    pub const CFG: u8 = 0x06;
    pub const TIM: u8 = 0x0D;
}

pub mod id {
    pub const NAV_PVT: u8 = 0x07;
    pub const ACK_NAK: u8 = 0x00;
    pub const ACK_ACK: u8 = 0x01;
    pub const CFG_RATE: u8 = 0x08;
    pub const CFG_CFG: u8 = 0x09;
    pub const CFG_VALSET: u8 = 0x8A;
    pub const TIM_TM2: u8 = 0x03;
}

/// Configuration database keys (u-blox generation 9 interface description).
pub mod key {
    pub const I2COUTPROT_UBX: u32 = 0x1072_0001;
    pub const I2COUTPROT_NMEA: u32 = 0x1072_0002;
    pub const RATE_MEAS: u32 = 0x3021_0001;
    pub const RATE_NAV: u32 = 0x3021_0002;
    pub const MSGOUT_UBX_TIM_TM2_I2C: u32 = 0x2091_0178;
}

/// CFG-VALSET layer bits.
pub mod layer {
    pub const RAM: u8 = 0x01;
    pub const BBR: u8 = 0x02;
    pub const FLASH: u8 = 0x04;
}

/// CFG-CFG save mask bit for I/O port settings.
pub const CFG_MASK_IOPORT: u32 = 0x0000_0001;

pub const TIM_TM2_LEN: usize = 28;
pub const NAV_PVT_LEN: usize = 92;

pub type Frame = Vec<u8, MAX_COMMAND_FRAME>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UbxError {
    #[error("frame does not fit in the output buffer")]
    BufferTooSmall,
    #[error("payload length {0} invalid for this message")]
    PayloadLength(usize),
}

/// Fletcher-8 checksum over class, id, length and payload.
pub fn checksum(data: &[u8]) -> (u8, u8) {
    data.iter().fold((0u8, 0u8), |(a, b), &byte| {
        let a = a.wrapping_add(byte);
        (a, b.wrapping_add(a))
    })
}

/// Append a complete UBX frame to `out`.
pub fn build_frame<const N: usize>(
    class: u8,
    id: u8,
    payload: &[u8],
    out: &mut Vec<u8, N>,
) -> Result<(), UbxError> {
    let start = out.len();
    let len = u16::try_from(payload.len()).map_err(|_| UbxError::PayloadLength(payload.len()))?;
    let [len_lo, len_hi] = len.to_le_bytes();

    out.extend_from_slice(&[SYNC_1, SYNC_2, class, id, len_lo, len_hi])
        .map_err(|_| UbxError::BufferTooSmall)?;
    out.extend_from_slice(payload).map_err(|_| UbxError::BufferTooSmall)?;

    let (ck_a, ck_b) = checksum(&out[start + 2..]);
    out.extend_from_slice(&[ck_a, ck_b])
        .map_err(|_| UbxError::BufferTooSmall)
}

fn command(class: u8, id: u8, payload: &[u8]) -> Result<Frame, UbxError> {
    let mut frame = Frame::new();
    build_frame(class, id, payload, &mut frame)?;
    Ok(frame)
}

/// Builder for a UBX-CFG-VALSET message.
pub struct ValSet {
    payload: Vec<u8, MAX_COMMAND_PAYLOAD>,
    overflow: bool,
}

impl ValSet {
    pub fn new(layers: u8) -> Self {
        let mut payload = Vec::new();
        // version 0, layers, 2 reserved bytes
        let overflow = payload.extend_from_slice(&[0x00, layers, 0x00, 0x00]).is_err();
        Self { payload, overflow }
    }

    fn push(mut self, key: u32, value: &[u8]) -> Self {
        self.overflow |= self.payload.extend_from_slice(&key.to_le_bytes()).is_err();
        self.overflow |= self.payload.extend_from_slice(value).is_err();
        self
    }

    pub fn bool(self, key: u32, value: bool) -> Self {
        self.push(key, &[value as u8])
    }

    pub fn u8(self, key: u32, value: u8) -> Self {
        self.push(key, &[value])
    }

    pub fn u16(self, key: u32, value: u16) -> Self {
        self.push(key, &value.to_le_bytes())
    }

    pub fn build(self) -> Result<Frame, UbxError> {
        if self.overflow {
            return Err(UbxError::BufferTooSmall);
        }
        command(class::CFG, id::CFG_VALSET, &self.payload)
    }
}

/// Restrict I2C output to UBX (no NMEA noise on the bus).
pub fn cfg_valset_i2c_output_ubx_only() -> Result<Frame, UbxError> {
    ValSet::new(layer::RAM)
        .bool(key::I2COUTPROT_UBX, true)
        .bool(key::I2COUTPROT_NMEA, false)
        .build()
}

/// Persist the I/O port settings to BBR and flash.
pub fn cfg_cfg_save_ioport() -> Result<Frame, UbxError> {
    let mut payload = [0u8; 12];
    // clearMask = 0, saveMask = ioPort, loadMask = 0
    payload[4..8].copy_from_slice(&CFG_MASK_IOPORT.to_le_bytes());
    command(class::CFG, id::CFG_CFG, &payload)
}

/// Set the navigation solution rate.
pub fn cfg_valset_measurement_rate(rate_hz: u8) -> Result<Frame, UbxError> {
    let meas_rate_ms: u16 = if rate_hz > 0 {
        1000 / rate_hz as u16
    } else {
        1000
    };

    ValSet::new(layer::RAM)
        .u16(key::RATE_MEAS, meas_rate_ms)
        .u16(key::RATE_NAV, 1)
        .build()
}

/// Output TIM-TM2 on I2C every `rate` navigation solutions (0 disables).
pub fn cfg_valset_tim_tm2_i2c(rate: u8) -> Result<Frame, UbxError> {
    ValSet::new(layer::RAM)
        .u8(key::MSGOUT_UBX_TIM_TM2_I2C, rate)
        .build()
}

pub fn poll_cfg_rate() -> Result<Frame, UbxError> {
    command(class::CFG, id::CFG_RATE, &[])
}

pub fn poll_nav_pvt() -> Result<Frame, UbxError> {
    command(class::NAV, id::NAV_PVT, &[])
}

fn le_u16(p: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([p[at], p[at + 1]])
}

fn le_u32(p: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([p[at], p[at + 1], p[at + 2], p[at + 3]])
}

/// UBX-TIM-TM2: time mark data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimTm2 {
    /// Time-mark channel (EXTINT index).
    pub ch: u8,
    pub flags: u8,
    /// Rising edge counter.
    pub count: u16,
    pub wn_r: u16,
    pub wn_f: u16,
    pub tow_ms_r: u32,
    pub tow_sub_ms_r: u32,
    pub tow_ms_f: u32,
    pub tow_sub_ms_f: u32,
    pub acc_est: u32,
}

impl TimTm2 {
    pub fn decode(p: &[u8]) -> Result<Self, UbxError> {
        if p.len() != TIM_TM2_LEN {
            return Err(UbxError::PayloadLength(p.len()));
        }
        Ok(Self {
            ch: p[0],
            flags: p[1],
            count: le_u16(p, 2),
            wn_r: le_u16(p, 4),
            wn_f: le_u16(p, 6),
            tow_ms_r: le_u32(p, 8),
            tow_sub_ms_r: le_u32(p, 12),
            tow_ms_f: le_u32(p, 16),
            tow_sub_ms_f: le_u32(p, 20),
            acc_est: le_u32(p, 24),
        })
    }

    /// A new rising edge was detected since the last message.
    pub fn new_rising_edge(&self) -> bool {
        self.flags & 0x80 != 0
    }
}

/// The parts of UBX-NAV-PVT the relay reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NavPvtSummary {
    pub fix_type: u8,
    /// Satellites used in the navigation solution.
    pub num_sv: u8,
}

impl NavPvtSummary {
    pub fn decode(p: &[u8]) -> Result<Self, UbxError> {
        if p.len() != NAV_PVT_LEN {
            return Err(UbxError::PayloadLength(p.len()));
        }
        Ok(Self {
            fix_type: p[20],
            num_sv: p[23],
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UbxMessage {
    TimTm2(TimTm2),
    NavPvt(NavPvtSummary),
    Ack { class: u8, id: u8 },
    Nak { class: u8, id: u8 },
    CfgRate,
    Other { class: u8, id: u8 },
}

impl UbxMessage {
    fn decode(class: u8, id: u8, p: &[u8]) -> Self {
        let decoded = match (class, id) {
            (class::TIM, id::TIM_TM2) => TimTm2::decode(p).ok().map(Self::TimTm2),
            (class::NAV, id::NAV_PVT) => NavPvtSummary::decode(p).ok().map(Self::NavPvt),
            (class::ACK, id::ACK_ACK) if p.len() == 2 => Some(Self::Ack {
                class: p[0],
                id: p[1],
            }),
            (class::ACK, id::ACK_NAK) if p.len() == 2 => Some(Self::Nak {
                class: p[0],
                id: p[1],
            }),
            (class::CFG, id::CFG_RATE) => Some(Self::CfgRate),
            _ => None,
        };
        decoded.unwrap_or(Self::Other { class, id })
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ParserState {
    Sync1,
    Sync2,
    Header { idx: u8 },
    Payload,
    ChecksumA,
    ChecksumB { ck_a: u8 },
}

/// Byte-at-a-time UBX frame decoder.
pub struct UbxParser {
    state: ParserState,
    header: [u8; 4],
    payload: [u8; MAX_PAYLOAD],
    payload_len: usize,
    payload_pos: usize,
    calc_a: u8,
    calc_b: u8,
    checksum_errors: u32,
    length_errors: u32,
}

impl Default for UbxParser {
    fn default() -> Self {
        Self::new()
    }
}

impl UbxParser {
    pub const fn new() -> Self {
        Self {
            state: ParserState::Sync1,
            header: [0; 4],
            payload: [0; MAX_PAYLOAD],
            payload_len: 0,
            payload_pos: 0,
            calc_a: 0,
            calc_b: 0,
            checksum_errors: 0,
            length_errors: 0,
        }
    }

    pub fn reset(&mut self) {
        self.state = ParserState::Sync1;
        self.payload_len = 0;
        self.payload_pos = 0;
        self.calc_a = 0;
        self.calc_b = 0;
    }

    /// Frames dropped because of a checksum mismatch.
    pub fn checksum_errors(&self) -> u32 {
        self.checksum_errors
    }

    /// Headers dropped because they announced an impossible payload length.
    pub fn length_errors(&self) -> u32 {
        self.length_errors
    }

    fn add_ck(&mut self, byte: u8) {
        self.calc_a = self.calc_a.wrapping_add(byte);
        self.calc_b = self.calc_b.wrapping_add(self.calc_a);
    }

    /// Feed one byte. Returns a message when it completes a valid frame.
    pub fn feed(&mut self, byte: u8) -> Option<UbxMessage> {
        match self.state {
            ParserState::Sync1 => {
                if byte == SYNC_1 {
                    self.state = ParserState::Sync2;
                }
            }
            ParserState::Sync2 => {
                self.reset();
                if byte == SYNC_2 {
                    self.state = ParserState::Header { idx: 0 };
                } else if byte == SYNC_1 {
                    self.state = ParserState::Sync2;
                }
            }
            ParserState::Header { idx } => {
                self.header[idx as usize] = byte;
                self.add_ck(byte);
                if idx < 3 {
                    self.state = ParserState::Header { idx: idx + 1 };
                } else {
                    self.payload_len =
                        u16::from_le_bytes([self.header[2], self.header[3]]) as usize;
                    self.payload_pos = 0;
                    if self.payload_len > MAX_PAYLOAD {
                        self.length_errors = self.length_errors.wrapping_add(1);
                        return self.resync();
                    }
                    self.state = if self.payload_len == 0 {
                        ParserState::ChecksumA
                    } else {
                        ParserState::Payload
                    };
                }
            }
            ParserState::Payload => {
                self.payload[self.payload_pos] = byte;
                self.add_ck(byte);
                self.payload_pos += 1;
                if self.payload_pos == self.payload_len {
                    self.state = ParserState::ChecksumA;
                }
            }
            ParserState::ChecksumA => {
                self.state = ParserState::ChecksumB { ck_a: byte };
            }
            ParserState::ChecksumB { ck_a } => {
                let valid = ck_a == self.calc_a && byte == self.calc_b;
                let message = if valid {
                    let payload = &self.payload[..self.payload_len];
                    Some(UbxMessage::decode(self.header[0], self.header[1], payload))
                } else {
                    self.checksum_errors = self.checksum_errors.wrapping_add(1);
                    None
                };
                self.reset();
                return message;
            }
        }
        None
    }

    /// Drop a false sync and rescan the header bytes it swallowed.
    ///
    /// Four bytes cannot hold a whole frame, so nothing is returned.
    fn resync(&mut self) -> Option<UbxMessage> {
        let header = self.header;
        self.reset();
        for byte in header {
            self.feed(byte);
        }
        None
    }
}
