// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! u-blox receiver driver over I2C (DDC).
//!
//! The receiver exposes a byte counter at registers `0xFD`/`0xFE` and its
//! output stream at register `0xFF`. Commands are written as plain UBX frames.
//!
//! Time marks are not delivered as they are decoded: [`Gnss::check_ublox`]
//! parks the latest TIM-TM2 in a single pending slot, and
//! [`Gnss::check_callbacks`] hands it to the caller once.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, ErrorKind, I2c};
use thiserror::Error;

use crate::ubx::{self, Frame, NavPvtSummary, TimTm2, UbxError, UbxMessage, UbxParser};

/// Default DDC address of u-blox receivers.
pub const GNSS_I2C_ADDRESS: u8 = 0x42;

const REG_BYTES_AVAILABLE: u8 = 0xFD;
const REG_DATA_STREAM: u8 = 0xFF;

const READ_CHUNK: usize = 32;
/// Upper bound on bytes drained per `check_ublox` call.
const MAX_DRAIN_BYTES: usize = 1024;

const POLL_INTERVAL_MS: u32 = 10;
const RESPONSE_TIMEOUT_MS: u32 = 1_100;
const BEGIN_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GnssError {
    #[error("I2C bus error: {0:?}")]
    Bus(ErrorKind),
    #[error("no response from receiver")]
    Timeout,
    #[error("receiver rejected message {class:#04x}/{id:#04x}")]
    Nak { class: u8, id: u8 },
    #[error("UBX framing: {0}")]
    Frame(#[from] UbxError),
}

#[derive(Clone, Copy)]
enum AckState {
    Pending,
    Acked,
    Nacked,
}

pub struct Gnss<I> {
    i2c: I,
    address: u8,
    parser: UbxParser,
    pending_tm2: Option<TimTm2>,
    nav_pvt: Option<NavPvtSummary>,
    cfg_rate_seen: bool,
    ack: Option<(u8, u8, AckState)>,
}

impl<I: I2c> Gnss<I> {
    pub fn new(i2c: I, address: u8) -> Self {
        Self {
            i2c,
            address,
            parser: UbxParser::new(),
            pending_tm2: None,
            nav_pvt: None,
            cfg_rate_seen: false,
            ack: None,
        }
    }

    /// Check that a receiver answers on the bus.
    pub fn begin(&mut self, delay: &mut impl DelayNs) -> Result<(), GnssError> {
        let mut last_err = GnssError::Timeout;
        for _ in 0..BEGIN_ATTEMPTS {
            self.cfg_rate_seen = false;
            match self
                .send(&ubx::poll_cfg_rate()?)
                .and_then(|()| self.wait_until(delay, |gnss| gnss.cfg_rate_seen))
            {
                Ok(()) => return Ok(()),
                Err(e) => last_err = e,
            }
        }
        Err(last_err)
    }

    /// Restrict the I2C port to UBX output.
    pub fn set_i2c_output_ubx(&mut self, delay: &mut impl DelayNs) -> Result<(), GnssError> {
        self.send_with_ack(&ubx::cfg_valset_i2c_output_ubx_only()?, delay)
    }

    /// Save the communication port settings to flash and BBR.
    pub fn save_config_ioport(&mut self, delay: &mut impl DelayNs) -> Result<(), GnssError> {
        self.send_with_ack(&ubx::cfg_cfg_save_ioport()?, delay)
    }

    pub fn set_navigation_frequency(
        &mut self,
        rate_hz: u8,
        delay: &mut impl DelayNs,
    ) -> Result<(), GnssError> {
        self.send_with_ack(&ubx::cfg_valset_measurement_rate(rate_hz)?, delay)
    }

    /// Have the receiver push TIM-TM2 on every navigation epoch.
    pub fn enable_auto_tim_tm2(&mut self, delay: &mut impl DelayNs) -> Result<(), GnssError> {
        self.send_with_ack(&ubx::cfg_valset_tim_tm2_i2c(1)?, delay)
    }

    /// Drain pending receiver output through the parser.
    ///
    /// Returns the number of bytes consumed.
    pub fn check_ublox(&mut self) -> Result<usize, GnssError> {
        let mut available = self.bytes_available()?.min(MAX_DRAIN_BYTES);
        let consumed = available;
        let mut buf = [0u8; READ_CHUNK];

        while available > 0 {
            let n = available.min(READ_CHUNK);
            self.i2c
                .write_read(self.address, &[REG_DATA_STREAM], &mut buf[..n])
                .map_err(|e| GnssError::Bus(e.kind()))?;
            for &byte in &buf[..n] {
                if let Some(message) = self.parser.feed(byte) {
                    self.handle(message);
                }
            }
            available -= n;
        }
        Ok(consumed)
    }

    /// Hand a pending TIM-TM2 to `callback`, at most once per message.
    ///
    /// Returns whether the callback ran.
    pub fn check_callbacks<F: FnOnce(&TimTm2)>(&mut self, callback: F) -> bool {
        match self.pending_tm2.take() {
            Some(tm2) => {
                callback(&tm2);
                true
            }
            None => false,
        }
    }

    /// Poll NAV-PVT and return the number of satellites used in the solution.
    pub fn poll_satellites(&mut self, delay: &mut impl DelayNs) -> Result<u8, GnssError> {
        self.nav_pvt = None;
        self.send(&ubx::poll_nav_pvt()?)?;
        self.wait_until(delay, |gnss| gnss.nav_pvt.is_some())?;
        self.nav_pvt.map(|pvt| pvt.num_sv).ok_or(GnssError::Timeout)
    }

    /// Frames dropped for bad checksums since power-on.
    pub fn checksum_errors(&self) -> u32 {
        self.parser.checksum_errors()
    }

    /// Headers dropped for impossible payload lengths since power-on.
    pub fn length_errors(&self) -> u32 {
        self.parser.length_errors()
    }

    fn handle(&mut self, message: UbxMessage) {
        match message {
            UbxMessage::TimTm2(tm2) => self.pending_tm2 = Some(tm2),
            UbxMessage::NavPvt(pvt) => self.nav_pvt = Some(pvt),
            UbxMessage::CfgRate => self.cfg_rate_seen = true,
            UbxMessage::Ack { class, id } => self.resolve_ack(class, id, AckState::Acked),
            UbxMessage::Nak { class, id } => self.resolve_ack(class, id, AckState::Nacked),
            UbxMessage::Other { .. } => {}
        }
    }

    fn resolve_ack(&mut self, class: u8, id: u8, state: AckState) {
        if let Some((c, i, AckState::Pending)) = self.ack {
            if c == class && i == id {
                self.ack = Some((c, i, state));
            }
        }
    }

    fn bytes_available(&mut self) -> Result<usize, GnssError> {
        let mut count = [0u8; 2];
        self.i2c
            .write_read(self.address, &[REG_BYTES_AVAILABLE], &mut count)
            .map_err(|e| GnssError::Bus(e.kind()))?;
        match u16::from_be_bytes(count) {
            // Reads back as all ones while the receiver is busy.
            0xFFFF => Ok(0),
            n => Ok(n as usize),
        }
    }

    fn send(&mut self, frame: &Frame) -> Result<(), GnssError> {
        self.i2c
            .write(self.address, frame)
            .map_err(|e| GnssError::Bus(e.kind()))
    }

    fn send_with_ack(&mut self, frame: &Frame, delay: &mut impl DelayNs) -> Result<(), GnssError> {
        let (class, id) = (frame[2], frame[3]);
        self.ack = Some((class, id, AckState::Pending));
        self.send(frame)?;
        self.wait_until(delay, |gnss| {
            !matches!(gnss.ack, Some((_, _, AckState::Pending)))
        })?;

        match self.ack.take() {
            Some((_, _, AckState::Acked)) => Ok(()),
            _ => Err(GnssError::Nak { class, id }),
        }
    }

    fn wait_until<F>(&mut self, delay: &mut impl DelayNs, done: F) -> Result<(), GnssError>
    where
        F: Fn(&Self) -> bool,
    {
        let mut waited = 0;
        loop {
            self.check_ublox()?;
            if done(self) {
                return Ok(());
            }
            if waited >= RESPONSE_TIMEOUT_MS {
                return Err(GnssError::Timeout);
            }
            delay.delay_ms(POLL_INTERVAL_MS);
            waited += POLL_INTERVAL_MS;
        }
    }
}
