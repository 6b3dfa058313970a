// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Tests for the u-blox DDC driver against a scripted receiver.

mod common;

use std::collections::VecDeque;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation};
use tm2_common::ubx::{self, class, id};
use tm2_common::{Gnss, GnssError, TimingSample, GNSS_I2C_ADDRESS};

#[derive(Clone, Copy, PartialEq)]
enum AckMode {
    Ack,
    Nak,
    Silent,
}

/// Fake receiver: answers polls, acknowledges configuration, streams queued bytes.
struct FakeReceiver {
    stream: VecDeque<u8>,
    register: u8,
    written: Vec<Vec<u8>>,
    answer_polls: bool,
    ack_mode: AckMode,
    num_sv: u8,
    broken: bool,
}

impl FakeReceiver {
    fn new() -> Self {
        Self {
            stream: VecDeque::new(),
            register: 0xFF,
            written: Vec::new(),
            answer_polls: true,
            ack_mode: AckMode::Ack,
            num_sv: 9,
            broken: false,
        }
    }

    fn queue(&mut self, bytes: &[u8]) {
        self.stream.extend(bytes.iter().copied());
    }

    fn on_frame(&mut self, frame: Vec<u8>) {
        let (cls, msg, len) = (frame[2], frame[3], frame[4]);
        match (cls, msg, len) {
            (class::CFG, id::CFG_RATE, 0) if self.answer_polls => {
                self.queue(&common::cfg_rate_frame())
            }
            (class::NAV, id::NAV_PVT, 0) if self.answer_polls => {
                self.queue(&common::nav_pvt_frame(3, self.num_sv))
            }
            (class::CFG, _, _) => match self.ack_mode {
                AckMode::Ack => self.queue(&common::ack_frame(cls, msg)),
                AckMode::Nak => self.queue(&common::nak_frame(cls, msg)),
                AckMode::Silent => {}
            },
            _ => {}
        }
        self.written.push(frame);
    }
}

impl ErrorType for FakeReceiver {
    type Error = ErrorKind;
}

impl I2c for FakeReceiver {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if self.broken {
            return Err(ErrorKind::Bus);
        }
        assert_eq!(address, GNSS_I2C_ADDRESS);

        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) if bytes.len() == 1 => self.register = bytes[0],
                Operation::Write(bytes) => self.on_frame(bytes.to_vec()),
                Operation::Read(buf) if self.register == 0xFD => {
                    let count = (self.stream.len() as u16).to_be_bytes();
                    buf.copy_from_slice(&count);
                }
                Operation::Read(buf) => {
                    for b in buf.iter_mut() {
                        *b = self.stream.pop_front().unwrap_or(0xFF);
                    }
                }
            }
        }
        Ok(())
    }
}

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

fn gnss_with(receiver: FakeReceiver) -> Gnss<FakeReceiver> {
    Gnss::new(receiver, GNSS_I2C_ADDRESS)
}

#[test]
fn test_begin_detects_receiver() {
    let mut receiver = FakeReceiver::new();
    let mut gnss = Gnss::new(&mut receiver, GNSS_I2C_ADDRESS);

    assert_eq!(gnss.begin(&mut NoDelay), Ok(()));

    assert_eq!(receiver.written[0], ubx::poll_cfg_rate().unwrap().to_vec());
}

#[test]
fn test_begin_times_out_without_receiver() {
    let mut receiver = FakeReceiver::new();
    receiver.answer_polls = false;
    let mut gnss = Gnss::new(&mut receiver, GNSS_I2C_ADDRESS);

    assert_eq!(gnss.begin(&mut NoDelay), Err(GnssError::Timeout));

    // One poll per attempt.
    assert_eq!(receiver.written.len(), 3);
}

#[test]
fn test_begin_reports_bus_error() {
    let mut receiver = FakeReceiver::new();
    receiver.broken = true;
    let mut gnss = gnss_with(receiver);

    assert_eq!(gnss.begin(&mut NoDelay), Err(GnssError::Bus(ErrorKind::Bus)));
}

#[test]
fn test_bring_up_sequence_is_acknowledged() {
    let mut receiver = FakeReceiver::new();
    let mut gnss = Gnss::new(&mut receiver, GNSS_I2C_ADDRESS);
    let delay = &mut NoDelay;

    assert_eq!(gnss.set_i2c_output_ubx(delay), Ok(()));
    assert_eq!(gnss.save_config_ioport(delay), Ok(()));
    assert_eq!(gnss.set_navigation_frequency(1, delay), Ok(()));
    assert_eq!(gnss.enable_auto_tim_tm2(delay), Ok(()));

    assert_eq!(
        receiver.written,
        vec![
            ubx::cfg_valset_i2c_output_ubx_only().unwrap().to_vec(),
            ubx::cfg_cfg_save_ioport().unwrap().to_vec(),
            ubx::cfg_valset_measurement_rate(1).unwrap().to_vec(),
            ubx::cfg_valset_tim_tm2_i2c(1).unwrap().to_vec(),
        ]
    );
}

#[test]
fn test_rejected_configuration_is_reported() {
    let mut receiver = FakeReceiver::new();
    receiver.ack_mode = AckMode::Nak;
    let mut gnss = gnss_with(receiver);

    assert_eq!(
        gnss.enable_auto_tim_tm2(&mut NoDelay),
        Err(GnssError::Nak {
            class: class::CFG,
            id: id::CFG_VALSET
        })
    );
}

#[test]
fn test_unanswered_configuration_times_out() {
    let mut receiver = FakeReceiver::new();
    receiver.ack_mode = AckMode::Silent;
    let mut gnss = gnss_with(receiver);

    assert_eq!(gnss.save_config_ioport(&mut NoDelay), Err(GnssError::Timeout));
}

#[test]
fn test_time_mark_is_delivered_once() {
    let mut receiver = FakeReceiver::new();
    receiver.queue(&common::tim_tm2_frame(5, 2245, 86_400_000, 123_456, 15));
    let mut gnss = gnss_with(receiver);

    assert_eq!(gnss.check_ublox(), Ok(36));

    let mut delivered = None;
    assert!(gnss.check_callbacks(|tm2| delivered = Some(TimingSample::from(tm2))));
    assert_eq!(
        delivered,
        Some(TimingSample {
            count: 5,
            week: 2245,
            tow_ms: 86_400_000,
            tow_sub_ms: 123_456,
            acc_est: 15,
        })
    );

    assert!(!gnss.check_callbacks(|_| panic!("delivered twice")));
}

#[test]
fn test_pending_time_mark_is_overwritten() {
    let mut receiver = FakeReceiver::new();
    receiver.queue(&common::tim_tm2_frame(1, 2245, 1_000, 0, 10));
    receiver.queue(&common::tim_tm2_frame(2, 2245, 2_000, 0, 10));
    let mut gnss = gnss_with(receiver);

    gnss.check_ublox().unwrap();

    let mut counts = Vec::new();
    while gnss.check_callbacks(|tm2| counts.push(tm2.count)) {}
    assert_eq!(counts, vec![2]);
}

#[test]
fn test_empty_stream_is_quiet() {
    let mut gnss = gnss_with(FakeReceiver::new());

    assert_eq!(gnss.check_ublox(), Ok(0));
    assert!(!gnss.check_callbacks(|_| {}));
}

#[test]
fn test_poll_satellites_keeps_time_mark_pending() {
    let mut receiver = FakeReceiver::new();
    receiver.num_sv = 14;
    receiver.queue(&common::tim_tm2_frame(3, 2245, 5_000, 0, 10));
    let mut gnss = gnss_with(receiver);

    assert_eq!(gnss.poll_satellites(&mut NoDelay), Ok(14));
    assert!(gnss.check_callbacks(|tm2| assert_eq!(tm2.count, 3)));
}

#[test]
fn test_large_backlog_is_drained_in_chunks() {
    let mut receiver = FakeReceiver::new();
    for count in 0..10u16 {
        receiver.queue(&common::tim_tm2_frame(count, 2245, 1_000 * count as u32, 0, 10));
    }
    let mut gnss = gnss_with(receiver);

    assert_eq!(gnss.check_ublox(), Ok(360));
    assert!(gnss.check_callbacks(|tm2| assert_eq!(tm2.count, 9)));
    assert_eq!(gnss.checksum_errors(), 0);
}

#[test]
fn test_false_sync_does_not_hide_later_time_marks() {
    let mut receiver = FakeReceiver::new();
    receiver.queue(&[0xB5, 0x62, class::TIM, id::TIM_TM2, 0xFF, 0xFF]);
    receiver.queue(&common::tim_tm2_frame(8, 2245, 9_000, 0, 10));
    let mut gnss = gnss_with(receiver);

    gnss.check_ublox().unwrap();

    assert!(gnss.check_callbacks(|tm2| assert_eq!(tm2.count, 8)));
    assert_eq!(gnss.length_errors(), 1);
}
