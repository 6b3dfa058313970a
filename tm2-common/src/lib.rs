// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Common types and utilities for the TIM-TM2 relay.
//!
//! This crate supports both `no_std` (embedded) and `std` (host) environments:
//! - Default: `no_std` mode for embedded targets
//! - `std` feature: Enables `std` support for host tools
//! - `defmt` feature: Derives `defmt::Format` for logging on target

#![cfg_attr(not(feature = "std"), no_std)]

pub mod gnss;
pub mod protocol;
pub mod sample;
pub mod service;
pub mod ubx;

// Re-export commonly used types
pub use gnss::{Gnss, GnssError, GNSS_I2C_ADDRESS};
pub use protocol::{ParseError, Reply, Request, HOST_BAUD_RATE, NO_FRESH_SAMPLE_LINE, REQUEST_BYTE};
pub use sample::{SampleLatch, TimingSample};
pub use ubx::{TimTm2, UbxMessage, UbxParser};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

/// Blink an LED a specified number of times.
pub fn blink(led: &mut impl OutputPin, timer: &mut impl DelayNs, count: u32, period_ms: u32) {
    for _ in 0..count {
        led.set_high().ok();
        timer.delay_ms(period_ms);
        led.set_low().ok();
        timer.delay_ms(period_ms);
    }
}
