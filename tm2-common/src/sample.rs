// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Latest-value latch for time-mark samples.

use crate::ubx::TimTm2;

/// Time of the most recent rising edge on the receiver's time-mark input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingSample {
    /// Rising edge counter.
    pub count: u16,
    /// GPS week number.
    pub week: u16,
    /// Millisecond of week.
    pub tow_ms: u32,
    /// Nanosecond remainder within `tow_ms`.
    pub tow_sub_ms: u32,
    /// Accuracy estimate in nanoseconds.
    pub acc_est: u32,
}

impl From<&TimTm2> for TimingSample {
    fn from(tm2: &TimTm2) -> Self {
        Self {
            count: tm2.count,
            week: tm2.wn_r,
            tow_ms: tm2.tow_ms_r,
            tow_sub_ms: tm2.tow_sub_ms_r,
            acc_est: tm2.acc_est,
        }
    }
}

/// Single-slot cache holding the latest sample and an unread flag.
///
/// A new sample always overwrites the previous one, read or not.
#[derive(Debug, Default)]
pub struct SampleLatch {
    latest: Option<TimingSample>,
    unread: bool,
    latched_total: u32,
}

impl SampleLatch {
    pub const fn new() -> Self {
        Self {
            latest: None,
            unread: false,
            latched_total: 0,
        }
    }

    /// Store `sample` and mark it unread.
    pub fn latch(&mut self, sample: TimingSample) {
        self.latest = Some(sample);
        self.unread = true;
        self.latched_total = self.latched_total.wrapping_add(1);
    }

    /// Return the latest sample if it has not been read yet, clearing the flag.
    pub fn take_fresh(&mut self) -> Option<TimingSample> {
        if !self.unread {
            return None;
        }
        self.unread = false;
        self.latest
    }

    /// Last latched sample, whether or not it was already read.
    pub fn latest(&self) -> Option<TimingSample> {
        self.latest
    }

    /// Number of samples latched since power-on.
    pub fn latched_total(&self) -> u32 {
        self.latched_total
    }
}
