// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! GPS week/time-of-week to UTC conversion.

use chrono::{DateTime, Utc};
use tm2_common::TimingSample;

pub const SECONDS_PER_WEEK: i64 = 7 * 24 * 60 * 60;

/// Unix time of the GPS epoch, 1980-01-06T00:00:00Z.
pub const GPS_EPOCH_UNIX: i64 = 315_964_800;

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// UTC instant of the sample's rising edge.
///
/// `leap_seconds` is the GPS-UTC offset to subtract; 0 reports GPS time.
pub fn to_utc(sample: &TimingSample, leap_seconds: i64) -> Option<DateTime<Utc>> {
    let tow_ms = i64::from(sample.tow_ms);
    let seconds = GPS_EPOCH_UNIX + i64::from(sample.week) * SECONDS_PER_WEEK + tow_ms / 1000
        - leap_seconds;
    let nanos = (tow_ms % 1000) * 1_000_000 + i64::from(sample.tow_sub_ms);

    DateTime::from_timestamp(
        seconds + nanos.div_euclid(NANOS_PER_SECOND),
        nanos.rem_euclid(NANOS_PER_SECOND) as u32,
    )
}

/// Render with microsecond precision, e.g. `2023-01-19 00:00:00.123456`.
pub fn format_utc(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}
