// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Host link protocol.
//!
//! The host sends the single byte `G`. The relay answers with one ASCII line:
//!
//! - `<count> <week> <tow_ms> <tow_sub_ms> <acc_est>\r\n` when a sample was
//!   latched since the previous request
//! - `-1 0 0 0 0\r\n` otherwise
//!
//! Every other request byte is ignored.

use core::fmt::{self, Write};

use heapless::String;
use thiserror::Error;

use crate::sample::{SampleLatch, TimingSample};
use crate::service::{Event, EventBus};

/// Byte the host sends to ask for the latest sample.
pub const REQUEST_BYTE: u8 = b'G';

/// UART baud rate of the host link.
pub const HOST_BAUD_RATE: u32 = 115_200;

/// Reply line (without terminator) sent when nothing new was latched.
pub const NO_FRESH_SAMPLE_LINE: &str = "-1 0 0 0 0";

/// Line terminator appended to every reply.
pub const LINE_ENDING: &str = "\r\n";

/// Widest possible reply: five maximal fields, four spaces and `\r\n`.
pub const REPLY_LINE_CAPACITY: usize = 48;

const FIELD_COUNT: usize = 5;

/// Request decoded from a byte received on the host link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Request {
    /// Return the latest latched sample, once.
    LatestSample,
}

impl Request {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            REQUEST_BYTE => Some(Self::LatestSample),
            _ => None,
        }
    }

    /// Answer the request from `latch`.
    ///
    /// A "no fresh sample" reply also asks the GNSS side, through `events`, to
    /// report the satellites in view.
    pub fn answer(self, latch: &mut SampleLatch, events: &EventBus) -> Reply {
        match self {
            Self::LatestSample => {
                let reply = Reply::from_latch(latch);
                if reply == Reply::NoFreshSample {
                    events.publish(Event::ReportSatellites);
                }
                reply
            }
        }
    }
}

/// Reply to a [`Request::LatestSample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reply {
    Sample(TimingSample),
    NoFreshSample,
}

impl Reply {
    /// Build the reply for a request, consuming the unread flag of `latch`.
    pub fn from_latch(latch: &mut SampleLatch) -> Self {
        match latch.take_fresh() {
            Some(sample) => Self::Sample(sample),
            None => Self::NoFreshSample,
        }
    }

    /// Write the reply followed by `\r\n`.
    pub fn write_line<W: Write>(&self, out: &mut W) -> fmt::Result {
        write!(out, "{}{}", self, LINE_ENDING)
    }

    /// Render the terminated reply line into a fixed-capacity string.
    pub fn to_line(&self) -> String<REPLY_LINE_CAPACITY> {
        let mut line = String::new();
        // Capacity covers the widest reply, so this cannot overflow.
        self.write_line(&mut line).ok();
        line
    }

    /// Parse a reply line received from the relay.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let mut fields = [0i64; FIELD_COUNT];
        let mut found = 0;

        for token in line.split_ascii_whitespace() {
            if found == FIELD_COUNT {
                return Err(ParseError::FieldCount(found + 1));
            }
            fields[found] = token.parse().map_err(|_| ParseError::NotAnInteger)?;
            found += 1;
        }

        if found != FIELD_COUNT {
            return Err(ParseError::FieldCount(found));
        }

        if fields[0] == -1 {
            return Ok(Self::NoFreshSample);
        }

        Ok(Self::Sample(TimingSample {
            count: narrow(fields[0], "count")?,
            week: narrow(fields[1], "week")?,
            tow_ms: narrow(fields[2], "tow_ms")?,
            tow_sub_ms: narrow(fields[3], "tow_sub_ms")?,
            acc_est: narrow(fields[4], "acc_est")?,
        }))
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sample(s) => write!(
                f,
                "{} {} {} {} {}",
                s.count, s.week, s.tow_ms, s.tow_sub_ms, s.acc_est
            ),
            Self::NoFreshSample => f.write_str(NO_FRESH_SAMPLE_LINE),
        }
    }
}

fn narrow<T: TryFrom<i64>>(value: i64, field: &'static str) -> Result<T, ParseError> {
    T::try_from(value).map_err(|_| ParseError::OutOfRange(field))
}

/// Error parsing a reply line on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    #[error("expected 5 fields, found {0}")]
    FieldCount(usize),
    #[error("field is not an integer")]
    NotAnInteger,
    #[error("field `{0}` out of range")]
    OutOfRange(&'static str),
}
