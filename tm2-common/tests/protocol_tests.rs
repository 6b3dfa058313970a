// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Unit tests for the host link request/reply protocol.

use tm2_common::protocol::{ParseError, Reply, Request, LINE_ENDING, REPLY_LINE_CAPACITY};
use tm2_common::{SampleLatch, TimingSample, NO_FRESH_SAMPLE_LINE};

fn sample() -> TimingSample {
    TimingSample {
        count: 12,
        week: 2245,
        tow_ms: 345_600_123,
        tow_sub_ms: 456_789,
        acc_est: 21,
    }
}

#[test]
fn test_only_capital_g_is_a_request() {
    assert_eq!(Request::from_byte(b'G'), Some(Request::LatestSample));
    assert_eq!(Request::from_byte(b'g'), None);
    assert_eq!(Request::from_byte(b'\n'), None);
    assert_eq!(Request::from_byte(0x00), None);
}

#[test]
fn test_empty_latch_replies_no_fresh_sample() {
    let mut latch = SampleLatch::new();

    let reply = Reply::from_latch(&mut latch);

    assert_eq!(reply, Reply::NoFreshSample);
    assert_eq!(reply.to_line().as_str(), "-1 0 0 0 0\r\n");
}

#[test]
fn test_fresh_sample_is_reported_once() {
    let mut latch = SampleLatch::new();
    latch.latch(sample());

    let first = Reply::from_latch(&mut latch);
    let second = Reply::from_latch(&mut latch);

    assert_eq!(first.to_line().as_str(), "12 2245 345600123 456789 21\r\n");
    assert_eq!(second, Reply::NoFreshSample);
}

#[test]
fn test_reply_reports_most_recent_sample() {
    let mut latch = SampleLatch::new();
    latch.latch(sample());
    latch.latch(TimingSample {
        count: 13,
        ..sample()
    });

    let reply = Reply::from_latch(&mut latch);

    assert_eq!(reply.to_line().as_str(), "13 2245 345600123 456789 21\r\n");
    assert_eq!(Reply::from_latch(&mut latch), Reply::NoFreshSample);
}

#[test]
fn test_widest_reply_fits_line_capacity() {
    let widest = Reply::Sample(TimingSample {
        count: u16::MAX,
        week: u16::MAX,
        tow_ms: u32::MAX,
        tow_sub_ms: u32::MAX,
        acc_est: u32::MAX,
    });

    let line = widest.to_line();

    assert_eq!(
        line.as_str(),
        "65535 65535 4294967295 4294967295 4294967295\r\n"
    );
    assert!(line.len() <= REPLY_LINE_CAPACITY);
}

#[test]
fn test_display_has_no_line_ending() {
    let text = format!("{}", Reply::NoFreshSample);
    assert_eq!(text, NO_FRESH_SAMPLE_LINE);
    assert!(!text.ends_with(LINE_ENDING));
}

#[test]
fn test_parse_sample_line() {
    let reply = Reply::parse("12 2245 345600123 456789 21\r\n").unwrap();
    assert_eq!(reply, Reply::Sample(sample()));
}

#[test]
fn test_parse_no_fresh_sample_line() {
    assert_eq!(Reply::parse("-1 0 0 0 0\r\n").unwrap(), Reply::NoFreshSample);
    assert_eq!(Reply::parse("  -1 0 0 0 0").unwrap(), Reply::NoFreshSample);
}

#[test]
fn test_parse_round_trips_rendered_line() {
    let reply = Reply::Sample(sample());
    assert_eq!(Reply::parse(reply.to_line().as_str()).unwrap(), reply);
}

#[test]
fn test_parse_rejects_malformed_lines() {
    assert_eq!(Reply::parse(""), Err(ParseError::FieldCount(0)));
    assert_eq!(Reply::parse("1 2 3"), Err(ParseError::FieldCount(3)));
    assert_eq!(Reply::parse("1 2 3 4 5 6"), Err(ParseError::FieldCount(6)));
    assert_eq!(Reply::parse("1 2 x 4 5"), Err(ParseError::NotAnInteger));
    assert_eq!(
        Reply::parse("70000 1 1 1 1"),
        Err(ParseError::OutOfRange("count"))
    );
    assert_eq!(
        Reply::parse("1 1 -5 1 1"),
        Err(ParseError::OutOfRange("tow_ms"))
    );
}
