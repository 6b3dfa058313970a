// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command implementations for the relay.

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use tm2_common::{Reply, TimingSample};

use crate::gps_time;
use crate::transport::Transport;

/// Request the latest time mark once and show what came back.
pub fn once(transport: &mut Transport, leap_seconds: i64) -> Result<()> {
    let (line, reply) = transport.request()?;

    println!("Port:  {}", transport.port_name());
    println!("Reply: {}", line);

    match reply {
        Reply::Sample(sample) => {
            println!("  Count:      {}", sample.count);
            println!("  Week:       {}", sample.week);
            println!("  TOW:        {} ms + {} ns", sample.tow_ms, sample.tow_sub_ms);
            println!("  Accuracy:   {} ns", sample.acc_est);
            println!("  UTC:        {}", utc_text(&sample, leap_seconds)?);
        }
        Reply::NoFreshSample => {
            println!("  No time mark latched since the last request");
        }
    }

    Ok(())
}

/// Request time marks every `interval` and print each fresh one.
///
/// Runs until `samples` marks have been printed, or forever when `None`.
pub fn poll(
    transport: &mut Transport,
    interval: Duration,
    samples: Option<u64>,
    leap_seconds: i64,
) -> Result<()> {
    eprintln!(
        "Polling {} every {} ms",
        transport.port_name(),
        interval.as_millis()
    );

    let mut printed = 0u64;
    while samples.map_or(true, |limit| printed < limit) {
        if let (_, Reply::Sample(sample)) = transport.request()? {
            println!("L1 @ {}", utc_text(&sample, leap_seconds)?);
            printed += 1;
        }
        thread::sleep(interval);
    }

    Ok(())
}

fn utc_text(sample: &TimingSample, leap_seconds: i64) -> Result<String> {
    let utc = gps_time::to_utc(sample, leap_seconds)
        .with_context(|| format!("Week {} is outside the representable range", sample.week))?;
    Ok(gps_time::format_utc(&utc))
}
