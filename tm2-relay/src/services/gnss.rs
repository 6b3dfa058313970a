// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! GNSS service: drains the receiver and latches time marks.

use crate::{console::report, latch, peripherals::Peripherals};
use core::cell::Cell;
use tm2_common::service::{Event, Service, ServiceContext};
use tm2_common::TimingSample;

/// Service pumping receiver output and forwarding TIM-TM2 to the latch
pub struct GnssService {
    bus_errors: Cell<u32>,
}

impl GnssService {
    pub fn new() -> Self {
        Self {
            bus_errors: Cell::new(0),
        }
    }

    fn pump(&self, p: &mut Peripherals) -> bool {
        if let Err(e) = p.gnss.check_ublox() {
            self.bus_errors.set(self.bus_errors.get().wrapping_add(1));
            defmt::warn!(
                "GNSS: read failed ({} so far, {} bad checksums, {} bad lengths): {}",
                self.bus_errors.get(),
                p.gnss.checksum_errors(),
                p.gnss.length_errors(),
                e
            );
        }

        p.gnss.check_callbacks(|tm2| {
            if !tm2.new_rising_edge() {
                defmt::debug!("GNSS: TIM-TM2 without a new rising edge");
            }
            let sample = TimingSample::from(tm2);
            defmt::trace!("GNSS: latched {}", sample);
            latch::store(sample);
        })
    }

    fn report_satellites(p: &mut Peripherals) {
        match p.gnss.poll_satellites(&mut p.timer) {
            Ok(siv) => report!("SIV: {}", siv),
            Err(e) => defmt::warn!("GNSS: satellite poll failed: {}", e),
        }
    }
}

impl Service<Peripherals> for GnssService {
    fn process(&self, ctx: &mut ServiceContext<Peripherals>) {
        if self.pump(ctx.peripherals) {
            ctx.events.publish(Event::SampleLatched);
        }

        if ctx.events.take(Event::ReportSatellites) {
            Self::report_satellites(ctx.peripherals);
        }
    }
}
