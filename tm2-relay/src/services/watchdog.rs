// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

use crate::peripherals::Peripherals;
use tm2_common::service::{Service, ServiceContext};

/// Feeds the watchdog once per pass of the main loop.
///
/// Runs last, so a service that hangs starves the watchdog and resets the chip.
pub struct WatchdogService;

impl WatchdogService {
    pub fn new() -> Self {
        Self
    }
}

impl Service<Peripherals> for WatchdogService {
    fn process(&self, ctx: &mut ServiceContext<Peripherals>) {
        ctx.peripherals.watchdog.feed();
    }
}
