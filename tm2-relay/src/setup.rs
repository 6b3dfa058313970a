// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! One-time receiver configuration.

use rp2040_hal::Timer;
use tm2_common::{Gnss, GnssError};

use crate::{
    config, console,
    console::report,
    peripherals::{GnssI2c, Peripherals},
};

type BringUpStep = fn(&mut Gnss<GnssI2c>, &mut Timer) -> Result<(), GnssError>;

/// Receiver settings applied after detection. Failures are logged, not fatal.
const BRING_UP: [(&str, BringUpStep); 4] = [
    ("I2C output UBX only", |gnss, timer| gnss.set_i2c_output_ubx(timer)),
    ("save port config", |gnss, timer| gnss.save_config_ioport(timer)),
    ("navigation rate", |gnss, timer| {
        gnss.set_navigation_frequency(config::NAVIGATION_RATE_HZ, timer)
    }),
    ("auto TIM-TM2", |gnss, timer| gnss.enable_auto_tim_tm2(timer)),
];

/// Detect and configure the receiver. Never returns if it is missing.
pub fn configure_gnss(p: &mut Peripherals) {
    if let Err(e) = p.gnss.begin(&mut p.timer) {
        defmt::error!("GNSS: begin failed: {}", e);
        report!("u-blox GNSS not detected at default I2C address. Please check wiring. Freezing.");
        freeze(p);
    }
    p.watchdog.feed();

    for (name, step) in BRING_UP {
        match step(&mut p.gnss, &mut p.timer) {
            Ok(()) => defmt::debug!("GNSS: {} ok", name),
            Err(e) => defmt::warn!("GNSS: {} failed: {}", name, e),
        }
    }
    p.watchdog.feed();

    report!("Setup complete");
}

/// Report the init error forever.
///
/// The watchdog is not fed here, so the chip resets once it expires.
fn freeze(p: &mut Peripherals) -> ! {
    let mut last_report = p.now_us();
    loop {
        console::poll();
        let now = p.now_us();
        if now - last_report >= config::FREEZE_REPORT_US {
            report!("u-blox GNSS init error");
            last_report = now;
        }
        cortex_m::asm::nop();
    }
}
