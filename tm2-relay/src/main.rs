// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Relays u-blox TIM-TM2 time marks to a host controller.
//!
//! The receiver latches its clock on an external edge and reports it as
//! TIM-TM2 over I2C. The latest mark is kept in a single slot and handed out
//! once to the host when it sends `G` over UART0.

#![no_std]
#![no_main]

mod config;
mod console;
mod host_link;
mod latch;
mod peripherals;
mod services;
mod setup;

use defmt_rtt as _;
use panic_probe as _;

defmt::timestamp!("{=u64:us}", { 0 });

use cortex_m_rt::entry;
use peripherals::Peripherals;
use services::{ConsoleService, GnssService, HostLinkService, LedFlashService, WatchdogService};
use tm2_common::service::{EventBus, Service, ServiceContext};

#[unsafe(link_section = ".boot2")]
#[used]
pub static BOOT2_FIRMWARE: [u8; 256] = rp2040_boot2::BOOT_LOADER_GENERIC_03H;

#[entry]
fn main() -> ! {
    defmt::println!("TM2 relay init");

    let Some(mut p) = Peripherals::take() else {
        defmt::panic!("Board bring-up failed");
    };

    if let Some(usb_bus) = peripherals::usb_bus_ref() {
        console::init(usb_bus);
    }

    tm2_common::blink(
        &mut p.led_pin,
        &mut p.timer,
        config::BOOT_BLINKS,
        config::BOOT_BLINK_PERIOD_MS,
    );
    p.watchdog.feed();

    setup::configure_gnss(&mut p);

    let gnss = GnssService::new();
    let host = HostLinkService::new();
    let console = ConsoleService::new();
    let led = LedFlashService::new();
    let watchdog = WatchdogService::new();
    let services: [&dyn Service<Peripherals>; 5] = [&gnss, &host, &console, &led, &watchdog];

    let events = EventBus::new();
    loop {
        let mut ctx = ServiceContext {
            peripherals: &mut p,
            events: &events,
        };
        for service in services {
            service.process(&mut ctx);
        }
    }
}
