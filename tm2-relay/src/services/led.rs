// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! LED service flashing on every latched time mark.

use crate::{config, peripherals::Peripherals};
use core::cell::Cell;
use embedded_hal::digital::OutputPin;
use tm2_common::service::{Event, Service, ServiceContext};

/// LED state machine
#[derive(Clone, Copy)]
enum LedState {
    Off,
    On { since_us: u64 },
}

/// Service that lights the LED briefly when a sample is latched
pub struct LedFlashService {
    state: Cell<LedState>,
}

impl LedFlashService {
    pub fn new() -> Self {
        Self {
            state: Cell::new(LedState::Off),
        }
    }
}

impl Service<Peripherals> for LedFlashService {
    fn process(&self, ctx: &mut ServiceContext<Peripherals>) {
        let now = ctx.peripherals.now_us();

        if ctx.events.take(Event::SampleLatched) {
            ctx.peripherals.led_pin.set_high().ok();
            self.state.set(LedState::On { since_us: now });
            return;
        }

        if let LedState::On { since_us } = self.state.get() {
            if now - since_us >= config::LED_FLASH_US {
                ctx.peripherals.led_pin.set_low().ok();
                self.state.set(LedState::Off);
            }
        }
    }
}
