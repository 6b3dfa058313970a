// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Board wiring and timing constants. Nothing here changes at runtime.

/// Crystal on the Pico board.
pub const XTAL_FREQ_HZ: u32 = 12_000_000;

/// Longest the main loop may stall before the chip resets.
///
/// The RP2040 watchdog counter tops out a little above 8.3 s.
pub const WATCHDOG_TIMEOUT_US: u32 = 8_000_000;

/// I2C0 (GP4 = SDA, GP5 = SCL) clock for the receiver.
pub const GNSS_I2C_FREQ_KHZ: u32 = 400;

/// Navigation solutions per second requested from the receiver.
pub const NAVIGATION_RATE_HZ: u8 = 1;

/// Interval between "init error" reports while frozen.
pub const FREEZE_REPORT_US: u64 = 500_000;

/// How long the LED stays on after a time mark is latched.
pub const LED_FLASH_US: u64 = 50_000;

/// Blinks shown at power-on.
pub const BOOT_BLINKS: u32 = 3;
pub const BOOT_BLINK_PERIOD_MS: u32 = 100;

/// USB identity of the diagnostic console.
pub const USB_VID_PID: (u16, u16) = (0x2E8A, 0x000A);
pub const USB_MANUFACTURER: &str = "ADNT";
pub const USB_PRODUCT: &str = "TM2 Relay";
pub const USB_SERIAL_NUMBER: &str = "0001";
