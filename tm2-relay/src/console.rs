// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! USB CDC diagnostic console.
//!
//! Human-readable status lines for whoever has the USB port open. Output is
//! dropped while no terminal is attached so the main loop never blocks on it.

use core::cell::UnsafeCell;
use core::fmt;

use rp2040_hal::usb::UsbBus;
use usb_device::class_prelude::UsbBusAllocator;
use usb_device::prelude::*;
use usbd_serial::SerialPort;

use crate::config;

/// Polls spent waiting for room in the endpoint before output is dropped.
const WRITE_RETRIES: u32 = 64;

#[derive(Debug, defmt::Format)]
pub enum ConsoleError {
    StringTooLong,
}

pub struct UsbConsole {
    serial: SerialPort<'static, UsbBus>,
    usb_dev: UsbDevice<'static, UsbBus>,
}

impl UsbConsole {
    pub fn new(usb_bus: &'static UsbBusAllocator<UsbBus>) -> Result<Self, ConsoleError> {
        let serial = SerialPort::new(usb_bus);
        let (vid, pid) = config::USB_VID_PID;
        let usb_dev = UsbDeviceBuilder::new(usb_bus, UsbVidPid(vid, pid))
            .strings(&[StringDescriptors::default()
                .manufacturer(config::USB_MANUFACTURER)
                .product(config::USB_PRODUCT)
                .serial_number(config::USB_SERIAL_NUMBER)])
            .map_err(|_| ConsoleError::StringTooLong)?
            .device_class(usbd_serial::USB_CLASS_CDC)
            .build();

        Ok(Self { serial, usb_dev })
    }

    /// Poll USB device. Must be called frequently.
    pub fn poll(&mut self) -> bool {
        let polled = self.usb_dev.poll(&mut [&mut self.serial]);
        if polled {
            // Nothing is read from the console, discard whatever was typed.
            let mut sink = [0u8; 64];
            while matches!(self.serial.read(&mut sink), Ok(n) if n > 0) {}
        }
        polled
    }

    fn is_attached(&self) -> bool {
        self.usb_dev.state() == UsbDeviceState::Configured && self.serial.dtr()
    }

    /// Write all bytes, polling while the endpoint is busy.
    fn write_all(&mut self, data: &[u8]) {
        if !self.is_attached() {
            return;
        }

        let mut offset = 0;
        let mut retries = 0;
        while offset < data.len() {
            match self.serial.write(&data[offset..]) {
                Ok(n) => offset += n,
                Err(UsbError::WouldBlock) if retries < WRITE_RETRIES => {
                    retries += 1;
                    self.poll();
                }
                Err(_) => break,
            }
        }
    }
}

impl fmt::Write for UsbConsole {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_all(s.as_bytes());
        Ok(())
    }
}

/// Wrapper to hold an Option<UsbConsole> in a static without `static mut`.
///
/// SAFETY: This is only safe in a single-threaded (bare-metal, no OS) environment.
struct SyncConsole(UnsafeCell<Option<UsbConsole>>);
unsafe impl Sync for SyncConsole {}

static CONSOLE: SyncConsole = SyncConsole(UnsafeCell::new(None));

/// Create the console on `usb_bus` (call once at startup)
pub fn init(usb_bus: &'static UsbBusAllocator<UsbBus>) {
    match UsbConsole::new(usb_bus) {
        // SAFETY: Called only once during initialization, single-threaded
        Ok(console) => unsafe { *CONSOLE.0.get() = Some(console) },
        Err(e) => defmt::error!("Failed to initialize USB console: {:?}", e),
    }
}

/// Run `f` on the console, if it was initialized.
pub fn with_console<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&mut UsbConsole) -> R,
{
    // SAFETY: Single-threaded environment, no concurrent access
    unsafe { (*CONSOLE.0.get()).as_mut().map(f) }
}

pub fn poll() {
    with_console(|console| console.poll());
}

/// Write one `\r\n` terminated line to the console.
pub fn write_line(args: fmt::Arguments<'_>) {
    with_console(|console| {
        fmt::Write::write_fmt(console, args).ok();
        fmt::Write::write_str(console, "\r\n").ok();
    });
}

/// Log through defmt and mirror the line on the USB console.
macro_rules! report {
    ($($arg:tt)*) => {{
        defmt::println!($($arg)*);
        $crate::console::write_line(format_args!($($arg)*));
    }};
}

pub(crate) use report;
