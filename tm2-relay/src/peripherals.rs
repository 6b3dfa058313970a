// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Board bring-up and the hardware handles shared by the services.

use core::cell::UnsafeCell;

use rp2040_hal::{
    self as hal,
    clocks::init_clocks_and_plls,
    fugit::{ExtU32, RateExtU32},
    gpio::{
        bank0::{Gpio0, Gpio1, Gpio25, Gpio4, Gpio5},
        FunctionI2C, FunctionSioOutput, FunctionUart, Pin, PullDown, PullUp,
    },
    pac,
    uart::{DataBits, Enabled, StopBits, UartConfig, UartPeripheral},
    usb::UsbBus,
    Clock, Sio, Timer, Watchdog, I2C,
};
use tm2_common::{Gnss, GNSS_I2C_ADDRESS, HOST_BAUD_RATE};
use usb_device::class_prelude::UsbBusAllocator;

use crate::config;
use crate::host_link::HostLink;

pub type LedPin = Pin<Gpio25, FunctionSioOutput, PullDown>;

type GnssSda = Pin<Gpio4, FunctionI2C, PullUp>;
type GnssScl = Pin<Gpio5, FunctionI2C, PullUp>;
pub type GnssI2c = I2C<pac::I2C0, (GnssSda, GnssScl)>;

type HostTx = Pin<Gpio0, FunctionUart, PullDown>;
type HostRx = Pin<Gpio1, FunctionUart, PullDown>;
pub type HostUart = UartPeripheral<Enabled, pac::UART0, (HostTx, HostRx)>;

pub struct Peripherals {
    pub timer: Timer,
    pub watchdog: Watchdog,
    pub led_pin: LedPin,
    pub gnss: Gnss<GnssI2c>,
    pub host: HostLink,
}

impl Peripherals {
    /// Bring up clocks, the watchdog and every peripheral the relay uses.
    ///
    /// The watchdog is running when this returns. Returns `None` if the
    /// peripherals were already taken or the clocks failed to start.
    pub fn take() -> Option<Self> {
        let mut pac = pac::Peripherals::take()?;
        let mut watchdog = Watchdog::new(pac.WATCHDOG);

        let clocks = init_clocks_and_plls(
            config::XTAL_FREQ_HZ,
            pac.XOSC,
            pac.CLOCKS,
            pac.PLL_SYS,
            pac.PLL_USB,
            &mut pac.RESETS,
            &mut watchdog,
        )
        .ok()?;

        watchdog.pause_on_debug(true);
        watchdog.start(config::WATCHDOG_TIMEOUT_US.micros());

        let timer = Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);

        let sio = Sio::new(pac.SIO);
        let pins = hal::gpio::Pins::new(
            pac.IO_BANK0,
            pac.PADS_BANK0,
            sio.gpio_bank0,
            &mut pac.RESETS,
        );

        let led_pin = pins.gpio25.into_push_pull_output();

        let host_pins = (
            pins.gpio0.into_function::<FunctionUart>(),
            pins.gpio1.into_function::<FunctionUart>(),
        );
        let host_uart = UartPeripheral::new(pac.UART0, host_pins, &mut pac.RESETS)
            .enable(
                UartConfig::new(HOST_BAUD_RATE.Hz(), DataBits::Eight, None, StopBits::One),
                clocks.peripheral_clock.freq(),
            )
            .ok()?;

        let sda: GnssSda = pins.gpio4.reconfigure();
        let scl: GnssScl = pins.gpio5.reconfigure();
        let i2c = I2C::i2c0(
            pac.I2C0,
            sda,
            scl,
            config::GNSS_I2C_FREQ_KHZ.kHz(),
            &mut pac.RESETS,
            &clocks.system_clock,
        );

        store_usb_bus(UsbBusAllocator::new(UsbBus::new(
            pac.USBCTRL_REGS,
            pac.USBCTRL_DPRAM,
            clocks.usb_clock,
            true,
            &mut pac.RESETS,
        )));

        Some(Self {
            timer,
            watchdog,
            led_pin,
            gnss: Gnss::new(i2c, GNSS_I2C_ADDRESS),
            host: HostLink::new(host_uart),
        })
    }

    /// Microseconds since boot.
    pub fn now_us(&self) -> u64 {
        self.timer.get_counter().ticks()
    }
}

/// Wrapper to hold the USB bus allocator in a static without `static mut`.
///
/// SAFETY: This is only safe in a single-threaded (bare-metal, no OS) environment.
/// Written once during bring-up, only shared references are handed out afterwards.
struct SyncUsbBus(UnsafeCell<Option<UsbBusAllocator<UsbBus>>>);
unsafe impl Sync for SyncUsbBus {}

static USB_BUS: SyncUsbBus = SyncUsbBus(UnsafeCell::new(None));

fn store_usb_bus(bus: UsbBusAllocator<UsbBus>) {
    // SAFETY: Called once during bring-up, before any reference is handed out
    unsafe {
        *USB_BUS.0.get() = Some(bus);
    }
}

/// The USB bus allocator, once bring-up has stored it.
pub fn usb_bus_ref() -> Option<&'static UsbBusAllocator<UsbBus>> {
    // SAFETY: Never written again after bring-up
    unsafe { (*USB_BUS.0.get()).as_ref() }
}
