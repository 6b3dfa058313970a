// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Service implementations for the relay main loop.

pub mod console;
pub mod gnss;
pub mod host;
pub mod led;
pub mod watchdog;

pub use console::ConsoleService;
pub use gnss::GnssService;
pub use host::HostLinkService;
pub use led::LedFlashService;
pub use watchdog::WatchdogService;
