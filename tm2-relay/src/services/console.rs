// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Keeps the USB diagnostic console enumerated.

use crate::{console, peripherals::Peripherals};
use tm2_common::service::{Service, ServiceContext};

pub struct ConsoleService;

impl ConsoleService {
    pub fn new() -> Self {
        Self
    }
}

impl Service<Peripherals> for ConsoleService {
    fn process(&self, _ctx: &mut ServiceContext<Peripherals>) {
        console::poll();
    }
}
