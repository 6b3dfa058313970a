// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! UART link to the host controller.

use tm2_common::{Reply, Request};

use crate::peripherals::HostUart;

pub struct HostLink {
    uart: HostUart,
    ignored_bytes: u32,
}

impl HostLink {
    pub fn new(uart: HostUart) -> Self {
        Self {
            uart,
            ignored_bytes: 0,
        }
    }

    /// Return the next request waiting in the receive FIFO.
    ///
    /// Bytes that are not requests are discarded.
    pub fn poll_request(&mut self) -> Option<Request> {
        let mut byte = [0u8; 1];
        while self.uart.uart_is_readable() {
            match self.uart.read_raw(&mut byte) {
                Ok(1) => match Request::from_byte(byte[0]) {
                    Some(request) => return Some(request),
                    None => self.ignored_bytes = self.ignored_bytes.wrapping_add(1),
                },
                Ok(_) => break,
                Err(_) => defmt::warn!("Host link: receive error"),
            }
        }
        None
    }

    pub fn send(&mut self, reply: &Reply) {
        self.uart.write_full_blocking(reply.to_line().as_bytes());
    }

    /// Non-request bytes received since boot.
    pub fn ignored_bytes(&self) -> u32 {
        self.ignored_bytes
    }
}
