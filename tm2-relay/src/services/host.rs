// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Host link service answering sample requests.

use crate::{latch, peripherals::Peripherals};
use tm2_common::service::{Service, ServiceContext};
use tm2_common::Reply;

/// Service that answers one host request per pass
pub struct HostLinkService;

impl HostLinkService {
    pub fn new() -> Self {
        Self
    }
}

impl Service<Peripherals> for HostLinkService {
    fn process(&self, ctx: &mut ServiceContext<Peripherals>) {
        let Some(request) = ctx.peripherals.host.poll_request() else {
            return;
        };

        let reply = latch::answer(request, ctx.events);
        ctx.peripherals.host.send(&reply);

        match reply {
            Reply::Sample(sample) => {
                defmt::debug!("Host: sent sample {}", sample.count);
            }
            Reply::NoFreshSample => {
                let (total, last) = latch::summary();
                defmt::debug!(
                    "Host: nothing fresh ({} latched, last count {}, {} stray bytes)",
                    total,
                    last.map(|s| s.count),
                    ctx.peripherals.host.ignored_bytes()
                );
            }
        }
    }
}
