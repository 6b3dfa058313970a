// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! The relay's single latest-sample slot.
//!
//! Written from the GNSS callback, read by the host link. Access goes through
//! a critical section so the writer may also run from interrupt context.

use core::cell::RefCell;

use critical_section::Mutex;
use tm2_common::service::EventBus;
use tm2_common::{Reply, Request, SampleLatch, TimingSample};

static LATCH: Mutex<RefCell<SampleLatch>> = Mutex::new(RefCell::new(SampleLatch::new()));

/// Overwrite the slot with `sample` and mark it unread.
pub fn store(sample: TimingSample) {
    critical_section::with(|cs| LATCH.borrow_ref_mut(cs).latch(sample));
}

/// Answer a host request, consuming the unread flag.
pub fn answer(request: Request, events: &EventBus) -> Reply {
    critical_section::with(|cs| request.answer(&mut LATCH.borrow_ref_mut(cs), events))
}

/// Number of samples latched since boot, and the last one handed out or not.
pub fn summary() -> (u32, Option<TimingSample>) {
    critical_section::with(|cs| {
        let latch = LATCH.borrow_ref(cs);
        (latch.latched_total(), latch.latest())
    })
}
