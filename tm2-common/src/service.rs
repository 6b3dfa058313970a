// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Generic service system for the relay main loop.

use core::cell::RefCell;
use heapless::Vec;

/// Events that can be sent between services
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// A time mark was latched
    SampleLatched,
    /// The host asked for a sample and none was fresh
    ReportSatellites,
}

const EVENT_CAPACITY: usize = 8;

/// Event bus for inter-service communication
pub struct EventBus {
    events: RefCell<Vec<Event, EVENT_CAPACITY>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub const fn new() -> Self {
        Self {
            events: RefCell::new(Vec::new()),
        }
    }

    /// Publish an event to the bus. Returns `false` if the bus was full.
    pub fn publish(&self, event: Event) -> bool {
        let pushed = self.events.borrow_mut().push(event).is_ok();
        if !pushed {
            #[cfg(feature = "defmt")]
            defmt::warn!("Event bus full, dropping event: {:?}", event);
        }
        pushed
    }

    /// Consume events matching a filter
    pub fn consume<F>(&self, mut filter: F)
    where
        F: FnMut(&Event) -> bool,
    {
        self.events.borrow_mut().retain(|e| !filter(e));
    }

    /// Consume every `event`, returning whether there was at least one.
    pub fn take(&self, event: Event) -> bool {
        let mut found = false;
        self.consume(|e| {
            let hit = *e == event;
            found |= hit;
            hit
        });
        found
    }
}

/// Shared context passed to all services
pub struct ServiceContext<'a, P> {
    pub peripherals: &'a mut P,
    pub events: &'a EventBus,
}

/// Trait for services that run in the main loop
pub trait Service<P> {
    /// Process this service's logic
    /// Uses interior mutability (Cell/RefCell) for state changes
    fn process(&self, ctx: &mut ServiceContext<P>);
}
