/*
    MartyPC
    https://github.com/dbalsom/martypc

    Copyright 2022-2025 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    timer.rs

    Timer scheduling for event-driven devices. A device owns a small fixed set
    of timers, each of which is either idle, armed for a single expiry, or
    armed periodically. The owning device drains expiries in time order.
*/

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::time::VirtualTime;

/// The timers owned by the dual-mode controller. Declaration order is the
/// tie-break order for timers expiring at the same instant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, Serialize, Deserialize)]
pub enum TimerId {
    /// Motor-on monostable.
    MotorOff,
    /// Hard disk sector PLL.
    Sector,
    /// Byte transfer clock.
    Byte,
}

pub const TIMER_CT: usize = 3;

impl TimerId {
    fn index(&self) -> usize {
        match self {
            TimerId::MotorOff => 0,
            TimerId::Sector => 1,
            TimerId::Byte => 2,
        }
    }
}

/// Scheduling services a device needs from its host.
pub trait Scheduler {
    /// The current instant on the emulated timeline.
    fn now(&self) -> VirtualTime;
    /// Arm `timer` to expire once, `delay` from now. Re-arming replaces any previous expiry.
    fn schedule_once(&mut self, timer: TimerId, delay: Duration);
    /// Arm `timer` to expire `delay` from now and every `period` after that.
    fn schedule_periodic(&mut self, timer: TimerId, delay: Duration, period: Duration);
    fn cancel(&mut self, timer: TimerId);
    fn enabled(&self, timer: TimerId) -> bool;
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceTimer {
    pub deadline: Option<VirtualTime>,
    pub period: Option<Duration>,
}

impl DeviceTimer {
    pub fn enabled(&self) -> bool {
        self.deadline.is_some()
    }

    fn arm(&mut self, at: VirtualTime, period: Option<Duration>) {
        self.deadline = Some(at);
        self.period = period.filter(|p| !p.is_zero());
    }

    fn disarm(&mut self) {
        self.deadline = None;
        self.period = None;
    }

    /// Consume an expiry. A periodic timer advances to its next deadline before the
    /// callback runs, so a cancel issued by the callback takes effect.
    fn expire(&mut self) {
        match (self.deadline, self.period) {
            (Some(deadline), Some(period)) => self.deadline = Some(deadline + period),
            _ => self.disarm(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceScheduler {
    now: VirtualTime,
    timers: [DeviceTimer; TIMER_CT],
}

impl DeviceScheduler {
    pub fn new() -> Self {
        Default::default()
    }

    /// Advance the clock. Time never runs backwards.
    pub fn set_now(&mut self, now: VirtualTime) {
        if now > self.now {
            self.now = now;
        }
    }

    pub fn timer(&self, timer: TimerId) -> &DeviceTimer {
        &self.timers[timer.index()]
    }

    /// Return the earliest armed timer expiring at or before `limit`. Ties go to the
    /// timer declared first in [TimerId].
    pub fn next_expiry(&self, limit: VirtualTime) -> Option<(VirtualTime, TimerId)> {
        TimerId::iter()
            .filter_map(|id| self.timers[id.index()].deadline.map(|t| (t, id)))
            .filter(|(t, _)| *t <= limit)
            .min()
    }

    /// Mark an expiry of `timer` as delivered.
    pub fn expire(&mut self, timer: TimerId) {
        self.timers[timer.index()].expire();
    }
}

impl Scheduler for DeviceScheduler {
    fn now(&self) -> VirtualTime {
        self.now
    }

    fn schedule_once(&mut self, timer: TimerId, delay: Duration) {
        let at = self.now + delay;
        self.timers[timer.index()].arm(at, None);
    }

    fn schedule_periodic(&mut self, timer: TimerId, delay: Duration, period: Duration) {
        let at = self.now + delay;
        self.timers[timer.index()].arm(at, Some(period));
    }

    fn cancel(&mut self, timer: TimerId) {
        self.timers[timer.index()].disarm();
    }

    fn enabled(&self, timer: TimerId) -> bool {
        self.timers[timer.index()].enabled()
    }
}
