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

    time.rs

    Virtual time for event-driven devices. All timing is kept in integer
    nanoseconds so that derived periods (sector ticks, bit cells) never drift.
*/

use std::{
    fmt::{Display, Formatter},
    ops::{Add, AddAssign, Sub},
    time::Duration,
};

use serde::{Deserialize, Serialize};

/// An instant on the emulated timeline, in nanoseconds since power-on.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VirtualTime(u64);

impl VirtualTime {
    pub const ZERO: VirtualTime = VirtualTime(0);
    /// An instant that is never reached. Used as an unbounded limit.
    pub const NEVER: VirtualTime = VirtualTime(u64::MAX);

    pub const fn from_nanos(ns: u64) -> Self {
        VirtualTime(ns)
    }

    pub const fn from_micros(us: u64) -> Self {
        VirtualTime(us * 1_000)
    }

    pub const fn from_millis(ms: u64) -> Self {
        VirtualTime(ms * 1_000_000)
    }

    pub const fn as_nanos(&self) -> u64 {
        self.0
    }

    pub fn is_never(&self) -> bool {
        self.0 == u64::MAX
    }

    /// Time elapsed since `earlier`, or zero if `earlier` is in the future.
    pub fn saturating_since(&self, earlier: VirtualTime) -> Duration {
        Duration::from_nanos(self.0.saturating_sub(earlier.0))
    }

    /// Signed distance from `other` to `self`, in nanoseconds.
    pub fn signed_delta(&self, other: VirtualTime) -> i64 {
        (self.0 as i128 - other.0 as i128) as i64
    }

    /// Offset this instant by a signed number of nanoseconds, clamping at zero.
    pub fn offset(&self, ns: i64) -> VirtualTime {
        if ns < 0 {
            VirtualTime(self.0.saturating_sub(ns.unsigned_abs()))
        }
        else {
            VirtualTime(self.0.saturating_add(ns as u64))
        }
    }
}

impl Add<Duration> for VirtualTime {
    type Output = VirtualTime;

    fn add(self, rhs: Duration) -> Self::Output {
        if self.is_never() {
            return self;
        }
        VirtualTime(self.0.saturating_add(rhs.as_nanos() as u64))
    }
}

impl AddAssign<Duration> for VirtualTime {
    fn add_assign(&mut self, rhs: Duration) {
        *self = *self + rhs;
    }
}

impl Sub<Duration> for VirtualTime {
    type Output = VirtualTime;

    fn sub(self, rhs: Duration) -> Self::Output {
        VirtualTime(self.0.saturating_sub(rhs.as_nanos() as u64))
    }
}

impl Sub<VirtualTime> for VirtualTime {
    type Output = Duration;

    fn sub(self, rhs: VirtualTime) -> Self::Output {
        self.saturating_since(rhs)
    }
}

impl Display for VirtualTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_never() {
            write!(f, "never")
        }
        else {
            write!(f, "{:.3}µs", self.0 as f64 / 1_000.0)
        }
    }
}
