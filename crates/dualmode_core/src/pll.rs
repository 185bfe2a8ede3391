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

    pll.rs

    A digital data separator that recovers a bit stream from a floppy drive's
    flux transitions. Each call examines one bit-cell window; a transition in
    the window is a 1 and pulls the window phase toward it, an empty window is
    a 0 and lets the clock free-run.
*/

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{device_traits::FloppyDrive, time::VirtualTime};

// Phase correction applied per detected edge, in percent of the phase error.
const PHASE_GAIN_PCT: i64 = 65;
// Frequency correction base, in percent of the nominal period.
const CLOCK_GAIN_PCT: i64 = 5;
// The period may drift this far from nominal, in percent.
const MAX_ADJUST_PCT: i64 = 25;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FdcPll {
    ctime: VirtualTime,
    period: i64,
    period_adjust_base: i64,
    min_period: i64,
    max_period: i64,
    phase_adjust: i64,
    freq_hist: i32,
}

impl Default for FdcPll {
    fn default() -> Self {
        let mut pll = FdcPll {
            ctime: VirtualTime::ZERO,
            period: 0,
            period_adjust_base: 0,
            min_period: 0,
            max_period: 0,
            phase_adjust: 0,
            freq_hist: 0,
        };
        pll.set_clock(Duration::from_micros(2));
        pll
    }
}

impl FdcPll {
    pub fn new() -> Self {
        Default::default()
    }

    /// Set the nominal cell period. This also resets any frequency correction.
    pub fn set_clock(&mut self, period: Duration) {
        let period = period.as_nanos() as i64;
        self.period = period;
        self.period_adjust_base = period * CLOCK_GAIN_PCT / 100;
        self.min_period = period * (100 - MAX_ADJUST_PCT) / 100;
        self.max_period = period * (100 + MAX_ADJUST_PCT) / 100;
        log::trace!("FdcPll::set_clock(): period: {}ns", period);
    }

    /// Resynchronize the window to start at `when`.
    pub fn read_reset(&mut self, when: VirtualTime) {
        self.ctime = when;
        self.phase_adjust = 0;
        self.freq_hist = 0;
    }

    pub fn period(&self) -> Duration {
        Duration::from_nanos(self.period as u64)
    }

    /// Examine the next bit cell. Returns `None` without consuming the cell if it would end
    /// after `limit`. Otherwise `tm` is set to the end of the cell.
    pub fn next_bit(&mut self, tm: &mut VirtualTime, drive: Option<&dyn FloppyDrive>, limit: VirtualTime) -> Option<bool> {
        let edge = drive.and_then(|d| d.next_transition(self.ctime));
        let next = self.ctime.offset(self.period + self.phase_adjust);

        if next > limit {
            return None;
        }

        self.ctime = next;
        *tm = next;

        let edge = match edge {
            Some(edge) if edge < next => edge,
            _ => {
                // Empty window: free run.
                self.phase_adjust = 0;
                return Some(false);
            }
        };

        let delta = edge.signed_delta(next.offset(-(self.period / 2)));
        self.phase_adjust = delta * PHASE_GAIN_PCT / 100;

        self.freq_hist = match delta {
            d if d < 0 => self.freq_hist.min(0) - 1,
            d if d > 0 => self.freq_hist.max(0) + 1,
            _ => 0,
        };

        if self.freq_hist.abs() > 1 {
            let adjust = self.period_adjust_base * delta / self.period;
            self.period = (self.period + adjust).clamp(self.min_period, self.max_period);
        }

        Some(true)
    }
}
