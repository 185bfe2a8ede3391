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

    devices::dualmode::sector.rs

    Sector timing. Floppies are hard-sectored, so every hole in the diskette
    produces a sector pulse; a retriggerable one-shot swallows the index hole
    that sits between the last sector hole and the first. The hard disk only
    produces one index pulse per revolution, which the board multiplies by 32
    with a PLL to synthesize sector pulses.

    Once a started operation reaches its target sector, the read sync search
    or the first write byte is kicked off from here.
*/

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    devices::dualmode::{
        state::{ControllerPhase, ECC_OFFSET},
        DualModeController,
        FDD_HALF_BITCELL,
        HDD_HALF_BITCELL,
    },
    mfm::{MFM_SYNC_EDGE, MFM_SYNC_WORD},
    time::VirtualTime,
    timer::{Scheduler, TimerId},
};

pub const FDD_SECTOR_MASK: u8 = 0x0F;
pub const HDD_SECTOR_MASK: u8 = 0x1F;
pub const HDD_SECTORS: u32 = 32;

/// 61.9KΩ * 0.22µF * 0.75 (74LS221)
pub const FDD_SECTOR_DEBOUNCE: Duration = Duration::from_nanos(10_213_500);

/// Half bit cells between the hard disk sector pulse and the start of the sync search.
pub const HDD_SYNC_DELAY_CELLS: u32 = 256;
/// Half bit cells the floppy data separator is given to lock on before the sync search.
pub const FDD_PLL_LOCK_CELLS: u32 = 512;
/// Length of the sync search window, in bytes.
pub const SYNC_WINDOW_BYTES: u32 = 30;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorClock {
    pub counter: u8,
    pub last_sector_pulse: VirtualTime,
    pub last_index_pulse: VirtualTime,
    pub sector_period: Duration,
}

impl SectorClock {
    /// Advance the sector counter, wrapping at the sector count of the selected drive kind.
    pub fn advance(&mut self, hdd: bool) -> u8 {
        let mask = if hdd { HDD_SECTOR_MASK } else { FDD_SECTOR_MASK };
        self.counter = self.counter.wrapping_add(1) & mask;
        self.counter
    }

    /// Register a floppy sector pulse at `now`. Returns false if the pulse fell inside the
    /// debounce window, in which case the counter is parked on the last sector instead.
    pub fn floppy_pulse(&mut self, now: VirtualTime) -> bool {
        if now - self.last_sector_pulse < FDD_SECTOR_DEBOUNCE {
            self.counter = FDD_SECTOR_MASK;
            false
        }
        else {
            self.last_sector_pulse = now;
            true
        }
    }

    /// Register a hard disk index pulse at `now` and return the sector period measured
    /// over the last revolution.
    pub fn hard_disk_index(&mut self, now: VirtualTime) -> Duration {
        self.counter = HDD_SECTOR_MASK;
        self.sector_period = (now - self.last_index_pulse) / HDD_SECTORS;
        self.last_index_pulse = now;
        self.sector_period
    }
}

impl DualModeController {
    pub(super) fn floppy_index(&mut self, slot: usize) {
        if self.hdd_selected() || slot != self.state.command.drive as usize {
            return;
        }
        let now = self.now();
        if self.state.clock.floppy_pulse(now) {
            log::trace!("Floppy {} sector pulse at {}", slot, now);
            self.sector_tick();
        }
        else {
            log::trace!("Floppy {} index pulse at {}", slot, now);
        }
    }

    pub(super) fn hard_disk_index(&mut self) {
        if !self.hdd_selected() {
            return;
        }
        let now = self.now();
        let period = self.state.clock.hard_disk_index(now);
        log::trace!("HDD index pulse at {}, sector period {:?}", now, period);
        if period.is_zero() {
            self.state.timers.cancel(TimerId::Sector);
        }
        else {
            self.state.timers.schedule_periodic(TimerId::Sector, period, period);
        }
        self.sector_tick();
    }

    /// Handle a sector pulse, real or synthesized.
    pub(super) fn sector_tick(&mut self) {
        let hdd = self.hdd_selected();
        let counter = self.state.clock.advance(hdd);
        if hdd && counter == HDD_SECTOR_MASK {
            // Wait for the index pulse to resynchronize.
            self.state.timers.cancel(TimerId::Sector);
        }
        if !self.state.busy() {
            return;
        }

        if self.state.phase == ControllerPhase::Transferring {
            // A full sector has passed since the transfer began.
            self.complete_operation();
            return;
        }

        if counter == self.state.command.target_sector {
            self.begin_operation();
        }
    }

    fn complete_operation(&mut self) {
        self.state.timers.cancel(TimerId::Byte);
        self.state.phase = ControllerPhase::SpinningUp;
        if self.state.command.read {
            // ECC is not implemented; every read reports a clean ECC field, with or
            // without the ECC request bit.
            self.state.ram[ECC_OFFSET] = 0;
        }
        log::debug!(
            "Operation complete: sector {} cmar: {:03X}",
            self.state.clock.counter,
            self.state.cmar
        );
    }

    fn begin_operation(&mut self) {
        log::debug!(
            "Sector {} reached: starting {} on drive {}",
            self.state.command.target_sector,
            if self.state.command.read { "read" } else { "write" },
            self.state.command.drive
        );
        self.state.transfer.reset();

        if !self.state.command.read {
            self.state.phase = ControllerPhase::Transferring;
            self.state.timers.schedule_once(TimerId::Byte, Duration::ZERO);
            return;
        }

        let found = if self.hdd_selected() {
            self.sync_hard_disk()
        }
        else {
            self.sync_floppy()
        };

        match found {
            Some(tm) => {
                let delay = tm - self.now();
                self.state.phase = ControllerPhase::Transferring;
                self.state.timers.schedule_once(TimerId::Byte, delay);
            }
            None => {
                // The operation stays armed; the next pass over the sector retries.
                log::warn!(
                    "Sync not found on drive {} sector {}",
                    self.state.command.drive,
                    self.state.command.target_sector
                );
            }
        }
    }

    /// Search for the sync word on the hard disk. Returns the time the sync word ends.
    fn sync_hard_disk(&mut self) -> Option<VirtualTime> {
        let hdd = self.hdd.as_mut()?;
        let mut tm = self.state.timers.now() + HDD_HALF_BITCELL * HDD_SYNC_DELAY_CELLS;
        let limit = tm + HDD_HALF_BITCELL * (16 * SYNC_WINDOW_BYTES);

        while self.state.transfer.pending_byte != MFM_SYNC_WORD {
            self.state.transfer.pending_byte = hdd.read(&mut tm, limit)?;
        }
        self.state.transfer.pending_size = 16;
        Some(tm)
    }

    /// Lock the data separator onto the floppy preamble, then search for the edge into the
    /// sync byte. Returns the time the first bit of the sync byte was recovered.
    fn sync_floppy(&mut self) -> Option<VirtualTime> {
        let now = self.now();
        self.state.pll.set_clock(FDD_HALF_BITCELL);
        self.state.pll.read_reset(now);

        let mut tm = now;
        let mut limit = now + FDD_HALF_BITCELL * FDD_PLL_LOCK_CELLS;
        while self.next_bit(&mut tm, limit) {}

        limit += FDD_HALF_BITCELL * (16 * SYNC_WINDOW_BYTES);
        while self.state.transfer.pending_byte != MFM_SYNC_EDGE {
            if !self.next_bit(&mut tm, limit) {
                return None;
            }
        }
        // The last bit shifted in is the first cell of the sync byte.
        self.state.transfer.pending_size = 1;
        Some(tm)
    }
}
