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

    devices::dualmode::transfer.rs

    The byte engine. While an operation is transferring, the byte timer fires
    once per MFM byte: on reads when 16 cells have been recovered from the
    media, on writes every 16 half bit cells as the previous byte finishes
    going out to the drive.
*/

use serde::{Deserialize, Serialize};

use crate::{
    devices::dualmode::DualModeController,
    mfm,
    time::VirtualTime,
    timer::{Scheduler, TimerId},
};

/// MFM cells in flight between the media and the staging RAM.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferCursor {
    pub pending_byte: u16,
    pub pending_size: u8,
}

impl TransferCursor {
    pub fn reset(&mut self) {
        *self = Default::default();
    }

    pub fn push_bit(&mut self, bit: bool) {
        self.pending_byte = (self.pending_byte << 1) | bit as u16;
        self.pending_size = self.pending_size.saturating_add(1);
    }

    pub fn full(&self) -> bool {
        self.pending_size >= 16
    }
}

impl DualModeController {
    /// Recover one cell from the selected floppy into the transfer cursor. Returns false
    /// if no cell could be completed before `limit`.
    pub(super) fn next_bit(&mut self, tm: &mut VirtualTime, limit: VirtualTime) -> bool {
        let drive = self.floppies[self.state.command.drive as usize].as_deref();
        match self.state.pll.next_bit(tm, drive, limit) {
            Some(bit) => {
                self.state.transfer.push_bit(bit);
                true
            }
            None => false,
        }
    }

    pub(super) fn byte_tick(&mut self) {
        if self.state.command.read {
            self.read_byte();
        }
        else {
            self.write_byte();
        }
    }

    fn read_byte(&mut self) {
        if self.state.transfer.full() {
            let byte = mfm::decode(self.state.transfer.pending_byte);
            self.state.transfer.pending_size = 0;
            self.state.store_byte(byte);
        }

        let now = self.now();
        let mut tm = now;
        if self.hdd_selected() {
            if let Some(hdd) = self.hdd.as_mut() {
                if let Some(word) = hdd.read(&mut tm, VirtualTime::NEVER) {
                    self.state.transfer.pending_byte = word;
                    self.state.transfer.pending_size = 16;
                }
            }
        }
        else {
            while !self.state.transfer.full() && self.next_bit(&mut tm, VirtualTime::NEVER) {}
        }

        let delay = if tm > now { tm - now } else { self.half_bitcell() };
        self.state.timers.schedule_once(TimerId::Byte, delay);
    }

    fn write_byte(&mut self) {
        let now = self.now();
        let half = self.half_bitcell();

        if self.state.transfer.full() {
            let word = self.state.transfer.pending_byte;
            let start = now - half * 16;
            let mut tm = start;

            if self.hdd_selected() {
                if let Some(hdd) = self.hdd.as_mut() {
                    hdd.write(
                        &mut tm,
                        VirtualTime::NEVER,
                        word,
                        self.state.command.write_precomp,
                        self.state.command.reduced_write_current,
                    );
                }
            }
            else {
                // MFM never has adjacent transitions, so a word holds at most eight.
                let mut flux = [VirtualTime::ZERO; 8];
                let mut count = 0;
                for cell in (0..16).rev() {
                    if word & (1 << cell) != 0 && count < flux.len() {
                        flux[count] = tm + half / 2;
                        count += 1;
                    }
                    tm += half;
                }
                if let Some(drive) = self.floppies[self.state.command.drive as usize].as_mut() {
                    drive.write_flux(start, now, &flux[..count]);
                }
            }
        }

        let prev = self.state.previous_byte();
        let byte = self.state.load_byte();
        self.state.transfer.pending_byte = mfm::encode(byte, prev);
        self.state.transfer.pending_size = 16;
        self.state.timers.schedule_once(TimerId::Byte, half * 16);
    }
}
