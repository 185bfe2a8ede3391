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

    devices::hard_disk.rs

    Implements an ST-506 style hard disk as a store of MFM words.

    Each track is a vector of 16-cell MFM words, one word per 1.6µs at the
    5Mbit/s ST-506 data rate. Tracks are only allocated once written; an
    unwritten track reads back as encoded zero gap.
*/

use fxhash::FxHashMap;

use crate::{
    device_traits::HardDisk,
    device_types::{hdd::HardDiskGeometry, revolution_time, HardDiskType},
    mfm::MFM_GAP_WORD,
    time::VirtualTime,
};

/// Duration of one 16-cell MFM word at 100ns per half bit cell.
pub const HDD_WORD_NS: u64 = 1_600;

pub struct MfmHardDisk {
    hdd_type: HardDiskType,
    geometry: HardDiskGeometry,
    rev_ns: u64,
    words_per_track: usize,

    cylinder: u16,
    head: u8,
    step_line: bool,
    step_in: bool,

    tracks: FxHashMap<(u16, u8), Vec<u16>>,
    last_write_precomp: bool,
    last_reduced_write_current: bool,
}

impl MfmHardDisk {
    pub fn new(hdd_type: HardDiskType, rpm: u32) -> Self {
        let rev_ns = revolution_time(rpm).as_nanos() as u64;
        Self {
            hdd_type,
            geometry: hdd_type.geometry(),
            rev_ns,
            words_per_track: (rev_ns / HDD_WORD_NS) as usize,
            cylinder: 0,
            head: 0,
            step_line: false,
            step_in: false,
            tracks: FxHashMap::default(),
            last_write_precomp: false,
            last_reduced_write_current: false,
        }
    }

    pub fn hdd_type(&self) -> HardDiskType {
        self.hdd_type
    }

    pub fn cylinder(&self) -> u16 {
        self.cylinder
    }

    pub fn head(&self) -> u8 {
        self.head
    }

    pub fn words_per_track(&self) -> usize {
        self.words_per_track
    }

    pub fn revolution_ns(&self) -> u64 {
        self.rev_ns
    }

    /// The precompensation and reduced write current flags of the last word written.
    pub fn last_write_flags(&self) -> (bool, bool) {
        (self.last_write_precomp, self.last_reduced_write_current)
    }

    pub fn track_words(&self, cylinder: u16, head: u8) -> Option<&[u16]> {
        self.tracks.get(&(cylinder, head)).map(|t| t.as_slice())
    }

    /// Find the word whose cells contain `tm`, returning its start time and index in the
    /// track. The partial word before the index pulse is skipped.
    fn locate(&self, tm: VirtualTime) -> (VirtualTime, usize) {
        let tm = tm.as_nanos();
        let pos = tm % self.rev_ns;
        let rev_start = tm - pos;
        let idx = (pos / HDD_WORD_NS) as usize;
        if idx >= self.words_per_track {
            (VirtualTime::from_nanos(rev_start + self.rev_ns), 0)
        }
        else {
            (VirtualTime::from_nanos(rev_start + idx as u64 * HDD_WORD_NS), idx)
        }
    }
}

impl HardDisk for MfmHardDisk {
    fn select_head(&mut self, head: u8) {
        self.head = head.min(self.geometry.heads - 1);
    }

    fn set_step(&mut self, asserted: bool) {
        if asserted && !self.step_line {
            if self.step_in {
                self.cylinder = (self.cylinder + 1).min(self.geometry.cylinders - 1);
            }
            else {
                self.cylinder = self.cylinder.saturating_sub(1);
            }
            log::trace!("HDD step {}: cylinder {}", if self.step_in { "in" } else { "out" }, self.cylinder);
        }
        self.step_line = asserted;
    }

    fn set_direction(&mut self, inward: bool) {
        self.step_in = inward;
    }

    fn ready(&self) -> bool {
        true
    }

    fn track0(&self) -> bool {
        self.cylinder == 0
    }

    fn seek_complete(&self) -> bool {
        true
    }

    fn heads(&self) -> u8 {
        self.geometry.heads
    }

    fn next_index_pulse(&self, from: VirtualTime) -> Option<VirtualTime> {
        let from = from.as_nanos();
        let pos = from % self.rev_ns;
        if pos == 0 {
            Some(VirtualTime::from_nanos(from))
        }
        else {
            Some(VirtualTime::from_nanos(from - pos + self.rev_ns))
        }
    }

    fn read(&mut self, tm: &mut VirtualTime, limit: VirtualTime) -> Option<u16> {
        let (start, idx) = self.locate(*tm);
        let end = VirtualTime::from_nanos(start.as_nanos() + HDD_WORD_NS);
        if end > limit {
            return None;
        }
        *tm = end;
        let word = self
            .tracks
            .get(&(self.cylinder, self.head))
            .map_or(MFM_GAP_WORD, |track| track[idx]);
        Some(word)
    }

    fn write(
        &mut self,
        tm: &mut VirtualTime,
        limit: VirtualTime,
        word: u16,
        write_precomp: bool,
        reduced_write_current: bool,
    ) -> bool {
        let (start, idx) = self.locate(*tm);
        let end = VirtualTime::from_nanos(start.as_nanos() + HDD_WORD_NS);
        if end > limit {
            return false;
        }
        *tm = end;

        let words = self.words_per_track;
        let track = self
            .tracks
            .entry((self.cylinder, self.head))
            .or_insert_with(|| vec![MFM_GAP_WORD; words]);
        track[idx] = word;
        self.last_write_precomp = write_precomp;
        self.last_reduced_write_current = reduced_write_current;
        true
    }
}
