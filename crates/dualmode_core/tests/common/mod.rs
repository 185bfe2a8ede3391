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

    tests/common/mod.rs

    Scripted drives and helpers shared by the controller tests.
*/

#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc};

use dualmode_core::{
    bus::IoDevice,
    device_traits::{FloppyDrive, HardDisk},
    devices::dualmode::DualModeController,
    time::VirtualTime,
};

pub const CONTROL0: u16 = 0xC0;
pub const STATUS0: u16 = 0xC0;
pub const CONTROL1: u16 = 0xC1;
pub const STATUS1: u16 = 0xC1;
pub const DATA: u16 = 0xC2;
pub const RESET: u16 = 0xC3;
pub const START: u16 = 0xC3;

pub const CONTROL1_READ: u8 = 0x20;

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Lines driven by the controller and writes received, shared with the test body.
#[derive(Debug, Default)]
pub struct DriveLines {
    pub motor: bool,
    pub head: u8,
    pub step: bool,
    pub step_in: bool,
    pub flux_writes: Vec<(VirtualTime, VirtualTime, Vec<VirtualTime>)>,
    pub word_writes: Vec<(u16, bool, bool)>,
}

pub type SharedLines = Rc<RefCell<DriveLines>>;

/// A floppy that produces index pulses at fixed times, regardless of the motor line.
pub struct ScriptedFloppy {
    pub pulses: Vec<VirtualTime>,
    pub flux: Vec<VirtualTime>,
    pub write_protected: bool,
    pub track0: bool,
    pub lines: SharedLines,
}

impl ScriptedFloppy {
    pub fn new(pulses: Vec<VirtualTime>) -> (Self, SharedLines) {
        let lines = SharedLines::default();
        (
            Self {
                pulses,
                flux: Vec::new(),
                write_protected: false,
                track0: false,
                lines: lines.clone(),
            },
            lines,
        )
    }
}

impl FloppyDrive for ScriptedFloppy {
    fn set_motor(&mut self, on: bool) {
        self.lines.borrow_mut().motor = on;
    }
    fn select_head(&mut self, head: u8) {
        self.lines.borrow_mut().head = head;
    }
    fn set_step(&mut self, asserted: bool) {
        self.lines.borrow_mut().step = asserted;
    }
    fn set_direction(&mut self, inward: bool) {
        self.lines.borrow_mut().step_in = inward;
    }
    fn write_protected(&self) -> bool {
        self.write_protected
    }
    fn track0(&self) -> bool {
        self.track0
    }
    fn next_index_pulse(&self, from: VirtualTime) -> Option<VirtualTime> {
        self.pulses.iter().copied().find(|t| *t >= from)
    }
    fn next_transition(&self, after: VirtualTime) -> Option<VirtualTime> {
        self.flux.iter().copied().find(|t| *t > after)
    }
    fn write_flux(&mut self, start: VirtualTime, end: VirtualTime, transitions: &[VirtualTime]) {
        self.lines
            .borrow_mut()
            .flux_writes
            .push((start, end, transitions.to_vec()));
    }
}

/// A hard disk with scripted index pulses. Reads return gap; writes are recorded.
pub struct ScriptedHardDisk {
    pub pulses: Vec<VirtualTime>,
    pub heads: u8,
    pub lines: SharedLines,
}

impl ScriptedHardDisk {
    pub const WORD_NS: u64 = 1_600;

    pub fn new(pulses: Vec<VirtualTime>, heads: u8) -> (Self, SharedLines) {
        let lines = SharedLines::default();
        (
            Self {
                pulses,
                heads,
                lines: lines.clone(),
            },
            lines,
        )
    }

    fn advance(tm: &mut VirtualTime, limit: VirtualTime) -> bool {
        let end = VirtualTime::from_nanos(tm.as_nanos() + Self::WORD_NS);
        if end > limit {
            return false;
        }
        *tm = end;
        true
    }
}

impl HardDisk for ScriptedHardDisk {
    fn select_head(&mut self, head: u8) {
        self.lines.borrow_mut().head = head;
    }
    fn set_step(&mut self, asserted: bool) {
        self.lines.borrow_mut().step = asserted;
    }
    fn set_direction(&mut self, inward: bool) {
        self.lines.borrow_mut().step_in = inward;
    }
    fn ready(&self) -> bool {
        true
    }
    fn track0(&self) -> bool {
        true
    }
    fn seek_complete(&self) -> bool {
        true
    }
    fn heads(&self) -> u8 {
        self.heads
    }
    fn next_index_pulse(&self, from: VirtualTime) -> Option<VirtualTime> {
        self.pulses.iter().copied().find(|t| *t >= from)
    }
    fn read(&mut self, tm: &mut VirtualTime, limit: VirtualTime) -> Option<u16> {
        Self::advance(tm, limit).then_some(0xAAAA)
    }
    fn write(
        &mut self,
        tm: &mut VirtualTime,
        limit: VirtualTime,
        word: u16,
        write_precomp: bool,
        reduced_write_current: bool,
    ) -> bool {
        if !Self::advance(tm, limit) {
            return false;
        }
        self.lines
            .borrow_mut()
            .word_writes
            .push((word, write_precomp, reduced_write_current));
        true
    }
}

/// Load `data` into the staging RAM starting at offset 0.
pub fn fill_ram(fdc: &mut DualModeController, data: &[u8]) {
    fdc.read_u8(RESET);
    for &byte in data {
        fdc.write_u8(DATA, byte);
    }
    fdc.read_u8(RESET);
}

/// A sector image in the on-disk layout: `preamble` zero bytes, the 0xFF sync byte, then
/// a payload that never repeats a zero run.
pub fn sector_image(preamble: usize) -> Vec<u8> {
    let mut data = vec![0u8; preamble];
    data.push(0xFF);
    data.extend((0..).map(|i: usize| (i % 255 + 1) as u8).take(512 - preamble - 1));
    data
}
