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

    devices::dualmode::registers.rs

    Register layouts of the dual-mode controller's four host ports.
*/

use modular_bitfield::{bitfield, prelude::*};
use serde::{Deserialize, Serialize};

pub const DUALMODE_DEFAULT_IO_BASE: u16 = 0xC0;

// Port offsets from the I/O base. Each offset has a distinct register for
// reads and writes.
pub const DUALMODE_STATUS0_CONTROL0: u16 = 0x00;
pub const DUALMODE_STATUS1_CONTROL1: u16 = 0x01;
pub const DUALMODE_DATA: u16 = 0x02;
pub const DUALMODE_RESET_START: u16 = 0x03;

// Unused status bits float high.
pub const STATUS0_UNUSED_BITS: u8 = 0b1100_0000;
pub const STATUS1_UNUSED_BITS: u8 = 0b1111_0000;

/// Control register 0: drive, head and step lines.
#[bitfield]
#[derive(Copy, Clone, Debug)]
pub struct Control0 {
    pub drive: B2,
    pub head: B3,
    pub step: bool,
    pub step_in: bool,
    /// Hard disk only.
    pub reduced_write_current: bool,
}

/// Control register 1: operation parameters.
#[bitfield]
#[derive(Copy, Clone, Debug)]
pub struct Control1 {
    pub sector: B5,
    pub read: bool,
    pub ecc: bool,
    /// Hard disk only.
    pub write_precomp: bool,
}

#[bitfield]
#[derive(Copy, Clone, Debug)]
pub struct Status0 {
    pub write_protect: bool,
    pub ready: bool,
    pub track0: bool,
    pub write_fault: bool,
    pub seek_complete: bool,
    pub loss_of_sync: bool,
    #[skip]
    unused: B2,
}

#[bitfield]
#[derive(Copy, Clone, Debug)]
pub struct Status1 {
    pub floppy_selected: bool,
    pub busy: bool,
    pub motor_on: bool,
    pub hdd_type: bool,
    #[skip]
    unused: B4,
}

impl Status0 {
    pub fn to_byte(self) -> u8 {
        self.into_bytes()[0] | STATUS0_UNUSED_BITS
    }
}

impl Status1 {
    pub fn to_byte(self) -> u8 {
        self.into_bytes()[0] | STATUS1_UNUSED_BITS
    }
}

/// Operation parameters latched from the two control registers.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandState {
    pub drive: u8,
    pub head: u8,
    pub reduced_write_current: bool,
    pub target_sector: u8,
    pub read: bool,
    /// ECC request bit. The board latches it but never acts on it: the ECC field of a
    /// read is cleared regardless.
    pub ecc: bool,
    pub write_precomp: bool,
}

impl CommandState {
    pub fn latch_control0(&mut self, reg: Control0) {
        self.drive = reg.drive();
        self.head = reg.head();
        self.reduced_write_current = reg.reduced_write_current();
    }

    pub fn latch_control1(&mut self, reg: Control1) {
        self.target_sector = reg.sector();
        self.read = reg.read();
        self.ecc = reg.ecc();
        self.write_precomp = reg.write_precomp();
    }
}
