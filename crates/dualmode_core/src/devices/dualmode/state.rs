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

    devices::dualmode::state.rs

    Persistent state of the dual-mode controller. Everything needed to save
    and restore an emulated controller lives in ControllerState, so a
    snapshot is a single serializable value.
*/

use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::{
    devices::dualmode::{registers::CommandState, sector::SectorClock, transfer::TransferCursor},
    error::ControllerError,
    pll::FdcPll,
    timer::DeviceScheduler,
};

pub const STAGING_RAM_SIZE: usize = 512;
pub const CMAR_MASK: u16 = 0x1FF;
/// Offset of the ECC field within a sector as laid out in the staging RAM.
pub const ECC_OFFSET: usize = 274;

/// The busy flag and the motor, sector and byte timers, expressed as one state machine.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerPhase {
    /// Motor monostable idle.
    #[default]
    Off,
    /// Motor monostable running, no operation pending.
    SpinningUp,
    /// Start accepted. Waiting for the target sector.
    Armed,
    /// Byte timer running.
    Transferring,
}

impl ControllerPhase {
    pub fn busy(&self) -> bool {
        matches!(self, ControllerPhase::Armed | ControllerPhase::Transferring)
    }
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControllerState {
    #[serde_as(as = "[_; 512]")]
    pub ram: [u8; STAGING_RAM_SIZE],
    /// Controller memory address register: the staging RAM cursor.
    pub cmar: u16,
    pub command: CommandState,
    pub phase: ControllerPhase,
    pub clock: SectorClock,
    pub transfer: TransferCursor,
    pub timers: DeviceScheduler,
    /// Data separator state. Part of the snapshot so a read resumes on the same cell.
    pub pll: FdcPll,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            ram: [0; STAGING_RAM_SIZE],
            cmar: 0,
            command: Default::default(),
            phase: Default::default(),
            clock: Default::default(),
            transfer: Default::default(),
            timers: Default::default(),
            pll: FdcPll::new(),
        }
    }
}

impl ControllerState {
    pub fn busy(&self) -> bool {
        self.phase.busy()
    }

    /// Read the byte at the cursor and advance.
    pub fn load_byte(&mut self) -> u8 {
        let byte = self.ram[self.cmar as usize];
        self.advance_cmar();
        byte
    }

    /// Write a byte at the cursor and advance.
    pub fn store_byte(&mut self, byte: u8) {
        self.ram[self.cmar as usize] = byte;
        self.advance_cmar();
    }

    /// The byte preceding the cursor, used as MFM context. The first byte of the RAM has
    /// no predecessor and encodes against zero.
    pub fn previous_byte(&self) -> u8 {
        match self.cmar {
            0 => 0,
            n => self.ram[n as usize - 1],
        }
    }

    fn advance_cmar(&mut self) {
        self.cmar = (self.cmar + 1) & CMAR_MASK;
    }

    /// Check the ranges of fields that deserialization alone cannot constrain.
    pub fn validate(&self) -> Result<(), ControllerError> {
        if self.cmar > CMAR_MASK {
            return Err(ControllerError::InvalidSnapshot(format!("cmar out of range: {}", self.cmar)));
        }
        if self.command.drive > 3 || self.command.head > 7 || self.command.target_sector > 31 {
            return Err(ControllerError::InvalidSnapshot(format!(
                "command out of range: {:?}",
                self.command
            )));
        }
        if self.clock.counter > 0x1F {
            return Err(ControllerError::InvalidSnapshot(format!(
                "sector counter out of range: {}",
                self.clock.counter
            )));
        }
        if self.transfer.pending_size > 16 {
            return Err(ControllerError::InvalidSnapshot(format!(
                "pending bit count out of range: {}",
                self.transfer.pending_size
            )));
        }
        Ok(())
    }
}
