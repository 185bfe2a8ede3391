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

    devices::dualmode::mod.rs

    Implements the Vector Graphic dual-mode disk controller, which drives up
    to four hard-sectored 5.25" floppy drives and one ST-506 hard disk. The
    hard disk, when attached, replaces floppy drive 0.

    Data moves through a 512 byte staging RAM. The host fills or drains the
    RAM through the data port; the controller streams it to or from the
    selected drive one MFM byte at a time when the target sector comes
    around under the head.

    The controller is event driven. run_until() delivers motor, sector and
    byte timer expiries and the index pulses of every attached drive in
    time order.
*/

pub mod registers;
pub mod sector;
pub mod state;
pub mod transfer;

use std::time::Duration;

use crate::{
    bus::{IoDevice, NO_IO_BYTE},
    device_traits::{FloppyDrive, HardDisk, IndexSource, IndexSubscription},
    devices::{floppy_drive::HardSectoredFloppy, hard_disk::MfmHardDisk},
    error::ControllerError,
    machine_config::DualModeConfig,
    time::VirtualTime,
    timer::{Scheduler, TimerId},
};

use registers::*;
use state::{ControllerPhase, ControllerState};

pub const FLOPPY_SLOTS: usize = 4;

pub const FDD_HALF_BITCELL: Duration = Duration::from_micros(2);
pub const HDD_HALF_BITCELL: Duration = Duration::from_nanos(100);

/// 100µF * 100KΩ (74LS123)
pub const MOTOR_ON_TIME: Duration = Duration::from_micros(2_819_600);

/// Events delivered by the run loop. Events due at the same instant are delivered in
/// declaration order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ControllerEvent {
    MotorOff,
    Index(IndexSource),
    Sector,
    Byte,
}

pub struct DualModeController {
    io_base: u16,
    floppies: [Option<Box<dyn FloppyDrive>>; FLOPPY_SLOTS],
    hdd: Option<Box<dyn HardDisk>>,
    subscriptions: Vec<IndexSubscription>,
    state: ControllerState,
}

impl Default for DualModeController {
    fn default() -> Self {
        Self::new(DUALMODE_DEFAULT_IO_BASE)
    }
}

impl DualModeController {
    pub fn new(io_base: u16) -> Self {
        Self {
            io_base,
            floppies: Default::default(),
            hdd: None,
            subscriptions: Vec::new(),
            state: Default::default(),
        }
    }

    /// Build a controller with the reference drive models described by `config` attached.
    pub fn from_config(config: &DualModeConfig) -> Result<Self, ControllerError> {
        config.validate()?;
        let mut controller = DualModeController::new(config.io_base);

        for fdc in config.floppy.iter() {
            let mut drive = HardSectoredFloppy::new(fdc.drive_type);
            if fdc.disk_inserted {
                drive.insert_disk(fdc.write_protected);
            }
            log::debug!("Attaching {} floppy drive in slot {}", fdc.drive_type, fdc.slot);
            controller.attach_floppy(fdc.slot, Box::new(drive))?;
        }

        if let Some(hdc) = &config.hard_disk {
            log::debug!("Attaching {} hard disk at {} RPM", hdc.hdd_type, hdc.rpm);
            controller.attach_hard_disk(Box::new(MfmHardDisk::new(hdc.hdd_type, hdc.rpm)));
        }

        Ok(controller)
    }

    pub fn attach_floppy(&mut self, slot: usize, drive: Box<dyn FloppyDrive>) -> Result<(), ControllerError> {
        if slot >= FLOPPY_SLOTS {
            return Err(ControllerError::InvalidDriveSlot(slot));
        }
        self.floppies[slot] = Some(drive);
        self.subscribe(IndexSource::Floppy(slot));
        Ok(())
    }

    pub fn attach_hard_disk(&mut self, hdd: Box<dyn HardDisk>) {
        self.hdd = Some(hdd);
        self.subscribe(IndexSource::HardDisk);
    }

    fn subscribe(&mut self, source: IndexSource) {
        let sub = IndexSubscription::new(source, self.now());
        match self.subscriptions.iter_mut().find(|s| s.source == source) {
            Some(existing) => *existing = sub,
            None => self.subscriptions.push(sub),
        }
    }

    pub fn io_base(&self) -> u16 {
        self.io_base
    }

    pub fn now(&self) -> VirtualTime {
        self.state.timers.now()
    }

    pub fn phase(&self) -> ControllerPhase {
        self.state.phase
    }

    pub fn busy(&self) -> bool {
        self.state.busy()
    }

    pub fn sector_counter(&self) -> u8 {
        self.state.clock.counter
    }

    pub fn command(&self) -> &CommandState {
        &self.state.command
    }

    pub fn ram(&self) -> &[u8] {
        &self.state.ram
    }

    pub fn cmar(&self) -> u16 {
        self.state.cmar
    }

    pub fn timer_enabled(&self, timer: TimerId) -> bool {
        self.state.timers.enabled(timer)
    }

    pub fn timer_deadline(&self, timer: TimerId) -> Option<VirtualTime> {
        self.state.timers.timer(timer).deadline
    }

    /// Drive 0 is the hard disk whenever one is attached.
    pub fn hdd_selected(&self) -> bool {
        self.state.command.drive == 0 && self.hdd.is_some()
    }

    fn half_bitcell(&self) -> Duration {
        if self.hdd_selected() {
            HDD_HALF_BITCELL
        }
        else {
            FDD_HALF_BITCELL
        }
    }

    /// Power-on clear.
    pub fn reset(&mut self) {
        self.state.command.drive = 0;
        self.state.command.target_sector = 0;
        self.state.command.read = false;
        self.state.timers.cancel(TimerId::MotorOff);
        self.state.timers.cancel(TimerId::Byte);
        self.state.phase = ControllerPhase::Off;
        log::debug!("Controller reset");
    }

    pub fn snapshot(&self) -> ControllerState {
        self.state.clone()
    }

    /// Restore a snapshot. Index pulses at or before the snapshot time are taken as
    /// already delivered.
    pub fn restore(&mut self, state: ControllerState) -> Result<(), ControllerError> {
        state.validate()?;
        self.state = state;
        let now = self.now();
        for sub in self.subscriptions.iter_mut() {
            sub.consume(now);
        }
        Ok(())
    }

    /// Run the controller for `delta` of virtual time.
    pub fn run(&mut self, delta: Duration) {
        let target = self.now() + delta;
        self.run_until(target);
    }

    /// Deliver every event due at or before `target`, then advance the clock to `target`.
    pub fn run_until(&mut self, target: VirtualTime) {
        while let Some((at, event)) = self.next_event(target) {
            self.state.timers.set_now(at);
            self.dispatch(at, event);
        }
        self.state.timers.set_now(target);
    }

    fn next_event(&self, target: VirtualTime) -> Option<(VirtualTime, ControllerEvent)> {
        let now = self.now();

        let timer = self.state.timers.next_expiry(target).map(|(at, id)| {
            let event = match id {
                TimerId::MotorOff => ControllerEvent::MotorOff,
                TimerId::Sector => ControllerEvent::Sector,
                TimerId::Byte => ControllerEvent::Byte,
            };
            (at, event)
        });

        let pulses = self.subscriptions.iter().filter_map(|sub| {
            let from = sub.cursor.max(now);
            let at = match sub.source {
                IndexSource::Floppy(slot) => self.floppies[slot].as_ref()?.next_index_pulse(from),
                IndexSource::HardDisk => self.hdd.as_ref()?.next_index_pulse(from),
            }?;
            (at <= target).then_some((at, ControllerEvent::Index(sub.source)))
        });

        timer.into_iter().chain(pulses).min()
    }

    fn dispatch(&mut self, at: VirtualTime, event: ControllerEvent) {
        match event {
            ControllerEvent::MotorOff => {
                self.state.timers.expire(TimerId::MotorOff);
                self.motor_off();
            }
            ControllerEvent::Index(source) => {
                if let Some(sub) = self.subscriptions.iter_mut().find(|s| s.source == source) {
                    sub.consume(at);
                }
                match source {
                    IndexSource::Floppy(slot) => self.floppy_index(slot),
                    IndexSource::HardDisk => self.hard_disk_index(),
                }
            }
            ControllerEvent::Sector => {
                self.state.timers.expire(TimerId::Sector);
                self.sector_tick();
            }
            ControllerEvent::Byte => {
                self.state.timers.expire(TimerId::Byte);
                self.byte_tick();
            }
        }
    }

    fn motor_off(&mut self) {
        log::debug!("Motor off at {}", self.now());
        for drive in self.floppies.iter_mut().flatten() {
            drive.set_motor(false);
        }
        self.state.timers.cancel(TimerId::Byte);
        self.state.phase = ControllerPhase::Off;
    }

    fn write_control0(&mut self, data: u8) {
        let reg = Control0::from_bytes([data]);
        self.state.command.latch_control0(reg);
        log::debug!("Control 0 write: {:02X} {:?}", data, reg);

        // All drives share the motor line. Writing the register retriggers the monostable.
        for drive in self.floppies.iter_mut().flatten() {
            drive.set_motor(true);
        }
        self.state.timers.schedule_once(TimerId::MotorOff, MOTOR_ON_TIME);
        if self.state.phase == ControllerPhase::Off {
            self.state.phase = ControllerPhase::SpinningUp;
        }

        if self.hdd_selected() {
            if let Some(hdd) = self.hdd.as_mut() {
                let head_mask = hdd.heads().saturating_sub(1);
                hdd.select_head(reg.head() & head_mask);
                hdd.set_step(reg.step());
                hdd.set_direction(reg.step_in());
            }
        }
        else {
            if let Some(drive) = self.floppies[reg.drive() as usize].as_mut() {
                drive.select_head(reg.head() & 1);
                drive.set_step(reg.step());
                drive.set_direction(reg.step_in());
            }
            if self.state.timers.enabled(TimerId::Sector) {
                self.state.timers.cancel(TimerId::Sector);
            }
        }
    }

    fn write_control1(&mut self, data: u8) {
        let reg = Control1::from_bytes([data]);
        self.state.command.latch_control1(reg);
        log::debug!("Control 1 write: {:02X} {:?}", data, reg);
    }

    fn start(&mut self) {
        if self.state.timers.enabled(TimerId::MotorOff) {
            self.state.phase = ControllerPhase::Armed;
            log::debug!(
                "Start: {} sector {}",
                if self.state.command.read { "read" } else { "write" },
                self.state.command.target_sector
            );
        }
        else {
            log::debug!("Start ignored: motor off");
        }
    }

    pub fn status0(&self) -> Status0 {
        let status = Status0::new();
        if self.hdd_selected() {
            match &self.hdd {
                Some(hdd) => status
                    .with_ready(hdd.ready())
                    .with_track0(hdd.track0())
                    .with_seek_complete(hdd.seek_complete())
                    .with_loss_of_sync(true),
                None => status,
            }
        }
        else {
            match &self.floppies[self.state.command.drive as usize] {
                Some(drive) => status
                    .with_write_protect(drive.write_protected())
                    .with_track0(drive.track0()),
                None => status,
            }
        }
    }

    pub fn status1(&self) -> Status1 {
        let hdd = self.hdd_selected();
        Status1::new()
            .with_floppy_selected(!hdd)
            .with_busy(self.state.busy())
            .with_motor_on(!hdd && self.state.timers.enabled(TimerId::MotorOff))
            .with_hdd_type(true)
    }
}

impl IoDevice for DualModeController {
    fn read_u8(&mut self, port: u16) -> u8 {
        match port.wrapping_sub(self.io_base) {
            DUALMODE_STATUS0_CONTROL0 => self.status0().to_byte(),
            DUALMODE_STATUS1_CONTROL1 => self.status1().to_byte(),
            _ if self.state.busy() => NO_IO_BYTE,
            DUALMODE_DATA => self.state.load_byte(),
            DUALMODE_RESET_START => {
                self.state.cmar = 0;
                NO_IO_BYTE
            }
            _ => NO_IO_BYTE,
        }
    }

    fn peek_u8(&self, port: u16) -> u8 {
        match port.wrapping_sub(self.io_base) {
            DUALMODE_STATUS0_CONTROL0 => self.status0().to_byte(),
            DUALMODE_STATUS1_CONTROL1 => self.status1().to_byte(),
            _ if self.state.busy() => NO_IO_BYTE,
            DUALMODE_DATA => self.state.ram[self.state.cmar as usize],
            _ => NO_IO_BYTE,
        }
    }

    fn write_u8(&mut self, port: u16, data: u8) {
        if self.state.busy() {
            log::trace!("Write to port {:04X} ignored: controller busy", port);
            return;
        }
        match port.wrapping_sub(self.io_base) {
            DUALMODE_STATUS0_CONTROL0 => self.write_control0(data),
            DUALMODE_STATUS1_CONTROL1 => self.write_control1(data),
            DUALMODE_DATA => self.state.store_byte(data),
            DUALMODE_RESET_START => self.start(),
            _ => log::warn!("Write to unknown port {:04X}", port),
        }
    }

    fn port_list(&self) -> Vec<(String, u16)> {
        vec![
            (
                String::from("Dual-Mode Status 0 / Control 0"),
                self.io_base + DUALMODE_STATUS0_CONTROL0,
            ),
            (
                String::from("Dual-Mode Status 1 / Control 1"),
                self.io_base + DUALMODE_STATUS1_CONTROL1,
            ),
            (String::from("Dual-Mode Data"), self.io_base + DUALMODE_DATA),
            (String::from("Dual-Mode Reset / Start"), self.io_base + DUALMODE_RESET_START),
        ]
    }
}
