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

    devices::floppy_drive.rs

    Implements a hard-sectored 5.25" floppy drive at the flux level.

    A hard-sectored diskette has one hole per sector plus an index hole placed
    midway between the last sector hole and the first. The drive reports every
    hole as a pulse; it is up to the controller to tell the index hole apart.
*/

use crate::{
    device_traits::FloppyDrive,
    device_types::{floppy::HARD_SECTORS, revolution_time, FloppyDriveType},
    time::VirtualTime,
};

pub struct HardSectoredFloppy {
    drive_type: FloppyDriveType,
    rev_ns: u64,
    hole_offsets: Vec<u64>,

    cylinder: u16,
    head: u8,
    motor_on: bool,
    step_line: bool,
    step_in: bool,

    disk_present: bool,
    write_protected: bool,
    /// Flux transitions per track, as sorted offsets in nanoseconds from the index
    /// of the revolution.
    tracks: Vec<Vec<u64>>,
}

impl HardSectoredFloppy {
    pub fn new(drive_type: FloppyDriveType) -> Self {
        let rev_ns = revolution_time(drive_type.rpm()).as_nanos() as u64;
        let sectors = HARD_SECTORS as u64;

        let mut hole_offsets: Vec<u64> = (0..sectors).map(|k| k * rev_ns / sectors).collect();
        // Index hole sits half a sector before sector hole 0.
        hole_offsets.push(rev_ns - rev_ns / (sectors * 2));

        let track_ct = drive_type.cylinders() as usize * drive_type.heads() as usize;
        Self {
            drive_type,
            rev_ns,
            hole_offsets,
            cylinder: 0,
            head: 0,
            motor_on: false,
            step_line: false,
            step_in: false,
            disk_present: false,
            write_protected: false,
            tracks: vec![Vec::new(); track_ct],
        }
    }

    /// Insert a blank diskette.
    pub fn insert_disk(&mut self, write_protected: bool) {
        log::debug!("Inserting {} diskette, write protect: {}", self.drive_type, write_protected);
        for track in self.tracks.iter_mut() {
            track.clear();
        }
        self.disk_present = true;
        self.write_protected = write_protected;
    }

    pub fn eject_disk(&mut self) {
        self.disk_present = false;
    }

    pub fn disk_present(&self) -> bool {
        self.disk_present
    }

    pub fn drive_type(&self) -> FloppyDriveType {
        self.drive_type
    }

    pub fn cylinder(&self) -> u16 {
        self.cylinder
    }

    pub fn head(&self) -> u8 {
        self.head
    }

    pub fn motor_on(&self) -> bool {
        self.motor_on
    }

    pub fn revolution_ns(&self) -> u64 {
        self.rev_ns
    }

    /// Flux transition offsets recorded on the given track.
    pub fn track_flux(&self, cylinder: u16, head: u8) -> Option<&[u64]> {
        self.track_index(cylinder, head).map(|idx| self.tracks[idx].as_slice())
    }

    fn track_index(&self, cylinder: u16, head: u8) -> Option<usize> {
        if cylinder >= self.drive_type.cylinders() || head >= self.drive_type.heads() {
            return None;
        }
        Some(cylinder as usize * self.drive_type.heads() as usize + head as usize)
    }

    fn spinning(&self) -> bool {
        self.motor_on && self.disk_present
    }
}

impl FloppyDrive for HardSectoredFloppy {
    fn set_motor(&mut self, on: bool) {
        if on != self.motor_on {
            log::trace!("Floppy motor {}", if on { "on" } else { "off" });
        }
        self.motor_on = on;
    }

    fn select_head(&mut self, head: u8) {
        self.head = head.min(self.drive_type.heads() - 1);
    }

    fn set_step(&mut self, asserted: bool) {
        if asserted && !self.step_line {
            if self.step_in {
                self.cylinder = (self.cylinder + 1).min(self.drive_type.cylinders() - 1);
            }
            else {
                self.cylinder = self.cylinder.saturating_sub(1);
            }
            log::trace!("Floppy step {}: cylinder {}", if self.step_in { "in" } else { "out" }, self.cylinder);
        }
        self.step_line = asserted;
    }

    fn set_direction(&mut self, inward: bool) {
        self.step_in = inward;
    }

    fn write_protected(&self) -> bool {
        self.disk_present && self.write_protected
    }

    fn track0(&self) -> bool {
        self.cylinder == 0
    }

    fn next_index_pulse(&self, from: VirtualTime) -> Option<VirtualTime> {
        if !self.spinning() {
            return None;
        }
        let from = from.as_nanos();
        let rev_start = from - from % self.rev_ns;
        [rev_start, rev_start + self.rev_ns]
            .into_iter()
            .flat_map(|base| self.hole_offsets.iter().map(move |off| base + off))
            .find(|t| *t >= from)
            .map(VirtualTime::from_nanos)
    }

    fn next_transition(&self, after: VirtualTime) -> Option<VirtualTime> {
        if !self.spinning() {
            return None;
        }
        let track = &self.tracks[self.track_index(self.cylinder, self.head)?];
        let first = *track.first()?;

        let after = after.as_nanos();
        let pos = after % self.rev_ns;
        let rev_start = after - pos;

        let next = match track.get(track.partition_point(|off| *off <= pos)) {
            Some(off) => rev_start + off,
            None => rev_start + self.rev_ns + first,
        };
        Some(VirtualTime::from_nanos(next))
    }

    fn write_flux(&mut self, start: VirtualTime, end: VirtualTime, transitions: &[VirtualTime]) {
        if !self.spinning() {
            return;
        }
        if self.write_protected {
            log::trace!("Floppy write ignored: diskette is write protected");
            return;
        }
        let rev_ns = self.rev_ns;
        let Some(idx) = self.track_index(self.cylinder, self.head)
        else {
            return;
        };
        let track = &mut self.tracks[idx];

        let len = (end - start).as_nanos() as u64;
        if len >= rev_ns {
            track.clear();
        }
        else if len > 0 {
            let s = start.as_nanos() % rev_ns;
            let e = s + len;
            if e <= rev_ns {
                track.retain(|off| *off < s || *off >= e);
            }
            else {
                let wrapped = e - rev_ns;
                track.retain(|off| *off < s && *off >= wrapped);
            }
        }

        track.extend(transitions.iter().map(|t| t.as_nanos() % rev_ns));
        track.sort_unstable();
        track.dedup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spinning_drive() -> HardSectoredFloppy {
        let mut drive = HardSectoredFloppy::new(FloppyDriveType::Floppy525Qd);
        drive.insert_disk(false);
        drive.set_motor(true);
        drive
    }

    #[test]
    fn sixteen_sector_holes_and_an_index_hole() {
        let drive = spinning_drive();
        let mut pulses = Vec::new();
        let mut from = VirtualTime::ZERO;
        while let Some(t) = drive.next_index_pulse(from) {
            if t >= VirtualTime::from_millis(200) {
                break;
            }
            pulses.push(t);
            from = VirtualTime::from_nanos(t.as_nanos() + 1);
        }
        assert_eq!(pulses.len(), 17);
        assert_eq!(pulses[1], VirtualTime::from_micros(12_500));
        assert_eq!(pulses[15], VirtualTime::from_micros(187_500));
        // The index hole is half a sector before the next revolution's sector hole 0.
        assert_eq!(pulses[16], VirtualTime::from_micros(193_750));
    }

    #[test]
    fn no_pulses_without_motor_or_media() {
        let mut drive = spinning_drive();
        drive.set_motor(false);
        assert_eq!(drive.next_index_pulse(VirtualTime::ZERO), None);
        drive.set_motor(true);
        drive.eject_disk();
        assert_eq!(drive.next_index_pulse(VirtualTime::ZERO), None);
    }

    #[test]
    fn written_flux_repeats_every_revolution() {
        let mut drive = spinning_drive();
        let start = VirtualTime::from_micros(1_000);
        let flux = [VirtualTime::from_micros(1_001), VirtualTime::from_micros(1_005)];
        drive.write_flux(start, VirtualTime::from_micros(1_032), &flux);

        assert_eq!(drive.next_transition(start), Some(flux[0]));
        assert_eq!(drive.next_transition(flux[0]), Some(flux[1]));
        assert_eq!(
            drive.next_transition(flux[1]),
            Some(VirtualTime::from_micros(201_001))
        );
    }

    #[test]
    fn rewrite_erases_window() {
        let mut drive = spinning_drive();
        drive.write_flux(
            VirtualTime::from_micros(0),
            VirtualTime::from_micros(10),
            &[VirtualTime::from_micros(3), VirtualTime::from_micros(7)],
        );
        drive.write_flux(
            VirtualTime::from_micros(200_004),
            VirtualTime::from_micros(200_010),
            &[VirtualTime::from_micros(200_009)],
        );
        assert_eq!(drive.track_flux(0, 0).unwrap(), &[3_000, 9_000]);
    }

    #[test]
    fn write_across_index_wraps() {
        let mut drive = spinning_drive();
        drive.write_flux(
            VirtualTime::from_micros(199_990),
            VirtualTime::from_micros(200_010),
            &[VirtualTime::from_micros(199_995), VirtualTime::from_micros(200_005)],
        );
        assert_eq!(drive.track_flux(0, 0).unwrap(), &[5_000, 199_995_000]);
    }

    #[test]
    fn write_protect_blocks_writes() {
        let mut drive = HardSectoredFloppy::new(FloppyDriveType::Floppy525Qd);
        drive.insert_disk(true);
        drive.set_motor(true);
        assert!(drive.write_protected());
        drive.write_flux(VirtualTime::ZERO, VirtualTime::from_micros(32), &[VirtualTime::from_micros(1)]);
        assert!(drive.track_flux(0, 0).unwrap().is_empty());
    }

    #[test]
    fn steps_on_asserting_edge() {
        let mut drive = spinning_drive();
        drive.set_direction(true);
        for _ in 0..3 {
            drive.set_step(true);
            drive.set_step(false);
        }
        assert_eq!(drive.cylinder(), 3);
        assert!(!drive.track0());
        drive.set_direction(false);
        drive.set_step(true);
        drive.set_step(true);
        assert_eq!(drive.cylinder(), 2);
    }
}
