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

    tests/registers.rs

    Host port behavior of the dual-mode controller.
*/

mod common;

use std::time::Duration;

use common::*;
use dualmode_core::{
    bus::IoDevice,
    devices::dualmode::{state::ControllerPhase, DualModeController, MOTOR_ON_TIME},
    time::VirtualTime,
    timer::TimerId,
};

fn floppy_controller() -> (DualModeController, SharedLines) {
    init();
    let (mut drive, lines) = ScriptedFloppy::new(Vec::new());
    drive.write_protected = true;
    drive.track0 = true;
    let mut fdc = DualModeController::default();
    fdc.attach_floppy(1, Box::new(drive)).unwrap();
    (fdc, lines)
}

fn hdd_controller(heads: u8) -> (DualModeController, SharedLines) {
    init();
    let (hdd, lines) = ScriptedHardDisk::new(vec![VirtualTime::ZERO, VirtualTime::from_millis(16)], heads);
    let mut fdc = DualModeController::default();
    fdc.attach_hard_disk(Box::new(hdd));
    (fdc, lines)
}

#[test]
fn floppy_status_registers() {
    let (mut fdc, _) = floppy_controller();
    fdc.write_u8(CONTROL0, 0x01);

    // Write protect and track 0; hard disk lines read clear.
    assert_eq!(fdc.read_u8(STATUS0), 0xC5);
    // Floppy selected, motor on, hard disk type.
    assert_eq!(fdc.read_u8(STATUS1), 0xFD);
}

#[test]
fn empty_floppy_slot_status() {
    let (mut fdc, _) = floppy_controller();
    fdc.write_u8(CONTROL0, 0x02);
    assert_eq!(fdc.read_u8(STATUS0), 0xC0);
}

#[test]
fn hard_disk_status_registers() {
    let (mut fdc, _) = hdd_controller(4);
    fdc.write_u8(CONTROL0, 0x00);
    assert!(fdc.hdd_selected());

    // Ready, track 0, seek complete and loss of sync.
    assert_eq!(fdc.read_u8(STATUS0), 0xF6);
    // Motor on is only reported for floppies.
    assert_eq!(fdc.read_u8(STATUS1), 0xF8);
}

#[test]
fn hard_disk_head_is_masked_to_head_count() {
    let (mut fdc, lines) = hdd_controller(2);
    // Head 5, step, step in.
    fdc.write_u8(CONTROL0, (5 << 2) | 0x20 | 0x40);
    let lines = lines.borrow();
    assert_eq!(lines.head, 1);
    assert!(lines.step);
    assert!(lines.step_in);
}

#[test]
fn floppy_lines_follow_control0() {
    let (mut fdc, lines) = floppy_controller();
    fdc.write_u8(CONTROL0, 0x01 | (3 << 2) | 0x20);
    {
        let lines = lines.borrow();
        assert!(lines.motor);
        assert_eq!(lines.head, 1);
        assert!(lines.step);
        assert!(!lines.step_in);
    }
    fdc.write_u8(CONTROL0, 0x01 | 0x40);
    let lines = lines.borrow();
    assert_eq!(lines.head, 0);
    assert!(!lines.step);
    assert!(lines.step_in);
}

#[test]
fn data_port_walks_staging_ram() {
    let (mut fdc, _) = floppy_controller();
    for byte in [0x11, 0x22, 0x33] {
        fdc.write_u8(DATA, byte);
    }
    assert_eq!(fdc.cmar(), 3);

    assert_eq!(fdc.read_u8(RESET), 0xFF);
    assert_eq!(fdc.cmar(), 0);

    // Peeks do not move the cursor.
    assert_eq!(fdc.peek_u8(DATA), 0x11);
    assert_eq!(fdc.peek_u8(RESET), 0xFF);
    assert_eq!(fdc.cmar(), 0);

    assert_eq!(fdc.read_u8(DATA), 0x11);
    assert_eq!(fdc.read_u8(DATA), 0x22);
    assert_eq!(fdc.read_u8(DATA), 0x33);
    assert_eq!(fdc.cmar(), 3);
}

#[test]
fn data_cursor_wraps_at_512() {
    let (mut fdc, _) = floppy_controller();
    for i in 0..513u32 {
        fdc.write_u8(DATA, i as u8);
    }
    assert_eq!(fdc.cmar(), 1);
    assert_eq!(fdc.ram()[0], 0x00);
    assert_eq!(fdc.ram()[511], 0xFF);
}

#[test]
fn start_requires_running_motor() {
    let (mut fdc, _) = floppy_controller();
    fdc.write_u8(START, 0);
    assert!(!fdc.busy());
    assert_eq!(fdc.phase(), ControllerPhase::Off);

    fdc.write_u8(CONTROL0, 0x01);
    assert_eq!(fdc.phase(), ControllerPhase::SpinningUp);
    fdc.write_u8(START, 0);
    assert!(fdc.busy());
    assert_eq!(fdc.phase(), ControllerPhase::Armed);
    assert_eq!(fdc.read_u8(STATUS1) & 0x02, 0x02);
}

#[test]
fn busy_controller_ignores_host() {
    let (mut fdc, lines) = floppy_controller();
    fdc.write_u8(DATA, 0x42);
    fdc.write_u8(CONTROL1, 0x03);
    fdc.write_u8(CONTROL0, 0x01);
    fdc.write_u8(START, 0);
    assert!(fdc.busy());

    let command = *fdc.command();
    let cmar = fdc.cmar();

    fdc.write_u8(CONTROL0, 0x03 | 0x20);
    fdc.write_u8(CONTROL1, 0x25);
    fdc.write_u8(DATA, 0x99);
    assert_eq!(*fdc.command(), command);
    assert_eq!(fdc.cmar(), cmar);
    assert_eq!(fdc.ram()[1], 0x00);
    assert!(!lines.borrow().step);

    assert_eq!(fdc.read_u8(DATA), 0xFF);
    assert_eq!(fdc.read_u8(RESET), 0xFF);
    assert_eq!(fdc.cmar(), cmar);

    // Status ports stay live.
    assert_eq!(fdc.read_u8(STATUS0), 0xC5);
    assert_eq!(fdc.read_u8(STATUS1), 0xFF);
}

#[test]
fn unmapped_offset_reads_float() {
    let (mut fdc, _) = floppy_controller();
    assert_eq!(fdc.read_u8(0xC4), 0xFF);
    assert_eq!(fdc.read_u8(0x00), 0xFF);
}

#[test]
fn motor_timeout_releases_controller() {
    let (mut fdc, lines) = floppy_controller();
    fdc.write_u8(CONTROL0, 0x01);
    fdc.write_u8(START, 0);
    assert!(fdc.busy());

    fdc.run(MOTOR_ON_TIME - Duration::from_nanos(1));
    assert!(fdc.busy());
    assert!(lines.borrow().motor);

    fdc.run(Duration::from_nanos(1));
    assert!(!fdc.busy());
    assert_eq!(fdc.phase(), ControllerPhase::Off);
    assert!(!lines.borrow().motor);
    assert_eq!(fdc.read_u8(STATUS1) & 0x04, 0);
}

#[test]
fn control0_retriggers_motor_timer() {
    let (mut fdc, _) = floppy_controller();
    fdc.write_u8(CONTROL0, 0x01);
    fdc.run(Duration::from_secs(2));
    fdc.write_u8(CONTROL0, 0x01);
    fdc.run(Duration::from_secs(2));
    assert!(fdc.timer_enabled(TimerId::MotorOff));
    assert_eq!(fdc.phase(), ControllerPhase::SpinningUp);
}

#[test]
fn reset_returns_to_power_on_state() {
    let (mut fdc, _) = floppy_controller();
    fdc.write_u8(CONTROL0, 0x01);
    fdc.write_u8(CONTROL1, 0x27);
    fdc.write_u8(START, 0);
    assert!(fdc.busy());

    fdc.reset();
    assert!(!fdc.busy());
    assert_eq!(fdc.phase(), ControllerPhase::Off);
    assert_eq!(fdc.command().drive, 0);
    assert_eq!(fdc.command().target_sector, 0);
    assert!(!fdc.command().read);
    assert!(!fdc.timer_enabled(TimerId::MotorOff));
}

#[test]
fn selecting_floppy_cancels_sector_timer() {
    let (mut fdc, _) = hdd_controller(4);
    let (floppy, _) = ScriptedFloppy::new(Vec::new());
    fdc.attach_floppy(1, Box::new(floppy)).unwrap();

    fdc.write_u8(CONTROL0, 0x00);
    fdc.run_until(VirtualTime::from_millis(16));
    assert!(fdc.timer_enabled(TimerId::Sector));

    fdc.write_u8(CONTROL0, 0x01);
    assert!(!fdc.timer_enabled(TimerId::Sector));
}

#[test]
fn attach_rejects_bad_slot() {
    let (mut fdc, _) = floppy_controller();
    let (drive, _) = ScriptedFloppy::new(Vec::new());
    assert!(fdc.attach_floppy(4, Box::new(drive)).is_err());
}

#[test]
fn port_list_covers_four_ports() {
    let fdc = DualModeController::new(0xD0);
    let ports: Vec<u16> = fdc.port_list().into_iter().map(|(_, port)| port).collect();
    assert_eq!(ports, vec![0xD0, 0xD1, 0xD2, 0xD3]);
}
