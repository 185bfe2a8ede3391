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

    device_traits::floppy.rs

    Interface to a flux-level floppy drive.
*/

use crate::time::VirtualTime;

/// The signals and data paths a controller has to a floppy drive. Line levels are
/// expressed active-high regardless of the polarity on the drive cable.
pub trait FloppyDrive {
    fn set_motor(&mut self, on: bool);
    fn select_head(&mut self, head: u8);
    /// Drive the step line. The drive moves one cylinder on the asserting edge.
    fn set_step(&mut self, asserted: bool);
    /// Set the step direction. `true` steps toward the spindle.
    fn set_direction(&mut self, inward: bool);
    fn write_protected(&self) -> bool;
    fn track0(&self) -> bool;
    /// Return the first index or sector-hole pulse at or after `from`, if the drive will
    /// produce one in its current state.
    fn next_index_pulse(&self, from: VirtualTime) -> Option<VirtualTime>;
    /// Return the first flux transition under the head strictly after `after`.
    fn next_transition(&self, after: VirtualTime) -> Option<VirtualTime>;
    /// Replace the flux in `[start, end)` with `transitions`.
    fn write_flux(&mut self, start: VirtualTime, end: VirtualTime, transitions: &[VirtualTime]);
}
