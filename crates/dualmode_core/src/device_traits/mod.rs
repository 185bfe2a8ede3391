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

    device_traits::mod.rs

    Capability traits through which a disk controller drives its media, and
    the index-pulse subscriptions a controller registers against them.
*/

pub mod floppy;
pub mod hard_disk;

pub use floppy::FloppyDrive;
pub use hard_disk::HardDisk;

use serde::{Deserialize, Serialize};

use crate::time::VirtualTime;

/// Identifies the drive an index pulse came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IndexSource {
    Floppy(usize),
    HardDisk,
}

/// A registered interest in one drive's index pulses. The controller keeps one
/// subscription per attached drive and tracks how far it has consumed the pulse
/// stream, so every pulse is delivered exactly once.
#[derive(Copy, Clone, Debug)]
pub struct IndexSubscription {
    pub source: IndexSource,
    pub cursor: VirtualTime,
}

impl IndexSubscription {
    pub fn new(source: IndexSource, from: VirtualTime) -> Self {
        Self { source, cursor: from }
    }

    /// Record delivery of the pulse at `at`.
    pub fn consume(&mut self, at: VirtualTime) {
        self.cursor = VirtualTime::from_nanos(at.as_nanos().saturating_add(1));
    }
}
