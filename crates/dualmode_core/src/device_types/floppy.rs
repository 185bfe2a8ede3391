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

    device_types::floppy.rs

    Hard-sectored 5.25" floppy drive types.
*/

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// Sector holes punched in a hard-sectored diskette, not counting the index hole.
pub const HARD_SECTORS: u8 = 16;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
pub enum FloppyDriveType {
    /// 48 tpi, 40 cylinders.
    #[strum(to_string = "5.25\" DD")]
    Floppy525Dd,
    /// 96 tpi, 80 cylinders.
    #[default]
    #[strum(to_string = "5.25\" QD")]
    Floppy525Qd,
}

impl FloppyDriveType {
    pub fn cylinders(&self) -> u16 {
        match self {
            FloppyDriveType::Floppy525Dd => 40,
            FloppyDriveType::Floppy525Qd => 80,
        }
    }

    pub fn heads(&self) -> u8 {
        2
    }

    pub fn rpm(&self) -> u32 {
        300
    }
}
