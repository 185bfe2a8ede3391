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

    device_types::hdd.rs

    ST-506 interface hard disk types supported by the dual-mode controller.
*/

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

pub const HDD_DEFAULT_RPM: u32 = 3600;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, EnumIter, Serialize, Deserialize)]
pub enum HardDiskType {
    #[default]
    Generic,
    /// 5MB, single platter.
    St406,
    /// 10MB.
    St412,
    /// 5MB, double platter.
    St506,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HardDiskGeometry {
    pub cylinders: u16,
    pub heads: u8,
}

impl HardDiskType {
    pub fn geometry(&self) -> HardDiskGeometry {
        let (cylinders, heads) = match self {
            HardDiskType::Generic => (615, 4),
            HardDiskType::St406 => (306, 2),
            HardDiskType::St412 => (306, 4),
            HardDiskType::St506 => (153, 4),
        };
        HardDiskGeometry { cylinders, heads }
    }
}

impl Display for HardDiskType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let geom = self.geometry();
        let name = match self {
            HardDiskType::Generic => "Generic",
            HardDiskType::St406 => "ST-406",
            HardDiskType::St412 => "ST-412",
            HardDiskType::St506 => "ST-506",
        };
        write!(f, "{} (c:{} h:{})", name, geom.cylinders, geom.heads)
    }
}
