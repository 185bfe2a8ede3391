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

    machine_config.rs

    TOML configuration for the dual-mode controller and its drives.

    The defaults describe the stock fit of a Vector 4: the controller at I/O
    base 0xC0, a hard disk as drive 0 and one quad density floppy as
    drive 1.
*/

use std::path::Path;

use anyhow::Error;
use serde::{Deserialize, Serialize};

use crate::{
    device_types::{hdd::HDD_DEFAULT_RPM, FloppyDriveType, HardDiskType},
    devices::dualmode::{registers::DUALMODE_DEFAULT_IO_BASE, FLOPPY_SLOTS},
    error::ControllerError,
};

fn default_io_base() -> u16 {
    DUALMODE_DEFAULT_IO_BASE
}

fn default_rpm() -> u32 {
    HDD_DEFAULT_RPM
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloppyDriveConfig {
    pub slot: usize,
    #[serde(rename = "type", default)]
    pub drive_type: FloppyDriveType,
    #[serde(default = "default_true")]
    pub disk_inserted: bool,
    #[serde(default)]
    pub write_protected: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HardDiskConfig {
    #[serde(rename = "type", default)]
    pub hdd_type: HardDiskType,
    #[serde(default = "default_rpm")]
    pub rpm: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DualModeConfig {
    #[serde(default = "default_io_base")]
    pub io_base: u16,
    #[serde(default)]
    pub floppy: Vec<FloppyDriveConfig>,
    #[serde(default)]
    pub hard_disk: Option<HardDiskConfig>,
}

impl Default for DualModeConfig {
    fn default() -> Self {
        Self {
            io_base: DUALMODE_DEFAULT_IO_BASE,
            floppy: vec![FloppyDriveConfig {
                slot: 1,
                drive_type: FloppyDriveType::Floppy525Qd,
                disk_inserted: true,
                write_protected: false,
            }],
            hard_disk: Some(HardDiskConfig {
                hdd_type: HardDiskType::Generic,
                rpm: HDD_DEFAULT_RPM,
            }),
        }
    }
}

impl DualModeConfig {
    pub fn from_toml_str(toml_string: impl AsRef<str>) -> Result<Self, Error> {
        let config: DualModeConfig = toml::from_str(toml_string.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let toml_string = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            anyhow::anyhow!(
                "Error reading controller configuration file '{:?}': {}",
                path.as_ref(),
                e
            )
        })?;
        Self::from_toml_str(toml_string)
    }

    pub fn validate(&self) -> Result<(), ControllerError> {
        let mut used = [false; FLOPPY_SLOTS];
        for fdc in self.floppy.iter() {
            if fdc.slot >= FLOPPY_SLOTS {
                return Err(ControllerError::InvalidDriveSlot(fdc.slot));
            }
            if used[fdc.slot] {
                return Err(ControllerError::InvalidConfig(format!(
                    "floppy slot {} configured twice",
                    fdc.slot
                )));
            }
            used[fdc.slot] = true;
        }
        if used[0] && self.hard_disk.is_some() {
            log::warn!("Floppy drive 0 is shadowed by the hard disk and will never be selected");
        }
        if let Some(hdc) = &self.hard_disk {
            if hdc.rpm == 0 {
                return Err(ControllerError::InvalidConfig(String::from("hard disk rpm must be nonzero")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_field_defaults() {
        let config = DualModeConfig::from_toml_str("").unwrap();
        assert_eq!(config.io_base, 0xC0);
        assert!(config.floppy.is_empty());
        assert!(config.hard_disk.is_none());
    }

    #[test]
    fn parses_drive_tables() {
        let config = DualModeConfig::from_toml_str(
            r#"
            io_base = 0xC4

            [[floppy]]
            slot = 2
            type = "Floppy525Dd"
            write_protected = true

            [hard_disk]
            type = "St412"
            "#,
        )
        .unwrap();

        assert_eq!(config.io_base, 0xC4);
        assert_eq!(
            config.floppy,
            vec![FloppyDriveConfig {
                slot: 2,
                drive_type: FloppyDriveType::Floppy525Dd,
                disk_inserted: true,
                write_protected: true,
            }]
        );
        let hdc = config.hard_disk.unwrap();
        assert_eq!(hdc.hdd_type, HardDiskType::St412);
        assert_eq!(hdc.rpm, HDD_DEFAULT_RPM);
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dualmode.toml");
        std::fs::write(&path, "io_base = 0xC8\n\n[hard_disk]\ntype = \"St506\"\nrpm = 3750\n").unwrap();

        let config = DualModeConfig::from_file(&path).unwrap();
        assert_eq!(config.io_base, 0xC8);
        let hdc = config.hard_disk.unwrap();
        assert_eq!(hdc.hdd_type, HardDiskType::St506);
        assert_eq!(hdc.rpm, 3750);
    }

    #[test]
    fn missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = DualModeConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn rejects_bad_slot() {
        let err = DualModeConfig::from_toml_str("[[floppy]]\nslot = 4\n").unwrap_err();
        assert!(err.to_string().contains("slot"));
    }

    #[test]
    fn rejects_duplicate_slot() {
        let mut config = DualModeConfig::default();
        config.floppy.push(config.floppy[0].clone());
        assert!(matches!(config.validate(), Err(ControllerError::InvalidConfig(_))));
    }
}
