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

    device_traits::hard_disk.rs

    Interface to an ST-506 style hard disk that stores MFM words.
*/

use crate::time::VirtualTime;

pub trait HardDisk {
    fn select_head(&mut self, head: u8);
    /// Drive the step line. The drive moves one cylinder on the asserting edge.
    fn set_step(&mut self, asserted: bool);
    /// Set the step direction. `true` steps toward the spindle.
    fn set_direction(&mut self, inward: bool);
    fn ready(&self) -> bool;
    fn track0(&self) -> bool;
    fn seek_complete(&self) -> bool;
    /// Number of heads actually fitted.
    fn heads(&self) -> u8;
    /// Return the first index pulse at or after `from`.
    fn next_index_pulse(&self, from: VirtualTime) -> Option<VirtualTime>;
    /// Read the 16-cell MFM word under the head at `tm`, i.e. the word whose cells contain
    /// `tm`, even when `tm` falls part way through it. On success `tm` is advanced to the
    /// end of that word, which is the start of the next. Returns `None`, leaving `tm`
    /// untouched, if the word ends after `limit`.
    fn read(&mut self, tm: &mut VirtualTime, limit: VirtualTime) -> Option<u16>;
    /// Write the 16-cell MFM word under the head at `tm`, advancing `tm` past it. The word
    /// is located the same way as for `read`. Returns `false` if the word
    /// would end after `limit`.
    fn write(
        &mut self,
        tm: &mut VirtualTime,
        limit: VirtualTime,
        word: u16,
        write_precomp: bool,
        reduced_write_current: bool,
    ) -> bool;
}
