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

    mfm.rs

    Byte-level MFM codec for the Micropolis-style hard-sectored format used by
    the dual-mode controller. The format never writes abnormal clock bits, so
    a byte is always the data bits interleaved with clocks derived from the
    data itself and the last bit of the previous byte.
*/

/// MFM encoding of a 0x00 byte following a byte with a clear low bit. Fills gaps and preambles.
pub const MFM_GAP_WORD: u16 = 0xAAAA;
/// MFM encoding of the 0xFF sync byte that follows the 0x00 preamble.
pub const MFM_SYNC_WORD: u16 = 0x5555;
/// The last 16 cells seen by the data separator one bit into the sync byte, with the
/// preamble behind it.
pub const MFM_SYNC_EDGE: u16 = 0x5554;

const DATA_MASK: u16 = 0x5555;

/// Interleave 8 bits with zeros. abcdefgh -> 0a0b0c0d0e0f0g0h
#[inline]
fn deposit8(data: u16) -> u16 {
    let mut d = data & 0x00ff;
    d = ((d & 0xf0) << 4) | (d & 0x0f);
    d = ((d << 2) | d) & 0x3333;
    d = ((d << 1) | d) & 0x5555;
    d
}

/// Encode `data` as a 16-bit MFM word. `prev` supplies the last data bit written, which
/// decides the first clock bit.
#[inline]
pub fn encode(data: u8, prev: u8) -> u16 {
    let ext_data = data as u16 | ((prev as u16) << 8);
    let clock = !(ext_data | (ext_data >> 1));
    (deposit8(clock) << 1) | deposit8(ext_data)
}

/// Decode a 16-bit MFM word by compacting the data cells. Clock cells are ignored.
#[inline]
pub fn decode(mfm: u16) -> u8 {
    let mut d = mfm & DATA_MASK;
    d = ((d >> 1) | d) & 0x3333;
    d = ((d >> 2) | d) & 0x0f0f;
    d = ((d >> 4) | d) & 0x00ff;
    d as u8
}

/// Encode a run of bytes, chaining each byte's clock context from the one before it.
pub fn encode_slice(data: &[u8], mut prev: u8, out: &mut Vec<u16>) {
    out.reserve(data.len());
    for &byte in data {
        out.push(encode(byte, prev));
        prev = byte;
    }
}
