//! Shared test doubles: a recording panel that emulates controller GRAM,
//! a transport that fails on demand, and synthetic glyph tables.
#![allow(dead_code)]

use std::collections::BTreeSet;

use display_interface::{DataFormat, DisplayError, WriteOnlyDataCommand};
use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use st7789_lcd::font::{FIRST_CHAR, GLYPH_COUNT};
use st7789_lcd::{FontSet, FontSize, GlyphTable};

pub const CASET: u8 = 0x2A;
pub const RASET: u8 = 0x2B;
pub const RAMWR: u8 = 0x2C;
pub const MADCTL: u8 = 0x36;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Op {
    Command(u8),
    Data(Vec<u8>),
}

/// Records every transport write and replays RAM writes into a square GRAM,
/// advancing column first and wrapping at the latched window edges.
pub struct MockPanel {
    pub ops: Vec<Op>,
    side: usize,
    gram: Vec<u16>,
    last_cmd: Option<u8>,
    cols: (u16, u16),
    rows: (u16, u16),
    cursor: (u16, u16),
    windows: Vec<(u16, u16, u16, u16)>,
    madctl: Option<u8>,
    pending: Option<u8>,
}

impl MockPanel {
    pub fn new(side: usize) -> Self {
        Self {
            ops: Vec::new(),
            side,
            gram: vec![0; side * side],
            last_cmd: None,
            cols: (0, 0),
            rows: (0, 0),
            cursor: (0, 0),
            windows: Vec::new(),
            madctl: None,
            pending: None,
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Rgb565 {
        Rgb565::from(RawU16::new(self.gram[y * self.side + x]))
    }

    /// Coordinates of every pixel painted with `color`.
    pub fn painted(&self, color: Rgb565) -> BTreeSet<(i32, i32)> {
        let raw = color.into_storage();
        self.gram
            .iter()
            .enumerate()
            .filter(|(_, v)| **v == raw)
            .map(|(i, _)| ((i % self.side) as i32, (i / self.side) as i32))
            .collect()
    }

    pub fn count(&self, color: Rgb565) -> usize {
        let raw = color.into_storage();
        self.gram.iter().filter(|v| **v == raw).count()
    }

    pub fn commands(&self) -> Vec<u8> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Command(c) => Some(*c),
                Op::Data(_) => None,
            })
            .collect()
    }

    /// Latched windows as inclusive `(x0, y0, x1, y1)`, in order.
    pub fn windows(&self) -> &[(u16, u16, u16, u16)] {
        &self.windows
    }

    pub fn ram_writes(&self) -> usize {
        self.commands().iter().filter(|c| **c == RAMWR).count()
    }

    /// Data write lengths following the most recent RAM-write command.
    pub fn last_stream_chunks(&self) -> Vec<usize> {
        let start = self
            .ops
            .iter()
            .rposition(|op| *op == Op::Command(RAMWR))
            .map_or(self.ops.len(), |i| i + 1);
        self.ops[start..]
            .iter()
            .map_while(|op| match op {
                Op::Data(d) => Some(d.len()),
                Op::Command(_) => None,
            })
            .collect()
    }

    /// Parameter bytes sent right after the first `cmd`.
    pub fn params_of(&self, cmd: u8) -> Option<&[u8]> {
        let i = self.ops.iter().position(|op| *op == Op::Command(cmd))?;
        match self.ops.get(i + 1) {
            Some(Op::Data(d)) => Some(d),
            _ => None,
        }
    }

    pub fn madctl(&self) -> Option<u8> {
        self.madctl
    }

    /// Forget recorded traffic; GRAM contents stay.
    pub fn clear_log(&mut self) {
        self.ops.clear();
        self.windows.clear();
    }

    fn range(bytes: &[u8]) -> (u16, u16) {
        (
            u16::from_be_bytes([bytes[0], bytes[1]]),
            u16::from_be_bytes([bytes[2], bytes[3]]),
        )
    }

    fn put(&mut self, raw: u16) {
        let (x, y) = self.cursor;
        if (x as usize) < self.side && (y as usize) < self.side {
            self.gram[y as usize * self.side + x as usize] = raw;
        }
        let (mut x, mut y) = (x + 1, y);
        if x > self.cols.1 {
            x = self.cols.0;
            y += 1;
            if y > self.rows.1 {
                y = self.rows.0;
            }
        }
        self.cursor = (x, y);
    }
}

impl WriteOnlyDataCommand for MockPanel {
    fn send_commands(&mut self, cmd: DataFormat<'_>) -> Result<(), DisplayError> {
        let DataFormat::U8(bytes) = cmd else {
            return Err(DisplayError::DataFormatNotImplemented);
        };
        for &c in bytes {
            self.ops.push(Op::Command(c));
            self.last_cmd = Some(c);
            if c == RAMWR {
                self.cursor = (self.cols.0, self.rows.0);
                self.pending = None;
            }
        }
        Ok(())
    }

    fn send_data(&mut self, buf: DataFormat<'_>) -> Result<(), DisplayError> {
        let DataFormat::U8(bytes) = buf else {
            return Err(DisplayError::DataFormatNotImplemented);
        };
        self.ops.push(Op::Data(bytes.to_vec()));
        match self.last_cmd {
            Some(CASET) => self.cols = Self::range(bytes),
            Some(RASET) => {
                self.rows = Self::range(bytes);
                self.windows
                    .push((self.cols.0, self.rows.0, self.cols.1, self.rows.1));
            }
            Some(MADCTL) => self.madctl = bytes.first().copied(),
            Some(RAMWR) => {
                for &b in bytes {
                    match self.pending.take() {
                        Some(hi) => self.put(u16::from_be_bytes([hi, b])),
                        None => self.pending = Some(b),
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Accepts writes until the `fail_at`-th one (zero-based), which errors.
pub struct FailingPanel {
    pub fail_at: usize,
    pub attempts: usize,
}

impl FailingPanel {
    pub fn new(fail_at: usize) -> Self {
        Self { fail_at, attempts: 0 }
    }

    fn write(&mut self) -> Result<(), DisplayError> {
        let n = self.attempts;
        self.attempts += 1;
        if n == self.fail_at {
            Err(DisplayError::BusWriteError)
        } else {
            Ok(())
        }
    }
}

impl WriteOnlyDataCommand for FailingPanel {
    fn send_commands(&mut self, _cmd: DataFormat<'_>) -> Result<(), DisplayError> {
        self.write()
    }

    fn send_data(&mut self, _buf: DataFormat<'_>) -> Result<(), DisplayError> {
        self.write()
    }
}

/// Glyph table whose column 0, rows 0..8, spells the character code.
/// Every other bit is clear, so a drawn cell can be read back with
/// [`decode_cell`].
pub fn coded_table(size: FontSize) -> GlyphTable {
    let n = size.bytes_per_glyph();
    let mut data = vec![0u8; GLYPH_COUNT * n];
    for i in 0..GLYPH_COUNT {
        data[i * n] = FIRST_CHAR + i as u8;
    }
    GlyphTable::new(size, Box::leak(data.into_boxed_slice())).unwrap()
}

pub fn coded_fonts() -> FontSet {
    FontSet::new()
        .with(coded_table(FontSize::Px12))
        .with(coded_table(FontSize::Px16))
}

/// Character code of a cell drawn from [`coded_table`] at `(x, y)`.
pub fn decode_cell(panel: &MockPanel, x: usize, y: usize, fg: Rgb565) -> u8 {
    (0..8).fold(0u8, |code, row| {
        (code << 1) | (panel.pixel(x, y + row) == fg) as u8
    })
}

pub fn stage(bytes: usize) -> Vec<u8> {
    vec![0u8; bytes]
}
