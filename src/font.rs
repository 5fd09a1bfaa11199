//! Glyph-table descriptors.
//!
//! The bitmap tables themselves are supplied by the application; this module
//! only describes their layout and dispatches on an enumerated size tag.
//!
//! Layout of one glyph (width = size / 2, height = size):
//! - stored column by column, left to right
//! - each column is `ceil(size / 8)` bytes, MSB first, top row first
//! - bits past `size` in a column's last byte are padding
//!
//! A table holds 95 glyphs for printable ASCII `0x20..=0x7E`, in code order.

use crate::st7789::Error;

/// First printable ASCII code covered by a table.
pub const FIRST_CHAR: u8 = 0x20;
/// Last printable ASCII code covered by a table.
pub const LAST_CHAR: u8 = 0x7E;
/// Glyph count in every table.
pub const GLYPH_COUNT: usize = (LAST_CHAR - FIRST_CHAR + 1) as usize;

/// Supported glyph heights.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FontSize {
    /// 6x12 cell
    Px12,
    /// 8x16 cell
    Px16,
}

impl FontSize {
    pub const ALL: [FontSize; 2] = [FontSize::Px12, FontSize::Px16];
    pub const COUNT: usize = Self::ALL.len();

    /// Map a pixel height to its tag.
    pub fn from_px(px: u8) -> Result<Self, Error> {
        match px {
            12 => Ok(FontSize::Px12),
            16 => Ok(FontSize::Px16),
            other => Err(Error::UnsupportedFontSize(other)),
        }
    }

    #[inline]
    pub fn px(self) -> u16 {
        match self {
            FontSize::Px12 => 12,
            FontSize::Px16 => 16,
        }
    }

    #[inline]
    pub fn glyph_width(self) -> u16 {
        self.px() / 2
    }

    #[inline]
    pub fn glyph_height(self) -> u16 {
        self.px()
    }

    /// Bytes per glyph column.
    #[inline]
    pub fn column_bytes(self) -> usize {
        (self.px() as usize).div_ceil(8)
    }

    #[inline]
    pub fn bytes_per_glyph(self) -> usize {
        self.column_bytes() * self.glyph_width() as usize
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for FontSize {
    type Error = Error;

    fn try_from(px: u8) -> Result<Self, Self::Error> {
        FontSize::from_px(px)
    }
}

/// One size's bitmap table.
#[derive(Copy, Clone, Debug)]
pub struct GlyphTable {
    size: FontSize,
    data: &'static [u8],
}

impl GlyphTable {
    /// Describe a table. `data` must hold exactly 95 glyphs of `size`.
    pub fn new(size: FontSize, data: &'static [u8]) -> Result<Self, Error> {
        if data.len() != GLYPH_COUNT * size.bytes_per_glyph() {
            return Err(Error::OutOfBounds);
        }
        Ok(Self { size, data })
    }

    #[inline]
    pub fn size(&self) -> FontSize {
        self.size
    }

    /// Raw bytes for `ch`, or `None` outside printable ASCII.
    pub fn glyph(&self, ch: u8) -> Option<Glyph<'static>> {
        if !(FIRST_CHAR..=LAST_CHAR).contains(&ch) {
            return None;
        }
        let n = self.size.bytes_per_glyph();
        let start = (ch - FIRST_CHAR) as usize * n;
        self.data.get(start..start + n).map(|bits| Glyph {
            size: self.size,
            bits,
        })
    }
}

/// A borrowed glyph bitmap.
#[derive(Copy, Clone, Debug)]
pub struct Glyph<'a> {
    size: FontSize,
    bits: &'a [u8],
}

impl Glyph<'_> {
    #[inline]
    pub fn width(&self) -> u16 {
        self.size.glyph_width()
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.size.glyph_height()
    }

    /// Whether the pixel at column `col`, row `row` is set.
    pub fn is_set(&self, col: u16, row: u16) -> bool {
        if col >= self.width() || row >= self.height() {
            return false;
        }
        let idx = col as usize * self.size.column_bytes() + row as usize / 8;
        let mask = 0x80u8 >> (row % 8);
        self.bits.get(idx).is_some_and(|b| b & mask != 0)
    }

    /// Cell pixels in window order (row-major), `true` for set bits.
    pub fn row_major(&self) -> impl Iterator<Item = bool> + '_ {
        let (w, h) = (self.width(), self.height());
        (0..h).flat_map(move |row| (0..w).map(move |col| self.is_set(col, row)))
    }
}

/// Registered tables, indexed by size tag.
#[derive(Copy, Clone, Debug, Default)]
pub struct FontSet {
    tables: [Option<GlyphTable>; FontSize::COUNT],
}

impl FontSet {
    pub const fn new() -> Self {
        Self {
            tables: [None; FontSize::COUNT],
        }
    }

    /// Add or replace the table for its size.
    pub fn register(&mut self, table: GlyphTable) -> &mut Self {
        self.tables[table.size().index()] = Some(table);
        self
    }

    pub fn with(mut self, table: GlyphTable) -> Self {
        self.register(table);
        self
    }

    pub fn get(&self, size: FontSize) -> Option<&GlyphTable> {
        self.tables[size.index()].as_ref()
    }
}
