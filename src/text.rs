//! Glyph renderer: characters, strings and fixed-width numbers.
//!
//! Opaque glyphs are streamed as one full cell (set bits in the text color,
//! clear bits in the background). Overlay glyphs only touch set bits, so
//! whatever is underneath shows through, at the price of one transfer per
//! lit pixel.
//!
//! A cell that would cross the surface edge is skipped without error.

use display_interface::WriteOnlyDataCommand;
use embedded_graphics::pixelcolor::Rgb565;
use log::{trace, warn};

use crate::font::{FontSize, GlyphTable, FIRST_CHAR, LAST_CHAR};
use crate::st7789::{Error, St7789};

/// How clear glyph bits are treated.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum GlyphMode {
    /// Clear bits are painted with the background color.
    #[default]
    Opaque,
    /// Clear bits are left untouched.
    Overlay,
}

/// Options for [`St7789::draw_number_ext`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct NumberStyle {
    /// Render leading zeros as `0` instead of blanks.
    pub zero_pad: bool,
    pub mode: GlyphMode,
}

#[inline]
fn is_printable(ch: u8) -> bool {
    (FIRST_CHAR..=LAST_CHAR).contains(&ch)
}

impl<'buf, DI> St7789<'buf, DI>
where
    DI: WriteOnlyDataCommand,
{
    // Size tag + registered table, logging why when there is none.
    fn glyph_table(&self, size: u8) -> Result<GlyphTable, Error> {
        let tag = FontSize::from_px(size).inspect_err(|_| {
            warn!("unsupported font size: {}", size);
        })?;
        self.fonts().get(tag).copied().ok_or_else(|| {
            warn!("no glyph table registered for {:?}", tag);
            Error::MissingGlyphTable(tag)
        })
    }

    /// Draw one character cell with its top-left corner at `(x, y)`.
    ///
    /// `size` is the cell height in pixels (12 or 16); anything else is
    /// reported as [`Error::UnsupportedFontSize`] and nothing is drawn.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_char(
        &mut self,
        x: u16,
        y: u16,
        ch: u8,
        size: u8,
        mode: GlyphMode,
        color: Rgb565,
        bg: Rgb565,
    ) -> Result<(), Error> {
        let table = self.glyph_table(size)?;
        self.draw_glyph(&table, x as u32, y as u32, ch, mode, color, bg)
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_glyph(
        &mut self,
        table: &GlyphTable,
        x: u32,
        y: u32,
        ch: u8,
        mode: GlyphMode,
        color: Rgb565,
        bg: Rgb565,
    ) -> Result<(), Error> {
        let Some(glyph) = table.glyph(ch) else {
            trace!("no glyph for {:#04x}", ch);
            return Ok(());
        };
        let (w, h) = (glyph.width(), glyph.height());
        if x + w as u32 > self.width() as u32 || y + h as u32 > self.height() as u32 {
            trace!("glyph at ({}, {}) off-surface, skipped", x, y);
            return Ok(());
        }
        let (x, y) = (x as u16, y as u16);

        match mode {
            GlyphMode::Opaque => {
                self.set_window(x, y, w, h)?;
                let cells = glyph.row_major().map(|on| if on { color } else { bg });
                self.stream_colors(cells, w as usize * h as usize)?;
            }
            GlyphMode::Overlay => {
                for row in 0..h {
                    for col in 0..w {
                        if glyph.is_set(col, row) {
                            self.draw_point(x + col, y + row, color)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Lay out `text` inside the box at `(x, y)` sized `box_width` x `box_height`.
    ///
    /// Characters advance by the glyph width and wrap to the next row when
    /// the next one would cross the right edge; drawing stops once a row
    /// would cross the bottom edge, or at the first byte outside printable
    /// ASCII. Wrapping is per character.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_string(
        &mut self,
        x: u16,
        y: u16,
        box_width: u16,
        box_height: u16,
        size: u8,
        text: &str,
        color: Rgb565,
        bg: Rgb565,
    ) -> Result<(), Error> {
        let table = self.glyph_table(size)?;
        let gw = table.size().glyph_width() as u32;
        let gh = table.size().glyph_height() as u32;
        if gw > box_width as u32 {
            return Ok(());
        }

        let right = x as u32 + box_width as u32;
        let bottom = y as u32 + box_height as u32;
        let (mut cx, mut cy) = (x as u32, y as u32);

        for ch in text.bytes() {
            if !is_printable(ch) {
                break;
            }
            if cx + gw > right {
                cx = x as u32;
                cy += gh;
            }
            if cy + gh > bottom {
                break;
            }
            self.draw_glyph(&table, cx, cy, ch, GlyphMode::Opaque, color, bg)?;
            cx += gw;
        }
        Ok(())
    }

    /// `num` as `len` decimal digits, most significant first.
    ///
    /// Leading zeros are blank; the last digit is always drawn.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_number(
        &mut self,
        x: u16,
        y: u16,
        num: u32,
        len: u8,
        size: u8,
        color: Rgb565,
        bg: Rgb565,
    ) -> Result<(), Error> {
        self.draw_number_ext(x, y, num, len, size, NumberStyle::default(), color, bg)
    }

    /// [`draw_number`](Self::draw_number) with zero padding and overlay control.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_number_ext(
        &mut self,
        x: u16,
        y: u16,
        num: u32,
        len: u8,
        size: u8,
        style: NumberStyle,
        color: Rgb565,
        bg: Rgb565,
    ) -> Result<(), Error> {
        let table = self.glyph_table(size)?;
        let gw = table.size().glyph_width() as u32;
        let mut leading = true;

        for t in 0..len {
            let place = (len - t - 1) as u32;
            // Places past u64 range are zero
            let digit = 10u64
                .checked_pow(place)
                .map_or(0, |p| (num as u64 / p) % 10) as u8;

            let ch = if leading && t + 1 < len && digit == 0 {
                if style.zero_pad {
                    b'0'
                } else {
                    b' '
                }
            } else {
                leading = false;
                b'0' + digit
            };

            let cx = x as u32 + gw * t as u32;
            self.draw_glyph(&table, cx, y as u32, ch, style.mode, color, bg)?;
        }
        Ok(())
    }
}
