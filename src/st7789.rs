// ST7789 panel driver core (4-wire SPI with D/C line, RGB565).
//
// Works with any `display_interface::WriteOnlyDataCommand` transport
// (normally `display_interface_spi::SPIInterface`) and embedded-graphics.
//
// Protocol:
//   CASET (0x2A) + [x0 hi, x0 lo, x1 hi, x1 lo]   -> column range
//   RASET (0x2B) + [y0 hi, y0 lo, y1 hi, y1 lo]   -> row range
//   RAMWR (0x2C) + pixel bytes                    -> stream into the window
// The controller auto-increments column first, then row, wrapping at the
// window edges. Pixels go out as RGB565, high byte first.
//
// The driver owns the transport, the surface geometry and the staging buffer.
// Nothing in here is reentrant: one owner drives the panel.

use core::fmt;

use display_interface::{DataFormat, DisplayError, WriteOnlyDataCommand};
use embedded_graphics::{
    pixelcolor::{raw::RawU16, Rgb565},
    prelude::*,
    primitives::{PointsIter, Rectangle},
};
use log::{debug, trace};

use crate::font::{FontSet, FontSize};
use crate::stage::StagingBuffer;

// Native (portrait) panel geometry of the common 2.0"/2.4" ST7789 modules.
pub const ST7789_WIDTH: u16 = 240;
pub const ST7789_HEIGHT: u16 = 320;

/// Orientation applied by [`St7789::new_with_defaults`].
pub const DEFAULT_ORIENTATION: Orientation = Orientation::Landscape;

const MADCTL_OPCODE: u8 = 0x36;

/// Command codes used by the streaming path. Fixed per controller family.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Commands {
    pub ram_write: u8,
    pub set_column: u8,
    pub set_row: u8,
}

impl Commands {
    pub const ST7789: Commands = Commands {
        ram_write: 0x2C,
        set_column: 0x2A,
        set_row: 0x2B,
    };
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// Scan direction programmed for this orientation.
    pub fn scan_direction(self) -> ScanDirection {
        match self {
            Orientation::Portrait => ScanDirection::U2dR2l,
            Orientation::Landscape => ScanDirection::L2rU2d,
        }
    }

    #[inline]
    pub fn is_landscape(self) -> bool {
        self == Orientation::Landscape
    }
}

/// Controller traversal order. Row-major variants first, then column-major.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScanDirection {
    /// Left to right, top to bottom
    L2rU2d = 0,
    /// Left to right, bottom to top
    L2rD2u = 1,
    /// Right to left, top to bottom
    R2lU2d = 2,
    /// Right to left, bottom to top
    R2lD2u = 3,
    /// Top to bottom, left to right
    U2dL2r = 4,
    /// Top to bottom, right to left
    U2dR2l = 5,
    /// Bottom to top, left to right
    D2uL2r = 6,
    /// Bottom to top, right to left
    D2uR2l = 7,
}

// MADCTL value per scan direction, with the module's mounting rotation folded
// in. Bits: MY = 0x80, MX = 0x40, MV = 0x20.
const DIRECTION_TABLE: [u8; 8] = [0xA0, 0xE0, 0x20, 0x60, 0x80, 0x00, 0xC0, 0x40];

impl ScanDirection {
    pub const ALL: [ScanDirection; 8] = [
        ScanDirection::L2rU2d,
        ScanDirection::L2rD2u,
        ScanDirection::R2lU2d,
        ScanDirection::R2lD2u,
        ScanDirection::U2dL2r,
        ScanDirection::U2dR2l,
        ScanDirection::D2uL2r,
        ScanDirection::D2uR2l,
    ];

    /// MADCTL (0x36) register value.
    #[inline]
    pub fn register_value(self) -> u8 {
        DIRECTION_TABLE[self as usize]
    }
}

/// Drawable geometry and the command set that addresses it.
///
/// `width`/`height` are the logical extents for the current orientation;
/// landscape swaps the panel's native dimensions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    panel_width: u16,
    panel_height: u16,
    width: u16,
    height: u16,
    orientation: Orientation,
    scan: ScanDirection,
    commands: Commands,
}

impl Surface {
    /// Portrait surface over a panel with the given native size.
    pub fn new(panel_width: u16, panel_height: u16) -> Self {
        Self {
            panel_width,
            panel_height,
            width: panel_width,
            height: panel_height,
            orientation: Orientation::Portrait,
            scan: Orientation::Portrait.scan_direction(),
            commands: Commands::ST7789,
        }
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    #[inline]
    pub fn scan_direction(&self) -> ScanDirection {
        self.scan
    }

    #[inline]
    pub fn commands(&self) -> Commands {
        self.commands
    }

    /// Whether `(x, y)` is a pixel of the surface.
    #[inline]
    pub fn contains(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    /// Whether the signed point is a pixel of the surface.
    #[inline]
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && (p.x as u32) < self.width as u32 && (p.y as u32) < self.height as u32
    }

    fn orient(&mut self, orientation: Orientation) {
        let (w, h) = if orientation.is_landscape() {
            (self.panel_height, self.panel_width)
        } else {
            (self.panel_width, self.panel_height)
        };
        self.width = w;
        self.height = h;
        self.orientation = orientation;
        self.scan = orientation.scan_direction();
    }
}

/// Driver error.
#[derive(Clone, Debug)]
pub enum Error {
    /// The transport rejected a command or data write.
    Transport(DisplayError),
    /// A window, fill or image does not fit on the surface.
    OutOfBounds,
    /// Staging storage cannot hold a single pixel.
    BufferTooSmall,
    /// No font tag for this pixel height.
    UnsupportedFontSize(u8),
    /// Font tag known, but no table registered for it.
    MissingGlyphTable(FontSize),
}

// DisplayError has no PartialEq; transport errors compare by kind.
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Transport(a), Self::Transport(b)) => {
                core::mem::discriminant(a) == core::mem::discriminant(b)
            }
            (Self::OutOfBounds, Self::OutOfBounds) => true,
            (Self::BufferTooSmall, Self::BufferTooSmall) => true,
            (Self::UnsupportedFontSize(a), Self::UnsupportedFontSize(b)) => a == b,
            (Self::MissingGlyphTable(a), Self::MissingGlyphTable(b)) => a == b,
            _ => false,
        }
    }
}

impl From<DisplayError> for Error {
    fn from(e: DisplayError) -> Self {
        Self::Transport(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "display transport error: {:?}", e),
            Self::OutOfBounds => write!(f, "region outside the display surface"),
            Self::BufferTooSmall => write!(f, "staging buffer smaller than one pixel"),
            Self::UnsupportedFontSize(px) => write!(f, "unsupported font size: {}", px),
            Self::MissingGlyphTable(size) => write!(f, "no glyph table for {:?}", size),
        }
    }
}

/// ST7789 driver context: transport, surface geometry, staging buffer, fonts.
///
/// Implements `DrawTarget<Color = Rgb565>`; the embedded-graphics paths reuse
/// the same windowed streaming engine as the native drawing calls.
pub struct St7789<'buf, DI> {
    di: DI,
    surface: Surface,
    stage: StagingBuffer<'buf>,
    fonts: FontSet,
}

impl<'buf, DI> St7789<'buf, DI>
where
    DI: WriteOnlyDataCommand,
{
    /// Wrap a transport. Sends nothing; the surface starts in portrait.
    ///
    /// * `di` - command/data transport (e.g. `SPIInterface`)
    /// * `panel_width`, `panel_height` - native portrait size, 240x320 for most modules
    /// * `stage` - staging storage, see [`DEFAULT_STAGE_BYTES`](crate::stage::DEFAULT_STAGE_BYTES)
    pub fn new(
        di: DI,
        panel_width: u16,
        panel_height: u16,
        stage: &'buf mut [u8],
    ) -> Result<Self, Error> {
        if panel_width == 0 || panel_height == 0 {
            return Err(Error::OutOfBounds);
        }
        let stage = StagingBuffer::new(stage).ok_or(Error::BufferTooSmall)?;
        Ok(Self {
            di,
            surface: Surface::new(panel_width, panel_height),
            stage,
            fonts: FontSet::new(),
        })
    }

    /// 240x320 panel, programmed for [`DEFAULT_ORIENTATION`].
    pub fn new_with_defaults(di: DI, stage: &'buf mut [u8]) -> Result<Self, Error> {
        let mut this = Self::new(di, ST7789_WIDTH, ST7789_HEIGHT, stage)?;
        this.set_orientation(DEFAULT_ORIENTATION)?;
        Ok(this)
    }

    pub fn with_fonts(mut self, fonts: FontSet) -> Self {
        self.fonts = fonts;
        self
    }

    #[inline]
    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    #[inline]
    pub fn fonts_mut(&mut self) -> &mut FontSet {
        &mut self.fonts
    }

    #[inline]
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    // Logical width in pixels.
    #[inline]
    pub fn width(&self) -> u16 {
        self.surface.width
    }

    // Logical height in pixels.
    #[inline]
    pub fn height(&self) -> u16 {
        self.surface.height
    }

    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.surface.orientation
    }

    #[inline]
    pub fn interface(&self) -> &DI {
        &self.di
    }

    #[inline]
    pub fn interface_mut(&mut self) -> &mut DI {
        &mut self.di
    }

    /// Give the transport back.
    pub fn release(self) -> DI {
        self.di
    }

    // ---- Window & addressing ----

    /// Latch the window `(x, y)`..`(x + width - 1, y + height - 1)`.
    ///
    /// Rejects empty or off-surface regions before anything is sent.
    pub fn set_window(&mut self, x: u16, y: u16, width: u16, height: u16) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Err(Error::OutOfBounds);
        }
        let x1 = x as u32 + width as u32 - 1;
        let y1 = y as u32 + height as u32 - 1;
        if x1 >= self.surface.width as u32 || y1 >= self.surface.height as u32 {
            return Err(Error::OutOfBounds);
        }
        self.write_window(x, y, x1 as u16, y1 as u16)
    }

    /// Single-pixel window at `(x, y)`.
    #[inline]
    pub fn set_cursor(&mut self, x: u16, y: u16) -> Result<(), Error> {
        self.set_window(x, y, 1, 1)
    }

    /// Inclusive-corner form of [`set_window`](Self::set_window).
    pub fn set_window_corners(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<(), Error> {
        if x0 > x1 || y0 > y1 || !self.surface.contains(x1, y1) {
            return Err(Error::OutOfBounds);
        }
        self.write_window(x0, y0, x1, y1)
    }

    // Column range, then row range, big-endian. Callers have checked bounds.
    fn write_window(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<(), Error> {
        trace!("window ({}, {})..=({}, {})", x0, y0, x1, y1);

        let ca = [(x0 >> 8) as u8, (x0 & 0xFF) as u8, (x1 >> 8) as u8, (x1 & 0xFF) as u8];
        let ra = [(y0 >> 8) as u8, (y0 & 0xFF) as u8, (y1 >> 8) as u8, (y1 & 0xFF) as u8];

        let Commands { set_column, set_row, .. } = self.surface.commands;
        self.cmd(set_column, &ca)?;
        self.cmd(set_row, &ra)?;
        Ok(())
    }

    /// Switch orientation: swap extents, program the scan direction and
    /// re-latch the full window.
    ///
    /// The surface only changes once the panel has accepted both writes.
    pub fn set_orientation(&mut self, orientation: Orientation) -> Result<(), Error> {
        let mut next = self.surface;
        next.orient(orientation);
        self.program_scan(orientation.scan_direction(), next.width, next.height)?;
        self.surface = next;
        debug!(
            "orientation {:?}: {}x{}",
            orientation, self.surface.width, self.surface.height
        );
        Ok(())
    }

    #[inline]
    pub fn set_portrait(&mut self) -> Result<(), Error> {
        self.set_orientation(Orientation::Portrait)
    }

    #[inline]
    pub fn set_landscape(&mut self) -> Result<(), Error> {
        self.set_orientation(Orientation::Landscape)
    }

    /// Program MADCTL from the direction table and re-latch the full window.
    ///
    /// Extents are left as they are; pick a direction that matches them.
    pub fn set_scan_direction(&mut self, dir: ScanDirection) -> Result<(), Error> {
        self.program_scan(dir, self.surface.width, self.surface.height)?;
        self.surface.scan = dir;
        Ok(())
    }

    fn program_scan(&mut self, dir: ScanDirection, width: u16, height: u16) -> Result<(), Error> {
        let regval = dir.register_value();
        debug!("scan direction {:?} -> MADCTL {:#04x}", dir, regval);
        self.cmd(MADCTL_OPCODE, &[regval])?;
        self.write_window(0, 0, width - 1, height - 1)
    }

    // ---- Streaming ----

    /// RAM-write followed by `count` pixels of `color` into the latched window.
    pub(crate) fn stream_solid(&mut self, color: Rgb565, count: usize) -> Result<(), Error> {
        if count == 0 {
            return Ok(());
        }
        let ramwr = self.surface.commands.ram_write;
        self.cmd(ramwr, &[])?;
        self.stage.flush_solid(&mut self.di, color, count)?;
        Ok(())
    }

    /// RAM-write followed by up to `count` pixels pulled from `colors`.
    pub(crate) fn stream_colors<I>(&mut self, colors: I, count: usize) -> Result<usize, Error>
    where
        I: IntoIterator<Item = Rgb565>,
    {
        if count == 0 {
            return Ok(0);
        }
        let ramwr = self.surface.commands.ram_write;
        self.cmd(ramwr, &[])?;
        Ok(self.stage.flush_stream(&mut self.di, colors, count)?)
    }

    /// Fill the whole surface.
    pub fn clear(&mut self, color: Rgb565) -> Result<(), Error> {
        let (w, h) = (self.surface.width, self.surface.height);
        self.set_window(0, 0, w, h)?;
        self.stream_solid(color, w as usize * h as usize)
    }

    /// Blit a `width` x `height` image, row-major.
    pub fn draw_image(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        pixels: &[Rgb565],
    ) -> Result<(), Error> {
        let total = width as usize * height as usize;
        if pixels.len() != total {
            return Err(Error::OutOfBounds);
        }
        if total == 0 {
            return Ok(());
        }
        self.set_window(x, y, width, height)?;
        self.stream_colors(pixels.iter().copied(), total)?;
        Ok(())
    }

    /// Push raw RGB565 words into the inclusive area `(x1, y1)..=(x2, y2)`.
    ///
    /// Meant as the flush hook of a GUI toolkit rendering into its own buffer.
    pub fn flush_area(
        &mut self,
        x1: u16,
        y1: u16,
        x2: u16,
        y2: u16,
        data: &[u16],
    ) -> Result<(), Error> {
        if x1 > x2 || y1 > y2 {
            return Err(Error::OutOfBounds);
        }
        let total = (x2 - x1 + 1) as usize * (y2 - y1 + 1) as usize;
        if data.len() < total {
            return Err(Error::OutOfBounds);
        }
        self.set_window_corners(x1, y1, x2, y2)?;
        self.stream_colors(data.iter().map(|&raw| Rgb565::from(RawU16::new(raw))), total)?;
        Ok(())
    }

    // ---- Low-level helpers ----

    fn cmd(&mut self, cmd: u8, data: &[u8]) -> Result<(), Error> {
        self.di.send_commands(DataFormat::U8(&[cmd]))?;
        if !data.is_empty() {
            self.di.send_data(DataFormat::U8(data))?;
        }
        Ok(())
    }
}

// -------------------- embedded-graphics integration --------------------
impl<DI> OriginDimensions for St7789<'_, DI>
where
    DI: WriteOnlyDataCommand,
{
    fn size(&self) -> Size {
        Size::new(self.surface.width as u32, self.surface.height as u32)
    }
}

impl<DI> DrawTarget for St7789<'_, DI>
where
    DI: WriteOnlyDataCommand,
{
    type Color = Rgb565;
    type Error = Error;

    // Per-pixel path; off-surface pixels are dropped.
    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Rgb565>>,
    {
        for Pixel(p, c) in pixels {
            if !self.surface.contains_point(p) {
                continue;
            }
            self.draw_point(p.x as u16, p.y as u16, c)?;
        }
        Ok(())
    }

    // FAST PATH: one window, one stream for images and gradients
    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Rgb565>,
    {
        let visible = area.intersection(&self.bounding_box());
        let Some(br) = visible.bottom_right() else {
            return Ok(());
        };
        let tl = visible.top_left;
        self.set_window_corners(tl.x as u16, tl.y as u16, br.x as u16, br.y as u16)?;

        // Row-major walk of the full area, keeping only the visible part
        let count = visible.size.width as usize * visible.size.height as usize;
        let colors = area
            .points()
            .zip(colors)
            .filter(move |(p, _)| visible.contains(*p))
            .map(|(_, c)| c);
        self.stream_colors(colors, count)?;
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Rgb565) -> Result<(), Self::Error> {
        let visible = area.intersection(&self.bounding_box());
        let Some(br) = visible.bottom_right() else {
            return Ok(());
        };
        let tl = visible.top_left;
        self.fill_rect(tl.x as u16, tl.y as u16, br.x as u16, br.y as u16, color)
    }

    fn clear(&mut self, color: Rgb565) -> Result<(), Self::Error> {
        St7789::clear(self, color)
    }
}
