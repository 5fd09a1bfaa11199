#![no_std]

pub mod font;
pub mod raster;
pub mod stage;
pub mod st7789;
pub mod text;

#[cfg(feature = "esp32s3")]
pub mod display;
#[cfg(feature = "esp32s3")]
pub mod wiring;

pub use font::{FontSet, FontSize, GlyphTable};
pub use raster::{Bresenham, MidpointCircle, PointList};
pub use stage::{StagingBuffer, DEFAULT_STAGE_BYTES};
pub use st7789::{
    Commands, Error, Orientation, ScanDirection, St7789, Surface, DEFAULT_ORIENTATION,
    ST7789_HEIGHT, ST7789_WIDTH,
};
pub use text::{GlyphMode, NumberStyle};
