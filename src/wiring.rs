// LCD pin mapping for the ESP32-S3 board.
//! The following wiring is assumed:
//! - LCD SCK  => GPIO10
//! - LCD MOSI => GPIO11
//! - LCD CS   => GPIO9
//! - LCD DC   => GPIO8
//! - LCD RST  => GPIO14
//! - LCD BL   => GPIO2 (backlight enable, active high)
//! Only the pins are claimed here; the SPI bus itself is built in `display.rs`.

use esp_backtrace as _;
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::peripherals::{Peripherals, GPIO10, GPIO11, SPI2};

pub struct LcdPins<'a> {
    pub spi2: SPI2<'a>,
    pub sck: GPIO10<'a>,  // handed to SPI2 untouched
    pub mosi: GPIO11<'a>, // handed to SPI2 untouched
    pub cs: Output<'a>,   // GPIO9
    pub dc: Output<'a>,   // GPIO8
    pub rst: Output<'a>,  // GPIO14
    pub bl: Output<'a>,   // GPIO2
}

pub fn init_lcd_pins<'a>(p: Peripherals) -> LcdPins<'a> {
    // CS idles high, DC starts in command mode, RST released, backlight off
    let cs = Output::new(p.GPIO9, Level::High, OutputConfig::default());
    let dc = Output::new(p.GPIO8, Level::Low, OutputConfig::default());
    let rst = Output::new(p.GPIO14, Level::High, OutputConfig::default());
    let bl = Output::new(p.GPIO2, Level::Low, OutputConfig::default());

    LcdPins {
        spi2: p.SPI2,
        sck: p.GPIO10,
        mosi: p.GPIO11,
        cs,
        dc,
        rst,
        bl,
    }
}
