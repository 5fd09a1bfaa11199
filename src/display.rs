//! Display setup for the ESP32-S3 board.
//
// - `setup_display` builds SPI2 (blocking, 40 MHz, mode 0), wraps it with the
//   CS pin and the D/C line, pulses reset and hands back a ready driver.
// - Controller register tuning is left to the application.

use esp_backtrace as _;

use esp_hal::{
    gpio::Output,
    spi::master::{Config, Spi},
    spi::Mode,
    time::Rate,
    Blocking,
};

use display_interface::DisplayError;
use display_interface_spi::SPIInterface;
use embedded_hal::delay::DelayNs;
use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};
use esp_println::println;

use crate::st7789::{Error, St7789};
use crate::wiring::LcdPins;

// A tiny busy-wait delay that satisfies embedded-hal 1.0 DelayNs.
struct SpinDelay;

impl DelayNs for SpinDelay {
    #[inline]
    fn delay_ns(&mut self, ns: u32) {
        let mut n = ns / 50 + 1;
        while n != 0 { core::hint::spin_loop(); n -= 1; }
    }
    #[inline]
    fn delay_us(&mut self, us: u32) { for _ in 0..us { self.delay_ns(1_000); } }
    #[inline]
    fn delay_ms(&mut self, ms: u32) { for _ in 0..ms { self.delay_us(1_000); } }
}

// Spi<'a, Blocking> + CS pin + NoDelay, then the D/C line on top
pub type SpiDev<'a> = ExclusiveDevice<Spi<'a, Blocking>, Output<'a>, NoDelay>;
pub type Interface<'a> = SPIInterface<SpiDev<'a>, Output<'a>>;

// Ready-to-use display type (shares its lifetime with SPI and the stage)
pub type DisplayType<'a> = St7789<'a, Interface<'a>>;

pub fn setup_display<'a>(
    pins: LcdPins<'a>,
    stage: &'a mut [u8],
) -> Result<DisplayType<'a>, Error> {
    let LcdPins {
        spi2,
        sck,
        mosi,
        cs,
        dc,
        mut rst,
        mut bl,
    } = pins;

    let mut delay = SpinDelay;

    // Hardware reset
    rst.set_low();
    delay.delay_ms(25);
    rst.set_high();
    delay.delay_ms(50);
    bl.set_high();

    let spi = Spi::new(
        spi2,
        Config::default()
            .with_frequency(Rate::from_hz(40_000_000))
            .with_mode(Mode::_0),
    )
    .map_err(|_| Error::Transport(DisplayError::BusWriteError))?
    .with_sck(sck)
    .with_mosi(mosi);

    let spi_dev = ExclusiveDevice::new(spi, cs, NoDelay)
        .map_err(|_| Error::Transport(DisplayError::CSError))?;
    let di = SPIInterface::new(spi_dev, dc);

    let display = St7789::new_with_defaults(di, stage)?;
    println!("ST7789 up: {}x{} {:?}", display.width(), display.height(), display.orientation());
    Ok(display)
}
