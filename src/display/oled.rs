//! SSD1306 128x64 OLED over I2C
//!
//! This module handles:
//! - Opening the Linux I2C bus through rppal's embedded-hal implementation
//! - Initialising the controller (full contrast, cleared screen)
//! - Drawing status lines with the built-in 5x7 font
//!
//! Text line `i` starts on page `i * 2` (16px apart), leaving a blank page
//! between lines.

use std::fmt::Debug;

use embedded_graphics::{
    mono_font::{ascii::FONT_5X7, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use rppal::i2c::I2c;
use ssd1306::{mode::BufferedGraphicsMode, prelude::*, I2CDisplayInterface};
use tracing::{debug, info};

use super::status::Panel;
use super::DisplayError;

/// Vertical distance between two status lines
pub const LINE_PITCH: i32 = 16;

type Driver =
    ssd1306::Ssd1306<I2CInterface<I2c>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

pub struct OledPanel {
    display: Driver,
}

impl OledPanel {
    /// Opens `bus`, initialises the panel at `address` and clears it
    pub fn open(bus: u8, address: u16) -> Result<Self, DisplayError> {
        let address = u8::try_from(address).map_err(|_| {
            DisplayError::Unavailable(format!("I2C address {:#06X} out of range", address))
        })?;
        let i2c = I2c::with_bus(bus)?;

        let interface = I2CDisplayInterface::new_custom_address(i2c, address);
        let mut display = ssd1306::Ssd1306::new(
            interface,
            DisplaySize128x64,
            DisplayRotation::Rotate0,
        )
        .into_buffered_graphics_mode();

        display.init().map_err(panel_error)?;
        display
            .set_brightness(Brightness::BRIGHTEST)
            .map_err(panel_error)?;
        display.clear_buffer();
        display.flush().map_err(panel_error)?;

        info!("SSD1306 ready on bus {} addr {:#04X}", bus, address);
        Ok(Self { display })
    }
}

impl Panel for OledPanel {
    fn show(&mut self, lines: &[String]) -> Result<(), DisplayError> {
        debug!("OLED show {:?}", lines);
        self.display.clear_buffer();
        draw_lines(&mut self.display, lines).map_err(panel_error)?;
        self.display.flush().map_err(panel_error)
    }
}

fn panel_error<E: Debug>(e: E) -> DisplayError {
    DisplayError::Panel(format!("{:?}", e))
}

/// Draws each line top-aligned on every other 8px page
pub fn draw_lines<D>(target: &mut D, lines: &[String]) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let style = MonoTextStyle::new(&FONT_5X7, BinaryColor::On);
    for (i, line) in lines.iter().enumerate() {
        let origin = Point::new(0, i as i32 * LINE_PITCH);
        Text::with_baseline(line, origin, style, Baseline::Top).draw(target)?;
    }
    Ok(())
}
