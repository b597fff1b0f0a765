use core::{fmt::Debug, iter::repeat_n};

use defmt::{Debug2Format, warn};
use podium_pure::io::Indicator;
use smart_leds::{RGB8, SmartLedsWriteAsync, brightness};

use crate::config::{LED_BRIGHTNESS, TOTAL_LEDS};

/// Shows one color on the whole strip.
pub struct LedIndicator<W>(pub W);

impl<W> Indicator for LedIndicator<W>
where
    W: SmartLedsWriteAsync,
    RGB8: Into<W::Color>,
    W::Error: Debug,
{
    async fn set_all(&mut self, color: RGB8) {
        let leds = brightness(repeat_n(color, TOTAL_LEDS), LED_BRIGHTNESS);
        if let Err(e) = self.0.write(leds).await {
            warn!("Error writing LEDs: {}", Debug2Format(&e));
        }
    }
}
