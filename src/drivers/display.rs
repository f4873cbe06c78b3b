//! Four-digit temperature display.
//!
//! Wraps a raw [`SegmentPanel`] with the rules the control loop relies on:
//! temperatures outside `[0, 100)` render as the error glyph, text is cut
//! to four characters, and panel faults are logged instead of returned.

use log::error;

use crate::app::ports::{DisplayPort, SegmentPanel};

/// Shown for sensor faults and out-of-range readings.
pub const ERROR_GLYPH: &str = "Err";

const DIGITS: usize = 4;

pub struct PanelDisplay<S> {
    panel: S,
}

impl<S: SegmentPanel> PanelDisplay<S> {
    pub fn new(panel: S) -> Self {
        Self { panel }
    }

    pub fn panel(&self) -> &S {
        &self.panel
    }

    fn write(&mut self, text: &str) {
        if let Err(e) = self.panel.write_str(text) {
            error!("display: failed to show '{}': {:?}", text, e);
        }
    }
}

impl<S: SegmentPanel> DisplayPort for PanelDisplay<S> {
    fn show_temperature(&mut self, celsius: f32) {
        if (0.0..100.0).contains(&celsius) {
            // The decimal point lights a segment, it does not take a digit.
            self.write(&format!("{:4.1}", celsius));
        } else {
            self.write(ERROR_GLYPH);
        }
    }

    fn show_text(&mut self, text: &str) {
        let end = text
            .char_indices()
            .nth(DIGITS)
            .map_or(text.len(), |(i, _)| i);
        self.write(&text[..end]);
    }

    fn clear(&mut self) {
        if let Err(e) = self.panel.blank() {
            error!("display: failed to clear: {:?}", e);
        }
    }
}
