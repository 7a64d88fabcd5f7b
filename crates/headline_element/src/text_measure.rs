//! Text measurement for layout
//!
//! The headless host has no font rasterizer, so text is sized with an
//! estimate. A real host plugs in its own [`TextMeasurer`].

/// Text layout options that affect measurement
#[derive(Debug, Clone)]
pub struct TextLayoutOptions {
    /// Line height multiplier (1.2 = 120%)
    pub line_height: f32,
    /// Extra spacing between letters in pixels
    pub letter_spacing: f32,
    /// Font family name
    pub font_name: Option<String>,
}

impl TextLayoutOptions {
    pub fn new() -> Self {
        Self {
            line_height: 1.2,
            letter_spacing: 0.0,
            font_name: None,
        }
    }

    pub fn with_line_height(mut self, height: f32) -> Self {
        self.line_height = height;
        self
    }

    pub fn with_font_name(mut self, name: impl Into<String>) -> Self {
        self.font_name = Some(name.into());
        self
    }
}

impl Default for TextLayoutOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Text measurement result
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextMetrics {
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

/// Measures text for layout
pub trait TextMeasurer: Send + Sync {
    fn measure_with_options(
        &self,
        text: &str,
        font_size: f32,
        options: &TextLayoutOptions,
    ) -> TextMetrics;

    /// Measure with default options
    fn measure(&self, text: &str, font_size: f32) -> TextMetrics {
        self.measure_with_options(text, font_size, &TextLayoutOptions::new())
    }
}

/// Estimates text size from character count
///
/// Bold display faces average a little over half an em per glyph.
#[derive(Debug, Clone, Copy)]
pub struct EstimatedTextMeasurer {
    /// Glyph advance as a fraction of the font size
    pub char_width: f32,
}

impl Default for EstimatedTextMeasurer {
    fn default() -> Self {
        Self { char_width: 0.6 }
    }
}

impl TextMeasurer for EstimatedTextMeasurer {
    fn measure_with_options(
        &self,
        text: &str,
        font_size: f32,
        options: &TextLayoutOptions,
    ) -> TextMetrics {
        let chars = text.chars().count() as f32;
        if chars == 0.0 {
            return TextMetrics::default();
        }
        let spacing = (chars - 1.0) * options.letter_spacing;
        TextMetrics {
            width: chars * font_size * self.char_width + spacing,
            height: font_size * options.line_height,
        }
    }
}
