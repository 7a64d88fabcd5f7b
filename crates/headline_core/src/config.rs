//! Widget configuration
//!
//! The widget is configured through string attributes. This module maps the
//! observed attribute names onto a typed [`Configuration`], resolving every
//! missing or malformed value to its documented default:
//!
//! | Attribute            | Default            |
//! |----------------------|--------------------|
//! | `before-text`        | empty              |
//! | `static-text`        | `Hello, I’m`       |
//! | `after-text`         | empty              |
//! | `repeating-text`     | `Creative.,Coder.` |
//! | `heading-tag`        | `h1`               |
//! | `font-size`          | `5.4` (vw)         |
//! | `font-family`        | `Poppins`          |
//! | `text-color`         | `#26A69A`          |
//! | `fill-color`         | `#F4A261`          |
//! | `cursor-symbol`      | `_`                |
//! | `cursor-color`       | `#FFFFFF`          |
//! | `background-color`   | `#1A1A1A`          |
//! | `animation-duration` | `1` (seconds)      |

use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashMap;
use serde::{Serialize, Serializer};

use crate::error::{ConfigError, Result};

pub const DEFAULT_LEAD_TEXT: &str = "Hello, I’m";
pub const DEFAULT_CYCLING_WORDS: &str = "Creative.,Coder.";
pub const DEFAULT_FONT_SIZE_VW: f32 = 5.4;
pub const DEFAULT_FONT_FAMILY: &str = "Poppins";
pub const DEFAULT_TEXT_COLOR: &str = "#26A69A";
pub const DEFAULT_FILL_COLOR: &str = "#F4A261";
pub const DEFAULT_CURSOR_SYMBOL: &str = "_";
pub const DEFAULT_CURSOR_COLOR: &str = "#FFFFFF";
pub const DEFAULT_BACKGROUND_COLOR: &str = "#1A1A1A";
pub const DEFAULT_DURATION_SECS: f32 = 1.0;

/// Characters that would let a style value escape its declaration
const STYLE_BREAKOUT_CHARS: [char; 5] = ['<', '>', '{', '}', ';'];

// =============================================================================
// ATTRIBUTE NAMES
// =============================================================================

/// Attributes observed by the widget
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributeName {
    BeforeText,
    StaticText,
    AfterText,
    RepeatingText,
    HeadingTag,
    FontSize,
    FontFamily,
    TextColor,
    FillColor,
    CursorSymbol,
    CursorColor,
    BackgroundColor,
    AnimationDuration,
}

impl AttributeName {
    pub const ALL: [AttributeName; 13] = [
        AttributeName::BeforeText,
        AttributeName::StaticText,
        AttributeName::AfterText,
        AttributeName::RepeatingText,
        AttributeName::HeadingTag,
        AttributeName::FontSize,
        AttributeName::FontFamily,
        AttributeName::TextColor,
        AttributeName::FillColor,
        AttributeName::CursorSymbol,
        AttributeName::CursorColor,
        AttributeName::BackgroundColor,
        AttributeName::AnimationDuration,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AttributeName::BeforeText => "before-text",
            AttributeName::StaticText => "static-text",
            AttributeName::AfterText => "after-text",
            AttributeName::RepeatingText => "repeating-text",
            AttributeName::HeadingTag => "heading-tag",
            AttributeName::FontSize => "font-size",
            AttributeName::FontFamily => "font-family",
            AttributeName::TextColor => "text-color",
            AttributeName::FillColor => "fill-color",
            AttributeName::CursorSymbol => "cursor-symbol",
            AttributeName::CursorColor => "cursor-color",
            AttributeName::BackgroundColor => "background-color",
            AttributeName::AnimationDuration => "animation-duration",
        }
    }
}

impl FromStr for AttributeName {
    type Err = ConfigError;

    fn from_str(name: &str) -> Result<Self> {
        AttributeName::ALL
            .into_iter()
            .find(|attr| attr.as_str() == name)
            .ok_or_else(|| ConfigError::UnknownAttribute(name.to_string()))
    }
}

impl fmt::Display for AttributeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ATTRIBUTE SET
// =============================================================================

/// Raw attribute values as set by the host
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attributes {
    values: FxHashMap<AttributeName, String>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: AttributeName) -> Option<&str> {
        self.values.get(&name).map(String::as_str)
    }

    /// Set a value, returning the previous one
    pub fn set(&mut self, name: AttributeName, value: impl Into<String>) -> Option<String> {
        self.values.insert(name, value.into())
    }

    pub fn remove(&mut self, name: AttributeName) -> Option<String> {
        self.values.remove(&name)
    }

    /// Builder-style [`Attributes::set`]
    pub fn with(mut self, name: AttributeName, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values in attribute declaration order
    pub fn iter(&self) -> impl Iterator<Item = (AttributeName, &str)> + '_ {
        AttributeName::ALL
            .into_iter()
            .filter_map(|name| self.get(name).map(|value| (name, value)))
    }

    /// Overlay every value from `other`
    pub fn merge(&mut self, other: &Attributes) {
        for (name, value) in other.iter() {
            self.set(name, value);
        }
    }

    /// Parse a TOML table of attribute values
    ///
    /// Strings are taken verbatim; numbers and booleans are stringified the
    /// way a host would serialize them into an attribute.
    ///
    /// ```
    /// use headline_core::config::{AttributeName, Attributes};
    ///
    /// let attrs = Attributes::from_toml_str(r#"
    ///     static-text = "Hi"
    ///     animation-duration = 0.3
    /// "#).unwrap();
    /// assert_eq!(attrs.get(AttributeName::AnimationDuration), Some("0.3"));
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(source)?;
        let mut attributes = Attributes::new();
        for (key, value) in table {
            let name: AttributeName = key.parse()?;
            let value = match value {
                toml::Value::String(s) => s,
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                other => {
                    return Err(ConfigError::InvalidValue {
                        name: key,
                        reason: format!("expected a scalar, found {}", other.type_str()),
                    })
                }
            };
            attributes.set(name, value);
        }
        Ok(attributes)
    }
}

// =============================================================================
// RESOLVED CONFIGURATION
// =============================================================================

/// Semantic heading level of the root element
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingLevel {
    #[default]
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl HeadingLevel {
    /// Parse `h1`..`h6` (case-insensitive)
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "h1" => Some(HeadingLevel::H1),
            "h2" => Some(HeadingLevel::H2),
            "h3" => Some(HeadingLevel::H3),
            "h4" => Some(HeadingLevel::H4),
            "h5" => Some(HeadingLevel::H5),
            "h6" => Some(HeadingLevel::H6),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            HeadingLevel::H1 => "h1",
            HeadingLevel::H2 => "h2",
            HeadingLevel::H3 => "h3",
            HeadingLevel::H4 => "h4",
            HeadingLevel::H5 => "h5",
            HeadingLevel::H6 => "h6",
        }
    }
}

/// Presentation parameters passed through to the host untouched
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StyleParams {
    pub before_text: String,
    pub after_text: String,
    pub heading_level: HeadingLevel,
    /// Font size in viewport-width units
    #[serde(serialize_with = "serialize_shortest")]
    pub font_size_vw: f32,
    pub font_family: String,
    pub text_color: String,
    pub fill_color: String,
    pub cursor_color: String,
    pub background_color: String,
}

/// Write an `f32` as the shortest decimal that reads back to it
///
/// Widening straight to `f64` would print `5.4` as `5.400000095367432`.
fn serialize_shortest<S: Serializer>(
    value: &f32,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let shortest = value.to_string().parse().unwrap_or(f64::from(*value));
    serializer.serialize_f64(shortest)
}

/// Immutable configuration for one render cycle
///
/// The cycling word list is never empty.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Configuration {
    lead_text: String,
    cycling_words: Vec<String>,
    cursor_symbol: String,
    #[serde(serialize_with = "serialize_shortest")]
    animation_duration_secs: f32,
    style: StyleParams,
}

impl Configuration {
    /// Resolve attributes, substituting defaults for missing or bad values
    pub fn from_attributes(attributes: &Attributes) -> Self {
        let text = |name, default: &str| -> String {
            match attributes.get(name) {
                Some(value) if !value.is_empty() => value.to_string(),
                _ => default.to_string(),
            }
        };

        // Style values land inside a stylesheet rule
        let style_value = |name, default: &str| -> String {
            let value = text(name, default);
            if value.contains(&STYLE_BREAKOUT_CHARS[..]) {
                tracing::warn!("unsafe {} {:?}, using {}", name, value, default);
                default.to_string()
            } else {
                value
            }
        };

        let heading_level = match attributes.get(AttributeName::HeadingTag) {
            Some(tag) if !tag.is_empty() => HeadingLevel::parse(tag).unwrap_or_else(|| {
                tracing::warn!("unsupported heading-tag {:?}, using h1", tag);
                HeadingLevel::default()
            }),
            _ => HeadingLevel::default(),
        };

        let words = attributes
            .get(AttributeName::RepeatingText)
            .filter(|raw| !raw.is_empty())
            .unwrap_or(DEFAULT_CYCLING_WORDS);

        Self {
            lead_text: text(AttributeName::StaticText, DEFAULT_LEAD_TEXT),
            cycling_words: parse_word_list(words),
            cursor_symbol: text(AttributeName::CursorSymbol, DEFAULT_CURSOR_SYMBOL),
            animation_duration_secs: positive_float(
                attributes.get(AttributeName::AnimationDuration),
                AttributeName::AnimationDuration,
                DEFAULT_DURATION_SECS,
            ),
            style: StyleParams {
                before_text: attributes
                    .get(AttributeName::BeforeText)
                    .unwrap_or_default()
                    .to_string(),
                after_text: attributes
                    .get(AttributeName::AfterText)
                    .unwrap_or_default()
                    .to_string(),
                heading_level,
                font_size_vw: positive_float(
                    attributes.get(AttributeName::FontSize),
                    AttributeName::FontSize,
                    DEFAULT_FONT_SIZE_VW,
                ),
                font_family: style_value(AttributeName::FontFamily, DEFAULT_FONT_FAMILY),
                text_color: style_value(AttributeName::TextColor, DEFAULT_TEXT_COLOR),
                fill_color: style_value(AttributeName::FillColor, DEFAULT_FILL_COLOR),
                cursor_color: style_value(AttributeName::CursorColor, DEFAULT_CURSOR_COLOR),
                background_color: style_value(
                    AttributeName::BackgroundColor,
                    DEFAULT_BACKGROUND_COLOR,
                ),
            },
        }
    }

    pub fn lead_text(&self) -> &str {
        &self.lead_text
    }

    pub fn cycling_words(&self) -> &[String] {
        &self.cycling_words
    }

    pub fn cursor_symbol(&self) -> &str {
        &self.cursor_symbol
    }

    pub fn animation_duration_secs(&self) -> f32 {
        self.animation_duration_secs
    }

    pub fn style(&self) -> &StyleParams {
        &self.style
    }

    pub fn with_lead_text(mut self, text: impl Into<String>) -> Self {
        self.lead_text = text.into();
        self
    }

    /// Replace the word list from a comma-delimited string
    pub fn with_cycling_words(mut self, list: &str) -> Self {
        self.cycling_words = parse_word_list(list);
        self
    }

    /// Non-positive or non-finite durations keep the default
    pub fn with_animation_duration_secs(mut self, seconds: f32) -> Self {
        self.animation_duration_secs = if seconds.is_finite() && seconds > 0.0 {
            seconds
        } else {
            DEFAULT_DURATION_SECS
        };
        self
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::from_attributes(&Attributes::default())
    }
}

/// Split a comma-delimited list, trimming entries and dropping empty ones
///
/// Never returns an empty list: a list with no usable entries becomes a
/// single empty word so the cycle still has one step.
pub fn parse_word_list(raw: &str) -> Vec<String> {
    let words: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect();
    if words.is_empty() {
        vec![String::new()]
    } else {
        words
    }
}

fn positive_float(raw: Option<&str>, name: AttributeName, default: f32) -> f32 {
    let Some(raw) = raw else {
        return default;
    };
    match parse_leading_float(raw) {
        Some(value) if value.is_finite() && value > 0.0 => value,
        _ => {
            if !raw.is_empty() {
                tracing::warn!("invalid {} {:?}, using {}", name, raw, default);
            }
            default
        }
    }
}

/// Parse the longest numeric prefix (`"5.4vw"` → `5.4`)
pub fn parse_leading_float(raw: &str) -> Option<f32> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - digits_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    s[..end].parse().ok()
}
