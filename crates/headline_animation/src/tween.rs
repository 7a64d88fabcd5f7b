//! Tweens and animation targets
//!
//! A tween drives a single property of a single target between two values.
//! Targets are host-owned nodes; the engine only reads their current value
//! when a tween first renders and writes interpolated values afterwards.

use std::fmt;
use std::sync::Arc;

use crate::easing::Easing;

/// Callback fired by a timeline when playback passes an entry's end
pub type Callback = Arc<dyn Fn() + Send + Sync>;

/// Animatable properties of a heading node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Property {
    Opacity,
    Width,
    Height,
    TranslateY,
    Text,
}

/// Length units understood by targets
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Unit {
    /// Unitless (opacity)
    #[default]
    None,
    Px,
    /// Percent of viewport width
    Vw,
    /// Percent of viewport height
    Vh,
}

impl Unit {
    /// CSS suffix
    pub fn suffix(self) -> &'static str {
        match self {
            Unit::None => "",
            Unit::Px => "px",
            Unit::Vw => "vw",
            Unit::Vh => "vh",
        }
    }
}

/// A property value
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    Number { value: f32, unit: Unit },
    Text(String),
}

impl PropertyValue {
    pub fn number(value: f32) -> Self {
        PropertyValue::Number {
            value,
            unit: Unit::None,
        }
    }

    pub fn length(value: f32, unit: Unit) -> Self {
        PropertyValue::Number { value, unit }
    }

    pub fn text(value: impl Into<String>) -> Self {
        PropertyValue::Text(value.into())
    }

    /// Numeric value, if any
    pub fn as_number(&self) -> Option<f32> {
        match self {
            PropertyValue::Number { value, .. } => Some(*value),
            PropertyValue::Text(_) => None,
        }
    }

    /// Text value, if any
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(text) => Some(text),
            PropertyValue::Number { .. } => None,
        }
    }

    fn unit(&self) -> Unit {
        match self {
            PropertyValue::Number { unit, .. } => *unit,
            PropertyValue::Text(_) => Unit::None,
        }
    }

    /// Neutral value of the same kind (`0` in the same unit, or empty text)
    fn neutral(&self) -> Self {
        match self {
            PropertyValue::Number { unit, .. } => PropertyValue::length(0.0, *unit),
            PropertyValue::Text(_) => PropertyValue::Text(String::new()),
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Number { value, unit } => write!(f, "{value}{}", unit.suffix()),
            PropertyValue::Text(text) => f.write_str(text),
        }
    }
}

/// Something a tween can animate
///
/// Implementations must tolerate being written after the owning widget
/// has stopped caring; killing a timeline is the only way writes stop.
pub trait AnimationTarget: Send + Sync {
    /// Current value of `property`, expressed in `unit` for lengths
    fn read(&self, property: Property, unit: Unit) -> Option<PropertyValue>;

    /// Apply an interpolated value
    fn write(&self, property: Property, value: &PropertyValue);
}

/// Shared reference to an animation target
pub type TargetRef = Arc<dyn AnimationTarget>;

/// A single-property animation
pub struct Tween {
    target: TargetRef,
    property: Property,
    from: Option<PropertyValue>,
    to: Option<PropertyValue>,
    duration_ms: f32,
    delay_ms: f32,
    easing: Easing,
    on_complete: Option<Callback>,
    /// Start/end pair captured on first render
    resolved: Option<(PropertyValue, PropertyValue)>,
}

impl Tween {
    /// Animate from the current value to `value`
    pub fn to(target: TargetRef, property: Property, value: PropertyValue) -> Self {
        Self::new(target, property, None, Some(value))
    }

    /// Animate from `value` to the current value
    ///
    /// The start value is applied as soon as the owning timeline is primed,
    /// before the tween's slot in the sequence is reached.
    pub fn from(target: TargetRef, property: Property, value: PropertyValue) -> Self {
        Self::new(target, property, Some(value), None)
    }

    /// Animate between two explicit values
    pub fn from_to(
        target: TargetRef,
        property: Property,
        from: PropertyValue,
        to: PropertyValue,
    ) -> Self {
        Self::new(target, property, Some(from), Some(to))
    }

    fn new(
        target: TargetRef,
        property: Property,
        from: Option<PropertyValue>,
        to: Option<PropertyValue>,
    ) -> Self {
        Self {
            target,
            property,
            from,
            to,
            duration_ms: 500.0,
            delay_ms: 0.0,
            easing: Easing::default(),
            on_complete: None,
            resolved: None,
        }
    }

    pub fn duration_ms(mut self, duration_ms: f32) -> Self {
        self.duration_ms = duration_ms.max(0.0);
        self
    }

    pub fn duration_secs(self, seconds: f32) -> Self {
        self.duration_ms(seconds * 1000.0)
    }

    /// Gap inserted before this tween when sequenced
    pub fn delay_ms(mut self, delay_ms: f32) -> Self {
        self.delay_ms = delay_ms.max(0.0);
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Fire `callback` each time playback passes this tween's end moving forward
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_complete = Some(Arc::new(callback));
        self
    }

    pub fn property(&self) -> Property {
        self.property
    }

    pub fn duration(&self) -> f32 {
        self.duration_ms
    }

    pub(crate) fn delay(&self) -> f32 {
        self.delay_ms
    }

    pub(crate) fn take_on_complete(&mut self) -> Option<Callback> {
        self.on_complete.take()
    }

    /// `from` tweens show their start value before they begin
    pub(crate) fn renders_immediately(&self) -> bool {
        self.from.is_some() && self.to.is_none()
    }

    /// Render the tween at `time_ms` into its own span
    pub(crate) fn render(&mut self, time_ms: f32) {
        let linear = if self.duration_ms <= 0.0 {
            1.0
        } else {
            (time_ms / self.duration_ms).clamp(0.0, 1.0)
        };
        let eased = self.easing.apply(linear);
        let value = {
            let (start, end) = self.resolve();
            interpolate(start, end, eased)
        };
        self.target.write(self.property, &value);
    }

    fn resolve(&mut self) -> &(PropertyValue, PropertyValue) {
        let Self {
            target,
            property,
            from,
            to,
            resolved,
            ..
        } = self;
        resolved.get_or_insert_with(|| {
            resolve_endpoints(target.as_ref(), *property, from.as_ref(), to.as_ref())
        })
    }
}

fn resolve_endpoints(
    target: &dyn AnimationTarget,
    property: Property,
    from: Option<&PropertyValue>,
    to: Option<&PropertyValue>,
) -> (PropertyValue, PropertyValue) {
    let unit = to.or(from).map(PropertyValue::unit).unwrap_or_default();
    let current = target.read(property, unit);
    match (from, to) {
        (Some(from), Some(to)) => (from.clone(), to.clone()),
        (None, Some(to)) => (current.unwrap_or_else(|| to.neutral()), to.clone()),
        (Some(from), None) => (from.clone(), current.unwrap_or_else(|| from.neutral())),
        (None, None) => {
            let value = current.unwrap_or(PropertyValue::number(0.0));
            (value.clone(), value)
        }
    }
}

impl fmt::Debug for Tween {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tween")
            .field("property", &self.property)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("duration_ms", &self.duration_ms)
            .field("delay_ms", &self.delay_ms)
            .field("easing", &self.easing)
            .finish_non_exhaustive()
    }
}

/// Interpolate between two values at eased progress `t`
///
/// Numbers take the end value's unit. Text is typed: the first characters
/// of the old text are replaced one by one with the new text.
pub fn interpolate(start: &PropertyValue, end: &PropertyValue, t: f32) -> PropertyValue {
    match (start, end) {
        (
            PropertyValue::Number { value: a, .. },
            PropertyValue::Number {
                value: b,
                unit: end_unit,
            },
        ) => PropertyValue::length(a + (b - a) * t, *end_unit),
        (PropertyValue::Text(old), PropertyValue::Text(new)) => {
            PropertyValue::Text(type_text(old, new, t))
        }
        _ => {
            if t >= 1.0 {
                end.clone()
            } else {
                start.clone()
            }
        }
    }
}

fn type_text(old: &str, new: &str, t: f32) -> String {
    let t = t.clamp(0.0, 1.0);
    let old_len = old.chars().count();
    let new_len = new.chars().count();
    let span = old_len.max(new_len);
    let typed = (t * span as f32).round() as usize;
    let mut text: String = new.chars().take(typed.min(new_len)).collect();
    text.extend(old.chars().skip(typed));
    text
}
