//! Viewport-relative geometry

/// Size of the host viewport in pixels
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Pixels per `vw` unit
    pub fn vw(&self) -> f32 {
        self.width / 100.0
    }

    /// Pixels per `vh` unit
    pub fn vh(&self) -> f32 {
        self.height / 100.0
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Rendered box size of a node in pixels
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PixelSize {
    pub width: f32,
    pub height: f32,
}

impl PixelSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Lead-text size expressed in viewport units
///
/// Recomputed on every build pass and never cached across passes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Geometry {
    /// Width as a percentage of the viewport width
    pub lead_width_vw: f32,
    /// Height as a percentage of the viewport height
    pub lead_height_vh: f32,
}

impl Geometry {
    pub const ZERO: Geometry = Geometry {
        lead_width_vw: 0.0,
        lead_height_vh: 0.0,
    };

    /// Convert a pixel size: `(px / viewport) * 100` per axis
    ///
    /// An empty viewport yields zero geometry.
    pub fn from_pixels(size: PixelSize, viewport: Viewport) -> Self {
        if viewport.is_empty() {
            return Self::ZERO;
        }
        Self {
            lead_width_vw: size.width / viewport.width * 100.0,
            lead_height_vh: size.height / viewport.height * 100.0,
        }
    }

    /// Whether timelines can be built against this geometry
    ///
    /// A node without a rendered box measures as zero; animating towards
    /// a zero target would collapse the box, so such passes are skipped.
    pub fn is_ready(&self) -> bool {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        positive(self.lead_width_vw) && positive(self.lead_height_vh)
    }
}
