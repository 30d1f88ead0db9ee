//! Glyph render descriptor and its ordering

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// How glyph data is generated and rendered
///
/// Declaration order is the ordering used by [`GlyphRender`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum GlyphType {
    /// Coverage bitmap rasterized at a fixed pixel size (not scalable)
    Coverage,
    /// Signed distance field
    DistanceField,
    /// Curve pairs evaluated in the fragment shader
    CurvePair,
    /// Restricted rays
    RestrictedRays,
    /// Banded rays
    BandedRays,
    #[default]
    Invalid,
}

impl GlyphType {
    /// Every kind, in order
    pub const ALL: [GlyphType; 6] = [
        GlyphType::Coverage,
        GlyphType::DistanceField,
        GlyphType::CurvePair,
        GlyphType::RestrictedRays,
        GlyphType::BandedRays,
        GlyphType::Invalid,
    ];

    /// True if glyphs of this kind render at any size from one set of data
    pub fn is_scalable(self) -> bool {
        self != GlyphType::Coverage
    }

    pub fn name(self) -> &'static str {
        match self {
            GlyphType::Coverage => "coverage",
            GlyphType::DistanceField => "distance-field",
            GlyphType::CurvePair => "curve-pair",
            GlyphType::RestrictedRays => "restricted-rays",
            GlyphType::BandedRays => "banded-rays",
            GlyphType::Invalid => "invalid",
        }
    }
}

/// Glyph rendering variant: a kind plus, for coverage glyphs, a pixel size
///
/// The pixel size is ignored by comparisons and hashing for scalable kinds.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlyphRender {
    kind: GlyphType,
    pixel_size: u32,
}

impl GlyphRender {
    /// Descriptor for a scalable kind
    ///
    /// Returns `None` for [`GlyphType::Coverage`], which needs a pixel size,
    /// and for [`GlyphType::Invalid`].
    pub fn scalable(kind: GlyphType) -> Option<Self> {
        if !kind.is_scalable() || kind == GlyphType::Invalid {
            return None;
        }
        Some(Self { kind, pixel_size: 0 })
    }

    /// Descriptor for a coverage glyph rendered at `pixel_size`
    pub fn coverage(pixel_size: u32) -> Self {
        Self {
            kind: GlyphType::Coverage,
            pixel_size,
        }
    }

    pub fn kind(&self) -> GlyphType {
        self.kind
    }

    /// Pixel size; always 0 for scalable kinds
    pub fn pixel_size(&self) -> u32 {
        self.pixel_size
    }

    /// False for the default descriptor and for zero-sized coverage glyphs
    pub fn valid(&self) -> bool {
        self.kind != GlyphType::Invalid && (self.kind.is_scalable() || self.pixel_size > 0)
    }
}

impl PartialEq for GlyphRender {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && (self.kind.is_scalable() || self.pixel_size == other.pixel_size)
    }
}

impl Eq for GlyphRender {}

impl Ord for GlyphRender {
    fn cmp(&self, other: &Self) -> Ordering {
        self.kind.cmp(&other.kind).then_with(|| {
            if self.kind.is_scalable() {
                Ordering::Equal
            } else {
                self.pixel_size.cmp(&other.pixel_size)
            }
        })
    }
}

impl PartialOrd for GlyphRender {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for GlyphRender {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        if !self.kind.is_scalable() {
            self.pixel_size.hash(state);
        }
    }
}

impl fmt::Display for GlyphRender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind.is_scalable() {
            f.write_str(self.kind.name())
        } else {
            write!(f, "{}@{}px", self.kind.name(), self.pixel_size)
        }
    }
}
