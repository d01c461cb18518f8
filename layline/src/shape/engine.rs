// Copyright 2026 the Layline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The shaping collaborator seam.

use peniko::FontData as Font;
use swash::shape::{Direction as ShapeDirection, ShapeContext};

use crate::analysis::Direction;
use crate::font::font_ref;
use crate::shape::RunMetrics;
use crate::util::{decode_units, utf16_offsets};

/// One shaping invocation: a directional span of code units with a single
/// resolved typeface and size.
#[derive(Copy, Clone, Debug)]
pub struct ShapeRequest<'a> {
    /// Code units to shape.
    pub units: &'a [u16],
    /// Resolved typeface.
    pub font: &'a Font,
    /// Font size in pixels per em.
    pub size: f32,
    /// Resolved direction of the span.
    pub direction: Direction,
}

/// The result of one shaping invocation.
///
/// `positions` and `clusters` carry one more entry than `glyphs`: the final
/// entries mark the end boundary (total advance, span length). Cluster
/// values are offsets relative to the start of the request.
#[derive(Clone, Debug, Default)]
pub struct ShapedGlyphs {
    /// Glyph identifiers in visual order.
    pub glyphs: Vec<u16>,
    /// Pen x position of each glyph plus the total advance.
    pub positions: Vec<f32>,
    /// First code unit of each glyph's cluster plus the span length.
    pub clusters: Vec<usize>,
    /// Total advance of the span.
    pub advance: f32,
    /// Scaled vertical metrics of the typeface.
    pub metrics: RunMetrics,
}

impl ShapedGlyphs {
    fn empty(units: usize) -> Self {
        Self {
            positions: vec![0.0],
            clusters: vec![units],
            ..Self::default()
        }
    }
}

/// External shaping collaborator.
///
/// Calls are synchronous; a result is recorded by the orchestrator only
/// once fully populated, which the owned return value guarantees.
pub trait ShapeEngine {
    /// Shapes one span. The result must satisfy the `ShapedGlyphs` table
    /// contract (n+1 positions and clusters).
    fn shape(&mut self, request: &ShapeRequest<'_>) -> ShapedGlyphs;

    /// Scaled vertical metrics for a typeface, without shaping.
    fn metrics(&mut self, font: &Font, size: f32) -> RunMetrics;

    /// Returns `true` if the typeface can render `ch`.
    ///
    /// Font resolution delegates per-code-unit typeface availability here.
    fn covers(&self, font: &Font, ch: char) -> bool;
}

/// Default [`ShapeEngine`] backed by swash.
pub struct SwashShaper {
    context: ShapeContext,
}

impl SwashShaper {
    /// Creates a shaper with a fresh shape context.
    pub fn new() -> Self {
        Self {
            context: ShapeContext::new(),
        }
    }
}

impl Default for SwashShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for SwashShaper {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SwashShaper").finish_non_exhaustive()
    }
}

impl ShapeEngine for SwashShaper {
    fn shape(&mut self, request: &ShapeRequest<'_>) -> ShapedGlyphs {
        let Some(font) = font_ref(request.font) else {
            tracing::warn!(index = request.font.index, "font blob failed to parse");
            return ShapedGlyphs::empty(request.units.len());
        };
        let text = decode_units(request.units);
        let to_unit = utf16_offsets(&text);
        let mut shaper = self
            .context
            .builder(font)
            .size(request.size)
            .direction(match request.direction {
                Direction::Ltr => ShapeDirection::LeftToRight,
                Direction::Rtl => ShapeDirection::RightToLeft,
            })
            .build();
        let metrics = shaper.metrics();
        shaper.add_str(&text);

        let mut out = ShapedGlyphs {
            metrics: RunMetrics {
                ascent: metrics.ascent,
                descent: metrics.descent,
                leading: metrics.leading,
            },
            ..ShapedGlyphs::default()
        };
        let mut pen = 0.0_f32;
        shaper.shape_with(|cluster| {
            let unit = to_unit[cluster.source.to_range().start];
            for glyph in cluster.glyphs {
                out.glyphs.push(glyph.id);
                out.positions.push(pen);
                out.clusters.push(unit);
                pen += glyph.advance;
            }
        });
        out.positions.push(pen);
        out.clusters.push(request.units.len());
        out.advance = pen;
        out
    }

    fn metrics(&mut self, font: &Font, size: f32) -> RunMetrics {
        let Some(font) = font_ref(font) else {
            return RunMetrics::default();
        };
        let metrics = self.context.builder(font).size(size).build().metrics();
        RunMetrics {
            ascent: metrics.ascent,
            descent: metrics.descent,
            leading: metrics.leading,
        }
    }

    fn covers(&self, font: &Font, ch: char) -> bool {
        font_ref(font).is_some_and(|f| f.charmap().map(ch) != 0)
    }
}
