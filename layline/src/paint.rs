// Copyright 2026 the Layline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paint consumer: glyph blob records for a rasterizer.

use core::ops::Range;

use peniko::FontData as Font;
use peniko::kurbo::Rect;

use crate::layout::{GlyphRun, Visitor};

/// One paintable record, produced per visited glyph run.
///
/// Positions are absolute layout coordinates of each glyph's pen position
/// on the run's baseline; a back end draws `glyphs[i]` at `positions[i]`.
#[derive(Clone, Debug)]
pub struct GlyphBlob {
    /// Typeface to draw with.
    pub font: Font,
    /// Font size in pixels per em.
    pub size: f32,
    /// Covered text in logical order.
    pub text_range: Range<usize>,
    /// Placement of the run.
    pub bounds: Rect,
    /// Glyph identifiers, leftmost first.
    pub glyphs: Vec<u16>,
    /// Absolute (x, y) pen position per glyph.
    pub positions: Vec<(f32, f32)>,
}

/// Reference paint consumer: records one [`GlyphBlob`] per glyph run.
#[derive(Clone, Debug, Default)]
pub struct PaintSink {
    blobs: Vec<GlyphBlob>,
}

impl PaintSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded blobs, in visit order.
    pub fn blobs(&self) -> &[GlyphBlob] {
        &self.blobs
    }

    /// Consumes the sink, returning the recorded blobs.
    pub fn into_blobs(self) -> Vec<GlyphBlob> {
        self.blobs
    }
}

impl Visitor for PaintSink {
    fn glyph_run(&mut self, run: &GlyphRun<'_>) {
        let origin = run.positions.first().copied().unwrap_or(0.0);
        let x0 = run.bounds.x0 as f32;
        let positions = run.positions[..run.glyphs.len()]
            .iter()
            .map(|p| (x0 + (p - origin), run.baseline))
            .collect();
        self.blobs.push(GlyphBlob {
            font: run.font.clone(),
            size: run.size,
            text_range: run.text_range.clone(),
            bounds: run.bounds,
            glyphs: run.glyphs.to_vec(),
            positions,
        });
    }
}
