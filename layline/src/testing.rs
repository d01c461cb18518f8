// Copyright 2026 the Layline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic collaborators for tests.
//!
//! The test shaper emits one glyph per character with a fixed advance, so
//! widths and wrap points in tests are exact multiples of
//! [`TestShaper::ADVANCE`]. Coverage rules are keyed off the fake font's
//! index so font-resolution splitting can be exercised without real font
//! data.

use std::sync::Arc;

use peniko::{Blob, FontData as Font};

use crate::analysis::Direction;
use crate::font::FontStack;
use crate::shape::{RunMetrics, ShapeEngine, ShapeRequest, ShapedGlyphs};
use crate::util::decode_units;

fn fake_font(index: u32) -> Font {
    Font::new(Blob::new(Arc::new([0_u8; 4])), index)
}

/// Font covering every character.
pub fn full_font() -> Font {
    fake_font(0)
}

/// Font covering ASCII only.
pub fn ascii_font() -> Font {
    fake_font(1)
}

/// Font covering CJK unified ideographs only.
pub fn cjk_font() -> Font {
    fake_font(2)
}

/// Single full-coverage chain at size 14.
pub fn chain() -> FontStack {
    FontStack::new(vec![full_font()], 14.0)
}

/// ASCII-first, CJK-second chain at size 14.
pub fn two_font_chain() -> FontStack {
    FontStack::new(vec![ascii_font(), cjk_font()], 14.0)
}

/// Chain whose only entry covers no ASCII at all.
pub fn chain_without_ascii() -> FontStack {
    FontStack::new(vec![cjk_font()], 14.0)
}

/// Fixed-advance [`ShapeEngine`].
#[derive(Clone, Debug, Default)]
pub struct TestShaper;

impl TestShaper {
    /// Advance of every glyph.
    pub const ADVANCE: f32 = 10.0;
    /// Ascent of every run.
    pub const ASCENT: f32 = 8.0;
    /// Descent of every run.
    pub const DESCENT: f32 = 2.0;

    /// Creates the engine.
    pub fn new() -> Self {
        Self
    }
}

impl ShapeEngine for TestShaper {
    fn shape(&mut self, request: &ShapeRequest<'_>) -> ShapedGlyphs {
        let text = decode_units(request.units);
        let mut chars: Vec<(usize, char)> = Vec::new();
        let mut unit = 0;
        for ch in text.chars() {
            chars.push((unit, ch));
            unit += ch.len_utf16();
        }
        if request.direction == Direction::Rtl {
            chars.reverse();
        }
        let mut out = ShapedGlyphs {
            metrics: self.metrics(request.font, request.size),
            ..ShapedGlyphs::default()
        };
        let mut pen = 0.0;
        for (unit, ch) in chars {
            out.glyphs.push((ch as u32 & 0xFFFF) as u16);
            out.positions.push(pen);
            out.clusters.push(unit);
            pen += Self::ADVANCE;
        }
        out.positions.push(pen);
        out.clusters.push(request.units.len());
        out.advance = pen;
        out
    }

    fn metrics(&mut self, _font: &Font, _size: f32) -> RunMetrics {
        RunMetrics {
            ascent: Self::ASCENT,
            descent: Self::DESCENT,
            leading: 0.0,
        }
    }

    fn covers(&self, font: &Font, ch: char) -> bool {
        match font.index {
            1 => ch.is_ascii(),
            2 => ('\u{4E00}'..='\u{9FFF}').contains(&ch),
            _ => true,
        }
    }
}
