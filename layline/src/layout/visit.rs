// Copyright 2026 the Layline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only traversal of a wrapped layout.

use core::ops::Range;

use peniko::FontData as Font;
use peniko::kurbo::Rect;

use super::{VisualRunData, WrappedText};
use crate::shape::RunKind;
use crate::text::UnitFlags;

/// One visual run presented to a [`Visitor`].
///
/// `positions` and `clusters` are slices of the source run's tables and
/// carry one more entry than `glyphs`; positions are relative to the source
/// run's origin, so consumers subtract `positions[0]` and place the result
/// at `bounds.x0`.
#[derive(Debug)]
pub struct GlyphRun<'a> {
    /// Typeface of the run.
    pub font: &'a Font,
    /// Font size of the run.
    pub size: f32,
    /// Bidi level; odd levels are right-to-left.
    pub level: u8,
    /// Covered text in logical order.
    pub text_range: Range<usize>,
    /// Placement of the run within the layout.
    pub bounds: Rect,
    /// Y position of the run's baseline.
    pub baseline: f32,
    /// Index into `glyphs` where trailing whitespace begins.
    pub trailing_start: usize,
    /// Glyph identifiers, leftmost first.
    pub glyphs: &'a [u16],
    /// Pen positions plus end boundary.
    pub positions: &'a [f32],
    /// Cluster table plus end boundary.
    pub clusters: &'a [usize],
}

/// Receiver for a layout traversal. All methods default to no-ops.
pub trait Visitor {
    /// Called before the runs of each line.
    fn begin_line(&mut self, index: usize, text_range: Range<usize>, hard_break: bool, bounds: Rect) {
        let _ = (index, text_range, hard_break, bounds);
    }

    /// Called once per visual text run, left to right.
    fn glyph_run(&mut self, run: &GlyphRun<'_>) {
        let _ = run;
    }

    /// Called once per placeholder box.
    fn placeholder(&mut self, text_range: Range<usize>, bounds: Rect) {
        let _ = (text_range, bounds);
    }

    /// Called after the runs of each line.
    fn end_line(
        &mut self,
        index: usize,
        text_range: Range<usize>,
        trailing_text: Range<usize>,
        glyph_count: usize,
    ) {
        let _ = (index, text_range, trailing_text, glyph_count);
    }
}

/// Walks lines and visual runs, re-splitting runs at `boundaries` (sorted
/// text offsets, snapped to grapheme-cluster starts).
pub(crate) fn visit(wrapped: &WrappedText<'_>, visitor: &mut dyn Visitor, boundaries: &[usize]) {
    for (index, line) in wrapped.lines.iter().enumerate() {
        let metrics = line.metrics;
        let line_bounds = Rect::new(
            f64::from(metrics.offset),
            f64::from(metrics.min_coord),
            f64::from(metrics.offset + metrics.advance),
            f64::from(metrics.max_coord),
        );
        visitor.begin_line(index, line.text_range.clone(), line.hard_break, line_bounds);

        let mut x = metrics.offset;
        let mut glyph_count = 0;
        for data in &wrapped.runs[line.run_range.clone()] {
            let run = wrapped.logical_run(data.run_index);
            match run.kind() {
                RunKind::Placeholder => {
                    let bounds = Rect::new(
                        f64::from(x),
                        f64::from(metrics.baseline - run.metrics().ascent),
                        f64::from(x + data.advance),
                        f64::from(metrics.baseline + run.metrics().descent),
                    );
                    visitor.placeholder(data.text_range.clone(), bounds);
                    x += data.advance;
                }
                RunKind::Text | RunKind::LineBreak => {
                    for piece in split_pieces(wrapped, data, boundaries) {
                        let glyphs = piece.glyph_range.clone();
                        let advance = run.glyph_width(glyphs.clone());
                        let Some(font) = run.font() else { continue };
                        let bounds = Rect::new(
                            f64::from(x),
                            f64::from(metrics.baseline - run.metrics().ascent),
                            f64::from(x + advance),
                            f64::from(metrics.baseline + run.metrics().descent),
                        );
                        let trailing =
                            piece.trailing_start.clamp(glyphs.start, glyphs.end) - glyphs.start;
                        visitor.glyph_run(&GlyphRun {
                            font,
                            size: run.size(),
                            level: data.level,
                            text_range: piece.text_range.clone(),
                            bounds,
                            baseline: metrics.baseline,
                            trailing_start: trailing,
                            glyphs: &run.glyphs()[glyphs.clone()],
                            positions: &run.positions()[glyphs.start..glyphs.end + 1],
                            clusters: &run.clusters()[glyphs.start..glyphs.end + 1],
                        });
                        glyph_count += glyphs.len();
                        x += advance;
                    }
                }
            }
        }
        visitor.end_line(
            index,
            line.text_range.clone(),
            line.trailing_text.clone(),
            glyph_count,
        );
    }
}

struct Piece {
    glyph_range: Range<usize>,
    text_range: Range<usize>,
    trailing_start: usize,
}

/// Splits one visual run at the caller boundaries falling inside it.
///
/// Pieces are produced in visual order: text order for LTR runs, reverse
/// text order for RTL runs.
fn split_pieces(
    wrapped: &WrappedText<'_>,
    data: &VisualRunData,
    boundaries: &[usize],
) -> Vec<Piece> {
    let run = wrapped.logical_run(data.run_index);
    let cuts: Vec<usize> = boundaries
        .iter()
        .copied()
        .filter(|&b| {
            b > data.text_range.start
                && b < data.text_range.end
                && wrapped.text.has_property(b, UnitFlags::GRAPHEME_START)
        })
        .collect();
    if cuts.is_empty() {
        return vec![Piece {
            glyph_range: data.glyph_range.clone(),
            text_range: data.text_range.clone(),
            trailing_start: data.trailing_start,
        }];
    }

    let mut pieces = Vec::with_capacity(cuts.len() + 1);
    let mut start = data.text_range.start;
    for end in cuts.into_iter().chain([data.text_range.end]) {
        let text_range = start..end;
        let glyph_range = clip(run.glyphs_for_text(text_range.clone()), &data.glyph_range);
        pieces.push(Piece {
            trailing_start: data
                .trailing_start
                .clamp(glyph_range.start, glyph_range.end),
            glyph_range,
            text_range,
        });
        start = end;
    }
    if data.level & 1 != 0 {
        pieces.reverse();
    }
    pieces
}

fn clip(range: Range<usize>, bounds: &Range<usize>) -> Range<usize> {
    let start = range.start.clamp(bounds.start, bounds.end);
    let end = range.end.clamp(bounds.start, bounds.end);
    if start >= end { start..start } else { start..end }
}
