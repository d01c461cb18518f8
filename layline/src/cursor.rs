// Copyright 2026 the Layline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cursor navigation and selection geometry.
//!
//! [`CursorModel`] is a read-only view built by visiting a wrapped layout
//! once at grapheme-cluster granularity. Every query returns a valid
//! [`Position`]; out-of-range input clamps to the nearest boundary rather
//! than failing.

use core::ops::Range;

use peniko::kurbo::{Point, Rect};

use crate::layout::{GlyphRun, Visitor, WrappedText};
use crate::text::UnicodeText;

/// Navigation step size.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Granularity {
    /// One glyph cluster at a time. Boxes are recorded per grapheme
    /// cluster, which is always glyph-cluster aligned, so this behaves
    /// like [`Granularity::GraphemeCluster`].
    GlyphCluster,
    /// One user-perceived character at a time.
    #[default]
    GraphemeCluster,
    /// One visual line at a time.
    Line,
}

/// A navigable cursor position.
///
/// `glyph_range` is a range of glyph-cluster boxes within the line; an
/// empty range denotes a boundary between boxes (line start, line end or
/// the text edges).
#[derive(Clone, Debug, PartialEq)]
pub struct Position {
    /// Step size the position was produced at.
    pub granularity: Granularity,
    /// Index of the line owning the position.
    pub line_index: usize,
    /// Covered glyph-cluster boxes within the line.
    pub glyph_range: Range<usize>,
    /// Covered text.
    pub text_range: Range<usize>,
    /// Geometry of the position.
    pub bounds: Rect,
}

#[derive(Clone, Debug)]
struct GlyphBox {
    bounds: Rect,
    text_range: Range<usize>,
}

#[derive(Clone, Debug, Default)]
struct BoxLine {
    boxes: Vec<GlyphBox>,
    text_range: Range<usize>,
    /// Box index where trailing whitespace begins.
    trailing_start: usize,
    hard_break: bool,
    bounds: Rect,
}

/// Read-only navigation model over a wrapped layout.
#[derive(Clone, Debug)]
pub struct CursorModel {
    lines: Vec<BoxLine>,
    text_len: usize,
}

impl CursorModel {
    /// Builds the model by visiting `wrapped` once.
    pub fn build(text: &UnicodeText, wrapped: &WrappedText<'_>) -> Self {
        let mut builder = ModelBuilder { lines: Vec::new() };
        wrapped.visit(&mut builder);
        tracing::trace!(lines = builder.lines.len(), "built cursor model");
        Self {
            lines: builder.lines,
            text_len: text.len(),
        }
    }

    /// Length of the underlying text in code units.
    pub fn text_len(&self) -> usize {
        self.text_len
    }

    /// Number of recorded box lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` if the line ends in a mandatory break. Clamps.
    pub fn is_hard_break(&self, line_index: usize) -> bool {
        self.lines
            .get(line_index)
            .is_some_and(|line| line.hard_break)
    }

    /// The position before all text: text range `(0, 0)`.
    pub fn first_position(&self) -> Position {
        let Some(line) = self.lines.first() else {
            return self.empty_position();
        };
        let bounds = line
            .boxes
            .first()
            .map(|b| edge(b.bounds, true))
            .unwrap_or_else(|| edge(line.bounds, true));
        Position {
            granularity: Granularity::GraphemeCluster,
            line_index: 0,
            glyph_range: 0..0,
            text_range: 0..0,
            bounds,
        }
    }

    /// The position after all text: text range `(len, len)`.
    pub fn last_position(&self) -> Position {
        let line_index = self.lines.len().saturating_sub(1);
        let Some(line) = self.lines.last() else {
            return self.empty_position();
        };
        let boxes = line.boxes.len();
        let bounds = line
            .boxes
            .last()
            .map(|b| edge(b.bounds, false))
            .unwrap_or_else(|| edge(line.bounds, true));
        Position {
            granularity: Granularity::GraphemeCluster,
            line_index,
            glyph_range: boxes..boxes,
            text_range: self.text_len..self.text_len,
            bounds,
        }
    }

    /// First position of a line (trailing whitespace included). Clamps.
    pub fn first_in_line_position(&self, line_index: usize) -> Position {
        let line_index = self.clamp_line(line_index);
        let Some(line) = self.lines.get(line_index) else {
            return self.empty_position();
        };
        let text = line.text_range.start;
        self.boundary_position(line_index, 0, text, line.boxes.first().map(|b| b.bounds))
    }

    /// Last position of a line, excluding trailing whitespace per the
    /// recorded boundary. Clamps.
    pub fn last_in_line_position(&self, line_index: usize) -> Position {
        let line_index = self.clamp_line(line_index);
        let Some(line) = self.lines.get(line_index) else {
            return self.empty_position();
        };
        let boundary = line.trailing_start;
        let text = line
            .boxes
            .get(boundary.wrapping_sub(1))
            .map(|b| b.text_range.end)
            .unwrap_or(line.text_range.start);
        self.boundary_position(
            line_index,
            boundary,
            text,
            line.boxes.get(boundary.wrapping_sub(1)).map(|b| b.bounds),
        )
    }

    /// Position nearest to `point`: the nearest line by y, then the nearest
    /// glyph box by x.
    pub fn adjusted_position(&self, granularity: Granularity, point: Point) -> Position {
        if self.lines.is_empty() {
            return self.empty_position();
        }
        let line_index = self.line_for_y(point.y);
        if granularity == Granularity::Line {
            return self.line_position(line_index);
        }
        let line = &self.lines[line_index];
        match nearest_box(&line.boxes, point.x) {
            Some(box_index) => self.box_position(granularity, line_index, box_index),
            None => Position {
                granularity,
                ..self.first_in_line_position(line_index)
            },
        }
    }

    /// The position one unit after `pos`; crossing a line end moves exactly
    /// one line and lands on its first box. Clamps at the text end.
    pub fn next_position(&self, pos: &Position) -> Position {
        if self.lines.is_empty() {
            return self.empty_position();
        }
        if pos.granularity == Granularity::Line {
            return self.line_position(self.clamp_line(pos.line_index + 1));
        }
        let line_index = self.clamp_line(pos.line_index);
        let line = &self.lines[line_index];
        if pos.glyph_range.end < line.boxes.len() {
            return self.box_position(pos.granularity, line_index, pos.glyph_range.end);
        }
        if line_index + 1 < self.lines.len() {
            let next = &self.lines[line_index + 1];
            if next.boxes.is_empty() {
                return Position {
                    granularity: pos.granularity,
                    ..self.first_in_line_position(line_index + 1)
                };
            }
            return self.box_position(pos.granularity, line_index + 1, 0);
        }
        Position {
            granularity: pos.granularity,
            ..self.last_position()
        }
    }

    /// The position one unit before `pos`; crossing a line start moves
    /// exactly one line and lands on its final box. Clamps at the text
    /// start.
    pub fn previous_position(&self, pos: &Position) -> Position {
        if self.lines.is_empty() {
            return self.empty_position();
        }
        if pos.granularity == Granularity::Line {
            return self.line_position(pos.line_index.saturating_sub(1));
        }
        let line_index = self.clamp_line(pos.line_index);
        if pos.glyph_range.start > 0 {
            return self.box_position(pos.granularity, line_index, pos.glyph_range.start - 1);
        }
        if line_index > 0 {
            let prev = &self.lines[line_index - 1];
            if prev.boxes.is_empty() {
                return Position {
                    granularity: pos.granularity,
                    ..self.first_in_line_position(line_index - 1)
                };
            }
            return self.box_position(pos.granularity, line_index - 1, prev.boxes.len() - 1);
        }
        Position {
            granularity: pos.granularity,
            ..self.first_position()
        }
    }

    /// Moves to the line above, picking the box whose horizontal center is
    /// nearest. Clamps at the first line.
    pub fn up_position(&self, pos: &Position) -> Position {
        if pos.line_index == 0 || self.lines.is_empty() {
            return pos.clone();
        }
        self.adjacent_line_position(pos, self.clamp_line(pos.line_index) - 1)
    }

    /// Moves to the line below, picking the box whose horizontal center is
    /// nearest. Clamps at the last line.
    pub fn down_position(&self, pos: &Position) -> Position {
        let line_index = self.clamp_line(pos.line_index);
        if line_index + 1 >= self.lines.len() {
            return pos.clone();
        }
        self.adjacent_line_position(pos, line_index + 1)
    }

    /// Inverse glyph-to-text mapping over a line's boxes. Clamps.
    ///
    /// The result is a single covering range; that is only guaranteed to
    /// equal the exact text at or below cluster granularity, since coarser
    /// or mixed-direction ranges may cover discontiguous text.
    pub fn glyphs_to_text(&self, line_index: usize, glyph_range: Range<usize>) -> Range<usize> {
        let Some(line) = self.lines.get(self.clamp_line(line_index)) else {
            return 0..0;
        };
        let start = glyph_range.start.min(line.boxes.len());
        let end = glyph_range.end.clamp(start, line.boxes.len());
        if start == end {
            let text = line
                .boxes
                .get(start)
                .map(|b| b.text_range.start)
                .unwrap_or(line.text_range.end);
            return text..text;
        }
        let mut text_start = usize::MAX;
        let mut text_end = 0;
        for glyph_box in &line.boxes[start..end] {
            text_start = text_start.min(glyph_box.text_range.start);
            text_end = text_end.max(glyph_box.text_range.end);
        }
        text_start..text_end
    }

    fn adjacent_line_position(&self, pos: &Position, target: usize) -> Position {
        let line = &self.lines[target];
        let center = pos.bounds.center().x;
        match nearest_box(&line.boxes, center) {
            Some(box_index) => self.box_position(pos.granularity, target, box_index),
            None => Position {
                granularity: pos.granularity,
                ..self.first_in_line_position(target)
            },
        }
    }

    fn box_position(&self, granularity: Granularity, line_index: usize, box_index: usize) -> Position {
        let line = &self.lines[line_index];
        let glyph_box = &line.boxes[box_index];
        Position {
            granularity,
            line_index,
            glyph_range: box_index..box_index + 1,
            text_range: glyph_box.text_range.clone(),
            bounds: glyph_box.bounds,
        }
    }

    fn line_position(&self, line_index: usize) -> Position {
        let Some(line) = self.lines.get(line_index) else {
            return self.empty_position();
        };
        Position {
            granularity: Granularity::Line,
            line_index,
            glyph_range: 0..line.boxes.len(),
            text_range: line.text_range.clone(),
            bounds: line.bounds,
        }
    }

    fn boundary_position(
        &self,
        line_index: usize,
        box_index: usize,
        text: usize,
        near: Option<Rect>,
    ) -> Position {
        let line = &self.lines[line_index];
        let bounds = near
            .map(|b| edge(b, box_index == 0))
            .unwrap_or_else(|| edge(line.bounds, true));
        Position {
            granularity: Granularity::GraphemeCluster,
            line_index,
            glyph_range: box_index..box_index,
            text_range: text..text,
            bounds,
        }
    }

    fn empty_position(&self) -> Position {
        Position {
            granularity: Granularity::GraphemeCluster,
            line_index: 0,
            glyph_range: 0..0,
            text_range: 0..0,
            bounds: Rect::ZERO,
        }
    }

    fn clamp_line(&self, line_index: usize) -> usize {
        line_index.min(self.lines.len().saturating_sub(1))
    }

    fn line_for_y(&self, y: f64) -> usize {
        if y < self.lines[0].bounds.y0 {
            return 0;
        }
        for (index, line) in self.lines.iter().enumerate() {
            if y < line.bounds.y1 {
                return index;
            }
        }
        self.lines.len() - 1
    }
}

/// Box containing `x`, or the one with the nearest horizontal center.
fn nearest_box(boxes: &[GlyphBox], x: f64) -> Option<usize> {
    if boxes.is_empty() {
        return None;
    }
    let mut best = 0;
    let mut best_distance = f64::MAX;
    for (index, glyph_box) in boxes.iter().enumerate() {
        if x >= glyph_box.bounds.x0 && x < glyph_box.bounds.x1 {
            return Some(index);
        }
        let distance = (glyph_box.bounds.center().x - x).abs();
        if distance < best_distance {
            best_distance = distance;
            best = index;
        }
    }
    Some(best)
}

/// Zero-width rect at the left or right edge of `bounds`.
fn edge(bounds: Rect, left: bool) -> Rect {
    let x = if left { bounds.x0 } else { bounds.x1 };
    Rect::new(x, bounds.y0, x, bounds.y1)
}

/// Visitor assembling one box line per visual line.
struct ModelBuilder {
    lines: Vec<BoxLine>,
}

impl Visitor for ModelBuilder {
    fn begin_line(&mut self, _index: usize, text_range: Range<usize>, hard_break: bool, bounds: Rect) {
        self.lines.push(BoxLine {
            boxes: Vec::new(),
            text_range,
            trailing_start: usize::MAX,
            hard_break,
            bounds,
        });
    }

    fn glyph_run(&mut self, run: &GlyphRun<'_>) {
        let line = self.lines.last_mut().expect("glyph run outside line");
        let rtl = run.level & 1 != 0;
        let origin = run.positions.first().copied().unwrap_or(0.0);

        // Group glyphs into clusters; the cluster table is monotonic per
        // run (descending for RTL), so groups are contiguous.
        let mut start = 0;
        while start < run.glyphs.len() {
            let cluster = run.clusters[start];
            let mut end = start + 1;
            while end < run.glyphs.len() && run.clusters[end] == cluster {
                end += 1;
            }
            let text_range = if rtl {
                let text_end = if start == 0 {
                    run.text_range.end
                } else {
                    run.clusters[start - 1]
                };
                cluster..text_end
            } else {
                cluster..run.clusters[end]
            };
            let x0 = run.bounds.x0 + f64::from(run.positions[start] - origin);
            let x1 = run.bounds.x0 + f64::from(run.positions[end] - origin);
            if start >= run.trailing_start && line.trailing_start == usize::MAX {
                line.trailing_start = line.boxes.len();
            }
            line.boxes.push(GlyphBox {
                bounds: Rect::new(x0, run.bounds.y0, x1, run.bounds.y1),
                text_range,
            });
            start = end;
        }
    }

    fn placeholder(&mut self, text_range: Range<usize>, bounds: Rect) {
        let line = self.lines.last_mut().expect("placeholder outside line");
        line.boxes.push(GlyphBox { bounds, text_range });
    }

    fn end_line(
        &mut self,
        _index: usize,
        _text_range: Range<usize>,
        _trailing_text: Range<usize>,
        _glyph_count: usize,
    ) {
        let line = self.lines.last_mut().expect("end outside line");
        if line.trailing_start == usize::MAX {
            line.trailing_start = line.boxes.len();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Analyzer, Direction};
    use crate::layout::WrapOptions;
    use crate::testing::{TestShaper, chain};
    use crate::{FontBlock, LayoutContext};

    const EM: f64 = TestShaper::ADVANCE as f64;

    fn model(source: &str, max_width: Option<f32>) -> CursorModel {
        let mut cx = LayoutContext::with(Analyzer::new(), TestShaper::new());
        let text = cx.analyze(source);
        let stack = chain();
        let blocks = [FontBlock {
            len: text.len(),
            chain: &stack,
        }];
        let shaped = cx.shape(&text, &blocks, &[], Direction::Ltr);
        let wrapped = cx.wrap(
            &text,
            &shaped,
            WrapOptions {
                max_width,
                max_height: None,
            },
        );
        CursorModel::build(&text, &wrapped)
    }

    #[test]
    fn first_and_last_positions() {
        let model = model("Hello world", None);
        assert_eq!(model.first_position().text_range, 0..0);
        assert_eq!(model.last_position().text_range, 11..11);
        assert_eq!(model.last_position().glyph_range, 11..11);
    }

    #[test]
    fn empty_text_clamps_everywhere() {
        let model = model("", None);
        let first = model.first_position();
        assert_eq!(first, model.last_position());
        assert_eq!(model.next_position(&first), first);
        assert_eq!(model.previous_position(&first), first);
        assert_eq!(
            model.adjusted_position(Granularity::GraphemeCluster, Point::new(50.0, 50.0)),
            first
        );
    }

    #[test]
    fn next_and_previous_are_inverse() {
        let model = model("Hello world\nab  \ncd", Some(60.0));
        let mut pos = model.first_position();
        let mut steps = 0;
        loop {
            let next = model.next_position(&pos);
            if next == pos {
                break;
            }
            assert_eq!(model.previous_position(&next), pos, "at step {steps}");
            pos = next;
            steps += 1;
            assert!(steps < 64, "navigation must terminate");
        }
        assert_eq!(pos, model.last_position());
        assert!(steps > 10);
    }

    #[test]
    fn line_crossing_moves_exactly_one_line() {
        let model = model("abc\ndef", None);
        // Last box of line 0 is the 'c' cluster; the break unit carries no
        // glyphs.
        let last_on_first = model.adjusted_position(
            Granularity::GraphemeCluster,
            Point::new(2.5 * EM, 5.0),
        );
        assert_eq!(last_on_first.line_index, 0);
        let crossed = model.next_position(&last_on_first);
        assert_eq!(crossed.line_index, 1);
        assert_eq!(crossed.glyph_range, 0..1);

        let back = model.previous_position(&crossed);
        assert_eq!(back.line_index, 0);
        assert_eq!(back.glyph_range, 2..3);
    }

    #[test]
    fn up_and_down_pick_nearest_center() {
        let model = model("abc\ndef", None);
        let e = model.adjusted_position(Granularity::GraphemeCluster, Point::new(1.5 * EM, 15.0));
        assert_eq!(e.line_index, 1);
        assert_eq!(e.text_range, 5..6);

        let up = model.up_position(&e);
        assert_eq!(up.line_index, 0);
        assert_eq!(up.text_range, 1..2);

        let down = model.down_position(&up);
        assert_eq!(down, e);

        assert_eq!(model.up_position(&up), up, "clamps at first line");
        assert_eq!(model.down_position(&e), e, "clamps at last line");
    }

    #[test]
    fn adjusted_position_clamps_out_of_range_points() {
        let model = model("abc\ndef", None);
        let before = model.adjusted_position(
            Granularity::GraphemeCluster,
            Point::new(-100.0, -100.0),
        );
        assert_eq!(before.line_index, 0);
        assert_eq!(before.text_range, 0..1);

        let after = model.adjusted_position(
            Granularity::GraphemeCluster,
            Point::new(1e6, 1e6),
        );
        assert_eq!(after.line_index, 1);
        assert_eq!(after.text_range, 6..7);
    }

    #[test]
    fn in_line_positions_respect_trailing_boundary() {
        let model = model("ab  \ncd", None);
        let first = model.first_in_line_position(0);
        assert_eq!(first.text_range, 0..0);
        let last = model.last_in_line_position(0);
        assert_eq!(last.glyph_range, 2..2, "trailing spaces excluded");
        assert_eq!(last.text_range, 2..2);

        let second = model.first_in_line_position(1);
        assert_eq!(second.text_range, 5..5);
        assert!(model.is_hard_break(0));
        assert!(!model.is_hard_break(1));
    }

    #[test]
    fn glyphs_to_text_covers_boxes() {
        let model = model("abc\ndef", None);
        assert_eq!(model.glyphs_to_text(0, 0..3), 0..3);
        assert_eq!(model.glyphs_to_text(0, 1..2), 1..2);
        assert_eq!(model.glyphs_to_text(1, 0..3), 4..7);
        // Out-of-range input clamps.
        assert_eq!(model.glyphs_to_text(9, 0..99), 4..7);
    }

    #[test]
    fn line_granularity_steps_lines() {
        let model = model("abc\ndef", None);
        let line = model.adjusted_position(Granularity::Line, Point::new(0.0, 5.0));
        assert_eq!(line.line_index, 0);
        assert_eq!(line.text_range, 0..4);
        let next = model.next_position(&line);
        assert_eq!(next.line_index, 1);
        assert_eq!(next.text_range, 4..7);
        assert_eq!(model.next_position(&next), next, "clamps at last line");
    }
}
