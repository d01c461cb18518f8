// Copyright 2026 the Layline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wrapped layout: visual lines and visual runs.

mod alignment;
mod visit;
mod wrap;

use core::ops::Range;

use peniko::kurbo::Rect;

use crate::analysis::{Direction, UnicodeServices};
use crate::error::LayoutError;
use crate::shape::{LogicalRun, ShapedText};
use crate::text::UnicodeText;

pub use visit::{GlyphRun, Visitor};

/// Horizontal alignment of wrapped lines.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Alignment {
    /// Align content to the left edge.
    #[default]
    Left,
    /// Align content to the right edge.
    Right,
    /// Center content within the container.
    Center,
    /// Justification is not implemented; formatting with this value
    /// returns [`LayoutError::UnsupportedAlignment`].
    Justify,
}

/// Wrap constraints.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct WrapOptions {
    /// Maximum line advance; `None` wraps only at hard breaks.
    pub max_width: Option<f32>,
    /// Advisory height. Recorded for callers; lines are never truncated.
    pub max_height: Option<f32>,
}

/// Vertical and horizontal measurements of one visual line.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LineMetrics {
    /// Maximum ascent of the line's content.
    pub ascent: f32,
    /// Maximum descent of the line's content.
    pub descent: f32,
    /// Maximum leading of the line's content.
    pub leading: f32,
    /// Y position of the baseline.
    pub baseline: f32,
    /// X offset of the line, written by [`WrappedText::format`].
    pub offset: f32,
    /// Full advance of the line, trailing whitespace included.
    pub advance: f32,
    /// Advance of the trailing whitespace alone.
    pub trailing_advance: f32,
    /// Top edge of the line.
    pub min_coord: f32,
    /// Bottom edge of the line.
    pub max_coord: f32,
}

impl LineMetrics {
    /// Height of the line.
    pub fn height(&self) -> f32 {
        self.max_coord - self.min_coord
    }
}

/// A (possibly partial) logical run assigned to one line, stored in
/// left-to-right visual order.
#[derive(Clone, Debug)]
pub(crate) struct VisualRunData {
    /// Index of the source logical run.
    pub(crate) run_index: usize,
    /// Glyph sub-range of the source run.
    pub(crate) glyph_range: Range<usize>,
    /// Covered text, in logical order.
    pub(crate) text_range: Range<usize>,
    /// Bidi level of the source run.
    pub(crate) level: u8,
    /// Advance of the sub-range.
    pub(crate) advance: f32,
    /// Glyph index where trailing whitespace begins; equals
    /// `glyph_range.end` when the run carries none.
    pub(crate) trailing_start: usize,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct LineData {
    /// Range into the wrapped layout's visual-run vector.
    pub(crate) run_range: Range<usize>,
    /// Covered text, including trailing whitespace and any hard-break
    /// separator unit.
    pub(crate) text_range: Range<usize>,
    /// True if the line ends in a mandatory break.
    pub(crate) hard_break: bool,
    /// Text range of the trailing whitespace (empty when none).
    pub(crate) trailing_text: Range<usize>,
    pub(crate) metrics: LineMetrics,
}

/// A line-wrapped, bidi-reordered layout.
///
/// Built once from a [`ShapedText`]; immutable afterwards except for the
/// idempotent [`format`](Self::format) pass, which only rewrites per-line
/// offsets.
pub struct WrappedText<'a> {
    pub(crate) text: &'a UnicodeText,
    pub(crate) shaped: &'a ShapedText,
    pub(crate) lines: Vec<LineData>,
    pub(crate) runs: Vec<VisualRunData>,
    width: f32,
    full_width: f32,
    height: f32,
    options: WrapOptions,
}

impl<'a> WrappedText<'a> {
    /// Breaks the shaped text into visual lines.
    pub fn new(
        text: &'a UnicodeText,
        shaped: &'a ShapedText,
        services: &dyn UnicodeServices,
        options: WrapOptions,
    ) -> Self {
        let max_width = options.max_width.unwrap_or(f32::MAX);
        assert!(max_width >= 0.0, "wrap width must not be negative");
        let (lines, runs) = wrap::break_lines(text, shaped, services, max_width);

        let mut width = 0.0_f32;
        let mut full_width = 0.0_f32;
        let mut height = 0.0_f64;
        for line in &lines {
            width = width.max(line.metrics.advance - line.metrics.trailing_advance);
            full_width = full_width.max(line.metrics.advance);
            height += f64::from(line.metrics.height());
        }
        tracing::debug!(lines = lines.len(), width, height, "wrapped paragraph");
        Self {
            text,
            shaped,
            lines,
            runs,
            width,
            full_width,
            height: height as f32,
            options,
        }
    }

    /// Number of visual lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` if the layout has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Maximum content width across lines, trailing whitespace excluded.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Maximum line advance including trailing whitespace.
    pub fn full_width(&self) -> f32 {
        self.full_width
    }

    /// Total height of all lines.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// The wrap constraints the layout was built with.
    pub fn options(&self) -> WrapOptions {
        self.options
    }

    /// Line accessor; `None` when `index` is out of bounds.
    pub fn get(&self, index: usize) -> Option<Line<'_, 'a>> {
        Some(Line {
            wrapped: self,
            index,
            data: self.lines.get(index)?,
        })
    }

    /// Iterates the lines in order.
    pub fn lines(&self) -> impl Iterator<Item = Line<'_, 'a>> + Clone {
        self.lines.iter().enumerate().map(move |(index, data)| Line {
            wrapped: self,
            index,
            data,
        })
    }

    /// Computes each line's horizontal offset.
    ///
    /// Idempotent: repeated calls with identical arguments produce
    /// identical line bounds. `container_width` defaults to the widest
    /// line advance.
    pub fn format(
        &mut self,
        container_width: Option<f32>,
        alignment: Alignment,
        direction: Direction,
    ) -> Result<(), LayoutError> {
        alignment::align(self, container_width, alignment, direction)
    }

    /// Traverses lines and visual runs in order, invoking `visitor`.
    pub fn visit(&self, visitor: &mut dyn Visitor) {
        visit::visit(self, visitor, &[]);
    }

    /// Like [`visit`](Self::visit), but additionally splits visual runs at
    /// the given text offsets (style boundaries and the like). Offsets are
    /// snapped to grapheme-cluster starts.
    pub fn visit_with_boundaries(&self, visitor: &mut dyn Visitor, boundaries: &[usize]) {
        visit::visit(self, visitor, boundaries);
    }

    pub(crate) fn logical_run(&self, index: usize) -> &LogicalRun {
        &self.shaped.runs()[index]
    }
}

impl core::fmt::Debug for WrappedText<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WrappedText")
            .field("lines", &self.lines.len())
            .field("runs", &self.runs.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Accessor for one visual line.
#[derive(Copy, Clone)]
pub struct Line<'l, 'a> {
    wrapped: &'l WrappedText<'a>,
    index: usize,
    data: &'l LineData,
}

impl<'l, 'a> Line<'l, 'a> {
    /// Index of the line within the layout.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Covered text, trailing whitespace and break separator included.
    pub fn text_range(&self) -> Range<usize> {
        self.data.text_range.clone()
    }

    /// True if the line ends in a mandatory break.
    pub fn hard_break(&self) -> bool {
        self.data.hard_break
    }

    /// Text range of the trailing whitespace.
    pub fn trailing_text(&self) -> Range<usize> {
        self.data.trailing_text.clone()
    }

    /// Line measurements.
    pub fn metrics(&self) -> LineMetrics {
        self.data.metrics
    }

    /// Bounding box of the line, trailing whitespace included.
    pub fn bounds(&self) -> Rect {
        let m = &self.data.metrics;
        Rect::new(
            f64::from(m.offset),
            f64::from(m.min_coord),
            f64::from(m.offset + m.advance),
            f64::from(m.max_coord),
        )
    }

    /// Number of visual runs on the line.
    pub fn run_count(&self) -> usize {
        self.data.run_range.len()
    }

    /// Iterates the line's visual runs left to right.
    pub fn runs(&self) -> impl Iterator<Item = VisualRun<'l>> + Clone {
        let wrapped = self.wrapped;
        wrapped.runs[self.data.run_range.clone()]
            .iter()
            .map(move |data| VisualRun {
                data,
                run: wrapped.logical_run(data.run_index),
            })
    }
}

impl core::fmt::Debug for Line<'_, '_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Line")
            .field("index", &self.index)
            .field("text_range", &self.data.text_range)
            .field("hard_break", &self.data.hard_break)
            .finish()
    }
}

/// Accessor for one visual run.
#[derive(Copy, Clone)]
pub struct VisualRun<'l> {
    data: &'l VisualRunData,
    run: &'l LogicalRun,
}

impl VisualRun<'_> {
    /// The source logical run.
    pub fn logical_run(&self) -> &LogicalRun {
        self.run
    }

    /// Glyph sub-range of the source run assigned to this line.
    pub fn glyph_range(&self) -> Range<usize> {
        self.data.glyph_range.clone()
    }

    /// Covered text in logical order.
    pub fn text_range(&self) -> Range<usize> {
        self.data.text_range.clone()
    }

    /// Bidi level of the run.
    pub fn level(&self) -> u8 {
        self.data.level
    }

    /// Returns `true` if the run is right-to-left.
    pub fn is_rtl(&self) -> bool {
        self.data.level & 1 != 0
    }

    /// Advance of the sub-range.
    pub fn advance(&self) -> f32 {
        self.data.advance
    }

    /// Glyph index where trailing whitespace begins.
    pub fn trailing_start(&self) -> usize {
        self.data.trailing_start
    }

    /// Glyph identifiers of the sub-range.
    pub fn glyphs(&self) -> &[u16] {
        &self.run.glyphs()[self.data.glyph_range.clone()]
    }

    /// Pen positions of the sub-range plus its end boundary; relative to
    /// the source run's origin, so one more entry than glyphs.
    pub fn positions(&self) -> &[f32] {
        &self.run.positions()[self.data.glyph_range.start..self.data.glyph_range.end + 1]
    }

    /// Cluster table of the sub-range plus its end boundary.
    pub fn clusters(&self) -> &[usize] {
        &self.run.clusters()[self.data.glyph_range.start..self.data.glyph_range.end + 1]
    }
}

impl core::fmt::Debug for VisualRun<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VisualRun")
            .field("run_index", &self.data.run_index)
            .field("glyph_range", &self.data.glyph_range)
            .field("text_range", &self.data.text_range)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Analyzer;
    use crate::testing::{TestShaper, chain};
    use crate::{FontBlock, LayoutContext};

    const EM: f32 = TestShaper::ADVANCE;

    fn wrap(text: &str) -> (UnicodeText, ShapedText, LayoutContext<Analyzer, TestShaper>) {
        let mut cx = LayoutContext::with(Analyzer::new(), TestShaper::new());
        let text = cx.analyze(text);
        let stack = chain();
        let blocks = [FontBlock {
            len: text.len(),
            chain: &stack,
        }];
        let shaped = cx.shape(&text, &blocks, &[], Direction::Ltr);
        (text, shaped, cx)
    }

    fn lines_of(wrapped: &WrappedText<'_>) -> Vec<Range<usize>> {
        wrapped.lines().map(|l| l.text_range()).collect()
    }

    #[test]
    fn single_line_when_unbounded() {
        let (text, shaped, cx) = wrap("Hello world");
        let wrapped = cx.wrap(&text, &shaped, WrapOptions::default());
        assert_eq!(wrapped.line_count(), 1);
        let line = wrapped.get(0).unwrap();
        assert_eq!(line.text_range(), 0..11);
        assert_eq!(line.run_count(), 1);
        assert!(!line.hard_break());
        assert_eq!(line.metrics().advance, 11.0 * EM);
    }

    #[test]
    fn explicit_break_makes_two_lines() {
        let (text, shaped, cx) = wrap("Hello world\nHello world");
        let wrapped = cx.wrap(&text, &shaped, WrapOptions::default());
        assert_eq!(lines_of(&wrapped), vec![0..12, 12..23]);
        assert!(wrapped.get(0).unwrap().hard_break());
        assert!(!wrapped.get(1).unwrap().hard_break());
    }

    #[test]
    fn soft_wrap_hangs_trailing_space() {
        let (text, shaped, cx) = wrap("Hello world");
        let wrapped = cx.wrap(
            &text,
            &shaped,
            WrapOptions {
                max_width: Some(6.0 * EM),
                max_height: None,
            },
        );
        assert_eq!(lines_of(&wrapped), vec![0..6, 6..11]);
        let first = wrapped.get(0).unwrap();
        assert_eq!(first.trailing_text(), 5..6);
        assert_eq!(first.metrics().trailing_advance, EM);
        assert_eq!(first.metrics().advance, 6.0 * EM);
        assert_eq!(wrapped.width(), 5.0 * EM);
        assert_eq!(wrapped.full_width(), 6.0 * EM);
    }

    #[test]
    fn trailing_spaces_recorded_before_hard_break() {
        let (text, shaped, cx) = wrap("ab  \ncd");
        let wrapped = cx.wrap(&text, &shaped, WrapOptions::default());
        assert_eq!(lines_of(&wrapped), vec![0..5, 5..7]);
        let first = wrapped.get(0).unwrap();
        assert_eq!(first.trailing_text(), 2..4);
        assert_eq!(first.metrics().trailing_advance, 2.0 * EM);
    }

    #[test]
    fn leading_spaces_count_as_content() {
        let (text, shaped, cx) = wrap("  ab");
        let wrapped = cx.wrap(&text, &shaped, WrapOptions::default());
        let line = wrapped.get(0).unwrap();
        assert_eq!(line.trailing_text(), 4..4);
        assert_eq!(line.metrics().advance, 4.0 * EM);
        assert_eq!(line.metrics().trailing_advance, 0.0);
    }

    #[test]
    fn whitespace_only_line_is_all_trailing() {
        let (text, shaped, cx) = wrap("   ");
        let wrapped = cx.wrap(&text, &shaped, WrapOptions::default());
        assert_eq!(wrapped.line_count(), 1);
        let line = wrapped.get(0).unwrap();
        assert_eq!(line.trailing_text(), 0..3);
        assert_eq!(line.metrics().trailing_advance, 3.0 * EM);
    }

    #[test]
    fn narrow_width_yields_one_line_per_cluster() {
        let (text, shaped, cx) = wrap("abc");
        let wrapped = cx.wrap(
            &text,
            &shaped,
            WrapOptions {
                max_width: Some(EM * 0.5),
                max_height: None,
            },
        );
        assert_eq!(lines_of(&wrapped), vec![0..1, 1..2, 2..3]);
    }

    #[test]
    fn long_word_breaks_anywhere() {
        let (text, shaped, cx) = wrap("ab neverending");
        let wrapped = cx.wrap(
            &text,
            &shaped,
            WrapOptions {
                max_width: Some(5.0 * EM),
                max_height: None,
            },
        );
        // "ab " then the 11-cluster word split across lines of five.
        assert_eq!(lines_of(&wrapped), vec![0..3, 3..8, 8..13, 13..14]);
    }

    #[test]
    fn line_partition_covers_text() {
        for sample in ["", "a", "Hello world", "a\nb\n", "   x   ", "a\r\nb"] {
            let (text, shaped, cx) = wrap(sample);
            let wrapped = cx.wrap(
                &text,
                &shaped,
                WrapOptions {
                    max_width: Some(3.0 * EM),
                    max_height: None,
                },
            );
            let mut expected = 0;
            for line in wrapped.lines() {
                assert_eq!(line.text_range().start, expected, "text {sample:?}");
                expected = line.text_range().end;
            }
            assert_eq!(expected, text.len(), "text {sample:?}");
            if !text.is_empty() {
                assert!(wrapped.line_count() >= 1);
            }
        }
    }

    #[test]
    fn trailing_hard_break_opens_empty_line() {
        let (text, shaped, cx) = wrap("ab\n");
        let wrapped = cx.wrap(&text, &shaped, WrapOptions::default());
        assert_eq!(lines_of(&wrapped), vec![0..3, 3..3]);
        let last = wrapped.get(1).unwrap();
        assert!(!last.hard_break());
        assert_eq!(last.run_count(), 0);
        assert!(last.metrics().height() > 0.0);
    }

    #[test]
    fn mixed_direction_line_reorders_runs() {
        let (text, shaped, cx) = wrap("ab \u{05D0}\u{05D1} cd");
        let wrapped = cx.wrap(&text, &shaped, WrapOptions::default());
        assert_eq!(wrapped.line_count(), 1);
        let line = wrapped.get(0).unwrap();
        let ranges: Vec<_> = line.runs().map(|r| r.text_range()).collect();
        // Logical coverage survives reordering.
        let mut sorted = ranges.clone();
        sorted.sort_by_key(|r| r.start);
        let mut expected = 0;
        for range in &sorted {
            assert_eq!(range.start, expected);
            expected = range.end;
        }
        assert_eq!(expected, text.len());
        assert!(line.runs().any(|r| r.is_rtl()));
    }

    #[test]
    fn format_is_idempotent() {
        let (text, shaped, cx) = wrap("Hello world\nHi");
        let mut wrapped = cx.wrap(&text, &shaped, WrapOptions::default());
        wrapped
            .format(Some(200.0), Alignment::Center, Direction::Ltr)
            .unwrap();
        let first: Vec<f32> = wrapped.lines().map(|l| l.metrics().offset).collect();
        wrapped
            .format(Some(200.0), Alignment::Center, Direction::Ltr)
            .unwrap();
        let second: Vec<f32> = wrapped.lines().map(|l| l.metrics().offset).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn alignment_offsets() {
        let (text, shaped, cx) = wrap("Hello world");
        let mut wrapped = cx.wrap(
            &text,
            &shaped,
            WrapOptions {
                max_width: Some(6.0 * EM),
                max_height: None,
            },
        );
        wrapped
            .format(Some(10.0 * EM), Alignment::Right, Direction::Ltr)
            .unwrap();
        // Line 0: advance 60 with 10 hanging; free space 100 - 60 + 10.
        assert_eq!(wrapped.get(0).unwrap().metrics().offset, 5.0 * EM);
        assert_eq!(wrapped.get(1).unwrap().metrics().offset, 5.0 * EM);

        wrapped
            .format(Some(10.0 * EM), Alignment::Left, Direction::Ltr)
            .unwrap();
        assert_eq!(wrapped.get(0).unwrap().metrics().offset, 0.0);

        wrapped
            .format(Some(10.0 * EM), Alignment::Center, Direction::Ltr)
            .unwrap();
        assert_eq!(wrapped.get(0).unwrap().metrics().offset, 2.5 * EM);
    }

    #[test]
    fn justify_is_rejected() {
        let (text, shaped, cx) = wrap("Hello world");
        let mut wrapped = cx.wrap(&text, &shaped, WrapOptions::default());
        assert_eq!(
            wrapped.format(None, Alignment::Justify, Direction::Ltr),
            Err(crate::LayoutError::UnsupportedAlignment(Alignment::Justify))
        );
    }

    #[test]
    fn placeholder_wraps_as_unbreakable_box() {
        let mut cx = LayoutContext::with(Analyzer::new(), TestShaper::new());
        let text = cx.analyze("abcd");
        let stack = chain();
        let blocks = [FontBlock {
            len: text.len(),
            chain: &stack,
        }];
        let shaped = cx.shape(
            &text,
            &blocks,
            &[crate::Placeholder {
                index: 2,
                width: 35.0,
                height: 40.0,
            }],
            Direction::Ltr,
        );
        let wrapped = cx.wrap(
            &text,
            &shaped,
            WrapOptions {
                max_width: Some(4.0 * EM),
                max_height: None,
            },
        );
        // "ab" + box overflows; box carries to line 1, "cd" to line 2.
        assert_eq!(wrapped.line_count(), 3);
        assert!(wrapped.get(1).unwrap().metrics().ascent >= 40.0);
    }

    #[test]
    fn visitor_sees_runs_and_boundaries() {
        #[derive(Default)]
        struct Collect {
            lines: usize,
            runs: Vec<Range<usize>>,
            glyphs: usize,
        }
        impl Visitor for Collect {
            fn begin_line(&mut self, _: usize, _: Range<usize>, _: bool, _: Rect) {
                self.lines += 1;
            }
            fn glyph_run(&mut self, run: &GlyphRun<'_>) {
                assert_eq!(run.positions.len(), run.glyphs.len() + 1);
                assert_eq!(run.clusters.len(), run.glyphs.len() + 1);
                self.runs.push(run.text_range.clone());
                self.glyphs += run.glyphs.len();
            }
        }

        let (text, shaped, cx) = wrap("Hello world");
        let wrapped = cx.wrap(&text, &shaped, WrapOptions::default());

        let mut plain = Collect::default();
        wrapped.visit(&mut plain);
        assert_eq!(plain.lines, 1);
        assert_eq!(plain.runs, vec![0..11]);
        assert_eq!(plain.glyphs, 11);

        let mut split = Collect::default();
        wrapped.visit_with_boundaries(&mut split, &[5, 6]);
        assert_eq!(split.runs, vec![0..5, 5..6, 6..11]);
        assert_eq!(split.glyphs, 11);
    }
}
