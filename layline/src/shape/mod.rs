// Copyright 2026 the Layline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shaping orchestration.
//!
//! Resolved font blocks are split further at hard-break units, bidi level
//! boundaries and placeholder anchors, and the shaping engine is invoked
//! once per remaining span. Break units are never shaped together with
//! adjacent text. Each invocation's result becomes one [`LogicalRun`]; a
//! running glyph-space x offset accumulates across runs for later caret
//! math.

mod engine;

use core::ops::Range;

use peniko::FontData as Font;

use crate::analysis::{Direction, UnicodeServices};
use crate::font::ResolvedFontBlock;
use crate::text::UnicodeText;

pub use engine::{ShapeEngine, ShapeRequest, ShapedGlyphs, SwashShaper};

/// Scaled vertical metrics of a run.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RunMetrics {
    /// Distance from the baseline to the top of the run.
    pub ascent: f32,
    /// Distance from the baseline to the bottom of the run.
    pub descent: f32,
    /// Recommended extra spacing between lines.
    pub leading: f32,
}

impl RunMetrics {
    pub(crate) fn max(self, other: Self) -> Self {
        Self {
            ascent: self.ascent.max(other.ascent),
            descent: self.descent.max(other.descent),
            leading: self.leading.max(other.leading),
        }
    }
}

/// What a logical run represents.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RunKind {
    /// Shaped text.
    Text,
    /// A mandatory line-break separator unit; carries no glyphs.
    LineBreak,
    /// A caller-supplied placeholder box.
    Placeholder,
}

/// A caller-supplied box participating in layout as an unbreakable item.
///
/// The box is anchored between code units at `index` and owns no text.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Placeholder {
    /// Code-unit position the box is anchored at.
    pub index: usize,
    /// Advance the box contributes to its line.
    pub width: f32,
    /// Height the box contributes to its line.
    pub height: f32,
}

/// One shaping-engine invocation's result, in logical text order.
#[derive(Clone, Debug)]
pub struct LogicalRun {
    kind: RunKind,
    text_range: Range<usize>,
    level: u8,
    font: Option<Font>,
    size: f32,
    glyphs: Vec<u16>,
    positions: Vec<f32>,
    clusters: Vec<usize>,
    metrics: RunMetrics,
    offset: f32,
    advance: f32,
}

impl LogicalRun {
    /// Run kind.
    pub fn kind(&self) -> RunKind {
        self.kind
    }

    /// Covered range of UTF-16 code units (empty for placeholders).
    pub fn text_range(&self) -> Range<usize> {
        self.text_range.clone()
    }

    /// Resolved bidi embedding level.
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Returns `true` if the run is right-to-left.
    pub fn is_rtl(&self) -> bool {
        self.level & 1 != 0
    }

    /// Resolved typeface; `None` for placeholder runs.
    pub fn font(&self) -> Option<&Font> {
        self.font.as_ref()
    }

    /// Font size of the run.
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Number of glyphs in the run.
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Glyph identifiers in visual order.
    pub fn glyphs(&self) -> &[u16] {
        &self.glyphs
    }

    /// Pen x position per glyph plus the run's total advance; one more
    /// entry than [`glyph_count`](Self::glyph_count).
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// First code unit of each glyph's cluster plus the run's end boundary;
    /// one more entry than [`glyph_count`](Self::glyph_count).
    pub fn clusters(&self) -> &[usize] {
        &self.clusters
    }

    /// Scaled vertical metrics.
    pub fn metrics(&self) -> RunMetrics {
        self.metrics
    }

    /// Running glyph-space x offset of the run within the paragraph.
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Total advance of the run.
    pub fn advance(&self) -> f32 {
        self.advance
    }

    /// Glyph sub-range whose clusters fall within `range`.
    ///
    /// Cluster values are monotonic per run (descending for RTL), so the
    /// matching glyphs are always contiguous.
    pub(crate) fn glyphs_for_text(&self, range: Range<usize>) -> Range<usize> {
        let mut start = self.glyphs.len();
        let mut end = 0;
        for (i, &cluster) in self.clusters[..self.glyphs.len()].iter().enumerate() {
            if range.contains(&cluster) {
                start = start.min(i);
                end = end.max(i + 1);
            }
        }
        if start >= end { 0..0 } else { start..end }
    }

    /// Width of the glyph sub-range, from the position table.
    pub(crate) fn glyph_width(&self, range: Range<usize>) -> f32 {
        self.positions[range.end] - self.positions[range.start]
    }
}

/// The shaped form of a paragraph: logical runs in text order.
#[derive(Clone, Debug)]
pub struct ShapedText {
    runs: Vec<LogicalRun>,
    base_level: u8,
    text_len: usize,
}

impl ShapedText {
    /// Shapes `text` using the resolved font assignment.
    ///
    /// `blocks` must partition the text (the output contract of
    /// [`resolve_fonts`](crate::resolve_fonts)); placeholders must be
    /// sorted by anchor index.
    pub fn shape(
        text: &UnicodeText,
        blocks: &[ResolvedFontBlock],
        placeholders: &[Placeholder],
        services: &dyn UnicodeServices,
        engine: &mut dyn ShapeEngine,
        direction: Direction,
    ) -> Self {
        let units = text.units();
        let levels = services.bidi_levels(units, direction);
        let anchors: Vec<usize> = placeholders.iter().map(|p| p.index).collect();
        debug_assert!(anchors.windows(2).all(|w| w[0] <= w[1]), "placeholders sorted");

        let mut runs = Vec::new();
        for block in blocks {
            shape_block(text, block, &levels, &anchors, engine, &mut runs);
        }
        let runs = merge_placeholders(runs, placeholders, direction);
        let mut shaped = Self {
            runs,
            base_level: direction.level(),
            text_len: units.len(),
        };
        let mut offset = 0.0;
        for run in &mut shaped.runs {
            run.offset = offset;
            offset += run.advance;
        }
        tracing::debug!(runs = shaped.runs.len(), advance = offset, "shaped paragraph");
        shaped
    }

    /// Logical runs in text order.
    pub fn runs(&self) -> &[LogicalRun] {
        &self.runs
    }

    /// Length of the underlying text in code units.
    pub fn text_len(&self) -> usize {
        self.text_len
    }

    /// Base paragraph level (0 for LTR, 1 for RTL).
    pub fn base_level(&self) -> u8 {
        self.base_level
    }

    /// Returns `true` if the base paragraph direction is right-to-left.
    pub fn is_rtl(&self) -> bool {
        self.base_level & 1 != 0
    }

    /// Visual-order permutation of a range of logical runs: absolute run
    /// indices, leftmost first.
    pub fn visual_order(
        &self,
        services: &dyn UnicodeServices,
        run_range: Range<usize>,
    ) -> Vec<usize> {
        let levels: Vec<u8> = self.runs[run_range.clone()]
            .iter()
            .map(LogicalRun::level)
            .collect();
        services
            .visual_order(&levels)
            .into_iter()
            .map(|i| run_range.start + i)
            .collect()
    }
}

/// Shape one resolved block, splitting at hard breaks, level boundaries and
/// placeholder anchors.
fn shape_block(
    text: &UnicodeText,
    block: &ResolvedFontBlock,
    levels: &[u8],
    anchors: &[usize],
    engine: &mut dyn ShapeEngine,
    runs: &mut Vec<LogicalRun>,
) {
    let range = block.text_range.clone();
    let mut builder = RunBuilder {
        start: range.start,
        end: range.start,
    };
    let mut pos = range.start;
    while pos < range.end {
        if text.is_hard_line_break(pos) {
            builder.flush(text, block, levels, engine, runs);
            runs.push(LogicalRun {
                kind: RunKind::LineBreak,
                text_range: pos..pos + 1,
                level: levels.get(pos).copied().unwrap_or(0),
                font: Some(block.font.clone()),
                size: block.size,
                glyphs: Vec::new(),
                positions: vec![0.0, 0.0],
                clusters: vec![pos, pos + 1],
                metrics: engine.metrics(&block.font, block.size),
                offset: 0.0,
                advance: 0.0,
            });
            pos += 1;
            builder.start = pos;
            builder.end = pos;
            continue;
        }
        let split_level = levels.get(pos) != levels.get(builder.start);
        let split_anchor = pos > builder.start && anchors.contains(&pos);
        if (split_level || split_anchor) && !builder.is_empty() {
            builder.flush(text, block, levels, engine, runs);
            builder.start = pos;
        }
        pos += 1;
        builder.end = pos;
    }
    builder.flush(text, block, levels, engine, runs);
}

/// Span under construction; replaces the nullable "current run" of
/// callback-style shaping with an explicit local value.
struct RunBuilder {
    start: usize,
    end: usize,
}

impl RunBuilder {
    fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    fn flush(
        &mut self,
        text: &UnicodeText,
        block: &ResolvedFontBlock,
        levels: &[u8],
        engine: &mut dyn ShapeEngine,
        runs: &mut Vec<LogicalRun>,
    ) {
        if self.is_empty() {
            return;
        }
        let range = self.start..self.end;
        let level = levels.get(range.start).copied().unwrap_or(0);
        let direction = if level & 1 != 0 {
            Direction::Rtl
        } else {
            Direction::Ltr
        };
        let request = ShapeRequest {
            units: &text.units()[range.clone()],
            font: &block.font,
            size: block.size,
            direction,
        };
        let mut shaped = engine.shape(&request);
        debug_assert_eq!(
            shaped.positions.len(),
            shaped.glyphs.len() + 1,
            "position table must carry the end boundary"
        );
        debug_assert_eq!(
            shaped.clusters.len(),
            shaped.glyphs.len() + 1,
            "cluster table must carry the end boundary"
        );
        for cluster in &mut shaped.clusters {
            *cluster += range.start;
        }
        runs.push(LogicalRun {
            kind: RunKind::Text,
            text_range: range,
            level,
            font: Some(block.font.clone()),
            size: block.size,
            glyphs: shaped.glyphs,
            positions: shaped.positions,
            clusters: shaped.clusters,
            metrics: shaped.metrics,
            offset: 0.0,
            advance: shaped.advance,
        });
        self.start = self.end;
    }
}

/// Interleaves placeholder runs with text runs by anchor position.
fn merge_placeholders(
    runs: Vec<LogicalRun>,
    placeholders: &[Placeholder],
    direction: Direction,
) -> Vec<LogicalRun> {
    if placeholders.is_empty() {
        return runs;
    }
    let mut merged = Vec::with_capacity(runs.len() + placeholders.len());
    let mut pending = placeholders.iter().peekable();
    for run in runs {
        while let Some(p) = pending.peek() {
            if p.index <= run.text_range.start {
                merged.push(placeholder_run(pending.next().unwrap(), direction));
            } else {
                break;
            }
        }
        merged.push(run);
    }
    for p in pending {
        merged.push(placeholder_run(p, direction));
    }
    merged
}

fn placeholder_run(placeholder: &Placeholder, direction: Direction) -> LogicalRun {
    LogicalRun {
        kind: RunKind::Placeholder,
        text_range: placeholder.index..placeholder.index,
        level: direction.level(),
        font: None,
        size: 0.0,
        glyphs: Vec::new(),
        positions: vec![0.0, placeholder.width],
        clusters: vec![placeholder.index, placeholder.index],
        metrics: RunMetrics {
            ascent: placeholder.height,
            descent: 0.0,
            leading: 0.0,
        },
        offset: 0.0,
        advance: placeholder.width,
    }
}
