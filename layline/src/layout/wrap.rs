// Copyright 2026 the Layline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Greedy line breaking.
//!
//! The breaker advances over grapheme clusters, tracking three stretches:
//! committed line content, pending trailing whitespace and the current
//! unbreakable word. Content and trailing whitespace are kept apart so
//! wrap decisions ignore hanging spaces while the committed line still
//! records them for caret placement.

use core::ops::Range;

use smallvec::SmallVec;

use super::{LineData, LineMetrics, VisualRunData};
use crate::analysis::UnicodeServices;
use crate::shape::{LogicalRun, RunKind, RunMetrics, ShapedText};
use crate::text::UnicodeText;

/// A contiguous piece of one logical run accumulated by a stretch.
#[derive(Clone, Debug)]
struct Fragment {
    run_index: usize,
    glyph_range: Range<usize>,
    text_range: Range<usize>,
    advance: f32,
}

/// An in-progress, not-yet-committed accumulation of fragments.
#[derive(Clone, Debug, Default)]
struct Stretch {
    frags: SmallVec<[Fragment; 4]>,
    advance: f32,
}

impl Stretch {
    fn is_empty(&self) -> bool {
        self.frags.is_empty()
    }

    fn push(&mut self, frag: Fragment) {
        self.advance += frag.advance;
        if let Some(last) = self.frags.last_mut() {
            if last.run_index == frag.run_index && last.text_range.end == frag.text_range.start {
                // Zero-glyph clusters extend the text coverage only.
                if frag.glyph_range.is_empty() {
                    last.text_range.end = frag.text_range.end;
                    last.advance += frag.advance;
                    return;
                }
                // Forward glyph growth (LTR runs).
                if last.glyph_range.end == frag.glyph_range.start {
                    last.glyph_range.end = frag.glyph_range.end;
                    last.text_range.end = frag.text_range.end;
                    last.advance += frag.advance;
                    return;
                }
                // Backward glyph growth (RTL runs store glyphs visually).
                if frag.glyph_range.end == last.glyph_range.start {
                    last.glyph_range.start = frag.glyph_range.start;
                    last.text_range.end = frag.text_range.end;
                    last.advance += frag.advance;
                    return;
                }
            }
        }
        self.frags.push(frag);
    }

    fn absorb(&mut self, other: &mut Self) {
        for frag in core::mem::take(&mut other.frags) {
            self.push(frag);
        }
        other.advance = 0.0;
    }

    fn clear(&mut self) {
        self.frags.clear();
        self.advance = 0.0;
    }
}

pub(crate) fn break_lines(
    text: &UnicodeText,
    shaped: &ShapedText,
    services: &dyn UnicodeServices,
    max_width: f32,
) -> (Vec<LineData>, Vec<VisualRunData>) {
    let mut breaker = Breaker {
        text,
        shaped,
        services,
        max_width,
        lines: Vec::new(),
        runs: Vec::new(),
        line: Stretch::default(),
        spaces: Stretch::default(),
        word: Stretch::default(),
        text_cursor: 0,
        committed_y: 0.0,
    };
    breaker.run();
    (breaker.lines, breaker.runs)
}

struct Breaker<'a> {
    text: &'a UnicodeText,
    shaped: &'a ShapedText,
    services: &'a dyn UnicodeServices,
    max_width: f32,
    lines: Vec<LineData>,
    runs: Vec<VisualRunData>,
    line: Stretch,
    spaces: Stretch,
    word: Stretch,
    text_cursor: usize,
    committed_y: f32,
}

impl Breaker<'_> {
    fn run(&mut self) {
        for (run_index, run) in self.shaped.runs().iter().enumerate() {
            match run.kind() {
                RunKind::LineBreak => {
                    self.complete_word();
                    self.commit(Some(run_index));
                }
                RunKind::Placeholder => self.placeholder(run_index, run),
                RunKind::Text => {
                    for cluster in self.text.graphemes(run.text_range()) {
                        self.cluster(run_index, run, cluster);
                    }
                }
            }
        }
        self.complete_word();
        if !self.line.is_empty() || !self.spaces.is_empty() {
            self.commit(None);
        }
        // A trailing hard break opens one final empty line; the caret after
        // the separator lives there.
        if self.lines.last().is_some_and(|l| l.hard_break) {
            self.push_final_empty_line();
        }
    }

    /// Advance the state machine by one grapheme cluster.
    fn cluster(&mut self, run_index: usize, run: &LogicalRun, cluster: Range<usize>) {
        let glyph_range = run.glyphs_for_text(cluster.clone());
        let advance = run.glyph_width(glyph_range.clone());
        let frag = Fragment {
            run_index,
            glyph_range,
            text_range: cluster.clone(),
            advance,
        };

        // Whitespace hangs: it completes the current word and extends the
        // trailing stretch without ever forcing a wrap.
        if self.text.is_whitespace(cluster.clone()) {
            self.complete_word();
            self.spaces.push(frag);
            return;
        }
        if self.text.is_soft_line_break(cluster.start) {
            self.complete_word();
        }

        let pending = self.line.advance + self.spaces.advance + self.word.advance;
        if pending + advance <= self.max_width {
            self.word.push(frag);
        } else if !self.line.is_empty() || !self.spaces.is_empty() {
            // Wrap: the committed line keeps its content plus hanging
            // spaces; the word in progress moves to the next line.
            self.commit(None);
            if self.word.advance + advance <= self.max_width || self.word.is_empty() {
                self.word.push(frag);
            } else {
                self.overflow_word();
                self.word.push(frag);
            }
        } else if self.word.is_empty() {
            // A single cluster wider than the wrap width occupies its own
            // line; accepting it here guarantees forward progress.
            self.word.push(frag);
        } else {
            self.overflow_word();
            self.word.push(frag);
        }
    }

    fn placeholder(&mut self, run_index: usize, run: &LogicalRun) {
        self.complete_word();
        let advance = run.advance();
        let pending = self.line.advance + self.spaces.advance;
        if pending + advance > self.max_width && !(self.line.is_empty() && self.spaces.is_empty())
        {
            self.commit(None);
        }
        self.word.push(Fragment {
            run_index,
            glyph_range: 0..0,
            text_range: run.text_range(),
            advance,
        });
        self.complete_word();
    }

    /// The word in progress is known to stay on this line: pending spaces
    /// become interior content and the word joins them.
    fn complete_word(&mut self) {
        if self.word.is_empty() {
            return;
        }
        self.line.absorb(&mut self.spaces);
        self.line.absorb(&mut self.word);
    }

    /// Commit a word that exceeds the wrap width on a line of its own.
    fn overflow_word(&mut self) {
        self.line.absorb(&mut self.word);
        self.commit(None);
    }

    fn commit(&mut self, break_run: Option<usize>) {
        let content_count = self.line.frags.len();
        let content_advance = self.line.advance;
        let trailing_advance = self.spaces.advance;
        let mut frags: SmallVec<[Fragment; 8]> = SmallVec::new();
        frags.extend(core::mem::take(&mut self.line.frags));
        frags.extend(core::mem::take(&mut self.spaces.frags));
        self.line.clear();
        self.spaces.clear();

        let mut end = self.text_cursor;
        for frag in &frags {
            end = end.max(frag.text_range.end);
        }
        let trailing_text = if frags.len() > content_count {
            frags[content_count].text_range.start..end
        } else {
            end..end
        };
        let mut hard_break = false;
        if let Some(index) = break_run {
            end = end.max(self.shaped.runs()[index].text_range().end);
            hard_break = true;
        }
        let text_range = self.text_cursor..end;
        self.text_cursor = end;

        let metrics = self.line_metrics(&frags, content_count, break_run);

        // Reorder fragments to visual order when the line mixes directions.
        let levels: Vec<u8> = frags
            .iter()
            .map(|f| self.shaped.runs()[f.run_index].level())
            .collect();
        let visual: Vec<usize> = if frags.len() > 1 && levels.iter().any(|&l| l & 1 != 0) {
            self.services.visual_order(&levels)
        } else {
            (0..frags.len()).collect()
        };

        let run_start = self.runs.len();
        for &index in &visual {
            let frag = &frags[index];
            let trailing = index >= content_count;
            self.runs.push(VisualRunData {
                run_index: frag.run_index,
                glyph_range: frag.glyph_range.clone(),
                text_range: frag.text_range.clone(),
                level: levels[index],
                advance: frag.advance,
                trailing_start: if trailing {
                    frag.glyph_range.start
                } else {
                    frag.glyph_range.end
                },
            });
        }

        self.lines.push(LineData {
            run_range: run_start..self.runs.len(),
            text_range,
            hard_break,
            trailing_text,
            metrics: LineMetrics {
                advance: content_advance + trailing_advance,
                trailing_advance,
                ..metrics
            },
        });
    }

    fn line_metrics(
        &mut self,
        frags: &[Fragment],
        content_count: usize,
        break_run: Option<usize>,
    ) -> LineMetrics {
        let mut vertical = RunMetrics::default();
        let mut have = false;
        for frag in &frags[..content_count] {
            vertical = vertical.max(self.shaped.runs()[frag.run_index].metrics());
            have = true;
        }
        if !have {
            // Whitespace-only line: fall back to the trailing fragments.
            for frag in &frags[content_count..] {
                vertical = vertical.max(self.shaped.runs()[frag.run_index].metrics());
                have = true;
            }
        }
        if !have {
            if let Some(index) = break_run {
                vertical = self.shaped.runs()[index].metrics();
            } else if let Some(prev) = self.lines.last() {
                vertical = RunMetrics {
                    ascent: prev.metrics.ascent,
                    descent: prev.metrics.descent,
                    leading: prev.metrics.leading,
                };
            }
        }
        self.advance_metrics(vertical)
    }

    fn advance_metrics(&mut self, vertical: RunMetrics) -> LineMetrics {
        let leading_above = vertical.leading * 0.5;
        let leading_below = vertical.leading - leading_above;
        let baseline = self.committed_y + vertical.ascent + leading_above.max(0.0);
        let min_coord = baseline - vertical.ascent - leading_above.max(0.0);
        let max_coord = baseline + vertical.descent + leading_below.max(0.0);
        self.committed_y = max_coord;
        LineMetrics {
            ascent: vertical.ascent,
            descent: vertical.descent,
            leading: vertical.leading,
            baseline,
            offset: 0.0,
            advance: 0.0,
            trailing_advance: 0.0,
            min_coord,
            max_coord,
        }
    }

    fn push_final_empty_line(&mut self) {
        let len = self.text_cursor;
        let prev = self
            .lines
            .last()
            .map(|l| RunMetrics {
                ascent: l.metrics.ascent,
                descent: l.metrics.descent,
                leading: l.metrics.leading,
            })
            .unwrap_or_default();
        let metrics = self.advance_metrics(prev);
        self.lines.push(LineData {
            run_range: self.runs.len()..self.runs.len(),
            text_range: len..len,
            hard_break: false,
            trailing_text: len..len,
            metrics,
        });
    }
}
