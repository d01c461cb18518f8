// Copyright 2026 the Layline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Font resolution: caller font blocks to concrete typeface spans.

use core::ops::Range;

use peniko::FontData as Font;

use crate::font::{FontBlock, FontChain, ResolvedFontBlock};
use crate::shape::ShapeEngine;
use crate::text::UnicodeText;
use crate::util::decode_units;

/// Resolves one chain over `range`, splitting at maximal boundaries where
/// the first covering typeface changes.
///
/// Typeface availability per code point is delegated to the shaping
/// collaborator's [`covers`](ShapeEngine::covers). Whitespace and control
/// units never force a split: they inherit the surrounding typeface. A
/// chain with no usable typeface yields an empty result, which signals
/// "unresolvable" rather than an error.
pub fn resolve_chain(
    text: &UnicodeText,
    range: Range<usize>,
    chain: &dyn FontChain,
    engine: &mut dyn ShapeEngine,
) -> Vec<ResolvedFontBlock> {
    assert!(
        range.start <= range.end && range.end <= text.len(),
        "malformed text range {range:?}"
    );
    let candidates: Vec<Font> = (0..chain.count()).filter_map(|i| chain.typeface(i)).collect();
    if candidates.is_empty() || range.is_empty() {
        return Vec::new();
    }

    // One choice per code unit; `None` defers to the surrounding text.
    let mut choices: Vec<Option<usize>> = Vec::with_capacity(range.len());
    let decoded = decode_units(&text.units()[range.clone()]);
    for ch in decoded.chars() {
        let choice = if ch.is_whitespace() || ch.is_control() {
            None
        } else {
            Some(
                candidates
                    .iter()
                    .position(|font| engine.covers(font, ch))
                    .unwrap_or(0),
            )
        };
        for _ in 0..ch.len_utf16() {
            choices.push(choice);
        }
    }
    // Deferred units inherit backwards first, then forwards; an
    // all-deferred span lands on the first typeface.
    let mut last = None;
    for choice in &mut choices {
        match choice {
            Some(index) => last = Some(*index),
            None => *choice = last,
        }
    }
    let mut next = None;
    for choice in choices.iter_mut().rev() {
        match choice {
            Some(index) => next = Some(*index),
            None => *choice = next,
        }
    }

    let mut blocks = Vec::new();
    let mut start = 0;
    while start < choices.len() {
        let index = choices[start].unwrap_or(0);
        let mut end = start + 1;
        while end < choices.len() && choices[end].unwrap_or(0) == index {
            end += 1;
        }
        blocks.push(ResolvedFontBlock {
            text_range: range.start + start..range.start + end,
            font: candidates[index].clone(),
            size: chain.size(),
        });
        start = end;
    }
    blocks
}

/// Resolves every input block in order and concatenates the results.
///
/// Block lengths must sum to the text length. The output partitions the
/// text: contiguous, non-overlapping, ordered, covering every unit. If any
/// non-empty block is unresolvable the whole result is empty — downstream
/// then has nothing to shape.
pub fn resolve_fonts(
    text: &UnicodeText,
    blocks: &[FontBlock<'_>],
    engine: &mut dyn ShapeEngine,
) -> Vec<ResolvedFontBlock> {
    let total: usize = blocks.iter().map(|b| b.len).sum();
    assert_eq!(total, text.len(), "font blocks must cover the text exactly");

    let mut resolved = Vec::new();
    let mut offset = 0;
    for block in blocks {
        let range = offset..offset + block.len;
        offset = range.end;
        if range.is_empty() {
            continue;
        }
        let chunk = resolve_chain(text, range, block.chain, engine);
        if chunk.is_empty() {
            tracing::warn!(?block, "unresolvable font block; nothing to shape");
            return Vec::new();
        }
        resolved.extend(chunk);
    }
    tracing::debug!(blocks = resolved.len(), "resolved fonts");
    debug_assert!(
        partitions(&resolved, text.len()),
        "resolved blocks must partition the text"
    );
    resolved
}

fn partitions(blocks: &[ResolvedFontBlock], len: usize) -> bool {
    let mut expected = 0;
    for block in blocks {
        if block.text_range.start != expected || block.text_range.is_empty() {
            return false;
        }
        expected = block.text_range.end;
    }
    expected == len
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Analyzer;
    use crate::testing::{TestShaper, chain, chain_without_ascii, two_font_chain};

    fn text(s: &str) -> UnicodeText {
        UnicodeText::new(&Analyzer::new(), s)
    }

    #[test]
    fn single_chain_resolves_to_one_block() {
        let t = text("Hello world");
        let stack = chain();
        let mut engine = TestShaper::new();
        let blocks = resolve_chain(&t, 0..t.len(), &stack, &mut engine);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text_range, 0..11);
    }

    #[test]
    fn resolved_blocks_partition_the_text() {
        let t = text("ab \u{4E2D}\u{6587} cd");
        let stack = two_font_chain();
        let mut engine = TestShaper::new();
        let blocks = resolve_fonts(
            &t,
            &[FontBlock {
                len: t.len(),
                chain: &stack,
            }],
            &mut engine,
        );
        assert!(!blocks.is_empty());
        let mut expected = 0;
        for block in &blocks {
            assert_eq!(block.text_range.start, expected);
            expected = block.text_range.end;
        }
        assert_eq!(expected, t.len());
    }

    #[test]
    fn whitespace_inherits_surrounding_typeface() {
        let t = text("\u{4E2D} \u{4E2D}");
        let stack = two_font_chain();
        let mut engine = TestShaper::new();
        let blocks = resolve_chain(&t, 0..t.len(), &stack, &mut engine);
        assert_eq!(blocks.len(), 1, "space must not split the block");
    }

    #[test]
    fn empty_chain_is_unresolvable() {
        let t = text("abc");
        let stack = crate::FontStack::new(Vec::new(), 14.0);
        let mut engine = TestShaper::new();
        assert!(resolve_chain(&t, 0..t.len(), &stack, &mut engine).is_empty());
    }

    #[test]
    fn uncovered_text_falls_back_to_first_entry() {
        let t = text("abc");
        let stack = chain_without_ascii();
        let mut engine = TestShaper::new();
        let blocks = resolve_chain(&t, 0..t.len(), &stack, &mut engine);
        assert_eq!(blocks.len(), 1);
    }
}
