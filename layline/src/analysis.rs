// Copyright 2026 the Layline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Unicode classification and bidi ordering.
//!
//! Everything the engine needs to know about characters flows through
//! [`UnicodeServices`]: per-code-unit property flags, per-unit bidi levels
//! and the visual-order permutation used when a wrapped line mixes
//! directions. [`Analyzer`] is the default implementation, backed by the
//! `unicode-segmentation`, `unicode-linebreak` and `unicode-bidi` crates.

use unicode_bidi::{BidiInfo, Level};
use unicode_linebreak::{BreakOpportunity, linebreaks};
use unicode_segmentation::UnicodeSegmentation;

use crate::text::UnitFlags;
use crate::util::{decode_units, utf16_offsets};

/// Base paragraph direction.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    /// Left-to-right.
    #[default]
    Ltr,
    /// Right-to-left.
    Rtl,
}

impl Direction {
    pub(crate) fn level(self) -> u8 {
        match self {
            Self::Ltr => 0,
            Self::Rtl => 1,
        }
    }
}

/// External Unicode collaborator.
///
/// Implementations must be pure: the same input always produces the same
/// output, and calls are synchronous.
pub trait UnicodeServices {
    /// Computes property flags for every code unit of `units`.
    ///
    /// The returned vector has exactly one entry per unit.
    fn unit_flags(&self, units: &[u16]) -> Vec<UnitFlags>;

    /// Computes the resolved bidi embedding level of every code unit given
    /// the base paragraph direction.
    fn bidi_levels(&self, units: &[u16], base: Direction) -> Vec<u8>;

    /// Computes the visual-order permutation for a sequence of bidi levels.
    ///
    /// `result[visual_index]` is the logical index of the item shown at
    /// that visual position, leftmost first.
    fn visual_order(&self, levels: &[u8]) -> Vec<usize>;
}

/// Default [`UnicodeServices`] implementation.
#[derive(Copy, Clone, Debug, Default)]
pub struct Analyzer;

impl Analyzer {
    /// Creates the default analyzer.
    pub fn new() -> Self {
        Self
    }
}

impl UnicodeServices for Analyzer {
    fn unit_flags(&self, units: &[u16]) -> Vec<UnitFlags> {
        let mut flags = vec![UnitFlags::empty(); units.len()];
        if units.is_empty() {
            return flags;
        }
        let text = decode_units(units);
        let to_unit = utf16_offsets(&text);

        for (byte_start, _) in text.grapheme_indices(true) {
            flags[to_unit[byte_start]] |= UnitFlags::GRAPHEME_START;
        }
        for (offset, opportunity) in linebreaks(&text) {
            if offset < text.len() && opportunity == BreakOpportunity::Allowed {
                flags[to_unit[offset]] |= UnitFlags::SOFT_BREAK_BEFORE;
            }
        }
        let mut byte = 0;
        for ch in text.chars() {
            let unit = to_unit[byte];
            let width = ch.len_utf16();
            if ch.is_whitespace() {
                for entry in &mut flags[unit..unit + width] {
                    *entry |= UnitFlags::WHITESPACE;
                }
            }
            if is_line_break_char(ch) {
                // Break units always start their own cluster, and so does
                // whatever follows them; UAX-29 treats CRLF as a single
                // grapheme, which is too coarse for the one-unit-separator
                // contract of the wrapper.
                flags[unit] |= UnitFlags::HARD_BREAK | UnitFlags::GRAPHEME_START;
                if let Some(entry) = flags.get_mut(unit + width) {
                    *entry |= UnitFlags::GRAPHEME_START;
                }
            }
            byte += ch.len_utf8();
        }
        flags
    }

    fn bidi_levels(&self, units: &[u16], base: Direction) -> Vec<u8> {
        if units.is_empty() {
            return Vec::new();
        }
        let text = decode_units(units);
        let base_level = if base == Direction::Rtl {
            Level::rtl()
        } else {
            Level::ltr()
        };
        let info = BidiInfo::new(&text, Some(base_level));
        let mut levels = vec![base.level(); units.len()];
        let mut byte = 0;
        let mut unit = 0;
        for ch in text.chars() {
            let level = info.levels[byte].number();
            for entry in &mut levels[unit..unit + ch.len_utf16()] {
                *entry = level;
            }
            byte += ch.len_utf8();
            unit += ch.len_utf16();
        }
        levels
    }

    fn visual_order(&self, levels: &[u8]) -> Vec<usize> {
        let levels: Vec<Level> = levels
            .iter()
            .map(|&l| Level::new(l).unwrap_or_else(|_| Level::ltr()))
            .collect();
        BidiInfo::reorder_visual(&levels)
    }
}

/// Mandatory break characters: LF, VT, FF, CR, NEL and the Unicode line
/// and paragraph separators.
fn is_line_break_char(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\u{000B}' | '\u{000C}' | '\r' | '\u{0085}' | '\u{2028}' | '\u{2029}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_mark_grapheme_starts_and_whitespace() {
        let analyzer = Analyzer::new();
        let units: Vec<u16> = "a b".encode_utf16().collect();
        let flags = analyzer.unit_flags(&units);
        assert!(flags[0].contains(UnitFlags::GRAPHEME_START));
        assert!(flags[1].contains(UnitFlags::WHITESPACE));
        assert!(flags[2].contains(UnitFlags::SOFT_BREAK_BEFORE));
    }

    #[test]
    fn crlf_units_each_break() {
        let analyzer = Analyzer::new();
        let units: Vec<u16> = "a\r\nb".encode_utf16().collect();
        let flags = analyzer.unit_flags(&units);
        assert!(flags[1].contains(UnitFlags::HARD_BREAK));
        assert!(flags[2].contains(UnitFlags::HARD_BREAK));
        assert!(flags[2].contains(UnitFlags::GRAPHEME_START));
        assert!(flags[3].contains(UnitFlags::GRAPHEME_START));
    }

    #[test]
    fn surrogate_pair_has_single_grapheme_start() {
        let analyzer = Analyzer::new();
        let units: Vec<u16> = "a\u{1F600}b".encode_utf16().collect();
        let flags = analyzer.unit_flags(&units);
        assert_eq!(units.len(), 4);
        assert!(flags[1].contains(UnitFlags::GRAPHEME_START));
        assert!(!flags[2].contains(UnitFlags::GRAPHEME_START));
        assert!(flags[3].contains(UnitFlags::GRAPHEME_START));
    }

    #[test]
    fn rtl_levels_are_odd() {
        let analyzer = Analyzer::new();
        let units: Vec<u16> = "\u{05D0}\u{05D1}".encode_utf16().collect();
        let levels = analyzer.bidi_levels(&units, Direction::Ltr);
        assert!(levels.iter().all(|&l| l & 1 == 1));
    }

    #[test]
    fn visual_order_reverses_rtl_runs() {
        let analyzer = Analyzer::new();
        assert_eq!(analyzer.visual_order(&[1, 1, 1]), vec![2, 1, 0]);
        assert_eq!(analyzer.visual_order(&[0, 0]), vec![0, 1]);
    }
}
