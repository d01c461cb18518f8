// Copyright 2026 the Layline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Font chains and resolved font blocks.

use core::ops::Range;

use peniko::FontData as Font;
use swash::FontRef;

/// Read-only, prioritized list of typefaces applied to a span of text.
///
/// A chain never performs fallback policy of its own; resolution simply
/// walks the chain in order and picks the first typeface that can render a
/// given code point. An empty chain (or one whose entries are all missing)
/// makes the covered text unresolvable.
pub trait FontChain {
    /// Number of typefaces in the chain.
    fn count(&self) -> usize;

    /// Typeface at `index`, if present.
    fn typeface(&self, index: usize) -> Option<Font>;

    /// Font size shared by every typeface in the chain.
    fn size(&self) -> f32;
}

/// Vec-backed [`FontChain`].
#[derive(Clone, Debug)]
pub struct FontStack {
    fonts: Vec<Font>,
    size: f32,
}

impl FontStack {
    /// Creates a chain from an ordered list of typefaces.
    pub fn new(fonts: Vec<Font>, size: f32) -> Self {
        Self { fonts, size }
    }
}

impl FontChain for FontStack {
    fn count(&self) -> usize {
        self.fonts.len()
    }

    fn typeface(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    fn size(&self) -> f32 {
        self.size
    }
}

/// Caller-supplied assignment of a font chain to a span of code units.
///
/// Blocks are interpreted in order; their lengths must sum to the text
/// length.
#[derive(Copy, Clone)]
pub struct FontBlock<'a> {
    /// Number of UTF-16 code units covered by this block.
    pub len: usize,
    /// Chain used to resolve typefaces within the block.
    pub chain: &'a dyn FontChain,
}

impl core::fmt::Debug for FontBlock<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FontBlock")
            .field("len", &self.len)
            .field("chain_count", &self.chain.count())
            .finish()
    }
}

/// A maximal span of text sharing one concrete typeface and size.
///
/// Produced by [`resolve_fonts`](crate::resolve_fonts); the resolved blocks
/// of a text always partition it: contiguous, non-overlapping, in order and
/// covering every code unit.
#[derive(Clone, Debug)]
pub struct ResolvedFontBlock {
    /// Covered range of UTF-16 code units.
    pub text_range: Range<usize>,
    /// Concrete typeface for the span.
    pub font: Font,
    /// Font size for the span.
    pub size: f32,
}

/// Borrows the font's data as a swash [`FontRef`].
///
/// Returns `None` when the blob does not parse as a font at the recorded
/// index.
pub(crate) fn font_ref(font: &Font) -> Option<FontRef<'_>> {
    FontRef::from_index(font.data.as_ref(), font.index as usize)
}
