// Copyright 2026 the Layline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Unicode text layout.
//!
//! Layline turns a code-unit buffer plus a caller-supplied font assignment
//! into shaped glyph runs, a wrapped and aligned layout, a paintable
//! glyph-run traversal and a navigable cursor model. All text indices are
//! UTF-16 code-unit offsets; the pipeline keeps those offsets, grapheme
//! boundaries, glyph indices and per-line visual order consistent across
//! every stage.
//!
//! The pipeline is strictly linear. Each stage is produced once by a
//! factory call on the previous stage and is immutable afterwards:
//!
//! ```text
//! UnicodeText -> resolve_fonts -> ShapedText -> WrappedText -> visit
//! ```
//!
//! Character classification, bidi ordering and glyph shaping are external
//! collaborators expressed as traits ([`UnicodeServices`], [`ShapeEngine`],
//! [`FontChain`]); default implementations backed by `unicode-*` crates and
//! `swash` are provided.

pub use peniko::FontData as Font;

mod context;
mod error;
mod resolve;
mod util;

pub mod analysis;
pub mod cursor;
pub mod font;
pub mod layout;
pub mod paint;
pub mod shape;
pub mod text;

#[doc(hidden)]
pub mod testing;

pub use analysis::{Analyzer, Direction, UnicodeServices};
pub use context::LayoutContext;
pub use cursor::{CursorModel, Granularity, Position};
pub use error::LayoutError;
pub use font::{FontBlock, FontChain, FontStack, ResolvedFontBlock};
pub use layout::{
    Alignment, GlyphRun, Line, LineMetrics, Visitor, VisualRun, WrapOptions, WrappedText,
};
pub use paint::{GlyphBlob, PaintSink};
pub use resolve::{resolve_chain, resolve_fonts};
pub use shape::{
    LogicalRun, Placeholder, RunKind, RunMetrics, ShapeEngine, ShapeRequest, ShapedGlyphs,
    ShapedText, SwashShaper,
};
pub use text::{UnicodeText, UnitFlags};
