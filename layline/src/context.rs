// Copyright 2026 the Layline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reusable pipeline driver.

use crate::analysis::{Analyzer, Direction, UnicodeServices};
use crate::font::FontBlock;
use crate::layout::{WrapOptions, WrappedText};
use crate::resolve::resolve_fonts;
use crate::shape::{Placeholder, ShapeEngine, ShapedText, SwashShaper};
use crate::text::UnicodeText;

/// Owns the external collaborators and runs the pipeline stages in order.
///
/// The context holds no per-paragraph state; it exists so the shaping
/// engine's scratch allocations are reused across paragraphs.
#[derive(Debug, Default)]
pub struct LayoutContext<U = Analyzer, S = SwashShaper> {
    services: U,
    engine: S,
}

impl LayoutContext {
    /// Creates a context with the default collaborators.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<U: UnicodeServices, S: ShapeEngine> LayoutContext<U, S> {
    /// Creates a context with custom collaborators.
    pub fn with(services: U, engine: S) -> Self {
        Self { services, engine }
    }

    /// Builds the text stage from a UTF-8 buffer.
    pub fn analyze(&self, text: &str) -> UnicodeText {
        UnicodeText::new(&self.services, text)
    }

    /// Builds the text stage from a UTF-16 buffer.
    pub fn analyze_units(&self, units: Vec<u16>) -> UnicodeText {
        UnicodeText::from_units(&self.services, units)
    }

    /// Resolves fonts and shapes the paragraph in one step.
    pub fn shape(
        &mut self,
        text: &UnicodeText,
        blocks: &[FontBlock<'_>],
        placeholders: &[Placeholder],
        direction: Direction,
    ) -> ShapedText {
        let resolved = resolve_fonts(text, blocks, &mut self.engine);
        ShapedText::shape(
            text,
            &resolved,
            placeholders,
            &self.services,
            &mut self.engine,
            direction,
        )
    }

    /// Wraps a shaped paragraph into lines.
    pub fn wrap<'a>(
        &self,
        text: &'a UnicodeText,
        shaped: &'a ShapedText,
        options: WrapOptions,
    ) -> WrappedText<'a> {
        WrappedText::new(text, shaped, &self.services, options)
    }

    /// The Unicode collaborator.
    pub fn services(&self) -> &U {
        &self.services
    }

    /// The shaping collaborator.
    pub fn engine(&mut self) -> &mut S {
        &mut self.engine
    }
}
