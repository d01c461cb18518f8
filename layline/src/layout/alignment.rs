// Copyright 2026 the Layline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{Alignment, WrappedText};
use crate::analysis::Direction;
use crate::error::LayoutError;

/// Computes per-line horizontal offsets.
///
/// Every offset is rewritten from scratch, so the pass is idempotent and
/// may be repeated with different arguments on the same layout.
pub(crate) fn align(
    wrapped: &mut WrappedText<'_>,
    container_width: Option<f32>,
    alignment: Alignment,
    direction: Direction,
) -> Result<(), LayoutError> {
    if alignment == Alignment::Justify {
        return Err(LayoutError::UnsupportedAlignment(alignment));
    }
    let is_rtl = direction == Direction::Rtl;
    let container_width = container_width.unwrap_or_else(|| {
        wrapped
            .lines
            .iter()
            .map(|line| line.metrics.advance)
            .max_by(f32::total_cmp)
            .unwrap_or(0.0)
    });

    for line in &mut wrapped.lines {
        // Hanging trailing whitespace does not consume free space.
        let free_space =
            container_width - line.metrics.advance + line.metrics.trailing_advance;
        line.metrics.offset = match alignment {
            Alignment::Left => 0.0,
            Alignment::Right => free_space,
            Alignment::Center => free_space * 0.5,
            Alignment::Justify => unreachable!("rejected above"),
        };
        if is_rtl {
            // In RTL text trailing whitespace hangs on the left; shift the
            // line so the content edge stays inside the container.
            line.metrics.offset -= line.metrics.trailing_advance;
        }
    }
    Ok(())
}
