// Copyright 2026 the Layline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::layout::Alignment;

/// Recoverable layout failures.
///
/// Malformed ranges are a fail-fast contract (asserted, not returned) and
/// navigation queries clamp instead of failing, so the set of recoverable
/// errors is deliberately small.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// The requested alignment is not implemented by the formatter.
    ///
    /// Justified alignment in particular is rejected rather than silently
    /// falling back to left alignment.
    #[error("unsupported alignment: {0:?}")]
    UnsupportedAlignment(Alignment),
}
