// Copyright 2026 the Layline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Small shared helpers.

/// Byte offset -> UTF-16 offset table for `text`, with one extra entry for
/// the end boundary. Interior bytes of a multi-byte character map to the
/// offset of the character itself.
pub(crate) fn utf16_offsets(text: &str) -> Vec<usize> {
    let mut map = vec![0; text.len() + 1];
    let mut unit = 0;
    for (byte, ch) in text.char_indices() {
        for entry in &mut map[byte..byte + ch.len_utf8()] {
            *entry = unit;
        }
        unit += ch.len_utf16();
    }
    map[text.len()] = unit;
    map
}

/// Decodes a UTF-16 code-unit slice, replacing unpaired surrogates.
///
/// The replacement character occupies one UTF-16 unit, so offsets computed
/// against the decoded string stay aligned with the input units.
pub(crate) fn decode_units(units: &[u16]) -> String {
    String::from_utf16_lossy(units)
}
