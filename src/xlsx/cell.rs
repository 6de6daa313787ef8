//! Cell reference helpers for Excel worksheets.
//!
//! References such as `A1` or `AA10` are converted to 1-based
//! `(column, row)` pairs.

/// Largest row number a worksheet can have.
pub const MAX_ROWS: u32 = 1_048_576;
/// Largest column number a worksheet can have (`XFD`).
pub const MAX_COLUMNS: u32 = 16_384;

/// Convert column number to Excel column letters (e.g., 1 -> "A", 26 -> "Z", 27 -> "AA").
pub fn column_to_letters(col: u32) -> String {
    let mut letters = String::new();
    let mut col = col;

    while col > 0 {
        col -= 1;
        let letter = ((col % 26) as u8 + b'A') as char;
        letters.insert(0, letter);
        col /= 26;
    }

    letters
}

/// Convert an Excel reference (e.g., "B3") to 1-based `(column, row)`.
///
/// Absolute markers (`$B$3`) are accepted. Returns `None` for anything that
/// is not a letters-then-digits reference, or that lies outside
/// [`MAX_COLUMNS`] x [`MAX_ROWS`].
pub fn reference_to_coords(reference: &str) -> Option<(u32, u32)> {
    let bytes = reference.as_bytes();
    let mut col = 0u32;
    let mut pos = 0;

    if bytes.first() == Some(&b'$') {
        pos += 1;
    }
    let letters_start = pos;
    while let Some(b) = bytes.get(pos).filter(|b| b.is_ascii_alphabetic()) {
        col = col
            .checked_mul(26)?
            .checked_add(u32::from(b.to_ascii_uppercase() - b'A') + 1)?;
        if col > MAX_COLUMNS {
            return None;
        }
        pos += 1;
    }
    if pos == letters_start {
        return None;
    }
    if bytes.get(pos) == Some(&b'$') {
        pos += 1;
    }

    let row = atoi_simd::parse::<u32, false, false>(&bytes[pos..]).ok()?;
    if row == 0 || row > MAX_ROWS {
        return None;
    }

    Some((col, row))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_to_letters() {
        assert_eq!(column_to_letters(1), "A");
        assert_eq!(column_to_letters(26), "Z");
        assert_eq!(column_to_letters(27), "AA");
        assert_eq!(column_to_letters(703), "AAA");
    }

    #[test]
    fn test_reference_to_coords() {
        assert_eq!(reference_to_coords("A1"), Some((1, 1)));
        assert_eq!(reference_to_coords("c7"), Some((3, 7)));
        assert_eq!(reference_to_coords("AA10"), Some((27, 10)));
        assert_eq!(reference_to_coords("$B$3"), Some((2, 3)));
    }

    #[test]
    fn test_reference_to_coords_rejects_garbage() {
        assert_eq!(reference_to_coords(""), None);
        assert_eq!(reference_to_coords("12"), None);
        assert_eq!(reference_to_coords("A"), None);
        assert_eq!(reference_to_coords("A0"), None);
        assert_eq!(reference_to_coords("A1B"), None);
    }

    #[test]
    fn test_reference_to_coords_bounds() {
        assert_eq!(reference_to_coords("XFD1048576"), Some((MAX_COLUMNS, MAX_ROWS)));
        assert_eq!(reference_to_coords("XFE1"), None);
        assert_eq!(reference_to_coords("ZZZZZZ1"), None);
        assert_eq!(reference_to_coords("A1048577"), None);
        assert_eq!(reference_to_coords("A4294967295"), None);
        assert_eq!(reference_to_coords("A99999999999"), None);
    }
}
