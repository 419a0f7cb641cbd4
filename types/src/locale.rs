//! Flag emoji for locale codes.

/// Distance from an upper-case ASCII letter to its regional indicator symbol.
const REGIONAL_INDICATOR_OFFSET: u32 = 0x1F1E6 - 'A' as u32;

/// Flag for "US", used when no usable code is supplied.
const FALLBACK_FLAG: &str = "\u{1F1FA}\u{1F1F8}";

/// The flag emoji for `region`, falling back to `language`, then to the US flag.
///
/// Codes are matched case-insensitively; anything that is not exactly two
/// ASCII letters is skipped.
///
/// ```
/// use kitbag_types::emoji_flag;
///
/// assert_eq!(emoji_flag(Some("gb"), None), "\u{1F1EC}\u{1F1E7}");
/// ```
#[must_use]
pub fn emoji_flag(region: Option<&str>, language: Option<&str>) -> String {
    [region, language]
        .into_iter()
        .flatten()
        .find_map(flag_for)
        .unwrap_or_else(|| FALLBACK_FLAG.to_string())
}

fn flag_for(code: &str) -> Option<String> {
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    code.chars()
        .map(|c| char::from_u32(REGIONAL_INDICATOR_OFFSET + c.to_ascii_uppercase() as u32))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::emoji_flag;

    #[test]
    fn region_wins() {
        assert_eq!(emoji_flag(Some("FR"), Some("de")), "\u{1F1EB}\u{1F1F7}");
    }

    #[test]
    fn falls_back_to_language_then_us() {
        assert_eq!(emoji_flag(None, Some("de")), "\u{1F1E9}\u{1F1EA}");
        assert_eq!(emoji_flag(Some("419"), Some("es")), "\u{1F1EA}\u{1F1F8}");
        assert_eq!(emoji_flag(None, None), "\u{1F1FA}\u{1F1F8}");
        assert_eq!(emoji_flag(Some("x"), Some("")), "\u{1F1FA}\u{1F1F8}");
    }
}
