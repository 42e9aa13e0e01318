use unicode_normalization::UnicodeNormalization;

/// Placeholder the scrapers emit when a listing has no sell price
pub const MISSING_PRICE_TEXT: &str = "Precio no encontrado";

/// Build the search key for a piece of display text.
///
/// The text is decomposed (NFD) so accented letters split into an ASCII base
/// plus combining marks; everything that is not an ASCII letter or digit is
/// dropped, whitespace runs collapse to a single space, and the result is
/// lower-cased. The function is total and idempotent.
pub fn normalize(text: &str) -> String {
    let mut key = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.nfd() {
        if c.is_ascii_alphanumeric() {
            if pending_space && !key.is_empty() {
                key.push(' ');
            }
            pending_space = false;
            key.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() {
            pending_space = true;
        }
    }

    key
}

/// Parse a display price such as `"$ 1.299.900"` or `"$ 45.990,50"`.
///
/// Returns `None` for empty text, the missing-price placeholder, anything
/// that does not parse as a number, and non-finite values.
pub fn try_parse_price(text: &str) -> Option<f64> {
    if text.is_empty() || text == MISSING_PRICE_TEXT {
        return None;
    }

    // "." groups thousands, "," marks decimals
    let digits = text.replace('$', "").replace('.', "").replace(',', ".");
    digits
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Lossy variant of [`try_parse_price`]: unparsable text yields `0.0`.
pub fn parse_price(text: &str) -> f64 {
    try_parse_price(text).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_accents_and_case() {
        assert_eq!(normalize("Teléfono Samsung"), "telefono samsung");
        assert_eq!(normalize("AUDÍFONOS Inalámbricos"), "audifonos inalambricos");
        assert_eq!(normalize("Piñata"), "pinata");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize("Red Chair"), "red chair");
        assert_eq!(normalize("red  chair"), "red chair");
        assert_eq!(normalize("  red\tchair \n"), "red chair");
    }

    #[test]
    fn test_normalize_drops_punctuation() {
        assert_eq!(normalize("Laptop (15\") - Pro!"), "laptop 15 pro");
        assert_eq!(normalize("USB-C"), "usbc");
        assert_eq!(normalize("$ 100.000"), "100000");
        assert_eq!(normalize("ß™"), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for text in ["Teléfono  Samsung!", "", "   ", "Ça va? Ñandú 42", "a\u{00A0}b"] {
            let once = normalize(text);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_parse_price_formats() {
        assert_eq!(parse_price("$ 1.299.900"), 1_299_900.0);
        assert_eq!(parse_price("$45.990,50"), 45_990.5);
        assert_eq!(parse_price("  120000 "), 120_000.0);
    }

    #[test]
    fn test_parse_price_fallback() {
        assert_eq!(parse_price(""), 0.0);
        assert_eq!(parse_price(MISSING_PRICE_TEXT), 0.0);
        assert_eq!(parse_price("consultar"), 0.0);
        assert_eq!(parse_price("inf"), 0.0);
        assert_eq!(try_parse_price("NaN"), None);
        assert_eq!(try_parse_price("$ 10"), Some(10.0));
    }
}
