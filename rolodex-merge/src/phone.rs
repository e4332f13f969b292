//! Phone number canonicalization
//!
//! Numbers are reduced to their digits and regrouped as `000-000-0000`.
//! No length validation happens: short or long digit strings still produce
//! a deterministic (if odd looking) result.

/// Character offset where the second number of a two-number cell begins.
///
/// Cells holding two numbers come from exports formatted `(000) 000-0000 `,
/// which is exactly this many characters wide.
pub const SECOND_NUMBER_OFFSET: usize = 15;

/// Format a raw phone cell as `ddd-ddd-d…`
///
/// Returns an empty string when the cell holds no digits.
///
/// ```
/// use rolodex_merge::phone::format_phone;
///
/// assert_eq!(format_phone("(555) 123-4567"), "555-123-4567");
/// assert_eq!(format_phone("(555) 123-4567 ext 2"), "555-123-4567");
/// assert_eq!(format_phone("n/a"), "");
/// ```
pub fn format_phone(raw: &str) -> String {
    let digits = extract_digits(raw);
    if digits.is_empty() {
        return String::new();
    }

    // Digits are ASCII, so byte offsets are char offsets
    let first = &digits[..digits.len().min(3)];
    let second = &digits[digits.len().min(3)..digits.len().min(6)];
    let rest = &digits[digits.len().min(6)..];

    format!("{}-{}-{}", first, second, rest)
}

/// Collect the digits of a number, stopping at an extension marker.
///
/// Letters before the first digit are labels ("Cell: …") and are skipped.
/// After a digit has been seen, a letter or `#` starts an extension
/// ("x12", "ext 2", "#3") or a trailing label and ends the number.
fn extract_digits(raw: &str) -> String {
    let mut digits = String::new();

    for ch in raw.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
        } else if !digits.is_empty() && (ch.is_ascii_alphabetic() || ch == '#') {
            break;
        }
    }

    digits
}

/// True when a cell looks like two numbers run together
pub fn has_two_numbers(raw: &str) -> bool {
    raw.chars().filter(|&c| c == '(').count() > 1
}

/// Split a raw phone cell into its formatted numbers
///
/// Most cells yield one number. A cell with more than one `(` is split at
/// [`SECOND_NUMBER_OFFSET`] and yields two. Empty results are dropped, so a
/// blank cell yields nothing.
pub fn split_phone_cell(raw: &str) -> Vec<String> {
    let parts: Vec<String> = if has_two_numbers(raw) {
        let head: String = raw.chars().take(SECOND_NUMBER_OFFSET).collect();
        let tail: String = raw.chars().skip(SECOND_NUMBER_OFFSET).collect();
        vec![format_phone(&head), format_phone(&tail)]
    } else {
        vec![format_phone(raw)]
    };

    parts.into_iter().filter(|p| !p.is_empty()).collect()
}
