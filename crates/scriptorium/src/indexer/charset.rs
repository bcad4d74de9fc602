//! # Charset Conventions
//!
//! Language-model alphabets may contain escaped characters: a backslash
//! escape names a combining diacritic that precedes its base character,
//! e.g. ``\~n`` is ``n`` with a combining tilde.

/// The canonical hyphen symbol.
pub const HYPHEN: &str = "-";

/// The canonical space symbol.
pub const SPACE: &str = " ";

/// Escape prefixes and the combining marks they denote.
const DIACRITIC_ESCAPES: &[(char, char)] = &[
    ('`', '\u{0300}'),
    ('\'', '\u{0301}'),
    ('^', '\u{0302}'),
    ('~', '\u{0303}'),
    ('-', '\u{0304}'),
    ('"', '\u{0308}'),
    ('c', '\u{0327}'),
];

fn combining_mark(escape: char) -> Option<char> {
    DIACRITIC_ESCAPES
        .iter()
        .find(|&&(e, _)| e == escape)
        .map(|&(_, mark)| mark)
}

/// Render an escaped character as base character plus combining marks.
///
/// Unrecognized escapes are returned unchanged.
///
/// ## Arguments
/// * `escaped` - an alphabet symbol, possibly escaped.
///
/// ## Returns
/// The display form of the symbol.
pub fn unescape_char(escaped: &str) -> String {
    let mut marks = Vec::new();
    let mut rest = escaped;
    while let Some(tail) = rest.strip_prefix('\\') {
        let mut chars = tail.chars();
        let Some(mark) = chars.next().and_then(combining_mark) else {
            return escaped.to_string();
        };
        let after = chars.as_str();
        if after.is_empty() {
            // A trailing escape has no base character.
            return escaped.to_string();
        }
        marks.push(mark);
        rest = after;
    }

    let mut out = String::with_capacity(rest.len() + 2 * marks.len());
    out.push_str(rest);
    out.extend(marks);
    out
}

/// Is this symbol the canonical hyphen?
pub fn is_hyphen(symbol: &str) -> bool {
    symbol == HYPHEN
}
