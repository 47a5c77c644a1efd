//! Bundled big-character extension.
//!
//! Turns a short string into two rows of half- and full-block
//! characters which, rendered in the bundled 5×8 face, read as
//! double-height characters. The `bigchars` and `bigplay` transforms
//! hand out one row at a time; a caller asking for a row the rendering
//! does not have gets an error from the transform layer, not from here.

/// Number of rows a big rendering occupies.
pub const ROWS: usize = 2;

/// Per-character block art: (top row, bottom row).
///
/// Cells are equal-width per character so rows stay aligned.
const ART: &[(char, [&str; ROWS])] = &[
    (' ', ["  ", "  "]),
    ('0', ["█▀█", "█▄█"]),
    ('1', ["▀█ ", "▄█▄"]),
    ('2', ["▀▀█", "█▄▄"]),
    ('3', ["▀▀█", "▄▄█"]),
    ('4', ["█ █", "▀▀█"]),
    ('5', ["█▀▀", "▄▄█"]),
    ('6', ["█▄▄", "█▄█"]),
    ('7', ["▀▀█", "  █"]),
    ('8', ["▄█▄", "█▄█"]),
    ('9', ["█▀█", "▀▀█"]),
    (':', ["▀", "▄"]),
    ('-', ["  ", "▀▀"]),
    ('.', [" ", "▄"]),
    ('/', [" ▄█", "█▀ "]),
    ('A', ["▄▀▄", "█▀█"]),
    ('L', ["█  ", "█▄▄"]),
    ('O', ["█▀█", "█▄█"]),
    ('P', ["█▀█", "█▀▀"]),
    ('S', ["▄▀▀", "▄▄█"]),
    ('T', ["▀█▀", " █ "]),
    ('Y', ["█ █", " █ "]),
];

const FALLBACK: [&str; ROWS] = ["▀█", " ▄"];

fn art_for(c: char) -> [&'static str; ROWS] {
    ART.iter()
        .find(|(ch, _)| *ch == c)
        .map(|(_, rows)| *rows)
        .unwrap_or(FALLBACK)
}

/// Render `text` as [`ROWS`] rows of block characters.
///
/// Unknown characters render as a fallback block so row alignment is
/// never lost.
pub fn generate(text: &str) -> Vec<String> {
    let mut rows = vec![String::new(); ROWS];
    for (i, c) in text.chars().enumerate() {
        let art = art_for(c);
        for (row, line) in rows.iter_mut().enumerate() {
            if i > 0 {
                line.push(' ');
            }
            line.push_str(art[row]);
        }
    }
    rows
}

/// The playback banner used by the `bigplay` transform: a play symbol
/// followed by the word PLAY, one call per row.
pub fn play_banner() -> Vec<String> {
    let symbol = ["█▄ ", "█▀ "];
    let word = generate("PLAY");
    (0..ROWS)
        .map(|row| format!("{}  {}", symbol[row], word[row]))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn two_rows_always() {
        assert_eq!(generate("12:34").len(), ROWS);
        assert_eq!(generate("").len(), ROWS);
    }

    #[test]
    fn rows_stay_aligned() {
        let rows = generate("0:1");
        assert_eq!(rows[0].chars().count(), rows[1].chars().count());
    }

    #[test]
    fn unknown_char_uses_fallback() {
        let rows = generate("~");
        assert_eq!(rows[0], FALLBACK[0]);
        assert_eq!(rows[1], FALLBACK[1]);
    }

    #[test]
    fn play_banner_has_both_rows() {
        let rows = play_banner();
        assert_eq!(rows.len(), ROWS);
        assert!(rows[0].contains("█"));
    }

    #[test]
    fn characters_joined_with_single_gap() {
        let rows = generate("00");
        // Two 3-wide digits and one separating space.
        assert_eq!(rows[0].chars().count(), 7);
    }
}
