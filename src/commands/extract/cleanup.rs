/// Normalizes decoder output into plain UTF-8 lines: NUL and other control
/// characters go, non-breaking spaces become spaces, replacement glyphs are
/// dropped. Newlines and tabs survive; `\r\n` collapses to `\n`.
pub(super) fn clean_text(input: &str) -> String {
    input
        .replace("\r\n", "\n")
        .chars()
        .filter_map(|character| match character {
            '\u{00A0}' => Some(' '),
            '\u{FFFD}' => None,
            '\n' | '\t' => Some(character),
            '\r' => Some('\n'),
            other if other.is_control() => None,
            other => Some(other),
        })
        .collect()
}
