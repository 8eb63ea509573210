//! Discord message text helpers.

/// Discord rejects messages longer than 2000 characters.
pub const DISCORD_MAX_MESSAGE_LEN: usize = 2000;

/// The literal forms Discord uses to mention a user in message content.
///
/// `<@!id>` is the legacy nickname form still produced by some clients.
#[must_use]
pub fn mention_tokens(user_id: u64) -> Vec<String> {
    vec![format!("<@{user_id}>"), format!("<@!{user_id}>")]
}

/// Split text into chunks of at most `max_chars` characters.
/// Tries to split at newlines or spaces to avoid breaking words.
#[must_use]
pub fn chunk_message(text: &str, max_chars: usize) -> Vec<String> {
    if max_chars == 0 {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        let Some((window_end, _)) = remaining.char_indices().nth(max_chars) else {
            chunks.push(remaining.to_string());
            break;
        };

        let slice = &remaining[..window_end];
        let split_at = slice
            .rfind('\n')
            .or_else(|| slice.rfind(' '))
            .filter(|&i| i > 0)
            .unwrap_or(window_end);

        chunks.push(remaining[..split_at].to_string());
        remaining = remaining[split_at..].trim_start_matches(['\n', ' ']);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mention_forms() {
        assert_eq!(mention_tokens(42), vec!["<@42>", "<@!42>"]);
    }

    #[test]
    fn chunk_short_message() {
        assert_eq!(chunk_message("hello", 100), vec!["hello"]);
    }

    #[test]
    fn chunk_at_newline() {
        let chunks = chunk_message("line1\nline2\nline3", 10);
        assert_eq!(chunks, vec!["line1", "line2", "line3"]);
    }

    #[test]
    fn chunk_at_space() {
        let chunks = chunk_message("hello world foo bar", 10);
        assert_eq!(chunks, vec!["hello", "world foo", "bar"]);
    }

    #[test]
    fn hard_split_without_whitespace() {
        let chunks = chunk_message("abcdefghij", 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let text = "あ".repeat(DISCORD_MAX_MESSAGE_LEN);
        let chunks = chunk_message(&text, DISCORD_MAX_MESSAGE_LEN);
        assert_eq!(chunks.len(), 1);

        let longer = "あ".repeat(DISCORD_MAX_MESSAGE_LEN + 1);
        let chunks = chunk_message(&longer, DISCORD_MAX_MESSAGE_LEN);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), DISCORD_MAX_MESSAGE_LEN);
        assert_eq!(chunks[1], "あ");
    }

    #[test]
    fn empty_text_has_no_chunks() {
        assert!(chunk_message("", 10).is_empty());
    }
}
