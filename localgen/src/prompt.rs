//! Text extraction shared by the generation and token-counting paths.

use genapi::ContentInput;

/// Flatten every text part into the provider prompt.
///
/// Each part is followed by a newline and the result is trimmed, so
/// `["Hello", "world"]` becomes `"Hello\nworld"`. Content with no text
/// parts flattens to the empty string.
pub fn flatten_prompt(contents: &ContentInput) -> String {
    let mut prompt = String::new();
    for text in contents.texts() {
        prompt.push_str(text);
        prompt.push('\n');
    }
    prompt.trim().to_string()
}

/// Estimate the token total for the request text.
///
/// Text parts are joined by single spaces, trimmed, and counted at four
/// characters per token, rounded up. A blunt heuristic, but it needs no
/// server round trip and is monotonic in the text length.
pub fn estimate_tokens(contents: &ContentInput) -> u32 {
    let joined = contents.texts().join(" ");
    tokens_for_chars(joined.trim().chars().count())
}

fn tokens_for_chars(chars: usize) -> u32 {
    u32::try_from(chars.div_ceil(4)).unwrap_or(u32::MAX)
}
