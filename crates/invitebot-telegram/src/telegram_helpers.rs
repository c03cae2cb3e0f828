/// Telegram rejects `sendMessage` text longer than this many characters.
pub const TELEGRAM_MAX_MESSAGE_CHARS: usize = 4096;

pub fn truncate_for_error(value: &str, max_chars: usize) -> String {
    let trimmed = value.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let mut truncated = trimmed.chars().take(max_chars).collect::<String>();
    truncated.push_str("...");
    truncated
}

/// Splits `text` into chunks of at most `max_chars` characters, breaking on
/// line boundaries when possible. Lines longer than the limit are hard-split.
pub fn chunk_text_by_lines(text: &str, max_chars: usize) -> Vec<String> {
    if text.is_empty() || max_chars == 0 {
        return Vec::new();
    }
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0_usize;

    for line in text.split('\n') {
        let line_len = line.chars().count();
        let separator_len = usize::from(!current.is_empty());
        if current_len + separator_len + line_len <= max_chars {
            if separator_len == 1 {
                current.push('\n');
            }
            current.push_str(line);
            current_len += separator_len + line_len;
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if line_len <= max_chars {
            current.push_str(line);
            current_len = line_len;
            continue;
        }

        let mut piece = String::new();
        let mut piece_len = 0_usize;
        for ch in line.chars() {
            piece.push(ch);
            piece_len += 1;
            if piece_len == max_chars {
                chunks.push(std::mem::take(&mut piece));
                piece_len = 0;
            }
        }
        current = piece;
        current_len = piece_len;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
