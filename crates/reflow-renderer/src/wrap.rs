//! Greedy soft wrapping for plain-text paragraphs.

/// Wrap `text` so no line exceeds `max_line_length` bytes.
///
/// Breaks only replace spaces, and a run of spaces at a break is dropped as a
/// whole; a word longer than the limit is kept whole on its own line. Existing
/// newlines start a new line. A limit of zero or less disables wrapping.
/// Wrapping already wrapped text at the same limit returns it unchanged.
///
/// # Examples
///
/// ```
/// use reflow_renderer::wrap;
///
/// assert_eq!(wrap("aaaa bbbb cccc", 6), "aaaa\nbbbb\ncccc");
/// assert_eq!(wrap("aaaa bbbb cccc", 0), "aaaa bbbb cccc");
/// ```
pub fn wrap(text: &str, max_line_length: i64) -> String {
    let max = match usize::try_from(max_line_length) {
        Ok(0) | Err(_) => return text.to_owned(),
        Ok(max) => max,
    };

    let mut wrapped = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            wrapped.push('\n');
        }

        let mut line_len = 0;
        // Spaces seen since the last word; a run of them is one break point.
        let mut spaces = 0;
        for (j, word) in line.split(' ').enumerate() {
            if j > 0 {
                spaces += 1;
            }
            if word.is_empty() {
                continue;
            }

            if line_len > 0 && line_len + spaces + word.len() > max {
                wrapped.push('\n');
                line_len = 0;
            } else {
                push_spaces(&mut wrapped, spaces);
                line_len += spaces;
            }
            spaces = 0;

            wrapped.push_str(word);
            line_len += word.len();
        }

        if line_len + spaces <= max {
            push_spaces(&mut wrapped, spaces);
        }
    }
    wrapped
}

fn push_spaces(text: &mut String, count: usize) {
    text.extend(std::iter::repeat_n(' ', count));
}
