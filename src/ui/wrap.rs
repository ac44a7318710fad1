const TAB_SIZE: usize = 8;

/// Expands tabs to the next multiple-of-8 column and replaces other
/// control characters with a space, so one char is one terminal cell.
pub fn display_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut column = 0;
    for ch in line.chars() {
        if ch == '\t' {
            let pad = TAB_SIZE - column % TAB_SIZE;
            out.extend(std::iter::repeat(' ').take(pad));
            column += pad;
        } else {
            out.push(if ch.is_control() { ' ' } else { ch });
            column += 1;
        }
    }
    out
}

/// Wraps body text into display lines of at most `width` characters.
///
/// Paragraph breaks become empty lines and an empty body yields one empty
/// line. Whitespace at a wrap point is dropped, whitespace inside a line is
/// kept. A word longer than `width` gets a line of its own and overflows.
pub fn wrap_body(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let paragraph = display_line(paragraph);
        if paragraph.trim().is_empty() {
            lines.push(String::new());
        } else {
            wrap_paragraph(&paragraph, width, &mut lines);
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn wrap_paragraph(paragraph: &str, width: usize, out: &mut Vec<String>) {
    let mut line = String::new();
    let mut line_len = 0;
    let mut first_line = true;

    for chunk in chunks(paragraph) {
        let chunk_len = chunk.chars().count();
        let is_space = chunk.starts_with(char::is_whitespace);

        if is_space && line_len == 0 && !first_line {
            continue;
        }
        if line_len + chunk_len <= width {
            line.push_str(chunk);
            line_len += chunk_len;
            continue;
        }
        if is_space {
            finish_line(&mut line, &mut line_len, out);
            first_line = false;
            continue;
        }
        if line_len > 0 {
            finish_line(&mut line, &mut line_len, out);
            first_line = false;
        }
        if chunk_len > width {
            out.push(chunk.to_string());
            first_line = false;
        } else {
            line.push_str(chunk);
            line_len = chunk_len;
        }
    }
    if line_len > 0 {
        finish_line(&mut line, &mut line_len, out);
    }
}

fn finish_line(line: &mut String, line_len: &mut usize, out: &mut Vec<String>) {
    let trimmed = line.trim_end();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
    line.clear();
    *line_len = 0;
}

/// Splits into alternating runs of whitespace and non-whitespace.
fn chunks(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;
    for (idx, ch) in text.char_indices() {
        let space = ch.is_whitespace();
        match in_space {
            Some(prev) if prev != space => {
                out.push(&text[start..idx]);
                start = idx;
            }
            _ => {}
        }
        in_space = Some(space);
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}
