//! Tokenizes one SoR line into `<...>`-delimited fields.
//!
//! A `"` toggles a quoted span during which `<`/`>` are ordinary characters.
//! Outside quotes, any non-whitespace character seen before the first `<` —
//! or a second unclosed `<` — aborts the whole line: it returns no tokens
//! rather than a partial set. Only literal space characters are trimmed
//! from a captured field; other whitespace is kept.

pub fn parse_tokens(line: &str, size_hint: usize) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    let mut tokens = Vec::with_capacity(size_hint);

    let mut last_open: Option<usize> = None;
    let mut in_quotes = false;

    for (i, &c) in chars.iter().enumerate() {
        if c == '"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }

        match last_open {
            None => {
                if c == '<' {
                    last_open = Some(i);
                } else if !c.is_whitespace() {
                    return Vec::new();
                }
            }
            Some(open) => {
                if c == '<' {
                    return Vec::new();
                }
                if c == '>' {
                    tokens.push(strip_spaces(&chars, open + 1, i));
                    last_open = None;
                }
            }
        }
    }

    tokens
}

/// Trims leading/trailing literal `' '` characters from `chars[start..end]`.
fn strip_spaces(chars: &[char], start: usize, end: usize) -> String {
    let mut s = start;
    let mut e = end;
    while s < e && chars[s] == ' ' {
        s += 1;
    }
    while e > s && chars[e - 1] == ' ' {
        e -= 1;
    }
    chars[s..e].iter().collect()
}
