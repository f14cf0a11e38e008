/// Split text into alternating maximal runs of whitespace and non-whitespace.
///
/// Concatenating the returned slices yields the input exactly.
pub fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;

    for (index, ch) in text.char_indices() {
        let is_space = ch.is_whitespace();
        match in_space {
            Some(current) if current != is_space => {
                tokens.push(&text[start..index]);
                start = index;
            }
            _ => {}
        }
        in_space = Some(is_space);
    }

    if start < text.len() {
        tokens.push(&text[start..]);
    }

    tokens
}

/// True for tokens made only of whitespace
pub fn is_whitespace_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_whitespace)
}
