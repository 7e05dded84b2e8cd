//! Text helpers shared by the parser (building ids and params) and by selectors.

/// Trim and collapse runs of whitespace outside quotes to a single space.
///
/// Text inside quotes is kept verbatim; inside quotes the `escape` character makes the next
/// character literal, the same way [`tokenize`] reads it.
pub fn normalize_whitespace(s: &str, quotes: &[char], escape: Option<char>) -> String {
    let mut out = String::with_capacity(s.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut pending_space = false;

    for c in s.trim().chars() {
        if let Some(q) = quote {
            out.push(c);
            if escaped {
                escaped = false;
            } else if Some(c) == escape {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        if quotes.contains(&c) {
            quote = Some(c);
        }
        out.push(c);
    }
    out
}

/// Split into whitespace-separated tokens, honoring quotes.
///
/// Quote characters are removed from the token; inside quotes the `escape` character makes
/// the next character literal. An unterminated quote extends to the end of the input.
pub fn tokenize(s: &str, quotes: &[char], escape: Option<char>) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                if Some(c) == escape {
                    current.push(chars.next().unwrap_or(c));
                } else if c == q {
                    quote = None;
                } else {
                    current.push(c);
                }
            }
            None if c.is_whitespace() => {
                if in_token {
                    out.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                in_token = true;
                if quotes.contains(&c) {
                    quote = Some(c);
                } else {
                    current.push(c);
                }
            }
        }
    }
    if in_token {
        out.push(current);
    }
    out
}

/// Lowercase and collapse whitespace: the form selectors are compared in.
pub fn fold_key(s: &str) -> String {
    normalize_whitespace(s, &[], None).to_lowercase()
}

/// Prefix test against a key already produced by [`fold_key`].
pub fn starts_with_folded(haystack: &str, folded_prefix: &str) -> bool {
    let mut hay = haystack.chars().flat_map(char::to_lowercase);
    folded_prefix.chars().all(|p| hay.next() == Some(p))
}

/// Case-insensitive, whitespace-normalized prefix test.
pub fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    starts_with_folded(haystack, &fold_key(prefix))
}
