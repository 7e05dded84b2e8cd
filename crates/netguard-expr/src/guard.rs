//! Static checks run on the raw expression text before it is parsed.

use crate::ExprError;
use crate::lexer::{Tok, lex};

/// Names that never occur in device configuration, matched case-insensitively as substrings
/// of the raw text (string literals included, so `node['constructor']` is caught too).
pub const DENYLIST: &[&str] = &[
    "__proto__",
    "__define",
    "__lookup",
    "child_process",
    "constructor",
    "prototype",
    "globalthis",
    "settimeout",
    "setinterval",
    "setimmediate",
    "xmlhttprequest",
    "websocket",
];

/// Identifiers denied wherever they appear as a token, whatever whitespace surrounds them.
///
/// These are ordinary network vocabulary (`import-route`, `ip proxy-arp`, `set global-`), so
/// string and regex literals are not searched for them.
pub const DENIED_IDENTIFIERS: &[&str] = &[
    "arguments",
    "async",
    "await",
    "class",
    "delete",
    "document",
    "eval",
    "fetch",
    "function",
    "global",
    "import",
    "new",
    "process",
    "proxy",
    "reflect",
    "require",
    "this",
    "window",
    "with",
    "yield",
];

/// Length bound, denylist, interpolation and denied identifiers, in that order.
pub(crate) fn check(src: &str, max_len: usize) -> Result<(), ExprError> {
    let len = src.chars().count();
    if len > max_len {
        return Err(ExprError::TooLong { len, max: max_len });
    }

    let lowered = src.to_lowercase();
    if let Some(word) = DENYLIST.iter().find(|w| lowered.contains(*w)) {
        return Err(ExprError::Denied(word.to_string()));
    }

    if src.contains("${") || src.contains('`') {
        return Err(ExprError::Interpolation);
    }

    // Text that does not lex is rejected by the parser.
    if let Ok(tokens) = lex(src)
        && let Some(word) = tokens.iter().find_map(|t| denied_identifier(&t.tok))
    {
        return Err(ExprError::Denied(word.to_string()));
    }
    Ok(())
}

fn denied_identifier(tok: &Tok) -> Option<&'static str> {
    let Tok::Ident(name) = tok else {
        return None;
    };
    DENIED_IDENTIFIERS
        .iter()
        .copied()
        .find(|denied| denied.eq_ignore_ascii_case(name))
}
