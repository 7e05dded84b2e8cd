use crate::ExprError;
use regex::{Regex, RegexBuilder};

/// Compiled program size cap for user-supplied patterns.
const SIZE_LIMIT: usize = 1 << 20;

/// Compile a `/pattern/flags` regex.
///
/// Supported flags: `i` (case-insensitive), `m` (multi-line), `s` (dot matches newline),
/// `x` (ignore whitespace), `U` (swap greed). `g` and `u` are accepted and ignored; any other
/// flag is an error.
pub fn compile_regex(pattern: &str, flags: &str) -> Result<Regex, ExprError> {
    let mut builder = RegexBuilder::new(pattern);
    builder.size_limit(SIZE_LIMIT).dfa_size_limit(SIZE_LIMIT);
    for flag in flags.chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            'U' => builder.swap_greed(true),
            'g' | 'u' => &mut builder,
            other => {
                return Err(ExprError::InvalidRegex {
                    pattern: pattern.to_string(),
                    message: format!("unsupported flag `{other}`"),
                });
            }
        };
    }
    builder.build().map_err(|err| ExprError::InvalidRegex {
        pattern: pattern.to_string(),
        message: err.to_string(),
    })
}
