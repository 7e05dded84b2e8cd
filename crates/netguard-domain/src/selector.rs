use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use netguard_expr::{ExprError, compile_regex};
use netguard_model::text;
use regex::Regex;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Flags accepted after the closing `/` of a regex selector.
const REGEX_FLAGS: &str = "imsxUgu";

#[derive(Debug, Error)]
pub enum SelectorError {
    #[error("invalid selector regex: {0}")]
    Regex(#[from] ExprError),

    #[error("invalid vendor pattern `{pattern}`: {source}")]
    Vendor {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// Which node ids a rule applies to.
#[derive(Clone, Debug, Default)]
pub enum Selector {
    /// `*` or empty: every node.
    #[default]
    All,
    /// Case-insensitive, whitespace-normalized prefix of the node id.
    Prefix { text: String, folded: String },
    /// `/pattern/flags` matched anywhere in the node id.
    Regex { source: String, regex: Arc<Regex> },
}

impl Selector {
    pub fn prefix(text: &str) -> Self {
        let folded = text::fold_key(text);
        if folded.is_empty() {
            return Selector::All;
        }
        Selector::Prefix {
            text: text.trim().to_string(),
            folded,
        }
    }

    /// Parse selector text: `*`/empty, `/pattern/flags`, or a plain prefix.
    ///
    /// A leading `/` only starts a regex when the text also ends in `/` plus known flags, so
    /// MikroTik-style paths such as `/ip address` stay prefixes.
    pub fn parse(text: &str) -> Result<Self, SelectorError> {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed == "*" {
            return Ok(Selector::All);
        }
        if let Some((pattern, flags)) = split_regex(trimmed) {
            let regex = compile_regex(pattern, flags)?;
            return Ok(Selector::Regex {
                source: trimmed.to_string(),
                regex: Arc::new(regex),
            });
        }
        Ok(Selector::prefix(trimmed))
    }

    pub fn matches(&self, id: &str) -> bool {
        match self {
            Selector::All => true,
            Selector::Prefix { folded, .. } => text::starts_with_folded(id, folded),
            Selector::Regex { regex, .. } => regex.is_match(id),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Selector::All => "*",
            Selector::Prefix { text, .. } => text,
            Selector::Regex { source, .. } => source,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn split_regex(text: &str) -> Option<(&str, &str)> {
    let body = text.strip_prefix('/')?;
    let close = body.rfind('/')?;
    let (pattern, flags) = (&body[..close], &body[close + 1..]);
    let known = flags.chars().all(|c| REGEX_FLAGS.contains(c));
    (!pattern.is_empty() && known).then_some((pattern, flags))
}

/// Vendor ids a rule applies to. Glob patterns, matched case-insensitively.
#[derive(Clone, Debug)]
pub struct VendorFilter {
    patterns: Vec<String>,
    set: GlobSet,
}

impl VendorFilter {
    pub fn new<I, S>(patterns: I) -> Result<Self, SelectorError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GlobSetBuilder::new();
        let mut kept = Vec::new();
        for pattern in patterns {
            let pattern = pattern.as_ref().trim();
            let glob = GlobBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|source| SelectorError::Vendor {
                    pattern: pattern.to_string(),
                    source,
                })?;
            builder.add(glob);
            kept.push(pattern.to_string());
        }
        let set = builder.build().map_err(|source| SelectorError::Vendor {
            pattern: kept.join(","),
            source,
        })?;
        Ok(Self {
            patterns: kept,
            set,
        })
    }

    /// An empty filter matches every vendor.
    pub fn matches(&self, vendor: &str) -> bool {
        self.patterns.is_empty() || self.set.is_match(vendor)
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}
