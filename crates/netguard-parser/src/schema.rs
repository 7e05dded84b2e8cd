use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How a dialect expresses block nesting.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockStyle {
    /// Depth follows leading whitespace; blocks close implicitly on dedent.
    #[default]
    Indent,
    /// `{` opens a block, `}` closes it, `;` ends a statement.
    Braces,
    /// Opener keywords push a block, their matching closer pops it (`edit` ... `next`).
    Keywords { blocks: Vec<KeywordBlock> },
    /// Header lines (e.g. `/ip address`) own every following line until the next header.
    Sections { header_prefix: String },
}

impl BlockStyle {
    /// The serialized `kind` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            BlockStyle::Indent => "indent",
            BlockStyle::Braces => "braces",
            BlockStyle::Keywords { .. } => "keywords",
            BlockStyle::Sections { .. } => "sections",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct KeywordBlock {
    /// First token of a line that opens the block.
    pub open: String,
    /// Whole line that closes the nearest open block started by `open`.
    pub close: String,
}

impl KeywordBlock {
    pub fn new(open: &str, close: &str) -> Self {
        Self {
            open: open.to_string(),
            close: close.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BlockComment {
    pub open: String,
    pub close: String,
}

/// Data describing one dialect's nesting, comment and quoting conventions.
///
/// One parser implementation is parameterized by this value; see [`crate::presets`] for the
/// shipped dialects. Custom dialects can be supplied as TOML/JSON.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SchemaDescriptor {
    /// Vendor id stamped on every parsed node.
    pub vendor: String,

    #[serde(default)]
    pub style: BlockStyle,

    /// A line whose first non-blank characters match one of these is a comment.
    #[serde(default)]
    pub comment_prefixes: Vec<String>,

    /// Whether a comment prefix after content (preceded by whitespace, outside quotes)
    /// ends the line.
    #[serde(default)]
    pub inline_comments: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_comment: Option<BlockComment>,

    #[serde(default = "default_quotes")]
    pub quotes: Vec<char>,

    /// Escape character inside quotes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escape: Option<char>,

    /// Whether a quote left open at the end of a line continues onto the next line
    /// (certificates and scripts embedded in quoted values).
    #[serde(default)]
    pub multiline_quotes: bool,

    /// Trailing marker joining a line with the next one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuation: Option<String>,

    /// Whole lines that close blocks or end the file and never become nodes.
    #[serde(default)]
    pub terminators: Vec<String>,

    /// Commands introducing a delimited multi-line text block (`banner motd ^C ... ^C`).
    #[serde(default)]
    pub banners: Vec<String>,

    #[serde(default = "default_tab_width")]
    pub tab_width: usize,
}

fn default_quotes() -> Vec<char> {
    vec!['"']
}

fn default_tab_width() -> usize {
    8
}

impl SchemaDescriptor {
    /// A bare indentation dialect with double quotes and no comments.
    pub fn new(vendor: &str, style: BlockStyle) -> Self {
        Self {
            vendor: vendor.to_string(),
            style,
            comment_prefixes: Vec::new(),
            inline_comments: false,
            block_comment: None,
            quotes: default_quotes(),
            escape: None,
            multiline_quotes: false,
            continuation: None,
            terminators: Vec::new(),
            banners: Vec::new(),
            tab_width: default_tab_width(),
        }
    }

    pub fn with_comments(mut self, prefixes: &[&str]) -> Self {
        self.comment_prefixes = prefixes.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_inline_comments(mut self) -> Self {
        self.inline_comments = true;
        self
    }

    pub fn with_block_comment(mut self, open: &str, close: &str) -> Self {
        self.block_comment = Some(BlockComment {
            open: open.to_string(),
            close: close.to_string(),
        });
        self
    }

    pub fn with_quotes(mut self, quotes: &[char]) -> Self {
        self.quotes = quotes.to_vec();
        self
    }

    pub fn with_escape(mut self, escape: char) -> Self {
        self.escape = Some(escape);
        self
    }

    pub fn with_multiline_quotes(mut self) -> Self {
        self.multiline_quotes = true;
        self
    }

    pub fn with_continuation(mut self, marker: &str) -> Self {
        self.continuation = Some(marker.to_string());
        self
    }

    pub fn with_terminators(mut self, terminators: &[&str]) -> Self {
        self.terminators = terminators.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_banners(mut self, banners: &[&str]) -> Self {
        self.banners = banners.iter().map(|s| s.to_string()).collect();
        self
    }

    /// `line` must already be trimmed.
    pub fn is_comment(&self, line: &str) -> bool {
        self.comment_prefixes
            .iter()
            .any(|p| !p.is_empty() && line.starts_with(p.as_str()))
    }

    /// `line` must already be normalized.
    pub fn is_terminator(&self, line: &str) -> bool {
        self.terminators.iter().any(|t| t.eq_ignore_ascii_case(line))
    }

    pub fn is_quote(&self, c: char) -> bool {
        self.quotes.contains(&c)
    }
}
