use crate::lines::{LogicalLine, QuoteState};
use crate::schema::{BlockStyle, KeywordBlock, SchemaDescriptor};
use netguard_model::{ConfigNode, NodeKind, text};
use netguard_types::SourceLoc;

/// Deeper blocks are flattened into their enclosing block.
pub(crate) const MAX_NESTING: usize = 256;

struct Frame {
    node: ConfigNode,
    indent: usize,
    /// Opener keyword for keyword-delimited blocks.
    opener: Option<String>,
}

/// Stack of open blocks. A closed frame is attached to the frame below it, or to the forest.
pub(crate) struct TreeBuilder<'s> {
    schema: &'s SchemaDescriptor,
    forest: Vec<ConfigNode>,
    stack: Vec<Frame>,
}

impl<'s> TreeBuilder<'s> {
    pub fn new(schema: &'s SchemaDescriptor) -> Self {
        Self {
            schema,
            forest: Vec::new(),
            stack: Vec::new(),
        }
    }

    pub fn push(&mut self, line: &LogicalLine) {
        match &self.schema.style {
            BlockStyle::Indent => self.indent_line(line),
            BlockStyle::Braces => self.brace_line(line),
            BlockStyle::Keywords { blocks } => self.keyword_line(line, blocks),
            BlockStyle::Sections { header_prefix } => self.section_line(line, header_prefix),
        }
    }

    pub fn finish(mut self) -> Vec<ConfigNode> {
        self.close_until(0);
        self.forest
    }

    fn indent_line(&mut self, line: &LogicalLine) {
        if !line.verbatim && self.is_terminator(&line.text) {
            return;
        }
        while self.stack.last().is_some_and(|top| top.indent >= line.indent) {
            self.close_top();
        }
        let node = self.node(&line.text, &line.raw, loc(line, line.col), NodeKind::Command);
        self.open(node, line.indent, None);
    }

    fn brace_line(&mut self, line: &LogicalLine) {
        if line.verbatim {
            let node = self.node(&line.text, &line.raw, loc(line, line.col), NodeKind::Command);
            self.attach(node);
            return;
        }

        let text = line.text.as_str();
        let mut quote = QuoteState::default();
        let mut start: Option<usize> = None;

        for (i, c) in text.char_indices() {
            if !quote.step(c, self.schema) {
                start.get_or_insert(i);
                continue;
            }
            match c {
                '{' => {
                    let from = start.take().unwrap_or(i);
                    let raw = raw_slice(line, from, i + 1);
                    let node_loc = loc(line, column(line, from));
                    let node = self.node(&text[from..i], &raw, node_loc, NodeKind::Section);
                    self.open(node, 0, None);
                }
                '}' => {
                    if let Some(s) = start.take() {
                        self.brace_leaf(line, s, i);
                    }
                    self.close_top();
                }
                ';' => {
                    if let Some(s) = start.take() {
                        self.brace_leaf(line, s, i + 1);
                    }
                }
                c if c.is_whitespace() => {}
                _ => {
                    start.get_or_insert(i);
                }
            }
        }
        if let Some(s) = start {
            self.brace_leaf(line, s, text.len());
        }
    }

    /// Leaf statement spanning `text[start..end]` (`end` may include a trailing `;`).
    fn brace_leaf(&mut self, line: &LogicalLine, start: usize, end: usize) {
        let slice = &line.text[start..end];
        let id_text = slice.strip_suffix(';').unwrap_or(slice);
        if self.is_terminator(id_text.trim()) {
            return;
        }
        let raw = raw_slice(line, start, end);
        let col = column(line, start);
        let node = self.node(id_text, raw.trim_end(), loc(line, col), NodeKind::Command);
        self.attach(node);
    }

    fn keyword_line(&mut self, line: &LogicalLine, blocks: &[KeywordBlock]) {
        let id = text::normalize_whitespace(&line.text, &self.schema.quotes, self.schema.escape);
        let node_loc = loc(line, line.col);

        if line.verbatim {
            let node = self.node(&line.text, &line.raw, node_loc, NodeKind::Command);
            self.attach(node);
            return;
        }

        if blocks.iter().any(|b| b.close.eq_ignore_ascii_case(&id)) {
            let target = self.stack.iter().rposition(|frame| {
                frame.opener.as_deref().is_some_and(|opener| {
                    blocks.iter().any(|b| {
                        b.open.eq_ignore_ascii_case(opener) && b.close.eq_ignore_ascii_case(&id)
                    })
                })
            });
            if let Some(pos) = target {
                self.close_until(pos);
            }
            return;
        }
        if self.is_terminator(&id) {
            return;
        }

        let first = id.split(' ').next().unwrap_or_default();
        match blocks.iter().find(|b| b.open.eq_ignore_ascii_case(first)) {
            Some(block) => {
                let opener = block.open.clone();
                let node = self.node(&id, &line.raw, node_loc, NodeKind::Section);
                self.open(node, line.indent, Some(opener));
            }
            None => {
                let node = self.node(&id, &line.raw, node_loc, NodeKind::Command);
                self.attach(node);
            }
        }
    }

    fn section_line(&mut self, line: &LogicalLine, header_prefix: &str) {
        let trimmed = line.text.trim();
        let node_loc = loc(line, line.col);
        if !line.verbatim && !header_prefix.is_empty() && trimmed.starts_with(header_prefix) {
            self.close_until(0);
            let node = self.node(trimmed, &line.raw, node_loc, NodeKind::Section);
            self.open(node, 0, None);
            return;
        }
        if !line.verbatim && self.is_terminator(trimmed) {
            return;
        }
        let node = self.node(trimmed, &line.raw, node_loc, NodeKind::Command);
        self.attach(node);
    }

    fn node(&self, text_in: &str, raw: &str, loc: SourceLoc, kind: NodeKind) -> ConfigNode {
        let id = text::normalize_whitespace(text_in, &self.schema.quotes, self.schema.escape);
        let params = text::tokenize(&id, &self.schema.quotes, self.schema.escape);
        ConfigNode {
            id,
            raw_text: raw.to_string(),
            kind,
            params,
            children: Vec::new(),
            loc,
            depth: self.stack.len(),
            vendor: Some(self.schema.vendor.clone()),
        }
    }

    fn is_terminator(&self, text_in: &str) -> bool {
        !self.schema.terminators.is_empty()
            && self.schema.is_terminator(&text::normalize_whitespace(
                text_in,
                &self.schema.quotes,
                self.schema.escape,
            ))
    }

    fn attach(&mut self, node: ConfigNode) {
        match self.stack.last_mut() {
            Some(top) => top.node.children.push(node),
            None => self.forest.push(node),
        }
    }

    fn open(&mut self, node: ConfigNode, indent: usize, opener: Option<String>) {
        if self.stack.len() >= MAX_NESTING {
            self.attach(node);
            return;
        }
        self.stack.push(Frame {
            node,
            indent,
            opener,
        });
    }

    /// Returns `false` when nothing was open (an unmatched closer).
    fn close_top(&mut self) -> bool {
        let Some(mut frame) = self.stack.pop() else {
            return false;
        };
        if !frame.node.children.is_empty() {
            frame.node.kind = NodeKind::Section;
        }
        self.attach(frame.node);
        true
    }

    fn close_until(&mut self, len: usize) {
        while self.stack.len() > len && self.close_top() {}
    }
}

fn loc(line: &LogicalLine, col: u32) -> SourceLoc {
    SourceLoc::new(line.line, col).with_offset(line.offset)
}

/// Column (1-based, in chars) of byte `idx` of the logical line's text.
fn column(line: &LogicalLine, idx: usize) -> u32 {
    let chars = line.text.get(..idx).map_or(0, |s| s.chars().count());
    u32::try_from(chars + 1).unwrap_or(u32::MAX)
}

/// Source text for `text[start..end]`, taken from `raw` when both share byte positions.
fn raw_slice(line: &LogicalLine, start: usize, end: usize) -> String {
    if line.aligned
        && let Some(raw) = line.raw.get(start..end)
    {
        return raw.to_string();
    }
    line.text[start..end].to_string()
}
