//! Physical lines to logical lines.
//!
//! Everything that is about characters rather than nesting happens here: block comments,
//! comment lines, inline comments, continuation markers, quotes spanning lines and banners.

use crate::schema::{BlockComment, SchemaDescriptor};

/// One logical statement line, before nesting is decided.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LogicalLine {
    /// Structural text: block comments blanked, inline comment cut, continuations joined.
    pub text: String,
    /// Physical source line(s), joined with `\n`.
    pub raw: String,
    pub line: u32,
    pub col: u32,
    pub offset: u32,
    /// Leading whitespace width with tabs expanded.
    pub indent: usize,
    /// `text` is a byte-for-byte prefix-compatible view of `raw`.
    pub aligned: bool,
    /// Banner body; never split structurally.
    pub verbatim: bool,
}

/// Quote tracking shared by every scanner in the parser.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct QuoteState {
    open: Option<char>,
    escaped: bool,
}

impl QuoteState {
    /// Feed one character. Returns `true` when `c` is structural (outside any quote);
    /// quote characters themselves are not structural.
    pub fn step(&mut self, c: char, schema: &SchemaDescriptor) -> bool {
        if let Some(q) = self.open {
            if self.escaped {
                self.escaped = false;
            } else if Some(c) == schema.escape {
                self.escaped = true;
            } else if c == q {
                self.open = None;
            }
            return false;
        }
        if schema.is_quote(c) {
            self.open = Some(c);
            return false;
        }
        true
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }
}

enum BannerEnd {
    Delimiter(String),
    EofLine,
}

struct Banner {
    line: LogicalLine,
    end: BannerEnd,
}

struct Splitter<'s> {
    schema: &'s SchemaDescriptor,
    out: Vec<LogicalLine>,
    in_block_comment: bool,
    pending: Option<LogicalLine>,
    banner: Option<Banner>,
}

/// Split `text` into logical lines according to `schema`. Never fails.
pub(crate) fn split(text: &str, schema: &SchemaDescriptor) -> Vec<LogicalLine> {
    let (body, mut offset) = match text.strip_prefix('\u{feff}') {
        Some(rest) => (rest, '\u{feff}'.len_utf8()),
        None => (text, 0),
    };

    let mut splitter = Splitter {
        schema,
        out: Vec::new(),
        in_block_comment: false,
        pending: None,
        banner: None,
    };

    for (idx, chunk) in body.split_inclusive('\n').enumerate() {
        let content = chunk.strip_suffix('\n').unwrap_or(chunk);
        let content = content.strip_suffix('\r').unwrap_or(content);
        splitter.physical(content, to_u32(idx + 1), to_u32(offset));
        offset += chunk.len();
    }
    splitter.finish()
}

impl Splitter<'_> {
    fn physical(&mut self, content: &str, line_no: u32, offset: u32) {
        if let Some(mut banner) = self.banner.take() {
            banner.line.raw.push('\n');
            banner.line.raw.push_str(content);
            banner.line.text.push('\n');
            banner.line.text.push_str(content);
            let closed = match &banner.end {
                BannerEnd::Delimiter(d) => content.contains(d.as_str()),
                BannerEnd::EofLine => content.trim() == "EOF",
            };
            if closed {
                self.out.push(banner.line);
            } else {
                self.banner = Some(banner);
            }
            return;
        }

        let cleaned = match &self.schema.block_comment {
            Some(bc) if !bc.open.is_empty() && !bc.close.is_empty() => {
                blank_block_comments(content, bc, &mut self.in_block_comment, self.schema)
            }
            _ => content.to_string(),
        };

        if let Some(mut pending) = self.pending.take() {
            pending.raw.push('\n');
            pending.raw.push_str(content);
            if open_quote_at_end(&pending.text, self.schema) {
                pending.text.push('\n');
                pending.text.push_str(&cleaned);
            } else {
                pending.text.push(' ');
                pending.text.push_str(cleaned.trim_start());
            }
            pending.aligned = false;
            self.tail(pending, false);
            return;
        }

        let trimmed = cleaned.trim_start();
        if trimmed.trim_end().is_empty() || self.schema.is_comment(trimmed) {
            return;
        }

        let (indent, lead_chars) = indent_width(&cleaned, self.schema.tab_width);
        let line = LogicalLine {
            raw: content.to_string(),
            line: line_no,
            col: to_u32(lead_chars + 1),
            offset,
            indent,
            aligned: true,
            verbatim: false,
            text: cleaned,
        };
        self.tail(line, true);
    }

    /// End-of-line decisions for a fresh or freshly joined logical line.
    fn tail(&mut self, mut line: LogicalLine, fresh: bool) {
        if self.schema.inline_comments
            && let Some(cut) = find_inline_comment(&line.text, self.schema)
        {
            line.text.truncate(cut);
        }

        if self.schema.multiline_quotes && open_quote_at_end(&line.text, self.schema) {
            self.pending = Some(line);
            return;
        }

        if let Some(marker) = self.schema.continuation.as_deref()
            && let Some(cut) = continuation_at(&line.text, marker, self.schema)
        {
            line.text.truncate(cut);
            let kept = line.text.trim_end().len();
            line.text.truncate(kept);
            line.aligned = false;
            self.pending = Some(line);
            return;
        }

        if fresh && let Some(end) = self.banner_start(&line.text) {
            line.verbatim = true;
            match end {
                Some(end) => self.banner = Some(Banner { line, end }),
                None => self.out.push(line),
            }
            return;
        }

        if !line.text.trim().is_empty() {
            self.out.push(line);
        }
    }

    /// `Some(None)` for a banner that closes on its own line, `Some(Some(end))` for one that
    /// continues until `end`.
    fn banner_start(&self, text: &str) -> Option<Option<BannerEnd>> {
        if self.schema.banners.is_empty() {
            return None;
        }
        let spans = token_spans(text);
        let (s0, e0) = *spans.first()?;
        let head = &text[s0..e0];
        if !self.schema.banners.iter().any(|b| b.eq_ignore_ascii_case(head)) {
            return None;
        }
        spans.get(1)?;

        let Some(&(s2, e2)) = spans.get(2) else {
            return Some(Some(BannerEnd::EofLine));
        };
        let token = &text[s2..e2];
        let delimiter = if token.starts_with("^C") {
            "^C".to_string()
        } else {
            token.chars().next()?.to_string()
        };
        let body = &text[s2 + delimiter.len()..];
        if body.contains(delimiter.as_str()) {
            Some(None)
        } else {
            Some(Some(BannerEnd::Delimiter(delimiter)))
        }
    }

    fn finish(mut self) -> Vec<LogicalLine> {
        if let Some(banner) = self.banner.take() {
            self.out.push(banner.line);
        }
        if let Some(pending) = self.pending.take()
            && !pending.text.trim().is_empty()
        {
            self.out.push(pending);
        }
        self.out
    }
}

/// Replace block-comment bytes with spaces so byte positions stay aligned with the source.
fn blank_block_comments(
    line: &str,
    bc: &BlockComment,
    in_comment: &mut bool,
    schema: &SchemaDescriptor,
) -> String {
    let mut out = String::with_capacity(line.len());
    let mut quote = QuoteState::default();
    let mut i = 0;

    while i < line.len() {
        let rest = &line[i..];
        if *in_comment {
            if rest.starts_with(bc.close.as_str()) {
                push_spaces(&mut out, bc.close.len());
                i += bc.close.len();
                *in_comment = false;
                continue;
            }
            let Some(c) = rest.chars().next() else { break };
            push_spaces(&mut out, c.len_utf8());
            i += c.len_utf8();
            continue;
        }
        if !quote.is_open() && rest.starts_with(bc.open.as_str()) {
            push_spaces(&mut out, bc.open.len());
            i += bc.open.len();
            *in_comment = true;
            continue;
        }
        let Some(c) = rest.chars().next() else { break };
        quote.step(c, schema);
        out.push(c);
        i += c.len_utf8();
    }
    out
}

fn push_spaces(out: &mut String, n: usize) {
    out.extend(std::iter::repeat_n(' ', n));
}

/// Byte index where an inline comment starts: a comment prefix outside quotes, at the start of
/// the text or preceded by whitespace.
fn find_inline_comment(text: &str, schema: &SchemaDescriptor) -> Option<usize> {
    let mut quote = QuoteState::default();
    let mut prev_ws = true;
    for (i, c) in text.char_indices() {
        let structural = quote.step(c, schema);
        if structural
            && prev_ws
            && schema
                .comment_prefixes
                .iter()
                .any(|p| !p.is_empty() && text[i..].starts_with(p.as_str()))
        {
            return Some(i);
        }
        prev_ws = c.is_whitespace();
    }
    None
}

fn open_quote_at_end(text: &str, schema: &SchemaDescriptor) -> bool {
    let mut quote = QuoteState::default();
    for c in text.chars() {
        quote.step(c, schema);
    }
    quote.is_open()
}

/// Byte index of a trailing continuation marker that sits outside quotes.
fn continuation_at(text: &str, marker: &str, schema: &SchemaDescriptor) -> Option<usize> {
    if marker.is_empty() {
        return None;
    }
    let trimmed = text.trim_end();
    let cut = trimmed.strip_suffix(marker).map(str::len)?;
    if open_quote_at_end(&trimmed[..cut], schema) {
        return None;
    }
    Some(cut)
}

/// Width of leading whitespace (tabs to the next multiple of `tab_width`) and its char count.
fn indent_width(text: &str, tab_width: usize) -> (usize, usize) {
    let tab = tab_width.max(1);
    let mut width = 0;
    let mut chars = 0;
    for c in text.chars() {
        match c {
            '\t' => width += tab - (width % tab),
            c if c.is_whitespace() => width += 1,
            _ => break,
        }
        chars += 1;
    }
    (width, chars)
}

fn token_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                spans.push((s, i));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push((s, text.len()));
    }
    spans
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets;
    use crate::schema::BlockStyle;

    fn texts(lines: &[LogicalLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.trim()).collect()
    }

    fn preset(name: &str) -> SchemaDescriptor {
        presets::lookup(name).expect("preset")
    }

    #[test]
    fn drops_blank_and_comment_lines_and_keeps_positions() {
        let src = "!\nhostname r1\n\n! section\ninterface Gi0/1\n  shutdown\n";
        let lines = split(src, &preset("cisco-ios"));
        assert_eq!(texts(&lines), vec!["hostname r1", "interface Gi0/1", "shutdown"]);

        let shutdown = &lines[2];
        assert_eq!(shutdown.line, 6);
        assert_eq!(shutdown.col, 3);
        assert_eq!(shutdown.indent, 2);
        assert_eq!(shutdown.offset as usize, src.find("  shutdown").expect("offset"));
        assert_eq!(shutdown.raw, "  shutdown");
    }

    #[test]
    fn tabs_expand_to_tab_width() {
        let schema = SchemaDescriptor::new("t", BlockStyle::Indent);
        let lines = split("a\n\tb\n \tc\n", &schema);
        assert_eq!(lines[1].indent, 8);
        assert_eq!(lines[2].indent, 8);
        assert_eq!(lines[2].col, 3);
    }

    #[test]
    fn crlf_and_bom_are_tolerated() {
        let schema = SchemaDescriptor::new("t", BlockStyle::Indent);
        let lines = split("\u{feff}a\r\n b\r\n", &schema);
        assert_eq!(texts(&lines), vec!["a", "b"]);
        assert_eq!(lines[0].offset, 3);
        assert_eq!(lines[0].raw, "a");
    }

    #[test]
    fn block_comments_are_blanked_outside_quotes() {
        let src = "/* header\n spans */ system {\n  host-name \"a /* not */ b\";\n}\n";
        let lines = split(src, &preset("juniper-junos"));
        assert_eq!(
            texts(&lines),
            vec!["system {", "host-name \"a /* not */ b\";", "}"]
        );
        assert_eq!(lines[0].line, 2);
        assert!(lines[0].aligned);
        assert_eq!(lines[0].text.len(), lines[0].raw.len());
    }

    #[test]
    fn inline_comments_respect_quotes() {
        let src = "address 10.0.0.1/24; # mgmt\ndescription \"uplink # 1\";\n";
        let lines = split(src, &preset("juniper-junos"));
        assert_eq!(
            texts(&lines),
            vec!["address 10.0.0.1/24;", "description \"uplink # 1\";"]
        );
    }

    #[test]
    fn continuation_lines_join_with_raw_preserved() {
        let src = "/ip firewall filter\nadd chain=input \\\n    action=drop\n";
        let lines = split(src, &preset("mikrotik-routeros"));
        assert_eq!(texts(&lines), vec!["/ip firewall filter", "add chain=input action=drop"]);
        assert_eq!(lines[1].raw, "add chain=input \\\n    action=drop");
        assert_eq!(lines[1].line, 2);
        assert!(!lines[1].aligned);
    }

    #[test]
    fn continuation_marker_inside_open_quote_is_text() {
        let src = "add comment=\"trailing \\\nnext\n";
        let lines = split(src, &preset("mikrotik-routeros"));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].text, "next");
    }

    #[test]
    fn multiline_quotes_join_until_closed() {
        let src = "set certificate \"-----BEGIN\nabc\n-----END\"\nset x 1\n";
        let lines = split(src, &preset("fortios"));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].raw, "set certificate \"-----BEGIN\nabc\n-----END\"");
        assert_eq!(lines[1].line, 4);
    }

    #[test]
    fn cisco_banner_is_one_verbatim_line() {
        let src = "banner motd ^C\nAuthorized access only\n! not a comment here\n^C\nhostname r1\n";
        let lines = split(src, &preset("cisco-ios"));
        assert_eq!(lines.len(), 2);
        assert!(lines[0].verbatim);
        assert_eq!(
            lines[0].raw,
            "banner motd ^C\nAuthorized access only\n! not a comment here\n^C"
        );
        assert_eq!(lines[1].text, "hostname r1");
        assert_eq!(lines[1].line, 5);
    }

    #[test]
    fn single_line_and_eof_banners() {
        let src = "banner login #Keep out#\nbanner motd\nhello\nEOF\nhostname x\n";
        let lines = split(src, &preset("arista-eos"));
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].raw, "banner login #Keep out#");
        assert_eq!(lines[1].raw, "banner motd\nhello\nEOF");
        assert_eq!(lines[2].text, "hostname x");
    }

    #[test]
    fn unterminated_banner_captures_rest_of_input() {
        let lines = split("banner exec %\nno end\n", &preset("cisco-ios"));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].raw, "banner exec %\nno end");
    }
}
