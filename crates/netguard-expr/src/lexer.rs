use crate::ExprError;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Tok {
    Num(f64),
    Str(String),
    Regex { pattern: String, flags: String },
    Ident(String),
    True,
    False,
    Null,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Question,
    Colon,
    OrOr,
    AndAnd,
    EqEq,
    NotEq,
    Match,
    NotMatch,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Eof,
}

impl Tok {
    /// Whether the token can end an operand; a `/` after one is division, otherwise a regex.
    fn ends_value(&self) -> bool {
        matches!(
            self,
            Tok::Num(_)
                | Tok::Str(_)
                | Tok::Regex { .. }
                | Tok::Ident(_)
                | Tok::True
                | Tok::False
                | Tok::Null
                | Tok::RParen
                | Tok::RBracket
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Token {
    pub tok: Tok,
    /// Char offset in the source.
    pub pos: usize,
}

pub(crate) fn lex(src: &str) -> Result<Vec<Token>, ExprError> {
    Lexer {
        chars: src.chars().collect(),
        pos: 0,
        out: Vec::new(),
    }
    .run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    out: Vec<Token>,
}

impl Lexer {
    fn run(mut self) -> Result<Vec<Token>, ExprError> {
        while let Some(c) = self.peek(0) {
            let start = self.pos;
            if c.is_whitespace() {
                self.pos += 1;
                continue;
            }
            let tok = match c {
                '0'..='9' => self.number()?,
                '\'' | '"' => self.string(c)?,
                c if c.is_alphabetic() || c == '_' || c == '$' => self.word(),
                '/' if !self.after_value() => self.regex()?,
                _ => self.operator(c)?,
            };
            self.out.push(Token { tok, pos: start });
        }
        self.out.push(Token {
            tok: Tok::Eof,
            pos: self.pos,
        });
        Ok(self.out)
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn after_value(&self) -> bool {
        self.out.last().is_some_and(|t| t.tok.ends_value())
    }

    fn error(&self, message: impl Into<String>) -> ExprError {
        ExprError::Syntax {
            pos: self.pos,
            message: message.into(),
        }
    }

    fn number(&mut self) -> Result<Tok, ExprError> {
        let start = self.pos;
        while self.peek(0).is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.peek(0) == Some('.') && self.peek(1).is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
            while self.peek(0).is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<f64>()
            .map(Tok::Num)
            .map_err(|_| self.error(format!("invalid number `{text}`")))
    }

    fn string(&mut self, quote: char) -> Result<Tok, ExprError> {
        self.pos += 1;
        let mut out = String::new();
        loop {
            let Some(c) = self.peek(0) else {
                return Err(self.error("unterminated string"));
            };
            self.pos += 1;
            match c {
                c if c == quote => return Ok(Tok::Str(out)),
                '\\' => {
                    let Some(escaped) = self.peek(0) else {
                        return Err(self.error("unterminated string"));
                    };
                    self.pos += 1;
                    out.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '0' => '\0',
                        other => other,
                    });
                }
                c => out.push(c),
            }
        }
    }

    fn word(&mut self) -> Tok {
        let start = self.pos;
        while self
            .peek(0)
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$')
        {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.as_str() {
            "true" => Tok::True,
            "false" => Tok::False,
            "null" | "undefined" => Tok::Null,
            _ => Tok::Ident(word),
        }
    }

    /// `/pattern/flags`; `/` inside a character class does not terminate the pattern.
    fn regex(&mut self) -> Result<Tok, ExprError> {
        self.pos += 1;
        let mut pattern = String::new();
        let mut in_class = false;
        loop {
            let Some(c) = self.peek(0) else {
                return Err(self.error("unterminated regex literal"));
            };
            self.pos += 1;
            match c {
                '\\' => {
                    pattern.push(c);
                    if let Some(next) = self.peek(0) {
                        pattern.push(next);
                        self.pos += 1;
                    }
                }
                '[' => {
                    in_class = true;
                    pattern.push(c);
                }
                ']' => {
                    in_class = false;
                    pattern.push(c);
                }
                '/' if !in_class => break,
                '\n' => return Err(self.error("newline in regex literal")),
                c => pattern.push(c),
            }
        }
        let mut flags = String::new();
        while let Some(c) = self.peek(0).filter(char::is_ascii_alphabetic) {
            flags.push(c);
            self.pos += 1;
        }
        Ok(Tok::Regex { pattern, flags })
    }

    fn operator(&mut self, c: char) -> Result<Tok, ExprError> {
        let next = self.peek(1);
        let (tok, width) = match (c, next) {
            ('(', _) => (Tok::LParen, 1),
            (')', _) => (Tok::RParen, 1),
            ('[', _) => (Tok::LBracket, 1),
            (']', _) => (Tok::RBracket, 1),
            (',', _) => (Tok::Comma, 1),
            ('.', _) => (Tok::Dot, 1),
            ('?', _) => (Tok::Question, 1),
            (':', _) => (Tok::Colon, 1),
            ('|', Some('|')) => (Tok::OrOr, 2),
            ('&', Some('&')) => (Tok::AndAnd, 2),
            ('=', Some('=')) => (Tok::EqEq, self.strict_width()),
            ('=', Some('~')) => (Tok::Match, 2),
            ('=', Some('>')) => return Err(ExprError::Assignment("=>".to_string())),
            ('=', _) => return Err(ExprError::Assignment("=".to_string())),
            ('!', Some('=')) => (Tok::NotEq, self.strict_width()),
            ('!', Some('~')) => (Tok::NotMatch, 2),
            ('!', _) => (Tok::Bang, 1),
            ('<', Some('<')) | ('>', Some('>')) => {
                if self.peek(2) == Some('=') {
                    return Err(ExprError::Assignment(format!("{c}{c}=")));
                }
                return Err(self.error(format!("unsupported operator `{c}{c}`")));
            }
            ('<', Some('=')) => (Tok::Le, 2),
            ('<', _) => (Tok::Lt, 1),
            ('>', Some('=')) => (Tok::Ge, 2),
            ('>', _) => (Tok::Gt, 1),
            ('+', Some('+')) => return Err(ExprError::Assignment("++".to_string())),
            ('-', Some('-')) => return Err(ExprError::Assignment("--".to_string())),
            ('+' | '-' | '*' | '/' | '%' | '&' | '|' | '^', Some('=')) => {
                return Err(ExprError::Assignment(format!("{c}=")));
            }
            ('+', _) => (Tok::Plus, 1),
            ('-', _) => (Tok::Minus, 1),
            ('*', _) => (Tok::Star, 1),
            ('/', _) => (Tok::Slash, 1),
            ('%', _) => (Tok::Percent, 1),
            _ => return Err(self.error(format!("unexpected character `{c}`"))),
        };
        self.pos += width;
        Ok(tok)
    }

    /// `==`/`!=` optionally followed by a third `=`.
    fn strict_width(&self) -> usize {
        if self.peek(2) == Some('=') { 3 } else { 2 }
    }
}
