use crate::error::ParseError;

// ── Token ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Str(String),
    Number(f32),
    Color([u8; 4]),
    True,
    False,
    Colon,
    LBrace,
    RBrace,
    Import,
    As,
    Eof,
}

/// A token and the 1-based position of its first character.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub line: usize,
    pub col: usize,
}

// ── Lexer ─────────────────────────────────────────────────────────────────

pub struct Lexer<'s> {
    chars: std::iter::Peekable<std::str::Chars<'s>>,
    line: usize,
    col: usize,
}

impl<'s> Lexer<'s> {
    pub fn new(src: &'s str) -> Self {
        Self { chars: src.chars().peekable(), line: 1, col: 1 }
    }

    /// Lexes the whole input. The last token is always `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Spanned>, ParseError> {
        let mut out = Vec::new();
        loop {
            self.skip_trivia()?;
            let (line, col) = (self.line, self.col);
            let token = self.next_token()?;
            let done = token == Token::Eof;
            out.push(Spanned { token, line, col });
            if done {
                return Ok(out);
            }
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn error(&self, msg: impl Into<String>) -> ParseError {
        ParseError::new(msg, self.line, self.col)
    }

    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') => {
                    let mut ahead = self.chars.clone();
                    ahead.next();
                    match ahead.next() {
                        Some('/') => {
                            while !matches!(self.peek(), None | Some('\n')) {
                                self.bump();
                            }
                        }
                        Some('*') => self.skip_block_comment()?,
                        _ => return Ok(()),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), ParseError> {
        let (line, col) = (self.line, self.col);
        self.bump();
        self.bump();
        let mut prev = '\0';
        while let Some(c) = self.bump() {
            if prev == '*' && c == '/' {
                return Ok(());
            }
            prev = c;
        }
        Err(ParseError::new("unterminated block comment", line, col))
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        let Some(c) = self.peek() else {
            return Ok(Token::Eof);
        };
        match c {
            ':' => self.single(Token::Colon),
            '{' => self.single(Token::LBrace),
            '}' => self.single(Token::RBrace),
            '"' => self.string(),
            '#' => self.color(),
            c if c.is_ascii_digit() || c == '-' || c == '.' => self.number(),
            c if c.is_alphabetic() || c == '_' => Ok(self.word()),
            other => Err(self.error(format!("unexpected character {other:?}"))),
        }
    }

    fn single(&mut self, token: Token) -> Result<Token, ParseError> {
        self.bump();
        Ok(token)
    }

    fn string(&mut self) -> Result<Token, ParseError> {
        let (line, col) = (self.line, self.col);
        self.bump();
        let mut s = String::new();
        loop {
            match self.bump() {
                None => return Err(ParseError::new("unterminated string literal", line, col)),
                Some('"') => return Ok(Token::Str(s)),
                Some('\\') => match self.bump() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some(c) => s.push(c),
                    None => return Err(self.error("unterminated escape sequence")),
                },
                Some(c) => s.push(c),
            }
        }
    }

    fn color(&mut self) -> Result<Token, ParseError> {
        self.bump();
        let mut digits = Vec::with_capacity(8);
        while let Some(d) = self.peek().and_then(|c| c.to_digit(16)) {
            self.bump();
            digits.push(d as u8);
        }
        if digits.len() != 6 && digits.len() != 8 {
            return Err(self.error(format!(
                "color literal must be #rrggbb or #rrggbbaa, got {} hex digits",
                digits.len()
            )));
        }
        let mut rgba = [255u8; 4];
        for (slot, pair) in rgba.iter_mut().zip(digits.chunks(2)) {
            *slot = pair[0] << 4 | pair[1];
        }
        Ok(Token::Color(rgba))
    }

    fn number(&mut self) -> Result<Token, ParseError> {
        let mut s = String::new();
        if self.peek() == Some('-') {
            s.push('-');
            self.bump();
        }
        while let Some(c) = self.peek().filter(|c| c.is_ascii_digit() || *c == '.') {
            s.push(c);
            self.bump();
        }
        s.parse::<f32>()
            .map(Token::Number)
            .map_err(|_| self.error(format!("invalid number {s:?}")))
    }

    fn word(&mut self) -> Token {
        let mut s = String::new();
        while let Some(c) = self.peek().filter(|c| c.is_alphanumeric() || *c == '_') {
            s.push(c);
            self.bump();
        }
        match s.as_str() {
            "import" => Token::Import,
            "as" => Token::As,
            "true" => Token::True,
            "false" => Token::False,
            _ => Token::Ident(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Token> {
        Lexer::new(src)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn positions_track_lines() {
        let toks = Lexer::new("Text\n  \"hi\"").tokenize().unwrap();
        assert_eq!((toks[0].line, toks[0].col), (1, 1));
        assert_eq!((toks[1].line, toks[1].col), (2, 3));
    }

    #[test]
    fn colors_expand_alpha() {
        assert_eq!(kinds("#336680")[0], Token::Color([0x33, 0x66, 0x80, 0xff]));
        assert_eq!(kinds("#33668000")[0], Token::Color([0x33, 0x66, 0x80, 0x00]));
    }

    #[test]
    fn keywords_and_numbers() {
        assert_eq!(
            kinds("import as true false -1.5 x_1"),
            vec![
                Token::Import,
                Token::As,
                Token::True,
                Token::False,
                Token::Number(-1.5),
                Token::Ident("x_1".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(kinds("// a\n/* b */ {"), vec![Token::LBrace, Token::Eof]);
    }

    #[test]
    fn unterminated_comment_reports_start() {
        let err = Lexer::new("\n  /* open").tokenize().unwrap_err();
        assert_eq!((err.line, err.col), (2, 3));
    }

    #[test]
    fn bad_number_is_an_error() {
        assert!(Lexer::new("1.2.3").tokenize().is_err());
    }
}
