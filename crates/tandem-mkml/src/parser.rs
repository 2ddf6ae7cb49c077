use crate::ast::{Document, Import, Node, Prop, Value};
use crate::error::ParseError;
use crate::lexer::{Lexer, Spanned, Token};

/// Recursive-descent parser over a token stream ending in `Eof`.
pub struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Spanned>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn current(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos).or_else(|| self.tokens.last())
    }

    fn peek(&self) -> &Token {
        self.current().map(|s| &s.token).unwrap_or(&Token::Eof)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        self.tokens.get(self.pos + offset).map(|s| &s.token).unwrap_or(&Token::Eof)
    }

    fn line(&self) -> usize {
        self.current().map_or(1, |s| s.line)
    }

    fn error(&self, msg: impl Into<String>) -> ParseError {
        let (line, col) = self.current().map_or((1, 1), |s| (s.line, s.col));
        ParseError::new(msg, line, col)
    }

    fn next(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, want: &Token, what: &str) -> Result<(), ParseError> {
        if self.peek() == want {
            self.next();
            Ok(())
        } else {
            Err(self.error(format!("expected {what}, found {:?}", self.peek())))
        }
    }

    fn ident(&mut self, what: &str) -> Result<String, ParseError> {
        match self.peek() {
            Token::Ident(s) => {
                let s = s.clone();
                self.next();
                Ok(s)
            }
            other => Err(self.error(format!("expected {what}, found {other:?}"))),
        }
    }

    // ── document ──────────────────────────────────────────────────────────

    pub fn parse_document(&mut self) -> Result<Document, ParseError> {
        let mut imports = Vec::new();
        while self.peek() == &Token::Import {
            imports.push(self.import()?);
        }
        let root = self.node()?;
        if self.peek() != &Token::Eof {
            return Err(self.error("only one root element is allowed"));
        }
        Ok(Document { imports, root })
    }

    fn import(&mut self) -> Result<Import, ParseError> {
        self.next();
        let path = match self.next() {
            Token::Str(s) => s,
            other => return Err(self.error(format!("expected import path string, found {other:?}"))),
        };
        self.expect(&Token::As, "`as`")?;
        let alias = self.ident("import alias")?;
        Ok(Import { path, alias })
    }

    // ── nodes ─────────────────────────────────────────────────────────────

    fn node(&mut self) -> Result<Node, ParseError> {
        let line = self.line();
        let kind = self.ident("element name")?;

        let content = match self.peek() {
            Token::Str(s) => {
                let s = s.clone();
                self.next();
                Some(s)
            }
            _ => None,
        };

        let mut node = Node { kind, content, props: Vec::new(), children: Vec::new(), line };
        if self.peek() == &Token::LBrace {
            self.block(&mut node)?;
        }
        Ok(node)
    }

    /// `{ (prop | node)* }`; an identifier followed by `:` starts a property.
    fn block(&mut self, node: &mut Node) -> Result<(), ParseError> {
        self.next();
        loop {
            match self.peek() {
                Token::RBrace => {
                    self.next();
                    return Ok(());
                }
                Token::Eof => return Err(self.error(format!("unclosed block of `{}`", node.kind))),
                Token::Ident(_) if self.peek_at(1) == &Token::Colon => {
                    node.props.push(self.prop()?);
                }
                Token::Ident(_) => node.children.push(self.node()?),
                other => {
                    return Err(self.error(format!(
                        "expected a property or an element inside `{}`, found {other:?}",
                        node.kind
                    )));
                }
            }
        }
    }

    fn prop(&mut self) -> Result<Prop, ParseError> {
        let line = self.line();
        let key = self.ident("property name")?;
        self.next();
        let value = match self.peek().clone() {
            Token::Str(s) => Value::Str(s),
            Token::Number(n) => Value::Number(n),
            Token::Color(c) => Value::Color(c),
            Token::True => Value::Bool(true),
            Token::False => Value::Bool(false),
            Token::Ident(s) => Value::Ident(s),
            other => {
                return Err(self.error(format!("expected a value for `{key}`, found {other:?}")));
            }
        };
        self.next();
        Ok(Prop { key, value, line })
    }
}

/// Parses a `.mkml` source string.
pub fn parse_str(src: &str) -> Result<Document, ParseError> {
    let tokens = Lexer::new(src).tokenize()?;
    Parser::new(tokens).parse_document()
}
