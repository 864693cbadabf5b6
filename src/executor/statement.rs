//! Parser for the statement subset the in-memory store understands
//!
//! ```text
//! SELECT projection FROM keyspace.table
//!     [WHERE condition (AND condition)*]
//!     [LIMIT n] [ALLOW FILTERING] [;]
//!
//! projection := '*' | COUNT '(' '*' ')' | column (',' column)*
//! condition  := column ('=' | '!=' | '>' | '<' | '>=' | '<=' | LIKE) literal
//! literal    := '-'? digits ('.' digits)? | 'text with '' doubled'
//! ```
//!
//! Unquoted identifiers fold to lowercase; double-quoted ones keep case.

/// Lexical token
#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// Bare word: keyword or unquoted identifier, original case
    Word(String),
    /// Double-quoted identifier, unescaped
    QuotedIdent(String),
    /// Single-quoted string literal, unescaped
    Str(String),
    /// Numeric literal, raw text
    Number(String),
    Symbol(&'static str),
}

/// What the statement selects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    All,
    Count,
    Columns(Vec<String>),
}

/// Comparison in a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    Like,
}

/// Literal on the right-hand side of a condition
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Raw text and parsed value
    Number(String, f64),
    Text(String),
}

impl Literal {
    /// The literal as the user originally typed it
    pub fn raw(&self) -> &str {
        match self {
            Literal::Number(raw, _) => raw,
            Literal::Text(text) => text,
        }
    }
}

/// `column op literal`
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub comparison: Comparison,
    pub literal: Literal,
}

/// Parsed SELECT statement
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub projection: Projection,
    pub keyspace: String,
    pub table: String,
    pub conditions: Vec<Condition>,
    pub limit: Option<u64>,
    pub allow_filtering: bool,
}

/// Parse a full SELECT statement
pub fn parse_select(text: &str) -> Result<SelectStatement, String> {
    let mut parser = Parser::new(tokenize(text)?);
    let statement = parser.select()?;
    parser.finish()?;
    Ok(statement)
}

/// Parse a single `column op literal` fragment
pub fn parse_condition(text: &str) -> Result<Condition, String> {
    let mut parser = Parser::new(tokenize(text)?);
    let condition = parser.condition()?;
    parser.finish()?;
    Ok(condition)
}

fn tokenize(text: &str) -> Result<Vec<Token>, String> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c == '\'' || c == '"' {
            let (content, next) = read_quoted(&chars, i, c)?;
            tokens.push(if c == '\'' {
                Token::Str(content)
            } else {
                Token::QuotedIdent(content)
            });
            i = next;
            continue;
        }

        let starts_number = c.is_ascii_digit()
            || (c == '-' && chars.get(i + 1).map_or(false, |n| n.is_ascii_digit()));
        if starts_number {
            let start = i;
            i += 1;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            if i + 1 < chars.len() && chars[i] == '.' && chars[i + 1].is_ascii_digit() {
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
            }
            tokens.push(Token::Number(chars[start..i].iter().collect()));
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push(Token::Word(chars[start..i].iter().collect()));
            continue;
        }

        let two: String = chars[i..(i + 2).min(chars.len())].iter().collect();
        let symbol = match two.as_str() {
            "!=" => Some("!="),
            ">=" => Some(">="),
            "<=" => Some("<="),
            _ => None,
        };
        if let Some(symbol) = symbol {
            tokens.push(Token::Symbol(symbol));
            i += 2;
            continue;
        }

        let symbol = match c {
            '*' => "*",
            ',' => ",",
            '.' => ".",
            '(' => "(",
            ')' => ")",
            '=' => "=",
            '>' => ">",
            '<' => "<",
            ';' => ";",
            other => return Err(format!("unexpected character '{}'", other)),
        };
        tokens.push(Token::Symbol(symbol));
        i += 1;
    }

    Ok(tokens)
}

/// Read a quoted run starting at `start`; a doubled quote is an escaped quote.
fn read_quoted(chars: &[char], start: usize, quote: char) -> Result<(String, usize), String> {
    let mut content = String::new();
    let mut i = start + 1;

    while i < chars.len() {
        if chars[i] == quote {
            if chars.get(i + 1) == Some(&quote) {
                content.push(quote);
                i += 2;
                continue;
            }
            return Ok((content, i + 1));
        }
        content.push(chars[i]);
        i += 1;
    }

    Err(format!("unterminated {} quote", quote))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        match self.peek() {
            Some(Token::Word(word)) if word.eq_ignore_ascii_case(keyword) => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), String> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(format!("expected {}", keyword))
        }
    }

    fn eat_symbol(&mut self, symbol: &str) -> bool {
        match self.peek() {
            Some(Token::Symbol(s)) if *s == symbol => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn expect_symbol(&mut self, symbol: &str) -> Result<(), String> {
        if self.eat_symbol(symbol) {
            Ok(())
        } else {
            Err(format!("expected '{}'", symbol))
        }
    }

    fn identifier(&mut self) -> Result<String, String> {
        match self.next() {
            Some(Token::Word(word)) => Ok(word.to_lowercase()),
            Some(Token::QuotedIdent(name)) => Ok(name),
            other => Err(format!("expected identifier, found {:?}", other)),
        }
    }

    fn select(&mut self) -> Result<SelectStatement, String> {
        self.expect_keyword("SELECT")?;
        let projection = self.projection()?;
        self.expect_keyword("FROM")?;

        let first = self.identifier()?;
        if !self.eat_symbol(".") {
            return Err(format!("table '{}' must be qualified with a keyspace", first));
        }
        let table = self.identifier()?;

        let mut conditions = Vec::new();
        if self.eat_keyword("WHERE") {
            conditions.push(self.condition()?);
            while self.eat_keyword("AND") {
                conditions.push(self.condition()?);
            }
        }

        let mut limit = None;
        if self.eat_keyword("LIMIT") {
            match self.next() {
                Some(Token::Number(raw)) => {
                    let n: u64 = raw
                        .parse()
                        .map_err(|_| format!("invalid LIMIT '{}'", raw))?;
                    if n == 0 {
                        return Err("LIMIT must be strictly positive".to_string());
                    }
                    limit = Some(n);
                }
                other => return Err(format!("expected LIMIT value, found {:?}", other)),
            }
        }

        let allow_filtering = if self.eat_keyword("ALLOW") {
            self.expect_keyword("FILTERING")?;
            true
        } else {
            false
        };

        Ok(SelectStatement {
            projection,
            keyspace: first,
            table,
            conditions,
            limit,
            allow_filtering,
        })
    }

    fn projection(&mut self) -> Result<Projection, String> {
        if self.eat_symbol("*") {
            return Ok(Projection::All);
        }

        let is_count = matches!(
            (self.tokens.get(self.pos), self.tokens.get(self.pos + 1)),
            (Some(Token::Word(w)), Some(Token::Symbol("("))) if w.eq_ignore_ascii_case("COUNT")
        );
        if is_count {
            self.pos += 2;
            self.expect_symbol("*")?;
            self.expect_symbol(")")?;
            return Ok(Projection::Count);
        }

        let mut columns = vec![self.identifier()?];
        while self.eat_symbol(",") {
            columns.push(self.identifier()?);
        }
        Ok(Projection::Columns(columns))
    }

    fn condition(&mut self) -> Result<Condition, String> {
        let column = self.identifier()?;

        let comparison = match self.next() {
            Some(Token::Symbol("=")) => Comparison::Eq,
            Some(Token::Symbol("!=")) => Comparison::Ne,
            Some(Token::Symbol(">")) => Comparison::Gt,
            Some(Token::Symbol("<")) => Comparison::Lt,
            Some(Token::Symbol(">=")) => Comparison::Ge,
            Some(Token::Symbol("<=")) => Comparison::Le,
            Some(Token::Word(w)) if w.eq_ignore_ascii_case("LIKE") => Comparison::Like,
            other => return Err(format!("expected comparison, found {:?}", other)),
        };

        let literal = match self.next() {
            Some(Token::Str(text)) => Literal::Text(text),
            Some(Token::Number(raw)) => {
                let value: f64 = raw
                    .parse()
                    .map_err(|_| format!("invalid number '{}'", raw))?;
                Literal::Number(raw, value)
            }
            other => return Err(format!("expected literal, found {:?}", other)),
        };

        if comparison == Comparison::Like && !matches!(literal, Literal::Text(_)) {
            return Err("LIKE requires a string pattern".to_string());
        }

        Ok(Condition {
            column,
            comparison,
            literal,
        })
    }

    fn finish(&mut self) -> Result<(), String> {
        self.eat_symbol(";");
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(format!("unexpected trailing input {:?}", token)),
        }
    }
}
