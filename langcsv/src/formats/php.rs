//! Support for PHP array translation files (`lang/en/auth.php`).
//!
//! Loading understands the literal subset of PHP that translation files are
//! written in: a `return` of a (possibly nested) array of strings, numbers,
//! booleans and nulls, with comments and string concatenation. Anything that
//! needs a PHP runtime to evaluate (function calls, constants, variables) is
//! reported as a parse error with its line number.
//!
//! Writing produces the canonical layout:
//!
//! ```php
//! <?php
//!
//! return [
//!     'failed' => 'These credentials do not match our records.',
//!     'nested' => [
//!         'key' => 'Value',
//!     ],
//! ];
//! ```

use std::io::{BufRead, Write};

use crate::{
    error::Error,
    traits::Parser,
    tree::MAX_DEPTH,
    types::{LeafValue, Node, TranslationTree},
};

/// One nesting level of emitted arrays.
const INDENT: &str = "    ";

/// A PHP translation file holding one array.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Format {
    pub tree: TranslationTree,
}

impl Format {
    pub fn new(tree: TranslationTree) -> Self {
        Self { tree }
    }
}

impl Parser for Format {
    fn from_reader<R: BufRead>(mut reader: R) -> Result<Self, Error> {
        let mut content = String::new();
        reader.read_to_string(&mut content).map_err(Error::Io)?;
        Ok(Format {
            tree: parse(&content)?,
        })
    }

    fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        writer
            .write_all(render(&self.tree).as_bytes())
            .map_err(Error::Io)
    }
}

/// Parses the source of a PHP translation file into a tree.
///
/// Returns [`Error::NotAMapping`] when the file returns something other than an
/// array, and [`Error::PhpParse`] for syntax the loader does not evaluate.
pub fn parse(source: &str) -> Result<TranslationTree, Error> {
    PhpParser::new(source).parse_file()
}

/// Renders a tree as a PHP file returning a short-syntax array.
pub fn render(tree: &TranslationTree) -> String {
    let mut out = String::from("<?php\n\nreturn ");
    render_array(tree, 0, &mut out);
    out.push_str(";\n");
    out
}

fn render_array(tree: &TranslationTree, depth: usize, out: &mut String) {
    out.push_str("[\n");
    let padding = INDENT.repeat(depth + 1);
    for (key, node) in tree {
        out.push_str(&padding);
        out.push_str(&quote(key));
        out.push_str(" => ");
        match node {
            Node::Branch(child) => render_array(child, depth + 1, out),
            Node::Leaf(value) => out.push_str(&render_leaf(value)),
        }
        out.push_str(",\n");
    }
    out.push_str(&INDENT.repeat(depth));
    out.push(']');
}

fn render_leaf(value: &LeafValue) -> String {
    match value {
        LeafValue::String(s) => quote(s),
        LeafValue::Number(n) => n.clone(),
        LeafValue::Null => "NULL".to_string(),
        LeafValue::Unsupported(raw) => raw.clone(),
    }
}

/// Single-quoted PHP string literal, as `var_export` writes it.
fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Intermediate value of a PHP literal expression.
#[derive(Debug, Clone, PartialEq)]
enum PhpValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
    Array(TranslationTree),
}

impl From<PhpValue> for Node {
    fn from(value: PhpValue) -> Self {
        match value {
            PhpValue::Str(s) => Node::Leaf(LeafValue::String(s)),
            PhpValue::Int(i) => Node::Leaf(LeafValue::Number(i.to_string())),
            PhpValue::Float(f) => Node::Leaf(LeafValue::Number(f.to_string())),
            PhpValue::Bool(b) => Node::Leaf(LeafValue::Unsupported(b.to_string())),
            PhpValue::Null => Node::Leaf(LeafValue::Null),
            PhpValue::Array(tree) => Node::Branch(tree),
        }
    }
}

struct PhpParser<'a> {
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    /// Terms currently being parsed, one per array level, parenthesis or sign.
    depth: usize,
}

impl<'a> PhpParser<'a> {
    fn new(source: &'a str) -> Self {
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        Self {
            bytes: source.as_bytes(),
            pos: 0,
            line: 1,
            depth: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::PhpParse {
            line: self.line,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        if byte == b'\n' {
            self.line += 1;
        }
        Some(byte)
    }

    fn starts_with(&self, token: &str) -> bool {
        self.bytes[self.pos..].starts_with(token.as_bytes())
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), Error> {
        if self.eat(byte) {
            Ok(())
        } else {
            Err(self.error(format!("expected `{}`", byte as char)))
        }
    }

    /// Consumes `keyword` (case-insensitive) when it is not the prefix of a
    /// longer identifier.
    fn eat_keyword(&mut self, keyword: &str) -> bool {
        let end = self.pos + keyword.len();
        let matches = self
            .bytes
            .get(self.pos..end)
            .is_some_and(|slice| slice.eq_ignore_ascii_case(keyword.as_bytes()))
            && !self.bytes.get(end).copied().is_some_and(is_ident_char);
        if matches {
            self.pos = end;
        }
        matches
    }

    fn read_while(&mut self, predicate: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&predicate) {
            self.bump();
        }
        // Only ASCII bytes are matched by the predicates used here.
        std::str::from_utf8(&self.bytes[start..self.pos]).unwrap_or_default()
    }

    fn skip_trivia(&mut self) -> Result<(), Error> {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(b), _) if b.is_ascii_whitespace() => {
                    self.bump();
                }
                (Some(b'#'), _) | (Some(b'/'), Some(b'/')) => {
                    while self.peek().is_some_and(|b| b != b'\n') {
                        self.bump();
                    }
                }
                (Some(b'/'), Some(b'*')) => {
                    let line = self.line;
                    self.pos += 2;
                    loop {
                        if self.starts_with("*/") {
                            self.pos += 2;
                            break;
                        }
                        if self.bump().is_none() {
                            return Err(Error::PhpParse {
                                line,
                                message: "unterminated comment".to_string(),
                            });
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn parse_file(&mut self) -> Result<TranslationTree, Error> {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.bump();
        }
        if !self.eat_keyword("<?php") {
            return Err(self.error("expected `<?php` open tag"));
        }

        loop {
            self.skip_trivia()?;
            if self.peek().is_none() {
                return Err(Error::NotAMapping);
            }
            if self.eat_keyword("return") {
                let value = self.parse_expr()?;
                self.skip_trivia()?;
                if !(self.eat(b';') || self.starts_with("?>") || self.peek().is_none()) {
                    return Err(self.error("expected `;` after the returned value"));
                }
                return match value {
                    PhpValue::Array(tree) => Ok(tree),
                    _ => Err(Error::NotAMapping),
                };
            }
            if self.eat_keyword("declare")
                || self.eat_keyword("namespace")
                || self.eat_keyword("use")
            {
                self.skip_statement()?;
                continue;
            }
            let word = self.read_while(is_ident_char);
            return Err(self.error(format!("unsupported statement `{}`", word)));
        }
    }

    fn skip_statement(&mut self) -> Result<(), Error> {
        let line = self.line;
        loop {
            match self.bump() {
                Some(b';') => return Ok(()),
                Some(_) => {}
                None => {
                    return Err(Error::PhpParse {
                        line,
                        message: "unterminated statement".to_string(),
                    });
                }
            }
        }
    }

    fn parse_expr(&mut self) -> Result<PhpValue, Error> {
        let mut value = self.parse_term()?;
        loop {
            self.skip_trivia()?;
            let is_concat = self.peek() == Some(b'.')
                && !matches!(self.peek_at(1), Some(b'.') | Some(b'='));
            if !is_concat {
                return Ok(value);
            }
            self.bump();
            let rhs = self.parse_term()?;
            let mut text = self.concat_operand(value)?;
            text.push_str(&self.concat_operand(rhs)?);
            value = PhpValue::Str(text);
        }
    }

    fn concat_operand(&self, value: PhpValue) -> Result<String, Error> {
        match value {
            PhpValue::Str(s) => Ok(s),
            PhpValue::Int(i) => Ok(i.to_string()),
            PhpValue::Float(f) => Ok(f.to_string()),
            PhpValue::Bool(true) => Ok("1".to_string()),
            PhpValue::Bool(false) | PhpValue::Null => Ok(String::new()),
            PhpValue::Array(_) => Err(self.error("cannot concatenate an array")),
        }
    }

    fn parse_term(&mut self) -> Result<PhpValue, Error> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error(format!("nesting deeper than {} levels", MAX_DEPTH)));
        }
        self.depth += 1;
        let value = self.parse_operand();
        self.depth -= 1;
        value
    }

    fn parse_operand(&mut self) -> Result<PhpValue, Error> {
        self.skip_trivia()?;
        match self.peek() {
            None => Err(self.error("unexpected end of file")),
            Some(b'[') => {
                self.bump();
                self.parse_array_body(b']')
            }
            Some(b'\'') => self.parse_single_quoted().map(PhpValue::Str),
            Some(b'"') => self.parse_double_quoted().map(PhpValue::Str),
            Some(b'(') => {
                self.bump();
                let value = self.parse_expr()?;
                self.skip_trivia()?;
                self.expect(b')')?;
                Ok(value)
            }
            Some(sign @ (b'-' | b'+')) => {
                self.bump();
                match (sign, self.parse_term()?) {
                    (b'+', value @ (PhpValue::Int(_) | PhpValue::Float(_))) => Ok(value),
                    (_, PhpValue::Int(i)) => Ok(i
                        .checked_neg()
                        .map(PhpValue::Int)
                        .unwrap_or(PhpValue::Float(-(i as f64)))),
                    (_, PhpValue::Float(f)) => Ok(PhpValue::Float(-f)),
                    _ => Err(self.error("unary sign on a non-numeric value")),
                }
            }
            Some(b) if b.is_ascii_digit() => self.parse_number(),
            Some(b'.') if self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) => {
                self.parse_number()
            }
            Some(b) if is_ident_start(b) => {
                let ident = self.read_while(is_ident_char);
                match ident.to_ascii_lowercase().as_str() {
                    "true" => Ok(PhpValue::Bool(true)),
                    "false" => Ok(PhpValue::Bool(false)),
                    "null" => Ok(PhpValue::Null),
                    "array" => {
                        self.skip_trivia()?;
                        self.expect(b'(')?;
                        self.parse_array_body(b')')
                    }
                    _ => Err(self.error(format!("unsupported expression `{}`", ident))),
                }
            }
            Some(b) => Err(self.error(format!("unexpected character `{}`", b as char))),
        }
    }

    fn parse_array_body(&mut self, close: u8) -> Result<PhpValue, Error> {
        let mut tree = TranslationTree::new();
        let mut next_index: i64 = 0;
        loop {
            self.skip_trivia()?;
            if self.eat(close) {
                return Ok(PhpValue::Array(tree));
            }

            let first = self.parse_expr()?;
            self.skip_trivia()?;
            let (key, value) = if self.starts_with("=>") {
                self.pos += 2;
                let value = self.parse_expr()?;
                (self.array_key(first)?, value)
            } else {
                (next_index.to_string(), first)
            };

            if let Some(index) = integer_key(&key)
                && index >= next_index
            {
                next_index = index.saturating_add(1);
            }
            tree.insert(key, Node::from(value));

            self.skip_trivia()?;
            if self.eat(b',') {
                continue;
            }
            if self.eat(close) {
                return Ok(PhpValue::Array(tree));
            }
            return Err(self.error(format!("expected `,` or `{}` in array", close as char)));
        }
    }

    /// Casts a key expression the way PHP does for array keys.
    fn array_key(&self, key: PhpValue) -> Result<String, Error> {
        match key {
            PhpValue::Str(s) => Ok(s),
            PhpValue::Int(i) => Ok(i.to_string()),
            PhpValue::Float(f) => Ok((f.trunc() as i64).to_string()),
            PhpValue::Bool(b) => Ok(i64::from(b).to_string()),
            PhpValue::Null => Ok(String::new()),
            PhpValue::Array(_) => Err(self.error("illegal array key")),
        }
    }

    fn parse_single_quoted(&mut self) -> Result<String, Error> {
        let line = self.line;
        self.bump();
        let mut buf = Vec::new();
        loop {
            match self.bump() {
                None => {
                    return Err(Error::PhpParse {
                        line,
                        message: "unterminated string".to_string(),
                    });
                }
                Some(b'\'') => break,
                Some(b'\\') if matches!(self.peek(), Some(b'\'') | Some(b'\\')) => {
                    if let Some(escaped) = self.bump() {
                        buf.push(escaped);
                    }
                }
                Some(b) => buf.push(b),
            }
        }
        String::from_utf8(buf).map_err(|_| self.error("string literal is not valid UTF-8"))
    }

    fn parse_double_quoted(&mut self) -> Result<String, Error> {
        let line = self.line;
        self.bump();
        let mut buf = Vec::new();
        loop {
            let Some(byte) = self.bump() else {
                return Err(Error::PhpParse {
                    line,
                    message: "unterminated string".to_string(),
                });
            };
            match byte {
                b'"' => break,
                b'$' if self
                    .peek()
                    .is_some_and(|b| b.is_ascii_alphabetic() || b == b'_' || b == b'{') =>
                {
                    return Err(self.error("variable interpolation is not supported"));
                }
                b'\\' => self.parse_escape(&mut buf)?,
                b => buf.push(b),
            }
        }
        String::from_utf8(buf).map_err(|_| self.error("string literal is not valid UTF-8"))
    }

    /// Decodes the escape sequence after a backslash in a double-quoted string.
    fn parse_escape(&mut self, buf: &mut Vec<u8>) -> Result<(), Error> {
        let simple = match self.peek() {
            Some(b'n') => Some(b'\n'),
            Some(b't') => Some(b'\t'),
            Some(b'r') => Some(b'\r'),
            Some(b'v') => Some(0x0b),
            Some(b'e') => Some(0x1b),
            Some(b'f') => Some(0x0c),
            Some(b'\\') => Some(b'\\'),
            Some(b'$') => Some(b'$'),
            Some(b'"') => Some(b'"'),
            _ => None,
        };
        if let Some(decoded) = simple {
            self.bump();
            buf.push(decoded);
            return Ok(());
        }

        match self.peek() {
            Some(b'0'..=b'7') => {
                let digits = self.read_limited(3, |b| (b'0'..=b'7').contains(&b));
                let value = u32::from_str_radix(digits, 8).unwrap_or_default();
                buf.push((value & 0xff) as u8);
            }
            Some(b'x') if self.peek_at(1).is_some_and(|b| b.is_ascii_hexdigit()) => {
                self.bump();
                let digits = self.read_limited(2, |b| b.is_ascii_hexdigit());
                buf.push(u8::from_str_radix(digits, 16).unwrap_or_default());
            }
            Some(b'u') if self.peek_at(1) == Some(b'{') => {
                self.pos += 2;
                let digits = self.read_while(|b| b.is_ascii_hexdigit());
                let ch = u32::from_str_radix(digits, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| self.error("invalid unicode escape"))?;
                self.expect(b'}')?;
                let mut encoded = [0u8; 4];
                buf.extend_from_slice(ch.encode_utf8(&mut encoded).as_bytes());
            }
            _ => buf.push(b'\\'),
        }
        Ok(())
    }

    fn read_limited(&mut self, max: usize, predicate: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.pos - start < max && self.peek().is_some_and(&predicate) {
            self.bump();
        }
        std::str::from_utf8(&self.bytes[start..self.pos]).unwrap_or_default()
    }

    fn parse_number(&mut self) -> Result<PhpValue, Error> {
        let radix = match (self.peek(), self.peek_at(1)) {
            (Some(b'0'), Some(b'x' | b'X')) => Some(16),
            (Some(b'0'), Some(b'b' | b'B')) => Some(2),
            (Some(b'0'), Some(b'o' | b'O')) => Some(8),
            _ => None,
        };
        if let Some(radix) = radix {
            self.pos += 2;
            let digits = self.read_while(|b| b.is_ascii_hexdigit() || b == b'_');
            return self.integer_literal(&digits.replace('_', ""), radix);
        }

        let start = self.pos;
        let mut is_float = false;
        self.read_while(|b| b.is_ascii_digit() || b == b'_');
        if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) {
            is_float = true;
            self.bump();
            self.read_while(|b| b.is_ascii_digit() || b == b'_');
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let exponent_digit = match self.peek_at(1) {
                Some(b'+' | b'-') => self.peek_at(2),
                other => other,
            };
            if exponent_digit.is_some_and(|b| b.is_ascii_digit()) {
                is_float = true;
                self.bump();
                if matches!(self.peek(), Some(b'+' | b'-')) {
                    self.bump();
                }
                self.read_while(|b| b.is_ascii_digit());
            }
        }

        let literal = String::from_utf8_lossy(&self.bytes[start..self.pos]).replace('_', "");
        if is_float {
            return literal
                .parse::<f64>()
                .map(PhpValue::Float)
                .map_err(|_| self.error(format!("invalid numeric literal `{}`", literal)));
        }
        match literal.strip_prefix('0') {
            Some(octal) if !octal.is_empty() => self.integer_literal(octal, 8),
            _ => self.integer_literal(&literal, 10),
        }
    }

    /// Integer literal in `radix`; values past `i64` become floats as in PHP.
    fn integer_literal(&self, digits: &str, radix: u32) -> Result<PhpValue, Error> {
        let value = u128::from_str_radix(digits, radix)
            .map_err(|_| self.error(format!("invalid numeric literal `{}`", digits)))?;
        Ok(i64::try_from(value)
            .map(PhpValue::Int)
            .unwrap_or(PhpValue::Float(value as f64)))
    }
}

fn is_ident_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_' || byte == b'\\'
}

fn is_ident_char(byte: u8) -> bool {
    is_ident_start(byte) || byte.is_ascii_digit()
}

/// The integer PHP would store for a string key like `"5"`, if any.
fn integer_key(key: &str) -> Option<i64> {
    let digits = key.strip_prefix('-').unwrap_or(key);
    let canonical = !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && (digits == "0" || !digits.starts_with('0'))
        && key != "-0";
    if canonical { key.parse().ok() } else { None }
}
