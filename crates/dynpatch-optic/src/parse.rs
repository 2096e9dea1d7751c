//! Parser for the canonical optic rendering.
//!
//! Accepts exactly what `Display` produces. Map keys are limited to the
//! literal kinds that render unambiguously: `Int` (`42`), `Long` (`42L`),
//! `Boolean`, `String` (`"..."`) and `Char` (`'c'`).

use dynpatch_value::{DynamicValue, PrimitiveValue};
use thiserror::Error;

use crate::node::Node;
use crate::optic::DynamicOptic;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid optic at char {position}: {message}")]
pub struct OpticParseError {
    /// Char offset where parsing stopped.
    pub position: usize,
    pub message: String,
}

/// Parses `.` (or the empty string) or a sequence of rendered steps.
pub fn parse_optic(input: &str) -> Result<DynamicOptic, OpticParseError> {
    if input.is_empty() || input == "." {
        return Ok(DynamicOptic::root());
    }
    let mut parser = Parser { chars: input.chars().collect(), pos: 0 };
    let mut nodes = Vec::new();
    while !parser.at_end() {
        nodes.push(parser.node()?);
    }
    Ok(DynamicOptic::from_nodes(nodes))
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn error<T>(&self, message: impl Into<String>) -> Result<T, OpticParseError> {
        Err(OpticParseError { position: self.pos, message: message.into() })
    }

    fn expect(&mut self, expected: char) -> Result<(), OpticParseError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => self.error(format!("expected '{expected}', found '{c}'")),
            None => self.error(format!("expected '{expected}', found end of input")),
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn node(&mut self) -> Result<Node, OpticParseError> {
        match self.bump() {
            Some('.') => {
                if self.eat('~') {
                    Ok(Node::Wrapped)
                } else {
                    Ok(Node::Field(self.name()?))
                }
            }
            Some('<') => {
                let name = self.name()?;
                self.expect('>')?;
                Ok(Node::Case(name))
            }
            Some('[') => self.index_step(),
            Some('{') => self.key_step(),
            Some(c) => {
                self.pos -= 1;
                self.error(format!("unexpected '{c}'"))
            }
            None => self.error("unexpected end of input"),
        }
    }

    /// A bare identifier or a backtick-quoted name with doubled backticks.
    fn name(&mut self) -> Result<String, OpticParseError> {
        if self.eat('`') {
            let mut name = String::new();
            loop {
                match self.bump() {
                    Some('`') => {
                        if self.eat('`') {
                            name.push('`');
                        } else {
                            return Ok(name);
                        }
                    }
                    Some(c) => name.push(c),
                    None => return self.error("unterminated quoted name"),
                }
            }
        }
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_alphabetic() || c == '_' => self.pos += 1,
            _ => return self.error("expected a name"),
        }
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn index_step(&mut self) -> Result<Node, OpticParseError> {
        if self.eat('*') {
            self.expect(']')?;
            return Ok(Node::Elements);
        }
        let mut indices = Vec::new();
        if self.eat(']') {
            return Ok(Node::AtIndices(indices));
        }
        let batch = loop {
            indices.push(self.unsigned()?);
            if self.eat(']') {
                break false;
            }
            self.expect(',')?;
            if self.eat(']') {
                break true;
            }
        };
        match indices.as_slice() {
            [index] if !batch => Ok(Node::AtIndex(*index)),
            _ => Ok(Node::AtIndices(indices)),
        }
    }

    fn key_step(&mut self) -> Result<Node, OpticParseError> {
        if self.eat('*') {
            if self.eat(':') {
                self.expect('}')?;
                return Ok(Node::MapKeys);
            }
            self.expect('}')?;
            return Ok(Node::MapValues);
        }
        let mut keys = Vec::new();
        if self.eat('}') {
            return Ok(Node::AtMapKeys(keys));
        }
        let batch = loop {
            keys.push(self.literal()?);
            if self.eat('}') {
                break false;
            }
            self.expect(',')?;
            if self.eat('}') {
                break true;
            }
        };
        if keys.len() == 1 && !batch {
            return Ok(Node::AtMapKey(keys.remove(0)));
        }
        Ok(Node::AtMapKeys(keys))
    }

    fn digits(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn unsigned(&mut self) -> Result<usize, OpticParseError> {
        let digits = self.digits();
        if digits.is_empty() {
            return self.error("expected an index");
        }
        match digits.parse() {
            Ok(n) => Ok(n),
            Err(_) => self.error(format!("index {digits} out of range")),
        }
    }

    fn literal(&mut self) -> Result<DynamicValue, OpticParseError> {
        match self.peek() {
            Some('"') => {
                self.pos += 1;
                let s = self.escaped_until('"')?;
                Ok(DynamicValue::string(s))
            }
            Some('\'') => {
                self.pos += 1;
                let s = self.escaped_until('\'')?;
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(DynamicValue::Primitive(PrimitiveValue::Char(c))),
                    _ => self.error("char literal must hold exactly one char"),
                }
            }
            Some('t') | Some('f') => {
                let word = self.name()?;
                match word.as_str() {
                    "true" => Ok(DynamicValue::boolean(true)),
                    "false" => Ok(DynamicValue::boolean(false)),
                    _ => self.error(format!("unsupported key literal '{word}'")),
                }
            }
            Some(c) if c == '-' || c.is_ascii_digit() => self.integer(),
            Some(c) => self.error(format!("unsupported key literal starting with '{c}'")),
            None => self.error("expected a key literal"),
        }
    }

    fn integer(&mut self) -> Result<DynamicValue, OpticParseError> {
        let negative = self.eat('-');
        let digits = self.digits();
        if digits.is_empty() {
            return self.error("expected digits");
        }
        let text = if negative { format!("-{digits}") } else { digits };
        if self.eat('L') {
            return match text.parse::<i64>() {
                Ok(n) => Ok(DynamicValue::long(n)),
                Err(_) => self.error(format!("long literal {text} out of range")),
            };
        }
        match text.parse::<i32>() {
            Ok(n) => Ok(DynamicValue::int(n)),
            Err(_) => self.error(format!("int literal {text} out of range")),
        }
    }

    /// Reads up to the closing `quote`, decoding Rust-style escapes.
    fn escaped_until(&mut self, quote: char) -> Result<String, OpticParseError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(out),
                Some('\\') => out.push(self.escape()?),
                Some(c) => out.push(c),
                None => return self.error("unterminated literal"),
            }
        }
    }

    fn escape(&mut self) -> Result<char, OpticParseError> {
        match self.bump() {
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('t') => Ok('\t'),
            Some('0') => Ok('\0'),
            Some('\\') => Ok('\\'),
            Some('\'') => Ok('\''),
            Some('"') => Ok('"'),
            Some('u') => {
                self.expect('{')?;
                let start = self.pos;
                while matches!(self.peek(), Some(c) if c.is_ascii_hexdigit()) {
                    self.pos += 1;
                }
                let hex: String = self.chars[start..self.pos].iter().collect();
                self.expect('}')?;
                u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .map_or_else(|| self.error(format!("invalid unicode escape '{hex}'")), Ok)
            }
            Some(c) => self.error(format!("unknown escape '\\{c}'")),
            None => self.error("unterminated escape"),
        }
    }
}
