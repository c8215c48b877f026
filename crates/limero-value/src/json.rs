//! JSON text codec for [`Value`] trees.
//!
//! The parser is a recursive-descent reader with one byte of lookahead.
//! `\uXXXX` escapes are not decoded: the six characters are kept as-is in
//! the resulting string, and the serializer writes them back unchanged.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::cbor::MAX_DEPTH;
use crate::error::{Result, ValueError};
use crate::value::{Array, Object, Value};

impl Value {
    /// Render this tree as JSON text.
    ///
    /// With `pretty`, containers holding more than one element put each
    /// element on its own line indented by `indent + 2` spaces and the closer
    /// on a line indented by `indent`. Containers with zero or one element
    /// stay on a single line.
    pub fn to_json(&self, pretty: bool, indent: usize) -> String {
        let mut out = String::new();
        write_value(self, &mut out, pretty, indent);
        out
    }

    /// Parse a complete JSON document.
    pub fn from_json(text: &str) -> Result<Value> {
        JsonParser::new(text).parse().inspect_err(|err| {
            tracing::debug!(error = %err, len = text.len(), "json decode failed");
        })
    }
}

fn write_value(value: &Value, out: &mut String, pretty: bool, indent: usize) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Int(i) => out.push_str(&i.to_string()),
        Value::Float(f) => {
            if f.is_finite() {
                out.push_str(&format!("{f:.6}"));
            } else {
                out.push_str("null");
            }
        }
        Value::String(s) => write_string(out, s),
        Value::Bytes(b) => {
            out.push('"');
            out.push_str(&STANDARD.encode(b));
            out.push('"');
        }
        Value::Array(items) => {
            out.push('[');
            let multiline = pretty && items.len() > 1;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                if multiline {
                    newline(out, indent + 2);
                }
                write_value(item, out, pretty, indent + 2);
            }
            if multiline {
                newline(out, indent);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            let multiline = pretty && map.len() > 1;
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                if multiline {
                    newline(out, indent + 2);
                }
                write_string(out, key);
                out.push_str(if pretty { ": " } else { ":" });
                write_value(item, out, pretty, indent + 2);
            }
            if multiline {
                newline(out, indent);
            }
            out.push('}');
        }
    }
}

fn newline(out: &mut String, indent: usize) {
    out.push('\n');
    out.extend(std::iter::repeat_n(' ', indent));
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    let bytes = s.as_bytes();
    for (i, c) in s.char_indices() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' if is_unicode_escape(&bytes[i..]) => out.push('\\'),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            c if u32::from(c) < 0x20 => out.push_str(&format!("\\u{:04x}", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push('"');
}

/// True when `s` starts with a `\uXXXX` sequence kept from parsing.
fn is_unicode_escape(s: &[u8]) -> bool {
    s.len() >= 6 && s[0] == b'\\' && s[1] == b'u' && s[2..6].iter().all(u8::is_ascii_hexdigit)
}

fn is_integer_literal(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Recursive-descent JSON parser.
#[derive(Debug)]
pub struct JsonParser<'a> {
    input: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> JsonParser<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            input: text.as_bytes(),
            pos: 0,
            depth: 0,
        }
    }

    /// Parse one value and require that only whitespace follows it.
    pub fn parse(&mut self) -> Result<Value> {
        let value = self.parse_value()?;
        self.skip_whitespace();
        if self.pos < self.input.len() {
            return Err(self.syntax("trailing characters after value"));
        }
        Ok(value)
    }

    fn parse_value(&mut self) -> Result<Value> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'{') => self.parse_object(),
            Some(b'[') => self.parse_array(),
            Some(b'"') => self.parse_string().map(Value::String),
            Some(b't') => self.parse_literal("true", Value::Bool(true)),
            Some(b'f') => self.parse_literal("false", Value::Bool(false)),
            Some(b'n') => self.parse_literal("null", Value::Null),
            Some(b'-' | b'0'..=b'9') => self.parse_number(),
            Some(_) => Err(self.syntax("unexpected character")),
            None => Err(ValueError::UnexpectedEnd { offset: self.pos }),
        }
    }

    fn parse_object(&mut self) -> Result<Value> {
        self.enter()?;
        self.pos += 1;
        let mut map = Object::new();
        self.skip_whitespace();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            self.depth -= 1;
            return Ok(Value::Object(map));
        }
        loop {
            self.skip_whitespace();
            if self.peek() != Some(b'"') {
                return Err(self.syntax("expected string key"));
            }
            let key = self.parse_string()?;
            self.skip_whitespace();
            self.expect(b':', "expected ':' after key")?;
            let value = self.parse_value()?;
            map.entry(key).or_insert(value);
            self.skip_whitespace();
            match self.bump() {
                Some(b',') => continue,
                Some(b'}') => break,
                Some(_) => {
                    self.pos -= 1;
                    return Err(self.syntax("expected ',' or '}'"));
                }
                None => return Err(ValueError::UnexpectedEnd { offset: self.pos }),
            }
        }
        self.depth -= 1;
        Ok(Value::Object(map))
    }

    fn parse_array(&mut self) -> Result<Value> {
        self.enter()?;
        self.pos += 1;
        let mut items = Array::new();
        self.skip_whitespace();
        if self.peek() == Some(b']') {
            self.pos += 1;
            self.depth -= 1;
            return Ok(Value::Array(items));
        }
        loop {
            items.push(self.parse_value()?);
            self.skip_whitespace();
            match self.bump() {
                Some(b',') => continue,
                Some(b']') => break,
                Some(_) => {
                    self.pos -= 1;
                    return Err(self.syntax("expected ',' or ']'"));
                }
                None => return Err(ValueError::UnexpectedEnd { offset: self.pos }),
            }
        }
        self.depth -= 1;
        Ok(Value::Array(items))
    }

    fn parse_string(&mut self) -> Result<String> {
        let start = self.pos;
        self.pos += 1;
        let mut buf = Vec::new();
        loop {
            match self.bump() {
                Some(b'"') => break,
                Some(b'\\') => {
                    let escape = self
                        .bump()
                        .ok_or(ValueError::UnexpectedEnd { offset: self.pos })?;
                    match escape {
                        b'"' => buf.push(b'"'),
                        b'\\' => buf.push(b'\\'),
                        b'/' => buf.push(b'/'),
                        b'b' => buf.push(0x08),
                        b'f' => buf.push(0x0C),
                        b'n' => buf.push(b'\n'),
                        b'r' => buf.push(b'\r'),
                        b't' => buf.push(b'\t'),
                        b'u' => {
                            let digits = self
                                .input
                                .get(self.pos..self.pos + 4)
                                .ok_or(ValueError::UnexpectedEnd {
                                    offset: self.input.len(),
                                })?;
                            if !digits.iter().all(u8::is_ascii_hexdigit) {
                                return Err(self.syntax("expected 4 hex digits after \\u"));
                            }
                            buf.extend_from_slice(b"\\u");
                            buf.extend_from_slice(digits);
                            self.pos += 4;
                        }
                        _ => {
                            self.pos -= 1;
                            return Err(self.syntax("invalid escape sequence"));
                        }
                    }
                }
                Some(byte) => buf.push(byte),
                None => return Err(ValueError::UnexpectedEnd { offset: self.pos }),
            }
        }
        // Input was a &str and splits only happen on ASCII bytes.
        String::from_utf8(buf).map_err(|_| ValueError::InvalidUtf8 { offset: start })
    }

    fn parse_number(&mut self) -> Result<Value> {
        let start = self.pos;
        while let Some(b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E') = self.peek() {
            self.pos += 1;
        }
        let literal = &self.input[start..self.pos];
        // Only ASCII bytes were consumed above.
        let text = std::str::from_utf8(literal).unwrap_or_default();
        let is_float = literal.iter().any(|b| matches!(b, b'.' | b'e' | b'E'));
        if is_float {
            text.parse::<f64>()
                .map(Value::Float)
                .map_err(|_| ValueError::Syntax {
                    offset: start,
                    message: "invalid number",
                })
        } else if is_integer_literal(text) {
            text.parse::<i64>()
                .map(Value::Int)
                .map_err(|_| ValueError::IntegerOverflow { offset: start })
        } else {
            Err(ValueError::Syntax {
                offset: start,
                message: "invalid number",
            })
        }
    }

    fn parse_literal(&mut self, word: &'static str, value: Value) -> Result<Value> {
        if self.input[self.pos..].starts_with(word.as_bytes()) {
            self.pos += word.len();
            Ok(value)
        } else {
            Err(self.syntax("invalid literal"))
        }
    }

    fn expect(&mut self, byte: u8, message: &'static str) -> Result<()> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.syntax(message))
        }
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth >= MAX_DEPTH {
            return Err(ValueError::DepthLimit {
                max: MAX_DEPTH,
                offset: self.pos,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    fn syntax(&self, message: &'static str) -> ValueError {
        ValueError::Syntax {
            offset: self.pos,
            message,
        }
    }
}
