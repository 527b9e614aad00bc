//! Content stream tokenizer.
//!
//! Turns raw (already decompressed) content stream bytes into a flat list of
//! [`Operator`]s, each carrying the operands that preceded it. Comments are
//! dropped and inline images (`BI ... ID <data> EI`) collapse into a single
//! operand-less `BI` operator since their pixels are never needed.

use crate::error::BackendError;

/// A content stream operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Integer(i64),
    Real(f64),
    /// Name without the leading `/`, `#XX` escapes decoded.
    Name(String),
    /// Literal `( ... )` string with escapes decoded.
    LiteralString(Vec<u8>),
    /// Hex `< ... >` string, decoded to bytes.
    HexString(Vec<u8>),
    Array(Vec<Operand>),
    Boolean(bool),
    Null,
    Dictionary(Vec<(String, Operand)>),
}

impl Operand {
    /// Numeric value of an `Integer` or `Real`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Operand::Integer(i) => Some(*i as f64),
            Operand::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Operand::Name(name) => Some(name),
            _ => None,
        }
    }

    /// Raw bytes of either string form.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Operand::LiteralString(bytes) | Operand::HexString(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// An operator together with its operands, in stream order.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    pub name: String,
    pub operands: Vec<Operand>,
}

/// Parses content stream bytes into operators.
///
/// # Errors
///
/// Returns [`BackendError::Interpreter`] for unterminated strings, arrays,
/// dictionaries or inline images, and for malformed numbers or hex digits.
pub fn tokenize(input: &[u8]) -> Result<Vec<Operator>, BackendError> {
    let mut lexer = Lexer { input, pos: 0 };
    let mut ops = Vec::new();
    let mut operands = Vec::new();

    while let Some(token) = lexer.next_token()? {
        match token {
            Token::Operand(operand) => operands.push(operand),
            Token::Keyword(name) if name == "BI" => {
                lexer.skip_inline_image()?;
                operands.clear();
                ops.push(Operator {
                    name,
                    operands: Vec::new(),
                });
            }
            Token::Keyword(name) => ops.push(Operator {
                name,
                operands: std::mem::take(&mut operands),
            }),
            Token::Close(delim) => {
                return Err(BackendError::Interpreter(format!(
                    "unexpected '{delim}' at offset {}",
                    lexer.pos
                )));
            }
        }
    }

    Ok(ops)
}

enum Token {
    Operand(Operand),
    Keyword(String),
    /// A stray `]` or `>>`.
    Close(&'static str),
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0C' | b'\0')
}

fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

fn is_regular(b: u8) -> bool {
    !is_whitespace(b) && !is_delimiter(b)
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
}

impl Lexer<'_> {
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn error(&self, what: &str) -> BackendError {
        BackendError::Interpreter(format!("{what} at offset {}", self.pos))
    }

    fn skip_blank(&mut self) {
        while let Some(b) = self.peek() {
            if is_whitespace(b) {
                self.pos += 1;
            } else if b == b'%' {
                while let Some(c) = self.peek() {
                    if c == b'\n' || c == b'\r' {
                        break;
                    }
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, BackendError> {
        let b = loop {
            self.skip_blank();
            match self.peek() {
                None => return Ok(None),
                // not meaningful in content streams
                Some(b'{' | b'}' | b')') => self.pos += 1,
                Some(b'>') if self.peek_at(1) != Some(b'>') => self.pos += 1,
                Some(b) => break b,
            }
        };

        let token = match b {
            b'(' => Token::Operand(Operand::LiteralString(self.literal_string()?)),
            b'<' if self.peek_at(1) == Some(b'<') => {
                Token::Operand(Operand::Dictionary(self.dictionary()?))
            }
            b'<' => Token::Operand(Operand::HexString(self.hex_string()?)),
            b'>' => {
                self.pos += 2;
                Token::Close(">>")
            }
            b'[' => Token::Operand(Operand::Array(self.array()?)),
            b']' => {
                self.pos += 1;
                Token::Close("]")
            }
            b'/' => Token::Operand(Operand::Name(self.name())),
            b'0'..=b'9' | b'+' | b'-' | b'.' => Token::Operand(self.number()?),
            _ => match self.keyword().as_str() {
                "true" => Token::Operand(Operand::Boolean(true)),
                "false" => Token::Operand(Operand::Boolean(false)),
                "null" => Token::Operand(Operand::Null),
                other => Token::Keyword(other.to_string()),
            },
        };
        Ok(Some(token))
    }

    /// Reads one value inside an array or dictionary.
    fn value(&mut self, closing: &str) -> Result<Option<Operand>, BackendError> {
        match self.next_token()? {
            Some(Token::Operand(operand)) => Ok(Some(operand)),
            Some(Token::Close(delim)) if delim == closing => Ok(None),
            Some(Token::Close(delim)) => Err(self.error(&format!("mismatched '{delim}'"))),
            Some(Token::Keyword(kw)) => Err(self.error(&format!("unexpected operator '{kw}'"))),
            None => Err(self.error(&format!("missing '{closing}'"))),
        }
    }

    fn array(&mut self) -> Result<Vec<Operand>, BackendError> {
        self.pos += 1;
        let mut items = Vec::new();
        while let Some(item) = self.value("]")? {
            items.push(item);
        }
        Ok(items)
    }

    fn dictionary(&mut self) -> Result<Vec<(String, Operand)>, BackendError> {
        self.pos += 2;
        let mut entries = Vec::new();
        loop {
            let key = match self.value(">>")? {
                None => return Ok(entries),
                Some(Operand::Name(key)) => key,
                Some(other) => {
                    return Err(self.error(&format!("dictionary key is not a name: {other:?}")));
                }
            };
            match self.value(">>")? {
                Some(value) => entries.push((key, value)),
                None => return Err(self.error("dictionary key without value")),
            }
        }
    }

    fn literal_string(&mut self) -> Result<Vec<u8>, BackendError> {
        self.pos += 1;
        let mut out = Vec::new();
        let mut depth = 1;
        loop {
            let Some(b) = self.peek() else {
                return Err(self.error("unterminated literal string"));
            };
            self.pos += 1;
            match b {
                b'(' => {
                    depth += 1;
                    out.push(b);
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(out);
                    }
                    out.push(b);
                }
                b'\\' => self.escape(&mut out)?,
                _ => out.push(b),
            }
        }
    }

    fn escape(&mut self, out: &mut Vec<u8>) -> Result<(), BackendError> {
        let Some(b) = self.peek() else {
            return Err(self.error("unterminated escape"));
        };
        self.pos += 1;
        match b {
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0C),
            b'0'..=b'7' => {
                let mut value = u32::from(b - b'0');
                for _ in 0..2 {
                    match self.peek() {
                        Some(d @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(d - b'0');
                            self.pos += 1;
                        }
                        _ => break,
                    }
                }
                out.push((value & 0xFF) as u8);
            }
            // line continuation
            b'\r' => {
                if self.peek() == Some(b'\n') {
                    self.pos += 1;
                }
            }
            b'\n' => {}
            other => out.push(other),
        }
        Ok(())
    }

    fn hex_string(&mut self) -> Result<Vec<u8>, BackendError> {
        self.pos += 1;
        let mut out = Vec::new();
        let mut high: Option<u8> = None;
        loop {
            let Some(b) = self.peek() else {
                return Err(self.error("unterminated hex string"));
            };
            self.pos += 1;
            if b == b'>' {
                break;
            }
            if is_whitespace(b) {
                continue;
            }
            let nibble = hex_value(b).ok_or_else(|| self.error("invalid hex digit"))?;
            match high.take() {
                Some(h) => out.push(h << 4 | nibble),
                None => high = Some(nibble),
            }
        }
        if let Some(h) = high {
            out.push(h << 4);
        }
        Ok(out)
    }

    fn name(&mut self) -> String {
        self.pos += 1;
        let mut bytes = Vec::new();
        while let Some(b) = self.peek() {
            if !is_regular(b) {
                break;
            }
            self.pos += 1;
            if b == b'#' {
                let decoded = self
                    .peek()
                    .and_then(hex_value)
                    .zip(self.peek_at(1).and_then(hex_value));
                if let Some((h, l)) = decoded {
                    bytes.push(h << 4 | l);
                    self.pos += 2;
                    continue;
                }
            }
            bytes.push(b);
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }

    fn number(&mut self) -> Result<Operand, BackendError> {
        let start = self.pos;
        while let Some(b'0'..=b'9' | b'+' | b'-' | b'.') = self.peek() {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| self.error("invalid number"))?;
        if !text.contains('.') {
            if let Ok(i) = text.parse::<i64>() {
                return Ok(Operand::Integer(i));
            }
        }
        // producers occasionally emit things like "-.5" or "1." which f64 accepts
        text.parse::<f64>()
            .map(Operand::Real)
            .map_err(|_| self.error(&format!("invalid number '{text}'")))
    }

    fn keyword(&mut self) -> String {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if !is_regular(b) {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            // a lone delimiter we have no use for
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }

    /// Skips an inline image body: the dictionary up to `ID`, then raw data
    /// up to an `EI` surrounded by whitespace.
    fn skip_inline_image(&mut self) -> Result<(), BackendError> {
        loop {
            match self.next_token()? {
                Some(Token::Keyword(kw)) if kw == "ID" => break,
                Some(_) => {}
                None => return Err(self.error("inline image without ID")),
            }
        }
        // exactly one whitespace byte separates ID from the data
        self.pos += 1;
        while self.pos < self.input.len() {
            let at_ei = self.input[self.pos..].starts_with(b"EI")
                && self.pos > 0
                && is_whitespace(self.input[self.pos - 1])
                && self.peek_at(2).is_none_or(|b| !is_regular(b));
            if at_ei {
                self.pos += 2;
                return Ok(());
            }
            self.pos += 1;
        }
        Err(self.error("inline image without EI"))
    }
}
