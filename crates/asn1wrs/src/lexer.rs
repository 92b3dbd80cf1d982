//! Tokeniser for ASN.1 source text (X.680 §11 lexical items).

use crate::error::{Error, Position};

/// A single lexical token, carrying its lexeme where the kind alone does
/// not determine the text (identifiers, literals, numbers, `PYQUOTE`
/// pass-through comments).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    // Punctuators (X.680 §11.16, §11.17, §11.18, §11.26)
    Assignment,
    Range,
    Ellipsis,
    LBrace,
    RBrace,
    Lt,
    Comma,
    Dot,
    LParen,
    RParen,
    LBrack,
    RBrack,
    Minus,
    Colon,
    Semicolon,

    /// A reserved word, carrying its canonical spelling (e.g. `"SEQUENCE"`).
    Reserved(&'static str),

    /// An upper-case-initial identifier: a type reference.
    TypeReference(String),
    /// A lower-case-initial identifier: a value reference.
    ValueReference(String),

    /// `'...'B` — a bitstring literal; contents are the raw bits, no quotes.
    BString(String),
    /// `'...'H` — a hex-string literal; contents are the raw hex digits.
    HString(String),
    /// `"..."` — a quoted string literal, with `""` already unescaped to `"`.
    QString(String),
    /// `0 | [1-9][0-9]*`
    Number(i64),

    /// Comment text beginning with the literal marker `PYQUOTE`, carried
    /// through as a pass-through token (all other comments are discarded).
    PyQuote(String),

    /// End of input.
    Eof,
}

/// Reserved words recognised by the lexer, per X.680 §11.27. Entries that
/// belong to the out-of-scope X.880/X.882 operation/error macro machinery
/// are intentionally not ported.
const RESERVED_WORDS: &[&str] = &[
    "TAGS",
    "BOOLEAN",
    "INTEGER",
    "BIT",
    "CHARACTER",
    "STRING",
    "OCTET",
    "NULL",
    "SEQUENCE",
    "OF",
    "SET",
    "IMPLICIT",
    "CHOICE",
    "ANY",
    "OPTIONAL",
    "DEFAULT",
    "COMPONENTS",
    "COMPONENT",
    "UNIVERSAL",
    "APPLICATION",
    "PRIVATE",
    "TRUE",
    "FALSE",
    "BEGIN",
    "END",
    "DEFINITIONS",
    "EXPLICIT",
    "ENUMERATED",
    "EXPORTS",
    "IMPORTS",
    "REAL",
    "INCLUDES",
    "MIN",
    "MAX",
    "SIZE",
    "FROM",
    "PATTERN",
    "WITH",
    "PRESENT",
    "ABSENT",
    "DEFINED",
    "CONSTRAINED",
    "BY",
    "PLUS-INFINITY",
    "MINUS-INFINITY",
    "GeneralizedTime",
    "UTCTime",
    "ObjectDescriptor",
    "AUTOMATIC",
    "OBJECT",
    "IDENTIFIER",
];

/// The 13 restricted character-string type keywords, each taking the
/// suffix `String` to form the reserved word (e.g. `IA5String`).
pub const STRING_TYPE_STEMS: &[&str] = &[
    "BMP",
    "General",
    "Graphic",
    "IA5",
    "ISO646",
    "Numeric",
    "Printable",
    "Teletex",
    "T61",
    "Universal",
    "UTF8",
    "Videotex",
    "Visible",
];

fn lookup_reserved(word: &str) -> Option<&'static str> {
    RESERVED_WORDS.iter().copied().find(|&w| w == word).or_else(|| {
        STRING_TYPE_STEMS.iter().find_map(|stem| {
            let full = format!("{stem}String");
            (full == word).then(|| -> &'static str {
                // Safe: every stem+"String" combination is one of a small
                // closed set; intern via a match so we return a 'static str.
                match *stem {
                    "BMP" => "BMPString",
                    "General" => "GeneralString",
                    "Graphic" => "GraphicString",
                    "IA5" => "IA5String",
                    "ISO646" => "ISO646String",
                    "Numeric" => "NumericString",
                    "Printable" => "PrintableString",
                    "Teletex" => "TeletexString",
                    "T61" => "T61String",
                    "Universal" => "UniversalString",
                    "UTF8" => "UTF8String",
                    "Videotex" => "VideotexString",
                    "Visible" => "VisibleString",
                    _ => unreachable!(),
                }
            })
        })
    })
}

/// A single (token, position) pair produced by [`Lexer::tokenize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub pos: Position,
}

/// Tokenises ASN.1 source text.
pub struct Lexer<'a> {
    src: &'a [u8],
    idx: usize,
    line: u32,
    col: u32,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer over `src`.
    #[must_use]
    pub fn new(src: &'a str) -> Self {
        Self {
            src: src.as_bytes(),
            idx: 0,
            line: 1,
            col: 1,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.idx).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.idx + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.idx += 1;
        if c == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn pos(&self) -> Position {
        Position {
            line: self.line,
            column: self.col,
        }
    }

    /// Tokenises the entire input, returning every token including a
    /// trailing [`Token::Eof`].
    pub fn tokenize(mut self) -> crate::error::Result<Vec<Spanned>> {
        let mut out = Vec::new();
        loop {
            let spanned = self.next_token()?;
            let done = spanned.token == Token::Eof;
            out.push(spanned);
            if done {
                break;
            }
        }
        Ok(out)
    }

    fn skip_whitespace_and_comments(&mut self) -> crate::error::Result<Option<Spanned>> {
        loop {
            match self.peek() {
                Some(c) if c == b' ' || c == b'\t' || c == b'\r' || c == b'\n' => {
                    self.bump();
                }
                Some(b'-') if self.peek_at(1) == Some(b'-') => {
                    let start = self.pos();
                    self.bump();
                    self.bump();
                    let is_pyquote = self.src[self.idx..].starts_with(b"PYQUOTE");
                    let mut text = String::new();
                    // A two-dash comment runs to the next `--` or end of line.
                    loop {
                        match self.peek() {
                            None | Some(b'\n') => break,
                            Some(b'-') if self.peek_at(1) == Some(b'-') => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            Some(_) => {
                                text.push(self.bump().unwrap() as char);
                            }
                        }
                    }
                    if is_pyquote {
                        let stripped = text.strip_prefix("PYQUOTE").unwrap_or(&text).trim_start();
                        return Ok(Some(Spanned {
                            token: Token::PyQuote(stripped.to_string()),
                            pos: start,
                        }));
                    }
                }
                _ => return Ok(None),
            }
        }
    }

    fn next_token(&mut self) -> crate::error::Result<Spanned> {
        if let Some(pyquote) = self.skip_whitespace_and_comments()? {
            return Ok(pyquote);
        }
        let pos = self.pos();
        let Some(c) = self.peek() else {
            return Ok(Spanned {
                token: Token::Eof,
                pos,
            });
        };

        // Static multi-char punctuators, longest match first.
        if c == b':' && self.peek_at(1) == Some(b':') && self.peek_at(2) == Some(b'=') {
            self.bump();
            self.bump();
            self.bump();
            return Ok(Spanned {
                token: Token::Assignment,
                pos,
            });
        }
        if c == b'.' && self.peek_at(1) == Some(b'.') && self.peek_at(2) == Some(b'.') {
            self.bump();
            self.bump();
            self.bump();
            return Ok(Spanned {
                token: Token::Ellipsis,
                pos,
            });
        }
        if c == b'.' && self.peek_at(1) == Some(b'.') {
            self.bump();
            self.bump();
            return Ok(Spanned {
                token: Token::Range,
                pos,
            });
        }

        match c {
            b'{' => {
                self.bump();
                Ok(Spanned { token: Token::LBrace, pos })
            }
            b'}' => {
                self.bump();
                Ok(Spanned { token: Token::RBrace, pos })
            }
            b'<' => {
                self.bump();
                Ok(Spanned { token: Token::Lt, pos })
            }
            b',' => {
                self.bump();
                Ok(Spanned { token: Token::Comma, pos })
            }
            b'.' => {
                self.bump();
                Ok(Spanned { token: Token::Dot, pos })
            }
            b'(' => {
                self.bump();
                Ok(Spanned { token: Token::LParen, pos })
            }
            b')' => {
                self.bump();
                Ok(Spanned { token: Token::RParen, pos })
            }
            b'[' => {
                self.bump();
                Ok(Spanned { token: Token::LBrack, pos })
            }
            b']' => {
                self.bump();
                Ok(Spanned { token: Token::RBrack, pos })
            }
            b'-' => {
                self.bump();
                Ok(Spanned { token: Token::Minus, pos })
            }
            b':' => {
                self.bump();
                Ok(Spanned { token: Token::Colon, pos })
            }
            b';' => {
                self.bump();
                Ok(Spanned { token: Token::Semicolon, pos })
            }
            b'\'' => self.lex_bit_or_hex_string(pos),
            b'"' => self.lex_quoted_string(pos),
            b'0'..=b'9' => self.lex_number(pos),
            c if c.is_ascii_alphabetic() => self.lex_identifier(pos),
            _ => Err(Error::Lex(
                pos,
                format!("unexpected character {:?}", c as char).into(),
            )),
        }
    }

    fn lex_bit_or_hex_string(&mut self, pos: Position) -> crate::error::Result<Spanned> {
        self.bump(); // opening quote
        let mut body = String::new();
        loop {
            match self.bump() {
                Some(b'\'') => break,
                Some(c) => body.push(c as char),
                None => {
                    return Err(Error::Lex(pos, "unterminated bit/hex string literal".into()))
                }
            }
        }
        match self.bump() {
            Some(b'B') => {
                if !body.chars().all(|c| c == '0' || c == '1') {
                    return Err(Error::Lex(pos, "invalid bitstring literal".into()));
                }
                Ok(Spanned {
                    token: Token::BString(body),
                    pos,
                })
            }
            Some(b'H') => {
                if !body.chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(Error::Lex(pos, "invalid hexstring literal".into()));
                }
                Ok(Spanned {
                    token: Token::HString(body),
                    pos,
                })
            }
            _ => Err(Error::Lex(
                pos,
                "bitstring/hexstring literal must end in B or H".into(),
            )),
        }
    }

    fn lex_quoted_string(&mut self, pos: Position) -> crate::error::Result<Spanned> {
        self.bump(); // opening quote
        let mut body = String::new();
        loop {
            match self.peek() {
                Some(b'"') => {
                    self.bump();
                    if self.peek() == Some(b'"') {
                        // `""` inside a quoted string is an escaped quote.
                        self.bump();
                        body.push('"');
                        continue;
                    }
                    break;
                }
                Some(_) => body.push(self.bump().unwrap() as char),
                None => return Err(Error::Lex(pos, "unterminated quoted string".into())),
            }
        }
        Ok(Spanned {
            token: Token::QString(body),
            pos,
        })
    }

    fn lex_number(&mut self, pos: Position) -> crate::error::Result<Spanned> {
        let start = self.idx;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.bump();
        }
        let text = std::str::from_utf8(&self.src[start..self.idx]).unwrap();
        if text.len() > 1 && text.starts_with('0') {
            return Err(Error::Lex(pos, "numbers may not have leading zeros".into()));
        }
        let value = text
            .parse::<i64>()
            .map_err(|_| Error::Lex(pos, "number literal out of range".into()))?;
        Ok(Spanned {
            token: Token::Number(value),
            pos,
        })
    }

    fn lex_identifier(&mut self, pos: Position) -> crate::error::Result<Spanned> {
        let start = self.idx;
        let first = self.peek().unwrap();
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == b'-') {
            // A trailing hyphen, or a double hyphen, is not part of an
            // identifier (it would start a comment).
            if self.peek() == Some(b'-') && self.peek_at(1) == Some(b'-') {
                break;
            }
            self.bump();
        }
        if self.src.get(self.idx - 1) == Some(&b'-') {
            return Err(Error::Lex(pos, "identifiers may not end in a hyphen".into()));
        }
        let text = std::str::from_utf8(&self.src[start..self.idx]).unwrap().to_string();
        if let Some(reserved) = lookup_reserved(&text) {
            return Ok(Spanned {
                token: Token::Reserved(reserved),
                pos,
            });
        }
        if first.is_ascii_uppercase() {
            Ok(Spanned {
                token: Token::TypeReference(text),
                pos,
            })
        } else {
            Ok(Spanned {
                token: Token::ValueReference(text),
                pos,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Token> {
        Lexer::new(src)
            .tokenize()
            .expect("lex")
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn punctuators() {
        assert_eq!(
            kinds("::= .. ... { } < , . ( ) [ ] - : ;"),
            vec![
                Token::Assignment,
                Token::Range,
                Token::Ellipsis,
                Token::LBrace,
                Token::RBrace,
                Token::Lt,
                Token::Comma,
                Token::Dot,
                Token::LParen,
                Token::RParen,
                Token::LBrack,
                Token::RBrack,
                Token::Minus,
                Token::Colon,
                Token::Semicolon,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn identifiers_case_sensitive() {
        assert_eq!(
            kinds("Foo bar"),
            vec![
                Token::TypeReference("Foo".into()),
                Token::ValueReference("bar".into()),
                Token::Eof
            ]
        );
    }

    #[test]
    fn reserved_words_and_string_types() {
        assert_eq!(
            kinds("SEQUENCE IA5String UTF8String"),
            vec![
                Token::Reserved("SEQUENCE"),
                Token::Reserved("IA5String"),
                Token::Reserved("UTF8String"),
                Token::Eof
            ]
        );
    }

    #[test]
    fn literals() {
        assert_eq!(
            kinds(r#"'1010'B 'FF'H "a""b""#),
            vec![
                Token::BString("1010".into()),
                Token::HString("FF".into()),
                Token::QString(r#"a"b"#.into()),
                Token::Eof
            ]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(
            kinds("0 120 42"),
            vec![Token::Number(0), Token::Number(120), Token::Number(42), Token::Eof]
        );
    }

    #[test]
    fn comment_discarded_pyquote_kept() {
        assert_eq!(
            kinds("-- regular comment\nAge --PYQUOTE keep me --"),
            vec![
                Token::TypeReference("Age".into()),
                Token::PyQuote("keep me ".into()),
                Token::Eof
            ]
        );
    }

    #[test]
    fn trailing_hyphen_is_error() {
        assert!(Lexer::new("Foo-").tokenize().is_err());
    }

    #[quickcheck_macros::quickcheck]
    fn identifiers_round_trip(word: String) -> bool {
        // Restrict to valid ASN.1 identifiers: letter, then letters/digits/hyphens,
        // no trailing hyphen, no double hyphen (which would start a comment).
        let valid = !word.is_empty()
            && word.chars().next().unwrap().is_ascii_alphabetic()
            && word.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            && !word.ends_with('-')
            && !word.contains("--");
        if !valid {
            return true;
        }
        let Ok(toks) = Lexer::new(&word).tokenize() else {
            return false;
        };
        matches!(
            toks.first().map(|s| &s.token),
            Some(Token::TypeReference(_))
                | Some(Token::ValueReference(_))
                | Some(Token::Reserved(_))
        )
    }
}
