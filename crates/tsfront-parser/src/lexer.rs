//! Lexer (tokenizer) for JavaScript and TypeScript.
//!
//! The lexer is pulled on demand by the parser. Context-sensitive tokens are
//! handled by re-scanning: the parser asks for a `/` to be re-read as a regular
//! expression, for a `}` to be re-read as the continuation of a template, or
//! resets the position to split `>>` into two `>` when closing type arguments.
//!
//! The lexer is `Clone` and holds nothing but a position, so a clone is a
//! complete checkpoint of the token cursor.

use crate::error::{ParseError, Result};
use crate::span::Span;
use crate::token::{keyword_from_str, Token, TokenKind};

/// The lexer state.
#[derive(Clone)]
pub struct Lexer<'a> {
    source: &'a str,
    /// Source code as bytes (for fast indexing).
    bytes: &'a [u8],
    /// Current byte position.
    pos: usize,
    /// Start position of the current token.
    token_start: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'a str) -> Self {
        let mut lexer = Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            token_start: 0,
        };
        // "#!/usr/bin/env node"
        if source.starts_with("#!") {
            while !lexer.is_eof() && !lexer.at_line_terminator() {
                lexer.advance_char();
            }
        }
        lexer
    }

    /// Get the current byte position.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Move the cursor to an arbitrary byte offset.
    pub fn reset_to(&mut self, pos: usize) {
        self.pos = pos;
        self.token_start = pos;
    }

    /// Peek at the next token without consuming it.
    pub fn peek(&self) -> Result<Token> {
        self.clone().next_token()
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Result<Token> {
        let had_newline_before = self.skip_whitespace_and_comments()?;
        self.token_start = self.pos;

        if self.is_eof() {
            return Ok(self.make_token(TokenKind::Eof, had_newline_before));
        }

        let ch = self.current();
        let kind = match ch {
            b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'$' => self.scan_identifier(),
            b'0'..=b'9' => self.scan_number()?,
            b'"' | b'\'' => self.scan_string(ch)?,
            b'`' => {
                self.advance();
                self.scan_template_part(true)?
            }

            b'(' => self.single(TokenKind::LParen),
            b')' => self.single(TokenKind::RParen),
            b'{' => self.single(TokenKind::LBrace),
            b'}' => self.single(TokenKind::RBrace),
            b'[' => self.single(TokenKind::LBracket),
            b']' => self.single(TokenKind::RBracket),
            b';' => self.single(TokenKind::Semicolon),
            b',' => self.single(TokenKind::Comma),
            b':' => self.single(TokenKind::Colon),
            b'@' => self.single(TokenKind::At),
            b'~' => self.single(TokenKind::Tilde),
            b'#' => self.scan_private_name()?,

            b'.' => self.scan_dot()?,
            b'?' => self.scan_question(),
            b'+' => self.scan_plus(),
            b'-' => self.scan_minus(),
            b'*' => self.scan_star(),
            b'/' => self.scan_slash(),
            b'%' => self.scan_percent(),
            b'=' => self.scan_equals(),
            b'!' => self.scan_bang(),
            b'<' => self.scan_less_than(),
            b'>' => self.scan_greater_than(),
            b'&' => self.scan_ampersand(),
            b'|' => self.scan_pipe(),
            b'^' => self.scan_caret(),

            _ => {
                let c = self.current_char();
                if is_identifier_start(c) {
                    self.scan_identifier()
                } else {
                    self.advance_char();
                    return Err(self.error(format!("Unexpected {:?}", c.to_string())));
                }
            }
        };

        Ok(self.make_token(kind, had_newline_before))
    }

    /// Re-read a `}` token starting at `brace_start` as the continuation of a
    /// template literal.
    pub fn rescan_template_continuation(
        &mut self,
        brace_start: usize,
        had_newline_before: bool,
    ) -> Result<Token> {
        self.token_start = brace_start;
        self.pos = brace_start + 1;
        let kind = self.scan_template_part(false)?;
        Ok(self.make_token(kind, had_newline_before))
    }

    /// Re-read a `/` or `/=` token starting at `slash_start` as a regular
    /// expression literal.
    pub fn rescan_regex(&mut self, slash_start: usize, had_newline_before: bool) -> Result<Token> {
        self.token_start = slash_start;
        self.pos = slash_start + 1;
        let mut in_class = false;
        loop {
            if self.is_eof() || self.at_line_terminator() {
                return Err(self.error("Unterminated regular expression"));
            }
            match self.current() {
                b'\\' => {
                    self.advance();
                    if self.is_eof() || self.at_line_terminator() {
                        return Err(self.error("Unterminated regular expression"));
                    }
                    self.advance_char();
                }
                b'[' => {
                    in_class = true;
                    self.advance();
                }
                b']' => {
                    in_class = false;
                    self.advance();
                }
                b'/' if !in_class => break,
                _ => self.advance_char(),
            }
        }
        let pattern = self.slice(slash_start + 1, self.pos).to_string();
        self.advance();
        let flags_start = self.pos;
        while !self.is_eof() && is_identifier_part(self.current_char()) {
            self.advance_char();
        }
        let flags = self.slice(flags_start, self.pos).to_string();
        Ok(self.make_token(TokenKind::Regex { pattern, flags }, had_newline_before))
    }

    // === Helper methods ===

    fn is_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn current(&self) -> u8 {
        self.bytes.get(self.pos).copied().unwrap_or(0)
    }

    fn current_char(&self) -> char {
        self.source[self.pos..].chars().next().unwrap_or('\0')
    }

    fn peek_byte(&self, n: usize) -> u8 {
        self.bytes.get(self.pos + n).copied().unwrap_or(0)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn advance_char(&mut self) {
        self.pos += self.current_char().len_utf8().max(1);
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    fn at_line_terminator(&self) -> bool {
        match self.current() {
            b'\n' | b'\r' => true,
            // U+2028 / U+2029 are E2 80 A8 / E2 80 A9
            0xE2 => self.peek_byte(1) == 0x80 && matches!(self.peek_byte(2), 0xA8 | 0xA9),
            _ => false,
        }
    }

    fn make_token(&self, kind: TokenKind, had_newline_before: bool) -> Token {
        Token::new(
            kind,
            Span::new(self.token_start as u32, self.pos as u32),
            had_newline_before,
        )
    }

    fn slice(&self, start: usize, end: usize) -> &'a str {
        self.source.get(start..end).unwrap_or("")
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::syntax(
            message,
            Span::new(self.token_start as u32, self.pos.max(self.token_start) as u32),
        )
    }

    // === Whitespace and comments ===

    /// Skip trivia, reporting whether a line terminator was crossed.
    fn skip_whitespace_and_comments(&mut self) -> Result<bool> {
        let mut newline = false;
        loop {
            if self.at_line_terminator() {
                newline = true;
                self.advance_char();
                continue;
            }
            match self.current() {
                b' ' | b'\t' | 0x0B | 0x0C => self.advance(),
                b'/' if self.peek_byte(1) == b'/' => {
                    while !self.is_eof() && !self.at_line_terminator() {
                        self.advance_char();
                    }
                }
                b'/' if self.peek_byte(1) == b'*' => {
                    self.token_start = self.pos;
                    self.pos += 2;
                    loop {
                        if self.is_eof() {
                            return Err(
                                self.error("Expected \"*/\" to terminate multi-line comment")
                            );
                        }
                        if self.current() == b'*' && self.peek_byte(1) == b'/' {
                            self.pos += 2;
                            break;
                        }
                        if self.at_line_terminator() {
                            newline = true;
                        }
                        self.advance_char();
                    }
                }
                0xC2 if self.peek_byte(1) == 0xA0 => self.pos += 2,
                0xEF if self.peek_byte(1) == 0xBB && self.peek_byte(2) == 0xBF => self.pos += 3,
                _ => break,
            }
        }
        Ok(newline)
    }

    // === Identifiers and keywords ===

    fn scan_identifier(&mut self) -> TokenKind {
        let start = self.pos;
        self.advance_char();
        while !self.is_eof() && is_identifier_part(self.current_char()) {
            self.advance_char();
        }
        let text = self.slice(start, self.pos);
        keyword_from_str(text).unwrap_or_else(|| TokenKind::Identifier(text.to_string()))
    }

    fn scan_private_name(&mut self) -> Result<TokenKind> {
        self.advance();
        if self.is_eof() || !is_identifier_start(self.current_char()) {
            return Err(self.error("Unexpected \"#\""));
        }
        let start = self.pos;
        while !self.is_eof() && is_identifier_part(self.current_char()) {
            self.advance_char();
        }
        Ok(TokenKind::PrivateName(self.slice(start, self.pos).to_string()))
    }

    // === Numbers ===

    fn scan_number(&mut self) -> Result<TokenKind> {
        let start = self.pos;
        if self.current() == b'0' {
            let radix = match self.peek_byte(1) {
                b'x' | b'X' => Some(16),
                b'b' | b'B' => Some(2),
                b'o' | b'O' => Some(8),
                _ => None,
            };
            if let Some(radix) = radix {
                self.pos += 2;
                return self.scan_radix_number(start, radix);
            }
        }

        let mut digits = String::new();
        self.scan_decimal_digits(&mut digits);
        if self.current() == b'n' {
            self.advance();
            self.check_number_end()?;
            return Ok(TokenKind::BigInt(digits));
        }
        if self.current() == b'.' {
            digits.push('.');
            self.advance();
            self.scan_decimal_digits(&mut digits);
        }
        self.scan_exponent(&mut digits)?;
        self.check_number_end()?;
        digits
            .parse::<f64>()
            .map(TokenKind::Number)
            .map_err(|_| self.error("Invalid number"))
    }

    /// Scan a number that starts with `.` (the dot is the current byte).
    fn scan_fraction(&mut self) -> Result<TokenKind> {
        let mut digits = String::from("0.");
        self.advance();
        self.scan_decimal_digits(&mut digits);
        self.scan_exponent(&mut digits)?;
        self.check_number_end()?;
        digits
            .parse::<f64>()
            .map(TokenKind::Number)
            .map_err(|_| self.error("Invalid number"))
    }

    fn scan_decimal_digits(&mut self, out: &mut String) {
        while matches!(self.current(), b'0'..=b'9' | b'_') {
            if self.current() != b'_' {
                out.push(self.current() as char);
            }
            self.advance();
        }
    }

    fn scan_exponent(&mut self, out: &mut String) -> Result<()> {
        if matches!(self.current(), b'e' | b'E') {
            out.push('e');
            self.advance();
            if matches!(self.current(), b'+' | b'-') {
                out.push(self.current() as char);
                self.advance();
            }
            if !self.current().is_ascii_digit() {
                return Err(self.error("Invalid number"));
            }
            self.scan_decimal_digits(out);
        }
        Ok(())
    }

    fn scan_radix_number(&mut self, start: usize, radix: u32) -> Result<TokenKind> {
        let mut value = 0f64;
        let mut count = 0;
        loop {
            let c = self.current();
            if c == b'_' {
                self.advance();
                continue;
            }
            match (c as char).to_digit(radix) {
                Some(d) => {
                    value = value * f64::from(radix) + f64::from(d);
                    count += 1;
                    self.advance();
                }
                None => break,
            }
        }
        if count == 0 {
            return Err(self.error("Invalid number"));
        }
        if self.current() == b'n' {
            self.advance();
            self.check_number_end()?;
            return Ok(TokenKind::BigInt(self.slice(start, self.pos - 1).to_string()));
        }
        self.check_number_end()?;
        Ok(TokenKind::Number(value))
    }

    /// An identifier character directly after a number literal is an error.
    fn check_number_end(&self) -> Result<()> {
        if !self.is_eof() && is_identifier_start(self.current_char()) {
            return Err(self.error("Invalid number"));
        }
        Ok(())
    }

    // === Strings and templates ===

    fn scan_string(&mut self, quote: u8) -> Result<TokenKind> {
        self.advance();
        let mut value = String::new();
        loop {
            if self.is_eof() || matches!(self.current(), b'\n' | b'\r') {
                return Err(self.error("Unterminated string literal"));
            }
            match self.current() {
                c if c == quote => {
                    self.advance();
                    break;
                }
                b'\\' => {
                    self.advance();
                    self.scan_escape_sequence(&mut value)?;
                }
                _ => {
                    value.push(self.current_char());
                    self.advance_char();
                }
            }
        }
        Ok(TokenKind::String(value))
    }

    /// Decode one escape sequence; the backslash is already consumed.
    fn scan_escape_sequence(&mut self, out: &mut String) -> Result<()> {
        if self.is_eof() {
            return Err(self.error("Unterminated string literal"));
        }
        if self.at_line_terminator() {
            // Line continuation
            if self.current() == b'\r' && self.peek_byte(1) == b'\n' {
                self.advance();
            }
            self.advance_char();
            return Ok(());
        }
        let c = self.current();
        match c {
            b'n' => out.push('\n'),
            b't' => out.push('\t'),
            b'r' => out.push('\r'),
            b'b' => out.push('\u{8}'),
            b'f' => out.push('\u{c}'),
            b'v' => out.push('\u{b}'),
            b'0' if !self.peek_byte(1).is_ascii_digit() => out.push('\0'),
            b'x' => {
                self.advance();
                let code = self.scan_hex_digits(2)?;
                out.push(char::from_u32(code).unwrap_or('\u{fffd}'));
                return Ok(());
            }
            b'u' => {
                self.advance();
                let code = self.scan_unicode_escape()?;
                // Combine a surrogate pair written as two escapes
                if (0xD800..0xDC00).contains(&code)
                    && self.current() == b'\\'
                    && self.peek_byte(1) == b'u'
                {
                    let saved = self.pos;
                    self.pos += 2;
                    let low = self.scan_unicode_escape()?;
                    if (0xDC00..0xE000).contains(&low) {
                        let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                        out.push(char::from_u32(combined).unwrap_or('\u{fffd}'));
                        return Ok(());
                    }
                    self.pos = saved;
                }
                out.push(char::from_u32(code).unwrap_or('\u{fffd}'));
                return Ok(());
            }
            _ => {
                out.push(self.current_char());
                self.advance_char();
                return Ok(());
            }
        }
        self.advance();
        Ok(())
    }

    fn scan_unicode_escape(&mut self) -> Result<u32> {
        if self.current() == b'{' {
            self.advance();
            let start = self.pos;
            while self.current().is_ascii_hexdigit() {
                self.advance();
            }
            let code = u32::from_str_radix(self.slice(start, self.pos), 16)
                .map_err(|_| self.error("Invalid escape sequence"))?;
            if self.current() != b'}' || code > 0x10FFFF {
                return Err(self.error("Invalid escape sequence"));
            }
            self.advance();
            Ok(code)
        } else {
            self.scan_hex_digits(4)
        }
    }

    fn scan_hex_digits(&mut self, len: usize) -> Result<u32> {
        let start = self.pos;
        for _ in 0..len {
            if !self.current().is_ascii_hexdigit() {
                return Err(self.error("Invalid escape sequence"));
            }
            self.advance();
        }
        u32::from_str_radix(self.slice(start, self.pos), 16)
            .map_err(|_| self.error("Invalid escape sequence"))
    }

    /// Scan template text up to `` ` `` or `${`. The opening `` ` `` or `}`
    /// has already been consumed; `head` says which one it was.
    fn scan_template_part(&mut self, head: bool) -> Result<TokenKind> {
        let start = self.pos;
        loop {
            if self.is_eof() {
                return Err(self.error("Unterminated template literal"));
            }
            match self.current() {
                b'`' => {
                    let raw = self.slice(start, self.pos).to_string();
                    self.advance();
                    return Ok(if head {
                        TokenKind::TemplateNoSub(raw)
                    } else {
                        TokenKind::TemplateTail(raw)
                    });
                }
                b'$' if self.peek_byte(1) == b'{' => {
                    let raw = self.slice(start, self.pos).to_string();
                    self.pos += 2;
                    return Ok(if head {
                        TokenKind::TemplateHead(raw)
                    } else {
                        TokenKind::TemplateMiddle(raw)
                    });
                }
                b'\\' => {
                    self.advance();
                    if !self.is_eof() {
                        self.advance_char();
                    }
                }
                _ => self.advance_char(),
            }
        }
    }

    // === Punctuation and operators ===

    fn scan_dot(&mut self) -> Result<TokenKind> {
        if self.peek_byte(1).is_ascii_digit() {
            return self.scan_fraction();
        }
        self.advance();
        if self.current() == b'.' && self.peek_byte(1) == b'.' {
            self.pos += 2;
            Ok(TokenKind::DotDotDot)
        } else {
            Ok(TokenKind::Dot)
        }
    }

    fn scan_question(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'?' => {
                self.advance();
                if self.current() == b'=' {
                    self.advance();
                    TokenKind::QuestionQuestionEq
                } else {
                    TokenKind::QuestionQuestion
                }
            }
            // "a?.5:b" is a conditional, not an optional chain
            b'.' if !self.peek_byte(1).is_ascii_digit() => {
                self.advance();
                TokenKind::QuestionDot
            }
            _ => TokenKind::Question,
        }
    }

    fn scan_plus(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'+' => self.single(TokenKind::PlusPlus),
            b'=' => self.single(TokenKind::PlusEq),
            _ => TokenKind::Plus,
        }
    }

    fn scan_minus(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'-' => self.single(TokenKind::MinusMinus),
            b'=' => self.single(TokenKind::MinusEq),
            _ => TokenKind::Minus,
        }
    }

    fn scan_star(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'*' => {
                self.advance();
                if self.current() == b'=' {
                    self.single(TokenKind::StarStarEq)
                } else {
                    TokenKind::StarStar
                }
            }
            b'=' => self.single(TokenKind::StarEq),
            _ => TokenKind::Star,
        }
    }

    fn scan_slash(&mut self) -> TokenKind {
        self.advance();
        if self.current() == b'=' {
            self.single(TokenKind::SlashEq)
        } else {
            TokenKind::Slash
        }
    }

    fn scan_percent(&mut self) -> TokenKind {
        self.advance();
        if self.current() == b'=' {
            self.single(TokenKind::PercentEq)
        } else {
            TokenKind::Percent
        }
    }

    fn scan_equals(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'=' => {
                self.advance();
                if self.current() == b'=' {
                    self.single(TokenKind::EqEqEq)
                } else {
                    TokenKind::EqEq
                }
            }
            b'>' => self.single(TokenKind::Arrow),
            _ => TokenKind::Eq,
        }
    }

    fn scan_bang(&mut self) -> TokenKind {
        self.advance();
        if self.current() == b'=' {
            self.advance();
            if self.current() == b'=' {
                self.single(TokenKind::BangEqEq)
            } else {
                TokenKind::BangEq
            }
        } else {
            TokenKind::Bang
        }
    }

    fn scan_less_than(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'<' => {
                self.advance();
                if self.current() == b'=' {
                    self.single(TokenKind::LtLtEq)
                } else {
                    TokenKind::LtLt
                }
            }
            b'=' => self.single(TokenKind::LtEq),
            _ => TokenKind::Lt,
        }
    }

    fn scan_greater_than(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'>' => {
                self.advance();
                match self.current() {
                    b'>' => {
                        self.advance();
                        if self.current() == b'=' {
                            self.single(TokenKind::GtGtGtEq)
                        } else {
                            TokenKind::GtGtGt
                        }
                    }
                    b'=' => self.single(TokenKind::GtGtEq),
                    _ => TokenKind::GtGt,
                }
            }
            b'=' => self.single(TokenKind::GtEq),
            _ => TokenKind::Gt,
        }
    }

    fn scan_ampersand(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'&' => {
                self.advance();
                if self.current() == b'=' {
                    self.single(TokenKind::AmpAmpEq)
                } else {
                    TokenKind::AmpAmp
                }
            }
            b'=' => self.single(TokenKind::AmpEq),
            _ => TokenKind::Amp,
        }
    }

    fn scan_pipe(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'|' => {
                self.advance();
                if self.current() == b'=' {
                    self.single(TokenKind::PipePipeEq)
                } else {
                    TokenKind::PipePipe
                }
            }
            b'=' => self.single(TokenKind::PipeEq),
            _ => TokenKind::Pipe,
        }
    }

    fn scan_caret(&mut self) -> TokenKind {
        self.advance();
        if self.current() == b'=' {
            self.single(TokenKind::CaretEq)
        } else {
            TokenKind::Caret
        }
    }
}

/// Check if a character can start an identifier.
pub fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$' || (!c.is_ascii() && c.is_alphabetic())
}

/// Check if a character can continue an identifier.
pub fn is_identifier_part(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c == '_'
        || c == '$'
        || c == '\u{200c}'
        || c == '\u{200d}'
        || (!c.is_ascii() && c.is_alphanumeric())
}

/// Check if a whole string is a valid identifier name.
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if is_identifier_start(c) => chars.all(is_identifier_part),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token().unwrap();
            if matches!(token.kind, TokenKind::Eof) {
                break;
            }
            tokens.push(token.kind);
        }
        tokens
    }

    #[test]
    fn test_identifiers_and_contextual_words() {
        assert_eq!(
            tokenize("foo namespace type $qux"),
            vec![
                TokenKind::Identifier("foo".into()),
                TokenKind::Identifier("namespace".into()),
                TokenKind::Identifier("type".into()),
                TokenKind::Identifier("$qux".into()),
            ]
        );
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            tokenize("const enum function"),
            vec![TokenKind::Const, TokenKind::Enum, TokenKind::Function]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            tokenize("42 3.14 0xff 0b101 0o77 1_000 .5 1e3 10n"),
            vec![
                TokenKind::Number(42.0),
                TokenKind::Number(3.14),
                TokenKind::Number(255.0),
                TokenKind::Number(5.0),
                TokenKind::Number(63.0),
                TokenKind::Number(1000.0),
                TokenKind::Number(0.5),
                TokenKind::Number(1000.0),
                TokenKind::BigInt("10".into()),
            ]
        );
    }

    #[test]
    fn test_invalid_number() {
        let mut lexer = Lexer::new("3in");
        assert!(lexer.next_token().is_err());
    }

    #[test]
    fn test_strings_with_escapes() {
        assert_eq!(
            tokenize(r#""a\nb" 'it\'s' "\u{1F600}" "\x41""#),
            vec![
                TokenKind::String("a\nb".into()),
                TokenKind::String("it's".into()),
                TokenKind::String("\u{1F600}".into()),
                TokenKind::String("A".into()),
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let mut lexer = Lexer::new("'abc\n'");
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.message, "Unterminated string literal");
    }

    #[test]
    fn test_newline_flag() {
        let mut lexer = Lexer::new("a /* x\n */ b c");
        assert!(!lexer.next_token().unwrap().had_newline_before);
        assert!(lexer.next_token().unwrap().had_newline_before);
        assert!(!lexer.next_token().unwrap().had_newline_before);
    }

    #[test]
    fn test_template_rescan() {
        let mut lexer = Lexer::new("`a${x}b${y}c`");
        assert_eq!(
            lexer.next_token().unwrap().kind,
            TokenKind::TemplateHead("a".into())
        );
        assert_eq!(
            lexer.next_token().unwrap().kind,
            TokenKind::Identifier("x".into())
        );
        let brace = lexer.next_token().unwrap();
        assert_eq!(brace.kind, TokenKind::RBrace);
        let middle = lexer
            .rescan_template_continuation(brace.span.start as usize, false)
            .unwrap();
        assert_eq!(middle.kind, TokenKind::TemplateMiddle("b".into()));
        lexer.next_token().unwrap();
        let brace = lexer.next_token().unwrap();
        let tail = lexer
            .rescan_template_continuation(brace.span.start as usize, false)
            .unwrap();
        assert_eq!(tail.kind, TokenKind::TemplateTail("c".into()));
    }

    #[test]
    fn test_regex_rescan() {
        let mut lexer = Lexer::new("/[/]a\\//gi;");
        let slash = lexer.next_token().unwrap();
        assert_eq!(slash.kind, TokenKind::Slash);
        let regex = lexer.rescan_regex(slash.span.start as usize, false).unwrap();
        assert_eq!(
            regex.kind,
            TokenKind::Regex {
                pattern: "[/]a\\/".into(),
                flags: "gi".into()
            }
        );
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Semicolon);
    }

    #[test]
    fn test_split_greater_than() {
        let mut lexer = Lexer::new("a>>=b");
        lexer.next_token().unwrap();
        let op = lexer.next_token().unwrap();
        assert_eq!(op.kind, TokenKind::GtGtEq);
        lexer.reset_to(op.span.start as usize + 1);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::GtEq);
    }

    #[test]
    fn test_optional_chain_vs_conditional() {
        assert_eq!(
            tokenize("a?.b c?.5:d"),
            vec![
                TokenKind::Identifier("a".into()),
                TokenKind::QuestionDot,
                TokenKind::Identifier("b".into()),
                TokenKind::Identifier("c".into()),
                TokenKind::Question,
                TokenKind::Number(0.5),
                TokenKind::Colon,
                TokenKind::Identifier("d".into()),
            ]
        );
    }

    #[test]
    fn test_private_name_and_hashbang() {
        assert_eq!(
            tokenize("#!/usr/bin/env node\nthis.#x"),
            vec![
                TokenKind::This,
                TokenKind::Dot,
                TokenKind::PrivateName("x".into()),
            ]
        );
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("foo"));
        assert!(is_identifier("_1"));
        assert!(is_identifier("ünï"));
        assert!(!is_identifier("1a"));
        assert!(!is_identifier("a-b"));
        assert!(!is_identifier(""));
    }
}
