//! Tolerant recursive-descent parser for JSON with comments.
//!
//! [`parse`] never fails: malformed input produces a best-effort partial
//! tree plus collected [`ParseError`]s. `//` and `/* */` comments are
//! accepted silently; structural mistakes (missing colons, trailing commas,
//! unterminated strings) are recorded and recovered from so that the rest
//! of the document still parses.

use crate::node::{JsonTree, NodeId, NodeKind};

/// A syntax error with position information.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at offset {offset}")]
pub struct ParseError {
    /// Error message
    pub message: String,
    /// Byte offset where the error occurred
    pub offset: usize,
    /// Byte length of the offending text (may be zero)
    pub len: usize,
}

/// Result of parsing a file.
#[derive(Debug, Clone)]
pub struct Parse {
    /// Best-effort tree; `tree.root()` is `None` only when the text holds
    /// no value at all.
    pub tree: JsonTree,
    /// Syntax errors only, not semantic validation.
    pub errors: Vec<ParseError>,
}

impl Parse {
    /// Returns `true` if the text parsed without any syntax errors.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse JSONC text into a [`JsonTree`].
#[must_use]
pub fn parse(text: &str) -> Parse {
    let (tokens, mut errors) = tokenize(text);
    let mut parser = Parser {
        tree: JsonTree {
            text: text.to_string(),
            nodes: Vec::new(),
            root: None,
        },
        tokens,
        pos: 0,
        errors: Vec::new(),
        text_len: text.len(),
    };
    parser.parse_document();
    errors.append(&mut parser.errors);
    errors.sort_by_key(|e| e.offset);
    tracing::trace!(errors = errors.len(), "parsed JSONC document");
    Parse {
        tree: parser.tree,
        errors,
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Colon,
    Comma,
    String { value: String },
    Number { value: f64 },
    True,
    False,
    Null,
    /// Anything the lexer could not classify (bare words, stray punctuation).
    Unknown,
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    offset: usize,
    len: usize,
}

struct Parser {
    tree: JsonTree,
    tokens: Vec<Token>,
    pos: usize,
    errors: Vec<ParseError>,
    text_len: usize,
}

impl Parser {
    fn parse_document(&mut self) {
        // Skip leading junk until something can start a value.
        while self.tree.root.is_none() {
            let Some(token) = self.peek() else { return };
            match token.kind {
                TokenKind::Colon | TokenKind::Comma | TokenKind::Unknown => {
                    let (offset, len) = (token.offset, token.len);
                    self.error("Invalid symbol", offset, len);
                    self.pos += 1;
                }
                _ => {
                    self.tree.root = self.parse_value();
                }
            }
        }
        if let Some(extra) = self.peek() {
            let (offset, len) = (extra.offset, extra.len);
            self.error("End of file expected", offset, len);
        }
    }

    fn parse_value(&mut self) -> Option<NodeId> {
        let token = self.peek()?.clone();
        match token.kind {
            TokenKind::LBrace => Some(self.parse_object(&token)),
            TokenKind::LBracket => Some(self.parse_array(&token)),
            TokenKind::String { ref value } => {
                self.pos += 1;
                Some(self.leaf(
                    NodeKind::String {
                        value: value.clone(),
                    },
                    &token,
                ))
            }
            TokenKind::Number { value } => {
                self.pos += 1;
                Some(self.leaf(NodeKind::Number { value }, &token))
            }
            TokenKind::True => {
                self.pos += 1;
                Some(self.leaf(NodeKind::Boolean { value: true }, &token))
            }
            TokenKind::False => {
                self.pos += 1;
                Some(self.leaf(NodeKind::Boolean { value: false }, &token))
            }
            TokenKind::Null => {
                self.pos += 1;
                Some(self.leaf(NodeKind::Null, &token))
            }
            _ => {
                self.error("Value expected", token.offset, token.len);
                self.pos += 1;
                None
            }
        }
    }

    fn parse_object(&mut self, open: &Token) -> NodeId {
        let object = self.tree.alloc(
            NodeKind::Object {
                properties: Vec::new(),
            },
            open.offset,
        );
        self.pos += 1;

        loop {
            let Some(token) = self.peek().cloned() else {
                self.error("Unexpected end of file", self.text_len, 0);
                self.tree.close(object, self.text_len);
                return object;
            };
            match token.kind {
                TokenKind::RBrace => {
                    self.pos += 1;
                    self.tree.close(object, token.offset + token.len);
                    return object;
                }
                TokenKind::Comma => {
                    self.error("Property expected", token.offset, token.len);
                    self.pos += 1;
                }
                TokenKind::String { ref value } => {
                    let key = self.leaf(
                        NodeKind::String {
                            value: value.clone(),
                        },
                        &token,
                    );
                    self.pos += 1;
                    let prop = self.parse_property(key, &token);
                    self.tree.push_child(object, prop);
                    if !self.separator_or_close(TokenKind::RBrace, "Expected ',' or '}'") {
                        self.tree.close(object, self.current_end());
                        return object;
                    }
                }
                _ => {
                    self.error("Property name expected", token.offset, token.len);
                    self.pos += 1;
                }
            }
        }
    }

    fn parse_property(&mut self, key: NodeId, key_token: &Token) -> NodeId {
        let prop = self.tree.alloc(
            NodeKind::Property { key, value: None },
            key_token.offset,
        );
        self.tree.set_parent(key, prop);
        let mut end = key_token.offset + key_token.len;

        match self.peek().cloned() {
            Some(token) if token.kind == TokenKind::Colon => {
                self.pos += 1;
                end = token.offset + token.len;
                match self.peek().cloned() {
                    Some(next)
                        if !matches!(
                            next.kind,
                            TokenKind::RBrace | TokenKind::RBracket | TokenKind::Comma
                        ) =>
                    {
                        if let Some(value) = self.parse_value() {
                            self.tree.push_child(prop, value);
                            end = self.tree.span(value).end;
                        }
                    }
                    _ => self.error("Value expected", end, 0),
                }
            }
            _ => self.error("Colon expected", end, 0),
        }

        self.tree.close(prop, end);
        prop
    }

    fn parse_array(&mut self, open: &Token) -> NodeId {
        let array = self
            .tree
            .alloc(NodeKind::Array { items: Vec::new() }, open.offset);
        self.pos += 1;

        loop {
            let Some(token) = self.peek().cloned() else {
                self.error("Unexpected end of file", self.text_len, 0);
                self.tree.close(array, self.text_len);
                return array;
            };
            match token.kind {
                TokenKind::RBracket => {
                    self.pos += 1;
                    self.tree.close(array, token.offset + token.len);
                    return array;
                }
                TokenKind::Comma => {
                    self.error("Value expected", token.offset, token.len);
                    self.pos += 1;
                }
                _ => {
                    if let Some(item) = self.parse_value() {
                        self.tree.push_child(array, item);
                    }
                    if !self.separator_or_close(TokenKind::RBracket, "Expected ',' or ']'") {
                        self.tree.close(array, self.current_end());
                        return array;
                    }
                }
            }
        }
    }

    /// After an element: consume a separating comma, or leave the closing
    /// token in place for the caller. Returns `false` when the container
    /// must be abandoned (end of input).
    fn separator_or_close(&mut self, close: TokenKind, message: &str) -> bool {
        match self.peek().cloned() {
            Some(token) if token.kind == TokenKind::Comma => {
                self.pos += 1;
                // A comma immediately followed by the closing token is a
                // trailing comma: tolerated, but reported.
                if let Some(next) = self.peek() {
                    if next.kind == close {
                        self.error("Trailing comma", token.offset, token.len);
                    }
                }
                true
            }
            Some(token) if token.kind == close => true,
            Some(token) => {
                self.error(message, token.offset, token.len);
                true
            }
            None => {
                self.error("Unexpected end of file", self.text_len, 0);
                false
            }
        }
    }

    fn leaf(&mut self, kind: NodeKind, token: &Token) -> NodeId {
        let id = self.tree.alloc(kind, token.offset);
        self.tree.close(id, token.offset + token.len);
        id
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn current_end(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or(self.text_len, |t| t.offset)
    }

    fn error(&mut self, message: &str, offset: usize, len: usize) {
        self.errors.push(ParseError {
            message: message.to_string(),
            offset,
            len,
        });
    }
}

fn tokenize(text: &str) -> (Vec<Token>, Vec<ParseError>) {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let start = i;
        match bytes[i] {
            b' ' | b'\t' | b'\r' | b'\n' => i += 1,
            b'{' => {
                tokens.push(token(TokenKind::LBrace, start, 1));
                i += 1;
            }
            b'}' => {
                tokens.push(token(TokenKind::RBrace, start, 1));
                i += 1;
            }
            b'[' => {
                tokens.push(token(TokenKind::LBracket, start, 1));
                i += 1;
            }
            b']' => {
                tokens.push(token(TokenKind::RBracket, start, 1));
                i += 1;
            }
            b':' => {
                tokens.push(token(TokenKind::Colon, start, 1));
                i += 1;
            }
            b',' => {
                tokens.push(token(TokenKind::Comma, start, 1));
                i += 1;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                let mut closed = false;
                while i < bytes.len() {
                    if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
                        i += 2;
                        closed = true;
                        break;
                    }
                    i += 1;
                }
                if !closed {
                    errors.push(ParseError {
                        message: "Unterminated comment".to_string(),
                        offset: start,
                        len: i - start,
                    });
                }
            }
            b'"' => {
                let (value, end, error) = scan_string(text, start);
                if let Some(message) = error {
                    errors.push(ParseError {
                        message,
                        offset: start,
                        len: end - start,
                    });
                }
                tokens.push(token(TokenKind::String { value }, start, end - start));
                i = end;
            }
            b'-' | b'0'..=b'9' => {
                let mut end = i + 1;
                while end < bytes.len()
                    && matches!(bytes[end], b'0'..=b'9' | b'.' | b'e' | b'E' | b'+' | b'-')
                {
                    end += 1;
                }
                let raw = &text[start..end];
                let value = match raw.parse::<f64>() {
                    Ok(value) => value,
                    Err(_) => {
                        errors.push(ParseError {
                            message: "Invalid number".to_string(),
                            offset: start,
                            len: end - start,
                        });
                        0.0
                    }
                };
                tokens.push(token(TokenKind::Number { value }, start, end - start));
                i = end;
            }
            _ => {
                // Bare word: keywords, or an unknown symbol to recover past.
                let mut end = i;
                while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_')
                {
                    end += 1;
                }
                if end == i {
                    end = i + char_len(text, i);
                }
                let kind = match &text[start..end] {
                    "true" => TokenKind::True,
                    "false" => TokenKind::False,
                    "null" => TokenKind::Null,
                    _ => TokenKind::Unknown,
                };
                tokens.push(token(kind, start, end - start));
                i = end;
            }
        }
    }

    (tokens, errors)
}

const fn token(kind: TokenKind, offset: usize, len: usize) -> Token {
    Token { kind, offset, len }
}

fn char_len(text: &str, offset: usize) -> usize {
    text[offset..].chars().next().map_or(1, char::len_utf8)
}

/// Scan a string literal starting at the opening quote. Returns the
/// unescaped value, the end offset (past the closing quote when present),
/// and an error message when the literal is malformed. Raw newlines
/// terminate the literal so the rest of the document still tokenizes.
fn scan_string(text: &str, start: usize) -> (String, usize, Option<String>) {
    let bytes = text.as_bytes();
    let mut value = String::new();
    let mut error = None;
    let mut i = start + 1;

    while i < bytes.len() {
        match bytes[i] {
            b'"' => return (value, i + 1, error),
            b'\n' => {
                return (value, i, Some("Unterminated string".to_string()));
            }
            b'\\' => {
                let Some(&escape) = bytes.get(i + 1) else {
                    return (value, i + 1, Some("Unterminated string".to_string()));
                };
                i += 2;
                match escape {
                    b'"' => value.push('"'),
                    b'\\' => value.push('\\'),
                    b'/' => value.push('/'),
                    b'b' => value.push('\u{0008}'),
                    b'f' => value.push('\u{000C}'),
                    b'n' => value.push('\n'),
                    b'r' => value.push('\r'),
                    b't' => value.push('\t'),
                    b'u' => {
                        if let Some(code) = scan_unicode_escape(text, &mut i) {
                            value.push(code);
                        } else {
                            error = Some("Invalid escape sequence".to_string());
                        }
                    }
                    _ => {
                        error = Some("Invalid escape sequence".to_string());
                    }
                }
            }
            _ => {
                let ch_len = char_len(text, i);
                value.push_str(&text[i..i + ch_len]);
                i += ch_len;
            }
        }
    }

    (value, bytes.len(), Some("Unterminated string".to_string()))
}

/// Scan the `XXXX` of a `\uXXXX` escape (cursor already past the `u`),
/// pairing surrogates when both halves are present.
fn scan_unicode_escape(text: &str, i: &mut usize) -> Option<char> {
    let high = scan_hex4(text, i)?;
    if (0xD800..0xDC00).contains(&high) {
        // High surrogate: require an immediately following \uXXXX low half.
        let bytes = text.as_bytes();
        if bytes.get(*i) == Some(&b'\\') && bytes.get(*i + 1) == Some(&b'u') {
            let mut j = *i + 2;
            if let Some(low) = scan_hex4(text, &mut j) {
                if (0xDC00..0xE000).contains(&low) {
                    *i = j;
                    let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                    return char::from_u32(code);
                }
            }
        }
        return None;
    }
    char::from_u32(high)
}

fn scan_hex4(text: &str, i: &mut usize) -> Option<u32> {
    let digits = text.get(*i..*i + 4)?;
    let code = u32::from_str_radix(digits, 16).ok()?;
    *i += 4;
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clean_document() {
        let parse = parse(r#"{"name": "test", "values": [1, 2.5, -3], "ok": true}"#);
        assert!(parse.is_clean());
        let tree = &parse.tree;
        let root = tree.root().unwrap();
        let values = tree.object_get(root, "values").unwrap();
        assert_eq!(tree.array_items(values).len(), 3);
        assert_eq!(tree.number_value(tree.array_items(values)[1]), Some(2.5));
    }

    #[test]
    fn test_comments_are_tolerated_silently() {
        let parse = parse(
            r#"{
  // line comment
  "name": "test", /* block comment */
  "count": 1
}"#,
        );
        assert!(parse.is_clean());
        let tree = &parse.tree;
        let root = tree.root().unwrap();
        assert_eq!(tree.object_properties(root).len(), 2);
    }

    #[test]
    fn test_trailing_comma_reported_but_parsed() {
        let parse = parse(r#"{"a": 1, "b": 2,}"#);
        assert_eq!(parse.errors.len(), 1);
        assert_eq!(parse.errors[0].message, "Trailing comma");
        let tree = &parse.tree;
        assert_eq!(tree.object_properties(tree.root().unwrap()).len(), 2);
    }

    #[test]
    fn test_missing_value_keeps_property() {
        let parse = parse(r#"{"a": , "b": 2}"#);
        assert!(!parse.is_clean());
        let tree = &parse.tree;
        let root = tree.root().unwrap();
        let a = tree.object_property(root, "a").unwrap();
        assert!(tree.property_value(a).is_none());
        assert!(tree.object_get(root, "b").is_some());
    }

    #[test]
    fn test_missing_colon_recovers() {
        let parse = parse(r#"{"a" 1, "b": 2}"#);
        assert!(parse
            .errors
            .iter()
            .any(|e| e.message == "Colon expected"));
        let tree = &parse.tree;
        assert!(tree.object_get(tree.root().unwrap(), "b").is_some());
    }

    #[test]
    fn test_unterminated_string_at_newline() {
        let parse = parse("{\"a\": \"oops\n}");
        assert!(parse
            .errors
            .iter()
            .any(|e| e.message == "Unterminated string"));
    }

    #[test]
    fn test_unclosed_object_partial_tree() {
        let parse = parse(r#"{"a": {"b": 1"#);
        assert!(parse
            .errors
            .iter()
            .any(|e| e.message == "Unexpected end of file"));
        let tree = &parse.tree;
        let root = tree.root().unwrap();
        let a = tree.object_get(root, "a").unwrap();
        assert!(tree.object_get(a, "b").is_some());
    }

    #[test]
    fn test_empty_input_has_no_root() {
        let parse = parse("   \n  ");
        assert!(parse.tree.root().is_none());
        assert!(parse.is_clean());
    }

    #[test]
    fn test_garbage_after_root() {
        let parse = parse(r#"{"a": 1} extra"#);
        assert!(parse
            .errors
            .iter()
            .any(|e| e.message == "End of file expected"));
        assert!(parse.tree.root().is_some());
    }

    #[test]
    fn test_escape_sequences() {
        let parse = parse(r#"{"s": "a\nb\t\"c\" A 😀"}"#);
        assert!(parse.is_clean());
        let tree = &parse.tree;
        let s = tree.object_get(tree.root().unwrap(), "s").unwrap();
        assert_eq!(tree.string_value(s), Some("a\nb\t\"c\" A 😀"));
    }

    #[test]
    fn test_invalid_escape_reported() {
        let parse = parse(r#"{"s": "a\qb"}"#);
        assert!(parse
            .errors
            .iter()
            .any(|e| e.message == "Invalid escape sequence"));
    }

    #[test]
    fn test_bare_word_value() {
        let parse = parse(r#"{"a": nope}"#);
        assert!(parse.errors.iter().any(|e| e.message == "Value expected"));
        let tree = &parse.tree;
        let a = tree.object_property(tree.root().unwrap(), "a").unwrap();
        assert!(tree.property_value(a).is_none());
    }

    #[test]
    fn test_array_root() {
        let parse = parse(r#"[{"x": 1}, null, "s"]"#);
        assert!(parse.is_clean());
        let tree = &parse.tree;
        assert_eq!(tree.array_items(tree.root().unwrap()).len(), 3);
    }
}
