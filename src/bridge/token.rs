//! Flat token stream over a [`Document`] and a cursor to walk it.

use serde::de::DeserializeOwned;

use super::de::TokenError;
use super::document::Document;

/// One token of a flattened document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    StartObject,
    PropertyName(String),
    Value(Option<String>),
    EndObject,
    StartArray,
    EndArray,
}

/// Flattens a document depth first.
pub fn tokenize(document: &Document) -> Vec<Token> {
    let mut tokens = Vec::new();
    push_tokens(document, &mut tokens);
    tokens
}

fn push_tokens(document: &Document, tokens: &mut Vec<Token>) {
    match document {
        Document::Object(properties) => {
            tokens.push(Token::StartObject);
            for (name, value) in properties {
                tokens.push(Token::PropertyName(name.clone()));
                push_tokens(value, tokens);
            }
            tokens.push(Token::EndObject);
        }
        Document::Array(items) => {
            tokens.push(Token::StartArray);
            for item in items {
                push_tokens(item, tokens);
            }
            tokens.push(Token::EndArray);
        }
        Document::Scalar(value) => tokens.push(Token::Value(value.clone())),
    }
}

/// A forward-only cursor over tokens.
///
/// The cursor starts before the first token; [`read`](Self::read) moves it
/// onto the next one. Consumers handed a reader positioned on a value leave it
/// on the last token of that value.
#[derive(Debug, Clone)]
pub struct TokenReader {
    tokens: Vec<Token>,
    next: usize,
}

impl TokenReader {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, next: 0 }
    }

    pub fn from_document(document: &Document) -> Self {
        Self::new(tokenize(document))
    }

    /// Advances to the next token; `false` once the stream is exhausted.
    pub fn read(&mut self) -> bool {
        if self.next < self.tokens.len() {
            self.next += 1;
            true
        } else {
            false
        }
    }

    /// The token under the cursor.
    pub fn current(&self) -> Option<&Token> {
        self.next.checked_sub(1).and_then(|index| self.tokens.get(index))
    }

    /// The text of the current property name or scalar.
    pub fn text(&self) -> Option<&str> {
        match self.current()? {
            Token::PropertyName(name) => Some(name),
            Token::Value(value) => value.as_deref(),
            _ => None,
        }
    }

    /// Nesting depth of the current token, counting enclosing containers.
    pub fn depth(&self) -> usize {
        let end = self.next.saturating_sub(1);
        let mut depth: usize = 0;
        for token in &self.tokens[..end.min(self.tokens.len())] {
            match token {
                Token::StartObject | Token::StartArray => depth += 1,
                Token::EndObject | Token::EndArray => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
        depth
    }

    /// Moves past the value under the cursor, leaving the cursor on its last
    /// token. On a property name, the property's value is skipped too.
    pub fn skip(&mut self) {
        if matches!(self.current(), Some(Token::PropertyName(_))) {
            self.read();
        }
        let mut open: usize = 0;
        loop {
            match self.current() {
                Some(Token::StartObject | Token::StartArray) => open += 1,
                Some(Token::EndObject | Token::EndArray) => open = open.saturating_sub(1),
                _ => {}
            }
            if open == 0 || !self.read() {
                return;
            }
        }
    }

    /// Deserializes the value under the cursor.
    pub fn deserialize<T: DeserializeOwned>(&mut self) -> Result<T, TokenError> {
        T::deserialize(&mut *self)
    }
}
