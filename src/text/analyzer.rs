//! The analyzer pipeline shared by indexing and querying (content,
//! book_title_search), registered on the index under [`ANALYZER_NAME`].
//!
//! A single custom [`Tokenizer`] implements all four pipeline steps from the
//! specification (markup stripping, word tokenization, lowercase folding,
//! per-term diacritic removal) rather than composing tantivy's built-in
//! filters, because the diacritic-removal step has no off-the-shelf
//! equivalent and pre-computing the whole token vector up front (the same
//! shape used by `socket23-sidecar`'s `CodeSnippetTokenizer`) keeps the
//! `TokenStream` implementation trivial.

use tantivy::tokenizer::{Token, TokenStream, Tokenizer};

use crate::text::{remove_diacritics, strip_markup};

/// Name under which this analyzer is registered with the index's
/// `TokenizerManager`. Both indexing and querying resolve the same name.
pub const ANALYZER_NAME: &str = "otzar_he";

/// Tokenizer implementing the Hebrew analyzer pipeline (spec §4.2).
#[derive(Clone, Default)]
pub struct HebrewAnalyzer;

/// Streaming cursor over the tokens precomputed by [`HebrewAnalyzer`].
pub struct HebrewTokenStream {
    tokens: Vec<Token>,
    position: usize,
}

impl Tokenizer for HebrewAnalyzer {
    type TokenStream<'a> = HebrewTokenStream;

    fn token_stream<'a>(&'a mut self, text: &'a str) -> Self::TokenStream<'a> {
        HebrewTokenStream {
            tokens: tokenize(text),
            position: usize::MAX,
        }
    }
}

impl TokenStream for HebrewTokenStream {
    fn advance(&mut self) -> bool {
        self.position = match self.position {
            usize::MAX => 0,
            p => p + 1,
        };
        self.position < self.tokens.len()
    }

    fn token(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn token_mut(&mut self) -> &mut Token {
        &mut self.tokens[self.position]
    }
}

/// Run the full pipeline over `text` and return the emitted terms, with
/// byte offsets measured against the markup-stripped text.
fn tokenize(text: &str) -> Vec<Token> {
    let stripped = strip_markup(text);

    let mut tokens = Vec::new();
    let mut position = 0usize;
    let mut chars = stripped.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if !c.is_alphanumeric() {
            chars.next();
            continue;
        }

        let mut end = start + c.len_utf8();
        chars.next();
        while let Some(&(idx, c)) = chars.peek() {
            if c.is_alphanumeric() {
                end = idx + c.len_utf8();
                chars.next();
            } else {
                break;
            }
        }

        let raw = &stripped[start..end];
        let lowered = raw.to_lowercase();
        let term = remove_diacritics(&lowered);
        if term.is_empty() {
            continue;
        }

        tokens.push(Token {
            offset_from: start,
            offset_to: end,
            position,
            text: term,
            position_length: 1,
        });
        position += 1;
    }

    tokens
}
