use rust_stemmers::Stemmer;
use crate::analysis::filter::TokenFilter;
use crate::analysis::language::Language;
use crate::analysis::token::Token;

/// Snowball stemming for the analyzer's language
pub struct StemmerFilter {
    stemmer: Stemmer,
}

impl StemmerFilter {
    pub fn new(language: Language) -> Self {
        StemmerFilter {
            stemmer: Stemmer::create(language.algorithm()),
        }
    }
}

impl TokenFilter for StemmerFilter {
    fn filter(&self, tokens: Vec<Token>) -> Vec<Token> {
        tokens.into_iter()
            .map(|mut token| {
                token.text = self.stemmer.stem(&token.text).into_owned();
                token
            })
            .collect()
    }

    fn name(&self) -> &str {
        "stemmer"
    }
}
