use crate::analysis::filter::TokenFilter;
use crate::analysis::filters::lowercase::LowercaseFilter;
use crate::analysis::filters::stemmer::StemmerFilter;
use crate::analysis::filters::stopword::StopWordFilter;
use crate::analysis::language::Language;
use crate::analysis::token::Token;
use crate::analysis::tokenizer::{StandardTokenizer, Tokenizer};

/// Text analysis pipeline
pub struct Analyzer {
    pub tokenizer: Box<dyn Tokenizer>,
    pub filters: Vec<Box<dyn TokenFilter>>,
    pub language: Language,
}

impl Analyzer {
    pub fn new(language: Language, tokenizer: Box<dyn Tokenizer>) -> Self {
        Analyzer {
            tokenizer,
            filters: Vec::new(),
            language,
        }
    }

    pub fn add_filter(mut self, filter: Box<dyn TokenFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Standard chain for a language code: unicode words, lowercase,
    /// stop words, Snowball stemmer.
    pub fn for_language(code: &str) -> Self {
        let language = Language::from_code(code);
        Analyzer::new(language, Box::new(StandardTokenizer::default()))
            .add_filter(Box::new(LowercaseFilter))
            .add_filter(Box::new(StopWordFilter::for_language(language)))
            .add_filter(Box::new(StemmerFilter::new(language)))
    }

    pub fn analyze(&self, text: &str) -> Vec<Token> {
        let mut tokens = self.tokenizer.tokenize(text);

        for filter in &self.filters {
            tokens = filter.filter(tokens);
        }

        tokens
    }

    /// Analyzed term texts only.
    pub fn terms(&self, text: &str) -> Vec<String> {
        self.analyze(text).into_iter().map(|token| token.text).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_chain() {
        let analyzer = Analyzer::for_language("en");
        assert_eq!(analyzer.terms("The Running Dogs"), vec!["run", "dog"]);
    }

    #[test]
    fn test_russian_chain_stems_inflections() {
        let analyzer = Analyzer::for_language("ru");
        assert_eq!(analyzer.language, Language::Russian);
        assert_eq!(analyzer.terms("Война и мир"), analyzer.terms("войны мира"));
    }

    #[test]
    fn test_unknown_language_falls_back_to_english() {
        let analyzer = Analyzer::for_language("xx");
        assert_eq!(analyzer.language, Language::English);
        assert!(analyzer.terms("the").is_empty());
    }
}
