use std::collections::HashSet;
use crate::analysis::filter::TokenFilter;
use crate::analysis::language::Language;
use crate::analysis::token::Token;

const ENGLISH: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for",
    "from", "has", "he", "in", "is", "it", "its", "of", "on",
    "or", "that", "the", "to", "was", "will", "with",
];

const RUSSIAN: &[&str] = &[
    "а", "в", "во", "да", "для", "до", "же", "за", "и", "из",
    "или", "к", "ко", "как", "на", "не", "но", "о", "об", "от",
    "по", "при", "с", "со", "то", "у", "что",
];

pub struct StopWordFilter {
    pub stop_words: HashSet<String>,
}

impl StopWordFilter {
    pub fn new(stop_words: &[&str]) -> Self {
        StopWordFilter {
            stop_words: stop_words.iter().map(|word| word.to_string()).collect(),
        }
    }

    pub fn for_language(language: Language) -> Self {
        match language {
            Language::English => Self::new(ENGLISH),
            Language::Russian => Self::new(RUSSIAN),
        }
    }
}

impl TokenFilter for StopWordFilter {
    fn filter(&self, tokens: Vec<Token>) -> Vec<Token> {
        tokens.into_iter()
            .filter(|token| !self.stop_words.contains(&token.text))
            .collect()
    }

    fn name(&self) -> &str {
        "stop_words"
    }
}
