use std::collections::HashSet;

use indicium::simple::SearchIndex;
use strsim::levenshtein;

/// Fuzzy lookup of noisy recognised text against the card names of the active set.
pub struct CardMatcher {
    index: SearchIndex<String>,
    tokens: HashSet<String>,
}

impl CardMatcher {
    pub fn new(names: &[String]) -> Self {
        let index = names
            .iter()
            .fold(SearchIndex::default(), |mut acc, name| {
                acc.insert(name, name);
                acc
            });

        let tokens = names
            .iter()
            .flat_map(|name| name.split_whitespace())
            .map(|token| token.to_string())
            .collect();

        CardMatcher { index, tokens }
    }

    /// One card name per line that could be resolved, in input order, without repeats.
    pub fn find_matches(&self, texts: &[&str]) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for text in texts {
            if let Some(name) = self.find_line(text) {
                if !found.contains(&name) {
                    found.push(name);
                }
            }
        }
        found
    }

    fn find_line(&self, text: &str) -> Option<String> {
        let text = preprocess_text(text);
        if text.trim().is_empty() {
            return None;
        }

        self.find_card(&text).or_else(|| {
            let corrected = text
                .split_whitespace()
                .map(|word| correct_word(word, &self.tokens))
                .collect::<Vec<String>>()
                .join(" ");
            self.find_card(&corrected)
        })
    }

    fn find_card(&self, text: &str) -> Option<String> {
        let results = self.index.search(text);
        match results.len() {
            0 => None,
            1 => Some(results[0].clone()),
            // several hits: take the closest spelling
            _ => results
                .iter()
                .map(|res| (res, levenshtein(text, res)))
                .min_by_key(|(_, dist)| *dist)
                .map(|(res, _)| (*res).clone()),
        }
    }
}

fn preprocess_text(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == ',' || *c == '\'' || *c == '-')
        .collect()
}

fn correct_word(word: &str, dictionary: &HashSet<String>) -> String {
    if dictionary.contains(word) {
        return word.to_string();
    }

    dictionary
        .iter()
        .map(|dict_word| (levenshtein(word, dict_word), dict_word))
        .min_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)))
        .map(|(_, word)| word.to_string())
        .unwrap_or_default()
}
