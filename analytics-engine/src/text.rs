//! Title tokenizer shared by theme extraction and deep-analytics keywords.

use std::collections::HashMap;

pub const MIN_TOKEN_LEN: usize = 3;

const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "aren", "as", "at", "be", "because", "been", "before", "being", "below", "between",
    "both", "but", "by", "can", "cannot", "could", "did", "didn", "do", "does", "doesn", "doing",
    "don", "down", "during", "each", "even", "ever", "every", "few", "for", "from", "further",
    "get", "gets", "got", "had", "has", "have", "having", "he", "her", "here", "hers", "him",
    "his", "how", "i", "if", "in", "into", "is", "isn", "it", "its", "itself", "just", "let",
    "like", "made", "make", "many", "may", "me", "might", "more", "most", "much", "must", "my",
    "need", "new", "no", "nor", "not", "now", "of", "off", "on", "once", "one", "only", "or",
    "other", "our", "ours", "out", "over", "own", "really", "same", "she", "should", "so",
    "some", "still", "such", "than", "that", "the", "their", "theirs", "them", "then", "there",
    "these", "they", "thing", "things", "this", "those", "through", "to", "too", "under",
    "until", "up", "use", "using", "very", "via", "want", "was", "wasn", "way", "we", "well",
    "were", "what", "when", "where", "which", "while", "who", "whom", "why", "will", "with",
    "won", "would", "yes", "yet", "you", "your", "yours",
];

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}

/// Lower-cases, splits on anything that is not alphanumeric, and drops
/// stopwords and tokens shorter than [`MIN_TOKEN_LEN`]. No stemming.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN && !is_stopword(t))
        .map(str::to_string)
        .collect()
}

/// Most frequent tokens across `texts`, count descending. Ties break on
/// the token itself so the output is deterministic.
pub fn top_terms<'a, I>(texts: I, limit: usize) -> Vec<(String, u32)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<String, u32> = HashMap::new();
    for text in texts {
        for token in tokenize(text) {
            *counts.entry(token).or_insert(0) += 1;
        }
    }

    let mut terms: Vec<(String, u32)> = counts.into_iter().collect();
    terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    terms.truncate(limit);
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_drops_stopwords_and_short_tokens() {
        let tokens = tokenize("How I got my first 10 SaaS customers on Reddit!");
        assert_eq!(tokens, vec!["first", "saas", "customers", "reddit"]);
    }

    #[test]
    fn test_tokenize_splits_on_punctuation() {
        assert_eq!(
            tokenize("rust-lang/async_await: what's new?"),
            vec!["rust", "lang", "async", "await"]
        );
    }

    #[test]
    fn test_top_terms_never_yields_stopwords_or_short_tokens() {
        let titles = [
            "The best way to market a product",
            "Is it the best time to launch?",
            "Launch checklist for the product",
            "AI is on fire",
        ];
        let terms = top_terms(titles.iter().copied(), 20);
        assert!(!terms.is_empty());
        for (term, _) in &terms {
            assert!(term.len() >= MIN_TOKEN_LEN, "short token {term}");
            assert!(!is_stopword(term), "stopword {term}");
        }
        assert_eq!(terms[0], ("best".to_string(), 2));
        assert_eq!(terms[1], ("launch".to_string(), 2));
        assert_eq!(terms[2], ("product".to_string(), 2));
    }

    #[test]
    fn test_top_terms_respects_limit() {
        let titles = ["alpha beta gamma delta epsilon"];
        assert_eq!(top_terms(titles.iter().copied(), 4).len(), 4);
    }
}
