//! Title feature extraction: normalized tokens and TF-IDF weighted vectors.

mod vectorizer;

pub use vectorizer::TitleMatrix;
pub(crate) use vectorizer::cosine;

/// English stopwords excluded from vocabulary and theme extraction.
const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "an", "and", "any", "are", "as", "at", "be", "been", "but", "by",
    "can", "did", "do", "does", "for", "from", "had", "has", "have", "he", "her", "his", "how",
    "if", "in", "into", "is", "it", "its", "just", "more", "most", "my", "no", "not", "of", "on",
    "or", "our", "she", "so", "some", "than", "that", "the", "their", "then", "there", "they",
    "this", "to", "too", "very", "was", "we", "were", "what", "when", "where", "which", "who",
    "why", "will", "with", "you", "your",
];

fn is_stopword(token: &str) -> bool {
    STOPWORDS.binary_search(&token).is_ok()
}

/// Lowercase, strip punctuation, drop stopwords and single characters.
pub fn tokenize(title: &str) -> Vec<String> {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter_map(|raw| {
            let token = raw.to_lowercase();
            (token.chars().count() >= 2 && !is_stopword(&token)).then_some(token)
        })
        .collect()
}
