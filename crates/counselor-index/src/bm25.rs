use std::collections::HashMap;
use uuid::Uuid;

/// BM25 parameters.
const K1: f32 = 1.2;
const B: f32 = 0.75;

/// Tokenize text into lowercase words, filtering tokens with length <= 1.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|w| w.len() > 1)
        .collect()
}

/// A BM25 inverted index over passage text.
///
/// The corpus is built once at startup and rebuilt only when source data
/// changes, so the index supports insertion and search but not removal.
#[derive(Debug, Clone, Default)]
pub struct Bm25Index {
    /// term -> (passage_id -> term_frequency)
    postings: HashMap<String, HashMap<Uuid, f32>>,
    /// passage_id -> passage length in tokens
    lengths: HashMap<Uuid, f32>,
    total_length: f32,
}

impl Bm25Index {
    /// Create a new, empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a passage to the index.
    pub fn add(&mut self, id: Uuid, text: &str) {
        let tokens = tokenize(text);
        self.total_length += tokens.len() as f32;
        self.lengths.insert(id, tokens.len() as f32);

        let mut freq: HashMap<String, f32> = HashMap::new();
        for token in tokens {
            *freq.entry(token).or_insert(0.0) += 1.0;
        }
        for (term, tf) in freq {
            self.postings.entry(term).or_default().insert(id, tf);
        }
    }

    /// Number of passages in the index.
    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    /// Score all passages matching `query` and return up to `top_k` of them,
    /// best first.
    ///
    /// Standard BM25 with Robertson IDF:
    /// ```text
    /// score = sum over query terms of:
    ///   ln((N - df + 0.5) / (df + 0.5) + 1.0)
    ///     * tf * (k1 + 1) / (tf + k1 * (1 - b + b * dl / avgdl))
    /// ```
    ///
    /// Equal scores are broken by passage id so identical queries against an
    /// unchanged index always produce identical orderings.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<(Uuid, f32)> {
        let n = self.lengths.len();
        if n == 0 {
            return Vec::new();
        }
        let avgdl = (self.total_length / n as f32).max(1.0);
        let n = n as f32;

        let mut scores: HashMap<Uuid, f32> = HashMap::new();
        for token in tokenize(query) {
            let Some(postings) = self.postings.get(&token) else {
                continue;
            };
            let df = postings.len() as f32;
            let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();

            for (&id, &tf) in postings {
                let dl = self.lengths.get(&id).copied().unwrap_or(0.0);
                let term_score =
                    idf * tf * (K1 + 1.0) / (tf + K1 * (1.0 - B + B * dl / avgdl));
                *scores.entry(id).or_insert(0.0) += term_score;
            }
        }

        let mut results: Vec<(Uuid, f32)> = scores.into_iter().collect();
        results.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        results.truncate(top_k);
        results
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_search_finds_passage() {
        let mut index = Bm25Index::new();
        let id = Uuid::new_v4();
        index.add(id, "AP Biology covers cells genetics and ecology");

        let results = index.search("AP Biology genetics", 10);
        assert!(!results.is_empty());
        assert_eq!(results[0].0, id);
        assert!(results[0].1 > 0.0);
    }

    #[test]
    fn test_ranking_prefers_denser_match() {
        let mut index = Bm25Index::new();
        let id_clubs = Uuid::new_v4();
        let id_courses = Uuid::new_v4();
        let id_lunch = Uuid::new_v4();
        index.add(
            id_clubs,
            "robotics club meets tuesday robotics club competes in first robotics",
        );
        index.add(id_courses, "course catalog lists math science and one robotics elective");
        index.add(id_lunch, "lunch menu rotates weekly with pizza on friday");

        let results = index.search("robotics club", 10);
        assert!(results.len() >= 2);
        assert_eq!(results[0].0, id_clubs);
        assert!(results[0].1 > results[1].1);
        assert!(!results.iter().any(|(id, _)| *id == id_lunch));
    }

    #[test]
    fn test_no_match_returns_empty() {
        let mut index = Bm25Index::new();
        index.add(Uuid::new_v4(), "graduation requirements english math credits");
        assert!(index.search("weather forecast", 10).is_empty());
    }

    #[test]
    fn test_empty_index() {
        let index = Bm25Index::new();
        assert!(index.is_empty());
        assert!(index.search("anything", 5).is_empty());
    }

    #[test]
    fn test_search_is_deterministic() {
        let mut index = Bm25Index::new();
        for i in 0..20 {
            index.add(Uuid::new_v4(), &format!("course credit elective number {i}"));
        }
        let a = index.search("course credit", 5);
        let b = index.search("course credit", 5);
        let ids_a: Vec<Uuid> = a.iter().map(|(id, _)| *id).collect();
        let ids_b: Vec<Uuid> = b.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn test_tokenize_filters_short_tokens() {
        let tokens = tokenize("What is a GPA?");
        assert!(tokens.contains(&"what".to_string()));
        assert!(tokens.contains(&"gpa".to_string()));
        assert!(!tokens.contains(&"a".to_string()));
    }
}
