//! Multi-word query segmentation.
//!
//! A segmenter groups the tokens of a normalized query into the terms the
//! rest of the pipeline works on: single words, or multi-word phrases that
//! are known to be frequent enough in the collection. The expansion engine
//! only depends on the [`Segmenter`] trait; [`GreedySegmenter`] is the
//! frequency-driven implementation shipped with the crate.

use ahash::{AHashMap, AHashSet};
use log::debug;

/// Segment (or word) to frequency.
pub type FrequencyTable = AHashMap<String, u64>;

/// Splits a token sequence into non-overlapping segments.
pub trait Segmenter: Send + Sync {
    /// Segment `tokens`. Every token ends up in exactly one returned segment,
    /// in the original order.
    fn segment(&self, tokens: &[String]) -> Vec<String>;

    /// Get the name of this segmenter for logging.
    fn name(&self) -> &'static str;
}

/// Greedy left-to-right segmenter that prefers the longest eligible phrase.
///
/// A candidate phrase is eligible when its phrase frequency reaches the
/// minimum document frequency and its phrase probability (phrase frequency
/// over the frequency of its words co-occurring) exceeds the minimum
/// probability. Phrases without a co-occurrence count have probability 1.
#[derive(Debug, Clone)]
pub struct GreedySegmenter {
    eligible: AHashSet<String>,
    max_words: usize,
}

impl GreedySegmenter {
    pub fn new<I, S>(
        segments: I,
        phrase_frequencies: &FrequencyTable,
        and_frequencies: &FrequencyTable,
        min_probability: f64,
        min_document_frequency: u64,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut eligible = AHashSet::new();
        let mut max_words = 1;

        for segment in segments {
            let segment = segment.as_ref();
            let words = segment.split(' ').count();
            if words < 2 {
                continue;
            }

            let phrase_frequency = phrase_frequencies.get(segment).copied().unwrap_or(0);
            if phrase_frequency < min_document_frequency {
                continue;
            }

            let probability = match and_frequencies.get(segment) {
                Some(&and_frequency) if and_frequency > 0 => {
                    phrase_frequency as f64 / and_frequency as f64
                }
                _ => 1.0,
            };
            if probability <= min_probability {
                continue;
            }

            max_words = max_words.max(words);
            eligible.insert(segment.to_string());
        }

        debug!(
            "Greedy segmenter: {} eligible phrases, up to {} words",
            eligible.len(),
            max_words
        );

        Self {
            eligible,
            max_words,
        }
    }

    /// Number of eligible multi-word phrases.
    pub fn len(&self) -> usize {
        self.eligible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eligible.is_empty()
    }

    pub fn is_eligible(&self, phrase: &str) -> bool {
        self.eligible.contains(phrase)
    }
}

impl Segmenter for GreedySegmenter {
    fn segment(&self, tokens: &[String]) -> Vec<String> {
        let mut segments = Vec::with_capacity(tokens.len());
        let mut start = 0;

        while start < tokens.len() {
            let longest = self.max_words.min(tokens.len() - start);
            let phrase = (2..=longest).rev().find_map(|words| {
                let candidate = tokens[start..start + words].join(" ");
                self.eligible.contains(&candidate).then_some((candidate, words))
            });

            match phrase {
                Some((candidate, words)) => {
                    segments.push(candidate);
                    start += words;
                }
                None => {
                    segments.push(tokens[start].clone());
                    start += 1;
                }
            }
        }

        segments
    }

    fn name(&self) -> &'static str {
        "greedy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<String> {
        text.split(' ').map(String::from).collect()
    }

    fn frequencies(entries: &[(&str, u64)]) -> FrequencyTable {
        entries.iter().map(|&(s, f)| (s.to_string(), f)).collect()
    }

    #[test]
    fn test_longest_phrase_wins() {
        let phrase = frequencies(&[("bank of", 500), ("bank of england", 300)]);
        let segmenter = GreedySegmenter::new(
            ["bank of", "bank of england"],
            &phrase,
            &FrequencyTable::new(),
            -1.0,
            100,
        );

        assert_eq!(
            segmenter.segment(&tokens("the bank of england rates")),
            vec!["the", "bank of england", "rates"]
        );
    }

    #[test]
    fn test_minimum_document_frequency() {
        let phrase = frequencies(&[("bank of england", 99)]);
        let segmenter =
            GreedySegmenter::new(["bank of england"], &phrase, &FrequencyTable::new(), -1.0, 100);

        assert!(segmenter.is_empty());
        assert_eq!(
            segmenter.segment(&tokens("bank of england")),
            vec!["bank", "of", "england"]
        );

        // The threshold itself is enough.
        let phrase = frequencies(&[("bank of england", 100)]);
        let segmenter =
            GreedySegmenter::new(["bank of england"], &phrase, &FrequencyTable::new(), -1.0, 100);
        assert_eq!(segmenter.len(), 1);
        assert_eq!(
            segmenter.segment(&tokens("bank of england")),
            vec!["bank of england"]
        );
    }

    #[test]
    fn test_minimum_probability() {
        let phrase = frequencies(&[("new york", 200), ("york new", 200)]);
        let and = frequencies(&[("new york", 250), ("york new", 4000)]);

        let segmenter = GreedySegmenter::new(["new york", "york new"], &phrase, &and, 0.5, 100);
        assert!(segmenter.is_eligible("new york"));
        assert!(!segmenter.is_eligible("york new"));

        let segmenter = GreedySegmenter::new(["new york", "york new"], &phrase, &and, -1.0, 100);
        assert!(segmenter.is_eligible("york new"));
    }

    #[test]
    fn test_single_words_ignored_and_empty_input() {
        let phrase = frequencies(&[("bank", 1000)]);
        let segmenter = GreedySegmenter::new(["bank"], &phrase, &FrequencyTable::new(), -1.0, 100);
        assert!(segmenter.is_empty());
        assert!(segmenter.segment(&[]).is_empty());
    }
}
