//! Static question/answer matcher backing the `/chat` endpoint.
//!
//! Questions are loaded once at startup. A case-insensitive exact hit wins;
//! otherwise the closest question by Ratcliff/Obershelp similarity is used if
//! it scores at least [`SIMILARITY_CUTOFF`].

use std::path::Path;

use serde::{Deserialize, Serialize};

pub const SIMILARITY_CUTOFF: f64 = 0.6;
pub const UNKNOWN_ANSWER: &str = "I don't know the answer, but you can teach me!";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeBase {
    #[serde(default)]
    pub questions: Vec<QuestionAnswer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
}

impl KnowledgeBase {
    /// Reads the knowledge base file. A missing or malformed file yields an
    /// empty knowledge base.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Knowledge base unreadable, starting empty");
                return Self::default();
            }
        };

        match serde_json::from_str::<KnowledgeBase>(&raw) {
            Ok(kb) => {
                tracing::info!(path = %path.display(), questions = kb.questions.len(), "Knowledge base loaded");
                kb
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Knowledge base malformed, starting empty");
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Answer for `question`, or [`UNKNOWN_ANSWER`].
    pub fn answer(&self, question: &str) -> &str {
        self.exact_match(question)
            .or_else(|| self.closest_match(question))
            .map_or(UNKNOWN_ANSWER, |qa| qa.answer.as_str())
    }

    fn exact_match(&self, question: &str) -> Option<&QuestionAnswer> {
        let wanted = question.to_lowercase();
        self.questions
            .iter()
            .find(|qa| qa.question.to_lowercase() == wanted)
    }

    /// Best-scoring question at or above the cutoff, scored with the stored
    /// question as the first sequence. Ties go to the lexicographically
    /// greater question.
    fn closest_match(&self, question: &str) -> Option<&QuestionAnswer> {
        let target: Vec<char> = question.chars().collect();
        self.questions
            .iter()
            .map(|qa| {
                let candidate: Vec<char> = qa.question.chars().collect();
                (similarity(&candidate, &target), qa)
            })
            .filter(|(score, _)| *score >= SIMILARITY_CUTOFF)
            .max_by(|(sa, qa), (sb, qb)| {
                sa.partial_cmp(sb)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| qa.question.cmp(&qb.question))
            })
            .map(|(_, qa)| qa)
    }
}

/// `2 * matched / (len(a) + len(b))`, where `matched` counts characters in
/// the recursively found longest common blocks. Two empty inputs score 1.0.
pub fn similarity(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matched_chars(a, b) as f64 / total as f64
}

fn matched_chars(a: &[char], b: &[char]) -> usize {
    let (i, j, size) = longest_common_block(a, b);
    if size == 0 {
        return 0;
    }
    size + matched_chars(&a[..i], &b[..j]) + matched_chars(&a[i + size..], &b[j + size..])
}

/// Longest common substring as `(start_a, start_b, len)`, earliest in `a`
/// then earliest in `b` on ties.
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    // run[j + 1]: length of the common run ending at a[i], b[j]
    let mut prev = vec![0usize; b.len() + 1];
    let mut run = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            run[j + 1] = if ca == cb { prev[j] + 1 } else { 0 };
            let k = run[j + 1];
            if k > best.2 {
                best = (i + 1 - k, j + 1 - k, k);
            }
        }
        std::mem::swap(&mut prev, &mut run);
    }
    best
}
