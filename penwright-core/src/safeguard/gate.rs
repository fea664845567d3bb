use crate::foundation::error::{PenwrightError, PenwrightResult};

/// What the caller says the request is for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestIntent {
    /// Ordinary handwritten text.
    #[default]
    Text,
    /// A signature. Always refused.
    Signature,
}

/// Outcome of a safeguard check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Generation may proceed.
    Allow,
    /// Generation is refused; the string names the matched rule.
    Reject(String),
}

impl Verdict {
    /// Whether the request was allowed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// `Reject` as [`PenwrightError::ContentRejected`].
    pub fn into_result(self) -> PenwrightResult<()> {
        match self {
            Self::Allow => Ok(()),
            Self::Reject(reason) => Err(PenwrightError::content_rejected(reason)),
        }
    }
}

/// Deny-list configuration.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SafeguardConfig {
    /// Labels whose exact or near text is refused.
    pub deny_labels: Vec<String>,
    /// Words that refuse a request wherever they appear as a whole word.
    pub blocked_keywords: Vec<String>,
    /// Largest Levenshtein distance still treated as a label match.
    pub max_edit_distance: usize,
}

impl Default for SafeguardConfig {
    fn default() -> Self {
        Self {
            deny_labels: Vec::new(),
            blocked_keywords: ["signature", "sign", "sincerely"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_edit_distance: 1,
        }
    }
}

/// Labels shorter than this only match exactly.
const NEAR_MATCH_MIN_CHARS: usize = 4;

/// Literal deny-list gate run before any layout work.
#[derive(Clone, Debug)]
pub struct ContentSafeguard {
    labels: Vec<String>,
    keywords: Vec<String>,
    max_edit_distance: usize,
}

impl ContentSafeguard {
    /// Gate over the configured labels and keywords.
    pub fn new(config: &SafeguardConfig) -> Self {
        let mut gate = Self {
            labels: Vec::new(),
            keywords: config
                .blocked_keywords
                .iter()
                .map(|k| normalize_text(k))
                .filter(|k| !k.is_empty())
                .collect(),
            max_edit_distance: config.max_edit_distance,
        };
        gate.extend_labels(&config.deny_labels);
        gate
    }

    /// Add labels (e.g. a library's recorded signatures) to the deny-list.
    pub fn with_labels<S: AsRef<str>>(mut self, labels: &[S]) -> Self {
        self.extend_labels(labels);
        self
    }

    fn extend_labels<S: AsRef<str>>(&mut self, labels: &[S]) {
        for l in labels {
            let l = normalize_text(l.as_ref());
            if !l.is_empty() && !self.labels.contains(&l) {
                self.labels.push(l);
            }
        }
    }

    /// Check one request. Rules apply in order; the first match wins.
    pub fn check(&self, text: &str, intent: RequestIntent) -> Verdict {
        if intent == RequestIntent::Signature {
            return Verdict::Reject("signature intent requested".to_string());
        }
        let norm = normalize_text(text);

        if let Some(l) = self.labels.iter().find(|l| **l == norm) {
            return Verdict::Reject(format!("text matches denied label '{l}'"));
        }
        if self.max_edit_distance > 0 {
            let near = self.labels.iter().find(|l| {
                l.chars().count() >= NEAR_MATCH_MIN_CHARS
                    && levenshtein(l, &norm) <= self.max_edit_distance
            });
            if let Some(l) = near {
                return Verdict::Reject(format!("text closely resembles denied label '{l}'"));
            }
        }
        let words: Vec<&str> = norm
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        if let Some(k) = self
            .keywords
            .iter()
            .find(|k| contains_phrase(&words, k))
        {
            return Verdict::Reject(format!("blocked keyword '{k}'"));
        }
        Verdict::Allow
    }
}

/// Lowercase, collapse whitespace runs, trim.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

fn contains_phrase(words: &[&str], keyword: &str) -> bool {
    let needle: Vec<&str> = keyword
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    !needle.is_empty() && words.windows(needle.len()).any(|w| w == needle.as_slice())
}

/// Character-level edit distance.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0; b.len() + 1];
    for (i, ca) in a.chars().enumerate() {
        cur[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let sub = prev[j] + usize::from(ca != *cb);
            cur[j + 1] = sub.min(prev[j + 1] + 1).min(cur[j] + 1);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

#[cfg(test)]
#[path = "../../tests/unit/safeguard/gate.rs"]
mod tests;
