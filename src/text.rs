use regex::Regex;

/// Pattern a transcript must match to be usable as a training label.
const ALPHA_PATTERN: &str = r"^[a-zA-Z\s]+$";

/// Strip ASCII punctuation characters from the text.
pub fn remove_punct(text: &str) -> String {
    text.chars().filter(|c| !c.is_ascii_punctuation()).collect()
}

/// Normalize an utterance transcript: strip punctuation, lowercase, and
/// collapse whitespace runs to single spaces.
///
/// Idempotent; applying it twice yields the same string.
pub fn cure_text(text: &str) -> String {
    let text = remove_punct(text).to_lowercase();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decides which cleaned transcripts are usable as training labels.
///
/// A transcript passes when it is longer than one character and contains
/// only ASCII letters and whitespace. The pattern is compiled once and the
/// filter is shared across workers.
#[derive(Debug, Clone)]
pub struct TranscriptFilter {
    alpha: Regex,
}

impl TranscriptFilter {
    pub fn new() -> Self {
        Self {
            alpha: Regex::new(ALPHA_PATTERN).expect("alpha pattern is valid"),
        }
    }

    /// True when the text qualifies as a training label.
    pub fn is_valid(&self, text: &str) -> bool {
        text.chars().count() > 1 && self.alpha.is_match(text)
    }
}

impl Default for TranscriptFilter {
    fn default() -> Self {
        Self::new()
    }
}
