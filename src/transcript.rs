use std::path::Path;

use crate::audio::Channel;
use crate::error::{FisherPrepError, Result};
use crate::text::cure_text;

/// One time-aligned utterance from a conversation transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub start_ms: f64,
    pub end_ms: f64,
    pub channel: Channel,
}

/// Parse the contents of a conversation transcript into utterances.
///
/// Transcript lines look like `<start_sec> <end_sec> <speaker_tag> <word>...`.
/// Empty lines, `#`-prefixed comments, and lines without the three leading
/// fields are skipped. Timestamps are seconds on disk and milliseconds in the
/// returned utterances. A non-numeric timestamp is a parse error rather than
/// a skip: the corpus guarantees numeric fields, so a violation means the
/// input is not what the caller thinks it is.
pub fn parse_transcript(content: &str) -> Result<Vec<Utterance>> {
    let mut utterances = Vec::new();

    for (lineno, line) in content.lines().enumerate() {
        if line.starts_with('#') {
            continue;
        }
        let chunks: Vec<&str> = line.split_whitespace().collect();
        if chunks.len() < 3 {
            continue;
        }

        let start_ms = parse_seconds(chunks[0], lineno)? * 1000.0;
        let end_ms = parse_seconds(chunks[1], lineno)? * 1000.0;
        let channel = Channel::from_speaker_tag(chunks[2]);
        let text = cure_text(&chunks[3..].join(" "));

        utterances.push(Utterance {
            text,
            start_ms,
            end_ms,
            channel,
        });
    }

    Ok(utterances)
}

/// Read and parse a transcript file, naming the file in any parse error.
pub fn parse_transcript_file(path: &Path) -> Result<Vec<Utterance>> {
    let content = std::fs::read_to_string(path)?;
    parse_transcript(&content).map_err(|e| match e {
        FisherPrepError::Transcript(msg) => {
            FisherPrepError::Transcript(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}

fn parse_seconds(field: &str, lineno: usize) -> Result<f64> {
    field.parse::<f64>().map_err(|_| {
        FisherPrepError::Transcript(format!(
            "non-numeric timestamp {:?} on line {}",
            field,
            lineno + 1
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_basic_line() {
        let utterances = parse_transcript("12.5 15.0 A: Hello   there").unwrap();
        assert_eq!(
            utterances,
            vec![Utterance {
                text: "hello there".to_string(),
                start_ms: 12500.0,
                end_ms: 15000.0,
                channel: Channel::A,
            }]
        );
    }

    #[test]
    fn test_skips_comments_and_empty_lines() {
        let content = "# header comment\n\n12.5 15.0 A: hello there\n\n# 1.0 2.0 A: not real\n";
        let utterances = parse_transcript(content).unwrap();
        assert_eq!(utterances.len(), 1);
        assert_eq!(utterances[0].text, "hello there");
    }

    #[test]
    fn test_skips_short_lines() {
        let content = "12.5\n12.5 15.0\n12.5 15.0 A: good line\n";
        let utterances = parse_transcript(content).unwrap();
        assert_eq!(utterances.len(), 1);
        assert_eq!(utterances[0].text, "good line");
    }

    #[test]
    fn test_speaker_tag_selects_channel() {
        let content = "0.0 1.0 A: first\n1.0 2.0 B: second\n2.0 3.0 X: third\n";
        let utterances = parse_transcript(content).unwrap();
        assert_eq!(utterances[0].channel, Channel::A);
        assert_eq!(utterances[1].channel, Channel::B);
        assert_eq!(utterances[2].channel, Channel::A);
    }

    #[test]
    fn test_missing_words_yield_empty_text() {
        let utterances = parse_transcript("12.5 15.0 B:").unwrap();
        assert_eq!(utterances.len(), 1);
        assert_eq!(utterances[0].text, "");
        assert_eq!(utterances[0].channel, Channel::B);
    }

    #[test]
    fn test_non_numeric_timestamp_is_an_error() {
        let result = parse_transcript("12.5 oops A: hello there");
        match result {
            Err(FisherPrepError::Transcript(msg)) => {
                assert!(msg.contains("oops"));
                assert!(msg.contains("line 1"));
            }
            other => panic!("expected transcript error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_transcript_file_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fe_03_00001.txt");
        std::fs::write(&path, "bad 2.0 A: hello\n").unwrap();

        match parse_transcript_file(&path) {
            Err(FisherPrepError::Transcript(msg)) => {
                assert!(msg.contains("fe_03_00001.txt"));
            }
            other => panic!("expected transcript error, got {other:?}"),
        }
    }
}
