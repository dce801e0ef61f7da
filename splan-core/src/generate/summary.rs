use crate::document::Summary;
use crate::segment::Sentence;
use crate::settings::SummaryLength;

/// Takes the leading sentences as key points; emphasis is applied when rendering.
pub fn summarize(sentences: &[Sentence], length: SummaryLength) -> Summary {
    let count = length.max_points().min(sentences.len());
    Summary {
        points: sentences[..count].iter().map(|s| s.as_str().to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{segment, Strictness};

    #[test]
    fn never_exceeds_available_sentences() {
        let sentences = segment("One thing. Another thing.", Strictness::Lenient);
        assert_eq!(summarize(&sentences, SummaryLength::Long).points.len(), 2);
    }

    #[test]
    fn caps_points_by_length() {
        let text = "A1 x. A2 x. A3 x. A4 x. A5 x. A6 x. A7 x. A8 x.";
        let sentences = segment(text, Strictness::Lenient);
        assert_eq!(summarize(&sentences, SummaryLength::Short).points.len(), 3);
        assert_eq!(summarize(&sentences, SummaryLength::Medium).points.len(), 5);
        assert_eq!(summarize(&sentences, SummaryLength::Long).points.len(), 7);
    }
}
