use crate::document::{Flashcard, FlashcardDeck, TopicCards, NO_KEYWORD};
use crate::keyword::{blank_out, eligible_words, pick_keyword};
use crate::segment::Sentence;
use crate::topic::{group_by_topic, Topic};
use rand::Rng;
use tracing::{debug, warn};

/// Builds up to `ceil(num_flashcards / 3)` cards per topic.
pub fn build_flashcards<R: Rng + ?Sized>(
    sentences: &[Sentence],
    num_flashcards: u32,
    rng: &mut R,
) -> FlashcardDeck {
    let per_topic = (num_flashcards as usize).div_ceil(Topic::ALL.len());
    let topics = group_by_topic(sentences)
        .into_iter()
        .map(|(topic, pool)| {
            let cards = pool
                .into_iter()
                .take(per_topic)
                .map(|sentence| card_for(sentence, rng))
                .collect::<Vec<_>>();
            debug!(%topic, cards = cards.len(), "Built topic cards");
            TopicCards { topic, cards }
        })
        .collect();
    FlashcardDeck { topics }
}

fn card_for<R: Rng + ?Sized>(sentence: &Sentence, rng: &mut R) -> Flashcard {
    let text = sentence.as_str();
    let words = eligible_words(text);
    match pick_keyword(&words, rng) {
        Some(keyword) => Flashcard {
            front: blank_out(text, &keyword),
            back: keyword.text.to_string(),
        },
        None => {
            warn!(sentence = text, "No keyword candidate; card keeps the full sentence");
            Flashcard {
                front: text.to_string(),
                back: NO_KEYWORD.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::BLANK;
    use crate::segment::{segment, Strictness};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn sentence_without_long_words_yields_placeholder_card() {
        let sentences = segment("It is so. We go up.", Strictness::Lenient);
        let mut rng = StdRng::seed_from_u64(1);
        let deck = build_flashcards(&sentences, 10, &mut rng);
        let card = deck.cards().next().unwrap();
        assert_eq!(card.front, "It is so");
        assert_eq!(card.back, NO_KEYWORD);
    }

    #[test]
    fn per_topic_limit_rounds_up() {
        let text = (1..=12)
            .map(|i| format!("Sentence number {i} mentions photosynthesis."))
            .collect::<Vec<_>>()
            .join(" ");
        let sentences = segment(&text, Strictness::Lenient);
        let mut rng = StdRng::seed_from_u64(3);
        let deck = build_flashcards(&sentences, 4, &mut rng);
        assert_eq!(deck.topics.len(), 3);
        for group in &deck.topics {
            assert_eq!(group.cards.len(), 2);
            for card in &group.cards {
                assert!(card.front.contains(BLANK));
            }
        }
    }
}
