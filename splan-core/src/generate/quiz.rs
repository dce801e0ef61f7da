use crate::document::{Quiz, QuizQuestion, NO_KEYWORD};
use crate::keyword::{blank_out, eligible_words, pick_keyword, replace_word, Word};
use crate::segment::Sentence;
use crate::settings::{QuizType, ToolSettings};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

/// Most distractors offered next to the correct answer.
pub const MAX_DISTRACTORS: usize = 3;

/// One question per leading sentence, up to `settings.num_questions`.
pub fn build_quiz<R: Rng + ?Sized>(sentences: &[Sentence], settings: &ToolSettings, rng: &mut R) -> Quiz {
    let count = (settings.num_questions as usize).min(sentences.len());
    let questions = sentences[..count]
        .iter()
        .map(|sentence| match settings.quiz_type {
            QuizType::MultipleChoice => multiple_choice(sentence.as_str(), rng),
            QuizType::TrueFalse => true_false(sentence.as_str(), rng),
            QuizType::FillInBlanks => fill_in_blank(sentence.as_str(), rng),
        })
        .collect::<Vec<_>>();
    debug!(questions = questions.len(), quiz_type = %settings.quiz_type, "Built quiz");
    Quiz {
        difficulty: settings.difficulty,
        quiz_type: settings.quiz_type,
        questions,
    }
}

fn multiple_choice<R: Rng + ?Sized>(sentence: &str, rng: &mut R) -> QuizQuestion {
    let words = eligible_words(sentence);
    let Some(keyword) = pick_keyword(&words, rng) else {
        return unanswerable(sentence, Some(vec![NO_KEYWORD.to_string()]));
    };

    let mut others: Vec<&str> = Vec::new();
    for w in &words {
        if w.text != keyword.text && !others.contains(&w.text) {
            others.push(w.text);
        }
    }
    others.shuffle(rng);

    let mut options: Vec<String> = std::iter::once(keyword.text)
        .chain(others.into_iter().take(MAX_DISTRACTORS))
        .map(str::to_string)
        .collect();
    options.shuffle(rng);

    QuizQuestion {
        prompt: blank_out(sentence, &keyword),
        options: Some(options),
        answer: keyword.text.to_string(),
    }
}

fn true_false<R: Rng + ?Sized>(sentence: &str, rng: &mut R) -> QuizQuestion {
    let words = eligible_words(sentence);
    let keep_true = rng.gen_bool(0.5);
    let falsified = if keep_true {
        None
    } else {
        pick_keyword(&words, rng).and_then(|keyword| {
            let replacements: Vec<&Word<'_>> =
                words.iter().filter(|w| w.text != keyword.text).collect();
            replacements
                .choose(rng)
                .map(|swap| replace_word(sentence, &keyword, swap.text))
        })
    };

    match falsified {
        Some(statement) => QuizQuestion {
            prompt: statement,
            options: None,
            answer: "False".to_string(),
        },
        None => QuizQuestion {
            prompt: sentence.to_string(),
            options: None,
            answer: "True".to_string(),
        },
    }
}

fn fill_in_blank<R: Rng + ?Sized>(sentence: &str, rng: &mut R) -> QuizQuestion {
    let words = eligible_words(sentence);
    match pick_keyword(&words, rng) {
        Some(keyword) => QuizQuestion {
            prompt: blank_out(sentence, &keyword),
            options: None,
            answer: keyword.text.to_string(),
        },
        None => unanswerable(sentence, None),
    }
}

fn unanswerable(sentence: &str, options: Option<Vec<String>>) -> QuizQuestion {
    QuizQuestion {
        prompt: sentence.to_string(),
        options,
        answer: NO_KEYWORD.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{segment, Strictness};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn settings(quiz_type: QuizType, num_questions: u32) -> ToolSettings {
        ToolSettings {
            quiz_type,
            num_questions,
            ..ToolSettings::default()
        }
    }

    #[test]
    fn false_statements_always_differ_from_the_source() {
        let sentences = segment(
            "Water boils at hundred degrees Celsius. Gravity pulls objects toward Earth.",
            Strictness::Lenient,
        );
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let quiz = build_quiz(&sentences, &settings(QuizType::TrueFalse, 5), &mut rng);
            for (q, s) in quiz.questions.iter().zip(&sentences) {
                match q.answer.as_str() {
                    "True" => assert_eq!(q.prompt, s.as_str()),
                    "False" => assert_ne!(q.prompt, s.as_str()),
                    other => panic!("unexpected answer {other}"),
                }
            }
        }
    }

    #[test]
    fn single_distinct_word_cannot_be_falsified() {
        let sentences = segment("We ate cake", Strictness::Lenient);
        for seed in 0..16 {
            let mut rng = StdRng::seed_from_u64(seed);
            let quiz = build_quiz(&sentences, &settings(QuizType::TrueFalse, 1), &mut rng);
            assert_eq!(quiz.questions[0].answer, "True");
        }
    }

    #[test]
    fn fill_in_blank_has_no_options() {
        let sentences = segment("Mitochondria produce cellular energy.", Strictness::Lenient);
        let mut rng = StdRng::seed_from_u64(11);
        let quiz = build_quiz(&sentences, &settings(QuizType::FillInBlanks, 3), &mut rng);
        assert_eq!(quiz.questions.len(), 1);
        assert!(quiz.questions[0].options.is_none());
        assert!(quiz.questions[0].prompt.contains("_____"));
    }
}
