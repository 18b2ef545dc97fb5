use icu_normalizer::ComposingNormalizerBorrowed;

use crate::api::types::Question;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Answer {
    /// One of the presented options, verbatim.
    Choice(String),
    /// Free text typed by the learner.
    Typed(String),
}

impl Answer {
    pub fn text(&self) -> &str {
        match self {
            Answer::Choice(text) | Answer::Typed(text) => text,
        }
    }
}

/// NFC-compose and collapse runs of whitespace. Hangul typed through an
/// IME can arrive as decomposed jamo.
pub fn normalize(text: &str) -> String {
    let nfc = ComposingNormalizerBorrowed::new_nfc();
    let composed = nfc.normalize(text);
    composed.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn is_correct(question: &Question, answer: &Answer) -> bool {
    match answer {
        Answer::Choice(text) => *text == question.correct_answer,
        Answer::Typed(text) => normalize(text) == normalize(&question.correct_answer),
    }
}
