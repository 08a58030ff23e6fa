//! Deterministic, template-based answer composition.
//!
//! Ranked passages and a question are turned into an answer without any
//! generative model. The question is classified into a [`QuestionKind`] by
//! Dutch and English interrogative markers, and each kind has its own
//! strategy for pulling the most useful lines out of the passages:
//!
//! | Kind | Markers | Extraction |
//! |------|---------|------------|
//! | [`Definition`](QuestionKind::Definition) | wat, what, welke, which | first 5 substantial sentences |
//! | [`Procedure`](QuestionKind::Procedure) | hoe, how, wanneer, when | numbered or step lines (max 5) |
//! | [`Explanation`](QuestionKind::Explanation) | waarom, why, reden, reason | causal sentences (max 3) |
//! | [`General`](QuestionKind::General) | anything else | first substantial paragraph |
//!
//! The answer always ends with a numbered list of the passages it was built
//! from, each cut to 200 characters.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

const DEFINITION_MARKERS: &[&str] = &["wat", "what", "welke", "which"];
const PROCEDURE_MARKERS: &[&str] = &["hoe", "how", "wanneer", "when"];
const EXPLANATION_MARKERS: &[&str] = &["waarom", "why", "reden", "reason"];
const CAUSAL_MARKERS: &[&str] = &["omdat", "doordat", "vanwege", "reden", "because", "due to"];

const DEFINITION_MAX_SENTENCES: usize = 5;
const DEFINITION_MIN_SENTENCE_CHARS: usize = 20;
const PROCEDURE_MAX_LINES: usize = 5;
const PROCEDURE_FALLBACK_CHARS: usize = 500;
const EXPLANATION_MAX_SENTENCES: usize = 3;
const EXPLANATION_FALLBACK_CHARS: usize = 400;
const GENERAL_MIN_PARAGRAPH_CHARS: usize = 50;
const GENERAL_MAX_CHARS: usize = 500;
const GENERAL_FALLBACK_CHARS: usize = 300;
const PASSAGE_PREVIEW_CHARS: usize = 200;

/// Maximum number of document titles cited for one answer.
pub const MAX_CITATIONS: usize = 3;

const ELLIPSIS: &str = "...";

/// Language of the answer templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Nl,
}

impl Locale {
    /// Scope label used in place of a title when passages span documents.
    pub fn multiple_documents(&self) -> &'static str {
        match self {
            Locale::En => "multiple documents",
            Locale::Nl => "meerdere documenten",
        }
    }

    pub fn no_information(&self, question: &str, document_title: &str) -> String {
        match self {
            Locale::En => format!(
                "I could not find any relevant information in the document \"{document_title}\" to answer your question: \"{question}\"\n\n\
                 Try rephrasing your question or check whether the document contains the information you are looking for."
            ),
            Locale::Nl => format!(
                "Ik kon geen relevante informatie vinden in het document \"{document_title}\" om je vraag te beantwoorden: \"{question}\"\n\n\
                 Probeer je vraag anders te formuleren of controleer of het document de informatie bevat die je zoekt."
            ),
        }
    }

    pub fn no_information_in_any(&self, question: &str, titles: &[&str]) -> String {
        let listing = titles
            .iter()
            .map(|t| format!("- {t}"))
            .collect::<Vec<_>>()
            .join("\n");
        match self {
            Locale::En => format!(
                "I could not find any relevant information in the available documents to answer your question: \"{question}\"\n\n\
                 Available documents:\n{listing}\n\n\
                 Try rephrasing your question or select a specific document."
            ),
            Locale::Nl => format!(
                "Ik kon geen relevante informatie vinden in de beschikbare documenten om je vraag te beantwoorden: \"{question}\"\n\n\
                 Beschikbare documenten:\n{listing}\n\n\
                 Probeer je vraag anders te formuleren of selecteer een specifiek document."
            ),
        }
    }

    pub fn no_documents(&self, question: &str) -> String {
        match self {
            Locale::En => format!(
                "I would be happy to answer your question: \"{question}\"\n\n\
                 However, there are currently no documents in the knowledge base. \
                 Upload documents first and I can give detailed answers based on their content."
            ),
            Locale::Nl => format!(
                "Ik zou graag je vraag beantwoorden: \"{question}\"\n\n\
                 Echter, er zijn momenteel geen documenten beschikbaar in mijn kennisbank. \
                 Upload eerst documenten via de upload functie, dan kan ik gedetailleerde antwoorden geven gebaseerd op hun inhoud."
            ),
        }
    }

    fn answer(&self, question: &str, document_title: &str, body: &str, passages: &str) -> String {
        match self {
            Locale::En => format!(
                "Based on the document \"{document_title}\" I can answer your question:\n\n\
                 **Question:** {question}\n\n\
                 **Answer:**\n{body}\n\n\
                 **Relevant passages from the document:**\n{passages}"
            ),
            Locale::Nl => format!(
                "Op basis van het document \"{document_title}\" kan ik je vraag beantwoorden:\n\n\
                 **Vraag:** {question}\n\n\
                 **Antwoord:**\n{body}\n\n\
                 **Relevante passages uit het document:**\n{passages}"
            ),
        }
    }

    fn definition_fallback(&self) -> &'static str {
        match self {
            Locale::En => "Based on the available information in the document.",
            Locale::Nl => "Gebaseerd op de beschikbare informatie in het document.",
        }
    }
}

/// Question category, selecting the extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Definition,
    Procedure,
    Explanation,
    General,
}

impl QuestionKind {
    /// Classify by marker words, checked in the order definition, procedure,
    /// explanation. Markers match anywhere in the lowercased question.
    pub fn classify(question: &str) -> Self {
        let lower = question.to_lowercase();
        let has_any = |markers: &[&str]| markers.iter().any(|m| lower.contains(m));

        if has_any(DEFINITION_MARKERS) {
            QuestionKind::Definition
        } else if has_any(PROCEDURE_MARKERS) {
            QuestionKind::Procedure
        } else if has_any(EXPLANATION_MARKERS) {
            QuestionKind::Explanation
        } else {
            QuestionKind::General
        }
    }

    /// Extract the answer body from the joined passage context.
    pub fn extract(&self, context: &str, locale: Locale) -> String {
        match self {
            QuestionKind::Definition => extract_definitions(context, locale),
            QuestionKind::Procedure => extract_procedure(context),
            QuestionKind::Explanation => extract_explanation(context),
            QuestionKind::General => extract_general(context),
        }
    }
}

/// A ranked chunk together with the title of the document it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Passage<'a> {
    pub text: &'a str,
    pub document_title: &'a str,
}

/// A composed answer and the document titles it cites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub text: String,
    pub citations: Vec<String>,
}

/// Compose an answer to `question` from ranked `passages`.
///
/// `scope_title` names what was searched: a document title, or
/// [`Locale::multiple_documents`] when passages come from several documents.
/// Passages are used in the given order; they are not re-sorted.
pub fn compose(
    question: &str,
    passages: &[Passage<'_>],
    scope_title: &str,
    locale: Locale,
) -> Answer {
    if passages.is_empty() {
        return Answer {
            text: locale.no_information(question, scope_title),
            citations: Vec::new(),
        };
    }

    let context = passages
        .iter()
        .map(|p| p.text)
        .collect::<Vec<_>>()
        .join("\n\n");
    let body = QuestionKind::classify(question).extract(&context, locale);
    let listing = format_passages(passages);

    Answer {
        text: locale.answer(question, scope_title, &body, &listing),
        citations: citations(passages),
    }
}

fn citations(passages: &[Passage<'_>]) -> Vec<String> {
    let mut titles: Vec<String> = Vec::new();
    for p in passages {
        if !titles.iter().any(|t| t == p.document_title) {
            titles.push(p.document_title.to_string());
        }
    }
    titles.truncate(MAX_CITATIONS);
    titles
}

fn format_passages(passages: &[Passage<'_>]) -> String {
    passages
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{}. {}", i + 1, truncate_chars(p.text, PASSAGE_PREVIEW_CHARS)))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn extract_definitions(context: &str, locale: Locale) -> String {
    let sentences: Vec<&str> = context
        .split('.')
        .map(str::trim)
        .filter(|s| s.chars().count() > DEFINITION_MIN_SENTENCE_CHARS)
        .take(DEFINITION_MAX_SENTENCES)
        .collect();

    if sentences.is_empty() {
        return locale.definition_fallback().to_string();
    }
    format!("{}.", sentences.join(". "))
}

fn step_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\d+\.|\b(stap|step|eerst|then|vervolgens)\b")
            .expect("step pattern is valid")
    })
}

fn extract_procedure(context: &str) -> String {
    let steps: Vec<&str> = context
        .split('\n')
        .filter(|line| step_pattern().is_match(&line.to_lowercase()))
        .map(str::trim)
        .take(PROCEDURE_MAX_LINES)
        .collect();

    if steps.is_empty() {
        return truncate_chars(context, PROCEDURE_FALLBACK_CHARS);
    }
    steps.join("\n")
}

fn extract_explanation(context: &str) -> String {
    let sentences: Vec<&str> = context
        .split('.')
        .filter(|s| {
            let lower = s.to_lowercase();
            CAUSAL_MARKERS.iter().any(|m| lower.contains(m))
        })
        .map(str::trim)
        .take(EXPLANATION_MAX_SENTENCES)
        .collect();

    if sentences.is_empty() {
        return truncate_chars(context, EXPLANATION_FALLBACK_CHARS);
    }
    format!("{}.", sentences.join(". "))
}

fn extract_general(context: &str) -> String {
    context
        .split("\n\n")
        .map(str::trim)
        .find(|p| p.chars().count() > GENERAL_MIN_PARAGRAPH_CHARS)
        .map(|p| truncate_chars(p, GENERAL_MAX_CHARS))
        .unwrap_or_else(|| truncate_chars(context, GENERAL_FALLBACK_CHARS))
}

/// First `max` chars of `text`, with `...` appended if anything was cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_pos, _)) => format!("{}{}", &text[..byte_pos], ELLIPSIS),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage<'a>(text: &'a str, title: &'a str) -> Passage<'a> {
        Passage {
            text,
            document_title: title,
        }
    }

    #[test]
    fn test_no_passages_gives_fixed_message() {
        let answer = compose("Why does X happen?", &[], "Doc A", Locale::En);
        assert!(answer.text.contains("\"Doc A\""));
        assert!(answer.text.contains("\"Why does X happen?\""));
        assert!(answer.text.starts_with("I could not find any relevant information"));
        assert!(answer.citations.is_empty());
    }

    #[test]
    fn test_no_passages_dutch() {
        let answer = compose("Waarom?", &[], "Handboek", Locale::Nl);
        assert!(answer.text.starts_with("Ik kon geen relevante informatie vinden"));
        assert!(answer.text.contains("\"Handboek\""));
    }

    #[test]
    fn test_classify() {
        assert_eq!(QuestionKind::classify("What is a chunk?"), QuestionKind::Definition);
        assert_eq!(QuestionKind::classify("Welke dosering?"), QuestionKind::Definition);
        assert_eq!(QuestionKind::classify("How do I install it?"), QuestionKind::Procedure);
        assert_eq!(QuestionKind::classify("Hoe werkt dit?"), QuestionKind::Procedure);
        assert_eq!(QuestionKind::classify("Why does X happen?"), QuestionKind::Explanation);
        assert_eq!(QuestionKind::classify("Waarom is dit nodig?"), QuestionKind::Explanation);
        assert_eq!(QuestionKind::classify("Tell me about X"), QuestionKind::General);
    }

    #[test]
    fn test_definition_takes_substantial_sentences() {
        let context = "Short. A chunk is a piece of a document. Tiny. \
                       Chunks overlap by two hundred characters. x";
        let body = QuestionKind::Definition.extract(context, Locale::En);
        assert_eq!(
            body,
            "A chunk is a piece of a document. Chunks overlap by two hundred characters."
        );
    }

    #[test]
    fn test_definition_caps_at_five_sentences() {
        let context = "This sentence is long enough number one. ".repeat(8);
        let body = QuestionKind::Definition.extract(&context, Locale::En);
        assert_eq!(body.matches("number one").count(), 5);
    }

    #[test]
    fn test_definition_fallback() {
        let body = QuestionKind::Definition.extract("Too short. Also short.", Locale::Nl);
        assert_eq!(body, "Gebaseerd op de beschikbare informatie in het document.");
    }

    #[test]
    fn test_procedure_picks_step_lines() {
        let context = "Intro line\n1. Open the lid\nsome noise\nThen close it\nStap drie";
        let body = QuestionKind::Procedure.extract(context, Locale::En);
        assert_eq!(body, "1. Open the lid\nThen close it\nStap drie");
    }

    #[test]
    fn test_procedure_number_must_start_the_line() {
        let context = "1. Open the lid\n  2. Press start\n  then wait";
        let body = QuestionKind::Procedure.extract(context, Locale::En);
        assert_eq!(body, "1. Open the lid\nthen wait");
    }

    #[test]
    fn test_procedure_step_word_needs_word_boundary() {
        let context = "Stepping stones are nice";
        let body = QuestionKind::Procedure.extract(context, Locale::En);
        assert_eq!(body, context);
    }

    #[test]
    fn test_procedure_fallback_truncates() {
        let context = "x".repeat(600);
        let body = QuestionKind::Procedure.extract(&context, Locale::En);
        assert_eq!(body.len(), 503);
        assert!(body.ends_with("..."));
    }

    #[test]
    fn test_explanation_picks_causal_sentences() {
        let context = "It fails because the disk is full. Nothing else. \
                       Het werkt niet omdat de stroom uit is. Due to load it slows";
        let body = QuestionKind::Explanation.extract(context, Locale::En);
        assert_eq!(
            body,
            "It fails because the disk is full. Het werkt niet omdat de stroom uit is. Due to load it slows."
        );
    }

    #[test]
    fn test_explanation_fallback() {
        let body = QuestionKind::Explanation.extract("No causes here", Locale::En);
        assert_eq!(body, "No causes here");
    }

    #[test]
    fn test_general_first_long_paragraph() {
        let long = "This paragraph is comfortably longer than fifty characters in total.";
        let context = format!(
            "Short one\n\n{long}\n\nAnother paragraph that is also quite long, but comes later."
        );
        let body = QuestionKind::General.extract(&context, Locale::En);
        assert_eq!(body, long);
    }

    #[test]
    fn test_general_truncates_long_paragraph() {
        let context = "w".repeat(700);
        let body = QuestionKind::General.extract(&context, Locale::En);
        assert_eq!(body, format!("{}...", "w".repeat(500)));
    }

    #[test]
    fn test_general_fallback() {
        let body = QuestionKind::General.extract("tiny\n\nbits", Locale::En);
        assert_eq!(body, "tiny\n\nbits");
    }

    #[test]
    fn test_compose_lists_passages_in_rank_order() {
        let long = "p".repeat(250);
        let passages = [passage("second chunk text", "Doc A"), passage(&long, "Doc A")];
        let answer = compose("Tell me", &passages, "Doc A", Locale::En);
        assert!(answer.text.contains("**Question:** Tell me"));
        assert!(answer
            .text
            .contains("1. second chunk text\n\n2. "));
        assert!(answer.text.ends_with(&format!("{}...", "p".repeat(200))));
        assert_eq!(answer.citations, vec!["Doc A".to_string()]);
    }

    #[test]
    fn test_citations_dedup_and_cap() {
        let passages = [
            passage("a", "One"),
            passage("b", "Two"),
            passage("c", "One"),
            passage("d", "Three"),
            passage("e", "Four"),
        ];
        let answer = compose("x", &passages, Locale::En.multiple_documents(), Locale::En);
        assert_eq!(answer.citations, vec!["One", "Two", "Three"]);
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("ééé", 2), "éé...");
        assert_eq!(truncate_chars("ééé", 3), "ééé");
    }
}
