//! Local answers without any network call.
//!
//! Products are scanned in order and only those whose name or id appears in
//! the question are considered. For such a product the first rule that
//! produces text wins:
//!
//! 1. a FAQ whose question part appears in the question (literal pass, then
//!    a word pass over the same FAQs when the question carries none of the
//!    keywords of rules 2 to 5)
//! 2. "what is" / "tell me about" → the description
//! 3. "price" → formatted price
//! 4. "specification" / "specs" → specification list
//! 5. "feature" → feature list
//!
//! A product that triggers none of these does not stop the scan.

use std::collections::HashSet;

use tracing::{debug, error};

use super::Context;
use crate::catalog::Product;

pub const NO_ANSWER: &str = "I don't have enough information to answer that question. \
Please try asking about a specific product or feature.";
pub const NO_DESCRIPTION: &str = "I don't have information about this product.";
pub const APOLOGY: &str = "I'm sorry, I couldn't find an answer to your question.";

const FAQ_ANSWER_MARKER: &str = "A: ";
const FAQ_QUESTION_MARKER: &str = "q: ";

/// Keywords of the overview, price, specs and features rules.
const RULE_KEYWORDS: &[&str] =
    &["what is", "tell me about", "price", "specification", "specs", "feature"];

/// Filler words ignored by the FAQ word pass.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "any", "are", "at", "be", "can", "could", "did", "do", "does", "for",
    "has", "have", "how", "i", "in", "is", "it", "its", "me", "my", "of", "on", "or", "that",
    "the", "there", "this", "to", "was", "what", "when", "where", "which", "who", "why",
    "will", "with", "would", "you", "your",
];

/// Answer `question` from `products`; never fails.
pub fn answer(question: &str, products: &[Product]) -> String {
    let question = question.to_lowercase();
    products
        .iter()
        .find_map(|product| answer_for(&question, product))
        .unwrap_or_else(|| NO_ANSWER.to_string())
}

/// Answer from a serialized context. Malformed context yields [`APOLOGY`].
pub fn answer_json(question: &str, context_json: &str) -> String {
    match Context::from_json(context_json) {
        Ok(context) => answer(question, context.products()),
        Err(e) => {
            error!(error = %e, "error generating fallback answer");
            APOLOGY.to_string()
        }
    }
}

/// `question` is already lower-cased.
fn answer_for(question: &str, product: &Product) -> Option<String> {
    let name = product.name.to_lowercase();
    let id = product.product_id.to_lowercase();
    if !question.contains(&name) && !question.contains(&id) {
        return None;
    }

    if let Some(answer) = faq_answer(question, &product.faqs) {
        debug!(product_id = %product.product_id, "answered from faq");
        return Some(answer);
    }

    let wants_overview = question.contains("what is") || question.contains("tell me about");
    if wants_overview {
        if let Some(description) = &product.description {
            return Some(description.clone());
        }
    }

    if question.contains("price") {
        return Some(format!("The {} costs ${:.2}.", product.name, product.price));
    }

    if (question.contains("specification") || question.contains("specs"))
        && !product.specifications.is_empty()
    {
        return Some(format!(
            "The {} specifications include: {}.",
            product.name,
            product.specifications.join(", ")
        ));
    }

    if question.contains("feature") && !product.features.is_empty() {
        return Some(format!(
            "The {} features include: {}.",
            product.name,
            product.features.join(", ")
        ));
    }

    wants_overview.then(|| NO_DESCRIPTION.to_string())
}

/// `(normalized question part, answer part)` of a `"Q: ... A: ..."` string,
/// or `None` when there is no answer marker.
fn split_faq(faq: &str) -> Option<(String, &str)> {
    let (asked, answer) = faq.split_once(FAQ_ANSWER_MARKER)?;
    let asked = asked.trim().to_lowercase().replace(FAQ_QUESTION_MARKER, "");
    Some((asked, answer))
}

fn faq_answer(question: &str, faqs: &[String]) -> Option<String> {
    let pairs: Vec<(String, &str)> = faqs.iter().filter_map(|faq| split_faq(faq)).collect();

    let literal = pairs.iter().find(|(asked, _)| question.contains(asked.as_str()));
    let hit = match literal {
        Some(hit) => Some(hit),
        None if RULE_KEYWORDS.iter().any(|k| question.contains(k)) => None,
        None => {
            let words = words(question);
            pairs.iter().find(|(asked, _)| covers(&words, asked))
        }
    };

    hit.map(|(_, answer)| answer.trim().to_string())
}

fn words(text: &str) -> HashSet<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Every significant word of `asked` occurs in `words`, and there is at
/// least one.
fn covers(words: &HashSet<&str>, asked: &str) -> bool {
    let mut significant = asked
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty() && !STOP_WORDS.contains(w))
        .peekable();
    significant.peek().is_some() && significant.all(|w| words.contains(w))
}
