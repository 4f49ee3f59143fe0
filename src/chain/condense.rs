//! Prompt templates and history rendering for the retrieval chain.

use crate::session::{ChatTurn, Role};

const CONDENSE_TEMPLATE: &str = "\
Given the following conversation and a follow up question, rephrase the follow up question
to be a standalone question.

Chat History:
{chat_history}
Follow Up Input: {question}
Standalone question:";

const QA_TEMPLATE: &str = "\
Use the following pieces of context to answer the question at the end. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.

{context}

Question: {question}
Helpful Answer:";

/// Renders the transcript as completed `user:`/`assistant:` pairs.
///
/// Only pairs render: an assistant turn is matched with the most recent
/// user content seen before it, and a trailing unanswered user turn is
/// dropped. This mirrors the pairing behavior the chain was tuned against.
pub fn render_chat_history(turns: &[ChatTurn]) -> String {
    let mut pairs = Vec::new();
    let mut last_user: Option<&str> = None;

    for turn in turns {
        match turn.role {
            Role::User => last_user = Some(&turn.content),
            Role::Assistant => {
                if let Some(user_content) = last_user {
                    pairs.push(format!("user:{}\nassistant:{}", user_content, turn.content));
                }
            }
        }
    }

    pairs.join("\n")
}

/// Fills the condensation template with prior history and the follow-up.
pub fn condense_prompt(chat_history: &str, question: &str) -> String {
    CONDENSE_TEMPLATE
        .replace("{chat_history}", chat_history)
        .replace("{question}", question)
}

/// Fills the answering template with retrieved context and the question.
pub fn qa_prompt(context: &str, question: &str) -> String {
    QA_TEMPLATE
        .replace("{context}", context)
        .replace("{question}", question)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(content: &str) -> ChatTurn {
        ChatTurn {
            role: Role::User,
            content: content.to_string(),
        }
    }

    fn assistant(content: &str) -> ChatTurn {
        ChatTurn {
            role: Role::Assistant,
            content: content.to_string(),
        }
    }

    #[test]
    fn renders_completed_pairs_only() {
        let turns = vec![
            user("what is a notebook?"),
            assistant("a managed jupyter host"),
            user("how do I stop one?"),
        ];
        let rendered = render_chat_history(&turns);
        assert_eq!(
            rendered,
            "user:what is a notebook?\nassistant:a managed jupyter host"
        );
    }

    #[test]
    fn empty_history_renders_empty() {
        assert_eq!(render_chat_history(&[]), "");
        assert_eq!(render_chat_history(&[user("dangling")]), "");
    }

    #[test]
    fn assistant_without_prior_user_is_skipped() {
        let turns = vec![assistant("orphaned"), user("q"), assistant("a")];
        assert_eq!(render_chat_history(&turns), "user:q\nassistant:a");
    }

    #[test]
    fn condense_prompt_carries_history_and_question() {
        let prompt = condense_prompt("user:q\nassistant:a", "and then?");
        assert!(prompt.contains("Chat History:\nuser:q\nassistant:a"));
        assert!(prompt.contains("Follow Up Input: and then?"));
        assert!(prompt.ends_with("Standalone question:"));
    }

    #[test]
    fn qa_prompt_carries_context_and_question() {
        let prompt = qa_prompt("doc one\n\ndoc two", "what is it?");
        assert!(prompt.contains("doc one\n\ndoc two"));
        assert!(prompt.contains("Question: what is it?"));
        assert!(prompt.ends_with("Helpful Answer:"));
    }
}
