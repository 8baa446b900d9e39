//! Conversation helpers.
//!
//! Traversal itself lives on the engine; this module holds the pieces that
//! are pure over a [`DialogNode`]: matching a player's selection against
//! the response list and building the synthetic nodes used for
//! flavor-provider replies.

use thornvale_data::{DialogNode, Id};

/// Resolve a selection against a node's responses.
///
/// Accepts a 1-based index ("2") or free text matched case-insensitively
/// as a substring of a response label; first match wins. Returns the
/// 0-based index of the chosen response.
pub fn match_response(dialog: &DialogNode, selection: &str) -> Option<usize> {
    let trimmed = selection.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        let index = trimmed.parse::<usize>().ok()?.checked_sub(1)?;
        return (index < dialog.responses.len()).then_some(index);
    }
    let needle = trimmed.to_lowercase();
    dialog
        .responses
        .iter()
        .position(|response| response.text.to_lowercase().contains(&needle))
}

/// Wrap a flavor-provider reply as a single response-less dialog node so
/// it flows through the same presentation path as scripted dialog.
pub fn synthetic_node(npc_id: &str, text: String) -> DialogNode {
    DialogNode {
        id: format!("flavor_{npc_id}"),
        npc_id: Id::from(npc_id),
        parent_id: None,
        text,
        responses: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thornvale_data::DialogResponse;

    fn node_with_responses(labels: &[&str]) -> DialogNode {
        DialogNode {
            id: "dlg_1".into(),
            npc_id: "char_1".into(),
            parent_id: None,
            text: "Well?".into(),
            responses: labels
                .iter()
                .map(|label| DialogResponse {
                    text: (*label).to_string(),
                    next_id: None,
                    effect: None,
                })
                .collect(),
        }
    }

    #[test]
    fn numeric_selection_is_one_based() {
        let node = node_with_responses(&["Yes, please", "No, thank you"]);
        assert_eq!(match_response(&node, "1"), Some(0));
        assert_eq!(match_response(&node, "2"), Some(1));
        assert_eq!(match_response(&node, "3"), None);
        assert_eq!(match_response(&node, "0"), None);
    }

    #[test]
    fn text_selection_matches_substring_case_insensitively() {
        let node = node_with_responses(&["Yes, please", "No, thank you"]);
        assert_eq!(match_response(&node, "THANK"), Some(1));
        assert_eq!(match_response(&node, "yes"), Some(0));
        assert_eq!(match_response(&node, "maybe"), None);
    }

    #[test]
    fn first_match_wins_on_ambiguity() {
        let node = node_with_responses(&["Tell me more", "Tell me everything"]);
        assert_eq!(match_response(&node, "tell me"), Some(0));
    }

    #[test]
    fn synthetic_nodes_have_no_responses() {
        let node = synthetic_node("char_4", "The mist parts briefly.".into());
        assert!(node.responses.is_empty());
        assert_eq!(node.npc_id, "char_4");
        assert!(node.parent_id.is_none());
    }
}
