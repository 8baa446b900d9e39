//! Flavor-text collaborator boundary.
//!
//! Certain characters have no scripted dialog tree; talking to them asks
//! an external text generator for a one-line reply. The engine only knows
//! the [`FlavorProvider`] trait; a failing or absent provider degrades to
//! a fixed fallback line, never a propagated error.

use anyhow::Result;
use rand::prelude::IndexedRandom;
use thornvale_data::Node;

/// Supplies a one-line reply for a character given the player's utterance.
pub trait FlavorProvider {
    /// # Errors
    /// Implementations may fail (remote generator down, malformed output);
    /// the engine substitutes a canned line in that case.
    fn reply(&self, npc: &Node, utterance: &str) -> Result<String>;
}

/// Fixed line used when a provider errors out.
pub const FALLBACK_LINE: &str = "acknowledges your presence but remains silent.";

const CANNED_LINES: &[&str] = &[
    "Trust in the journey. Each discovery leads to the next.",
    "The path you seek may not be straight, but every step has purpose.",
    "Secrets lie in darkness, waiting to be uncovered. Search thoroughly.",
    "Sometimes what we search for lies in plain sight, where shadow meets light.",
    "The forest holds many secrets. Some are meant to be found.",
    "What you seek lies hidden in shadow. Let your instincts guide you.",
];

/// Default provider: a small table of cryptic canned lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct CannedFlavor;

impl FlavorProvider for CannedFlavor {
    fn reply(&self, _npc: &Node, _utterance: &str) -> Result<String> {
        let mut rng = rand::rng();
        Ok(CANNED_LINES
            .choose(&mut rng)
            .copied()
            .unwrap_or(CANNED_LINES[0])
            .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thornvale_data::NodeKind;

    fn seer() -> Node {
        Node {
            id: "char_4".into(),
            kind: NodeKind::Character,
            subtype: "seer".into(),
            name: "Luna".into(),
            description: String::new(),
        }
    }

    #[test]
    fn canned_provider_always_replies() {
        let provider = CannedFlavor;
        for _ in 0..20 {
            let line = provider.reply(&seer(), "hello").unwrap();
            assert!(CANNED_LINES.contains(&line.as_str()));
        }
    }
}
