use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NegotiationRole {
    Seller,
    Buyer,
}

impl fmt::Display for NegotiationRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NegotiationRole::Seller => write!(f, "Seller"),
            NegotiationRole::Buyer => write!(f, "Buyer"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiationTurn {
    pub role: NegotiationRole,
    pub message: String,
}

/// How a party is framed when the model plays it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Persona {
    pub title: &'static str,
    pub goal: &'static str,
    pub counterpart: NegotiationRole,
    /// Whether the seller-side pricing policy is shown to this party.
    pub shares_policy: bool,
    pub max_words: usize,
}

const PERSONAS: &[(NegotiationRole, Persona)] = &[
    (
        NegotiationRole::Seller,
        Persona {
            title: "Senior Sales Executive",
            goal: "Maximize value",
            counterpart: NegotiationRole::Buyer,
            shares_policy: true,
            max_words: 50,
        },
    ),
    (
        NegotiationRole::Buyer,
        Persona {
            title: "Tough Procurement Officer",
            goal: "Lowest price",
            counterpart: NegotiationRole::Seller,
            shares_policy: false,
            max_words: 50,
        },
    ),
];

impl NegotiationRole {
    pub fn persona(self) -> &'static Persona {
        PERSONAS
            .iter()
            .find(|(role, _)| *role == self)
            .map(|(_, persona)| persona)
            .unwrap_or(&PERSONAS[0].1)
    }
}

pub fn render_history(history: &[NegotiationTurn]) -> String {
    if history.is_empty() {
        return "(no prior turns)".to_string();
    }
    history
        .iter()
        .map(|turn| format!("{}: {}", turn.role, turn.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prompt for the next turn spoken by `role`.
pub fn turn_prompt(
    role: NegotiationRole,
    history: &[NegotiationTurn],
    policy_context: &str,
) -> String {
    let persona = role.persona();
    let mut prompt = format!("You are a {}. Goal: {}.\n", persona.title, persona.goal);
    if persona.shares_policy {
        prompt.push_str(&format!("Policy: {}\n", policy_context));
    }
    prompt.push_str(&format!("History:\n{}\n", render_history(history)));
    prompt.push_str(&format!(
        "Respond to the {} (max {} words).",
        persona.counterpart, persona.max_words
    ));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> Vec<NegotiationTurn> {
        vec![
            NegotiationTurn {
                role: NegotiationRole::Buyer,
                message: "Your quote is too high.".to_string(),
            },
            NegotiationTurn {
                role: NegotiationRole::Seller,
                message: "We include 24/7 support.".to_string(),
            },
        ]
    }

    const POLICY: &str = "Minimum discount floor is 10%.";

    #[test]
    fn every_role_has_a_persona() {
        assert_eq!(NegotiationRole::Seller.persona().title, "Senior Sales Executive");
        assert_eq!(NegotiationRole::Buyer.persona().title, "Tough Procurement Officer");
    }

    #[test]
    fn seller_prompt_includes_policy_and_history() {
        let prompt = turn_prompt(NegotiationRole::Seller, &history(), POLICY);
        assert!(prompt.starts_with("You are a Senior Sales Executive. Goal: Maximize value."));
        assert!(prompt.contains(&format!("Policy: {POLICY}")));
        assert!(
            prompt.contains("Buyer: Your quote is too high.\nSeller: We include 24/7 support.")
        );
        assert!(prompt.ends_with("Respond to the Buyer (max 50 words)."));
    }

    #[test]
    fn buyer_prompt_never_sees_policy() {
        let prompt = turn_prompt(NegotiationRole::Buyer, &history(), POLICY);
        assert!(prompt.starts_with("You are a Tough Procurement Officer. Goal: Lowest price."));
        assert!(!prompt.contains(POLICY));
        assert!(!prompt.contains("Policy:"));
        assert!(prompt.ends_with("Respond to the Seller (max 50 words)."));
    }

    #[test]
    fn empty_history_is_marked() {
        let prompt = turn_prompt(NegotiationRole::Buyer, &[], POLICY);
        assert!(prompt.contains("History:\n(no prior turns)\n"));
    }

    #[test]
    fn roles_deserialize_from_their_names() {
        let role: NegotiationRole = serde_json::from_str("\"Seller\"").unwrap();
        assert_eq!(role, NegotiationRole::Seller);
        assert!(serde_json::from_str::<NegotiationRole>("\"Broker\"").is_err());
    }
}
