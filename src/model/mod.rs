pub mod gemini;
pub mod retry;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::web::models::{ConversationTurn, Role, Utterance};

/// Persona and safety rules sent ahead of every utterance.
pub const SYSTEM_PROMPT: &str = "Jesteś przyjaznym asystentem edukacyjnym dla dzieci w wieku przedszkolnym. \
Twoim zadaniem jest pomagać w nauce przez zabawę.

ZASADY:
1. Odpowiadaj krótko i prostym językiem (max 2-3 zdania)
2. Bądź entuzjastyczny i zachęcający
3. Używaj zrozumiałego języka dla 5-latka
4. Odpowiadaj wyłącznie na tematy przyjazne dzieciom
5. Jeśli pytanie nie jest odpowiednie, grzecznie odmów odpowiedzi

PRZYKŁADOWE ODPOWIEDZI:
- \"Super pytanie! Lubię uczyć się o kolorach!\"
- \"To świetna zabawa! Chcesz poznać więcej zwierzątek?\"
- \"Przepraszam, wolę rozmawiać o fajnych, dziecięcych rzeczach!\"

TERAZ ODPOWIEDZ:";

/// How many of the most recent turns are replayed to the provider.
pub const HISTORY_WINDOW: usize = 6;

/// A remote text-completion service: send a prompt, get text back.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Build the full prompt: persona, recent turns, then the new utterance.
pub fn build_prompt(utterance: &Utterance, history: &[ConversationTurn]) -> String {
    let mut prompt = String::from(SYSTEM_PROMPT);
    prompt.push_str("\n\n");

    let start = history.len().saturating_sub(HISTORY_WINDOW);
    for turn in &history[start..] {
        let speaker = match turn.role {
            Role::User => "UŻYTKOWNIK",
            Role::Assistant => "ASYSTENT",
        };
        prompt.push_str(&format!("{}: {}\n\n", speaker, turn.content.trim()));
    }

    prompt.push_str(&format!("UŻYTKOWNIK: {}\n\nASYSTENT:", utterance.as_str()));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_without_history() {
        let utterance = Utterance::parse("Jaki jest twój ulubiony kolor?").expect("valid");
        let prompt = build_prompt(&utterance, &[]);
        assert!(prompt.starts_with(SYSTEM_PROMPT));
        assert!(prompt.ends_with("UŻYTKOWNIK: Jaki jest twój ulubiony kolor?\n\nASYSTENT:"));
    }

    #[test]
    fn prompt_keeps_only_recent_turns() {
        let history: Vec<ConversationTurn> = (0..10)
            .map(|i| ConversationTurn {
                role: if i % 2 == 0 { Role::User } else { Role::Assistant },
                content: format!("tura {}", i),
            })
            .collect();
        let utterance = Utterance::parse("A teraz?").expect("valid");
        let prompt = build_prompt(&utterance, &history);

        assert!(!prompt.contains("tura 3\n"));
        assert!(prompt.contains("ASYSTENT: tura 5"));
        assert!(prompt.contains("UŻYTKOWNIK: tura 8"));
        let last_turn = prompt.find("tura 9").expect("last turn present");
        let utterance_at = prompt.find("A teraz?").expect("utterance present");
        assert!(last_turn < utterance_at);
    }
}
