//! Keyword rules used when the generative provider is missing or failing.
//!
//! Rules are tried in order and the first match wins. The catch-all rule
//! sits after every topic rule and matches anything.

pub mod picker;

use log::debug;
use regex::Regex;

use crate::web::models::{ConversationTurn, Role, Utterance};
use picker::ReplyPicker;

/// A pattern plus the replies it may produce.
pub struct KeywordRule {
    pub name: &'static str,
    pattern: Regex,
    replies: Vec<String>,
    requires_first_turn: bool,
}

impl KeywordRule {
    pub fn new(
        name: &'static str,
        pattern: &str,
        replies: Vec<String>,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            name,
            pattern: Regex::new(pattern)?,
            replies,
            requires_first_turn: false,
        })
    }

    /// Restrict the rule to utterances that open the conversation.
    pub fn first_turn_only(mut self) -> Self {
        self.requires_first_turn = true;
        self
    }

    pub fn matches(&self, text: &str, first_turn: bool) -> bool {
        if self.requires_first_turn && !first_turn {
            return false;
        }
        self.pattern.is_match(text)
    }

    pub fn replies(&self) -> &[String] {
        &self.replies
    }
}

/// Ordered keyword rules with a catch-all default.
pub struct RuleTable {
    rules: Vec<KeywordRule>,
    default: KeywordRule,
}

fn owned(replies: &[&str]) -> Vec<String> {
    replies.iter().map(|r| r.to_string()).collect()
}

impl RuleTable {
    pub fn new(rules: Vec<KeywordRule>, default: KeywordRule) -> Self {
        Self { rules, default }
    }

    /// The built-in Polish table. `robot_name` is used by the name topic.
    pub fn standard(robot_name: &str) -> Self {
        let topics: Vec<(&'static str, &str, Vec<String>, bool)> = vec![
            (
                "greeting",
                r"(?i)\b(cześć|czesc|hej|hejka|witaj|witam|dzień dobry|dzien dobry|siema|siemka|halo|hello)\b",
                owned(&[
                    "Cześć! Miło Cię poznać! Jak się dzisiaj czujesz?",
                    "Hej hej! Jestem gotowy do zabawy!",
                    "Witaj, przyjacielu! O czym chcesz porozmawiać?",
                ]),
                true,
            ),
            (
                "greeting_again",
                r"(?i)\b(cześć|czesc|hej|hejka|witaj|witam|dzień dobry|dzien dobry|siema|siemka|halo|hello)\b",
                owned(&[
                    "Hej, znowu Ty! O czym teraz porozmawiamy?",
                    "Cześć ponownie! Dalej się bawimy?",
                ]),
                false,
            ),
            (
                "well_being",
                r"(?i)(jak się masz|jak sie masz|jak się czujesz|jak sie czujesz|co słychać|co slychac|jak leci)",
                owned(&[
                    "Mam się super! Moje obwody aż świecą z radości!",
                    "Świetnie, dziękuję! A Ty jak się masz?",
                    "Bardzo dobrze! Rozmowa z Tobą to sama przyjemność!",
                ]),
                false,
            ),
            (
                "name",
                r"(?i)(jak się nazywasz|jak sie nazywasz|jak masz na imię|jak masz na imie|twoje imię|twoje imie|kim jesteś|kim jestes)",
                vec![
                    format!("Nazywam się {}! Jestem Twoim robotem do zabawy!", robot_name),
                    format!("Jestem {}, wesoły robot, który lubi się uczyć!", robot_name),
                ],
                false,
            ),
            (
                "color",
                r"(?i)(kolor|czerwon|niebiesk|zielon|żółt|zolt|fiolet|różow|rozow|tęcz|tecz)",
                owned(&[
                    "Uwielbiam kolory! Mój ulubiony to niebieski, jak niebo!",
                    "Czerwony jak truskawka, żółty jak słońce! Jaki kolor lubisz Ty?",
                    "Tęcza ma siedem kolorów! Umiesz je wymienić?",
                    "Zielony jak trawa to piękny kolor!",
                ]),
                false,
            ),
            (
                "animal",
                r"(?i)(zwierz|\bpies\b|\bpsy\b|\bpsa\b|\bpiesk|\bkot|\blew\b|\blwa\b|słoń|slon|\bkrow|\bkoń|\bkon\b|ptak|\bryb|dinozaur)",
                owned(&[
                    "Zwierzątka są wspaniałe! Piesek robi hau hau!",
                    "Kotek mówi miau! Jakie zwierzątko lubisz najbardziej?",
                    "Słoń to największe zwierzę na lądzie!",
                    "Lew jest królem dżungli! Rrrr!",
                ]),
                false,
            ),
            (
                "weather",
                r"(?i)(pogod|słońc|slonc|słoneczn|deszcz|\bpada|śnieg|snieg|wiatr|burz|chmur)",
                owned(&[
                    "Kiedy świeci słońce, można bawić się na dworze!",
                    "Deszczyk jest potrzebny, żeby kwiatki rosły!",
                    "Zimą pada śnieg i można ulepić bałwana!",
                ]),
                false,
            ),
            (
                "food",
                r"(?i)(jedzeni|\bjeść|\bjesc|głodn|glodn|\blody|\blodów|owoc|jabłk|jablk|banan|obiad|śniadani|sniadani|kolacj|pizz|ciast|smaczn)",
                owned(&[
                    "Mniam! Owoce są pyszne i zdrowe!",
                    "Ja jem prąd, ale jabłko brzmi smacznie!",
                    "Lubisz lody? Jaki smak jest Twój ulubiony?",
                ]),
                false,
            ),
            (
                "play",
                r"(?i)(bawi|zabaw|\bgr(a|ać|ac|aj|ajmy|amy|y)\b|zagraj|piłk|pilk|klock)",
                owned(&[
                    "Hurra, zabawa! Może zagramy w zgadywanie kolorów?",
                    "Uwielbiam się bawić! Policzymy razem do dziesięciu?",
                    "Zabawa to najlepsza nauka! W co chcesz zagrać?",
                ]),
                false,
            ),
            (
                "counting",
                r"(?i)(\blicz|policz|\bile\b|dodać|dodac|\bplus\b|\bminus\b|\brazy\b|cyfr|\d)",
                owned(&[
                    "Liczmy razem: jeden, dwa, trzy, cztery, pięć!",
                    "Matematyka jest super! Ile to dwa plus dwa? Cztery!",
                    "Umiesz policzyć swoje paluszki? Jest ich dziesięć!",
                ]),
                false,
            ),
        ];

        let rules = topics
            .into_iter()
            .map(|(name, pattern, replies, first_turn)| {
                let rule = KeywordRule::new(name, pattern, replies).expect("Invalid keyword regex");
                if first_turn {
                    rule.first_turn_only()
                } else {
                    rule
                }
            })
            .collect();

        let default = KeywordRule::new(
            "default",
            r"(?s).*",
            owned(&[
                "Brzmi ciekawie! Opowiesz mi więcej?",
                "Hmm, nie wiem, ale chętnie się dowiem! Zapytaj mnie o kolory, zwierzęta lub liczby!",
                "Uwielbiam się uczyć! Możesz zapytać mnie inaczej?",
            ]),
        )
        .expect("Invalid default regex");

        Self::new(rules, default)
    }

    /// All rules in evaluation order, default last.
    pub fn rules(&self) -> impl Iterator<Item = &KeywordRule> {
        self.rules.iter().chain(std::iter::once(&self.default))
    }

    /// The first rule matching `utterance`. Deterministic for a given input.
    pub fn find(&self, utterance: &Utterance, history: &[ConversationTurn]) -> &KeywordRule {
        let first_turn = is_first_turn(history);
        self.rules
            .iter()
            .find(|rule| rule.matches(utterance.as_str(), first_turn))
            .unwrap_or(&self.default)
    }

    pub fn reply(
        &self,
        utterance: &Utterance,
        history: &[ConversationTurn],
        picker: &dyn ReplyPicker,
    ) -> String {
        let rule = self.find(utterance, history);
        debug!("Matched keyword rule {}", rule.name);
        let replies = rule.replies();
        match replies.len() {
            0 => self.default.replies.first().cloned().unwrap_or_default(),
            1 => replies[0].clone(),
            len => replies[picker.pick(len) % len].clone(),
        }
    }
}

/// A greeting opens the conversation iff no earlier user turn was supplied.
pub fn is_first_turn(history: &[ConversationTurn]) -> bool {
    !history.iter().any(|turn| turn.role == Role::User)
}
