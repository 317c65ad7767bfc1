//! Menu state machine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Caller language, carried between webhooks as the `lang` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Es,
}

impl Language {
    /// Anything other than `es` is English
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("es") => Language::Es,
            _ => Language::En,
        }
    }

    pub fn as_param(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

/// Keypad input delivered with a webhook
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigitInput {
    /// A single key 1-9
    Pressed(u8),
    /// Nothing pressed before the input timed out
    Missing,
    /// Anything else (several keys, 0, *, #, garbage)
    Invalid(String),
}

impl DigitInput {
    /// Classify the raw `Digits` field. The value is compared exactly.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return DigitInput::Missing;
        };
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (None, _) => DigitInput::Missing,
            (Some(c @ '1'..='9'), None) => DigitInput::Pressed(c as u8 - b'0'),
            _ => DigitInput::Invalid(raw.to_string()),
        }
    }
}

impl fmt::Display for DigitInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigitInput::Pressed(d) => write!(f, "{}", d),
            DigitInput::Missing => f.write_str("<none>"),
            DigitInput::Invalid(raw) => write!(f, "{:?}", raw),
        }
    }
}

/// Webhook endpoints of the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuNode {
    Welcome,
    LanguageProcess,
    ActionProcess(Language),
}

impl MenuNode {
    pub fn path(&self) -> &'static str {
        match self {
            MenuNode::Welcome => "/ivr/welcome",
            MenuNode::LanguageProcess => "/ivr/level1_process",
            MenuNode::ActionProcess(_) => "/ivr/action_process",
        }
    }

    pub fn language(&self) -> Option<Language> {
        match self {
            MenuNode::ActionProcess(lang) => Some(*lang),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MenuNode::Welcome => "welcome",
            MenuNode::LanguageProcess => "language_process",
            MenuNode::ActionProcess(_) => "action_process",
        }
    }
}

/// What a node does with the input it received
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Bilingual greeting, collect the language digit
    Greet,
    /// Language menu, collect the action digit
    OfferActions(Language),
    /// Play the recorded message and hang up
    PlayMessage(Language),
    /// Transfer to the associate line
    ConnectAssociate(Language),
    /// Unrecognized input: apologize and start over at the welcome node
    Retry { from: MenuNode },
}

impl Transition {
    /// Node the provider will post the next digit to
    pub fn next_node(&self) -> Option<MenuNode> {
        match self {
            Transition::Greet => Some(MenuNode::LanguageProcess),
            Transition::OfferActions(lang) => Some(MenuNode::ActionProcess(*lang)),
            Transition::Retry { .. } => Some(MenuNode::Welcome),
            Transition::PlayMessage(_) | Transition::ConnectAssociate(_) => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next_node().is_none()
    }
}

pub fn transition(node: MenuNode, input: &DigitInput) -> Transition {
    match (node, input) {
        (MenuNode::Welcome, _) => Transition::Greet,
        (MenuNode::LanguageProcess, DigitInput::Pressed(1)) => {
            Transition::OfferActions(Language::En)
        }
        (MenuNode::LanguageProcess, DigitInput::Pressed(2)) => {
            Transition::OfferActions(Language::Es)
        }
        (MenuNode::ActionProcess(lang), DigitInput::Pressed(1)) => Transition::PlayMessage(lang),
        (MenuNode::ActionProcess(lang), DigitInput::Pressed(2)) => {
            Transition::ConnectAssociate(lang)
        }
        (from, _) => Transition::Retry { from },
    }
}
