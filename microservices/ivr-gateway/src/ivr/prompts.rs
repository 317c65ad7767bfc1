//! Spoken prompts and audio assets

use super::flow::Language;
use crate::markup::{Speak, SPANISH_VOICE_LOCALE};

pub const ENGLISH_AUDIO_URL: &str = "https://s3.amazonaws.com/plivocloud/Trumpet.mp3";
pub const SPANISH_AUDIO_URL: &str = "https://s3.amazonaws.com/plivocloud/music.mp3";

pub const WELCOME: &str =
    "Welcome to Inspire Works. Press 1 for English. Press 2 for Spanish.";
pub const NO_INPUT_GOODBYE: &str = "No input received. Goodbye.";
pub const INVALID_SELECTION: &str = "Invalid selection. Please try again.";

/// Prompt text in both supported languages
#[derive(Debug, Clone, Copy)]
pub struct LocalizedPrompt {
    pub en: &'static str,
    pub es: &'static str,
}

impl LocalizedPrompt {
    /// Speech in the caller's language; Spanish carries the es-US locale
    pub fn speak(&self, lang: Language) -> Speak {
        match lang {
            Language::En => Speak::new(self.en),
            Language::Es => Speak::with_language(self.es, SPANISH_VOICE_LOCALE),
        }
    }
}

pub const ACTION_MENU: LocalizedPrompt = LocalizedPrompt {
    en: "You selected English. Press 1 to play a message. Press 2 to talk to an associate.",
    es: "Seleccionó Español. Presione 1 para escuchar un mensaje. Presione 2 para hablar con un asociado.",
};

pub const PLAYING_MESSAGE: LocalizedPrompt = LocalizedPrompt {
    en: "Playing your message in English.",
    es: "Reproduciendo su mensaje en español.",
};

pub const GOODBYE: LocalizedPrompt = LocalizedPrompt {
    en: "Thank you for calling. Goodbye!",
    es: "Gracias por llamar. Adiós!",
};

pub const CONNECTING: LocalizedPrompt = LocalizedPrompt {
    en: "Connecting you to an associate. Please hold.",
    es: "Conectándole con un asociado. Por favor espere.",
};

pub const INVALID_INPUT: LocalizedPrompt = LocalizedPrompt {
    en: "Invalid input. Please try again.",
    es: "Entrada inválida. Por favor, inténtelo de nuevo.",
};

pub fn audio_url(lang: Language) -> &'static str {
    match lang {
        Language::En => ENGLISH_AUDIO_URL,
        Language::Es => SPANISH_AUDIO_URL,
    }
}
