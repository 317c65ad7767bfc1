//! Plivo call-control XML
//!
//! A small typed model of the verbs the IVR uses, rendered with quick-xml.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// Locale tag the provider expects on Spanish speech
pub const SPANISH_VOICE_LOCALE: &str = "es-US";

#[derive(Debug, thiserror::Error)]
#[error("Failed to render call-control markup: {0}")]
pub struct MarkupError(String);

/// Text-to-speech instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Speak {
    pub text: String,
    pub language: Option<String>,
}

impl Speak {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: None,
        }
    }

    pub fn with_language(text: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: Some(language.into()),
        }
    }
}

/// Digit collection; the provider POSTs the result to `action`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetInput {
    pub action: String,
    pub num_digits: u8,
    pub prompts: Vec<Speak>,
}

/// Bridge the call to one or more numbers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dial {
    pub caller_id: String,
    pub numbers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    Speak(Speak),
    Play { url: String },
    GetInput(GetInput),
    Redirect { url: String },
    Dial(Dial),
}

/// A `<Response>` document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    verbs: Vec<Verb>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn speak(mut self, speak: Speak) -> Self {
        self.verbs.push(Verb::Speak(speak));
        self
    }

    pub fn play(mut self, url: impl Into<String>) -> Self {
        self.verbs.push(Verb::Play { url: url.into() });
        self
    }

    pub fn get_input(mut self, input: GetInput) -> Self {
        self.verbs.push(Verb::GetInput(input));
        self
    }

    pub fn redirect(mut self, url: impl Into<String>) -> Self {
        self.verbs.push(Verb::Redirect { url: url.into() });
        self
    }

    pub fn dial(mut self, dial: Dial) -> Self {
        self.verbs.push(Verb::Dial(dial));
        self
    }

    pub fn verbs(&self) -> &[Verb] {
        &self.verbs
    }

    /// URLs of every `<Play>`
    pub fn play_urls(&self) -> Vec<&str> {
        self.verbs
            .iter()
            .filter_map(|v| match v {
                Verb::Play { url } => Some(url.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Targets of every `<Redirect>`
    pub fn redirect_urls(&self) -> Vec<&str> {
        self.verbs
            .iter()
            .filter_map(|v| match v {
                Verb::Redirect { url } => Some(url.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn dials(&self) -> Vec<&Dial> {
        self.verbs
            .iter()
            .filter_map(|v| match v {
                Verb::Dial(d) => Some(d),
                _ => None,
            })
            .collect()
    }

    /// The first digit collection, if any
    pub fn input(&self) -> Option<&GetInput> {
        self.verbs.iter().find_map(|v| match v {
            Verb::GetInput(g) => Some(g),
            _ => None,
        })
    }

    pub fn to_xml(&self) -> Result<String, MarkupError> {
        let mut writer = Writer::new(Vec::new());
        write(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)),
        )?;
        write(&mut writer, Event::Start(BytesStart::new("Response")))?;
        for verb in &self.verbs {
            write_verb(&mut writer, verb)?;
        }
        write(&mut writer, Event::End(BytesEnd::new("Response")))?;

        String::from_utf8(writer.into_inner()).map_err(|e| MarkupError(e.to_string()))
    }
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), MarkupError> {
    writer
        .write_event(event)
        .map_err(|e| MarkupError(e.to_string()))
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    start: BytesStart<'_>,
    text: &str,
) -> Result<(), MarkupError> {
    let end = start.to_end().into_owned();
    write(writer, Event::Start(start))?;
    write(writer, Event::Text(BytesText::new(text)))?;
    write(writer, Event::End(end))
}

fn write_speak(writer: &mut Writer<Vec<u8>>, speak: &Speak) -> Result<(), MarkupError> {
    let mut start = BytesStart::new("Speak");
    if let Some(language) = &speak.language {
        start.push_attribute(("language", language.as_str()));
    }
    write_text_element(writer, start, &speak.text)
}

fn write_verb(writer: &mut Writer<Vec<u8>>, verb: &Verb) -> Result<(), MarkupError> {
    match verb {
        Verb::Speak(speak) => write_speak(writer, speak),
        Verb::Play { url } => write_text_element(writer, BytesStart::new("Play"), url),
        Verb::Redirect { url } => write_text_element(writer, BytesStart::new("Redirect"), url),
        Verb::GetInput(input) => {
            let num_digits = input.num_digits.to_string();
            let start = BytesStart::new("GetInput").with_attributes([
                ("action", input.action.as_str()),
                ("method", "POST"),
                ("numDigits", num_digits.as_str()),
            ]);
            write(writer, Event::Start(start))?;
            for prompt in &input.prompts {
                write_speak(writer, prompt)?;
            }
            write(writer, Event::End(BytesEnd::new("GetInput")))
        }
        Verb::Dial(dial) => {
            let start =
                BytesStart::new("Dial").with_attributes([("callerId", dial.caller_id.as_str())]);
            write(writer, Event::Start(start))?;
            for number in &dial.numbers {
                write_text_element(writer, BytesStart::new("Number"), number)?;
            }
            write(writer, Event::End(BytesEnd::new("Dial")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECL: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

    #[test]
    fn test_get_input_with_trailing_speak() {
        let xml = Response::new()
            .get_input(GetInput {
                action: "https://abc.ngrok.io/ivr/level1_process".to_string(),
                num_digits: 1,
                prompts: vec![Speak::new("Press 1.")],
            })
            .speak(Speak::new("No input received. Goodbye."))
            .to_xml()
            .unwrap();

        assert_eq!(
            xml,
            format!(
                "{DECL}<Response><GetInput action=\"https://abc.ngrok.io/ivr/level1_process\" method=\"POST\" numDigits=\"1\"><Speak>Press 1.</Speak></GetInput><Speak>No input received. Goodbye.</Speak></Response>"
            )
        );
    }

    #[test]
    fn test_localized_speak_and_dial() {
        let xml = Response::new()
            .speak(Speak::with_language("Por favor espere.", SPANISH_VOICE_LOCALE))
            .dial(Dial {
                caller_id: "14155550100".to_string(),
                numbers: vec!["919035864327".to_string()],
            })
            .to_xml()
            .unwrap();

        assert_eq!(
            xml,
            format!(
                "{DECL}<Response><Speak language=\"es-US\">Por favor espere.</Speak><Dial callerId=\"14155550100\"><Number>919035864327</Number></Dial></Response>"
            )
        );
    }

    #[test]
    fn test_play_and_redirect() {
        let xml = Response::new()
            .play("https://s3.amazonaws.com/plivocloud/Trumpet.mp3")
            .redirect("https://abc.ngrok.io/ivr/welcome")
            .to_xml()
            .unwrap();

        assert!(xml.contains("<Play>https://s3.amazonaws.com/plivocloud/Trumpet.mp3</Play>"));
        assert!(xml.contains("<Redirect>https://abc.ngrok.io/ivr/welcome</Redirect>"));
    }

    #[test]
    fn test_values_are_escaped() {
        let xml = Response::new()
            .get_input(GetInput {
                action: "https://abc.ngrok.io/ivr/action_process?lang=en&sid=abc".to_string(),
                num_digits: 1,
                prompts: vec![Speak::new("Tom & <Jerry>")],
            })
            .to_xml()
            .unwrap();

        assert!(xml.contains("action=\"https://abc.ngrok.io/ivr/action_process?lang=en&amp;sid=abc\""));
        assert!(xml.contains("<Speak>Tom &amp; &lt;Jerry&gt;</Speak>"));
    }

    #[test]
    fn test_non_ascii_text_is_kept() {
        let xml = Response::new()
            .speak(Speak::with_language("Gracias por llamar. Adiós!", SPANISH_VOICE_LOCALE))
            .to_xml()
            .unwrap();
        assert!(xml.contains("Adiós!"));
    }

    #[test]
    fn test_accessors() {
        let response = Response::new()
            .speak(Speak::new("Connecting you to an associate. Please hold."))
            .dial(Dial {
                caller_id: "1".to_string(),
                numbers: vec!["2".to_string()],
            });
        assert_eq!(response.dials().len(), 1);
        assert!(response.play_urls().is_empty());
        assert!(response.redirect_urls().is_empty());
        assert!(response.input().is_none());
        assert_eq!(response.verbs().len(), 2);
    }
}
