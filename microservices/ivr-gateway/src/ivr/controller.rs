//! Builds the markup for each menu node

use inspire_core::PhoneNumber;
use tracing::{debug, error, info};
use url::form_urlencoded;

use super::flow::{transition, DigitInput, MenuNode, Transition};
use super::prompts;
use crate::markup::{Dial, GetInput, Response, Speak};
use crate::session::CallContext;

/// Served if rendering ever fails, so the provider still gets valid markup
const FALLBACK_XML: &str =
    r#"<?xml version="1.0" encoding="utf-8"?><Response><Hangup/></Response>"#;

/// Menu controller; stateless apart from the numbers it dials with
#[derive(Debug, Clone)]
pub struct IvrFlowController {
    source_number: PhoneNumber,
    associate_number: PhoneNumber,
}

impl IvrFlowController {
    pub fn new(source_number: PhoneNumber, associate_number: PhoneNumber) -> Self {
        Self {
            source_number,
            associate_number,
        }
    }

    /// Markup for `node` given the caller's input
    pub fn respond(&self, node: MenuNode, input: &DigitInput, ctx: &CallContext) -> Response {
        let step = transition(node, input);

        match step {
            Transition::Retry { .. } => info!(
                node = node.name(),
                digit = %input,
                "Unrecognized menu input, restarting at welcome"
            ),
            _ => debug!(node = node.name(), digit = %input, next = ?step, "Menu transition"),
        }

        self.render(step, ctx)
    }

    /// Same as [`respond`](Self::respond), serialized for the wire
    pub fn respond_xml(&self, node: MenuNode, input: &DigitInput, ctx: &CallContext) -> String {
        match self.respond(node, input, ctx).to_xml() {
            Ok(xml) => {
                debug!(node = node.name(), xml = %xml, "Generated markup");
                xml
            }
            Err(e) => {
                error!(node = node.name(), error = %e, "Markup rendering failed");
                FALLBACK_XML.to_string()
            }
        }
    }

    pub fn render(&self, step: Transition, ctx: &CallContext) -> Response {
        match step {
            Transition::Greet => Response::new()
                .get_input(collect(
                    node_url(ctx, MenuNode::LanguageProcess),
                    Speak::new(prompts::WELCOME),
                ))
                .speak(Speak::new(prompts::NO_INPUT_GOODBYE)),

            Transition::OfferActions(lang) => Response::new().get_input(collect(
                node_url(ctx, MenuNode::ActionProcess(lang)),
                prompts::ACTION_MENU.speak(lang),
            )),

            Transition::PlayMessage(lang) => Response::new()
                .speak(prompts::PLAYING_MESSAGE.speak(lang))
                .play(prompts::audio_url(lang))
                .speak(prompts::GOODBYE.speak(lang)),

            Transition::ConnectAssociate(lang) => Response::new()
                .speak(prompts::CONNECTING.speak(lang))
                .dial(Dial {
                    caller_id: self.source_number.to_string(),
                    numbers: vec![self.associate_number.to_string()],
                }),

            Transition::Retry { from } => {
                let apology = match from {
                    MenuNode::ActionProcess(lang) => prompts::INVALID_INPUT.speak(lang),
                    MenuNode::Welcome | MenuNode::LanguageProcess => {
                        Speak::new(prompts::INVALID_SELECTION)
                    }
                };
                Response::new()
                    .speak(apology)
                    .redirect(node_url(ctx, MenuNode::Welcome))
            }
        }
    }
}

fn collect(action: String, prompt: Speak) -> GetInput {
    GetInput {
        action,
        num_digits: 1,
        prompts: vec![prompt],
    }
}

/// Absolute webhook URL for `node`, carrying `lang` and the session token
pub fn node_url(ctx: &CallContext, node: MenuNode) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    let mut has_query = false;
    if let Some(lang) = node.language() {
        query.append_pair("lang", lang.as_param());
        has_query = true;
    }
    if let Some(token) = &ctx.session {
        query.append_pair("sid", token.as_str());
        has_query = true;
    }

    let mut url = format!("{}{}", ctx.base_url, node.path());
    if has_query {
        url.push('?');
        url.push_str(&query.finish());
    }
    url
}

