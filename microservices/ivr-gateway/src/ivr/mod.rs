//! IVR Flow Controller
//!
//! Three-node voice menu driven by provider webhooks: welcome, language
//! selection and action selection. Each webhook is answered from the caller's
//! last digit and the call context alone.

mod controller;
mod flow;
mod prompts;


pub use controller::{node_url, IvrFlowController};
pub use flow::{transition, DigitInput, Language, MenuNode, Transition};
pub use prompts::{ENGLISH_AUDIO_URL, SPANISH_AUDIO_URL};
