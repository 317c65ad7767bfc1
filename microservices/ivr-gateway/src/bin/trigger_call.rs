//! Standalone call trigger
//!
//! Places one outbound call whose answer URL is used exactly as given.

use std::process::ExitCode;

use clap::Parser;
use inspire_core::PhoneNumber;
use ivr_gateway::config::{ProviderConfig, ProviderCredentials};
use ivr_gateway::provider::{AnswerMethod, OutboundCall, PlivoClient, VoiceProvider};
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(
    name = "trigger-call",
    about = "Place an outbound IVR call",
    after_help = "Example: trigger-call https://your-server.ngrok-free.app/ivr/welcome"
)]
struct Cli {
    /// URL the provider fetches when the call is answered
    answer_url: String,

    /// Destination number (defaults to TARGET_NUMBER)
    #[arg(long, env = "TARGET_NUMBER")]
    to: Option<String>,

    /// Caller number
    #[arg(long, env = "PLIVO_SOURCE_NUMBER")]
    from: Option<String>,
}

/// `--help`/`--version` succeed; every other usage error exits 1
fn usage_exit_code(err: &clap::Error) -> u8 {
    if err.use_stderr() {
        1
    } else {
        0
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = inspire_telemetry::init("trigger-call") {
        eprintln!("{}", e);
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(usage_exit_code(&e));
        }
    };

    if ProviderCredentials::from_env().is_err() {
        eprintln!("Error: PLIVO_AUTH_ID and PLIVO_AUTH_TOKEN must be set");
        return ExitCode::FAILURE;
    }

    let provider_config = match ProviderConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let (Some(from), Some(to)) = (
        cli.from.as_deref().and_then(PhoneNumber::parse),
        cli.to.as_deref().and_then(PhoneNumber::parse),
    ) else {
        eprintln!("Error: PLIVO_SOURCE_NUMBER and TARGET_NUMBER (or --from/--to) must be set");
        return ExitCode::FAILURE;
    };

    let client = match PlivoClient::new(&provider_config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let call = OutboundCall {
        from,
        to,
        answer_url: cli.answer_url,
        answer_method: AnswerMethod::Get,
    };

    info!(
        from = %call.from,
        to = %call.to,
        answer_url = %call.answer_url,
        "Initiating call"
    );

    match client.originate(&call).await {
        Ok(handle) => {
            println!("Call initiated successfully!");
            match serde_json::to_string_pretty(&handle) {
                Ok(json) => println!("{}", json),
                Err(_) => println!("{:?}", handle),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Error initiating call");
            eprintln!("Error initiating call: {}", e);
            ExitCode::FAILURE
        }
    }
}
