//! tutor-chat – terminal front end for the math tutor relay.
//!
//! Each input line is sent as one message; the transcript grows below it.
//! `/quit` (or end of input) exits.

mod render;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use tutor_client::{ChatSession, ChatState, DEFAULT_GREETING, RelayClient};

#[derive(Parser)]
#[command(name = "tutor-chat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Relay endpoint to POST messages to.
    #[arg(short, long, default_value = "http://127.0.0.1:3000/chat")]
    endpoint: String,

    /// Key sent as `apikey` and bearer token, for relays behind a gateway.
    #[arg(long, env = "TUTOR_RELAY_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Greeting the transcript starts with.
    #[arg(long, default_value = DEFAULT_GREETING)]
    greeting: String,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut relay = RelayClient::new(&cli.endpoint)?;
    if let Some(key) = cli.api_key {
        relay = relay.with_api_key(key);
    }
    info!(endpoint = %relay.endpoint(), "chat session starting");

    let mut session = ChatSession::new(relay, ChatState::new(cli.greeting));
    let mut shown = print_new(&session, 0);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim() == "/quit" {
            break;
        }

        session.set_input(line);
        let notices = session.send().await;
        shown = print_new(&session, shown);
        for notice in &notices {
            eprintln!("{}", render::notice_line(notice));
        }
    }

    Ok(())
}

/// Print transcript entries past `shown`; returns the new count.
fn print_new(session: &ChatSession<RelayClient>, shown: usize) -> usize {
    let transcript = &session.state().transcript;
    for message in transcript.iter().skip(shown) {
        println!("{}", render::message_line(message));
    }
    transcript.len()
}
