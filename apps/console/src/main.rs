use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Result;
use clap::Parser;
use client_core::{AppEvent, AppSettings, GameApp, HttpGameApi, UiAction};
use host_bridge::{HostBridge, HostUser};
use shared::domain::UserId;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod settings;
mod terminal;

use commands::{parse_command, ConsoleCommand, HELP};
use settings::load_settings;
use terminal::{ConsoleView, TerminalPlatform};

#[derive(Parser, Debug)]
#[command(name = "adventure-console", about = "Play the adventure client from a terminal")]
struct Args {
    #[arg(long, default_value = "webapp.toml")]
    config: PathBuf,
    /// Overrides the configured game server URL.
    #[arg(long)]
    api_url: Option<String>,
    /// Host user id; without it the client runs anonymously.
    #[arg(long)]
    user_id: Option<i64>,
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    username: Option<String>,
    /// Start as if opened outside the host.
    #[arg(long)]
    no_host: bool,
}

impl Args {
    fn host_user(&self) -> Option<HostUser> {
        self.user_id.map(|id| HostUser {
            id: UserId(id),
            first_name: self.first_name.clone(),
            username: self.username.clone(),
            language_code: None,
        })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();
    run(args).await
}

async fn run(args: Args) -> Result<()> {
    let mut settings = load_settings(&args.config)?;
    if let Some(url) = &args.api_url {
        settings.api_url = url.clone();
    }
    info!(api_url = %settings.api_url, "console client starting");

    let mut platform = TerminalPlatform::stdout(args.host_user());
    if args.no_host {
        platform = platform.detached();
    }
    let platform = Arc::new(platform);
    let bridge = Arc::new(HostBridge::new(platform.clone()));
    let api = Arc::new(HttpGameApi::new(
        &settings.api_url,
        Duration::from_secs(settings.request_timeout_secs),
    )?);

    let (mut app, mut events) = GameApp::new(
        bridge,
        api,
        ConsoleView::stdout(),
        AppSettings {
            dice_difficulty: settings.dice_difficulty,
        },
    );
    if !app.start() {
        return Ok(());
    }

    let loading = app.sender();
    let delay = Duration::from_millis(settings.loading_delay_ms);
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let _ = loading.send(AppEvent::Ui(UiAction::FinishLoading));
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(event) = events.recv() => app.handle(event),
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("stdin closed");
                    break;
                };
                if platform.answer_confirm(&line) {
                    continue;
                }
                let command = parse_command(&line);
                if platform.has_pending_confirm() && command.waits_for_confirm() {
                    println!("[confirm] answer y or n first ('quit' exits)");
                    continue;
                }
                match command {
                    ConsoleCommand::Action(action) => app.handle(AppEvent::Ui(action)),
                    ConsoleCommand::Help => println!("{HELP}"),
                    ConsoleCommand::Quit => break,
                    ConsoleCommand::Empty => {}
                    ConsoleCommand::Unknown(word) => {
                        println!("unknown command '{word}', type 'help'");
                    }
                }
            }
        }
    }

    info!("console client stopped");
    Ok(())
}
