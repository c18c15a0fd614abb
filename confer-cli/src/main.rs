mod display;
mod input;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use confer_client::{
    ClientConfig, Conference, ConferenceEvent, ConferenceHandle, EarlyCandidatePolicy, PeerTable,
};
use display::{describe_event, describe_peers, diff_peers};
use input::{HELP, Input, parse, resolve_user};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "confer", version, about = "Join a mesh conference from the terminal")]
struct Args {
    /// Room to join
    room: String,

    /// Signaling server WebSocket url
    #[arg(long, env = "CONFER_SERVER", default_value = "ws://127.0.0.1:5000/ws")]
    server: String,

    /// Display name shown to other participants
    #[arg(short, long)]
    name: Option<String>,

    /// Queue ICE candidates that arrive before the remote description
    #[arg(long)]
    buffer_candidates: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();

    let name = match args.name {
        Some(name) => name,
        None => dialoguer::Input::<String>::new()
            .with_prompt("Display name")
            .interact_text()
            .context("Failed to read display name")?,
    };

    let mut config = ClientConfig::new(&args.server, args.room.as_str(), name);
    if args.buffer_candidates {
        config = config.with_early_candidates(EarlyCandidatePolicy::Buffer);
    }

    println!(
        "{} {} {}",
        "📡 Joining".green().bold(),
        args.room.bold(),
        format!("via {}", args.server).dimmed()
    );

    let (handle, events) = Conference::new(config)
        .join()
        .await
        .with_context(|| format!("Failed to connect to {}", args.server))?;
    println!("{}", "Type /help for commands".dimmed());

    let lines = spawn_stdin_reader();
    run(handle, events, lines).await
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).await.is_err() {
                break;
            }
        }
        debug!("stdin closed");
    });
    rx
}

async fn run(
    handle: ConferenceHandle,
    mut events: mpsc::UnboundedReceiver<ConferenceEvent>,
    mut lines: mpsc::Receiver<String>,
) -> Result<()> {
    let mut peers = handle.peers();
    let mut shown = PeerTable::new();
    let mut hand_raised = false;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                if let ConferenceEvent::HandRaised(raised) = event {
                    hand_raised = raised;
                }
                println!("{}", describe_event(&event, &shown));
                if event.is_terminal() {
                    break;
                }
            }
            changed = peers.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = peers.borrow_and_update().clone();
                for change in diff_peers(&shown, &current) {
                    println!("{}", change);
                }
                shown = current;
            }
            line = lines.recv() => {
                let Some(line) = line else {
                    handle.leave().await;
                    return Ok(());
                };
                match parse(&line) {
                    Ok(Some(Input::Leave)) => {
                        handle.leave().await;
                        println!("{}", describe_event(&ConferenceEvent::Left, &shown));
                        return Ok(());
                    }
                    Ok(Some(input)) => {
                        if let Err(e) = dispatch(&handle, input, &shown, hand_raised).await {
                            println!("{} {:#}", "!".red().bold(), e);
                        }
                    }
                    Ok(None) => {}
                    Err(e) => println!("{} {:#}", "!".red().bold(), e),
                }
            }
        }
    }

    handle.leave().await;
    Ok(())
}

async fn dispatch(
    handle: &ConferenceHandle,
    input: Input,
    peers: &PeerTable,
    hand_raised: bool,
) -> Result<()> {
    match input {
        Input::Hand => handle.toggle_hand(!hand_raised).await?,
        Input::React(emoji) => handle.send_reaction(emoji).await?,
        Input::Kick(user) => handle.kick(resolve_user(peers, &user)?).await?,
        Input::Mute(user) => handle.mute(resolve_user(peers, &user)?).await?,
        Input::End => handle.end_meeting_for_all().await?,
        Input::Peers => println!("{}", describe_peers(peers)),
        Input::Help => println!("{}", HELP),
        Input::Chat(text) => handle.send_chat(text).await?,
        Input::Leave => {}
    }
    Ok(())
}
