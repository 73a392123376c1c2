use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Select;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tether_client::{
    CallConfig, CallController, CallEvent, CallState, ConnectionState, MemoryStore,
    RtcTransportFactory, SampleMediaDevices, SessionState,
};
use tokio::sync::{mpsc, watch};
use tracing_subscriber::EnvFilter;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const EXIT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "tether", version, about = "Peer-to-peer call signaling over a shared store")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs an initiator and a responder against one in-process store.
    Demo {
        /// Drive microphone, camera and hang up from a menu.
        #[arg(short, long)]
        interactive: bool,

        /// JSON call configuration.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Seconds to keep the call up when not interactive.
        #[arg(long, default_value_t = 3)]
        hold: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Demo {
            interactive,
            config,
            hold,
        } => {
            let config = load_config(config.as_deref())?;
            run_demo(config, interactive, Duration::from_secs(hold)).await?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<CallConfig> {
    let Some(path) = path else {
        return Ok(CallConfig::default());
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    CallConfig::from_json(&text).with_context(|| format!("Invalid config {}", path.display()))
}

fn party(config: &CallConfig, store: &MemoryStore) -> (CallController, mpsc::UnboundedReceiver<CallEvent>) {
    CallController::new(
        config.clone(),
        Arc::new(store.clone()),
        Arc::new(SampleMediaDevices::new()),
        Arc::new(RtcTransportFactory),
    )
}

fn print_events(name: &'static str, mut events: mpsc::UnboundedReceiver<CallEvent>) {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let line = match event {
                CallEvent::RoomCreated(id) => format!("room created, join token {}", id.as_str().bold()),
                CallEvent::RemoteStream(stream) => format!("remote stream {}", stream.id()),
                CallEvent::Exit(reason) => format!("call exited: {}", reason),
            };
            println!("   {} {}", format!("[{name}]").magenta(), line);
        }
    });
}

fn describe(state: &CallState) -> String {
    format!(
        "session {}, transport {}, mic {}, camera {}",
        state.session_state,
        state.connection_state,
        if state.mic_on { "on" } else { "off" },
        if state.cam_on { "on" } else { "off" },
    )
}

async fn wait_until<F>(state: &mut watch::Receiver<CallState>, timeout: Duration, predicate: F) -> bool
where
    F: FnMut(&CallState) -> bool,
{
    matches!(tokio::time::timeout(timeout, state.wait_for(predicate)).await, Ok(Ok(_)))
}

async fn run_demo(config: CallConfig, interactive: bool, hold: Duration) -> Result<()> {
    println!("{}", "📞 Starting tether demo...".green().bold());

    let store = MemoryStore::new();
    let (caller, caller_events) = party(&config, &store);
    let (callee, callee_events) = party(&config, &store);
    print_events("initiator", caller_events);
    print_events("responder", callee_events);

    let room_id = caller.start().await.context("Initiator failed to start the call")?;
    println!("{}", "📨 Offer published, responder joining...".cyan());
    callee.join(&room_id).await.context("Responder failed to join the call")?;

    for (name, controller) in [("initiator", &caller), ("responder", &callee)] {
        let mut state = controller.state();
        if wait_until(&mut state, CONNECT_TIMEOUT, |s| {
            s.connection_state == ConnectionState::Connected
        })
        .await
        {
            println!("{}", format!("✅ {name} connected").green());
        } else {
            println!("{}", format!("⚠️  {name} did not connect in time").yellow());
        }
    }

    if interactive {
        run_menu(&caller, &callee).await?;
    } else {
        tokio::time::sleep(hold).await;
        println!("{}", "👋 Initiator hanging up...".cyan());
        caller.hang_up().await;
    }

    let mut responder_state = callee.state();
    if !wait_until(&mut responder_state, EXIT_TIMEOUT, |s| {
        s.session_state == SessionState::Ended
    })
    .await
    {
        println!("{}", "⚠️  Responder did not see the call end".yellow());
    }
    caller.hang_up().await;
    callee.hang_up().await;

    let status = store
        .document(&config.rooms_collection, room_id.as_str())
        .and_then(|doc| doc.get("status").cloned());
    println!("{}", "✨ Demo finished".green().bold());
    println!("   📂 Room:   {}/{}", config.rooms_collection, room_id);
    println!(
        "   📌 Status: {}",
        status.map(|s| s.to_string()).unwrap_or_else(|| "missing".to_owned())
    );

    Ok(())
}

async fn run_menu(caller: &CallController, callee: &CallController) -> Result<()> {
    const ITEMS: [&str; 6] = [
        "Toggle initiator microphone",
        "Toggle initiator camera",
        "Toggle responder microphone",
        "Toggle responder camera",
        "Hang up as initiator",
        "Hang up as responder",
    ];

    loop {
        let choice = tokio::task::spawn_blocking(|| {
            Select::new()
                .with_prompt("Call action")
                .items(&ITEMS[..])
                .default(0)
                .interact()
        })
        .await
        .context("Menu task panicked")?
        .context("Failed to read menu selection")?;

        match choice {
            0 => {
                caller.toggle_mic().await?;
            }
            1 => {
                caller.toggle_camera().await?;
            }
            2 => {
                callee.toggle_mic().await?;
            }
            3 => {
                callee.toggle_camera().await?;
            }
            4 => {
                caller.hang_up().await;
                return Ok(());
            }
            _ => {
                callee.hang_up().await;
                return Ok(());
            }
        }

        println!("   initiator: {}", describe(&caller.state().borrow()));
        println!("   responder: {}", describe(&callee.state().borrow()));
    }
}
