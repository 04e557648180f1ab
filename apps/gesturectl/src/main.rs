mod console;
mod frames;

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::{Parser, Subcommand};
use control_core::{load_settings, DispatchOutcome, FrameSource, GestureController, Settings};
use shared::domain::NO_TRACK_TEXT;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    console::{render_event, ConsoleCommand, HELP},
    frames::DirectoryFrameSource,
};

#[derive(Parser, Debug)]
#[command(about = "Drive music playback with touch and camera gestures")]
struct Args {
    /// Settings file; defaults to ./gesture.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    backend_url: Option<String>,
    /// Replay jpeg/png frames from this directory as the camera feed.
    #[arg(long)]
    camera_dir: Option<PathBuf>,
    #[arg(long)]
    cooldown_ms: Option<u64>,
    #[arg(long)]
    no_touch: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Interactive session reading gestures and controls from stdin.
    Run,
    /// Print the connection state and exit.
    Status,
    /// Print the current track and exit.
    Track,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    let args = Args::parse();
    let settings = resolve_settings(&args)?;

    match args.command.unwrap_or(Command::Run) {
        Command::Status => {
            let controller = GestureController::from_settings(settings)?;
            println!("{}", controller.refresh_auth().await.indicator_text());
            Ok(())
        }
        Command::Track => {
            let controller = GestureController::from_settings(settings)?;
            let line = controller
                .refresh_track()
                .await
                .map(|track| track.display_line())
                .unwrap_or_else(|| NO_TRACK_TEXT.to_string());
            println!("{line}");
            Ok(())
        }
        Command::Run => run_interactive(settings, args.camera_dir).await,
    }
}

fn resolve_settings(args: &Args) -> Result<Settings> {
    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(url) = &args.backend_url {
        settings.backend_url = url.clone();
    }
    if let Some(cooldown_ms) = args.cooldown_ms {
        settings.cooldown_ms = cooldown_ms;
    }
    if args.no_touch {
        settings.enable_touch_gestures = false;
    }
    if args.camera_dir.is_some() {
        settings.enable_camera_gestures = true;
    }
    settings.validate()?;
    Ok(settings)
}

async fn run_interactive(settings: Settings, camera_dir: Option<PathBuf>) -> Result<()> {
    let frames: Option<Box<dyn FrameSource>> = match camera_dir {
        Some(dir) => Some(Box::new(DirectoryFrameSource::open(&dir).await?)),
        None => None,
    };

    let controller = GestureController::from_settings(settings)?;
    let printer = spawn_event_printer(&controller);
    controller.start(frames).await?;
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => match line? {
                Some(line) => line,
                None => break,
            },
        };
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<ConsoleCommand>() {
            Ok(ConsoleCommand::Quit) => break,
            Ok(command) => handle_command(&controller, command).await,
            Err(message) => println!("{message}"),
        }
    }

    controller.shutdown().await;
    printer.abort();
    info!("gesturectl exiting");
    Ok(())
}

async fn handle_command(controller: &Arc<GestureController>, command: ConsoleCommand) {
    let outcome = match command {
        ConsoleCommand::Gesture(gesture) => {
            match controller.touch_source().await {
                Some(touch) => {
                    touch.emit(gesture);
                }
                None => println!("touch gestures are disabled"),
            }
            return;
        }
        ConsoleCommand::Toggle => controller.toggle_play_pause().await,
        ConsoleCommand::Next => controller.next_track().await,
        ConsoleCommand::Previous => controller.previous_track().await,
        ConsoleCommand::VolumeUp => controller.volume_up().await,
        ConsoleCommand::VolumeDown => controller.volume_down().await,
        ConsoleCommand::Status => {
            println!("{}", controller.refresh_auth().await.indicator_text());
            return;
        }
        ConsoleCommand::Track => {
            let line = controller
                .current_track()
                .map(|track| track.display_line())
                .unwrap_or_else(|| NO_TRACK_TEXT.to_string());
            println!("{line}");
            return;
        }
        ConsoleCommand::CameraOff => {
            if !controller.disable_camera().await {
                println!("camera is not running");
            }
            return;
        }
        ConsoleCommand::Help => {
            println!("{HELP}");
            return;
        }
        ConsoleCommand::Quit => return,
    };
    report(outcome);
}

fn report(outcome: DispatchOutcome) {
    if let Some(error) = outcome.error {
        warn!(%error, "control command failed");
    }
}

fn spawn_event_printer(controller: &Arc<GestureController>) -> tokio::task::JoinHandle<()> {
    let mut events = controller.subscribe_events();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Some(line) = render_event(&event) {
                        println!("{line}");
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event printer lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    })
}
