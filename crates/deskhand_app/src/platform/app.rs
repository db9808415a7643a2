use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use client_logging::{client_info, client_warn};
use deskhand_core::{update, AppState, Effect, Msg};

use super::bindings::{self, Command};
use super::config::AppConfig;
use super::effects::EffectRunner;
use super::logging::{self, LogDestination};
use super::persistence;
use super::ui;

pub fn run_app() -> anyhow::Result<()> {
    logging::initialize(LogDestination::File);

    let config = AppConfig::from_env();
    client_info!("deskhand starting against {}", config.base_url);

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(&config, msg_tx.clone())?;
    let running = Arc::new(AtomicBool::new(true));
    spawn_input_thread(msg_tx.clone(), running.clone());

    let mut state = AppState::new();
    state = dispatch(
        state,
        Msg::Started {
            channel: config.channel.clone(),
        },
        &runner,
        &config,
        &running,
    );
    if let Some(prefs) = persistence::load_prefs(&config.downloads_dir) {
        state = dispatch(state, Msg::RestorePrefs(prefs), &runner, &config, &running);
    }

    while running.load(Ordering::SeqCst) {
        match msg_rx.recv_timeout(Duration::from_millis(75)) {
            Ok(msg) => {
                state = dispatch(state, msg, &runner, &config, &running);
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    client_info!("deskhand stopped");
    Ok(())
}

/// One turn of the loop: update, execute effects, re-render when dirty.
fn dispatch(
    state: AppState,
    msg: Msg,
    runner: &EffectRunner,
    config: &AppConfig,
    running: &Arc<AtomicBool>,
) -> AppState {
    let (mut state, effects) = update(state, msg);
    for effect in effects {
        match effect {
            Effect::OpenLogin { location } => {
                client_warn!("session expired, login required at {}", location);
                println!("Session expired; sign in at {location} and start deskhand again.");
                running.store(false, Ordering::SeqCst);
            }
            Effect::SavePrefs(prefs) => {
                persistence::save_prefs(&config.downloads_dir, &prefs);
            }
            other => runner.run(other),
        }
    }
    if state.consume_dirty() {
        print!("{}", ui::render::render(&state.view()));
    }
    state
}

fn spawn_input_thread(msg_tx: mpsc::Sender<Msg>, running: Arc<AtomicBool>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match bindings::parse_command(&line) {
                Ok(Command::Quit) => {
                    running.store(false, Ordering::SeqCst);
                    // Wake the main loop so it notices the flag.
                    let _ = msg_tx.send(Msg::NoOp);
                    break;
                }
                Ok(Command::Help) => println!("{}", bindings::help_text()),
                Ok(Command::Dispatch(msgs)) => {
                    for msg in msgs {
                        if msg_tx.send(msg).is_err() {
                            return;
                        }
                    }
                }
                Err(err) => println!("{err}"),
            }
            if !running.load(Ordering::SeqCst) {
                break;
            }
        }
    });
}
