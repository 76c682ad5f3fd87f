//! vitalscan backend entry point: newline-delimited JSON IPC over
//! stdin/stdout for an external UI client.

use anyhow::Result;
use clap::Parser;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::io::{self, BufRead, Write};
use std::thread;
use tracing::warn;
use vitalscan::identity::UserId;
use vitalscan::ipc::{IpcCommand, IpcEvent, Session, SessionDeps};
use vitalscan::media::{self, NoCamera};
use vitalscan::store::{HealthStore, MemoryStore, RestStore};
use vitalscan::AppConfig;

fn main() -> Result<()> {
    let config = AppConfig::parse();

    if config.list_input_devices {
        print_input_devices();
        return Ok(());
    }

    vitalscan::init_tracing(&config);

    let (store, store_backend) = build_store(&config)?;
    let mic_available = !media::list_input_devices().is_empty();
    let (events_tx, events_rx) = unbounded::<IpcEvent>();
    let writer = spawn_event_writer(events_rx);

    let deps = SessionDeps {
        store,
        camera: Box::new(NoCamera),
        microphone: build_microphone(&config),
        events: events_tx,
        mic_available,
        input_device: config.input_device.clone(),
        store_backend,
    };
    let initial_user = config.user_id.clone().map(UserId);
    let mut session = Session::new(deps, initial_user);

    let (cmd_tx, cmd_rx) = unbounded::<IpcCommand>();
    let _reader = spawn_stdin_reader(cmd_tx);

    let result = session.run(&cmd_rx, None);
    // Dropping the session closes the event channel so the writer drains
    // everything queued before the process exits.
    drop(session);
    let _ = writer.join();
    result
}

fn build_store(config: &AppConfig) -> Result<(Box<dyn HealthStore>, String)> {
    if let (true, Some(url), Some(key)) =
        (config.store_configured(), &config.store_url, &config.store_key)
    {
        let store = RestStore::new(url, key)?;
        return Ok((Box::new(store), "rest".to_string()));
    }
    warn!("no store configured; assessments will not survive this process");
    Ok((Box::new(MemoryStore::new()), "memory".to_string()))
}

#[cfg(feature = "mic")]
fn build_microphone(config: &AppConfig) -> Box<dyn media::Microphone> {
    Box::new(media::mic::CpalMicrophone::new(
        config.input_device.as_deref(),
    ))
}

#[cfg(not(feature = "mic"))]
fn build_microphone(_config: &AppConfig) -> Box<dyn media::Microphone> {
    Box::new(media::NoMicrophone)
}

fn print_input_devices() {
    let devices = media::list_input_devices();
    if devices.is_empty() {
        println!("No audio input devices detected.");
        return;
    }
    println!("Available audio input devices:");
    for device in devices {
        println!("  {device}");
    }
}

fn spawn_event_writer(events: Receiver<IpcEvent>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for event in events.iter() {
            write_event(&event);
        }
    })
}

fn spawn_stdin_reader(commands: Sender<IpcCommand>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<IpcCommand>(trimmed) {
                Ok(cmd) => {
                    if commands.send(cmd).is_err() {
                        break; // session loop has exited
                    }
                }
                // Parse errors are reported inline so the reader never has
                // to hold the event channel open.
                Err(err) => write_event(&IpcEvent::Error {
                    message: format!("Invalid command: {err}"),
                    recoverable: true,
                }),
            }
        }
    })
}

fn write_event(event: &IpcEvent) {
    if let Ok(json) = serde_json::to_string(event) {
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{json}");
        let _ = stdout.flush();
    }
}
