//! # EDO Keyboard - Playable Equal-Division Keyboard GUI
//!
//! This module contains the main GUI application for the EDO keyboard. It
//! shows a keyboard labelled with the current degree names, plays each key at
//! its equal-division frequency and lets the user rename degrees, change the
//! base frequency and choose which octaves are shown.
//!
//! ## Architecture
//! - **Main Thread**: Iced GUI application with dark theme
//! - **Audio Thread**: Dedicated thread owning the output stream
//! - **Communication**: Crossbeam channels for tone commands and tuning events
//! - **Updates**: Periodic tick drains tuning events and rebuilds the key layout

mod ui;
mod widgets;

use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use anyhow::Context;
use clap::Parser;
use cpal::traits::StreamTrait;
use crossbeam_channel::{Receiver, Sender};
use edo_core::error::ProfileError;
use edo_core::keyboard::{Key, KeyboardRange};
use edo_core::{
    EdoTuning, JsonProfileStore, MemoryProfileStore, ProfileStore, StoredProfile, ToneCommand,
    TuningEvent, TuningSession, audio,
};
use iced::{Element, Subscription, Task, Theme};
use log::{error, info, warn};
use ui::main_display::create_main_view;
use ui::settings_panel::{format_degree_list, parse_base_frequency, parse_degree_list};

/// Interval between event-draining ticks.
const TICK_INTERVAL_MS: u64 = 50;

/// Play an equal-division-of-the-octave keyboard
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON file the tuning is saved to and restored from
    #[arg(long, default_value = "edo_profile.json")]
    profile: PathBuf,

    /// Keep the tuning in memory only
    #[arg(long)]
    ephemeral: bool,

    /// First octave shown on the keyboard
    #[arg(long, default_value_t = 3)]
    start_octave: u32,

    /// Number of octaves shown on the keyboard
    #[arg(long, default_value_t = 2)]
    octaves: u32,

    /// Master volume (0.0 - 1.0)
    #[arg(long, default_value_t = 0.2)]
    volume: f32,
}

/// Main entry point for the EDO keyboard application.
pub fn main() -> iced::Result {
    env_logger::init();
    let args = Args::parse();

    info!("[MAIN] Starting EDO keyboard...");
    let result = iced::application("EDO Keyboard", EdoApp::update, EdoApp::view)
        .subscription(EdoApp::subscription)
        .theme(EdoApp::theme)
        .run_with(move || (EdoApp::new(args), Task::none()));
    info!("[MAIN] Application finished with result: {:?}", result);
    result
}

/// Application message types for the Iced GUI framework.
#[derive(Debug, Clone)]
pub enum Message {
    // Keyboard interactions (index into the current key layout)
    KeyPressed(usize),
    KeyReleased(usize),

    // Tuning settings
    DegreesInput(String),
    DegreesSubmitted,
    BaseFrequencyInput(String),
    BaseFrequencySubmitted,
    Reset,

    // Octave window
    StartOctaveChanged(u32),
    OctavesChanged(u32),

    // Continuous update message
    Tick,
}

/// Where the tuning is persisted, chosen on the command line.
#[derive(Debug)]
enum ProfileMedium {
    File(JsonProfileStore),
    Memory(MemoryProfileStore),
}

impl ProfileStore for ProfileMedium {
    fn load(&self) -> Result<StoredProfile, ProfileError> {
        match self {
            ProfileMedium::File(store) => store.load(),
            ProfileMedium::Memory(store) => store.load(),
        }
    }

    fn store_notes(&mut self, notes: Option<&[String]>) -> Result<(), ProfileError> {
        match self {
            ProfileMedium::File(store) => store.store_notes(notes),
            ProfileMedium::Memory(store) => store.store_notes(notes),
        }
    }

    fn store_base_frequency(&mut self, base_frequency: Option<f64>) -> Result<(), ProfileError> {
        match self {
            ProfileMedium::File(store) => store.store_base_frequency(base_frequency),
            ProfileMedium::Memory(store) => store.store_base_frequency(base_frequency),
        }
    }

    fn clear(&mut self) -> Result<(), ProfileError> {
        match self {
            ProfileMedium::File(store) => store.clear(),
            ProfileMedium::Memory(store) => store.clear(),
        }
    }
}

/// UI-specific data needed for rendering the interface.
#[derive(Debug, Clone)]
pub struct AppDisplayData {
    pub tuning: EdoTuning,
    pub touched: bool,
    pub range: KeyboardRange,
    pub keys: Vec<Key>,
    pub pressed_key: Option<usize>,

    // Settings text fields and the last validation error
    pub degrees_input: String,
    pub base_frequency_input: String,
    pub input_error: Option<String>,

    pub audio_active: bool,
}

/// Main application state for the EDO keyboard.
#[derive(Debug)]
struct EdoApp {
    session: TuningSession<ProfileMedium>,
    tuning_events: Receiver<TuningEvent>,
    audio_worker: Option<AudioWorker>,

    // Single source of truth for all display data
    display_data: AppDisplayData,
}

/// Audio worker thread management structure.
///
/// The thread owns the output stream; dropping the worker stops it.
#[derive(Debug)]
struct AudioWorker {
    command_tx: Sender<ToneCommand>,
    shutdown_tx: Sender<()>,
    thread_handle: Option<JoinHandle<()>>,
}

impl AudioWorker {
    /// Spawns the audio thread and waits for it to report whether the stream started.
    fn start(volume: f32) -> anyhow::Result<Self> {
        let (command_tx, command_rx) = crossbeam_channel::unbounded::<ToneCommand>();
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(1);
        let (ready_tx, ready_rx) = crossbeam_channel::bounded::<anyhow::Result<u32>>(1);

        let thread_handle = thread::spawn(move || {
            info!("[AUDIO-THREAD] Starting audio output...");
            let (stream, sample_rate) = match audio::start_audio_output(command_rx, volume) {
                Ok(started) => started,
                Err(e) => {
                    error!("[AUDIO-THREAD] Fatal Error starting audio: {}", e);
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };
            let _ = ready_tx.send(Ok(sample_rate));

            // Blocks until shutdown is requested or the worker is dropped.
            let _ = shutdown_rx.recv();

            info!("[AUDIO-THREAD] Stopping stream and exiting...");
            if let Err(e) = stream.pause() {
                warn!("[AUDIO-THREAD] Error pausing stream: {}", e);
            }
            drop(stream);
        });

        let worker = Self {
            command_tx,
            shutdown_tx,
            thread_handle: Some(thread_handle),
        };
        let sample_rate = ready_rx
            .recv()
            .context("audio thread exited before reporting")??;
        info!("[MAIN] Audio output running at {} Hz", sample_rate);
        Ok(worker)
    }

    fn send(&self, command: ToneCommand) {
        if self.command_tx.send(command).is_err() {
            warn!("[MAIN] Audio thread is gone, tone command dropped");
        }
    }
}

impl Drop for AudioWorker {
    fn drop(&mut self) {
        info!("[MAIN] Shutting down audio worker...");
        let _ = self.shutdown_tx.send(());
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                error!("[MAIN] Audio thread panicked");
            }
        }
    }
}

impl EdoApp {
    /// Opens the tuning session, starts audio and lays out the keyboard.
    ///
    /// A profile file that cannot be read is reported and replaced by an
    /// in-memory session so the keyboard still starts.
    fn new(args: Args) -> Self {
        info!("[MAIN] Creating EdoApp...");
        let session = if args.ephemeral {
            open_in_memory()
        } else {
            let store = JsonProfileStore::new(&args.profile);
            match TuningSession::open(ProfileMedium::File(store)) {
                Ok(session) => session,
                Err(e) => {
                    error!(
                        "[MAIN] Could not read profile {}: {}; keeping changes in memory",
                        args.profile.display(),
                        e
                    );
                    open_in_memory()
                }
            }
        };
        let audio_worker = match AudioWorker::start(args.volume) {
            Ok(worker) => Some(worker),
            Err(e) => {
                warn!("[MAIN] Audio unavailable, keys will be silent: {:#}", e);
                None
            }
        };
        Self::with_session(
            session,
            KeyboardRange::new(args.start_octave, args.octaves),
            audio_worker,
        )
    }

    fn with_session(
        mut session: TuningSession<ProfileMedium>,
        range: KeyboardRange,
        audio_worker: Option<AudioWorker>,
    ) -> Self {
        let tuning_events = session.subscribe();
        let tuning = session.tuning().clone();
        let mut app = Self {
            display_data: AppDisplayData {
                degrees_input: format_degree_list(tuning.degrees()),
                base_frequency_input: tuning.base_frequency().to_string(),
                tuning,
                touched: session.is_touched(),
                range,
                keys: Vec::new(),
                pressed_key: None,
                input_error: None,
                audio_active: audio_worker.is_some(),
            },
            session,
            tuning_events,
            audio_worker,
        };
        app.refresh_keys();
        app
    }

    fn update(&mut self, message: Message) {
        if !matches!(message, Message::Tick) {
            info!("[UPDATE] Received message: {:?}", message);
        }

        match message {
            Message::KeyPressed(index) => {
                if let Some(key) = self.display_data.keys.get(index) {
                    self.send_tone(ToneCommand::Start {
                        id: voice_id(index),
                        frequency: key.frequency,
                    });
                    self.display_data.pressed_key = Some(index);
                }
            }
            Message::KeyReleased(index) => {
                if index < self.display_data.keys.len() {
                    self.send_tone(ToneCommand::Stop { id: voice_id(index) });
                }
                self.display_data.pressed_key = None;
            }
            Message::DegreesInput(input) => {
                self.display_data.degrees_input = input;
            }
            Message::DegreesSubmitted => {
                let degrees = parse_degree_list(&self.display_data.degrees_input);
                match self.session.set_degrees(degrees) {
                    Ok(changed) => {
                        self.display_data.input_error = None;
                        if !changed {
                            info!("[MAIN] Degree set unchanged");
                        }
                    }
                    Err(e) => self.report_profile_error(e),
                }
            }
            Message::BaseFrequencyInput(input) => {
                self.display_data.base_frequency_input = input;
            }
            Message::BaseFrequencySubmitted => {
                match parse_base_frequency(&self.display_data.base_frequency_input) {
                    Ok(frequency) => match self.session.set_base_frequency(frequency) {
                        Ok(()) => self.display_data.input_error = None,
                        Err(e) => self.report_profile_error(e),
                    },
                    Err(reason) => self.display_data.input_error = Some(reason),
                }
            }
            Message::Reset => {
                if let Err(e) = self.session.reset() {
                    self.report_profile_error(e);
                }
            }
            Message::StartOctaveChanged(start_octave) => {
                self.display_data.range = self.display_data.range.with_start_octave(start_octave);
                self.refresh_keys();
            }
            Message::OctavesChanged(octaves) => {
                self.display_data.range = self.display_data.range.with_octaves(octaves);
                self.refresh_keys();
            }
            Message::Tick => {
                // Collect first; applying an event borrows self mutably.
                let events: Vec<TuningEvent> = self.tuning_events.try_iter().collect();
                for event in events {
                    self.apply_tuning_event(event);
                }
            }
        }
    }

    fn apply_tuning_event(&mut self, event: TuningEvent) {
        info!(
            "[MAIN] Tuning changed: {} degrees at {} Hz",
            event.tuning().degree_count(),
            event.tuning().base_frequency()
        );
        let tuning = event.tuning().clone();
        self.display_data.degrees_input = format_degree_list(tuning.degrees());
        self.display_data.base_frequency_input = tuning.base_frequency().to_string();
        self.display_data.tuning = tuning;
        self.display_data.touched = self.session.is_touched();
        self.refresh_keys();
    }

    /// Rebuilds the key layout and silences anything still sounding.
    fn refresh_keys(&mut self) {
        self.display_data.keys = match self.display_data.range.keys(&self.display_data.tuning) {
            Ok(keys) => keys,
            Err(e) => {
                error!("[MAIN] Could not lay out keyboard: {}", e);
                Vec::new()
            }
        };
        self.display_data.pressed_key = None;
        self.send_tone(ToneCommand::StopAll);
    }

    fn send_tone(&self, command: ToneCommand) {
        if let Some(worker) = &self.audio_worker {
            worker.send(command);
        }
    }

    fn report_profile_error(&mut self, e: ProfileError) {
        error!("[MAIN] Error saving tuning: {}", e);
        self.display_data.input_error = Some(format!("Could not save tuning: {}", e));
    }

    fn view(&self) -> Element<'_, Message> {
        create_main_view(&self.display_data)
    }

    fn subscription(&self) -> Subscription<Message> {
        iced::time::every(std::time::Duration::from_millis(TICK_INTERVAL_MS)).map(|_| Message::Tick)
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn open_in_memory() -> TuningSession<ProfileMedium> {
    let store = MemoryProfileStore::default();
    let stored = store.profile().clone();
    TuningSession::from_profile(ProfileMedium::Memory(store), &stored)
}

/// Voice id for the key at `index` of the current layout.
///
/// Labels repeat when degree names do, so voices are keyed by position.
fn voice_id(index: usize) -> String {
    format!("key-{index}")
}
