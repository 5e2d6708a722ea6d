//! TUI runtime - owns terminal, runs event loop, executes effects.
//!
//! This is the "Elm runtime" boundary: all side effects happen here.
//! The reducer stays pure and produces effects; this module executes them.
//!
//! ## Inbox pattern
//!
//! Async handlers send `UiEvent`s to `inbox_tx`; the runtime drains
//! `inbox_rx` each loop iteration. Session changes arrive the same way,
//! forwarded from the session store's watch channel by a background task.

mod handlers;

use std::future::Future;
use std::io::Stdout;

use anyhow::{Context, Result};
use crossterm::event;
use gatehouse_core::backend::{AuthClient, ProfilesClient};
use gatehouse_core::config::BackendConfig;
use gatehouse_core::session::SessionHub;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::common::{TaskCompleted, TaskId, TaskKind, TaskStarted};
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::router::Route;
use crate::state::AppState;
use crate::{render, terminal, update};

/// Target frame rate while something is happening (~60fps).
pub const FRAME_DURATION: std::time::Duration = std::time::Duration::from_millis(16);

/// Poll duration when idle. Longer timeout reduces CPU usage when nothing
/// is happening.
pub const IDLE_POLL_DURATION: std::time::Duration = std::time::Duration::from_millis(100);

/// Full-screen TUI runtime.
///
/// Owns the terminal and state. Runs the event loop and executes effects.
/// Terminal state is guaranteed to be restored on drop, panic, or Ctrl+C.
pub struct TuiRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pub state: AppState,
    /// Inbox sender - handlers send events here.
    inbox_tx: mpsc::UnboundedSender<UiEvent>,
    /// Inbox receiver - runtime drains this each loop iteration.
    inbox_rx: mpsc::UnboundedReceiver<UiEvent>,
    auth: AuthClient,
    profiles: ProfilesClient,
    /// Cancels the background forwarder tasks on drop.
    shutdown: CancellationToken,
    last_tick: std::time::Instant,
    /// Last time a terminal event was received (for fast tick during
    /// interaction).
    last_terminal_event: std::time::Instant,
}

impl TuiRuntime {
    /// Creates a new TUI runtime and kicks off the session restore.
    pub fn new(backend: BackendConfig, start: Route) -> Result<Self> {
        // Set up panic hook BEFORE entering alternate screen.
        terminal::install_panic_hook();

        let hub = SessionHub::new();
        let auth = AuthClient::new(backend.clone(), hub.clone())?;
        let profiles = ProfilesClient::new(backend)?;

        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;
        let state = AppState::new(start);

        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();

        // Forward session snapshots into the inbox for the reducer.
        {
            let tx = inbox_tx.clone();
            let mut rx = hub.subscribe();
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        () = shutdown.cancelled() => break,
                        changed = rx.changed() => {
                            if changed.is_err() {
                                break;
                            }
                            let snapshot = rx.borrow_and_update().clone();
                            if tx.send(UiEvent::SessionChanged(snapshot)).is_err() {
                                break;
                            }
                        }
                    }
                }
            });
        }

        // Restore any persisted session; the hub publish above reports back.
        {
            let auth = auth.clone();
            tokio::spawn(async move {
                auth.bootstrap().await;
            });
        }

        let now = std::time::Instant::now();
        Ok(Self {
            terminal,
            state,
            inbox_tx,
            inbox_rx,
            auth,
            profiles,
            shutdown,
            last_tick: now,
            last_terminal_event: now,
        })
    }

    /// Runs the main event loop.
    pub fn run(&mut self) -> Result<()> {
        terminal::enable_input_features()?;
        let result = self.event_loop();
        let _ = terminal::disable_input_features();
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        let mut dirty = true; // Start dirty to ensure initial render

        while !self.state.tui.should_quit {
            let mut events = self.collect_events()?;

            // Prepend Frame with the current size so layout-dependent
            // handling sees it before other events.
            let size = self.terminal.size()?;
            events.insert(
                0,
                UiEvent::Frame {
                    width: size.width,
                    height: size.height,
                },
            );

            for event in events {
                if matches!(&event, UiEvent::Terminal(_)) {
                    self.last_terminal_event = std::time::Instant::now();
                }

                // Only Tick triggers a render; input batches to the next
                // tick, which caps the frame rate at the tick cadence.
                if matches!(&event, UiEvent::Tick) {
                    dirty = true;
                }

                let effects = update::update(&mut self.state, event);
                self.execute_effects(effects);
            }

            if dirty {
                self.terminal.draw(|frame| {
                    render::render(&self.state, frame);
                })?;
                dirty = false;
            }
        }

        Ok(())
    }

    /// Collects events from the terminal and the inbox.
    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        // Fast polling while tasks run or the user is interacting;
        // otherwise slow polling to save CPU.
        let recent_terminal_activity = self.last_terminal_event.elapsed() < IDLE_POLL_DURATION;
        let needs_fast_poll = self.state.tui.tasks.is_any_running() || recent_terminal_activity;
        let tick_interval = if needs_fast_poll {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        let time_until_tick = tick_interval.saturating_sub(self.last_tick.elapsed());
        // Block until the next tick is due unless there is already work.
        let poll_duration = if events.is_empty() {
            time_until_tick
        } else {
            std::time::Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(std::time::Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = std::time::Instant::now();
        }

        Ok(events)
    }

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Spawns an async handler with a uniform TaskStarted/TaskCompleted
    /// lifecycle around it.
    fn spawn_task<F, Fut>(&self, kind: TaskKind, id: TaskId, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        let started = TaskStarted { id };
        let _ = tx.send(UiEvent::TaskStarted { kind, started });
        tokio::spawn(async move {
            let inner = f().await;
            let completed = TaskCompleted {
                id,
                result: Box::new(inner),
            };
            let _ = tx.send(UiEvent::TaskCompleted { kind, completed });
        });
    }

    /// Access token from the current session snapshot, for the data calls.
    fn access_token(&self) -> Option<String> {
        self.auth
            .hub()
            .snapshot()
            .session
            .map(|session| session.access_token)
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.tui.should_quit = true;
            }

            UiEffect::SignIn {
                task,
                email,
                password,
            } => {
                let auth = self.auth.clone();
                self.spawn_task(TaskKind::SignIn, task, move || {
                    handlers::sign_in(auth, email, password)
                });
            }
            UiEffect::SignUp {
                task,
                email,
                password,
            } => {
                let auth = self.auth.clone();
                self.spawn_task(TaskKind::SignUp, task, move || {
                    handlers::sign_up(auth, email, password)
                });
            }
            UiEffect::SignOut { task } => {
                let auth = self.auth.clone();
                self.spawn_task(TaskKind::SignOut, task, move || handlers::sign_out(auth));
            }
            UiEffect::SendResetLink {
                task,
                email,
                resend,
            } => {
                let auth = self.auth.clone();
                self.spawn_task(TaskKind::ResetLink, task, move || {
                    handlers::send_reset_link(auth, email, resend)
                });
            }
            UiEffect::UpdatePassword { task, password } => {
                let auth = self.auth.clone();
                self.spawn_task(TaskKind::PasswordUpdate, task, move || {
                    handlers::update_password(auth, password)
                });
            }

            UiEffect::LoadProfile { task, user_id } => {
                let profiles = self.profiles.clone();
                let token = self.access_token();
                self.spawn_task(TaskKind::ProfileLoad, task, move || {
                    handlers::load_profile(profiles, token, user_id)
                });
            }
            UiEffect::SaveProfile {
                task,
                user_id,
                patch,
            } => {
                let profiles = self.profiles.clone();
                let token = self.access_token();
                self.spawn_task(TaskKind::ProfileSave, task, move || {
                    handlers::save_profile(profiles, token, user_id, patch)
                });
            }
            UiEffect::CreateProfile {
                task,
                user_id,
                draft,
            } => {
                let profiles = self.profiles.clone();
                let token = self.access_token();
                self.spawn_task(TaskKind::ProfileCreate, task, move || {
                    handlers::create_profile(profiles, token, user_id, draft)
                });
            }
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        self.shutdown.cancel();
        let _ = terminal::restore_terminal();
    }
}
