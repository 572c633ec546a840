//! Screen state and key handling for the interactive counter.
//!
//! Nothing here touches the terminal, so every transition can be driven from
//! tests with plain key codes.

use chrono::Utc;
use crossterm::event::KeyCode;

use crate::db::KeyValueStore;
use crate::display;
use crate::models::TrackingSession;
use crate::store::SessionStore;
use crate::timer::{DiscardRequest, SaveError, TickReceiver, TickSender, TrackingTimer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Past records and the entry point for a new recording.
    Home,
    /// An active counting attempt.
    Counter,
}

/// Modal content drawn over the current screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    Guide,
    LowKicks,
    /// "Discard Session?" with Stay / Discard.
    ConfirmDiscard,
    ConfirmDelete(String),
    /// A dismissible notice. `leave_counter` returns to the home screen on dismissal.
    Notice {
        title: String,
        body: String,
        leave_counter: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppResult {
    Continue,
    Quit,
}

pub struct App<S> {
    store: SessionStore<S>,
    pub sessions: Vec<TrackingSession>,
    pub selected: usize,
    pub screen: Screen,
    pub overlay: Option<Overlay>,
    pub timer: Option<TrackingTimer>,
    ticks: Option<TickSender>,
    haptics: bool,
    pending_pulses: u32,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(store: SessionStore<S>, haptics: bool) -> Self {
        let mut app = Self {
            store,
            sessions: Vec::new(),
            selected: 0,
            screen: Screen::Home,
            overlay: None,
            timer: None,
            ticks: None,
            haptics,
            pending_pulses: 0,
        };
        app.refresh_sessions();
        app
    }

    /// Drive counter timers from a ticker feeding `ticks`.
    pub fn with_ticks(mut self, ticks: TickSender) -> Self {
        self.ticks = Some(ticks);
        self
    }

    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    pub fn refresh_sessions(&mut self) {
        self.sessions = self.store.get_all_sessions();
        if self.selected >= self.sessions.len() {
            self.selected = self.sessions.len().saturating_sub(1);
        }
    }

    /// Haptic pulses owed for accepted kicks since the last call.
    pub fn take_pulses(&mut self) -> u32 {
        std::mem::take(&mut self.pending_pulses)
    }

    pub fn on_tick(&mut self) {
        if let Some(timer) = self.timer.as_mut() {
            timer.tick();
        }
    }

    /// Apply queued ticks, then `key` if one arrived.
    ///
    /// Ticks are drained before the key so a second that elapsed before the
    /// final kick is still counted.
    pub fn process(&mut self, ticks: &mut TickReceiver, key: Option<KeyCode>) -> AppResult {
        self.drain_ticks(ticks);
        let result = match key {
            Some(key) => self.handle_key(key),
            None => AppResult::Continue,
        };
        self.drain_ticks(ticks);
        result
    }

    fn drain_ticks(&mut self, ticks: &mut TickReceiver) {
        while ticks.try_recv().is_ok() {
            self.on_tick();
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) -> AppResult {
        if let Some(overlay) = self.overlay.take() {
            self.handle_overlay_key(overlay, key);
            return AppResult::Continue;
        }

        match self.screen {
            Screen::Home => self.handle_home_key(key),
            Screen::Counter => {
                self.handle_counter_key(key);
                AppResult::Continue
            }
        }
    }

    fn handle_overlay_key(&mut self, overlay: Overlay, key: KeyCode) {
        match overlay {
            Overlay::ConfirmDiscard => match key {
                KeyCode::Char('d') | KeyCode::Char('y') => {
                    if let Some(timer) = self.timer.as_mut() {
                        timer.confirm_discard();
                    }
                    self.leave_counter();
                }
                KeyCode::Char('s') | KeyCode::Char('n') | KeyCode::Esc => {}
                _ => self.overlay = Some(Overlay::ConfirmDiscard),
            },
            Overlay::ConfirmDelete(id) => match key {
                KeyCode::Char('y') | KeyCode::Char('d') => self.delete(&id),
                KeyCode::Char('n') | KeyCode::Esc => {}
                _ => self.overlay = Some(Overlay::ConfirmDelete(id)),
            },
            Overlay::Notice { leave_counter, .. } => {
                if leave_counter {
                    self.leave_counter();
                }
            }
            Overlay::Guide | Overlay::LowKicks => {}
        }
    }

    fn handle_home_key(&mut self, key: KeyCode) -> AppResult {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => return AppResult::Quit,
            KeyCode::Char('r') | KeyCode::Enter => self.open_counter(),
            KeyCode::Char('?') | KeyCode::Char('i') => self.overlay = Some(Overlay::Guide),
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.sessions.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(session) = self.sessions.get(self.selected) {
                    self.overlay = Some(Overlay::ConfirmDelete(session.id.clone()));
                }
            }
            KeyCode::Char('g') | KeyCode::F(5) => self.refresh_sessions(),
            _ => {}
        }
        AppResult::Continue
    }

    fn handle_counter_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char(' ') | KeyCode::Enter => self.kick(),
            KeyCode::Char('s') => self.save(),
            KeyCode::Char('h') => self.overlay = Some(Overlay::LowKicks),
            KeyCode::Char('?') | KeyCode::Char('i') => self.overlay = Some(Overlay::Guide),
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Backspace => self.go_back(),
            _ => {}
        }
    }

    pub fn open_counter(&mut self) {
        let timer = match &self.ticks {
            Some(ticks) => TrackingTimer::with_ticker(ticks.clone()),
            None => TrackingTimer::new(),
        };
        self.timer = Some(timer);
        self.screen = Screen::Counter;
    }

    fn kick(&mut self) {
        let Some(timer) = self.timer.as_mut() else {
            return;
        };
        if timer.kick(Utc::now()).is_accepted() && self.haptics {
            self.pending_pulses += 1;
        }
    }

    fn save(&mut self) {
        let Some(timer) = self.timer.as_mut() else {
            return;
        };
        match timer.save(&self.store, Utc::now()) {
            Ok(session) => {
                self.overlay = Some(Overlay::Notice {
                    title: "Session Saved!".to_string(),
                    body: display::save_confirmation(&session),
                    leave_counter: true,
                });
            }
            Err(SaveError::NothingRecorded) => {
                self.overlay = Some(Overlay::Notice {
                    title: "No Kicks Recorded".to_string(),
                    body: "Please record at least one kick before saving.".to_string(),
                    leave_counter: false,
                });
            }
            Err(e @ SaveError::Finished(_)) => {
                self.overlay = Some(Overlay::Notice {
                    title: "Nothing to Save".to_string(),
                    body: e.to_string(),
                    leave_counter: false,
                });
            }
            Err(e) => {
                tracing::error!("Save error: {:#}", anyhow::Error::new(e));
                self.overlay = Some(Overlay::Notice {
                    title: "Error".to_string(),
                    body: "Failed to save session. Please try again.".to_string(),
                    leave_counter: false,
                });
            }
        }
    }

    fn go_back(&mut self) {
        let Some(timer) = self.timer.as_mut() else {
            self.leave_counter();
            return;
        };
        match timer.request_discard() {
            DiscardRequest::Discarded => self.leave_counter(),
            DiscardRequest::NeedsConfirmation => self.overlay = Some(Overlay::ConfirmDiscard),
        }
    }

    // Dropping the timer releases its ticker.
    fn leave_counter(&mut self) {
        self.timer = None;
        self.screen = Screen::Home;
        self.refresh_sessions();
    }

    fn delete(&mut self, id: &str) {
        if let Err(e) = self.store.delete_session(id) {
            self.overlay = Some(Overlay::Notice {
                title: "Error".to_string(),
                body: format!("Failed to delete session: {}", e),
                leave_counter: false,
            });
        }
        self.refresh_sessions();
    }
}
