use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;

use crate::api::{CreatedUser, Route, SubmitError, UsersApi};
use crate::config::AppConfig;
use crate::form::payload::RegistrationPayload;
use crate::form::rules::{self, ValidationResult};
use crate::form::{CourseModule, Field, FormInput};

/// Seconds a status message stays on the info line
const STATUS_TIMEOUT_SECS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
}

/// Control that currently receives key input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Field(Field),
    Submit,
}

impl Focus {
    const ORDER: [Focus; 8] = [
        Focus::Field(Field::Name),
        Focus::Field(Field::Email),
        Focus::Field(Field::Password),
        Focus::Field(Field::ConfirmPassword),
        Focus::Field(Field::Bio),
        Focus::Field(Field::Contact),
        Focus::Field(Field::CourseModule),
        Focus::Submit,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[self.index().checked_sub(1).unwrap_or(Self::ORDER.len() - 1)]
    }
}

/// What a submit attempt did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed, errors are shown inline
    Invalid,
    /// Request is in flight
    Started,
    /// A request was already in flight, nothing done
    Busy,
}

/// How an in-flight request ended
#[derive(Debug)]
pub enum Completion {
    Created(Route),
    Failed(SubmitError),
}

pub struct App<A: UsersApi> {
    pub route: Route,
    pub popup: Popup,
    pub focus: Focus,

    // Form state
    pub input: FormInput,
    pub errors: ValidationResult,

    // Failure banner (only with keep_input_on_failure)
    pub banner: Option<String>,

    // Status message (shown in info line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,

    pub config: AppConfig,
    pub should_quit: bool,

    api: Arc<A>,
    pending: Option<JoinHandle<Result<CreatedUser, SubmitError>>>,
}

impl<A: UsersApi> App<A> {
    pub fn new(config: AppConfig, api: A) -> Self {
        Self {
            route: Route::Register,
            popup: Popup::None,
            focus: Focus::Field(Field::Name),

            input: FormInput::default(),
            errors: ValidationResult::default(),

            banner: None,

            status_message: None,
            status_message_time: None,

            config,
            should_quit: false,

            api: Arc::new(api),
            pending: None,
        }
    }

    /// Set a status message (auto-clears after 3 seconds)
    fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    pub fn is_submitting(&self) -> bool {
        self.pending.is_some()
    }

    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if self.popup != Popup::None {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.popup = Popup::None;
            }
            return Ok(());
        }

        match self.route {
            Route::Register => self.handle_form_key(key).await,
            Route::Home { .. } => self.handle_home_key(key).await,
        }
    }

    async fn handle_home_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('n') => self.start_new_registration(),
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('?') | KeyCode::F(1) => self.popup = Popup::Help,
            _ => {}
        }
        Ok(())
    }

    async fn handle_form_key(&mut self, key: KeyEvent) -> Result<()> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('s') if ctrl => {
                self.submit();
            }
            KeyCode::Char('u') if ctrl => {
                if let Focus::Field(field) = self.focus {
                    if let Some(buf) = self.input.text_mut(field) {
                        buf.clear();
                    }
                }
            }
            KeyCode::Esc => {
                if self.banner.is_some() {
                    self.banner = None;
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::F(1) => self.popup = Popup::Help,

            // Focus navigation
            KeyCode::Tab | KeyCode::Down => self.focus = self.focus.next(),
            KeyCode::BackTab | KeyCode::Up => self.focus = self.focus.prev(),

            KeyCode::Enter => match self.focus {
                Focus::Submit => {
                    self.submit();
                }
                _ => self.focus = self.focus.next(),
            },

            _ => match self.focus {
                Focus::Field(Field::CourseModule) => self.handle_module_key(key),
                Focus::Field(field) => self.handle_text_key(field, key),
                Focus::Submit => {
                    if matches!(key.code, KeyCode::Char(' ')) {
                        self.submit();
                    } else if matches!(key.code, KeyCode::Char('?')) {
                        self.popup = Popup::Help;
                    }
                }
            },
        }
        Ok(())
    }

    fn handle_text_key(&mut self, field: Field, key: KeyEvent) {
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return;
        }
        let Some(buf) = self.input.text_mut(field) else {
            return;
        };
        match key.code {
            KeyCode::Char(c) => buf.push(c),
            KeyCode::Backspace => {
                buf.pop();
            }
            _ => {}
        }
    }

    fn handle_module_key(&mut self, key: KeyEvent) {
        let current = self.input.course_module;
        let selected = match key.code {
            KeyCode::Left | KeyCode::Char('h') => current.map_or(CourseModule::default(), CourseModule::prev),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => {
                current.map_or(CourseModule::default(), CourseModule::next)
            }
            KeyCode::Char('?') => {
                self.popup = Popup::Help;
                return;
            }
            _ => return,
        };
        self.input.select_module(selected);
    }

    /// Validate and, when the form is clean, start the registration request
    pub fn submit(&mut self) -> SubmitOutcome {
        if self.pending.is_some() {
            tracing::debug!("Submit ignored, registration already in flight");
            return SubmitOutcome::Busy;
        }

        self.errors = rules::validate(&self.input);
        if !self.errors.is_valid() {
            tracing::debug!("Registration form has {} invalid field(s)", self.errors.len());
            // Jump to the first offending field
            if let Some((field, _)) = self.errors.iter().next() {
                self.focus = Focus::Field(field);
            }
            return SubmitOutcome::Invalid;
        }

        self.banner = None;
        let payload = RegistrationPayload::from(&self.input);
        let api = Arc::clone(&self.api);

        tracing::info!("Submitting registration for {}", payload.email);
        self.pending = Some(tokio::spawn(async move { api.create_user(payload).await }));
        self.set_status("Creating your account...");
        SubmitOutcome::Started
    }

    /// Wait for the in-flight request, if any, and apply its result
    pub async fn settle(&mut self) -> Option<Completion> {
        let handle = self.pending.take()?;
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Registration task did not complete: {}", e);
                Err(SubmitError::Aborted)
            }
        };
        Some(self.finish(result))
    }

    fn finish(&mut self, result: Result<CreatedUser, SubmitError>) -> Completion {
        match result {
            Ok(user) => {
                self.input.clear();
                self.errors = ValidationResult::default();
                let route = Route::Home { id: user.id.clone() };
                tracing::info!("Account {} created, navigating to {}", user.id, route);
                self.route = route.clone();
                self.set_status("Account created");

                if self.config.notifications {
                    if let Err(e) = crate::notify("enlist", &format!("Account {} created", user.id)) {
                        tracing::warn!("Notification failed: {}", e);
                    }
                }
                Completion::Created(route)
            }
            Err(e) => {
                tracing::warn!("Registration failed: {}", e);
                if self.config.keep_input_on_failure {
                    self.banner = Some(format!("Could not create your account: {}", e));
                } else {
                    self.input.clear();
                }
                Completion::Failed(e)
            }
        }
    }

    /// Back to an empty form after an account was created
    pub fn start_new_registration(&mut self) {
        self.route = Route::Register;
        self.input = FormInput::default();
        self.errors = ValidationResult::default();
        self.banner = None;
        self.focus = Focus::Field(Field::Name);
    }

    pub async fn tick(&mut self) -> Result<()> {
        // Pick up a finished request without blocking the UI
        if self.pending.as_ref().is_some_and(|h| h.is_finished()) {
            self.settle().await;
        }

        // Clear status message after timeout
        if let Some(time) = self.status_message_time {
            if time.elapsed().as_secs() >= STATUS_TIMEOUT_SECS {
                self.status_message = None;
                self.status_message_time = None;
            }
        }

        Ok(())
    }
}

impl<A: UsersApi> Drop for App<A> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            tracing::debug!("Aborting in-flight registration");
            handle.abort();
        }
    }
}
