mod api;
mod app;
mod config;
mod form;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use api::{HttpUsersApi, Route, UsersApi};
use app::{App, Completion, SubmitOutcome};
use config::AppConfig;
use form::{FormFile, FormInput};

#[derive(Parser, Debug)]
#[command(name = "enlist")]
#[command(author = "Sean Fournier")]
#[command(version = "0.1.0")]
#[command(about = "A terminal account registration client")]
struct Args {
    /// Base URL of the users API (overrides the config file)
    #[arg(short, long)]
    base_url: Option<String>,

    /// Use this config file instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Register without the UI, reading the form values from a TOML file
    #[arg(short, long)]
    submit: Option<PathBuf>,

    /// Write logs to this file (default: enlist.log in the config directory,
    /// or stderr with --submit)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let headless = args.submit.is_some();
    init_logging(log_target(args.log_file.as_deref(), headless, AppConfig::log_path()))?;

    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load()?,
    };
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }

    let api = HttpUsersApi::new(&config.base_url, config.request_timeout())?;

    // Handle CLI-only commands
    if let Some(path) = args.submit {
        let mut app = App::new(config, api);
        app.input = read_form_file(&path)?;
        let (output, ok) = headless_outcome(&mut app).await?;
        println!("{}", serde_json::to_string(&output)?);
        return Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE });
    }

    ui::init_theme(&config.theme);
    run_tui(config, api).await?;
    Ok(ExitCode::SUCCESS)
}

/// Where log lines go
#[derive(Debug, PartialEq, Eq)]
enum LogTarget {
    File(PathBuf),
    Stderr,
    Off,
}

/// Headless runs log to stderr. The TUI owns the terminal, so it logs to
/// `--log-file`, else the default file, else nowhere.
fn log_target(log_file: Option<&Path>, headless: bool, default_file: Option<PathBuf>) -> LogTarget {
    match (log_file, headless) {
        (Some(path), _) => LogTarget::File(path.to_path_buf()),
        (None, true) => LogTarget::Stderr,
        (None, false) => default_file.map_or(LogTarget::Off, LogTarget::File),
    }
}

fn init_logging(target: LogTarget) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match target {
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).ok();
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Could not open log file {}", path.display()))?;
            tracing_subscriber::registry()
                .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(std::sync::Mutex::new(file)))
                .with(filter)
                .init();
        }
        LogTarget::Stderr => {
            tracing_subscriber::registry()
                .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
        }
        LogTarget::Off => {}
    }
    Ok(())
}

/// Read form values for a headless submit
fn read_form_file(path: &Path) -> Result<FormInput> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;
    let file: FormFile = toml::from_str(&content)
        .with_context(|| format!("Invalid form file {}", path.display()))?;
    Ok(FormInput::from(file))
}

/// Validate and submit the app's current input. Returns the JSON to print
/// and whether the account was created.
async fn headless_outcome<A: UsersApi>(app: &mut App<A>) -> Result<(serde_json::Value, bool)> {
    let outcome = match app.submit() {
        SubmitOutcome::Invalid => (
            serde_json::json!({
                "ok": false,
                "errors": app.errors.to_json(),
            }),
            false,
        ),
        SubmitOutcome::Started | SubmitOutcome::Busy => match app.settle().await {
            Some(Completion::Created(route)) => {
                let id = match &route {
                    Route::Home { id } => id.clone(),
                    Route::Register => String::new(),
                };
                (
                    serde_json::json!({
                        "ok": true,
                        "id": id,
                        "route": route.path(),
                    }),
                    true,
                )
            }
            Some(Completion::Failed(e)) => (
                serde_json::json!({
                    "ok": false,
                    "error": e.to_string(),
                }),
                false,
            ),
            None => anyhow::bail!("Registration did not start"),
        },
    };
    Ok(outcome)
}

async fn run_tui<A: UsersApi>(config: AppConfig, api: A) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app = App::new(config, api);

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Tear down the view before restoring the terminal so an in-flight
    // request is aborted
    drop(app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app<A: UsersApi>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<A>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('c') if key.modifiers.contains(event::KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        _ => {
                            // Handle key and catch any errors to prevent crashes
                            if let Err(e) = app.handle_key(key).await {
                                app.status_message = Some(format!("Error: {}", e));
                            }
                        }
                    }
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }

        // Pick up finished requests, expire status messages
        let _ = app.tick().await;
    }
}

fn notify(summary: &str, body: &str) -> Result<()> {
    notify_rust::Notification::new()
        .summary(summary)
        .body(body)
        .icon("contact-new")
        .show()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CreatedUser, SubmitError};
    use crate::form::payload::RegistrationPayload;
    use crate::form::CourseModule;

    /// Answers every registration with a fixed result
    struct CannedApi(Result<&'static str, u16>);

    impl UsersApi for CannedApi {
        async fn create_user(&self, _payload: RegistrationPayload) -> Result<CreatedUser, SubmitError> {
            match self.0 {
                Ok(id) => Ok(CreatedUser { id: id.to_string() }),
                Err(status) => Err(SubmitError::Status(status)),
            }
        }
    }

    fn valid_input() -> FormInput {
        FormInput {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "abcdef".to_string(),
            confirm_password: "abcdef".to_string(),
            bio: "Engines".to_string(),
            contact: "+44 20 0000 0000".to_string(),
            course_module: Some(CourseModule::First),
        }
    }

    #[tokio::test]
    async fn test_headless_created() {
        let mut app = App::new(AppConfig::default(), CannedApi(Ok("7")));
        app.input = valid_input();

        let (output, ok) = headless_outcome(&mut app).await.unwrap();
        assert!(ok);
        assert_eq!(output, serde_json::json!({ "ok": true, "id": "7", "route": "/home/7" }));
    }

    #[tokio::test]
    async fn test_headless_invalid_lists_errors() {
        let mut app = App::new(AppConfig::default(), CannedApi(Ok("7")));
        app.input = valid_input();
        app.input.email = "ada@".to_string();

        let (output, ok) = headless_outcome(&mut app).await.unwrap();
        assert!(!ok);
        assert_eq!(
            output,
            serde_json::json!({ "ok": false, "errors": { "email": "Invalid email." } })
        );
    }

    #[tokio::test]
    async fn test_headless_failed_request() {
        let mut app = App::new(AppConfig::default(), CannedApi(Err(400)));
        app.input = valid_input();

        let (output, ok) = headless_outcome(&mut app).await.unwrap();
        assert!(!ok);
        assert_eq!(output["ok"], serde_json::Value::Bool(false));
        assert_eq!(output["error"], serde_json::Value::String(SubmitError::Status(400).to_string()));
        assert!(output.get("errors").is_none());
    }

    #[test]
    fn test_read_form_file() {
        let path = std::env::temp_dir().join(format!("enlist-form-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            r#"
name = "Ada Lovelace"
email = "ada@example.com"
password = "abcdef"
confirmPassword = "abcdef"
bio = "Engines"
contact = "+44 20 0000 0000"
course_module = "second module"
"#,
        )
        .unwrap();

        let input = read_form_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(input.confirm_password, "abcdef");
        assert_eq!(input.course_module, Some(CourseModule::Second));

        assert!(read_form_file(Path::new("/nonexistent/enlist-form.toml")).is_err());
    }

    #[test]
    fn test_log_target() {
        let default = Some(PathBuf::from("/cfg/enlist/enlist.log"));

        // The TUI never logs to the terminal it draws on
        assert_eq!(
            log_target(None, false, default.clone()),
            LogTarget::File(PathBuf::from("/cfg/enlist/enlist.log"))
        );
        assert_eq!(log_target(None, false, None), LogTarget::Off);

        assert_eq!(log_target(None, true, default.clone()), LogTarget::Stderr);
        assert_eq!(
            log_target(Some(Path::new("/tmp/x.log")), true, default),
            LogTarget::File(PathBuf::from("/tmp/x.log"))
        );
    }
}
