mod components;

use std::sync::OnceLock;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::api::{Route, UsersApi};
use crate::app::{App, Focus, Popup};
use crate::config::ThemeConfig;
use crate::form::Field;
use crate::theme::Theme;

// Palette is fixed for the lifetime of the process
static THEME: OnceLock<Theme> = OnceLock::new();

/// Install the configured palette; later calls are ignored
pub fn init_theme(config: &ThemeConfig) {
    let _ = THEME.set(Theme::from_config(config));
}

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

// Helper functions to get theme colors
fn accent() -> Color { theme().accent }
fn danger() -> Color { theme().danger }
fn success() -> Color { theme().success }
fn text() -> Color { theme().text }
fn text_dim() -> Color { theme().text_dim }
fn inactive() -> Color { theme().inactive }
fn header() -> Color { theme().header }
fn bg_selected() -> Color { theme().bg_selected }

/// Rows taken by one control plus its error line
const CONTROL_HEIGHT: u16 = 4;

pub fn draw<A: UsersApi>(f: &mut Frame, app: &App<A>) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info line
            Constraint::Min(10),   // Active view
            Constraint::Length(1), // Footer
        ])
        .split(area);

    draw_info_line(f, app, chunks[0]);
    match &app.route {
        Route::Register => draw_form(f, app, chunks[1]),
        Route::Home { id } => draw_home(f, id, &app.route, chunks[1]),
    }
    draw_footer(f, app, chunks[2]);

    if app.popup == Popup::Help {
        draw_help_popup(f);
    }
}

fn draw_info_line<A: UsersApi>(f: &mut Frame, app: &App<A>, area: Rect) {
    // Priority: in-flight request > status message > route
    let line = if app.is_submitting() {
        Line::from(vec![
            Span::styled("󰔟 ", Style::default().fg(accent())),
            Span::styled("Creating your account...", Style::default().fg(text())),
        ])
    } else if let Some(ref status) = app.status_message {
        Line::from(Span::styled(status, Style::default().fg(accent())))
    } else {
        Line::from(Span::styled(app.route.path(), Style::default().fg(text_dim())))
    };

    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn draw_form<A: UsersApi>(f: &mut Frame, app: &App<A>, area: Rect) {
    let width = if area.width < 70 { area.width } else { 64 };
    let form_area = Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    };

    let block = Block::default()
        .title(Span::styled(" Create an account ", Style::default().fg(header()).add_modifier(Modifier::BOLD)))
        .title_bottom(Line::from(Span::styled(" It's fast and free. ", Style::default().fg(text_dim()))).centered())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(inactive()));
    let inner = block.inner(form_area);
    f.render_widget(block, form_area);

    let mut constraints = Vec::new();
    if app.banner.is_some() {
        constraints.push(Constraint::Length(3));
    }
    constraints.extend(Field::ALL.iter().map(|_| Constraint::Length(CONTROL_HEIGHT)));
    constraints.push(Constraint::Length(3)); // Submit button
    constraints.push(Constraint::Min(0));

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let mut row = 0;
    if let Some(ref banner) = app.banner {
        let banner = Paragraph::new(Line::from(vec![
            Span::styled("⚠ ", Style::default().fg(danger())),
            Span::styled(banner.as_str(), Style::default().fg(danger())),
            Span::styled("  (Esc dismiss)", Style::default().fg(text_dim())),
        ]))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(danger())));
        f.render_widget(banner, rows[row]);
        row += 1;
    }

    for field in Field::ALL {
        let slot = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Length(1)])
            .split(rows[row]);
        row += 1;

        let focused = app.focus == Focus::Field(field);
        let error = app.errors.error(field);

        if field.is_text() {
            components::text_input(f, slot[0], field, app.input.get(field), focused, error.is_some());
        } else {
            components::module_select(f, slot[0], app.input.course_module, focused, error.is_some());
        }
        components::error_line(f, slot[1], error);
    }

    draw_submit_button(f, app, rows[row]);
}

fn draw_submit_button<A: UsersApi>(f: &mut Frame, app: &App<A>, area: Rect) {
    let focused = app.focus == Focus::Submit;
    let label = if app.is_submitting() {
        "Creating your account..."
    } else {
        "Create your account"
    };

    let style = if focused {
        Style::default().fg(accent()).bg(bg_selected()).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(text())
    };

    let button = Paragraph::new(Span::styled(label, style))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(if focused { accent() } else { inactive() })),
        );
    f.render_widget(button, area);
}

fn draw_home(f: &mut Frame, id: &str, route: &Route, area: Rect) {
    let popup_area = centered_rect(60, 50, area);

    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("󰄬 Account created", Style::default().fg(success()).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(vec![
            Span::styled("User id  ", Style::default().fg(text_dim())),
            Span::styled(id, Style::default().fg(text())),
        ]),
        Line::from(vec![
            Span::styled("Route    ", Style::default().fg(text_dim())),
            Span::styled(route.path(), Style::default().fg(accent())),
        ]),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .title(Span::styled(" Home ", Style::default().fg(header())))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(success())),
    );

    f.render_widget(content, popup_area);
}

fn draw_footer<A: UsersApi>(f: &mut Frame, app: &App<A>, area: Rect) {
    let hints: Vec<(&str, &str)> = match (&app.route, app.focus) {
        (Route::Home { .. }, _) => vec![("n", "New"), ("q", "Quit"), ("?", "Help")],
        (Route::Register, Focus::Field(Field::CourseModule)) => vec![
            ("←→", "Module"),
            ("Tab", "Next"),
            ("Ctrl+S", "Submit"),
            ("F1", "Help"),
            ("Esc", "Quit"),
        ],
        (Route::Register, _) => vec![
            ("Tab", "Next"),
            ("S-Tab", "Prev"),
            ("Ctrl+U", "Clear"),
            ("Ctrl+S", "Submit"),
            ("F1", "Help"),
            ("Esc", "Quit"),
        ],
    };

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 60 { 3 } else { hints.len() };

    let hint_spans: Vec<Span> = hints
        .iter()
        .take(max_hints)
        .flat_map(|(key, action)| {
            vec![
                Span::styled(*key, Style::default().fg(accent())),
                Span::styled(format!(" {} │ ", action), Style::default().fg(text_dim())),
            ]
        })
        .collect();

    f.render_widget(Paragraph::new(Line::from(hint_spans)).alignment(Alignment::Center), area);
}

fn draw_help_popup(f: &mut Frame) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 90 } else { 60 },
        area
    );

    f.render_widget(Clear, popup_area);

    let section = |title: &'static str| {
        Line::from(Span::styled(title, Style::default().fg(header()).add_modifier(Modifier::BOLD)))
    };
    let binding = |keys: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(keys, Style::default().fg(accent())),
            Span::raw(what),
        ])
    };

    let help_text = vec![
        section("═══ Form ═══"),
        binding("  Tab / ↓     ", "Next field"),
        binding("  S-Tab / ↑   ", "Previous field"),
        binding("  Enter       ", "Next field, or submit on the button"),
        binding("  Ctrl+U      ", "Clear the focused field"),
        binding("  Ctrl+S      ", "Create your account"),
        binding("  F1          ", "This help"),
        binding("  ?           ", "This help, except in text fields where it is typed"),
        Line::from(""),
        section("═══ Module ═══"),
        binding("  ← / →       ", "Choose your course module"),
        Line::from(""),
        section("═══ After sign-up ═══"),
        binding("  n           ", "Register another account"),
        binding("  q / Esc     ", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(text_dim())),
            Span::styled("Esc", Style::default().fg(accent())),
            Span::styled(" to close", Style::default().fg(text_dim())),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" 󰋖 enlist Help ", Style::default().fg(accent())))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CreatedUser, SubmitError};
    use crate::config::AppConfig;
    use crate::form::payload::RegistrationPayload;
    use ratatui::{backend::TestBackend, Terminal};

    struct NoApi;

    impl UsersApi for NoApi {
        async fn create_user(&self, _payload: RegistrationPayload) -> Result<CreatedUser, SubmitError> {
            Err(SubmitError::Aborted)
        }
    }

    fn render(app: &App<NoApi>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 45)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_form_shows_inline_errors_and_masks_passwords() {
        let mut app = App::new(AppConfig::default(), NoApi);
        app.input.set(Field::Password, "abc");
        app.input.set(Field::ConfirmPassword, "abd");
        app.errors = crate::form::rules::validate(&app.input);

        let screen = render(&app);
        assert!(screen.contains("Create an account"));
        assert!(screen.contains("Name is required."));
        assert!(screen.contains("Password must have at least 6 characters."));
        assert!(screen.contains("•••"));
        assert!(!screen.contains("abc"));
        assert!(screen.contains("First module"));
    }

    #[test]
    fn test_home_view_shows_id() {
        let mut app = App::new(AppConfig::default(), NoApi);
        app.route = Route::Home { id: "42".to_string() };

        let screen = render(&app);
        assert!(screen.contains("Account created"));
        assert!(screen.contains("/home/42"));
    }

    #[test]
    fn test_help_popup_explains_question_mark_in_text_fields() {
        let mut app = App::new(AppConfig::default(), NoApi);
        app.popup = Popup::Help;

        let screen = render(&app);
        assert!(screen.contains("enlist Help"));
        assert!(screen.contains("except in text fields"));
    }
}
