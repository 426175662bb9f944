use std::thread::JoinHandle;

use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;
use tracing::debug;

use crate::db::{Database, DbError};
use crate::profile::spawn_profile_fetch;

use super::helpers::centered_rect;

/// Footer space reserved for key hints.
const FOOTER_HEIGHT: u16 = 3;
/// Static text shown in the body.
const BODY_TEXT: &str = "App";
/// Name stored when the body text is tapped.
const TAPPED_NAME: &str = "Jane";
const INIT_ERROR_TITLE: &str = "Initialization error";
const INIT_ERROR_MESSAGE: &str = "The database failed to load. Please restart the app.";

/// Blocking message box. While one is up, only dismissal keys get through.
struct Alert {
    title: String,
    message: String,
}

/// State behind the single screen.
pub struct App {
    profile_url: Option<String>,
    name: Option<String>,
    alert: Option<Alert>,
}

impl App {
    /// `profile_url` is requested once per [`App::mount`]; `None` skips the
    /// request entirely.
    pub fn new(profile_url: Option<String>) -> Self {
        Self {
            profile_url,
            name: None,
            alert: None,
        }
    }

    /// Kick off the profile request. The response never reaches the screen
    /// and the request is not cancelled when the app exits.
    pub fn mount(&mut self) -> Option<JoinHandle<()>> {
        let url = self.profile_url.clone()?;
        debug!(url = %url, "mounting screen, requesting profile");
        Some(spawn_profile_fetch(url))
    }

    /// Name set by the last tap. Nothing reads it back into the view.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn tap(&mut self) {
        self.name = Some(TAPPED_NAME.to_string());
    }

    pub fn show_alert(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.alert = Some(Alert {
            title: title.into(),
            message: message.into(),
        });
    }

    /// Hand back the database when bootstrap worked. Otherwise raise the
    /// blocking restart alert; there is no retry.
    pub fn attach_database(&mut self, bootstrap: Result<Database, DbError>) -> Option<Database> {
        match bootstrap {
            Ok(db) => Some(db),
            Err(_) => {
                self.show_alert(INIT_ERROR_TITLE, INIT_ERROR_MESSAGE);
                None
            }
        }
    }

    pub fn alert_visible(&self) -> bool {
        self.alert.is_some()
    }

    /// Apply one key press. Returns `true` when the app should exit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.alert.is_some() {
            if matches!(code, KeyCode::Enter | KeyCode::Esc) {
                self.alert = None;
            }
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Enter | KeyCode::Char(' ') => self.tap(),
            _ => {}
        }
        false
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        frame.render_widget(Paragraph::new(BODY_TEXT), content_area);

        if area.height > footer_height {
            self.draw_footer(frame, footer_area);
        }

        if let Some(alert) = &self.alert {
            self.draw_alert(frame, area, alert);
        }
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let instructions = Line::from(vec![
            Span::styled("[Enter]", key_style),
            Span::raw(" Tap   "),
            Span::styled("[Q/Esc]", key_style),
            Span::raw(" Quit"),
        ]);

        frame.render_widget(Paragraph::new(instructions), inner);
    }

    fn draw_alert(&self, frame: &mut Frame, area: Rect, alert: &Alert) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(alert.title.as_str())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red));
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(alert.message.as_str()),
            Line::from(""),
            Line::from(Span::styled(
                "Press Enter to dismiss.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use ratatui::Terminal;

    use super::*;

    fn render(app: &App) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(60, 16)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn text_of(buffer: &Buffer) -> String {
        buffer.content.iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn tap_sets_name_without_changing_view() {
        let mut app = App::new(None);
        let before = render(&app);
        assert!(text_of(&before).contains("App"));
        assert_eq!(app.name(), None);

        assert!(!app.handle_key(KeyCode::Enter));
        assert_eq!(app.name(), Some("Jane"));
        assert_eq!(render(&app), before);
    }

    #[test]
    fn quit_keys_exit() {
        let mut app = App::new(None);
        assert!(app.handle_key(KeyCode::Char('q')));
        assert!(app.handle_key(KeyCode::Esc));
        assert!(!app.handle_key(KeyCode::Char('x')));
    }

    #[test]
    fn alert_blocks_input_until_dismissed() {
        let mut app = App::new(None);
        app.show_alert("Initialization error", "Please restart the app.");
        assert!(text_of(&render(&app)).contains("Initialization error"));

        assert!(!app.handle_key(KeyCode::Char('q')));
        assert!(!app.handle_key(KeyCode::Char(' ')));
        assert_eq!(app.name(), None);
        assert!(app.alert_visible());

        assert!(!app.handle_key(KeyCode::Esc));
        assert!(!app.alert_visible());
        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn failed_bootstrap_raises_restart_alert() {
        let mut broken = Database::open_in_memory().unwrap();
        broken
            .conn()
            .execute_batch("CREATE TABLE work_orders (id TEXT PRIMARY KEY)")
            .unwrap();
        let err = broken.init().unwrap_err();

        let mut app = App::new(None);
        assert!(app.attach_database(Err(err)).is_none());
        assert!(app.alert_visible());

        let screen = text_of(&render(&app));
        assert!(screen.contains(INIT_ERROR_TITLE));
        assert!(screen.contains("restart"));
    }

    #[test]
    fn successful_bootstrap_keeps_database_without_alert() {
        let mut db = Database::open_in_memory().unwrap();
        db.init().unwrap();

        let mut app = App::new(None);
        let db = app.attach_database(Ok(db)).unwrap();
        assert!(!app.alert_visible());
        db.close();
    }

    #[test]
    fn mount_without_url_skips_request() {
        let mut app = App::new(None);
        assert!(app.mount().is_none());
    }
}
