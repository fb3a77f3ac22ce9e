use anyhow::Result;
use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs},
    Frame,
};
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db::repository::{load_tracked, ActivityRepo, CompletionRepo};
use crate::models::activity::PALETTE;
use crate::models::ViewGranularity;
use crate::streaks::activity_stats;
use crate::tui::events::{Event, EventHandler};
use crate::tui::state::{update, Action, AppState, Dialog, Effect, LoadState, Screen};
use crate::tui::theme;
use crate::tui::widgets::{activities, calendar, header, stats, statusbar};

/// Translate a key press into an action for the current snapshot.
pub fn key_to_action(state: &AppState, key: KeyEvent) -> Option<Action> {
    // Some terminals also report release and repeat events
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match &state.dialog {
        Dialog::NewActivity { .. } => {
            return match key.code {
                KeyCode::Esc => Some(Action::Back),
                KeyCode::Enter => Some(Action::Submit),
                KeyCode::Tab => Some(Action::NextColor),
                KeyCode::Backspace => Some(Action::Backspace),
                KeyCode::Char(c) => Some(Action::Input(c)),
                _ => None,
            };
        }
        Dialog::ConfirmDelete => {
            return match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    Some(Action::ConfirmDelete)
                }
                _ => Some(Action::Back),
            };
        }
        Dialog::None => {}
    }

    if state.show_help {
        return Some(Action::ToggleHelp);
    }

    match state.screen {
        Screen::Dashboard => match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Up | KeyCode::Char('k') => Some(Action::Up),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::Down),
            KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => Some(Action::Open),
            KeyCode::Char(' ') | KeyCode::Char('x') => Some(Action::ToggleToday),
            KeyCode::Char('n') => Some(Action::NewActivity),
            KeyCode::Char('D') | KeyCode::Delete => Some(Action::RequestDelete),
            KeyCode::Char('r') => Some(Action::Reload),
            KeyCode::Char('?') => Some(Action::ToggleHelp),
            _ => None,
        },
        Screen::Detail => match key.code {
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q') => Some(Action::Back),
            KeyCode::Char('w') => Some(Action::SetView(ViewGranularity::Week)),
            KeyCode::Char('m') => Some(Action::SetView(ViewGranularity::Month)),
            KeyCode::Char('y') => Some(Action::SetView(ViewGranularity::Year)),
            KeyCode::Tab => Some(Action::CycleView),
            KeyCode::Left | KeyCode::Char('h') => Some(Action::Shift(-1)),
            KeyCode::Right | KeyCode::Char('l') => Some(Action::Shift(1)),
            KeyCode::Char('t') => Some(Action::JumpToday),
            KeyCode::Char(' ') | KeyCode::Char('x') => Some(Action::ToggleToday),
            KeyCode::Char('D') | KeyCode::Delete => Some(Action::RequestDelete),
            KeyCode::Char('r') => Some(Action::Reload),
            KeyCode::Char('?') => Some(Action::ToggleHelp),
            _ => None,
        },
    }
}

/// Run one effect against the store and report the outcome as actions.
/// Store errors become toasts; they never end the session.
pub fn perform(conn: &Connection, effect: Effect) -> Vec<Action> {
    match effect {
        Effect::Reload => match load_tracked(conn) {
            Ok(activities) => vec![Action::Loaded(activities)],
            Err(e) => {
                log::warn!("Loading activities failed: {:#}", e);
                vec![Action::LoadFailed(format!("{:#}", e))]
            }
        },
        Effect::CreateActivity { name, color } => {
            match ActivityRepo::create(conn, &name, &color, None, chrono::Utc::now()) {
                Ok(activity) => vec![Action::Created(activity)],
                Err(e) => vec![failed("Error creating activity", e)],
            }
        }
        Effect::SetCompletion {
            activity_id,
            name,
            date,
            completed,
        } => match CompletionRepo::set_completion(conn, activity_id, date, completed) {
            Ok(record) => vec![Action::CompletionSaved {
                name,
                completed: record.completed,
            }],
            // Reload to undo the local flip.
            Err(e) => vec![failed("Error updating streak", e), Action::Reload],
        },
        Effect::DeleteActivity { activity_id, name } => {
            match ActivityRepo::delete(conn, activity_id) {
                Ok(_) => vec![Action::Deleted(name)],
                Err(e) => vec![failed("Error deleting activity", e)],
            }
        }
    }
}

fn failed(title: &str, e: anyhow::Error) -> Action {
    log::warn!("{}: {:#}", title, e);
    Action::Failed {
        title: title.to_string(),
        message: format!("{:#}", e),
    }
}

pub struct App {
    pub state: AppState,
    pub config: AppConfig,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let today = Local::now().date_naive();
        App {
            state: AppState::new(today, config.display.default_view),
            config,
        }
    }

    /// Apply an action and chase any effects it produces until the state settles.
    pub fn dispatch(&mut self, action: Action, conn: &Connection) {
        let mut pending = vec![action];
        while let Some(action) = pending.pop() {
            let (next, effect) = update(&self.state, action);
            self.state = next;
            if let Some(effect) = effect {
                let mut outcomes = perform(conn, effect);
                outcomes.reverse();
                pending.extend(outcomes);
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        match self.state.screen {
            Screen::Dashboard => self.draw_dashboard(frame),
            Screen::Detail => self.draw_detail(frame),
        }

        if self.state.show_help {
            self.draw_help_overlay(frame);
        }

        match &self.state.dialog {
            Dialog::NewActivity {
                name,
                color_idx,
                error,
            } => self.draw_new_activity(frame, name, *color_idx, error.as_deref()),
            Dialog::ConfirmDelete => self.draw_confirm_delete(frame),
            Dialog::None => {}
        }
    }

    fn layout(frame: &Frame) -> (Rect, Rect, Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // header
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(frame.area());
        (chunks[0], chunks[1], chunks[2])
    }

    fn draw_dashboard(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);
        let (top, body, bottom) = Self::layout(frame);

        let today = self.state.today;
        header::render(
            frame,
            top,
            Line::from(Span::styled(
                today.format("%A, %b %-d, %Y").to_string(),
                theme::dim(),
            )),
        );

        statusbar::render(
            frame,
            bottom,
            &[
                ("[↑↓]", "select"),
                ("[Enter]", "open"),
                ("[Space]", "toggle today"),
                ("[n]", "new"),
                ("[D]", "delete"),
                ("[?]", "help"),
                ("[q]", "quit"),
            ],
            self.state.toast.as_ref(),
        );

        match &self.state.load {
            LoadState::Loading => {
                self.draw_message(frame, body, vec![Line::from(Span::styled(
                    "Loading your activities...",
                    theme::dim(),
                ))]);
            }
            LoadState::Failed(message) => {
                self.draw_message(
                    frame,
                    body,
                    vec![
                        Line::from(Span::styled("Error loading activities", theme::red())),
                        Line::from(Span::styled(message.as_str(), theme::dim())),
                        Line::from(""),
                        Line::from(vec![
                            Span::styled("[r] ", theme::teal()),
                            Span::styled("Try again", theme::dim()),
                        ]),
                    ],
                );
            }
            LoadState::Ready if self.state.activities.is_empty() => {
                self.draw_message(
                    frame,
                    body,
                    vec![
                        Line::from(Span::styled("No activities yet", theme::bold())),
                        Line::from(Span::styled(
                            "Add your first activity to start tracking",
                            theme::dim(),
                        )),
                        Line::from(""),
                        Line::from(vec![
                            Span::styled("[n] ", theme::teal()),
                            Span::styled("New activity", theme::dim()),
                        ]),
                    ],
                );
            }
            LoadState::Ready => activities::render(
                frame,
                body,
                &self.state.activities,
                self.state.selected,
                today,
                self.config.display.recent_days,
            ),
        }
    }

    fn draw_message(&self, frame: &mut Frame, area: Rect, mut lines: Vec<Line>) {
        let pad = area.height.saturating_sub(lines.len() as u16) / 2;
        let mut text = vec![Line::from(""); pad as usize];
        text.append(&mut lines);
        frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), area);
    }

    fn draw_detail(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);
        let (top, body, bottom) = Self::layout(frame);

        statusbar::render(
            frame,
            bottom,
            &[
                ("[w/m/y]", "view"),
                ("[←→]", "page"),
                ("[t]", "today"),
                ("[Space]", "toggle today"),
                ("[D]", "delete"),
                ("[Esc]", "back"),
            ],
            self.state.toast.as_ref(),
        );

        let Some(tracked) = self.state.selected_activity() else {
            self.draw_message(frame, body, vec![Line::from("Activity not found")]);
            return;
        };
        let color = theme::activity(&tracked.activity.color);
        let today = self.state.today;
        let done_today = tracked.completions.is_completed(today);

        header::render(
            frame,
            top,
            Line::from(vec![
                Span::styled("● ", Style::default().fg(color)),
                Span::styled(tracked.activity.name.as_str(), theme::bold()),
                Span::styled(
                    format!(
                        "  ·  Started {}",
                        tracked
                            .activity
                            .created_at
                            .with_timezone(&Local)
                            .format("%b %-d, %Y")
                    ),
                    theme::dim(),
                ),
                if done_today {
                    Span::styled("  ·  ✓ Completed Today", theme::green())
                } else {
                    Span::styled("  ·  Mark Complete for Today [Space]", theme::amber())
                },
            ]),
        );

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),  // view tabs
                Constraint::Min(11),    // calendar
                Constraint::Length(4),  // stats
            ])
            .split(body);

        let titles: Vec<Line> = ViewGranularity::all()
            .iter()
            .map(|v| Line::from(v.display_name()))
            .collect();
        let selected_tab = ViewGranularity::all()
            .iter()
            .position(|v| *v == self.state.view)
            .unwrap_or(0);
        let tabs = Tabs::new(titles)
            .select(selected_tab)
            .style(theme::dim())
            .highlight_style(theme::teal().add_modifier(Modifier::BOLD))
            .divider(Span::styled("│", theme::dim()));
        frame.render_widget(tabs, chunks[0]);

        calendar::render(
            frame,
            chunks[1],
            tracked,
            self.state.view,
            self.state.reference,
            today,
        );

        let stats = activity_stats(&tracked.completions, today);
        stats::render(frame, chunks[2], &stats, color);
    }

    fn popup(area: Rect, width: u16, height: u16) -> Rect {
        let width = width.min(area.width);
        let height = height.min(area.height);
        Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + (area.height - height) / 2,
            width,
            height,
        }
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let popup_area = Self::popup(frame.area(), 52, 18);
        frame.render_widget(Clear, popup_area);

        let rows = [
            ("[↑ ↓] / [j k]", "Select activity"),
            ("[Enter]", "Open activity"),
            ("[Space] / [x]", "Toggle today"),
            ("[n]", "New activity"),
            ("[D]", "Delete activity"),
            ("[r]", "Reload"),
            ("[w] [m] [y]", "Week / month / year view"),
            ("[Tab]", "Cycle view"),
            ("[← →]", "Previous / next period"),
            ("[t]", "Back to today"),
            ("[?]", "Toggle help"),
            ("[Esc]", "Back / quit"),
        ];

        let mut help_text = vec![
            Line::from(Span::styled(
                "  Keybindings",
                theme::teal().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (key, label) in rows {
            help_text.push(Line::from(vec![
                Span::styled(format!("  {:<16}", key), theme::teal()),
                Span::styled(label, theme::dim()),
            ]));
        }

        let block = Block::default()
            .title(Span::styled(" Help ", theme::teal()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::teal())
            .style(theme::surface());

        frame.render_widget(Paragraph::new(help_text).block(block), popup_area);
    }

    fn draw_new_activity(
        &self,
        frame: &mut Frame,
        name: &str,
        color_idx: usize,
        error: Option<&str>,
    ) {
        let height = if error.is_some() { 10 } else { 8 };
        let popup_area = Self::popup(frame.area(), 56, height);
        frame.render_widget(Clear, popup_area);

        let mut swatches = vec![Span::styled("  Color: ", theme::dim())];
        for (i, hex) in PALETTE.iter().enumerate() {
            let glyph = if i == color_idx { "◉ " } else { "● " };
            swatches.push(Span::styled(glyph, Style::default().fg(theme::activity(hex))));
        }

        let mut text = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  Name: ", theme::dim()),
                Span::styled(name, theme::bold()),
                Span::styled("█", theme::teal()), // block cursor
            ]),
            Line::from(swatches),
            Line::from(""),
            Line::from(Span::styled(
                "  [Enter] create  ·  [Tab] color  ·  [Esc] cancel",
                theme::dim(),
            )),
        ];

        if let Some(err) = error {
            text.push(Line::from(""));
            text.push(Line::from(Span::styled(format!("  ✗ {}", err), theme::red())));
        }

        let border_style = if error.is_some() {
            theme::red()
        } else {
            theme::teal()
        };

        let block = Block::default()
            .title(Span::styled(" Create New Activity ", theme::teal()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .style(theme::surface());

        frame.render_widget(Paragraph::new(text).block(block), popup_area);
    }

    fn draw_confirm_delete(&self, frame: &mut Frame) {
        let popup_area = Self::popup(frame.area(), 56, 7);
        frame.render_widget(Clear, popup_area);

        let name = self
            .state
            .selected_activity()
            .map(|t| t.activity.name.as_str())
            .unwrap_or("this activity");

        let text = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  Delete ", theme::dim()),
                Span::styled(name, theme::bold()),
                Span::styled("? This action cannot be undone.", theme::dim()),
            ]),
            Line::from(""),
            Line::from(Span::styled("  [y] delete  ·  [any key] cancel", theme::dim())),
        ];

        let block = Block::default()
            .title(Span::styled(" Delete Activity ", theme::red()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::red())
            .style(theme::surface());

        frame.render_widget(Paragraph::new(text).block(block), popup_area);
    }
}

/// Run the TUI event loop.
pub fn run(conn: Connection, config: AppConfig) -> Result<()> {
    let mut app = App::new(config);
    app.dispatch(Action::Reload, &conn);

    let mut terminal = ratatui::init();
    let events = EventHandler::new(app.config.display.tick_rate_ms);

    let outcome = (|| -> Result<()> {
        loop {
            terminal.draw(|frame| app.draw(frame))?;

            match events.next()? {
                Event::Key(key) => {
                    if let Some(action) = key_to_action(&app.state, key) {
                        app.dispatch(action, &conn);
                    }
                    if app.state.should_quit {
                        break;
                    }
                }
                Event::Resize => {}
                Event::Tick => {
                    app.dispatch(Action::Tick(Local::now().date_naive()), &conn);
                }
            }
        }
        Ok(())
    })();

    ratatui::restore();
    outcome
}
