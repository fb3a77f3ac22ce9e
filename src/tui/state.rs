//! Immutable UI state for the TUI.
//!
//! `update` never touches the store. Anything that needs I/O comes back as an
//! [`Effect`]; the run loop performs it and feeds the outcome back in as
//! another [`Action`].

use chrono::NaiveDate;

use crate::models::activity::PALETTE;
use crate::models::{Activity, TrackedActivity, ViewGranularity};
use crate::streaks::shift_reference;

/// Ticks a toast stays visible.
pub const TOAST_TICKS: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    Detail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    None,
    NewActivity {
        name: String,
        color_idx: usize,
        error: Option<String>,
    },
    ConfirmDelete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub message: String,
    pub ticks_left: u8,
}

impl Toast {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Info,
            title: title.into(),
            message: message.into(),
            ticks_left: TOAST_TICKS,
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            title: title.into(),
            message: message.into(),
            ticks_left: TOAST_TICKS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Up,
    Down,
    Open,
    Back,
    Quit,
    ToggleHelp,
    SetView(ViewGranularity),
    CycleView,
    /// Page the detail calendar by whole periods.
    Shift(i32),
    JumpToday,
    ToggleToday,
    Reload,
    NewActivity,
    Input(char),
    Backspace,
    NextColor,
    Submit,
    RequestDelete,
    ConfirmDelete,
    Tick(NaiveDate),

    // Outcomes reported by the run loop
    Loaded(Vec<TrackedActivity>),
    LoadFailed(String),
    Created(Activity),
    CompletionSaved { name: String, completed: bool },
    Deleted(String),
    Failed { title: String, message: String },
}

/// Store work requested by `update`.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Reload,
    CreateActivity {
        name: String,
        color: String,
    },
    SetCompletion {
        activity_id: i64,
        name: String,
        date: NaiveDate,
        completed: bool,
    },
    DeleteActivity {
        activity_id: i64,
        name: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub today: NaiveDate,
    pub screen: Screen,
    pub show_help: bool,
    pub dialog: Dialog,
    pub activities: Vec<TrackedActivity>,
    pub selected: usize,
    pub view: ViewGranularity,
    /// Date the detail calendar is anchored on.
    pub reference: NaiveDate,
    pub load: LoadState,
    pub toast: Option<Toast>,
    /// Activity to select once the next reload lands.
    pub pending_select: Option<i64>,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(today: NaiveDate, view: ViewGranularity) -> Self {
        Self {
            today,
            screen: Screen::Dashboard,
            show_help: false,
            dialog: Dialog::None,
            activities: Vec::new(),
            selected: 0,
            view,
            reference: today,
            load: LoadState::Loading,
            toast: None,
            pending_select: None,
            should_quit: false,
        }
    }

    pub fn selected_activity(&self) -> Option<&TrackedActivity> {
        self.activities.get(self.selected)
    }
}

pub fn update(state: &AppState, action: Action) -> (AppState, Option<Effect>) {
    let mut next = state.clone();
    let effect = apply(&mut next, action);
    (next, effect)
}

fn apply(s: &mut AppState, action: Action) -> Option<Effect> {
    match action {
        Action::Up => {
            s.selected = s.selected.saturating_sub(1);
            None
        }
        Action::Down => {
            if s.selected + 1 < s.activities.len() {
                s.selected += 1;
            }
            None
        }
        Action::Open => {
            if s.selected_activity().is_some() {
                s.screen = Screen::Detail;
                s.reference = s.today;
            }
            None
        }
        Action::Back => {
            if s.dialog != Dialog::None {
                s.dialog = Dialog::None;
            } else if s.show_help {
                s.show_help = false;
            } else if s.screen == Screen::Detail {
                s.screen = Screen::Dashboard;
            } else {
                s.should_quit = true;
            }
            None
        }
        Action::Quit => {
            s.should_quit = true;
            None
        }
        Action::ToggleHelp => {
            s.show_help = !s.show_help;
            None
        }
        Action::SetView(view) => {
            s.view = view;
            None
        }
        Action::CycleView => {
            s.view = s.view.next();
            None
        }
        Action::Shift(steps) => {
            s.reference = shift_reference(s.view, s.reference, steps);
            None
        }
        Action::JumpToday => {
            s.reference = s.today;
            None
        }
        Action::ToggleToday => {
            // Flip locally right away; the store write follows.
            let today = s.today;
            let tracked = s.activities.get_mut(s.selected)?;
            tracked.completions = tracked.completions.toggled(today);
            Some(Effect::SetCompletion {
                activity_id: tracked.activity.id,
                name: tracked.activity.name.clone(),
                date: today,
                completed: tracked.completions.is_completed(today),
            })
        }
        Action::Reload => {
            s.load = LoadState::Loading;
            Some(Effect::Reload)
        }
        Action::NewActivity => {
            s.dialog = Dialog::NewActivity {
                name: String::new(),
                color_idx: 0,
                error: None,
            };
            None
        }
        Action::Input(c) => {
            if let Dialog::NewActivity { name, error, .. } = &mut s.dialog {
                name.push(c);
                *error = None;
            }
            None
        }
        Action::Backspace => {
            if let Dialog::NewActivity { name, error, .. } = &mut s.dialog {
                name.pop();
                *error = None;
            }
            None
        }
        Action::NextColor => {
            if let Dialog::NewActivity { color_idx, .. } = &mut s.dialog {
                *color_idx = (*color_idx + 1) % PALETTE.len();
            }
            None
        }
        Action::Submit => {
            let Dialog::NewActivity {
                name,
                color_idx,
                error,
            } = &mut s.dialog
            else {
                return None;
            };
            let trimmed = name.trim().to_string();
            if trimmed.is_empty() {
                *error = Some("Please enter an activity name".to_string());
                return None;
            }
            let color = PALETTE[*color_idx % PALETTE.len()].to_string();
            s.dialog = Dialog::None;
            Some(Effect::CreateActivity {
                name: trimmed,
                color,
            })
        }
        Action::RequestDelete => {
            if s.selected_activity().is_some() {
                s.dialog = Dialog::ConfirmDelete;
            }
            None
        }
        Action::ConfirmDelete => {
            if s.dialog != Dialog::ConfirmDelete {
                return None;
            }
            s.dialog = Dialog::None;
            let tracked = s.selected_activity()?;
            Some(Effect::DeleteActivity {
                activity_id: tracked.activity.id,
                name: tracked.activity.name.clone(),
            })
        }
        Action::Tick(today) => {
            if today != s.today {
                if s.reference == s.today {
                    s.reference = today;
                }
                s.today = today;
            }
            if let Some(toast) = &mut s.toast {
                toast.ticks_left = toast.ticks_left.saturating_sub(1);
                if toast.ticks_left == 0 {
                    s.toast = None;
                }
            }
            None
        }
        Action::Loaded(activities) => {
            let selected_id = s
                .pending_select
                .take()
                .or_else(|| s.selected_activity().map(|t| t.activity.id));
            s.activities = activities;
            s.selected = selected_id
                .and_then(|id| s.activities.iter().position(|t| t.activity.id == id))
                .unwrap_or_else(|| s.selected.min(s.activities.len().saturating_sub(1)));
            if s.activities.is_empty() {
                s.screen = Screen::Dashboard;
            }
            s.load = LoadState::Ready;
            None
        }
        Action::LoadFailed(message) => {
            s.load = LoadState::Failed(message);
            None
        }
        Action::Created(activity) => {
            s.toast = Some(Toast::info(
                "Activity created",
                format!("{} has been created successfully", activity.name),
            ));
            s.pending_select = Some(activity.id);
            Some(Effect::Reload)
        }
        Action::CompletionSaved { name, completed } => {
            let title = if completed {
                "Completed"
            } else {
                "Marked as not done"
            };
            s.toast = Some(Toast::info(title, format!("{} for today has been updated", name)));
            Some(Effect::Reload)
        }
        Action::Deleted(name) => {
            s.screen = Screen::Dashboard;
            s.toast = Some(Toast::info(
                "Activity deleted",
                format!("{} has been successfully deleted", name),
            ));
            Some(Effect::Reload)
        }
        Action::Failed { title, message } => {
            s.toast = Some(Toast::error(title, message));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CompletionMap;
    use chrono::{TimeZone, Utc};

    fn date(s: &str) -> NaiveDate {
        CompletionMap::parse_key(s).unwrap()
    }

    fn tracked(id: i64, name: &str, done: &[&str]) -> TrackedActivity {
        TrackedActivity::new(
            Activity {
                id,
                name: name.to_string(),
                color: "#06b6d4".to_string(),
                icon: None,
                created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            },
            CompletionMap::from_entries(done.iter().map(|d| (*d, true))).unwrap(),
        )
    }

    fn loaded() -> AppState {
        let state = AppState::new(date("2025-05-03"), ViewGranularity::Week);
        let (state, _) = update(
            &state,
            Action::Loaded(vec![
                tracked(2, "Reading", &[]),
                tracked(1, "Meditation", &["2025-05-03"]),
            ]),
        );
        state
    }

    #[test]
    fn update_does_not_mutate_input() {
        let before = loaded();
        let (after, _) = update(&before, Action::Down);
        assert_eq!(before.selected, 0);
        assert_eq!(after.selected, 1);
        let (after, _) = update(&after, Action::Down);
        assert_eq!(after.selected, 1);
    }

    #[test]
    fn toggle_today_requests_flip() {
        let (state, _) = update(&loaded(), Action::Down);
        let (next, effect) = update(&state, Action::ToggleToday);
        let today = date("2025-05-03");
        assert!(state.activities[1].completions.is_completed(today));
        assert!(!next.activities[1].completions.is_completed(today));
        assert_eq!(
            effect,
            Some(Effect::SetCompletion {
                activity_id: 1,
                name: "Meditation".into(),
                date: date("2025-05-03"),
                completed: false,
            })
        );

        let empty = AppState::new(date("2025-05-03"), ViewGranularity::Week);
        assert_eq!(update(&empty, Action::ToggleToday).1, None);
    }

    #[test]
    fn completion_outcome_toasts_and_reloads() {
        let (state, effect) = update(
            &loaded(),
            Action::CompletionSaved {
                name: "Reading".into(),
                completed: true,
            },
        );
        assert_eq!(effect, Some(Effect::Reload));
        let toast = state.toast.unwrap();
        assert_eq!(toast.title, "Completed");
        assert_eq!(toast.kind, ToastKind::Info);
    }

    #[test]
    fn new_activity_dialog_validates_name() {
        let (state, _) = update(&loaded(), Action::NewActivity);
        let (state, effect) = update(&state, Action::Submit);
        assert_eq!(effect, None);
        assert!(matches!(
            &state.dialog,
            Dialog::NewActivity { error: Some(e), .. } if e == "Please enter an activity name"
        ));

        let mut state = state;
        for c in " Yoga".chars() {
            state = update(&state, Action::Input(c)).0;
        }
        state = update(&state, Action::NextColor).0;
        let (state, effect) = update(&state, Action::Submit);
        assert_eq!(state.dialog, Dialog::None);
        assert_eq!(
            effect,
            Some(Effect::CreateActivity {
                name: "Yoga".into(),
                color: "#0ea5e9".into(),
            })
        );
    }

    #[test]
    fn delete_needs_confirmation() {
        let state = loaded();
        assert_eq!(update(&state, Action::ConfirmDelete).1, None);

        let (state, _) = update(&state, Action::RequestDelete);
        assert_eq!(state.dialog, Dialog::ConfirmDelete);
        let (state, effect) = update(&state, Action::ConfirmDelete);
        assert_eq!(state.dialog, Dialog::None);
        assert_eq!(
            effect,
            Some(Effect::DeleteActivity {
                activity_id: 2,
                name: "Reading".into(),
            })
        );

        let (state, _) = update(&state, Action::Open);
        let (state, _) = update(&state, Action::Deleted("Reading".into()));
        assert_eq!(state.screen, Screen::Dashboard);
    }

    #[test]
    fn reload_keeps_selection_by_id() {
        let (state, _) = update(&loaded(), Action::Down);
        let (state, _) = update(
            &state,
            Action::Loaded(vec![
                tracked(3, "Walking", &[]),
                tracked(2, "Reading", &[]),
                tracked(1, "Meditation", &[]),
            ]),
        );
        assert_eq!(state.selected, 2);
        assert_eq!(state.load, LoadState::Ready);

        let (state, _) = update(&state, Action::Loaded(vec![tracked(3, "Walking", &[])]));
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn created_activity_is_selected_after_reload() {
        let (state, _) = update(&loaded(), Action::Down);
        let fresh = tracked(3, "Walking", &[]);
        let (state, effect) = update(&state, Action::Created(fresh.activity.clone()));
        assert_eq!(effect, Some(Effect::Reload));

        let (state, _) = update(
            &state,
            Action::Loaded(vec![
                fresh,
                tracked(2, "Reading", &[]),
                tracked(1, "Meditation", &[]),
            ]),
        );
        assert_eq!(state.selected, 0);
        assert_eq!(state.pending_select, None);
        assert_eq!(state.selected_activity().map(|t| t.activity.id), Some(3));
    }

    #[test]
    fn back_closes_layers_in_order() {
        let (state, _) = update(&loaded(), Action::Open);
        let (state, _) = update(&state, Action::ToggleHelp);
        let (state, _) = update(&state, Action::Back);
        assert!(!state.show_help);
        assert_eq!(state.screen, Screen::Detail);
        let (state, _) = update(&state, Action::Back);
        assert_eq!(state.screen, Screen::Dashboard);
        let (state, _) = update(&state, Action::Back);
        assert!(state.should_quit);
    }

    #[test]
    fn detail_navigation_pages_periods() {
        let (state, _) = update(&loaded(), Action::Open);
        let (state, _) = update(&state, Action::SetView(ViewGranularity::Month));
        let (state, _) = update(&state, Action::Shift(-1));
        assert_eq!(state.reference, date("2025-04-03"));
        let (state, _) = update(&state, Action::CycleView);
        assert_eq!(state.view, ViewGranularity::Year);
        let (state, _) = update(&state, Action::JumpToday);
        assert_eq!(state.reference, date("2025-05-03"));
    }

    #[test]
    fn tick_rolls_day_and_expires_toast() {
        let (mut state, _) = update(&loaded(), Action::Failed {
            title: "Error updating streak".into(),
            message: "disk full".into(),
        });
        assert_eq!(state.toast.as_ref().map(|t| t.kind), Some(ToastKind::Error));

        for _ in 0..TOAST_TICKS {
            state = update(&state, Action::Tick(date("2025-05-04"))).0;
        }
        assert_eq!(state.toast, None);
        assert_eq!(state.today, date("2025-05-04"));
        assert_eq!(state.reference, date("2025-05-04"));
    }

    #[test]
    fn load_failure_is_reported() {
        let state = AppState::new(date("2025-05-03"), ViewGranularity::Week);
        let (state, _) = update(&state, Action::LoadFailed("database is locked".into()));
        assert_eq!(state.load, LoadState::Failed("database is locked".into()));
        let (state, effect) = update(&state, Action::Reload);
        assert_eq!(state.load, LoadState::Loading);
        assert_eq!(effect, Some(Effect::Reload));
    }
}
