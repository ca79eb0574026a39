//! Taskbar
//!
//! One button per open window, kept in sync from desktop events. Button
//! clicks never touch the desktop directly: they produce a `TaskbarRequest`
//! that the shell applies on the UI loop.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::config::TaskbarConfig;
use crate::shared::Geometry;
use crate::wm::desktop::Desktop;
use crate::wm::events::DesktopEvent;
use crate::wm::window::WindowId;

/// Entries of a button's context menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskbarAction {
    Restore,
    Minimize,
    Close,
}

impl TaskbarAction {
    pub const ALL: [TaskbarAction; 3] = [
        TaskbarAction::Restore,
        TaskbarAction::Minimize,
        TaskbarAction::Close,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TaskbarAction::Restore => "还原",
            TaskbarAction::Minimize => "最小化",
            TaskbarAction::Close => "关闭",
        }
    }

    /// Parse an action by English name, label or mnemonic
    pub fn from_name(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        let key = match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c.to_ascii_uppercase()),
            _ => None,
        };

        Self::ALL.into_iter().find(|action| {
            name.eq_ignore_ascii_case(action.name())
                || name == action.label()
                || key == Some(action.mnemonic())
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            TaskbarAction::Restore => "restore",
            TaskbarAction::Minimize => "minimize",
            TaskbarAction::Close => "close",
        }
    }

    pub fn mnemonic(&self) -> char {
        match self {
            TaskbarAction::Restore => 'R',
            TaskbarAction::Minimize => 'M',
            TaskbarAction::Close => 'C',
        }
    }
}

/// Work the taskbar asks the shell to perform on the desktop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskbarRequest {
    /// Bring the window to front; de-iconify first when `deiconify` is set
    Activate { id: WindowId, deiconify: bool },
    Restore(WindowId),
    Minimize(WindowId),
    Close(WindowId),
}

/// Visual state of one taskbar button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskbarButton {
    pub label: String,
    /// Highlighted while its window is selected
    pub active: bool,
    pub minimized: bool,
}

/// Laid-out button, as shown in snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskbarEntry {
    pub id: WindowId,
    pub label: String,
    pub active: bool,
    pub minimized: bool,
    /// Position inside the taskbar strip
    pub bounds: Geometry,
}

/// Taskbar controller
#[derive(Debug, Default)]
pub struct TaskbarController {
    buttons: BTreeMap<WindowId, TaskbarButton>,
    config: TaskbarConfig,
}

impl TaskbarController {
    pub fn new(config: TaskbarConfig) -> Self {
        Self {
            buttons: BTreeMap::new(),
            config,
        }
    }

    /// React to one desktop event
    pub fn handle_event(&mut self, event: &DesktopEvent) {
        match event {
            DesktopEvent::WindowAdded { id, icon, title } => {
                let label = format!("{} {}", icon, title);
                debug!("Taskbar: adding button {} '{}'", id, label);
                self.buttons.insert(
                    *id,
                    TaskbarButton {
                        label,
                        active: false,
                        minimized: false,
                    },
                );
            }
            DesktopEvent::WindowRemoved(id) => {
                if self.buttons.remove(id).is_some() {
                    debug!("Taskbar: removed button {}", id);
                }
            }
            DesktopEvent::WindowActivated(id) => self.update(*id, |b| b.active = true),
            DesktopEvent::WindowDeactivated(id) => self.update(*id, |b| b.active = false),
            DesktopEvent::WindowIconified(id) => self.update(*id, |b| {
                b.minimized = true;
                b.active = false;
            }),
            DesktopEvent::WindowRestored(id) => self.update(*id, |b| b.minimized = false),
        }
    }

    /// Primary click on a button
    pub fn primary_click(&self, id: WindowId) -> Option<TaskbarRequest> {
        let button = self.buttons.get(&id)?;
        Some(TaskbarRequest::Activate {
            id,
            deiconify: button.minimized,
        })
    }

    /// Secondary click: entries of the context menu, if the button exists
    pub fn context_menu(&self, id: WindowId) -> Option<&'static [TaskbarAction]> {
        self.buttons.get(&id).map(|_| &TaskbarAction::ALL[..])
    }

    /// A context-menu entry was chosen
    pub fn context_action(&self, id: WindowId, action: TaskbarAction) -> Option<TaskbarRequest> {
        if !self.buttons.contains_key(&id) {
            debug!("Taskbar: {:?} on missing button {} ignored", action, id);
            return None;
        }

        Some(match action {
            TaskbarAction::Restore => TaskbarRequest::Restore(id),
            TaskbarAction::Minimize => TaskbarRequest::Minimize(id),
            TaskbarAction::Close => TaskbarRequest::Close(id),
        })
    }

    pub fn button(&self, id: WindowId) -> Option<&TaskbarButton> {
        self.buttons.get(&id)
    }

    pub fn button_ids(&self) -> Vec<WindowId> {
        self.buttons.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }

    /// Button set equals the set of open windows
    pub fn is_consistent_with(&self, desktop: &Desktop) -> bool {
        let mut open: Vec<WindowId> = desktop
            .ids()
            .into_iter()
            .filter(|id| desktop.is_open(*id))
            .collect();
        open.sort_unstable();

        let consistent = open == self.button_ids();
        if !consistent {
            warn!(
                "Taskbar out of sync: buttons {:?}, open windows {:?}",
                self.button_ids(),
                open
            );
        }
        consistent
    }

    /// Buttons laid out left to right with the configured size
    pub fn entries(&self) -> Vec<TaskbarEntry> {
        let width = self.config.button_width;
        let height = self.config.button_height;

        self.buttons
            .iter()
            .enumerate()
            .map(|(slot, (id, button))| TaskbarEntry {
                id: *id,
                label: button.label.clone(),
                active: button.active,
                minimized: button.minimized,
                bounds: Geometry::new(slot as i32 * width as i32, 0, width, height),
            })
            .collect()
    }

    /// Clock text shown at the right end of the taskbar
    pub fn clock_text<Tz>(&self, now: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        now.format(&self.config.clock_format).to_string()
    }

    /// One line per button, marking the active one
    pub fn render(&self) -> String {
        self.buttons
            .values()
            .map(|b| {
                if b.active {
                    format!("[*{}]", b.label)
                } else if b.minimized {
                    format!("[_{}]", b.label)
                } else {
                    format!("[{}]", b.label)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn update(&mut self, id: WindowId, apply: impl FnOnce(&mut TaskbarButton)) {
        match self.buttons.get_mut(&id) {
            Some(button) => apply(button),
            None => debug!("Taskbar: event for unknown button {} ignored", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn added(id: u64) -> DesktopEvent {
        DesktopEvent::WindowAdded {
            id: WindowId::new(id),
            icon: "🔢".into(),
            title: format!("计算器 #{id}"),
        }
    }

    #[test]
    fn test_button_lifecycle() {
        let mut taskbar = TaskbarController::default();
        let id = WindowId::new(0);

        taskbar.handle_event(&added(0));
        assert_eq!(taskbar.button(id).unwrap().label, "🔢 计算器 #0");
        assert!(!taskbar.button(id).unwrap().active);

        taskbar.handle_event(&DesktopEvent::WindowActivated(id));
        assert!(taskbar.button(id).unwrap().active);

        taskbar.handle_event(&DesktopEvent::WindowDeactivated(id));
        assert!(!taskbar.button(id).unwrap().active);

        taskbar.handle_event(&DesktopEvent::WindowRemoved(id));
        assert!(taskbar.is_empty());
    }

    #[test]
    fn test_events_for_missing_buttons_are_ignored() {
        let mut taskbar = TaskbarController::default();
        taskbar.handle_event(&DesktopEvent::WindowRemoved(WindowId::new(3)));
        taskbar.handle_event(&DesktopEvent::WindowActivated(WindowId::new(3)));
        assert!(taskbar.is_empty());

        assert_eq!(taskbar.primary_click(WindowId::new(3)), None);
        assert_eq!(taskbar.context_menu(WindowId::new(3)), None);
        assert_eq!(
            taskbar.context_action(WindowId::new(3), TaskbarAction::Close),
            None
        );
    }

    #[test]
    fn test_primary_click_deiconifies_minimized() {
        let mut taskbar = TaskbarController::default();
        let id = WindowId::new(1);
        taskbar.handle_event(&added(1));

        assert_eq!(
            taskbar.primary_click(id),
            Some(TaskbarRequest::Activate { id, deiconify: false })
        );

        taskbar.handle_event(&DesktopEvent::WindowIconified(id));
        assert_eq!(
            taskbar.primary_click(id),
            Some(TaskbarRequest::Activate { id, deiconify: true })
        );

        taskbar.handle_event(&DesktopEvent::WindowRestored(id));
        assert!(!taskbar.button(id).unwrap().minimized);
    }

    #[test]
    fn test_context_menu_actions() {
        let mut taskbar = TaskbarController::default();
        let id = WindowId::new(2);
        taskbar.handle_event(&added(2));

        let menu = taskbar.context_menu(id).unwrap();
        assert_eq!(
            menu.iter().map(|a| a.label()).collect::<Vec<_>>(),
            vec!["还原", "最小化", "关闭"]
        );
        assert_eq!(
            taskbar.context_action(id, TaskbarAction::Minimize),
            Some(TaskbarRequest::Minimize(id))
        );
        assert_eq!(
            taskbar.context_action(id, TaskbarAction::Close),
            Some(TaskbarRequest::Close(id))
        );
    }

    #[test]
    fn test_entries_use_configured_button_size() {
        let mut taskbar = TaskbarController::new(TaskbarConfig {
            button_width: 120,
            button_height: 28,
            ..TaskbarConfig::default()
        });
        taskbar.handle_event(&added(4));
        taskbar.handle_event(&added(9));
        taskbar.handle_event(&DesktopEvent::WindowActivated(WindowId::new(9)));

        let entries = taskbar.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, WindowId::new(4));
        assert_eq!(entries[0].bounds, Geometry::new(0, 0, 120, 28));
        assert_eq!(entries[1].bounds, Geometry::new(120, 0, 120, 28));
        assert!(entries[1].active);
        assert!(!entries[0].active);
    }

    #[test]
    fn test_action_from_name() {
        assert_eq!(TaskbarAction::from_name("Minimize"), Some(TaskbarAction::Minimize));
        assert_eq!(TaskbarAction::from_name("还原"), Some(TaskbarAction::Restore));
        assert_eq!(TaskbarAction::from_name("c"), Some(TaskbarAction::Close));
        assert_eq!(TaskbarAction::from_name("maximize"), None);
    }

    #[test]
    fn test_clock_uses_configured_format() {
        let taskbar = TaskbarController::default();
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(taskbar.clock_text(&now), "2024-03-09 07:05:01");
    }

    #[test]
    fn test_render_marks_active_and_minimized() {
        let mut taskbar = TaskbarController::default();
        taskbar.handle_event(&added(0));
        taskbar.handle_event(&added(1));
        taskbar.handle_event(&DesktopEvent::WindowIconified(WindowId::new(0)));
        taskbar.handle_event(&DesktopEvent::WindowActivated(WindowId::new(1)));

        assert_eq!(taskbar.render(), "[_🔢 计算器 #0] [*🔢 计算器 #1]");
    }
}
