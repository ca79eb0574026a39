//! Shell Module
//!
//! The shell owns the desktop, the taskbar, the launcher and the layout
//! engine, and is the only place where they meet. All of it lives on the UI
//! loop; background work reaches it through the UI queue.

pub mod command;
pub mod launcher;
pub mod menus;
pub mod taskbar;

use anyhow::Result;
use chrono::Local;
use serde::Serialize;
use std::fmt;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::shared::Geometry;
use crate::tools;
use crate::wm::{Desktop, LayoutEngine, Surface, WindowId, WindowInfo};
use command::ShellCommand;
use launcher::{DeferredSurface, LaunchRegistry};
use taskbar::{TaskbarAction, TaskbarController, TaskbarEntry, TaskbarRequest};

/// Messages posted to the UI loop from other tasks and threads
#[derive(Debug)]
pub enum UiMessage {
    /// A tool finished preparing the real content of its window
    ReplaceSurface {
        id: WindowId,
        surface: Box<dyn Surface>,
    },
}

pub type UiSender = mpsc::UnboundedSender<UiMessage>;
pub type UiReceiver = mpsc::UnboundedReceiver<UiMessage>;

/// Create the UI queue
pub fn ui_queue() -> (UiSender, UiReceiver) {
    mpsc::unbounded_channel()
}

/// User-facing notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A tool could not be started; the shell keeps running
    ToolFailed { tool: String, message: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::ToolFailed { message, .. } => write!(f, "启动工具失败: {}", message),
        }
    }
}

/// Serializable view of the whole desktop
#[derive(Debug, Clone, Serialize)]
pub struct DesktopSnapshot {
    pub area: Geometry,
    pub count: usize,
    pub selected: Option<WindowId>,
    pub windows: Vec<WindowInfo>,
    pub taskbar: Vec<TaskbarEntry>,
}

/// Shell state
pub struct Shell {
    desktop: Desktop,
    taskbar: TaskbarController,
    registry: LaunchRegistry,
    layout: LayoutEngine,

    /// Sender side of the UI queue, handed to background tasks
    ui_tx: UiSender,

    /// Status bar message
    status: String,

    /// Notifications not yet shown to the user
    notices: Vec<Notice>,
}

impl Shell {
    /// Create a shell with every built-in tool registered
    pub fn new(config: &Config, ui_tx: UiSender) -> Self {
        let mut registry = LaunchRegistry::new(config.windows.clone());
        tools::register_builtin_tools(&mut registry);
        Self::with_registry(config, registry, ui_tx)
    }

    /// Create a shell around an existing registry
    pub fn with_registry(config: &Config, registry: LaunchRegistry, ui_tx: UiSender) -> Self {
        info!(
            "Shell ready: desktop {}x{}, {} tools",
            config.desktop.width,
            config.desktop.height,
            registry.tool_ids().len()
        );

        Self {
            desktop: Desktop::new(config.desktop.width, config.desktop.height),
            taskbar: TaskbarController::new(config.taskbar.clone()),
            registry,
            layout: LayoutEngine::new(config.layout.clone()),
            ui_tx,
            status: "就绪".to_string(),
            notices: Vec::new(),
        }
    }

    pub fn desktop(&self) -> &Desktop {
        &self.desktop
    }

    pub fn taskbar(&self) -> &TaskbarController {
        &self.taskbar
    }

    pub fn registry(&self) -> &LaunchRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut LaunchRegistry {
        &mut self.registry
    }

    /// Launch a tool.
    ///
    /// Tool failures become a notice and `Ok(None)`. Only a corrupted id
    /// space is returned as an error.
    pub fn launch(&mut self, tool_id: &str) -> Result<Option<WindowId>> {
        let result = self.registry.launch(tool_id, &mut self.desktop);
        self.settle();

        match result {
            Ok(launched) => {
                if let Some(deferred) = launched.deferred {
                    self.spawn_deferred(launched.id, deferred);
                }
                if let Some(window) = self.desktop.get(launched.id) {
                    self.status = format!("已启动 {}", window.title());
                }
                Ok(Some(launched.id))
            }
            Err(e) if e.is_fatal() => {
                error!("Launch of '{}' broke desktop invariants: {}", tool_id, e);
                Err(anyhow::Error::new(e).context(format!("launching '{}'", tool_id)))
            }
            Err(e) => {
                let notice = Notice::ToolFailed {
                    tool: e.tool().unwrap_or(tool_id).to_string(),
                    message: e.to_string(),
                };
                warn!("{}", notice);
                self.status = notice.to_string();
                self.notices.push(notice);
                Ok(None)
            }
        }
    }

    pub fn activate(&mut self, id: WindowId) -> bool {
        let done = self.desktop.activate(id);
        self.settle();
        done
    }

    pub fn minimize(&mut self, id: WindowId) -> bool {
        let done = self.desktop.iconify(id);
        self.settle();
        done
    }

    pub fn restore(&mut self, id: WindowId) -> bool {
        let done = self.desktop.restore(id);
        self.settle();
        done
    }

    pub fn maximize(&mut self, id: WindowId) -> bool {
        let done = self.desktop.maximize(id);
        self.settle();
        done
    }

    pub fn close(&mut self, id: WindowId) -> bool {
        let done = self.desktop.close(id);
        self.settle();
        done
    }

    /// Free move/resize of a window. A maximized window drops back to normal.
    pub fn move_window(&mut self, id: WindowId, bounds: Geometry) -> bool {
        let done = self.desktop.set_bounds(id, bounds);
        self.settle();
        done
    }

    /// Primary click on a taskbar button
    pub fn taskbar_click(&mut self, id: WindowId) -> bool {
        match self.taskbar.primary_click(id) {
            Some(request) => self.apply_request(request),
            None => false,
        }
    }

    /// Context-menu choice on a taskbar button
    pub fn taskbar_action(&mut self, id: WindowId, action: TaskbarAction) -> bool {
        match self.taskbar.context_action(id, action) {
            Some(request) => self.apply_request(request),
            None => false,
        }
    }

    /// Carry out a taskbar request against the desktop
    pub fn apply_request(&mut self, request: TaskbarRequest) -> bool {
        debug!("Applying taskbar request {:?}", request);
        match request {
            TaskbarRequest::Activate { id, deiconify } => {
                if deiconify {
                    self.desktop.deiconify(id);
                }
                self.activate(id)
            }
            TaskbarRequest::Restore(id) => self.restore(id),
            TaskbarRequest::Minimize(id) => self.minimize(id),
            TaskbarRequest::Close(id) => self.close(id),
        }
    }

    pub fn cascade(&mut self) {
        self.layout.cascade(&mut self.desktop);
        self.settle();
    }

    pub fn tile(&mut self) {
        self.layout.tile(&mut self.desktop);
        self.settle();
    }

    pub fn close_all(&mut self) {
        self.layout.close_all(&mut self.desktop, &mut self.registry);
        self.settle();
    }

    /// Apply a message taken off the UI queue
    pub fn handle_ui_message(&mut self, message: UiMessage) {
        match message {
            UiMessage::ReplaceSurface { id, surface } => {
                if self.desktop.replace_surface(id, surface) {
                    info!("Window {} content ready", id);
                } else {
                    debug!("Window {} is gone, discarding its late content", id);
                }
            }
        }
    }

    /// Notifications raised since the last call
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Status bar text
    pub fn status_line(&self) -> String {
        format!("{} | 窗口数: {}", self.status, self.desktop.count())
    }

    pub fn snapshot(&self) -> DesktopSnapshot {
        DesktopSnapshot {
            area: self.desktop.area(),
            count: self.desktop.count(),
            selected: self.desktop.selected(),
            windows: self.desktop.all_windows(),
            taskbar: self.taskbar.entries(),
        }
    }

    /// Run one command and return the text to show
    pub fn execute(&mut self, command: ShellCommand) -> Result<String> {
        let missing = |id: WindowId| format!("no open window #{}", id);

        let output = match command {
            ShellCommand::Launch { tool } => match self.launch(&tool)? {
                Some(id) => self
                    .desktop
                    .get(id)
                    .map(|w| format!("{} {}", w.icon(), w.title()))
                    .unwrap_or_default(),
                None => String::new(),
            },
            ShellCommand::Activate { id } => outcome(self.activate(id), || missing(id)),
            ShellCommand::TaskbarClick { id } => outcome(self.taskbar_click(id), || missing(id)),
            ShellCommand::TaskbarMenu { id, action } => {
                outcome(self.taskbar_action(id, action), || missing(id))
            }
            ShellCommand::Minimize { id } => outcome(self.minimize(id), || missing(id)),
            ShellCommand::Restore { id } => outcome(self.restore(id), || missing(id)),
            ShellCommand::Maximize { id } => outcome(self.maximize(id), || missing(id)),
            ShellCommand::Close { id } => outcome(self.close(id), || missing(id)),
            ShellCommand::Move { id, bounds } => outcome(self.move_window(id, bounds), || missing(id)),
            ShellCommand::Cascade => {
                self.cascade();
                self.render_windows()
            }
            ShellCommand::Tile => {
                self.tile();
                self.render_windows()
            }
            ShellCommand::CloseAll => {
                self.close_all();
                self.status_line()
            }
            ShellCommand::List => self.render_windows(),
            ShellCommand::Snapshot => serde_json::to_string_pretty(&self.snapshot())?,
            ShellCommand::Tools => self.registry.tool_ids().join(" "),
            ShellCommand::Menu { menu } => menus::render(&menu.sections()),
            ShellCommand::Select {
                menu,
                section,
                item,
            } => match menus::select_in(menu, section, item) {
                Ok(chosen) => {
                    debug!("{} entry {}.{} -> {:?}", menu.name(), section, item, chosen);
                    return self.execute(chosen);
                }
                Err(e) => e.to_string(),
            },
            ShellCommand::About => menus::about(),
            ShellCommand::Status => format!(
                "{}  {}\n{}",
                self.taskbar.render(),
                self.taskbar.clock_text(&Local::now()),
                self.status_line()
            ),
            ShellCommand::Quit => String::new(),
        };

        Ok(output)
    }

    /// One line per window, bottom of the stack first
    pub fn render_windows(&self) -> String {
        self.desktop
            .all_windows()
            .iter()
            .map(|w| {
                format!(
                    "#{:<4} {} {:<28} {:<20} {},{} {}x{}  {}",
                    w.id,
                    w.icon,
                    w.title,
                    w.state,
                    w.bounds.x,
                    w.bounds.y,
                    w.bounds.width,
                    w.bounds.height,
                    w.content
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Forward queued desktop events to the taskbar
    fn settle(&mut self) {
        for event in self.desktop.take_events() {
            debug!("Window {}: {:?}", event.window(), event);
            self.taskbar.handle_event(&event);
        }
        debug_assert!(self.taskbar.is_consistent_with(&self.desktop));
    }

    /// Wait for a tool's background content and post it to the UI queue
    fn spawn_deferred(&self, id: WindowId, deferred: DeferredSurface) {
        let ui_tx = self.ui_tx.clone();

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    match deferred.await {
                        Ok(surface) => {
                            if ui_tx.send(UiMessage::ReplaceSurface { id, surface }).is_err() {
                                debug!("UI queue closed, content for window {} dropped", id);
                            }
                        }
                        Err(_) => debug!("Tool for window {} abandoned its content", id),
                    }
                });
            }
            Err(_) => warn!("No async runtime, content for window {} will not arrive", id),
        }
    }
}

fn outcome(done: bool, otherwise: impl FnOnce() -> String) -> String {
    if done {
        "ok".to_string()
    } else {
        otherwise()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use crate::wm::surface::Placeholder;
    use launcher::ToolOutput;
    use menus::MenuKind;
    use std::collections::BTreeSet;
    use std::time::Duration;
    use tokio::sync::oneshot;

    fn test_shell() -> (Shell, UiReceiver) {
        let config = Config::default();
        let mut registry = LaunchRegistry::new(config.windows.clone());
        registry.register("calculator", || {
            Ok(ToolOutput::new("计算器", "🔢", Placeholder::loading()))
        });
        registry.register("explorer", || {
            Ok(ToolOutput::new("文件资源管理器", "📁", Placeholder::loading()))
        });
        registry.register("broken", || Err(ToolError::new("no display")));

        let (ui_tx, ui_rx) = ui_queue();
        (Shell::with_registry(&config, registry, ui_tx), ui_rx)
    }

    fn open_ids(shell: &Shell) -> BTreeSet<WindowId> {
        shell.desktop().ids().into_iter().collect()
    }

    fn button_ids(shell: &Shell) -> BTreeSet<WindowId> {
        shell.taskbar().button_ids().into_iter().collect()
    }

    #[test]
    fn test_launch_scenario() {
        let (mut shell, _rx) = test_shell();

        let a = shell.launch("calculator").unwrap().unwrap();
        let b = shell.launch("explorer").unwrap().unwrap();
        let c = shell.launch("calculator").unwrap().unwrap();

        assert_eq!(shell.desktop().count(), 3);
        assert_eq!(shell.desktop().get(a).unwrap().title(), "计算器 #0");
        assert_eq!(shell.desktop().get(c).unwrap().title(), "计算器 #2");
        assert_eq!(button_ids(&shell), open_ids(&shell));
        assert!(shell.taskbar().button(c).unwrap().active);

        assert!(shell.activate(b));
        assert_eq!(shell.desktop().ids().last(), Some(&b));
        assert!(shell.taskbar().button(b).unwrap().active);
        assert!(!shell.taskbar().button(c).unwrap().active);
        assert_eq!(shell.status_line(), "已启动 计算器 #2 | 窗口数: 3");
    }

    #[test]
    fn test_failed_launch_becomes_notice() {
        let (mut shell, _rx) = test_shell();

        assert_eq!(shell.launch("broken").unwrap(), None);
        assert_eq!(shell.launch("nonexistent-tool").unwrap(), None);
        assert_eq!(shell.desktop().count(), 0);
        assert!(shell.taskbar().is_empty());

        let notices = shell.take_notices();
        assert_eq!(notices.len(), 2);
        assert_eq!(
            notices[0],
            Notice::ToolFailed {
                tool: "broken".into(),
                message: "tool 'broken' failed to start: no display".into()
            }
        );

        // The failed factory burned id 0, the unknown tool burned nothing
        assert_eq!(shell.launch("calculator").unwrap(), Some(WindowId::new(1)));
    }

    #[test]
    fn test_taskbar_tracks_every_operation() {
        let (mut shell, _rx) = test_shell();
        let tools = ["calculator", "explorer", "broken"];

        for step in 0..40u64 {
            match step % 7 {
                0 | 1 | 4 => {
                    shell.launch(tools[(step % 3) as usize]).unwrap();
                }
                2 => {
                    shell.activate(WindowId::new(step / 2));
                }
                3 => {
                    shell.close(WindowId::new(step / 3));
                }
                5 => {
                    shell.minimize(WindowId::new(step / 4));
                }
                _ => {
                    shell.taskbar_click(WindowId::new(step / 5));
                }
            }
            assert_eq!(button_ids(&shell), open_ids(&shell), "step {step}");

            let selected: Vec<_> = shell
                .desktop()
                .all_windows()
                .into_iter()
                .filter(|w| w.flags.contains(crate::shared::WindowFlags::SELECTED))
                .collect();
            assert!(selected.len() <= 1);
            if let Some(sel) = selected.first() {
                assert_eq!(shell.desktop().ids().last(), Some(&sel.id));
            }
        }
    }

    #[test]
    fn test_taskbar_click_restores_minimized_window() {
        let (mut shell, _rx) = test_shell();
        let a = shell.launch("calculator").unwrap().unwrap();
        let b = shell.launch("explorer").unwrap().unwrap();

        assert!(shell.minimize(a));
        assert!(shell.taskbar().button(a).unwrap().minimized);
        assert_eq!(shell.desktop().selected(), Some(b));

        assert!(shell.taskbar_click(a));
        let window = shell.desktop().get(a).unwrap();
        assert!(!window.is_iconified());
        assert!(window.is_selected());
        assert!(!shell.taskbar().button(a).unwrap().minimized);
        assert!(shell.taskbar().button(a).unwrap().active);
    }

    #[test]
    fn test_taskbar_context_actions() {
        let (mut shell, _rx) = test_shell();
        let a = shell.launch("calculator").unwrap().unwrap();

        assert!(shell.taskbar_action(a, TaskbarAction::Minimize));
        assert!(shell.desktop().get(a).unwrap().is_iconified());

        assert!(shell.taskbar_action(a, TaskbarAction::Restore));
        assert!(shell.desktop().get(a).unwrap().is_selected());

        assert!(shell.taskbar_action(a, TaskbarAction::Close));
        assert_eq!(shell.desktop().count(), 0);
        assert!(shell.taskbar().is_empty());

        // Button is gone: every further action is a quiet no-op
        assert!(!shell.taskbar_action(a, TaskbarAction::Close));
        assert!(!shell.taskbar_click(a));
    }

    #[test]
    fn test_close_all_empties_taskbar() {
        let (mut shell, _rx) = test_shell();
        for _ in 0..4 {
            shell.launch("calculator").unwrap();
        }

        shell.close_all();
        assert_eq!(shell.desktop().count(), 0);
        assert!(shell.taskbar().is_empty());

        let next = shell.launch("explorer").unwrap().unwrap();
        assert_eq!(next, WindowId::new(4));
        assert_eq!(shell.desktop().get(next).unwrap().bounds(), Geometry::new(0, 0, 800, 600));
    }

    #[test]
    fn test_execute_commands() {
        let (mut shell, _rx) = test_shell();

        let out = shell.execute("launch calculator".parse().unwrap()).unwrap();
        assert_eq!(out, "🔢 计算器 #0");
        shell.execute(ShellCommand::Launch { tool: "explorer".into() }).unwrap();

        let tiled = shell.execute(ShellCommand::Tile).unwrap();
        assert_eq!(tiled.lines().count(), 2);

        let out = shell.execute(ShellCommand::Close { id: WindowId::new(9) }).unwrap();
        assert_eq!(out, "no open window #9");

        let json = shell.execute(ShellCommand::Snapshot).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["count"], 2);
        assert_eq!(value["selected"], 1);
        assert_eq!(value["windows"][0]["bounds"]["width"], 600);
        assert_eq!(value["windows"][0]["tool"], "计算器");
        assert_eq!(value["taskbar"][1]["bounds"]["x"], 150);
        assert_eq!(value["taskbar"][1]["active"], true);

        let status = shell.execute(ShellCommand::Status).unwrap();
        assert!(status.contains("窗口数: 2"));
    }

    #[test]
    fn test_select_start_menu_entry_tiles_windows() {
        let (mut shell, _rx) = test_shell();
        shell.launch("calculator").unwrap();
        shell.launch("explorer").unwrap();

        let section = menus::start_menu()
            .iter()
            .position(|s| s.title.contains("窗口管理"))
            .unwrap();
        let command: ShellCommand = format!("select {section}.1").parse().unwrap();
        shell.execute(command).unwrap();

        let bounds: Vec<Geometry> = shell.desktop().all_windows().iter().map(|w| w.bounds).collect();
        assert_eq!(
            bounds,
            vec![Geometry::new(0, 0, 600, 800), Geometry::new(600, 0, 600, 800)]
        );

        let out = shell
            .execute(ShellCommand::Select {
                menu: MenuKind::Start,
                section: 99,
                item: 0,
            })
            .unwrap();
        assert_eq!(out, "no entry 99.0 in the start menu");
    }

    #[test]
    fn test_select_menu_bar_launches_tool() {
        let (ui_tx, _rx) = ui_queue();
        let mut shell = Shell::new(&Config::default(), ui_tx);

        let out = shell.execute("select bar 2.2".parse().unwrap()).unwrap();
        assert_eq!(out, "🛠️ 任务管理器 #0");
        assert!(shell.execute(ShellCommand::About).unwrap().contains("任务管理器"));
    }

    #[test]
    fn test_move_unmaximizes_window() {
        let (mut shell, _rx) = test_shell();
        let id = shell.launch("calculator").unwrap().unwrap();
        shell.maximize(id);
        assert!(shell.desktop().get(id).unwrap().is_maximized());

        let out = shell.execute("move 0 40 50 300 200".parse().unwrap()).unwrap();
        assert_eq!(out, "ok");
        let window = shell.desktop().get(id).unwrap();
        assert!(!window.is_maximized());
        assert_eq!(window.bounds(), Geometry::new(40, 50, 300, 200));

        let out = shell
            .execute(ShellCommand::Move {
                id: WindowId::new(9),
                bounds: Geometry::new(0, 0, 10, 10),
            })
            .unwrap();
        assert_eq!(out, "no open window #9");
        assert_eq!(shell.desktop().count(), 1);
        assert_eq!(shell.desktop().get(id).unwrap().bounds(), Geometry::new(40, 50, 300, 200));
    }

    #[test]
    fn test_taskbar_menu_command() {
        let (mut shell, _rx) = test_shell();
        let id = shell.launch("calculator").unwrap().unwrap();

        shell.execute("taskbar 0 minimize".parse().unwrap()).unwrap();
        assert!(shell.desktop().get(id).unwrap().is_iconified());
        assert!(shell.taskbar().button(id).unwrap().minimized);

        shell.execute("taskbar 0 关闭".parse().unwrap()).unwrap();
        assert!(shell.taskbar().is_empty());
        let out = shell.execute("taskbar 0 restore".parse().unwrap()).unwrap();
        assert_eq!(out, "no open window #0");
    }

    #[test]
    fn test_late_content_for_closed_window_is_discarded() {
        let (mut shell, _rx) = test_shell();
        let id = shell.launch("calculator").unwrap().unwrap();
        shell.close(id);

        shell.handle_ui_message(UiMessage::ReplaceSurface {
            id,
            surface: Box::new(Placeholder { text: "late".into() }),
        });
        assert_eq!(shell.desktop().count(), 0);
    }

    #[tokio::test]
    async fn test_deferred_content_arrives_through_ui_queue() {
        let (mut shell, mut ui_rx) = test_shell();
        let (tx, rx) = oneshot::channel::<Box<dyn Surface>>();
        let slot = std::sync::Mutex::new(Some(rx));
        shell.registry_mut().register("fetcher", move || {
            let rx = slot
                .lock()
                .map_err(|_| ToolError::new("poisoned"))?
                .take()
                .ok_or_else(|| ToolError::new("already launched"))?;
            Ok(ToolOutput::new("API 数据获取器", "🔗", Placeholder::loading()).with_deferred(rx))
        });

        let id = shell.launch("fetcher").unwrap().unwrap();
        assert_eq!(shell.desktop().get(id).unwrap().surface().describe(), "Loading...");

        tx.send(Box::new(Placeholder { text: "42 rows".into() })).unwrap();
        let message = tokio::time::timeout(Duration::from_secs(2), ui_rx.recv())
            .await
            .unwrap()
            .unwrap();
        shell.handle_ui_message(message);

        assert_eq!(shell.desktop().get(id).unwrap().surface().describe(), "42 rows");
    }

    #[tokio::test]
    async fn test_builtin_background_tool_closed_before_ready() {
        let (ui_tx, mut ui_rx) = ui_queue();
        let mut shell = Shell::new(&Config::default(), ui_tx);

        let id = shell.launch("web-browser").unwrap().unwrap();
        assert!(shell.close(id));

        let message = tokio::time::timeout(Duration::from_secs(2), ui_rx.recv())
            .await
            .unwrap()
            .unwrap();
        shell.handle_ui_message(message);

        assert!(!shell.desktop().is_open(id));
        assert!(shell.taskbar().is_empty());
    }
}
