//! Shell commands
//!
//! Everything the user can ask the shell to do: menu items, toolbar buttons,
//! taskbar clicks, window drags. Commands arrive either as short text lines
//! (`launch calculator`, `tile`, `select 5.1`) or as tagged JSON objects.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::CommandError;
use crate::shared::Geometry;
use crate::shell::menus::{self, MenuKind};
use crate::shell::taskbar::TaskbarAction;
use crate::wm::window::WindowId;

/// Commands accepted by the shell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShellCommand {
    /// Launch a registered tool
    Launch { tool: String },

    /// Select and raise a window
    Activate { id: WindowId },

    /// Primary click on a taskbar button
    TaskbarClick { id: WindowId },

    /// Context-menu choice on a taskbar button
    TaskbarMenu { id: WindowId, action: TaskbarAction },

    /// Minimize a window
    Minimize { id: WindowId },

    /// Restore a minimized or maximized window
    Restore { id: WindowId },

    /// Maximize a window to the desktop area
    Maximize { id: WindowId },

    /// Close a window
    Close { id: WindowId },

    /// Move and resize a window, as a user drag would
    Move { id: WindowId, bounds: Geometry },

    /// Cascade all windows
    Cascade,

    /// Tile all windows
    Tile,

    /// Close every window
    CloseAll,

    /// List windows in z-order
    List,

    /// Print a JSON snapshot of the desktop
    Snapshot,

    /// List registered tools
    Tools,

    /// Print one of the menus
    Menu {
        #[serde(default)]
        menu: MenuKind,
    },

    /// Pick the entry at `section.item` of a menu
    Select {
        #[serde(default)]
        menu: MenuKind,
        section: usize,
        item: usize,
    },

    /// Print the About text
    About,

    /// Print taskbar and status bar
    Status,

    /// Leave the shell
    Quit,
}

impl ShellCommand {
    /// Parse a text line, or a JSON object when the line starts with `{`
    pub fn parse_line(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        if line.starts_with('{') {
            return serde_json::from_str(line).map_err(|e| CommandError::Json(e.to_string()));
        }
        line.parse()
    }

    /// Replace a menu selection with the command of the chosen entry
    pub fn resolve(self) -> Result<Self, CommandError> {
        match self {
            ShellCommand::Select {
                menu,
                section,
                item,
            } => menus::select_in(menu, section, item),
            other => Ok(other),
        }
    }
}

fn menu_kind(name: &str) -> Option<MenuKind> {
    match name.to_ascii_lowercase().as_str() {
        "start" => Some(MenuKind::Start),
        "bar" | "menubar" => Some(MenuKind::MenuBar),
        "toolbar" => Some(MenuKind::Toolbar),
        _ => None,
    }
}

/// Positional arguments of one text command
struct Args<'a> {
    command: String,
    values: Vec<&'a str>,
}

impl<'a> Args<'a> {
    fn get(&self, index: usize, expected: &'static str) -> Result<&'a str, CommandError> {
        self.values
            .get(index)
            .copied()
            .ok_or_else(|| CommandError::MissingArgument {
                command: self.command.clone(),
                expected,
            })
    }

    fn window(&self, index: usize) -> Result<WindowId, CommandError> {
        let raw = self.get(index, "window id")?;
        raw.trim_start_matches('#')
            .parse::<u64>()
            .map(WindowId::new)
            .map_err(|_| CommandError::InvalidWindowId(raw.to_string()))
    }

    fn number<T: FromStr>(&self, index: usize, expected: &'static str) -> Result<T, CommandError> {
        parse_number(self.get(index, expected)?, expected)
    }
}

fn parse_number<T: FromStr>(raw: &str, expected: &'static str) -> Result<T, CommandError> {
    raw.parse().map_err(|_| CommandError::InvalidArgument {
        expected,
        value: raw.to_string(),
    })
}

impl FromStr for ShellCommand {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let Some(verb) = parts.next() else {
            return Err(CommandError::Empty);
        };
        let args = Args {
            command: verb.to_ascii_lowercase(),
            values: parts.collect(),
        };

        let command = match args.command.as_str() {
            "launch" | "run" => ShellCommand::Launch {
                tool: args.get(0, "tool id")?.to_string(),
            },
            "activate" | "focus" => ShellCommand::Activate { id: args.window(0)? },
            "click" => ShellCommand::TaskbarClick { id: args.window(0)? },
            "taskbar" | "context" => {
                let id = args.window(0)?;
                let raw = args.get(1, "restore, minimize or close")?;
                let action = TaskbarAction::from_name(raw).ok_or_else(|| {
                    CommandError::InvalidArgument {
                        expected: "taskbar action",
                        value: raw.to_string(),
                    }
                })?;
                ShellCommand::TaskbarMenu { id, action }
            }
            "minimize" | "iconify" => ShellCommand::Minimize { id: args.window(0)? },
            "restore" => ShellCommand::Restore { id: args.window(0)? },
            "maximize" => ShellCommand::Maximize { id: args.window(0)? },
            "close" => ShellCommand::Close { id: args.window(0)? },
            "move" => ShellCommand::Move {
                id: args.window(0)?,
                bounds: Geometry::new(
                    args.number(1, "x")?,
                    args.number(2, "y")?,
                    args.number(3, "width")?,
                    args.number(4, "height")?,
                ),
            },
            "cascade" => ShellCommand::Cascade,
            "tile" => ShellCommand::Tile,
            "close-all" | "closeall" => ShellCommand::CloseAll,
            "list" | "ls" => ShellCommand::List,
            "snapshot" => ShellCommand::Snapshot,
            "tools" => ShellCommand::Tools,
            "menu" | "start" => ShellCommand::Menu {
                menu: MenuKind::Start,
            },
            "menubar" => ShellCommand::Menu {
                menu: MenuKind::MenuBar,
            },
            "toolbar" => ShellCommand::Menu {
                menu: MenuKind::Toolbar,
            },
            "select" => {
                // Optional menu name before the position
                let first = args.get(0, "section.item")?;
                let (menu, position) = match menu_kind(first) {
                    Some(menu) => (menu, args.get(1, "section.item")?),
                    None => (MenuKind::Start, first),
                };
                let (section, item) =
                    position
                        .split_once('.')
                        .ok_or_else(|| CommandError::InvalidArgument {
                            expected: "section.item",
                            value: position.to_string(),
                        })?;
                ShellCommand::Select {
                    menu,
                    section: parse_number(section, "section")?,
                    item: parse_number(item, "item")?,
                }
            }
            "about" | "help" => ShellCommand::About,
            "status" => ShellCommand::Status,
            "quit" | "exit" => ShellCommand::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        Ok(command)
    }
}
