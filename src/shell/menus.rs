//! Shell menus
//!
//! Start menu, menu bar and toolbar. Every entry resolves to a
//! `ShellCommand`; nothing here touches the desktop.

use serde::{Deserialize, Serialize};

use crate::error::CommandError;
use crate::shell::command::ShellCommand;
use crate::tools::{self, ToolCategory};

/// Which of the shell's menus a command refers to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuKind {
    #[default]
    Start,
    MenuBar,
    Toolbar,
}

impl MenuKind {
    pub fn name(&self) -> &'static str {
        match self {
            MenuKind::Start => "start menu",
            MenuKind::MenuBar => "menu bar",
            MenuKind::Toolbar => "toolbar",
        }
    }

    /// Build the sections of this menu
    pub fn sections(&self) -> Vec<MenuSection> {
        match self {
            MenuKind::Start => start_menu(),
            MenuKind::MenuBar => menu_bar(),
            MenuKind::Toolbar => toolbar(),
        }
    }
}

/// One clickable entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    pub mnemonic: Option<char>,
    pub command: ShellCommand,
}

impl MenuItem {
    fn new(label: impl Into<String>, mnemonic: char, command: ShellCommand) -> Self {
        Self {
            label: label.into(),
            mnemonic: Some(mnemonic),
            command,
        }
    }

    fn launch(spec: &tools::ToolSpec) -> Self {
        Self::new(
            spec.label,
            spec.mnemonic,
            ShellCommand::Launch {
                tool: spec.id.to_string(),
            },
        )
    }
}

/// A titled group of entries (a submenu, or a toolbar group)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuSection {
    pub title: String,
    pub mnemonic: Option<char>,
    pub items: Vec<MenuItem>,
}

/// Window management entries shared by the start menu and the menu bar
fn window_items() -> Vec<MenuItem> {
    vec![
        MenuItem::new("层叠窗口", 'C', ShellCommand::Cascade),
        MenuItem::new("平铺窗口", 'T', ShellCommand::Tile),
        MenuItem::new("关闭所有窗口", 'A', ShellCommand::CloseAll),
    ]
}

fn tool_items(category: ToolCategory) -> Vec<MenuItem> {
    tools::in_category(category).map(MenuItem::launch).collect()
}

/// The start menu: one submenu per tool category, then window management,
/// about and exit
pub fn start_menu() -> Vec<MenuSection> {
    let mut sections: Vec<MenuSection> = ToolCategory::ALL
        .iter()
        .map(|category| MenuSection {
            title: category.start_title().to_string(),
            mnemonic: None,
            items: tool_items(*category),
        })
        .collect();

    sections.push(MenuSection {
        title: "🪟 窗口管理".to_string(),
        mnemonic: None,
        items: window_items(),
    });
    sections.push(MenuSection {
        title: "❓ 关于".to_string(),
        mnemonic: Some('A'),
        items: vec![MenuItem::new("关于", 'A', ShellCommand::About)],
    });
    sections.push(MenuSection {
        title: "❌ 退出".to_string(),
        mnemonic: Some('X'),
        items: vec![MenuItem::new("退出", 'X', ShellCommand::Quit)],
    });

    sections
}

/// The menu bar: File, one menu per category, Window, Help
pub fn menu_bar() -> Vec<MenuSection> {
    let mut sections = vec![MenuSection {
        title: "文件(F)".to_string(),
        mnemonic: Some('F'),
        items: vec![MenuItem::new("退出(X)", 'X', ShellCommand::Quit)],
    }];

    sections.extend(ToolCategory::ALL.iter().map(|category| MenuSection {
        title: category.menu_title().to_string(),
        mnemonic: Some(category.mnemonic()),
        items: tool_items(*category),
    }));

    sections.push(MenuSection {
        title: "窗口(W)".to_string(),
        mnemonic: Some('W'),
        items: window_items(),
    });
    sections.push(MenuSection {
        title: "帮助(H)".to_string(),
        mnemonic: Some('H'),
        items: vec![MenuItem::new("关于", 'A', ShellCommand::About)],
    });

    sections
}

/// Toolbar button groups, separated visually
pub fn toolbar() -> Vec<MenuSection> {
    const GROUPS: [(ToolCategory, &[&str]); 3] = [
        (ToolCategory::Edit, &["text-editor", "translator"]),
        (ToolCategory::System, &["cmd", "java-launcher"]),
        (ToolCategory::Network, &["mc-version-viewer", "api-fetcher"]),
    ];

    GROUPS
        .iter()
        .map(|(category, group)| MenuSection {
            title: category.start_title().to_string(),
            mnemonic: None,
            items: group
                .iter()
                .filter_map(|id| tools::find(id))
                .map(MenuItem::launch)
                .collect(),
        })
        .collect()
}

/// Resolve a `section.item` position in a menu
pub fn select(sections: &[MenuSection], section: usize, item: usize) -> Option<ShellCommand> {
    sections
        .get(section)?
        .items
        .get(item)
        .map(|entry| entry.command.clone())
}

/// Resolve a position in one of the shell's menus
pub fn select_in(menu: MenuKind, section: usize, item: usize) -> Result<ShellCommand, CommandError> {
    select(&menu.sections(), section, item).ok_or(CommandError::NoMenuEntry {
        menu: menu.name(),
        section,
        item,
    })
}

/// Text rendering of a menu, one section per block
pub fn render(sections: &[MenuSection]) -> String {
    let mut out = String::new();
    for (i, section) in sections.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i, section.title));
        for (j, item) in section.items.iter().enumerate() {
            let target = match &item.command {
                ShellCommand::Launch { tool } => format!("  -> {tool}"),
                _ => String::new(),
            };
            out.push_str(&format!("   {}.{} {}{}\n", i, j, item.label, target));
        }
    }
    out
}

/// Text of the About dialog
pub fn about() -> String {
    let tools = tools::CATALOG
        .iter()
        .map(|spec| format!("  • {} {}", spec.icon, spec.label))
        .collect::<Vec<_>>()
        .join("\n");
    let home = dirs::home_dir()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "-".to_string());

    format!(
        "Javaows {} - 桌面环境\n\n\
         ┌─ 运行环境 ───────────────\n\
         • 操作系统 : {} ({})\n\
         • 用户目录 : {}\n\n\
         ┌─ 已集成工具 ─────────────\n\
         {}\n",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH,
        home,
        tools
    )
}
