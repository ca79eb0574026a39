//! Built-in tools
//!
//! The shell only sees tools through their factories. Each built-in tool
//! produces a stand-in surface and its menu bar; tools that fetch data first
//! show a loading placeholder and deliver their content from a worker thread.

use std::thread;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::debug;

use crate::error::ToolError;
use crate::shell::launcher::{LaunchRegistry, ToolOutput};
use crate::wm::menu::{Menu, MenuEntry};
use crate::wm::surface::Surface;

/// Start-menu / menu-bar grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolCategory {
    Edit,
    System,
    Network,
    Entertainment,
    Office,
}

impl ToolCategory {
    pub const ALL: [ToolCategory; 5] = [
        ToolCategory::Edit,
        ToolCategory::System,
        ToolCategory::Network,
        ToolCategory::Entertainment,
        ToolCategory::Office,
    ];

    /// Menu-bar title
    pub fn menu_title(&self) -> &'static str {
        match self {
            ToolCategory::Edit => "编辑工具(E)",
            ToolCategory::System => "系统工具(S)",
            ToolCategory::Network => "网络工具(N)",
            ToolCategory::Entertainment => "娱乐工具(L)",
            ToolCategory::Office => "办公工具(O)",
        }
    }

    /// Start-menu title
    pub fn start_title(&self) -> &'static str {
        match self {
            ToolCategory::Edit => "📝 编辑工具",
            ToolCategory::System => "⚙️ 系统工具",
            ToolCategory::Network => "🌐 网络工具",
            ToolCategory::Entertainment => "🎵 娱乐工具",
            ToolCategory::Office => "📊 办公工具",
        }
    }

    pub fn mnemonic(&self) -> char {
        match self {
            ToolCategory::Edit => 'E',
            ToolCategory::System => 'S',
            ToolCategory::Network => 'N',
            ToolCategory::Entertainment => 'L',
            ToolCategory::Office => 'O',
        }
    }
}

/// Static description of a built-in tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSpec {
    /// Identifier used by `launch`
    pub id: &'static str,
    /// Menu label
    pub label: &'static str,
    /// Window title prefix
    pub display_name: &'static str,
    pub icon: &'static str,
    pub mnemonic: char,
    pub category: ToolCategory,
    /// Top-level menus of the tool window
    pub menu: &'static [&'static str],
    /// Content arrives from a background worker
    pub loads_in_background: bool,
}

const fn tool(
    id: &'static str,
    label: &'static str,
    icon: &'static str,
    mnemonic: char,
    category: ToolCategory,
    menu: &'static [&'static str],
) -> ToolSpec {
    ToolSpec {
        id,
        label,
        display_name: label,
        icon,
        mnemonic,
        category,
        menu,
        loads_in_background: false,
    }
}

const fn background(spec: ToolSpec) -> ToolSpec {
    ToolSpec {
        loads_in_background: true,
        ..spec
    }
}

const fn titled(spec: ToolSpec, display_name: &'static str) -> ToolSpec {
    ToolSpec {
        display_name,
        ..spec
    }
}

use ToolCategory::*;

/// Every tool the shell ships with, in menu order
pub const CATALOG: &[ToolSpec] = &[
    tool("text-editor", "文本编辑器", "📝", 'T', Edit, &["文件(F)"]),
    tool("translator", "翻译包编辑器", "🌐", 'R', Edit, &[]),
    tool("cmd", "CMD 终端", "⚡", 'C', System, &["文件"]),
    tool("java-launcher", "Java 启动器", "☕", 'J', System, &["运行(R)"]),
    tool("task-manager", "任务管理器", "🛠️", 'T', System, &["文件(F)", "选项(O)", "查看(V)", "帮助(H)"]),
    tool("calculator", "计算器", "🔢", 'A', System, &[]),
    tool("explorer", "文件资源管理器", "📁", 'E', System, &["文件(F)", "编辑(E)", "查看(V)"]),
    tool("clock", "日期和时间", "🕒", 'L', System, &[]),
    tool("control-panel", "控制面板", "⚙️", 'P', System, &[]),
    background(tool("mc-version-viewer", "Minecraft 版本查看器", "🎮", 'M', Network, &[])),
    background(tool("api-fetcher", "API 数据获取器", "🔗", 'A', Network, &[])),
    background(tool("web-browser", "网络浏览器", "🌐", 'B', Network, &["文件", "编辑", "视图", "帮助"])),
    background(tool("downloader", "避雷针下载器", "⬇️", 'D', Network, &[])),
    tool("music-player", "音乐播放器", "🎵", 'M', Entertainment, &[]),
    tool("image-viewer", "照片查看器", "🖼️", 'P', Entertainment, &["文件", "查看"]),
    tool("minesweeper", "扫雷", "💣", 'S', Entertainment, &["游戏", "难度", "帮助"]),
    tool("video-player", "视频播放器", "🎥", 'V', Entertainment, &[]),
    titled(
        tool("spreadsheet", "表格编辑器", "📊", 'G', Office, &["文件(F)", "编辑(E)", "帮助(H)"]),
        "Javaows Office Excel",
    ),
    titled(
        tool("word", "文档编辑器", "📄", 'D', Office, &["文件(F)", "编辑(E)", "格式(M)", "视图(V)", "帮助(H)"]),
        "Javaows Office Word",
    ),
];

/// Simulated time a background tool spends preparing its content
pub const BACKGROUND_LOAD_DELAY: Duration = Duration::from_millis(150);

pub fn find(id: &str) -> Option<&'static ToolSpec> {
    CATALOG.iter().find(|spec| spec.id == id)
}

pub fn in_category(category: ToolCategory) -> impl Iterator<Item = &'static ToolSpec> {
    CATALOG.iter().filter(move |spec| spec.category == category)
}

/// Register every catalog tool with the launcher
pub fn register_builtin_tools(registry: &mut LaunchRegistry) {
    for spec in CATALOG {
        registry.register(spec.id, move || build(spec));
    }
    debug!("Registered {} built-in tools", CATALOG.len());
}

/// Stand-in content of a built-in tool window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSurface {
    pub tool: &'static str,
    pub ready: bool,
}

impl Surface for ToolSurface {
    fn describe(&self) -> String {
        if self.ready {
            self.tool.to_string()
        } else {
            format!("{} (loading)", self.tool)
        }
    }
}

fn build(spec: &'static ToolSpec) -> Result<ToolOutput, ToolError> {
    let surface = ToolSurface {
        tool: spec.label,
        ready: !spec.loads_in_background,
    };
    let mut output = ToolOutput::new(spec.display_name, spec.icon, surface);

    if !spec.menu.is_empty() {
        output = output.with_menu(menu_for(spec));
    }

    if spec.loads_in_background {
        let (tx, rx) = oneshot::channel::<Box<dyn Surface>>();
        thread::Builder::new()
            .name(format!("{}-loader", spec.id))
            .spawn(move || {
                thread::sleep(BACKGROUND_LOAD_DELAY);
                // The receiver is gone if the launch was abandoned
                let _ = tx.send(Box::new(ToolSurface {
                    tool: spec.label,
                    ready: true,
                }));
            })
            .map_err(|e| ToolError::new(format!("failed to start loader: {e}")))?;
        output = output.with_deferred(rx);
    }

    Ok(output)
}

fn menu_for(spec: &ToolSpec) -> Menu {
    Menu::new(
        spec.menu
            .iter()
            .map(|title| {
                let entry = MenuEntry::new(*title);
                match mnemonic_of(title) {
                    Some(key) => entry.with_mnemonic(key),
                    None => entry,
                }
            })
            .collect(),
    )
}

/// Mnemonic written as a trailing "(X)" in a menu title
pub fn mnemonic_of(title: &str) -> Option<char> {
    let inner = title.strip_suffix(')')?.rsplit_once('(')?.1;
    let mut chars = inner.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Some(c),
        _ => None,
    }
}
