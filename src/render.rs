//! Plain-text rendering of panel state for the terminal host

use std::fmt::Write as _;

use serde_json::{Map, Value};

use crate::channel_formats::{snake_to_title, ChannelFormatEditor};
use crate::protocol::ParameterPage;
use crate::session::{Notice, NoticeLevel};

/// Parameter page with its records and navigation hints
pub fn render_page(page: &ParameterPage) -> String {
    let mut out = String::new();

    if page.items.is_empty() {
        out.push_str("No parameters found.\n");
    }

    for record in &page.items {
        let state = if record.enabled { "enabled" } else { "disabled" };
        let _ = writeln!(out, "ID: {} [{}]", record.id, state);
        let _ = writeln!(out, "  Condition: {}", record.condition);
        let _ = writeln!(out, "  Response:  {}", record.response);
        let _ = writeln!(out, "  Action:    {}", record.action);
        out.push('\n');
    }

    let mut nav = Vec::new();
    if page.has_previous {
        nav.push("← previous");
    }
    if page.has_next {
        nav.push("next →");
    }
    let _ = write!(out, "Page {}/{}", page.page, page.total_pages);
    if !nav.is_empty() {
        let _ = write!(out, "  ({})", nav.join(", "));
    }
    out.push('\n');

    out
}

/// Channel directives with Title Case labels
pub fn render_channels(editor: &ChannelFormatEditor) -> String {
    let channels = editor.channels();
    if channels.is_empty() {
        return "No channel formats available.\n".to_string();
    }

    let mut out = String::new();
    for (channel, directive) in channels {
        let _ = writeln!(out, "== {} ({}) ==", snake_to_title(&channel), channel);
        let _ = writeln!(out, "{}", directive);
        out.push('\n');
    }
    if editor.is_dirty() {
        out.push_str("(unsaved changes)\n");
    }
    out
}

/// Persona configuration object as pretty JSON
pub fn render_config(config: &Map<String, Value>) -> String {
    serde_json::to_string_pretty(config).unwrap_or_else(|_| format!("{:?}", config))
}

/// One notice line, optionally colored
pub fn render_notice(notice: &Notice, color: bool) -> String {
    let (label, ansi) = match notice.level {
        NoticeLevel::Success => ("OK", "32"),
        NoticeLevel::Info => ("Info", "36"),
        NoticeLevel::Warning => ("Warning", "33"),
        NoticeLevel::Error => ("Error", "31"),
    };
    let label = match notice.code {
        Some(code) if notice.is_error() => format!("{} [{}]", label, code),
        _ => label.to_string(),
    };

    if color {
        format!("\x1b[{}m{}\x1b[0m: {}", ansi, label, notice.message)
    } else {
        format!("{}: {}", label, notice.message)
    }
}
