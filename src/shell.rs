//! Interactive line-oriented panel session
//!
//! Each input line becomes one or more session events; notices and the
//! refreshed view are printed after every command.

use std::io::{BufRead, Write};

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::importer::ImportSource;
use crate::pagination::Direction;
use crate::protocol::RecordDraft;
use crate::render;
use crate::session::{Event, Notice, PanelSession};

const HELP: &str = "\
Commands:
  list                       Reload the current page
  next | prev                Move between pages
  toggle <id>                Flip the enabled flag of a parameter
  edit <id> <field> <text>   Change condition, response or action
  import <path>              Import parameters from a JSON/YAML file
  paste                      Import pasted text (end with a line containing '.')
  purge                      Delete all parameters (asks for confirmation)
  confirm | cancel           Answer a pending purge
  formats                    Show channel format directives
  format <channel> <text>    Stage a new directive for a channel
  set <key> <json>           Stage a persona configuration field
  show                       Show the staged persona configuration
  save                       Commit the persona configuration
  help                       Show this help
  quit                       Leave the shell
";

/// One parsed shell command
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    List,
    Navigate(Direction),
    Toggle(String),
    Edit { id: String, draft: RecordDraft },
    ImportFile(String),
    Paste,
    Purge,
    Confirm,
    Cancel,
    Formats,
    Format { channel: String, text: String },
    Set { key: String, value: Value },
    Show,
    Save,
    Help,
    Quit,
}

/// Parse one input line; `Ok(None)` for blank lines
pub fn parse_line(line: &str) -> Result<Option<ShellCommand>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (word, rest) = split_word(line);
    let command = match word {
        "list" | "refresh" => ShellCommand::List,
        "next" => ShellCommand::Navigate(Direction::Next),
        "prev" | "previous" => ShellCommand::Navigate(Direction::Previous),
        "toggle" => ShellCommand::Toggle(require(rest, "toggle <id>")?.to_string()),
        "edit" => {
            let (id, rest) = split_word(require(rest, "edit <id> <field> <text>")?);
            let (field, text) = split_word(rest);
            let text = Some(text.to_string());
            let draft = match field {
                "condition" => RecordDraft { condition: text, ..Default::default() },
                "response" => RecordDraft { response: text, ..Default::default() },
                "action" => RecordDraft { action: text, ..Default::default() },
                other => {
                    return Err(Error::InvalidArgument(format!(
                        "Unknown field '{}' (expected condition, response or action)",
                        other
                    )))
                }
            };
            ShellCommand::Edit { id: id.to_string(), draft }
        }
        "import" => ShellCommand::ImportFile(require(rest, "import <path>")?.to_string()),
        "paste" => ShellCommand::Paste,
        "purge" => ShellCommand::Purge,
        "confirm" => ShellCommand::Confirm,
        "cancel" => ShellCommand::Cancel,
        "formats" => ShellCommand::Formats,
        "format" => {
            let (channel, text) = split_word(require(rest, "format <channel> <text>")?);
            ShellCommand::Format {
                channel: channel.to_string(),
                text: text.to_string(),
            }
        }
        "set" => {
            let (key, raw) = split_word(require(rest, "set <key> <json>")?);
            let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
            ShellCommand::Set {
                key: key.to_string(),
                value,
            }
        }
        "show" => ShellCommand::Show,
        "save" => ShellCommand::Save,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => {
            return Err(Error::InvalidArgument(format!(
                "Unknown command '{}'. Type 'help' for a list of commands.",
                other
            )))
        }
    };
    Ok(Some(command))
}

fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(idx) => (&s[..idx], s[idx..].trim()),
        None => (s, ""),
    }
}

fn require<'a>(rest: &'a str, usage: &str) -> Result<&'a str> {
    if rest.is_empty() {
        Err(Error::InvalidArgument(format!("Usage: {}", usage)))
    } else {
        Ok(rest)
    }
}

/// Run the shell until `quit` or end of input
pub async fn run<R: BufRead, W: Write>(
    session: &mut PanelSession,
    mut input: R,
    output: &mut W,
    color: bool,
) -> Result<()> {
    writeln!(output, "Persona Interact shell for agent {}. Type 'help' for commands.", session.state().agent_id)?;

    session.dispatch(Event::Refresh).await;
    print_page(session, output)?;
    print_notices(session, output, color)?;

    loop {
        write!(output, "> ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            break;
        }

        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                report_error(output, e, color)?;
                continue;
            }
        };

        match command {
            ShellCommand::Quit => break,
            ShellCommand::Help => write!(output, "{}", HELP)?,
            ShellCommand::List => {
                session.dispatch(Event::Refresh).await;
                print_page(session, output)?;
            }
            ShellCommand::Navigate(direction) => {
                session.dispatch(Event::Paginate(direction)).await;
                print_page(session, output)?;
            }
            ShellCommand::Toggle(id) => session.dispatch(Event::ToggleEnabled(id)).await,
            ShellCommand::Edit { id, draft } => session.dispatch(Event::SaveRecord { id, draft }).await,
            ShellCommand::ImportFile(path) => {
                let path = shellexpand::tilde(&path).to_string();
                match ImportSource::from_path(&path) {
                    Ok(source) => session.dispatch(Event::Import(source)).await,
                    Err(e) => report_error(output, e, color)?,
                }
            }
            ShellCommand::Paste => {
                writeln!(output, "Paste JSON or YAML, then a line containing only '.'")?;
                let text = read_block(&mut input)?;
                session.dispatch(Event::Import(ImportSource::Text(text))).await;
            }
            ShellCommand::Purge => session.dispatch(Event::RequestPurge).await,
            ShellCommand::Confirm => session.dispatch(Event::ConfirmPurge).await,
            ShellCommand::Cancel => session.dispatch(Event::CancelPurge).await,
            ShellCommand::Formats => {
                session.dispatch(Event::LoadConfiguration).await;
                write!(output, "{}", render::render_channels(&session.state().editor))?;
            }
            ShellCommand::Format { channel, text } => {
                session.dispatch(Event::LoadConfiguration).await;
                session.dispatch(Event::EditDirective { channel, text }).await;
            }
            ShellCommand::Set { key, value } => {
                session.dispatch(Event::LoadConfiguration).await;
                session.dispatch(Event::SetConfigField { key, value }).await;
            }
            ShellCommand::Show => {
                session.dispatch(Event::LoadConfiguration).await;
                if let Some(config) = session.state().editor.config() {
                    writeln!(output, "{}", render::render_config(config))?;
                }
            }
            ShellCommand::Save => session.dispatch(Event::CommitConfiguration).await,
        }

        print_notices(session, output, color)?;
    }

    Ok(())
}

/// Show a rejected command as a notice; fatal errors end the shell
fn report_error<W: Write>(output: &mut W, error: Error, color: bool) -> Result<()> {
    if error.is_fatal() {
        return Err(error);
    }
    debug!(error = %error.format_for_log(), "Shell command rejected");
    writeln!(output, "{}", render::render_notice(&Notice::from_error(&error), color))?;
    Ok(())
}

fn read_block<R: BufRead>(input: &mut R) -> Result<String> {
    let mut text = String::new();
    loop {
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 || line.trim_end() == "." {
            break;
        }
        text.push_str(&line);
    }
    Ok(text)
}

fn print_page<W: Write>(session: &PanelSession, output: &mut W) -> Result<()> {
    if let Some(page) = &session.state().page {
        write!(output, "{}", render::render_page(page))?;
    }
    Ok(())
}

fn print_notices<W: Write>(session: &mut PanelSession, output: &mut W, color: bool) -> Result<()> {
    for notice in session.take_notices() {
        writeln!(output, "{}", render::render_notice(&notice, color))?;
    }
    Ok(())
}
