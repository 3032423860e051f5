//! Persona Interact - agent persona panel
//!
//! Entry point for the `persona-interact` binary. One-shot commands talk to
//! the backend directly; `shell` runs an interactive panel session.

mod channel_formats;
mod cli;
mod config;
mod directory;
mod error;
mod importer;
mod logging;
mod pagination;
mod protocol;
mod purge;
mod render;
mod session;
mod shell;
mod transport;
mod version;

use std::io::{BufRead, IsTerminal, Write};
use std::sync::Arc;

use clap::Parser;
use serde_json::Value;
use tracing::{debug, info};

use crate::channel_formats::ChannelFormatEditor;
use crate::cli::{
    Cli, Commands, ConfigSubcommand, FormatsSubcommand, InputArgs, ParamsSubcommand,
    PersonaSubcommand,
};
use crate::config::PanelConfig;
use crate::directory::ParameterDirectory;
use crate::error::{Error, Result};
use crate::importer::ImportSource;
use crate::pagination::Pagination;
use crate::protocol::RecordPatch;
use crate::purge::{PurgeState, PURGE_WARNING};
use crate::session::{PanelSession, SessionState};
use crate::transport::HttpTransport;

/// Word the operator must type to confirm a purge
const PURGE_CONFIRMATION: &str = "delete";

fn main() {
    // Parse CLI arguments first (before logging, so we know verbosity)
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Version => {
            version::print_version();
            return Ok(());
        }
        Commands::Config { subcommand } => {
            // Config commands use minimal logging
            logging::init_simple(tracing::Level::WARN)?;
            return handle_config_command(subcommand.clone(), cli.config.as_deref());
        }
        _ => {}
    }

    let mut config = PanelConfig::load(cli.config.as_deref())?;
    if let Some(agent_id) = cli.agent_id.clone() {
        config.session.agent_id = Some(agent_id);
    }
    if let Some(action_id) = cli.action_id.clone() {
        config.session.action_id = Some(action_id);
    }

    // The guards must be kept alive for the lifetime of the program
    let _log_guards = logging::init_logging(&config.logging, cli.verbose, cli.quiet)?;

    let build = version::build_info();
    debug!(
        version = %build.full_version(),
        backend = %config.backend.url,
        "Starting persona-interact"
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create async runtime: {}", e)))?;

    runtime.block_on(run_panel(cli.command, config))
}

/// Execute a panel command against the backend
async fn run_panel(command: Commands, config: PanelConfig) -> Result<()> {
    let agent_id = config.require_agent_id()?;
    let transport = HttpTransport::from_settings(&config.backend)?;
    let directory = ParameterDirectory::new(Arc::new(transport));

    info!(agent_id = %agent_id, backend = %config.backend.url, "Panel ready");

    match command {
        Commands::Params { subcommand } => {
            handle_params_command(&directory, &agent_id, &config, subcommand).await
        }
        Commands::Formats { subcommand } => {
            let action_id = config.require_action_id()?;
            handle_formats_command(&directory, &agent_id, &action_id, subcommand).await
        }
        Commands::Persona { subcommand } => {
            let action_id = config.require_action_id()?;
            handle_persona_command(&directory, &agent_id, &action_id, subcommand).await
        }
        Commands::Shell { page } => {
            let state = SessionState::new(
                agent_id,
                config.session.action_id.clone().filter(|id| !id.trim().is_empty()),
                Pagination::starting_at(page, config.session.per_page),
            );
            let mut session = PanelSession::new(directory, state);
            let color = std::io::stdout().is_terminal();
            let stdin = std::io::stdin();
            let mut stdout = std::io::stdout();
            shell::run(&mut session, stdin.lock(), &mut stdout, color).await
        }
        Commands::Version | Commands::Config { .. } => Err(Error::Internal(
            "version and config are handled before the runtime starts".into(),
        )),
    }
}

async fn handle_params_command(
    directory: &ParameterDirectory,
    agent_id: &str,
    config: &PanelConfig,
    subcommand: ParamsSubcommand,
) -> Result<()> {
    match subcommand {
        ParamsSubcommand::List { page, per_page } => {
            let per_page = per_page.unwrap_or(config.session.per_page);
            let page = directory.list(agent_id, page, per_page).await?;
            print!("{}", render::render_page(&page));
        }
        ParamsSubcommand::Enable { id } => {
            directory.update(agent_id, &id, &RecordPatch::enabled(true)).await?;
            println!("Parameter {} enabled.", id);
        }
        ParamsSubcommand::Disable { id } => {
            directory.update(agent_id, &id, &RecordPatch::enabled(false)).await?;
            println!("Parameter {} disabled.", id);
        }
        ParamsSubcommand::Edit {
            id,
            condition,
            response,
            action,
        } => {
            let patch = RecordPatch {
                condition,
                response,
                action,
                enabled: None,
            };
            if patch.is_empty() {
                return Err(Error::InvalidArgument(
                    "Nothing to change: pass --condition, --response or --action".into(),
                ));
            }
            directory.update(agent_id, &id, &patch).await?;
            println!("Changes saved successfully.");
        }
        ParamsSubcommand::Import(input) => {
            let source = match (input.file, input.text) {
                (Some(path), _) => ImportSource::from_path(shellexpand::tilde(&path).into_owned())?,
                (None, Some(text)) => ImportSource::Text(text),
                (None, None) => ImportSource::Text(String::new()),
            };
            let records = importer::normalize(&source)?;
            directory.import_many(agent_id, &records).await?;
            println!(
                "Agent parameters imported successfully ({} records).",
                records.len()
            );
        }
        ParamsSubcommand::Purge => {
            let mut purge = PurgeState::default();
            purge.request();

            println!("{}", PURGE_WARNING);
            print!("Type '{}' to confirm: ", PURGE_CONFIRMATION);
            std::io::stdout().flush()?;

            let mut answer = String::new();
            std::io::stdin().lock().read_line(&mut answer)?;

            if answer.trim() != PURGE_CONFIRMATION {
                purge.cancel();
                println!("Purge cancelled.");
                return Ok(());
            }

            if purge.confirm() {
                directory.purge_all(agent_id).await?;
                println!("Collection purged successfully.");
            }
        }
    }

    Ok(())
}

async fn handle_formats_command(
    directory: &ParameterDirectory,
    agent_id: &str,
    action_id: &str,
    subcommand: FormatsSubcommand,
) -> Result<()> {
    let editor = load_editor(directory, agent_id, action_id).await?;

    match subcommand {
        FormatsSubcommand::List => {
            print!("{}", render::render_channels(&editor));
        }
        FormatsSubcommand::Edit { channel, input } => {
            let mut editor = editor;
            editor.edit_directive(&channel, read_input(&input)?)?;
            directory
                .update_action(agent_id, action_id, &editor.snapshot()?)
                .await?;
            println!("Changes saved");
        }
    }

    Ok(())
}

async fn handle_persona_command(
    directory: &ParameterDirectory,
    agent_id: &str,
    action_id: &str,
    subcommand: PersonaSubcommand,
) -> Result<()> {
    let mut editor = load_editor(directory, agent_id, action_id).await?;

    match subcommand {
        PersonaSubcommand::Show => {
            if let Some(config) = editor.config() {
                println!("{}", render::render_config(config));
            }
        }
        PersonaSubcommand::Set { key, value } => {
            let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
            editor.set_field(&key, value)?;
            directory
                .update_action(agent_id, action_id, &editor.snapshot()?)
                .await?;
            println!("Changes saved");
        }
    }

    Ok(())
}

async fn load_editor(
    directory: &ParameterDirectory,
    agent_id: &str,
    action_id: &str,
) -> Result<ChannelFormatEditor> {
    let mut editor = ChannelFormatEditor::new();
    editor.seed(directory.get_action(agent_id, action_id).await?);
    Ok(editor)
}

/// Inline text, or the contents of the given file
fn read_input(input: &InputArgs) -> Result<String> {
    match (&input.file, &input.text) {
        (Some(path), _) => {
            let path = std::path::PathBuf::from(shellexpand::tilde(path).into_owned());
            std::fs::read_to_string(&path).map_err(|e| Error::IoRead { path, source: e })
        }
        (None, Some(text)) => Ok(text.clone()),
        (None, None) => Err(Error::InvalidArgument("Pass --file or --text".into())),
    }
}

/// Handle configuration subcommands
fn handle_config_command(subcommand: ConfigSubcommand, config_path: Option<&str>) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show => {
            let cfg = PanelConfig::load(config_path)?;
            println!("{}", toml::to_string_pretty(&cfg)?);
        }
        ConfigSubcommand::Init { path, force } => {
            let path = config::init_config(path.as_deref(), force)?;
            println!("Created configuration file: {}", path.display());
        }
        ConfigSubcommand::Validate => {
            PanelConfig::load(config_path)?;
            println!("Configuration is valid.");
        }
    }

    Ok(())
}
