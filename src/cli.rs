//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for the Persona Interact panel.

use clap::{Args, Parser, Subcommand};

/// Persona Interact - manage an agent persona from the terminal
///
/// Lists, toggles, edits, imports and purges persona parameters, and edits
/// channel format directives of the persona configuration.
#[derive(Parser, Debug)]
#[command(name = "persona-interact")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, env = "PERSONA_INTERACT_CONFIG", global = true)]
    pub config: Option<String>,

    /// Agent whose persona is managed (overrides session.agent_id)
    #[arg(long, global = true)]
    pub agent_id: Option<String>,

    /// Persona action of the agent (overrides session.action_id)
    #[arg(long, global = true)]
    pub action_id: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage persona parameters
    Params {
        #[command(subcommand)]
        subcommand: ParamsSubcommand,
    },

    /// Channel format directives
    Formats {
        #[command(subcommand)]
        subcommand: FormatsSubcommand,
    },

    /// Persona configuration object
    Persona {
        #[command(subcommand)]
        subcommand: PersonaSubcommand,
    },

    /// Start an interactive panel session
    Shell {
        /// Page to open first (1-based)
        #[arg(short, long, default_value = "1")]
        page: u32,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Display version and build information
    Version,
}

/// Parameter subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ParamsSubcommand {
    /// List one page of parameters
    List {
        /// Page to show (1-based)
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Parameters per page (defaults to session.per_page)
        #[arg(long)]
        per_page: Option<u32>,
    },

    /// Enable a parameter
    Enable {
        /// Parameter ID
        id: String,
    },

    /// Disable a parameter
    Disable {
        /// Parameter ID
        id: String,
    },

    /// Change the text fields of a parameter
    Edit {
        /// Parameter ID
        id: String,

        #[arg(long)]
        condition: Option<String>,

        #[arg(long)]
        response: Option<String>,

        #[arg(long)]
        action: Option<String>,
    },

    /// Import parameters from JSON or YAML
    Import(InputArgs),

    /// Delete ALL parameters of the agent (asks for confirmation)
    Purge,
}

/// Channel format subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum FormatsSubcommand {
    /// Show every channel and its directive
    List,

    /// Replace the directive of one channel and save
    Edit {
        /// Channel name, e.g. whatsapp
        channel: String,

        #[command(flatten)]
        input: InputArgs,
    },
}

/// Persona configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum PersonaSubcommand {
    /// Print the persona configuration object
    Show,

    /// Set one top-level field and save
    Set {
        /// Field name
        key: String,

        /// Value as JSON (plain text is stored as a string)
        value: String,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the current configuration
    Show,

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate,
}

/// Text either inline or from a file
#[derive(Args, Debug, Clone, PartialEq, Eq)]
#[group(required = true, multiple = false)]
pub struct InputArgs {
    /// Read input from a file
    #[arg(short, long)]
    pub file: Option<String>,

    /// Inline input text
    #[arg(short, long)]
    pub text: Option<String>,
}
