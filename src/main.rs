//! editor-id-reset: CLI to reset editor identifiers and purge editor state
//!
//! This tool is not affiliated with or endorsed by any editor vendor.
//! It modifies locally stored data on your machine for personal use.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use editor_id_reset::config::{EditorProfile, PathContext};
use editor_id_reset::editor::database::DEFAULT_KEYWORD;
use editor_id_reset::session::Session;

mod commands;

/// Environment variable holding a tracing filter directive
const LOG_ENV: &str = "EDITOR_ID_RESET_LOG";

#[derive(Parser)]
#[command(name = "editor-id-reset")]
#[command(about = "Reset editor telemetry identifiers and purge editor state", long_about = None)]
#[command(version)]
struct Cli {
    /// Editor to operate on
    #[arg(long, short, value_enum, ignore_case = true, global = true, default_value = "code")]
    editor: EditorProfile,

    /// Print the report as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log each step to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Delete state database entries whose key contains a keyword
    Clean {
        /// Keyword matched case-insensitively anywhere in the key
        #[arg(long, short, env = "EDITOR_ID_RESET_KEYWORD", default_value = DEFAULT_KEYWORD)]
        keyword: String,
    },

    /// Delete everything in the workspace storage directory
    CleanWorkspace {
        /// Archive the directory to a tar.gz beside it first
        #[arg(long)]
        archive: bool,
    },

    /// Delete every installed Cursor extension
    CleanExtensions,

    /// Replace telemetry and device identifiers
    ModifyIds {
        /// Leave rewritten id files writable
        #[arg(long)]
        no_lock: bool,
    },

    /// Clean the database, replace identifiers, then clean workspace storage
    All {
        /// Keyword matched case-insensitively anywhere in the key
        #[arg(long, short, env = "EDITOR_ID_RESET_KEYWORD", default_value = DEFAULT_KEYWORD)]
        keyword: String,

        /// Leave rewritten id files writable
        #[arg(long)]
        no_lock: bool,

        /// Archive workspace storage before deleting it
        #[arg(long)]
        archive: bool,

        /// Also delete Cursor extensions
        #[arg(long)]
        with_extensions: bool,
    },

    /// Show resolved state locations for the selected editor
    Paths,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut session = Session::new(cli.editor, PathContext::from_env()?);

    let (title, report) = match cli.command {
        Commands::Clean { keyword } => {
            session.keyword = keyword;
            ("clean", commands::clean::execute(&session))
        }

        Commands::CleanWorkspace { archive } => {
            session.archive_workspace = archive;
            ("clean workspace", commands::clean_workspace::execute(&session))
        }

        Commands::CleanExtensions => (
            "clean extensions",
            commands::clean_extensions::execute(&session),
        ),

        Commands::ModifyIds { no_lock } => {
            session.lock_files = !no_lock;
            ("modify ids", commands::modify_ids::execute(&session))
        }

        Commands::All {
            keyword,
            no_lock,
            archive,
            with_extensions,
        } => {
            session.keyword = keyword;
            session.lock_files = !no_lock;
            session.archive_workspace = archive;
            session.with_extensions = with_extensions;
            ("all", commands::all::execute(&session))
        }

        Commands::Paths => {
            let paths = commands::paths::collect(&session)?;
            if cli.json {
                commands::utils::print_json(&paths)?;
            } else {
                println!("{}", commands::paths::format_table(&paths));
            }
            return Ok(ExitCode::SUCCESS);
        }
    };

    if cli.json {
        commands::utils::print_json(&report)?;
    } else {
        commands::utils::print_report(title, &report);
    }

    Ok(if report.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_all_with_flags() {
        let cli = Cli::try_parse_from([
            "editor-id-reset",
            "--editor",
            "cursor",
            "all",
            "--keyword",
            "copilot",
            "--no-lock",
            "--with-extensions",
        ])
        .unwrap();

        assert_eq!(cli.editor, EditorProfile::Cursor);
        match cli.command {
            Commands::All {
                keyword,
                no_lock,
                archive,
                with_extensions,
            } => {
                assert_eq!(keyword, "copilot");
                assert!(no_lock);
                assert!(!archive);
                assert!(with_extensions);
            }
            _ => panic!("expected all"),
        }
    }

    #[test]
    fn test_editor_defaults_to_code_and_accepts_alias() {
        let cli = Cli::try_parse_from(["editor-id-reset", "paths"]).unwrap();
        assert_eq!(cli.editor, EditorProfile::Code);

        let cli = Cli::try_parse_from(["editor-id-reset", "modify-ids", "--editor", "vscode"]).unwrap();
        assert_eq!(cli.editor, EditorProfile::Code);

        let cli = Cli::try_parse_from(["editor-id-reset", "--editor", "JetBrains", "paths"]).unwrap();
        assert_eq!(cli.editor, EditorProfile::JetBrains);
    }

    #[test]
    fn test_unknown_editor_rejected() {
        assert!(Cli::try_parse_from(["editor-id-reset", "--editor", "emacs", "clean"]).is_err());
    }
}
