//! Command dispatch: wires parsed arguments to the session services

use std::io::Read;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::{parse_script, AnalysisSession, ApplicationError, ImportPolicy, ScriptCommand};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::domain::{split_movetext, MoveToken};
use crate::infrastructure::{InfraError, InfraResult, ServiceContainer};
use crate::render::{format_line, render_session, RenderOptions};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see --help".to_string(),
        ));
    };

    match command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
        Commands::Config { command } => cmd_config(cli, command),
        Commands::Tree {
            fen,
            moves,
            variations,
            show_fen,
        } => {
            let container = container(cli)?;
            cmd_tree(&container, fen.as_deref(), moves, variations, *show_fen)
        }
        Commands::Line { fen, moves, fens } => {
            let container = container(cli)?;
            cmd_line(&container, fen.as_deref(), moves, *fens)
        }
        Commands::Session {
            fen,
            script,
            keep_going,
        } => {
            let container = container(cli)?;
            let policy = if *keep_going {
                ImportPolicy::Skip
            } else {
                ImportPolicy::Abort
            };
            cmd_session(&container, fen.as_deref(), script.as_deref(), policy)
        }
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if cli.strict {
        settings.rules.sloppy = false;
    }
    debug!(?settings, "settings loaded");
    Ok(settings)
}

fn container(cli: &Cli) -> CliResult<ServiceContainer> {
    Ok(ServiceContainer::new(load_settings(cli)?))
}

/// Join CLI words into one movetext and split it into tokens.
fn tokens(words: &[String]) -> Vec<MoveToken> {
    split_movetext(&words.join(" "))
}

fn render_options(container: &ServiceContainer, session: &AnalysisSession, show_fen: bool) -> RenderOptions {
    let display = &container.settings.display;
    RenderOptions {
        show_fen: show_fen || display.show_fen,
        cursor: display.mark_cursor.then(|| session.cursor()),
    }
}

#[instrument(skip(container))]
fn cmd_tree(
    container: &ServiceContainer,
    fen: Option<&str>,
    moves: &[String],
    variations: &[String],
    show_fen: bool,
) -> CliResult<()> {
    let mut session = container.session(fen)?;
    session.import_line(&tokens(moves), ImportPolicy::Abort)?;
    let main_end = session.cursor();

    for variation in variations {
        session.to_start();
        session.import_line(&split_movetext(variation), ImportPolicy::Abort)?;
    }
    session.jump(main_end)?;

    let options = render_options(container, &session, show_fen);
    output::info(&render_session(&session, options));
    Ok(())
}

#[instrument(skip(container))]
fn cmd_line(
    container: &ServiceContainer,
    fen: Option<&str>,
    moves: &[String],
    fens: bool,
) -> CliResult<()> {
    let tokens = tokens(moves);
    if tokens.is_empty() {
        return Err(CliError::InvalidArgs("no moves given".to_string()));
    }
    let start = container.start_position(fen)?;
    let session = AnalysisSession::from_moves(container.rules.clone(), start, &tokens)?;
    let tree = session.tree();
    let line = tree.line_to(session.cursor());

    output::info(&format_line(tree, &line));
    if fens {
        for &idx in &line {
            let Some(node) = tree.get(idx) else { continue };
            let label = node
                .mv
                .as_ref()
                .map(|mv| mv.uci.clone())
                .unwrap_or_else(|| "start".to_string());
            output::detail(&format!("{label:>6}  {}", node.position));
        }
    }
    Ok(())
}

fn read_script(script: Option<&Path>) -> InfraResult<String> {
    let mut text = String::new();
    match script {
        Some(path) => {
            text = std::fs::read_to_string(path)
                .map_err(|e| InfraError::io(format!("read script {}", path.display()), e))?;
        }
        None => {
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| InfraError::io("read script from stdin", e))?;
        }
    }
    Ok(text)
}

#[instrument(skip(container))]
fn cmd_session(
    container: &ServiceContainer,
    fen: Option<&str>,
    script: Option<&Path>,
    policy: ImportPolicy,
) -> CliResult<()> {
    let commands = parse_script(&read_script(script)?)?;
    let mut session = container.session(fen)?;
    debug!(commands = commands.len(), ?policy, "running script");

    for (line, cmd) in &commands {
        if let ScriptCommand::Line(tokens) = cmd {
            if policy == ImportPolicy::Skip {
                let report = session.import_line(tokens, policy)?;
                for skipped in &report.skipped {
                    output::warning(&format!(
                        "line {line}: skipped '{}' ({})",
                        skipped.token, skipped.reason
                    ));
                }
                continue;
            }
        }

        session
            .execute(cmd, policy)
            .map_err(|e| ApplicationError::Script {
                line: *line,
                message: e.to_string(),
            })?;

        if *cmd == ScriptCommand::Show {
            let options = render_options(container, &session, false);
            output::header(&format!("-- line {line} --"));
            output::info(&render_session(&session, options));
        }
    }

    let options = render_options(container, &session, false);
    output::info(&render_session(&session, options));
    let tree = session.tree();
    output::action("line", &format_line(tree, &tree.line_to(session.cursor())));
    if let Some(pos) = session.position() {
        output::action("fen", pos);
    }
    Ok(())
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => match global_config_path() {
            Some(path) => {
                let state = if path.exists() { "" } else { " (not found)" };
                output::info(&format!("{}{state}", path.display()));
            }
            None => {
                return Err(CliError::Usage(
                    "cannot determine config directory".to_string(),
                ))
            }
        },
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}
