//! Command dispatch: one subcommand, one handler.

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::application::{IoResultExt, Session};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::cli::shell::Shell;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{Command, NodeId, Outcome, RenderOptions, TreeArena, TreeRender};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see 'mindmap --help'".to_string(),
        ));
    };

    // completions must work even with a broken config
    if let Commands::Completion { shell } = command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let work_dir = match &cli.dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()
            .map_err(|e| InfraError::io("determine working directory", e))?,
    };
    let settings = Settings::load(Some(&work_dir))?;
    let container = ServiceContainer::new(settings);
    let resolve = |file: &Option<PathBuf>| -> PathBuf {
        let path = container.map_path(file.as_deref());
        if path.is_relative() {
            work_dir.join(path)
        } else {
            path
        }
    };

    match command {
        Commands::New { file, title, force } => {
            _new(&container, &resolve(file), title.as_deref(), *force)
        }
        Commands::Show { file, ids, json } => _show(&container, &resolve(file), *ids, *json),
        Commands::Add {
            title,
            parent,
            file,
        } => _add(&container, &resolve(file), *parent, title),
        Commands::Rename { id, title, file } => _edit(
            &container,
            &resolve(file),
            Command::Rename {
                target: *id,
                title: title.clone(),
            },
        ),
        Commands::Delete { id, file } => {
            _edit(&container, &resolve(file), Command::Delete { target: *id })
        }
        Commands::Level { id, delta, file } => _edit(
            &container,
            &resolve(file),
            Command::ChangeLevel {
                target: *id,
                delta: *delta,
            },
        ),
        Commands::Move {
            id,
            direction,
            file,
        } => _edit(
            &container,
            &resolve(file),
            Command::MoveSibling {
                target: *id,
                direction: *direction,
            },
        ),
        Commands::Export { file, output } => _export(
            &container,
            &resolve(file),
            output.as_ref().map(|o| resolve_against(&work_dir, o)).as_deref(),
        ),
        Commands::Shell { file } => _shell(&container, resolve(file)),
        Commands::Config { command } => _config(&container, &work_dir, command),
        Commands::Completion { .. } => Ok(()),
    }
}

fn resolve_against(work_dir: &Path, path: &Path) -> PathBuf {
    if path.is_relative() {
        work_dir.join(path)
    } else {
        path.to_path_buf()
    }
}

fn render_options(container: &ServiceContainer, show_ids: bool) -> RenderOptions {
    RenderOptions {
        indent: container.settings.display.indent,
        show_ids: show_ids || container.settings.display.show_ids,
        ..Default::default()
    }
}

#[instrument(skip(container))]
fn _new(
    container: &ServiceContainer,
    path: &Path,
    title: Option<&str>,
    force: bool,
) -> CliResult<()> {
    let title = title.unwrap_or(&container.settings.root_title);
    let tree = container.map_files.create(path, title, force)?;
    output::success(&format!("created {}", path.display()));
    output::detail(&format!("root: {} [{}]", title, tree.root_id()));
    Ok(())
}

#[instrument(skip(container))]
fn _show(container: &ServiceContainer, path: &Path, ids: bool, json: bool) -> CliResult<()> {
    let session = container.map_files.open(path)?;
    if json {
        output::info(&session.export_json()?);
    } else {
        let rendered = session.tree().to_tree_string(&render_options(container, ids));
        print!("{}", rendered);
    }
    Ok(())
}

#[instrument(skip(container))]
fn _add(
    container: &ServiceContainer,
    path: &Path,
    parent: Option<NodeId>,
    title: &str,
) -> CliResult<()> {
    let tree = container.map_files.load(path)?;
    let target = parent.unwrap_or_else(|| tree.root_id());
    apply(
        container,
        path,
        tree,
        Command::AddChild {
            target,
            title: title.to_string(),
        },
    )
}

#[instrument(skip(container))]
fn _edit(container: &ServiceContainer, path: &Path, command: Command) -> CliResult<()> {
    let tree = container.map_files.load(path)?;
    apply(container, path, tree, command)
}

/// Dispatch one command and save when the tree changed.
fn apply(
    container: &ServiceContainer,
    path: &Path,
    tree: TreeArena,
    command: Command,
) -> CliResult<()> {
    let target = command.target();
    let mut session = Session::from_tree(tree);
    let outcome = session.dispatch(command);
    debug!("apply: {:?}", outcome);

    match &outcome {
        Outcome::Unchanged => {
            output::warning(&format!("no change for node {}", target));
            return Ok(());
        }
        Outcome::Added(id) => output::action("Added", id),
        Outcome::Updated => output::action("Updated", &target),
        Outcome::Removed(ids) => output::action("Deleted", &format!("{} node(s)", ids.len())),
    }
    container.map_files.save(path, session.tree())?;
    Ok(())
}

#[instrument(skip(container))]
fn _export(container: &ServiceContainer, path: &Path, target: Option<&Path>) -> CliResult<()> {
    let session = container.map_files.open(path)?;
    let json = session.export_json()?;
    match target {
        None => output::info(&json),
        Some(target) => {
            container
                .fs
                .ensure_parent(target)
                .with_path_context("create directory for", target)?;
            container
                .fs
                .write(target, &format!("{json}\n"))
                .with_path_context("write export", target)?;
            output::success(&format!("exported {}", target.display()));
        }
    }
    Ok(())
}

#[instrument(skip(container))]
fn _shell(container: &ServiceContainer, path: PathBuf) -> CliResult<()> {
    let session = container
        .map_files
        .open_or_new(&path, &container.settings.root_title)?;
    output::header(&format!("mindmap shell: {} ('help' for commands)", path.display()));

    let mut shell = Shell::new(
        session,
        &container.map_files,
        path,
        render_options(container, false),
    );
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    shell.run(stdin.lock(), &mut stdout)?;
    if shell.is_dirty() {
        output::warning("left shell with unsaved changes");
    }
    Ok(())
}

#[instrument(skip(container))]
fn _config(
    container: &ServiceContainer,
    work_dir: &Path,
    command: &ConfigCommands,
) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::action("global", "unavailable"),
            }
            output::action("local", &local_config_path(work_dir).display());
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("cannot determine global config directory".to_string())
                })?
            } else {
                local_config_path(work_dir)
            };
            if container.fs.exists(&path) {
                return Err(CliError::Usage(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            container
                .fs
                .ensure_parent(&path)
                .with_path_context("create directory for", &path)?;
            container
                .fs
                .write(&path, &Settings::template())
                .with_path_context("write config", &path)?;
            output::success(&format!("created {}", path.display()));
        }
    }
    Ok(())
}
