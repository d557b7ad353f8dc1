//! Interactive line-oriented editor.
//!
//! Each input line is one command applied to the session before the next line is read.
//! Nodes are addressed by id or by their `#n` position in the `show` listing.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;

use tracing::{debug, instrument};

use crate::application::services::MapFileService;
use crate::application::Session;
use crate::cli::error::CliResult;
use crate::domain::{Direction, NodeId, Outcome, RenderOptions, Selection, TreeRender};
use crate::infrastructure::InfraError;

const HELP: &str = "\
commands:
  select <id|#n>   select a node (selecting it again deselects)
  deselect         clear the selection
  add [title]      add a child to the selected node
  rename [title]   rename the selected node
  delete           delete the selected node and its subtree
  up | down        move the selected node among its siblings
  indent | outdent change the selected node's level by +1 / -1
  show             print the tree
  json             print the tree as JSON
  save [path]      write the map (default: the opened file)
  help             this text
  quit[!]          leave (quit! discards unsaved changes)";

/// How a node is addressed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Id(NodeId),
    /// Pre-order position as printed by `show`
    Position(usize),
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(pos) = s.strip_prefix('#') {
            return pos
                .parse()
                .map(Target::Position)
                .map_err(|_| format!("invalid position '{s}'"));
        }
        s.parse()
            .map(Target::Id)
            .map_err(|_| format!("invalid node id '{s}'"))
    }
}

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Select(Target),
    Deselect,
    Add(String),
    Rename(String),
    Delete,
    Move(Direction),
    Indent,
    Outdent,
    Show,
    Json,
    Save(Option<PathBuf>),
    Help,
    Quit { force: bool },
}

impl FromStr for ShellCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map(|(w, r)| (w, r.trim()))
            .unwrap_or((line, ""));

        match word {
            "select" | "s" => rest.parse().map(ShellCommand::Select),
            "deselect" => Ok(ShellCommand::Deselect),
            "add" | "a" => Ok(ShellCommand::Add(rest.to_string())),
            "rename" | "r" => Ok(ShellCommand::Rename(rest.to_string())),
            "delete" | "del" => Ok(ShellCommand::Delete),
            "up" => Ok(ShellCommand::Move(Direction::Up)),
            "down" => Ok(ShellCommand::Move(Direction::Down)),
            "indent" | ">" => Ok(ShellCommand::Indent),
            "outdent" | "<" => Ok(ShellCommand::Outdent),
            "show" | "ls" => Ok(ShellCommand::Show),
            "json" => Ok(ShellCommand::Json),
            "save" | "w" => Ok(ShellCommand::Save(
                (!rest.is_empty()).then(|| PathBuf::from(rest)),
            )),
            "help" | "?" => Ok(ShellCommand::Help),
            "quit" | "q" | "exit" => Ok(ShellCommand::Quit { force: false }),
            "quit!" | "q!" => Ok(ShellCommand::Quit { force: true }),
            other => Err(format!("unknown command '{other}', try 'help'")),
        }
    }
}

enum Flow {
    Continue,
    Quit,
}

/// Interactive editing loop over one session.
pub struct Shell<'a> {
    session: Session,
    map_files: &'a MapFileService,
    path: PathBuf,
    options: RenderOptions,
    dirty: bool,
}

impl<'a> Shell<'a> {
    pub fn new(
        session: Session,
        map_files: &'a MapFileService,
        path: PathBuf,
        options: RenderOptions,
    ) -> Self {
        Self {
            session,
            map_files,
            path,
            options: RenderOptions {
                numbered: true,
                ..options
            },
            dirty: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Read commands from `input` until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> CliResult<()> {
        let mut lines = input.lines();
        loop {
            write!(out, "mindmap> ").map_err(|e| InfraError::io("write prompt", e))?;
            out.flush().map_err(|e| InfraError::io("flush output", e))?;

            let Some(line) = lines.next() else {
                writeln!(out).map_err(|e| InfraError::io("write output", e))?;
                break;
            };
            let line = line.map_err(|e| InfraError::io("read input", e))?;
            if line.trim().is_empty() {
                continue;
            }

            let flow = match line.parse::<ShellCommand>() {
                Ok(command) => self.execute(command, out)?,
                Err(msg) => {
                    writeln!(out, "error: {msg}").map_err(|e| InfraError::io("write output", e))?;
                    Flow::Continue
                }
            };
            if let Flow::Quit = flow {
                break;
            }
        }
        Ok(())
    }

    #[instrument(level = "debug", skip(self, out))]
    fn execute<W: Write>(&mut self, command: ShellCommand, out: &mut W) -> CliResult<Flow> {
        let mut message = String::new();
        match command {
            ShellCommand::Select(target) => {
                message = match self.resolve(target) {
                    Some(id) => match self.session.select(id) {
                        Selection::Selected(id) => format!("selected {}", self.describe(id)),
                        Selection::Empty => "selection cleared".to_string(),
                    },
                    None => "no such node".to_string(),
                };
            }
            ShellCommand::Deselect => {
                self.session.deselect();
                message = "selection cleared".to_string();
            }
            ShellCommand::Add(title) => {
                let outcome = self.session.add_to_selected(&title);
                message = self.record(outcome);
            }
            ShellCommand::Rename(title) => {
                let outcome = self.session.rename_selected(&title);
                message = self.record(outcome);
            }
            ShellCommand::Delete => {
                let outcome = self.session.delete_selected();
                message = self.record(outcome);
            }
            ShellCommand::Move(direction) => {
                let outcome = self.session.move_selected(direction);
                message = self.record(outcome);
            }
            ShellCommand::Indent => {
                let outcome = self.session.indent_selected();
                message = self.record(outcome);
            }
            ShellCommand::Outdent => {
                let outcome = self.session.outdent_selected();
                message = self.record(outcome);
            }
            ShellCommand::Show => {
                let options = RenderOptions {
                    selected: self.session.selected(),
                    ..self.options.clone()
                };
                write!(out, "{}", self.session.tree().to_tree_string(&options))
                    .map_err(|e| InfraError::io("write output", e))?;
            }
            ShellCommand::Json => {
                message = self.session.export_json()?;
            }
            ShellCommand::Save(path) => {
                let path = path.unwrap_or_else(|| self.path.clone());
                message = match self.map_files.save(&path, self.session.tree()) {
                    Ok(()) => {
                        self.dirty = false;
                        format!("saved {}", path.display())
                    }
                    Err(e) => format!("error: {e}"),
                };
            }
            ShellCommand::Help => message = HELP.to_string(),
            ShellCommand::Quit { force } => {
                if self.dirty && !force {
                    message = "unsaved changes: 'save' first or 'quit!' to discard".to_string();
                } else {
                    return Ok(Flow::Quit);
                }
            }
        }
        if !message.is_empty() {
            writeln!(out, "{message}").map_err(|e| InfraError::io("write output", e))?;
        }
        Ok(Flow::Continue)
    }

    fn resolve(&self, target: Target) -> Option<NodeId> {
        match target {
            Target::Id(id) => self.session.tree().contains(id).then_some(id),
            Target::Position(pos) => self.session.tree().nth(pos),
        }
    }

    fn describe(&self, id: NodeId) -> String {
        self.session
            .tree()
            .find(id)
            .map(|data| format!("'{}' [{}]", data.title, id.short()))
            .unwrap_or_else(|| id.to_string())
    }

    fn record(&mut self, outcome: Outcome) -> String {
        debug!("record: {:?}", outcome);
        if outcome.is_changed() {
            self.dirty = true;
        }
        match outcome {
            Outcome::Unchanged if self.session.selected().is_none() => {
                "nothing selected".to_string()
            }
            Outcome::Unchanged => "no change".to_string(),
            Outcome::Added(id) => format!("added {}", self.describe(id)),
            Outcome::Updated => "ok".to_string(),
            Outcome::Removed(ids) => format!("deleted {} node(s)", ids.len()),
        }
    }
}
