//! Mind-map file service
//!
//! Loads and saves the JSON export format through the `FileSystem` boundary.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt, Session};
use crate::domain::{TreeArena, UuidSource};
use crate::infrastructure::traits::FileSystem;

/// Reads and writes mind-map files.
pub struct MapFileService {
    fs: Arc<dyn FileSystem>,
}

impl MapFileService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Write a new map holding only a root node.
    ///
    /// Refuses to overwrite an existing file unless `force` is set.
    #[instrument(level = "debug", skip(self))]
    pub fn create(&self, path: &Path, root_title: &str, force: bool) -> ApplicationResult<TreeArena> {
        if self.fs.exists(path) && !force {
            return Err(ApplicationError::MapExists(path.to_path_buf()));
        }
        let tree = TreeArena::new(root_title);
        self.save(path, &tree)?;
        Ok(tree)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<TreeArena> {
        if !self.fs.is_file(path) {
            return Err(ApplicationError::MapNotFound(path.to_path_buf()));
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read mind map", path)?;
        let tree = TreeArena::from_json(&content, Box::new(UuidSource))?;
        debug!("load: {} nodes from {}", tree.node_count(), path.display());
        Ok(tree)
    }

    /// Load a map into a fresh editing session (nothing selected).
    pub fn open(&self, path: &Path) -> ApplicationResult<Session> {
        self.load(path).map(Session::from_tree)
    }

    /// Open `path` if it exists, otherwise start a new map titled `root_title`.
    pub fn open_or_new(&self, path: &Path, root_title: &str) -> ApplicationResult<Session> {
        if self.fs.exists(path) {
            self.open(path)
        } else {
            debug!("open_or_new: {} missing, starting new map", path.display());
            Ok(Session::new(root_title))
        }
    }

    #[instrument(level = "debug", skip(self, tree))]
    pub fn save(&self, path: &Path, tree: &TreeArena) -> ApplicationResult<()> {
        let mut json = tree.to_json()?;
        json.push('\n');
        self.fs
            .ensure_parent(path)
            .with_path_context("create directory for", path)?;
        self.fs
            .write(path, &json)
            .with_path_context("write mind map", path)?;
        debug!("save: {} nodes to {}", tree.node_count(), path.display());
        Ok(())
    }
}
