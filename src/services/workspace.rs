use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Every workspace directory name starts with this prefix; the sweep only
/// ever touches entries that carry it.
pub const WORKSPACE_PREFIX: &str = "docxify-";

const INPUT_FILE_NAME: &str = "input.pdf";
const OUTPUT_FILE_NAME: &str = "output.docx";

/// Directory under which per-request workspaces are created.
#[derive(Debug, Clone)]
pub struct WorkspaceRoot {
    path: PathBuf,
}

impl WorkspaceRoot {
    pub fn new(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates a fresh workspace owned by one request.
    ///
    /// The directory is created exclusively (an existing name is never
    /// reused, creation retries with a new random suffix), so two live
    /// workspaces can never share a path even for identical request ids.
    pub fn create(&self, request_id: &str) -> io::Result<Workspace> {
        let prefix = format!("{}{}-", WORKSPACE_PREFIX, sanitize(request_id));
        let dir = tempfile::Builder::new()
            .prefix(&prefix)
            .tempdir_in(&self.path)?;
        debug!(workspace = %dir.path().display(), "Workspace created");
        Ok(Workspace { dir })
    }

    /// Removes workspaces left behind by a previous process. Returns how many
    /// entries were removed.
    pub fn sweep(&self) -> usize {
        let entries = match fs::read_dir(&self.path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(root = %self.path.display(), error = %e, "Failed to read workspace root");
                return 0;
            }
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let is_workspace = entry
                .file_name()
                .to_str()
                .map(|name| name.starts_with(WORKSPACE_PREFIX))
                .unwrap_or(false);
            if !is_workspace {
                continue;
            }

            let path = entry.path();
            let result = match entry.file_type() {
                Ok(kind) if kind.is_dir() => fs::remove_dir_all(&path),
                _ => fs::remove_file(&path),
            };
            match result {
                Ok(()) => removed += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove stale workspace"),
            }
        }

        if removed > 0 {
            info!(root = %self.path.display(), removed, "Swept stale workspaces");
        }
        removed
    }
}

/// A request-scoped directory holding the staged PDF and the converter output.
///
/// Dropping the workspace deletes it, so every exit path (early return,
/// error, panic unwinding) releases the files. [`Workspace::close`] does the
/// same but reports removal errors.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn input_path(&self) -> PathBuf {
        self.dir.path().join(INPUT_FILE_NAME)
    }

    pub fn output_path(&self) -> PathBuf {
        self.dir.path().join(OUTPUT_FILE_NAME)
    }

    pub fn close(self) -> io::Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close()?;
        debug!(workspace = %path.display(), "Workspace removed");
        Ok(())
    }
}

fn sanitize(request_id: &str) -> String {
    request_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .take(36)
        .collect()
}
