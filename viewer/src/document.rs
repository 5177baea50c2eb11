//! One open diff in the viewer: the merge engine plus save and close
//! bookkeeping.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::chunk::DiffChunk;
use crate::error::{ClientError, CloseError};
use crate::events::SessionSnapshot;
use crate::merge::ChunkMerger;
use crate::normalize::normalize_content;

/// Where Save writes the left buffer.
#[async_trait]
pub trait SaveTarget: Send + Sync {
    /// Writes `content` to `path`.
    async fn save(&self, path: &str, content: &str) -> Result<(), ClientError>;
}

/// The user's answer to a [`ClosePrompt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseChoice {
    /// Save the left buffer, then close.
    Save,
    /// Close without saving.
    Discard,
    /// Keep the document open.
    Cancel,
}

/// Asks the user how to close a document with pending work.
#[async_trait]
pub trait ConfirmDialog: Send + Sync {
    /// Shows `prompt` and returns the chosen button.
    async fn confirm(&self, prompt: &ClosePrompt) -> CloseChoice;
}

/// Dialog shown before closing a document with pending work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosePrompt {
    /// Title of the dialog.
    pub title: &'static str,
    /// Question shown to the user.
    pub message: &'static str,
    /// Button labels, in [`CloseChoice`] order.
    pub buttons: [&'static str; 3],
}

impl ClosePrompt {
    fn new(message: &'static str) -> Self {
        Self {
            title: "Save Changes",
            message,
            buttons: ["Save", "Close Without Saving", "Cancel"],
        }
    }
}

/// Outcome of [`MergeDocument::resolve_close`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    /// Dispose of the document.
    Close,
    /// Keep it open.
    Stay,
}

/// An open diff with its merge engine.
#[derive(Debug, Clone)]
pub struct MergeDocument {
    id: Option<String>,
    left_path: Option<String>,
    right_path: Option<String>,
    saved_content: Option<String>,
    merger: ChunkMerger,
}

impl MergeDocument {
    /// Opens a document over two texts. The right text is normalized
    /// against the left.
    #[must_use]
    pub fn new(left_path: Option<String>, left: &str, right: &str) -> Self {
        Self {
            id: None,
            left_path,
            right_path: None,
            saved_content: Some(left.to_string()),
            merger: ChunkMerger::new(left, normalize_content(left, right)),
        }
    }

    /// Opens a document for a session announced by the daemon.
    #[must_use]
    pub fn from_session(session: &SessionSnapshot) -> Self {
        let left = session.left_content.as_deref().unwrap_or_default();
        let right = session.right_content.as_deref().unwrap_or_default();
        let mut document = Self::new(session.left_path.clone(), left, right);
        document.id = Some(session.id.clone());
        document.right_path.clone_from(&session.right_path);
        document
    }

    /// Session id, if the document came from the daemon.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Path Save writes to.
    #[must_use]
    pub fn left_path(&self) -> Option<&str> {
        self.left_path.as_deref()
    }

    /// The merge engine.
    #[must_use]
    pub fn merger(&self) -> &ChunkMerger {
        &self.merger
    }

    /// The merge engine, for edits and accepts.
    pub fn merger_mut(&mut self) -> &mut ChunkMerger {
        &mut self.merger
    }

    /// Current left text.
    #[must_use]
    pub fn content(&self) -> &str {
        self.merger.left().value()
    }

    /// The left text differs from what was last loaded or saved.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.saved_content
            .as_deref()
            .is_some_and(|saved| saved != self.content())
    }

    /// Records that the current left text is on disk.
    pub fn mark_saved(&mut self) {
        self.saved_content = Some(self.content().to_string());
    }

    /// Saves the left text through `target`.
    ///
    /// # Errors
    ///
    /// Returns [`CloseError::NoSavePath`] without a left path, or the
    /// target's error.
    pub async fn save(&mut self, target: &dyn SaveTarget) -> Result<(), CloseError> {
        let path = self.left_path.clone().ok_or(CloseError::NoSavePath)?;
        let content = self.content().to_string();
        target.save(&path, &content).await?;
        self.saved_content = Some(content);
        info!(path = %path, "Document saved");
        Ok(())
    }

    /// Applies a watched-file change.
    ///
    /// A change to the right file replaces the right text. A change to the
    /// left file reloads both buffers, but only while the left side has no
    /// unsaved edits. Returns whether the document changed.
    pub fn apply_file_change(&mut self, path: &str, content: &str) -> bool {
        if self.right_path.as_deref() == Some(path) {
            let right = normalize_content(self.content(), content);
            self.merger.reload_right(right);
            return true;
        }
        if self.left_path.as_deref() == Some(path) {
            if self.has_unsaved_changes() {
                debug!(path, "Ignoring external change to a locally edited file");
                return false;
            }
            let right = normalize_content(content, self.merger.right().value());
            self.merger.load(content, right);
            self.saved_content = Some(content.to_string());
            return true;
        }
        false
    }

    /// The dialog to show before closing, if any work would be lost.
    #[must_use]
    pub fn close_prompt(&self, chunks: &[DiffChunk]) -> Option<ClosePrompt> {
        let unsaved = self.has_unsaved_changes();
        let unmerged = !chunks.is_empty();
        let message = match (unsaved, unmerged) {
            (false, false) => return None,
            (true, false) => "Do you want to save changes?",
            (true, true) => {
                "There are unsaved changes and unmerged diffs. Do you want to save changes?"
            }
            (false, true) => "There are unmerged diffs. Are you sure you want to close?",
        };
        Some(ClosePrompt::new(message))
    }

    /// Runs the close flow: prompt if needed, then save, discard or stay.
    ///
    /// # Errors
    ///
    /// Returns an error if the user chose Save and saving failed; the
    /// document must then stay open.
    pub async fn resolve_close(
        &mut self,
        chunks: &[DiffChunk],
        dialog: &dyn ConfirmDialog,
        target: &dyn SaveTarget,
    ) -> Result<CloseDecision, CloseError> {
        let Some(prompt) = self.close_prompt(chunks) else {
            return Ok(CloseDecision::Close);
        };
        match dialog.confirm(&prompt).await {
            CloseChoice::Save => {
                self.save(target).await?;
                Ok(CloseDecision::Close)
            }
            CloseChoice::Discard => Ok(CloseDecision::Close),
            CloseChoice::Cancel => Ok(CloseDecision::Stay),
        }
    }
}
