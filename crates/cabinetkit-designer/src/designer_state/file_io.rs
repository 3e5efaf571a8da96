//! File I/O operations (save, load) for designer state.

use std::path::Path;

use super::DesignerState;
use crate::serialization::RoomDocument;
use crate::snapshot::RestoreReport;

impl DesignerState {
    /// Save the current scene to a room file.
    pub fn save_to_file(&mut self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let document = self.snapshot();
        document.save_to_file(&path)?;

        self.current_file_path = Some(path.as_ref().to_path_buf());
        self.is_modified = false;
        tracing::info!("Saved room to {}", path.as_ref().display());

        Ok(())
    }

    /// Load a room file, replacing the scene and starting a fresh history.
    ///
    /// Returns `Ok(None)` when a restore is already running; the scene and
    /// the current file are left as they were.
    pub async fn load_from_file(
        &mut self,
        path: impl AsRef<Path>,
    ) -> anyhow::Result<Option<RestoreReport>> {
        let document = RoomDocument::load_from_file(&path)?;
        let Some(report) = self.history.load_room(&document).await? else {
            return Ok(None);
        };

        self.current_file_path = Some(path.as_ref().to_path_buf());
        self.is_modified = false;

        Ok(Some(report))
    }
}
