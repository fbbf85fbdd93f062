//! Recording session: routes captured frames into the label store.

use std::sync::Arc;

use super::cursor::{CaptureCursor, NameEdit, NameKey, PressEvent};
use crate::source::Frame;
use crate::store::{LabelStore, StoreError};

/// What kind of training set is being captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureProfile {
    /// Image classifier classes; every tick is sampled while recording.
    Classifier,
    /// Face enrollment users; every 3rd tick is sampled while recording.
    FaceEnrollment,
}

impl CaptureProfile {
    pub fn default_sample_every(&self) -> u64 {
        match self {
            CaptureProfile::Classifier => 1,
            CaptureProfile::FaceEnrollment => 3,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no class selected")]
    NoTarget,

    #[error("no rename in progress")]
    NotRenaming,

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct RecordingSession {
    store: Arc<dyn LabelStore>,
    cursor: CaptureCursor,
    profile: CaptureProfile,
    sample_every: u64,
}

impl std::fmt::Debug for RecordingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingSession")
            .field("cursor", &self.cursor)
            .field("profile", &self.profile)
            .field("sample_every", &self.sample_every)
            .finish_non_exhaustive()
    }
}

impl RecordingSession {
    pub fn new(store: Arc<dyn LabelStore>, profile: CaptureProfile) -> Self {
        Self {
            store,
            cursor: CaptureCursor::default(),
            profile,
            sample_every: profile.default_sample_every(),
        }
    }

    /// Override how many ticks pass between recorded samples.
    pub fn with_sample_every(mut self, every: u64) -> Self {
        self.sample_every = every.max(1);
        self
    }

    pub fn cursor(&self) -> &CaptureCursor {
        &self.cursor
    }

    pub fn profile(&self) -> CaptureProfile {
        self.profile
    }

    pub fn store(&self) -> &Arc<dyn LabelStore> {
        &self.store
    }

    pub fn select(&mut self, index: usize) {
        self.cursor.selected_index = Some(index);
    }

    /// Index of the first enabled class, if any.
    pub fn first_enabled_class(&self) -> Option<usize> {
        self.store.classes().iter().position(|class| class.enabled)
    }

    /// Append one sample to `target`, or to the selected class when `None`.
    pub fn add_example(&self, frame: Frame, target: Option<usize>) -> Result<(), SessionError> {
        let index = target
            .or(self.cursor.selected_index)
            .ok_or(SessionError::NoTarget)?;
        self.store.add_example(frame, index)?;
        Ok(())
    }

    /// Apply a record-button event.
    pub fn record_camera(&mut self, event: PressEvent) {
        self.cursor.press(event);
    }

    pub fn is_recording(&self) -> bool {
        self.cursor.record_index.is_some()
    }

    /// Handle a frame from capture tick `tick` (1-based).
    ///
    /// Appends it to the recording class when one is set and the tick falls
    /// on the sampling interval. Returns whether a sample was stored.
    pub fn on_frame(&self, frame: &Frame, tick: u64) -> bool {
        let Some(index) = self.cursor.record_index else {
            return false;
        };
        if tick % self.sample_every != 0 {
            return false;
        }
        match self.store.add_example(frame.clone(), index) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("Dropped recorded frame for class {}: {}", index, e);
                false
            }
        }
    }

    /// Start editing the name of the class at `index`; also selects it.
    pub fn begin_rename(&mut self, index: usize) -> Result<&NameEdit, SessionError> {
        let classes = self.store.classes();
        let len = classes.len();
        let original = classes
            .get(index)
            .map(|class| class.name.clone())
            .ok_or(StoreError::IndexOutOfRange { index, len })?;

        self.cursor.selected_index = Some(index);
        let edit = self.cursor.changing_name.insert(NameEdit {
            index,
            text: original.clone(),
            original,
        });
        Ok(edit)
    }

    /// Update the editor text. Nothing is committed until blur.
    pub fn edit_name(&mut self, text: &str) -> Result<(), SessionError> {
        let edit = self
            .cursor
            .changing_name
            .as_mut()
            .ok_or(SessionError::NotRenaming)?;
        edit.text = text.to_string();
        Ok(())
    }

    /// Enter commits and blurs; Escape restores the prior name and blurs
    /// without committing.
    pub fn name_key(&mut self, key: NameKey) -> Result<(), SessionError> {
        match key {
            NameKey::Enter => self.blur_name(),
            NameKey::Escape => {
                self.cursor
                    .changing_name
                    .take()
                    .ok_or(SessionError::NotRenaming)?;
                Ok(())
            }
        }
    }

    /// Commit the editor text to the store and end editing.
    pub fn blur_name(&mut self) -> Result<(), SessionError> {
        let edit = self
            .cursor
            .changing_name
            .take()
            .ok_or(SessionError::NotRenaming)?;
        self.store.rename(edit.index, &edit.text)?;
        Ok(())
    }

    pub fn clear_class(&self, index: usize) -> Result<(), SessionError> {
        self.store.clear_class(index)?;
        Ok(())
    }

    /// Remove the class; the cursor forgets any reference to it.
    pub fn remove_class(&mut self, index: usize) -> Result<(), SessionError> {
        self.store.remove_class(index)?;
        self.cursor.forget(index);
        Ok(())
    }

    /// Enable the class slot at `index` and select it.
    pub fn add_class(&mut self, index: usize) -> Result<(), SessionError> {
        self.store.add_class(index)?;
        self.cursor.selected_index = Some(index);
        Ok(())
    }
}
