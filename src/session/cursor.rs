//! UI-session capture state: selection, recording target, name editing.

/// Pointer event on a class's record button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressEvent {
    /// Button pressed on the class at this index
    Down(usize),
    /// Button released
    Up,
    /// Pointer left the button while pressed
    Leave,
}

/// Keys the name editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKey {
    /// Confirm and blur
    Enter,
    /// Restore the prior name and blur without committing
    Escape,
}

/// An in-progress class rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameEdit {
    pub index: usize,
    /// Name before editing started
    pub original: String,
    /// Text currently in the editor
    pub text: String,
}

/// Transient cursor over the class list. Not persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureCursor {
    /// Class/user active for recording and renaming
    pub selected_index: Option<usize>,
    /// Class currently recording; `None` when idle
    pub record_index: Option<usize>,
    /// Rename in progress, if any
    pub changing_name: Option<NameEdit>,
}

impl CaptureCursor {
    pub fn changing_name_index(&self) -> Option<usize> {
        self.changing_name.as_ref().map(|edit| edit.index)
    }

    /// Apply a record-button event.
    pub fn press(&mut self, event: PressEvent) {
        self.record_index = match event {
            PressEvent::Down(index) => Some(index),
            PressEvent::Up | PressEvent::Leave => None,
        };
    }

    /// Forget every reference to `index` after its class is removed.
    pub fn forget(&mut self, index: usize) {
        if self.selected_index == Some(index) {
            self.selected_index = None;
        }
        if self.record_index == Some(index) {
            self.record_index = None;
        }
        if self.changing_name_index() == Some(index) {
            self.changing_name = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_down_up_leave() {
        let mut cursor = CaptureCursor::default();
        cursor.press(PressEvent::Down(2));
        assert_eq!(cursor.record_index, Some(2));
        cursor.press(PressEvent::Up);
        assert_eq!(cursor.record_index, None);
        cursor.press(PressEvent::Down(1));
        cursor.press(PressEvent::Leave);
        assert_eq!(cursor.record_index, None);
    }

    #[test]
    fn test_forget_only_clears_matching_index() {
        let mut cursor = CaptureCursor {
            selected_index: Some(1),
            record_index: Some(2),
            changing_name: Some(NameEdit {
                index: 1,
                original: "a".to_string(),
                text: "b".to_string(),
            }),
        };
        cursor.forget(1);
        assert_eq!(cursor.selected_index, None);
        assert_eq!(cursor.record_index, Some(2));
        assert_eq!(cursor.changing_name, None);
    }
}
