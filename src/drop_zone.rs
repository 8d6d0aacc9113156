use crate::logo::{first_source, LogoSource};
use eframe::egui::DroppedFile;

/// Highlight state of the design area while files are dragged over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropZoneState {
    #[default]
    Idle,
    Hovering,
}

impl DropZoneState {
    pub fn is_highlighted(&self) -> bool {
        *self == DropZoneState::Hovering
    }

    pub fn drag_over(&mut self) {
        if *self != DropZoneState::Hovering {
            log::debug!("Drag entered drop zone");
        }
        *self = DropZoneState::Hovering;
    }

    pub fn drag_leave(&mut self) {
        if *self != DropZoneState::Idle {
            log::debug!("Drag left drop zone");
        }
        *self = DropZoneState::Idle;
    }

    /// Resets the highlight and hands back the first dropped file, if any.
    pub fn drop(&mut self, files: &[DroppedFile]) -> Option<LogoSource> {
        *self = DropZoneState::Idle;
        if files.len() > 1 {
            log::debug!("{} files dropped, using the first one", files.len());
        }
        first_source(files)
    }

    /// Feeds one frame of raw drag-and-drop input through the state machine.
    ///
    /// A frame with dropped files is a drop; a frame with hovered files is a
    /// drag-over; the first frame with neither after hovering is a drag-leave.
    pub fn sync(&mut self, hovering_files: bool, dropped: &[DroppedFile]) -> Option<LogoSource> {
        if !dropped.is_empty() {
            return self.drop(dropped);
        }
        if hovering_files {
            self.drag_over();
        } else if self.is_highlighted() {
            self.drag_leave();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn dropped(path: &str) -> DroppedFile {
        DroppedFile {
            path: Some(PathBuf::from(path)),
            name: path.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_starts_idle() {
        assert_eq!(DropZoneState::default(), DropZoneState::Idle);
        assert!(!DropZoneState::default().is_highlighted());
    }

    #[test]
    fn test_hover_then_leave() {
        let mut state = DropZoneState::default();
        assert!(state.sync(true, &[]).is_none());
        assert!(state.is_highlighted());

        // Repeated drag-over frames keep the highlight
        state.sync(true, &[]);
        assert_eq!(state, DropZoneState::Hovering);

        state.sync(false, &[]);
        assert_eq!(state, DropZoneState::Idle);
    }

    #[test]
    fn test_drop_resets_and_uses_first_file() {
        let mut state = DropZoneState::Hovering;
        let source = state.sync(false, &[dropped("first.png"), dropped("second.png")]);
        assert_eq!(state, DropZoneState::Idle);
        match source {
            Some(LogoSource::Path(path)) => assert_eq!(path, PathBuf::from("first.png")),
            other => panic!("unexpected source: {other:?}"),
        }
    }

    #[test]
    fn test_drop_without_content_only_resets_border() {
        let mut state = DropZoneState::Hovering;
        let empty = DroppedFile::default();
        assert!(state.drop(&[empty]).is_none());
        assert_eq!(state, DropZoneState::Idle);
    }
}
