use tracing::trace;

use crate::settings::{Position, SettingsPatch, WatermarkSettings};

/// Drag-to-place state. Any press on the surface grabs the watermark; there
/// is no hit testing against the text bounds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        /// Watermark position minus the pointer position at press time.
        offset: Position,
    },
}

#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Start dragging, remembering where the pointer is relative to the
    /// watermark so it does not jump under the pointer.
    pub fn pointer_down(&mut self, pointer: Position, settings: &WatermarkSettings) {
        let offset = Position::new(
            settings.position.x - pointer.x,
            settings.position.y - pointer.y,
        );
        trace!("Drag started at ({}, {})", pointer.x, pointer.y);
        self.state = DragState::Dragging { offset };
    }

    /// The settings change for a pointer move, if a drag is in progress.
    pub fn pointer_move(&self, pointer: Position) -> Option<SettingsPatch> {
        match self.state {
            DragState::Idle => None,
            DragState::Dragging { offset } => Some(SettingsPatch::moved_to(Position::new(
                pointer.x + offset.x,
                pointer.y + offset.y,
            ))),
        }
    }

    pub fn pointer_up(&mut self) {
        if self.is_dragging() {
            trace!("Drag finished");
        }
        self.state = DragState::Idle;
    }

    /// Leaving the surface ends the drag the same way releasing does.
    pub fn pointer_leave(&mut self) {
        self.pointer_up();
    }
}
