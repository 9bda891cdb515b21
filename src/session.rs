use tracing::{debug, info};

use crate::Config;
use crate::compositor::{Compositor, Surface};
use crate::export::{DownloadSink, ExportError, ExportOutcome, Exporter};
use crate::interaction::{DragController, DragState};
use crate::placement::{Dimensions, Placement};
use crate::registry::{ImageId, ImageRegistry, RegistryError, SourceFile, UploadReport};
use crate::settings::{AutoPosition, Position, SettingsPatch, WatermarkSettings};

/// All state of one editing session.
///
/// Every change that can affect the picture (active image, settings,
/// viewport) redraws the surface before returning, so the surface always
/// reflects the current state when it is exported.
pub struct Session {
    registry: ImageRegistry,
    settings: WatermarkSettings,
    surface: Surface,
    drag: DragController,
    compositor: Compositor,
    exporter: Exporter,
    placement: Option<Placement>,
}

impl Session {
    pub fn new(
        registry: ImageRegistry,
        settings: WatermarkSettings,
        viewport: Dimensions,
        compositor: Compositor,
        exporter: Exporter,
    ) -> Self {
        Self {
            registry,
            settings: settings.clamped(),
            surface: Surface::new(viewport),
            drag: DragController::new(),
            compositor,
            exporter,
            placement: None,
        }
    }

    /// Build a session from configuration, loading the font it names.
    /// Without a configured viewport the surface starts with no area until
    /// the host reports one.
    pub fn from_config(config: &Config) -> Self {
        let viewport = config
            .render
            .viewport
            .as_ref()
            .map(|v| Dimensions::new(v.width, v.height))
            .unwrap_or(Dimensions::new(0, 0));

        Self::new(
            ImageRegistry::new(config.registry.max_files),
            config.watermark.clone(),
            viewport,
            Compositor::load_or_fallback(&config.render.font_path),
            Exporter::new(config.export.filename_prefix.clone()),
        )
    }

    pub fn registry(&self) -> &ImageRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &WatermarkSettings {
        &self.settings
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Placement used by the most recent draw.
    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }

    pub fn drag_state(&self) -> DragState {
        self.drag.state()
    }

    pub async fn upload(&mut self, files: Vec<SourceFile>) -> UploadReport {
        let before = self.registry.active_id();
        let report = self.registry.upload(files).await;
        if self.registry.active_id() != before {
            self.redraw();
        }
        report
    }

    pub fn select(&mut self, id: ImageId) -> Result<(), RegistryError> {
        self.registry.select(id)?;
        self.redraw();
        Ok(())
    }

    pub fn clear_all(&mut self) {
        self.registry.clear_all();
        self.drag.pointer_up();
        self.redraw();
    }

    pub fn update_settings(&mut self, patch: SettingsPatch) {
        if patch.is_empty() {
            return;
        }
        self.settings = self.settings.apply(patch);
        self.redraw();
    }

    pub fn select_anchor(&mut self, anchor: AutoPosition) {
        self.update_settings(SettingsPatch::anchor(anchor));
    }

    /// The host's container changed size.
    pub fn resize_viewport(&mut self, viewport: Dimensions) {
        debug!("Viewport resized to {}x{}", viewport.width, viewport.height);
        self.surface.set_container(viewport);
        self.redraw();
    }

    pub fn pointer_down(&mut self, pointer: Position) {
        self.drag.pointer_down(pointer, &self.settings);
    }

    pub fn pointer_move(&mut self, pointer: Position) {
        if let Some(patch) = self.drag.pointer_move(pointer) {
            self.update_settings(patch);
        }
    }

    pub fn pointer_up(&mut self) {
        self.drag.pointer_up();
    }

    pub fn pointer_leave(&mut self) {
        self.drag.pointer_leave();
    }

    /// Export the active image as currently drawn.
    pub async fn download(&self, sink: &dyn DownloadSink) -> Result<ExportOutcome, ExportError> {
        self.exporter
            .export(self.registry.active(), &self.surface, sink)
            .await
    }

    fn redraw(&mut self) {
        self.placement = match self.registry.active() {
            Some(entry) => self
                .compositor
                .render(&mut self.surface, entry, &self.settings),
            None => {
                self.surface.clear();
                None
            }
        };

        if let Some(p) = &self.placement {
            debug!(
                "Watermark at ({:.1}, {:.1}) size {:.1} aligned {:?}/{:?}",
                p.x, p.y, p.font_size, p.h_align, p.v_align
            );
        } else if let Some(entry) = self.registry.active() {
            info!("Nothing drawn for {}", entry.name());
        }
    }
}
