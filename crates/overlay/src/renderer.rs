use foundation::math::{LatLng, Mat4};
use scene::entity::NodeId;
use scene::prefabs;
use scene::{PerspectiveCamera, SceneGraph};
use tracing::{debug, warn};

use crate::config::OverlayConfig;
use crate::host::{OverlayHost, RenderBackend, Transformer};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DrawOutcome {
    Drawn,
    /// A lifecycle hook has not run yet; nothing was touched.
    Inert,
    /// The host transform was unusable; the frame was dropped.
    Skipped,
}

/// WebGL overlay driven entirely by the host map's lifecycle hooks.
///
/// - `on_add` builds a fresh scene and camera.
/// - `on_context_restored` binds a backend to the (new) graphics context.
/// - `on_draw` syncs the camera to the viewport and renders.
///
/// Until both `on_add` and `on_context_restored` have run, draws do nothing.
#[derive(Debug)]
pub struct OverlayRenderer<B: RenderBackend> {
    config: OverlayConfig,
    epoch: u64,
    scene: Option<SceneGraph>,
    camera: Option<PerspectiveCamera>,
    backend: Option<B>,
    frames_drawn: u64,
}

impl<B: RenderBackend> OverlayRenderer<B> {
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            config,
            epoch: 0,
            scene: None,
            camera: None,
            backend: None,
            frames_drawn: 0,
        }
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn on_add(&mut self) {
        self.epoch += 1;
        let mut scene = SceneGraph::new(self.epoch);
        prefabs::add_campus_lights(&mut scene);
        if let Some(plan) = &self.config.floor_plan {
            scene.add_mesh(prefabs::floor_plan(plan.position, plan.texture_url.clone()));
        }
        if let Some(landmark) = &self.config.landmark {
            scene.add_mesh(prefabs::landmark(landmark.model_url.clone(), landmark.scale));
        }
        debug!("overlay scene built: epoch {} with {} nodes", self.epoch, scene.len());
        self.scene = Some(scene);
        self.camera = Some(PerspectiveCamera::new());
    }

    pub fn on_context_restored(&mut self, mut backend: B) {
        // The map clears and presents the shared framebuffer itself.
        backend.set_auto_clear(false);
        self.backend = Some(backend);
    }

    pub fn on_draw<T, H>(&mut self, center: LatLng, transformer: &T, host: &H) -> DrawOutcome
    where
        T: Transformer,
        H: OverlayHost,
    {
        let (Some(scene), Some(camera), Some(backend)) =
            (&self.scene, &mut self.camera, &mut self.backend)
        else {
            return DrawOutcome::Inert;
        };

        let anchor = center.with_altitude(self.config.draw_altitude);
        let values = transformer.from_lat_lng_altitude(anchor);
        let Some(projection) = Mat4::from_column_major(&values) else {
            warn!("camera transform has {} values, expected 16; frame skipped", values.len());
            return DrawOutcome::Skipped;
        };

        camera.set_projection(projection);
        host.request_redraw();
        backend.render(scene, camera);
        backend.reset_state();
        self.frames_drawn += 1;
        DrawOutcome::Drawn
    }

    /// Marks a search result in the current scene.
    ///
    /// Highlights belong to the current scene and disappear on the next
    /// `on_add`. Returns `None` while the overlay has no scene.
    pub fn add_search_highlight(&mut self, at: LatLng) -> Option<NodeId> {
        let scene = self.scene.as_mut()?;
        Some(prefabs::add_search_highlight(scene, at))
    }

    pub fn scene(&self) -> Option<&SceneGraph> {
        self.scene.as_ref()
    }

    pub fn camera(&self) -> Option<&PerspectiveCamera> {
        self.camera.as_ref()
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }
}
