//! # Render pipeline
//!
//! The top-level per-frame orchestrator. It owns the render note chain, the
//! active scene, the graphics device seam, and the current render target,
//! and drives one tick as:
//!
//! ```text
//! drain deferred tasks (frame boundary)
//!   → scene.update(delta)          (hooks + sparse repopulation)
//!   → scene.update_matrices()     (world matrices for this tick)
//!   → chain.render(ctx)           (each stage in order)
//!   → scene.end_frame()           (double-buffer flip)
//! ```
//!
//! Matrix updates always complete before any stage reads them; that strict
//! sequencing, not locks, is what keeps the core race-free.
//!
//! An empty pipeline (no chain or no scene) renders nothing and logs at
//! debug severity; it never fails. Missing preconditions like resizing
//! without a render target are hard errors.

mod chain;
mod note;

pub use chain::{NoteChain, NoteKey};
pub use note::{RenderContext, RenderNote, SceneNote};

use crate::executor::{DeferredHandle, DeferredQueue};
use crate::render::api::{GraphicsDevice, RenderTarget};
use crate::scene::{BasicScene, Scene};
use crate::settings::EngineSettings;
use thiserror::Error;

/// Hard failures of the pipeline surface
///
/// Soft conditions (empty pipeline, stale chain keys, unresolved geometry)
/// never surface as errors; these are programmer-error preconditions.
/// Off-thread use is not an error case at all: the pipeline is not `Send`,
/// so it cannot leave its owning thread.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// `resize` was called with no render target installed
    #[error("resize requested with no render target installed")]
    MissingRenderTarget,
}

/// Top-level orchestrator of the per-frame render tick
///
/// The pipeline owns seams without `Send` bounds, so it is confined to the
/// thread that constructed it by the type system:
///
/// ```compile_fail
/// fn assert_send<T: Send>() {}
/// assert_send::<prism_engine::RenderPipeline>();
/// ```
///
/// Other threads interact through [`RenderPipeline::deferred_handle`],
/// whose tasks run at the next frame boundary.
pub struct RenderPipeline {
    chain: NoteChain,
    scene: Option<Box<dyn Scene>>,
    target: Option<Box<dyn RenderTarget>>,
    device: Box<dyn GraphicsDevice>,
    deferred: DeferredQueue<RenderPipeline>,
    delta: f32,
    log_empty_frames: bool,
    scene_capacity: usize,
}

impl RenderPipeline {
    /// Create an empty pipeline owning the device seam
    pub fn new(device: Box<dyn GraphicsDevice>) -> Self {
        Self::with_settings(device, &EngineSettings::default())
    }

    /// Create an empty pipeline configured from settings
    pub fn with_settings(device: Box<dyn GraphicsDevice>, settings: &EngineSettings) -> Self {
        let mut chain = NoteChain::new();
        chain.set_slow_stage_warn_ms(settings.pipeline.slow_stage_warn_ms);

        Self {
            chain,
            scene: None,
            target: None,
            device,
            deferred: DeferredQueue::new(),
            delta: 0.0,
            log_empty_frames: settings.pipeline.log_empty_frames,
            scene_capacity: settings.scene.renderable_capacity,
        }
    }

    /// Whether the pipeline would render nothing: no stages or no scene
    pub fn empty(&self) -> bool {
        self.chain.is_empty() || self.scene.is_none()
    }

    /// Seconds passed to the most recent update
    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// Submitter for cross-thread work
    ///
    /// Tasks run on the graphics thread at the start of the next
    /// [`RenderPipeline::update`], never mid-frame.
    pub fn deferred_handle(&self) -> DeferredHandle<RenderPipeline> {
        self.deferred.handle()
    }

    /// Advance one frame
    ///
    /// Drains deferred tasks, then runs the scene's update hooks, refreshes
    /// every world matrix, executes the note chain in order, and lets the
    /// scene finish the frame. A pipeline that is [`RenderPipeline::empty`]
    /// skips the tick with a debug log.
    pub fn update(&mut self, delta: f32) -> Result<(), PipelineError> {
        // Frame boundary: work handed over from other threads lands here
        let tasks = self.deferred.collect_pending();
        for task in tasks {
            task(self);
        }

        self.delta = delta;

        if self.empty() {
            if self.log_empty_frames {
                log::debug!("render pipeline is empty, skipping frame");
            }
            return Ok(());
        }

        let Some(scene) = self.scene.as_mut() else {
            return Ok(());
        };

        scene.update(delta, self.device.as_ref());
        scene.update_matrices();

        let mut ctx = RenderContext {
            device: self.device.as_mut(),
            scene: scene.as_mut(),
            delta,
        };
        self.chain.render(&mut ctx);

        scene.end_frame();

        Ok(())
    }

    /// The active scene, lazily defaulted to an empty [`BasicScene`]
    pub fn scene_mut(&mut self) -> &mut dyn Scene {
        let capacity = self.scene_capacity;
        self.scene
            .get_or_insert_with(|| Box::new(BasicScene::with_capacity(capacity)))
            .as_mut()
    }

    /// Install a scene, destroying the outgoing one
    ///
    /// At most one scene is ever live: the previous scene's members are
    /// destroyed before the new scene takes over.
    pub fn set_scene(&mut self, scene: Box<dyn Scene>) {
        if let Some(mut old) = self.scene.replace(scene) {
            old.destroy();
        }
    }

    /// Install and bind a render target
    ///
    /// Binds immediately on the owning thread; other threads submit this
    /// through [`RenderPipeline::deferred_handle`].
    pub fn set_render_target(&mut self, target: Box<dyn RenderTarget>) {
        target.bind(self.device.as_mut());
        self.target = Some(target);
    }

    /// The current render target, if any
    pub fn render_target(&self) -> Option<&dyn RenderTarget> {
        self.target.as_deref()
    }

    /// Reinitialize every stage after a render-target resize
    ///
    /// Calling this with no target installed is a programmer error.
    pub fn resize(&mut self) -> Result<(), PipelineError> {
        let Some(target) = self.target.as_ref() else {
            return Err(PipelineError::MissingRenderTarget);
        };
        let extent = target.extent();
        log::info!("reinitializing render chain for {}x{} target", extent.0, extent.1);
        self.chain.reinit_all(extent);
        Ok(())
    }

    /// Tear the pipeline down: destroy the scene, drop every stage
    pub fn destroy(&mut self) {
        if let Some(mut scene) = self.scene.take() {
            scene.destroy();
        }
        self.chain.clear();
        log::info!("render pipeline destroyed");
    }

    /// The note chain
    pub fn chain(&self) -> &NoteChain {
        &self.chain
    }

    /// Mutable access to the note chain
    pub fn chain_mut(&mut self) -> &mut NoteChain {
        &mut self.chain
    }

    /// Append a stage at the end of the chain
    pub fn append_note(&mut self, note: Box<dyn RenderNote>) -> NoteKey {
        self.chain.append(note)
    }

    /// Splice a stage after an existing one; `None` when the key is stale
    pub fn insert_note_after(
        &mut self,
        note: Box<dyn RenderNote>,
        after: NoteKey,
    ) -> Option<NoteKey> {
        self.chain.insert_after(note, after)
    }

    /// Splice a stage after the one at `index`; `None` when out of range
    pub fn insert_note_at(&mut self, note: Box<dyn RenderNote>, index: usize) -> Option<NoteKey> {
        self.chain.insert_at(note, index)
    }

    /// Remove a stage by key; `None` when the key is stale
    pub fn remove_note(&mut self, key: NoteKey) -> Option<Box<dyn RenderNote>> {
        self.chain.remove(key)
    }

    /// Remove the stage at `index`; `None` when out of range
    pub fn remove_note_at(&mut self, index: usize) -> Option<Box<dyn RenderNote>> {
        self.chain.remove_at(index)
    }

    /// Remove the tail stage
    pub fn shorten(&mut self) -> Option<Box<dyn RenderNote>> {
        self.chain.shorten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Mat4;
    use crate::render::api::MaterialId;
    use crate::scene::SparseScene;
    use crate::testing::{
        mesh, RecordingDevice, RecordingShader, StubRenderable, StubTarget,
    };
    use std::sync::atomic::Ordering;
    use std::thread;

    fn pipeline_with_recorder() -> RenderPipeline {
        RenderPipeline::new(Box::new(RecordingDevice::new()))
    }

    #[test]
    fn test_empty_pipeline_update_is_ok() {
        let mut pipeline = pipeline_with_recorder();
        assert!(pipeline.empty());
        assert!(pipeline.update(0.016).is_ok());
        assert!(pipeline.empty());
    }

    #[test]
    fn test_scene_without_chain_is_still_empty() {
        let mut pipeline = pipeline_with_recorder();
        pipeline.set_scene(Box::new(SparseScene::new()));
        assert!(pipeline.empty());
        assert!(pipeline.update(0.016).is_ok());
    }

    #[test]
    fn test_scene_mut_lazily_defaults() {
        let mut pipeline = pipeline_with_recorder();
        assert!(pipeline.scene_mut().is_empty());
        // A scene now exists; only the chain keeps the pipeline empty
        pipeline.append_note(Box::new(SceneNote::new(
            Box::new(RecordingShader::declaring_all()),
            Mat4::identity(),
        )));
        assert!(!pipeline.empty());
    }

    #[test]
    fn test_set_scene_destroys_outgoing() {
        let mut device = RecordingDevice::new();
        let geometry = device.add_geometry(mesh(1, 0));
        let mut pipeline = RenderPipeline::new(Box::new(device));

        let stub = StubRenderable::new(geometry, MaterialId(0));
        let destroyed = stub.destroyed.clone();
        pipeline.scene_mut().add_renderable(Box::new(stub));

        pipeline.set_scene(Box::new(SparseScene::new()));
        assert!(destroyed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_update_runs_hooks_matrices_and_chain() {
        let mut device = RecordingDevice::new();
        let geometry = device.add_geometry(mesh(1, 0));
        let mut pipeline = RenderPipeline::new(Box::new(device));

        let stub = StubRenderable::new(geometry, MaterialId(0));
        let updates = stub.updates.clone();

        let mut scene = SparseScene::new();
        scene.add_renderable(Box::new(stub));
        pipeline.set_scene(Box::new(scene));
        pipeline.append_note(Box::new(SceneNote::new(
            Box::new(RecordingShader::declaring_all()),
            Mat4::identity(),
        )));

        pipeline.update(0.016).unwrap();
        pipeline.update(0.016).unwrap();

        assert_eq!(updates.load(Ordering::SeqCst), 2);
        assert!((pipeline.delta() - 0.016).abs() < f32::EPSILON);
    }

    #[test]
    fn test_scene_phases_run_in_order() {
        use crate::render::api::{GraphicsDevice, ShaderProgram};
        use crate::scene::{Renderable, RenderableKey};
        use std::sync::{Arc, Mutex};

        struct PhaseScene(Arc<Mutex<Vec<&'static str>>>);

        impl Scene for PhaseScene {
            fn add_renderable(&mut self, _renderable: Box<dyn Renderable>) -> RenderableKey {
                RenderableKey::default()
            }

            fn remove_renderable(&mut self, _key: RenderableKey) -> Option<Box<dyn Renderable>> {
                None
            }

            fn contains(&self, _key: RenderableKey) -> bool {
                false
            }

            fn len(&self) -> usize {
                0
            }

            fn update(&mut self, _delta: f32, _device: &dyn GraphicsDevice) {
                self.0.lock().unwrap().push("update");
            }

            fn update_matrices(&mut self) {
                self.0.lock().unwrap().push("matrices");
            }

            fn render(
                &mut self,
                _device: &mut dyn GraphicsDevice,
                _shader: &mut dyn ShaderProgram,
                _projection: &Mat4,
            ) {
                self.0.lock().unwrap().push("render");
            }

            fn end_frame(&mut self) {
                self.0.lock().unwrap().push("end_frame");
            }

            fn destroy(&mut self) {}
        }

        let mut pipeline = pipeline_with_recorder();
        let phases = Arc::new(Mutex::new(Vec::new()));
        pipeline.set_scene(Box::new(PhaseScene(phases.clone())));
        pipeline.append_note(Box::new(SceneNote::new(
            Box::new(RecordingShader::declaring_all()),
            Mat4::identity(),
        )));

        pipeline.update(0.016).unwrap();

        // The double-buffer flip must come strictly after the chain renders
        assert_eq!(
            *phases.lock().unwrap(),
            vec!["update", "matrices", "render", "end_frame"]
        );
    }

    #[test]
    fn test_resize_without_target_is_an_error() {
        let mut pipeline = pipeline_with_recorder();
        assert!(matches!(
            pipeline.resize(),
            Err(PipelineError::MissingRenderTarget)
        ));
    }

    #[test]
    fn test_resize_reinits_chain_with_target_extent() {
        struct ReinitProbe(std::sync::Arc<std::sync::Mutex<Vec<(u32, u32)>>>);

        impl RenderNote for ReinitProbe {
            fn name(&self) -> &str {
                "reinit-probe"
            }

            fn render(&mut self, _ctx: &mut RenderContext<'_>) {}

            fn reinit(&mut self, extent: (u32, u32)) {
                self.0.lock().unwrap().push(extent);
            }
        }

        let mut pipeline = pipeline_with_recorder();
        pipeline.set_render_target(Box::new(StubTarget(320, 240)));

        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        pipeline.append_note(Box::new(ReinitProbe(seen.clone())));
        pipeline.append_note(Box::new(ReinitProbe(seen.clone())));

        pipeline.resize().unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![(320, 240), (320, 240)]);
    }

    #[test]
    fn test_destroy_leaves_pipeline_empty() {
        let mut device = RecordingDevice::new();
        let geometry = device.add_geometry(mesh(1, 0));
        let mut pipeline = RenderPipeline::new(Box::new(device));

        pipeline
            .scene_mut()
            .add_renderable(Box::new(StubRenderable::new(geometry, MaterialId(0))));
        pipeline.append_note(Box::new(SceneNote::new(
            Box::new(RecordingShader::declaring_all()),
            Mat4::identity(),
        )));

        pipeline.destroy();
        assert!(pipeline.empty());
        assert!(pipeline.chain().is_empty());
    }

    #[test]
    fn test_deferred_add_lands_at_frame_boundary_then_destroy_empties() {
        let mut device = RecordingDevice::new();
        let geometry = device.add_geometry(mesh(1, 0));
        let mut pipeline = RenderPipeline::new(Box::new(device));

        let handle = pipeline.deferred_handle();
        let worker = thread::spawn(move || {
            handle.submit(move |p: &mut RenderPipeline| {
                p.scene_mut()
                    .add_renderable(Box::new(StubRenderable::new(geometry, MaterialId(0))));
            });
        });
        worker.join().unwrap();

        // Nothing lands until the frame boundary
        assert!(pipeline.scene.is_none() || pipeline.scene_mut().is_empty());
        pipeline.update(0.016).unwrap();
        assert_eq!(pipeline.scene_mut().len(), 1);

        pipeline.scene_mut().destroy();
        assert!(pipeline.scene_mut().is_empty());
    }

    #[test]
    fn test_deferred_target_install_from_other_thread() {
        let mut pipeline = pipeline_with_recorder();
        let handle = pipeline.deferred_handle();

        let worker = thread::spawn(move || {
            handle.submit(|p: &mut RenderPipeline| {
                p.set_render_target(Box::new(StubTarget(64, 64)));
            });
        });
        worker.join().unwrap();

        assert!(pipeline.render_target().is_none());
        pipeline.update(0.016).unwrap();
        assert_eq!(pipeline.render_target().map(|t| t.extent()), Some((64, 64)));
    }
}
