//! Scene management system
//!
//! A scene owns the set of currently drawable objects and drives their
//! per-frame update, matrix refresh, and draw submission.
//!
//! ## Architecture
//!
//! ```text
//! RenderPipeline
//!      ↓ update / update_matrices / render / end_frame
//! Scene (BasicScene | SparseScene)
//!      ↓ bind / uniform / draw
//! GraphicsDevice + ShaderProgram (backend seams)
//! ```
//!
//! [`BasicScene`] draws members one by one with a full bind per object.
//! [`SparseScene`] routes draw ordering through a [`SceneBuilder`] that
//! groups renderables into contiguous partitions per shared vertex buffer,
//! rebinding the vertex buffer once per partition, and double-buffers the
//! builder across frames so render-time reads never race same-frame
//! population writes.

mod basic;
mod renderable;
mod sparse;

pub use basic::BasicScene;
pub use renderable::{Renderable, RenderableKey};
pub use sparse::{SceneBuilder, SparseScene};

use crate::foundation::math::Mat4;
use crate::render::api::{self, GraphicsDevice, Mesh, ShaderProgram};

/// Read-only frame snapshot handed to each member's update hook
///
/// Members run their hooks while the owning scene is mid-iteration, so the
/// hook cannot borrow the scene itself; it gets this snapshot instead.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    /// Seconds elapsed since the previous update
    pub delta: f32,
    /// Member count of the owning scene at the start of the pass
    pub members: usize,
}

/// The set of drawable objects for a frame
///
/// Membership is keyed: adding hands back a [`RenderableKey`], and removal
/// or lookup with a stale key is a harmless no-op (set semantics). All
/// methods must run on the graphics thread.
pub trait Scene {
    /// Add a renderable; returns its membership key
    fn add_renderable(&mut self, renderable: Box<dyn Renderable>) -> RenderableKey;

    /// Remove a renderable by key; `None` when the key is stale
    fn remove_renderable(&mut self, key: RenderableKey) -> Option<Box<dyn Renderable>>;

    /// Whether the key currently names a member
    fn contains(&self, key: RenderableKey) -> bool;

    /// Number of members
    fn len(&self) -> usize;

    /// Whether the scene has no members
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run each member's per-frame update hook
    ///
    /// Sparse scenes also repopulate their inactive draw-order builder here;
    /// it becomes visible to render only after [`Scene::end_frame`].
    fn update(&mut self, delta: f32, device: &dyn GraphicsDevice);

    /// Recompute every member's world matrices
    ///
    /// Members are treated as root-level: no parenting across renderables
    /// inside a scene.
    fn update_matrices(&mut self);

    /// Emit draw calls for the scene's members
    fn render(
        &mut self,
        device: &mut dyn GraphicsDevice,
        shader: &mut dyn ShaderProgram,
        projection: &Mat4,
    );

    /// End-of-frame hook, invoked after the note chain has rendered
    ///
    /// Sparse scenes flip their double buffer here, so the draw order
    /// populated by this tick's `update` is first drawn on the next tick.
    /// Default is a no-op.
    fn end_frame(&mut self) {}

    /// Destroy every member and empty the scene
    ///
    /// Snapshot-then-destroy: members are drained first, then destroyed one
    /// by one, so the operation cannot observe mid-iteration mutation.
    fn destroy(&mut self);
}

/// Issue the per-renderable draw sequence shared by both scene variants
///
/// Binds the mesh's index buffer, offers the five well-known matrix
/// uniforms (each written only if the shader declares it), binds the
/// material, lets the renderable configure extra shader state, and draws.
/// The vertex buffer must already be bound by the caller.
pub(crate) fn draw_renderable(
    renderable: &mut dyn Renderable,
    mesh: Mesh,
    device: &mut dyn GraphicsDevice,
    shader: &mut dyn ShaderProgram,
    projection: &Mat4,
) {
    device.bind_index_buffer(mesh.index_buffer);

    let (mvp, world, rotation, scale, translation) = {
        let t = renderable.transformable();
        (
            projection * t.world_matrix(),
            *t.world_matrix(),
            *t.rotation_matrix(),
            *t.scale_matrix(),
            *t.translation_matrix(),
        )
    };

    api::set_mat4_if_declared(shader, api::uniforms::MVP_MATRIX, &mvp);
    api::set_mat4_if_declared(shader, api::uniforms::WORLD_MATRIX, &world);
    api::set_mat4_if_declared(shader, api::uniforms::ROTATION_MATRIX, &rotation);
    api::set_mat4_if_declared(shader, api::uniforms::SCALE_MATRIX, &scale);
    api::set_mat4_if_declared(shader, api::uniforms::TRANSLATION_MATRIX, &translation);

    device.bind_material(renderable.material(), shader);
    renderable.setup_shader_state(shader);
    device.draw(renderable.draw_mode(), mesh.index_count);
}
