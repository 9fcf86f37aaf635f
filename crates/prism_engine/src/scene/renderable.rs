//! Renderable capability interface
//!
//! The core never needs an open-ended object model; it needs exactly this:
//! a transform, a geometry reference, a material reference, and two hooks
//! (per-frame update, extra shader state). Concrete game objects implement
//! this trait and are owned by a scene behind a key.

use crate::render::api::{DrawMode, GeometryHandle, MaterialId, ShaderProgram};
use crate::render::transform::Transformable;
use crate::scene::FrameContext;
use slotmap::new_key_type;

new_key_type! {
    /// Stable scene-membership key for a renderable
    pub struct RenderableKey;
}

/// An object with geometry, material, and a transform, eligible to be drawn
///
/// Many renderables of the same model family reference the same underlying
/// vertex buffer through their geometry; that sharing is what the sparse
/// batcher keys on.
pub trait Renderable {
    /// The object's hierarchical transform state
    fn transformable(&self) -> &Transformable;

    /// Mutable access to the transform state, used for the per-tick matrix
    /// refresh
    fn transformable_mut(&mut self) -> &mut Transformable;

    /// Geometry reference, resolved through the device each frame
    fn geometry(&self) -> GeometryHandle;

    /// Material reference bound before each draw
    fn material(&self) -> MaterialId;

    /// Primitive topology to draw with
    fn draw_mode(&self) -> DrawMode {
        DrawMode::Triangles
    }

    /// Per-frame update hook, invoked by the owning scene's `update`
    ///
    /// The hook receives a read-only snapshot of the frame rather than the
    /// scene itself; the scene is mid-iteration over its members while the
    /// hook runs.
    fn update(&mut self, frame: &FrameContext) {
        let _ = frame;
    }

    /// Configure any additional shader state right before the draw call
    fn setup_shader_state(&mut self, shader: &mut dyn ShaderProgram) {
        let _ = shader;
    }

    /// Release hook, invoked when the owning scene is destroyed
    fn destroy(&mut self) {}
}
