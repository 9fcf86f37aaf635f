//! Plain scene: one full bind per object
//!
//! Every member is drawn with its own vertex-buffer bind. O(n) binds, no
//! ordering guarantees. Use [`crate::scene::SparseScene`] when members share
//! vertex buffers.

use crate::foundation::math::Mat4;
use crate::render::api::{GraphicsDevice, ShaderProgram};
use crate::scene::{draw_renderable, FrameContext, Renderable, RenderableKey, Scene};
use slotmap::SlotMap;

/// Unordered scene with per-object binding
pub struct BasicScene {
    members: SlotMap<RenderableKey, Box<dyn Renderable>>,
}

impl Default for BasicScene {
    fn default() -> Self {
        Self::new()
    }
}

impl BasicScene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self {
            members: SlotMap::with_key(),
        }
    }

    /// Create an empty scene with pre-allocated member capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            members: SlotMap::with_capacity_and_key(capacity),
        }
    }
}

impl Scene for BasicScene {
    fn add_renderable(&mut self, renderable: Box<dyn Renderable>) -> RenderableKey {
        self.members.insert(renderable)
    }

    fn remove_renderable(&mut self, key: RenderableKey) -> Option<Box<dyn Renderable>> {
        self.members.remove(key)
    }

    fn contains(&self, key: RenderableKey) -> bool {
        self.members.contains_key(key)
    }

    fn len(&self) -> usize {
        self.members.len()
    }

    fn update(&mut self, delta: f32, _device: &dyn GraphicsDevice) {
        let frame = FrameContext {
            delta,
            members: self.members.len(),
        };
        for member in self.members.values_mut() {
            member.update(&frame);
        }
    }

    fn update_matrices(&mut self) {
        for member in self.members.values_mut() {
            member.transformable_mut().update_matrices(None);
        }
    }

    fn render(
        &mut self,
        device: &mut dyn GraphicsDevice,
        shader: &mut dyn ShaderProgram,
        projection: &Mat4,
    ) {
        for member in self.members.values_mut() {
            // Not-yet-loaded geometry is skipped for the frame
            let Some(mesh) = device.resolve(member.geometry()) else {
                continue;
            };

            device.bind_vertex_buffer(mesh.vertex_buffer);
            draw_renderable(member.as_mut(), mesh, device, shader, projection);
        }
    }

    fn destroy(&mut self) {
        let members: Vec<Box<dyn Renderable>> =
            self.members.drain().map(|(_, member)| member).collect();
        log::debug!("destroying scene with {} renderables", members.len());
        for mut member in members {
            member.destroy();
        }
    }
}
