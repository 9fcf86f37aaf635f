//! Sparse scene batching
//!
//! Rebinding a vertex buffer is expensive; switching the index buffer
//! between draws is not. [`SceneBuilder`] therefore keeps the frame's draw
//! order grouped into maximal contiguous runs of renderables per distinct
//! vertex buffer, so each buffer is bound exactly once per frame.
//!
//! [`SparseScene`] owns the members and two builders: each update pass
//! repopulates the inactive builder, render reads the builder populated on
//! the previous tick, and the roles flip at the end of the frame. A
//! membership change therefore becomes visible one tick later and can never
//! touch the structure a render walk is reading.

use crate::foundation::math::Mat4;
use crate::render::api::{GeometryHandle, GraphicsDevice, ShaderProgram, VertexBufferId};
use crate::scene::{draw_renderable, FrameContext, Renderable, RenderableKey, Scene};
use slotmap::SlotMap;

/// Draw-order partitioning state for one frame
///
/// Three parallel lists: distinct vertex buffers in first-seen order, the
/// renderable keys in draw order, and the partition sizes.
/// `partitions[i]` counts the consecutive entries of `renderables` that
/// share `vertex_buffers[i]`; the lists always satisfy
/// `sum(partitions) == renderables.len()` and
/// `partitions.len() == vertex_buffers.len()`.
#[derive(Default)]
pub struct SceneBuilder {
    vertex_buffers: Vec<VertexBufferId>,
    renderables: Vec<RenderableKey>,
    partitions: Vec<usize>,
}

impl SceneBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a renderable to the draw order
    ///
    /// Unresolved geometry leaves the builder untouched; the renderable is
    /// simply dropped for this frame and re-attempted on the next append
    /// pass. A renderable whose vertex buffer is already tracked is inserted
    /// at the end of that buffer's contiguous run rather than at the tail,
    /// which preserves the one-run-per-buffer invariant under arbitrary
    /// append order.
    pub fn append(
        &mut self,
        key: RenderableKey,
        geometry: GeometryHandle,
        device: &dyn GraphicsDevice,
    ) {
        let Some(mesh) = device.resolve(geometry) else {
            return;
        };
        let buffer = mesh.vertex_buffer;

        match self.vertex_buffers.iter().position(|b| *b == buffer) {
            None => {
                // New buffers always start a new trailing partition
                self.vertex_buffers.push(buffer);
                self.renderables.push(key);
                self.partitions.push(1);
            }
            Some(idx) => {
                self.partitions[idx] += 1;
                // End of this buffer's window; later partitions shift right
                let offset = self.partitions[..=idx].iter().sum::<usize>() - 1;
                self.renderables.insert(offset, key);
            }
        }
    }

    /// Walk the partitions and emit one draw per renderable
    ///
    /// The vertex buffer is bound once at the start of each partition. Keys
    /// that went stale since population, or geometry that unloaded mid-frame,
    /// skip their draw but still advance the partition walk.
    pub fn render(
        &self,
        members: &mut SlotMap<RenderableKey, Box<dyn Renderable>>,
        device: &mut dyn GraphicsDevice,
        shader: &mut dyn ShaderProgram,
        projection: &Mat4,
    ) {
        if self.partitions.is_empty() {
            return;
        }

        let mut partition = 0;
        let mut drawn_in_partition = 0;
        device.bind_vertex_buffer(self.vertex_buffers[0]);

        for &key in &self.renderables {
            if drawn_in_partition == self.partitions[partition] {
                partition += 1;
                if partition >= self.partitions.len() {
                    // Defensive: unreachable while the sum invariant holds
                    return;
                }
                drawn_in_partition = 0;
                device.bind_vertex_buffer(self.vertex_buffers[partition]);
            }

            if let Some(member) = members.get_mut(key) {
                if let Some(mesh) = device.resolve(member.geometry()) {
                    draw_renderable(member.as_mut(), mesh, device, shader, projection);
                }
            }
            drawn_in_partition += 1;
        }
    }

    /// Empty all three lists; called before each population pass
    pub fn clear(&mut self) {
        self.vertex_buffers.clear();
        self.renderables.clear();
        self.partitions.clear();
    }

    /// Tracked vertex buffers in partition order
    pub fn vertex_buffers(&self) -> &[VertexBufferId] {
        &self.vertex_buffers
    }

    /// Renderable keys in draw order
    pub fn renderables(&self) -> &[RenderableKey] {
        &self.renderables
    }

    /// Partition sizes, parallel to [`SceneBuilder::vertex_buffers`]
    pub fn partitions(&self) -> &[usize] {
        &self.partitions
    }

    /// Whether the builder holds no draw order
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }
}

/// Scene that batches draws by shared vertex buffer, double-buffered
///
/// Two [`SceneBuilder`]s alternate roles each tick: `update` clears and
/// repopulates the pending one while the active one remains what render
/// reads. The swap is a single index toggle in `end_frame`, after the note
/// chain has rendered, so a newly added member is first drawn one tick
/// after its population pass.
pub struct SparseScene {
    members: SlotMap<RenderableKey, Box<dyn Renderable>>,
    builders: [SceneBuilder; 2],
    active: usize,
}

impl Default for SparseScene {
    fn default() -> Self {
        Self::new()
    }
}

impl SparseScene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self {
            members: SlotMap::with_key(),
            builders: [SceneBuilder::new(), SceneBuilder::new()],
            active: 0,
        }
    }

    /// Create an empty scene with pre-allocated member capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            members: SlotMap::with_capacity_and_key(capacity),
            ..Self::new()
        }
    }

    /// The builder render currently reads from
    pub fn active_builder(&self) -> &SceneBuilder {
        &self.builders[self.active]
    }

    /// The builder the last update populated, drawn after the next
    /// [`Scene::end_frame`]
    pub fn pending_builder(&self) -> &SceneBuilder {
        &self.builders[1 - self.active]
    }
}

impl Scene for SparseScene {
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

    fn update(&mut self, delta: f32, device: &dyn GraphicsDevice) {
        let inactive = 1 - self.active;
        self.builders[inactive].clear();

        let frame = FrameContext {
            delta,
            members: self.members.len(),
        };
        let keys: Vec<RenderableKey> = self.members.keys().collect();
        for key in keys {
            if let Some(member) = self.members.get_mut(key) {
                member.update(&frame);
                let geometry = member.geometry();
                self.builders[inactive].append(key, geometry, device);
            }
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
        self.builders[self.active].render(&mut self.members, device, shader, projection);
    }

    fn end_frame(&mut self) {
        // The population from this tick's update becomes next tick's draw
        // order
        self.active = 1 - self.active;
    }

    fn destroy(&mut self) {
        let members: Vec<Box<dyn Renderable>> =
            self.members.drain().map(|(_, member)| member).collect();
        log::debug!("destroying sparse scene with {} renderables", members.len());
        for mut member in members {
            member.destroy();
        }
        for builder in &mut self.builders {
            builder.clear();
        }
    }
}
