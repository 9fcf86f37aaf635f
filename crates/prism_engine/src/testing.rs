//! Shared test collaborators
//!
//! Recording implementations of the graphics seams plus a stub renderable,
//! used by the scene and pipeline tests to assert on bind/draw sequences
//! without a GPU.

use crate::foundation::math::Mat4;
use crate::render::api::{
    DrawMode, GeometryHandle, GraphicsDevice, IndexBufferId, MaterialId, Mesh, RenderTarget,
    ShaderProgram, VertexBufferId,
};
use crate::render::transform::{Transformable, Transformer};
use crate::scene::{FrameContext, Renderable};
use slotmap::SlotMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// One recorded GPU call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCall {
    BindVertexBuffer(VertexBufferId),
    BindIndexBuffer(IndexBufferId),
    BindMaterial(MaterialId),
    Draw(DrawMode, u32),
}

/// Call-recording graphics device with in-memory geometry storage
pub struct RecordingDevice {
    geometries: SlotMap<GeometryHandle, Option<Mesh>>,
    calls: Vec<DeviceCall>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self {
            geometries: SlotMap::with_key(),
            calls: Vec::new(),
        }
    }

    /// Register a loaded mesh and get its handle
    pub fn add_geometry(&mut self, mesh: Mesh) -> GeometryHandle {
        self.geometries.insert(Some(mesh))
    }

    /// Register a geometry slot that resolves to nothing (asset still loading)
    pub fn add_pending_geometry(&mut self) -> GeometryHandle {
        self.geometries.insert(None)
    }

    /// Finish loading a previously pending geometry
    pub fn fulfill_geometry(&mut self, handle: GeometryHandle, mesh: Mesh) {
        if let Some(slot) = self.geometries.get_mut(handle) {
            *slot = Some(mesh);
        }
    }

    pub fn calls(&self) -> &[DeviceCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn vertex_binds(&self) -> Vec<VertexBufferId> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DeviceCall::BindVertexBuffer(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn draw_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DeviceCall::Draw(..)))
            .count()
    }
}

impl GraphicsDevice for RecordingDevice {
    fn resolve(&self, geometry: GeometryHandle) -> Option<Mesh> {
        self.geometries.get(geometry).copied().flatten()
    }

    fn bind_vertex_buffer(&mut self, buffer: VertexBufferId) {
        self.calls.push(DeviceCall::BindVertexBuffer(buffer));
    }

    fn bind_index_buffer(&mut self, buffer: IndexBufferId) {
        self.calls.push(DeviceCall::BindIndexBuffer(buffer));
    }

    fn bind_material(&mut self, material: MaterialId, _shader: &mut dyn ShaderProgram) {
        self.calls.push(DeviceCall::BindMaterial(material));
    }

    fn draw(&mut self, mode: DrawMode, index_count: u32) {
        self.calls.push(DeviceCall::Draw(mode, index_count));
    }
}

/// Shader stub that records which uniforms were written
pub struct RecordingShader {
    declared: Option<HashSet<String>>,
    written: Vec<String>,
}

impl RecordingShader {
    /// Shader declaring every uniform
    pub fn declaring_all() -> Self {
        Self {
            declared: None,
            written: Vec::new(),
        }
    }

    /// Shader declaring only the named uniforms
    pub fn declaring(names: &[&str]) -> Self {
        Self {
            declared: Some(names.iter().map(|n| (*n).to_string()).collect()),
            written: Vec::new(),
        }
    }

    pub fn written(&self) -> &[String] {
        &self.written
    }
}

impl ShaderProgram for RecordingShader {
    fn has_uniform(&self, name: &str) -> bool {
        self.declared.as_ref().map_or(true, |set| set.contains(name))
    }

    fn set_uniform_mat4(&mut self, name: &str, _value: &Mat4) {
        self.written.push(name.to_string());
    }
}

/// Fixed-size render target stub
pub struct StubTarget(pub u32, pub u32);

impl RenderTarget for StubTarget {
    fn bind(&self, _device: &mut dyn GraphicsDevice) {}

    fn extent(&self) -> (u32, u32) {
        (self.0, self.1)
    }
}

/// Minimal renderable with observable update/destroy counters
pub struct StubRenderable {
    transformable: Transformable,
    geometry: GeometryHandle,
    material: MaterialId,
    pub updates: Arc<AtomicUsize>,
    pub seen_members: Arc<AtomicUsize>,
    pub destroyed: Arc<AtomicBool>,
}

impl StubRenderable {
    pub fn new(geometry: GeometryHandle, material: MaterialId) -> Self {
        Self {
            transformable: Transformable::new(Transformer::identity()),
            geometry,
            material,
            updates: Arc::new(AtomicUsize::new(0)),
            seen_members: Arc::new(AtomicUsize::new(0)),
            destroyed: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Renderable for StubRenderable {
    fn transformable(&self) -> &Transformable {
        &self.transformable
    }

    fn transformable_mut(&mut self) -> &mut Transformable {
        &mut self.transformable
    }

    fn geometry(&self) -> GeometryHandle {
        self.geometry
    }

    fn material(&self) -> MaterialId {
        self.material
    }

    fn update(&mut self, frame: &FrameContext) {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.seen_members.store(frame.members, Ordering::SeqCst);
    }

    fn destroy(&mut self) {
        self.destroyed.store(true, Ordering::SeqCst);
    }
}

/// Triangle-list mesh with distinct buffer ids for tests
pub fn mesh(vertex_buffer: u32, index_buffer: u32) -> Mesh {
    Mesh {
        vertex_buffer: VertexBufferId(vertex_buffer),
        index_buffer: IndexBufferId(index_buffer),
        index_count: 3,
    }
}
