//! Graphics backend interface
//!
//! Narrow collaborator traits consumed by the scene and pipeline code. A
//! backend implements these over its own GPU resource management; the core
//! only ever binds buffers, sets uniforms, and draws.

use crate::foundation::math::Mat4;
use slotmap::new_key_type;

new_key_type! {
    /// Stable handle into the backend's geometry storage
    ///
    /// Resolution can fail while an asset is still loading; see
    /// [`GraphicsDevice::resolve`].
    pub struct GeometryHandle;
}

/// Identifier of a GPU vertex buffer
///
/// Renderables sharing a vertex buffer are batched into one draw partition,
/// so equality of this id is what the sparse batcher keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexBufferId(pub u32);

/// Identifier of a GPU index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexBufferId(pub u32);

/// Identifier of a material known to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u32);

/// Primitive topology for a draw call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    /// Point list
    Points,
    /// Line list
    Lines,
    /// Triangle list
    Triangles,
    /// Triangle strip
    TriangleStrip,
}

/// Resolved geometry: the buffers a renderable draws with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mesh {
    /// Vertex buffer shared by every renderable of the same model family
    pub vertex_buffer: VertexBufferId,
    /// Index buffer specific to this mesh
    pub index_buffer: IndexBufferId,
    /// Number of indices to draw
    pub index_count: u32,
}

/// GPU device seam
///
/// All methods must be called from the graphics thread; cross-thread callers
/// go through the deferred queue (see [`crate::executor`]).
pub trait GraphicsDevice {
    /// Resolve a geometry handle to its mesh
    ///
    /// Returns `None` while the asset behind the handle has not finished
    /// loading. Callers skip the renderable for the frame and retry on the
    /// next one.
    fn resolve(&self, geometry: GeometryHandle) -> Option<Mesh>;

    /// Bind a vertex buffer for subsequent draws
    fn bind_vertex_buffer(&mut self, buffer: VertexBufferId);

    /// Bind an index buffer for subsequent draws
    fn bind_index_buffer(&mut self, buffer: IndexBufferId);

    /// Bind a material's textures and parameters into the given shader
    fn bind_material(&mut self, material: MaterialId, shader: &mut dyn ShaderProgram);

    /// Draw the currently bound primitives
    fn draw(&mut self, mode: DrawMode, index_count: u32);
}

/// Shader program seam
///
/// Shaders may declare any subset of the well-known uniforms; presence is
/// checked by name before every set.
pub trait ShaderProgram {
    /// Whether the program declares a uniform with this name
    fn has_uniform(&self, name: &str) -> bool;

    /// Write a 4x4 matrix uniform
    fn set_uniform_mat4(&mut self, name: &str, value: &Mat4);
}

/// Render target seam: viewport plus framebuffer binding
pub trait RenderTarget: Send {
    /// Bind the target's framebuffer and viewport
    fn bind(&self, device: &mut dyn GraphicsDevice);

    /// Current target size in pixels (width, height)
    fn extent(&self) -> (u32, u32);
}

/// Well-known matrix uniform names
///
/// Every scene draw offers these five to the shader; each is written only if
/// the shader declares it.
pub mod uniforms {
    /// Projection composed with the world matrix
    pub const MVP_MATRIX: &str = "mvpMatrix";
    /// Full world matrix
    pub const WORLD_MATRIX: &str = "worldMatrix";
    /// World-rotation component
    pub const ROTATION_MATRIX: &str = "rotationMatrix";
    /// World-scale component
    pub const SCALE_MATRIX: &str = "scaleMatrix";
    /// World-translation component
    pub const TRANSLATION_MATRIX: &str = "translationMatrix";
}

/// Set a matrix uniform only when the shader declares it
pub fn set_mat4_if_declared(shader: &mut dyn ShaderProgram, name: &str, value: &Mat4) {
    if shader.has_uniform(name) {
        shader.set_uniform_mat4(name, value);
    }
}
