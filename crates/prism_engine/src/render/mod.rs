//! # Rendering abstractions
//!
//! This module holds the seam between the engine core and the GPU backend.
//! The core never talks to a graphics API directly; everything it needs is
//! expressed through the narrow traits in [`api`]:
//!
//! - resolve a geometry handle to a mesh (which may not be loaded yet)
//! - bind a vertex buffer, bind an index buffer
//! - set a shader uniform, bind a material
//! - issue a draw call for the currently bound primitives
//!
//! [`transform`] provides the hierarchical matrix state carried by every
//! renderable object.

pub mod api;
pub mod transform;

pub use api::{
    DrawMode, GeometryHandle, GraphicsDevice, IndexBufferId, MaterialId, Mesh, RenderTarget,
    ShaderProgram, VertexBufferId,
};
pub use transform::{Transformable, Transformer};
