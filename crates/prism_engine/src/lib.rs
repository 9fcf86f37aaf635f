//! # Prism Engine
//!
//! A render pipeline and scene composition core. It owns the ordered chain
//! of per-frame render stages, the scene of drawable objects, and the
//! batching structure that groups draws by shared vertex buffer to minimize
//! GPU state changes.
//!
//! ## Features
//!
//! - **Render note chain**: mutable ordered sequence of render stages with
//!   runtime insert/remove/reorder and bulk reinitialization on resize
//! - **Sparse scene batching**: renderables grouped into contiguous draw
//!   partitions per distinct vertex buffer, one rebind per partition
//! - **Double-buffered scenes**: render-time reads never race same-frame
//!   population writes
//! - **Hierarchical transforms**: parent/child matrix composition with both
//!   object-to-world and world-to-object ordering
//! - **Graphics-thread confinement**: a deferred task queue drained at frame
//!   boundaries instead of locks
//!
//! The GPU itself is out of scope: geometry resolution, buffer binds, draws,
//! and shader uniforms are consumed through the narrow traits in
//! [`render::api`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use prism_engine::prelude::*;
//!
//! # struct MyDevice;
//! # impl GraphicsDevice for MyDevice {
//! #     fn resolve(&self, _: GeometryHandle) -> Option<Mesh> { None }
//! #     fn bind_vertex_buffer(&mut self, _: VertexBufferId) {}
//! #     fn bind_index_buffer(&mut self, _: IndexBufferId) {}
//! #     fn bind_material(&mut self, _: MaterialId, _: &mut dyn ShaderProgram) {}
//! #     fn draw(&mut self, _: DrawMode, _: u32) {}
//! # }
//! # struct MyShader;
//! # impl ShaderProgram for MyShader {
//! #     fn has_uniform(&self, _: &str) -> bool { true }
//! #     fn set_uniform_mat4(&mut self, _: &str, _: &Mat4) {}
//! # }
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     prism_engine::foundation::logging::init();
//!
//!     let mut pipeline = RenderPipeline::new(Box::new(MyDevice));
//!     pipeline.set_scene(Box::new(SparseScene::new()));
//!
//!     let projection = Mat4::identity();
//!     pipeline.append_note(Box::new(SceneNote::new(Box::new(MyShader), projection)));
//!
//!     loop {
//!         pipeline.update(1.0 / 60.0)?;
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod executor;
pub mod foundation;
pub mod pipeline;
pub mod render;
pub mod scene;
pub mod settings;

#[cfg(test)]
pub(crate) mod testing;

pub use pipeline::{PipelineError, RenderPipeline};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        executor::{DeferredHandle, GraphicsContext, GraphicsHandle},
        foundation::math::{Mat4, Mat4Ext, Quat, Vec3},
        pipeline::{NoteChain, NoteKey, PipelineError, RenderContext, RenderNote, RenderPipeline, SceneNote},
        render::{
            api::{
                DrawMode, GeometryHandle, GraphicsDevice, IndexBufferId, MaterialId, Mesh,
                RenderTarget, ShaderProgram, VertexBufferId,
            },
            transform::{Transformable, Transformer},
        },
        scene::{BasicScene, FrameContext, Renderable, RenderableKey, Scene, SparseScene},
        settings::{EngineSettings, PipelineSettings, SceneSettings},
    };
}
