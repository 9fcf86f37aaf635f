//! Render stages
//!
//! A render note is one stage of the per-frame pipeline (a lighting pass, a
//! post-process, a scene draw). Collaborators implement [`RenderNote`] and
//! insert their stages into the chain at runtime.

use crate::foundation::math::{Mat4, Mat4Ext};
use crate::render::api::{GraphicsDevice, ShaderProgram};
use crate::scene::Scene;

/// Per-frame state handed to each stage in chain order
pub struct RenderContext<'a> {
    /// GPU device seam, owned by the pipeline
    pub device: &'a mut dyn GraphicsDevice,
    /// The pipeline's active scene, matrices already updated for this tick
    pub scene: &'a mut dyn Scene,
    /// Seconds since the previous frame
    pub delta: f32,
}

/// One stage in the ordered per-frame render pipeline
///
/// Stages execute once per frame in chain order. They may be inserted,
/// removed, and reordered at runtime; after a render-target resize the
/// whole chain is reinitialized via [`RenderNote::reinit`].
pub trait RenderNote {
    /// Stage name used in timing logs
    fn name(&self) -> &str;

    /// Perform this stage's per-frame work
    fn render(&mut self, ctx: &mut RenderContext<'_>);

    /// Reallocate screen-space resources after a render-target resize
    fn reinit(&mut self, extent: (u32, u32)) {
        let _ = extent;
    }
}

/// Perspective parameters kept so a resize can rebuild the projection
#[derive(Debug, Clone, Copy)]
struct Perspective {
    fov_y: f32,
    near: f32,
    far: f32,
}

/// The stage that draws the pipeline's scene
///
/// Owns the shader the scene is drawn with and the projection matrix. The
/// draw ordering itself is the scene's business; this note just asks the
/// scene to emit its draw calls with the already-updated matrices.
pub struct SceneNote {
    shader: Box<dyn ShaderProgram>,
    projection: Mat4,
    perspective: Option<Perspective>,
}

impl SceneNote {
    /// Create with a fixed projection matrix
    ///
    /// The projection is left untouched on resize; use
    /// [`SceneNote::with_perspective`] when it should track the aspect
    /// ratio.
    pub fn new(shader: Box<dyn ShaderProgram>, projection: Mat4) -> Self {
        Self {
            shader,
            projection,
            perspective: None,
        }
    }

    /// Create with a perspective projection recomputed on every resize
    pub fn with_perspective(
        shader: Box<dyn ShaderProgram>,
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            shader,
            projection: Mat4::perspective(fov_y, aspect, near, far),
            perspective: Some(Perspective { fov_y, near, far }),
        }
    }

    /// Current projection matrix
    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }
}

impl RenderNote for SceneNote {
    fn name(&self) -> &str {
        "scene"
    }

    fn render(&mut self, ctx: &mut RenderContext<'_>) {
        ctx.scene
            .render(ctx.device, self.shader.as_mut(), &self.projection);
    }

    fn reinit(&mut self, extent: (u32, u32)) {
        if let Some(p) = self.perspective {
            let (width, height) = extent;
            if height > 0 {
                let aspect = width as f32 / height as f32;
                self.projection = Mat4::perspective(p.fov_y, aspect, p.near, p.far);
            }
        }
    }
}
