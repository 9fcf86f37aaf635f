//! Hierarchical transform state
//!
//! A [`Transformer`] produces local translation/rotation/scale matrices from
//! position, orientation, and scale. A [`Transformable`] holds the four
//! world-space matrices of an object and recomputes them once per tick by
//! composing the transformer's local matrices with a parent's already
//! updated matrices.
//!
//! Ordering is a documented precondition, not enforced here: a parent's
//! matrices must have been updated earlier in the same tick than any child
//! that composes with them.

use crate::foundation::math::{Mat4, Quat, Vec3};

/// Local transform source: position, orientation, and scale
#[derive(Debug, Clone, PartialEq)]
pub struct Transformer {
    /// Position in parent space
    pub position: Vec3,
    /// Orientation in parent space
    pub rotation: Quat,
    /// Per-axis scale factors
    pub scale: Vec3,
}

impl Default for Transformer {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transformer {
    /// Create an identity transformer
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transformer with only a position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Local translation matrix
    pub fn translation_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
    }

    /// Local rotation matrix
    pub fn rotation_matrix(&self) -> Mat4 {
        self.rotation.to_homogeneous()
    }

    /// Local scale matrix
    pub fn scale_matrix(&self) -> Mat4 {
        Mat4::new_nonuniform_scaling(&self.scale)
    }
}

/// Per-object hierarchical matrix state
///
/// Holds the world-space translation, rotation, scale, and combined world
/// matrices, recomputed once per tick via [`Transformable::update_matrices`]
/// or [`Transformable::update_matrices_inverse`]. The two are distinct
/// operations: callers pick one based on whether they need object-to-world
/// or world-to-object composition order.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformable {
    translation: Mat4,
    rotation: Mat4,
    scale: Mat4,
    world: Mat4,
    transformer: Transformer,
}

impl Default for Transformable {
    fn default() -> Self {
        Self::new(Transformer::identity())
    }
}

impl Transformable {
    /// Create from a transformer; matrices start at identity until the first
    /// update
    pub fn new(transformer: Transformer) -> Self {
        Self {
            translation: Mat4::identity(),
            rotation: Mat4::identity(),
            scale: Mat4::identity(),
            world: Mat4::identity(),
            transformer,
        }
    }

    /// Copy another transformable's current matrices and transformer state
    pub fn snapshot(other: &Self) -> Self {
        other.clone()
    }

    /// Recompute world matrices with object-to-world composition
    ///
    /// Each world matrix is the parent's corresponding matrix left-applied
    /// to the local one (`parent * local`), or the local matrix alone when
    /// `parent` is `None`. The combined world matrix is
    /// `translation * (rotation * scale)`.
    pub fn update_matrices(&mut self, parent: Option<&Transformable>) {
        let (t, r, s) = self.local_matrices();

        match parent {
            Some(p) => {
                self.translation = p.translation * t;
                self.rotation = p.rotation * r;
                self.scale = p.scale * s;
            }
            None => {
                self.translation = t;
                self.rotation = r;
                self.scale = s;
            }
        }

        self.world = self.translation * (self.rotation * self.scale);
    }

    /// Recompute world matrices with world-to-object composition
    ///
    /// The reverse of [`Transformable::update_matrices`]: each world matrix
    /// is `local * parent`, and the combined world matrix is
    /// `scale * rotation * translation`. Used where the inverse order is
    /// semantically required, e.g. camera-space transforms.
    pub fn update_matrices_inverse(&mut self, parent: Option<&Transformable>) {
        let (t, r, s) = self.local_matrices();

        match parent {
            Some(p) => {
                self.translation = t * p.translation;
                self.rotation = r * p.rotation;
                self.scale = s * p.scale;
            }
            None => {
                self.translation = t;
                self.rotation = r;
                self.scale = s;
            }
        }

        self.world = self.scale * (self.rotation * self.translation);
    }

    fn local_matrices(&self) -> (Mat4, Mat4, Mat4) {
        (
            self.transformer.translation_matrix(),
            self.transformer.rotation_matrix(),
            self.transformer.scale_matrix(),
        )
    }

    /// World translation matrix as of the last update
    pub fn translation_matrix(&self) -> &Mat4 {
        &self.translation
    }

    /// World rotation matrix as of the last update
    pub fn rotation_matrix(&self) -> &Mat4 {
        &self.rotation
    }

    /// World scale matrix as of the last update
    pub fn scale_matrix(&self) -> &Mat4 {
        &self.scale
    }

    /// Combined world matrix as of the last update
    pub fn world_matrix(&self) -> &Mat4 {
        &self.world
    }

    /// Access the owned transformer
    pub fn transformer(&self) -> &Transformer {
        &self.transformer
    }

    /// Mutably access the owned transformer
    ///
    /// Changes take effect at the next matrix update.
    pub fn transformer_mut(&mut self) -> &mut Transformer {
        &mut self.transformer
    }
}
