//! Lyon-based vector rendering for orbit rings.
//!
//! Shapes are tessellated on the CPU into a flat triangle-list vertex
//! buffer that the host draws on top of the SDF spheres.
//!
//! # Usage
//!
//! ```ignore
//! // In your Game::update():
//! ctx.vectors.stroke_ring(sun_screen, radius - 0.1, radius, VectorColor::WHITE);
//! ```

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use lyon::math::point;
use lyon::path::Path;
use lyon::tessellation::{
    BuffersBuilder, StrokeOptions, StrokeTessellator, StrokeVertex, StrokeVertexConstructor,
    TessellationResult, VertexBuffers,
};

/// Per-vertex data for vector/polygon rendering.
/// 6 floats = 24 bytes per vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct VectorVertex {
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl VectorVertex {
    /// Number of floats per vertex.
    pub const FLOATS: usize = 6;
    /// Stride in bytes.
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4; // 24
}

/// RGBA color for vector drawing operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl VectorColor {
    /// Create a color from RGBA components (0.0 - 1.0).
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create a fully opaque color from RGB components.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color with the given alpha value.
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
}

impl Default for VectorColor {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Vertex constructor for lyon stroke tessellation.
struct StrokeVertexCtor {
    color: VectorColor,
}

impl StrokeVertexConstructor<VectorVertex> for StrokeVertexCtor {
    fn new_vertex(&mut self, vertex: StrokeVertex) -> VectorVertex {
        VectorVertex {
            x: vertex.position().x,
            y: vertex.position().y,
            r: self.color.r,
            g: self.color.g,
            b: self.color.b,
            a: self.color.a,
        }
    }
}

/// State for vector rendering.
///
/// Holds the lyon stroke tessellator and the output vertex buffer.
/// Cleared each frame and populated by drawing commands.
pub struct VectorState {
    stroke_tess: StrokeTessellator,
    geometry: VertexBuffers<VectorVertex, u32>,
    buffer: Vec<f32>,
}

impl VectorState {
    /// Create a new VectorState.
    pub fn new() -> Self {
        Self {
            stroke_tess: StrokeTessellator::new(),
            geometry: VertexBuffers::new(),
            buffer: Vec::with_capacity(16384 * VectorVertex::FLOATS),
        }
    }

    /// Clear the vertex buffer. Called at the start of each frame.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Number of vertices currently in the buffer.
    pub fn vertex_count(&self) -> usize {
        self.buffer.len() / VectorVertex::FLOATS
    }

    /// Raw pointer to the flat float buffer (for SAB copy).
    pub fn buffer_ptr(&self) -> *const f32 {
        self.buffer.as_ptr()
    }

    /// Flush indexed geometry to the flat buffer as triangle list.
    fn flush_geometry(&mut self) {
        for idx in &self.geometry.indices {
            let v = &self.geometry.vertices[*idx as usize];
            self.buffer.extend_from_slice(&[v.x, v.y, v.r, v.g, v.b, v.a]);
        }
        self.geometry.vertices.clear();
        self.geometry.indices.clear();
    }

    /// Tessellate a stroked circle.
    pub fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: VectorColor) {
        if radius <= 0.0 || width <= 0.0 {
            return;
        }

        let mut builder = Path::builder();
        builder.add_circle(point(center.x, center.y), radius, lyon::path::Winding::Positive);
        let path = builder.build();

        self.stroke_path(&path, width, color);
    }

    /// Tessellate a flat annulus between `inner` and `outer` radii.
    ///
    /// Radii may be given in either order; negative radii are mirrored.
    pub fn stroke_ring(&mut self, center: Vec2, inner: f32, outer: f32, color: VectorColor) {
        let (a, b) = (inner.abs(), outer.abs());
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        self.stroke_circle(center, (lo + hi) * 0.5, hi - lo, color);
    }

    /// Tessellate an arbitrary stroked lyon Path.
    pub fn stroke_path(&mut self, path: &Path, width: f32, color: VectorColor) {
        let result = self.stroke_tess.tessellate_path(
            path,
            &StrokeOptions::tolerance(0.25).with_line_width(width),
            &mut BuffersBuilder::new(&mut self.geometry, StrokeVertexCtor { color }),
        );

        self.finish_tessellation(result);
    }

    /// Flush on success. On failure the partial geometry is discarded so it
    /// never leaks into the next shape.
    fn finish_tessellation(&mut self, result: TessellationResult) {
        match result {
            Ok(()) => self.flush_geometry(),
            Err(e) => {
                log::warn!("vector: tessellation failed: {e:?}");
                self.geometry.vertices.clear();
                self.geometry.indices.clear();
            }
        }
    }
}

impl Default for VectorState {
    fn default() -> Self {
        Self::new()
    }
}
