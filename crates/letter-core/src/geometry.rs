//! Glyph extrusion: outline → flattened contours → beveled solid mesh.
//!
//! Contours are normalized so the solid always lies to the left of the travel
//! direction (outer contours counter-clockwise, holes clockwise). With that
//! orientation the right-hand edge normal points away from the material, which
//! gives both the bevel expansion direction and the outward wall normal.
//! Caps are triangulated with lyon using the non-zero fill rule.

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec2, Vec3};
use lyon::math::point;
use lyon::path::Path;
use lyon::tessellation::{BuffersBuilder, FillOptions, FillTessellator, FillVertex, VertexBuffers};
use smallvec::SmallVec;

use crate::config::BevelProfile;
use crate::error::GeometryError;
use crate::typeface::OutlineCmd;

/// GPU vertex layout shared with the web renderer.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Axis-aligned bounding box. An empty box has `min > max`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Aabb {
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    #[inline]
    pub fn include(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Aabb::new(self.min.min(other.min), self.max.max(other.max))
    }

    pub fn translated(&self, offset: Vec3) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        Aabb::new(self.min + offset, self.max + offset)
    }

    /// Bounds of this box after an affine transform.
    pub fn transformed(&self, m: &Mat4) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        let mut out = Aabb::EMPTY;
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            out.include(m.transform_point3(corner));
        }
        out
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }

    /// Largest of width, height and depth.
    #[inline]
    pub fn max_dim(&self) -> f32 {
        self.size().max_element()
    }
}

/// CPU-side triangle mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn bounds(&self) -> Aabb {
        let mut b = Aabb::EMPTY;
        for p in &self.positions {
            b.include(Vec3::from_array(*p));
        }
        b
    }

    pub fn interleaved(&self) -> Vec<Vertex> {
        self.positions
            .iter()
            .zip(&self.normals)
            .map(|(p, n)| Vertex {
                position: *p,
                normal: *n,
            })
            .collect()
    }

    #[inline]
    fn push(&mut self, p: Vec3, n: Vec3) -> u32 {
        let i = self.positions.len() as u32;
        self.positions.push(p.to_array());
        self.normals.push(n.to_array());
        i
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExtrudeSettings {
    pub depth: f32,
    pub bevel: BevelProfile,
    pub curve_segments: u32,
}

type Contour = Vec<Vec2>;

/// Flatten outline commands into closed polygons, one per sub-path.
///
/// Each curve is split into `curve_segments` straight pieces. The closing
/// point is not repeated and degenerate contours (under 3 points) are dropped.
pub fn flatten_outline(cmds: &[OutlineCmd], curve_segments: u32) -> Vec<Contour> {
    let segs = curve_segments.max(1);
    let mut contours = Vec::new();
    let mut current: Contour = Vec::new();
    let mut pen = Vec2::ZERO;

    let close_contour = |c: &mut Contour, out: &mut Vec<Contour>| {
        let mut c = std::mem::take(c);
        c.dedup_by(|a, b| a.distance_squared(*b) < 1e-12);
        while c.len() > 1 && c[0].distance_squared(c[c.len() - 1]) < 1e-12 {
            c.pop();
        }
        if c.len() >= 3 {
            out.push(c);
        }
    };

    for cmd in cmds {
        match *cmd {
            OutlineCmd::MoveTo(p) => {
                close_contour(&mut current, &mut contours);
                current.push(p);
                pen = p;
            }
            OutlineCmd::LineTo(p) => {
                current.push(p);
                pen = p;
            }
            OutlineCmd::QuadTo { ctrl, to } => {
                for i in 1..=segs {
                    let t = i as f32 / segs as f32;
                    let mt = 1.0 - t;
                    current.push(pen * (mt * mt) + ctrl * (2.0 * mt * t) + to * (t * t));
                }
                pen = to;
            }
            OutlineCmd::CubicTo { ctrl1, ctrl2, to } => {
                for i in 1..=segs {
                    let t = i as f32 / segs as f32;
                    let mt = 1.0 - t;
                    current.push(
                        pen * (mt * mt * mt)
                            + ctrl1 * (3.0 * mt * mt * t)
                            + ctrl2 * (3.0 * mt * t * t)
                            + to * (t * t * t),
                    );
                }
                pen = to;
            }
            OutlineCmd::Close => close_contour(&mut current, &mut contours),
        }
    }
    close_contour(&mut current, &mut contours);
    contours
}

/// Shoelace signed area; positive for counter-clockwise contours.
pub fn signed_area(contour: &[Vec2]) -> f32 {
    let n = contour.len();
    let mut twice = 0.0;
    for i in 0..n {
        let a = contour[i];
        let b = contour[(i + 1) % n];
        twice += a.x * b.y - b.x * a.y;
    }
    twice * 0.5
}

fn point_in_polygon(p: Vec2, poly: &[Vec2]) -> bool {
    let mut inside = false;
    let n = poly.len();
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (poly[i], poly[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Orient outer contours counter-clockwise and holes clockwise.
pub fn normalize_orientation(contours: &mut [Contour]) {
    let holes: Vec<bool> = (0..contours.len())
        .map(|i| {
            let sample = contours[i][0];
            let depth = contours
                .iter()
                .enumerate()
                .filter(|(j, other)| *j != i && point_in_polygon(sample, other))
                .count();
            depth % 2 == 1
        })
        .collect();
    for (c, hole) in contours.iter_mut().zip(holes) {
        let ccw = signed_area(c) > 0.0;
        if ccw == hole {
            c.reverse();
        }
    }
}

/// Right-hand unit normal of an edge direction.
#[inline]
fn right_normal(d: Vec2) -> Vec2 {
    Vec2::new(d.y, -d.x).normalize_or_zero()
}

/// Per-vertex offset direction scaled so that moving by `amount` along it
/// displaces both adjacent edges by `amount`.
fn bevel_vectors(contour: &[Vec2]) -> Vec<Vec2> {
    let n = contour.len();
    (0..n)
        .map(|i| {
            let prev = contour[(i + n - 1) % n];
            let cur = contour[i];
            let next = contour[(i + 1) % n];
            let n0 = right_normal(cur - prev);
            let n1 = right_normal(next - cur);
            let miter = (n0 + n1).normalize_or_zero();
            if miter == Vec2::ZERO {
                return n0;
            }
            miter / miter.dot(n0).max(0.25)
        })
        .collect()
}

/// One ring of the extruded side surface: outline offset by `amount` at height `z`.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Ring {
    z: f32,
    amount: f32,
}

fn rings(settings: &ExtrudeSettings) -> SmallVec<[Ring; 16]> {
    let bevel = settings.bevel;
    let mut out = SmallVec::new();
    let beveled = bevel.segments > 0 && (bevel.thickness > 0.0 || bevel.size > 0.0);
    if !beveled {
        out.push(Ring {
            z: 0.0,
            amount: bevel.offset,
        });
        out.push(Ring {
            z: settings.depth,
            amount: bevel.offset,
        });
        return out;
    }
    let segs = bevel.segments;
    let layer = |b: u32| {
        let t = b as f32 / segs as f32;
        let z = bevel.thickness * (t * FRAC_PI_2).cos();
        let amount = bevel.size * (t * FRAC_PI_2).sin() + bevel.offset;
        (z, amount)
    };
    for b in 0..=segs {
        let (z, amount) = layer(b);
        out.push(Ring { z: -z, amount });
    }
    for b in (0..=segs).rev() {
        let (z, amount) = layer(b);
        out.push(Ring {
            z: settings.depth + z,
            amount,
        });
    }
    out
}

fn offset_contour(contour: &[Vec2], dirs: &[Vec2], amount: f32) -> Contour {
    contour
        .iter()
        .zip(dirs)
        .map(|(p, d)| *p + *d * amount)
        .collect()
}

fn tessellate_cap(contours: &[Contour], glyph: char) -> Result<VertexBuffers<[f32; 2], u32>, GeometryError> {
    let mut builder = Path::builder();
    for c in contours {
        builder.begin(point(c[0].x, c[0].y));
        for p in &c[1..] {
            builder.line_to(point(p.x, p.y));
        }
        builder.end(true);
    }
    let path = builder.build();

    let mut buffers: VertexBuffers<[f32; 2], u32> = VertexBuffers::new();
    FillTessellator::new()
        .tessellate_path(
            &path,
            &FillOptions::non_zero(),
            &mut BuffersBuilder::new(&mut buffers, |v: FillVertex| v.position().to_array()),
        )
        .map_err(|e| GeometryError::Tessellation {
            glyph,
            reason: format!("{:?}", e),
        })?;
    Ok(buffers)
}

fn push_cap(mesh: &mut MeshData, cap: &VertexBuffers<[f32; 2], u32>, z: f32, front: bool) {
    let normal = if front { Vec3::Z } else { Vec3::NEG_Z };
    let base = mesh.positions.len() as u32;
    for v in &cap.vertices {
        mesh.push(Vec3::new(v[0], v[1], z), normal);
    }
    for tri in cap.indices.chunks_exact(3) {
        if front {
            mesh.indices.extend([base + tri[0], base + tri[1], base + tri[2]]);
        } else {
            mesh.indices.extend([base + tri[0], base + tri[2], base + tri[1]]);
        }
    }
}

/// Extrude already-flattened contours into a closed, beveled solid.
pub fn extrude_contours(
    mut contours: Vec<Contour>,
    settings: &ExtrudeSettings,
    glyph: char,
) -> Result<MeshData, GeometryError> {
    let mut mesh = MeshData::default();
    if contours.is_empty() {
        return Ok(mesh);
    }
    normalize_orientation(&mut contours);
    let dirs: Vec<Vec<Vec2>> = contours.iter().map(|c| bevel_vectors(c)).collect();
    let rings = rings(settings);

    // Caps use the innermost outline (first and last ring).
    let (back, front) = (rings[0], rings[rings.len() - 1]);
    let cap_outline: Vec<Contour> = contours
        .iter()
        .zip(&dirs)
        .map(|(c, d)| offset_contour(c, d, back.amount))
        .collect();
    let cap = tessellate_cap(&cap_outline, glyph)?;
    push_cap(&mut mesh, &cap, back.z, false);
    push_cap(&mut mesh, &cap, front.z, true);

    for (contour, dir) in contours.iter().zip(&dirs) {
        let n = contour.len();
        let layers: Vec<Vec<Vec3>> = rings
            .iter()
            .map(|r| {
                offset_contour(contour, dir, r.amount)
                    .into_iter()
                    .map(|p| p.extend(r.z))
                    .collect()
            })
            .collect();
        for pair in layers.windows(2) {
            let (lo, hi) = (&pair[0], &pair[1]);
            for j in 0..n {
                let k = (j + 1) % n;
                let (a, b, c, d) = (lo[j], lo[k], hi[k], hi[j]);
                let normal = (c - a).cross(d - b).normalize_or_zero();
                if normal == Vec3::ZERO {
                    continue;
                }
                let ia = mesh.push(a, normal);
                let ib = mesh.push(b, normal);
                let ic = mesh.push(c, normal);
                let id = mesh.push(d, normal);
                mesh.indices.extend([ia, ib, ic, ia, ic, id]);
            }
        }
    }
    Ok(mesh)
}

/// Flatten and extrude a glyph outline.
pub fn extrude_glyph(
    outline: &[OutlineCmd],
    settings: &ExtrudeSettings,
    glyph: char,
) -> Result<MeshData, GeometryError> {
    extrude_contours(flatten_outline(outline, settings.curve_segments), settings, glyph)
}

/// Flat rectangle in the XZ plane, facing +Y, centered on `center`.
pub fn ground_quad(center: Vec3, half_extent: f32) -> MeshData {
    let mut mesh = MeshData::default();
    let h = half_extent;
    let corners = [
        Vec3::new(-h, 0.0, -h),
        Vec3::new(h, 0.0, -h),
        Vec3::new(h, 0.0, h),
        Vec3::new(-h, 0.0, h),
    ];
    for c in corners {
        mesh.push(center + c, Vec3::Y);
    }
    mesh.indices.extend([0, 2, 1, 0, 3, 2]);
    mesh
}
