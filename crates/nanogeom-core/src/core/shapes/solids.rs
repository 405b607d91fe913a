use super::{ShapeError, ShapePredicate, require_positive};
use crate::core::models::axis::Axis;
use crate::core::models::cloud::Aabb;
use nalgebra::{Point3, Vector3};

/// Slack applied to half-space tests so points lying on a face survive rounding
/// in the plane normals.
const PLANE_EPSILON: f64 = 1e-9;

/// Ball of radius `radius` around `center`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Point3<f64>,
    pub radius: f64,
}

impl Sphere {
    pub fn new(center: Point3<f64>, radius: f64) -> Result<Self, ShapeError> {
        require_positive("sphere", "radius", radius)?;
        Ok(Self { center, radius })
    }
}

impl ShapePredicate for Sphere {
    fn contains(&self, p: &Point3<f64>) -> bool {
        (p - self.center).norm_squared() <= self.radius * self.radius
    }

    fn extent(&self) -> Aabb {
        let r = Vector3::repeat(self.radius);
        Aabb::new(self.center - r, self.center + r)
    }
}

/// Solid cylinder centered on the origin with its axis along a Cartesian axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cylinder {
    pub axis: Axis,
    pub radius: f64,
    pub length: f64,
}

impl Cylinder {
    pub fn new(axis: Axis, radius: f64, length: f64) -> Result<Self, ShapeError> {
        require_positive("cylinder", "radius", radius)?;
        if !(length.is_finite() && length >= 0.0) {
            return Err(ShapeError::new(
                "cylinder",
                format!("length must be a non-negative finite number (got {})", length),
            ));
        }
        Ok(Self {
            axis,
            radius,
            length,
        })
    }

    fn radial_squared(&self, p: &Point3<f64>) -> f64 {
        let along = p[self.axis.index()];
        p.coords.norm_squared() - along * along
    }
}

impl ShapePredicate for Cylinder {
    fn contains(&self, p: &Point3<f64>) -> bool {
        let along = p[self.axis.index()];
        along.abs() <= self.length / 2.0 && self.radial_squared(p) <= self.radius * self.radius
    }

    fn extent(&self) -> Aabb {
        let mut half = Vector3::repeat(self.radius);
        half[self.axis.index()] = self.length / 2.0;
        Aabb::new(Point3::origin() - half, Point3::origin() + half)
    }
}

/// Capsule-shaped rod: a cylinder of radius `width / 2` closed by two hemispherical caps,
/// with total tip-to-tip extent `length` along `axis`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rod {
    body: Cylinder,
    caps: [Sphere; 2],
    length: f64,
}

impl Rod {
    pub fn new(axis: Axis, length: f64, width: f64) -> Result<Self, ShapeError> {
        require_positive("rod", "length", length)?;
        require_positive("rod", "width", width)?;
        if width >= length {
            return Err(ShapeError::new(
                "rod",
                format!("width ({}) must be smaller than length ({})", width, length),
            ));
        }
        let radius = width / 2.0;
        let body_length = length - width;
        let cap_offset = axis.unit() * (body_length / 2.0);
        Ok(Self {
            body: Cylinder::new(axis, radius, body_length)?,
            caps: [
                Sphere::new(Point3::origin() + cap_offset, radius)?,
                Sphere::new(Point3::origin() - cap_offset, radius)?,
            ],
            length,
        })
    }

    pub fn axis(&self) -> Axis {
        self.body.axis
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn width(&self) -> f64 {
        self.body.radius * 2.0
    }
}

impl ShapePredicate for Rod {
    fn contains(&self, p: &Point3<f64>) -> bool {
        self.body.contains(p) || self.caps.iter().any(|cap| cap.contains(p))
    }

    fn extent(&self) -> Aabb {
        self.caps[0].extent().union(&self.caps[1].extent())
    }
}

/// Solid cone with its apex on the origin, opening towards `+z` up to `z_max`,
/// where its cross-section has radius `radius`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cone {
    pub radius: f64,
    pub z_max: f64,
}

impl Cone {
    pub fn new(radius: f64, z_max: f64) -> Result<Self, ShapeError> {
        require_positive("cone", "radius", radius)?;
        require_positive("cone", "z_max", z_max)?;
        Ok(Self { radius, z_max })
    }
}

impl ShapePredicate for Cone {
    fn contains(&self, p: &Point3<f64>) -> bool {
        if p.z < 0.0 || p.z > self.z_max {
            return false;
        }
        let limit = self.radius / self.z_max * p.z;
        p.x * p.x + p.y * p.y <= limit * limit
    }

    fn extent(&self) -> Aabb {
        Aabb::new(
            Point3::new(-self.radius, -self.radius, 0.0),
            Point3::new(self.radius, self.radius, self.z_max),
        )
    }
}

/// Region above the elliptic paraboloid `z = a·x² + b·y² + c`, clipped to
/// `z_min ≤ z ≤ z_max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipticParaboloid {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub z_min: f64,
    pub z_max: f64,
}

impl EllipticParaboloid {
    pub fn new(a: f64, b: f64, c: f64, z_min: f64, z_max: f64) -> Result<Self, ShapeError> {
        const SHAPE: &str = "elliptic paraboloid";
        require_positive(SHAPE, "a", a)?;
        require_positive(SHAPE, "b", b)?;
        if !(c.is_finite() && z_min.is_finite() && z_max.is_finite()) {
            return Err(ShapeError::new(SHAPE, "c, z_min and z_max must be finite"));
        }
        if z_max <= z_min || z_max <= c {
            return Err(ShapeError::new(
                SHAPE,
                format!(
                    "z_max ({}) must exceed both z_min ({}) and the vertex height c ({})",
                    z_max, z_min, c
                ),
            ));
        }
        Ok(Self {
            a,
            b,
            c,
            z_min,
            z_max,
        })
    }

    /// Paraboloid tip with its vertex on the origin.
    pub fn tip(a: f64, b: f64, z_max: f64) -> Result<Self, ShapeError> {
        Self::new(a, b, 0.0, 0.0, z_max)
    }

    fn limit(&self, x: f64, y: f64) -> f64 {
        self.a * x * x + self.b * y * y + self.c
    }
}

impl ShapePredicate for EllipticParaboloid {
    fn contains(&self, p: &Point3<f64>) -> bool {
        p.z >= self.z_min && p.z <= self.z_max && p.z >= self.limit(p.x, p.y)
    }

    fn extent(&self) -> Aabb {
        let rise = self.z_max - self.c;
        let half_x = (rise / self.a).sqrt();
        let half_y = (rise / self.b).sqrt();
        Aabb::new(
            Point3::new(-half_x, -half_y, self.z_min.max(self.c)),
            Point3::new(half_x, half_y, self.z_max),
        )
    }
}

/// Square-based pyramid with its base centered on the origin in the `z = 0` plane
/// and its apex at `(0, 0, z_max)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquarePyramid {
    pub side: f64,
    pub z_max: f64,
    faces: [(Vector3<f64>, f64); 4],
    bounds: Aabb,
}

impl SquarePyramid {
    pub fn new(side: f64, z_max: f64) -> Result<Self, ShapeError> {
        require_positive("pyramid", "side", side)?;
        require_positive("pyramid", "z_max", z_max)?;

        let h = side / 2.0;
        let apex = Point3::new(0.0, 0.0, z_max);
        let base = [
            Point3::new(h, h, 0.0),
            Point3::new(-h, h, 0.0),
            Point3::new(-h, -h, 0.0),
            Point3::new(h, -h, 0.0),
        ];
        let interior = Point3::new(0.0, 0.0, z_max / 4.0);

        let faces = std::array::from_fn(|i| {
            let edge_a = base[i] - apex;
            let edge_b = base[(i + 1) % 4] - apex;
            let mut normal = edge_a.cross(&edge_b);
            let mut offset = -normal.dot(&apex.coords);
            if normal.dot(&interior.coords) + offset > 0.0 {
                normal = -normal;
                offset = -offset;
            }
            (normal, offset)
        });

        let bounds = Aabb::from_points(base.iter().chain(std::iter::once(&apex)))
            .unwrap_or_else(|| Aabb::new(apex, apex));

        Ok(Self {
            side,
            z_max,
            faces,
            bounds,
        })
    }
}

impl ShapePredicate for SquarePyramid {
    fn contains(&self, p: &Point3<f64>) -> bool {
        self.bounds.contains(p)
            && self.faces.iter().all(|(normal, offset)| {
                normal.dot(&p.coords) + offset <= PLANE_EPSILON * normal.norm()
            })
    }

    fn extent(&self) -> Aabb {
        self.bounds
    }
}

/// Two square pyramids joined base to base in the `z = 0` plane, with apices at
/// `z = ±length / 2`. The shared base has side `width`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bipyramid {
    half: SquarePyramid,
    pub width: f64,
    pub length: f64,
}

impl Bipyramid {
    pub fn new(width: f64, length: f64) -> Result<Self, ShapeError> {
        require_positive("bipyramid", "width", width)?;
        require_positive("bipyramid", "length", length)?;
        if width >= length {
            return Err(ShapeError::new(
                "bipyramid",
                format!("width ({}) must be smaller than length ({})", width, length),
            ));
        }
        Ok(Self {
            half: SquarePyramid::new(width, length / 2.0)?,
            width,
            length,
        })
    }

    /// Radius of the smallest `z`-aligned cylinder that encloses the bipyramid.
    pub fn circumradius(&self) -> f64 {
        self.width / std::f64::consts::SQRT_2
    }
}

impl ShapePredicate for Bipyramid {
    fn contains(&self, p: &Point3<f64>) -> bool {
        self.half.contains(&Point3::new(p.x, p.y, p.z.abs()))
    }

    fn extent(&self) -> Aabb {
        let w = self.width / 2.0;
        let l = self.length / 2.0;
        Aabb::new(Point3::new(-w, -w, -l), Point3::new(w, w, l))
    }
}

/// The part of `shape` on or below the plane `z = z_cut`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clipped<S> {
    pub shape: S,
    pub z_cut: f64,
}

impl<S: ShapePredicate> Clipped<S> {
    pub fn below(shape: S, z_cut: f64) -> Result<Self, ShapeError> {
        let extent = shape.extent();
        if !(z_cut.is_finite() && z_cut >= extent.min.z) {
            return Err(ShapeError::new(
                "clipped shape",
                format!(
                    "cut plane z = {} leaves nothing of a shape starting at z = {}",
                    z_cut, extent.min.z
                ),
            ));
        }
        Ok(Self { shape, z_cut })
    }
}

impl<S: ShapePredicate> ShapePredicate for Clipped<S> {
    fn contains(&self, p: &Point3<f64>) -> bool {
        p.z <= self.z_cut && self.shape.contains(p)
    }

    fn extent(&self) -> Aabb {
        let mut extent = self.shape.extent();
        extent.max.z = extent.max.z.min(self.z_cut);
        extent
    }
}
