//! Geometric regions that water molecules are packed into or around.
//!
//! A [`Geometry`] is either a water [`Region`] – one of the [`Shape`]s with
//! a resolved molecule count and placement [`Side`] – or a
//! [`FixedStructure`] placed verbatim at a fixed position and orientation.
//!
//! Construction resolves the shape parameters first, then computes the
//! enclosed volume and the molecule count from it. Geometries are immutable
//! afterwards.

use super::config::GeometryOptions;
use super::density;
use super::error::Error;
use super::script;
use crate::model::{bounds::Bounds, types::Side};
use std::f64::consts::PI;
use std::path::{Path, PathBuf};

/// Cube with its lower-left corner at `origin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cube {
    pub origin: [f64; 3],
    pub length: f64,
}

/// Axis-aligned box between `lo` and `hi`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cuboid {
    pub lo: [f64; 3],
    pub hi: [f64; 3],
}

/// Sphere `(x-x0)² + (y-y0)² + (z-z0)² = r²`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: [f64; 3],
    pub radius: f64,
}

/// Ellipsoid `(x-x0)²/a² + (y-y0)²/b² + (z-z0)²/c² = r²`.
///
/// The effective semi-axes are `a·r`, `b·r` and `c·r`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    pub center: [f64; 3],
    pub semi_axes: [f64; 3],
    pub radius: f64,
}

/// Cylinder of `radius` and `length` along `p = base + t·direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cylinder {
    pub base: [f64; 3],
    pub direction: [f64; 3],
    pub radius: f64,
    pub length: f64,
}

/// Plane `a·x + b·y + c·z = d`, with `normal = [a, b, c]` and `offset = d`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: [f64; 3],
    pub offset: f64,
}

/// External coordinate file placed once at a fixed position.
///
/// Rotations are Euler angles in radians about x, y and z. The file must be
/// in the session's file type.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedStructure {
    pub path: PathBuf,
    pub position: [f64; 3],
    pub rotation: [f64; 3],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Cube(Cube),
    Box(Cuboid),
    Sphere(Sphere),
    Ellipsoid(Ellipsoid),
    Cylinder(Cylinder),
    Plane(Plane),
}

impl Shape {
    /// Keyword of the shape in the solver grammar.
    pub fn label(&self) -> &'static str {
        match self {
            Shape::Cube(_) => "cube",
            Shape::Box(_) => "box",
            Shape::Sphere(_) => "sphere",
            Shape::Ellipsoid(_) => "ellipsoid",
            Shape::Cylinder(_) => "cylinder",
            Shape::Plane(_) => "plane",
        }
    }

    /// Parameters in the order the solver expects after the label.
    pub fn params(&self) -> Vec<f64> {
        match self {
            Shape::Cube(c) => vec![c.origin[0], c.origin[1], c.origin[2], c.length],
            Shape::Box(b) => vec![b.lo[0], b.lo[1], b.lo[2], b.hi[0], b.hi[1], b.hi[2]],
            Shape::Sphere(s) => vec![s.center[0], s.center[1], s.center[2], s.radius],
            Shape::Ellipsoid(e) => vec![
                e.center[0],
                e.center[1],
                e.center[2],
                e.semi_axes[0],
                e.semi_axes[1],
                e.semi_axes[2],
                e.radius,
            ],
            Shape::Cylinder(c) => vec![
                c.base[0],
                c.base[1],
                c.base[2],
                c.direction[0],
                c.direction[1],
                c.direction[2],
                c.radius,
                c.length,
            ],
            Shape::Plane(p) => vec![p.normal[0], p.normal[1], p.normal[2], p.offset],
        }
    }

    /// Enclosed volume in Å³, `None` for unbounded shapes.
    pub fn volume(&self) -> Option<f64> {
        match self {
            Shape::Cube(c) => Some(c.length.powi(3)),
            Shape::Box(b) => Some((0..3).map(|k| b.hi[k] - b.lo[k]).product()),
            Shape::Sphere(s) => Some(4.0 * PI * s.radius.powi(3) / 3.0),
            Shape::Ellipsoid(e) => {
                let [a, b, c] = e.semi_axes;
                Some(4.0 * PI * a * b * c * e.radius.powi(3) / 3.0)
            }
            Shape::Cylinder(c) => Some(PI * c.radius.powi(2) * c.length),
            Shape::Plane(_) => None,
        }
    }

    /// Axis-aligned bounds, `None` where the shape does not expose any.
    pub fn bounds(&self) -> Option<Bounds> {
        match self {
            Shape::Cube(c) => Some(Bounds::new(c.origin, c.origin.map(|v| v + c.length))),
            Shape::Box(b) => Some(Bounds::new(b.lo, b.hi)),
            Shape::Sphere(s) => Some(Bounds::new(
                s.center.map(|v| v - s.radius),
                s.center.map(|v| v + s.radius),
            )),
            Shape::Ellipsoid(e) => {
                let reach = e.semi_axes.map(|a| a * e.radius);
                Some(Bounds::new(
                    [0, 1, 2].map(|k| e.center[k] - reach[k]),
                    [0, 1, 2].map(|k| e.center[k] + reach[k]),
                ))
            }
            Shape::Cylinder(_) | Shape::Plane(_) => None,
        }
    }

    fn validate(&self) -> Result<(), Error> {
        let label = self.label();
        if self.params().iter().any(|v| !v.is_finite()) {
            return Err(Error::invalid_argument(format!(
                "{} parameters must be finite, got {:?}",
                label,
                self.params()
            )));
        }

        let non_negative = |name: &str, value: f64| {
            if value < 0.0 {
                Err(Error::invalid_argument(format!(
                    "{} {} must not be negative, got {}",
                    label, name, value
                )))
            } else {
                Ok(())
            }
        };
        let non_zero = |name: &str, v: [f64; 3]| {
            if v.iter().all(|c| *c == 0.0) {
                Err(Error::invalid_argument(format!(
                    "{} {} must not be the zero vector",
                    label, name
                )))
            } else {
                Ok(())
            }
        };

        match self {
            Shape::Cube(c) => non_negative("side length", c.length),
            Shape::Box(b) => {
                if (0..3).any(|k| b.hi[k] < b.lo[k]) {
                    return Err(Error::invalid_argument(format!(
                        "box upper corner {:?} lies below lower corner {:?}",
                        b.hi, b.lo
                    )));
                }
                Ok(())
            }
            Shape::Sphere(s) => non_negative("radius", s.radius),
            Shape::Ellipsoid(e) => {
                for a in e.semi_axes {
                    non_negative("semi-axis", a)?;
                }
                non_negative("radius", e.radius)
            }
            Shape::Cylinder(c) => {
                non_negative("radius", c.radius)?;
                non_negative("length", c.length)?;
                non_zero("direction", c.direction)
            }
            Shape::Plane(p) => non_zero("normal", p.normal),
        }
    }
}

/// A water-filled (or water-excluding) region with a resolved count.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    shape: Shape,
    number: u64,
    side: Side,
}

impl Region {
    /// Validates `shape`, resolves the side, then the molecule count.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] for malformed shape parameters, an
    ///   unknown side token, a side that does not fit the shape, or a
    ///   density on a shape without volume.
    /// - [`Error::DensityAmbiguity`] when both or neither of `number` and
    ///   `density` are given.
    pub fn new(shape: Shape, options: &GeometryOptions) -> Result<Self, Error> {
        shape.validate()?;
        let side = resolve_side(&shape, options.side.as_deref())?;
        let number = density::resolve_count(
            shape.label(),
            shape.volume(),
            options.number,
            options.density,
        )?;

        Ok(Self {
            shape,
            number,
            side,
        })
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[inline]
    pub fn number(&self) -> u64 {
        self.number
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }
}

fn resolve_side(shape: &Shape, token: Option<&str>) -> Result<Side, Error> {
    let is_plane = matches!(shape, Shape::Plane(_));
    let side = match token {
        Some(token) => token
            .parse::<Side>()
            .map_err(|e| Error::invalid_argument(e.to_string()))?,
        None if is_plane => {
            return Err(Error::invalid_argument(
                "plane requires an explicit side ('over' or 'below')",
            ));
        }
        None => Side::default(),
    };

    if is_plane != side.is_half_space() {
        let expected = if is_plane { "'over' or 'below'" } else { "'in' or 'out'" };
        return Err(Error::invalid_argument(format!(
            "side '{}' does not apply to a {}; expected {}",
            token.unwrap_or_default(),
            shape.label(),
            expected
        )));
    }

    Ok(side)
}

/// One entry of a packing session.
///
/// # Examples
///
/// ```
/// use pack_water::{Geometry, GeometryOptions};
///
/// let cube = Geometry::cube([0.0, 0.0, 0.0], 40.0, &GeometryOptions::number(10_000))?;
/// assert_eq!(cube.number(), 10_000);
/// assert_eq!(cube.label(), "cube");
/// assert_eq!(cube.volume(), Some(64_000.0));
///
/// let ball = Geometry::sphere([20.0, 20.0, 20.0], 5.0, &GeometryOptions::density(0.998))?;
/// assert_eq!(ball.number(), 17);
/// # Ok::<(), pack_water::PackError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Region(Region),
    Fixed(FixedStructure),
}

impl Geometry {
    pub fn cube(origin: [f64; 3], length: f64, options: &GeometryOptions) -> Result<Self, Error> {
        Self::region(Shape::Cube(Cube { origin, length }), options)
    }

    pub fn cuboid(lo: [f64; 3], hi: [f64; 3], options: &GeometryOptions) -> Result<Self, Error> {
        Self::region(Shape::Box(Cuboid { lo, hi }), options)
    }

    pub fn sphere(center: [f64; 3], radius: f64, options: &GeometryOptions) -> Result<Self, Error> {
        Self::region(Shape::Sphere(Sphere { center, radius }), options)
    }

    pub fn ellipsoid(
        center: [f64; 3],
        semi_axes: [f64; 3],
        radius: f64,
        options: &GeometryOptions,
    ) -> Result<Self, Error> {
        Self::region(
            Shape::Ellipsoid(Ellipsoid {
                center,
                semi_axes,
                radius,
            }),
            options,
        )
    }

    pub fn cylinder(
        base: [f64; 3],
        direction: [f64; 3],
        radius: f64,
        length: f64,
        options: &GeometryOptions,
    ) -> Result<Self, Error> {
        Self::region(
            Shape::Cylinder(Cylinder {
                base,
                direction,
                radius,
                length,
            }),
            options,
        )
    }

    pub fn plane(normal: [f64; 3], offset: f64, options: &GeometryOptions) -> Result<Self, Error> {
        Self::region(Shape::Plane(Plane { normal, offset }), options)
    }

    pub fn region(shape: Shape, options: &GeometryOptions) -> Result<Self, Error> {
        Region::new(shape, options).map(Geometry::Region)
    }

    /// Places the structure in `path` once, centered at `position`.
    pub fn fixed(
        path: impl Into<PathBuf>,
        position: [f64; 3],
        rotation: [f64; 3],
    ) -> Result<Self, Error> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(Error::invalid_argument("fixed structure path is empty"));
        }
        if position.iter().chain(rotation.iter()).any(|v| !v.is_finite()) {
            return Err(Error::invalid_argument(format!(
                "fixed structure placement must be finite, got {:?} {:?}",
                position, rotation
            )));
        }
        Ok(Geometry::Fixed(FixedStructure {
            path,
            position,
            rotation,
        }))
    }

    /// Number of molecule copies; a fixed structure always counts once.
    pub fn number(&self) -> u64 {
        match self {
            Geometry::Region(r) => r.number,
            Geometry::Fixed(_) => 1,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Geometry::Region(r) => r.shape.label(),
            Geometry::Fixed(_) => "fixed",
        }
    }

    pub fn params(&self) -> Vec<f64> {
        match self {
            Geometry::Region(r) => r.shape.params(),
            Geometry::Fixed(f) => f.position.iter().chain(f.rotation.iter()).copied().collect(),
        }
    }

    pub fn side(&self) -> Option<Side> {
        match self {
            Geometry::Region(r) => Some(r.side),
            Geometry::Fixed(_) => None,
        }
    }

    pub fn volume(&self) -> Option<f64> {
        match self {
            Geometry::Region(r) => r.shape.volume(),
            Geometry::Fixed(_) => None,
        }
    }

    pub fn bounds(&self) -> Option<Bounds> {
        match self {
            Geometry::Region(r) => r.shape.bounds(),
            Geometry::Fixed(_) => None,
        }
    }

    #[inline]
    pub fn is_fixed(&self) -> bool {
        matches!(self, Geometry::Fixed(_))
    }

    /// Renders the `structure ... end structure` block, with `water` as the
    /// reference structure of regions.
    pub fn instruction(&self, water: &Path) -> String {
        script::instruction(self, water)
    }
}
