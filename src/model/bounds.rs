/// Axis-aligned box given by its lower-left and upper-right corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lo: [f64; 3],
    pub hi: [f64; 3],
}

impl Bounds {
    pub fn new(lo: [f64; 3], hi: [f64; 3]) -> Self {
        Self { lo, hi }
    }

    /// Smallest box containing every point, or `None` for an empty iterator.
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = [f64; 3]>,
    {
        points
            .into_iter()
            .map(|p| Bounds::new(p, p))
            .reduce(|acc, b| acc.union(&b))
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        let mut out = *self;
        for k in 0..3 {
            out.lo[k] = out.lo[k].min(other.lo[k]);
            out.hi[k] = out.hi[k].max(other.hi[k]);
        }
        out
    }

    /// Pads the upper corner on every axis, leaving the lower corner alone.
    pub fn expand_upper(&self, margin: f64) -> Bounds {
        let mut out = *self;
        for hi in out.hi.iter_mut() {
            *hi += margin;
        }
        out
    }
}
