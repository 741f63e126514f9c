use super::types::Element;

/// One atom read back from the solver's raw output: water oxygens and
/// hydrogens, plus any atoms of fixed substrates placed alongside them.
///
/// Positions are in ångström, in the frame the geometries were declared in.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub element: Element,
    pub position: [f64; 3],
}

impl Atom {
    pub fn new(element: Element, position: [f64; 3]) -> Self {
        Self { element, position }
    }
}
