//! Randomized list projection

use declarative::{Attributes, Expr, Kind, Resource};

/// Permutation of a list, chosen by the engine when the resource is created
///
/// Not seeded: replacing the resource may pick a different order, so
/// anything placed via `result` can move between applies.
#[derive(Debug, Clone)]
pub struct Shuffle {
    pub input: Expr,
}

impl Resource for Shuffle {
    fn kind(&self) -> Kind {
        Kind::Resource
    }

    fn type_name(&self) -> &str {
        "random_shuffle"
    }

    fn attributes(&self) -> Attributes {
        Attributes::from([("input".to_string(), self.input.clone())])
    }

    fn readable(&self) -> &'static [&'static str] {
        &["id", "result"]
    }
}
