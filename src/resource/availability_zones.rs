//! Availability zone lookup

use declarative::{Attributes, Expr, Kind, Resource};

/// Zones reported by the region at apply time
///
/// The zone count is unknown during composition; only references to
/// `names` are ever emitted.
#[derive(Debug, Clone)]
pub struct AvailabilityZones {
    pub state: String,
}

impl Default for AvailabilityZones {
    fn default() -> Self {
        Self {
            state: "available".to_string(),
        }
    }
}

impl Resource for AvailabilityZones {
    fn kind(&self) -> Kind {
        Kind::Data
    }

    fn type_name(&self) -> &str {
        "aws_availability_zones"
    }

    fn attributes(&self) -> Attributes {
        Attributes::from([("state".to_string(), Expr::string(&self.state))])
    }

    fn readable(&self) -> &'static [&'static str] {
        &["id", "names", "zone_ids"]
    }
}
