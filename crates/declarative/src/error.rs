//! Error types for declaration graph operations

use thiserror::Error;

/// Result type for declaration graph operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building or inspecting a declaration graph
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A declaration or output with this logical name already exists
    #[error("duplicate logical name '{0}'")]
    DuplicateName(String),

    /// Logical name is not a valid Terraform identifier
    #[error("invalid logical name '{0}': must start with a letter or underscore and contain only letters, digits, '_' or '-'")]
    InvalidName(String),

    /// A reference points at a declaration that was not added before
    #[error("'{from}' references '{target}', which has not been declared yet")]
    ForwardReference {
        /// Logical name of the declaration holding the reference
        from: String,
        /// Rendered address of the missing target
        target: String,
    },

    /// A reference names an attribute the target does not expose
    #[error("'{from}' references unknown attribute '{attribute}' of '{target}'")]
    UnknownAttribute {
        /// Logical name of the declaration holding the reference
        from: String,
        /// Rendered address of the target
        target: String,
        /// Attribute that was requested
        attribute: String,
    },

    /// CIDR notation could not be parsed
    #[error("invalid CIDR block '{0}'")]
    InvalidCidr(String),

    /// `cidrsubnet` arguments do not fit the parent block
    #[error("cannot carve subnet {netnum} with {newbits} new bits out of {prefix}")]
    SubnetOutOfRange {
        /// Parent block
        prefix: String,
        /// Additional prefix bits
        newbits: u8,
        /// Subnet index
        netnum: u32,
    },
}
