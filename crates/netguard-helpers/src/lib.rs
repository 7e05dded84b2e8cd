//! Helper registry.
//!
//! Helpers are pure functions over config nodes and literals, resolved by name: flat names
//! (`hasChildCommand`) live in the common namespace, qualified names (`cisco.isTrunkPort`) in a
//! vendor namespace. A registry is an immutable value; build it once with
//! [`HelperRegistryBuilder`] and share it behind an `Arc`.

#![forbid(unsafe_code)]

mod builtin;
mod error;
mod registry;
mod value;

pub use builtin::{BUILTIN_HELPERS, builtin};
pub use error::HelperError;
pub use registry::{
    HelperFn, HelperRegistry, HelperRegistryBuilder, SharedRegistry, VENDOR_NAMESPACES,
};
pub use value::{ArgReader, HelperArg, HelperValue};
