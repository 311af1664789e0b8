pub mod cache_policy;
pub mod location;
pub mod path;
pub mod property;

pub use cache_policy::CachePolicy;
pub use location::{Location, NodeId};
pub use path::{validate_name, Path, Segment};
pub use property::{
    Property, PropertyMap, PropertyValue, CHILD_LIST_PROPERTY, IDENTITY_PROPERTY,
};
