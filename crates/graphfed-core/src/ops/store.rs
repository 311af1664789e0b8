use crate::errors::Result;
use crate::model::{Path, PropertyMap, PropertyValue, Segment};

/// Primitive, path-addressed operations a backing store must provide
///
/// Stores are deliberately weak: children come back in no particular order,
/// there is no rename and no same-name disambiguation. The engine builds
/// ordering, SNS indices and identity on top of these primitives.
///
/// Every method addressing a node that does not exist fails with
/// `BackingStore`; resolving missing paths into `PathNotFound` is the
/// engine's job.
pub trait NodeStore {
    /// Short name of the store kind, used in log events
    fn kind(&self) -> &'static str;

    fn exists(&self, path: &Path) -> Result<bool>;

    /// All stored properties of a node, reserved ones included
    fn properties(&self, path: &Path) -> Result<PropertyMap>;

    fn property(&self, path: &Path, name: &str) -> Result<Option<Vec<PropertyValue>>> {
        Ok(self.properties(path)?.remove(name))
    }

    fn put_property(&mut self, path: &Path, name: &str, values: Vec<PropertyValue>) -> Result<()>;

    /// Remove a property; removing an absent property is a no-op
    fn remove_property(&mut self, path: &Path, name: &str) -> Result<()>;

    /// Replace every property of a node with `properties`
    fn replace_properties(&mut self, path: &Path, properties: PropertyMap) -> Result<()>;

    /// Segments of the actual children, in no guaranteed order
    fn child_segments(&self, path: &Path) -> Result<Vec<Segment>>;

    /// Add an empty child; fails if a child with that exact segment exists
    fn add_child(&mut self, parent: &Path, segment: &Segment) -> Result<()>;

    /// Remove a child together with its whole subtree
    fn remove_child(&mut self, parent: &Path, segment: &Segment) -> Result<()>;

    /// Re-parent a node under `new_parent`, keeping its segment
    fn move_node(&mut self, path: &Path, new_parent: &Path) -> Result<()>;

    /// Cheap liveness probe
    fn ping(&self) -> Result<()> {
        self.exists(&Path::root()).map(|_| ())
    }
}
