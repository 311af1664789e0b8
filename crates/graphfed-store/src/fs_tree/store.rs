use std::fs;
use std::io::ErrorKind;
use std::path::{Path as FsPath, PathBuf};

use graphfed_core::errors::GraphError;
use graphfed_core::model::{Path, PropertyMap, PropertyValue, Segment};
use graphfed_core::ops::NodeStore;

use super::atomic::atomic_write;
use super::naming::{decode_segment, encode_segment};
use crate::errors::{io_error, Result};

/// Sidecar file holding a node's properties
pub const PROPERTIES_FILE: &str = ".graphfed-props.json";

/// Node store over a directory tree
#[derive(Debug, Clone)]
pub struct FsNodeStore {
    root: PathBuf,
}

impl FsNodeStore {
    /// Use `root` as the root node, creating the directory if needed
    ///
    /// # Errors
    /// `BackingStore` if the directory cannot be created
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| io_error("create_root", e))?;
        tracing::debug!(root = %root.display(), "opened filesystem node store");
        Ok(Self { root })
    }

    pub fn root_dir(&self) -> &FsPath {
        &self.root
    }

    fn dir_of(&self, path: &Path) -> PathBuf {
        let mut dir = self.root.clone();
        for segment in path.segments() {
            dir.push(encode_segment(segment));
        }
        dir
    }

    fn require(&self, path: &Path, op: &str) -> Result<PathBuf> {
        let dir = self.dir_of(path);
        if dir.is_dir() {
            Ok(dir)
        } else {
            Err(GraphError::store(op, format!("no node at {}", path)))
        }
    }

    fn read_properties(dir: &FsPath) -> Result<PropertyMap> {
        match fs::read(dir.join(PROPERTIES_FILE)) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(PropertyMap::new()),
            Err(e) => Err(io_error("read_props", e)),
        }
    }

    fn write_properties(dir: &FsPath, properties: &PropertyMap) -> Result<()> {
        let file = dir.join(PROPERTIES_FILE);
        if properties.is_empty() {
            return match fs::remove_file(&file) {
                Err(e) if e.kind() != ErrorKind::NotFound => Err(io_error("remove_props", e)),
                _ => Ok(()),
            };
        }
        let json = serde_json::to_vec_pretty(properties)?;
        atomic_write(&file, &json)
    }
}

impl NodeStore for FsNodeStore {
    fn kind(&self) -> &'static str {
        "filesystem"
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.dir_of(path).is_dir())
    }

    fn properties(&self, path: &Path) -> Result<PropertyMap> {
        let dir = self.require(path, "properties")?;
        Self::read_properties(&dir)
    }

    fn put_property(&mut self, path: &Path, name: &str, values: Vec<PropertyValue>) -> Result<()> {
        let dir = self.require(path, "put_property")?;
        let mut properties = Self::read_properties(&dir)?;
        properties.insert(name.to_string(), values);
        Self::write_properties(&dir, &properties)
    }

    fn remove_property(&mut self, path: &Path, name: &str) -> Result<()> {
        let dir = self.require(path, "remove_property")?;
        let mut properties = Self::read_properties(&dir)?;
        if properties.remove(name).is_none() {
            return Ok(());
        }
        Self::write_properties(&dir, &properties)
    }

    fn replace_properties(&mut self, path: &Path, properties: PropertyMap) -> Result<()> {
        let dir = self.require(path, "replace_properties")?;
        Self::write_properties(&dir, &properties)
    }

    fn child_segments(&self, path: &Path) -> Result<Vec<Segment>> {
        let dir = self.require(path, "child_segments")?;
        let mut segments = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| io_error("list_children", e))? {
            let entry = entry.map_err(|e| io_error("list_children", e))?;
            let is_dir = entry
                .file_type()
                .map_err(|e| io_error("list_children", e))?
                .is_dir();
            if !is_dir {
                continue;
            }
            segments.push(decode_segment(&entry.file_name().to_string_lossy())?);
        }
        Ok(segments)
    }

    fn add_child(&mut self, parent: &Path, segment: &Segment) -> Result<()> {
        let dir = self.require(parent, "add_child")?;
        fs::create_dir(dir.join(encode_segment(segment))).map_err(|e| io_error("add_child", e))
    }

    fn remove_child(&mut self, parent: &Path, segment: &Segment) -> Result<()> {
        let dir = self.require(&parent.child(segment.clone()), "remove_child")?;
        fs::remove_dir_all(dir).map_err(|e| io_error("remove_child", e))
    }

    fn move_node(&mut self, path: &Path, new_parent: &Path) -> Result<()> {
        let segment = path
            .last_segment()
            .ok_or_else(|| GraphError::store("move_node", "the root cannot be moved"))?;
        let from = self.require(path, "move_node")?;
        let to = self
            .require(new_parent, "move_node")?
            .join(encode_segment(segment));
        if to.exists() {
            return Err(GraphError::store(
                "move_node",
                format!("{} already has a child {}", new_parent, segment),
            ));
        }
        fs::rename(from, to).map_err(|e| io_error("move_node", e))
    }
}
