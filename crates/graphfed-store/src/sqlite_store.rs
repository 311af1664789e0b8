//! SQLite-backed node store
//!
//! One row per node in `nodes` (parent foreign key with cascading delete),
//! one row per property in `properties` holding a JSON array of values.

use std::path::Path as FsPath;

use graphfed_core::errors::GraphError;
use graphfed_core::model::{Path, PropertyMap, PropertyValue, Segment};
use graphfed_core::ops::NodeStore;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db;
use crate::errors::{from_rusqlite, Result};
use crate::migrations::apply_migrations;

const ROOT_ID: i64 = 1;

pub struct SqliteNodeStore {
    conn: Connection,
}

impl SqliteNodeStore {
    /// Open (or create) a database file and bring its schema up to date
    ///
    /// # Errors
    /// `BackingStore` if the file cannot be opened or migrated
    pub fn open<P: AsRef<FsPath>>(path: P) -> Result<Self> {
        tracing::debug!(path = %path.as_ref().display(), "opening sqlite node store");
        let mut conn = db::open(path)?;
        db::configure(&conn)?;
        apply_migrations(&mut conn)?;
        Ok(Self { conn })
    }

    /// # Errors
    /// `BackingStore` if the schema cannot be created
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = db::open_in_memory()?;
        db::configure(&conn)?;
        apply_migrations(&mut conn)?;
        Ok(Self { conn })
    }

    fn node_id(&self, path: &Path) -> Result<Option<i64>> {
        let mut id = ROOT_ID;
        for segment in path.segments() {
            let child = self
                .conn
                .query_row(
                    "SELECT id FROM nodes WHERE parent_id = ?1 AND segment = ?2",
                    params![id, segment.to_string()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(from_rusqlite)?;
            match child {
                Some(child) => id = child,
                None => return Ok(None),
            }
        }
        Ok(Some(id))
    }

    fn require(&self, path: &Path, op: &str) -> Result<i64> {
        self.node_id(path)?
            .ok_or_else(|| GraphError::store(op, format!("no node at {}", path)))
    }
}

fn encode(values: &[PropertyValue]) -> Result<String> {
    Ok(serde_json::to_string(values)?)
}

fn decode(json: &str) -> Result<Vec<PropertyValue>> {
    Ok(serde_json::from_str(json)?)
}

impl NodeStore for SqliteNodeStore {
    fn kind(&self) -> &'static str {
        "sqlite"
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.node_id(path)?.is_some())
    }

    fn properties(&self, path: &Path) -> Result<PropertyMap> {
        let id = self.require(path, "properties")?;
        let mut stmt = self
            .conn
            .prepare("SELECT name, value_json FROM properties WHERE node_id = ?1")
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([id], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
            .map_err(from_rusqlite)?;

        let mut properties = PropertyMap::new();
        for row in rows {
            let (name, json) = row.map_err(from_rusqlite)?;
            properties.insert(name, decode(&json)?);
        }
        Ok(properties)
    }

    fn property(&self, path: &Path, name: &str) -> Result<Option<Vec<PropertyValue>>> {
        let id = self.require(path, "property")?;
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT value_json FROM properties WHERE node_id = ?1 AND name = ?2",
                params![id, name],
                |row| row.get(0),
            )
            .optional()
            .map_err(from_rusqlite)?;
        json.as_deref().map(decode).transpose()
    }

    fn put_property(&mut self, path: &Path, name: &str, values: Vec<PropertyValue>) -> Result<()> {
        let id = self.require(path, "put_property")?;
        self.conn
            .execute(
                "INSERT INTO properties (node_id, name, value_json) VALUES (?1, ?2, ?3)
                 ON CONFLICT(node_id, name) DO UPDATE SET value_json = excluded.value_json",
                params![id, name, encode(&values)?],
            )
            .map_err(from_rusqlite)?;
        Ok(())
    }

    fn remove_property(&mut self, path: &Path, name: &str) -> Result<()> {
        let id = self.require(path, "remove_property")?;
        self.conn
            .execute(
                "DELETE FROM properties WHERE node_id = ?1 AND name = ?2",
                params![id, name],
            )
            .map_err(from_rusqlite)?;
        Ok(())
    }

    fn replace_properties(&mut self, path: &Path, properties: PropertyMap) -> Result<()> {
        let id = self.require(path, "replace_properties")?;
        let tx = self.conn.transaction().map_err(from_rusqlite)?;
        tx.execute("DELETE FROM properties WHERE node_id = ?1", [id])
            .map_err(from_rusqlite)?;
        for (name, values) in &properties {
            tx.execute(
                "INSERT INTO properties (node_id, name, value_json) VALUES (?1, ?2, ?3)",
                params![id, name, encode(values)?],
            )
            .map_err(from_rusqlite)?;
        }
        tx.commit().map_err(from_rusqlite)
    }

    fn child_segments(&self, path: &Path) -> Result<Vec<Segment>> {
        let id = self.require(path, "child_segments")?;
        let mut stmt = self
            .conn
            .prepare("SELECT segment FROM nodes WHERE parent_id = ?1")
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([id], |row| row.get::<_, String>(0))
            .map_err(from_rusqlite)?;

        let mut segments = Vec::new();
        for row in rows {
            segments.push(row.map_err(from_rusqlite)?.parse()?);
        }
        Ok(segments)
    }

    fn add_child(&mut self, parent: &Path, segment: &Segment) -> Result<()> {
        let parent_id = self.require(parent, "add_child")?;
        self.conn
            .execute(
                "INSERT INTO nodes (parent_id, segment) VALUES (?1, ?2)",
                params![parent_id, segment.to_string()],
            )
            .map_err(from_rusqlite)?;
        Ok(())
    }

    fn remove_child(&mut self, parent: &Path, segment: &Segment) -> Result<()> {
        let id = self.require(&parent.child(segment.clone()), "remove_child")?;
        self.conn
            .execute("DELETE FROM nodes WHERE id = ?1", [id])
            .map_err(from_rusqlite)?;
        Ok(())
    }

    fn move_node(&mut self, path: &Path, new_parent: &Path) -> Result<()> {
        if path.is_root() {
            return Err(GraphError::store("move_node", "the root cannot be moved"));
        }
        let id = self.require(path, "move_node")?;
        let parent_id = self.require(new_parent, "move_node")?;
        self.conn
            .execute(
                "UPDATE nodes SET parent_id = ?1 WHERE id = ?2",
                params![parent_id, id],
            )
            .map_err(from_rusqlite)?;
        Ok(())
    }

    fn ping(&self) -> Result<()> {
        self.conn
            .query_row("SELECT 1", [], |_| Ok(()))
            .map_err(from_rusqlite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> Path {
        s.parse().unwrap()
    }

    #[test]
    fn test_fresh_store_has_only_root() {
        let store = SqliteNodeStore::open_in_memory().unwrap();
        assert!(store.exists(&Path::root()).unwrap());
        assert!(store.child_segments(&Path::root()).unwrap().is_empty());
        store.ping().unwrap();
    }

    #[test]
    fn test_indexed_segments_round_trip() {
        let mut store = SqliteNodeStore::open_in_memory().unwrap();
        store
            .add_child(&Path::root(), &Segment::with_index("x", 2))
            .unwrap();
        assert!(store.exists(&path("/x[2]")).unwrap());
        assert!(!store.exists(&path("/x")).unwrap());
        assert_eq!(
            store.child_segments(&Path::root()).unwrap(),
            vec![Segment::with_index("x", 2)]
        );
    }

    #[test]
    fn test_duplicate_child_rejected() {
        let mut store = SqliteNodeStore::open_in_memory().unwrap();
        store.add_child(&Path::root(), &Segment::new("a")).unwrap();
        assert!(store.add_child(&Path::root(), &Segment::new("a")).is_err());
    }

    #[test]
    fn test_remove_cascades_to_subtree() {
        let mut store = SqliteNodeStore::open_in_memory().unwrap();
        store.add_child(&Path::root(), &Segment::new("a")).unwrap();
        store.add_child(&path("/a"), &Segment::new("b")).unwrap();
        store
            .put_property(&path("/a/b"), "k", vec![PropertyValue::from("v")])
            .unwrap();

        store.remove_child(&Path::root(), &Segment::new("a")).unwrap();

        assert!(!store.exists(&path("/a/b")).unwrap());
        let orphans: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM properties", [], |row| row.get(0))
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[test]
    fn test_move_root_rejected() {
        let mut store = SqliteNodeStore::open_in_memory().unwrap();
        assert!(store.move_node(&Path::root(), &Path::root()).is_err());
    }
}
