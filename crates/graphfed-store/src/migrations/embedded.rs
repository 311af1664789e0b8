//! Embedded SQL migrations, included at compile time

pub struct Migration {
    pub id: &'static str,
    pub sql: &'static str,
}

/// All embedded migrations in order
pub fn get_migrations() -> Vec<Migration> {
    vec![Migration {
        id: "001_node_tree",
        sql: include_str!("../../migrations/001_node_tree.sql"),
    }]
}
