//! Shared handle to the shop database. `SqlitePool` does its own locking,
//! so commands use it concurrently without a mutex here.

use kade_db::Database;

#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
}

impl DbState {
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    pub fn inner(&self) -> &Database {
        &self.db
    }
}
