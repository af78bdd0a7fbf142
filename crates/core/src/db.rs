// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed storage for lists and items.
//!
//! The same schema serves the client's durable cache and the reference
//! server's authoritative store. [`Database`] deals only in
//! [`ListRecord`]/[`ItemRecord`]; conversion to domain types happens above.

use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

use crate::error::Result;
use crate::record::{ItemRecord, ListRecord};

/// SQL schema for list storage.
pub const SCHEMA: &str = r#"
-- List metadata; item_count is a display cache, not a constraint
CREATE TABLE IF NOT EXISTS lists (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,
    name TEXT NOT NULL,
    description TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    item_count INTEGER NOT NULL DEFAULT 0,
    pinned INTEGER NOT NULL DEFAULT 0,
    ranked INTEGER NOT NULL DEFAULT 0,
    tags TEXT NOT NULL DEFAULT '[]',
    themed_month_date TEXT
);

-- Items; one entry per external ref per list
CREATE TABLE IF NOT EXISTS list_items (
    id TEXT PRIMARY KEY,
    list_id TEXT NOT NULL,
    external_ref INTEGER NOT NULL,
    title TEXT NOT NULL,
    poster_url TEXT,
    backdrop_url TEXT,
    year INTEGER,
    release_date TEXT,
    added_at TEXT NOT NULL,
    sort_order INTEGER NOT NULL CHECK (sort_order > 0),
    UNIQUE (list_id, external_ref),
    FOREIGN KEY (list_id) REFERENCES lists(id) ON DELETE CASCADE
);

-- Watch log (server side)
CREATE TABLE IF NOT EXISTS watched (
    owner_id TEXT NOT NULL,
    external_ref INTEGER NOT NULL,
    watched_at TEXT NOT NULL,
    PRIMARY KEY (owner_id, external_ref)
);

CREATE INDEX IF NOT EXISTS idx_lists_owner ON lists(owner_id);
CREATE INDEX IF NOT EXISTS idx_items_list ON list_items(list_id, sort_order);
"#;

const LIST_COLUMNS: &str = "id, owner_id, name, description, created_at, updated_at,
     item_count, pinned, ranked, tags, themed_month_date";

const ITEM_COLUMNS: &str = "id, list_id, external_ref, title, poster_url, backdrop_url,
     year, release_date, added_at, sort_order";

fn list_from_row(row: &Row<'_>) -> rusqlite::Result<ListRecord> {
    Ok(ListRecord {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
        item_count: row.get(6)?,
        pinned: row.get(7)?,
        ranked: row.get(8)?,
        tags: row.get(9)?,
        themed_month_date: row.get(10)?,
    })
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<ItemRecord> {
    Ok(ItemRecord {
        id: row.get(0)?,
        list_id: row.get(1)?,
        external_ref: row.get(2)?,
        title: row.get(3)?,
        poster_url: row.get(4)?,
        backdrop_url: row.get(5)?,
        year: row.get(6)?,
        release_date: row.get(7)?,
        added_at: row.get(8)?,
        sort_order: row.get(9)?,
    })
}

/// Run schema creation on a database connection.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// SQLite database connection with list storage operations.
pub struct Database {
    /// The underlying SQLite connection.
    pub conn: Connection,
}

impl Database {
    /// Open a database connection at the given path, creating and migrating if needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // Enable foreign keys and WAL mode for concurrency
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;

        let db = Database { conn };
        run_migrations(&db.conn)?;
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let db = Database { conn };
        run_migrations(&db.conn)?;
        Ok(db)
    }

    /// Insert a list, or overwrite every column of an existing one.
    ///
    /// Uses `ON CONFLICT DO UPDATE` rather than `INSERT OR REPLACE`, which
    /// would delete the row and cascade to its items.
    pub fn upsert_list(&self, list: &ListRecord) -> Result<()> {
        upsert_list_on(&self.conn, list)
    }

    /// Get a list by ID.
    pub fn get_list(&self, id: &str) -> Result<Option<ListRecord>> {
        let sql = format!("SELECT {LIST_COLUMNS} FROM lists WHERE id = ?1");
        let list = self
            .conn
            .query_row(&sql, params![id], list_from_row)
            .optional()?;
        Ok(list)
    }

    /// Get every stored list.
    pub fn all_lists(&self) -> Result<Vec<ListRecord>> {
        let sql = format!("SELECT {LIST_COLUMNS} FROM lists ORDER BY created_at");
        let mut stmt = self.conn.prepare(&sql)?;
        let lists = stmt
            .query_map([], list_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(lists)
    }

    /// Get the lists belonging to one owner.
    pub fn lists_for_owner(&self, owner_id: &str) -> Result<Vec<ListRecord>> {
        let sql = format!("SELECT {LIST_COLUMNS} FROM lists WHERE owner_id = ?1 ORDER BY created_at");
        let mut stmt = self.conn.prepare(&sql)?;
        let lists = stmt
            .query_map(params![owner_id], list_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(lists)
    }

    /// Get an owner's lists with `item_count` computed from the items table.
    pub fn lists_summary(&self, owner_id: &str) -> Result<Vec<ListRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT l.id, l.owner_id, l.name, l.description, l.created_at, l.updated_at,
                    (SELECT COUNT(*) FROM list_items i WHERE i.list_id = l.id),
                    l.pinned, l.ranked, l.tags, l.themed_month_date
             FROM lists l WHERE l.owner_id = ?1 ORDER BY l.created_at",
        )?;
        let lists = stmt
            .query_map(params![owner_id], list_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(lists)
    }

    /// Set a list's `updated_at`. Returns false if the list does not exist.
    pub fn set_list_updated_at(&self, id: &str, updated_at: &str) -> Result<bool> {
        let affected = self.conn.execute(
            "UPDATE lists SET updated_at = ?1 WHERE id = ?2",
            params![updated_at, id],
        )?;
        Ok(affected > 0)
    }

    /// Delete a list and its items. Returns false if the list did not exist.
    pub fn delete_list(&self, id: &str) -> Result<bool> {
        // Explicit delete keeps the cascade even if foreign keys are off.
        self.conn
            .execute("DELETE FROM list_items WHERE list_id = ?1", params![id])?;
        let affected = self
            .conn
            .execute("DELETE FROM lists WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    /// Insert an item, or overwrite every column of an existing one.
    pub fn upsert_item(&self, item: &ItemRecord) -> Result<()> {
        upsert_item_on(&self.conn, item)
    }

    /// Get an item by ID.
    pub fn get_item(&self, id: &str) -> Result<Option<ItemRecord>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM list_items WHERE id = ?1");
        let item = self
            .conn
            .query_row(&sql, params![id], item_from_row)
            .optional()?;
        Ok(item)
    }

    /// Find an item by the external ref it points at.
    pub fn find_item_by_ref(&self, list_id: &str, external_ref: i64) -> Result<Option<ItemRecord>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM list_items WHERE list_id = ?1 AND external_ref = ?2"
        );
        let item = self
            .conn
            .query_row(&sql, params![list_id, external_ref], item_from_row)
            .optional()?;
        Ok(item)
    }

    /// Get a list's items in ascending sort order.
    pub fn items_for_list(&self, list_id: &str) -> Result<Vec<ItemRecord>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM list_items WHERE list_id = ?1 ORDER BY sort_order"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let items = stmt
            .query_map(params![list_id], item_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// Get every stored item, grouped by list and in sort order.
    pub fn all_items(&self) -> Result<Vec<ItemRecord>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM list_items ORDER BY list_id, sort_order");
        let mut stmt = self.conn.prepare(&sql)?;
        let items = stmt
            .query_map([], item_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// Get a list's items joined with the owner's watch log.
    pub fn items_with_watched(
        &self,
        list_id: &str,
        owner_id: &str,
    ) -> Result<Vec<(ItemRecord, bool)>> {
        let mut stmt = self.conn.prepare(
            "SELECT i.id, i.list_id, i.external_ref, i.title, i.poster_url, i.backdrop_url,
                    i.year, i.release_date, i.added_at, i.sort_order,
                    w.external_ref IS NOT NULL
             FROM list_items i
             LEFT JOIN watched w ON w.external_ref = i.external_ref AND w.owner_id = ?2
             WHERE i.list_id = ?1
             ORDER BY i.sort_order",
        )?;
        let rows = stmt
            .query_map(params![list_id, owner_id], |row| {
                Ok((item_from_row(row)?, row.get(10)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Count a list's items.
    pub fn count_items(&self, list_id: &str) -> Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM list_items WHERE list_id = ?1",
            params![list_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Highest sort order in a list, or 0 when it is empty.
    pub fn max_sort_order(&self, list_id: &str) -> Result<i64> {
        let max = self.conn.query_row(
            "SELECT COALESCE(MAX(sort_order), 0) FROM list_items WHERE list_id = ?1",
            params![list_id],
            |row| row.get(0),
        )?;
        Ok(max)
    }

    /// Set one item's sort order. Returns false if the item does not exist.
    pub fn set_item_sort_order(&self, id: &str, sort_order: i64) -> Result<bool> {
        let affected = self.conn.execute(
            "UPDATE list_items SET sort_order = ?1 WHERE id = ?2",
            params![sort_order, id],
        )?;
        Ok(affected > 0)
    }

    /// Delete an item. Returns false if it did not exist.
    pub fn delete_item(&self, id: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM list_items WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    /// Replace all stored lists and items in one transaction.
    pub fn replace_all(&mut self, lists: &[ListRecord], items: &[ItemRecord]) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM list_items", [])?;
        tx.execute("DELETE FROM lists", [])?;
        for list in lists {
            upsert_list_on(&tx, list)?;
        }
        for item in items {
            upsert_item_on(&tx, item)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Replace one list's items in one transaction.
    pub fn replace_items(&mut self, list_id: &str, items: &[ItemRecord]) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM list_items WHERE list_id = ?1", params![list_id])?;
        for item in items {
            upsert_item_on(&tx, item)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Record that an owner watched a title.
    pub fn mark_watched(&self, owner_id: &str, external_ref: i64, watched_at: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO watched (owner_id, external_ref, watched_at)
             VALUES (?1, ?2, ?3)",
            params![owner_id, external_ref, watched_at],
        )?;
        Ok(())
    }

    /// Which of `external_refs` the owner has watched.
    pub fn watched_among(&self, owner_id: &str, external_refs: &[i64]) -> Result<Vec<i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT 1 FROM watched WHERE owner_id = ?1 AND external_ref = ?2")?;
        let mut watched = Vec::new();
        for external_ref in external_refs {
            if stmt.exists(params![owner_id, external_ref])? {
                watched.push(*external_ref);
            }
        }
        Ok(watched)
    }
}

fn upsert_list_on(conn: &Connection, list: &ListRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO lists (id, owner_id, name, description, created_at, updated_at,
             item_count, pinned, ranked, tags, themed_month_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
         ON CONFLICT(id) DO UPDATE SET
             owner_id = excluded.owner_id,
             name = excluded.name,
             description = excluded.description,
             created_at = excluded.created_at,
             updated_at = excluded.updated_at,
             item_count = excluded.item_count,
             pinned = excluded.pinned,
             ranked = excluded.ranked,
             tags = excluded.tags,
             themed_month_date = excluded.themed_month_date",
        params![
            list.id,
            list.owner_id,
            list.name,
            list.description,
            list.created_at,
            list.updated_at,
            list.item_count,
            list.pinned,
            list.ranked,
            list.tags,
            list.themed_month_date,
        ],
    )?;
    Ok(())
}

fn upsert_item_on(conn: &Connection, item: &ItemRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO list_items (id, list_id, external_ref, title, poster_url, backdrop_url,
             year, release_date, added_at, sort_order)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
         ON CONFLICT(id) DO UPDATE SET
             list_id = excluded.list_id,
             external_ref = excluded.external_ref,
             title = excluded.title,
             poster_url = excluded.poster_url,
             backdrop_url = excluded.backdrop_url,
             year = excluded.year,
             release_date = excluded.release_date,
             added_at = excluded.added_at,
             sort_order = excluded.sort_order",
        params![
            item.id,
            item.list_id,
            item.external_ref,
            item.title,
            item.poster_url,
            item.backdrop_url,
            item.year,
            item.release_date,
            item.added_at,
            item.sort_order,
        ],
    )?;
    Ok(())
}

#[cfg(test)]
#[path = "db_tests.rs"]
mod tests;
