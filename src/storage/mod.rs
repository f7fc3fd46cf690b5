//! Storage layer for Ortomat
//!
//! Provides the JSON-file data store the backup subsystem exports from and
//! restores into: one file per entity kind, integrity checks on every write,
//! and all-or-nothing transactions.

pub mod file_io;
pub mod tables;

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::{RwLock, RwLockWriteGuard};

use tracing::debug;

pub use file_io::{read_json, write_json_atomic};
pub use tables::{FindOptions, OrderBy, SortDirection, Tables};

use crate::config::paths::OrtomatPaths;
use crate::error::{OrtomatError, OrtomatResult};
use crate::models::{str_field, EntityKind, Record};

/// The storage primitives the backup subsystem depends on
pub trait Persistence {
    /// Fetch rows of a kind, optionally ordered and limited
    fn find_all(&self, kind: EntityKind, options: &FindOptions) -> OrtomatResult<Vec<Record>>;

    /// Remove every row of a kind, returning how many were removed
    fn delete_all(&mut self, kind: EntityKind) -> OrtomatResult<usize>;

    /// Insert rows of a kind, returning how many were inserted
    fn create_many(&mut self, kind: EntityKind, records: Vec<Record>) -> OrtomatResult<usize>;
}

/// JSON-file store holding every entity kind
pub struct Store {
    paths: OrtomatPaths,
    tables: RwLock<Tables>,
}

impl Store {
    /// Open the store, loading every table file that exists
    pub fn open(paths: OrtomatPaths) -> OrtomatResult<Self> {
        paths.ensure_directories()?;

        let mut rows = BTreeMap::new();
        for &kind in EntityKind::all() {
            let records: Vec<Record> = read_json(paths.table_file(kind))?;
            if !records.is_empty() {
                rows.insert(kind, records);
            }
        }

        Ok(Self {
            paths,
            tables: RwLock::new(Tables::from_rows(rows)),
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &OrtomatPaths {
        &self.paths
    }

    fn read(&self) -> OrtomatResult<std::sync::RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|e| OrtomatError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    /// Row counts for every kind, in insertion order
    pub fn counts(&self) -> OrtomatResult<Vec<(EntityKind, usize)>> {
        let tables = self.read()?;
        Ok(EntityKind::all()
            .iter()
            .map(|&kind| (kind, tables.count(kind)))
            .collect())
    }

    /// Find an account by email (case-insensitive)
    pub fn find_account_by_email(&self, email: &str) -> OrtomatResult<Option<Record>> {
        let tables = self.read()?;
        Ok(tables
            .rows(EntityKind::Accounts)
            .iter()
            .find(|r| str_field(r, "email").map_or(false, |e| e.eq_ignore_ascii_case(email)))
            .cloned())
    }

    /// Run `f` against a staged copy of every table
    ///
    /// Holds the write lock for the whole call. When `f` succeeds, every
    /// modified table file is staged and then renamed into place and the
    /// staged tables become live; when it fails nothing is written.
    pub fn transaction<T, F>(&self, f: F) -> OrtomatResult<T>
    where
        F: FnOnce(&mut Transaction<'_>) -> OrtomatResult<T>,
    {
        let live = self
            .tables
            .write()
            .map_err(|e| OrtomatError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let staged = live.clone();
        let mut tx = Transaction {
            live,
            staged,
            dirty: BTreeSet::new(),
        };

        match f(&mut tx) {
            Ok(value) => {
                tx.commit(&self.paths)?;
                Ok(value)
            }
            Err(e) => {
                debug!(error = %e, "rolling back transaction");
                Err(e)
            }
        }
    }
}

impl Persistence for Store {
    fn find_all(&self, kind: EntityKind, options: &FindOptions) -> OrtomatResult<Vec<Record>> {
        Ok(self.read()?.find_all(kind, options))
    }

    fn delete_all(&mut self, kind: EntityKind) -> OrtomatResult<usize> {
        self.transaction(|tx| tx.delete_all(kind))
    }

    fn create_many(&mut self, kind: EntityKind, records: Vec<Record>) -> OrtomatResult<usize> {
        self.transaction(|tx| tx.create_many(kind, records))
    }
}

/// A staged set of changes against the store
pub struct Transaction<'a> {
    live: RwLockWriteGuard<'a, Tables>,
    staged: Tables,
    dirty: BTreeSet<EntityKind>,
}

impl Transaction<'_> {
    /// Kinds modified so far
    pub fn modified(&self) -> impl Iterator<Item = EntityKind> + '_ {
        self.dirty.iter().copied()
    }

    fn commit(mut self, paths: &OrtomatPaths) -> OrtomatResult<()> {
        if self.dirty.is_empty() {
            return Ok(());
        }

        let mut staged_files: Vec<(PathBuf, PathBuf)> = Vec::new();
        for &kind in &self.dirty {
            let path = paths.table_file(kind);
            match file_io::stage_json(&path, &self.staged.rows(kind)) {
                Ok(temp_path) => staged_files.push((temp_path, path)),
                Err(e) => {
                    let temps: Vec<PathBuf> =
                        staged_files.into_iter().map(|(temp, _)| temp).collect();
                    file_io::discard_staged(&temps);
                    return Err(e);
                }
            }
        }

        for (temp_path, path) in &staged_files {
            file_io::commit_staged(temp_path, path)?;
        }

        debug!(tables = self.dirty.len(), "committed transaction");
        *self.live = std::mem::take(&mut self.staged);
        Ok(())
    }
}

impl Persistence for Transaction<'_> {
    fn find_all(&self, kind: EntityKind, options: &FindOptions) -> OrtomatResult<Vec<Record>> {
        Ok(self.staged.find_all(kind, options))
    }

    fn delete_all(&mut self, kind: EntityKind) -> OrtomatResult<usize> {
        let removed = self.staged.delete_all(kind)?;
        if removed > 0 {
            self.dirty.insert(kind);
        }
        Ok(removed)
    }

    fn create_many(&mut self, kind: EntityKind, records: Vec<Record>) -> OrtomatResult<usize> {
        let inserted = self.staged.create_many(kind, records)?;
        if inserted > 0 {
            self.dirty.insert(kind);
        }
        Ok(inserted)
    }
}
