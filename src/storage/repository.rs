//! SQLite repository for listable resources

use std::marker::PhantomData;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{params_from_iter, Connection};
use tracing::{debug, info};

use super::init::InitGuard;
use super::mapper::{scan, Clock, SystemClock};
use super::query::compose;
use super::resource::Resource;
use super::schema::create_table;
use super::seed::seed;
use crate::error::{ListingError, ListingResult};
use crate::types::ListFilter;

/// Repository for one resource type
///
/// The connection is shared by all calls; request paths only read from it.
pub struct Repository<R: Resource> {
    conn: Mutex<Connection>,
    init: InitGuard,
    clock: Arc<dyn Clock>,
    seed_rows: u32,
    /// Seeder executions, for checking the once-only guarantee.
    seed_runs: AtomicUsize,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Repository<R> {
    /// Open a repository file, creating the table if needed
    pub fn open(db_path: &Path, seed_rows: u32) -> anyhow::Result<Self> {
        use anyhow::Context;

        // Create parent directories if needed
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for {}", db_path.display()))?;
        }

        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open {} database", R::PLURAL))?;
        info!(resource = R::PLURAL, path = %db_path.display(), "store opened");

        Ok(Self::from_connection(conn, seed_rows)?)
    }

    /// Create an in-memory repository (for testing)
    #[cfg(test)]
    pub fn in_memory(seed_rows: u32) -> ListingResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| ListingError::store("open in-memory store", e))?;
        Self::from_connection(conn, seed_rows)
    }

    /// Wrap an open connection, creating the table if needed
    pub fn from_connection(conn: Connection, seed_rows: u32) -> ListingResult<Self> {
        create_table(&conn, &R::SHAPE)
            .map_err(|e| ListingError::store(format!("create {} table", R::SHAPE.table), e))?;

        Ok(Self {
            conn: Mutex::new(conn),
            init: InitGuard::new(),
            clock: Arc::new(SystemClock),
            seed_rows,
            seed_runs: AtomicUsize::new(0),
            _resource: PhantomData,
        })
    }

    /// Replace the clock used to derive status
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Seed the store; only the first call does any work
    ///
    /// Concurrent callers wait for the first attempt and share its outcome.
    pub fn initialize(&self) -> ListingResult<()> {
        self.init.run(|| {
            let run = self.seed_runs.fetch_add(1, Ordering::SeqCst) + 1;
            let mut conn = self.lock()?;
            let written = seed::<R>(&mut conn, self.seed_rows, self.clock.now())?;
            info!(resource = R::PLURAL, written, run, "store seeded");
            Ok(())
        })
    }

    // ==================== Query Operations ====================

    /// List records matching `filter`, in result-set order
    pub fn list(&self, filter: Option<&ListFilter>) -> ListingResult<Vec<R>> {
        let (query, args) = compose(&R::SHAPE.select(), &R::SHAPE, filter)?;
        debug!(resource = R::PLURAL, %query, args = args.len(), "list");

        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&query)
            .map_err(|e| ListingError::store(format!("prepare {} list", R::PLURAL), e))?;
        let mut rows = stmt
            .query(params_from_iter(args))
            .map_err(|e| ListingError::store(format!("query {}", R::PLURAL), e))?;

        let mut records = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|e| ListingError::store(format!("read {} row", R::SINGULAR), e))?
        {
            records.push(scan::<R>(row, self.clock.now())?);
        }

        Ok(records)
    }

    /// Fetch one record by its id
    ///
    /// The id arrives as text; an empty or non-integer id is rejected before
    /// the store is touched. An unknown id yields `Ok(None)`.
    pub fn fetch_by_id(&self, id: &str) -> ListingResult<Option<R>> {
        let id = parse_id(id)?;
        let query = format!("{} WHERE id = ?1", R::SHAPE.select());

        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&query)
            .map_err(|e| ListingError::store(format!("prepare {} fetch", R::SINGULAR), e))?;
        let mut rows = stmt
            .query([id])
            .map_err(|e| ListingError::store(format!("fetch {} {}", R::SINGULAR, id), e))?;

        match rows
            .next()
            .map_err(|e| ListingError::store(format!("read {} row", R::SINGULAR), e))?
        {
            Some(row) => Ok(Some(scan::<R>(row, self.clock.now())?)),
            None => Ok(None),
        }
    }

    #[cfg(test)]
    fn seed_runs(&self) -> usize {
        self.seed_runs.load(Ordering::SeqCst)
    }

    fn lock(&self) -> ListingResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ListingError::Internal(format!("Failed to lock {} store: {}", R::PLURAL, e)))
    }
}

fn parse_id(id: &str) -> ListingResult<i64> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(ListingError::InvalidArgument("no id was provided".to_string()));
    }
    trimmed
        .parse::<i64>()
        .map_err(|_| ListingError::InvalidArgument(format!("id `{}` is not an integer", trimmed)))
}
