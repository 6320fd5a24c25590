//! Resource services: the request/response boundary the gateway talks to.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::ListingResult;
use crate::storage::{Repository, Resource};
use crate::types::{FetchRequest, FetchResponse, ListRequest, ListResponse, Race, Sport};

/// Pass-through adapter from request messages to a repository.
pub struct ResourceService<R: Resource> {
    repo: Arc<Repository<R>>,
}

pub type RacingService = ResourceService<Race>;
pub type SportingService = ResourceService<Sport>;

impl<R: Resource> ResourceService<R> {
    pub fn new(repo: Arc<Repository<R>>) -> Self {
        Self { repo }
    }

    /// List records matching the request's filter.
    pub fn list(&self, request: ListRequest) -> ListingResult<ListResponse<R>> {
        match self.repo.list(request.filter.as_ref()) {
            Ok(records) => {
                info!(resource = R::PLURAL, count = records.len(), "list ok");
                Ok(ListResponse { records })
            }
            Err(e) => {
                warn!(resource = R::PLURAL, code = e.code(), error = %e, "list failed");
                Err(e)
            }
        }
    }

    /// Fetch a single record. A missing record is `record: None`, not an error.
    pub fn fetch(&self, request: FetchRequest) -> ListingResult<FetchResponse<R>> {
        match self.repo.fetch_by_id(&request.id) {
            Ok(record) => {
                info!(resource = R::SINGULAR, id = %request.id, found = record.is_some(), "fetch ok");
                Ok(FetchResponse { record })
            }
            Err(e) => {
                warn!(resource = R::SINGULAR, id = %request.id, code = e.code(), error = %e, "fetch failed");
                Err(e)
            }
        }
    }
}
