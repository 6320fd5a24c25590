//! CLI commands for listing-api.
//!
//! Supports API server mode plus one-shot list and fetch queries against the
//! configured stores.

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use crate::config::{AppConfig, StoreConfig};
use crate::service::ResourceService;
use crate::storage::{Repository, Resource};
use crate::types::{Direction, FetchRequest, ListFilter, ListRequest, OrderBy, Race, Sport};

#[derive(Parser)]
#[command(name = "listing-api")]
#[command(version, about = "Race and sport listings behind a REST gateway", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Resource collection to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceKind {
    Races,
    Sports,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl From<SortDirection> for Direction {
    fn from(value: SortDirection) -> Self {
        match value {
            SortDirection::Asc => Direction::Asc,
            SortDirection::Desc => Direction::Desc,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the API gateway
    Serve {
        /// Host to bind to (overrides config)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List races or sports
    List {
        #[arg(value_enum)]
        resource: ResourceKind,

        /// Restrict to these meeting ids
        #[arg(short, long, value_delimiter = ',')]
        meeting_ids: Vec<i64>,

        /// Only return visible records
        #[arg(long)]
        only_visible: bool,

        /// Fields to order by
        #[arg(short, long, value_delimiter = ',')]
        order_by: Vec<String>,

        /// Sort direction
        #[arg(short, long, value_enum, default_value = "asc")]
        direction: SortDirection,
    },

    /// Fetch a single race or sport by id
    Fetch {
        #[arg(value_enum)]
        resource: ResourceKind,

        /// Record id
        id: String,
    },
}

/// Build the list filter from CLI arguments.
pub fn build_filter(
    meeting_ids: Vec<i64>,
    only_visible: bool,
    order_by: Vec<String>,
    direction: SortDirection,
) -> ListFilter {
    ListFilter {
        meeting_ids,
        only_visible,
        order_by: if order_by.is_empty() {
            None
        } else {
            Some(OrderBy {
                fields: order_by,
                direction: direction.into(),
            })
        },
    }
}

/// Open a store and run its one-time seed.
pub fn open_service<R: Resource>(store: &StoreConfig) -> anyhow::Result<ResourceService<R>> {
    let repo = Repository::<R>::open(Path::new(&store.path), store.seed_rows)?;
    repo.initialize()?;
    Ok(ResourceService::new(Arc::new(repo)))
}

/// Run a list query and print the response as JSON.
pub fn run_list(resource: ResourceKind, filter: ListFilter) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let request = ListRequest {
        filter: Some(filter),
    };

    match resource {
        ResourceKind::Races => print_list::<Race>(&config.racing, request),
        ResourceKind::Sports => print_list::<Sport>(&config.sports, request),
    }
}

fn print_list<R: Resource + Serialize>(
    store: &StoreConfig,
    request: ListRequest,
) -> anyhow::Result<()> {
    let service = open_service::<R>(store)?;
    let response = service.list(request)?;
    eprintln!("{} {}", response.records.len(), R::PLURAL);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Fetch one record and print the response as JSON.
pub fn run_fetch(resource: ResourceKind, id: String) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let request = FetchRequest { id };

    match resource {
        ResourceKind::Races => print_fetch::<Race>(&config.racing, request),
        ResourceKind::Sports => print_fetch::<Sport>(&config.sports, request),
    }
}

fn print_fetch<R: Resource + Serialize>(
    store: &StoreConfig,
    request: FetchRequest,
) -> anyhow::Result<()> {
    let service = open_service::<R>(store)?;
    let response = service.fetch(request)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
