pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use adapters::{build_store, FirestoreStore, FixedClock, InMemoryStore, SystemClock};
pub use app::{build_router, serve, AppState};
pub use config::TrackerConfig;
pub use core::{Aggregator, CatalogKind, CatalogService, EmployeeService, SessionService};
pub use domain::ports::{Clock, DocumentStore};
pub use utils::error::{Result, TrackerError};
