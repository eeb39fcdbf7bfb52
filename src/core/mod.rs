pub mod aggregator;
pub mod catalog;
pub mod period;
pub mod records;

pub use crate::domain::model::{Document, Fields};
pub use crate::domain::ports::{Clock, DocumentStore};
pub use crate::utils::error::Result;
pub use aggregator::{Aggregator, LocationHours, TotalHours};
pub use catalog::{CatalogKind, CatalogService};
pub use records::{EmployeeService, SessionService};
