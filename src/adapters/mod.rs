// Adapters layer: concrete implementations of the domain ports.

pub mod clock;
pub mod firestore;
pub mod firestore_value;
pub mod memory;

pub use clock::{FixedClock, SystemClock};
pub use firestore::FirestoreStore;
pub use memory::InMemoryStore;

use crate::config::{StoreBackend, TrackerConfig};
use crate::domain::ports::DocumentStore;
use crate::utils::error::Result;
use std::sync::Arc;

/// Builds the document store selected by `[store] backend`.
pub fn build_store(config: &TrackerConfig) -> Result<Arc<dyn DocumentStore>> {
    match config.store.backend {
        StoreBackend::Memory => {
            let store = match &config.store.seed_file {
                Some(path) => {
                    tracing::info!("📁 Seeding in-memory store from {}", path);
                    InMemoryStore::from_seed_file(path)?
                }
                None => InMemoryStore::new(),
            };
            Ok(Arc::new(store))
        }
        StoreBackend::Firestore => {
            let firestore = config.firestore()?;
            tracing::info!(
                project = %firestore.project_id,
                database = firestore.database(),
                "Using Firestore document store"
            );
            Ok(Arc::new(FirestoreStore::new(firestore)?))
        }
    }
}
