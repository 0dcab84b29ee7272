//! Service layer - the store contract exposed to the authentication layer.

mod ooth_store;

pub use ooth_store::{CleanupStatus, OothStore, OothStoreBuilder, UpdateOutcome, UserAdapter};
