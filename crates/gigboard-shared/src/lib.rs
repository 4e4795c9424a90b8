//! # gigboard-shared
//!
//! Vocabulary shared by every gigboard crate: record identifiers, user
//! roles, the status enums written into stored records, and the fixed
//! storage keys that make up the persisted layout.

pub mod constants;
pub mod error;
pub mod ids;
pub mod types;

pub use error::SharedError;
pub use ids::{IdGenerator, IdPrefix};
pub use types::*;
