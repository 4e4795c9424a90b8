//! # gigboard-store
//!
//! Local persistence and synchronization layer for the Gigboard marketplace.
//!
//! Every collection (gigs, applications, transactions, conversations,
//! messages, per-role notifications) is stored as one JSON array under a fixed
//! key of a [`KeyValueBackend`]. The [`Database`] handle exposes typed CRUD
//! helpers for each record family, runs the gig-deletion cascade, and fires a
//! payload-free change signal on its [`ChangeBus`] after every mutation so
//! that independently rendered views can re-read what they need.

pub mod adapter;
pub mod applications;
pub mod backend;
pub mod backup;
pub mod bus;
pub mod cascade;
pub mod collection;
pub mod config;
pub mod conversations;
pub mod database;
pub mod gigs;
pub mod messages;
pub mod models;
pub mod notifications;
pub mod seed;
pub mod transactions;
pub mod views;

mod error;

pub use backend::{FileBackend, KeyValueBackend, MemoryBackend};
pub use backup::{ImportStats, Snapshot};
pub use bus::{ChangeBus, DataChanged, SubscriptionId};
pub use cascade::{CascadeReport, CascadeResidue};
pub use collection::{Collection, Patch, Record};
pub use config::{BackendKind, StoreConfig};
pub use database::Database;
pub use error::{BackendError, Result, StoreError};
pub use models::*;
pub use seed::SeedReport;
