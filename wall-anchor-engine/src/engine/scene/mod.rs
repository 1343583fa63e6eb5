//! Scene-side collaborators of the placement workflows.
//!
//! The application state lives in a JSON key-path store ([`state_store`]).
//! Object records are read and written through the [`ObjectRepository`]
//! trait so workflows never reach into the store layout directly. Objects
//! that can carry anchors exist in the ECS as [`MountableObject`] entities
//! whose transforms define their local frame.

/// Mountable object entities and their spawn helper.
pub mod mountable;

/// Object records, anchors and the repository interface over the state store.
pub mod object_repository;

/// Loading of `*.objects.json` scene files into the store and the world.
pub mod object_manifest;

/// Key-path JSON store with whole-value replace semantics.
pub mod state_store;

pub use mountable::{MountableObject, ObjectSize, spawn_mountable_object};
pub use object_repository::{Anchor, ObjectRecord, ObjectRepository};
pub use state_store::{AppStateStore, StoreError, StoreResult};
