//! Core types for the treegrid table engine.
//!
//! This crate provides the row-side state of a hierarchical table:
//! - Row tree model: [`Row`], [`Pin`]
//! - Engine-owned per-row state: [`RowState`], [`SelectedState`], [`Removed`]
//! - Reconciliation, selection and collapse propagation: [`RowStates`]
//! - Persistence and change notification: [`StateStore`], [`Subscribers`]

mod error;
mod notify;
mod persist;
mod row;
mod row_state;
mod row_states;

pub use error::{CoreError, CoreResult};
pub use notify::{Subscribers, SubscriptionId};
pub use persist::{load_json, save_json, MemoryStore, StateStore};
pub use row::{is_reserved_kind, Pin, PinAt, Row, HEADER, KEPT_GROUP};
pub use row_state::{Removed, RowState, SelectedState};
pub use row_states::RowStates;
