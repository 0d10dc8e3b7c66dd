//! Record model layer.
//!
//! # Responsibility
//! - Define the flat record shape and typed patches.
//! - Declare entity kinds as static field-policy data.
//! - Provide the policy-free CRUD pass-through over a record store.
//!
//! # Invariants
//! - Every record is identified by an application-assigned `id`.
//! - Nothing in this layer validates fields or ownership.

pub mod base;
pub mod kind;
pub mod record;
