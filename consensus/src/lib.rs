//! # Solidification and Storage Invariants
//!
//! This crate relies on a set of structural invariants relating the tangle
//! store, the snapshot and the solid flags maintained by the node.
//!
//! ## Terminology
//!
//! Let:
//! - **F** be the set of hashes with a full transaction entry
//! - **P** be the set of hashes with a placeholder entry
//! - **S** be the set of solid hashes
//! - **E** be the set of solid entry points of the current snapshot
//!
//! ## Conceptual Set Relationships
//!
//! The following relationships hold at all times:
//!
//! ```text
//! S ⊆ F,    F ∩ P = ∅
//! ```
//!
//! In more concrete terms:
//!
//! - A placeholder records only the existence of a referenced hash whose
//!   transaction has not arrived yet. It is never solid and carries no height.
//! - A hash in **E** may or may not have a store entry at all. Solidity
//!   checks treat it as a solid boundary with height zero regardless.
//! - A hash enters **S** only when both of its parents are in **S ∪ E**,
//!   and once in **S** it never leaves.
//!
//! ## Implications for Code
//!
//! Examples of implications of the above invariants:
//!
//! - The solid subtangle is ancestry-closed: walking parents from any solid
//!   transaction can never reach a missing or placeholder entry before
//!   hitting the entry-point boundary.
//! - Heights of solid transactions are final. `set_solid` records the height
//!   together with the flag and repeated calls leave both untouched.
//!
//! Functions in this crate assume and enforce these invariants. Callers are
//! expected to respect them as well.

pub mod model;
pub mod pipeline;
pub mod processes;
