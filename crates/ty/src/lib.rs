//! Type and literal-value descriptors consumed by the matchck analysis.
//!
//! This crate is the narrow boundary between a host front-end and the
//! analysis: type shapes behind the [`TyDb`] trait, struct/enum
//! descriptors, and pre-evaluated literal values. It holds no analysis
//! logic of its own.

pub mod ty_def;
pub mod value;

pub use ty_def::{AdtData, AdtId, AdtKind, TyDb, TyId, TyKind, TyStore, VariantData};
pub use value::ConstValue;
