//! Domain layer - User and user-meta types plus the attribute mapper.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! The storage side only ever sees [`MetaAttr`] rows to create and hands back
//! [`StoredUser`] / [`StoredMeta`]; everything in between is [`mapper`].

pub mod mapper;
pub mod meta;
pub mod user;

pub use mapper::{build_for_insert, diff_for_update, flatten, MetaDiff};
pub use meta::{FieldSet, FieldValue, MetaAttr, StoredMeta};
pub use user::{StoredUser, User, ID_FIELD};
