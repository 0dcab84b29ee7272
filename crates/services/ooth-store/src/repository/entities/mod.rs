//! SeaORM entities for the `users` and `user_meta` tables.

pub mod user;
pub mod user_meta;
