//! Wire types shared between the liftlog API handlers, the domain core and
//! the storage adapter.

pub mod api;
pub mod models;
