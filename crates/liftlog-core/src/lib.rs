//! Domain core for liftlog: entity models, store ports, the ownership guard
//! and the services that implement workout plans, schedules, comments and
//! performance logs on top of those ports.

pub mod annotations;
pub mod error;
pub mod guard;
pub mod memory;
pub mod model;
pub mod ports;
pub mod schedules;
pub mod workouts;

pub use error::{CoreError, CoreResult, FieldErrors};
pub use model::UserRef;
