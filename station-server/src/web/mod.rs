//! Web layer for the fuel station finder.
//!
//! A JSON API consumed by the rendering surfaces (phone list, widget, car
//! screen): session control, location delivery, policy, and the ranked
//! snapshot. No HTML is served here; rendering is the consumer's job.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppState, ProdSession};
