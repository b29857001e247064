/* src/router/backend/rust/src/lib.rs */

mod client;
mod resource;

pub use client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, ResourceClient, Response};
pub use resource::{Resource, register_resource};
