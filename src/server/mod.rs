//! HTTP server exposing the mentor pipeline as JSON endpoints.
//!
//! Formatting, persona blending, greetings and content review work with
//! only a catalog and a store. `POST /generate` additionally needs a
//! [`crate::generation::ContentService`] and answers 503 without one.
//! See [`routes`] for the full route list.

pub mod routes;

pub use routes::{app_router, AppState};
