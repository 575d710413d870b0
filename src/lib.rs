// Module layout (Clean Architecture style)
// - bootstrap: configuration and startup wiring
// - infrastructure: Postgres and in-memory persistence adapters
// - presentation: HTTP handlers and routing
// - application: ports, use cases and request validation
// - domain: core models
// - client: guest draft store, autosave and merge sync for the frontend side

pub mod application;
pub mod bootstrap;
pub mod client;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
