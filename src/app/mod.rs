//! Application core.
//!
//! The shared state record, its store and observers, the port traits
//! adapters implement, and the controller that glues them together.
//!
//! ```text
//!  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐
//!  │  ports.rs    │  │ commands.rs  │  │  state.rs    │
//!  │  (traits)    │  │  (inbound)   │  │  (record)    │
//!  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘
//!         └────────┬────────┘                 │
//!            controller.rs ───update──▶ store.rs
//! ```

pub mod commands;
pub mod controller;
pub mod ports;
pub mod state;
pub mod store;
