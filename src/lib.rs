//! Purpose: Library crate that turns uncaught failures into short, prefixed console reports.
//! Exports: `core` (settings, origins, envelopes, resolution, rendering, errors) and `api`.
//! Role: Backs the `take-a-hint` demo binary and any app that installs the hook.
//! Invariants: Reports are rendered synchronously on the failing thread.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
pub mod core;
