//! End-to-end tests for the notification pipeline.
//!
//! These wire the real dispatcher and retry scheduler against the
//! in-memory store, so they run without PostgreSQL or vendor gateways.

mod helpers;

mod dispatch_test;
mod retry_test;
