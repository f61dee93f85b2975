//! End-to-end mover scenarios.
//!
//! Everything except `redis_roundtrip` runs against in-memory stores and
//! temp files; the Redis round-trip needs a live server and is gated
//! behind the `integration` feature.

mod common;
mod move_scenarios;
mod redis_roundtrip;
