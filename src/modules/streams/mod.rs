//! Streams and their scheduled -> live -> ended lifecycle.

pub mod controller;
pub mod router;
pub mod service;
