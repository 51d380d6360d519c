//! Donation records. Settlement is an admin status change.

pub mod controller;
pub mod router;
pub mod service;
