//! Registration, password login, token refresh and Google sign-in.

pub mod controller;
pub mod cookies;
pub mod google;
pub mod router;
pub mod service;
