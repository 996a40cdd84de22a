//! API Routes
//!
//! Route handlers organized by functionality.

pub mod buckets;
pub mod export;
pub mod health;
pub mod history;
pub mod readings;
