//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Each table has a service module that owns its row type, form validation
//! and SQL. Route handlers stay focused on extracting input, checking the
//! admin session and translating errors into responses.

pub mod bracket;
pub mod error;
pub mod home;
pub mod matches;
pub mod medals;
pub mod news;
pub mod rules;
pub mod session;
pub mod sports;
pub mod storage;
pub mod teams;
