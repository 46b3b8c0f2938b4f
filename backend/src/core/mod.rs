//! Season time management

pub mod time;
