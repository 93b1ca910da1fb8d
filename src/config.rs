//! Settings: schema, layered loading and on-disk locations.
//!
//! [`Settings::load`] reads `config.toml` from [`config_dir`] and then
//! `REPRISE__*` environment variables; every field has a default.

mod load;
mod schema;

pub use load::config_dir;
pub use schema::*;
