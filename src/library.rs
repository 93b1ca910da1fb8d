//! Local music folder browsing for `/library`.

mod model;
mod scan;

pub use model::Track;
pub use scan::scan;
