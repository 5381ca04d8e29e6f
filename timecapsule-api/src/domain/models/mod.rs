mod entry;
mod ids;

pub use entry::*;
pub use ids::*;
