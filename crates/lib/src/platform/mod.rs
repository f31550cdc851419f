//! Platform knowledge: where files live and which distribution family we run on.

mod family;
mod layout;

pub use family::PlatformFamily;
pub use layout::Layout;
