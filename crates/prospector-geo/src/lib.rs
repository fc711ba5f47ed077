//! Geographic resolution: region name to locality record.
//!
//! Known localities come from a static table; everything else gets a
//! synthetic record. Resolution never fails and does no I/O.

pub mod localities;
pub mod resolver;

pub use localities::KnownLocality;
pub use resolver::GeoResolver;
