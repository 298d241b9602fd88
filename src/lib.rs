//! Station selection over climate-network metadata: date, network, variable,
//! frequency and climatology criteria, plus an independent drawn-area pass.

pub mod config;
pub mod dsl;
pub mod error;
pub mod filter;
pub mod geometry;
pub mod metadata;
pub mod model;
pub mod predicates;
pub mod sinks;
pub mod utils;

pub use error::GeometryError;
pub use filter::{station_area_filter, station_filter};
pub use model::{FilterCriteria, Metadata, Station};
