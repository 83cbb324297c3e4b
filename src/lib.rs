//! Hierarchical geocell spatial index with bounding-box and greedy proximity
//! search.
//!
//! A geocell is a string over the alphabet `0123456789abcdef` naming a
//! rectangular latitude/longitude region by repeated 4x4 quadrant
//! subdivision; its resolution is its length, and any prefix is an ancestor
//! region. On top of the cell algebra this crate provides a cost-optimal
//! bounding-box cell selector and a greedy expanding-radius proximity search
//! that only talks to storage through an injected finder function.
//!
//! ```rust
//! use geocell::{Entity, Geocell, Point, ProximityOptions, proximity_fetch};
//!
//! #[derive(Clone)]
//! struct City {
//!     name: String,
//!     location: Point,
//! }
//!
//! impl Entity for City {
//!     fn key(&self) -> &str {
//!         &self.name
//!     }
//!     fn location(&self) -> Point {
//!         self.location
//!     }
//! }
//!
//! let cities = vec![City {
//!     name: "nyc".into(),
//!     location: Point::new(40.7128, -74.0060)?,
//! }];
//!
//! let center = Point::new(40.7407092, -73.9894039)?;
//! let options = ProximityOptions::default().with_max_results(3);
//! let nearby = proximity_fetch(&center, &options, |cells| {
//!     Ok(cities
//!         .iter()
//!         .filter(|c| c.geocells().iter().any(|g| cells.contains(g)))
//!         .cloned()
//!         .collect())
//! })?;
//! assert_eq!(nearby[0].entity.name, "nyc");
//! # Ok::<(), geocell::GeocellError>(())
//! ```

pub mod bbox_search;
pub mod cell;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod merge;
pub mod proximity;
pub mod topology;
pub mod types;

pub use cell::{Geocell, MAX_GEOCELL_RESOLUTION};
pub use error::{GeocellError, Result};
pub use types::{BoundingBox, Direction, Point};

pub use bbox_search::{
    MAX_FEASIBLE_BBOX_SEARCH_CELLS, best_bbox_search_cells, bounding_box_fetch,
    default_cost_function,
};

pub use geometry::{bounding_box_from_distance, distance, distance_sorted_edges, point_distance};

pub use merge::merge_in_place;

pub use proximity::{Entity, ProximityOptions, SearchResult, proximity_fetch};

pub use topology::{collinear, interpolate, interpolation_count};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{BoundingBox, Direction, Geocell, GeocellError, Point, Result};

    pub use crate::{Entity, ProximityOptions, SearchResult, proximity_fetch};

    pub use crate::{best_bbox_search_cells, bounding_box_fetch, default_cost_function};

    pub use crate::{bounding_box_from_distance, distance};
}
