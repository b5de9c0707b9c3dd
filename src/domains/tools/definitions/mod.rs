//! Tool definitions module.
//!
//! This module exports all available tool definitions.
//! Each tool is defined in its own file for better maintainability.

pub mod basemap;
pub mod common;
pub mod directions;
pub mod elevation;
pub mod geocode;
pub mod geoenrichment;
pub mod place_details;
pub mod places;
pub mod reverse_geocode;

pub use basemap::{BasemapTileParams, BasemapTileTool};
pub use directions::{DirectionsParams, DirectionsTool};
pub use elevation::{ElevationParams, ElevationTool};
pub use geocode::{GeocodeParams, GeocodeTool};
pub use geoenrichment::{GeoenrichmentParams, GeoenrichmentTool};
pub use place_details::{PlaceDetailsParams, PlaceDetailsTool};
pub use places::{FindNearbyPlacesParams, FindNearbyPlacesTool};
pub use reverse_geocode::{ReverseGeocodeParams, ReverseGeocodeTool};
