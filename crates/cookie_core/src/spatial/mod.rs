//! Spatial partitioning data structures
//!
//! Provides the bounding volume type shared by every game object and the
//! octree used as the broad phase for collision queries.

mod bounding_box;
mod octree;

pub use bounding_box::BoundingBox;
pub use octree::{NodeId, Octree, OctreeEntry, OctreeNode};
pub use crate::config::OctreeConfig;
