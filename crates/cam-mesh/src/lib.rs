//! Triangle mesh types and queries for CAM toolpath generation.
//!
//! This crate holds the surface side of waterline machining: the triangle
//! mesh itself, a spatial index answering "which triangles can a cutter
//! moving along this axis-parallel line touch", and horizontal plane slicing.
//!
//! # Units and Coordinate System
//!
//! The library is unit-agnostic; millimeters are assumed in documentation.
//! Z is up. Waterline fibers run parallel to X or Y at a fixed Z.
//!
//! # Quick Start
//!
//! ```
//! use cam_mesh::{LineAxis, Mesh, TriangleIndex, Vertex};
//!
//! let mut mesh = Mesh::new();
//! mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(10.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(0.0, 10.0, 5.0));
//! mesh.faces.push([0, 1, 2]);
//!
//! let index = TriangleIndex::new(&mesh).unwrap();
//! let hits = index.query_line(LineAxis::X, 5.0, 0.0, (0.0, 10.0));
//! assert_eq!(hits, vec![0]);
//! ```
//!
//! # Error Handling
//!
//! Fallible operations return `MeshResult<T>`, which is `Result<T, MeshError>`.

mod error;
pub mod index;
pub mod slice;
pub mod tracing_ext;
mod types;

pub use error::{ErrorCode, MeshError, MeshResult, RecoverySuggestion, validate_mesh_data};
pub use index::{Aabb, LineAxis, TriangleIndex};
pub use slice::{ZSlice, chain_segments, slice_at, slice_segments};
pub use types::{Mesh, Rect, Triangle, Vertex};
