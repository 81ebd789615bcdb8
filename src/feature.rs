//! Feature vectors and the tables built from them.
//!
//! - `vector`: fixed-length boolean page vectors
//! - `table`: typed in-memory tables shared by the builder and the exporters
//! - `builder`: flattens sessions and user profiles into table rows

pub mod builder;
pub mod table;
pub mod vector;

pub use self::builder::{FeatureTables, FeatureVectorBuilder};
pub use self::table::{Column, ColumnKind, DataTable, Value};
pub use self::vector::PageVector;
