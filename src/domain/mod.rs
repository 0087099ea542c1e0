//! Domain models and types for Cubex.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`CubeName`])
//! - **Domain models** ([`CubeMetadata`], [`ExportMode`], [`Page`])
//! - **Error types** ([`CubexError`], [`CubeApiError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, CubexError>`]:
//!
//! ```rust
//! use cubex::domain::{CubeName, CubexError, Result};
//!
//! fn example() -> Result<CubeName> {
//!     CubeName::new("Orders").map_err(CubexError::Validation)
//! }
//! ```

pub mod cube;
pub mod errors;
pub mod ids;
pub mod result;

// Re-export commonly used types for convenience
pub use cube::{CubeMetadata, ExportMode, Page, Row, UPDATED_AT_FIELD};
pub use errors::{CubeApiError, CubexError};
pub use ids::CubeName;
pub use result::Result;
