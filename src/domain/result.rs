//! Result type alias for Cubex
//!
//! This module provides a convenient Result type alias that uses CubexError
//! as the error type.

use super::errors::CubexError;

/// Result type alias for Cubex operations
///
/// # Examples
///
/// ```
/// use cubex::domain::result::Result;
/// use cubex::domain::errors::CubexError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(CubexError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, CubexError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::CubexError;

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(CubexError::Validation("test error".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
