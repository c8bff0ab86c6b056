//! Error taxonomy shared by every marshalling operation

/// Result type for bag, signature and conversion operations
pub type JyResult<T> = Result<T, JyError>;

/// Marshalling error kinds.
///
/// Each kind carries a stable integer code (see [`JyError::code`]) so hosts
/// that speak the legacy C ABI can keep comparing against the numeric values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum JyError {
    /// Internal error
    #[error("internal error")]
    Internal,

    /// Could not allocate memory
    #[error("out of memory")]
    OutOfMemory,

    /// Invalid argument, or an operation on a poisoned bag
    #[error("invalid argument")]
    InvalidArgument,

    /// Dead lock
    #[error("deadlock")]
    Deadlock,

    /// Deliberately unsupported type combination
    #[error("function not implemented")]
    Unimplemented,

    /// The runtime does not know the requested class (or its constructor)
    #[error("class not found")]
    ClassNotFound,

    /// Property, method or setter not found
    #[error("not found")]
    NotFound,

    /// The runtime raised an exception; its state has already been cleared
    #[error("exception raised")]
    ExceptionRaised,
}

impl JyError {
    /// Code returned on success by [`JyError::code_of`]
    pub const SUCCESS_CODE: i32 = 0;

    /// Legacy integer code of this error
    pub const fn code(self) -> i32 {
        match self {
            JyError::Internal => -1,
            JyError::OutOfMemory => -2,
            JyError::InvalidArgument => -3,
            JyError::Deadlock => -4,
            JyError::Unimplemented => -5,
            JyError::ClassNotFound => -6,
            JyError::NotFound => -7,
            JyError::ExceptionRaised => -8,
        }
    }

    /// Map a legacy integer code back to an error.
    ///
    /// Returns `None` for the success code and for unknown values.
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(JyError::Internal),
            -2 => Some(JyError::OutOfMemory),
            -3 => Some(JyError::InvalidArgument),
            -4 => Some(JyError::Deadlock),
            -5 => Some(JyError::Unimplemented),
            -6 => Some(JyError::ClassNotFound),
            -7 => Some(JyError::NotFound),
            -8 => Some(JyError::ExceptionRaised),
            _ => None,
        }
    }

    /// Collapse a result into its legacy integer code
    pub fn code_of<T>(result: &JyResult<T>) -> i32 {
        match result {
            Ok(_) => Self::SUCCESS_CODE,
            Err(e) => e.code(),
        }
    }
}

impl From<std::collections::TryReserveError> for JyError {
    fn from(_: std::collections::TryReserveError) -> Self {
        JyError::OutOfMemory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [JyError; 8] = [
        JyError::Internal,
        JyError::OutOfMemory,
        JyError::InvalidArgument,
        JyError::Deadlock,
        JyError::Unimplemented,
        JyError::ClassNotFound,
        JyError::NotFound,
        JyError::ExceptionRaised,
    ];

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(JyError::Internal.code(), -1);
        assert_eq!(JyError::InvalidArgument.code(), -3);
        assert_eq!(JyError::ExceptionRaised.code(), -8);
        for e in ALL {
            assert_eq!(JyError::from_code(e.code()), Some(e));
        }
        assert_eq!(JyError::from_code(0), None);
        assert_eq!(JyError::from_code(-9), None);
    }

    #[test]
    fn test_code_of_result() {
        let ok: JyResult<()> = Ok(());
        let err: JyResult<()> = Err(JyError::NotFound);
        assert_eq!(JyError::code_of(&ok), 0);
        assert_eq!(JyError::code_of(&err), -7);
    }

    #[test]
    fn test_display() {
        assert_eq!(JyError::ClassNotFound.to_string(), "class not found");
        assert_eq!(JyError::OutOfMemory.to_string(), "out of memory");
    }
}
