use std::path::PathBuf;
use thiserror::Error;

/// Typed failures the CLI maps to distinct exit codes.
/// Anything else travels as a plain `eyre::Report`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BcssError {
    #[error("input not found: {}", .0.display())]
    InputNotFound(PathBuf),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(String),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_error_survives_eyre_wrapping() {
        let r: Report = BcssError::InputNotFound(PathBuf::from("part.EIA")).into();
        let r = r.wrap_err("convert part.EIA");
        assert_eq!(
            r.downcast_ref::<BcssError>(),
            Some(&BcssError::InputNotFound(PathBuf::from("part.EIA")))
        );
        assert_eq!(r.root_cause().to_string(), "input not found: part.EIA");
    }
}
