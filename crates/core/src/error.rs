use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unknown simulation step: {0}")]
    UnknownStep(String),

    #[error("Unknown sector: {0}")]
    UnknownSector(String),

    #[error("Unknown side: {0}")]
    UnknownSide(String),

    #[error("Unknown source tier: {0}")]
    UnknownSourceTier(String),

    #[error("Unknown operational fit: {0}")]
    UnknownOperationalFit(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = CoreError::UnknownSector("Economics".to_string());
        assert!(error.to_string().contains("Economics"));
    }
}
