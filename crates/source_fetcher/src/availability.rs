use crate::FetchError;

/// The outcome of fetching an optional source.
#[derive(Debug)]
pub enum Availability<T> {
    Available(T),
    Unavailable(FetchError),
}

impl<T> Availability<T> {
    /// Converts a fetch result, logging the failure of `source` if there was one.
    pub fn settle(source: &str, result: Result<T, FetchError>) -> Self {
        match result {
            Ok(value) => Self::Available(value),
            Err(e) => {
                tracing::warn!(source, error = %e, "source unavailable, continuing without it");
                Self::Unavailable(e)
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Available(value) => Some(value),
            Self::Unavailable(_) => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Available(value) => Some(value),
            Self::Unavailable(_) => None,
        }
    }
}

impl<T: Default> Availability<T> {
    /// The fetched value, or the empty value when the source was unavailable.
    pub fn unwrap_or_default(self) -> T {
        self.into_option().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn status_error() -> FetchError {
        FetchError::Status {
            url: "http://example.invalid/x".to_string(),
            status: StatusCode::NOT_FOUND,
        }
    }

    #[test]
    fn settle_keeps_values_and_errors_apart() {
        let available = Availability::settle("x", Ok(vec![1, 2]));
        assert!(available.is_available());
        assert_eq!(available.value(), Some(&vec![1, 2]));

        let unavailable: Availability<Vec<i32>> = Availability::settle("x", Err(status_error()));
        assert!(!unavailable.is_available());
        assert!(matches!(
            unavailable,
            Availability::Unavailable(FetchError::Status { .. })
        ));
    }

    #[test]
    fn unavailable_defaults_to_empty() {
        let unavailable: Availability<Vec<i32>> = Availability::Unavailable(status_error());
        assert!(unavailable.unwrap_or_default().is_empty());
    }
}
