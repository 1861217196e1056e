use thiserror::Error;

/// Why the propagator could not answer a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum PropagationErrorKind {
    /// Timestamp outside the element set's validity, or search horizon exhausted.
    OutOfRange,
    /// The model produced an unusable state (decay, non-finite output).
    NumericalFailure,
    Unknown,
}

#[derive(Debug, Clone, Error)]
#[error("propagation error ({kind}): {message}")]
pub struct PropagationError {
    pub kind: PropagationErrorKind,
    pub message: String,
}

impl PropagationError {
    pub fn new(kind: PropagationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn out_of_range(message: impl Into<String>) -> Self {
        Self::new(PropagationErrorKind::OutOfRange, message)
    }

    pub fn numerical(message: impl Into<String>) -> Self {
        Self::new(PropagationErrorKind::NumericalFailure, message)
    }

    pub fn is_validity_limit(&self) -> bool {
        self.kind == PropagationErrorKind::OutOfRange
    }
}

impl From<sgp4::Error> for PropagationError {
    fn from(err: sgp4::Error) -> Self {
        #[allow(unreachable_patterns)]
        let kind = match err {
            sgp4::Error::OutOfRangeEccentricity { .. }
            | sgp4::Error::OutOfRangePerturbedEccentricity { .. } => {
                PropagationErrorKind::OutOfRange
            }
            sgp4::Error::NegativeSemiLatusRectum { .. } => PropagationErrorKind::NumericalFailure,
            _ => PropagationErrorKind::Unknown,
        };
        PropagationError::new(kind, err.to_string())
    }
}

/// Degenerate vectors met by the geometry kernel. Recovered locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("object coincides with observer")]
    ZeroLineOfSight,
    #[error("observer vector has zero magnitude")]
    ZeroObserverVector,
    #[error("positions are expressed in different frames")]
    FrameMismatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum LocationError {
    #[error("latitude {0} outside [-90, 90]")]
    Latitude(f64),
    #[error("longitude {0} is not finite")]
    Longitude(f64),
    #[error("altitude {0} m below -500 m")]
    Altitude(f64),
}

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("Invalid TLE for {satellite}: {message}")]
    InvalidTle { satellite: String, message: String },
    #[error("Invalid observer location: {0}")]
    Location(#[from] LocationError),
}
