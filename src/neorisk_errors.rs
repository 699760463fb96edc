use thiserror::Error;

#[derive(Error, Debug)]
pub enum NeoRiskError {
    #[error("Invalid orbit uncertainty class: {0} (expected 0..=9)")]
    InvalidUncertaintyClass(i64),

    #[error("Invalid relative velocity: {0} km/s (must be strictly positive)")]
    InvalidVelocity(f64),

    #[error("Invalid nominal miss distance: {0} km (must be strictly positive)")]
    InvalidMissDistance(f64),

    #[error("Malformed observation: {0}")]
    InvalidObservation(String),

    #[error(
        "Uncertainty profile is not monotonic: class {class} has {current}, below the preceding class value {previous}"
    )]
    NonMonotonicProfile {
        class: usize,
        previous: f64,
        current: f64,
    },

    #[error("Invalid uncertainty profile entry for class {class}: {value}")]
    InvalidProfileEntry { class: usize, value: f64 },

    #[error("Invalid simulation configuration: {0}")]
    InvalidConfig(String),

    #[error("No trial was run: cannot estimate an impact probability")]
    InsufficientTrials,

    /// Zero or non-finite resolved spread, e.g. a relative table applied to a miss distance
    /// so small that `miss_distance_km × entry` underflows. Raised before any trial.
    #[error("Degenerate positional spread for class {class}: sigma = {sigma_km} km")]
    DegenerateVariance { class: u8, sigma_km: f64 },

    #[error("Gaussian sampler construction failed: {0:?}")]
    NoiseInjectionError(rand_distr::NormalError),

    #[error("Normal quantile computation failed: {0}")]
    InvalidQuantile(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

impl From<rand_distr::NormalError> for NeoRiskError {
    fn from(err: rand_distr::NormalError) -> Self {
        NeoRiskError::NoiseInjectionError(err)
    }
}

impl PartialEq for NeoRiskError {
    fn eq(&self, other: &Self) -> bool {
        use NeoRiskError::*;
        match (self, other) {
            (InvalidUncertaintyClass(a), InvalidUncertaintyClass(b)) => a == b,
            (InvalidVelocity(a), InvalidVelocity(b)) => a == b,
            (InvalidMissDistance(a), InvalidMissDistance(b)) => a == b,
            (InvalidObservation(a), InvalidObservation(b)) => a == b,
            (
                NonMonotonicProfile {
                    class: c1,
                    previous: p1,
                    current: v1,
                },
                NonMonotonicProfile {
                    class: c2,
                    previous: p2,
                    current: v2,
                },
            ) => c1 == c2 && p1 == p2 && v1 == v2,
            (
                InvalidProfileEntry {
                    class: c1,
                    value: v1,
                },
                InvalidProfileEntry {
                    class: c2,
                    value: v2,
                },
            ) => c1 == c2 && v1 == v2,
            (InvalidConfig(a), InvalidConfig(b)) => a == b,
            (
                DegenerateVariance {
                    class: c1,
                    sigma_km: s1,
                },
                DegenerateVariance {
                    class: c2,
                    sigma_km: s2,
                },
            ) => c1 == c2 && s1 == s2,
            (NoiseInjectionError(a), NoiseInjectionError(b)) => a == b,
            (InvalidQuantile(a), InvalidQuantile(b)) => a == b,

            // Library errors are not comparable: same variant is enough
            (IoError(_), IoError(_)) => true,
            (CsvError(_), CsvError(_)) => true,

            (InsufficientTrials, InsufficientTrials) => true,

            _ => false,
        }
    }
}
