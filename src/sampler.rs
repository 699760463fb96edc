//! # Miss-distance sampling
//!
//! Gaussian draws of the close-approach distance around its nominal value.
//!
//! All randomness comes from an explicitly supplied [`rand::Rng`]; nothing in this crate
//! reads a process-wide generator. Seeding the generator (e.g. with
//! [`StdRng::seed_from_u64`](rand::SeedableRng::seed_from_u64)) therefore makes a whole
//! simulation reproducible.
//!
//! Draws are **not** truncated: a sampled distance may be smaller than the nominal value or
//! even negative (an overshoot past the geocenter). Deciding whether such a draw is an impact
//! is the job of [`crate::impact`].
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::constants::Kilometer;
use crate::neorisk_errors::NeoRiskError;

/// Draw a single miss distance from `N(nominal_km, std_km²)`.
///
/// This is the one-shot form; it rebuilds the distribution on every call. Hot loops should
/// use [`MissDistanceSampler`].
///
/// Arguments
/// -----------------
/// * `nominal_km`: Mean of the distribution (nominal miss distance).
/// * `std_km`: Standard deviation in km.
/// * `rng`: Random source consumed by the draw.
///
/// Return
/// ----------
/// * The sampled distance in km, or [`NeoRiskError::NoiseInjectionError`] if `std_km` is
///   negative or not finite.
pub fn sample_miss_distance(
    nominal_km: Kilometer,
    std_km: Kilometer,
    rng: &mut impl Rng,
) -> Result<Kilometer, NeoRiskError> {
    Ok(Normal::new(nominal_km, std_km)?.sample(rng))
}

/// Reusable Gaussian sampler for one object.
#[derive(Debug, Clone, Copy)]
pub struct MissDistanceSampler {
    normal: Normal<f64>,
}

impl MissDistanceSampler {
    /// Build a sampler centered on `nominal_km` with spread `std_km`.
    ///
    /// Return
    /// ----------
    /// * The sampler, or [`NeoRiskError::NoiseInjectionError`] for an invalid spread.
    pub fn new(nominal_km: Kilometer, std_km: Kilometer) -> Result<Self, NeoRiskError> {
        Ok(MissDistanceSampler {
            normal: Normal::new(nominal_km, std_km)?,
        })
    }

    #[inline]
    pub fn sample(&self, rng: &mut impl Rng) -> Kilometer {
        self.normal.sample(rng)
    }

    pub fn nominal_km(&self) -> Kilometer {
        self.normal.mean()
    }

    pub fn std_km(&self) -> Kilometer {
        self.normal.std_dev()
    }
}
