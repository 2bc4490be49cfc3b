use serde::{Deserialize, Serialize};
use tourbook_core::{Gender, Rider};

/// A rider exactly as the form submitted it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmittedRider {
    pub gender: String,
    /// `None` when the field was blank or not a number.
    pub height: Option<i64>,
}

/// Plausible rider heights, inches inclusive.
#[derive(Debug, Clone, Copy)]
pub struct RiderPolicy {
    pub min_height: u16,
    pub max_height: u16,
}

impl Default for RiderPolicy {
    fn default() -> Self {
        Self {
            min_height: 36,
            max_height: 84,
        }
    }
}

/// What the rider checks found. Everything here is non-fatal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiderCheck {
    pub rider_count: u32,
    /// Riders to persist; empty unless the tour needs heights.
    pub riders: Vec<Rider>,
    /// `(requested, spots_remaining)` when the request exceeds the advisory capacity.
    pub oversubscribed: Option<(u32, i32)>,
    pub invalid_heights: bool,
    pub unknown_heights: bool,
}

/// Largest rider count one order can carry; order storage keeps it as a 32-bit integer.
pub const MAX_RIDERS: i64 = i32::MAX as i64;

pub struct RiderValidator {
    policy: RiderPolicy,
}

impl RiderValidator {
    pub fn new(policy: RiderPolicy) -> Self {
        Self { policy }
    }

    /// Checks the requested count alone.
    pub fn rider_count(requested: i64) -> Result<u32, RiderError> {
        if requested < 1 {
            return Err(RiderError::TooFewRiders(requested));
        }
        if requested > MAX_RIDERS {
            return Err(RiderError::TooManyRiders(requested));
        }
        u32::try_from(requested).map_err(|_| RiderError::TooManyRiders(requested))
    }

    pub fn validate(
        &self,
        requested: i64,
        spots_remaining: i32,
        heights_required: bool,
        submitted: &[SubmittedRider],
    ) -> Result<RiderCheck, RiderError> {
        let rider_count = Self::rider_count(requested)?;

        let mut check = RiderCheck {
            rider_count,
            ..RiderCheck::default()
        };

        // Spots remaining is advisory; concurrent bookings can move it at any time.
        if i64::from(rider_count) > i64::from(spots_remaining) {
            check.oversubscribed = Some((rider_count, spots_remaining));
        }

        if !heights_required {
            return Ok(check);
        }

        if submitted.len() < rider_count as usize {
            check.invalid_heights = true;
        }

        for raw in submitted.iter().take(rider_count as usize) {
            let gender = match Gender::from_code(&raw.gender) {
                Some(gender) => gender,
                None => {
                    check.invalid_heights = true;
                    Gender::Unknown
                }
            };

            let height = match raw.height {
                Some(h) if h > 0 => {
                    if h < i64::from(self.policy.min_height) || h > i64::from(self.policy.max_height) {
                        check.unknown_heights = true;
                    }
                    u16::try_from(h).ok()
                }
                _ => {
                    check.invalid_heights = true;
                    None
                }
            };

            check.riders.push(Rider { gender, height });
        }

        Ok(check)
    }
}

impl Default for RiderValidator {
    fn default() -> Self {
        Self::new(RiderPolicy::default())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RiderError {
    #[error("Rider count must be at least 1, got {0}")]
    TooFewRiders(i64),

    #[error("Rider count {0} is out of range")]
    TooManyRiders(i64),
}
