use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

pub type TourId = i32;

/// A scheduled, bookable tour as the catalog stores it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tour {
    pub id: TourId,
    pub code: String,
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub auto_confirm: bool,
    #[serde(default)]
    pub full: bool,
    #[serde(default)]
    pub cancelled: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub riders_require_height: bool,
    /// `None` means the system-wide default cap applies.
    #[serde(default)]
    pub capacity: Option<i32>,
}

/// A tour plus the figures derived for one request.
///
/// `spots_remaining` may be negative when the tour is already oversold; it is
/// advisory only because it is computed without isolation from concurrent bookings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TourDetail {
    #[serde(flatten)]
    pub tour: Tour,
    pub price: f64,
    pub spots_remaining: i32,
}

impl TourDetail {
    pub fn id(&self) -> TourId {
        self.tour.id
    }

    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.tour.time < now
    }
}

/// Guide and sweep assigned to a tour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Team {
    pub guide: String,
    pub sweep: String,
}
