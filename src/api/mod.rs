use chrono::{Duration, NaiveDateTime};
use serde::Deserialize;

pub mod density;
pub mod grids;

pub const API_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub trait FormatToApiFmt {
    fn to_api_format(&self) -> String;
}

impl FormatToApiFmt for NaiveDateTime {
    fn to_api_format(&self) -> String {
        // Local (Swiss) wall-clock hour, no offset
        self.format(API_DATETIME_FORMAT).to_string()
    }
}

/// `hours` consecutive hour-aligned timestamps starting at `start`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HourlyWindow {
    pub start: NaiveDateTime,
    pub hours: u32,
}

impl HourlyWindow {
    pub fn new(start: NaiveDateTime, hours: u32) -> Self {
        HourlyWindow { start, hours }
    }

    pub fn timestamps(&self) -> impl Iterator<Item = NaiveDateTime> + '_ {
        (0..self.hours).map(move |h| self.start + Duration::hours(h as i64))
    }
}
