use serde::{Deserialize, Serialize};

use crate::core::calendar::TradingCalendar;
use crate::core::series::TransformOptions;
use crate::error::{ChartError, ChartResult};
use crate::interaction::RoiConfig;

/// Upper bound on trading sessions kept by the 5-session range.
pub const MAX_SESSION_COUNT: usize = 366;

/// Everything a [`crate::api::PriceChart`] needs besides its hosts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub calendar: TradingCalendar,
    pub transform: TransformOptions,
    pub roi: RoiConfig,
}

impl ChartConfig {
    #[must_use]
    pub fn with_calendar(mut self, calendar: TradingCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    #[must_use]
    pub fn with_transform_options(mut self, transform: TransformOptions) -> Self {
        self.transform = transform;
        self
    }

    #[must_use]
    pub fn with_roi(mut self, roi: RoiConfig) -> Self {
        self.roi = roi;
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        let roi = self.roi;
        if !roi.edge_zone_width.is_finite() || roi.edge_zone_width < 0.0 {
            return Err(ChartError::InvalidData(
                "edge zone width must be finite and >= 0".to_owned(),
            ));
        }
        for (name, value) in [
            ("marker radius", roi.marker_radius),
            ("tooltip width", roi.tooltip_width),
            ("tooltip height", roi.tooltip_height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ChartError::InvalidData(format!(
                    "{name} must be finite and > 0"
                )));
            }
        }
        if !roi.tooltip_offset.is_finite() {
            return Err(ChartError::InvalidData(
                "tooltip offset must be finite".to_owned(),
            ));
        }
        if !(1..=MAX_SESSION_COUNT).contains(&self.transform.session_count) {
            return Err(ChartError::InvalidData(format!(
                "session count must be between 1 and {MAX_SESSION_COUNT}"
            )));
        }
        let session = self.calendar.session;
        if session.open_hour > 23
            || session.close_hour > 24
            || session.open_minute > 59
            || session.close_minute > 59
            || session.open_minute_of_day() > session.close_minute_of_day()
        {
            return Err(ChartError::InvalidData(
                "session window must open before it closes within one day".to_owned(),
            ));
        }
        Ok(())
    }
}
