//! Threshold-based weather risk analysis
//!
//! Pure pass over the daily forecast series. Days are checked independently
//! and deltas add up across the range. The two rain tiers are exclusive per
//! day; wind and thunderstorm checks stack on top of either.

use chrono::NaiveDate;

use crate::models::{Alert, AlertKind, Severity};
use crate::weather::DailyWeather;

/// Rainfall above this many mm in a day risks flooding
const HEAVY_RAIN_MM: f32 = 50.0;
/// Rainfall above this many mm in a day disrupts outdoor plans
const MODERATE_RAIN_MM: f32 = 20.0;
/// Winds above this km/h are hazardous outdoors
const STRONG_WIND_KMH: f32 = 40.0;
/// WMO weather codes from here up are thunderstorms
const THUNDERSTORM_CODE: u8 = 95;

const HEAVY_RAIN_PENALTY: i32 = 15;
const MODERATE_RAIN_PENALTY: i32 = 5;
const STRONG_WIND_PENALTY: i32 = 10;
const THUNDERSTORM_PENALTY: i32 = 20;

/// Outcome of the threshold pass over one forecast
#[derive(Debug, Default)]
pub struct WeatherRiskReport {
    /// Alerts in rule order (rain, wind, thunderstorm per day)
    pub alerts: Vec<Alert>,
    /// Summed score change, never positive
    pub score_delta: i32,
}

/// Scan the forecast for risky days.
///
/// A metric reported as null skips only that rule for that day; the other
/// metrics of the same day are still checked.
#[must_use]
pub fn analyze(forecast: &DailyWeather) -> WeatherRiskReport {
    let mut report = WeatherRiskReport::default();

    for (i, &date) in forecast.dates.iter().enumerate() {
        if let Some(precipitation) = metric(&forecast.precipitation_sum, i) {
            if precipitation > HEAVY_RAIN_MM {
                report.alerts.push(heavy_rain_alert(date, precipitation));
                report.score_delta -= HEAVY_RAIN_PENALTY;
            } else if precipitation > MODERATE_RAIN_MM {
                report.alerts.push(moderate_rain_alert(date, precipitation));
                report.score_delta -= MODERATE_RAIN_PENALTY;
            }
        }

        if let Some(wind) = metric(&forecast.wind_speed_max, i) {
            if wind > STRONG_WIND_KMH {
                report.alerts.push(strong_wind_alert(date, wind));
                report.score_delta -= STRONG_WIND_PENALTY;
            }
        }

        if let Some(code) = metric(&forecast.weather_code, i) {
            if code >= THUNDERSTORM_CODE {
                report.alerts.push(thunderstorm_alert(date));
                report.score_delta -= THUNDERSTORM_PENALTY;
            }
        }
    }

    report
}

fn metric<T: Copy>(series: &[Option<T>], index: usize) -> Option<T> {
    series.get(index).copied().flatten()
}

fn heavy_rain_alert(date: NaiveDate, precipitation: f32) -> Alert {
    Alert {
        kind: AlertKind::SevereWeather,
        severity: Severity::High,
        title: "⛈️ Heavy Rain Warning".to_string(),
        message: format!(
            "Heavy rainfall expected on {date} ({precipitation}mm). Risk of flooding in low-lying areas."
        ),
        action: "Carry raincoat, avoid outdoor activities, check local flood alerts.".to_string(),
        date: Some(date.to_string()),
    }
}

fn moderate_rain_alert(date: NaiveDate, precipitation: f32) -> Alert {
    Alert {
        kind: AlertKind::Weather,
        severity: Severity::Medium,
        title: "🌧️ Rainy Day".to_string(),
        message: format!("Moderate rain expected on {date} ({precipitation}mm)."),
        action: "Pack umbrella and waterproof bags.".to_string(),
        date: Some(date.to_string()),
    }
}

fn strong_wind_alert(date: NaiveDate, wind: f32) -> Alert {
    Alert {
        kind: AlertKind::SevereWeather,
        severity: Severity::High,
        title: "💨 Strong Wind Warning".to_string(),
        message: format!("High winds expected on {date} (up to {wind} km/h)."),
        action: "Avoid beach activities, secure loose items, be cautious on roads.".to_string(),
        date: Some(date.to_string()),
    }
}

fn thunderstorm_alert(date: NaiveDate) -> Alert {
    Alert {
        kind: AlertKind::SevereWeather,
        severity: Severity::Critical,
        title: "⚡ Thunderstorm Alert".to_string(),
        message: format!("Thunderstorms expected on {date}. Lightning risk."),
        action: "Stay indoors during storms, avoid open areas, unplug electronics.".to_string(),
        date: Some(date.to_string()),
    }
}
