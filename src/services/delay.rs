use serde::{Deserialize, Serialize};

use crate::models::TrainData;

/// Delays up to and including this many seconds are orange, anything above is red.
pub const ORANGE_THRESHOLD_SECS: f64 = 360.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Green,
    Orange,
    Red,
}

impl Bucket {
    pub fn color(&self) -> &'static str {
        match self {
            Bucket::Green => "green",
            Bucket::Orange => "orange",
            Bucket::Red => "red",
        }
    }
}

/// Delay in seconds used for display: the departure delay while the train
/// dwells at its current stop, the arrival delay while it is heading there.
///
/// A train without a current station has no delay. Negative and NaN delays
/// are clamped to 0.
pub fn effective_delay(train: &TrainData) -> f64 {
    let delay = match train.current_station() {
        Some(station) if train.is_stopped => station.departure_delay,
        Some(station) => station.arrival_delay,
        None => 0.0,
    };
    delay.max(0.0)
}

pub fn classify(delay_secs: f64) -> Bucket {
    if delay_secs.is_nan() || delay_secs <= 0.0 {
        Bucket::Green
    } else if delay_secs <= ORANGE_THRESHOLD_SECS {
        Bucket::Orange
    } else {
        Bucket::Red
    }
}

pub fn train_bucket(train: &TrainData) -> Bucket {
    classify(effective_delay(train))
}

/// Renders a delay as `M:SS`, e.g. 125 seconds as `2:05`.
pub fn format_delay(delay_secs: f64) -> String {
    let total = if delay_secs.is_finite() && delay_secs > 0.0 {
        delay_secs.round() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::StopTime;

    pub(crate) fn stop(name: &str, arrival_delay: f64, departure_delay: f64) -> StopTime {
        StopTime {
            name: name.to_string(),
            arrival_delay,
            departure_delay,
            arrival_timestamp: 600.0,
            departure_timestamp: 601.0,
            lat: None,
            lon: None,
        }
    }

    pub(crate) fn train(id: &str, stops: Vec<StopTime>, stop_index: usize, is_stopped: bool) -> TrainData {
        TrainData {
            id: id.to_string(),
            name: format!("IC {}", id),
            stops,
            stop_index,
            is_stopped,
            estimated_lat: 50.85,
            estimated_lon: 4.35,
        }
    }

    /// A train whose effective delay is exactly `delay` seconds.
    pub(crate) fn delayed_train(id: &str, delay: f64) -> TrainData {
        train(id, vec![stop("Brussel-Zuid", delay, delay)], 0, false)
    }

    #[test]
    fn uses_departure_delay_when_stopped() {
        let t = train("1", vec![stop("Gent", 30.0, 90.0)], 0, true);
        assert_eq!(effective_delay(&t), 90.0);
    }

    #[test]
    fn uses_arrival_delay_when_en_route() {
        let t = train("1", vec![stop("Gent", 30.0, 90.0)], 0, false);
        assert_eq!(effective_delay(&t), 30.0);
    }

    #[test]
    fn missing_station_has_no_delay() {
        let stops = vec![
            stop("Oostende", 600.0, 600.0),
            stop("Brugge", 600.0, 600.0),
            stop("Gent", 600.0, 600.0),
        ];
        let past_end = train("1", stops, 5, false);
        assert_eq!(effective_delay(&past_end), 0.0);
        assert_eq!(train_bucket(&past_end), Bucket::Green);

        let empty = train("2", Vec::new(), 0, true);
        assert_eq!(effective_delay(&empty), 0.0);
    }

    #[test]
    fn negative_delay_is_clamped() {
        let early = train("1", vec![stop("Gent", -120.0, -30.0)], 0, false);
        assert_eq!(effective_delay(&early), 0.0);
        assert_eq!(classify(-120.0), Bucket::Green);
    }

    #[test]
    fn classify_boundaries() {
        assert_eq!(classify(0.0), Bucket::Green);
        assert_eq!(classify(0.0001), Bucket::Orange);
        assert_eq!(classify(120.0), Bucket::Orange);
        assert_eq!(classify(360.0), Bucket::Orange);
        assert_eq!(classify(360.0001), Bucket::Red);
        assert_eq!(classify(361.0), Bucket::Red);
        assert_eq!(classify(f64::NAN), Bucket::Green);
    }

    #[test]
    fn format_delay_examples() {
        assert_eq!(format_delay(125.0), "2:05");
        assert_eq!(format_delay(65.0), "1:05");
        assert_eq!(format_delay(5.0), "0:05");
        assert_eq!(format_delay(600.0), "10:00");
        assert_eq!(format_delay(0.0), "0:00");
    }

    #[test]
    fn format_delay_rounds_before_splitting() {
        assert_eq!(format_delay(59.6), "1:00");
        assert_eq!(format_delay(173.333), "2:53");
        assert_eq!(format_delay(-4.0), "0:00");
    }
}
