use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLong {
    pub lat: f64,
    pub lon: f64,
}

/// One scheduled stop of a train's itinerary.
///
/// Delays are in seconds, timestamps in minutes after midnight. Some
/// intermediate stops come without coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopTime {
    pub name: String,
    pub arrival_delay: f64,
    pub departure_delay: f64,
    pub arrival_timestamp: f64,
    pub departure_timestamp: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

impl StopTime {
    pub fn position(&self) -> Option<LatLong> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(LatLong { lat, lon }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainData {
    pub id: String,
    pub name: String,
    pub stops: Vec<StopTime>,
    pub stop_index: usize,
    pub is_stopped: bool,
    pub estimated_lat: f64,
    pub estimated_lon: f64,
}

impl TrainData {
    /// The stop the train is at or heading to, if `stop_index` is in range.
    pub fn current_station(&self) -> Option<&StopTime> {
        self.stops.get(self.stop_index)
    }

    pub fn position(&self) -> LatLong {
        LatLong {
            lat: self.estimated_lat,
            lon: self.estimated_lon,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub name: String,
    pub stop_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorksUrl {
    pub url: String,
    pub label: String,
}

/// Scheduled track works, passed through from the backend for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorksData {
    pub id: String,
    pub name: String,
    pub message: String,
    pub start_date: String,
    pub start_time: String,
    pub end_date: String,
    pub end_time: String,
    #[serde(default)]
    pub urls: Vec<WorksUrl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impacted_station: Option<Stop>,
}

pub type ApiTrainData = Vec<TrainData>;
pub type ApiWorksData = Vec<WorksData>;

pub fn clean_identifier(identifier: &str) -> String {
    urlencoding::decode(identifier)
        .map(|decoded| decoded.trim().to_string())
        .unwrap_or_else(|_| identifier.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_camel_case_train_payload() {
        let payload = r#"[{
            "id": "IC 1234",
            "name": "IC 1234 Oostende - Eupen",
            "stops": [
                {"name": "Brugge", "arrivalDelay": 0, "departureDelay": 60,
                 "arrivalTimestamp": 600, "departureTimestamp": 602,
                 "lat": 51.197, "lon": 3.216},
                {"name": "Aalter", "arrivalDelay": 120, "departureDelay": 120,
                 "arrivalTimestamp": 612, "departureTimestamp": 613}
            ],
            "stopIndex": 1,
            "isStopped": false,
            "estimatedLat": 51.1,
            "estimatedLon": 3.4
        }]"#;

        let trains: ApiTrainData = serde_json::from_str(payload).unwrap();
        assert_eq!(trains.len(), 1);
        let train = &trains[0];
        assert_eq!(train.stop_index, 1);
        assert_eq!(train.current_station().map(|s| s.name.as_str()), Some("Aalter"));
        assert_eq!(
            train.stops[0].position(),
            Some(LatLong { lat: 51.197, lon: 3.216 })
        );
        assert_eq!(train.stops[1].position(), None);
    }

    #[test]
    fn rejects_negative_stop_index() {
        let payload = r#"{"id": "x", "name": "x", "stops": [], "stopIndex": -1,
            "isStopped": false, "estimatedLat": 0, "estimatedLon": 0}"#;
        assert!(serde_json::from_str::<TrainData>(payload).is_err());
    }

    #[test]
    fn decodes_works_without_station_or_urls() {
        let payload = r#"{"id": "w1", "name": "Works Gent", "message": "Single track",
            "startDate": "01/10", "startTime": "22:00",
            "endDate": "02/10", "endTime": "05:00"}"#;
        let works: WorksData = serde_json::from_str(payload).unwrap();
        assert!(works.urls.is_empty());
        assert!(works.impacted_station.is_none());
    }

    #[test]
    fn clean_identifier_decodes_percent_escapes() {
        assert_eq!(clean_identifier("IC%201234"), "IC 1234");
        assert_eq!(clean_identifier(" 88:007 "), "88:007");
    }
}
