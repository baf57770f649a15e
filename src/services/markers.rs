use serde::Serialize;

use crate::models::{LatLong, TrainData, WorksData};
use crate::services::delay::{effective_delay, format_delay, train_bucket, ORANGE_THRESHOLD_SECS};
use crate::tools::i18n::{Key, Localizer};

/// Average cluster delay below which a cluster is drawn as `small`.
const SMALL_CLUSTER_SECS: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Train,
    Works,
}

/// How one kind of record is drawn on the map.
pub trait MarkerStyle {
    fn icon(&self) -> &'static str;
    fn position(&self) -> LatLong;
    fn color(&self) -> &'static str;
    fn popup(&self, i18n: Localizer<'_>) -> Vec<String>;
}

impl MarkerStyle for TrainData {
    fn icon(&self) -> &'static str {
        "train"
    }

    fn position(&self) -> LatLong {
        TrainData::position(self)
    }

    fn color(&self) -> &'static str {
        train_bucket(self).color()
    }

    fn popup(&self, i18n: Localizer<'_>) -> Vec<String> {
        let next_stop = self
            .current_station()
            .map(|station| station.name.as_str())
            .unwrap_or_default();

        vec![
            format!("{}: +{} min", self.name, format_delay(effective_delay(self))),
            format!("{}: {}", i18n.t(Key::NextStop), next_stop),
        ]
    }
}

impl MarkerStyle for WorksData {
    fn icon(&self) -> &'static str {
        "exclamation-triangle"
    }

    fn position(&self) -> LatLong {
        let station = self.impacted_station.as_ref();
        LatLong {
            lat: station.and_then(|s| s.lat).unwrap_or(0.0),
            lon: station.and_then(|s| s.lon).unwrap_or(0.0),
        }
    }

    fn color(&self) -> &'static str {
        "red"
    }

    fn popup(&self, _i18n: Localizer<'_>) -> Vec<String> {
        let mut lines = vec![
            self.name.clone(),
            self.message.clone(),
            format!(
                "{} {} - {} {}",
                self.start_date, self.start_time, self.end_date, self.end_time
            ),
        ];

        if !self.urls.is_empty() {
            let links: Vec<String> = self
                .urls
                .iter()
                .map(|u| format!("{} <{}>", u.label, u.url))
                .collect();
            lines.push(format!("Info: {}", links.join(", ")));
        }
        lines
    }
}

/// A map marker together with the record it was created from.
#[derive(Debug, Clone, PartialEq)]
pub enum MapMarker {
    Train(TrainData),
    Works(WorksData),
}

impl MapMarker {
    pub fn kind(&self) -> MarkerKind {
        match self {
            MapMarker::Train(_) => MarkerKind::Train,
            MapMarker::Works(_) => MarkerKind::Works,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            MapMarker::Train(train) => &train.id,
            MapMarker::Works(works) => &works.id,
        }
    }

    pub fn train(&self) -> Option<&TrainData> {
        match self {
            MapMarker::Train(train) => Some(train),
            MapMarker::Works(_) => None,
        }
    }

    pub fn style(&self) -> &dyn MarkerStyle {
        match self {
            MapMarker::Train(train) => train,
            MapMarker::Works(works) => works,
        }
    }

    pub fn view(&self, i18n: Localizer<'_>) -> MarkerView {
        let style = self.style();
        MarkerView {
            id: self.id().to_string(),
            kind: self.kind(),
            position: style.position(),
            color: style.color(),
            icon: style.icon(),
            popup: style.popup(i18n),
        }
    }
}

/// Flattened marker as handed to the map front-end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerView {
    pub id: String,
    pub kind: MarkerKind,
    pub position: LatLong,
    pub color: &'static str,
    pub icon: &'static str,
    pub popup: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterSize {
    Small,
    Medium,
    Large,
}

/// Severity of a group of clustered train markers, by their average delay.
pub fn cluster_size<'a>(trains: impl IntoIterator<Item = &'a TrainData>) -> ClusterSize {
    let (count, total) = trains
        .into_iter()
        .fold((0usize, 0.0), |(count, total), train| {
            (count + 1, total + effective_delay(train))
        });
    if count == 0 {
        return ClusterSize::Small;
    }

    let avg_delay = total / count as f64;
    if avg_delay < SMALL_CLUSTER_SECS {
        ClusterSize::Small
    } else if avg_delay < ORANGE_THRESHOLD_SECS {
        ClusterSize::Medium
    } else {
        ClusterSize::Large
    }
}

/// The stops of `train` that have coordinates, in timetable order.
pub fn route_polyline(train: &TrainData) -> Vec<LatLong> {
    train.stops.iter().filter_map(|stop| stop.position()).collect()
}
