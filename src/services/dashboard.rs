use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::errors::{AppError, AppResult};
use crate::models::{ApiTrainData, ApiWorksData, LatLong};
use crate::services::delay::Bucket;
use crate::services::markers::{cluster_size, route_polyline, ClusterSize, MapMarker, MarkerView};
use crate::services::stats::StatsDisplay;
use crate::tools::i18n::{Key, Language, Localizer, Translations};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Feed {
    Trains,
    Works,
}

impl Feed {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feed::Trains => "trains",
            Feed::Works => "works",
        }
    }
}

/// Whether a fetch result made it onto the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Yes,
    Stale,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteView {
    pub train_id: Option<String>,
    pub polyline: Vec<LatLong>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub color: &'static str,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub title: String,
    pub entries: Vec<LegendEntry>,
}

/// Everything the map front-end displays.
///
/// Every fetch result carries the sequence number it was requested with;
/// a result older than the one last applied for its feed is dropped.
#[derive(Debug)]
pub struct Dashboard {
    translations: Arc<Translations>,
    language: Language,
    stats: StatsDisplay,
    train_markers: Vec<MapMarker>,
    works_markers: Vec<MapMarker>,
    works_error: Option<String>,
    selected_train: Option<String>,
    route: Vec<LatLong>,
    last_trains_seq: Option<u64>,
    last_works_seq: Option<u64>,
    last_update: Option<DateTime<Utc>>,
}

impl Dashboard {
    pub fn new(language: Language, translations: Arc<Translations>) -> Self {
        Self {
            translations,
            language,
            stats: StatsDisplay::default(),
            train_markers: Vec::new(),
            works_markers: Vec::new(),
            works_error: None,
            selected_train: None,
            route: Vec::new(),
            last_trains_seq: None,
            last_works_seq: None,
            last_update: None,
        }
    }

    fn accept(&mut self, feed: Feed, seq: u64) -> bool {
        let last = match feed {
            Feed::Trains => &mut self.last_trains_seq,
            Feed::Works => &mut self.last_works_seq,
        };
        if last.is_some_and(|last| seq <= last) {
            debug!(
                "Discarding stale {} response #{} (showing #{:?})",
                feed.as_str(),
                seq,
                last
            );
            return false;
        }
        *last = Some(seq);
        true
    }

    pub fn apply_trains(&mut self, seq: u64, result: AppResult<ApiTrainData>) -> Applied {
        if !self.accept(Feed::Trains, seq) {
            return Applied::Stale;
        }

        match result {
            Ok(trains) => {
                self.stats.populate(&trains);
                self.train_markers = trains.into_iter().map(MapMarker::Train).collect();
                self.last_update = Some(Utc::now());
                self.redraw_route();
                info!("Showing {} trains (#{})", self.train_markers.len(), seq);
            }
            Err(e) => {
                warn!("Train fetch #{} failed: {}", seq, e);
                self.stats.fail(e.to_string());
                self.train_markers.clear();
                self.clear_selection();
            }
        }
        Applied::Yes
    }

    pub fn apply_works(&mut self, seq: u64, result: AppResult<ApiWorksData>) -> Applied {
        if !self.accept(Feed::Works, seq) {
            return Applied::Stale;
        }

        match result {
            Ok(works) => {
                self.works_markers = works.into_iter().map(MapMarker::Works).collect();
                self.works_error = None;
                debug!("Showing {} works (#{})", self.works_markers.len(), seq);
            }
            Err(e) => {
                warn!("Works fetch #{} failed: {}", seq, e);
                self.works_markers.clear();
                self.works_error = Some(e.to_string());
            }
        }
        Applied::Yes
    }

    fn find_train(&self, train_id: &str) -> Option<&MapMarker> {
        self.train_markers.iter().find(|m| m.id() == train_id)
    }

    /// Recomputes the selected train's route from the current markers; the
    /// selection is dropped when the train is gone.
    fn redraw_route(&mut self) {
        let Some(train_id) = self.selected_train.clone() else {
            return;
        };
        let route = self
            .find_train(&train_id)
            .and_then(MapMarker::train)
            .map(route_polyline);
        match route {
            Some(route) => self.route = route,
            None => {
                debug!("Selected train {} no longer reported", train_id);
                self.selected_train = None;
                self.route.clear();
            }
        }
    }

    pub fn select_train(&mut self, train_id: &str) -> AppResult<RouteView> {
        let route = self
            .find_train(train_id)
            .and_then(MapMarker::train)
            .map(route_polyline)
            .ok_or_else(|| AppError::NotFound(format!("Train {} not found", train_id)))?;
        self.route = route;
        self.selected_train = Some(train_id.to_string());
        Ok(self.route_view())
    }

    pub fn clear_selection(&mut self) {
        self.selected_train = None;
        self.route.clear();
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn language(&self) -> Language {
        self.language
    }

    fn localizer(&self) -> Localizer<'_> {
        self.translations.localizer(self.language)
    }

    pub fn stats(&self) -> &StatsDisplay {
        &self.stats
    }

    pub fn stats_lines(&self) -> Vec<String> {
        self.stats.render(self.localizer())
    }

    pub fn legend(&self) -> Legend {
        let i18n = self.localizer();
        let entries = [
            (Bucket::Green, Key::LegendGreen),
            (Bucket::Orange, Key::LegendOrange),
            (Bucket::Red, Key::LegendRed),
        ]
        .into_iter()
        .map(|(bucket, key)| LegendEntry {
            color: bucket.color(),
            label: i18n.t(key),
        })
        .collect();

        Legend {
            title: i18n.t(Key::LegendTitle),
            entries,
        }
    }

    pub fn works_error(&self) -> Option<&str> {
        self.works_error.as_deref()
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    /// True once the first trains fetch has resolved, successfully or not.
    pub fn is_ready(&self) -> bool {
        !self.stats.is_loading()
    }

    pub fn marker_views(&self, feed: Feed) -> Vec<MarkerView> {
        let markers = match feed {
            Feed::Trains => &self.train_markers,
            Feed::Works => &self.works_markers,
        };
        let i18n = self.localizer();
        markers.iter().map(|m| m.view(i18n)).collect()
    }

    /// Severity of the cluster formed by the given train markers. Ids that
    /// are not currently shown are ignored.
    pub fn cluster(&self, train_ids: &[String]) -> ClusterSize {
        cluster_size(
            self.train_markers
                .iter()
                .filter(|m| train_ids.iter().any(|id| id == m.id()))
                .filter_map(MapMarker::train),
        )
    }

    pub fn route_view(&self) -> RouteView {
        RouteView {
            train_id: self.selected_train.clone(),
            polyline: self.route.clone(),
        }
    }
}
