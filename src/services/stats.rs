use serde::Serialize;

use crate::models::TrainData;
use crate::services::delay::{classify, effective_delay, format_delay, Bucket};
use crate::tools::i18n::{Key, Localizer};

pub const ISSUE_URL: &str = "https://github.com/Robbe7730/DelayMap/issues";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    pub num_green: usize,
    pub num_orange: usize,
    pub num_red: usize,
    pub max_delay: f64,
    /// `None` for an empty batch.
    pub avg_delay: Option<f64>,
    pub total: usize,
}

impl StatsSummary {
    pub fn count(&self, bucket: Bucket) -> usize {
        match bucket {
            Bucket::Green => self.num_green,
            Bucket::Orange => self.num_orange,
            Bucket::Red => self.num_red,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

pub fn aggregate(trains: &[TrainData]) -> StatsSummary {
    let mut num_green = 0;
    let mut num_orange = 0;
    let mut num_red = 0;
    let mut max_delay: f64 = 0.0;
    let mut total_delay = 0.0;

    for train in trains {
        let delay = effective_delay(train);
        match classify(delay) {
            Bucket::Green => num_green += 1,
            Bucket::Orange => num_orange += 1,
            Bucket::Red => num_red += 1,
        }
        max_delay = max_delay.max(delay);
        total_delay += delay;
    }

    let avg_delay = if trains.is_empty() {
        None
    } else {
        Some(total_delay / trains.len() as f64)
    };

    StatsSummary {
        num_green,
        num_orange,
        num_red,
        max_delay,
        avg_delay,
        total: trains.len(),
    }
}

/// What the statistics panel currently shows.
///
/// Starts in `Loading` and never returns there: every fetch result replaces
/// the previous state with `Populated` or `Error`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum StatsDisplay {
    #[default]
    Loading,
    Populated { summary: StatsSummary },
    Error { message: String },
}

impl StatsDisplay {
    pub fn populate(&mut self, trains: &[TrainData]) {
        *self = StatsDisplay::Populated {
            summary: aggregate(trains),
        };
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        *self = StatsDisplay::Error {
            message: message.into(),
        };
    }

    pub fn summary(&self) -> Option<&StatsSummary> {
        match self {
            StatsDisplay::Populated { summary } => Some(summary),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, StatsDisplay::Loading)
    }

    /// Panel text, one entry per line.
    pub fn render(&self, i18n: Localizer<'_>) -> Vec<String> {
        match self {
            StatsDisplay::Loading => vec![i18n.t(Key::StatsLoading)],
            StatsDisplay::Error { message } => vec![
                format!(
                    "{} {} ({})",
                    i18n.t(Key::ErrorPre),
                    i18n.t(Key::ErrorFileIssue),
                    ISSUE_URL
                ),
                format!("{}: {}", i18n.t(Key::ErrorMessage), message),
            ],
            StatsDisplay::Populated { summary } if summary.is_empty() => {
                vec![i18n.t(Key::StatsTitle), i18n.t(Key::StatsNoTrains)]
            }
            StatsDisplay::Populated { summary } => vec![
                i18n.t(Key::StatsTitle),
                format!(
                    "{}: {} min",
                    i18n.t(Key::StatsAverageDelay),
                    format_delay(summary.avg_delay.unwrap_or_default())
                ),
                format!(
                    "{}: {} min",
                    i18n.t(Key::StatsMaximumDelay),
                    format_delay(summary.max_delay)
                ),
                format!("{}: {}", i18n.t(Key::StatsGreenTrains), summary.num_green),
                format!("{}: {}", i18n.t(Key::StatsOrangeTrains), summary.num_orange),
                format!("{}: {}", i18n.t(Key::StatsRedTrains), summary.num_red),
                format!("{}: {}", i18n.t(Key::StatsTotalTrains), summary.total),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::delay::tests::{delayed_train, stop, train};
    use crate::tools::i18n::tests::translations;
    use crate::tools::i18n::Language;

    #[test]
    fn aggregates_one_train_per_bucket() {
        let batch = vec![
            delayed_train("a", 0.0),
            delayed_train("b", 120.0),
            delayed_train("c", 400.0),
        ];
        let summary = aggregate(&batch);

        assert_eq!(summary.num_green, 1);
        assert_eq!(summary.num_orange, 1);
        assert_eq!(summary.num_red, 1);
        assert_eq!(summary.max_delay, 400.0);
        let avg = summary.avg_delay.unwrap();
        assert!((avg - 520.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn bucket_counts_sum_to_batch_length() {
        let delays = [0.0, 0.0, 1.0, 359.0, 360.0, 361.0, 3600.0];
        let mut batch: Vec<_> = delays
            .iter()
            .enumerate()
            .map(|(i, d)| delayed_train(&i.to_string(), *d))
            .collect();
        batch.push(train("past-end", vec![stop("Leuven", 900.0, 900.0)], 4, false));

        let summary = aggregate(&batch);
        assert_eq!(
            summary.num_green + summary.num_orange + summary.num_red,
            batch.len()
        );
        assert_eq!(summary.total, batch.len());
        assert_eq!(summary.num_green, 3);
        assert_eq!(summary.num_orange, 3);
        assert_eq!(summary.num_red, 2);
        assert_eq!(summary.max_delay, 3600.0);
    }

    #[test]
    fn all_on_time_batch_has_zero_max() {
        let summary = aggregate(&[delayed_train("a", 0.0), delayed_train("b", 0.0)]);
        assert_eq!(summary.max_delay, 0.0);
        assert_eq!(summary.avg_delay, Some(0.0));
    }

    #[test]
    fn empty_batch_has_no_average() {
        let summary = aggregate(&[]);
        assert!(summary.is_empty());
        assert_eq!(summary.avg_delay, None);
        assert_eq!(summary.max_delay, 0.0);
    }

    #[test]
    fn display_transitions() {
        let mut display = StatsDisplay::default();
        assert!(display.is_loading());

        display.fail("error sending request for url");
        assert_eq!(
            display,
            StatsDisplay::Error {
                message: "error sending request for url".to_string()
            }
        );

        display.populate(&[delayed_train("a", 60.0)]);
        assert_eq!(display.summary().map(|s| s.num_orange), Some(1));

        display.populate(&[]);
        assert_eq!(display.summary().map(|s| s.total), Some(0));
        assert!(!display.is_loading());
    }

    #[test]
    fn renders_populated_panel() {
        let mut display = StatsDisplay::default();
        display.populate(&[delayed_train("a", 0.0), delayed_train("b", 250.0)]);

        let translations = translations();
        let lines = display.render(translations.localizer(Language::En));
        assert_eq!(lines[0], "Statistics");
        assert_eq!(lines[1], "Average delay: 2:05 min");
        assert_eq!(lines[2], "Maximum delay: 4:10 min");
        assert_eq!(lines[6], "Total trains: 2");
    }

    #[test]
    fn renders_empty_and_error_panels() {
        let translations = translations();
        let en = translations.localizer(Language::En);
        let mut display = StatsDisplay::default();
        assert_eq!(
            display.render(translations.localizer(Language::Nl)),
            vec!["Laden...".to_string()]
        );

        display.populate(&[]);
        assert_eq!(display.render(en)[1], "No trains");

        display.fail("timed out");
        let lines = display.render(en);
        assert!(lines[0].contains(ISSUE_URL));
        assert_eq!(lines[1], "Error message: timed out");
    }
}
