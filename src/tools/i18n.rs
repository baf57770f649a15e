use i18n_embed::fluent::FluentLanguageLoader;
use i18n_embed::LanguageLoader;
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use unic_langid::LanguageIdentifier;

use crate::errors::{AppError, AppResult};

#[derive(RustEmbed)]
#[folder = "i18n/"]
struct Localizations;

const DOMAIN: &str = "delaymap";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    #[default]
    Nl,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Nl];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Nl => "nl",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "nl" => Ok(Language::Nl),
            other => Err(AppError::BadRequest(format!(
                "Unsupported language: {}",
                other
            ))),
        }
    }
}

/// Message ids in `i18n/<lang>/delaymap.ftl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    StatsTitle,
    StatsAverageDelay,
    StatsMaximumDelay,
    StatsGreenTrains,
    StatsOrangeTrains,
    StatsRedTrains,
    StatsTotalTrains,
    StatsLoading,
    StatsNoTrains,
    ErrorPre,
    ErrorFileIssue,
    ErrorMessage,
    NextStop,
    LegendTitle,
    LegendGreen,
    LegendOrange,
    LegendRed,
}

impl Key {
    pub fn message_id(&self) -> &'static str {
        match self {
            Key::StatsTitle => "stats-title",
            Key::StatsAverageDelay => "stats-average-delay",
            Key::StatsMaximumDelay => "stats-maximum-delay",
            Key::StatsGreenTrains => "stats-green-trains",
            Key::StatsOrangeTrains => "stats-orange-trains",
            Key::StatsRedTrains => "stats-red-trains",
            Key::StatsTotalTrains => "stats-total-trains",
            Key::StatsLoading => "stats-loading",
            Key::StatsNoTrains => "stats-no-trains",
            Key::ErrorPre => "error-pre",
            Key::ErrorFileIssue => "error-file-issue",
            Key::ErrorMessage => "error-message",
            Key::NextStop => "train-marker-next-stop",
            Key::LegendTitle => "legend-title",
            Key::LegendGreen => "legend-green",
            Key::LegendOrange => "legend-orange",
            Key::LegendRed => "legend-red",
        }
    }
}

/// One fluent loader per supported language, loaded from the embedded
/// `.ftl` files.
pub struct Translations {
    en: FluentLanguageLoader,
    nl: FluentLanguageLoader,
}

impl Translations {
    pub fn load() -> AppResult<Self> {
        Ok(Self {
            en: load_language(Language::En)?,
            nl: load_language(Language::Nl)?,
        })
    }

    pub fn loader(&self, lang: Language) -> &FluentLanguageLoader {
        match lang {
            Language::En => &self.en,
            Language::Nl => &self.nl,
        }
    }

    pub fn localizer(&self, lang: Language) -> Localizer<'_> {
        Localizer {
            loader: self.loader(lang),
        }
    }
}

impl fmt::Debug for Translations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translations")
            .field("languages", &Language::ALL)
            .finish()
    }
}

fn load_language(lang: Language) -> AppResult<FluentLanguageLoader> {
    let language_id: LanguageIdentifier = lang
        .as_str()
        .parse()
        .map_err(|e| AppError::Internal(format!("Invalid language id {}: {}", lang, e)))?;
    let loader = FluentLanguageLoader::new(DOMAIN, language_id);
    loader
        .load_fallback_language(&Localizations)
        .map_err(|e| AppError::Internal(format!("Failed to load {} translations: {}", lang, e)))?;
    Ok(loader)
}

/// Looks up display strings in one language.
#[derive(Clone, Copy)]
pub struct Localizer<'a> {
    loader: &'a FluentLanguageLoader,
}

impl Localizer<'_> {
    pub fn t(&self, key: Key) -> String {
        self.loader.get(key.message_id())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn translations() -> Translations {
        Translations::load().unwrap()
    }

    #[test]
    fn parses_supported_languages() {
        assert_eq!("EN".parse::<Language>().unwrap(), Language::En);
        assert_eq!(" nl".parse::<Language>().unwrap(), Language::Nl);
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn default_language_is_dutch() {
        let translations = translations();
        assert_eq!(Language::default(), Language::Nl);
        assert_eq!(
            translations.localizer(Language::default()).t(Key::NextStop),
            "Volgende stop"
        );
    }

    #[test]
    fn every_key_is_translated_in_every_language() {
        let translations = translations();
        let keys = [
            Key::StatsTitle,
            Key::StatsAverageDelay,
            Key::StatsMaximumDelay,
            Key::StatsGreenTrains,
            Key::StatsOrangeTrains,
            Key::StatsRedTrains,
            Key::StatsTotalTrains,
            Key::StatsLoading,
            Key::StatsNoTrains,
            Key::ErrorPre,
            Key::ErrorFileIssue,
            Key::ErrorMessage,
            Key::NextStop,
            Key::LegendTitle,
            Key::LegendGreen,
            Key::LegendOrange,
            Key::LegendRed,
        ];
        for lang in Language::ALL {
            let loader = translations.loader(lang);
            for key in keys {
                assert!(
                    loader.has(key.message_id()),
                    "{} is missing {}",
                    lang,
                    key.message_id()
                );
            }
        }
    }

    #[test]
    fn languages_use_their_own_files() {
        let translations = translations();
        assert_eq!(translations.localizer(Language::En).t(Key::LegendTitle), "Legend");
        assert_eq!(translations.localizer(Language::Nl).t(Key::LegendTitle), "Legende");
    }
}
