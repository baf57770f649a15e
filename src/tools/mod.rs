pub mod dhall;
pub mod i18n;
pub mod logger;
pub mod prometheus;
