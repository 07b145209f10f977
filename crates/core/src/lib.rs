pub mod config;
pub mod domain;

pub use config::{AppConfig, ConfigError, LoadOptions, MixpanelConfig, SlackConfig};
pub use domain::period::{PeriodError, PeriodTerm, PeriodUnit, RelativePeriod};
pub use domain::request::InboundRequest;
