//! Kjerne for slagdata: enhetskatalog og -konvertering, posisjonell
//! sammenslåing av delvise fangster og CSV-projeksjon.

pub mod capture;
pub mod cli;
pub mod convert;
pub mod error;
pub mod export;
pub mod merge;
pub mod models;
pub mod storage;
pub mod telemetry;
pub mod units;

pub use convert::{convert_angle, convert_distance, convert_speed, normalize_metric_value, RoundTo};
pub use error::{Result, ShotDataError};
pub use export::{export_filename, order_metrics_by_priority, write_csv, ColumnLayout, CsvTable, ExportOptions};
pub use merge::{merge_session_data, MergeStrategy, PositionalMerge, SessionMerger};
pub use models::{CaptureSource, ClubGroup, MetricMap, MetricValue, SessionData, Shot, UrlType};
pub use storage::{IngestOutcome, SessionStore};
pub use units::{
    AngleUnit, DistanceUnit, MetricCategory, SpeedUnit, UnitCatalog, UnitPreference, UnitSystem,
};
