// core/src/error.rs
use thiserror::Error;

/// Feil fra I/O-kantene (lagring, capture-parsing, CLI).
/// Kjernen (konvertering, merge, CSV-projeksjon) er total og returnerer aldri feil.
#[derive(Debug, Error)]
pub enum ShotDataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON som ikke matcher datamodellen; `path` peker på feltet (serde_path_to_error).
    #[error("JSON parse error at {path}: {message}")]
    Json { path: String, message: String },

    #[error("unknown unit preference: {0:?} (expected \"imperial\" or \"metric\")")]
    UnknownUnitPreference(String),

    #[error("No data to export")]
    NoData,

    #[error("payload does not contain shot data: {0}")]
    InvalidPayload(String),

    #[error("usage: {0}")]
    Usage(String),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl From<serde_path_to_error::Error<serde_json::Error>> for ShotDataError {
    fn from(e: serde_path_to_error::Error<serde_json::Error>) -> Self {
        ShotDataError::Json {
            path: e.path().to_string(),
            message: e.inner().to_string(),
        }
    }
}

impl From<serde_json::Error> for ShotDataError {
    fn from(e: serde_json::Error) -> Self {
        ShotDataError::Json {
            path: ".".to_string(),
            message: e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ShotDataError>;

/// Deserialiser JSON-tekst med sti-informasjon i feilmeldingen.
pub fn from_json_str<T>(text: &str) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let mut de = serde_json::Deserializer::from_str(text);
    let value = serde_path_to_error::deserialize(&mut de)?;
    de.end()?;
    Ok(value)
}
