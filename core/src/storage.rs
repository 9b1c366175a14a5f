// core/src/storage.rs
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{from_json_str, Result, ShotDataError};
use crate::export::{export_filename, project_session, ExportOptions};
use crate::merge::merge_session_data;
use crate::models::SessionData;
use crate::telemetry::Telemetry;
use crate::units::UnitPreference;

/// Innholdet i lagringsfilen. Nøklene matcher nettleser-lagringen (`trackmanData`, `unitPreference`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreFile {
    #[serde(rename = "trackmanData", default)]
    pub trackman_data: Option<SessionData>,
    #[serde(rename = "unitPreference", default, deserialize_with = "lenient_unit_preference")]
    pub unit_preference: UnitPreference,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

// Ukjent eller feil typet verdi gir standardpreferansen; resten av filen lastes likevel
fn lenient_unit_preference<'de, D>(de: D) -> std::result::Result<UnitPreference, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(de)?;
    let parsed = raw.as_str().and_then(|s| s.parse::<UnitPreference>().ok());
    Ok(parsed.unwrap_or_else(|| {
        if !raw.is_null() {
            log::warn!("ukjent unitPreference {}, bruker {}", raw, UnitPreference::default());
        }
        UnitPreference::default()
    }))
}

/// Hva `ingest` gjorde med fangsten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Merged,
    Replaced,
}

/// Ett "nåværende" økt-slot pluss enhetspreferanse, lagret som JSON på disk.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    state: StoreFile,
    telemetry: Telemetry,
}

impl SessionStore {
    /// Åpner lagringsfilen. Finnes den ikke, startes det med tom tilstand.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            let state: StoreFile = from_json_str(&contents)?;
            log::info!(
                "📂 Lager lastet fra {} (økt={}, enheter={})",
                path.display(),
                state.trackman_data.is_some(),
                state.unit_preference
            );
            state
        } else {
            log::info!("⚠️ Fant ikke lager på {}, starter tomt", path.display());
            StoreFile::default()
        };
        Ok(Self { path, state, telemetry: Telemetry::new()? })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        self.state.saved_at
    }

    pub fn get(&self) -> Option<&SessionData> {
        self.state.trackman_data.as_ref()
    }

    pub fn set(&mut self, session: SessionData) -> Result<()> {
        self.state.trackman_data = Some(session);
        self.save()
    }

    pub fn clear(&mut self) -> Result<()> {
        self.state.trackman_data = None;
        self.save()
    }

    pub fn unit_preference(&self) -> UnitPreference {
        self.state.unit_preference
    }

    pub fn set_unit_preference(&mut self, pref: UnitPreference) -> Result<()> {
        self.state.unit_preference = pref;
        self.save()
    }

    /// Flett fangsten inn i lagret økt hvis den tilhører samme rapport, ellers erstatt.
    pub fn ingest(&mut self, capture: SessionData) -> Result<IngestOutcome> {
        let (next, outcome) = match self.state.trackman_data.take() {
            Some(stored) if !stored.is_empty() && same_report(&stored, &capture) => {
                (merge_session_data(&stored, &capture), IngestOutcome::Merged)
            }
            _ => {
                // Fangsten kan komme med utdatert metric_names (f.eks. fra `merge <fil>`)
                let mut fresh = capture;
                fresh.recompute_metric_names();
                (fresh, IngestOutcome::Replaced)
            }
        };

        match outcome {
            IngestOutcome::Merged => self.telemetry.captures_merged.inc(),
            IngestOutcome::Replaced => self.telemetry.captures_replaced.inc(),
        }
        log::info!(
            "ingest: {:?} (klubber={}, slag={})",
            outcome,
            next.club_groups.len(),
            next.total_shots()
        );
        self.set(next)?;
        Ok(outcome)
    }

    /// Skriv `dir/ShotData_<dato>.csv` med lagret enhetspreferanse.
    pub fn export_csv(&self, dir: impl AsRef<Path>, include_averages: bool) -> Result<PathBuf> {
        let session = match self.get() {
            Some(s) if !s.is_empty() => s,
            _ => return Err(ShotDataError::NoData),
        };

        let opts = ExportOptions {
            include_averages,
            metric_order: None,
            unit_preference: self.unit_preference(),
        };
        let table = project_session(session, &opts);

        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let out = dir.join(export_filename(session));
        std::fs::write(&out, table.to_csv_string())?;

        self.telemetry.csv_rows_exported.inc_by(table.rows.len() as u64);
        log::info!("✅ CSV skrevet til {} ({} rader)", out.display(), table.rows.len());
        Ok(out)
    }

    fn save(&mut self) -> Result<()> {
        self.state.saved_at = Some(Utc::now());
        let json = serde_json::to_string_pretty(&self.state)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, json)?;
        log::info!("✅ Lager skrevet til {}", self.path.display());
        Ok(())
    }
}

// "unknown" matcher alt
fn same_report(stored: &SessionData, capture: &SessionData) -> bool {
    stored.report_id == capture.report_id
        || stored.report_id == "unknown"
        || capture.report_id == "unknown"
}
