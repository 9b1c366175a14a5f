use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Én måleverdi slik den kom fra kilden: tall, tekst eller fraværende.
///
/// Serialiseres untagged (tall / streng / `null`) slik at lagret JSON
/// beholder samme form som kilde-payloaden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

impl MetricValue {
    /// Numerisk verdi hvis den kan tolkes. Tom tekst, ikke-numerisk tekst,
    /// NaN og uendelig gir `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Number(v) if v.is_finite() => Some(*v),
            MetricValue::Number(_) => None,
            MetricValue::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            MetricValue::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, MetricValue::Missing)
    }

    /// Celletekst for CSV. Fraværende verdi blir tom celle, aldri "0" eller "null".
    pub fn to_cell(&self) -> String {
        match self {
            MetricValue::Number(v) => format_number(*v),
            MetricValue::Text(s) => s.clone(),
            MetricValue::Missing => String::new(),
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_cell())
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Number(v)
    }
}

impl From<&str> for MetricValue {
    fn from(s: &str) -> Self {
        MetricValue::Text(s.to_string())
    }
}

impl From<String> for MetricValue {
    fn from(s: String) -> Self {
        MetricValue::Text(s)
    }
}

impl<T: Into<MetricValue>> From<Option<T>> for MetricValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(MetricValue::Missing)
    }
}

/// Korteste desimalform; heltall uten ".0", og -0 skrives som 0.
pub(crate) fn format_number(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    format!("{}", v)
}

pub type MetricMap = BTreeMap<String, MetricValue>;

/// Ett slag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Shot {
    /// 0-basert posisjon i klubbgruppen (vises 1-basert)
    pub shot_number: u32,
    #[serde(default)]
    pub metrics: MetricMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl Shot {
    pub fn new(shot_number: u32) -> Self {
        Self { shot_number, ..Default::default() }
    }

    pub fn with_metric(mut self, name: &str, value: impl Into<MetricValue>) -> Self {
        self.metrics.insert(name.to_string(), value.into());
        self
    }

    pub fn has_tag(&self) -> bool {
        self.tag.as_deref().map_or(false, |t| !t.is_empty())
    }
}

/// Alle slag med én navngitt kølle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ClubGroup {
    pub club_name: String,
    #[serde(default)]
    pub shots: Vec<Shot>,
    /// Sammendrag beregnet oppstrøms (ikke av denne kjernen)
    #[serde(default)]
    pub averages: MetricMap,
    #[serde(default)]
    pub consistency: MetricMap,
}

impl ClubGroup {
    pub fn new(club_name: &str) -> Self {
        Self { club_name: club_name.to_string(), ..Default::default() }
    }

    pub fn with_shots(mut self, shots: Vec<Shot>) -> Self {
        self.shots = shots;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UrlType {
    #[default]
    Report,
    Activity,
}

/// Hvor økten ble fanget. API-svar er alltid i meter og m/s,
/// HTML-tabeller følger rapportens deklarerte enhetssystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CaptureSource {
    #[default]
    Api,
    Html,
}

/// Én rapportøkt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SessionData {
    pub date: String,
    pub report_id: String,
    #[serde(default)]
    pub url_type: UrlType,
    #[serde(default)]
    pub club_groups: Vec<ClubGroup>,
    /// Avledet indeks: sortert, unik mengde av alle metrikknøkler i økten
    #[serde(default)]
    pub metric_names: Vec<String>,
    /// `nd_<gruppe>` → enhetssystem-id, pluss andre query-parametre
    #[serde(default)]
    pub metadata_params: BTreeMap<String, String>,
    #[serde(default)]
    pub source: CaptureSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_api_data: Option<serde_json::Value>,
}

impl SessionData {
    pub fn new(date: &str, report_id: &str, url_type: UrlType) -> Self {
        Self {
            date: date.to_string(),
            report_id: report_id.to_string(),
            url_type,
            ..Default::default()
        }
    }

    pub fn with_club(mut self, club: ClubGroup) -> Self {
        self.club_groups.push(club);
        self.recompute_metric_names();
        self
    }

    pub fn with_param(mut self, key: &str, value: &str) -> Self {
        self.metadata_params.insert(key.to_string(), value.to_string());
        self
    }

    pub fn club(&self, name: &str) -> Option<&ClubGroup> {
        self.club_groups.iter().find(|c| c.club_name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.club_groups.is_empty()
    }

    pub fn total_shots(&self) -> usize {
        self.club_groups.iter().map(|c| c.shots.len()).sum()
    }

    /// Minst ett slag med ikke-tom tag → CSV får en Tag-kolonne.
    pub fn has_tags(&self) -> bool {
        self.club_groups.iter().any(|c| c.shots.iter().any(Shot::has_tag))
    }

    /// Bygg `metric_names` på nytt fra slag, snitt og konsistens.
    pub fn recompute_metric_names(&mut self) {
        self.metric_names = collect_metric_names(&self.club_groups);
    }
}

pub(crate) fn collect_metric_names(clubs: &[ClubGroup]) -> Vec<String> {
    let mut names = BTreeSet::new();
    for club in clubs {
        for shot in &club.shots {
            names.extend(shot.metrics.keys().cloned());
        }
        names.extend(club.averages.keys().cloned());
        names.extend(club.consistency.keys().cloned());
    }
    names.into_iter().collect()
}
