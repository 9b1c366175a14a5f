//! Enhetskatalog: kjente enhetssystemer og hvilken fysisk kategori hver metrikk tilhører.
//!
//! Katalogen bygges én gang (`UnitCatalog::global()`) og sendes videre som `&UnitCatalog`.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::ShotDataError;
use crate::models::{CaptureSource, SessionData};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    Yards,
    Meters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    Degrees,
    Radians,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeedUnit {
    #[serde(rename = "mph")]
    Mph,
    #[serde(rename = "km/h")]
    KmH,
    #[serde(rename = "m/s")]
    Ms,
}

impl DistanceUnit {
    pub fn label(self) -> &'static str {
        match self {
            DistanceUnit::Yards => "yds",
            DistanceUnit::Meters => "m",
        }
    }
}

impl AngleUnit {
    pub fn label(self) -> &'static str {
        match self {
            AngleUnit::Degrees => "°",
            AngleUnit::Radians => "rad",
        }
    }
}

impl SpeedUnit {
    pub fn label(self) -> &'static str {
        match self {
            SpeedUnit::Mph => "mph",
            SpeedUnit::KmH => "km/h",
            SpeedUnit::Ms => "m/s",
        }
    }
}

/// Enhetstrippel som beskriver hvordan rå tall i en kilde er skalert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitSystem {
    pub id: &'static str,
    pub name: &'static str,
    pub distance: DistanceUnit,
    pub angle: AngleUnit,
    pub speed: SpeedUnit,
}

pub const IMPERIAL_ID: &str = "789012";
pub const METRIC_RAD_ID: &str = "789013";
pub const METRIC_DEG_ID: &str = "789014";

pub const IMPERIAL: UnitSystem = UnitSystem {
    id: IMPERIAL_ID,
    name: "Imperial",
    distance: DistanceUnit::Yards,
    angle: AngleUnit::Degrees,
    speed: SpeedUnit::Mph,
};

pub const METRIC_RAD: UnitSystem = UnitSystem {
    id: METRIC_RAD_ID,
    name: "Metric (rad)",
    distance: DistanceUnit::Meters,
    angle: AngleUnit::Radians,
    speed: SpeedUnit::KmH,
};

pub const METRIC_DEG: UnitSystem = UnitSystem {
    id: METRIC_DEG_ID,
    name: "Metric (deg)",
    distance: DistanceUnit::Meters,
    angle: AngleUnit::Degrees,
    speed: SpeedUnit::KmH,
};

impl UnitSystem {
    /// API-svar kommer alltid i meter og m/s; bare vinkelenheten følger rapporten.
    pub fn api_source(declared: &UnitSystem) -> UnitSystem {
        UnitSystem {
            id: declared.id,
            name: "API",
            distance: DistanceUnit::Meters,
            angle: declared.angle,
            speed: SpeedUnit::Ms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricCategory {
    Distance,
    Angle,
    Speed,
    Dimensionless,
}

/// Brukerens valg av mål-enheter for eksport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitPreference {
    #[default]
    Imperial,
    Metric,
}

/// Mål-enheter avledet fra en `UnitPreference`. Vinkler vises alltid i grader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetUnits {
    pub distance: DistanceUnit,
    pub angle: AngleUnit,
    pub speed: SpeedUnit,
}

impl UnitPreference {
    pub fn target_units(self) -> TargetUnits {
        match self {
            UnitPreference::Imperial => TargetUnits {
                distance: DistanceUnit::Yards,
                angle: AngleUnit::Degrees,
                speed: SpeedUnit::Mph,
            },
            UnitPreference::Metric => TargetUnits {
                distance: DistanceUnit::Meters,
                angle: AngleUnit::Degrees,
                speed: SpeedUnit::Ms,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UnitPreference::Imperial => "imperial",
            UnitPreference::Metric => "metric",
        }
    }
}

impl fmt::Display for UnitPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitPreference {
    type Err = ShotDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "imperial" => Ok(UnitPreference::Imperial),
            "metric" => Ok(UnitPreference::Metric),
            _ => Err(ShotDataError::UnknownUnitPreference(s.to_string())),
        }
    }
}

const DISTANCE_METRICS: &[&str] = &[
    "Carry",
    "Total",
    "Side",
    "SideTotal",
    "CarrySide",
    "TotalSide",
    "Height",
    "MaxHeight",
    "Curve",
    "LowPointDistance",
];

const ANGLE_METRICS: &[&str] = &[
    "AttackAngle",
    "ClubPath",
    "FaceAngle",
    "FaceToPath",
    "SwingDirection",
    "DynamicLoft",
    "SpinLoft",
    "LaunchAngle",
    "LaunchDirection",
    "LandingAngle",
];

const SPEED_METRICS: &[&str] = &["ClubSpeed", "BallSpeed", "Tempo"];

const DIMENSIONLESS_METRICS: &[&str] = &[
    "SmashFactor",
    "SpinRate",
    "SpinAxis",
    "HangTime",
    "ImpactHeight",
    "ImpactOffset",
];

// Enhet som vises uansett preferanse
const FIXED_LABELS: &[(&str, &str)] = &[("SpinRate", "rpm"), ("HangTime", "s")];

/// Uforanderlig oppslagstabell for enhetssystemer og metrikk-kategorier.
#[derive(Debug, Clone)]
pub struct UnitCatalog {
    systems: HashMap<&'static str, UnitSystem>,
    default_system: UnitSystem,
    categories: HashMap<&'static str, MetricCategory>,
    fixed_labels: HashMap<&'static str, &'static str>,
}

static GLOBAL_CATALOG: Lazy<UnitCatalog> = Lazy::new(UnitCatalog::standard);

impl UnitCatalog {
    /// Standardkatalogen: tre enhetssystemer og 29 kjente metrikker.
    pub fn standard() -> Self {
        let systems = [IMPERIAL, METRIC_RAD, METRIC_DEG]
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let mut categories = HashMap::new();
        for (names, cat) in [
            (DISTANCE_METRICS, MetricCategory::Distance),
            (ANGLE_METRICS, MetricCategory::Angle),
            (SPEED_METRICS, MetricCategory::Speed),
            (DIMENSIONLESS_METRICS, MetricCategory::Dimensionless),
        ] {
            for name in names {
                categories.insert(*name, cat);
            }
        }

        Self {
            systems,
            default_system: IMPERIAL,
            categories,
            fixed_labels: FIXED_LABELS.iter().copied().collect(),
        }
    }

    /// Delt, prosess-global instans (bygges ved første bruk).
    pub fn global() -> &'static UnitCatalog {
        &GLOBAL_CATALOG
    }

    /// Oppslag på id; ukjent id faller tilbake til Imperial.
    pub fn system(&self, id: &str) -> UnitSystem {
        self.systems.get(id).copied().unwrap_or(self.default_system)
    }

    pub fn default_system(&self) -> UnitSystem {
        self.default_system
    }

    /// Ukjente metrikker regnes som dimensjonsløse.
    pub fn category(&self, metric: &str) -> MetricCategory {
        self.categories
            .get(metric)
            .copied()
            .unwrap_or(MetricCategory::Dimensionless)
    }

    pub fn is_known(&self, metric: &str) -> bool {
        self.categories.contains_key(metric)
    }

    /// Alle kjente metrikknavn, sortert.
    pub fn known_metrics(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.categories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Enhetsetikett for kolonneoverskrift, `None` for dimensjonsløse uten fast etikett.
    pub fn unit_label(&self, metric: &str, pref: UnitPreference) -> Option<&'static str> {
        if let Some(label) = self.fixed_labels.get(metric) {
            return Some(*label);
        }
        let target = pref.target_units();
        match self.category(metric) {
            MetricCategory::Distance => Some(target.distance.label()),
            MetricCategory::Angle => Some(target.angle.label()),
            MetricCategory::Speed => Some(target.speed.label()),
            MetricCategory::Dimensionless => None,
        }
    }

    /// Deklarert enhetssystem for en økt (fra `nd_001`).
    pub fn declared_system(&self, metadata_params: &BTreeMap<String, String>) -> UnitSystem {
        self.system(&unit_system_id(metadata_params))
    }

    /// Enhetssystemet rådata i økten faktisk er skrevet i.
    pub fn source_system(&self, session: &SessionData) -> UnitSystem {
        let declared = self.declared_system(&session.metadata_params);
        match session.source {
            CaptureSource::Api => UnitSystem::api_source(&declared),
            CaptureSource::Html => declared,
        }
    }
}

impl Default for UnitCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// `nd_<alfanumerisk>` (uavhengig av store/små bokstaver) → gruppe-nøkkel i små bokstaver.
pub fn extract_unit_params(metadata_params: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for (key, value) in metadata_params {
        if key.len() < 4 || !key.is_char_boundary(3) {
            continue;
        }
        let (prefix, group) = key.split_at(3);
        if prefix.eq_ignore_ascii_case("nd_") && group.chars().all(|c| c.is_ascii_alphanumeric()) {
            out.insert(group.to_ascii_lowercase(), value.clone());
        }
    }
    out
}

/// Gruppe "001" styrer; mangler den (eller er tom) brukes Imperial.
pub fn unit_system_id(metadata_params: &BTreeMap<String, String>) -> String {
    extract_unit_params(metadata_params)
        .remove("001")
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| IMPERIAL_ID.to_string())
}
