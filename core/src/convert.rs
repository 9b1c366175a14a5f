// core/src/convert.rs
use crate::models::MetricValue;
use crate::units::{
    AngleUnit, DistanceUnit, MetricCategory, SpeedUnit, UnitCatalog, UnitPreference, UnitSystem,
};

pub const METERS_PER_YARD: f64 = 0.9144;
pub const MS_PER_MPH: f64 = 0.44704;
pub const KMH_PER_MS: f64 = 3.6;

// --- RoundTo trait ---
pub trait RoundTo {
    fn round_to(self, dp: u32) -> f64;
}

impl RoundTo for f64 {
    /// Halvt bort fra null (`f64::round`) på skalert verdi.
    #[inline]
    fn round_to(self, dp: u32) -> f64 {
        if dp == 0 { return self.round(); }
        let factor = 10_f64.powi(dp as i32);
        (self * factor).round() / factor
    }
}

/* ---------------- Rene f64-konverteringer ---------------- */

/// Via meter.
pub fn distance_f64(v: f64, from: DistanceUnit, to: DistanceUnit) -> f64 {
    if from == to { return v; }
    let meters = match from {
        DistanceUnit::Yards => v * METERS_PER_YARD,
        DistanceUnit::Meters => v,
    };
    match to {
        DistanceUnit::Yards => meters / METERS_PER_YARD,
        DistanceUnit::Meters => meters,
    }
}

/// Via grader.
pub fn angle_f64(v: f64, from: AngleUnit, to: AngleUnit) -> f64 {
    if from == to { return v; }
    let degrees = match from {
        AngleUnit::Degrees => v,
        AngleUnit::Radians => v.to_degrees(),
    };
    match to {
        AngleUnit::Degrees => degrees,
        AngleUnit::Radians => degrees.to_radians(),
    }
}

/// Via m/s.
pub fn speed_f64(v: f64, from: SpeedUnit, to: SpeedUnit) -> f64 {
    if from == to { return v; }
    let ms = match from {
        SpeedUnit::Mph => v * MS_PER_MPH,
        SpeedUnit::KmH => v / KMH_PER_MS,
        SpeedUnit::Ms => v,
    };
    match to {
        SpeedUnit::Mph => ms / MS_PER_MPH,
        SpeedUnit::KmH => ms * KMH_PER_MS,
        SpeedUnit::Ms => ms,
    }
}

/* ---------------- MetricValue-konverteringer ---------------- */

// Ugyldig input (null, tom, ikke-numerisk) returneres uendret.
fn convert_with(value: &MetricValue, f: impl Fn(f64) -> f64) -> MetricValue {
    match value.as_f64() {
        Some(v) => MetricValue::Number(f(v)),
        None => value.clone(),
    }
}

pub fn convert_distance(value: &MetricValue, from: DistanceUnit, to: DistanceUnit) -> MetricValue {
    convert_with(value, |v| distance_f64(v, from, to))
}

pub fn convert_angle(value: &MetricValue, from: AngleUnit, to: AngleUnit) -> MetricValue {
    convert_with(value, |v| angle_f64(v, from, to))
}

pub fn convert_speed(value: &MetricValue, from: SpeedUnit, to: SpeedUnit) -> MetricValue {
    convert_with(value, |v| speed_f64(v, from, to))
}

impl UnitCatalog {
    /// Konverter én metrikkverdi fra kildesystemet til preferansens enheter,
    /// avrundet til én desimal. Dimensjonsløse verdier returneres tolket men uendret.
    pub fn normalize(
        &self,
        value: &MetricValue,
        metric: &str,
        source: &UnitSystem,
        pref: UnitPreference,
    ) -> MetricValue {
        let v = match value.as_f64() {
            Some(v) => v,
            None => return value.clone(),
        };
        let target = pref.target_units();
        let converted = match self.category(metric) {
            MetricCategory::Distance => distance_f64(v, source.distance, target.distance),
            MetricCategory::Angle => angle_f64(v, source.angle, target.angle),
            MetricCategory::Speed => speed_f64(v, source.speed, target.speed),
            MetricCategory::Dimensionless => return MetricValue::Number(v),
        };
        MetricValue::Number(converted.round_to(1))
    }
}

/// Normaliser mot den globale katalogen.
pub fn normalize_metric_value(
    value: &MetricValue,
    metric: &str,
    source: &UnitSystem,
    pref: UnitPreference,
) -> MetricValue {
    UnitCatalog::global().normalize(value, metric, source, pref)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{IMPERIAL, METRIC_DEG, METRIC_RAD};

    fn num(v: &MetricValue) -> f64 {
        v.as_f64().expect("numerisk")
    }

    #[test]
    fn yards_to_meters() {
        let m = convert_distance(&100.0.into(), DistanceUnit::Yards, DistanceUnit::Meters);
        assert!((num(&m) - 91.44).abs() < 0.01);
        let y = convert_distance(&"120".into(), DistanceUnit::Yards, DistanceUnit::Meters);
        assert!((num(&y) - 109.728).abs() < 0.01);
    }

    #[test]
    fn degrees_radians() {
        let r = convert_angle(&180.0.into(), AngleUnit::Degrees, AngleUnit::Radians);
        assert!((num(&r) - std::f64::consts::PI).abs() < 1e-9);
        let d = convert_angle(&std::f64::consts::PI.into(), AngleUnit::Radians, AngleUnit::Degrees);
        assert!((num(&d) - 180.0).abs() < 1e-9);
    }

    #[test]
    fn speed_via_meters_per_second() {
        let kmh = convert_speed(&60.0.into(), SpeedUnit::Mph, SpeedUnit::KmH);
        assert!((num(&kmh) - 96.56).abs() < 0.01);
        let mph = convert_speed(&100.0.into(), SpeedUnit::KmH, SpeedUnit::Mph);
        assert!((num(&mph) - 62.14).abs() < 0.01);
        let ms = convert_speed(&36.0.into(), SpeedUnit::KmH, SpeedUnit::Ms);
        assert!((num(&ms) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn invalid_input_passes_through() {
        for v in [MetricValue::Missing, "".into(), "abc".into(), "1,200".into()] {
            assert_eq!(convert_distance(&v, DistanceUnit::Yards, DistanceUnit::Meters), v);
            assert_eq!(convert_angle(&v, AngleUnit::Degrees, AngleUnit::Radians), v);
            assert_eq!(convert_speed(&v, SpeedUnit::Mph, SpeedUnit::Ms), v);
        }
    }

    #[test]
    fn normalize_km_h_club_speed_to_mph() {
        let out = normalize_metric_value(&96.56.into(), "ClubSpeed", &METRIC_DEG, UnitPreference::Imperial);
        assert!((num(&out) - 60.0).abs() < 0.1);
    }

    #[test]
    fn normalize_radian_angles_to_degrees_for_both_preferences() {
        for pref in [UnitPreference::Imperial, UnitPreference::Metric] {
            let out = normalize_metric_value(&0.1745.into(), "AttackAngle", &METRIC_RAD, pref);
            assert_eq!(out, MetricValue::Number(10.0));
        }
    }

    #[test]
    fn normalize_rounds_to_one_decimal() {
        let out = normalize_metric_value(&105.678.into(), "ClubSpeed", &IMPERIAL, UnitPreference::Imperial);
        assert_eq!(out, MetricValue::Number(105.7));
        let neg = normalize_metric_value(&(-3.25).into(), "AttackAngle", &IMPERIAL, UnitPreference::Imperial);
        assert_eq!(neg, MetricValue::Number(-3.3));
    }

    #[test]
    fn normalize_dimensionless_and_unknown_unchanged() {
        let smash = normalize_metric_value(&"1.48".into(), "SmashFactor", &METRIC_RAD, UnitPreference::Imperial);
        assert_eq!(smash, MetricValue::Number(1.48));
        let unknown = normalize_metric_value(&123.456.into(), "UnknownMetric", &METRIC_RAD, UnitPreference::Metric);
        assert_eq!(unknown, MetricValue::Number(123.456));
    }

    #[test]
    fn normalize_keeps_unparseable_text() {
        let out = normalize_metric_value(&"N/A".into(), "ClubSpeed", &IMPERIAL, UnitPreference::Imperial);
        assert_eq!(out, MetricValue::Text("N/A".into()));
        assert_eq!(
            normalize_metric_value(&MetricValue::Missing, "Carry", &IMPERIAL, UnitPreference::Metric),
            MetricValue::Missing
        );
    }

    #[test]
    fn metric_preference_uses_meters_per_second() {
        let api = UnitSystem::api_source(&IMPERIAL);
        let out = normalize_metric_value(&"44.7".into(), "BallSpeed", &api, UnitPreference::Metric);
        assert_eq!(out, MetricValue::Number(44.7));
        let mph = normalize_metric_value(&"44.704".into(), "BallSpeed", &api, UnitPreference::Imperial);
        assert_eq!(mph, MetricValue::Number(100.0));
    }
}
