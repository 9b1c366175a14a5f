use shotdata_core::units::{IMPERIAL, METRIC_DEG, METRIC_RAD};
use shotdata_core::{
    convert_angle, convert_distance, convert_speed, normalize_metric_value, AngleUnit,
    DistanceUnit, MetricCategory, MetricValue, SpeedUnit, UnitCatalog, UnitPreference,
};

const DISTANCES: [DistanceUnit; 2] = [DistanceUnit::Yards, DistanceUnit::Meters];
const ANGLES: [AngleUnit; 2] = [AngleUnit::Degrees, AngleUnit::Radians];
const SPEEDS: [SpeedUnit; 3] = [SpeedUnit::Mph, SpeedUnit::KmH, SpeedUnit::Ms];
const SAMPLES: [f64; 7] = [0.0, 1.0, -3.7, 91.44, 250.5, 1.0e-3, 12345.678];

fn num(v: MetricValue) -> f64 {
    v.as_f64().expect("numerisk verdi")
}

#[test]
fn test_round_trip_all_unit_pairs() {
    for &v in &SAMPLES {
        for &a in &DISTANCES {
            for &b in &DISTANCES {
                let back = num(convert_distance(&convert_distance(&v.into(), a, b), b, a));
                assert!((back - v).abs() < 1e-6, "distance {v} {a:?}->{b:?}");
            }
        }
        for &a in &ANGLES {
            for &b in &ANGLES {
                let back = num(convert_angle(&convert_angle(&v.into(), a, b), b, a));
                assert!((back - v).abs() < 1e-6, "angle {v} {a:?}->{b:?}");
            }
        }
        for &a in &SPEEDS {
            for &b in &SPEEDS {
                let back = num(convert_speed(&convert_speed(&v.into(), a, b), b, a));
                assert!((back - v).abs() < 1e-6, "speed {v} {a:?}->{b:?}");
            }
        }
    }
}

#[test]
fn test_identity_conversion_is_exact() {
    for &v in &SAMPLES {
        for &u in &DISTANCES {
            assert_eq!(convert_distance(&v.into(), u, u), MetricValue::Number(v));
        }
        for &u in &ANGLES {
            assert_eq!(convert_angle(&v.into(), u, u), MetricValue::Number(v));
        }
        for &u in &SPEEDS {
            assert_eq!(convert_speed(&v.into(), u, u), MetricValue::Number(v));
        }
    }
}

#[test]
fn test_scenario_yards_to_meters() {
    let m = num(convert_distance(&100.0.into(), DistanceUnit::Yards, DistanceUnit::Meters));
    assert!((m - 91.44).abs() < 0.01);
}

#[test]
fn test_scenario_kmh_club_speed_to_imperial() {
    let v = num(normalize_metric_value(&96.56.into(), "ClubSpeed", &METRIC_DEG, UnitPreference::Imperial));
    assert!((v - 60.0).abs() < 0.1);
}

#[test]
fn test_normalized_values_have_at_most_one_decimal() {
    let catalog = UnitCatalog::global();
    for metric in catalog.known_metrics() {
        for system in [IMPERIAL, METRIC_RAD, METRIC_DEG] {
            for pref in [UnitPreference::Imperial, UnitPreference::Metric] {
                for &v in &SAMPLES {
                    let out = normalize_metric_value(&v.into(), metric, &system, pref);
                    let cell = out.to_cell();
                    let decimals = cell.split('.').nth(1).map_or(0, str::len);
                    if catalog.category(metric) != MetricCategory::Dimensionless {
                        assert!(decimals <= 1, "{metric} {v} -> {cell}");
                    }
                }
            }
        }
    }
}

#[test]
fn test_fallback_system_and_labels() {
    let catalog = UnitCatalog::standard();
    assert_eq!(catalog.system("not-a-system"), IMPERIAL);
    assert_eq!(catalog.system("789013"), METRIC_RAD);
    assert_eq!(catalog.unit_label("Carry", UnitPreference::Imperial), Some("yds"));
}
