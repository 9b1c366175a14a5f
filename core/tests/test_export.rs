use shotdata_core::export::{project_session, RowType};
use shotdata_core::{
    export_filename, write_csv, CaptureSource, ClubGroup, ExportOptions, SessionData, Shot,
    UnitPreference, UrlType,
};

fn one_shot_session(metric: &str, value: &str) -> SessionData {
    SessionData::new("2024-01-15", "12345", UrlType::Report).with_club(
        ClubGroup::new("Driver").with_shots(vec![Shot::new(0).with_metric(metric, value)]),
    )
}

fn read_csv(text: &str) -> (Vec<String>, Vec<Vec<String>>) {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());
    let header = rdr.headers().unwrap().iter().map(String::from).collect();
    let rows = rdr
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect();
    (header, rows)
}

#[test]
fn test_single_carry_column_imperial() {
    // API-kilde: meter → yards
    let s = one_shot_session("Carry", "91.44");
    let text = write_csv(&s, true, None, UnitPreference::Imperial);

    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("Date,Club,Shot #,Type,Carry (yds)"));
    assert_eq!(lines.next(), Some("2024-01-15,Driver,1,Shot,100"));
    assert_eq!(lines.next(), None);
    assert!(text.ends_with('\n'));
}

#[test]
fn test_comma_value_is_quoted() {
    let s = one_shot_session("Carry", "1,200");
    let text = write_csv(&s, true, None, UnitPreference::Imperial);
    assert!(text.contains(",\"1,200\"\n"), "{text}");

    let (_, rows) = read_csv(&text);
    assert_eq!(rows[0][4], "1,200");
}

#[test]
fn test_html_source_uses_declared_system() {
    let mut s = one_shot_session("ClubSpeed", "96.56").with_param("nd_001", "789014");
    s.source = CaptureSource::Html;
    let text = write_csv(&s, true, None, UnitPreference::Imperial);
    let (header, rows) = read_csv(&text);
    assert_eq!(header[4], "Club Speed (mph)");
    let v: f64 = rows[0][4].parse().unwrap();
    assert!((v - 60.0).abs() < 0.1);
}

#[test]
fn test_api_source_radians_become_degrees() {
    let s = one_shot_session("AttackAngle", "0.1745").with_param("nd_001", "789013");
    let text = write_csv(&s, true, None, UnitPreference::Metric);
    let (header, rows) = read_csv(&text);
    assert_eq!(header[4], "Attack Angle (°)");
    assert_eq!(rows[0][4], "10");
}

#[test]
fn test_tag_column_and_summary_rows() {
    let mut tagged = Shot::new(0).with_metric("Carry", "200").with_metric("BallSpeed", "60");
    tagged.tag = Some("D1 SW".into());
    let plain = Shot::new(1).with_metric("Carry", "210");

    let mut club = ClubGroup::new("Driver").with_shots(vec![tagged, plain]);
    club.averages.insert("Carry".into(), "205".into());
    club.consistency.insert("Carry".into(), "5".into());
    let s = SessionData::new("2024-01-15", "r", UrlType::Report).with_club(club);

    let (header, rows) = read_csv(&write_csv(&s, true, None, UnitPreference::Metric));
    assert_eq!(
        header,
        vec!["Date", "Club", "Tag", "Shot #", "Type", "Ball Speed (m/s)", "Carry (m)"]
    );
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0][2], "D1 SW");
    assert_eq!(rows[1][2], "");
    assert_eq!(rows[1][3], "2");
    assert_eq!(rows[1][5], "", "manglende metrikk skal være tom celle");
    assert_eq!((rows[2][3].as_str(), rows[2][4].as_str()), ("", "Average"));
    assert_eq!(rows[3][4], "Consistency");

    let (_, without) = read_csv(&write_csv(&s, false, None, UnitPreference::Metric));
    assert_eq!(without.len(), 2);
}

#[test]
fn test_unknown_metrics_follow_priority_in_name_order() {
    let s = SessionData::new("d", "r", UrlType::Report).with_club(
        ClubGroup::new("7 Iron").with_shots(vec![Shot::new(0)
            .with_metric("Zeta", "1")
            .with_metric("Alpha", "2")
            .with_metric("Carry", "3")
            .with_metric("ClubSpeed", "4")]),
    );
    let (header, _) = read_csv(&write_csv(&s, true, None, UnitPreference::Imperial));
    assert_eq!(&header[4..], &["Club Speed (mph)", "Carry (yds)", "Alpha", "Zeta"]);
}

#[test]
fn test_custom_metric_order() {
    let s = one_shot_session("Carry", "100").with_club(
        ClubGroup::new("Wedge").with_shots(vec![Shot::new(0).with_metric("SpinRate", "9000")]),
    );
    let order = vec!["SpinRate".to_string(), "Carry".to_string()];
    let (header, rows) = read_csv(&write_csv(&s, true, Some(order.as_slice()), UnitPreference::Metric));
    assert_eq!(&header[4..], &["Spin Rate (rpm)", "Carry (m)"]);
    assert_eq!(rows[1][4], "9000");
}

#[test]
fn test_empty_session_is_header_only() {
    let s = SessionData::new("2024-01-15", "r", UrlType::Report);
    assert_eq!(write_csv(&s, true, None, UnitPreference::Imperial), "Date,Club,Shot #,Type\n");
}

#[test]
fn test_output_is_deterministic() {
    let s = one_shot_session("Carry", "91.44").with_club(
        ClubGroup::new("Wedge").with_shots(vec![Shot::new(0).with_metric("Height", "20")]),
    );
    let a = write_csv(&s, true, None, UnitPreference::Imperial);
    let b = write_csv(&s.clone(), true, None, UnitPreference::Imperial);
    assert_eq!(a, b);
}

#[test]
fn test_projection_row_types() {
    let mut club = ClubGroup::new("Driver").with_shots(vec![Shot::new(0).with_metric("Carry", "1")]);
    club.averages.insert("Carry".into(), "1".into());
    let s = SessionData::new("d", "r", UrlType::Report).with_club(club);

    let table = project_session(&s, &ExportOptions::default());
    let types: Vec<_> = table.rows.iter().map(|r| r.row_type).collect();
    assert_eq!(types, vec![RowType::Shot, RowType::Average]);
    assert_eq!(export_filename(&s), "ShotData_d.csv");
}
