// core/src/export.rs
//! CSV-projeksjon av en ferdig økt.
//!
//! Kolonner: `Date, Club, [Tag], Shot #, Type` og deretter metrikkene i fast
//! prioritet (fart, kølle-levering, utgang/spinn, lengde, spredning, ballbane,
//! treffpunkt, annet), så øvrige metrikker i øktens leksikografiske rekkefølge.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

use crate::models::{ClubGroup, MetricMap, MetricValue, SessionData};
use crate::units::{UnitCatalog, UnitPreference, UnitSystem};

const METRIC_COLUMN_ORDER: &[&str] = &[
    // Fart og effektivitet
    "ClubSpeed", "BallSpeed", "SmashFactor",
    // Kølle-levering
    "AttackAngle", "ClubPath", "FaceAngle", "FaceToPath", "SwingDirection", "DynamicLoft",
    // Utgang og spinn
    "LaunchAngle", "LaunchDirection", "SpinRate", "SpinAxis", "SpinLoft",
    // Lengde
    "Carry", "Total",
    // Spredning
    "Side", "SideTotal", "CarrySide", "TotalSide", "Curve",
    // Ballbane
    "Height", "MaxHeight", "LandingAngle", "HangTime",
    // Treffpunkt
    "LowPointDistance", "ImpactHeight", "ImpactOffset",
    // Annet
    "Tempo",
];

const DISPLAY_NAMES: &[(&str, &str)] = &[
    ("ClubSpeed", "Club Speed"),
    ("BallSpeed", "Ball Speed"),
    ("SmashFactor", "Smash Factor"),
    ("AttackAngle", "Attack Angle"),
    ("ClubPath", "Club Path"),
    ("FaceAngle", "Face Angle"),
    ("FaceToPath", "Face To Path"),
    ("SwingDirection", "Swing Direction"),
    ("DynamicLoft", "Dynamic Loft"),
    ("SpinRate", "Spin Rate"),
    ("SpinAxis", "Spin Axis"),
    ("SpinLoft", "Spin Loft"),
    ("LaunchAngle", "Launch Angle"),
    ("LaunchDirection", "Launch Direction"),
    ("Carry", "Carry"),
    ("Total", "Total"),
    ("Side", "Side"),
    ("SideTotal", "Side Total"),
    ("CarrySide", "Carry Side"),
    ("TotalSide", "Total Side"),
    ("Height", "Height"),
    ("MaxHeight", "Max Height"),
    ("Curve", "Curve"),
    ("LandingAngle", "Landing Angle"),
    ("HangTime", "Hang Time"),
    ("LowPointDistance", "Low Point"),
    ("ImpactHeight", "Impact Height"),
    ("ImpactOffset", "Impact Offset"),
    ("Tempo", "Tempo"),
];

/// Kolonneoppsett: prioritert rekkefølge og visningsnavn. Bygges én gang.
#[derive(Debug, Clone)]
pub struct ColumnLayout {
    priority: Vec<String>,
    display_names: HashMap<&'static str, &'static str>,
}

static GLOBAL_LAYOUT: Lazy<ColumnLayout> = Lazy::new(ColumnLayout::standard);

impl ColumnLayout {
    pub fn standard() -> Self {
        Self {
            priority: METRIC_COLUMN_ORDER.iter().map(|m| m.to_string()).collect(),
            display_names: DISPLAY_NAMES.iter().copied().collect(),
        }
    }

    pub fn global() -> &'static ColumnLayout {
        &GLOBAL_LAYOUT
    }

    pub fn priority(&self) -> &[String] {
        &self.priority
    }

    /// Visningsnavn, ellers rå metrikknøkkel.
    pub fn display_name<'a>(&self, metric: &'a str) -> &'a str {
        match self.display_names.get(metric) {
            Some(name) => *name,
            None => metric,
        }
    }

    /// `"Carry (yds)"`, eller bare visningsnavnet for dimensjonsløse uten fast etikett.
    pub fn column_name(&self, catalog: &UnitCatalog, metric: &str, pref: UnitPreference) -> String {
        let display = self.display_name(metric);
        match catalog.unit_label(metric, pref) {
            Some(unit) => format!("{} ({})", display, unit),
            None => display.to_string(),
        }
    }
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self::standard()
    }
}

/// Prioriterte metrikker som finnes i `all` først, deretter resten av `all` i sin rekkefølge.
/// Ingen duplikater.
pub fn order_metrics_by_priority(all: &[String], priority: &[String]) -> Vec<String> {
    let present: HashSet<&str> = all.iter().map(String::as_str).collect();
    let mut seen: HashSet<&str> = HashSet::with_capacity(all.len());
    let mut out = Vec::with_capacity(all.len());

    for metric in priority {
        if present.contains(metric.as_str()) && seen.insert(metric.as_str()) {
            out.push(metric.clone());
        }
    }
    for metric in all {
        if seen.insert(metric.as_str()) {
            out.push(metric.clone());
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowType {
    Shot,
    Average,
    Consistency,
}

impl RowType {
    pub fn as_str(self) -> &'static str {
        match self {
            RowType::Shot => "Shot",
            RowType::Average => "Average",
            RowType::Consistency => "Consistency",
        }
    }
}

/// Én ferdig projisert rad; `cells` følger `CsvTable::header`.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRow {
    pub row_type: RowType,
    pub cells: Vec<String>,
}

/// Tabellen før tekst-koding.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable {
    pub header: Vec<String>,
    pub rows: Vec<CsvRow>,
}

impl CsvTable {
    /// Koder til CSV-tekst; hver rad avsluttes med `\n`.
    pub fn to_csv_string(&self) -> String {
        let mut out = String::new();
        write_row(&mut out, &self.header);
        for row in &self.rows {
            write_row(&mut out, &row.cells);
        }
        out
    }
}

/// Valg for projeksjonen. `metric_order` erstatter standard prioritet når satt.
#[derive(Debug, Clone, Copy)]
pub struct ExportOptions<'a> {
    pub include_averages: bool,
    pub metric_order: Option<&'a [String]>,
    pub unit_preference: UnitPreference,
}

impl Default for ExportOptions<'_> {
    fn default() -> Self {
        Self {
            include_averages: true,
            metric_order: None,
            unit_preference: UnitPreference::Imperial,
        }
    }
}

/// Projiser økten til rader med eksplisitt katalog og kolonneoppsett.
pub fn project_session_with(
    session: &SessionData,
    opts: &ExportOptions<'_>,
    catalog: &UnitCatalog,
    layout: &ColumnLayout,
) -> CsvTable {
    let pref = opts.unit_preference;
    let priority = opts.metric_order.unwrap_or_else(|| layout.priority());
    let metrics = order_metrics_by_priority(&session.metric_names, priority);
    let with_tags = session.has_tags();
    let source = catalog.source_system(session);

    let mut header: Vec<String> = vec!["Date".into(), "Club".into()];
    if with_tags {
        header.push("Tag".into());
    }
    header.push("Shot #".into());
    header.push("Type".into());
    header.extend(metrics.iter().map(|m| layout.column_name(catalog, m, pref)));

    let ctx = RowContext { session, metrics: &metrics, with_tags, source, pref, catalog };
    let mut rows = Vec::new();

    for club in &session.club_groups {
        for shot in &club.shots {
            let tag = shot.tag.clone().unwrap_or_default();
            let number = (u64::from(shot.shot_number) + 1).to_string();
            rows.push(ctx.row(club, RowType::Shot, &tag, &number, &shot.metrics));
        }
        if opts.include_averages && !club.averages.is_empty() {
            rows.push(ctx.row(club, RowType::Average, "", "", &club.averages));
        }
        if opts.include_averages && !club.consistency.is_empty() {
            rows.push(ctx.row(club, RowType::Consistency, "", "", &club.consistency));
        }
    }

    CsvTable { header, rows }
}

struct RowContext<'a> {
    session: &'a SessionData,
    metrics: &'a [String],
    with_tags: bool,
    source: UnitSystem,
    pref: UnitPreference,
    catalog: &'a UnitCatalog,
}

impl RowContext<'_> {
    fn row(&self, club: &ClubGroup, row_type: RowType, tag: &str, shot_no: &str, values: &MetricMap) -> CsvRow {
        let mut cells = Vec::with_capacity(self.metrics.len() + 5);
        cells.push(self.session.date.clone());
        cells.push(club.club_name.clone());
        if self.with_tags {
            cells.push(tag.to_string());
        }
        cells.push(shot_no.to_string());
        cells.push(row_type.as_str().to_string());

        for metric in self.metrics {
            let cell = match values.get(metric) {
                None | Some(MetricValue::Missing) => String::new(),
                Some(raw) => self
                    .catalog
                    .normalize(raw, metric, &self.source, self.pref)
                    .to_cell(),
            };
            cells.push(cell);
        }
        CsvRow { row_type, cells }
    }
}

/// Projiser økten mot global katalog og standard kolonneoppsett.
pub fn project_session(session: &SessionData, opts: &ExportOptions<'_>) -> CsvTable {
    project_session_with(session, opts, UnitCatalog::global(), ColumnLayout::global())
}

/// CSV-tekst for økten. Tom økt gir bare overskriftsraden.
pub fn write_csv(
    session: &SessionData,
    include_averages: bool,
    metric_order: Option<&[String]>,
    unit_preference: UnitPreference,
) -> String {
    let opts = ExportOptions { include_averages, metric_order, unit_preference };
    project_session(session, &opts).to_csv_string()
}

/// `ShotData_<dato>.csv`; datoen brukes uendret.
pub fn export_filename(session: &SessionData) -> String {
    format!("ShotData_{}.csv", session.date)
}

/* ---------------- Koding ---------------- */

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n')
}

/// Skriv én rad, komma-separert og `\n`-terminert.
pub fn write_row(out: &mut String, row: &[String]) {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        if needs_quotes(cell) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn priority_then_remaining_in_given_order() {
        let all = strings(&["Carry", "Custom", "BallSpeed", "Another"]);
        let got = order_metrics_by_priority(&all, ColumnLayout::global().priority());
        assert_eq!(got, strings(&["BallSpeed", "Carry", "Custom", "Another"]));
    }

    #[test]
    fn priority_ignores_duplicates_and_absent_metrics() {
        let all = strings(&["Carry", "Carry"]);
        let prio = strings(&["Carry", "Total", "Carry"]);
        assert_eq!(order_metrics_by_priority(&all, &prio), strings(&["Carry"]));
    }

    #[test]
    fn column_names() {
        let layout = ColumnLayout::global();
        let cat = UnitCatalog::global();
        assert_eq!(layout.column_name(cat, "Carry", UnitPreference::Imperial), "Carry (yds)");
        assert_eq!(layout.column_name(cat, "LowPointDistance", UnitPreference::Metric), "Low Point (m)");
        assert_eq!(layout.column_name(cat, "SpinRate", UnitPreference::Metric), "Spin Rate (rpm)");
        assert_eq!(layout.column_name(cat, "SmashFactor", UnitPreference::Imperial), "Smash Factor");
        assert_eq!(layout.column_name(cat, "MyMetric", UnitPreference::Imperial), "MyMetric");
    }

    #[test]
    fn quoting_rule() {
        let mut out = String::new();
        write_row(&mut out, &strings(&["1,200", "say \"hi\"", "a\nb", "plain", ""]));
        assert_eq!(out, "\"1,200\",\"say \"\"hi\"\"\",\"a\nb\",plain,\n");
    }

    #[test]
    fn filename_uses_date_verbatim() {
        let s = SessionData::new("2024/01/15", "r", crate::models::UrlType::Report);
        assert_eq!(export_filename(&s), "ShotData_2024/01/15.csv");
    }
}
