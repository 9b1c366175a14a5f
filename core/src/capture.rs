// core/src/capture.rs
//! Tolking av avlyttede API-svar (`StrokeGroups`) til en delvis `SessionData`.

use serde_json::{Map, Value};

use crate::convert::RoundTo;
use crate::error::{from_json_str, Result, ShotDataError};
use crate::models::{format_number, CaptureSource, ClubGroup, SessionData, Shot, UrlType};
use crate::units::UnitCatalog;

const INDICATORS: &[&str] = &[
    "ballspeed",
    "clubspeed",
    "carry",
    "spinrate",
    "strokegroups",
    "strokes",
    "measurement",
];

/// Heuristikk for om et JSON-svar inneholder slagdata.
pub fn looks_like_shot_data(body: &Value) -> bool {
    let obj = match body.as_object() {
        Some(o) => o,
        None => return false,
    };
    if let Some(groups) = obj.get("StrokeGroups").and_then(Value::as_array) {
        if !groups.is_empty() {
            return true;
        }
    }
    let text = body.to_string().to_lowercase();
    INDICATORS.iter().filter(|ind| text.contains(*ind)).count() >= 3
}

/// Query-parametre fra en URL, i rekkefølge, prosent-dekodet (`+` er mellomrom).
pub fn parse_query(url: &str) -> Vec<(String, String)> {
    let query = match url.split_once('?') {
        Some((_, q)) => q,
        None => return Vec::new(),
    };
    let query = query.split('#').next().unwrap_or_default();

    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (percent_decode(k), percent_decode(v))
        })
        .collect()
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                match (hex_val(bytes[i + 1]), hex_val(bytes[i + 2])) {
                    (Some(h), Some(l)) => {
                        out.push(h << 4 | l);
                        i += 2;
                    }
                    _ => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

// Første ikke-tomme verdi for nøkkelen
fn first_param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, v)| k == key && !v.is_empty())
        .map(|(_, v)| v.as_str())
}

fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// Tom streng, 0, false og null regnes som manglende
fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |x| x != 0.0),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn numeric(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|x| x.is_finite())
}

/// Tolk et `StrokeGroups`-svar. `None` hvis ingen gruppe har slag med kjente metrikker.
pub fn parse_api_payload(body: &Value, source_url: &str) -> Option<SessionData> {
    parse_api_payload_with(body, source_url, UnitCatalog::global())
}

pub fn parse_api_payload_with(
    body: &Value,
    source_url: &str,
    catalog: &UnitCatalog,
) -> Option<SessionData> {
    let groups = body.get("StrokeGroups")?.as_array()?;
    if groups.is_empty() {
        return None;
    }

    let date = body
        .get("Time")
        .and_then(|t| t.get("Date"))
        .and_then(scalar_text)
        .or_else(|| groups[0].get("Date").and_then(scalar_text))
        .unwrap_or_else(|| "Unknown".to_string());

    let params = parse_query(source_url);
    let report_id = ["r", "a", "ReportId"]
        .iter()
        .find_map(|k| first_param(&params, k))
        .unwrap_or("unknown");

    let mut session = SessionData::new(&date, report_id, UrlType::Activity);
    session.source = CaptureSource::Api;
    for (k, v) in &params {
        session.metadata_params.insert(k.clone(), v.clone());
    }

    for group in groups.iter().filter_map(Value::as_object) {
        let club_name = group
            .get("Club")
            .filter(|c| is_truthy(c))
            .and_then(scalar_text)
            .unwrap_or_else(|| "Unknown".to_string());

        let strokes = group.get("Strokes").and_then(Value::as_array);
        let mut shots = Vec::new();
        for (i, stroke) in strokes.into_iter().flatten().enumerate() {
            let stroke = match stroke.as_object() {
                Some(s) => s,
                None => continue,
            };
            let shot = stroke_to_shot(i as u32, stroke, catalog);
            if !shot.metrics.is_empty() {
                shots.push(shot);
            }
        }

        if shots.is_empty() {
            log::debug!("capture: gruppe {:?} uten slag hoppes over", club_name);
            continue;
        }
        session.club_groups.push(ClubGroup::new(&club_name).with_shots(shots));
    }

    if session.club_groups.is_empty() {
        log::warn!("capture: ingen slag med kjente metrikker i svar fra {}", source_url);
        return None;
    }
    session.recompute_metric_names();
    Some(session)
}

// Measurement overstyres av NormalizedMeasurement; bare kjente metrikker, én desimal.
fn stroke_to_shot(index: u32, stroke: &Map<String, Value>, catalog: &UnitCatalog) -> Shot {
    let mut shot = Shot::new(index);
    for layer in ["Measurement", "NormalizedMeasurement"] {
        let fields = match stroke.get(layer).and_then(Value::as_object) {
            Some(f) => f,
            None => continue,
        };
        for (key, value) in fields {
            if !catalog.is_known(key) {
                continue;
            }
            if let Some(v) = numeric(value) {
                shot.metrics.insert(key.clone(), format_number(v.round_to(1)).into());
            }
        }
    }
    shot
}

/// Tolk rå JSON-tekst. Ugyldig JSON gir `Json`-feil, gyldig JSON uten slag gir `InvalidPayload`.
pub fn parse_api_payload_str(text: &str, source_url: &str) -> Result<SessionData> {
    let body: Value = from_json_str(text)?;
    if !looks_like_shot_data(&body) {
        log::warn!("capture: svar fra {} ligner ikke slagdata", source_url);
        return Err(ShotDataError::InvalidPayload("no shot data indicators".into()));
    }
    parse_api_payload(&body, source_url)
        .ok_or_else(|| ShotDataError::InvalidPayload("no StrokeGroups with known metrics".into()))
}

/// Tag `i` gjelder alle slag i klubbgruppe `i`; tomme tags hoppes over.
pub fn apply_group_tags(session: &mut SessionData, tags: &[String]) {
    for (group, tag) in session.club_groups.iter_mut().zip(tags) {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        for shot in &mut group.shots {
            shot.tag = Some(tag.to_string());
        }
    }
}
