// core/src/cli.rs
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use crate::capture::parse_api_payload_str;
use crate::error::{from_json_str, Result, ShotDataError};
use crate::export::{order_metrics_by_priority, ColumnLayout};
use crate::models::SessionData;
use crate::storage::SessionStore;
use crate::units::{UnitCatalog, UnitPreference};

pub const STORE_ENV: &str = "SHOTDATA_STORE";
pub const DEFAULT_LOG_FILTER: &str = "info";
pub const DEFAULT_STORE: &str = "shotdata_store.json";

pub const USAGE: &str = "\
usage: shotdata [--store PATH] <command>

commands:
  ingest <payload.json> <source-url>   parse an API payload and store it
  merge <session.json>                 ingest an already-shaped session file
  units <imperial|metric>              set the export unit preference
  show                                 print a summary of the stored session
  export [DIR] [--no-averages]         write ShotData_<date>.csv
  clear                                drop the stored session

The store path defaults to $SHOTDATA_STORE, then ./shotdata_store.json.";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Ingest { payload: PathBuf, url: String },
    Merge { session: PathBuf },
    Units(UnitPreference),
    Show,
    Export { dir: PathBuf, include_averages: bool },
    Clear,
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cli {
    pub store: Option<PathBuf>,
    pub command: Command,
}

impl Cli {
    /// Flagg > miljøvariabel > standard.
    pub fn store_path(&self, env_value: Option<String>) -> PathBuf {
        self.store
            .clone()
            .or_else(|| env_value.filter(|v| !v.is_empty()).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE))
    }
}

/// Installerer logger på stderr; `log`-kall i biblioteket går via tracing-log-broen.
/// `RUST_LOG` overstyrer standardfilteret. Returnerer `false` hvis en logger allerede finnes.
pub fn init_logging() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

fn usage(msg: impl Into<String>) -> ShotDataError {
    ShotDataError::Usage(msg.into())
}

/// Tolker argumentene (uten programnavn).
pub fn parse_args<I>(args: I) -> Result<Cli>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut store = None;
    let mut positional: Vec<String> = Vec::new();
    let mut include_averages = true;

    while let Some(a) = args.next() {
        match a.as_str() {
            "--store" | "-s" => {
                let v = args.next().ok_or_else(|| usage("Missing value for --store"))?;
                store = Some(PathBuf::from(v));
            }
            "--no-averages" => include_averages = false,
            "-h" | "--help" => return Ok(Cli { store, command: Command::Help }),
            s if s.starts_with('-') => return Err(usage(format!("Unknown arg: {}", s))),
            _ => positional.push(a),
        }
    }

    let mut rest = positional.into_iter();
    let name = match rest.next() {
        Some(n) => n,
        None => return Ok(Cli { store, command: Command::Help }),
    };

    let command = match name.as_str() {
        "ingest" => {
            let payload = PathBuf::from(need(&mut rest, &name, "payload file")?);
            let url = need(&mut rest, &name, "source url")?;
            Command::Ingest { payload, url }
        }
        "merge" => Command::Merge { session: PathBuf::from(need(&mut rest, &name, "session file")?) },
        "units" => Command::Units(need(&mut rest, &name, "unit preference")?.parse()?),
        "show" => Command::Show,
        "export" => {
            let dir = rest.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
            Command::Export { dir, include_averages }
        }
        "clear" => Command::Clear,
        other => return Err(usage(format!("Unknown command: {}", other))),
    };

    if let Some(extra) = rest.next() {
        return Err(usage(format!("Unexpected argument: {}", extra)));
    }
    Ok(Cli { store, command })
}

fn need(rest: &mut impl Iterator<Item = String>, command: &str, what: &str) -> Result<String> {
    rest.next()
        .ok_or_else(|| usage(format!("{}: missing {}", command, what)))
}

/// Utfør kommandoen mot et åpent lager.
pub fn run(command: &Command, store: &mut SessionStore) -> Result<()> {
    match command {
        Command::Help => println!("{}", USAGE),
        Command::Ingest { payload, url } => {
            let text = std::fs::read_to_string(payload)?;
            let capture = parse_api_payload_str(&text, url)?;
            let outcome = store.ingest(capture)?;
            println!("{:?} → {}", outcome, store.path().display());
        }
        Command::Merge { session } => {
            let text = std::fs::read_to_string(session)?;
            let mut capture: SessionData = from_json_str(&text)?;
            capture.recompute_metric_names();
            let outcome = store.ingest(capture)?;
            println!("{:?} → {}", outcome, store.path().display());
        }
        Command::Units(pref) => {
            store.set_unit_preference(*pref)?;
            println!("Unit preference: {}", pref);
        }
        Command::Show => match store.get() {
            Some(session) => print_session_summary(session, store.unit_preference()),
            None => println!("No session stored"),
        },
        Command::Export { dir, include_averages } => {
            let out = store.export_csv(dir, *include_averages)?;
            println!("Wrote {}", out.display());
        }
        Command::Clear => {
            store.clear()?;
            println!("Cleared");
        }
    }
    Ok(())
}

pub fn print_session_summary(session: &SessionData, pref: UnitPreference) {
    let catalog = UnitCatalog::global();
    let layout = ColumnLayout::global();
    let source = catalog.source_system(session);

    println!("--- Session {} ---", session.report_id);
    println!("Date: {}", session.date);
    println!("Source units: {} ({:?})", source.name, session.source);
    println!("Export units: {}", pref);
    println!("Clubs: {}  Shots: {}", session.club_groups.len(), session.total_shots());
    for club in &session.club_groups {
        let tagged = club.shots.iter().filter(|s| s.has_tag()).count();
        println!("  {:<16} {:>3} shots ({} tagged)", club.club_name, club.shots.len(), tagged);
    }
    let ordered = order_metrics_by_priority(&session.metric_names, layout.priority());
    let columns: Vec<String> = ordered
        .iter()
        .map(|m| layout.column_name(catalog, m, pref))
        .collect();
    println!("Metrics: {}", columns.join(", "));
}
