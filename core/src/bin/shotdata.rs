use anyhow::Context;

use shotdata_core::cli::{init_logging, parse_args, run, STORE_ENV};
use shotdata_core::storage::SessionStore;

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = parse_args(std::env::args().skip(1))?;
    let path = cli.store_path(std::env::var(STORE_ENV).ok());

    let mut store = SessionStore::open(&path)
        .with_context(|| format!("kunne ikke åpne lager {}", path.display()))?;
    run(&cli.command, &mut store)?;
    Ok(())
}
