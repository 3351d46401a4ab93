//! `scaffold-install`: write the settings file on first run.
//!
//! An existing file is loaded with built-in defaults re-applied on top and
//! written back. A missing or unreadable file is replaced by the defaults.

use anyhow::Result;
use tracing::warn;

use scaffold::error::exit_code_for;
use scaffold::io::settings::{ConfigStore, InstallPaths};
use scaffold::logging;

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(exit_code_for(&err));
    }
}

fn run() -> Result<()> {
    let mut store = ConfigStore::new(InstallPaths::discover()?);
    if let Err(err) = store.load(None, true) {
        warn!(err = %err, "settings not loaded, writing built-in defaults");
    }
    store.persist_all()?;
    println!(
        "Settings written to {}",
        store.resolve_settings_path().display()
    );
    Ok(())
}
