//! Average-atom calculation command-line interface
//!
//! Reads a YAML configuration, validates it, runs the SCF cycle and writes the
//! report and the density / potential tables.

use avatom::app::AvAtomApplication;
use color_eyre::eyre::Result;

fn main() -> Result<()> {
    color_eyre::install()?;

    let app = AvAtomApplication::from_cli()?;
    app.run()
}
