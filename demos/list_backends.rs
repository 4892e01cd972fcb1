/// Which backends does this Matplotlib installation ship, and which of
/// them can actually be activated on this machine?

use std::error::Error;
use mpl_backends::backends;

fn main() -> Result<(), Box<dyn Error>> {
    let dir = backends::install_dir()?;
    let report = backends::inspect(&dir)?;
    println!("installed: {:?}", report.discovered);
    println!("usable:    {:?}", report.usable);
    // Probing leaves the last working backend active; pick one
    // deliberately before plotting anything.
    backends::switch("agg")?;
    println!("active:    {}", backends::current()?);
    Ok(())
}
