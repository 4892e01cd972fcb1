use std::path::PathBuf;
use mpl_backends::backends;

/// Print the backends packaged with the local Matplotlib installation
/// and the subset that can be activated here.  An optional argument
/// overrides the backend directory to inspect.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let dir = match std::env::args_os().nth(1) {
        Some(d) => PathBuf::from(d),
        None => backends::install_dir()?,
    };
    log::info!("inspecting {}", dir.display());
    let report = backends::inspect(&dir)?;
    println!("installed: {:?}", report.discovered);
    println!("usable:    {:?}", report.usable);
    Ok(())
}
