//! Discovery and probing of Matplotlib rendering backends.
//!
//! Matplotlib packages every backend as a module `backend_<name>.py`
//! inside its `backends` directory.  A module being present does not
//! mean the backend works: GUI backends need their native toolkit
//! installed and a display to talk to.  [`inspect`] therefore reports
//! two lists: the backends that are *packaged* ([`supported`]) and the
//! subset that can actually be *activated* in this process ([`probe`]).

use std::{
    fs,
    path::{Path, PathBuf},
};
use pyo3::{prelude::*, intern};
use crate::{Error, MATPLOTLIB};

/// Filename prefix of backend modules.
pub const MODULE_PREFIX: &str = "backend_";
/// Filename suffix of backend modules (Matplotlib ships them as
/// Python source).
pub const MODULE_SUFFIX: &str = ".py";

/// Outcome of a single [`inspect`] run.  `usable` is a sub-sequence of
/// `discovered`; both follow the enumeration order of the backend
/// directory, which the platform does not specify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    /// Backends packaged with the installation.
    pub discovered: Vec<String>,
    /// Backends whose activation succeeded.
    pub usable: Vec<String>,
}

/// Return the `backends` directory of the Matplotlib installation,
/// resolved from the module's own location.
pub fn install_dir() -> Result<PathBuf, Error> {
    let mpl = pymod!(MATPLOTLIB)?;
    let file: String = Python::with_gil(|py| {
        getattr!(py, mpl, "__file__").extract(py)
            .map_err(|e| Error::Python(e))
    })?;
    // matplotlib/__init__.py → matplotlib/backends
    let mut dir = PathBuf::from(file);
    dir.pop();
    dir.push("backends");
    Ok(dir)
}

/// List the raw entries of `dir`, non-recursively and unfiltered, in
/// whatever order the directory listing yields them.
pub fn list_dir(dir: &Path) -> Result<Vec<String>, Error> {
    log::debug!("listing backend candidates in {}", dir.display());
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(Error::from_io)? {
        let entry = entry.map_err(Error::from_io)?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

/// Whether `filename` follows the `backend_<name>.py` naming
/// convention of backend modules.
pub fn is_backend_module(filename: &str) -> bool {
    filename.starts_with(MODULE_PREFIX) && filename.ends_with(MODULE_SUFFIX)
}

/// Strip the `backend_` prefix and the module suffix off `filename`,
/// yielding the bare backend name ("backend_qt5agg.py" → "qt5agg").
///
/// Fail with [`Error::InvalidBackendFilename`] if `filename` does not
/// follow the naming convention.
pub fn backend_name(filename: &str) -> Result<&str, Error> {
    if !is_backend_module(filename) {
        return Err(Error::InvalidBackendFilename(filename.to_owned()));
    }
    let stem = &filename[.. filename.len() - MODULE_SUFFIX.len()];
    Ok(&stem[MODULE_PREFIX.len() ..])
}

/// Names of all backends packaged in `dir`, in directory order.
///
/// These are the *installed* backends; whether each one can be
/// activated is a separate question ([`probe`]).  Duplicate names (as
/// may arise on case-insensitive filesystems) are reported as often as
/// they occur.
pub fn supported(dir: &Path) -> Result<Vec<String>, Error> {
    Ok(list_dir(dir)?
        .iter()
        .filter(|f| is_backend_module(f))
        .filter_map(|f| backend_name(f).ok().map(str::to_owned))
        .collect())
}

/// Make `name` the active rendering backend for the whole process.
///
/// This is the non-swallowing counterpart of [`probe`]: the Python
/// error, if any, is returned to the caller.
pub fn switch(name: &str) -> Result<(), Error> {
    let mpl = pymod!(MATPLOTLIB)?;
    Python::with_gil(|py| {
        mpl.call_method1(py, intern!(py, "use"), (name,))
            .map(|_| ())
            .map_err(|e| Error::Python(e))
    })
}

/// Name of the currently active rendering backend.
pub fn current() -> Result<String, Error> {
    let mpl = pymod!(MATPLOTLIB)?;
    Python::with_gil(|py| {
        mpl.call_method0(py, intern!(py, "get_backend"))
            .and_then(|b| b.extract(py))
            .map_err(|e| Error::Python(e))
    })
}

/// Try to activate the backend `name` and report whether that worked.
///
/// Any activation failure (missing toolkit, unsupported platform,...)
/// is swallowed and collapsed to `false`; this function only
/// partitions backends into usable and not, it does not diagnose.
/// Use [`switch`] to obtain the underlying error.
///
/// ⚠ On success the probed backend *stays active*, so probing has an
/// observable effect on subsequent pyplot figures.
pub fn probe(name: &str) -> bool {
    switch(name).is_ok()
}

/// Discover the backends packaged in `dir` and probe each one,
/// sequentially and without any timeout.  A backend whose activation
/// blocks (some GUI backends do when no display is reachable) blocks
/// the whole inspection.
///
/// Fail only if the directory cannot be read; individual probe
/// failures merely exclude the backend from `usable`.
pub fn inspect(dir: &Path) -> Result<Inspection, Error> {
    let discovered = supported(dir)?;
    let usable = discovered.iter()
        .filter(|name| probe(name))
        .cloned()
        .collect();
    Ok(Inspection { discovered, usable })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn recognizes_backend_modules() {
        assert!(is_backend_module("backend_agg.py"));
        assert!(is_backend_module("backend_qt5agg.py"));
        // Underscore and suffix are both load-bearing.
        assert!(!is_backend_module("backend agg.py"));
        assert!(!is_backend_module("backend_agg.txt"));
        assert!(!is_backend_module("backend_agg.pyc"));
        assert!(!is_backend_module("agg.py"));
        assert!(!is_backend_module("__init__.py"));
    }

    #[test]
    fn strips_prefix_and_suffix() -> Result<(), Error> {
        assert_eq!(backend_name("backend_qt5agg.py")?, "qt5agg");
        assert_eq!(backend_name("backend_agg.py")?, "agg");
        Ok(())
    }

    #[test]
    fn name_extraction_requires_the_convention() {
        match backend_name("readme.txt") {
            Err(Error::InvalidBackendFilename(f)) => {
                assert_eq!(f, "readme.txt")
            }
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn supported_filters_the_directory() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        for f in ["backend_agg.py", "backend_pdf.py",
                  "readme.txt", "__init__.py"] {
            File::create(dir.path().join(f))?;
        }
        // Directory order is platform dependent, so compare sorted.
        let mut names = supported(dir.path())?;
        names.sort();
        assert_eq!(names, ["agg", "pdf"]);
        Ok(())
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = Path::new("target/no_such_backend_dir");
        assert!(matches!(inspect(dir), Err(Error::FileNotFoundError)));
    }

    #[test]
    fn probe_result_is_stable() {
        assert!(probe("agg"));
        assert!(probe("agg"));
        assert!(!probe("definitely_not_a_backend"));
        assert!(!probe("definitely_not_a_backend"));
    }

    // Switching and full inspection share the process-wide active
    // backend, so they live in one test to keep them sequenced.
    #[test]
    fn switching_and_real_inspection() -> Result<(), Error> {
        assert!(matches!(switch("definitely_not_a_backend"),
                         Err(Error::Python(_))));

        let report = inspect(&install_dir()?)?;
        assert!(!report.discovered.is_empty());
        for name in &report.usable {
            assert!(report.discovered.contains(name));
        }
        // Agg is always shipped and never needs a toolkit.
        assert!(report.usable.iter().any(|n| n == "agg"));

        switch("agg")?;
        assert_eq!(current()?.to_lowercase(), "agg");
        Ok(())
    }

    #[test]
    fn broken_candidates_are_excluded() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        for f in ["backend_agg.py", "backend_qtbroken.py"] {
            File::create(dir.path().join(f))?;
        }
        let report = inspect(dir.path())?;
        let mut discovered = report.discovered.clone();
        discovered.sort();
        assert_eq!(discovered, ["agg", "qtbroken"]);
        // "qtbroken" names no real backend, so activating it fails and
        // only excludes it from the usable list.
        assert_eq!(report.usable, ["agg"]);
        Ok(())
    }
}
