//! The stateful, pyplot-style plotting interface.
//!
//! Every function here acts on pyplot's notion of the *current* figure
//! and axes, creating them on first use.  The state lives in the
//! Python interpreter, not on the Rust side, so it is shared with any
//! other pyplot user in the process.  For explicit control over which
//! figure a command targets, use [`crate::Figure`] and [`crate::Axes`]
//! instead.

use std::path::Path;
use pyo3::{
    prelude::*,
    intern,
    exceptions::{PyFileNotFoundError, PyPermissionError},
};
use crate::{Axes, Data, Error, Figure, Line2D, NUMPY, PYPLOT};

/// Plot `y` versus `x` on the current axes.  `fmt` is a Matplotlib
/// format string such as `"r."` or `"b-"`; pass `""` for the default
/// line style.
pub fn plot<D>(x: &D, y: &D, fmt: &str) -> Result<Line2D, Error>
where D: Data + ?Sized {
    let pyplot = pymod!(PYPLOT)?;
    let numpy = pymod!(NUMPY)?;
    Python::with_gil(|py| {
        let xn = x.to_numpy(py, numpy);
        let yn = y.to_numpy(py, numpy);
        let lines = getattr!(py, pyplot, "plot")
            .call1(py, (xn, yn, fmt))
            .map_err(|e| Error::Python(e))?;
        let line2d = lines.extract(py).map_err(|e| Error::Python(e))?;
        Ok(Line2D { line2d })
    })
}

/// Call the pyplot function `$f` on the current figure/axes,
/// discarding its return value.
macro_rules! pyplot_call { ($f: ident, $args: expr) => {{
    let pyplot = pymod!(PYPLOT)?;
    meth!(pyplot, $f, $args)
        .map(|_| ())
        .map_err(|e| Error::Python(e))
}}}

/// Set the title of the current axes.
pub fn title(v: &str) -> Result<(), Error> {
    pyplot_call!(title, (v,))
}

pub fn xlabel(label: &str) -> Result<(), Error> {
    pyplot_call!(xlabel, (label,))
}

pub fn ylabel(label: &str) -> Result<(), Error> {
    pyplot_call!(ylabel, (label,))
}

/// Set the view limits of the current x axis.
pub fn xlim(left: f64, right: f64) -> Result<(), Error> {
    pyplot_call!(xlim, (left, right))
}

/// Set the view limits of the current y axis.
pub fn ylim(bottom: f64, top: f64) -> Result<(), Error> {
    pyplot_call!(ylim, (bottom, top))
}

/// Place the x axis ticks of the current axes at the given positions.
pub fn xticks(ticks: &[f64]) -> Result<(), Error> {
    pyplot_call!(xticks, (ticks.to_vec(),))
}

/// Place the y axis ticks of the current axes at the given positions.
pub fn yticks(ticks: &[f64]) -> Result<(), Error> {
    pyplot_call!(yticks, (ticks.to_vec(),))
}

pub fn legend() -> Result<(), Error> {
    pyplot_call!(legend, ())
}

/// Write the current figure to `path`.  The output format is deduced
/// from the file extension.
pub fn savefig(path: impl AsRef<Path>) -> Result<(), Error> {
    let pyplot = pymod!(PYPLOT)?;
    Python::with_gil(|py| {
        getattr!(py, pyplot, "savefig")
            .call1(py, (path.as_ref(),))
            .map(|_| ())
            .map_err(|e| {
                if e.is_instance_of::<PyFileNotFoundError>(py) {
                    Error::FileNotFoundError
                } else if e.is_instance_of::<PyPermissionError>(py) {
                    Error::PermissionError
                } else {
                    Error::Python(e)
                }
            })
    })
}

/// The current figure, created if none exists yet.
pub fn gcf() -> Result<Figure, Error> {
    let pyplot = pymod!(PYPLOT)?;
    Python::with_gil(|py| {
        let fig = getattr!(py, pyplot, "gcf").call0(py)
            .map_err(|e| Error::Python(e))?;
        Ok(Figure { fig })
    })
}

/// The current axes, created if none exist yet.
pub fn gca() -> Result<Axes, Error> {
    let pyplot = pymod!(PYPLOT)?;
    Python::with_gil(|py| {
        let ax = getattr!(py, pyplot, "gca").call0(py)
            .map_err(|e| Error::Python(e))?;
        Ok(Axes { ax })
    })
}

/// Clear the current figure.
pub fn clf() -> Result<(), Error> {
    pyplot_call!(clf, ())
}

/// Close all pyplot figures.
pub fn close_all() -> Result<(), Error> {
    pyplot_call!(close, ("all",))
}

/// Display all open figures, running the GUI event loop until the
/// last window is closed.
pub fn show() -> Result<(), Error> {
    pyplot_call!(show, ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tutorial_sequence() -> Result<(), Error> {
        let x: Vec<_> = (0 .. 200).map(|i| i as f64 / 20.).collect();
        let y: Vec<_> = x.iter().map(|x| x.cos()).collect();
        plot(&x, &y, "b-")?.label("cos").linewidth(1.5);
        title("cosine")?;
        xlabel("x")?;
        ylabel("cos(x)")?;
        xlim(0., 10.)?;
        ylim(-1.2, 1.2)?;
        xticks(&[0., 2., 4., 6., 8., 10.])?;
        yticks(&[-1., 0., 1.])?;
        legend()?;
        savefig("target/tutorial_sequence.png")?;
        clf()?;
        Ok(())
    }

    #[test]
    fn current_figure_and_axes() -> Result<(), Error> {
        let fig = gcf()?;
        let mut ax = gca()?;
        ax.y(&[1., 3., 2.]).plot();
        ax.set_title("current axes");
        fig.save().to_file("target/current_figure.png")?;
        close_all()?;
        Ok(())
    }

    #[test]
    fn savefig_reports_a_missing_directory() {
        assert!(matches!(savefig("target/no_such_dir/out.png"),
                         Err(Error::FileNotFoundError)));
    }
}
