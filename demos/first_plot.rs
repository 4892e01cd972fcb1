/// The usual first pyplot session: data, a plot command, axis
/// adjustments, a title, a PNG on disk.

use std::error::Error;
use mpl_backends::pyplot as plt;

fn main() -> Result<(), Box<dyn Error>> {
    let x: Vec<_> = (0 .. 1000).map(|i| i as f64 / 100.).collect();
    let y: Vec<_> = x.iter().map(|x| x.sin()).collect();
    plt::plot(&x, &y, "r-")?.label("sin");
    plt::title("A first plot")?;
    plt::xlim(0., 10.)?;
    plt::xticks(&[0., 2.5, 5., 7.5, 10.])?;
    plt::legend()?;
    plt::savefig("target/first_plot.png")?;
    Ok(())
}
