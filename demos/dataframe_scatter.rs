/// Scatter two columns of a polars DataFrame against each other.

use polars_core::prelude::*;
use mpl_backends as plt;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sepal_length = Series::new(
        "Sepal_Length",
        &[6.0, 6.0, 5.8, 6.5, 5.7, 6.8, 6.5, 6.8, 7.0, 6.2,
          6.5, 6.6, 7.0, 7.0, 7.5, 7.0, 6.8, 6.5, 6.3, 6.2]);
    let sepal_width = Series::new(
        "Sepal_Width",
        &[4.0, 3.1, 4.0, 3.8, 3.4, 3.7, 4.7, 4.0, 4.5, 3.2,
          3.9, 4.0, 4.1, 4.0, 4.6, 4.4, 4.0, 4.2, 3.9, 4.0]);
    let df = DataFrame::new(vec![sepal_length, sepal_width])?;
    println!("{}", &df);

    let x: Vec<f64> = df.column("Sepal_Length")?.f64()?
        .into_no_null_iter().collect();
    let y: Vec<f64> = df.column("Sepal_Width")?.f64()?
        .into_no_null_iter().collect();

    let (fig, [[mut ax]]) = plt::subplots()?;
    ax.scatter(&x, &y)
        .set_title("Iris pseudacorus")
        .set_xlabel("sepal length")
        .set_ylabel("sepal width");
    fig.save().to_file("target/dataframe_scatter.png")?;
    Ok(())
}
