//! gridwell CLI - grid scattered well measurements into a GeoTIFF surface

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use gridwell_algorithms::interpolation::{geotransform, Extent, GridParams, GridSpec};
use gridwell_algorithms::pipeline::{run, SurfaceParams};
use gridwell_core::io::{read_geotiff, GeoTiffSink};
use gridwell_core::vector::{read_points, FieldNames, PointSourceOptions};
use gridwell_core::{Raster, SamplePoint, CRS};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "gridwell")]
#[command(author, version, about = "Grid scattered well measurements into a raster surface", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where to find the sample fields in a delimited point file
#[derive(Args, Debug, Clone)]
struct PointArgs {
    /// Field holding the X coordinate
    #[arg(long, default_value = "Longitude")]
    x_field: String,
    /// Field holding the Y coordinate
    #[arg(long, default_value = "Latitude")]
    y_field: String,
    /// Field holding the measured value
    #[arg(long, default_value = "SurfaceEle")]
    z_field: String,
    /// Field delimiter
    #[arg(short, long, default_value = ",")]
    delimiter: char,
}

impl PointArgs {
    fn options(&self) -> PointSourceOptions {
        PointSourceOptions {
            fields: FieldNames {
                x: self.x_field.clone(),
                y: self.y_field.clone(),
                z: self.z_field.clone(),
            },
            delimiter: self.delimiter,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Interpolate a point file onto a GeoTIFF by inverse distance weighting
    Idw {
        /// Input delimited text file with a header row
        points: PathBuf,
        /// Output GeoTIFF
        output: PathBuf,
        /// Cell size in the units of the point coordinates
        #[arg(short, long, default_value_t = gridwell_algorithms::interpolation::DEFAULT_RESOLUTION)]
        resolution: f64,
        /// Distance power
        #[arg(short, long, default_value = "2.0")]
        power: f64,
        /// Projection file (.prj) whose WKT is attached to the output
        #[arg(long)]
        prj: Option<PathBuf>,
        /// Use at most this many nearest samples per cell
        #[arg(long)]
        max_points: Option<usize>,
        /// Ignore samples farther than this from a cell center
        #[arg(long)]
        max_radius: Option<f64>,
        #[command(flatten)]
        fields: PointArgs,
    },
    /// Print the extent of a point file and, with a resolution, the grid it would produce
    Extent {
        /// Input delimited text file with a header row
        points: PathBuf,
        /// Cell size used to size the grid
        #[arg(short, long)]
        resolution: Option<f64>,
        #[command(flatten)]
        fields: PointArgs,
    },
    /// Show information about a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set up logging")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn load_points(path: &Path, fields: &PointArgs) -> Result<Vec<SamplePoint>> {
    let pb = spinner("Reading points...");
    let points = read_points(path, &fields.options())
        .with_context(|| format!("Failed to read points from {}", path.display()))?;
    pb.finish_and_clear();
    info!("Input: {} samples", points.len());
    Ok(points)
}

fn load_crs(prj: Option<&Path>) -> Result<Option<CRS>> {
    let Some(path) = prj else {
        return Ok(None);
    };
    let crs = CRS::read_prj(path)
        .with_context(|| format!("Failed to read projection from {}", path.display()))?;
    debug!("CRS: {}", crs);
    Ok(Some(crs))
}

fn print_extent(extent: &Extent) {
    println!(
        "Extent: x [{}, {}], y [{}, {}]",
        extent.x_min, extent.x_max, extent.y_min, extent.y_max
    );
}

fn print_grid(grid: &GridSpec) {
    println!(
        "Grid: {} x {} ({} cells), pixel size {}",
        grid.x_size,
        grid.y_size,
        grid.cell_count(),
        grid.pixel_size_x
    );
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        // ── IDW ──────────────────────────────────────────────────────
        Commands::Idw {
            points,
            output,
            resolution,
            power,
            prj,
            max_points,
            max_radius,
            fields,
        } => {
            let samples = load_points(&points, &fields)?;
            let crs = load_crs(prj.as_deref())?;
            let params = SurfaceParams {
                resolution,
                power,
                max_points,
                max_radius,
            };
            debug!("Parameters: {:?}", params);

            let start = Instant::now();
            let pb = spinner("Interpolating surface...");
            let mut sink = GeoTiffSink::new(&output);
            let report = run(&samples, &params, crs, &mut sink)
                .with_context(|| format!("Failed to grid {}", points.display()))?;
            pb.finish_and_clear();
            let elapsed = start.elapsed();

            print_extent(&report.extent);
            print_grid(&report.grid);
            info!("Geotransform: {:?}", report.transform.to_gdal());
            done("Surface", &output, elapsed);
        }

        // ── Extent ───────────────────────────────────────────────────
        Commands::Extent {
            points,
            resolution,
            fields,
        } => {
            let samples = load_points(&points, &fields)?;
            let extent = Extent::from_points(&samples).context("Failed to compute extent")?;
            println!("Samples: {}", samples.len());
            print_extent(&extent);

            if let Some(resolution) = resolution {
                let grid = GridSpec::from_extent(&extent, &GridParams { resolution })
                    .context("Failed to size grid")?;
                print_grid(&grid);
                println!("Geotransform: {:?}", geotransform(&extent, &grid).to_gdal());
            }
        }

        // ── Info ─────────────────────────────────────────────────────
        Commands::Info { input } => {
            let pb = spinner("Reading raster...");
            let raster: Raster<f64> = read_geotiff(&input, None)
                .with_context(|| format!("Failed to read raster {}", input.display()))?;
            pb.finish_and_clear();

            let (rows, cols) = raster.shape();
            let bounds = raster.bounds();
            let stats = raster.statistics();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
            println!("Cell size: {}", raster.cell_size());
            println!("Geotransform: {:?}", raster.transform().to_gdal());
            println!(
                "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
                bounds.0, bounds.1, bounds.2, bounds.3
            );
            if let Some(crs) = raster.crs() {
                println!("CRS: {}", crs);
            }
            if let Some(nodata) = raster.nodata() {
                println!("NoData: {}", nodata);
            }
            println!("\nStatistics:");
            if let Some(min) = stats.min {
                println!("  Min: {:.4}", min);
            }
            if let Some(max) = stats.max {
                println!("  Max: {:.4}", max);
            }
            if let Some(mean) = stats.mean {
                println!("  Mean: {:.4}", mean);
            }
            println!(
                "  Valid cells: {} ({:.1}%)",
                stats.valid_count,
                100.0 * stats.valid_count as f64 / raster.len() as f64
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_idw_defaults() {
        let cli = Cli::try_parse_from(["gridwell", "idw", "wells.csv", "out.tif"]).unwrap();
        match cli.command {
            Commands::Idw { power, max_points, max_radius, prj, fields, .. } => {
                assert_eq!(power, 2.0);
                assert!(max_points.is_none() && max_radius.is_none() && prj.is_none());
                assert_eq!(fields.options().fields, FieldNames::default());
                assert_eq!(fields.delimiter, ',');
            }
            _ => panic!("expected idw"),
        }
    }

    #[test]
    fn test_field_overrides() {
        let cli = Cli::try_parse_from([
            "gridwell", "-v", "extent", "pts.txt", "--x-field", "E", "--y-field", "N",
            "--z-field", "Z", "-d", ";", "-r", "0.5",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Extent { resolution, fields, .. } => {
                assert_eq!(resolution, Some(0.5));
                let opts = fields.options();
                assert_eq!((opts.fields.x.as_str(), opts.fields.y.as_str()), ("E", "N"));
                assert_eq!(opts.delimiter, ';');
            }
            _ => panic!("expected extent"),
        }
    }

    #[test]
    fn test_load_crs_from_prj() {
        let dir = tempfile::tempdir().unwrap();
        let prj = dir.path().join("wells.prj");
        std::fs::write(&prj, "GEOGCS[\"WGS 84\"]\n").unwrap();

        assert!(load_crs(None).unwrap().is_none());
        let crs = load_crs(Some(&prj)).unwrap().unwrap();
        assert_eq!(crs.wkt(), "GEOGCS[\"WGS 84\"]");
    }
}
