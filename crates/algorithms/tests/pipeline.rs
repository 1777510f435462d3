//! End-to-end: delimited samples on disk to a GeoTIFF on disk and back.

use std::fs;
use std::path::Path;

use approx::assert_relative_eq;
use gridwell_algorithms::interpolation::idw_at;
use gridwell_algorithms::pipeline::{run, SurfaceParams};
use gridwell_core::io::{read_geotiff, GeoTiffSink};
use gridwell_core::raster::Raster;
use gridwell_core::vector::{read_points, PointSourceOptions};
use gridwell_core::{Error, CRS};

const WGS84: &str = r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433]]"#;

fn write_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn triangle_csv_to_geotiff() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_file(
        dir.path(),
        "wells.csv",
        "WellId,Longitude,Latitude,SurfaceEle\n\
         A,0,0,10\n\
         B,10,0,20\n\
         \n\
         C,0,10,30\n",
    );
    let prj = write_file(dir.path(), "wells.prj", &format!("{}\n", WGS84));
    let out = dir.path().join("surface.tif");

    let points = read_points(&csv, &PointSourceOptions::default()).unwrap();
    assert_eq!(points.len(), 3);
    let crs = CRS::read_prj(&prj).unwrap();

    let params = SurfaceParams {
        resolution: 1.0,
        ..Default::default()
    };
    let report = run(&points, &params, Some(crs), &mut GeoTiffSink::new(&out)).unwrap();
    assert_eq!((report.grid.x_size, report.grid.y_size), (10, 10));

    let raster: Raster<f64> = read_geotiff(&out, None).unwrap();
    assert_eq!(raster.shape(), (10, 10));
    assert_eq!(raster.transform().to_gdal(), [0.0, 1.0, 0.0, 10.0, 0.0, -1.0]);
    assert_eq!(raster.crs().unwrap().wkt(), WGS84);
    assert!(raster.data().iter().all(|v| v.is_finite()));

    // the per-cell kernel reproduces the first sample at its own location
    assert_eq!(idw_at(&points, 0.0, 0.0, 2.0).unwrap(), 10.0);

    // only the inputs and the finished raster remain
    assert_eq!(dir_entries(dir.path()), vec!["surface.tif", "wells.csv", "wells.prj"]);
}

#[test]
fn written_values_match_interpolation() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_file(
        dir.path(),
        "wells.txt",
        "x;y;z\n\
         1.5;2.5;101.25\n\
         7.0;3.0;98.5\n\
         4.0;8.5;110.0\n\
         9.0;9.0;104.75\n",
    );
    let opts = PointSourceOptions {
        fields: gridwell_core::vector::FieldNames {
            x: "x".into(),
            y: "y".into(),
            z: "z".into(),
        },
        delimiter: ';',
    };
    let points = read_points(&csv, &opts).unwrap();

    let params = SurfaceParams {
        resolution: 0.5,
        power: 3.0,
        ..Default::default()
    };
    let mut memory = gridwell_core::io::MemorySink::new();
    run(&points, &params, None, &mut memory).unwrap();
    let expected = memory.into_raster().unwrap();

    let out = dir.path().join("surface.tif");
    run(&points, &params, None, &mut GeoTiffSink::new(&out)).unwrap();
    let written: Raster<f64> = read_geotiff(&out, None).unwrap();

    assert_eq!(written.shape(), expected.shape());
    assert!(written.crs().is_none());
    for (a, b) in written.data().iter().zip(expected.data().iter()) {
        assert_relative_eq!(*a, *b);
    }
}

#[test]
fn empty_source_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_file(dir.path(), "wells.csv", "Longitude,Latitude,SurfaceEle\n");
    let out = dir.path().join("surface.tif");

    let points = read_points(&csv, &PointSourceOptions::default()).unwrap();
    let result = run(&points, &SurfaceParams::default(), None, &mut GeoTiffSink::new(&out));

    assert!(matches!(result, Err(Error::EmptyInput)));
    assert!(!out.exists());
    assert_eq!(dir_entries(dir.path()), vec!["wells.csv"]);
}

#[test]
fn invalid_resolution_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_file(
        dir.path(),
        "wells.csv",
        "Longitude,Latitude,SurfaceEle\n0,0,1\n1,1,2\n",
    );
    let out = dir.path().join("surface.tif");

    let points = read_points(&csv, &PointSourceOptions::default()).unwrap();
    let params = SurfaceParams {
        resolution: -1.0,
        ..Default::default()
    };
    let result = run(&points, &params, None, &mut GeoTiffSink::new(&out));

    assert!(matches!(result, Err(Error::InvalidResolution { .. })));
    assert!(!out.exists());
}

#[test]
fn malformed_record_is_located() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_file(
        dir.path(),
        "wells.csv",
        "Longitude,Latitude,SurfaceEle\n0,0,1\n1,1,2\n2,2,n/a\n",
    );

    let result = read_points(&csv, &PointSourceOptions::default());
    match result {
        Err(Error::MalformedField { record, field, value }) => {
            assert_eq!(record, 3);
            assert_eq!(field, "SurfaceEle");
            assert_eq!(value, "n/a");
        }
        other => panic!("expected MalformedField, got {:?}", other),
    }
}
