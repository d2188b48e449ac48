//! End-to-end tests for the rail temperature pipeline

use approx::assert_relative_eq;
use chrono::Datelike;
use chrono_tz::America::Sao_Paulo;
use serde_json::{Value, json};

use railtemp::thermal::equilibrium_temperatures;
use railtemp::weather::open_meteo::ForecastResponse;
use railtemp::{
    HistorySeries, Location, ModelCoefficients, ProcessingPipeline, RailTempError, RawTable,
    reconcile,
};

fn pipeline() -> ProcessingPipeline {
    ProcessingPipeline::new(ModelCoefficients::default(), Sao_Paulo)
}

type Row = (&'static str, &'static str, f64, f64, f64, f64, i64);

fn column(rows: &[Row], cell: impl Fn(&Row) -> Value) -> Vec<Value> {
    rows.iter().map(cell).collect()
}

/// One row per tuple: (location, time, air, precipitation, wind, solar, code)
fn table(rows: &[Row]) -> RawTable {
    RawTable::from_columns([
        ("location_id", column(rows, |r| json!(r.0))),
        ("timestamp", column(rows, |r| json!(r.1))),
        ("air_temperature_c", column(rows, |r| json!(r.2))),
        ("precipitation_mm", column(rows, |r| json!(r.3))),
        ("wind_speed_kmh", column(rows, |r| json!(r.4))),
        ("solar_radiation_wm2", column(rows, |r| json!(r.5))),
        ("weather_code", column(rows, |r| json!(r.6))),
        ("latitude", column(rows, |_| json!(-23.55))),
        ("longitude", column(rows, |_| json!(-46.63))),
    ])
    .unwrap()
}

fn l1_rows() -> Vec<Row> {
    vec![
        ("L1", "2025-01-10T00:00", 10.0, 0.0, 8.5, 100.0, 0),
        ("L1", "2025-01-10T01:00", 10.0, 1.0, 8.5, 1000.0, 61),
        ("L1", "2025-01-10T02:00", 10.0, 0.0, 0.0, 10000.0, 9999),
    ]
}

#[test]
fn test_worked_example_end_to_end() {
    let records = pipeline().run(&table(&l1_rows())).unwrap();

    let estimates: Vec<f64> = records.iter().map(|r| r.estimated_temperature).collect();
    assert_eq!(estimates, vec![11.84, 11.7, 19.02]);

    let sky: Vec<&str> = records.iter().map(|r| r.sky_condition.as_str()).collect();
    assert_eq!(sky, vec!["clear sky", "light rain", "unclassified"]);

    assert!(records.iter().all(|r| r.timestamp.offset().local_minus_utc() == -3 * 3600));
}

#[test]
fn test_worked_example_equilibrium() {
    let observations = railtemp::table::normalize(&table(&l1_rows()), Sao_Paulo).unwrap();
    let equilibrium = equilibrium_temperatures(&observations, &ModelCoefficients::default());

    assert_eq!(equilibrium.len(), 3);
    assert_relative_eq!(equilibrium[0], 14.6, epsilon = 1e-9);
    assert_relative_eq!(equilibrium[1], 11.5, epsilon = 1e-9);
    assert_relative_eq!(equilibrium[2], 30.0, epsilon = 1e-9);
}

#[test]
fn test_interleaved_locations_match_separate_runs() {
    let a = vec![
        ("A", "2025-01-10T00:00", 20.0, 0.0, 10.0, 300.0, 1),
        ("A", "2025-01-10T01:00", 22.0, 0.0, 12.0, 500.0, 2),
        ("A", "2025-01-10T02:00", 23.0, 0.5, 6.0, 200.0, 63),
    ];
    let b = vec![
        ("B", "2025-01-10T00:00", 15.0, 0.0, 4.0, 50.0, 3),
        ("B", "2025-01-10T01:00", 16.0, 0.0, 20.0, 800.0, 0),
        ("B", "2025-01-10T02:00", 18.0, 0.0, 2.0, 900.0, 0),
    ];
    let interleaved = vec![b[2], a[1], b[0], a[0], a[2], b[1]];

    let combined = pipeline().run(&table(&interleaved)).unwrap();
    let mut separate = pipeline().run(&table(&a)).unwrap();
    separate.extend(pipeline().run(&table(&b)).unwrap());

    assert_eq!(combined, separate);
}

#[test]
fn test_incomplete_rows_are_dropped() {
    let complete = table(&l1_rows());
    let input = RawTable::from_columns(
        complete
            .column_names()
            .map(|name| {
                let mut values = complete.column(name).unwrap().to_vec();
                if name == "wind_speed_kmh" {
                    values[1] = Value::Null;
                }
                (name.to_string(), values)
            })
            .collect::<Vec<_>>(),
    )
    .unwrap();

    let records = pipeline().run(&input).unwrap();
    assert_eq!(records.len(), 2);
    // the dropped hour no longer feeds the recurrence
    assert_eq!(records[0].estimated_temperature, 11.84);
    assert_eq!(records[1].estimated_temperature, 19.1);
}

#[test]
fn test_missing_column_is_schema_error() {
    let input = RawTable::from_columns([
        ("location_id", vec![json!("L1")]),
        ("timestamp", vec![json!("2025-01-10T00:00")]),
        ("air_temperature_c", vec![json!(10.0)]),
    ])
    .unwrap();

    let err = pipeline().run(&input).unwrap_err();
    assert!(matches!(err, RailTempError::Schema { .. }));
}

#[test]
fn test_reconcile_replaces_overlapping_dates_and_keeps_the_rest() {
    let day_one = pipeline()
        .run(&table(&[
            ("L1", "2025-01-09T12:00", 25.0, 0.0, 8.5, 600.0, 0),
            ("L1", "2025-01-10T12:00", 25.0, 0.0, 8.5, 600.0, 0),
        ]))
        .unwrap();
    let prior = reconcile(HistorySeries::empty(), day_one);

    let refresh = pipeline()
        .run(&table(&[
            ("L1", "2025-01-10T06:00", 18.0, 0.0, 8.5, 0.0, 3),
            ("L1", "2025-01-11T06:00", 18.0, 0.0, 8.5, 0.0, 3),
        ]))
        .unwrap();
    let merged = reconcile(prior.clone(), refresh.clone());

    let days: Vec<u32> = merged.records().iter().map(|r| r.timestamp.day()).collect();
    assert_eq!(days, vec![9, 10, 11]);
    assert_eq!(merged.records()[0], prior.records()[0]);
    assert_eq!(&merged.records()[1..], refresh.as_slice());

    let again = reconcile(merged.clone(), refresh);
    assert_eq!(again, merged);
}

#[test]
fn test_offset_timestamps_are_dated_in_reference_zone() {
    let prior = reconcile(
        HistorySeries::empty(),
        pipeline()
            .run(&table(&[("L1", "2025-01-10T12:00", 25.0, 0.0, 8.5, 600.0, 0)]))
            .unwrap(),
    );

    // 02:00 UTC on the 10th is 23:00 on the 9th in Sao Paulo
    let batch = pipeline()
        .run(&table(&[("L1", "2025-01-10T02:00:00+00:00", 24.0, 0.0, 8.5, 0.0, 0)]))
        .unwrap();
    assert_eq!(batch[0].timestamp.day(), 9);
    assert_eq!(batch[0].timestamp.offset().local_minus_utc(), -3 * 3600);

    let merged = reconcile(prior.clone(), batch.clone());
    assert_eq!(merged.len(), 2);
    assert_eq!(merged.records()[0], batch[0]);
    assert_eq!(merged.records()[1], prior.records()[0]);
}

#[test]
fn test_open_meteo_payload_through_pipeline() {
    let response: ForecastResponse = serde_json::from_value(json!({
        "latitude": -23.5,
        "longitude": -46.625,
        "timezone": "America/Sao_Paulo",
        "hourly": {
            "time": ["2025-01-10T00:00", "2025-01-10T01:00", "2025-01-10T02:00"],
            "temperature_2m": [10.0, 10.0, 10.0],
            "precipitation": [0.0, 1.0, 0.0],
            "weather_code": [0, 61, 95],
            "wind_speed_10m": [8.5, 8.5, 0.0],
            "direct_normal_irradiance": [100.0, 1000.0, 10000.0]
        }
    }))
    .unwrap();

    let location = Location::new("L1", -23.55, -46.63);
    let raw = response.into_table(&location).unwrap().unwrap();
    let records = pipeline().run(&raw).unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[2].estimated_temperature, 19.02);
    assert_eq!(records[2].sky_condition, "thunderstorm");
    assert_eq!(records[0].latitude, -23.55);
}
