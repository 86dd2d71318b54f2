//! Integration tests for the feature pipeline: schema, values, policies

use polars::prelude::*;
use proptest::prelude::*;
use spotify_features::features::{
    has_column, numeric_values, DegenerateRange, FeatureEngineer, OutOfRange, SkipReason, StageKind,
};
use spotify_features::utils::{DataLoader, DataSaver};
use spotify_features::FeatureError;

fn close(actual: Option<f64>, expected: f64) -> bool {
    actual.map_or(false, |v| (v - expected).abs() < 1e-9)
}

fn values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    numeric_values(df, name).unwrap().unwrap()
}

fn labels(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    df.column(name)
        .unwrap()
        .as_materialized_series()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect()
}

/// Three songs; the first is the reference song, the others pin the tempo
/// range to [80, 160] and the loudness range to [-20, 0].
fn reference_table() -> DataFrame {
    df!(
        "acousticness" => &[0.1, 0.5, 0.3],
        "danceability" => &[0.6, 0.3, 0.9],
        "energy" => &[0.8, 0.2, 0.5],
        "instrumentalness" => &[0.02, 0.4, 0.0],
        "liveness" => &[0.1, 0.2, 0.3],
        "loudness" => &[-5.0, -20.0, 0.0],
        "speechiness" => &[0.05, 0.1, 0.2],
        "tempo" => &[120.0, 80.0, 160.0],
        "valence" => &[0.7, 0.2, 0.5]
    )
    .unwrap()
}

// ============================================================================
// Schema
// ============================================================================

#[test]
fn test_full_table_gets_fourteen_features() {
    let df = reference_table();
    let result = FeatureEngineer::new().create_all_features(&df).unwrap();

    assert_eq!(
        result.created,
        vec![
            "energy_dance",
            "happy_dance",
            "energy_loudness",
            "acoustic_energy",
            "dance_tempo",
            "happiness_score",
            "dancefloor_potential",
            "chill_factor",
            "energy_level",
            "dance_category",
            "tempo_category",
            "mood",
            "speech_to_music_ratio",
            "energy_acoustic_ratio",
        ]
    );
    assert_eq!(result.original_columns, 9);
    assert_eq!(result.new_columns(), 14);
    assert_eq!(result.total_columns(), 23);
    assert_eq!(result.table.height(), 3);
}

#[test]
fn test_original_columns_untouched() {
    let df = reference_table();
    let result = FeatureEngineer::new().create_all_features(&df).unwrap();

    for column in df.get_columns() {
        let after = result.table.column(column.name()).unwrap();
        assert!(after
            .as_materialized_series()
            .equals_missing(column.as_materialized_series()));
    }
    assert_eq!(df.width(), 9);
}

#[test]
fn test_missing_loudness_drops_only_dependent_features() {
    let df = reference_table().drop("loudness").unwrap();
    let result = FeatureEngineer::new().create_all_features(&df).unwrap();

    assert!(!has_column(&result.table, "energy_loudness"));
    assert!(!has_column(&result.table, "chill_factor"));
    for name in ["energy_dance", "happiness_score", "dancefloor_potential", "mood", "energy_acoustic_ratio"] {
        assert!(has_column(&result.table, name), "{} should be present", name);
    }
    assert_eq!(result.new_columns(), 12);

    let composites = result.report(StageKind::Composites).unwrap();
    let chill = composites
        .skipped
        .iter()
        .find(|s| s.name == "chill_factor")
        .unwrap();
    assert_eq!(chill.reason, SkipReason::MissingColumns(vec!["loudness".to_string()]));
}

#[test]
fn test_empty_schema_is_a_no_op() {
    let df = df!("title" => &["a", "b"]).unwrap();
    let result = FeatureEngineer::new().create_all_features(&df).unwrap();
    assert_eq!(result.new_columns(), 0);
    assert_eq!(result.table.width(), 1);
    assert_eq!(result.reports.len(), 4);
}

#[test]
fn test_existing_ratio_column_is_kept() {
    // A pre-existing ratio column is kept verbatim and reported as present
    let df = reference_table()
        .hstack(&[Column::new("speech_to_music_ratio".into(), &[1.0, 2.0, 3.0])])
        .unwrap();
    let result = FeatureEngineer::new().create_all_features(&df).unwrap();

    assert_eq!(values(&result.table, "speech_to_music_ratio"), vec![Some(1.0), Some(2.0), Some(3.0)]);
    let ratios = result.report(StageKind::Ratios).unwrap();
    assert_eq!(ratios.created, vec!["energy_acoustic_ratio"]);
    assert_eq!(ratios.skipped[0].reason, SkipReason::AlreadyPresent);
}

// ============================================================================
// Values
// ============================================================================

#[test]
fn test_reference_song_values() {
    let result = FeatureEngineer::new()
        .create_all_features(&reference_table())
        .unwrap();
    let t = &result.table;

    assert!(close(values(t, "energy_dance")[0], 0.48));
    assert!(close(values(t, "happy_dance")[0], 0.42));
    assert!(close(values(t, "energy_loudness")[0], -4.0));
    assert!(close(values(t, "acoustic_energy")[0], 0.08));
    assert!(close(values(t, "dance_tempo")[0], 72.0));

    assert!(close(values(t, "happiness_score")[0], 0.6));
    // tempo_norm = (120 - 80) / 80 = 0.5
    assert!(close(values(t, "dancefloor_potential")[0], (0.6 + 0.8 + 0.5) / 3.0));
    // loudness_norm = (-5 + 20) / 20 = 0.75
    assert!(close(values(t, "chill_factor")[0], (0.1 + 0.2 + 0.25) / 3.0));

    assert_eq!(labels(t, "energy_level")[0].as_deref(), Some("High"));
    assert_eq!(labels(t, "dance_category")[0].as_deref(), Some("Moderate"));
    assert_eq!(labels(t, "tempo_category")[0].as_deref(), Some("Medium"));
    assert_eq!(labels(t, "mood")[0].as_deref(), Some("Happy"));

    let speech = values(t, "speech_to_music_ratio")[0].unwrap();
    assert!((speech - 2.381).abs() < 1e-3);
    assert!(close(values(t, "energy_acoustic_ratio")[0], 0.8 / 0.101));
}

#[test]
fn test_bucket_edges_are_right_inclusive() {
    let df = df!(
        "energy" => &[0.0, 0.3, 0.31, 0.7, 1.0],
        "tempo" => &[0.0, 90.0, 90.5, 140.0, 200.0]
    )
    .unwrap();
    let result = FeatureEngineer::new().create_all_features(&df).unwrap();

    let energy: Vec<_> = labels(&result.table, "energy_level");
    assert_eq!(
        energy,
        ["Low", "Low", "Medium", "Medium", "High"]
            .iter()
            .map(|s| Some(s.to_string()))
            .collect::<Vec<_>>()
    );
    let tempo = labels(&result.table, "tempo_category");
    assert_eq!(
        tempo,
        ["Slow", "Slow", "Medium", "Fast", "Very_Fast"]
            .iter()
            .map(|s| Some(s.to_string()))
            .collect::<Vec<_>>()
    );
}

#[test]
fn test_null_inputs_propagate() {
    let df = df!(
        "energy" => &[Some(0.5), None],
        "danceability" => &[Some(0.5), Some(0.5)]
    )
    .unwrap();
    let result = FeatureEngineer::new().create_all_features(&df).unwrap();

    assert_eq!(values(&result.table, "energy_dance"), vec![Some(0.25), None]);
    assert_eq!(labels(&result.table, "energy_level")[1], None);
}

#[test]
fn test_integer_columns_are_numeric() {
    let df = df!(
        "speechiness" => &[1i64, 2],
        "instrumentalness" => &[0i64, 1]
    )
    .unwrap();
    let result = FeatureEngineer::new().create_all_features(&df).unwrap();
    let ratio = values(&result.table, "speech_to_music_ratio");
    assert!(close(ratio[0], 1.0 / 0.001));
    assert!(close(ratio[1], 2.0 / 1.001));
}

#[test]
fn test_text_source_is_malformed() {
    let df = df!(
        "energy" => &["loud", "quiet"],
        "danceability" => &[0.5, 0.5]
    )
    .unwrap();
    let err = FeatureEngineer::new().create_all_features(&df).unwrap_err();
    assert!(matches!(err, FeatureError::MalformedInput(_)));
}

#[test]
fn test_blank_csv_column_yields_null_features() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("songs.csv");
    std::fs::write(
        &path,
        "energy,danceability,speechiness,instrumentalness\n0.8,0.6,0.05,\n0.2,0.3,0.1,\n",
    )
    .unwrap();

    let df = DataLoader::new().load_csv(&path).unwrap();
    let result = FeatureEngineer::new().create_all_features(&df).unwrap();

    assert_eq!(values(&result.table, "speech_to_music_ratio"), vec![None, None]);
    assert!(close(values(&result.table, "energy_dance")[0], 0.48));
    assert_eq!(result.table.height(), 2);
}

// ============================================================================
// Policies
// ============================================================================

#[test]
fn test_constant_tempo_defaults_to_zero() {
    let df = df!(
        "danceability" => &[0.3, 0.9],
        "energy" => &[0.6, 0.3],
        "tempo" => &[120.0, 120.0]
    )
    .unwrap();
    let result = FeatureEngineer::new().create_all_features(&df).unwrap();
    let dancefloor = values(&result.table, "dancefloor_potential");
    assert!(close(dancefloor[0], 0.3));
    assert!(close(dancefloor[1], 0.4));
}

#[test]
fn test_constant_tempo_null_policy() {
    let df = df!(
        "danceability" => &[0.3, 0.9],
        "energy" => &[0.6, 0.3],
        "tempo" => &[120.0, 120.0]
    )
    .unwrap();
    let result = FeatureEngineer::new()
        .with_degenerate_range(DegenerateRange::Null)
        .create_all_features(&df)
        .unwrap();
    assert_eq!(values(&result.table, "dancefloor_potential"), vec![None, None]);
}

#[test]
fn test_out_of_range_tempo() {
    let df = df!("tempo" => &[-5.0, 250.0, 100.0]).unwrap();

    let default = FeatureEngineer::new().create_all_features(&df).unwrap();
    assert_eq!(
        labels(&default.table, "tempo_category"),
        vec![None, None, Some("Medium".to_string())]
    );

    let clamped = FeatureEngineer::new()
        .with_out_of_range(OutOfRange::Clamp)
        .create_all_features(&df)
        .unwrap();
    assert_eq!(
        labels(&clamped.table, "tempo_category"),
        vec![
            Some("Slow".to_string()),
            Some("Very_Fast".to_string()),
            Some("Medium".to_string())
        ]
    );
}

#[test]
fn test_custom_stabilizer() {
    let df = df!("energy" => &[0.5], "acousticness" => &[0.0]).unwrap();
    let result = FeatureEngineer::new()
        .with_ratio_stabilizer(0.5)
        .create_all_features(&df)
        .unwrap();
    assert!(close(values(&result.table, "energy_acoustic_ratio")[0], 1.0));
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_repeated_runs_are_identical() {
    let df = reference_table();
    let engineer = FeatureEngineer::new();
    let mut a = engineer.create_all_features(&df).unwrap().into_table();
    let mut b = engineer.create_all_features(&df).unwrap().into_table();
    assert_eq!(
        DataSaver::to_csv_bytes(&mut a).unwrap(),
        DataSaver::to_csv_bytes(&mut b).unwrap()
    );
}

proptest! {
    #[test]
    fn prop_rows_preserved_and_columns_only_grow(
        rows in prop::collection::vec((0.0f64..1.0, 0.0f64..1.0, 40.0f64..240.0, -30.0f64..0.0), 1..40),
        drop_loudness in any::<bool>(),
    ) {
        let energy: Vec<f64> = rows.iter().map(|r| r.0).collect();
        let danceability: Vec<f64> = rows.iter().map(|r| r.1).collect();
        let tempo: Vec<f64> = rows.iter().map(|r| r.2).collect();
        let loudness: Vec<f64> = rows.iter().map(|r| r.3).collect();

        let mut df = df!(
            "energy" => &energy,
            "danceability" => &danceability,
            "tempo" => &tempo,
            "loudness" => &loudness
        ).unwrap();
        if drop_loudness {
            df = df.drop("loudness").unwrap();
        }

        let result = FeatureEngineer::new().create_all_features(&df).unwrap();
        prop_assert_eq!(result.table.height(), rows.len());
        prop_assert_eq!(result.table.width(), df.width() + result.new_columns());
        for column in df.get_columns() {
            let after = result.table.column(column.name()).unwrap();
            prop_assert!(after.as_materialized_series().equals_missing(column.as_materialized_series()));
        }
        prop_assert_eq!(has_column(&result.table, "energy_loudness"), !drop_loudness);
    }
}
