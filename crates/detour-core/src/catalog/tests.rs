use super::*;

use std::sync::Arc;

use arrow::array::{FixedSizeListArray, Float32Array, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Float32Type, Schema};
use parquet::arrow::ArrowWriter;

fn embedding_field(dim: i32) -> Field {
    Field::new(
        COL_EMBEDDING,
        DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim),
        true,
    )
}

fn write_catalog(rows: Vec<(Option<&str>, Option<f32>, Option<Vec<f32>>)>) -> tempfile::NamedTempFile {
    let dim = 3;
    let schema = Arc::new(Schema::new(vec![
        Field::new(COL_ITEM_ID, DataType::Utf8, true),
        Field::new(COL_LABEL, DataType::Utf8, true),
        Field::new(COL_RISK, DataType::Float32, true),
        embedding_field(dim),
    ]));

    let item_ids = StringArray::from(rows.iter().map(|(id, _, _)| *id).collect::<Vec<_>>());
    let labels = StringArray::from(
        rows.iter()
            .map(|(id, _, _)| id.map(|v| format!("label for {}", v)))
            .collect::<Vec<_>>(),
    );
    let risks = Float32Array::from(rows.iter().map(|(_, risk, _)| *risk).collect::<Vec<_>>());
    let embeddings = FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(
        rows.iter().map(|(_, _, emb)| {
            emb.as_ref()
                .map(|values| values.iter().map(|v| Some(*v)).collect::<Vec<_>>())
        }),
        dim,
    );

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(item_ids),
            Arc::new(labels),
            Arc::new(risks),
            Arc::new(embeddings),
        ],
    )
    .expect("batch matches schema");

    let file = tempfile::NamedTempFile::new().expect("temp file");
    let mut writer =
        ArrowWriter::try_new(file.reopen().expect("reopen"), schema, None).expect("writer");
    writer.write(&batch).expect("write batch");
    writer.close().expect("close writer");
    file
}

#[test]
fn test_load_valid_catalog() {
    let file = write_catalog(vec![
        (Some("item-a"), Some(0.2), Some(vec![1.0, 0.0, 0.0])),
        (Some("item-b"), Some(0.8), Some(vec![0.0, 1.0, 0.0])),
        (Some("item-c"), Some(0.95), Some(vec![0.0, 0.0, 1.0])),
    ]);

    let catalog = AlternativesCatalog::load(file.path()).expect("catalog should load");

    assert_eq!(catalog.len(), 3);
    assert_eq!(catalog.embedding_dim(), 3);
    assert_eq!(catalog.get(0).unwrap().item_id, "item-a");
    assert_eq!(
        catalog.get(0).unwrap().label.as_deref(),
        Some("label for item-a")
    );
}

#[test]
fn test_load_drops_rows_with_null_fields() {
    let file = write_catalog(vec![
        (Some("item-a"), Some(0.2), Some(vec![1.0, 0.0, 0.0])),
        (None, Some(0.5), Some(vec![0.0, 1.0, 0.0])),
        (Some("item-c"), None, Some(vec![0.0, 1.0, 0.0])),
        (Some("item-d"), Some(0.4), None),
    ]);

    let catalog = AlternativesCatalog::load(file.path()).expect("catalog should load");

    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.get(0).unwrap().item_id, "item-a");
}

#[test]
fn test_load_drops_rows_with_out_of_range_risk() {
    let file = write_catalog(vec![
        (Some("item-a"), Some(1.7), Some(vec![1.0, 0.0, 0.0])),
        (Some("item-b"), Some(0.3), Some(vec![0.0, 1.0, 0.0])),
    ]);

    let catalog = AlternativesCatalog::load(file.path()).expect("catalog should load");

    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.get(0).unwrap().item_id, "item-b");
}

#[test]
fn test_load_empty_catalog_is_fatal() {
    let file = write_catalog(vec![(None, None, None)]);

    let err = AlternativesCatalog::load(file.path()).expect_err("should fail");
    assert!(matches!(err, CatalogError::Empty));
}

#[test]
fn test_load_missing_column_is_fatal() {
    let schema = Arc::new(Schema::new(vec![Field::new(
        COL_ITEM_ID,
        DataType::Utf8,
        true,
    )]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![Arc::new(StringArray::from(vec![Some("item-a")]))],
    )
    .unwrap();

    let file = tempfile::NamedTempFile::new().expect("temp file");
    let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let err = AlternativesCatalog::load(file.path()).expect_err("should fail");
    assert!(matches!(err, CatalogError::MissingColumn { name: COL_RISK }));
}

#[test]
fn test_from_entries_rejects_empty() {
    assert!(matches!(
        AlternativesCatalog::from_entries(vec![]),
        Err(CatalogError::Empty)
    ));
}

#[test]
fn test_from_entries_rejects_mixed_dimensions() {
    let entries = vec![
        CatalogEntry {
            item_id: "a".to_string(),
            label: None,
            risk: 0.1,
            embedding: vec![1.0, 0.0],
        },
        CatalogEntry {
            item_id: "b".to_string(),
            label: None,
            risk: 0.2,
            embedding: vec![1.0],
        },
    ];

    assert!(matches!(
        AlternativesCatalog::from_entries(entries),
        Err(CatalogError::DimensionMismatch { first: 2, other: 1 })
    ));
}

#[test]
fn test_stats() {
    let entries = vec![
        CatalogEntry {
            item_id: "a".to_string(),
            label: None,
            risk: 0.2,
            embedding: vec![1.0, 0.0],
        },
        CatalogEntry {
            item_id: "b".to_string(),
            label: None,
            risk: 0.6,
            embedding: vec![0.0, 1.0],
        },
    ];
    let catalog = AlternativesCatalog::from_entries(entries).unwrap();

    let stats = catalog.stats();
    assert_eq!(stats.entries, 2);
    assert_eq!(stats.embedding_dim, 2);
    assert_eq!(stats.risk_min, 0.2);
    assert_eq!(stats.risk_max, 0.6);
    assert!((stats.risk_mean - 0.4).abs() < 1e-6);
}
