use super::*;
use crate::catalog::{AlternativesCatalog, CatalogEntry};

fn entry(item_id: &str, risk: f32, embedding: Vec<f32>) -> CatalogEntry {
    CatalogEntry {
        item_id: item_id.to_string(),
        label: None,
        risk,
        embedding,
    }
}

fn axis_catalog() -> AlternativesCatalog {
    AlternativesCatalog::from_entries(vec![
        entry("x", 0.1, vec![1.0, 0.0, 0.0]),
        entry("y", 0.2, vec![0.0, 1.0, 0.0]),
        entry("z", 0.3, vec![0.0, 0.0, 1.0]),
        entry("xy", 0.4, vec![1.0, 1.0, 0.0]),
    ])
    .unwrap()
}

#[test]
fn test_metric_from_str() {
    assert_eq!("cosine".parse(), Ok(DistanceMetric::Cosine));
    assert_eq!("Euclidean".parse(), Ok(DistanceMetric::Euclidean));
    assert!("manhattan".parse::<DistanceMetric>().is_err());
}

#[test]
fn test_cosine_search_orders_by_similarity() {
    let index = VectorIndex::build(&axis_catalog(), DistanceMetric::Cosine).unwrap();

    let neighbors = index.search(&[1.0, 0.2, 0.0], 4).unwrap();

    assert_eq!(neighbors[0].position, 0);
    assert!(neighbors[0].similarity > neighbors[1].similarity);
    assert_eq!(neighbors[1].position, 3);
    assert!(neighbors.windows(2).all(|w| w[0].similarity >= w[1].similarity));
}

#[test]
fn test_cosine_similarity_is_scale_invariant() {
    let index = VectorIndex::build(&axis_catalog(), DistanceMetric::Cosine).unwrap();

    let small = index.search(&[0.1, 0.02, 0.0], 1).unwrap();
    let large = index.search(&[10.0, 2.0, 0.0], 1).unwrap();

    assert_eq!(small[0].position, large[0].position);
    assert!((small[0].similarity - large[0].similarity).abs() < 1e-6);
}

#[test]
fn test_cosine_clamps_negative_similarity_to_zero() {
    let catalog =
        AlternativesCatalog::from_entries(vec![entry("neg", 0.1, vec![-1.0, 0.0, 0.0])]).unwrap();
    let index = VectorIndex::build(&catalog, DistanceMetric::Cosine).unwrap();

    let neighbors = index.search(&[1.0, 0.0, 0.0], 1).unwrap();

    assert_eq!(neighbors[0].similarity, 0.0);
}

#[test]
fn test_euclidean_search_prefers_closest() {
    let index = VectorIndex::build(&axis_catalog(), DistanceMetric::Euclidean).unwrap();

    let neighbors = index.search(&[0.0, 0.9, 0.1], 2).unwrap();

    assert_eq!(neighbors[0].position, 1);
    assert!(neighbors[0].similarity > neighbors[1].similarity);
    assert!(neighbors[0].similarity <= 1.0);
}

#[test]
fn test_search_truncates_to_m() {
    let index = VectorIndex::build(&axis_catalog(), DistanceMetric::Cosine).unwrap();

    assert_eq!(index.search(&[1.0, 0.0, 0.0], 2).unwrap().len(), 2);
    assert_eq!(index.search(&[1.0, 0.0, 0.0], 100).unwrap().len(), 4);
    assert!(index.search(&[1.0, 0.0, 0.0], 0).unwrap().is_empty());
}

#[test]
fn test_search_ties_break_by_position() {
    let catalog = AlternativesCatalog::from_entries(vec![
        entry("first", 0.1, vec![1.0, 0.0]),
        entry("second", 0.2, vec![1.0, 0.0]),
    ])
    .unwrap();
    let index = VectorIndex::build(&catalog, DistanceMetric::Cosine).unwrap();

    let neighbors = index.search(&[1.0, 0.0], 2).unwrap();

    assert_eq!(neighbors[0].position, 0);
    assert_eq!(neighbors[1].position, 1);
}

#[test]
fn test_search_is_deterministic() {
    let index = VectorIndex::build(&axis_catalog(), DistanceMetric::Cosine).unwrap();
    let query = [0.3, 0.5, 0.2];

    assert_eq!(index.search(&query, 4).unwrap(), index.search(&query, 4).unwrap());
}

#[test]
fn test_search_rejects_wrong_dimension() {
    let index = VectorIndex::build(&axis_catalog(), DistanceMetric::Cosine).unwrap();

    let err = index.search(&[1.0], 2).expect_err("should fail");
    assert!(matches!(
        err,
        IndexError::DimensionMismatch {
            expected: 3,
            actual: 1
        }
    ));
}

#[test]
fn test_search_rejects_non_finite_query() {
    let index = VectorIndex::build(&axis_catalog(), DistanceMetric::Cosine).unwrap();

    let err = index.search(&[1.0, f32::NAN, 0.0], 2).expect_err("should fail");
    assert!(matches!(err, IndexError::NonFiniteQuery));
}

#[test]
fn test_zero_norm_vectors_score_zero() {
    let catalog = AlternativesCatalog::from_entries(vec![
        entry("zero", 0.1, vec![0.0, 0.0]),
        entry("unit", 0.2, vec![1.0, 0.0]),
    ])
    .unwrap();
    let index = VectorIndex::build(&catalog, DistanceMetric::Cosine).unwrap();

    let neighbors = index.search(&[1.0, 0.0], 2).unwrap();

    assert_eq!(neighbors[0].position, 1);
    assert_eq!(neighbors[1].similarity, 0.0);
}

#[test]
fn test_mock_index_returns_canned_neighbors() {
    let mock = MockIndex::new(
        3,
        vec![
            Neighbor {
                position: 2,
                similarity: 0.99,
            },
            Neighbor {
                position: 0,
                similarity: 0.7,
            },
        ],
    );

    let neighbors = mock.search(&[0.0, 0.0, 0.0], 1).unwrap();
    assert_eq!(neighbors.len(), 1);
    assert_eq!(neighbors[0].position, 2);

    assert!(mock.search(&[0.0], 1).is_err());
}
