use jobform::domain::models::{
    Document, Hyperparameter, HyperparameterType, HyperparameterValue, Path, ScalingType, Segment,
};
use jobform::services::{HyperparameterService, MutationBatch, MutationReducer, PathAccessor, WireContainers};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn field_name() -> impl Strategy<Value = String> {
    "[A-Za-z_][A-Za-z0-9_:-]{0,8}"
}

fn segment() -> impl Strategy<Value = Segment> {
    prop_oneof![
        3 => field_name().prop_map(Segment::Field),
        1 => (0usize..4).prop_map(Segment::Index),
    ]
}

fn scalar() -> impl Strategy<Value = Document> {
    prop_oneof![
        any::<bool>().prop_map(Document::Bool),
        any::<i64>().prop_map(Document::from),
        "[a-z0-9 ]{0,12}".prop_map(Document::string),
    ]
}

/// Flat record with distinct keys.
fn record() -> impl Strategy<Value = BTreeMap<String, Document>> {
    prop::collection::btree_map(field_name(), scalar(), 1..8)
}

fn to_document(map: &BTreeMap<String, Document>) -> Document {
    map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}

fn shape() -> impl Strategy<Value = HyperparameterType> {
    prop::sample::select(HyperparameterType::ALL.to_vec())
}

proptest! {
    /// Property: printing a path and parsing it back is lossless
    #[test]
    fn prop_path_round_trip(segments in prop::collection::vec(segment(), 0..6)) {
        let path: Path = segments.into_iter().collect();
        let parsed = Path::parse(&path.to_string()).unwrap();
        prop_assert_eq!(parsed, path);
    }

    /// Property: applying the same Set twice equals applying it once
    #[test]
    fn prop_set_is_idempotent(
        segments in prop::collection::vec(segment(), 1..5),
        value in scalar(),
    ) {
        let path: Path = segments.into_iter().collect();
        let reducer = MutationReducer::new();
        let mut batch = MutationBatch::new();
        batch.set(path.clone(), value.clone());

        let once = reducer.apply(&Document::Null, &batch).unwrap();
        let twice = reducer.apply(&once, &batch).unwrap();
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(PathAccessor::new().get(&once, &path), Some(&value));
    }

    /// Property: Unset removes exactly one key and leaves its siblings alone
    #[test]
    fn prop_unset_preserves_siblings(map in record(), pick in any::<prop::sample::Index>()) {
        let keys: Vec<&String> = map.keys().collect();
        let victim = keys[pick.index(keys.len())].clone();

        let doc = Document::from_iter([("Parent".to_string(), to_document(&map))]);
        let mut batch = MutationBatch::new();
        batch.unset(Path::root().field("Parent").field(victim.as_str()));
        let after = MutationReducer::new().apply(&doc, &batch).unwrap();

        let mut expected = map.clone();
        expected.remove(&victim);
        let parent = PathAccessor::new()
            .get(&after, &Path::root().field("Parent"))
            .cloned()
            .unwrap_or_default();
        prop_assert_eq!(parent, to_document(&expected));
    }

    /// Property: merging a record with disjoint keys yields the union
    #[test]
    fn prop_disjoint_merge_is_additive(left in record(), right in record()) {
        let right: BTreeMap<String, Document> = right
            .into_iter()
            .map(|(k, v)| (format!("r_{k}"), v))
            .filter(|(k, _)| !left.contains_key(k))
            .collect();

        let target = Path::root().field("Config");
        let doc = Document::from_iter([("Config".to_string(), to_document(&left))]);
        let mut batch = MutationBatch::new();
        batch.merge(target.clone(), to_document(&right));
        let after = MutationReducer::new().apply(&doc, &batch).unwrap();

        let mut union = left.clone();
        union.extend(right);
        let merged = PathAccessor::new().get(&after, &target).cloned().unwrap_or_default();
        prop_assert_eq!(merged, to_document(&union));
    }

    /// Property: after any sequence of type changes a key lives in at most
    /// one wire container
    #[test]
    fn prop_type_changes_keep_key_exclusive(
        start in shape(),
        changes in prop::collection::vec(shape(), 1..8),
    ) {
        let service = HyperparameterService::new();
        let reducer = MutationReducer::new();
        let containers = WireContainers::at(Path::root());
        let parts = vec!["1".to_string(), "5".to_string()];
        let hp = Hyperparameter::new(
            "alpha",
            HyperparameterValue::from_parts(start, &parts, ScalingType::Auto),
        );

        let batch = service.insert(&Document::record(), &containers, &hp).unwrap();
        let mut doc = reducer.apply(&Document::record(), &batch).unwrap();

        for next in changes {
            let current = service.read(&doc, &containers, None, "alpha").unwrap();
            let (updated, batch) = service.change_type(&doc, &containers, &current, next).unwrap();
            doc = reducer.apply(&doc, &batch).unwrap();

            prop_assert_eq!(updated.kind(), next);
            prop_assert_eq!(
                service.containers_holding(&doc, &containers, "alpha"),
                vec![next]
            );
        }
    }
}
