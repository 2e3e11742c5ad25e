mod common;

use common::{json_at, path, root_editor, training_session};
use jobform::domain::models::{HyperparameterType, HyperparameterValue, ScalingType};
use jobform::services::range_validator::RANGE_ORDER_MESSAGE;
use jobform::forms::FormDefinition;
use jobform::services::FormSession;
use jobform::{DomainError, HyperparameterEditor};
use serde_json::json;

fn xgboost_session() -> (HyperparameterEditor, FormSession) {
    let editor = root_editor();
    let mut session = training_session();
    editor.select_algorithm(&mut session, "xgboost").unwrap();
    (editor, session)
}

fn containers_holding(session: &FormSession, key: &str) -> Vec<&'static str> {
    let mut found = Vec::new();
    if json_at(session, &format!("StaticHyperParameters.{key}")) != serde_json::Value::Null {
        found.push("static");
    }
    for container in [
        "IntegerParameterRanges",
        "ContinuousParameterRanges",
        "CategoricalParameterRanges",
    ] {
        let entries = json_at(session, &format!("HyperParameterRanges.{container}"));
        if entries
            .as_array()
            .is_some_and(|items| items.iter().any(|item| item["Name"] == key))
        {
            found.push(container);
        }
    }
    found
}

#[test]
fn test_integer_categorical_integer_round_trip() {
    let (editor, mut session) = xgboost_session();
    assert_eq!(containers_holding(&session, "max_depth"), vec!["IntegerParameterRanges"]);

    let hp = editor
        .change_type(&mut session, "max_depth", HyperparameterType::Categorical)
        .unwrap();
    assert_eq!(hp.value, HyperparameterValue::Categorical { values: Vec::new() });
    assert_eq!(
        containers_holding(&session, "max_depth"),
        vec!["CategoricalParameterRanges"]
    );

    editor
        .update_value(
            &mut session,
            "max_depth",
            HyperparameterValue::Categorical {
                values: vec!["4".into(), "6".into(), "8".into()],
            },
        )
        .unwrap();

    let hp = editor
        .change_type(&mut session, "max_depth", HyperparameterType::Integer)
        .unwrap();
    assert_eq!(hp.kind(), HyperparameterType::Integer);
    assert!(hp.value.parts().len() <= 2);
    assert_eq!(containers_holding(&session, "max_depth"), vec!["IntegerParameterRanges"]);

    // Only a hole is left where the categorical entry was.
    let categorical = json_at(&session, "HyperParameterRanges.CategoricalParameterRanges");
    assert_eq!(categorical, json!([null]));
    let payload = session
        .definition()
        .prepare_submission(session.document())
        .unwrap();
    assert_eq!(payload["HyperParameterRanges"]["CategoricalParameterRanges"], json!([]));
}

#[test]
fn test_static_to_range_keeps_value_as_min() {
    let (editor, mut session) = xgboost_session();
    let hp = editor
        .change_type(&mut session, "num_round", HyperparameterType::Integer)
        .unwrap();

    match hp.value {
        HyperparameterValue::Integer { ref min, ref max, .. } => {
            assert_eq!(min, "100");
            assert!(max.is_empty());
        }
        ref other => panic!("unexpected value {other:?}"),
    }
    assert_eq!(json_at(&session, "StaticHyperParameters.num_round"), json!(null));
    assert_eq!(containers_holding(&session, "num_round"), vec!["IntegerParameterRanges"]);
}

#[test]
fn test_disallowed_type_is_rejected_without_changes() {
    let (editor, mut session) = xgboost_session();
    let before = session.document().clone();

    let err = editor
        .change_type(&mut session, "eta", HyperparameterType::Categorical)
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Hyperparameter(jobform::domain::HyperparameterError::TypeNotAllowed { .. })
    ));
    assert_eq!(session.document(), &before);
}

#[test]
fn test_range_ordering_issue_lands_on_entry() {
    let (editor, mut session) = xgboost_session();
    editor
        .update_value(
            &mut session,
            "max_depth",
            HyperparameterValue::Integer {
                min: "10".into(),
                max: "5".into(),
                scaling: ScalingType::Linear,
            },
        )
        .unwrap();

    let errors = session.full_errors();
    let entry = path("HyperParameterRanges.IntegerParameterRanges[0]");
    assert_eq!(errors.get(&entry), Some(RANGE_ORDER_MESSAGE));
    assert!(errors.get(&entry.clone().field("MinValue")).is_none());
    assert!(errors.get(&entry.field("MaxValue")).is_none());
}

#[test]
fn test_bound_issue_lands_on_bound_field() {
    let (editor, mut session) = xgboost_session();
    editor
        .update_value(
            &mut session,
            "eta",
            HyperparameterValue::Continuous {
                min: "0.1".into(),
                max: "1.5".into(),
                scaling: ScalingType::Linear,
            },
        )
        .unwrap();

    let errors = session.full_errors();
    let message = errors
        .get(&path("HyperParameterRanges.ContinuousParameterRanges[0].MaxValue"))
        .unwrap();
    assert!(message.starts_with("Max value: "));
}

#[test]
fn test_rename_moves_entry_and_rejects_duplicates() {
    let (editor, mut session) = xgboost_session();
    let hp = editor.rename(&mut session, "subsample", "colsample_bytree").unwrap();
    assert_eq!(hp.key, "colsample_bytree");
    assert!(containers_holding(&session, "subsample").is_empty());
    assert_eq!(
        containers_holding(&session, "colsample_bytree"),
        vec!["ContinuousParameterRanges"]
    );

    assert!(matches!(
        editor.rename(&mut session, "colsample_bytree", "eta"),
        Err(DomainError::Hyperparameter(
            jobform::domain::HyperparameterError::DuplicateKey(_)
        ))
    ));
}

#[test]
fn test_reselecting_algorithm_clears_touched_hyperparameters() {
    let (editor, mut session) = xgboost_session();
    session
        .touch_fields(&[path("StaticHyperParameters.num_round")])
        .unwrap();
    assert!(session.touched().is_touched(&path("StaticHyperParameters.num_round")));

    editor.select_algorithm(&mut session, "linear-learner").unwrap();
    assert!(!session.touched().is_touched(&path("StaticHyperParameters.num_round")));
    assert!(containers_holding(&session, "num_round").is_empty());
    assert_eq!(
        json_at(&session, "StaticHyperParameters.predictor_type"),
        json!("regressor")
    );
}

#[test]
fn test_unknown_algorithm_is_an_error() {
    let editor = root_editor();
    let mut session = training_session();
    assert!(matches!(
        editor.select_algorithm(&mut session, "deepar"),
        Err(DomainError::Hyperparameter(
            jobform::domain::HyperparameterError::UnknownAlgorithm(_)
        ))
    ));
}
