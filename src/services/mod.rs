pub mod form_session;
pub mod hyperparameter_editor;
pub mod hyperparameter_service;
pub mod mutation_reducer;
pub mod path_accessor;
pub mod range_validator;
pub mod step_gate;
pub mod touch_tracker;
pub mod validation_engine;

pub use form_session::{FormSession, SubmitOutcome};
pub use hyperparameter_editor::HyperparameterEditor;
pub use hyperparameter_service::{HyperparameterService, WireContainers};
pub use mutation_reducer::{FieldMap, Mutation, MutationBatch, MutationMethod, MutationReducer};
pub use path_accessor::PathAccessor;
pub use range_validator::{DefinitionLocator, HyperparameterRulesValidator, RangeValidator};
pub use step_gate::WizardStepGate;
pub use touch_tracker::TouchTracker;
pub use validation_engine::ValidationEngine;
