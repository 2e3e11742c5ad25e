//! Replay CLI command: drive a wizard session from a YAML event script.
//!
//! ```yaml
//! form: hpo_job
//! editor: "TrainingJobDefinitions[0]"
//! events:
//!   - set_fields:
//!       fields: { HyperParameterTuningJobName: my-job }
//!   - touch: [HyperParameterTuningJobName]
//!   - next
//!   - add_definition
//!   - select_algorithm: xgboost
//!   - change_type: { key: eta, to: continuous }
//!   - submit
//! ```

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::cli::output::table::TraceRow;
use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::cli::{load_catalog, FormKind};
use crate::domain::models::{
    Config, ErrorTree, Hyperparameter, HyperparameterType, HyperparameterValue, Path,
    StepTransition,
};
use crate::forms::hpo_job::TRAINING_JOB_DEFINITIONS;
use crate::forms::training_definition::next_definition_name;
use crate::forms::{placeholder_definition, HpoJobForm};
use crate::services::{
    FieldMap, FormSession, HyperparameterEditor, MutationBatch, MutationMethod, PathAccessor,
    SubmitOutcome, ValidationEngine,
};

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Event script (YAML)
    pub script: PathBuf,

    /// Include the final document in the report
    #[arg(short, long)]
    pub document: bool,
}

/// A scripted wizard session.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplayScript {
    pub form: FormKind,
    /// Definition edited by hyperparameter events; defaults to the first
    /// definition of a tuning job, or the root of a single definition.
    #[serde(default)]
    pub editor: Option<Path>,
    #[serde(default, with = "serde_yaml::with::singleton_map_recursive")]
    pub events: Vec<ReplayEvent>,
}

/// One UI event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayEvent {
    SetFields {
        fields: FieldMap,
        #[serde(default)]
        method: MutationMethod,
    },
    Touch(Vec<Path>),
    Untouch(Vec<Path>),
    Next,
    Previous,
    Jump(usize),
    /// Append a placeholder training definition to a tuning job
    AddDefinition,
    /// Remove the definition in a slot, leaving a hole
    RemoveDefinition(usize),
    SelectAlgorithm(String),
    ChangeType {
        key: String,
        to: HyperparameterType,
    },
    Rename {
        key: String,
        to: String,
    },
    UpdateValue {
        key: String,
        value: HyperparameterValue,
    },
    AddParameter {
        key: String,
        value: HyperparameterValue,
    },
    RemoveParameter(String),
    Submit,
    Cancel,
}

impl ReplayEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::SetFields { .. } => "set_fields",
            Self::Touch(_) => "touch",
            Self::Untouch(_) => "untouch",
            Self::Next => "next",
            Self::Previous => "previous",
            Self::Jump(_) => "jump",
            Self::AddDefinition => "add_definition",
            Self::RemoveDefinition(_) => "remove_definition",
            Self::SelectAlgorithm(_) => "select_algorithm",
            Self::ChangeType { .. } => "change_type",
            Self::Rename { .. } => "rename",
            Self::UpdateValue { .. } => "update_value",
            Self::AddParameter { .. } => "add_parameter",
            Self::RemoveParameter(_) => "remove_parameter",
            Self::Submit => "submit",
            Self::Cancel => "cancel",
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ReplayOutput {
    pub session_id: String,
    pub form: String,
    pub step: usize,
    pub step_title: String,
    pub status: String,
    pub trace: Vec<TraceRow>,
    pub errors: ErrorTree,
    pub hyperparameters: Vec<ParameterOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<SubmitOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<serde_json::Value>,
}

#[derive(Debug, serde::Serialize)]
pub struct ParameterOutput {
    pub key: String,
    #[serde(flatten)]
    pub value: HyperparameterValue,
}

impl CommandOutput for ReplayOutput {
    fn to_human(&self) -> String {
        let formatter = TableFormatter::new();
        let mut lines = vec![
            format!("Session: {} ({})", self.session_id, self.form),
            format!("Step {}: {}", self.step + 1, self.step_title),
            format!("Status: {}", self.status),
            String::new(),
            formatter.format_trace(&self.trace),
        ];

        if !self.hyperparameters.is_empty() {
            let parameters: Vec<Hyperparameter> = self
                .hyperparameters
                .iter()
                .map(|p| Hyperparameter::new(p.key.clone(), p.value.clone()))
                .collect();
            lines.push("\nHyperparameters:".to_string());
            lines.push(formatter.format_parameters(&parameters));
        }

        if self.errors.is_empty() {
            lines.push("\nNo errors surfaced.".to_string());
        } else {
            lines.push(format!("\n{} error(s):", self.errors.len()));
            lines.push(formatter.format_errors(&self.errors));
        }

        match &self.outcome {
            Some(SubmitOutcome::Submitted(payload)) => {
                lines.push("\nSubmitted payload:".to_string());
                lines.push(serde_json::to_string_pretty(payload).unwrap_or_default());
            }
            Some(SubmitOutcome::Rejected(_)) => lines.push("\nSubmission rejected.".to_string()),
            None => {}
        }

        if let Some(document) = &self.document {
            lines.push("\nDocument:".to_string());
            lines.push(serde_json::to_string_pretty(document).unwrap_or_default());
        }

        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Replays events against one session.
pub struct Replayer {
    session: FormSession,
    editor: HyperparameterEditor,
    form: FormKind,
    outcome: Option<SubmitOutcome>,
}

impl Replayer {
    pub fn new(script: &ReplayScript, config: &Config) -> Result<Self> {
        let catalog = load_catalog(config)?;
        let definition = script.form.build(catalog.clone())?;
        let engine = ValidationEngine::with_separator(config.validation.message_separator.as_str());
        let session = FormSession::with_engine(definition, engine);

        let base = script.editor.clone().unwrap_or_else(|| match script.form {
            FormKind::HpoJob => HpoJobForm::definition_path(0),
            FormKind::TrainingDefinition => Path::root(),
        });

        Ok(Self {
            session,
            editor: HyperparameterEditor::new(catalog, base),
            form: script.form,
            outcome: None,
        })
    }

    pub fn session(&self) -> &FormSession {
        &self.session
    }

    pub fn outcome(&self) -> Option<&SubmitOutcome> {
        self.outcome.as_ref()
    }

    /// Apply one event and describe what happened.
    pub fn apply(&mut self, event: ReplayEvent) -> Result<String> {
        let note = match event {
            ReplayEvent::SetFields { fields, method } => {
                let count = fields.len();
                self.session.set_fields(fields, method)?;
                format!("{count} field(s) {}", method.as_str())
            }
            ReplayEvent::Touch(paths) => {
                self.session.touch_fields(&paths)?;
                format!("{} path(s) touched", paths.len())
            }
            ReplayEvent::Untouch(paths) => {
                self.session.untouch(&paths)?;
                format!("{} path(s) untouched", paths.len())
            }
            ReplayEvent::Next => match self.session.next()? {
                StepTransition::Advanced { to, .. } => format!("advanced to step {}", to + 1),
                StepTransition::Blocked { .. } => "blocked".to_string(),
            },
            ReplayEvent::Previous => {
                let step = self.session.previous()?;
                format!("back to step {}", step + 1)
            }
            ReplayEvent::Jump(step) => {
                let step = self.session.jump(step)?;
                format!("jumped to step {}", step + 1)
            }
            ReplayEvent::AddDefinition => self.add_definition()?,
            ReplayEvent::RemoveDefinition(index) => {
                self.ensure_hpo("remove_definition")?;
                let mut batch = MutationBatch::new();
                batch.unset(HpoJobForm::definition_path(index));
                self.session.apply_and_untouch_removed(&batch)?;
                format!("removed definition slot {index}")
            }
            ReplayEvent::SelectAlgorithm(name) => {
                self.editor.select_algorithm(&mut self.session, &name)?;
                format!("selected {name}")
            }
            ReplayEvent::ChangeType { key, to } => {
                let hp = self.editor.change_type(&mut self.session, &key, to)?;
                format!("{} is now {}", hp.key, hp.kind())
            }
            ReplayEvent::Rename { key, to } => {
                let hp = self.editor.rename(&mut self.session, &key, &to)?;
                format!("{key} renamed to {}", hp.key)
            }
            ReplayEvent::UpdateValue { key, value } => {
                let hp = self.editor.update_value(&mut self.session, &key, value)?;
                format!("{} = {}", hp.key, hp.value.parts().join(", "))
            }
            ReplayEvent::AddParameter { key, value } => {
                let hp = Hyperparameter::new(key, value);
                self.editor.add(&mut self.session, &hp)?;
                format!("added {}", hp.key)
            }
            ReplayEvent::RemoveParameter(key) => {
                self.editor.remove(&mut self.session, &key)?;
                format!("removed {key}")
            }
            ReplayEvent::Submit => {
                let outcome = self.session.submit()?;
                let note = match &outcome {
                    SubmitOutcome::Submitted(_) => "submitted".to_string(),
                    SubmitOutcome::Rejected(errors) => format!("rejected with {} error(s)", errors.len()),
                };
                self.outcome = Some(outcome);
                note
            }
            ReplayEvent::Cancel => {
                self.session.cancel()?;
                "cancelled".to_string()
            }
        };
        Ok(note)
    }

    fn ensure_hpo(&self, event: &str) -> Result<()> {
        if self.form != FormKind::HpoJob {
            anyhow::bail!("'{event}' only applies to the hpo_job form");
        }
        Ok(())
    }

    fn add_definition(&mut self) -> Result<String> {
        self.ensure_hpo("add_definition")?;
        let container = Path::root().field(TRAINING_JOB_DEFINITIONS);
        let definitions = PathAccessor::new()
            .get(self.session.document(), &container)
            .cloned()
            .unwrap_or_default();
        let name = next_definition_name(&definitions);
        let slot = definitions.len_with_holes();

        let mut batch = MutationBatch::new();
        batch.set(container.index(slot), placeholder_definition(&name));
        self.session.apply(&batch)?;
        Ok(format!("added {name} in slot {slot}"))
    }
}

pub fn execute(args: ReplayArgs, config: &Config, json_mode: bool) -> Result<()> {
    let content = std::fs::read_to_string(&args.script)
        .with_context(|| format!("Failed to read replay script {}", args.script.display()))?;
    let script: ReplayScript = serde_yaml::from_str(&content)
        .with_context(|| format!("Invalid replay script {}", args.script.display()))?;

    let mut replayer = Replayer::new(&script, config)?;
    info!(
        session_id = %replayer.session().id(),
        events = script.events.len(),
        script = %args.script.display(),
        "replaying session"
    );

    let mut trace = Vec::with_capacity(script.events.len());
    for (i, event) in script.events.into_iter().enumerate() {
        let index = i + 1;
        let name = event.name();
        let note = replayer
            .apply(event)
            .with_context(|| format!("Event {index} ({name}) failed"))?;
        let session = replayer.session();
        debug!(session_id = %session.id(), index, event = name, note = %note, "event replayed");
        trace.push(TraceRow {
            index,
            event: name.to_string(),
            step: session.wizard().current_step(),
            status: session.wizard().status().as_str().to_string(),
            errors: session.errors().len(),
            note,
        });
    }

    let session = replayer.session();
    let hyperparameters = replayer
        .editor
        .parameters(session)
        .into_iter()
        .map(|hp| ParameterOutput {
            key: hp.key,
            value: hp.value,
        })
        .collect();

    let out = ReplayOutput {
        session_id: session.id().to_string(),
        form: session.definition().name().to_string(),
        step: session.wizard().current_step(),
        step_title: session.wizard().current().title.clone(),
        status: session.wizard().status().as_str().to_string(),
        trace,
        errors: session.errors(),
        hyperparameters,
        outcome: replayer.outcome().cloned(),
        document: args.document.then(|| session.document().to_json()),
    };
    output(&out, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replay(yaml: &str) -> Replayer {
        let script: ReplayScript = serde_yaml::from_str(yaml).unwrap();
        let mut replayer = Replayer::new(&script, &Config::default()).unwrap();
        for event in script.events {
            replayer.apply(event).unwrap();
        }
        replayer
    }

    #[test]
    fn test_script_parses_every_event_shape() {
        let script: ReplayScript = serde_yaml::from_str(
            r#"
form: training_definition
events:
  - set_fields:
      fields: { RoleArn: "arn:aws:iam::123456789012:role/Tuning" }
      method: merge
  - touch: [RoleArn]
  - untouch: [RoleArn]
  - next
  - previous
  - jump: 0
  - select_algorithm: xgboost
  - change_type: { key: eta, to: continuous }
  - rename: { key: eta, to: learning_rate }
  - update_value:
      key: max_depth
      value: { type: integer, min: "3", max: "9", scaling: Linear }
  - add_parameter:
      key: gamma
      value: { type: static, value: "0" }
  - remove_parameter: gamma
  - submit
  - cancel
"#,
        )
        .unwrap();

        assert_eq!(script.form, FormKind::TrainingDefinition);
        let names: Vec<&str> = script.events.iter().map(ReplayEvent::name).collect();
        assert_eq!(names.len(), 14);
        assert_eq!(names[0], "set_fields");
        assert_eq!(names[13], "cancel");
    }

    #[test]
    fn test_blocked_step_surfaces_untouched_errors() {
        let replayer = replay(
            r"
form: hpo_job
events:
  - next
",
        );
        let session = replayer.session();
        assert_eq!(session.wizard().current_step(), 0);
        assert!(session.wizard().validate_all());
        assert!(session
            .errors()
            .get(&Path::parse("HyperParameterTuningJobName").unwrap())
            .is_some());
    }

    #[test]
    fn test_add_definition_unblocks_definitions_step() {
        let replayer = replay(
            r"
form: hpo_job
events:
  - set_fields:
      fields: { HyperParameterTuningJobName: tuning-job-1 }
  - next
  - add_definition
  - next
",
        );
        assert_eq!(replayer.session().wizard().current_step(), 2);
    }

    #[test]
    fn test_definition_events_need_hpo_form() {
        let script: ReplayScript =
            serde_yaml::from_str("form: training_definition\nevents: [add_definition]").unwrap();
        let mut replayer = Replayer::new(&script, &Config::default()).unwrap();
        assert!(replayer.apply(ReplayEvent::AddDefinition).is_err());
    }
}
