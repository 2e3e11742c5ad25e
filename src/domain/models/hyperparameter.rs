//! Hyperparameter domain model.
//!
//! A hyperparameter is exactly one of four shapes: a static value, an integer
//! range, a continuous range or a categorical set. The job-submission payload
//! carries them in separate wire containers; this module owns the typed
//! representation and the per-shape conversions between them.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::catalog::ValueConstraint;
use super::document::{Document, Record};

pub const STATIC_HYPER_PARAMETERS: &str = "StaticHyperParameters";
pub const HYPER_PARAMETER_RANGES: &str = "HyperParameterRanges";
pub const INTEGER_PARAMETER_RANGES: &str = "IntegerParameterRanges";
pub const CONTINUOUS_PARAMETER_RANGES: &str = "ContinuousParameterRanges";
pub const CATEGORICAL_PARAMETER_RANGES: &str = "CategoricalParameterRanges";

/// Which of the four shapes a hyperparameter currently has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HyperparameterType {
    #[serde(alias = "Static")]
    Static,
    #[serde(alias = "Integer")]
    Integer,
    #[serde(alias = "Continuous")]
    Continuous,
    #[serde(alias = "Categorical")]
    Categorical,
}

impl HyperparameterType {
    pub const ALL: [Self; 4] = [
        Self::Static,
        Self::Integer,
        Self::Continuous,
        Self::Categorical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Integer => "integer",
            Self::Continuous => "continuous",
            Self::Categorical => "categorical",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "static" => Some(Self::Static),
            "integer" => Some(Self::Integer),
            "continuous" => Some(Self::Continuous),
            "categorical" => Some(Self::Categorical),
            _ => None,
        }
    }

    /// Name of the `HyperParameterRanges` sequence for range shapes.
    pub fn range_container(&self) -> Option<&'static str> {
        match self {
            Self::Static => None,
            Self::Integer => Some(INTEGER_PARAMETER_RANGES),
            Self::Continuous => Some(CONTINUOUS_PARAMETER_RANGES),
            Self::Categorical => Some(CATEGORICAL_PARAMETER_RANGES),
        }
    }

    pub fn is_numeric_range(&self) -> bool {
        matches!(self, Self::Integer | Self::Continuous)
    }
}

impl fmt::Display for HyperparameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Search-space scaling for numeric ranges. Wire names are bit-exact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalingType {
    #[default]
    Auto,
    Linear,
    Logarithmic,
    ReverseLogarithmic,
}

impl ScalingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "Auto",
            Self::Linear => "Linear",
            Self::Logarithmic => "Logarithmic",
            Self::ReverseLogarithmic => "ReverseLogarithmic",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Auto" => Some(Self::Auto),
            "Linear" => Some(Self::Linear),
            "Logarithmic" => Some(Self::Logarithmic),
            "ReverseLogarithmic" => Some(Self::ReverseLogarithmic),
            _ => None,
        }
    }
}

/// The value of a hyperparameter, tagged by shape.
///
/// Bounds and static values are kept as the strings the user typed; the wire
/// format carries strings too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HyperparameterValue {
    Static {
        value: String,
    },
    Integer {
        min: String,
        max: String,
        scaling: ScalingType,
    },
    Continuous {
        min: String,
        max: String,
        scaling: ScalingType,
    },
    Categorical {
        values: Vec<String>,
    },
}

impl HyperparameterValue {
    pub fn kind(&self) -> HyperparameterType {
        match self {
            Self::Static { .. } => HyperparameterType::Static,
            Self::Integer { .. } => HyperparameterType::Integer,
            Self::Continuous { .. } => HyperparameterType::Continuous,
            Self::Categorical { .. } => HyperparameterType::Categorical,
        }
    }

    /// Convert to another shape.
    ///
    /// Each (from, to) pair is spelled out. Entering the categorical shape
    /// always starts from an empty set so a numeric pair never turns into
    /// bogus category values. `scaling` applies when a range is entered from
    /// a non-range shape.
    #[must_use]
    pub fn convert(&self, to: HyperparameterType, scaling: ScalingType) -> Self {
        use HyperparameterType as T;

        match (self, to) {
            (Self::Static { value }, T::Static) => Self::Static {
                value: value.clone(),
            },
            (Self::Static { value }, T::Integer) => Self::Integer {
                min: value.clone(),
                max: String::new(),
                scaling,
            },
            (Self::Static { value }, T::Continuous) => Self::Continuous {
                min: value.clone(),
                max: String::new(),
                scaling,
            },

            (Self::Integer { min, .. } | Self::Continuous { min, .. }, T::Static) => Self::Static {
                value: min.clone(),
            },
            (
                Self::Integer { min, max, scaling } | Self::Continuous { min, max, scaling },
                T::Integer,
            ) => Self::Integer {
                min: min.clone(),
                max: max.clone(),
                scaling: *scaling,
            },
            (
                Self::Integer { min, max, scaling } | Self::Continuous { min, max, scaling },
                T::Continuous,
            ) => Self::Continuous {
                min: min.clone(),
                max: max.clone(),
                scaling: *scaling,
            },

            (Self::Categorical { values }, T::Static) => Self::Static {
                value: values.first().cloned().unwrap_or_default(),
            },
            (Self::Categorical { values }, T::Integer) => Self::Integer {
                min: values.first().cloned().unwrap_or_default(),
                max: values.get(1).cloned().unwrap_or_default(),
                scaling,
            },
            (Self::Categorical { values }, T::Continuous) => Self::Continuous {
                min: values.first().cloned().unwrap_or_default(),
                max: values.get(1).cloned().unwrap_or_default(),
                scaling,
            },
            (Self::Categorical { values }, T::Categorical) => Self::Categorical {
                values: values.clone(),
            },
            (_, T::Categorical) => Self::Categorical { values: Vec::new() },
        }
    }

    /// Build a value of the given shape from the flat `value` list the
    /// catalog uses (length 1 for static, 2 for ranges, N for categorical).
    pub fn from_parts(kind: HyperparameterType, parts: &[String], scaling: ScalingType) -> Self {
        let nth = |i: usize| parts.get(i).cloned().unwrap_or_default();
        match kind {
            HyperparameterType::Static => Self::Static { value: nth(0) },
            HyperparameterType::Integer => Self::Integer {
                min: nth(0),
                max: nth(1),
                scaling,
            },
            HyperparameterType::Continuous => Self::Continuous {
                min: nth(0),
                max: nth(1),
                scaling,
            },
            HyperparameterType::Categorical => Self::Categorical {
                values: parts.to_vec(),
            },
        }
    }

    /// Flat list form: `[v]`, `[min, max]` or the category values.
    pub fn parts(&self) -> Vec<String> {
        match self {
            Self::Static { value } => vec![value.clone()],
            Self::Integer { min, max, .. } | Self::Continuous { min, max, .. } => {
                vec![min.clone(), max.clone()]
            }
            Self::Categorical { values } => values.clone(),
        }
    }

    /// Wire entry for a range container, `None` for static values.
    pub fn range_entry(&self, key: &str) -> Option<Document> {
        let mut entry = Record::new();
        entry.insert("Name".to_string(), Document::string(key));
        match self {
            Self::Static { .. } => return None,
            Self::Integer { min, max, scaling } | Self::Continuous { min, max, scaling } => {
                entry.insert("MinValue".to_string(), Document::string(min.as_str()));
                entry.insert("MaxValue".to_string(), Document::string(max.as_str()));
                entry.insert("ScalingType".to_string(), Document::string(scaling.as_str()));
            }
            Self::Categorical { values } => {
                entry.insert(
                    "Values".to_string(),
                    Document::dense(values.iter().map(|v| Document::string(v.as_str()))),
                );
            }
        }
        Some(Document::Record(entry))
    }

    /// Read a range wire entry of the given container kind.
    pub fn from_range_entry(kind: HyperparameterType, entry: &Document) -> Option<(String, Self)> {
        let record = entry.as_record()?;
        let name = record.get("Name")?.scalar_text()?;
        let text = |field: &str| {
            record
                .get(field)
                .and_then(Document::scalar_text)
                .unwrap_or_default()
        };
        let scaling = record
            .get("ScalingType")
            .and_then(Document::as_str)
            .and_then(ScalingType::from_str)
            .unwrap_or_default();

        let value = match kind {
            HyperparameterType::Static => return None,
            HyperparameterType::Integer => Self::Integer {
                min: text("MinValue"),
                max: text("MaxValue"),
                scaling,
            },
            HyperparameterType::Continuous => Self::Continuous {
                min: text("MinValue"),
                max: text("MaxValue"),
                scaling,
            },
            HyperparameterType::Categorical => Self::Categorical {
                values: record
                    .get("Values")
                    .map(|values| values.items().filter_map(Document::scalar_text).collect())
                    .unwrap_or_default(),
            },
        };
        Some((name, value))
    }
}

/// One hyperparameter as the tuning wizard edits it.
///
/// Derived transiently from the document plus catalog metadata; every edit is
/// projected straight back into the document.
#[derive(Debug, Clone, PartialEq)]
pub struct Hyperparameter {
    pub key: String,
    pub value: HyperparameterValue,
    /// Shapes this parameter may take; empty means unrestricted.
    pub type_options: Vec<HyperparameterType>,
    pub default_scaling: ScalingType,
    pub options: Vec<String>,
    pub constraint: Option<ValueConstraint>,
    pub required: bool,
}

impl Hyperparameter {
    pub fn new(key: impl Into<String>, value: HyperparameterValue) -> Self {
        Self {
            key: key.into(),
            value,
            type_options: Vec::new(),
            default_scaling: ScalingType::Auto,
            options: Vec::new(),
            constraint: None,
            required: false,
        }
    }

    pub fn kind(&self) -> HyperparameterType {
        self.value.kind()
    }

    pub fn allows(&self, kind: HyperparameterType) -> bool {
        self.type_options.is_empty() || self.type_options.contains(&kind)
    }

    #[must_use]
    pub fn with_constraint(mut self, constraint: ValueConstraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    #[must_use]
    pub fn with_type_options(mut self, options: Vec<HyperparameterType>) -> Self {
        self.type_options = options;
        self
    }

    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

/// Which side of a numeric range an issue concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bound {
    Min,
    Max,
}

impl Bound {
    pub fn wire_field(&self) -> &'static str {
        match self {
            Self::Min => "MinValue",
            Self::Max => "MaxValue",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Min => "Min value",
            Self::Max => "Max value",
        }
    }
}

/// Where inside a hyperparameter a field-level issue lands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueTarget {
    /// The parameter as a whole (static value, ordering of a range).
    Parameter,
    /// One bound of a numeric range.
    Bound(Bound),
    /// One value of a categorical set, by position.
    Value(usize),
}

/// Field-level validation failure for one hyperparameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HyperparameterIssue {
    pub key: String,
    pub target: IssueTarget,
    pub message: String,
}
