//! Poll template registry.
//!
//! Static, per-poll-type configuration governing what a poll of that type is
//! allowed to do: whether voters can add or remove options, which chart the
//! results render with, whether a stance picks a single option, and which
//! custom fields the poll must carry. The registry is resolved once at
//! startup; poll types are plain string keys into it.

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Chart style a poll type renders with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    /// Share-of-total pie, for agree/disagree style proposals.
    Pie,
    /// One bar per option.
    #[default]
    Bar,
    /// Single running total.
    Progress,
    /// Option-by-participant grid.
    Matrix,
}

/// Behaviour of one poll type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollTemplate {
    /// May the option set grow beyond [`PollTemplate::default_options`]?
    pub can_add_options: bool,
    /// May options from [`PollTemplate::default_options`] be dropped?
    pub can_remove_options: bool,
    /// Must the poll have at least one option to save?
    pub must_have_options: bool,
    /// Chart the results render with.
    pub chart_type: ChartType,
    /// A stance picks exactly one option, unless the poll itself opts into
    /// `multiple_choice`.
    pub single_choice: bool,
    /// Choices carry caller-supplied scores; otherwise every choice counts 1.
    pub has_variable_score: bool,
    /// Option names are translation keys rather than free text.
    pub translate_option_name: bool,
    /// Custom fields that must be present and non-blank at save time.
    pub required_custom_fields: Vec<String>,
    /// The options a new poll of this type starts with, in display order.
    pub default_options: Vec<String>,
}

impl Default for PollTemplate {
    fn default() -> Self {
        Self {
            can_add_options: true,
            can_remove_options: true,
            must_have_options: true,
            chart_type: ChartType::Bar,
            single_choice: false,
            has_variable_score: false,
            translate_option_name: false,
            required_custom_fields: Vec::new(),
            default_options: Vec::new(),
        }
    }
}

/// The built-in poll types.
static BUILTIN_TEMPLATES: Lazy<HashMap<String, PollTemplate>> = Lazy::new(|| {
    let mut templates = HashMap::new();

    templates.insert(
        "proposal".to_string(),
        PollTemplate {
            can_add_options: false,
            can_remove_options: false,
            chart_type: ChartType::Pie,
            single_choice: true,
            translate_option_name: true,
            default_options: ["agree", "abstain", "disagree", "block"]
                .map(String::from)
                .to_vec(),
            ..PollTemplate::default()
        },
    );

    templates.insert(
        "poll".to_string(),
        PollTemplate {
            single_choice: true,
            ..PollTemplate::default()
        },
    );

    templates.insert(
        "count".to_string(),
        PollTemplate {
            can_add_options: false,
            can_remove_options: false,
            chart_type: ChartType::Progress,
            single_choice: true,
            translate_option_name: true,
            default_options: vec!["yes".to_string()],
            ..PollTemplate::default()
        },
    );

    templates.insert(
        "dot_vote".to_string(),
        PollTemplate {
            has_variable_score: true,
            required_custom_fields: vec!["dots_per_person".to_string()],
            ..PollTemplate::default()
        },
    );

    templates.insert(
        "meeting".to_string(),
        PollTemplate {
            can_remove_options: false,
            chart_type: ChartType::Matrix,
            required_custom_fields: vec!["time_zone".to_string()],
            ..PollTemplate::default()
        },
    );

    templates.insert(
        "ranked_choice".to_string(),
        PollTemplate {
            has_variable_score: true,
            ..PollTemplate::default()
        },
    );

    templates
});

/// Immutable mapping from poll type to its [`PollTemplate`].
#[derive(Debug, Clone)]
pub struct PollTemplateRegistry {
    templates: HashMap<String, PollTemplate>,
}

impl PollTemplateRegistry {
    /// Registry with only the built-in poll types.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            templates: BUILTIN_TEMPLATES.clone(),
        }
    }

    /// Registry from a configuration file, layered over the built-ins.
    ///
    /// The file maps poll type keys to template tables; entries override
    /// built-in types of the same name and may introduce new types.
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let loaded = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .build()?;
        let overrides: HashMap<String, PollTemplate> = loaded.try_deserialize()?;

        let mut templates = BUILTIN_TEMPLATES.clone();
        templates.extend(overrides);
        Ok(Self { templates })
    }

    /// Look up the template for a poll type.
    #[must_use]
    pub fn get(&self, poll_type: &str) -> Option<&PollTemplate> {
        self.templates.get(poll_type)
    }

    /// Look up the template, failing with [`AppError::Config`] when unknown.
    pub fn get_or_err(&self, poll_type: &str) -> AppResult<&PollTemplate> {
        self.get(poll_type)
            .ok_or_else(|| AppError::Config(format!("unknown poll type: {poll_type}")))
    }

    /// Whether a poll type is registered.
    #[must_use]
    pub fn is_known(&self, poll_type: &str) -> bool {
        self.templates.contains_key(poll_type)
    }

    /// The registered poll type keys, sorted.
    #[must_use]
    pub fn poll_types(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl Default for PollTemplateRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_types_are_registered() {
        let registry = PollTemplateRegistry::builtin();
        assert_eq!(
            registry.poll_types(),
            vec![
                "count",
                "dot_vote",
                "meeting",
                "poll",
                "proposal",
                "ranked_choice"
            ]
        );
    }

    #[test]
    fn proposal_has_a_closed_option_set() {
        let registry = PollTemplateRegistry::builtin();
        let template = registry.get("proposal").expect("proposal registered");

        assert!(!template.can_add_options);
        assert!(!template.can_remove_options);
        assert!(template.single_choice);
        assert_eq!(
            template.default_options,
            vec!["agree", "abstain", "disagree", "block"]
        );
    }

    #[test]
    fn meeting_renders_a_matrix() {
        let registry = PollTemplateRegistry::builtin();
        let template = registry.get("meeting").expect("meeting registered");

        assert_eq!(template.chart_type, ChartType::Matrix);
        assert_eq!(template.required_custom_fields, vec!["time_zone"]);
    }

    #[test]
    fn unknown_type_is_a_config_error() {
        let registry = PollTemplateRegistry::builtin();
        assert!(registry.get_or_err("karaoke").is_err());
        assert!(!registry.is_known("karaoke"));
    }

    #[test]
    fn template_deserializes_with_defaults() {
        let template: PollTemplate = serde_json::from_str("{}").expect("valid json");
        assert!(template.can_add_options);
        assert_eq!(template.chart_type, ChartType::Bar);
        assert!(template.default_options.is_empty());
    }
}
