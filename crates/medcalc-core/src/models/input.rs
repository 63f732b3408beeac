use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Observation code that pre-fills a field with the subject's age in years.
pub const SUBJECT_AGE: &str = "subject.age";

/// Observation code that selects the option whose value is the subject's sex
/// (`male`, `female`, `other`).
pub const SUBJECT_SEX: &str = "subject.sex";

/// The shape of a single declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum InputKind {
    Number,
    Radio,
    Checkbox,
    Select,
}

impl InputKind {
    /// Radio and select groups hold exactly one selected value.
    pub fn is_single_choice(&self) -> bool {
        matches!(self, InputKind::Radio | InputKind::Select)
    }
}

/// Units a number field can be displayed in, and the one shown first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UnitToggle {
    /// Measurement family understood by the unit converter ("weight", "creatinine", ...).
    pub measurement: String,
    pub units: Vec<String>,
    pub default: String,
}

impl UnitToggle {
    /// The first unit in `units` is the default.
    pub fn new(measurement: &str, units: &[&str]) -> Self {
        Self {
            measurement: measurement.to_string(),
            units: units.iter().map(|u| u.to_string()).collect(),
            default: units.first().map(|u| u.to_string()).unwrap_or_default(),
        }
    }

    /// Unit that follows `current` when the toggle is pressed.
    pub fn next_after(&self, current: &str) -> Option<&str> {
        if self.units.is_empty() {
            return None;
        }
        let index = self.units.iter().position(|u| u == current).unwrap_or(0);
        self.units.get((index + 1) % self.units.len()).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
}

/// Maps a numeric observation onto one option of a choice group when the
/// value falls inside `[min, max]` (either side may be open).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ObservationRule {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub option: String,
}

impl ObservationRule {
    pub fn at_least(min: f64, option: &str) -> Self {
        Self {
            min: Some(min),
            max: None,
            option: option.to_string(),
        }
    }

    pub fn below_or_equal(max: f64, option: &str) -> Self {
        Self {
            min: None,
            max: Some(max),
            option: option.to_string(),
        }
    }

    pub fn between(min: f64, max: f64, option: &str) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            option: option.to_string(),
        }
    }

    pub fn matches(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// Shows a field only while a radio or select group holds one of `values`.
/// A hidden field is left out of score totals and completeness checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VisibleWhen {
    pub field: String,
    pub values: Vec<String>,
}

impl VisibleWhen {
    pub fn new(field: &str, values: &[&str]) -> Self {
        Self {
            field: field.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    /// Whether a field is shown while its controlling group holds `selected`.
    pub fn holds(&self, selected: Option<&str>) -> bool {
        selected.is_some_and(|selected| self.values.iter().any(|v| v == selected))
    }
}

/// One selectable option of a radio, select or checkbox group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub checked: bool,
    /// Explicit element id. Defaults to `{group}-{index}`.
    #[serde(default)]
    pub id: Option<String>,
    /// Condition codes that, when present on the record, select this option.
    #[serde(default)]
    pub condition_codes: Vec<String>,
}

impl ChoiceOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            description: None,
            checked: false,
            id: None,
            condition_codes: Vec::new(),
        }
    }

    pub fn checked(mut self) -> Self {
        self.checked = true;
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn when_condition(mut self, codes: &[&str]) -> Self {
        self.condition_codes = codes.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn element_id(&self, group: &str, index: usize) -> String {
        self.id.clone().unwrap_or_else(|| format!("{group}-{index}"))
    }
}

/// Declaration of one field of a calculator.
///
/// Number fields are addressed by `id`; radio, select and checkbox groups use
/// `id` as the group name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InputSpec {
    pub kind: InputKind,
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub help_text: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    /// Static unit label shown next to a number field without a toggle.
    #[serde(default)]
    pub unit: Option<String>,
    /// Unit the formula is written against. Values are normalized to it.
    #[serde(default)]
    pub standard_unit: Option<String>,
    #[serde(default)]
    pub unit_toggle: Option<UnitToggle>,
    #[serde(default)]
    pub bounds: Bounds,
    /// Observation code used for auto-population.
    #[serde(default)]
    pub observation_code: Option<String>,
    #[serde(default)]
    pub observation_rules: Vec<ObservationRule>,
    #[serde(default)]
    pub options: Vec<ChoiceOption>,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default)]
    pub visible_when: Option<VisibleWhen>,
}

fn default_required() -> bool {
    true
}

impl InputSpec {
    fn base(kind: InputKind, id: &str, label: &str) -> Self {
        Self {
            kind,
            id: id.to_string(),
            label: label.to_string(),
            help_text: None,
            placeholder: None,
            unit: None,
            standard_unit: None,
            unit_toggle: None,
            bounds: Bounds::default(),
            observation_code: None,
            observation_rules: Vec::new(),
            options: Vec::new(),
            default_value: None,
            required: true,
            visible_when: None,
        }
    }

    pub fn number(id: &str, label: &str) -> Self {
        Self::base(InputKind::Number, id, label)
    }

    pub fn radio(name: &str, label: &str, options: Vec<ChoiceOption>) -> Self {
        Self {
            options,
            ..Self::base(InputKind::Radio, name, label)
        }
    }

    pub fn select(id: &str, label: &str, options: Vec<ChoiceOption>) -> Self {
        Self {
            options,
            ..Self::base(InputKind::Select, id, label)
        }
    }

    pub fn checkboxes(name: &str, label: &str, options: Vec<ChoiceOption>) -> Self {
        Self {
            options,
            required: false,
            ..Self::base(InputKind::Checkbox, name, label)
        }
    }

    /// A "No (0) / Yes (points)" radio pair with "No" pre-selected.
    pub fn yes_no(name: &str, label: &str, points: f64) -> Self {
        Self::radio(
            name,
            label,
            vec![
                ChoiceOption::new("0", "No").checked(),
                ChoiceOption::new(points.to_string(), "Yes"),
            ],
        )
    }

    pub fn unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_string());
        self
    }

    /// Normalize to `standard` and let the user switch between `units`.
    pub fn toggle(mut self, measurement: &str, standard: &str, units: &[&str]) -> Self {
        self.standard_unit = Some(standard.to_string());
        self.unit_toggle = Some(UnitToggle::new(measurement, units));
        self
    }

    pub fn placeholder(mut self, text: &str) -> Self {
        self.placeholder = Some(text.to_string());
        self
    }

    pub fn help(mut self, text: &str) -> Self {
        self.help_text = Some(text.to_string());
        self
    }

    pub fn bounds(mut self, min: f64, max: f64) -> Self {
        self.bounds.min = Some(min);
        self.bounds.max = Some(max);
        self
    }

    pub fn step(mut self, step: f64) -> Self {
        self.bounds.step = Some(step);
        self
    }

    pub fn observation(mut self, code: &str) -> Self {
        self.observation_code = Some(code.to_string());
        self
    }

    pub fn map_observation(mut self, code: &str, rules: Vec<ObservationRule>) -> Self {
        self.observation_code = Some(code.to_string());
        self.observation_rules = rules;
        self
    }

    pub fn default_value(mut self, value: &str) -> Self {
        self.default_value = Some(value.to_string());
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Show this field only while `field` has one of `values` selected.
    pub fn shown_when(mut self, field: &str, values: &[&str]) -> Self {
        self.visible_when = Some(VisibleWhen::new(field, values));
        self
    }

    /// Unit the field shows when first rendered, if any.
    pub fn display_unit(&self) -> Option<&str> {
        match &self.unit_toggle {
            Some(toggle) => Some(toggle.default.as_str()),
            None => self.unit.as_deref().or(self.standard_unit.as_deref()),
        }
    }

    /// Whether `option` is selected before any user input. A default value
    /// on a single-choice group overrides the options' own flags.
    pub fn starts_checked(&self, option: &ChoiceOption) -> bool {
        match &self.default_value {
            Some(default) if self.kind.is_single_choice() => option.value == *default,
            _ => option.checked,
        }
    }

    /// Value a radio or select group holds before any user input.
    pub fn default_selection(&self) -> Option<&str> {
        if !self.kind.is_single_choice() {
            return None;
        }
        self.options
            .iter()
            .find(|option| self.starts_checked(option))
            .map(|option| option.value.as_str())
    }

    /// Element ids of every option, in declaration order.
    pub fn option_ids(&self) -> Vec<String> {
        self.options
            .iter()
            .enumerate()
            .map(|(index, option)| option.element_id(&self.id, index))
            .collect()
    }
}

/// A titled group of fields. Fields of different kinds may be mixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Section {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    pub fields: Vec<InputSpec>,
}

impl Section {
    pub fn new(title: &str, fields: Vec<InputSpec>) -> Self {
        Self {
            title: title.to_string(),
            subtitle: None,
            icon: None,
            fields,
        }
    }

    pub fn subtitle(mut self, subtitle: &str) -> Self {
        self.subtitle = Some(subtitle.to_string());
        self
    }

    pub fn icon(mut self, icon: &str) -> Self {
        self.icon = Some(icon.to_string());
        self
    }
}

/// How a calculator's fields are arranged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "items", rename_all = "snake_case")]
#[ts(export)]
pub enum Layout {
    /// Flat list, rendered inside a single "Measurements" section.
    Inputs(Vec<InputSpec>),
    Sections(Vec<Section>),
}

impl Layout {
    pub fn fields(&self) -> Box<dyn Iterator<Item = &InputSpec> + '_> {
        match self {
            Layout::Inputs(inputs) => Box::new(inputs.iter()),
            Layout::Sections(sections) => Box::new(sections.iter().flat_map(|s| s.fields.iter())),
        }
    }

    pub fn field(&self, id: &str) -> Option<&InputSpec> {
        self.fields().find(|f| f.id == id)
    }

    /// Whether `field` is visible before any user input.
    pub fn starts_visible(&self, field: &InputSpec) -> bool {
        let Some(rule) = &field.visible_when else {
            return true;
        };
        rule.holds(self.field(&rule.field).and_then(InputSpec::default_selection))
    }

    pub fn sections(&self) -> Vec<Section> {
        match self {
            Layout::Inputs(inputs) => vec![Section::new("Measurements", inputs.clone())],
            Layout::Sections(sections) => sections.clone(),
        }
    }
}
