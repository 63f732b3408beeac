use serde::Serialize;
use tera::{Context, Tera};
use tracing::debug;

use medcalc_core::models::formula::{CriteriaRow, FormulaDisplay, FormulaItem, InterpretationRow};
use medcalc_core::models::input::{InputKind, InputSpec, Layout, Section, VisibleWhen};
use medcalc_core::models::result::ResultItem;
use medcalc_core::models::severity::Severity;

use crate::error::WidgetError;

const TEMPLATES: [(&str, &str); 10] = [
    ("alert.html", include_str!("../templates/alert.html")),
    ("calculator.html", include_str!("../templates/calculator.html")),
    ("checkbox_group.html", include_str!("../templates/checkbox_group.html")),
    ("formula_section.html", include_str!("../templates/formula_section.html")),
    ("number_input.html", include_str!("../templates/number_input.html")),
    ("radio_group.html", include_str!("../templates/radio_group.html")),
    ("result_box.html", include_str!("../templates/result_box.html")),
    ("result_item.html", include_str!("../templates/result_item.html")),
    ("section.html", include_str!("../templates/section.html")),
    ("select.html", include_str!("../templates/select.html")),
];

/// Page chrome around a calculator's rendered sections.
///
/// Every markup field is already rendered; the shell only arranges them.
#[derive(Debug, Serialize)]
pub struct Shell<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub alerts: Vec<String>,
    pub sections: Vec<String>,
    pub result_box: String,
    pub formula: Option<String>,
    pub references: &'a [String],
}

#[derive(Serialize)]
struct ToggleView<'a> {
    measurement: &'a str,
    standard: &'a str,
    units: &'a [String],
    current: &'a str,
}

#[derive(Serialize)]
struct NumberView<'a> {
    id: &'a str,
    label: &'a str,
    placeholder: Option<&'a str>,
    help: Option<&'a str>,
    unit: Option<&'a str>,
    toggle: Option<ToggleView<'a>>,
    min: Option<String>,
    max: Option<String>,
    step: Option<String>,
    value: Option<&'a str>,
    required: bool,
    visible_when: Option<&'a VisibleWhen>,
    hidden: bool,
}

#[derive(Serialize)]
struct OptionView<'a> {
    id: String,
    value: &'a str,
    label: &'a str,
    description: Option<&'a str>,
    checked: bool,
}

#[derive(Serialize)]
struct GroupView<'a> {
    name: &'a str,
    label: Option<&'a str>,
    help: Option<&'a str>,
    options: Vec<OptionView<'a>>,
    visible_when: Option<&'a VisibleWhen>,
    hidden: bool,
}

#[derive(Serialize)]
struct SectionView<'a> {
    title: &'a str,
    subtitle: Option<&'a str>,
    icon: Option<&'a str>,
    fields: Vec<String>,
}

#[derive(Serialize)]
struct AlertView<'a> {
    severity: &'a str,
    title: Option<&'a str>,
    message: &'a str,
}

#[derive(Serialize)]
struct ResultItemView<'a> {
    label: &'a str,
    value: String,
    unit: Option<&'a str>,
    interpretation: Option<&'a str>,
    severity: Option<&'a str>,
}

#[derive(Serialize)]
struct ResultBoxView<'a> {
    id: &'a str,
    title: &'a str,
    content: &'a str,
    visible: bool,
}

#[derive(Serialize)]
struct FormulaView<'a> {
    title: &'a str,
    note: Option<&'a str>,
    items: &'a [FormulaItem],
    criteria: &'a [CriteriaRow],
    interpretation_title: &'a str,
    headers: Vec<String>,
    has_category: bool,
    interpretations: &'a [InterpretationRow],
    footnotes: &'a [String],
}

/// Template-backed markup builder.
///
/// Templates are compiled once in [`Widgets::new`]. Autoescaping is off:
/// labels and descriptions come from calculator definitions and may carry
/// inline markup such as `<sub>`.
pub struct Widgets {
    tera: Tera,
}

impl Widgets {
    pub fn new() -> Result<Self, WidgetError> {
        let mut tera = Tera::default();
        tera.autoescape_on(Vec::new());
        tera.add_raw_templates(TEMPLATES)
            .map_err(|e| WidgetError::TemplateParse(e.to_string()))?;
        debug!(count = TEMPLATES.len(), "widget templates loaded");
        Ok(Self { tera })
    }

    fn render<T: Serialize>(&self, template: &str, view: &T) -> Result<String, WidgetError> {
        let value = serde_json::to_value(view)?;
        let context =
            Context::from_value(value).map_err(|e| WidgetError::TemplateRender(e.to_string()))?;
        let rendered = self.tera.render(template, &context)?;
        Ok(rendered)
    }

    /// Markup for one field, dispatched on its kind.
    pub fn field(&self, field: &InputSpec) -> Result<String, WidgetError> {
        self.field_markup(field, false)
    }

    fn field_markup(&self, field: &InputSpec, hidden: bool) -> Result<String, WidgetError> {
        match field.kind {
            InputKind::Number => self.render("number_input.html", &number_view(field, hidden)),
            InputKind::Radio => self.render("radio_group.html", &group_view(field, hidden)),
            InputKind::Checkbox => self.render("checkbox_group.html", &group_view(field, hidden)),
            InputKind::Select => self.render("select.html", &group_view(field, hidden)),
        }
    }

    pub fn number_input(&self, field: &InputSpec) -> Result<String, WidgetError> {
        self.render("number_input.html", &number_view(field, false))
    }

    pub fn radio_group(&self, field: &InputSpec) -> Result<String, WidgetError> {
        self.render("radio_group.html", &group_view(field, false))
    }

    pub fn checkbox_group(&self, field: &InputSpec) -> Result<String, WidgetError> {
        self.render("checkbox_group.html", &group_view(field, false))
    }

    pub fn select(&self, field: &InputSpec) -> Result<String, WidgetError> {
        self.render("select.html", &group_view(field, false))
    }

    /// A section on its own. Visibility rules resolve against the
    /// section's own fields.
    pub fn section(&self, section: &Section) -> Result<String, WidgetError> {
        self.section_within(section, &Layout::Sections(vec![section.clone()]))
    }

    /// Fields whose controlling group starts on another value are rendered
    /// `hidden`.
    fn section_within(&self, section: &Section, layout: &Layout) -> Result<String, WidgetError> {
        let fields = section
            .fields
            .iter()
            .map(|field| self.field_markup(field, !layout.starts_visible(field)))
            .collect::<Result<Vec<_>, _>>()?;
        let view = SectionView {
            title: &section.title,
            subtitle: section.subtitle.as_deref(),
            icon: section.icon.as_deref(),
            fields,
        };
        self.render("section.html", &view)
    }

    /// One markup block per section; a flat input list becomes one section.
    pub fn layout(&self, layout: &Layout) -> Result<Vec<String>, WidgetError> {
        layout
            .sections()
            .iter()
            .map(|section| self.section_within(section, layout))
            .collect()
    }

    pub fn alert(
        &self,
        severity: Severity,
        message: &str,
        title: Option<&str>,
    ) -> Result<String, WidgetError> {
        let view = AlertView {
            severity: severity.as_str(),
            title,
            message,
        };
        self.render("alert.html", &view)
    }

    /// A result row, or a call-out when the item carries the alert label.
    pub fn result_item(&self, item: &ResultItem) -> Result<String, WidgetError> {
        if item.is_alert() {
            let message = item.value.to_string();
            return self.alert(item.severity.unwrap_or_default(), &message, None);
        }
        let view = ResultItemView {
            label: &item.label,
            value: item.value.to_string(),
            unit: item.unit.as_deref(),
            interpretation: item.interpretation.as_deref(),
            severity: item.severity.as_ref().map(Severity::as_str),
        };
        self.render("result_item.html", &view)
    }

    pub fn result_items(&self, items: &[ResultItem]) -> Result<String, WidgetError> {
        let rows = items
            .iter()
            .map(|item| self.result_item(item))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows.join("\n"))
    }

    pub fn result_box(
        &self,
        id: &str,
        title: &str,
        content: &str,
        visible: bool,
    ) -> Result<String, WidgetError> {
        let view = ResultBoxView {
            id,
            title,
            content,
            visible,
        };
        self.render("result_box.html", &view)
    }

    pub fn formula_section(&self, formula: &FormulaDisplay) -> Result<String, WidgetError> {
        let has_category = formula
            .interpretations
            .iter()
            .any(|row| row.category.is_some());
        let headers = if !formula.table_headers.is_empty() {
            formula.table_headers.clone()
        } else if has_category {
            vec!["Score".into(), "Category".into(), "Interpretation".into()]
        } else {
            vec!["Score".into(), "Interpretation".into()]
        };
        let view = FormulaView {
            title: formula.title.as_deref().unwrap_or("Formula"),
            note: formula.calculation_note.as_deref(),
            items: &formula.items,
            criteria: &formula.scoring_criteria,
            interpretation_title: formula
                .interpretation_title
                .as_deref()
                .unwrap_or("Interpretation"),
            headers,
            has_category,
            interpretations: &formula.interpretations,
            footnotes: &formula.footnotes,
        };
        self.render("formula_section.html", &view)
    }

    pub fn calculator(&self, shell: &Shell<'_>) -> Result<String, WidgetError> {
        self.render("calculator.html", shell)
    }
}

fn number_view(field: &InputSpec, hidden: bool) -> NumberView<'_> {
    let toggle = field.unit_toggle.as_ref().map(|toggle| ToggleView {
        measurement: &toggle.measurement,
        standard: field.standard_unit.as_deref().unwrap_or(&toggle.default),
        units: &toggle.units,
        current: &toggle.default,
    });
    NumberView {
        id: &field.id,
        label: &field.label,
        placeholder: field.placeholder.as_deref(),
        help: field.help_text.as_deref(),
        unit: field.display_unit(),
        toggle,
        min: field.bounds.min.map(|v| v.to_string()),
        max: field.bounds.max.map(|v| v.to_string()),
        step: field.bounds.step.map(|v| v.to_string()),
        value: field.default_value.as_deref(),
        required: field.required,
        visible_when: field.visible_when.as_ref(),
        hidden,
    }
}

fn group_view(field: &InputSpec, hidden: bool) -> GroupView<'_> {
    let options = field
        .options
        .iter()
        .enumerate()
        .map(|(index, option)| OptionView {
            id: option.element_id(&field.id, index),
            value: &option.value,
            label: &option.label,
            description: option.description.as_deref(),
            checked: field.starts_checked(option),
        })
        .collect();
    GroupView {
        name: &field.id,
        label: (!field.label.is_empty()).then_some(field.label.as_str()),
        help: field.help_text.as_deref(),
        options,
        visible_when: field.visible_when.as_ref(),
        hidden,
    }
}
