use std::collections::BTreeMap;

use serde::Serialize;
use tracing::trace;

use medcalc_core::models::input::{InputKind, InputSpec, Layout};
use medcalc_core::units::UnitConversion;

use crate::fragment::Fragment;

/// Reads live field values from a fragment.
///
/// Every lookup is pure and tolerates absent fields: an empty, missing or
/// unparseable number, an unsupported unit pair and an unselected group all
/// resolve to `None`. Nothing here resolves to NaN or an implicit zero.
pub struct Resolver<'a> {
    fragment: &'a Fragment,
    layout: &'a Layout,
    units: &'a dyn UnitConversion,
}

impl<'a> Resolver<'a> {
    pub fn new(fragment: &'a Fragment, layout: &'a Layout, units: &'a dyn UnitConversion) -> Self {
        Self {
            fragment,
            layout,
            units,
        }
    }

    /// Displayed text of a number field.
    pub fn raw(&self, id: &str) -> Option<String> {
        self.fragment.raw(id)
    }

    /// Displayed value of a number field, in whatever unit it is shown in.
    pub fn value(&self, id: &str) -> Option<f64> {
        self.raw(id)?.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// Value of a number field converted to `standard_unit`.
    ///
    /// Fields without a display unit are assumed to already be in it.
    pub fn standard(&self, id: &str, standard_unit: &str) -> Option<f64> {
        let value = self.value(id)?;
        let Some(current) = self.fragment.unit(id) else {
            return Some(value);
        };
        if current == standard_unit {
            return Some(value);
        }
        let measurement = self.fragment.toggle(id)?.measurement;
        let converted = self
            .units
            .convert(value, &current, standard_unit, &measurement);
        if converted.is_none() {
            trace!(field = %id, from = %current, to = %standard_unit, "no conversion; treating as missing");
        }
        converted
    }

    /// Value of a number field in its declared standard unit, or as
    /// displayed when it declares none.
    pub fn standard_value(&self, id: &str) -> Option<f64> {
        match self.layout.field(id).and_then(|f| f.standard_unit.as_deref()) {
            Some(unit) => self.standard(id, unit),
            None => self.value(id),
        }
    }

    /// Selected value of a radio or select group.
    pub fn radio(&self, group: &str) -> Option<String> {
        self.fragment.selected(group)
    }

    /// Checked state of one checkbox option; false when it does not exist.
    pub fn checkbox(&self, option_id: &str) -> bool {
        self.fragment.is_checked(option_id).unwrap_or(false)
    }

    /// Snapshot of every declared field.
    pub fn values(&self) -> Values {
        let mut values = Values::default();
        for field in self.layout.fields() {
            match field.kind {
                InputKind::Number => {
                    let value = self.standard_value(&field.id).map(Value::Number);
                    values.entries.insert(field.id.clone(), value);
                }
                InputKind::Radio | InputKind::Select => {
                    let value = self.radio(&field.id).map(Value::Choice);
                    values.entries.insert(field.id.clone(), value);
                }
                InputKind::Checkbox => {
                    for id in field.option_ids() {
                        let checked = self.fragment.is_checked(&id).map(Value::Flag);
                        values.entries.insert(id, checked);
                    }
                    let checked = self.fragment.checked_values(&field.id).unwrap_or_default();
                    values.checked.insert(field.id.clone(), checked);
                }
            }
        }
        values
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Choice(String),
    Flag(bool),
}

/// Resolved value of every declared input, keyed by field id (number,
/// radio, select) or option element id (checkbox).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Values {
    entries: BTreeMap<String, Option<Value>>,
    /// Checked option values per checkbox group.
    checked: BTreeMap<String, Vec<String>>,
}

impl Values {
    /// Numeric value of a number field, or a numeric option value.
    pub fn number(&self, id: &str) -> Option<f64> {
        match self.get(id)? {
            Value::Number(n) => Some(*n),
            Value::Choice(s) => s.trim().parse().ok(),
            Value::Flag(_) => None,
        }
    }

    /// Selected value of a radio or select group.
    pub fn text(&self, id: &str) -> Option<&str> {
        match self.get(id)? {
            Value::Choice(s) => Some(s),
            _ => None,
        }
    }

    /// Checked state of a checkbox option.
    pub fn flag(&self, id: &str) -> Option<bool> {
        match self.get(id)? {
            Value::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.entries.get(id)?.as_ref()
    }

    /// Whether `field` is shown for the current selections.
    pub fn shows(&self, field: &InputSpec) -> bool {
        field
            .visible_when
            .as_ref()
            .is_none_or(|rule| rule.holds(self.text(&rule.field)))
    }

    pub fn is_missing(&self, id: &str) -> bool {
        self.get(id).is_none()
    }

    /// Values of the checked options in a checkbox group.
    pub fn checked(&self, group: &str) -> &[String] {
        self.checked.get(group).map(Vec::as_slice).unwrap_or_default()
    }

    /// Sum of the numeric values of the checked options in a group.
    pub fn checked_total(&self, group: &str) -> f64 {
        self.checked(group)
            .iter()
            .filter_map(|v| v.trim().parse::<f64>().ok())
            .sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    /// Builds a snapshot by hand, for evaluating outside a fragment.
    pub fn with(mut self, id: &str, value: Value) -> Self {
        self.entries.insert(id.to_string(), Some(value));
        self
    }

    pub fn with_checked(mut self, group: &str, values: &[&str]) -> Self {
        self.checked
            .insert(group.to_string(), values.iter().map(|v| v.to_string()).collect());
        self
    }
}
