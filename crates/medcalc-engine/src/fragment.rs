//! Live state of a mounted calculator.
//!
//! A [`Fragment`] is what a host holds after inserting a calculator's markup:
//! the current value of every field, the result region and the change
//! listeners wired by `attach`. Handles are cheap to clone and share one
//! state. Writers that may outlive the host (auto-population) hold a
//! [`WeakFragment`] instead.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, trace};
use uuid::Uuid;

use medcalc_core::models::input::{InputKind, InputSpec, Layout, UnitToggle};
use medcalc_core::units::UnitConversion;

/// Callback invoked for every event on a field it tracks.
pub type Handler = Arc<dyn Fn(&Fragment, &FieldEvent) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Typing into a number field, or a unit switch.
    Input,
    /// Selecting or checking an option.
    Change,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    User,
    Prefill,
    Toggle,
}

/// A change to one field. Checkbox events carry the group name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEvent {
    pub field: String,
    pub kind: EventKind,
    pub origin: Origin,
}

#[derive(Debug, Clone)]
struct CheckOption {
    id: String,
    value: String,
    checked: bool,
}

#[derive(Debug, Clone)]
enum FieldState {
    Number {
        raw: String,
        unit: Option<String>,
        toggle: Option<UnitToggle>,
    },
    Single {
        options: Vec<String>,
        selected: Option<String>,
    },
    Multi {
        options: Vec<CheckOption>,
    },
}

impl FieldState {
    fn seed(field: &InputSpec) -> Self {
        match field.kind {
            InputKind::Number => FieldState::Number {
                raw: field.default_value.clone().unwrap_or_default(),
                unit: field.display_unit().map(str::to_string),
                toggle: field.unit_toggle.clone(),
            },
            InputKind::Radio | InputKind::Select => FieldState::Single {
                options: field.options.iter().map(|o| o.value.clone()).collect(),
                selected: field
                    .options
                    .iter()
                    .find(|o| field.starts_checked(o))
                    .map(|o| o.value.clone()),
            },
            InputKind::Checkbox => FieldState::Multi {
                options: field
                    .options
                    .iter()
                    .enumerate()
                    .map(|(index, o)| CheckOption {
                        id: o.element_id(&field.id, index),
                        value: o.value.clone(),
                        checked: field.starts_checked(o),
                    })
                    .collect(),
            },
        }
    }
}

struct Listener {
    key: String,
    fields: BTreeSet<String>,
    handler: Handler,
}

#[derive(Default)]
struct ResultRegion {
    visible: bool,
    content: String,
}

struct FragmentState {
    fields: BTreeMap<String, FieldState>,
    result: ResultRegion,
    error: Option<String>,
    stale: BTreeSet<String>,
    listeners: Vec<Listener>,
    /// Bumped by every write that can change what the result shows.
    revision: u64,
}

struct FragmentInner {
    calculator: String,
    instance: Uuid,
    markup: String,
    state: Mutex<FragmentState>,
}

#[derive(Clone)]
pub struct Fragment {
    inner: Arc<FragmentInner>,
}

#[derive(Clone)]
pub struct WeakFragment {
    inner: Weak<FragmentInner>,
}

impl WeakFragment {
    pub fn upgrade(&self) -> Option<Fragment> {
        self.inner.upgrade().map(|inner| Fragment { inner })
    }
}

impl fmt::Debug for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fragment")
            .field("calculator", &self.inner.calculator)
            .field("instance", &self.inner.instance)
            .finish_non_exhaustive()
    }
}

impl Fragment {
    /// Field state seeded from declared defaults; result region hidden.
    /// `markup` is what the host inserted for this fragment.
    pub fn from_layout(calculator: &str, layout: &Layout, markup: String) -> Self {
        let fields = layout
            .fields()
            .map(|field| (field.id.clone(), FieldState::seed(field)))
            .collect();
        Self {
            inner: Arc::new(FragmentInner {
                calculator: calculator.to_string(),
                instance: Uuid::new_v4(),
                markup,
                state: Mutex::new(FragmentState {
                    fields,
                    result: ResultRegion::default(),
                    error: None,
                    stale: BTreeSet::new(),
                    listeners: Vec::new(),
                    revision: 0,
                }),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, FragmentState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn calculator_id(&self) -> &str {
        &self.inner.calculator
    }

    /// Distinguishes two fragments mounted from the same calculator.
    pub fn instance_id(&self) -> Uuid {
        self.inner.instance
    }

    pub fn markup(&self) -> &str {
        &self.inner.markup
    }

    pub fn downgrade(&self) -> WeakFragment {
        WeakFragment {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn same_as(&self, other: &Fragment) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Removes every field, as when the host tears down the markup.
    /// Listeners stay registered and later events resolve to nothing.
    pub fn detach(&self) {
        let mut state = self.state();
        state.fields.clear();
        state.stale.clear();
        state.result = ResultRegion::default();
        state.revision += 1;
        debug!(calculator = %self.inner.calculator, "fragment detached");
    }

    pub fn has_field(&self, id: &str) -> bool {
        self.state().fields.contains_key(id)
    }

    // ---- listeners ----

    /// Registers `handler` for events on `fields` under `key`.
    ///
    /// Returns false, and leaves the existing listener in place, when a
    /// listener with the same key is already registered.
    pub fn listen<I, S>(&self, key: &str, fields: I, handler: Handler) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = self.state();
        if state.listeners.iter().any(|l| l.key == key) {
            return false;
        }
        state.listeners.push(Listener {
            key: key.to_string(),
            fields: fields.into_iter().map(Into::into).collect(),
            handler,
        });
        true
    }

    pub fn listener_count(&self) -> usize {
        self.state().listeners.len()
    }

    fn dispatch(&self, event: FieldEvent) {
        let handlers: Vec<Handler> = self
            .state()
            .listeners
            .iter()
            .filter(|l| l.fields.contains(&event.field))
            .map(|l| Arc::clone(&l.handler))
            .collect();
        trace!(
            calculator = %self.inner.calculator,
            field = %event.field,
            listeners = handlers.len(),
            "field event"
        );
        for handler in handlers {
            handler(self, &event);
        }
    }

    // ---- reads ----

    /// Displayed text of a number field, trimmed. None when empty or absent.
    pub fn raw(&self, id: &str) -> Option<String> {
        match self.state().fields.get(id)? {
            FieldState::Number { raw, .. } => {
                let trimmed = raw.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            _ => None,
        }
    }

    /// Unit a number field is currently displayed in.
    pub fn unit(&self, id: &str) -> Option<String> {
        match self.state().fields.get(id)? {
            FieldState::Number { unit, .. } => unit.clone(),
            _ => None,
        }
    }

    pub fn toggle(&self, id: &str) -> Option<UnitToggle> {
        match self.state().fields.get(id)? {
            FieldState::Number { toggle, .. } => toggle.clone(),
            _ => None,
        }
    }

    /// Selected value of a radio or select group.
    pub fn selected(&self, group: &str) -> Option<String> {
        match self.state().fields.get(group)? {
            FieldState::Single { selected, .. } => selected.clone(),
            _ => None,
        }
    }

    /// Checked state of the checkbox option with element id `option_id`.
    pub fn is_checked(&self, option_id: &str) -> Option<bool> {
        self.state().fields.values().find_map(|field| match field {
            FieldState::Multi { options } => {
                options.iter().find(|o| o.id == option_id).map(|o| o.checked)
            }
            _ => None,
        })
    }

    /// Values of every checked option in a checkbox group.
    pub fn checked_values(&self, group: &str) -> Option<Vec<String>> {
        match self.state().fields.get(group)? {
            FieldState::Multi { options } => Some(
                options
                    .iter()
                    .filter(|o| o.checked)
                    .map(|o| o.value.clone())
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Group name owning the checkbox option `option_id`.
    pub fn group_of(&self, option_id: &str) -> Option<String> {
        self.state()
            .fields
            .iter()
            .find_map(|(group, field)| match field {
                FieldState::Multi { options } if options.iter().any(|o| o.id == option_id) => {
                    Some(group.clone())
                }
                _ => None,
            })
    }

    // ---- writes ----

    /// Replaces the text of a number field and fires an input event.
    pub fn set_value(&self, id: &str, raw: &str) -> bool {
        self.write_value(id, raw, Origin::User)
    }

    /// Selects `value` in a radio or select group and fires a change event.
    pub fn select(&self, group: &str, value: &str) -> bool {
        self.write_selection(group, value, Origin::User)
    }

    /// Checks or unchecks one checkbox option and fires a change event.
    pub fn set_checked(&self, option_id: &str, checked: bool) -> bool {
        self.write_checked(option_id, checked, Origin::User)
    }

    pub(crate) fn write_value(&self, id: &str, value: &str, origin: Origin) -> bool {
        {
            let mut state = self.state();
            match state.fields.get_mut(id) {
                Some(FieldState::Number { raw, .. }) => *raw = value.to_string(),
                _ => return false,
            }
            state.revision += 1;
            if origin != Origin::Prefill {
                state.stale.remove(id);
            }
        }
        self.dispatch(FieldEvent {
            field: id.to_string(),
            kind: EventKind::Input,
            origin,
        });
        true
    }

    pub(crate) fn write_selection(&self, group: &str, value: &str, origin: Origin) -> bool {
        {
            let mut state = self.state();
            match state.fields.get_mut(group) {
                Some(FieldState::Single { options, selected }) if options.iter().any(|o| o == value) => {
                    *selected = Some(value.to_string());
                }
                _ => return false,
            }
            state.revision += 1;
            if origin != Origin::Prefill {
                state.stale.remove(group);
            }
        }
        self.dispatch(FieldEvent {
            field: group.to_string(),
            kind: EventKind::Change,
            origin,
        });
        true
    }

    pub(crate) fn write_checked(&self, option_id: &str, checked: bool, origin: Origin) -> bool {
        let group = {
            let mut state = self.state();
            let group = state.fields.iter_mut().find_map(|(group, field)| match field {
                FieldState::Multi { options } => {
                    let option = options.iter_mut().find(|o| o.id == option_id)?;
                    option.checked = checked;
                    Some(group.clone())
                }
                _ => None,
            });
            let Some(group) = group else {
                return false;
            };
            state.revision += 1;
            group
        };
        self.dispatch(FieldEvent {
            field: group,
            kind: EventKind::Change,
            origin,
        });
        true
    }

    /// Switches a toggle-enabled number field to `unit`, converting the
    /// displayed value at the unit's display precision. Returns false when
    /// the field has no toggle or `unit` is not one of its units.
    pub fn set_unit(&self, id: &str, unit: &str, units: &dyn UnitConversion) -> bool {
        {
            let mut state = self.state();
            let Some(FieldState::Number {
                raw,
                unit: current,
                toggle: Some(toggle),
            }) = state.fields.get_mut(id)
            else {
                return false;
            };
            if !toggle.units.iter().any(|u| u == unit) {
                return false;
            }
            let from = current.clone().unwrap_or_else(|| toggle.default.clone());
            if from == unit {
                return true;
            }
            if let Ok(value) = raw.trim().parse::<f64>() {
                match units.convert(value, &from, unit, &toggle.measurement) {
                    Some(converted) => {
                        let decimals = units.display_decimals(&toggle.measurement, unit);
                        *raw = format!("{converted:.decimals$}");
                    }
                    None => debug!(field = %id, %from, to = %unit, "unit conversion unavailable"),
                }
            }
            *current = Some(unit.to_string());
            state.revision += 1;
        }
        self.dispatch(FieldEvent {
            field: id.to_string(),
            kind: EventKind::Input,
            origin: Origin::Toggle,
        });
        true
    }

    /// Advances a toggle-enabled number field to its next unit.
    pub fn toggle_unit(&self, id: &str, units: &dyn UnitConversion) -> Option<String> {
        let toggle = self.toggle(id)?;
        let current = self.unit(id).unwrap_or_else(|| toggle.default.clone());
        let next = toggle.next_after(&current)?.to_string();
        self.set_unit(id, &next, units).then_some(next)
    }

    // ---- stale markers ----

    pub(crate) fn mark_stale(&self, id: &str) -> bool {
        let mut state = self.state();
        if !state.fields.contains_key(id) {
            return false;
        }
        state.stale.insert(id.to_string());
        true
    }

    /// Fields filled from observations older than the staleness threshold.
    pub fn stale_fields(&self) -> Vec<String> {
        self.state().stale.iter().cloned().collect()
    }

    // ---- result region ----

    /// Counter of field writes so far. A result computed from the values
    /// seen at one revision is only current while the revision is unchanged.
    pub fn revision(&self) -> u64 {
        self.state().revision
    }

    /// Shows `markup`, or hides the region when it is `None`, unless a write
    /// happened after `revision`. Returns false when the result was dropped
    /// as outdated.
    pub(crate) fn publish(&self, revision: u64, markup: Option<String>) -> bool {
        let mut state = self.state();
        if state.revision != revision {
            trace!(
                calculator = %self.inner.calculator,
                computed = revision,
                current = state.revision,
                "outdated result dropped"
            );
            return false;
        }
        match markup {
            Some(content) => {
                if !state.result.visible {
                    debug!(calculator = %self.inner.calculator, "result shown");
                }
                state.result = ResultRegion {
                    visible: true,
                    content,
                };
                state.error = None;
            }
            None => {
                if state.result.visible {
                    debug!(calculator = %self.inner.calculator, "result hidden");
                }
                state.result = ResultRegion::default();
            }
        }
        true
    }

    pub fn is_result_visible(&self) -> bool {
        self.state().result.visible
    }

    /// Markup of the result region while it is visible.
    pub fn result_markup(&self) -> Option<String> {
        let state = self.state();
        state.result.visible.then(|| state.result.content.clone())
    }

    pub fn show_error(&self, message: &str) {
        self.state().error = Some(message.to_string());
    }

    pub fn error_message(&self) -> Option<String> {
        self.state().error.clone()
    }
}
