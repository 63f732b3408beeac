//! Auto-population of fields from the record.
//!
//! Runs as a background task after `attach`. Every write goes through the
//! fragment's normal setters, so a pre-filled value triggers exactly the
//! same recomputation as a typed one. Writers hold a weak handle: once the
//! host drops the fragment, or removes a field, writes are skipped.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use futures::FutureExt;
use jiff::Timestamp;
use tracing::{debug, error, warn};

use medcalc_core::models::input::{InputKind, InputSpec, SUBJECT_AGE, SUBJECT_SEX};
use medcalc_record::error::RecordError;

use crate::config::CalculatorConfig;
use crate::fragment::{Fragment, Origin, WeakFragment};
use crate::hooks::{PrefillContext, PrefillHook, panic_message};

/// Write access to a fragment that does not keep it alive.
#[derive(Clone)]
pub struct FragmentWriter {
    fragment: WeakFragment,
    calculator: String,
}

impl FragmentWriter {
    pub fn new(fragment: &Fragment) -> Self {
        Self {
            fragment: fragment.downgrade(),
            calculator: fragment.calculator_id().to_string(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.fragment.upgrade().is_some()
    }

    fn target(&self, field: &str, exists: impl Fn(&Fragment) -> bool) -> Option<Fragment> {
        let Some(fragment) = self.fragment.upgrade() else {
            debug!(calculator = %self.calculator, field, "fragment dropped; write skipped");
            return None;
        };
        if !exists(&fragment) {
            debug!(calculator = %self.calculator, field, "field no longer present; write skipped");
            return None;
        }
        Some(fragment)
    }

    pub fn set_value(&self, field: &str, raw: &str) -> bool {
        self.target(field, |f| f.has_field(field))
            .is_some_and(|f| f.write_value(field, raw, Origin::Prefill))
    }

    pub fn select(&self, group: &str, value: &str) -> bool {
        self.target(group, |f| f.has_field(group))
            .is_some_and(|f| f.write_selection(group, value, Origin::Prefill))
    }

    pub fn set_checked(&self, option_id: &str, checked: bool) -> bool {
        self.target(option_id, |f| f.is_checked(option_id).is_some())
            .is_some_and(|f| f.write_checked(option_id, checked, Origin::Prefill))
    }

    pub fn mark_stale(&self, field: &str) -> bool {
        self.target(field, |f| f.has_field(field))
            .is_some_and(|f| f.mark_stale(field))
    }

    /// Unit the field is currently displayed in.
    pub fn unit(&self, field: &str) -> Option<String> {
        self.fragment.upgrade()?.unit(field)
    }
}

/// Declarative pass over every field, then the calculator's own hook.
pub(crate) async fn populate(config: Arc<CalculatorConfig>, ctx: PrefillContext, staleness_days: u32) {
    let calculator = config.id.as_str();

    if ctx.record.is_ready() {
        let fields: Vec<&InputSpec> = config.layout.fields().collect();
        for field in fields {
            if !ctx.writer.is_alive() {
                debug!(calculator, "fragment dropped; auto-population stopped");
                return;
            }
            if let Err(e) = prefill_field(calculator, field, &ctx, staleness_days).await {
                warn!(calculator, field = %field.id, error = %e, "auto-population lookup failed");
            }
        }
    } else {
        debug!(calculator, "record system not ready; declarative auto-population skipped");
    }

    if let Some(hook) = &config.prefill {
        run_hook(calculator, hook, ctx).await;
    }
}

async fn prefill_field(
    calculator: &str,
    field: &InputSpec,
    ctx: &PrefillContext,
    staleness_days: u32,
) -> Result<(), RecordError> {
    match field.observation_code.as_deref() {
        Some(SUBJECT_AGE) => {
            if let Some(age) = ctx.subject.age() {
                apply_numeric(calculator, field, ctx, age as f64, None);
            }
        }
        Some(SUBJECT_SEX) => {
            if let Some(sex) = ctx.subject.sex
                && field.kind.is_single_choice()
            {
                ctx.writer.select(&field.id, sex.as_str());
            }
        }
        Some(code) => {
            if let Some(observation) = ctx.record.observation(code).await? {
                let written =
                    apply_numeric(calculator, field, ctx, observation.value, observation.unit.as_deref());
                let now = Timestamp::now();
                if written && observation.is_stale(now, staleness_days) {
                    ctx.writer.mark_stale(&field.id);
                    warn!(
                        calculator,
                        field = %field.id,
                        code,
                        age_days = observation.age_days(now),
                        "pre-filled from a stale observation"
                    );
                }
            }
        }
        None => {}
    }

    for (index, option) in field.options.iter().enumerate() {
        if option.condition_codes.is_empty() {
            continue;
        }
        if ctx.record.has_condition(&option.condition_codes).await? {
            match field.kind {
                InputKind::Checkbox => {
                    ctx.writer
                        .set_checked(&option.element_id(&field.id, index), true);
                }
                InputKind::Radio | InputKind::Select => {
                    ctx.writer.select(&field.id, &option.value);
                }
                InputKind::Number => {}
            }
        }
    }
    Ok(())
}

/// Writes a numeric record value into `field`: converted into the displayed
/// unit for number fields, or mapped through the observation rules for
/// option groups. Returns whether anything was written.
fn apply_numeric(
    calculator: &str,
    field: &InputSpec,
    ctx: &PrefillContext,
    value: f64,
    unit: Option<&str>,
) -> bool {
    match field.kind {
        InputKind::Number => {
            let display = ctx.writer.unit(&field.id);
            let value = match (unit, display.as_deref()) {
                (Some(from), Some(to)) if from != to => {
                    let converted = field
                        .unit_toggle
                        .as_ref()
                        .and_then(|toggle| ctx.units.convert(value, from, to, &toggle.measurement));
                    match converted {
                        Some(converted) => converted,
                        None => {
                            warn!(calculator, field = %field.id, from, to, "observation unit not convertible; skipped");
                            return false;
                        }
                    }
                }
                _ => value,
            };
            let text = match (&field.unit_toggle, display.as_deref()) {
                (Some(toggle), Some(shown)) => {
                    let decimals = ctx.units.display_decimals(&toggle.measurement, shown);
                    format!("{value:.decimals$}")
                }
                _ => value.to_string(),
            };
            ctx.writer.set_value(&field.id, &text)
        }
        InputKind::Radio | InputKind::Select => field
            .observation_rules
            .iter()
            .find(|rule| rule.matches(value))
            .is_some_and(|rule| ctx.writer.select(&field.id, &rule.option)),
        InputKind::Checkbox => field
            .observation_rules
            .iter()
            .find(|rule| rule.matches(value))
            .is_some_and(|rule| ctx.writer.set_checked(&rule.option, true)),
    }
}

async fn run_hook(calculator: &str, hook: &Arc<PrefillHook>, ctx: PrefillContext) {
    let future = match catch_unwind(AssertUnwindSafe(|| hook(ctx))) {
        Ok(future) => future,
        Err(payload) => {
            error!(calculator, hook = "prefill", panic = %panic_message(payload.as_ref()), "hook panicked");
            return;
        }
    };
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(Ok(())) => debug!(calculator, "custom auto-population finished"),
        Ok(Err(e)) => error!(calculator, hook = "prefill", error = %e, "hook failed"),
        Err(payload) => {
            error!(calculator, hook = "prefill", panic = %panic_message(payload.as_ref()), "hook panicked")
        }
    }
}
