use std::path::PathBuf;
use std::sync::Arc;

use eyre::{Result, bail, eyre};

use medcalc_calculators::registry::Registry;
use medcalc_core::models::input::InputKind;
use medcalc_core::models::result::ResultItem;
use medcalc_engine::attach::AttachContext;
use medcalc_engine::classify::{TableIssue, overlaps};
use medcalc_engine::compile::Engine;
use medcalc_engine::config::CalculatorConfig;
use medcalc_engine::fragment::Fragment;
use medcalc_engine::settings::EngineSettings;
use medcalc_record::memory::RecordBundle;

pub fn list(json: bool) -> Result<()> {
    let summaries = Registry::builtin()?.summaries();
    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }
    for summary in &summaries {
        println!("{:<12} {:<8} {}", summary.id, summary.mode, summary.title);
    }
    Ok(())
}

pub fn render(settings: EngineSettings, id: &str) -> Result<()> {
    let engine = Engine::new(settings)?;
    let unit = Registry::builtin()?.compile(&engine, id)?;
    println!("{}", unit.render()?);
    Ok(())
}

pub struct EvalRequest {
    pub id: String,
    pub values: Vec<String>,
    pub units: Vec<String>,
    pub record: Option<PathBuf>,
    pub markup: bool,
}

/// Mounts the calculator, auto-populates it from the record bundle if one
/// was given, then applies units and values in order, as a user would.
pub async fn eval(settings: EngineSettings, request: EvalRequest) -> Result<()> {
    let engine = Engine::new(settings)?;
    let unit = Registry::builtin()?.compile(&engine, &request.id)?;
    let fragment = unit.mount()?;

    let mut ctx = AttachContext::new(fragment.clone());
    if let Some(path) = &request.record {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| eyre!("failed to read record bundle {}: {e}", path.display()))?;
        let (subject, records) = RecordBundle::from_json(&contents)?.into_parts();
        tracing::info!(subject = %subject.id, "record bundle loaded");
        ctx = ctx.with_record(Arc::new(records)).with_subject(subject);
    }
    unit.attach(ctx).settled().await;

    for pair in &request.units {
        let (field, target) = split(pair)?;
        if !fragment.set_unit(field, target, engine.units().as_ref()) {
            bail!("field '{field}' cannot be shown in '{target}'");
        }
    }
    for pair in &request.values {
        let (field, value) = split(pair)?;
        apply(unit.config(), &fragment, field, value)?;
    }

    if request.markup {
        match fragment.result_markup() {
            Some(markup) => println!("{markup}"),
            None => println!("(result hidden)"),
        }
        return Ok(());
    }

    match unit.present(&fragment) {
        Some(presentation) => {
            for item in &presentation.items {
                println!("{}", describe(item));
            }
        }
        None => println!("Incomplete: every required field needs a valid value."),
    }
    let stale = fragment.stale_fields();
    if !stale.is_empty() {
        println!("Stale (pre-filled from old observations): {}", stale.join(", "));
    }
    if let Some(message) = fragment.error_message() {
        eprintln!("{message}");
    }
    Ok(())
}

pub fn lint() -> Result<()> {
    let registry = Registry::builtin()?;
    let mut found = 0;
    for config in registry.iter() {
        for issue in overlaps(&config.risk_levels) {
            found += 1;
            let text = match issue {
                TableIssue::Overlap {
                    first,
                    second,
                    from,
                    to,
                } => format!("'{first}' and '{second}' overlap on [{from}, {to}]; '{first}' wins"),
                TableIssue::OutOfOrder { level, previous } => {
                    format!("'{level}' starts below '{previous}'")
                }
                TableIssue::Inverted { level } => format!("'{level}' has min above max"),
            };
            println!("{}: {text}", config.id);
        }
    }
    if found == 0 {
        println!("{} risk tables checked, no issues", registry.len());
    }
    Ok(())
}

fn split(pair: &str) -> Result<(&str, &str)> {
    pair.split_once('=')
        .map(|(key, value)| (key.trim(), value.trim()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| eyre!("expected FIELD=VALUE, got '{pair}'"))
}

/// Number fields and groups by id; checkbox options by element id with
/// `true` or `false`.
fn apply(config: &CalculatorConfig, fragment: &Fragment, field: &str, value: &str) -> Result<()> {
    let applied = match config.layout.field(field) {
        Some(spec) => match spec.kind {
            InputKind::Number => fragment.set_value(field, value),
            InputKind::Radio | InputKind::Select => fragment.select(field, value),
            InputKind::Checkbox => {
                bail!("'{field}' is a checkbox group; set its options by id: {}", spec.option_ids().join(", "))
            }
        },
        None => {
            let checked: bool = value
                .parse()
                .map_err(|_| eyre!("option '{field}' takes true or false, got '{value}'"))?;
            fragment.set_checked(field, checked)
        }
    };
    if !applied {
        bail!("'{field}' does not accept '{value}' in {}", config.id);
    }
    Ok(())
}

fn describe(item: &ResultItem) -> String {
    if item.is_alert() {
        return format!("! {}", item.value);
    }
    let mut line = format!("{}: {}", item.label, item.value);
    if let Some(unit) = &item.unit {
        line.push(' ');
        line.push_str(unit);
    }
    if let Some(interpretation) = &item.interpretation {
        line.push_str(" (");
        line.push_str(interpretation);
        line.push(')');
    }
    line
}
