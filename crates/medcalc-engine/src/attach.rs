use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, trace, warn};

use medcalc_core::models::severity::Severity;
use medcalc_record::source::{NoRecords, RecordSource};
use medcalc_record::subject::Subject;

use crate::compile::{Compiled, RuntimeUnit};
use crate::config::CalculatorConfig;
use crate::evaluate::Outcome;
use crate::fragment::{FieldEvent, Fragment, Handler};
use crate::history::CalculationEvent;
use crate::hooks::{PrefillContext, RenderInput, guard};
use crate::prefill::{self, FragmentWriter};
use crate::render::{self, Presentation};
use crate::resolver::Resolver;

/// What `attach` needs from the host.
#[derive(Clone)]
pub struct AttachContext {
    pub record: Arc<dyn RecordSource>,
    pub subject: Subject,
    /// The mounted fragment the calculator lives in.
    pub container: Fragment,
}

impl AttachContext {
    /// A context with no record system and an anonymous subject.
    pub fn new(container: Fragment) -> Self {
        Self {
            record: Arc::new(NoRecords),
            subject: Subject::default(),
            container,
        }
    }

    pub fn with_record(mut self, record: Arc<dyn RecordSource>) -> Self {
        self.record = record;
        self
    }

    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subject = subject;
        self
    }
}

/// Returned by `attach` before any auto-population has happened.
#[derive(Debug)]
pub struct Attachment {
    wired: bool,
    prefill: Option<JoinHandle<()>>,
}

impl Attachment {
    /// False when the fragment was already attached and nothing was wired.
    pub fn is_new(&self) -> bool {
        self.wired
    }

    pub fn has_prefill(&self) -> bool {
        self.prefill.is_some()
    }

    /// Waits for auto-population to finish. Hosts never need to.
    pub async fn settled(self) {
        if let Some(task) = self.prefill
            && let Err(e) = task.await
        {
            warn!(error = %e, "auto-population task did not complete");
        }
    }
}

impl RuntimeUnit {
    /// Wires the fragment into the recomputation pipeline.
    ///
    /// Registers one listener covering every declared field, runs the custom
    /// initializer on first attach, recomputes once and starts
    /// auto-population in the background. Attaching the same fragment again
    /// registers nothing new; it recomputes and re-runs auto-population.
    pub fn attach(&self, ctx: AttachContext) -> Attachment {
        let compiled = &self.compiled;
        let calculator = compiled.config.id.as_str();
        let fragment = &ctx.container;

        let pipeline = Arc::clone(compiled);
        let handler: Handler = Arc::new(move |fragment: &Fragment, event: &FieldEvent| {
            trace!(calculator = %pipeline.config.id, field = %event.field, origin = ?event.origin, "recompute");
            pipeline.recompute(fragment);
        });
        let wired = fragment.listen(calculator, compiled.config.field_ids(), handler);

        if wired {
            if let Some(initialize) = &compiled.config.initialize {
                guard(calculator, "initialize", || initialize(fragment, &ctx.subject));
            }
        } else {
            debug!(calculator, "fragment already attached; listeners unchanged");
        }

        compiled.recompute(fragment);

        let prefill = if compiled.settings.prefill_enabled && needs_prefill(&compiled.config) {
            spawn_prefill(compiled, &ctx)
        } else {
            None
        };
        Attachment { wired, prefill }
    }
}

fn needs_prefill(config: &CalculatorConfig) -> bool {
    config.prefill.is_some()
        || config.layout.fields().any(|field| {
            field.observation_code.is_some()
                || field.options.iter().any(|o| !o.condition_codes.is_empty())
        })
}

fn spawn_prefill(compiled: &Arc<Compiled>, ctx: &AttachContext) -> Option<JoinHandle<()>> {
    let calculator = compiled.config.id.as_str();
    let Ok(handle) = Handle::try_current() else {
        warn!(calculator, "no async runtime; auto-population skipped");
        return None;
    };
    let prefill_ctx = PrefillContext {
        writer: FragmentWriter::new(&ctx.container),
        record: Arc::clone(&ctx.record),
        subject: ctx.subject.clone(),
        units: Arc::clone(&compiled.units),
    };
    let task = prefill::populate(
        Arc::clone(&compiled.config),
        prefill_ctx,
        compiled.settings.staleness_days,
    );
    Some(handle.spawn(task))
}

impl Compiled {
    /// Evaluate, classify, render and show, or hide the result region when
    /// there is nothing to show.
    ///
    /// Writes from auto-population and from the user may recompute on
    /// different threads. Each pass remembers the fragment revision it read
    /// and its result is dropped if a newer write arrived meanwhile; the pass
    /// triggered by that write shows the current values instead.
    pub(crate) fn recompute(&self, fragment: &Fragment) {
        let config = &self.config;
        let calculator = config.id.as_str();
        let revision = fragment.revision();

        if !config.layout.fields().any(|f| fragment.has_field(&f.id)) {
            trace!(calculator, "fragment has none of the calculator's fields");
            fragment.publish(revision, None);
            return;
        }

        let Some(outcome) = self.evaluate(fragment) else {
            fragment.publish(revision, None);
            return;
        };

        if config.renderer.is_some()
            && let Some(markup) = self.custom_markup(fragment, &outcome)
        {
            if fragment.publish(revision, Some(markup)) {
                let summary = Presentation {
                    items: outcome.items().to_vec(),
                    score: outcome.score(),
                    level: None,
                }
                .summary();
                self.record(fragment, summary, outcome.score(), None);
            }
            return;
        }

        let presentation = render::present(&outcome, &config.risk_levels);
        match render::markup(&self.widgets, &presentation) {
            Ok(markup) => {
                if fragment.publish(revision, Some(markup)) {
                    let severity = presentation.items.iter().find_map(|item| item.severity);
                    self.record(fragment, presentation.summary(), presentation.score, severity);
                }
            }
            Err(e) => {
                error!(calculator, error = %e, "result rendering failed");
                if fragment.publish(revision, None) {
                    fragment.show_error("Unable to display the result.");
                }
            }
        }
    }

    fn custom_markup(&self, fragment: &Fragment, outcome: &Outcome) -> Option<String> {
        let renderer = self.config.renderer.as_ref()?;
        let resolver = Resolver::new(fragment, &self.config.layout, self.units.as_ref());
        let values = resolver.values();
        let no_breakdown = BTreeMap::new();
        let input = RenderInput {
            score: outcome.score(),
            items: outcome.items(),
            values: &values,
            breakdown: outcome.breakdown().unwrap_or(&no_breakdown),
            widgets: &self.widgets,
        };
        guard(&self.config.id, "render", || renderer(&input))
    }

    fn record(
        &self,
        fragment: &Fragment,
        summary: String,
        score: Option<f64>,
        severity: Option<Severity>,
    ) {
        let event = CalculationEvent::new(self.config.id.as_str(), fragment.instance_id(), summary)
            .with_score(score)
            .with_severity(severity);
        event.emit();
        self.history.record(event);
    }
}
