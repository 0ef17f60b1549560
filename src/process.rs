//! Run coordination: specs × sources → derivatives.
//!
//! A run has three phases:
//!
//! 1. **Specs.** Every `[[sizes]]` entry is merged with the run options and
//!    validated. Valid specs get sequential ids and a zeroed tally counter;
//!    invalid ones are reported and skipped.
//! 2. **Sources.** Every `[[files]]` group is scanned. Finding no source at
//!    all aborts the run.
//! 3. **Units.** Specs run in declaration order. Each spec's sources are
//!    dispatched to a rayon pool of `concurrency` threads; a size's tally is
//!    read only after all of its units finish.
//!
//! ## One unit of work
//!
//! ```text
//! destination → exists? (newer-only) → identify → animated? → natural size
//!             → plan → upscale skip? → engine transform → tally += 1
//! ```
//!
//! Skips are successes without output. Any engine or filesystem error aborts
//! the run.
//!
//! Progress is reported through an optional [`ProcessEvent`] channel so the
//! CLI can print from its own thread while workers run.

use crate::config::TaskConfig;
use crate::destination::{DestinationError, destination};
use crate::imaging::{BackendError, EngineKind, ImageEngine, Plan, plan};
use crate::scan::{self, ScanError, SourceFile, SourceGroup};
use crate::skip::should_skip;
use crate::spec::{SizeSpec, SpecId};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Destination(#[from] DestinationError),
    #[error("Image processing failed: {0}")]
    Engine(#[from] BackendError),
    #[error("Unable to compile; no valid source files were found")]
    NoSources,
    #[error("Failed to start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Per-spec success counters.
///
/// Created with a zero counter per valid spec. Workers only ever see the
/// counter of the size they are running for.
#[derive(Debug, Default)]
pub struct Tally {
    counters: BTreeMap<SpecId, AtomicUsize>,
}

impl Tally {
    pub fn new(specs: &[SizeSpec]) -> Self {
        Self {
            counters: specs
                .iter()
                .map(|spec| (spec.id, AtomicUsize::new(0)))
                .collect(),
        }
    }

    pub fn counter(&self, id: SpecId) -> Option<&AtomicUsize> {
        self.counters.get(&id)
    }

    pub fn get(&self, id: SpecId) -> usize {
        self.counters
            .get(&id)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }
}

/// How one (source, spec) unit ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOutcome {
    Written,
    /// Destination exists and the newer-only policy is on.
    SkippedExisting,
    /// Animated source and the size does not opt in.
    SkippedAnimated,
    /// Would upscale and the size asks for no scaled image.
    SkippedUpscale,
}

impl UnitOutcome {
    pub fn is_skip(self) -> bool {
        !matches!(self, UnitOutcome::Written)
    }
}

/// Progress events, sent in run order per spec.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    SpecInvalid {
        index: usize,
        reason: String,
    },
    SpecStarted {
        id: SpecId,
        name: String,
        sources: usize,
    },
    /// Units of one spec may finish in any order.
    UnitFinished {
        id: SpecId,
        source: PathBuf,
        dest: PathBuf,
        outcome: UnitOutcome,
    },
    SpecCompleted {
        id: SpecId,
        name: String,
        written: usize,
    },
}

/// A size entry that failed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvalidSpec {
    /// Position in `[[sizes]]`, starting at 0.
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecSummary {
    pub id: SpecId,
    pub name: String,
    pub written: usize,
    pub skipped: usize,
}

/// Outcome of a full run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub engine: EngineKind,
    pub specs: Vec<SpecSummary>,
    pub invalid: Vec<InvalidSpec>,
}

impl RunSummary {
    pub fn total_written(&self) -> usize {
        self.specs.iter().map(|s| s.written).sum()
    }
}

/// Everything a run needs before the engine is involved.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub specs: Vec<SizeSpec>,
    pub invalid: Vec<InvalidSpec>,
    pub groups: Vec<SourceGroup>,
}

impl RunPlan {
    pub fn source_count(&self) -> usize {
        self.groups.iter().map(SourceGroup::len).sum()
    }
}

/// Build specs in declaration order. Ids are only consumed by valid specs.
pub fn build_specs(config: &TaskConfig) -> (Vec<SizeSpec>, Vec<InvalidSpec>) {
    let mut specs = Vec::new();
    let mut invalid = Vec::new();

    for (index, size) in config.sizes.iter().enumerate() {
        match SizeSpec::build(SpecId(specs.len()), &config.options, size) {
            Ok(spec) => specs.push(spec),
            Err(e) => {
                warn!(index, error = %e, "skipping invalid size");
                invalid.push(InvalidSpec {
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }
    (specs, invalid)
}

/// Validate specs and discover sources, without touching any image.
pub fn plan_run(config: &TaskConfig, base_dir: &Path) -> Result<RunPlan, ProcessError> {
    let (specs, invalid) = build_specs(config);
    let groups = scan::discover(&config.files, base_dir)?;

    let plan = RunPlan {
        specs,
        invalid,
        groups,
    };
    if plan.source_count() == 0 {
        return Err(ProcessError::NoSources);
    }
    Ok(plan)
}

/// Run with the engine selected in the task options.
pub fn run(
    config: &TaskConfig,
    base_dir: &Path,
    events: Option<Sender<ProcessEvent>>,
) -> Result<RunSummary, ProcessError> {
    let engine = config.options.engine.build();
    info!(engine = %config.options.engine, "using image engine");
    run_with_engine(engine.as_ref(), config, base_dir, events)
}

/// Run with a specific engine (allows testing with a mock).
pub fn run_with_engine<E: ImageEngine + ?Sized>(
    engine: &E,
    config: &TaskConfig,
    base_dir: &Path,
    events: Option<Sender<ProcessEvent>>,
) -> Result<RunSummary, ProcessError> {
    let RunPlan {
        specs,
        invalid,
        groups,
    } = plan_run(config, base_dir)?;

    let send = |event: ProcessEvent| {
        if let Some(tx) = &events {
            let _ = tx.send(event);
        }
    };

    for entry in &invalid {
        send(ProcessEvent::SpecInvalid {
            index: entry.index,
            reason: entry.reason.clone(),
        });
    }

    let tally = Tally::new(&specs);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.options.concurrency.max(1))
        .build()?;

    let units: Vec<(&SourceGroup, &SourceFile)> = groups
        .iter()
        .flat_map(|group| group.sources.iter().map(move |source| (group, source)))
        .collect();

    let mut summaries = Vec::with_capacity(specs.len());
    for spec in &specs {
        let Some(counter) = tally.counter(spec.id) else {
            continue;
        };
        send(ProcessEvent::SpecStarted {
            id: spec.id,
            name: spec.name.clone(),
            sources: units.len(),
        });

        let skipped = AtomicUsize::new(0);
        pool.install(|| {
            units.par_iter().try_for_each(|(group, source)| {
                let (dest, outcome) = process_unit(engine, spec, group, source, counter)?;
                if outcome.is_skip() {
                    skipped.fetch_add(1, Ordering::SeqCst);
                }
                send(ProcessEvent::UnitFinished {
                    id: spec.id,
                    source: source.path.clone(),
                    dest,
                    outcome,
                });
                Ok::<(), ProcessError>(())
            })
        })?;

        let written = tally.get(spec.id);
        info!(spec = %spec.name, written, "spec complete");
        send(ProcessEvent::SpecCompleted {
            id: spec.id,
            name: spec.name.clone(),
            written,
        });
        summaries.push(SpecSummary {
            id: spec.id,
            name: spec.name.clone(),
            written,
            skipped: skipped.into_inner(),
        });
    }

    Ok(RunSummary {
        engine: engine.kind(),
        specs: summaries,
        invalid,
    })
}

/// Skip checks, planning and the engine call for one (source, spec) pair.
fn execute_unit<E: ImageEngine + ?Sized>(
    engine: &E,
    spec: &SizeSpec,
    source: &Path,
    dest: &Path,
    counter: &AtomicUsize,
) -> Result<UnitOutcome, ProcessError> {
    if should_skip(spec.new_files_only, dest) {
        debug!(dest = %dest.display(), "file already exists");
        return Ok(UnitOutcome::SkippedExisting);
    }

    let info = engine.identify(source)?;
    if info.is_animated() && !spec.try_animated {
        debug!(source = %source.display(), "animated source skipped");
        return Ok(UnitOutcome::SkippedAnimated);
    }

    let natural = engine.natural_size(source)?;
    match plan(spec, natural, source, dest) {
        Plan::SkipUpscale => {
            debug!(source = %source.display(), spec = %spec.name, "no scaled image created");
            Ok(UnitOutcome::SkippedUpscale)
        }
        Plan::Transform(job) => {
            engine.transform(&job)?;
            counter.fetch_add(1, Ordering::SeqCst);
            debug!(dest = %dest.display(), "written");
            Ok(UnitOutcome::Written)
        }
    }
}

fn process_unit<E: ImageEngine + ?Sized>(
    engine: &E,
    spec: &SizeSpec,
    group: &SourceGroup,
    source: &SourceFile,
    counter: &AtomicUsize,
) -> Result<(PathBuf, UnitOutcome), ProcessError> {
    let dest = destination(
        &source.path,
        &source.dest,
        spec,
        group.custom_dest.as_deref(),
        &group.cwd,
    )?;
    let outcome = execute_unit(engine, spec, &source.path, &dest, counter)?;
    Ok((dest, outcome))
}
