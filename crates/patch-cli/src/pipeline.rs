//! Shared load -> route -> compile -> run pipeline behind both subcommands.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, bail};
use patch_bridge::{AudioBridge, BridgeConfig, HostLimits, TickClock};
use patch_build::{BuildOutcome, CompiledGraph, compile};
use patch_config::{Project, load_project};
use patch_core::{EdgeId, SampleSlot};
use patch_registry::NodeRegistry;
use patch_routing::{RouteCache, RoutingConfig};
use patch_runtime::{Runtime, RuntimeConfig};
use tracing::info;

fn build_registry() -> anyhow::Result<NodeRegistry> {
    NodeRegistry::new().map_err(|errors| {
        for err in &errors {
            eprintln!("registry error: {err} [{}]", err.code());
        }
        anyhow::anyhow!("{} builtin registry error(s)", errors.len())
    })
}

fn read_project(file: &Path) -> anyhow::Result<Project> {
    let text = std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let (project, warnings) = load_project(&text).with_context(|| format!("loading project from {}", file.display()))?;
    for warning in &warnings {
        tracing::warn!(code = warning.code(), "project load warning");
    }
    Ok(project)
}

fn route_and_compile(project: &Project, registry: &NodeRegistry) -> anyhow::Result<BuildOutcome> {
    let mut cache = RouteCache::new();
    let routed = cache.route_batch(&project.graph, registry, &RoutingConfig::default(), None);

    let mut delays: HashMap<EdgeId, f64> = HashMap::with_capacity(routed.len());
    let mut route_failures = Vec::new();
    for (edge_id, result) in routed {
        match result {
            Ok(route) => {
                delays.insert(edge_id, route.delay_ticks(&RoutingConfig::default()));
            }
            Err(err) => route_failures.push((edge_id, err)),
        }
    }
    if !route_failures.is_empty() {
        for (edge_id, err) in &route_failures {
            eprintln!("route error on edge `{edge_id}`: {err} [{}]", err.code());
        }
        bail!("{} edge(s) failed to route", route_failures.len());
    }

    Ok(compile(&project.graph, registry, &delays))
}

fn report_outcome(outcome: &BuildOutcome) -> anyhow::Result<&CompiledGraph> {
    for err in &outcome.errors {
        eprintln!("build error: {err} [{}]", err.code());
    }
    match &outcome.graph {
        Some(graph) if outcome.ok => Ok(graph),
        _ => bail!("{} build error(s); graph did not compile", outcome.errors.len()),
    }
}

/// Loads, routes, and compiles a project file, printing every error found.
/// Exits non-zero (via the returned `Err`) if the project doesn't build.
pub fn validate(file: &Path) -> anyhow::Result<()> {
    let project = read_project(file)?;
    let registry = build_registry()?;
    let outcome = route_and_compile(&project, &registry)?;
    report_outcome(&outcome)?;
    println!("ok: {} node(s), {} edge(s)", project.graph.nodes.len(), project.graph.edges.len());
    Ok(())
}

fn sample_table(project: &Project) -> patch_bridge::SampleTable {
    project.samples.clone().unwrap_or_else(|| std::array::from_fn(|i| Some(SampleSlot { s: "bd".into(), n: i as u32 })))
}

/// Validates a project, then drives it through a [`Runtime`] and
/// [`AudioBridge`] for one bounded window, printing every encoded event as
/// a JSON line on stdout. This is a smoke test, not a realtime host: one
/// `on_tick` call pulls the entire `window_sec` horizon at once.
pub fn simulate(file: &Path, window_sec: f64, bpm_override: Option<f64>) -> anyhow::Result<()> {
    let project = read_project(file)?;
    let registry = build_registry()?;
    let outcome = route_and_compile(&project, &registry)?;
    let graph = report_outcome(&outcome)?;

    let mut runtime = Runtime::new(graph, &registry, RuntimeConfig::default());
    runtime.reset_pulses();

    let bpm = bpm_override.or_else(|| project.settings.as_ref().map(|s| s.tempo)).filter(|b| *b > 0.0).unwrap_or(120.0);
    let clock = TickClock::new(bpm, 0.0);
    let mut bridge = AudioBridge::new(clock, BridgeConfig { lookahead_sec: 0.0, horizon_sec: window_sec });
    let samples = sample_table(&project);

    let (events, bridge_warnings, runtime_warnings) =
        bridge.on_tick(&mut runtime, &registry, &samples, &HostLimits::default(), 0.0, 0.0);

    for warning in &runtime_warnings {
        tracing::warn!(code = warning.code(), "runtime warning");
    }
    for warning in &bridge_warnings {
        tracing::warn!(code = warning.code(), "bridge warning");
    }

    info!(bpm, window_sec, emitted = events.len(), "simulation window complete");
    for event in &events {
        println!("{}", serde_json::to_string(event)?);
    }

    Ok(())
}
