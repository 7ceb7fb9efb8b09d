//! Link-state routing scenario runner.
//!
//! Builds an in-memory network of link-state routers from a scenario file,
//! drives its clock tick by tick, applies the timed link events and prints
//! every router's forwarding table at the end.

use anyhow::{Context, Result};
use bytes::Bytes;
use clap::{Parser, ValueEnum};
use lsr_node::{MemoryNetwork, NetworkConfig, NodeStats, Trace, TraceOutcome};
use lsr_routing::ForwardingEntry;
use lsr_wire::{Address, SequenceNumber};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod config;
#[macro_use]
mod logging;

use config::{Scenario, ScenarioEvent};
use logging::LsrLogFormatter;

/// Output format for the final report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

/// Link-state routing simulator
#[derive(Parser, Debug)]
#[command(
    name = "lsr",
    version,
    about = "Run a link-state routing scenario on an in-memory network"
)]
struct Args {
    /// Scenario file (YAML)
    #[arg(long, default_value = "scenario.yaml")]
    scenario: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Real time to wait between ticks, e.g. 50ms
    #[arg(long, default_value = "0s")]
    pace: humantime::Duration,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

#[derive(Debug, Serialize)]
struct NodeReport {
    address: Address,
    sequence_number: SequenceNumber,
    routes: Vec<ForwardingEntry>,
    stats: NodeStats,
}

#[derive(Debug, Serialize)]
struct TraceReport {
    at_ms: u64,
    from: Address,
    to: Address,
    trace: Trace,
}

#[derive(Debug, Serialize)]
struct Report {
    end_ms: u64,
    transmissions: u64,
    nodes: Vec<NodeReport>,
    traces: Vec<TraceReport>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut env_filter = EnvFilter::new("warn");
    for target in ["lsr", "lsr_wire", "lsr_topology", "lsr_routing", "lsr_node"] {
        env_filter = env_filter.add_directive(format!("{}={}", target, args.log_level).parse()?);
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .event_format(LsrLogFormatter::new("lsr"))
        .init();

    component_info!("cli", "Starting lsr v{}", env!("CARGO_PKG_VERSION"));

    let scenario = Scenario::load_from_file(&args.scenario)?;
    let mut network = build_network(&scenario)?;
    let traces = run(&mut network, &scenario, args.pace.into()).await?;
    let report = build_report(&network, &scenario, traces);

    match args.output {
        OutputFormat::Table => print_table(&network, &report),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to serialize report")?
        ),
    }

    Ok(())
}

fn build_network(scenario: &Scenario) -> Result<MemoryNetwork> {
    let mut network = MemoryNetwork::new(NetworkConfig {
        heartbeat_interval_ms: scenario.heartbeat_ms,
        ..NetworkConfig::default()
    });

    for node in &scenario.nodes {
        network
            .add_node(node.clone())
            .with_context(|| format!("failed to add node {}", node))?;
    }
    for link in &scenario.links {
        network
            .add_link(&link.a, &link.b, link.cost)
            .with_context(|| format!("failed to add link {} <-> {}", link.a, link.b))?;
    }

    let frames = network.deliver_all()?;
    component_info!(
        "net",
        "Initial flooding settled after {} frames ({} nodes, {} links)",
        frames,
        scenario.nodes.len(),
        network.link_count()
    );

    Ok(network)
}

async fn run(
    network: &mut MemoryNetwork,
    scenario: &Scenario,
    pace: Duration,
) -> Result<Vec<TraceReport>> {
    let timeline = scenario.timeline();
    let mut pending = timeline.iter().peekable();
    let mut traces = Vec::new();
    let mut now = 0;

    while now <= scenario.end_ms {
        while let Some(event) = pending.next_if(|event| event.at_ms() <= now) {
            if let Some(trace) = apply_event(network, event)? {
                traces.push(trace);
            }
        }

        network.advance_to(now);
        let frames = network.deliver_all()?;
        if frames > 0 {
            component_debug!("net", "t={}ms: delivered {} frames", now, frames);
        }

        if !pace.is_zero() {
            tokio::time::sleep(pace).await;
        }

        match now.checked_add(scenario.tick_ms) {
            Some(next) => now = next,
            None => break,
        }
    }

    for event in pending {
        component_warn!(
            "cli",
            "Event at {}ms is past the end of the run ({}ms), skipped",
            event.at_ms(),
            scenario.end_ms
        );
    }

    Ok(traces)
}

fn apply_event(network: &mut MemoryNetwork, event: &ScenarioEvent) -> Result<Option<TraceReport>> {
    match event {
        ScenarioEvent::Add { at_ms, a, b, cost } => {
            component_info!("net", "t={}ms: adding link {} <-> {} (cost {})", at_ms, a, b, cost);
            network
                .add_link(a, b, *cost)
                .with_context(|| format!("event at {}ms failed", at_ms))?;
        }
        ScenarioEvent::Remove { at_ms, a, b } => {
            component_info!("net", "t={}ms: removing link {} <-> {}", at_ms, a, b);
            network
                .remove_link(a, b)
                .with_context(|| format!("event at {}ms failed", at_ms))?;
        }
        ScenarioEvent::Send {
            at_ms,
            from,
            to,
            payload,
        } => {
            let disposition = network
                .send_data(from, to, Bytes::from(payload.clone().into_bytes()))
                .with_context(|| format!("event at {}ms failed", at_ms))?;
            component_info!("net", "t={}ms: {} -> {}: {:?}", at_ms, from, to, disposition);
        }
        ScenarioEvent::Trace { at_ms, from, to } => {
            let trace = network
                .traceroute(from, to)
                .with_context(|| format!("event at {}ms failed", at_ms))?;
            if trace.outcome != TraceOutcome::Reached {
                component_warn!("net", "t={}ms: no path from {} to {}", at_ms, from, to);
            }
            return Ok(Some(TraceReport {
                at_ms: *at_ms,
                from: from.clone(),
                to: to.clone(),
                trace,
            }));
        }
    }
    Ok(None)
}

fn build_report(network: &MemoryNetwork, scenario: &Scenario, traces: Vec<TraceReport>) -> Report {
    let nodes = network
        .routers()
        .map(|router| NodeReport {
            address: router.address().clone(),
            sequence_number: router.sequence_number(),
            routes: router.forwarding_table().iter().cloned().collect(),
            stats: router.stats().clone(),
        })
        .collect();

    Report {
        end_ms: scenario.end_ms,
        transmissions: network.transmissions(),
        nodes,
        traces,
    }
}

fn print_table(network: &MemoryNetwork, report: &Report) {
    for router in network.routers() {
        println!("{}", router);
    }

    for entry in &report.traces {
        let hops: Vec<&str> = entry.trace.hops.iter().map(Address::as_str).collect();
        println!(
            "trace t={}ms {} -> {}: {} ({:?})",
            entry.at_ms,
            entry.from,
            entry.to,
            hops.join(" -> "),
            entry.trace.outcome
        );
    }

    println!(
        "{} frames transmitted by t={}ms",
        report.transmissions, report.end_ms
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Scenario {
        serde_yaml::from_str(
            r#"
heartbeat_ms: 1000
tick_ms: 100
end_ms: 1500
nodes: [A, B, C]
links:
  - { a: A, b: B }
  - { a: B, b: C }
  - { a: C, b: A, cost: 5 }
events:
  - { action: trace, at_ms: 0, from: A, to: C }
  - { action: remove, at_ms: 500, a: A, b: B }
  - { action: trace, at_ms: 600, from: A, to: B }
  - { action: send, at_ms: 700, from: B, to: A, payload: ping }
  - { action: trace, at_ms: 9000, from: A, to: B }
"#,
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_applies_timeline() {
        let scenario = scenario();
        let mut network = build_network(&scenario).unwrap();

        let started = tokio::time::Instant::now();
        let traces = run(&mut network, &scenario, Duration::from_millis(10))
            .await
            .unwrap();
        // 16 ticks from 0 to 1500 inclusive
        assert!(started.elapsed() >= Duration::from_millis(160));

        assert_eq!(traces.len(), 2);
        assert_eq!(
            traces[0].trace.hops,
            vec![Address::from("A"), Address::from("B"), Address::from("C")]
        );
        assert_eq!(
            traces[1].trace.hops,
            vec![Address::from("A"), Address::from("C"), Address::from("B")]
        );
        assert_eq!(network.delivered(&Address::from("A")).len(), 1);

        let report = build_report(&network, &scenario, traces);
        assert_eq!(report.nodes.len(), 3);
        let a = &report.nodes[0];
        assert_eq!(a.address, Address::from("A"));
        assert_eq!(a.routes.len(), 2);
        assert!(a.routes.iter().all(|route| route.total_cost >= 5));
    }

    #[tokio::test]
    async fn test_run_stops_at_clock_limit() {
        let mut scenario = scenario();
        scenario.events.clear();
        scenario.tick_ms = 1 << 63;
        scenario.end_ms = u64::MAX;
        let mut network = build_network(&scenario).unwrap();

        let traces = run(&mut network, &scenario, Duration::ZERO).await.unwrap();
        assert!(traces.is_empty());
        assert_eq!(network.router(&Address::from("A")).unwrap().last_refresh(), 1 << 63);
    }

    #[test]
    fn test_unknown_link_endpoint_fails() {
        let mut scenario = scenario();
        scenario.links.push(config::LinkSpec {
            a: Address::from("A"),
            b: Address::from("Z"),
            cost: 1,
        });

        let err = build_network(&scenario).unwrap_err();
        assert!(err.to_string().contains("failed to add link A <-> Z"));
    }
}
