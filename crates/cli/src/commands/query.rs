use crate::di::DohServices;
use ferrous_doh_application::ports::{DnsClient, UpstreamHealthPort, UpstreamHealthReport};
use ferrous_doh_application::QueryContext;
use ferrous_doh_infrastructure::dns::forwarding::ResponseSummary;
use ferrous_doh_infrastructure::dns::{MessageBuilder, ResponseParser, UpstreamMetrics};
use serde::Serialize;
use std::time::Instant;
use tracing::{error, info};

#[derive(Serialize)]
struct QueryOutcome {
    attempt: u32,
    latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<ResponseSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct UpstreamRow {
    #[serde(flatten)]
    health: UpstreamHealthReport,
    requests: u64,
    mean_latency_ms: f64,
}

#[derive(Serialize)]
struct QueryReport {
    domain: String,
    record_type: String,
    outcomes: Vec<QueryOutcome>,
    upstreams: Vec<UpstreamRow>,
    healthcheck_broken: u64,
}

pub async fn run(
    services: DohServices,
    domain: &str,
    record_type: &str,
    count: u32,
    json: bool,
) -> anyhow::Result<()> {
    let record_type = MessageBuilder::parse_record_type(record_type)?;
    let request = MessageBuilder::build_query(domain, record_type)?;

    let DohServices {
        client,
        metrics,
        collector,
    } = services;

    let mut outcomes = Vec::with_capacity(count as usize);
    for attempt in 1..=count {
        let start = Instant::now();
        let result = client.query(&QueryContext::background(), &request).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let outcome = match result {
            Ok(message) => QueryOutcome {
                attempt,
                latency_ms,
                response: Some(ResponseParser::summarize(&message)),
                error: None,
            },
            Err(e) => {
                error!(domain, attempt, error = %e, "Query failed");
                QueryOutcome {
                    attempt,
                    latency_ms,
                    response: None,
                    error: Some(e.to_string()),
                }
            }
        };
        outcomes.push(outcome);
    }

    let health = client.upstream_health();

    // Last emitter handle goes with the client; the collector then drains and exits.
    drop(client);
    if let Err(e) = collector.await {
        error!(error = %e, "Metrics collector task failed");
    }

    let report = QueryReport {
        domain: domain.to_string(),
        record_type: record_type.to_string(),
        outcomes,
        upstreams: upstream_rows(health, &metrics),
        healthcheck_broken: metrics.healthcheck_broken_count(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    let failed = report.outcomes.iter().filter(|o| o.error.is_some()).count();
    info!(queries = count, failed, "Done");
    if failed > 0 && failed == report.outcomes.len() {
        anyhow::bail!("all {} queries failed", failed);
    }
    Ok(())
}

fn upstream_rows(health: Vec<UpstreamHealthReport>, metrics: &UpstreamMetrics) -> Vec<UpstreamRow> {
    health
        .into_iter()
        .map(|health| {
            let stats = metrics.duration_stats(&health.upstream);
            UpstreamRow {
                requests: metrics.request_count(&health.upstream),
                mean_latency_ms: stats.mean().as_secs_f64() * 1000.0,
                health,
            }
        })
        .collect()
}

fn print_report(report: &QueryReport) {
    for outcome in &report.outcomes {
        match (&outcome.response, &outcome.error) {
            (Some(response), _) => {
                println!(
                    ";; #{} {} {} -> {} ({} ms){}",
                    outcome.attempt,
                    report.domain,
                    report.record_type,
                    response.rcode,
                    outcome.latency_ms,
                    if response.truncated { " [truncated]" } else { "" }
                );
                for answer in &response.answers {
                    println!("{}", answer);
                }
            }
            (None, Some(error)) => {
                println!(";; #{} error: {} ({} ms)", outcome.attempt, error, outcome.latency_ms);
            }
            (None, None) => {}
        }
    }

    println!();
    println!(
        "{:<48} {:<10} {:>8} {:>9} {:>10}",
        "UPSTREAM", "STATUS", "FAILURES", "REQUESTS", "MEAN MS"
    );
    for row in &report.upstreams {
        println!(
            "{:<48} {:<10} {:>8} {:>9} {:>10.1}",
            row.health.upstream,
            row.health.status.as_str(),
            row.health.failures,
            row.requests,
            row.mean_latency_ms
        );
    }
    if report.healthcheck_broken > 0 {
        println!(
            "\nall upstreams were marked down {} time(s)",
            report.healthcheck_broken
        );
    }
}
