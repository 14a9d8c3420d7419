//! Single-pass monitor orchestration.
//!
//! # Data Flow
//! ```text
//! Resolve:  descriptors ──discovery──▶ endpoints
//! Fan-out:  one worker per endpoint, bounded by a semaphore
//! Worker:   probe ──▶ fetch ──▶ evaluate ──▶ dispatch
//! ```
//!
//! # Design Decisions
//! - Endpoint workers are independent; no failure crosses endpoints
//! - Probe and fetch race the shutdown signal; a dispatch already in
//!   flight is allowed to complete so alerts are not silently dropped
//! - Only configuration errors abort the run

use std::sync::Arc;

use chrono::Local;
use tokio::sync::{broadcast, Semaphore};
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::alert::dispatcher::AlertDispatcher;
use crate::alert::event::{format_check_time, AlertEvent, AlertRoute};
use crate::config::{validate_config, ConfigError, MonitorConfig};
use crate::discovery::lookup::HostLookup;
use crate::discovery::resolver::{ProxyDescriptor, ProxyEndpoint, Resolver};
use crate::monitor::outcome::{Disposition, EndpointOutcome, RunSummary};
use crate::probe::{LivenessProber, Probe};
use crate::status::evaluator::StatusEvaluator;
use crate::status::fetcher::{FetchOutcome, StatusFetcher};

/// Drives one terminal monitoring pass over the configured fleet.
///
/// Holds no mutable state between runs; an external scheduler re-invokes
/// the binary for each pass.
pub struct Monitor {
    descriptors: Vec<ProxyDescriptor>,
    resolver: Resolver,
    route: AlertRoute,
    prober: Arc<dyn Probe>,
    fetcher: Arc<StatusFetcher>,
    evaluator: Arc<StatusEvaluator>,
    dispatcher: Arc<AlertDispatcher>,
    max_workers: usize,
}

impl Monitor {
    /// Build a monitor from configuration. Validation runs here as well,
    /// so a malformed config is fatal before any network I/O even when the
    /// caller skipped the loader. The host lookup is injected so the
    /// discovery command can be substituted in tests.
    pub fn new(config: &MonitorConfig, lookup: Arc<dyn HostLookup>) -> Result<Self, ConfigError> {
        validate_config(config).map_err(ConfigError::Validation)?;

        let mut descriptors = Vec::with_capacity(config.proxies.len());
        for raw in &config.proxies {
            let descriptor = ProxyDescriptor::parse(raw).map_err(|e| {
                ConfigError::Validation(vec![crate::config::ValidationError::BadDescriptor {
                    descriptor: raw.clone(),
                    reason: e.to_string(),
                }])
            })?;
            descriptors.push(descriptor);
        }

        let route = AlertRoute {
            group_name: config.alerting.group_name.clone(),
            service_name: config.alerting.alert_group.clone(),
        };

        Ok(Self {
            descriptors,
            resolver: Resolver::new(lookup),
            route: route.clone(),
            prober: Arc::new(LivenessProber::new(&config.probe)),
            fetcher: Arc::new(StatusFetcher::new(&config.fetch)),
            evaluator: Arc::new(StatusEvaluator::new(
                route,
                config.excluded_hosts.iter().cloned().collect(),
            )),
            dispatcher: Arc::new(AlertDispatcher::new(&config.alerting)),
            max_workers: config.workers.max_workers,
        })
    }

    /// Replace the protocol prober, for tests that cannot speak MySQL.
    pub fn with_prober(mut self, prober: Arc<dyn Probe>) -> Self {
        self.prober = prober;
        self
    }

    /// Run one pass: resolve, then probe/fetch/evaluate/dispatch every
    /// endpoint. Endpoint failures never cross endpoints; the summary
    /// reports every outcome.
    pub async fn run(&self, shutdown: broadcast::Receiver<()>) -> RunSummary {
        let run_id = Uuid::new_v4();
        let mut summary = RunSummary::new(run_id);

        let endpoints = self.resolver.resolve(&self.descriptors).await;
        summary.resolved = endpoints.len();
        if endpoints.is_empty() {
            tracing::warn!(%run_id, "no endpoints resolved, nothing to monitor");
            return summary;
        }
        tracing::info!(%run_id, endpoints = endpoints.len(), "monitor pass starting");

        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut workers = JoinSet::new();
        for endpoint in endpoints {
            let semaphore = semaphore.clone();
            let prober = self.prober.clone();
            let fetcher = self.fetcher.clone();
            let evaluator = self.evaluator.clone();
            let dispatcher = self.dispatcher.clone();
            let route = self.route.clone();
            let shutdown = shutdown.resubscribe();

            workers.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return cancelled(endpoint),
                };
                process_endpoint(endpoint, route, prober, fetcher, evaluator, dispatcher, shutdown)
                    .await
            });
        }

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(report) => {
                    if report.alive {
                        summary.alive += 1;
                    }
                    summary.alerts_dispatched += report.alerts_dispatched;
                    summary.dispatch_failures += report.dispatch_failures;
                    summary.outcomes.push(report.outcome);
                }
                Err(e) => {
                    tracing::error!(%run_id, error = %e, "endpoint worker panicked");
                }
            }
        }

        tracing::info!(
            %run_id,
            resolved = summary.resolved,
            alive = summary.alive,
            alerts = summary.alerts_dispatched,
            dispatch_failures = summary.dispatch_failures,
            "monitor pass complete"
        );
        summary
    }
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("descriptors", &self.descriptors)
            .field("max_workers", &self.max_workers)
            .finish_non_exhaustive()
    }
}

/// Everything one worker hands back to the orchestrator.
struct WorkerReport {
    outcome: EndpointOutcome,
    alive: bool,
    alerts_dispatched: usize,
    dispatch_failures: usize,
}

fn cancelled(endpoint: ProxyEndpoint) -> WorkerReport {
    WorkerReport {
        outcome: EndpointOutcome {
            endpoint,
            disposition: Disposition::Cancelled,
        },
        alive: false,
        alerts_dispatched: 0,
        dispatch_failures: 0,
    }
}

async fn process_endpoint(
    endpoint: ProxyEndpoint,
    route: AlertRoute,
    prober: Arc<dyn Probe>,
    fetcher: Arc<StatusFetcher>,
    evaluator: Arc<StatusEvaluator>,
    dispatcher: Arc<AlertDispatcher>,
    mut shutdown: broadcast::Receiver<()>,
) -> WorkerReport {
    // Probe
    // `Ok(_)` keeps a dropped sender from reading as a shutdown signal
    let alive = tokio::select! {
        alive = prober.is_alive(&endpoint) => alive,
        Ok(_) = shutdown.recv() => return cancelled(endpoint),
    };
    let check_time = Local::now();

    if !alive {
        tracing::warn!(
            host = %endpoint.host,
            port = endpoint.liveness_port,
            check_time = %format_check_time(check_time),
            "proxy liveness check failed"
        );
        let event = AlertEvent::liveness_failure(&route, &endpoint, check_time);
        let (dispatched, failed) = dispatch_one(&dispatcher, &event).await;
        return WorkerReport {
            outcome: EndpointOutcome {
                endpoint,
                disposition: Disposition::NotAlive,
            },
            alive: false,
            alerts_dispatched: dispatched,
            dispatch_failures: failed,
        };
    }
    tracing::info!(
        host = %endpoint.host,
        port = endpoint.liveness_port,
        check_time = %format_check_time(check_time),
        "proxy liveness ok"
    );

    // Fetch
    let fetched = tokio::select! {
        outcome = fetcher.fetch(&endpoint) => outcome,
        Ok(_) = shutdown.recv() => return cancelled(endpoint),
    };
    let check_time = Local::now();

    let body = match fetched {
        FetchOutcome::Unreachable(reason) => {
            tracing::warn!(
                host = %endpoint.host,
                management_port = endpoint.management_port,
                reason = %reason,
                check_time = %format_check_time(check_time),
                "management plane unreachable"
            );
            let event = AlertEvent::management_down(&route, &endpoint, check_time);
            let (dispatched, failed) = dispatch_one(&dispatcher, &event).await;
            return WorkerReport {
                outcome: EndpointOutcome {
                    endpoint,
                    disposition: Disposition::ManagementDown(reason),
                },
                alive: true,
                alerts_dispatched: dispatched,
                dispatch_failures: failed,
            };
        }
        FetchOutcome::Body(body) => body,
    };

    // Evaluate + dispatch
    let evaluation = match evaluator.evaluate(&endpoint, &body, check_time) {
        Ok(evaluation) => evaluation,
        Err(e) => {
            tracing::warn!(
                host = %endpoint.host,
                management_port = endpoint.management_port,
                error = %e,
                "health report did not parse"
            );
            return WorkerReport {
                outcome: EndpointOutcome {
                    endpoint,
                    disposition: Disposition::ReportUnparseable(e.to_string()),
                },
                alive: true,
                alerts_dispatched: 0,
                dispatch_failures: 0,
            };
        }
    };

    if evaluation.empty_report {
        tracing::warn!(
            host = %endpoint.host,
            management_port = endpoint.management_port,
            "health report contained zero backend groups"
        );
    }
    for record in &evaluation.healthy {
        tracing::info!(
            host = %endpoint.host,
            group = %record.group,
            backend_host = %record.host,
            backend_port = record.port,
            status = %record.desc,
            check_time = %format_check_time(check_time),
            "backend status ok"
        );
    }

    let mut alerts_dispatched = 0;
    let mut dispatch_failures = 0;
    for event in &evaluation.alerts {
        let (dispatched, failed) = dispatch_one(&dispatcher, event).await;
        alerts_dispatched += dispatched;
        dispatch_failures += failed;
    }

    WorkerReport {
        outcome: EndpointOutcome {
            endpoint,
            disposition: Disposition::Evaluated {
                faults: evaluation.alerts.len(),
                healthy: evaluation.healthy.len(),
                empty_report: evaluation.empty_report,
            },
        },
        alive: true,
        alerts_dispatched,
        dispatch_failures,
    }
}

/// Dispatch one event, mapping the result onto (dispatched, failed) counts.
/// Failures are logged in full and never propagate; the rest of the run
/// must not be affected.
async fn dispatch_one(dispatcher: &AlertDispatcher, event: &AlertEvent) -> (usize, usize) {
    match dispatcher.dispatch(event).await {
        Ok(confirmation) => {
            tracing::info!(
                subject = %event.subject,
                confirmation = %confirmation,
                "alert dispatched"
            );
            (1, 0)
        }
        Err(e) => {
            tracing::error!(
                subject = %event.subject,
                error = %e,
                "alert dispatch failed"
            );
            (0, 1)
        }
    }
}
