use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::config::MonitoringSettings;
use crate::models::PositionReport;
use crate::services::{PositionAggregator, ReportFormatter, SessionError, WatchSession};

/// Receives every report produced by a monitoring cycle.
pub trait ReportSink: Send + Sync {
    fn publish(&self, report: &PositionReport);
}

/// Prints reports to stdout, as text or JSON.
pub struct StdoutSink {
    json: bool,
}

impl StdoutSink {
    pub fn new(json: bool) -> Self {
        Self { json }
    }
}

impl ReportSink for StdoutSink {
    fn publish(&self, report: &PositionReport) {
        if self.json {
            match serde_json::to_string_pretty(report) {
                Ok(json) => println!("{}", json),
                Err(e) => error!("Failed to serialize report: {}", e),
            }
        } else {
            println!("{}", ReportFormatter::format_report(report));
        }
    }
}

/// Periodically reports on a session's active address.
pub struct MonitoringService {
    aggregator: Arc<PositionAggregator>,
    check_interval: Duration,
    first_check_delay: Duration,
}

impl MonitoringService {
    pub fn new(aggregator: Arc<PositionAggregator>, settings: &MonitoringSettings) -> Self {
        Self::with_intervals(
            aggregator,
            Duration::from_secs(settings.check_interval_seconds),
            Duration::from_secs(settings.first_check_delay_seconds),
        )
    }

    pub fn with_intervals(
        aggregator: Arc<PositionAggregator>,
        check_interval: Duration,
        first_check_delay: Duration,
    ) -> Self {
        Self {
            aggregator,
            check_interval,
            first_check_delay,
        }
    }

    /// Fetches and publishes one report for the session's active address.
    pub async fn run_cycle(
        &self,
        session: &WatchSession,
        sink: &dyn ReportSink,
    ) -> Result<PositionReport, SessionError> {
        let address = session.active().ok_or(SessionError::NoActiveAddress)?;
        let report = self.aggregator.fetch_positions(address).await;

        let failed = report.failed_markets();
        if failed > 0 {
            warn!(address = %address, failed_markets = failed, "Monitoring cycle completed with failed markets");
        }

        sink.publish(&report);
        Ok(report)
    }

    /// Runs cycles until `shutdown` resolves. Returns the number of cycles run.
    ///
    /// Nothing runs unless monitoring is switched on in the session.
    pub async fn run_until<F>(
        &self,
        session: &WatchSession,
        sink: &dyn ReportSink,
        shutdown: F,
    ) -> Result<usize, SessionError>
    where
        F: Future<Output = ()>,
    {
        let address = session.active().ok_or(SessionError::NoActiveAddress)?;
        if !session.is_monitoring() {
            info!(address = %address, "Monitoring is switched off for this session");
            return Ok(0);
        }

        info!(
            address = %address,
            interval_secs = self.check_interval.as_secs(),
            first_check_secs = self.first_check_delay.as_secs(),
            "Starting position monitoring"
        );

        let mut interval = time::interval_at(Instant::now() + self.first_check_delay, self.check_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut cycles = 0;
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!(cycles, "Stopping position monitoring");
                    break;
                }
                _ = interval.tick() => {
                    match self.run_cycle(session, sink).await {
                        Ok(_) => cycles += 1,
                        Err(e) => error!(address = %address, error = %e, "Monitoring cycle failed"),
                    }
                }
            }
        }

        Ok(cycles)
    }
}
