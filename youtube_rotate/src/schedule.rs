use std::future::Future;
use std::time::Duration;

use tracing::{error, info};

use crate::config::Config;
use crate::error::Result;
use crate::rotate::CycleOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Wait(Duration),
    Stop,
}

/// Run now, wait, repeat. A failed cycle is retried after the shorter
/// `retry_interval`; a declined one ends the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub run_interval: Duration,
    pub retry_interval: Duration,
    /// `None` runs forever.
    pub max_cycles: Option<usize>,
}

impl Schedule {
    pub fn from_config(config: &Config) -> Self {
        Schedule {
            run_interval: config.run_interval(),
            retry_interval: config.retry_interval(),
            max_cycles: None,
        }
    }

    pub fn once(mut self) -> Self {
        self.max_cycles = Some(1);
        self
    }

    pub fn next_step(&self, outcome: &Result<CycleOutcome>) -> Step {
        match outcome {
            Ok(CycleOutcome::Declined) => Step::Stop,
            Ok(_) => Step::Wait(self.run_interval),
            Err(_) => Step::Wait(self.retry_interval),
        }
    }

    /// Drives `cycle` until it is declined or `max_cycles` runs have happened,
    /// returning the last outcome. Errors never escape; they only shorten the wait.
    pub async fn run<F, Fut>(&self, mut cycle: F) -> Option<CycleOutcome>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<CycleOutcome>>,
    {
        let mut runs = 0;
        loop {
            let outcome = cycle().await;
            runs += 1;

            match &outcome {
                Ok(CycleOutcome::Completed(report)) => info!(
                    moved = report.moved,
                    failed = report.failed,
                    quota_exhausted = report.quota_exhausted,
                    "rotation finished"
                ),
                Ok(CycleOutcome::NothingToDo) => info!("nothing to rotate"),
                Ok(CycleOutcome::Declined) => info!("rotation declined"),
                Err(err) => error!("cycle failed: {}", err),
            }

            let step = self.next_step(&outcome);
            if self.max_cycles.is_some_and(|max| runs >= max) || step == Step::Stop {
                return outcome.ok();
            }

            if let Step::Wait(delay) = step {
                info!("next run in {}s", delay.as_secs());
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::rotate::RotationReport;
    use tokio::time::Instant;

    fn schedule() -> Schedule {
        Schedule {
            run_interval: Duration::from_secs(3600),
            retry_interval: Duration::from_secs(300),
            max_cycles: None,
        }
    }

    #[test]
    fn waits_depend_on_outcome() {
        let s = schedule();
        let done = Ok(CycleOutcome::Completed(RotationReport::default()));
        assert_eq!(s.next_step(&done), Step::Wait(Duration::from_secs(3600)));
        assert_eq!(
            s.next_step(&Ok(CycleOutcome::NothingToDo)),
            Step::Wait(Duration::from_secs(3600))
        );
        assert_eq!(
            s.next_step(&Err(Error::Auth("expired".into()))),
            Step::Wait(Duration::from_secs(300))
        );
        assert_eq!(s.next_step(&Ok(CycleOutcome::Declined)), Step::Stop);
    }

    #[test]
    fn from_config_intervals() {
        let s = Schedule::from_config(&Config::default());
        assert_eq!(s, schedule());
        assert_eq!(s.once().max_cycles, Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn failure_backs_off_then_success_waits_long() {
        let start = Instant::now();
        let mut runs = Vec::new();
        let mut outcomes = vec![
            Err(Error::Auth("no token".into())),
            Ok(CycleOutcome::NothingToDo),
            Ok(CycleOutcome::Declined),
        ]
        .into_iter();

        let last = schedule()
            .run(|| {
                runs.push(start.elapsed().as_secs());
                let next = outcomes.next().unwrap();
                async move { next }
            })
            .await;

        assert_eq!(last, Some(CycleOutcome::Declined));
        assert_eq!(runs, [0, 300, 300 + 3600]);
    }

    #[tokio::test(start_paused = true)]
    async fn once_does_not_sleep() {
        let start = Instant::now();
        let last = schedule()
            .once()
            .run(|| async { Err(Error::Auth("denied".into())) })
            .await;

        assert_eq!(last, None);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
