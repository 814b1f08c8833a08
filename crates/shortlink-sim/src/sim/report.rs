use crate::sim::writer::Outcome;
use anyhow::bail;
use core::time::Duration;
use shortlink::{AllocError, RecordStore, Resolver, Token};
use std::collections::HashSet;

/// Tally of every writer's outcomes.
#[derive(Debug, Default)]
pub struct Report {
    pub allocated: Vec<(Token, String)>,
    pub exhausted: usize,
    pub unavailable: usize,
    pub partial: usize,
    pub cancelled: usize,
    pub invalid: usize,
    pub elapsed: Duration,
}

impl Report {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Allocated { token, url } => self.allocated.push((token, url)),
            Outcome::Failed(AllocError::Exhausted { .. }) => self.exhausted += 1,
            Outcome::Failed(AllocError::StoreUnavailable(_)) => self.unavailable += 1,
            Outcome::Failed(AllocError::PartialWriteFailure { .. }) => self.partial += 1,
            Outcome::Failed(AllocError::Cancelled { .. }) => self.cancelled += 1,
            Outcome::Failed(AllocError::InvalidHint { .. } | AllocError::InvalidConfig(_)) => {
                self.invalid += 1;
            }
            Outcome::Failed(_) => self.unavailable += 1,
        }
    }

    pub fn attempted(&self) -> usize {
        self.allocated.len()
            + self.exhausted
            + self.unavailable
            + self.partial
            + self.cancelled
            + self.invalid
    }

    /// Allocations per second over the whole run.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.allocated.len() as f64 / secs
        }
    }

    /// Checks that no token was handed out twice and that every allocated
    /// token resolves to the URL it was allocated for with an access count
    /// of one.
    ///
    /// # Errors
    ///
    /// Fails on the first duplicate, missing or mismatched record, or on a
    /// store error.
    pub async fn verify<S>(&self, resolver: &Resolver<S>) -> anyhow::Result<()>
    where
        S: RecordStore,
    {
        let mut seen = HashSet::with_capacity(self.allocated.len());
        for (token, _) in &self.allocated {
            if !seen.insert(token) {
                bail!("token `{token}` was allocated more than once");
            }
        }

        for (token, url) in &self.allocated {
            let Some(resolution) = resolver.resolve(token).await? else {
                bail!("allocated token `{token}` has no record");
            };
            if &resolution.url != url {
                bail!(
                    "token `{token}` resolves to `{}`, expected `{url}`",
                    resolution.url
                );
            }
            if resolution.count != Some(1) {
                bail!(
                    "token `{token}` has access count {:?} after its first resolution",
                    resolution.count
                );
            }
        }

        Ok(())
    }

    pub fn log_summary(&self) {
        tracing::info!(
            attempted = self.attempted(),
            allocated = self.allocated.len(),
            exhausted = self.exhausted,
            unavailable = self.unavailable,
            partial = self.partial,
            cancelled = self.cancelled,
            invalid = self.invalid,
            elapsed_ms = self.elapsed.as_millis() as u64,
            per_sec = self.throughput().round() as u64,
            "simulation finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shortlink::{Allocator, AllocatorConfig, MemoryStore, StoreError};

    #[test]
    fn tallies_each_failure_kind() {
        let mut report = Report::default();
        report.record(Outcome::Failed(AllocError::Exhausted { attempts: 20 }));
        report.record(Outcome::Failed(AllocError::StoreUnavailable(StoreError::Timeout)));
        report.record(Outcome::Failed(AllocError::Cancelled { claimed: None }));
        report.record(Outcome::Failed(AllocError::Cancelled { claimed: None }));

        assert_eq!(report.exhausted, 1);
        assert_eq!(report.unavailable, 1);
        assert_eq!(report.cancelled, 2);
        assert_eq!(report.attempted(), 4);
    }

    #[tokio::test]
    async fn verify_accepts_a_clean_run() {
        let store = MemoryStore::new();
        let allocator = Allocator::new(store.clone(), AllocatorConfig::default());
        let mut report = Report::default();
        for n in 0..10 {
            let url = format!("https://example.com/{n}");
            let token = allocator.allocate("ab", &url).await.unwrap();
            report.record(Outcome::Allocated { token, url });
        }

        report.verify(&Resolver::new(store)).await.unwrap();
    }

    #[tokio::test]
    async fn verify_rejects_duplicates() {
        let store = MemoryStore::new();
        let allocator = Allocator::new(store.clone(), AllocatorConfig::default());
        let url = "https://example.com".to_owned();
        let token = allocator.allocate("abcdef", &url).await.unwrap();

        let mut report = Report::default();
        report.record(Outcome::Allocated {
            token: token.clone(),
            url: url.clone(),
        });
        report.record(Outcome::Allocated { token, url });

        assert!(report.verify(&Resolver::new(store)).await.is_err());
    }

    #[tokio::test]
    async fn verify_rejects_missing_records() {
        let store = MemoryStore::new();
        let mut report = Report::default();
        report.record(Outcome::Allocated {
            token: Token::parse("abcdef", 6).unwrap(),
            url: "https://example.com".to_owned(),
        });

        assert!(report.verify(&Resolver::new(store)).await.is_err());
    }
}
