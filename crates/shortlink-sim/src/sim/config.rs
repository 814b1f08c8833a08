use anyhow::bail;
use clap::Parser;
use core::time::Duration;
use shortlink::{AllocatorConfig, DEFAULT_TOKEN_LENGTH, MAX_RETRIES, RAISE_INTERVAL, validate_hint};

/// Runtime configuration for the `shortlink-sim` binary.
///
/// Every value can come from a flag, an environment variable or a `.env`
/// file. The defaults run one writer per CPU, all asking for the same short
/// hint, which is the worst case for collisions.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "shortlink-sim",
    version,
    about = "Races concurrent writers allocating short tokens against one shared store"
)]
pub struct CliArgs {
    /// Number of concurrent writer tasks.
    ///
    /// Environment variable: `WRITERS`
    #[arg(long, env = "WRITERS", default_value_t = num_cpus::get())]
    pub writers: usize,

    /// Links each writer allocates before it stops.
    ///
    /// Environment variable: `LINKS_PER_WRITER`
    #[arg(long, env = "LINKS_PER_WRITER", default_value_t = 1000)]
    pub links_per_writer: usize,

    /// Hint every writer asks for. Must be at most `TOKEN_LENGTH` ASCII
    /// alphanumeric characters; may be empty.
    ///
    /// Environment variable: `HINT`
    #[arg(long, env = "HINT", default_value_t = String::from("go"))]
    pub hint: String,

    /// Destination URL prefix; each link gets `<url>/<writer>/<n>`.
    ///
    /// Environment variable: `TARGET_URL`
    #[arg(long, env = "TARGET_URL", default_value_t = String::from("https://example.com"))]
    pub url: String,

    /// Number of characters in every token.
    ///
    /// Environment variable: `TOKEN_LENGTH`
    #[arg(long, env = "TOKEN_LENGTH", default_value_t = DEFAULT_TOKEN_LENGTH)]
    pub token_length: usize,

    /// Candidates tried per allocation before it fails as exhausted.
    ///
    /// Environment variable: `MAX_RETRIES`
    #[arg(long, env = "MAX_RETRIES", default_value_t = MAX_RETRIES)]
    pub max_retries: u32,

    /// Collisions between two widenings of the random suffix.
    ///
    /// Environment variable: `RAISE_INTERVAL`
    #[arg(long, env = "RAISE_INTERVAL", default_value_t = RAISE_INTERVAL)]
    pub raise_interval: u32,

    /// Record lifetime in days.
    ///
    /// Environment variable: `RETENTION_DAYS`
    #[arg(long, env = "RETENTION_DAYS", default_value_t = 180)]
    pub retention_days: u64,

    /// Deadline for one whole allocation, in milliseconds.
    ///
    /// Environment variable: `STORE_TIMEOUT_MS`
    #[arg(long, env = "STORE_TIMEOUT_MS", default_value_t = 500)]
    pub store_timeout_ms: u64,

    /// Seed for a reproducible random source shared by all writers. Without
    /// it every thread uses its own OS-seeded generator.
    ///
    /// Environment variable: `SEED`
    #[arg(long, env = "SEED")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub writers: usize,
    pub links_per_writer: usize,
    pub hint: String,
    pub url: String,
    pub store_timeout: Duration,
    pub seed: Option<u64>,
    pub allocator: AllocatorConfig,
}

impl SimConfig {
    pub const fn total_links(&self) -> usize {
        self.writers * self.links_per_writer
    }
}

impl TryFrom<CliArgs> for SimConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.writers == 0 {
            bail!("WRITERS must be greater than 0");
        }

        if args.raise_interval == 0 {
            bail!("RAISE_INTERVAL must be greater than 0");
        }

        if !validate_hint(&args.hint, args.token_length) {
            bail!(
                "HINT `{}` must be at most {} ASCII alphanumeric characters",
                args.hint,
                args.token_length
            );
        }

        if args.store_timeout_ms == 0 {
            bail!("STORE_TIMEOUT_MS must be greater than 0");
        }

        if args
            .writers
            .checked_mul(args.links_per_writer)
            .is_none()
        {
            bail!("WRITERS * LINKS_PER_WRITER overflows");
        }

        let retention_secs = args
            .retention_days
            .checked_mul(24 * 60 * 60)
            .ok_or_else(|| anyhow::anyhow!("Overflow in retention computation"))?;

        let allocator = AllocatorConfig {
            token_length: args.token_length,
            max_retries: args.max_retries,
            raise_interval: args.raise_interval,
            retention: Duration::from_secs(retention_secs),
        };
        allocator.validate()?;

        Ok(Self {
            writers: args.writers,
            links_per_writer: args.links_per_writer,
            hint: args.hint,
            url: args.url.trim_end_matches('/').to_owned(),
            store_timeout: Duration::from_millis(args.store_timeout_ms),
            seed: args.seed,
            allocator,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> anyhow::Result<SimConfig> {
        let args = CliArgs::try_parse_from(
            ["shortlink-sim", "--writers", "4"]
                .iter()
                .chain(extra),
        )?;
        SimConfig::try_from(args)
    }

    #[test]
    fn defaults_are_valid() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.writers, 4);
        assert_eq!(config.allocator.token_length, DEFAULT_TOKEN_LENGTH);
        assert_eq!(config.allocator.max_retries, MAX_RETRIES);
        assert_eq!(
            config.allocator.retention,
            Duration::from_secs(180 * 24 * 60 * 60)
        );
    }

    #[test]
    fn trailing_slash_is_dropped() {
        let config = parse(&["--url", "https://example.com/x/"]).unwrap();
        assert_eq!(config.url, "https://example.com/x");
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(parse(&["--token-length", "0"]).is_err());
        assert!(parse(&["--token-length", "65"]).is_err());
        assert!(parse(&["--max-retries", "0"]).is_err());
        assert!(parse(&["--raise-interval", "0"]).is_err());
        assert!(parse(&["--store-timeout-ms", "0"]).is_err());
    }

    #[test]
    fn rejects_hint_that_cannot_fit() {
        assert!(parse(&["--hint", "toolong", "--token-length", "6"]).is_err());
        assert!(parse(&["--hint", "no-dash"]).is_err());
        assert!(parse(&["--hint", "abc", "--token-length", "3"]).is_ok());
    }
}
