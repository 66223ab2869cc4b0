//! Run accounting reported at the end of a scrape.

use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub rounds: u32,
    pub collected: usize,
    pub enriched: usize,
    pub degraded: usize,
    pub elapsed: Duration,
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scrape complete in {:.1}s", self.elapsed.as_secs_f64())?;
        writeln!(f, "  Scroll rounds:   {}", self.rounds)?;
        writeln!(f, "  Posts collected: {}", self.collected)?;
        writeln!(
            f,
            "  Posts enriched:  {} ({} without counts)",
            self.enriched, self.degraded
        )
    }
}
