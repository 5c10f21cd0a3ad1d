//! Counters produced by a build, mirroring the original engine's
//! end-of-build statistics dump.

use std::fmt;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildStatistics {
    pub base_vcs: u64,
    pub pattern_vcs: u64,
    pub and_attempts: u64,
    pub and_successes: u64,
    pub or_attempts: u64,
    pub or_successes: u64,
    pub fulls_processed: u64,
    pub semis_processed: u64,
    pub shrunk: u64,
    pub killed: u64,
}

impl BuildStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, other: &BuildStatistics) {
        self.base_vcs += other.base_vcs;
        self.pattern_vcs += other.pattern_vcs;
        self.and_attempts += other.and_attempts;
        self.and_successes += other.and_successes;
        self.or_attempts += other.or_attempts;
        self.or_successes += other.or_successes;
        self.fulls_processed += other.fulls_processed;
        self.semis_processed += other.semis_processed;
        self.shrunk += other.shrunk;
        self.killed += other.killed;
    }
}

impl fmt::Display for BuildStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[base={}", self.base_vcs)?;
        writeln!(f, "pattern={}", self.pattern_vcs)?;
        writeln!(f, "and={}/{}", self.and_successes, self.and_attempts)?;
        writeln!(f, "or={}/{}", self.or_successes, self.or_attempts)?;
        writeln!(f, "fulls={}", self.fulls_processed)?;
        writeln!(f, "semis={}", self.semis_processed)?;
        writeln!(f, "shrunk={}", self.shrunk)?;
        write!(f, "killed={}]", self.killed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_sums_fields() {
        let mut a = BuildStatistics { base_vcs: 1, and_successes: 2, ..Default::default() };
        let b = BuildStatistics { base_vcs: 3, and_successes: 4, ..Default::default() };
        a.merge(&b);
        assert_eq!(a.base_vcs, 4);
        assert_eq!(a.and_successes, 6);
    }

    #[test]
    fn display_is_bracketed() {
        let stats = BuildStatistics { base_vcs: 5, and_attempts: 2, and_successes: 1, ..Default::default() };
        let rendered = stats.to_string();
        assert!(rendered.starts_with('['));
        assert!(rendered.ends_with(']'));
        assert!(rendered.contains("and=1/2"));
    }
}
