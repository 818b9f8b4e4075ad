use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

const TAG_SHIFT: u32 = 62;
const PAYLOAD_MASK: u64 = (1 << TAG_SHIFT) - 1;

const TAG_UNAVAILABLE: u64 = 0;
const TAG_LOCAL: u64 = 1;
const TAG_TIMED_OUT: u64 = 2;
const TAG_MEASURED: u64 = 3;

pub const TIMED_OUT_MARKER: &str = "超时";
pub const NOT_APPLICABLE_MARKER: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LatencyReading {
    Measured(u64),
    TimedOut,
    #[default]
    Unavailable,
    LocalSession,
}

impl LatencyReading {
    pub fn is_measured(&self) -> bool {
        matches!(self, Self::Measured(_))
    }

    /// Renders the reading with the given markers for the non-numeric states.
    pub fn display_with(&self, timed_out: &str, not_applicable: &str) -> String {
        match self {
            Self::Measured(ms) => format!("{}ms", ms),
            Self::LocalSession => "0ms".to_string(),
            Self::TimedOut => timed_out.to_string(),
            Self::Unavailable => not_applicable.to_string(),
        }
    }

    fn encode(self) -> u64 {
        match self {
            Self::Unavailable => TAG_UNAVAILABLE << TAG_SHIFT,
            Self::LocalSession => TAG_LOCAL << TAG_SHIFT,
            Self::TimedOut => TAG_TIMED_OUT << TAG_SHIFT,
            Self::Measured(ms) => (TAG_MEASURED << TAG_SHIFT) | ms.min(PAYLOAD_MASK),
        }
    }

    fn decode(word: u64) -> Self {
        match word >> TAG_SHIFT {
            TAG_LOCAL => Self::LocalSession,
            TAG_TIMED_OUT => Self::TimedOut,
            TAG_MEASURED => Self::Measured(word & PAYLOAD_MASK),
            _ => Self::Unavailable,
        }
    }
}

impl fmt::Display for LatencyReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_with(TIMED_OUT_MARKER, NOT_APPLICABLE_MARKER))
    }
}

/// Single-word cell holding the latest reading. Writers replace the whole
/// word, so readers on another thread see either the old or the new reading.
#[derive(Debug)]
pub struct LatencyCell {
    word: AtomicU64,
}

impl Default for LatencyCell {
    fn default() -> Self {
        Self::new(LatencyReading::Unavailable)
    }
}

impl LatencyCell {
    pub fn new(reading: LatencyReading) -> Self {
        Self {
            word: AtomicU64::new(reading.encode()),
        }
    }

    pub fn load(&self) -> LatencyReading {
        LatencyReading::decode(self.word.load(Ordering::Acquire))
    }

    pub fn store(&self, reading: LatencyReading) {
        self.word.store(reading.encode(), Ordering::Release);
    }
}

/// Read-only view of a probe's published reading, cheap to clone onto the
/// tick thread.
#[derive(Debug, Clone, Default)]
pub struct LatencyHandle {
    cell: Arc<LatencyCell>,
}

impl LatencyHandle {
    pub(crate) fn new(cell: Arc<LatencyCell>) -> Self {
        Self { cell }
    }

    pub fn read(&self) -> LatencyReading {
        self.cell.load()
    }
}
