use chrono::{DateTime, FixedOffset, Local};

/// Wall-clock abstraction used to stamp conversion reports.
///
/// - now(): current local time with its UTC offset
/// - stamp(): RFC 3339 text at second precision, the form written into reports
pub trait Clock {
    fn now(&self) -> DateTime<FixedOffset>;

    /// RFC 3339 timestamp truncated to whole seconds.
    fn stamp(&self) -> String {
        self.now()
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, false)
    }
}

/// Default clock backed by the system's local time zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Clock frozen at a single instant.
///
/// Conversions stamped with a `FixedClock` produce byte-identical reports,
/// which is what determinism checks compare.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    at: DateTime<FixedOffset>,
}

impl FixedClock {
    pub fn new(at: DateTime<FixedOffset>) -> Self {
        Self { at }
    }

    /// Parse an RFC 3339 string; returns None when it is not valid.
    pub fn parse(rfc3339: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(rfc3339).ok().map(Self::new)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.at
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<FixedOffset> {
        (**self).now()
    }
}
