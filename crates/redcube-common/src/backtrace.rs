/// Contains the backtrace information if available.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BackTrace {
    inner: String,
}

impl BackTrace {
    /// Creates a new backtrace from the current thread.
    ///
    /// The capture is forced, it doesn't depend on `RUST_BACKTRACE`.
    pub fn capture() -> Self {
        Self {
            #[cfg(feature = "std")]
            inner: format!("{}", std::backtrace::Backtrace::force_capture()),
            #[cfg(not(feature = "std"))]
            inner: "No backtrace available".to_string(),
        }
    }

    /// The rendered frames.
    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl core::fmt::Debug for BackTrace {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("{}", self.inner))
    }
}

impl core::fmt::Display for BackTrace {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("{}", self.inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_is_not_empty() {
        let backtrace = BackTrace::capture();

        assert!(!backtrace.as_str().is_empty());
        assert_eq!(format!("{backtrace}"), format!("{backtrace:?}"));
    }
}
