//! Supporting utility.

/// Trace when `verbose` feature enabled.
macro_rules! verbose {
    ($($tt:tt)*) => {
        #[cfg(feature = "verbose")]
        tracing::trace!($($tt)*)
    };
}

/// Create and enter `Span` when `verbose` feature enabled.
macro_rules! span {
    ($($tt:tt)*) => {
        #[cfg(feature = "verbose")]
        let s = tracing::trace_span!($($tt)*);
        #[cfg(feature = "verbose")]
        let _s = s.enter();
    };
}

/// Emit a warning when `log` feature enabled.
macro_rules! warning {
    ($($tt:tt)*) => {
        #[cfg(feature = "log")]
        log::warn!($($tt)*);
        #[cfg(not(feature = "log"))]
        if false {
            let _ = format!($($tt)*);
        }
    };
}

/// Emit an error when `log` feature enabled.
macro_rules! error {
    ($($tt:tt)*) => {
        #[cfg(feature = "log")]
        log::error!($($tt)*);
        #[cfg(not(feature = "log"))]
        if false {
            let _ = format!($($tt)*);
        }
    };
}

pub(crate) use verbose;
pub(crate) use span;
pub(crate) use warning;
pub(crate) use error;
