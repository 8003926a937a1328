//! Caller context attached to buffer log lines.
//!
//! Callers that want their file, line and function in buffer diagnostics
//! build a [`CallSite`] (usually with [`call_site!`](crate::call_site)) and pass
//! it to the `*_at` accessors, available with the `call-site` feature.

use std::fmt;

/// Where a buffer operation was requested from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
    /// Function or script entry point that issued the call.
    pub function: &'static str,
}

impl CallSite {
    #[must_use]
    pub const fn new(file: &'static str, line: u32, function: &'static str) -> Self {
        Self {
            file,
            line,
            function,
        }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}:{}' in '{}'", self.file, self.line, self.function)
    }
}

/// Formats an optional call site for log lines.
pub(crate) struct Origin<'a>(pub Option<&'a CallSite>);

impl fmt::Display for Origin<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(site) => write!(f, ". Called from {site}"),
            None => Ok(()),
        }
    }
}

/// Captures the current file and line, tagged with a function name.
///
/// ```
/// let site = netmsg::call_site!("send_login");
/// assert_eq!(site.function, "send_login");
/// ```
#[macro_export]
macro_rules! call_site {
    ($function:expr) => {
        $crate::CallSite::new(file!(), line!(), $function)
    };
    () => {
        $crate::CallSite::new(file!(), line!(), module_path!())
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_location() {
        let site = CallSite::new("game.rs", 42, "send_stats");
        assert_eq!(site.to_string(), "'game.rs:42' in 'send_stats'");
    }

    #[test]
    fn origin_is_empty_without_site() {
        assert_eq!(Origin(None).to_string(), "");
        let site = CallSite::new("a.rs", 1, "f");
        assert_eq!(Origin(Some(&site)).to_string(), ". Called from 'a.rs:1' in 'f'");
    }

    #[test]
    fn macro_captures_this_file() {
        let site = crate::call_site!();
        assert!(site.file.ends_with("diagnostics.rs"));
        assert!(site.function.contains("diagnostics"));
    }
}
