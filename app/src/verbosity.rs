//! # appstrap Verbosity Resolution
//!
//! File: app/src/verbosity.rs
//!
//! ## Overview
//!
//! Maps the global command-line flags (`-q`, `--quiet`, `-v`, `-vv`, `-vvv`,
//! `--verbose[=N]`, `--verbose N`) to a discrete verbosity level, before the
//! dispatch layer ever sees the arguments. Quiet always wins over any
//! verbose flag; competing verbose indications resolve to the highest; with
//! no flags the level is `Normal`. Tokens after a literal `--` are never
//! interpreted.
//!
//! `strip_flags` removes exactly the recognized tokens so the remaining argv
//! can be handed to the command parser unchanged.
//!
use tracing_subscriber::filter::LevelFilter;

/// Discrete output verbosity, resolved once per process from argv.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
    Debug,
}

impl Verbosity {
    /// Resolve the verbosity from raw arguments. The first element may be
    /// the program name; it cannot collide with any recognized flag.
    pub fn resolve(args: &[String]) -> Verbosity {
        let mut quiet = false;
        let mut level: u32 = 0;
        let mut i = 0;
        while i < args.len() {
            let token = args[i].as_str();
            match token {
                "--" => break,
                "-q" | "--quiet" => quiet = true,
                "--verbose" => {
                    // A bare --verbose may carry its level as the next token.
                    if let Some(n) = args.get(i + 1).and_then(|v| v.parse::<u32>().ok()) {
                        level = level.max(n);
                        i += 1;
                    } else {
                        level = level.max(1);
                    }
                }
                _ if token.starts_with("--verbose=") => {
                    let n = token["--verbose=".len()..].parse::<u32>().unwrap_or(1);
                    level = level.max(n);
                }
                _ if is_short_verbose(token) => level += (token.len() - 1) as u32,
                _ => {}
            }
            i += 1;
        }
        if quiet {
            return Verbosity::Quiet;
        }
        match level {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            2 => Verbosity::VeryVerbose,
            _ => Verbosity::Debug,
        }
    }

    /// The default log directive for the console handler, overridable via
    /// `RUST_LOG`.
    pub fn default_directive(self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "info",
            Verbosity::VeryVerbose => "debug",
            Verbosity::Debug => "trace",
        }
    }

    /// The equivalent tracing level filter.
    pub fn level_filter(self) -> LevelFilter {
        match self {
            Verbosity::Quiet => LevelFilter::ERROR,
            Verbosity::Normal => LevelFilter::WARN,
            Verbosity::Verbose => LevelFilter::INFO,
            Verbosity::VeryVerbose => LevelFilter::DEBUG,
            Verbosity::Debug => LevelFilter::TRACE,
        }
    }
}

/// Remove the recognized verbosity tokens (including a consumed `--verbose N`
/// value) and pass every other token through untouched.
pub fn strip_flags(args: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(args.len());
    let mut i = 0;
    while i < args.len() {
        let token = args[i].as_str();
        match token {
            "--" => {
                // Everything from the separator on is positional.
                out.extend(args[i..].iter().cloned());
                break;
            }
            "-q" | "--quiet" => {}
            "--verbose" => {
                if args
                    .get(i + 1)
                    .map(|v| v.parse::<u32>().is_ok())
                    .unwrap_or(false)
                {
                    i += 1;
                }
            }
            _ if token.starts_with("--verbose=") => {}
            _ if is_short_verbose(token) => {}
            _ => out.push(args[i].clone()),
        }
        i += 1;
    }
    out
}

fn is_short_verbose(token: &str) -> bool {
    token.len() >= 2
        && token.starts_with('-')
        && !token.starts_with("--")
        && token[1..].chars().all(|c| c == 'v')
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(tokens: &[&str]) -> Verbosity {
        let mut args = vec!["./tests".to_string()];
        args.extend(tokens.iter().map(|t| t.to_string()));
        Verbosity::resolve(&args)
    }

    #[test]
    fn test_flag_table() {
        let cases: &[(&[&str], Verbosity)] = &[
            (&[], Verbosity::Normal),
            (&["-q"], Verbosity::Quiet),
            (&["--quiet"], Verbosity::Quiet),
            (&["-v"], Verbosity::Verbose),
            (&["--verbose", "1"], Verbosity::Verbose),
            (&["--verbose=1"], Verbosity::Verbose),
            (&["-vv"], Verbosity::VeryVerbose),
            (&["--verbose", "2"], Verbosity::VeryVerbose),
            (&["--verbose=2"], Verbosity::VeryVerbose),
            (&["-vvv"], Verbosity::Debug),
            (&["--verbose", "3"], Verbosity::Debug),
            (&["--verbose=3"], Verbosity::Debug),
        ];
        for (tokens, expected) in cases {
            assert_eq!(resolve(tokens), *expected, "flags {tokens:?}");
        }
    }

    #[test]
    fn test_quiet_wins_over_verbose() {
        assert_eq!(resolve(&["-q", "-vvv"]), Verbosity::Quiet);
        assert_eq!(resolve(&["--verbose=3", "--quiet"]), Verbosity::Quiet);
    }

    #[test]
    fn test_repeated_short_flags_accumulate() {
        assert_eq!(resolve(&["-v", "-v"]), Verbosity::VeryVerbose);
        assert_eq!(resolve(&["-vv", "-v"]), Verbosity::Debug);
        assert_eq!(resolve(&["-vvvv"]), Verbosity::Debug);
    }

    #[test]
    fn test_competing_indications_take_highest() {
        assert_eq!(resolve(&["--verbose=1", "-vvv"]), Verbosity::Debug);
        assert_eq!(resolve(&["--verbose=3", "-v"]), Verbosity::Debug);
    }

    #[test]
    fn test_separator_stops_interpretation() {
        assert_eq!(resolve(&["--", "-vvv"]), Verbosity::Normal);
        assert_eq!(resolve(&["-v", "--", "-q"]), Verbosity::Verbose);
    }

    #[test]
    fn test_bare_verbose_does_not_eat_non_numeric() {
        assert_eq!(resolve(&["--verbose", "deploy"]), Verbosity::Verbose);
    }

    #[test]
    fn test_strip_flags() {
        let args: Vec<String> = ["./tests", "-v", "deploy", "--verbose", "2", "--quiet"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(strip_flags(&args), vec!["./tests", "deploy"]);

        let args: Vec<String> = ["./tests", "--verbose", "deploy"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(strip_flags(&args), vec!["./tests", "deploy"]);

        let args: Vec<String> = ["./tests", "run", "--", "-vvv"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(strip_flags(&args), vec!["./tests", "run", "--", "-vvv"]);
    }

    #[test]
    fn test_level_mapping() {
        assert_eq!(Verbosity::Quiet.default_directive(), "error");
        assert_eq!(Verbosity::Normal.default_directive(), "warn");
        assert_eq!(Verbosity::Debug.level_filter(), LevelFilter::TRACE);
    }
}
