//! Command-line options for the `finn` binary

use crate::config::EngineConfig;
use thiserror::Error;

pub const USAGE: &str = "\
usage: finn <file> [flags]
       finn -repl [flags]

modes:
  -i                 interpret the file (default when no other mode is given)
  -c                 print a NASM listing for the file
  -token             print the token stream and exit
  -repl              interactive loop; ':q' quits, state persists between lines
  -tui               run with snapshots and open the step inspector

reports:
  -var               dump variables after the run
  -deconstruct:NAME  dump the token kinds of procedure NAME after the run
  -mem               print the simulated memory usage after the run
  -time              report lexing and interpreting time
  -h                 show this help

Set RUST_LOG (e.g. RUST_LOG=finn=debug) to enable tracing on stderr.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CliError {
    #[error("no input file given")]
    MissingFile,

    #[error("unknown flag '{0}'")]
    UnknownFlag(String),

    #[error("'-deconstruct:' needs a procedure name")]
    MissingProcedureName,

    #[error("more than one input file given: '{0}' and '{1}'")]
    TooManyFiles(String, String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    pub file: Option<String>,
    pub interpret: bool,
    pub compile: bool,
    pub show_tokens: bool,
    pub show_variables: bool,
    pub deconstruct: Option<String>,
    pub time: bool,
    pub memory_report: bool,
    pub repl: bool,
    pub tui: bool,
    pub help: bool,
}

impl Options {
    /// Parse the arguments after the program name.
    pub fn parse<I>(args: I) -> Result<Options, CliError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = Options::default();

        for arg in args {
            match arg.as_str() {
                "-i" => options.interpret = true,
                "-c" => options.compile = true,
                "-token" => options.show_tokens = true,
                "-var" => options.show_variables = true,
                "-time" => options.time = true,
                "-mem" => options.memory_report = true,
                "-repl" => options.repl = true,
                "-tui" => options.tui = true,
                "-h" | "--help" => options.help = true,
                flag if flag.starts_with("-deconstruct:") => {
                    let name = &flag["-deconstruct:".len()..];
                    if name.is_empty() {
                        return Err(CliError::MissingProcedureName);
                    }
                    options.deconstruct = Some(name.to_string());
                }
                flag if flag.starts_with('-') => return Err(CliError::UnknownFlag(arg)),
                _ => {
                    if let Some(existing) = options.file.take() {
                        return Err(CliError::TooManyFiles(existing, arg));
                    }
                    options.file = Some(arg);
                }
            }
        }

        if options.help || options.repl {
            return Ok(options);
        }
        if options.file.is_none() {
            return Err(CliError::MissingFile);
        }
        if !(options.compile || options.show_tokens || options.tui) {
            options.interpret = true;
        }
        Ok(options)
    }

    /// Engine configuration implied by the flags
    pub fn engine_config(&self) -> EngineConfig {
        let config = EngineConfig::default();
        if self.tui {
            let limit = config.snapshot_memory_limit;
            // The inspector replays the console, nothing is echoed
            config.with_snapshots(limit)
        } else {
            config.with_echo(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Result<Options, CliError> {
        Options::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_interpret_is_the_default_mode() {
        let options = parse(&["main.finn", "-var"]).unwrap();
        assert_eq!(options.file.as_deref(), Some("main.finn"));
        assert!(options.interpret);
        assert!(options.show_variables);
        assert!(!options.compile);
    }

    #[test]
    fn test_compile_only() {
        let options = parse(&["-c", "main.finn"]).unwrap();
        assert!(options.compile);
        assert!(!options.interpret);
    }

    #[test]
    fn test_deconstruct_takes_a_name() {
        let options = parse(&["main.finn", "-deconstruct:fib"]).unwrap();
        assert_eq!(options.deconstruct.as_deref(), Some("fib"));
        assert_eq!(
            parse(&["main.finn", "-deconstruct:"]),
            Err(CliError::MissingProcedureName)
        );
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse(&["-var"]), Err(CliError::MissingFile));
        assert_eq!(
            parse(&["main.finn", "-x"]),
            Err(CliError::UnknownFlag("-x".to_string()))
        );
        assert!(matches!(
            parse(&["a.finn", "b.finn"]),
            Err(CliError::TooManyFiles(..))
        ));
    }

    #[test]
    fn test_repl_needs_no_file() {
        let options = parse(&["-repl"]).unwrap();
        assert!(options.repl);
        assert!(options.file.is_none());
    }

    #[test]
    fn test_engine_config() {
        assert!(parse(&["a.finn"]).unwrap().engine_config().echo);
        let tui = parse(&["a.finn", "-tui"]).unwrap().engine_config();
        assert!(tui.record_snapshots);
        assert!(!tui.echo);
    }
}
