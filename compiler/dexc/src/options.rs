//! Command-line options shared by every command.

use dex_ctfe::CtfeConfig;
use dex_diagnostic::emitter::ColorMode;
use dex_diagnostic::DiagnosticConfig;
use dex_sema::{Deprecation, ResolverConfig};

use crate::CliError;

/// Settings for one compilation.
#[derive(Clone, Debug, Default)]
pub struct Options {
    pub ctfe: CtfeConfig,
    pub diagnostics: DiagnosticConfig,
    pub resolver: ResolverConfig,
    pub color: ColorMode,
}

/// Split `args` into options and positional arguments.
///
/// Flags take their value after `=`, except `-J` which takes it directly
/// (`-Jviews`).
pub fn parse_options(args: &[String]) -> Result<(Options, Vec<String>), CliError> {
    let mut options = Options::default();
    let mut positional = Vec::new();

    for arg in args {
        if let Some(value) = arg.strip_prefix("--max-ctfe-depth=") {
            let depth = number(value, "--max-ctfe-depth")?;
            options.ctfe = options.ctfe.with_max_recursion_depth(depth as usize);
        } else if let Some(value) = arg.strip_prefix("--ctfe-budget=") {
            options.ctfe = options.ctfe.with_step_budget(number(value, "--ctfe-budget")?);
        } else if let Some(value) = arg.strip_prefix("--error-limit=") {
            let limit = number(value, "--error-limit")?;
            options.diagnostics = options.diagnostics.with_error_limit(limit as usize);
        } else if let Some(value) = arg.strip_prefix("--deprecation=") {
            let deprecation = match value {
                "warn" => Deprecation::Warn,
                "error" => Deprecation::Error,
                "allow" => Deprecation::Allow,
                _ => {
                    return Err(CliError::InvalidValue {
                        flag: "--deprecation",
                        value: value.to_string(),
                        expected: "warn, error or allow",
                    })
                }
            };
            options.resolver = options.resolver.with_deprecation(deprecation);
        } else if let Some(value) = arg.strip_prefix("--color=") {
            options.color = match value {
                "auto" => ColorMode::Auto,
                "always" => ColorMode::Always,
                "never" => ColorMode::Never,
                _ => {
                    return Err(CliError::InvalidValue {
                        flag: "--color",
                        value: value.to_string(),
                        expected: "auto, always or never",
                    })
                }
            };
        } else if let Some(dir) = arg.strip_prefix("-J") {
            if dir.is_empty() {
                return Err(CliError::MissingArgument("directory after -J"));
            }
            options.resolver = options.resolver.with_string_import_path(dir);
        } else if arg.starts_with('-') && arg.len() > 1 {
            return Err(CliError::UnknownOption(arg.clone()));
        } else {
            positional.push(arg.clone());
        }
    }

    Ok((options, positional))
}

fn number(value: &str, flag: &'static str) -> Result<u64, CliError> {
    value.parse().map_err(|_| CliError::InvalidValue {
        flag,
        value: value.to_string(),
        expected: "a non-negative integer",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn flags_and_positionals() {
        let (options, rest) = parse_options(&args(&[
            "app.d",
            "--max-ctfe-depth=64",
            "--ctfe-budget=5000",
            "--error-limit=3",
            "-Jviews",
            "--deprecation=error",
            "--color=never",
            "x + 1",
        ]))
        .unwrap();
        assert_eq!(rest, vec!["app.d".to_string(), "x + 1".to_string()]);
        assert_eq!(options.ctfe, CtfeConfig::default().with_max_recursion_depth(64).with_step_budget(5000));
        assert_eq!(options.diagnostics.error_limit, 3);
        assert_eq!(options.resolver.string_import_paths, vec![PathBuf::from("views")]);
        assert_eq!(options.resolver.deprecation, Deprecation::Error);
        assert_eq!(options.color, ColorMode::Never);
    }

    #[test]
    fn defaults() {
        let (options, rest) = parse_options(&args(&["app.d"])).unwrap();
        assert_eq!(rest, vec!["app.d".to_string()]);
        assert_eq!(options.ctfe, CtfeConfig::default());
        assert_eq!(options.diagnostics, DiagnosticConfig::default());
        assert!(options.resolver.string_import_paths.is_empty());
    }

    #[test]
    fn bad_values_are_rejected() {
        let err = parse_options(&args(&["--ctfe-budget=lots"])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value 'lots' for --ctfe-budget, expected a non-negative integer"
        );
        assert!(matches!(
            parse_options(&args(&["--deprecation=loud"])),
            Err(CliError::InvalidValue { flag: "--deprecation", .. })
        ));
        assert!(matches!(parse_options(&args(&["-J"])), Err(CliError::MissingArgument(_))));
        assert!(matches!(parse_options(&args(&["--fast"])), Err(CliError::UnknownOption(o)) if o == "--fast"));
    }

    #[test]
    fn a_lone_dash_is_positional() {
        let (_, rest) = parse_options(&args(&["-"])).unwrap();
        assert_eq!(rest, vec!["-".to_string()]);
    }
}
