//! Command handlers
//!
//! Each handler writes its report to the given writer so the binary can pass
//! stdout and tests can pass a buffer.

use crate::commands::{ConfigArgs, DataArgs, DecryptArgs, LintArgs, OutputFormat, ParseArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use console::style;
use pagewire::{decrypt_string, HarnessConfig, Locator, PageLocators, TestData};
use serde_json::json;
use std::io::Write;
use tracing::debug;

/// Lint a page file; fails when any locator does not parse
pub fn execute_lint(config: &CliConfig, args: &LintArgs, out: &mut impl Write) -> CliResult<()> {
    let yaml = std::fs::read_to_string(&args.file)?;
    let issues = PageLocators::validate(&yaml)?;
    let path = args.file.display().to_string();
    debug!(file = %path, issues = issues.len(), "page file linted");

    match args.format {
        OutputFormat::Json => {
            let report = json!({
                "file": path,
                "valid": issues.is_empty(),
                "issues": issues
                    .iter()
                    .map(|i| json!({ "name": i.name, "error": i.error.to_string() }))
                    .collect::<Vec<_>>(),
            });
            writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        }
        OutputFormat::Text => {
            let color = config.color.should_color();
            for issue in &issues {
                let mark = style("✗").red().force_styling(color);
                writeln!(out, "{mark} {}: {}", issue.name, issue.error)?;
            }
            if issues.is_empty() && !config.verbosity.is_quiet() {
                let page = PageLocators::from_yaml_str(&yaml)?;
                let mark = style("✓").green().force_styling(color);
                writeln!(out, "{mark} {path}: {} locator(s) ok", page.len())?;
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(CliError::lint(path, issues.len()))
    }
}

/// Print the strategy and value of one locator
pub fn execute_parse(args: &ParseArgs, out: &mut impl Write) -> CliResult<()> {
    let locator = Locator::parse(&args.locator)?;
    writeln!(out, "strategy: {}", locator.strategy())?;
    writeln!(out, "value: {}", locator.value())?;
    Ok(())
}

/// Print a decoded credential
pub fn execute_decrypt(args: &DecryptArgs, out: &mut impl Write) -> CliResult<()> {
    writeln!(out, "{}", decrypt_string(&args.value)?)?;
    Ok(())
}

/// Print one test data value, or every pair in key order
pub fn execute_data(args: &DataArgs, out: &mut impl Write) -> CliResult<()> {
    let data = TestData::load(&args.file)?;
    match &args.key {
        Some(key) if args.decrypt => writeln!(out, "{}", data.get_decrypted(key)?)?,
        Some(key) => writeln!(out, "{}", pagewire::DataSource::get(&data, key)?)?,
        None => {
            for (key, value) in data.as_map() {
                writeln!(out, "{key}={value}")?;
            }
        }
    }
    Ok(())
}

/// Load the harness configuration from `path`, `PAGEWIRE_CONFIG` or defaults
pub fn load_harness_config(path: Option<&std::path::Path>) -> CliResult<HarnessConfig> {
    let config = match path {
        Some(path) => HarnessConfig::load(path)?,
        None => HarnessConfig::from_env()?,
    };
    Ok(config)
}

/// Print the effective configuration as YAML
pub fn execute_config(args: &ConfigArgs, out: &mut impl Write) -> CliResult<()> {
    let config = load_harness_config(args.path.as_deref())?;
    write!(out, "{}", config.to_yaml()?)?;
    Ok(())
}

/// Open a live session, load the page and wait for the locator
#[cfg(feature = "webdriver")]
pub fn execute_check(
    config: &CliConfig,
    args: &crate::commands::CheckArgs,
    out: &mut impl Write,
) -> CliResult<()> {
    use pagewire::{Interactions, MemoryReporter, Session, WebDriverSession};

    let locator = Locator::parse(&args.locator)?;
    let mut harness = load_harness_config(args.config.as_deref())?;
    if let Some(server) = &args.server {
        harness.session.server_url.clone_from(server);
    }

    let reporter = MemoryReporter::new();
    let steps = Interactions::from_config(&harness, &reporter)?;
    let driver = WebDriverSession::connect(&harness.session)?;
    let mut session = Session::new(driver);

    let result = steps
        .open(&mut session, &args.url)
        .and_then(|()| steps.text(&mut session, &locator, &args.label));
    session.teardown();
    let text = result?;

    if !config.verbosity.is_quiet() {
        let mark = style("✓").green().force_styling(config.color.should_color());
        writeln!(out, "{mark} {locator} is visible")?;
        writeln!(out, "text: {text}")?;
        let evidence = reporter
            .records()
            .into_iter()
            .rev()
            .find_map(|r| r.evidence_path);
        if let Some(path) = evidence {
            writeln!(out, "evidence: {}", path.display())?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::ColorChoice;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn plain() -> CliConfig {
        CliConfig::new().with_color(ColorChoice::Never)
    }

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    mod lint_tests {
        use super::*;

        #[test]
        fn test_clean_page() {
            let dir = TempDir::new().unwrap();
            let file = write_file(
                &dir,
                "login.yaml",
                "page: login\nlocators:\n  user: id==username\n  submit: css==button\n",
            );
            let mut buf = Vec::new();
            let args = LintArgs {
                file,
                format: OutputFormat::Text,
            };
            execute_lint(&plain(), &args, &mut buf).unwrap();
            assert!(output(buf).contains("2 locator(s) ok"));
        }

        #[test]
        fn test_bad_entries_reported_and_fail() {
            let dir = TempDir::new().unwrap();
            let file = write_file(
                &dir,
                "bad.yaml",
                "page: p\nlocators:\n  a: tag==div\n  b: id==ok\n  c: nothing\n",
            );
            let mut buf = Vec::new();
            let args = LintArgs {
                file,
                format: OutputFormat::Text,
            };
            let err = execute_lint(&plain(), &args, &mut buf).unwrap_err();
            assert!(matches!(err, CliError::Lint { count: 2, .. }));
            let text = output(buf);
            assert!(text.contains("✗ a:"));
            assert!(text.contains("✗ c:"));
            assert!(!text.contains("✗ b:"));
        }

        #[test]
        fn test_json_report() {
            let dir = TempDir::new().unwrap();
            let file = write_file(&dir, "p.yaml", "page: p\nlocators:\n  a: foo==bar\n");
            let mut buf = Vec::new();
            let args = LintArgs {
                file,
                format: OutputFormat::Json,
            };
            assert!(execute_lint(&plain(), &args, &mut buf).is_err());
            let report: serde_json::Value = serde_json::from_slice(&buf).unwrap();
            assert_eq!(report["valid"], false);
            assert_eq!(report["issues"][0]["name"], "a");
        }
    }

    mod parse_tests {
        use super::*;

        #[test]
        fn test_prints_parts() {
            let mut buf = Vec::new();
            let args = ParseArgs {
                locator: "XPATH == //div[@id='a']".into(),
            };
            execute_parse(&args, &mut buf).unwrap();
            assert_eq!(output(buf), "strategy: xpath\nvalue: //div[@id='a']\n");
        }

        #[test]
        fn test_syntax_error() {
            let mut buf = Vec::new();
            let args = ParseArgs {
                locator: "id=x".into(),
            };
            assert!(matches!(
                execute_parse(&args, &mut buf),
                Err(CliError::Pagewire(
                    pagewire::PagewireError::InvalidLocatorSyntax { .. }
                ))
            ));
        }
    }

    mod data_tests {
        use super::*;

        #[test]
        fn test_all_pairs_sorted() {
            let dir = TempDir::new().unwrap();
            let file = write_file(&dir, "td.properties", "user=alice\n# comment\napp = demo\n");
            let mut buf = Vec::new();
            let args = DataArgs {
                file,
                key: None,
                decrypt: false,
            };
            execute_data(&args, &mut buf).unwrap();
            assert_eq!(output(buf), "app=demo\nuser=alice\n");
        }

        #[test]
        fn test_decrypted_key() {
            let dir = TempDir::new().unwrap();
            let file = write_file(&dir, "td.yaml", "password: \"506135357730726421\"\n");
            let mut buf = Vec::new();
            let args = DataArgs {
                file,
                key: Some("password".into()),
                decrypt: true,
            };
            execute_data(&args, &mut buf).unwrap();
            assert_eq!(output(buf), "Pa55w0rd!\n");
        }

        #[test]
        fn test_missing_key() {
            let dir = TempDir::new().unwrap();
            let file = write_file(&dir, "td.yaml", "user: alice\n");
            let mut buf = Vec::new();
            let args = DataArgs {
                file,
                key: Some("nope".into()),
                decrypt: false,
            };
            assert!(execute_data(&args, &mut buf).is_err());
        }
    }

    mod config_tests {
        use super::*;

        #[test]
        fn test_prints_loaded_file() {
            let dir = TempDir::new().unwrap();
            let file = write_file(
                &dir,
                "pagewire.yaml",
                "waits:\n  visibility:\n    timeout_ms: 2500\n    poll_interval_ms: 250\n",
            );
            let mut buf = Vec::new();
            execute_config(&ConfigArgs { path: Some(file) }, &mut buf).unwrap();
            let yaml = output(buf);
            assert!(yaml.contains("timeout_ms: 2500"));
            assert!(yaml.contains("server_url"));
        }

        #[test]
        fn test_unknown_field_rejected() {
            let dir = TempDir::new().unwrap();
            let file = write_file(&dir, "bad.yaml", "colour: blue\n");
            let mut buf = Vec::new();
            assert!(execute_config(&ConfigArgs { path: Some(file) }, &mut buf).is_err());
        }
    }

    #[test]
    fn test_decrypt() {
        let mut buf = Vec::new();
        execute_decrypt(
            &DecryptArgs {
                value: "48656c6c6f".into(),
            },
            &mut buf,
        )
        .unwrap();
        assert_eq!(output(buf), "Hello\n");
    }
}
