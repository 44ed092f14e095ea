// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use airdesk_api::Client;
use airdesk_app::{AppState, EntityKind};
use airdesk_testkit::MockBackend;
use anyhow::{Context, Result, anyhow};
use config::{API_URL_ENV, Config, parse_screen};
use runtime::ApiRuntime;
use std::env;
use std::path::PathBuf;
use tracing::info;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `airdesk --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let log_file = options.log_file.clone().or_else(|| config.log_file());
    logging::init(config.log_filter(), log_file.as_deref())?;

    // Kept alive until the shell exits.
    let demo_backend = if options.demo {
        Some(MockBackend::seeded().context("start demo backend")?)
    } else {
        None
    };
    let env_url = env::var(API_URL_ENV).ok();
    let base_url = match &demo_backend {
        Some(backend) => backend.base_url(),
        None => config.base_url(env_url.as_deref()),
    };

    let client = Client::new(base_url, config.api_timeout()?).with_context(|| {
        format!(
            "invalid [api] config in {}; fix base_url/timeout values or {API_URL_ENV}",
            options.config_path.display()
        )
    })?;
    let screen = match options.screen {
        Some(screen) => screen,
        None => config.start_screen()?,
    };
    info!(
        base_url = client.base_url(),
        screen = screen.label(),
        demo = options.demo,
        "starting"
    );

    let mut runtime = ApiRuntime::new(client);
    if options.check_only {
        let rows = runtime.check(screen)?;
        println!("ok: {rows} {} at {base_url}", screen.label());
        return Ok(());
    }

    let mut state = AppState::new(screen);
    airdesk_tui::run_app(&mut state, &mut runtime)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    log_file: Option<PathBuf>,
    screen: Option<EntityKind>,
    demo: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        log_file: None,
        screen: None,
        demo: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--log-file" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--log-file requires a file path"))?;
                options.log_file = Some(PathBuf::from(value.as_ref()));
            }
            "--screen" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--screen requires a screen name"))?;
                options.screen = Some(parse_screen(value.as_ref())?);
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("airdesk");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --log-file <path>        Append logs to a file (overrides [log].file)");
    println!("  --screen <name>          Open on a screen (flights, cities, aircraft, ...)");
    println!("  --demo                   Run against a seeded in-process mock API");
    println!("  --check                  Validate config and load the start screen once");
    println!("  --help                   Show this help");
    println!();
    println!("  {API_URL_ENV} overrides [api].base_url");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, parse_cli_args};
    use airdesk_app::EntityKind;
    use anyhow::Result;
    use std::path::PathBuf;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/airdesk-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                print_config_path: false,
                print_example: false,
                log_file: None,
                screen: None,
                demo: false,
                check_only: false,
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_path_override() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_values() {
        for flag in ["--config", "--log-file", "--screen"] {
            let error = parse_cli_args(vec![flag], default_options_path())
                .expect_err("missing value should fail");
            assert!(error.to_string().starts_with(&format!("{flag} requires")));
        }
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_sets_print_and_check_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--print-config-path", "--print-example-config", "--check"],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(!options.demo);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_demo_screen_and_log_file() -> Result<()> {
        let options = parse_cli_args(
            vec!["--demo", "--screen", "gates", "--log-file", "/tmp/airdesk.log"],
            default_options_path(),
        )?;
        assert!(options.demo);
        assert_eq!(options.screen, Some(EntityKind::Gate));
        assert_eq!(options.log_file, Some(PathBuf::from("/tmp/airdesk.log")));
        Ok(())
    }

    #[test]
    fn parse_cli_args_rejects_unknown_screen() {
        let error = parse_cli_args(vec!["--screen", "hangars"], default_options_path())
            .expect_err("unknown screen should fail");
        assert!(error.to_string().contains("unknown screen \"hangars\""));
    }

    #[test]
    fn parse_cli_args_sets_help_flag_for_long_and_short_variants() -> Result<()> {
        let long = parse_cli_args(vec!["--help"], default_options_path())?;
        assert!(long.show_help);

        let short = parse_cli_args(vec!["-h"], default_options_path())?;
        assert!(short.show_help);
        Ok(())
    }
}
