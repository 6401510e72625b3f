// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result, anyhow, bail};
use botica_app::AppState;
use botica_db::Store;
use config::Config;
use runtime::DbRuntime;
use std::env;
use std::path::PathBuf;

const DEMO_SEED: u64 = 42;
const DEMO_DRUG_COUNT: usize = 24;

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
    if options.print_example_config {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `botica --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let db_path = if options.demo {
        PathBuf::from(":memory:")
    } else {
        config.db_path()?
    };
    if options.print_db_path {
        println!("{}", db_path.display());
        return Ok(());
    }

    let store = Store::open(&db_path).with_context(|| {
        format!(
            "open database {} -- if this path is wrong, set [storage].db_path or BOTICA_DB_PATH",
            db_path.display()
        )
    })?;
    store.bootstrap()?;
    if options.demo {
        botica_testkit::seed_demo_drugs(store.raw_connection(), DEMO_SEED, DEMO_DRUG_COUNT)?;
    }
    if options.check_only {
        println!("database ok: {}", db_path.display());
        return Ok(());
    }

    let mut state = AppState {
        active_tab: config.start_tab(),
        ..AppState::default()
    };
    let mut runtime = DbRuntime::new(&store);
    botica_tui::run_app(&mut state, &mut runtime)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    show_help: bool,
    print_config_path: bool,
    print_db_path: bool,
    print_example_config: bool,
    demo: bool,
    check_only: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        show_help: false,
        print_config_path: false,
        print_db_path: false,
        print_example_config: false,
        demo: false,
        check_only: false,
    };
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_ref() {
            "--help" | "-h" => options.show_help = true,
            "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(path.as_ref());
            }
            "--print-config-path" => options.print_config_path = true,
            "--print-path" => options.print_db_path = true,
            "--print-example-config" => options.print_example_config = true,
            "--demo" => options.demo = true,
            "--check" => options.check_only = true,
            unknown => {
                bail!("unknown argument {unknown:?}; run with --help to see supported options")
            }
        }
    }
    Ok(options)
}

fn print_help() {
    println!("botica: register and search pharmaceutical drug records");
    println!();
    println!("usage: botica [options]");
    println!();
    println!("options:");
    println!("  --config <path>          use a specific config file");
    println!("  --print-config-path      print the resolved config file path and exit");
    println!("  --print-path             print the resolved database path and exit");
    println!("  --print-example-config   print a commented example config and exit");
    println!("  --demo                   run against a seeded in-memory database");
    println!("  --check                  open and validate the database, then exit");
    println!("  --help                   show this help");
}
