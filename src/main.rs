use anyhow::Result;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use tree_census::cli::{Cli, OutputFormat};
use tree_census::config::{CensusConfig, resolve_config};
use tree_census::report::write_outcome;
use tree_census::{Census, QueryEngine, logging};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = resolve_config(cli)?;
    let (census, report) = Census::load(&cli.dataset, &config)?;
    if report.rows_rejected > 0 {
        tracing::warn!(
            rejected = report.rows_rejected,
            loaded = report.trees_loaded,
            "some rows were skipped, use --strict to stop at the first one"
        );
    }
    let mut engine = QueryEngine::new(&census);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if !cli.queries.is_empty() {
        for keyword in &cli.queries {
            answer(&mut engine, &mut out, cli.format, &config, keyword)?;
        }
        return Ok(());
    }

    let stdin = io::stdin();
    prompt_loop(&mut engine, stdin.lock(), &mut out, cli.format, &config)
}

fn prompt_loop(
    engine: &mut QueryEngine<'_>,
    mut input: impl BufRead,
    out: &mut impl Write,
    format: OutputFormat,
    config: &CensusConfig,
) -> Result<()> {
    let mut line = String::new();
    loop {
        if format == OutputFormat::Text {
            writeln!(
                out,
                "Enter the tree species to learn more about it (\"{}\" to stop):",
                config.terminate_token
            )?;
            out.flush()?;
        }

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(());
        }
        let keyword = line.trim_end_matches(['\n', '\r']);
        if keyword.trim().eq_ignore_ascii_case(config.terminate_token.trim()) {
            return Ok(());
        }
        if keyword.trim().is_empty() {
            continue;
        }
        answer(engine, out, format, config, keyword)?;
    }
}

fn answer(
    engine: &mut QueryEngine<'_>,
    out: &mut impl Write,
    format: OutputFormat,
    config: &CensusConfig,
    keyword: &str,
) -> Result<()> {
    let outcome = engine.summarize(keyword);
    write_outcome(out, format, keyword, &outcome, &config.scope_name)?;
    out.flush()?;
    Ok(())
}
