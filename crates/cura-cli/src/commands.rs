use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use cura_replay::{
    FailurePolicy, Operation, Scenario, StateProjection, TraceRecord, INITIAL_STATE,
};
use cura_types::{AccountId, Numeric};
use tracing::info;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Run(args) => cmd_run(args, &cli.format),
        Command::Check(args) => cmd_check(args),
    }
}

fn load(path: &Path) -> anyhow::Result<Scenario> {
    let scenario = Scenario::from_path(path)
        .with_context(|| format!("failed to load scenario {}", path.display()))?;
    info!(path = %path.display(), actions = scenario.actions.len(), "scenario loaded");
    Ok(scenario)
}

fn cmd_run(args: RunArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let scenario = load(&args.scenario)?;
    let policy = if args.collect {
        FailurePolicy::Collect
    } else {
        scenario.policy
    };
    let trace = scenario.run_with(policy)?;

    match format {
        OutputFormat::Json => {
            let json = if args.last {
                serde_json::to_string_pretty(&trace.final_state())?
            } else {
                serde_json::to_string_pretty(&trace)?
            };
            println!("{json}");
        }
        OutputFormat::Text => {
            let records = trace.records();
            let shown = if args.last {
                &records[records.len().saturating_sub(1)..]
            } else {
                records
            };
            for record in shown {
                print_record(record);
            }
            let failures = trace.failures().count();
            let actions = trace.len().saturating_sub(1);
            if failures == 0 {
                println!("{} Replayed {} actions.", "✓".green().bold(), actions);
            } else {
                println!(
                    "{} Replayed {} actions, {} failed.",
                    "✗".red().bold(),
                    actions,
                    failures.to_string().red()
                );
            }
        }
    }
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let scenario = load(&args.scenario)?;
    scenario.state().context("genesis is inconsistent")?;
    for (i, action) in scenario.actions.iter().enumerate() {
        Operation::resolve(action).with_context(|| format!("action {} ({action})", i + 1))?;
    }

    let name = scenario.name.as_deref().unwrap_or("scenario");
    println!("{} {} is valid", "✓".green().bold(), name.bold());
    println!("  Actions: {}", scenario.actions.len());
    println!("  Genesis deposits: {}", scenario.genesis.total_deposits());
    println!(
        "  Issuance rate: {}  Valuation multiple: {}",
        scenario.pool.issuance_rate, scenario.pool.valuation_multiple
    );
    Ok(())
}

fn print_record(record: &TraceRecord<StateProjection>) {
    let state = &record.state;
    let label = match &record.action {
        Some(action) => action.to_string().bold(),
        None => INITIAL_STATE.cyan().bold(),
    };
    println!(
        "{} {}  {}",
        format!("#{:<4}", record.index).dimmed(),
        label,
        format!("block {}", state.block_height).dimmed()
    );
    if let Some(error) = &record.error {
        println!("      {} {}", "error:".red().bold(), error.red());
    }
    println!("      shares   {}", balances(&state.share_balances));
    println!("      deposits {}", balances(&state.deposits));
    println!("      reserve  {}", balances(&state.reserve_balances));
    println!(
        "      total shares {:.6} (minted {:.6}), deposits {:.6} (secondary {:.6})",
        state.total_shares, state.share_supply, state.total_deposits, state.secondary_total_deposits
    );
}

fn balances(map: &BTreeMap<AccountId, Numeric>) -> String {
    if map.is_empty() {
        return "-".dimmed().to_string();
    }
    map.iter()
        .map(|(account, amount)| format!("{}={amount:.4}", account.as_str().yellow()))
        .collect::<Vec<_>>()
        .join(" ")
}
