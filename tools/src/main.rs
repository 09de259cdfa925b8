//! loan-desk: headless runner for the loan eligibility core.
//!
//! Usage:
//!   loan-desk generate --customers 20 --year 2025 --seed 42 --out data/generated_transactions.json
//!   loan-desk check --customer cust_001 --amount 300000 [--data PATH] [--data-dir DIR]
//!   loan-desk serve --ipc-mode [--data PATH] [--data-dir DIR]

use anyhow::{bail, Result};
use loan_desk_core::{
    cache::MetricsCache,
    config::{PolicyConfig, POLICY_FILE},
    generator::generate_dataset,
    rule_engine::PolicyEngine,
    source::JsonFileSource,
    tool::{eligibility_tool_schema, EligibilityTool, ToolCall},
};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;

const DEFAULT_DATA_FILE: &str = "data/generated_transactions.json";
const DEFAULT_DATA_DIR: &str = "./data";

#[derive(serde::Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
enum Control {
    Quit,
    Schema,
}

enum IpcCommand {
    Control(Control),
    Call(ToolCall),
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let Some(subcommand) = args.get(1).map(String::as_str) else {
        bail!("usage: loan-desk <generate|check|serve> [flags]");
    };

    match subcommand {
        "generate" => run_generate(&args),
        "check" => run_check(&args),
        "serve" => run_serve(&args),
        other => bail!("unknown subcommand '{other}' (expected generate, check or serve)"),
    }
}

fn run_generate(args: &[String]) -> Result<()> {
    let customers = parse_arg(args, "--customers", 20usize);
    let year = parse_arg(args, "--year", 2025i32);
    let seed = parse_arg(args, "--seed", 42u64);
    let out = str_arg(args, "--out").unwrap_or(DEFAULT_DATA_FILE);

    println!("Loan Desk: dataset generator");
    println!("  customers: {customers}");
    println!("  year:      {year}");
    println!("  seed:      {seed}");
    println!("  out:       {out}");
    println!();

    let dataset = generate_dataset(customers, year, seed);
    for (id, customer) in &dataset.customers {
        println!(
            "  {id}: {:>9} profile, {} transactions",
            customer.profile,
            customer.transactions.len()
        );
    }
    dataset.write(out)?;
    println!();
    println!("Dataset written to {out}");
    Ok(())
}

fn run_check(args: &[String]) -> Result<()> {
    let Some(customer_id) = str_arg(args, "--customer") else {
        bail!("check requires --customer ID");
    };
    let Some(amount) = str_arg(args, "--amount").and_then(|a| a.parse::<f64>().ok()) else {
        bail!("check requires a numeric --amount");
    };

    let tool = build_tool(args)?;
    let decision = tool.get_loan_eligibility(customer_id, amount)?;
    println!("{}", serde_json::to_string(&decision)?);

    if let Some(signals) = tool.cache().get_signals(customer_id)? {
        println!(
            "  growth={} cv={} stability={} fraud={} loss={} ({})",
            signals.growth,
            signals.cv,
            signals.stability,
            signals.fraud_flag,
            signals.loss_flag,
            decision.reason_code.description()
        );
    }
    Ok(())
}

fn run_serve(args: &[String]) -> Result<()> {
    if !args.iter().any(|a| a == "--ipc-mode") {
        bail!("serve only supports --ipc-mode");
    }
    let tool = build_tool(args)?;
    run_ipc_loop(&tool)
}

fn build_tool(args: &[String]) -> Result<EligibilityTool<JsonFileSource>> {
    let data = str_arg(args, "--data").unwrap_or(DEFAULT_DATA_FILE);
    let data_dir = str_arg(args, "--data-dir").unwrap_or(DEFAULT_DATA_DIR);

    let policy = if Path::new(data_dir).join(POLICY_FILE).exists() {
        PolicyConfig::load(data_dir)?
    } else {
        log::warn!("no {POLICY_FILE} in {data_dir}; using the built-in policy table");
        PolicyConfig::default_policy()
    };
    let engine = PolicyEngine::from_config(policy)?;
    let cache = MetricsCache::new(JsonFileSource::new(data));
    Ok(EligibilityTool::new(cache, engine))
}

/// One JSON request per stdin line, one JSON reply per stdout line.
fn run_ipc_loop(tool: &EligibilityTool<JsonFileSource>) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd = match parse_ipc_command(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Control(Control::Quit) => break,
            IpcCommand::Control(Control::Schema) => {
                writeln!(stdout, "{}", eligibility_tool_schema())?;
            }
            IpcCommand::Call(call) => {
                let reply = match tool.dispatch(&call) {
                    Ok(value) => value,
                    Err(e) => serde_json::json!({ "error": e.to_string() }),
                };
                writeln!(stdout, "{}", reply)?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn parse_ipc_command(line: &str) -> Result<IpcCommand> {
    if let Ok(control) = serde_json::from_str::<Control>(line) {
        return Ok(IpcCommand::Control(control));
    }
    Ok(IpcCommand::Call(ToolCall::from_json(line)?))
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
