//! Thin example front-end: launch an adapter, set one breakpoint, run to it,
//! print the stop and any buffered output, then detach. Not part of the
//! library's public contract — a worked example of driving [`Driver`].

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;

use dap_proxy::logging::LOGGER_SWITCHER;
use dap_proxy::session::{Action, RunOptions};
use dap_proxy::{Driver, ProxyConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Drive a DAP adapter from the command line")]
struct Args {
    /// Adapter identifier passed in `initialize`'s `adapterID`.
    #[arg(long, default_value = "dap-proxy-cli")]
    adapter_id: String,

    /// Path to a config TOML file; defaults to ~/.config/dap-proxy/config.toml.
    #[arg(long)]
    config: Option<String>,

    /// Source file to set a breakpoint in.
    #[arg(long)]
    breakpoint_file: Option<String>,

    /// Line to set the breakpoint at.
    #[arg(long)]
    breakpoint_line: Option<i64>,

    /// Adapter program and arguments, e.g. `-- python -m debugpy --listen 0 prog.py`.
    #[arg(last = true)]
    adapter_argv: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    LOGGER_SWITCHER.switch(env_logger::Logger::from_default_env(), LevelFilter::Info);

    if args.adapter_argv.is_empty() {
        anyhow::bail!("no adapter command given (pass it after `--`)");
    }

    let config = ProxyConfig::load(args.config.as_deref());
    let mut driver = Driver::launch(
        args.adapter_argv,
        args.adapter_id,
        serde_json::json!({}),
        config,
    )
    .context("launching adapter")?;

    if let (Some(file), Some(line)) = (args.breakpoint_file, args.breakpoint_line) {
        driver
            .set_breakpoint(&file, line, None, None, None)
            .context("setting breakpoint")?;
    }

    let stop = driver
        .run(Action::Continue, RunOptions::default())
        .context("running to next stop")?;

    println!("stopped: {} (pid {})", stop.reason, driver.get_pid()?);
    for (category, text) in &stop.output {
        println!("[{category}] {text}");
    }
    for frame in &stop.stack_trace {
        println!("  #{} {} ({:?}:{:?})", frame.index, frame.name, frame.file, frame.line);
    }

    driver.detach().context("detaching")?;
    Ok(())
}
