//! Snapshot command: factory patch plus edits, printed as one JSON update.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, ValueEnum};
use patchbay_config::OccupiedPort;
use patchbay_sync::{JsonLinesSink, ParameterSink, PatchSession, Processed};

use crate::commands::common::load_config;
use crate::patch::{
    Connect, SetControl, Unwire, apply_connect, apply_set, apply_unwire, build_factory_patch,
};

#[derive(Clone, Copy, ValueEnum)]
enum Policy {
    Reject,
    Replace,
}

impl From<Policy> for OccupiedPort {
    fn from(value: Policy) -> Self {
        match value {
            Policy::Reject => OccupiedPort::Reject,
            Policy::Replace => OccupiedPort::Replace,
        }
    }
}

#[derive(Args)]
pub struct SnapshotArgs {
    /// Session config file (default: ./patchbay.toml, then the user config)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Set a control on every node of a kind (e.g., attack.value=0.05)
    #[arg(short, long = "set", value_name = "KIND.CONTROL=VALUE")]
    set: Vec<SetControl>,

    /// Disconnect an input port on every node of a kind (e.g., adsr.attack)
    #[arg(short, long = "unwire", value_name = "KIND.PORT")]
    unwire: Vec<Unwire>,

    /// Connect an output to an input (e.g., keyboard.duration=adsr.alpha)
    #[arg(long = "connect", value_name = "KIND.OUTPUT=KIND.INPUT")]
    connect: Vec<Connect>,

    /// What --connect does when the input is already wired
    #[arg(long, value_enum)]
    policy: Option<Policy>,

    /// Indent the JSON output
    #[arg(long)]
    pretty: bool,
}

pub fn run(args: SnapshotArgs) -> anyhow::Result<()> {
    let (mut config, source) = load_config(args.config.as_deref())?;
    if let Some(policy) = args.policy {
        config.graph.occupied_port = policy.into();
    }
    if let Some(endpoint) = &config.backend.endpoint {
        tracing::info!(%endpoint, "backend endpoint is for embedders; printing to stdout");
    }

    let sink: Arc<dyn ParameterSink> = if args.pretty {
        Arc::new(JsonLinesSink::pretty(std::io::stdout()))
    } else {
        Arc::new(JsonLinesSink::stdout())
    };
    let mut session = PatchSession::new(&config, sink)?;
    tracing::debug!(
        config = ?source,
        policy = ?config.graph.occupied_port,
        mode = ?config.dispatch.mode,
        "session ready"
    );

    build_factory_patch(&mut session)?;
    for edit in &args.unwire {
        apply_unwire(&mut session, edit)?;
    }
    for edit in &args.connect {
        apply_connect(&mut session, edit)?;
    }
    for edit in &args.set {
        apply_set(&mut session, edit)?;
    }

    match session.process_pending() {
        Processed::Dispatched { version, events, .. } => {
            tracing::debug!(%version, events, "snapshot dispatched");
        }
        Processed::Aborted { error, .. } => return Err(error.into()),
        Processed::Idle => {}
    }

    let stats = session.shutdown()?;
    if stats.failed > 0 {
        anyhow::bail!("failed to write the snapshot");
    }
    Ok(())
}
