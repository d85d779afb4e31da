//! `quill script` command implementation.

use anyhow::Result;
use clap::{Args, ValueEnum};
use quill_audit::{ActorContext, ExecuteOn, ScriptExecution, ScriptType};
use std::path::Path;

use super::{build_logger, load_config};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ScriptTypeArg {
    CustomScript,
    Ipmi,
    Ssh,
    Telnet,
    Webhook,
}

impl From<ScriptTypeArg> for ScriptType {
    fn from(arg: ScriptTypeArg) -> Self {
        match arg {
            ScriptTypeArg::CustomScript => ScriptType::CustomScript,
            ScriptTypeArg::Ipmi => ScriptType::Ipmi,
            ScriptTypeArg::Ssh => ScriptType::Ssh,
            ScriptTypeArg::Telnet => ScriptType::Telnet,
            ScriptTypeArg::Webhook => ScriptType::Webhook,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExecuteOnArg {
    Agent,
    Server,
    Proxy,
}

impl From<ExecuteOnArg> for ExecuteOn {
    fn from(arg: ExecuteOnArg) -> Self {
        match arg {
            ExecuteOnArg::Agent => ExecuteOn::Agent,
            ExecuteOnArg::Server => ExecuteOn::Server,
            ExecuteOnArg::Proxy => ExecuteOn::Proxy,
        }
    }
}

#[derive(Args, Debug)]
pub struct ScriptArgs {
    /// Host the script ran on
    #[arg(long)]
    pub host_id: u64,

    #[arg(long)]
    pub host_name: String,

    /// Command text as configured
    #[arg(long, default_value = "")]
    pub command: String,

    #[arg(long = "type", value_enum, default_value_t = ScriptTypeArg::CustomScript)]
    pub script_type: ScriptTypeArg,

    #[arg(long, value_enum, default_value_t = ExecuteOnArg::Server)]
    pub execute_on: ExecuteOnArg,

    /// Event the script was run against, if any
    #[arg(long)]
    pub event_id: Option<u64>,

    /// Proxy monitoring the host, if any
    #[arg(long)]
    pub proxy_host_id: Option<u64>,

    #[arg(long)]
    pub output: Option<String>,

    #[arg(long)]
    pub error: Option<String>,

    #[arg(long, default_value_t = 0)]
    pub user_id: u64,

    #[arg(long, default_value = "")]
    pub username: String,

    #[arg(long, default_value = "")]
    pub client_ip: String,
}

impl ScriptArgs {
    pub fn actor(&self) -> ActorContext {
        ActorContext::new(self.user_id, self.username.clone(), self.client_ip.clone())
    }

    pub fn execution(&self) -> ScriptExecution {
        ScriptExecution {
            script_type: self.script_type.into(),
            execute_on: self.execute_on.into(),
            command: self.command.clone(),
            hostid: self.host_id,
            hostname: self.host_name.clone(),
            eventid: self.event_id,
            proxy_hostid: self.proxy_host_id,
            output: self.output.clone(),
            error: self.error.clone(),
        }
    }
}

pub async fn run_script(config_path: &Path, args: ScriptArgs) -> Result<()> {
    let config = load_config(config_path)?;
    let logger = build_logger(&config).await?;

    if !logger.is_enabled() {
        tracing::info!("Audit logging is disabled, nothing recorded");
    }

    logger
        .log_global_script(&args.actor(), &args.execution())
        .await?;
    Ok(())
}
