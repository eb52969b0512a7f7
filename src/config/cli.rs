use crate::config::policy_file::PolicyFile;
use crate::config::service::ServiceConfig;
use crate::utils::error::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "card-tokenizer")]
#[command(about = "Issue and redeem short-lived card tokens")]
pub struct CliConfig {
    #[arg(long, help = "Redis host (defaults to REDIS_HOST or 127.0.0.1)")]
    pub redis_host: Option<String>,

    #[arg(long, help = "Redis port (defaults to REDIS_PORT or 6379)")]
    pub redis_port: Option<u16>,

    #[arg(long, help = "TOML file with the validation policy")]
    pub policy: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Tokenize a card payload (JSON from --body or stdin)
    Issue {
        #[arg(long)]
        body: Option<String>,
    },
    /// Fetch the card data behind a token
    Redeem {
        #[arg(long)]
        token: String,
    },
}

impl CliConfig {
    /// 環境變數為基礎，命令列參數優先
    pub fn service_config(&self) -> Result<ServiceConfig> {
        let mut config = ServiceConfig::from_env()?;

        if let Some(host) = &self.redis_host {
            config.redis_host = host.clone();
        }
        if let Some(port) = self.redis_port {
            config.redis_port = port;
        }
        if let Some(path) = &self.policy {
            config.policy = PolicyFile::from_file(path)?.into_policy();
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_issue() {
        let config = CliConfig::parse_from([
            "card-tokenizer",
            "--redis-port",
            "6380",
            "issue",
            "--body",
            "{}",
        ]);
        assert_eq!(config.redis_port, Some(6380));
        assert!(matches!(config.command, CliCommand::Issue { body: Some(ref b) } if b == "{}"));
    }

    #[test]
    fn test_parse_redeem() {
        let config =
            CliConfig::parse_from(["card-tokenizer", "--verbose", "redeem", "--token", "abc"]);
        assert!(config.verbose);
        assert!(matches!(config.command, CliCommand::Redeem { ref token } if token == "abc"));
    }
}
