use card_tokenizer::utils::{logger, validation::Validate};
use card_tokenizer::{CliCommand, CliConfig, RedisCardStore, Token};
use clap::Parser;
use std::collections::HashMap;
use std::io::Read;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting card-tokenizer CLI");

    // 驗證配置
    let config = cli.service_config()?;
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let store = RedisCardStore::connect(&config.redis_url()).await?;
    let service = config.build_service(store);

    let response = match cli.command {
        CliCommand::Issue { body } => {
            let body = match body {
                Some(body) => body,
                None => {
                    let mut buffer = String::new();
                    std::io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
            };
            service.issue(Some(body.trim())).await
        }
        CliCommand::Redeem { token } => {
            let mut headers = HashMap::new();
            headers.insert(
                "Authorization".to_string(),
                format!("Bearer {}", Token::new(token)),
            );
            service.redeem(&headers).await
        }
    };

    println!("{}", response.body);

    if !response.is_success() {
        tracing::warn!("Request finished with status {}", response.status_code);
        std::process::exit(1);
    }

    Ok(())
}
