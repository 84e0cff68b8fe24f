use aws_config::BehaviorVersion;
use aws_sdk_secretsmanager::Client as SecretsClient;
use lambda_runtime::{run, service_fn, tracing, Error};
use rds_lambda::db::SecretsManagerConnector;
use rds_lambda::event_handler::function_handler;
use rds_lambda::Config;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::subscriber::fmt().json().init();
    let config = Config::from_env()?;
    let shared_config = aws_config::load_defaults(BehaviorVersion::v2025_01_17()).await;
    let connector = SecretsManagerConnector::new(
        SecretsClient::new(&shared_config),
        config.db_secret_arn.clone(),
    )
    .with_connect_timeout(config.db_connect_timeout());
    run(service_fn(|event| function_handler(event, &connector))).await
}
