use mongodb::options::{ClientOptions, Credential};
use mongodb::Client;
use std::time::Duration;

use crate::config::settings::{SeedConfig, ADMIN_DATABASE};

const APP_NAME: &str = "inventory-seed";
const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(10);

async fn client_options(config: &SeedConfig) -> Result<ClientOptions, mongodb::error::Error> {
    let mut options = ClientOptions::parse(&config.mongodb_uri).await?;
    options.app_name = Some(APP_NAME.to_string());
    if options.server_selection_timeout.is_none() {
        options.server_selection_timeout = Some(SERVER_SELECTION_TIMEOUT);
    }
    Ok(options)
}

/// Connect without credentials. Used before the admin user exists.
pub async fn connect(config: &SeedConfig) -> Result<Client, mongodb::error::Error> {
    let options = client_options(config).await?;
    Client::with_options(options)
}

/// Connect as the configured admin principal, authenticating against `admin`.
pub async fn connect_as_admin(config: &SeedConfig) -> Result<Client, mongodb::error::Error> {
    let mut credential = Credential::default();
    credential.username = Some(config.admin_username.clone());
    credential.password = Some(config.admin_password.clone());
    credential.source = Some(ADMIN_DATABASE.to_string());

    let mut options = client_options(config).await?;
    options.credential = Some(credential);
    Client::with_options(options)
}
