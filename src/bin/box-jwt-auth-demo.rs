use std::error::Error;

use tracing::{error, info};

use box_jwt_auth::{cli::Cli, logging::Logging, AuthConfig, JwtAuthClient};

fn main() -> Result<(), Box<dyn Error>> {
    // init logging singleton
    Logging::try_init()?;

    let cli = Cli::init();

    let config = AuthConfig::load(&cli.config_path())?;
    let client = JwtAuthClient::try_new(config)?;

    info!("Requesting enterprise token");
    let enterprise_token = client.get_enterprise_token()?;
    info!(expires_in = ?enterprise_token.expires_in(), "Enterprise token obtained");

    let app_user =
        client.create_app_user_details(cli.app_user_name(), enterprise_token.access_token())?;
    info!(
        app_user_id = app_user.id(),
        name = app_user.name().unwrap_or_default(),
        login = app_user.login().unwrap_or_default(),
        status = app_user.status().unwrap_or_default(),
        "App user created"
    );

    let user_token = client.get_user_token(app_user.id());
    match &user_token {
        Ok(token) => info!(expires_in = ?token.expires_in(), "App user token obtained"),
        Err(err) => error!(%err, "Could not obtain the app user token"),
    }

    if cli.keep_app_user() {
        info!(app_user_id = app_user.id(), "Keeping app user");
    } else {
        client.delete_app_user_forced(app_user.id(), enterprise_token.access_token())?;
        info!(app_user_id = app_user.id(), "App user deleted");
    }

    user_token?;
    Ok(())
}
