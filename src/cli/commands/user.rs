//! Create user command handler

use crate::config::Config;
use crate::db::Store;
use crate::domain::Role;
use crate::services::{AuthService, SeaOrmAuthService};

pub async fn cmd_create_user(
    config: &Config,
    email: &str,
    role: Role,
    password: &str,
) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let auth = SeaOrmAuthService::new(store, config.security.clone());

    let user = auth.register(email, password, role, true).await?;

    println!("Created {} account: {}", user.role, user.email);
    let api_key = auth.get_api_key(&user.email).await?;
    println!("API key: {api_key}");

    Ok(())
}
