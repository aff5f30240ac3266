use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use boathub_client::{BoatHubClient, ClientConfig, Credentials, Pageable, SortDirection};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=debug,boathub_client=debug", env!("CARGO_CRATE_NAME")).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let client = BoatHubClient::new(ClientConfig::from_env())?;
    tracing::info!("Talking to {}", client.config().base_url);

    client.init().await;

    if !client.session().check_auth().await {
        // Credentials come from the environment so they never end up in shell history
        let (Ok(username), Ok(password)) = (
            std::env::var("BOATHUB_USERNAME"),
            std::env::var("BOATHUB_PASSWORD"),
        ) else {
            tracing::warn!("Not signed in; set BOATHUB_USERNAME and BOATHUB_PASSWORD to log in");
            return Ok(());
        };

        if !client
            .session()
            .login(&Credentials::new(username, password))
            .await
        {
            let error = client.session().snapshot().last_error.unwrap_or_default();
            tracing::error!("Login failed: {}", error);
            return Ok(());
        }
    }

    tracing::info!(
        "Signed in as {}",
        client.session().username().unwrap_or_default()
    );

    let page = client
        .boats()
        .list(&Pageable::new(0, 20).sorted("name", SortDirection::Asc))
        .await?;
    println!(
        "{} boat(s), page {} of {}",
        page.total_elements,
        page.number + 1,
        page.total_pages.max(1)
    );
    for boat in &page.content {
        println!(
            "#{:<4} {:<24} {:<14} {}",
            boat.id,
            boat.name,
            boat.boat_type,
            boat.description.as_deref().unwrap_or("-")
        );
    }

    client.session().logout().await;
    if let Some(error) = client.session().snapshot().last_error {
        tracing::warn!("Logout reported: {}", error);
    }

    Ok(())
}
