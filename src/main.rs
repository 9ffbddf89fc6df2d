use commute::config::Config;
use commute::error::Error;
use commute::external::google_maps;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    let client = reqwest::Client::new();

    let seconds = google_maps::fetch_commute_duration(&client, &config).await?;

    println!("{}", seconds);

    Ok(())
}
