use clap::{Parser, Subcommand};
use log::info;
use opensea_scraper::{ChromiumDriver, Mode, OpenseaScraper, ScraperConfig, ScraperResult};
use serde::Serialize;
use std::time::Duration;
use url::Url;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,

    /// Browser mode (headless | debug). Debug shows the window and leaves it open.
    #[arg(long, default_value_t = Mode::Headless, global = true)]
    mode: Mode,

    /// Seconds to wait for the anti-bot challenge to clear
    #[arg(long, default_value_t = 60, global = true)]
    challenge_timeout_secs: u64,

    /// Chrome/Chromium executable to launch instead of the detected one
    #[arg(long, env = "CHROME_PATH", global = true)]
    chrome_path: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lowest buy-now ETH price of a collection
    FloorPrice { slug: String },

    /// Lowest ETH price on an arbitrary listing URL
    FloorPriceByUrl { url: Url },

    /// Up to 32 listed prices read from the page's embedded state
    FloorPrices { slug: String },

    /// Top collections by total volume, ~100 per page
    Rankings {
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },

    /// Cheapest offers of a collection
    Offers {
        slug: String,
        #[arg(long, default_value_t = 10)]
        size: usize,
    },
}

#[tokio::main]
async fn main() -> ScraperResult<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Warn)
        .filter_module("opensea_scraper", log::LevelFilter::Info)
        .filter_module("chromiumoxide", log::LevelFilter::Error)
        .filter_module("selectors", log::LevelFilter::Warn)
        .filter_module("html5ever", log::LevelFilter::Error)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    let mut driver = ChromiumDriver::new();
    if let Some(path) = &cli.chrome_path {
        driver = driver.with_chrome_path(path);
    }
    let config = ScraperConfig::default()
        .with_challenge_timeout(Duration::from_secs(cli.challenge_timeout_secs));
    let scraper = OpenseaScraper::new(Box::new(driver)).with_config(config);
    let mode = cli.mode;

    let outcome = match cli.cmd {
        Command::FloorPrice { slug } => print_json(&scraper.floor_price(&slug, mode).await?),
        Command::FloorPriceByUrl { url } => {
            print_json(&scraper.floor_price_by_url(&url, mode).await?)
        }
        Command::FloorPrices { slug } => print_json(&scraper.floor_prices(&slug, mode).await?),
        Command::Rankings { pages } => print_json(&scraper.rankings(pages, mode).await?),
        Command::Offers { slug, size } => print_json(&scraper.offers(&slug, size, mode).await?),
    };

    scraper.stats().finish();
    scraper.stats().log_summary();

    if !mode.auto_teardown() {
        info!("Debug mode: browser left open, press Ctrl+C to exit");
        tokio::signal::ctrl_c().await?;
    }

    outcome
}

/// Pretty JSON on stdout; an absent record prints as `null`.
fn print_json<T: Serialize>(value: &T) -> ScraperResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "opensea-scraper",
            "rankings",
            "--pages",
            "3",
            "--mode",
            "debug",
            "--chrome-path",
            "/opt/chrome",
        ])
        .unwrap();

        assert_eq!(cli.mode, Mode::Debug);
        assert_eq!(cli.chrome_path.as_deref(), Some("/opt/chrome"));
        assert!(matches!(cli.cmd, Command::Rankings { pages: 3 }));
    }

    #[test]
    fn test_chrome_path_falls_back_to_env() {
        std::env::set_var("CHROME_PATH", "/usr/bin/chromium");
        let cli = Cli::try_parse_from(["opensea-scraper", "floor-price", "azuki"]).unwrap();
        std::env::remove_var("CHROME_PATH");

        assert_eq!(cli.chrome_path.as_deref(), Some("/usr/bin/chromium"));
        assert_eq!(cli.mode, Mode::Headless);
        assert_eq!(cli.challenge_timeout_secs, 60);
    }
}
