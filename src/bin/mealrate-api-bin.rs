use mealrate_rs::config::StoreConfig;
use mealrate_rs::constants::DEFAULT_DB;
use mealrate_rs::db_operations::MenuDb;
use mealrate_rs::server::serve;
use mealrate_rs::shared_main::logger_init;

use clap::Parser;

/// HTTP API serving hall averages and dish ratings, and accepting new ratings.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// SQLite file holding dishes, offers and ratings
    #[arg(long, env = "MEALRATE_DB", default_value = DEFAULT_DB)]
    db: String,
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(short, long, env = "PORT", default_value_t = 4000)]
    port: u16,
    /// Enable verbose logging{n}[SETS env: RUST_LOG=debug]
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.verbose {
        std::env::set_var("RUST_LOG", "debug");
    }

    logger_init(module_path!());

    serve(MenuDb::new(StoreConfig::new(&args.db)), &args.host, args.port).await
}
