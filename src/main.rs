use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = http_echo::cli::Cli::parse();
    if let Err(e) = http_echo::run::execute(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}
