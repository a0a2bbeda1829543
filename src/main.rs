use clap::Parser;

use power_snake::{app, config};

/// Snake with timed power-ups, hazards and a secret maze.
#[derive(Parser, Debug)]
#[command(name = "power-snake", version, about)]
struct Cli {
    /// Activate every power-up once at game start
    #[arg(short, long)]
    test: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let settings = config::read_settings();
    log::debug!("settings: {:?}, self-test: {}", settings, cli.test);
    app::run(&settings, cli.test)
}
