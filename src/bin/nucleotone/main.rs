//! nucleotone - terminal sequence sonifier
//!
//! Run with: cargo run -- ACGTACGT

mod app;
mod ui;

use app::App;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let text = std::env::args().nth(1).unwrap_or_else(|| "ACGTACGT".to_string());

    let mut app = App::new(&text);
    ui::run(&mut app)
}
