use anyhow::Result;
use clap::Parser;
use larch_cli::{Cli, init_logging, run};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let report = run(cli).await?;
    if let Some(err) = report.animation_error {
        eprintln!("larch: animation stopped early ({err}), target written directly");
    }
    Ok(())
}
