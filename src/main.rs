#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = examforge_client::run().await {
        eprintln!("examforge-client fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
