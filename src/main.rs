#[tokio::main]
async fn main() {
    if let Err(e) = pillbox::run().await {
        tracing::error!(error = %e, "fatal");
        eprintln!("pillbox: {e}");
        std::process::exit(1);
    }
}
