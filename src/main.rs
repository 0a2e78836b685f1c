#[tokio::main]
async fn main() -> std::io::Result<()> {
    scansight::run().await
}
