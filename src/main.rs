#[tokio::main]
async fn main() -> anyhow::Result<()> {
    focusdeck_lib::run().await
}
