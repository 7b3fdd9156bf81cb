#[tokio::main]
async fn main() -> anyhow::Result<()> {
    depgraph_lib::main().await
}
