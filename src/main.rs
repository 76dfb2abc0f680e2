#[tokio::main]
async fn main() {
    scheduling_engine::run().await;
}
