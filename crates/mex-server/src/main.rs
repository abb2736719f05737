use mex_server::Server;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    mex_core::init_logging();
    mex_core::register_interrupt_handler();
    Server::run().await
}
