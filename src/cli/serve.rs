use crate::{config::Config, server, warning};

pub async fn serve(config: Config) {
    if let Err(e) = server::start_api_server(config).await {
        warning!("Relay stopped: {}", e);
    }
}
