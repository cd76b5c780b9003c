use std::net::SocketAddr;

use anyhow::{Context, Result};

use smart_flashcards_lib::server;

use crate::app::App;

pub fn run(app: App, bind: Option<SocketAddr>) -> Result<()> {
    let mut config = app.config;
    if let Some(addr) = bind {
        config.host = addr.ip().to_string();
        config.port = addr.port();
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(server::run(config))
}
