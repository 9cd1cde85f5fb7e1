//! Watch one EW-DX device from the command line
//!
//! Loads an adapter configuration from a JSON file, then prints every
//! connection status change and, whenever the model changes, the full
//! variable table.
//!
//! Run with: cargo run -p ewdx-sdk --example monitor -- device.json
//!
//! Set `EWDX_LOG_MODE=development` for adapter logs on stderr.

use std::collections::BTreeMap;

use ewdx_sdk::logging::init_logging_from_env;
use ewdx_sdk::{Adapter, AdapterConfig, StateChange, VariableValue};
use tokio::sync::broadcast::error::RecvError;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging_from_env()?;

    let path = std::env::args()
        .nth(1)
        .ok_or("usage: monitor <config.json>")?;
    let config = AdapterConfig::from_file(&path)?;
    println!(
        "Monitoring {} ({}, {})",
        config.host, config.model, config.protocol
    );

    let adapter = Adapter::new();
    let mut status = adapter.watch_status();
    adapter.configure(config).await?;

    let reader = adapter.reader().await.ok_or("adapter has no device")?;
    let mut changes = reader.subscribe();
    let mut last = BTreeMap::new();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                println!("status: {}", *status.borrow_and_update());
            }
            change = changes.recv() => match change {
                Ok(StateChange::Reset) => {
                    println!("model reset");
                    last.clear();
                }
                Ok(_) | Err(RecvError::Lagged(_)) => {
                    let current = adapter.variables().await;
                    print_changed(&last, &current);
                    last = current;
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    adapter.shutdown().await;
    Ok(())
}

fn print_changed(
    before: &BTreeMap<String, VariableValue>,
    after: &BTreeMap<String, VariableValue>,
) {
    for (id, value) in after {
        if before.get(id) != Some(value) {
            println!("  {:<32} {}", id, value);
        }
    }
}
