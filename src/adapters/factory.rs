//! Source and destination factory
//!
//! Builds the adapters an export needs from configuration.

use crate::adapters::destination::{Destination, IpcFileDestination, NullDestination};
use crate::adapters::source::{BatchSource, IpcFileSource};
use crate::config::schema::SluiceConfig;
use crate::core::fault::FaultInjectingSource;
use std::sync::Arc;

/// Create the batch source described by the configuration
///
/// The source is wrapped in a [`FaultInjectingSource`] when
/// `fault_injection.fail_after_records` is set.
pub fn create_source(config: &SluiceConfig) -> Arc<dyn BatchSource> {
    tracing::info!(path = %config.export.source_path, "Creating Arrow IPC source");
    let source: Arc<dyn BatchSource> = Arc::new(IpcFileSource::new(&config.export.source_path));

    match config.fault_injection.fail_after_records {
        Some(fail_after_records) => {
            tracing::warn!(
                fail_after_records,
                "Fault injection enabled, source will fail mid-stream"
            );
            Arc::new(FaultInjectingSource::new(source, fail_after_records))
        }
        None => source,
    }
}

/// Create the destination described by the configuration
///
/// Dry runs get a [`NullDestination`].
pub fn create_destination(config: &SluiceConfig) -> Box<dyn Destination> {
    if config.export.dry_run {
        tracing::info!("Dry run, slices will be discarded");
        Box::new(NullDestination::new())
    } else {
        tracing::info!(path = %config.export.destination_path, "Creating Arrow IPC destination");
        Box::new(IpcFileDestination::new(&config.export.destination_path))
    }
}
