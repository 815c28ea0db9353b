/*!
 * syncptd - Syncpoint Host Demo
 *
 * Brings up a simulated host block and drives it through:
 * - a fenced submission retired by a producer thread
 * - hardware mutex contention
 * - suspend/resume with register restore
 *
 * An optional first argument names a JSON configuration file; otherwise the
 * defaults with environment overrides are used.
 */

use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

use syncpt_host::core::limits::SYNCPT_3D;
use syncpt_host::{init_tracing, HostDevice, SyncptConfig, SyncptError};

fn load_config() -> Result<SyncptConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading configuration {}", path))?;
            SyncptConfig::from_json(&json).with_context(|| format!("parsing configuration {}", path))
        }
        None => SyncptConfig::from_env().context("loading configuration from environment"),
    }
}

fn main() -> Result<()> {
    init_tracing();

    info!("syncptd starting...");
    let config = load_config()?;
    info!(
        nb_pts = config.nb_pts,
        nb_mtxs = config.nb_mtxs,
        check_period_ms = config.check_period.as_millis() as u64,
        "configuration loaded"
    );

    let dev = Arc::new(HostDevice::new(config).context("initializing host device")?);

    // Fenced submission retired by a producer
    let fence = dev.submit(SYNCPT_3D, 4)?;
    info!(id = SYNCPT_3D, fence, "submitted work");

    let producer = {
        let dev = dev.clone();
        thread::Builder::new()
            .name("producer".into())
            .spawn(move || -> Result<(), SyncptError> {
                for _ in 0..4 {
                    thread::sleep(Duration::from_millis(10));
                    dev.complete(SYNCPT_3D, 1)?;
                }
                Ok(())
            })
            .context("spawning producer")?
    };

    let value = dev
        .syncpt()
        .wait_timeout(SYNCPT_3D, fence, Duration::from_secs(1))
        .context("waiting for fence")?;
    info!(id = SYNCPT_3D, fence, value, "fence reached");

    producer
        .join()
        .map_err(|_| anyhow!("producer thread panicked"))??;

    // Mutex contention
    {
        let _lock = dev.syncpt().try_lock_guard(0)?;
        match dev.syncpt().mutex_try_lock(0) {
            Err(e @ SyncptError::Busy(_)) => info!(error = %e, "second acquire refused"),
            other => warn!(result = ?other, "unexpected second acquire result"),
        }
    }

    // Power cycle
    dev.suspend().context("suspending host device")?;
    dev.resume();
    info!(
        id = SYNCPT_3D,
        register = dev.hw().register(SYNCPT_3D)?,
        "register restored after resume"
    );

    println!("{}", serde_json::to_string_pretty(&dev.syncpt().stats())?);
    println!("{}", serde_json::to_string_pretty(&dev.syncpt().snapshot())?);

    info!("syncptd done");
    Ok(())
}
