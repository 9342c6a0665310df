use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use skyroof_device::Observatory;
use tracing::info;

use crate::cmd::{parse_duration, MonitorArgs};
use crate::exit::{CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_status, OutputFormat};

pub fn run(args: MonitorArgs, format: OutputFormat) -> CliResult<i32> {
    let tick = parse_duration(&args.tick)?;
    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut observatory = Observatory::new(args.roof.control());
    if let Some(telescope) = args.telescope_supervisor() {
        observatory = observatory.with_telescope(telescope);
    }
    info!(
        roof = %args.roof.device,
        schema = %args.roof.schema,
        telescope = args.telescope.as_deref().unwrap_or("-"),
        "monitoring"
    );

    let mut ticks = 0u64;
    while running.load(Ordering::SeqCst) {
        let status = observatory.tick();
        ticks += 1;
        print_status(ticks, &status, format);

        if args.count.is_some_and(|count| ticks >= count) {
            break;
        }
        std::thread::sleep(tick);
    }

    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
