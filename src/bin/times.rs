#[cfg(unix)]
use std::time::Duration;

#[cfg(unix)]
use scee_lib::demo::{self, TIMES};

/// Prints the wall clock time every <delay> seconds; SIGUSR1 prints a status line
#[cfg(unix)]
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    scee_lib::logging::init("warn", false)?;

    let delay = demo::parse_delay(std::env::args().nth(1).as_deref());
    let requests = demo::status_requests()?;

    demo::run(
        &TIMES,
        delay,
        Duration::from_secs(delay),
        requests,
        std::io::stdout(),
    )
    .await?;
    Ok(())
}

#[cfg(not(unix))]
fn main() {
    eprintln!("times: SIGUSR1 status requests need a Unix-like system");
    std::process::exit(1);
}
