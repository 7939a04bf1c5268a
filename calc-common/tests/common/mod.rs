use calc_common::{MockCalculatorServer, VerifierConfig};
use std::sync::Once;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_test_writer()
                    .with_target(true)
                    .with_line_number(true),
            )
            .with(filter)
            .init();
    });
}

/// Primary and mock calculator services running in-process.
pub struct Deployment {
    pub primary: MockCalculatorServer,
    pub mock: MockCalculatorServer,
}

impl Deployment {
    pub fn start() -> Self {
        Self {
            primary: MockCalculatorServer::start().expect("start primary service"),
            mock: MockCalculatorServer::start().expect("start mock service"),
        }
    }

    pub fn config(&self) -> VerifierConfig {
        VerifierConfig::for_urls(self.primary.base_url(), self.mock.base_url())
            .with_timeout(Duration::from_secs(2))
    }
}

/// A localhost port with nothing listening on it.
#[allow(dead_code)]
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    listener.local_addr().expect("local addr").port()
}
