use std::time::Duration;

use anyhow::Result;
use adgen::{JobConfig, JobService, Processor};

use crate::pipeline::ListingProcessor;
use crate::server::RouterArgs;

/// Requests not answered within this time get `408 Request Timeout`.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Represents the state of the server.
pub struct ServerState {
    pub jobs: JobService,
    pub request_timeout: Duration,
}

impl ServerState {
    pub fn new(args: &RouterArgs) -> Result<Self> {
        let processor = ListingProcessor::new(args.simulate_delay());
        let state = Self::with_processor(processor, args.job_config())?;
        Ok(state.with_request_timeout(args.request_timeout()))
    }

    pub fn with_processor<P>(processor: P, config: JobConfig) -> Result<Self>
    where
        P: Processor,
    {
        let jobs = JobService::start(processor, config)?;
        Ok(Self {
            jobs,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
