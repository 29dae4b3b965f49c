use std::{
    net::{IpAddr, Ipv4Addr},
    num::NonZeroU16,
};

use comms::JobId;
use serde::{Deserialize, Serialize};

const DEFAULT_WORKERS: NonZeroU16 = NonZeroU16::new(3).unwrap();
const DEFAULT_JOB_ID: JobId = 1;
const DEFAULT_MAX_ROUNDS: u32 = 2;
const DEFAULT_INTERVAL_MS: u64 = 1000;
const DEFAULT_LINGER_MS: u64 = 500;
const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// The specification of a single process topology.
///
/// One relay sits between every worker and the coordinator, each worker contributes
/// its own part of the same job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologySpec {
    /// The amount of workers, they produce parts `0..workers`.
    #[serde(default = "default_workers")]
    pub workers: NonZeroU16,
    #[serde(default = "default_job_id")]
    pub job_id: JobId,
    /// The amount of rounds every worker contributes, zero means unlimited.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// How long the relay and the coordinator outlive the last worker.
    #[serde(default = "default_linger_ms")]
    pub linger_ms: u64,
    /// The interface every role binds to.
    #[serde(default = "default_host")]
    pub host: IpAddr,
}

impl Default for TopologySpec {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            job_id: DEFAULT_JOB_ID,
            max_rounds: DEFAULT_MAX_ROUNDS,
            interval_ms: DEFAULT_INTERVAL_MS,
            linger_ms: DEFAULT_LINGER_MS,
            host: DEFAULT_HOST,
        }
    }
}

fn default_workers() -> NonZeroU16 {
    DEFAULT_WORKERS
}

fn default_job_id() -> JobId {
    DEFAULT_JOB_ID
}

fn default_max_rounds() -> u32 {
    DEFAULT_MAX_ROUNDS
}

fn default_interval_ms() -> u64 {
    DEFAULT_INTERVAL_MS
}

fn default_linger_ms() -> u64 {
    DEFAULT_LINGER_MS
}

fn default_host() -> IpAddr {
    DEFAULT_HOST
}
