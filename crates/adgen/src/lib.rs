#![doc = include_str!("../README.md")]

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod outcome;
pub mod processor;
pub mod queue;
pub mod service;
pub mod store;
pub mod task;
pub mod worker;

pub use config::JobConfig;
pub use dispatcher::Dispatcher;
pub use error::{Error, Result, INVALID_FILE_TYPE};
pub use outcome::Outcome;
pub use processor::{FnProcessor, Processor};
pub use queue::{JobQueue, JobReceiver};
pub use service::JobService;
pub use store::ResultStore;
pub use task::{Payload, Task, TaskId};
pub use worker::Worker;
