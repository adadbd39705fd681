use serde_json::Value;

use crate::task::Payload;

/// Trait representing a (stateful) and possibly slow job processor. It is
/// called off the async runtime, one payload at a time.
pub trait Processor
where
    Self: Send + 'static,
{
    fn process(&mut self, payload: Payload) -> anyhow::Result<Value>;
}

impl Processor for Box<dyn Processor> {
    fn process(&mut self, payload: Payload) -> anyhow::Result<Value> {
        (**self).process(payload)
    }
}

/// Adapts a closure into a [`Processor`].
pub struct FnProcessor<F>
where
    F: FnMut(Payload) -> anyhow::Result<Value> + Send + 'static,
{
    op: F,
}

impl<F> FnProcessor<F>
where
    F: FnMut(Payload) -> anyhow::Result<Value> + Send + 'static,
{
    pub fn new(op: F) -> Self {
        Self { op }
    }
}

impl<F> From<F> for FnProcessor<F>
where
    F: FnMut(Payload) -> anyhow::Result<Value> + Send + 'static,
{
    fn from(op: F) -> Self {
        Self::new(op)
    }
}

impl<F> Processor for FnProcessor<F>
where
    F: FnMut(Payload) -> anyhow::Result<Value> + Send + 'static,
{
    fn process(&mut self, payload: Payload) -> anyhow::Result<Value> {
        (self.op)(payload)
    }
}
