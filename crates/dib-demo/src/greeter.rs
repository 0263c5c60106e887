use crate::clock::Clock;
use dib::{injectable, singleton};
use std::sync::Arc;

/// Builds greetings stamped with the current time
#[injectable]
#[singleton]
pub struct Greeter {
    greeting: String,
    clock: Arc<dyn Clock + Send + Sync>,
}

#[injectable]
impl Greeter {
    #[dib::inject]
    pub fn new(#[dib::named("greeting")] greeting: String, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { greeting, clock }
    }

    /// Greeting for `name`
    pub fn greet(&self, name: &str) -> String {
        format!("{}, {name}!", self.greeting)
    }

    /// Time source in use
    pub fn clock(&self) -> &Arc<dyn Clock + Send + Sync> {
        &self.clock
    }
}
