//! Annotated types wired by the facade tests

use std::sync::Arc;

#[dib::injectable]
#[dib::singleton]
#[derive(Debug, Default)]
pub struct Clock {
    pub offset: u32,
}

#[dib::injectable]
#[derive(Debug)]
pub struct Checkout {
    pub clock: Arc<Clock>,
}

#[dib::injectable]
impl Checkout {
    #[dib::inject]
    pub fn new(clock: Arc<Clock>) -> Self {
        Self { clock }
    }
}
