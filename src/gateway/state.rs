use std::sync::Arc;

use crate::verify::Verifier;

#[derive(Clone)]
pub struct HandlerState {
    pub verifier: Arc<Verifier>,
}

impl HandlerState {
    pub fn new(verifier: Verifier) -> Self {
        Self {
            verifier: Arc::new(verifier),
        }
    }

    pub fn from_shared(verifier: Arc<Verifier>) -> Self {
        Self { verifier }
    }
}
