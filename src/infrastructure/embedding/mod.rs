mod onnx;
mod qwen3;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use onnx::{FastembedEncoder, OnnxModelLoader};
pub use qwen3::{last_token_pool, Qwen3Encoder, Qwen3Source, TokenBatch};

/// Inference sessions hold no invariant a panicking `embed` could break, so a
/// poisoned lock is taken over instead of failing the model for the rest of the
/// process.
pub(crate) fn lock_recovering<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_lock_recovers_after_panic() {
        let session = Arc::new(Mutex::new(41));
        let poisoner = session.clone();

        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("inference panicked");
        })
        .join();

        assert!(session.is_poisoned());
        *lock_recovering(&*session) += 1;
        assert_eq!(*lock_recovering(&*session), 42);
    }
}
