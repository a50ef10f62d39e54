//! Background mining.
//!
//! Mining is CPU bound and unbounded, so it runs on tokio's blocking pool.
//! The caller keeps a [`MiningTask`] that reports progress, can cancel the
//! search, and resolves exactly once.

use rand::{CryptoRng, RngCore};
use tokio::task::JoinHandle;
use tracing::debug;

use sigil_core::error::{Result, SigilError};
use sigil_crypto::{check_prefix_length, mine, mine_with_rng, MiningControl, MiningOutcome};

/// Handle to a mining search running on a blocking worker.
///
/// Dropping the handle cancels the search.
#[derive(Debug)]
pub struct MiningTask {
    control: MiningControl,
    prefix_length: u8,
    handle: Option<JoinHandle<Result<MiningOutcome>>>,
}

impl MiningTask {
    /// Starts mining with the system CSPRNG.
    ///
    /// # Errors
    /// Returns `InvalidPrefixLength` without spawning anything if the prefix
    /// is out of range.
    pub fn spawn(prefix_length: u8) -> Result<Self> {
        check_prefix_length(prefix_length)?;
        let control = MiningControl::new();
        let worker = control.clone();
        let handle = tokio::task::spawn_blocking(move || mine(prefix_length, &worker));
        Ok(Self::from_parts(control, prefix_length, handle))
    }

    /// Starts mining with the given random source.
    pub fn spawn_with_rng<R>(mut rng: R, prefix_length: u8) -> Result<Self>
    where
        R: RngCore + CryptoRng + Send + 'static,
    {
        check_prefix_length(prefix_length)?;
        let control = MiningControl::new();
        let worker = control.clone();
        let handle =
            tokio::task::spawn_blocking(move || mine_with_rng(&mut rng, prefix_length, &worker));
        Ok(Self::from_parts(control, prefix_length, handle))
    }

    fn from_parts(
        control: MiningControl,
        prefix_length: u8,
        handle: JoinHandle<Result<MiningOutcome>>,
    ) -> Self {
        debug!(prefix_length, "Mining started");
        Self {
            control,
            prefix_length,
            handle: Some(handle),
        }
    }

    /// Requests cancellation. [`outcome`](Self::outcome) then resolves to
    /// `Cancelled` unless a match was already found.
    pub fn cancel(&self) {
        self.control.cancel();
    }

    /// Returns the number of key pairs tried so far.
    pub fn attempts(&self) -> u64 {
        self.control.attempts()
    }

    /// Returns the requested prefix length.
    pub fn prefix_length(&self) -> u8 {
        self.prefix_length
    }

    /// Returns a control sharing this task's cancel flag and counter.
    pub fn control(&self) -> MiningControl {
        self.control.clone()
    }

    /// Waits for the search to finish.
    pub async fn outcome(mut self) -> Result<MiningOutcome> {
        let handle = self
            .handle
            .take()
            .ok_or_else(|| SigilError::InternalError("mining outcome already taken".into()))?;

        let outcome = handle
            .await
            .map_err(|e| SigilError::InternalError(format!("mining worker failed: {}", e)))??;

        match &outcome {
            MiningOutcome::Found(mined) => {
                debug!(attempts = mined.attempts, "Mining found a match")
            }
            MiningOutcome::Cancelled { attempts } => debug!(attempts, "Mining cancelled"),
        }
        Ok(outcome)
    }
}

impl Drop for MiningTask {
    fn drop(&mut self) {
        // No-op if the search already finished
        self.control.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::GatedRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use sigil_core::constants::MAX_PREFIX_LENGTH;
    use sigil_crypto::matches_prefix;

    #[tokio::test]
    async fn test_prefix_zero_resolves_first_attempt() {
        let task = MiningTask::spawn(0).unwrap();
        let mined = task.outcome().await.unwrap().found().unwrap();
        assert_eq!(mined.attempts, 1);
    }

    #[tokio::test]
    async fn test_seeded_task_is_deterministic() {
        let a = MiningTask::spawn_with_rng(ChaCha20Rng::seed_from_u64(1), 4)
            .unwrap()
            .outcome()
            .await
            .unwrap()
            .found()
            .unwrap();
        let b = MiningTask::spawn_with_rng(ChaCha20Rng::seed_from_u64(1), 4)
            .unwrap()
            .outcome()
            .await
            .unwrap()
            .found()
            .unwrap();

        assert_eq!(a.address, b.address);
        assert_eq!(a.attempts, b.attempts);
        assert!(matches_prefix(&a.address));
    }

    #[tokio::test]
    async fn test_invalid_prefix_spawns_nothing() {
        assert!(matches!(
            MiningTask::spawn(MAX_PREFIX_LENGTH + 1),
            Err(SigilError::InvalidPrefixLength { .. })
        ));
    }

    #[tokio::test]
    async fn test_cancel_resolves_cancelled() {
        let (rng, release) = GatedRng::new(5);
        let task = MiningTask::spawn_with_rng(rng, MAX_PREFIX_LENGTH).unwrap();
        task.cancel();
        let _ = release.send(());

        // The worker sees the flag before its first attempt or right after it
        let outcome = task.outcome().await.unwrap();
        assert!(
            matches!(outcome, MiningOutcome::Cancelled { attempts } if attempts <= 1),
            "unexpected outcome {:?}",
            outcome
        );
    }

    #[tokio::test]
    async fn test_drop_cancels_worker() {
        let task = MiningTask::spawn(MAX_PREFIX_LENGTH).unwrap();
        let control = task.control();
        assert_eq!(task.prefix_length(), MAX_PREFIX_LENGTH);

        drop(task);
        assert!(control.is_cancelled());
    }
}
