//! # Shared Bridge Under Contention
//!
//! Relayers sharing one bridge behind a `parking_lot::Mutex`: exactly one
//! submission of a claim wins, every other one sees the advanced state.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use parking_lot::Mutex;
    use shared_types::BridgeError;

    use crate::fixtures::*;

    const RELAYERS: usize = 8;

    #[test]
    fn test_racing_relayers_release_once() -> anyhow::Result<()> {
        let mut bridge = Bridge::genesis(&[10, 10, 10], (2, 3))?;
        bridge.fund(ASSET, 1_000)?;
        let batch = uniform_batch(ASSET, 1, 5, 10, 1)?;
        let slots = bridge.sign_batch(&batch, &[0, 1]);

        let custody = bridge.custody.clone();
        let service = Arc::new(Mutex::new(bridge.service));

        let handles: Vec<_> = (0..RELAYERS)
            .map(|_| {
                let service = service.clone();
                let batch = batch.clone();
                let slots = slots.clone();
                thread::spawn(move || service.lock().relay_batch(&ASSET, &batch, &slots))
            })
            .collect();

        let results: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("relayer thread panicked"))
            .collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, BridgeError::StaleBatchSequence { last: 1, .. })));
        assert_eq!(custody.outbound().len(), 5);
        assert_eq!(service.lock().accrued_fees(&ASSET), 5);
        Ok(())
    }

    #[test]
    fn test_racing_rotations_advance_once() -> anyhow::Result<()> {
        let bridge = Bridge::genesis(&[10, 10, 10], (2, 3))?;
        let keys = bridge.keys.clone();
        let next = bridge.next_committee(&keys, &[5, 5, 5]);
        let slots = bridge.sign_rotation(&next, &[0, 1, 2]);
        let service = Arc::new(Mutex::new(bridge.service));

        let handles: Vec<_> = (0..RELAYERS)
            .map(|_| {
                let service = service.clone();
                let next = next.clone();
                let slots = slots.clone();
                thread::spawn(move || service.lock().rotate_validator_set(next, &slots))
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().expect("relayer thread panicked"))
            .filter(Result::is_ok)
            .count();

        assert_eq!(wins, 1);
        assert_eq!(service.lock().generation(), 1);
        Ok(())
    }
}
