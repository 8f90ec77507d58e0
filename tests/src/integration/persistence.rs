//! # Persistence and Atomicity
//!
//! State survives a restart through the file store, failed operations leave
//! no trace, and the inbound deposit counter is shared by every asset.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pg_04_batch_relay::{FileStateStore, StateStore};
    use shared_types::BridgeError;

    use crate::fixtures::*;

    const POWERS: [u64; 3] = [50, 30, 20];

    #[test]
    fn test_state_survives_reopen() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let (generation, checkpoint, committee) = {
            let mut bridge =
                Bridge::with_store(&POWERS, (2, 3), Arc::new(FileStateStore::open(dir.path())?))?;
            bridge.fund(ASSET, 100)?;
            bridge.fund(OTHER_ASSET, 100)?;

            let keys = bridge.keys.clone();
            let next = bridge.next_committee(&keys, &[34, 33, 33]);
            let slots = bridge.sign_rotation(&next, &[0, 1]);
            bridge.service.rotate_validator_set(next, &slots)?;

            let batch = uniform_batch(ASSET, 4, 2, 10, 3)?;
            let slots = bridge.sign_batch(&batch, &[0, 1, 2]);
            bridge.service.relay_batch(&ASSET, &batch, &slots)?;

            (
                bridge.service.generation(),
                *bridge.service.checkpoint(),
                bridge.service.committee().clone(),
            )
        };

        let reopened =
            Bridge::with_store(&POWERS, (2, 3), Arc::new(FileStateStore::open(dir.path())?))?;

        assert_eq!(reopened.service.generation(), generation);
        assert_eq!(*reopened.service.checkpoint(), checkpoint);
        assert_eq!(reopened.service.committee(), &committee);
        assert_eq!(reopened.service.last_batch_sequence(&ASSET), 4);
        assert_eq!(reopened.service.accrued_fees(&ASSET), 6);
        assert_eq!(reopened.service.deposit_sequence(), 2);
        Ok(())
    }

    #[test]
    fn test_replay_after_restart_still_stale() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let batch = uniform_batch(ASSET, 1, 1, 5, 0)?;
        {
            let mut bridge =
                Bridge::with_store(&POWERS, (2, 3), Arc::new(FileStateStore::open(dir.path())?))?;
            bridge.fund(ASSET, 100)?;
            let slots = bridge.sign_batch(&batch, &[0, 1]);
            bridge.service.relay_batch(&ASSET, &batch, &slots)?;
        }

        let mut reopened =
            Bridge::with_store(&POWERS, (2, 3), Arc::new(FileStateStore::open(dir.path())?))?;
        reopened.fund(ASSET, 100)?;
        let slots = reopened.sign_batch(&batch, &[0, 1, 2]);

        assert!(matches!(
            reopened.service.relay_batch(&ASSET, &batch, &slots),
            Err(BridgeError::StaleBatchSequence { last: 1, .. })
        ));
        Ok(())
    }

    #[test]
    fn test_custody_shortfall_mid_batch_leaves_everything() -> anyhow::Result<()> {
        let mut bridge = Bridge::genesis(&POWERS, (2, 3))?;
        bridge.fund(ASSET, 50)?;
        let before = bridge.service.state().clone();

        // The 6th transfer would overdraw custody
        let batch = uniform_batch(ASSET, 1, 6, 10, 1)?;
        let slots = bridge.sign_batch(&batch, &[0, 1, 2]);
        let err = bridge.service.relay_batch(&ASSET, &batch, &slots).unwrap_err();

        assert!(matches!(err, BridgeError::CustodyTransferFailed { .. }));
        assert_eq!(bridge.service.state(), &before);
        assert_eq!(bridge.store.load()?, Some(before));
        assert_eq!(bridge.custody.balance(&ASSET), 50);
        assert!(bridge.custody.outbound().is_empty());

        // The same batch goes through once custody is topped up
        bridge.fund(ASSET, 10)?;
        bridge.service.relay_batch(&ASSET, &batch, &slots)?;
        assert_eq!(bridge.custody.outbound().len(), 6);
        Ok(())
    }

    #[test]
    fn test_joint_custody_failure_keeps_old_committee() -> anyhow::Result<()> {
        let mut bridge = Bridge::genesis(&POWERS, (2, 3))?;
        let keys = bridge.keys.clone();
        let next = bridge.next_committee(&keys, &[1, 1, 1]);
        let batch = uniform_batch(ASSET, 1, 1, 10, 0)?;
        let slots = bridge.sign_joint(&next, &batch, &[0, 1, 2]);

        let err = bridge
            .service
            .rotate_and_relay_batch(next, &batch, &slots)
            .unwrap_err();

        assert!(matches!(err, BridgeError::CustodyTransferFailed { .. }));
        assert_eq!(bridge.service.generation(), 0);
        assert_eq!(bridge.service.last_batch_sequence(&ASSET), 0);
        Ok(())
    }

    #[test]
    fn test_store_failure_rejects_rotation() -> anyhow::Result<()> {
        let mut bridge = Bridge::genesis(&POWERS, (2, 3))?;
        let keys = bridge.keys.clone();
        let next = bridge.next_committee(&keys, &POWERS);
        let slots = bridge.sign_rotation(&next, &[0, 1, 2]);

        bridge.store.set_failing(true);
        let err = bridge
            .service
            .rotate_validator_set(next.clone(), &slots)
            .unwrap_err();
        assert!(matches!(err, BridgeError::Storage { .. }));
        assert_eq!(bridge.service.generation(), 0);

        bridge.store.set_failing(false);
        bridge.service.rotate_validator_set(next, &slots)?;
        assert_eq!(bridge.service.generation(), 1);
        Ok(())
    }

    #[test]
    fn test_deposit_sequence_is_global() -> anyhow::Result<()> {
        let mut bridge = Bridge::genesis(&POWERS, (2, 3))?;
        let source = [0x01; 20];
        let destination = [0x02; 32];

        let a = bridge.service.record_deposit(&ASSET, 10, &source, &destination)?;
        let b = bridge
            .service
            .record_deposit(&OTHER_ASSET, 20, &source, &destination)?;
        let c = bridge.service.record_deposit(&ASSET, 30, &source, &destination)?;

        assert_eq!((a.sequence, b.sequence, c.sequence), (1, 2, 3));
        assert_eq!(b.asset, OTHER_ASSET);
        assert_eq!(b.amount, 20);
        assert_eq!(bridge.service.deposit_sequence(), 3);
        assert_eq!(bridge.custody.balance(&ASSET), 40);
        Ok(())
    }
}
