// Property tests for DistributedLock
// Random acquire/release sequences must never grant a key to two tokens at once

use std::collections::HashMap;
use std::sync::Arc;

use kvlock::{DistributedLock, KeyValueStore, MemoryStore};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Acquire { key: usize, token: usize },
    Release { key: usize, token: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..3usize, 0..4usize).prop_map(|(key, token)| Op::Acquire { key, token }),
        (0..3usize, 0..4usize).prop_map(|(key, token)| Op::Release { key, token }),
    ]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The lock agrees with a model where each key has at most one holder and
    /// only the holder's release clears it.
    #[test]
    fn prop_lock_matches_single_holder_model(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let rt = runtime();
        rt.block_on(async {
            let store = Arc::new(MemoryStore::new());
            let lock = DistributedLock::new(store.clone());
            let mut holders: HashMap<usize, usize> = HashMap::new();

            for op in ops {
                match op {
                    Op::Acquire { key, token } => {
                        let acquired = lock
                            .acquire(&format!("key-{key}"), &format!("token-{token}"), 60)
                            .await;
                        let expected = !holders.contains_key(&key);
                        prop_assert_eq!(acquired, expected);
                        if acquired {
                            holders.insert(key, token);
                        }
                    }
                    Op::Release { key, token } => {
                        let release_key = format!("key-{key}");
                        let release_token = format!("token-{token}");
                        prop_assert!(lock.release(&release_key, &release_token).await);
                        if holders.get(&key) == Some(&token) {
                            holders.remove(&key);
                        }
                    }
                }

                for key in 0..3usize {
                    let stored = store.get(&format!("key-{key}")).await.unwrap();
                    let modeled = holders.get(&key).map(|token| format!("token-{token}"));
                    prop_assert_eq!(stored, modeled);
                }
            }
            Ok(())
        })?;
    }
}
