//! Property tests for the travel store contract.

use proptest::prelude::*;
use travel_service::{InMemoryTravelStore, StoreError, Travel, TravelId, TravelStore};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn travel_strategy() -> impl Strategy<Value = Travel> {
    (".{0,40}", "[a-z0-9/:._-]{0,60}", any::<bool>())
        .prop_map(|(name, photo, done)| Travel::new(name, photo, done))
}

proptest! {
    #[test]
    fn insert_then_find_returns_payload(payload in travel_strategy()) {
        let rt = runtime();
        rt.block_on(async {
            let store = InMemoryTravelStore::new();
            let mut inserted = payload.clone();
            store.insert_one(&mut inserted).await.unwrap();

            let found = store.find_one(&inserted.id.to_hex()).await.unwrap();

            prop_assert!(!found.id.is_nil());
            prop_assert_eq!(found.clone().with_id(TravelId::nil()), payload);
            Ok::<(), TestCaseError>(())
        })?;
    }

    #[test]
    fn absent_ids_behave_as_documented(count in 0usize..5) {
        let rt = runtime();
        rt.block_on(async {
            let store = InMemoryTravelStore::new();
            for i in 0..count {
                store.insert_one(&mut Travel::new(format!("t{i}"), "", false)).await.unwrap();
            }
            let absent = TravelId::new().to_hex();

            let missing = store.find_one(&absent).await;
            prop_assert!(matches!(missing, Err(StoreError::NotFound(_))));
            prop_assert!(store.delete_one(&absent).await.is_ok());
            prop_assert!(store.update_one(&absent, &mut Travel::default()).await.is_ok());
            prop_assert_eq!(store.len(), count);
            Ok::<(), TestCaseError>(())
        })?;
    }

    #[test]
    fn delete_removes_exactly_one(names in prop::collection::vec("[a-z]{1,8}", 1..8), pick in any::<prop::sample::Index>()) {
        let rt = runtime();
        rt.block_on(async {
            let store = InMemoryTravelStore::new();
            let mut ids = Vec::new();
            for name in &names {
                let mut travel = Travel::new(name.clone(), "", false);
                store.insert_one(&mut travel).await.unwrap();
                ids.push(travel.id);
            }
            let victim = ids[pick.index(ids.len())];

            store.delete_one(&victim.to_hex()).await.unwrap();

            let remaining: Vec<TravelId> = store.find_all().await.unwrap().into_iter().map(|t| t.id).collect();
            prop_assert!(!remaining.contains(&victim));
            prop_assert_eq!(remaining.len(), ids.len() - 1);
            Ok::<(), TestCaseError>(())
        })?;
    }
}
