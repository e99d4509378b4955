//! Property-based tests for conversation addressing and the message log

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

use marketchat::backend::chat::store::{InMemoryStore, MessageStore};
use marketchat::shared::{ConversationKey, Participant};

#[derive(Debug, Clone)]
enum Op {
    Send { customer: i64, provider: i64, from_customer: bool },
    Read { customer: i64, provider: i64, as_customer: bool },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (1..4i64, 1..4i64, any::<bool>()).prop_map(|(customer, provider, from_customer)| Op::Send {
            customer,
            provider,
            from_customer,
        }),
        1 => (1..4i64, 1..4i64, any::<bool>()).prop_map(|(customer, provider, as_customer)| Op::Read {
            customer,
            provider,
            as_customer,
        }),
    ]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("test runtime")
}

proptest! {
    #[test]
    fn test_key_is_order_independent(c in any::<i64>(), p in any::<i64>()) {
        let customer = Participant::Customer(c);
        let provider = Participant::Provider(p);
        let forward = ConversationKey::between(customer, provider).unwrap();
        let backward = ConversationKey::between(provider, customer).unwrap();
        prop_assert_eq!(forward, backward);
        prop_assert_eq!(forward, ConversationKey::new(c, p));
    }

    #[test]
    fn test_key_is_injective(c1 in any::<i64>(), p1 in any::<i64>(), c2 in any::<i64>(), p2 in any::<i64>()) {
        let same_pair = c1 == c2 && p1 == p2;
        prop_assert_eq!(ConversationKey::new(c1, p1) == ConversationKey::new(c2, p2), same_pair);
    }

    #[test]
    fn test_swapped_ids_address_different_conversations(a in any::<i64>(), b in any::<i64>()) {
        prop_assume!(a != b);
        let one = ConversationKey::between(Participant::Customer(a), Participant::Provider(b)).unwrap();
        let other = ConversationKey::between(Participant::Customer(b), Participant::Provider(a)).unwrap();
        prop_assert_ne!(one, other);
    }

    #[test]
    fn test_same_kind_has_no_conversation(a in any::<i64>(), b in any::<i64>()) {
        prop_assert!(ConversationKey::between(Participant::Customer(a), Participant::Customer(b)).is_err());
        prop_assert!(ConversationKey::between(Participant::Provider(a), Participant::Provider(b)).is_err());
    }

    #[test]
    fn test_threads_agree_with_the_log(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let rt = runtime();
        rt.block_on(async {
            let store = InMemoryStore::new();
            let mut participants = HashSet::new();

            for op in &ops {
                match *op {
                    Op::Send { customer, provider, from_customer } => {
                        let key = ConversationKey::new(customer, provider);
                        let (sender, receiver) = if from_customer {
                            (key.customer(), key.provider())
                        } else {
                            (key.provider(), key.customer())
                        };
                        store.append(key, sender, receiver, "body").await.unwrap();
                        participants.insert(key.customer());
                        participants.insert(key.provider());
                    }
                    Op::Read { customer, provider, as_customer } => {
                        let key = ConversationKey::new(customer, provider);
                        let reader = if as_customer { key.customer() } else { key.provider() };
                        store.mark_read(key, reader).await.unwrap();
                    }
                }
            }

            for participant in participants {
                let rows = store.threads(participant).await.unwrap();
                let mut seen = HashMap::new();

                for row in &rows {
                    let history = store.history(row.key).await.unwrap();
                    let unread = history.iter().filter(|m| m.is_unread_for(participant)).count() as u64;

                    prop_assert!(row.key.involves(participant));
                    prop_assert_eq!(row.unread_count, unread);
                    prop_assert_eq!(Some(&row.last_message), history.last());
                    prop_assert!(history.windows(2).all(|w| w[0].id < w[1].id));
                    prop_assert!(seen.insert(row.key, ()).is_none(), "one row per conversation");
                }

                prop_assert!(rows
                    .windows(2)
                    .all(|w| w[0].last_message.created_at >= w[1].last_message.created_at));
            }
            Ok::<(), TestCaseError>(())
        })?;
    }
}
