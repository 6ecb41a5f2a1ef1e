use liftkey::{parse_floors, union_floors, Card, CardType, MemoryStorage, MergeEngine, VaultStore};
use proptest::prelude::*;
use proptest::test_runner::Config;
use std::collections::BTreeSet;

fn floor_lists() -> impl Strategy<Value = Vec<Vec<i32>>> {
    prop::collection::vec(prop::collection::vec(-5_i32..120, 1..8), 1..6)
}

fn cards_from(lists: &[Vec<i32>]) -> Vec<Card> {
    lists
        .iter()
        .enumerate()
        .map(|(i, floors)| Card::new("", &format!("04:{i:02X}"), floors.clone(), CardType::Old).unwrap())
        .collect()
}

proptest! {
    #![proptest_config(Config::with_cases(128))]

    #[test]
    fn merged_floors_are_the_exact_union(lists in floor_lists()) {
        let cards = cards_from(&lists);
        let refs: Vec<&Card> = cards.iter().collect();
        let merged = MergeEngine::new().merge(&refs, None).unwrap();

        let expected: Vec<i32> = lists.iter().flatten().copied().collect::<BTreeSet<_>>().into_iter().collect();
        prop_assert_eq!(merged.floors(), expected.as_slice());
        prop_assert_eq!(merged.card_type(), CardType::Merged);
    }

    #[test]
    fn merged_floors_do_not_depend_on_order(lists in floor_lists()) {
        let cards = cards_from(&lists);
        let forward: Vec<&Card> = cards.iter().collect();
        let backward: Vec<&Card> = cards.iter().rev().collect();

        let engine = MergeEngine::new();
        let a = engine.merge(&forward, None).unwrap();
        let b = engine.merge(&backward, None).unwrap();
        prop_assert_eq!(a.floors(), b.floors());
        prop_assert_ne!(a.id(), b.id());
    }

    #[test]
    fn every_merged_floor_comes_from_a_source(lists in floor_lists()) {
        let cards = cards_from(&lists);
        let floors = union_floors(cards.iter());
        for floor in floors {
            prop_assert!(cards.iter().any(|c| c.has_floor(floor)));
        }
    }

    #[test]
    fn parsed_floors_are_never_empty(input in "[0-9a-z ,.-]{0,24}") {
        let floors = parse_floors(&input);
        prop_assert!(!floors.is_empty());
        let unique: BTreeSet<i32> = floors.iter().copied().collect();
        prop_assert_eq!(unique.len(), floors.len());
    }

    #[test]
    fn add_then_remove_restores_vault(lists in floor_lists()) {
        let mut vault = VaultStore::open(MemoryStorage::new());
        for card in cards_from(&lists) {
            vault.add(card);
        }
        let before: Vec<String> = vault.cards().iter().map(|c| c.id().to_string()).collect();

        let extra = vault.add(Card::new("Extra", "04:EE", vec![1], CardType::New).unwrap()).id().to_string();
        vault.remove(&extra);

        let after: Vec<String> = vault.cards().iter().map(|c| c.id().to_string()).collect();
        prop_assert_eq!(before, after);
    }
}
