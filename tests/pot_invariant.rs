/// Property-based tests for pot accounting using proptest
///
/// These tests drive the pure table engine with randomly generated action
/// sequences and verify the invariants that hold at every step: the pot is
/// exactly the sum of live bets, chips only move from stacks to the pot,
/// and a rejected action changes nothing at all.
use poker_tables::game::entities::{Action, Chips};
use poker_tables::game::{Table, TableRules, TableStatus};
use proptest::prelude::*;

fn action_strategy() -> impl Strategy<Value = (usize, Action)> {
    let action = prop_oneof![
        Just(Action::Check),
        Just(Action::Call),
        Just(Action::Fold),
        (1u64..60).prop_map(Action::Raise),
    ];
    (0usize..6, action)
}

fn buy_ins_strategy() -> impl Strategy<Value = Vec<Chips>> {
    prop::collection::vec(40u64..=200, 2..=6)
}

/// Seat `buy_ins.len()` players named p0, p1, ... and start a hand.
fn table_with_hand(buy_ins: &[Chips]) -> Table {
    let mut table = Table::new("prop", "prop", TableRules::default());
    for (i, &buy_in) in buy_ins.iter().enumerate() {
        table.seat_player(&format!("p{i}"), buy_in).unwrap();
    }
    table.start_hand().unwrap();
    table
}

fn sum_of_bets(table: &Table) -> Chips {
    table.players().map(|p| p.bet).sum()
}

proptest! {
    #[test]
    fn pot_always_equals_the_sum_of_bets(
        buy_ins in buy_ins_strategy(),
        moves in prop::collection::vec(action_strategy(), 0..40),
    ) {
        let mut table = table_with_hand(&buy_ins);
        prop_assert_eq!(table.pot(), sum_of_bets(&table));

        for (idx, action) in moves {
            let player_id = format!("p{}", idx % buy_ins.len());
            let _ = table.apply_action(&player_id, action);
            prop_assert_eq!(table.pot(), sum_of_bets(&table));
        }
    }

    #[test]
    fn chips_never_leave_the_table_mid_hand(
        buy_ins in buy_ins_strategy(),
        moves in prop::collection::vec(action_strategy(), 0..40),
    ) {
        let total: Chips = buy_ins.iter().sum();
        let mut table = table_with_hand(&buy_ins);

        for (idx, action) in moves {
            let player_id = format!("p{}", idx % buy_ins.len());
            let _ = table.apply_action(&player_id, action);

            // Stacks plus bets always add up to the original buy-ins.
            let stacks: Chips = table.players().map(|p| p.stack).sum();
            prop_assert_eq!(stacks + table.pot(), total);
        }
    }

    #[test]
    fn rejected_actions_change_nothing(
        buy_ins in buy_ins_strategy(),
        moves in prop::collection::vec(action_strategy(), 1..40),
    ) {
        let mut table = table_with_hand(&buy_ins);

        for (idx, action) in moves {
            let player_id = format!("p{}", idx % buy_ins.len());
            let before = table.snapshot();
            match table.apply_action(&player_id, action) {
                Ok(_) => {}
                Err(_) => prop_assert_eq!(table.snapshot(), before),
            }
        }
    }

    #[test]
    fn current_bet_is_monotone_while_betting(
        buy_ins in buy_ins_strategy(),
        moves in prop::collection::vec(action_strategy(), 0..40),
    ) {
        let mut table = table_with_hand(&buy_ins);
        let mut high_water = table.current_bet();

        for (idx, action) in moves {
            if table.status() != TableStatus::Betting {
                break;
            }
            let player_id = format!("p{}", idx % buy_ins.len());
            let _ = table.apply_action(&player_id, action);
            prop_assert!(table.current_bet() >= high_water);
            high_water = table.current_bet();
        }
    }

    #[test]
    fn a_finished_hand_pays_out_exactly_the_pot(
        buy_ins in buy_ins_strategy(),
        moves in prop::collection::vec(action_strategy(), 0..80),
    ) {
        let mut table = table_with_hand(&buy_ins);
        let mut ended = None;

        for (idx, action) in moves {
            let player_id = format!("p{}", idx % buy_ins.len());
            if let Ok(outcome) = table.apply_action(&player_id, action)
                && let Some(end) = outcome.ended
            {
                ended = Some(end);
                break;
            }
        }

        // Not every random sequence terminates the hand; when one does, the
        // reported payout is the whole pot and the table is done betting.
        if let Some(end) = ended {
            prop_assert_eq!(end.pot, table.pot());
            prop_assert_eq!(table.status(), TableStatus::Finished);
            prop_assert!(end.winner.is_some());
        }
    }
}
