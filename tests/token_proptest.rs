#![cfg(not(feature = "loom"))]

use lockstep::pipeline::{stage, StageContext};
use lockstep::{Pipeline, Token, TokenKind};
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_payload_never_equals_a_control_value(value in any::<u64>()) {
        let token = Token::Payload(value);
        prop_assert_eq!(token.kind(), TokenKind::Payload);
        prop_assert!(!token.is_control());
        prop_assert_ne!(&token, &Token::Noop);
        prop_assert_ne!(&token, &Token::Bootstrap);
        prop_assert_ne!(&token, &Token::Terminate);
        prop_assert_eq!(token.into_payload(), Some(value));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_payloads_arrive_in_order_and_cycles_add_up(
        values in proptest::collection::vec(any::<u64>(), 0..24),
        middle in 0usize..4,
    ) {
        let mut source = values.clone();
        source.reverse();
        let mut sunk = Vec::new();
        let report = {
            let mut pipeline: Pipeline<'_, u64> = Pipeline::new();
            pipeline.add_stage(stage::from_fn(move |_: Option<u64>, _: &StageContext<'_>| {
                source.pop().into()
            }));
            for _ in 0..middle {
                pipeline.add_stage(stage::from_fn(|input: Option<u64>, _: &StageContext<'_>| {
                    input.map_or(Token::Noop, Token::Payload)
                }));
            }
            pipeline.add_stage(stage::from_fn(|input: Option<u64>, _: &StageContext<'_>| {
                sunk.extend(input);
                Token::Bootstrap
            }));
            pipeline.run().unwrap()
        };

        prop_assert_eq!(&sunk, &values);
        prop_assert_eq!(report.cycles, (values.len() + middle + 2) as u64);
        prop_assert_eq!(report.reported_cycles, report.cycles - 1);
    }
}
