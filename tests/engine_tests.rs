//! Engine integration tests: full games driven through the public API,
//! with board-state invariants checked at every step.

use monopoly_rl::{
    BoardCatalog, DecisionProvider, EngineError, MonopolyEnv, MonopolyEnvBuilder, PlayerId,
    RandomPolicy, SquareId, NUM_PLAYERS,
};

/// Invariants that must hold in every reachable state.
fn assert_invariants(env: &MonopolyEnv) {
    let catalog = env.catalog();

    // Monopoly flags mirror uniform non-null group ownership.
    for (_, members) in catalog.groups() {
        let first = env.property(members[0]).owner;
        let expected = first.is_some() && members.iter().all(|&m| env.property(m).owner == first);
        for &m in members {
            assert_eq!(env.property(m).monopoly, expected);
        }
    }

    // The ownership table and the per-player owned lists agree.
    for (ordinal, st) in env.properties().iter().enumerate() {
        match st.owner {
            Some(owner) => assert!(env.player(owner).owns(ordinal)),
            None => assert!(env.players().iter().all(|p| !p.owns(ordinal))),
        }
    }

    for p in env.players() {
        assert!(p.cash >= 0, "{} has negative cash", p.id);
        if p.bankrupt {
            assert!(p.owned.is_empty());
            assert_eq!(p.cash, 0);
        }
    }

    // Improvements only stand on streets inside a monopoly.
    for (ordinal, st) in env.properties().iter().enumerate() {
        if st.houses > 0 {
            assert!(catalog.property(ordinal).is_street());
            assert!(st.monopoly, "houses stranded on a broken monopoly");
        }
    }
}

#[test]
fn reset_restores_the_starting_state() {
    let mut env = MonopolyEnv::new(17);
    let obs = env.reset();

    assert_eq!(obs.len(), 240);
    for pid in PlayerId::all(NUM_PLAYERS) {
        let p = env.player(pid);
        assert_eq!(p.cash, 1500);
        assert_eq!(p.position, SquareId::new(0));
        assert!(!p.in_jail && !p.bankrupt);
    }
    assert!(env.properties().iter().all(|p| p.owner.is_none()));
    assert!(!env.done());
    assert_eq!(env.winner(), None);
    assert_invariants(&env);
}

#[test]
fn random_rollout_preserves_invariants() {
    for seed in [1u64, 7, 42, 1234] {
        let mut env = MonopolyEnvBuilder::new().max_rounds(30).build(seed);
        let mut policy = RandomPolicy::new(seed ^ 0xABCD);

        for _ in 0..5_000 {
            if env.done() {
                break;
            }
            let actor = env.whose_turn();
            assert!(!env.player(actor).bankrupt, "bankrupt player got the turn");

            let legal = env.legal_actions(None);
            assert!(!legal.is_empty());

            let choice = policy.choose(&env, actor, &legal);
            let outcome = env.step(choice).unwrap();
            assert!(outcome.info.applied, "policy chose from the legal set");
            assert_eq!(outcome.observation.len(), 240);
            assert_invariants(&env);
        }
    }
}

#[test]
fn same_seed_and_actions_replay_identically() {
    let mut env_a = MonopolyEnvBuilder::new().max_rounds(25).build(99);
    let mut env_b = MonopolyEnvBuilder::new().max_rounds(25).build(99);
    let mut policy_a = RandomPolicy::new(5);
    let mut policy_b = RandomPolicy::new(5);

    for _ in 0..2_000 {
        if env_a.done() {
            assert!(env_b.done());
            break;
        }
        let legal_a = env_a.legal_actions(None);
        let legal_b = env_b.legal_actions(None);
        assert_eq!(legal_a, legal_b);

        let choice_a = policy_a.choose(&env_a, env_a.whose_turn(), &legal_a);
        let choice_b = policy_b.choose(&env_b, env_b.whose_turn(), &legal_b);
        assert_eq!(choice_a, choice_b);

        let out_a = env_a.step(choice_a).unwrap();
        let out_b = env_b.step(choice_b).unwrap();
        assert_eq!(out_a.observation, out_b.observation);
        assert_eq!(out_a.info, out_b.info);
        assert!((out_a.reward - out_b.reward).abs() < f64::EPSILON);
    }
    assert_eq!(env_a.winner(), env_b.winner());
}

#[test]
fn round_limit_ends_the_game_with_a_winner() {
    let mut env = MonopolyEnvBuilder::new().max_rounds(5).build(3);
    let mut policy = RandomPolicy::new(8);

    let mut steps = 0;
    while !env.done() {
        let legal = env.legal_actions(None);
        let choice = policy.choose(&env, env.whose_turn(), &legal);
        env.step(choice).unwrap();
        steps += 1;
        assert!(steps < 20_000, "game failed to terminate");
    }

    assert!(env.winner().is_some());
    assert!(env.round() >= 5 || env.players().iter().filter(|p| !p.bankrupt).count() <= 1);
}

#[test]
fn step_after_done_is_a_loud_error() {
    let mut env = MonopolyEnvBuilder::new().max_rounds(0).build(12);
    // Round counter already sits at the limit; any step finishes it.
    let outcome = env.step(0).unwrap();
    assert!(outcome.done);
    assert_eq!(env.step(0), Err(EngineError::GameFinished));
}

#[test]
fn out_of_range_index_is_a_loud_error() {
    let mut env = MonopolyEnv::new(4);
    let size = env.codec().space_size();
    assert!(matches!(env.step(size), Err(EngineError::InvalidAction(_))));
    // The failed call mutated nothing: stepping legally still works.
    let legal = env.legal_actions(None);
    assert!(env.step(legal[0]).is_ok());
}

#[test]
fn observation_length_is_constant_across_reachable_states() {
    let mut env = MonopolyEnvBuilder::new().max_rounds(10).build(21);
    let mut policy = RandomPolicy::new(2);

    let mut lengths = std::collections::HashSet::new();
    lengths.insert(env.reset().len());
    for _ in 0..1_500 {
        if env.done() {
            break;
        }
        let legal = env.legal_actions(None);
        let choice = policy.choose(&env, env.whose_turn(), &legal);
        lengths.insert(env.step(choice).unwrap().observation.len());
    }
    assert_eq!(lengths.len(), 1);
    assert!(lengths.contains(&240));
}

#[test]
fn codec_and_engine_agree_on_legal_indices() {
    // Every index the engine emits must decode cleanly.
    let mut env = MonopolyEnvBuilder::new().max_rounds(8).build(77);
    let mut policy = RandomPolicy::new(31);

    for _ in 0..1_000 {
        if env.done() {
            break;
        }
        for pid in PlayerId::all(NUM_PLAYERS) {
            for index in env.legal_actions(Some(pid)) {
                assert!(env.codec().decode(index).is_ok());
            }
        }
        let legal = env.legal_actions(None);
        let choice = policy.choose(&env, env.whose_turn(), &legal);
        env.step(choice).unwrap();
    }
}

#[test]
fn custom_catalog_drives_observation_and_codec_sizes() {
    let catalog = BoardCatalog::us_standard();
    let env = MonopolyEnvBuilder::new().catalog(catalog).build(1);
    assert_eq!(env.codec().space_size(), 2953);
    assert_eq!(env.observe(PlayerId::new(2)).len(), 240);
}
