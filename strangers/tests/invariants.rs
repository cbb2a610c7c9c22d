use std::collections::HashSet;

use chrono::{Duration, TimeZone, Utc};

use rand::Rng;

use rand_xoshiro::{rand_core::SeedableRng, Xoshiro256StarStar};

use strangers::{
    persistence::Snapshot, Content, EngineConfig, Notice, SessionEngine, Timestamp, UserId,
    UserState,
};

fn epoch() -> Timestamp {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

fn check(engine: &SessionEngine) {
    let queued: Vec<UserId> = engine.waiting().copied().collect();
    let unique: HashSet<UserId> = queued.iter().copied().collect();
    assert_eq!(queued.len(), unique.len(), "duplicate in queue {:?}", queued);

    for (user, partner) in engine.pairs() {
        assert_ne!(user, partner, "self pairing");
        assert_eq!(engine.partner(partner), Some(*user), "half pair");
        assert!(!unique.contains(user), "{} both queued and paired", user);
        assert_eq!(engine.session_start(user), engine.session_start(partner));
        assert!(engine.session_start(user).is_some());
    }

    for user in &queued {
        assert!(engine.session_start(user).is_none());
        assert!(!engine.is_blocked(user));
    }
}

#[test]
fn random_actions_keep_invariants() {
    let mut rng = Xoshiro256StarStar::seed_from_u64(2_526);

    let config = EngineConfig {
        inactivity_timeout: 600,
        ..Default::default()
    };
    let mut engine = SessionEngine::new(config, Snapshot::default());

    let mut now = epoch();

    for _ in 0..20_000 {
        now = now + Duration::seconds(rng.gen_range(0..30));

        let user = UserId(rng.gen_range(1..=12));

        let _ = match rng.gen_range(0..100) {
            0..=34 => engine.find(user, now),
            35..=49 => engine.stop(user, now),
            50..=64 => engine.next(user, now),
            65..=74 => engine.content(user, Content::text(1, "hi"), rng.gen_ratio(1, 20), now),
            75..=79 => engine.report(user, None, now),
            80..=84 => engine.link(user, Some("someone"), now),
            85..=86 => Ok(engine.block(user)),
            87..=89 => {
                engine.unblock(&user);
                Ok(Vec::new())
            }
            90..=92 => match engine.partner(&user) {
                Some(partner) => Ok(engine.delivery_failed(user, partner)),
                None => Ok(Vec::new()),
            },
            _ => Ok(engine.sweep(now)),
        };

        check(&engine);
    }
}

#[test]
fn two_users_pair_exactly_once() {
    let mut engine = SessionEngine::new(EngineConfig::default(), Snapshot::default());
    let now = epoch();
    let (a, b) = (UserId(10), UserId(20));

    let first = engine.find(a, now).unwrap();
    let second = engine.find(b, now).unwrap();

    let found = first
        .iter()
        .chain(second.iter())
        .filter(|d| d.notice == Notice::PartnerFound)
        .count();
    assert_eq!(found, 2);

    assert_eq!(engine.state(&a), UserState::Paired { partner: b });
    assert_eq!(engine.state(&b), UserState::Paired { partner: a });

    // Repeats change nothing.
    assert!(engine.find(a, now).is_err());
    assert!(engine.find(b, now).is_err());
    assert_eq!(engine.stats().active_pairs, 1);
    assert_eq!(engine.waiting().count(), 0);
}

#[test]
fn forced_dissolution_is_symmetric() {
    let mut engine = SessionEngine::new(EngineConfig::default(), Snapshot::default());
    let now = epoch();

    for id in 1..=6 {
        engine.find(UserId(id), now).unwrap();
    }
    assert_eq!(engine.stats().active_pairs, 3);

    engine.stop(UserId(1), now).unwrap();
    engine.block(UserId(4));
    engine
        .content(UserId(5), Content::text(1, "x"), true, now)
        .unwrap();
    engine.sweep(now + Duration::days(8));

    for id in 1..=6 {
        let user = UserId(id);
        assert_eq!(engine.partner(&user), None);
        assert_eq!(engine.session_start(&user), None);
    }
    check(&engine);
}
