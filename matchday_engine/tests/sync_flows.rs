use std::sync::{atomic::AtomicI32, Arc};

use chrono::Duration;
use futures_util::FutureExt;
use log::*;
use matchday_engine::{
    db_types::{MatchId, MatchStatus, MatchUpdate, NewSlip, Outcome, SlipId},
    events::{EventHandlers, EventHooks, MatchFinishedEvent, MatchRemovedEvent, MatchRescheduledEvent},
    MatchStore,
    MatchSyncApi,
    MemorySlipCache,
    SlipCache,
    SqliteDatabase,
};
use mbg_common::Money;
use tokio::runtime::Runtime;

use crate::support::{
    bet,
    bet_for_teams,
    confirmed_slip,
    kickoff,
    prepare_env::{prepare_test_env, random_db_path},
    setup,
    status_update,
    stored_match,
    tear_down,
    timed_update,
};

mod support;

#[tokio::test]
async fn new_timed_matches_get_consecutive_ids_and_replays_are_skipped() {
    let api = setup().await;
    let juventus = timed_update("Juventus", "Napoli", "IT1", kickoff(24));
    // A feed glitch reporting goals on a scheduled match must not stick.
    let mut milan = timed_update("Milan", "Inter", "IT1", kickoff(26));
    milan.home_goals = 3;
    milan.away_goals = 3;

    let report = api.process_updates(vec![juventus.clone(), milan.clone(), juventus.clone()]).await;
    assert_eq!(report.applied, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.failed, 0);

    let first = stored_match(&api, &juventus).await.expect("Juventus v Napoli was not stored");
    assert_eq!(first.id, MatchId(0));
    assert_eq!(first.status, MatchStatus::Timed);
    assert_eq!((first.home_goals, first.away_goals), (0, 0));
    assert!(!first.settled);
    assert_eq!(first.multipliers.len(), 10);

    let second = stored_match(&api, &milan).await.expect("Milan v Inter was not stored");
    assert_eq!(second.id, MatchId(1));
    assert_eq!(second.status, MatchStatus::Timed);
    assert_eq!((second.home_goals, second.away_goals), (0, 0));

    assert_eq!(api.store().next_match_id().await.unwrap(), MatchId(2));

    // A fixture playing itself never makes it onto the board.
    let nonsense = timed_update("Juventus", "Juventus", "IT1", kickoff(30));
    let report = api.process_updates(vec![nonsense.clone()]).await;
    assert_eq!(report.skipped, 1);
    assert!(stored_match(&api, &nonsense).await.is_none());

    tear_down(api).await;
}

#[tokio::test]
async fn ids_start_at_zero_and_survive_archived_seasons() {
    let api = setup().await;
    assert_eq!(api.store().next_match_id().await.unwrap(), MatchId(0));

    // An archived fixture, long outside the recent-id window. The id sequence must still
    // build on it rather than restart at 0.
    let archived = timed_update("Juventus", "Napoli", "IT1", "2020-02-01T15:00:00Z".parse().unwrap());
    api.process_updates(vec![archived.clone()]).await;
    assert_eq!(stored_match(&api, &archived).await.unwrap().id, MatchId(0));
    assert_eq!(api.store().next_match_id().await.unwrap(), MatchId(1));

    tear_down(api).await;
}

#[tokio::test]
async fn cancellations_remove_the_match_its_bets_and_fully_backed_slips() {
    let api = setup().await;
    let juventus = timed_update("Juventus", "Napoli", "IT1", kickoff(24));
    let milan = timed_update("Milan", "Inter", "IT1", kickoff(26));
    api.process_updates(vec![juventus.clone(), milan.clone()]).await;
    let juve_record = stored_match(&api, &juventus).await.unwrap();
    let milan_record = stored_match(&api, &milan).await.unwrap();

    // Alice rides only the doomed fixture, Bob mixes it with another one.
    api.cache()
        .put_slip(NewSlip::new("alice", Money::from_eur(5), vec![bet(&juve_record, "1", 150)]))
        .await
        .unwrap();
    let mixed = api
        .cache()
        .put_slip(NewSlip::new(
            "bob",
            Money::from_eur(10),
            vec![bet(&juve_record, "GG", 180), bet(&milan_record, "X", 320)],
        ))
        .await
        .unwrap();
    let slip = confirmed_slip(
        1,
        "carol",
        Money::from_eur(10),
        vec![bet(&juve_record, "1", 150), bet(&milan_record, "2", 400)],
    );
    api.settlement().insert_confirmed_slip(&slip).await.unwrap();

    let report = api.process_updates(vec![status_update(&juventus, MatchStatus::Canceled, 0, 0)]).await;
    assert_eq!(report.applied, 1);
    assert_eq!(report.failed, 0);

    assert!(stored_match(&api, &juventus).await.is_none());
    assert!(stored_match(&api, &milan).await.is_some());

    assert!(api.cache().slips_for_user("alice").await.unwrap().is_empty());
    let bobs = api.cache().slips_for_user("bob").await.unwrap();
    assert_eq!(bobs.len(), 1);
    assert_eq!(bobs[0].slip_id, mixed);
    assert_eq!(bobs[0].bets.len(), 1);
    assert_eq!(bobs[0].bets[0].team_home, "Milan");

    let carols = api.settlement().fetch_slip(SlipId(1)).await.unwrap().expect("Carol's slip is gone");
    assert_eq!(carols.bets.len(), 1);
    assert_eq!(carols.bets[0].team_home, "Milan");
    assert_eq!(carols.outcome, Outcome::Unresolved);

    tear_down(api).await;
}

#[tokio::test]
async fn cancellations_of_unknown_matches_still_prune_the_cache() {
    let api = setup().await;
    api.cache()
        .put_slip(NewSlip::new("dan", Money::from_eur(2), vec![bet_for_teams("Roma", "Lazio", "X")]))
        .await
        .unwrap();

    let ghost = status_update(&timed_update("Roma", "Lazio", "IT1", kickoff(24)), MatchStatus::Canceled, 0, 0);
    let report = api.process_updates(vec![ghost]).await;
    assert_eq!(report.applied, 1);
    assert_eq!(report.failed, 0);
    assert!(api.cache().slips_for_user("dan").await.unwrap().is_empty());
    tear_down(api).await;
}

#[tokio::test]
async fn final_results_settle_slips_exactly_once() {
    let api = setup().await;
    let juventus = timed_update("Juventus", "Napoli", "IT1", kickoff(2));
    api.process_updates(vec![juventus.clone()]).await;
    let record = stored_match(&api, &juventus).await.unwrap();

    let winner = confirmed_slip(1, "erin", Money::from_eur(10), vec![bet(&record, "1", 150)]);
    let loser = confirmed_slip(2, "frank", Money::from_eur(5), vec![bet(&record, "2", 400)]);
    api.settlement().insert_confirmed_slip(&winner).await.unwrap();
    api.settlement().insert_confirmed_slip(&loser).await.unwrap();

    let report = api.process_updates(vec![status_update(&juventus, MatchStatus::Finished, 2, 1)]).await;
    assert_eq!(report.applied, 1);

    let settled = stored_match(&api, &juventus).await.unwrap();
    assert_eq!(settled.status, MatchStatus::Finished);
    assert_eq!((settled.home_goals, settled.away_goals), (2, 1));
    assert!(settled.settled);

    let erin = api.settlement().fetch_slip(SlipId(1)).await.unwrap().unwrap();
    assert_eq!(erin.outcome, Outcome::Won);
    assert_eq!(erin.payout, Money::from(1500));
    let frank = api.settlement().fetch_slip(SlipId(2)).await.unwrap().unwrap();
    assert_eq!(frank.outcome, Outcome::Lost);
    assert_eq!(frank.payout, Money::from(0));

    // The replayed final whistle is absorbed without paying anyone twice.
    let replay = api.process_updates(vec![status_update(&juventus, MatchStatus::Finished, 2, 1)]).await;
    assert_eq!(replay.applied, 0);
    assert_eq!(replay.skipped, 1);
    let erin = api.settlement().fetch_slip(SlipId(1)).await.unwrap().unwrap();
    assert_eq!(erin.payout, Money::from(1500));

    // Results for fixtures that were never stored are skipped.
    let ghost = status_update(&timed_update("Roma", "Lazio", "IT1", kickoff(4)), MatchStatus::Finished, 1, 0);
    let report = api.process_updates(vec![ghost]).await;
    assert_eq!(report.applied, 0);
    assert_eq!(report.skipped, 1);

    tear_down(api).await;
}

#[tokio::test]
async fn postponements_move_the_nearest_timed_match_and_reschedule_its_bets() {
    let api = setup().await;
    let juventus = timed_update("Juventus", "Napoli", "IT1", kickoff(1));
    let milan = timed_update("Milan", "Inter", "IT1", kickoff(3));
    api.process_updates(vec![juventus.clone(), milan.clone()]).await;
    let juve_record = stored_match(&api, &juventus).await.unwrap();

    api.cache()
        .put_slip(NewSlip::new("gina", Money::from_eur(5), vec![bet(&juve_record, "X", 300)]))
        .await
        .unwrap();
    let slip = confirmed_slip(1, "hank", Money::from_eur(5), vec![bet(&juve_record, "1", 150)]);
    api.settlement().insert_confirmed_slip(&slip).await.unwrap();

    // 105 minutes past the base is 45 minutes from the first kickoff and 75 from the second,
    // so Juventus v Napoli is the one that moves.
    let new_date = kickoff(1) + Duration::minutes(45);
    let postponed = MatchUpdate { match_date: new_date, ..status_update(&juventus, MatchStatus::Postponed, 0, 0) };
    let report = api.process_updates(vec![postponed]).await;
    assert_eq!(report.applied, 1);
    assert_eq!(report.failed, 0);

    let moved = api.store().fetch_match(juve_record.id).await.unwrap().expect("The moved match is gone");
    assert_eq!(moved.match_date, new_date);
    assert_eq!(moved.status, MatchStatus::Timed);
    let untouched = stored_match(&api, &milan).await.unwrap();
    assert_eq!(untouched.match_date, kickoff(3));

    // Confirmed bets follow the new date, cached slips on the fixture are pruned.
    let hank = api.settlement().fetch_slip(SlipId(1)).await.unwrap().unwrap();
    assert_eq!(hank.bets[0].match_date, new_date);
    assert!(api.cache().slips_for_user("gina").await.unwrap().is_empty());

    tear_down(api).await;
}

#[tokio::test]
async fn postponements_only_consider_the_reported_competition() {
    let api = setup().await;
    let juventus = timed_update("Juventus", "Napoli", "IT1", kickoff(24));
    api.process_updates(vec![juventus.clone()]).await;

    // GB1 has nothing scheduled, so there is nothing to move.
    let ghost = status_update(&timed_update("Arsenal", "Chelsea", "GB1", kickoff(25)), MatchStatus::Postponed, 0, 0);
    let report = api.process_updates(vec![ghost]).await;
    assert_eq!(report.applied, 0);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.failed, 0);

    let untouched = stored_match(&api, &juventus).await.unwrap();
    assert_eq!(untouched.match_date, kickoff(24));
    assert_eq!(untouched.status, MatchStatus::Timed);
    tear_down(api).await;
}

#[tokio::test]
async fn live_updates_prune_slips_at_kickoff_only_and_track_scores() {
    let api = setup().await;
    let juventus = timed_update("Juventus", "Napoli", "IT1", kickoff(0));
    api.process_updates(vec![juventus.clone()]).await;
    let record = stored_match(&api, &juventus).await.unwrap();

    api.cache()
        .put_slip(NewSlip::new(
            "ivy",
            Money::from_eur(5),
            vec![bet(&record, "1", 150), bet_for_teams("Milan", "Inter", "X")],
        ))
        .await
        .unwrap();

    let report = api.process_updates(vec![status_update(&juventus, MatchStatus::InPlay, 1, 0)]).await;
    assert_eq!(report.applied, 1);
    let live = stored_match(&api, &juventus).await.unwrap();
    assert_eq!(live.status, MatchStatus::InPlay);
    assert_eq!((live.home_goals, live.away_goals), (1, 0));
    let ivys = api.cache().slips_for_user("ivy").await.unwrap();
    assert_eq!(ivys.len(), 1);
    assert_eq!(ivys[0].bets.len(), 1);
    assert_eq!(ivys[0].bets[0].team_home, "Milan");

    // Bets placed after kickoff are no longer the reconciler's business.
    api.cache()
        .put_slip(NewSlip::new("jack", Money::from_eur(2), vec![bet(&record, "GG", 180)]))
        .await
        .unwrap();
    let report = api
        .process_updates(vec![
            status_update(&juventus, MatchStatus::Paused, 1, 0),
            status_update(&juventus, MatchStatus::InPlay, 2, 0),
        ])
        .await;
    assert_eq!(report.applied, 2);
    let live = stored_match(&api, &juventus).await.unwrap();
    assert_eq!(live.status, MatchStatus::InPlay);
    assert_eq!((live.home_goals, live.away_goals), (2, 0));
    assert_eq!(api.cache().slips_for_user("jack").await.unwrap().len(), 1);

    tear_down(api).await;
}

#[derive(Default, Clone)]
struct HookCalled {
    called: Arc<AtomicI32>,
}

impl HookCalled {
    pub fn called(&self) {
        let _ = self.called.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    }

    pub fn count(&self) -> i32 {
        self.called.load(std::sync::atomic::Ordering::Relaxed)
    }
}

#[test]
fn lifecycle_hooks_fire_for_finish_remove_and_reschedule() {
    let on_finished = HookCalled::default();
    let on_removed = HookCalled::default();
    let on_rescheduled = HookCalled::default();
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let url = random_db_path();
        prepare_test_env(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");

        let mut hooks = EventHooks::default();
        let hook = on_finished.clone();
        hooks.on_match_finished(move |ev: MatchFinishedEvent| {
            info!("🪝️ Hook called with the final result of {}", ev.result.id);
            hook.called();
            async {}.boxed()
        });
        let hook = on_removed.clone();
        hooks.on_match_removed(move |ev: MatchRemovedEvent| {
            info!("🪝️ Hook called after {} was removed", ev.removed.id);
            hook.called();
            async {}.boxed()
        });
        let hook = on_rescheduled.clone();
        hooks.on_match_rescheduled(move |ev: MatchRescheduledEvent| {
            info!("🪝️ Hook called after {} moved away from {}", ev.rescheduled.id, ev.previous_date);
            hook.called();
            async {}.boxed()
        });
        let handlers = EventHandlers::new(10, hooks);
        let producers = handlers.producers();
        handlers.start_handlers().await;

        let api = MatchSyncApi::new(db.clone(), MemorySlipCache::new(), db, producers);
        let juventus = timed_update("Juventus", "Napoli", "IT1", kickoff(2));
        let milan = timed_update("Milan", "Inter", "IT1", kickoff(4));
        let roma = timed_update("Roma", "Lazio", "IT1", kickoff(72));
        api.process_updates(vec![juventus.clone(), milan.clone(), roma.clone()]).await;

        // The replayed final whistle must not reach the hook a second time.
        let final_whistle = status_update(&juventus, MatchStatus::Finished, 2, 1);
        api.process_updates(vec![final_whistle.clone(), final_whistle]).await;
        api.process_updates(vec![status_update(&milan, MatchStatus::Canceled, 0, 0)]).await;
        let postponed = MatchUpdate { match_date: kickoff(96), ..status_update(&roma, MatchStatus::Postponed, 0, 0) };
        api.process_updates(vec![postponed]).await;

        // Give the spawned handler tasks a chance to drain.
        tokio::time::sleep(std::time::Duration::from_millis(250)).await;
        tear_down(api).await;
    });
    assert_eq!(on_finished.count(), 1);
    assert_eq!(on_removed.count(), 1);
    assert_eq!(on_rescheduled.count(), 1);
}
