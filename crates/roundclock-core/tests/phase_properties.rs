//! Property tests for phase ordering, round counting and clock accounting.

use std::time::Duration;

use proptest::prelude::*;
use roundclock_core::timer::{
    begin, plan, progress_pct, tick, total_seconds, ManualClock, PhaseClock, TickOutcome,
};
use roundclock_core::timer::machine::apply;
use roundclock_core::{Phase, SessionConfig, SessionState};

fn configs() -> impl Strategy<Value = SessionConfig> {
    (1u32..40, 0u32..20, 1u32..8).prop_map(|(w, r, n)| SessionConfig::new(w, r, n))
}

fn started(config: &SessionConfig) -> SessionState {
    let mut state = SessionState::idle(config);
    apply(&mut state, &begin(config));
    state.running = true;
    state
}

/// Every state observed after a tick, until FINISHED.
fn run(config: &SessionConfig) -> Vec<SessionState> {
    let mut state = started(config);
    let mut seen = vec![state];
    while state.phase != Phase::Finished {
        tick(&mut state, config).unwrap();
        seen.push(state);
    }
    seen
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn plan_alternates_work_and_rest(config in configs()) {
        let phases: Vec<Phase> = plan(&config).iter().map(|s| s.phase).collect();
        prop_assert_eq!(phases[0], Phase::Prep);
        for (i, phase) in phases[1..].iter().enumerate() {
            let expected = if i % 2 == 0 { Phase::Work } else { Phase::Rest };
            prop_assert_eq!(*phase, expected);
        }
        prop_assert_eq!(*phases.last().unwrap(), Phase::Work);
        prop_assert_eq!(phases.len() as u32, 1 + 2 * config.total_rounds - 1);
    }

    #[test]
    fn rounds_only_grow_when_work_begins(config in configs()) {
        let seen = run(&config);
        for pair in seen.windows(2) {
            let (before, after) = (pair[0], pair[1]);
            prop_assert!(after.current_round >= before.current_round);
            prop_assert!(after.current_round <= before.current_round + 1);
            if after.current_round > before.current_round {
                prop_assert_eq!(after.phase, Phase::Work);
            }
            prop_assert!(after.current_round >= 1);
            prop_assert!(after.current_round <= config.total_rounds);
        }
        prop_assert_eq!(seen.last().unwrap().current_round, config.total_rounds);
    }

    #[test]
    fn zero_rest_is_never_observed(w in 1u32..40, n in 1u32..8) {
        let config = SessionConfig::new(w, 0, n);
        let seen = run(&config);
        prop_assert!(seen.iter().all(|s| s.phase != Phase::Rest));
        let work_ticks = seen.iter().filter(|s| s.phase == Phase::Work).count() as u32;
        prop_assert_eq!(work_ticks, w * n);
    }

    #[test]
    fn one_tick_per_planned_second(config in configs()) {
        let ticks = run(&config).len() as u64 - 1;
        prop_assert_eq!(ticks, total_seconds(&config));
    }

    #[test]
    fn remaining_never_reaches_zero_mid_phase(config in configs()) {
        let mut state = started(&config);
        while state.phase != Phase::Finished {
            match tick(&mut state, &config).unwrap() {
                TickOutcome::Counted { remaining_seconds } => prop_assert!(remaining_seconds > 0),
                TickOutcome::Advanced(changes) => {
                    let last = changes.last().unwrap();
                    prop_assert!(last.to == Phase::Finished || last.remaining_seconds > 0);
                }
            }
        }
        prop_assert!(!state.running);
    }

    #[test]
    fn progress_never_goes_backwards(config in configs()) {
        let mut last = 0.0;
        for state in run(&config) {
            let pct = progress_pct(&config, &state);
            prop_assert!(pct >= last);
            last = pct;
        }
        prop_assert_eq!(last, 100.0);
    }

    #[test]
    fn clock_emits_whole_elapsed_seconds(steps in prop::collection::vec(0u64..3_500, 1..60)) {
        let source = ManualClock::new();
        let mut clock = PhaseClock::new(source.clone());
        clock.start();
        let mut ticks = 0u64;
        for step in &steps {
            source.advance(Duration::from_millis(*step));
            ticks += clock.poll();
        }
        let elapsed: u64 = steps.iter().sum();
        prop_assert_eq!(ticks, elapsed / 1_000);
    }

    #[test]
    fn pausing_loses_no_time(
        before in 0u64..5_000,
        paused in 0u64..60_000,
        after in 0u64..5_000,
    ) {
        let source = ManualClock::new();
        let mut clock = PhaseClock::new(source.clone());
        clock.start();
        source.advance(Duration::from_millis(before));
        let mut ticks = clock.poll();
        clock.stop();
        source.advance(Duration::from_millis(paused));
        ticks += clock.poll();
        clock.start();
        source.advance(Duration::from_millis(after));
        ticks += clock.poll();
        prop_assert_eq!(ticks, (before + after) / 1_000);
    }
}
