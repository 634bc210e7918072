mod common;

mod tests {
    use myrtio_choreographer::{
        Animator, AnimatorConfig, AnimatorSlot, CycleTimings, Duration, Instant, Level, Line,
        Polarity, Ports, Strategy,
    };

    use super::common::MockDriver;

    const STEP_MS: u64 = 10;
    const INTERVAL_MS: u64 = 40;

    fn animator(strategy: Strategy, timings: CycleTimings) -> AnimatorSlot {
        AnimatorConfig {
            line: Line::Skull1,
            timings,
            strategy,
            jitter: false,
            linked: None,
        }
        .to_slot(
            Duration::from_millis(STEP_MS),
            Duration::from_millis(INTERVAL_MS),
        )
        .unwrap()
    }

    fn ports() -> Ports<MockDriver> {
        Ports::new(MockDriver::default(), [Polarity::Normal; Line::COUNT])
    }

    /// Tick every millisecond in `from..=to`, collecting flips
    fn run(
        animator: &mut AnimatorSlot,
        ports: &mut Ports<MockDriver>,
        from: u64,
        to: u64,
    ) -> Vec<(u64, bool)> {
        let mut flips = Vec::new();
        for t in from..=to {
            while let Some(lit) = animator.tick(Instant::from_millis(t), ports) {
                flips.push((t, lit));
            }
        }
        flips
    }

    fn tolerance(strategy: Strategy) -> u64 {
        match strategy {
            Strategy::Stepped => STEP_MS,
            Strategy::Continuous => INTERVAL_MS,
        }
    }

    fn assert_cycle_period(strategy: Strategy) {
        let timings = CycleTimings::from_millis(2_000, 1_500, 1_500);
        let expected = 2_000 + 1_500 + 2 * 1_500;
        let mut animator = animator(strategy, timings);
        let mut ports = ports();

        animator.start(Instant::from_millis(0), &mut ports);
        let flips = run(&mut animator, &mut ports, 0, 40_000);

        let lit: Vec<u64> = flips.iter().filter(|(_, lit)| *lit).map(|(t, _)| *t).collect();
        assert!(lit.len() >= 5, "expected several cycles, got {:?}", flips);
        for pair in lit.windows(2) {
            let period = pair[1] - pair[0];
            assert!(
                period.abs_diff(expected) <= tolerance(strategy),
                "{:?} period {} expected {}",
                strategy,
                period,
                expected
            );
        }
        // Flips strictly alternate
        for pair in flips.windows(2) {
            assert_ne!(pair[0].1, pair[1].1);
        }
    }

    #[test]
    fn test_stepped_cycle_period() {
        assert_cycle_period(Strategy::Stepped);
    }

    #[test]
    fn test_continuous_cycle_period() {
        assert_cycle_period(Strategy::Continuous);
    }

    #[test]
    fn test_stepped_ramp_is_exact() {
        let mut animator = animator(Strategy::Stepped, CycleTimings::from_millis(200, 100, 100));
        let mut ports = ports();

        animator.start(Instant::from_millis(0), &mut ports);
        let flips = run(&mut animator, &mut ports, 0, 700);
        assert_eq!(flips, vec![(100, true), (400, false), (600, true)]);
    }

    #[test]
    fn test_stepped_pulses_within_step() {
        let mut animator = animator(Strategy::Stepped, CycleTimings::from_millis(200, 100, 100));
        let mut ports = ports();

        animator.start(Instant::from_millis(0), &mut ports);
        animator.tick(Instant::from_millis(0), &mut ports);
        assert_eq!(ports.driver().level(Line::Skull1), Some(Level::High));
        // First pulse of a ramp-up is 10% of the step
        animator.tick(Instant::from_millis(1), &mut ports);
        assert_eq!(ports.driver().level(Line::Skull1), Some(Level::Low));
        animator.tick(Instant::from_millis(10), &mut ports);
        assert_eq!(ports.driver().level(Line::Skull1), Some(Level::High));

        // Left fully on after the ramp
        run(&mut animator, &mut ports, 11, 150);
        assert!(animator.is_lit());
        assert_eq!(ports.driver().level(Line::Skull1), Some(Level::High));
        assert_eq!(ports.level(Line::Skull1), 1.0);
    }

    #[test]
    fn test_continuous_duty_ramps_up_then_down() {
        let mut animator = animator(Strategy::Continuous, CycleTimings::from_millis(400, 400, 400));
        let mut ports = ports();

        animator.start(Instant::from_millis(0), &mut ports);
        run(&mut animator, &mut ports, 0, 200);
        assert!((ports.driver().duty(Line::Skull1) - 0.5).abs() < 1e-6);

        // Ramp-up ends at 400 with a final zero duty and the line switched on
        run(&mut animator, &mut ports, 201, 400);
        assert!(animator.is_lit());
        assert_eq!(ports.driver().duty(Line::Skull1), 0.0);
        assert_eq!(ports.driver().level(Line::Skull1), Some(Level::High));

        // Ramp-down starts after the on hold
        run(&mut animator, &mut ports, 401, 1_000);
        assert!((ports.driver().duty(Line::Skull1) - 0.5).abs() < 1e-6);
        assert!(animator.is_lit());
    }

    #[test]
    fn test_continuous_waits_for_acknowledged_end() {
        let mut animator = animator(Strategy::Continuous, CycleTimings::from_millis(400, 400, 400));
        let mut ports = ports();

        animator.start(Instant::from_millis(0), &mut ports);
        run(&mut animator, &mut ports, 0, 399);
        ports.driver_mut().fail_duty = true;
        assert!(run(&mut animator, &mut ports, 400, 500).is_empty());
        assert!(!animator.is_lit());

        ports.driver_mut().fail_duty = false;
        assert_eq!(run(&mut animator, &mut ports, 501, 520), vec![(520, true)]);
    }

    fn assert_stop_in_off_hold_is_immediate(strategy: Strategy) {
        let mut animator = animator(strategy, CycleTimings::from_millis(200, 1_000, 200));
        let mut ports = ports();

        animator.start(Instant::from_millis(0), &mut ports);
        let flips = run(&mut animator, &mut ports, 0, 700);
        assert_eq!(flips.last().map(|(_, lit)| *lit), Some(false));
        assert!(animator.is_running());

        animator.stop();
        assert!(!animator.is_running());
        assert_eq!(animator.next_deadline(), None);

        let writes = ports.driver().writes.len();
        let duties = ports.driver().duty_commands.len();
        assert!(run(&mut animator, &mut ports, 701, 5_000).is_empty());
        assert_eq!(ports.driver().writes.len(), writes);
        assert_eq!(ports.driver().duty_commands.len(), duties);
    }

    #[test]
    fn test_stepped_stop_in_off_hold() {
        assert_stop_in_off_hold_is_immediate(Strategy::Stepped);
    }

    #[test]
    fn test_continuous_stop_in_off_hold() {
        assert_stop_in_off_hold_is_immediate(Strategy::Continuous);
    }

    fn assert_stop_mid_ramp_finishes_cycle(strategy: Strategy) {
        let mut animator = animator(strategy, CycleTimings::from_millis(300, 300, 200));
        let mut ports = ports();

        animator.start(Instant::from_millis(0), &mut ports);
        run(&mut animator, &mut ports, 0, 100);
        animator.stop();
        assert!(animator.is_running());

        let flips = run(&mut animator, &mut ports, 101, 5_000);
        let states: Vec<bool> = flips.iter().map(|(_, lit)| *lit).collect();
        assert_eq!(states, vec![true, false]);
        assert!(!animator.is_running());
        assert!(!animator.is_lit());
        assert_eq!(ports.driver().level(Line::Skull1), Some(Level::Low));
        assert_eq!(ports.level(Line::Skull1), 0.0);
    }

    #[test]
    fn test_stepped_stop_mid_ramp() {
        assert_stop_mid_ramp_finishes_cycle(Strategy::Stepped);
    }

    #[test]
    fn test_continuous_stop_mid_ramp() {
        assert_stop_mid_ramp_finishes_cycle(Strategy::Continuous);
    }

    #[test]
    fn test_stop_while_lit_ramps_down() {
        for strategy in [Strategy::Stepped, Strategy::Continuous] {
            let mut animator = animator(strategy, CycleTimings::from_millis(1_000, 300, 200));
            let mut ports = ports();

            animator.start(Instant::from_millis(0), &mut ports);
            run(&mut animator, &mut ports, 0, 500);
            assert!(animator.is_lit());
            animator.stop();

            let flips = run(&mut animator, &mut ports, 501, 5_000);
            assert_eq!(flips.len(), 1);
            assert!(!flips[0].1);
            // The on hold is not cut short
            assert!(flips[0].0 >= 1_400);
            assert!(!animator.is_running());
        }
    }

    #[test]
    fn test_restart_resets_cycle() {
        for strategy in [Strategy::Stepped, Strategy::Continuous] {
            let mut animator = animator(strategy, CycleTimings::from_millis(1_000, 300, 200));
            let mut ports = ports();

            animator.start(Instant::from_millis(0), &mut ports);
            run(&mut animator, &mut ports, 0, 500);
            assert!(animator.is_lit());

            animator.start(Instant::from_millis(501), &mut ports);
            assert!(!animator.is_lit());
            assert_eq!(ports.driver().level(Line::Skull1), Some(Level::Low));

            let flips = run(&mut animator, &mut ports, 501, 800);
            assert_eq!(flips.len(), 1);
            assert!(flips[0].1);
            assert!(flips[0].0.abs_diff(701) <= tolerance(strategy));
        }
    }

    #[test]
    fn test_halt_mid_ramp_goes_silent() {
        for strategy in [Strategy::Stepped, Strategy::Continuous] {
            let mut animator = animator(strategy, CycleTimings::from_millis(1_000, 300, 200));
            let mut ports = ports();

            animator.start(Instant::from_millis(0), &mut ports);
            run(&mut animator, &mut ports, 0, 100);
            animator.halt();

            assert!(!animator.is_running());
            assert!(!animator.is_lit());
            assert_eq!(animator.next_deadline(), None);

            let writes = ports.driver().writes.len();
            let duties = ports.driver().duty_commands.len();
            assert!(run(&mut animator, &mut ports, 101, 5_000).is_empty());
            assert_eq!(ports.driver().writes.len(), writes);
            assert_eq!(ports.driver().duty_commands.len(), duties);
        }
    }

    #[test]
    fn test_strategy_selected_from_config() {
        let timings = CycleTimings::from_millis(100, 100, 100);
        assert_eq!(animator(Strategy::Stepped, timings).strategy(), Strategy::Stepped);
        assert_eq!(
            animator(Strategy::Continuous, timings).strategy(),
            Strategy::Continuous
        );
    }
}
