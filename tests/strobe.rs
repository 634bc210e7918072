mod common;

mod tests {
    use myrtio_choreographer::{AmbientStrobe, Duration, Instant, Level, Line, Polarity, Ports};

    use super::common::MockDriver;

    fn strobe() -> AmbientStrobe {
        AmbientStrobe::new(
            [Line::Flash1, Line::Flash2],
            Duration::from_millis(2_000),
            Duration::from_millis(500),
        )
    }

    fn ports() -> Ports<MockDriver> {
        Ports::new(MockDriver::default(), [Polarity::Normal; Line::COUNT])
    }

    #[test]
    fn test_strobe_alternates_channels() {
        let mut strobe = strobe();
        let mut ports = ports();
        strobe.start(Instant::from_millis(0), &mut ports);

        let mut flashes = Vec::new();
        for t in 0..=9_000 {
            strobe.tick(Instant::from_millis(t), &mut ports);
            let one = ports.level(Line::Flash1) > 0.0;
            let two = ports.level(Line::Flash2) > 0.0;
            assert!(!(one && two), "both flash lines on at {}", t);
            if (t % 2_000) == 0 && t > 0 {
                flashes.push(if one { Line::Flash1 } else { Line::Flash2 });
            }
            if t % 2_000 == 500 && t > 500 {
                assert!(!one && !two, "flash still on at {}", t);
            }
        }

        assert_eq!(
            flashes,
            vec![Line::Flash1, Line::Flash2, Line::Flash1, Line::Flash2]
        );
    }

    #[test]
    fn test_strobe_stop_is_immediate() {
        let mut strobe = strobe();
        let mut ports = ports();
        strobe.start(Instant::from_millis(0), &mut ports);
        strobe.tick(Instant::from_millis(2_100), &mut ports);
        assert_eq!(ports.driver().level(Line::Flash1), Some(Level::High));

        strobe.stop(&mut ports);
        assert!(!strobe.is_running());
        assert_eq!(strobe.next_deadline(), None);
        assert_eq!(ports.driver().level(Line::Flash1), Some(Level::Low));

        let writes = ports.driver().writes.len();
        strobe.tick(Instant::from_millis(10_000), &mut ports);
        assert_eq!(ports.driver().writes.len(), writes);
    }

    #[test]
    fn test_strobe_restart_delays_first_flash() {
        let mut strobe = strobe();
        let mut ports = ports();
        strobe.start(Instant::from_millis(0), &mut ports);
        strobe.start(Instant::from_millis(1_500), &mut ports);
        assert_eq!(strobe.next_deadline(), Some(Instant::from_millis(3_500)));
    }
}
