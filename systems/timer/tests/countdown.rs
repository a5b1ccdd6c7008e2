use territory_core::{ClockState, TimerMode};
use territory_system_timer::{SecondOutcome, Timer};

#[test]
fn countdown_expires_only_after_dropping_below_zero() {
    let mut timer = Timer::new();
    timer.start(TimerMode::CountDown, 3);

    for expected in [2, 1, 0] {
        assert_eq!(
            timer.advance_second(),
            SecondOutcome::Advanced { seconds: expected },
            "countdown must not expire while the clock is non-negative",
        );
    }
    assert_eq!(timer.seconds(), 0);
    assert_eq!(timer.state(), ClockState::Running);

    assert_eq!(timer.advance_second(), SecondOutcome::Expired);
    assert_eq!(timer.state(), ClockState::Paused);

    let later: Vec<_> = (0..5).map(|_| timer.advance_second()).collect();
    assert!(
        later.iter().all(|outcome| *outcome == SecondOutcome::Ignored),
        "an expired clock must report time-up exactly once",
    );
}

#[test]
fn expired_countdown_never_renders_negative_time() {
    let mut timer = Timer::new();
    timer.start(TimerMode::CountDown, 0);
    assert_eq!(timer.advance_second(), SecondOutcome::Expired);

    assert!(timer.seconds() < 0);
    assert_eq!(timer.to_string(), "00:00");
}

#[test]
fn restarting_an_expired_countdown_resumes_it() {
    let mut timer = Timer::new();
    timer.start(TimerMode::CountDown, 0);
    let _ = timer.advance_second();

    timer.start(TimerMode::CountDown, 30);

    assert_eq!(timer.state(), ClockState::Running);
    assert_eq!(timer.seconds(), -1, "a paused clock resumes instead of restarting");
}
