// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn fake_clock_advance_moves_both_instant_and_epoch() {
    let clock = FakeClock::new();
    let before_instant = clock.now();
    let before_epoch = clock.epoch_ms();

    clock.advance(Duration::from_secs(5));

    assert_eq!(clock.now(), before_instant + Duration::from_secs(5));
    assert_eq!(clock.epoch_ms(), before_epoch + 5000);
}

#[test]
fn fake_clock_set_epoch_ms_is_absolute() {
    let clock = FakeClock::new();
    clock.set_epoch_ms(42);
    assert_eq!(clock.epoch_ms(), 42);
    clock.advance(Duration::from_millis(8));
    assert_eq!(clock.epoch_ms(), 50);
}

#[test]
fn system_clock_epoch_ms_is_plausible() {
    let clock = SystemClock;
    // Anything after 2020-01-01 in epoch millis.
    assert!(clock.epoch_ms() > 1_577_836_800_000);
}
