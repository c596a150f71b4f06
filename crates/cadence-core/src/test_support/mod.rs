//! Deterministic fakes for `Clock`, `Timer` and `SystemCall`, grounded
//! on `chronos`'s `tests/TestUtils.hpp` artificial clock — every
//! dependent crate's tests build on these instead of hitting the real
//! wall clock or spawning shells.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Mutex;

use chrono::NaiveDateTime;

use crate::clock::Clock;
use crate::system_call::{CallResult, SystemCall};
use crate::timer::Timer;

/// A clock whose reading is set by the test, not the OS.
pub struct FakeClock {
    now: Mutex<NaiveDateTime>,
}

impl FakeClock {
    pub fn at(time: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(time),
        }
    }

    pub fn set(&self, time: NaiveDateTime) {
        *self.now.lock().unwrap() = time;
    }
}

impl Clock for FakeClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap()
    }
}

/// A timer that never actually sleeps; `wait` returns immediately and
/// `interrupt` only records that it was asked to. Useful wherever a
/// test needs the coordinator loop to run at full speed.
#[derive(Default)]
pub struct InstantTimer {
    interrupts: AtomicUsize,
}

impl Timer for InstantTimer {
    fn wait(&self, _duration: chrono::Duration) {}

    fn interrupt(&self) {
        self.interrupts.fetch_add(1, AtomicOrdering::SeqCst);
    }
}

impl InstantTimer {
    pub fn interrupt_count(&self) -> usize {
        self.interrupts.load(AtomicOrdering::SeqCst)
    }
}

/// A `SystemCall` whose outcomes are scripted by the test: always
/// succeed, always fail, or fail N times then succeed. The scripted
/// outcomes are a finite queue consumed front-to-back; once it runs
/// dry, every further call returns `fallback` instead, so an "always"
/// constructor never needs to materialize an infinite sequence.
pub struct ScriptedSystemCall {
    outcomes: Mutex<Vec<CallResult>>,
    fallback: CallResult,
    calls_made: AtomicUsize,
}

impl ScriptedSystemCall {
    pub fn always_succeeding() -> Self {
        Self::with_fallback(
            [],
            CallResult {
                success: true,
                message: "ok".into(),
            },
        )
    }

    pub fn always_failing() -> Self {
        Self::with_fallback(
            [],
            CallResult {
                success: false,
                message: "boom".into(),
            },
        )
    }

    pub fn new(outcomes: impl IntoIterator<Item = CallResult>) -> Self {
        Self::with_fallback(
            outcomes,
            CallResult {
                success: false,
                message: "exhausted script".into(),
            },
        )
    }

    fn with_fallback(outcomes: impl IntoIterator<Item = CallResult>, fallback: CallResult) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            fallback,
            calls_made: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls_made.load(AtomicOrdering::SeqCst)
    }
}

impl SystemCall for ScriptedSystemCall {
    fn call(&self, _command: &str) -> CallResult {
        self.calls_made.fetch_add(1, AtomicOrdering::SeqCst);
        let mut outcomes = self.outcomes.lock().unwrap();
        if outcomes.is_empty() {
            self.fallback.clone()
        } else {
            outcomes.remove(0)
        }
    }
}

/// A flag a test can flip to simulate an external `terminate()` call
/// landing between two `wait` calls.
#[derive(Default)]
pub struct ManualFlag(AtomicBool);

impl ManualFlag {
    pub fn set(&self) {
        self.0.store(true, AtomicOrdering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(AtomicOrdering::SeqCst)
    }
}
