//! Integration tests: frame driver ordering and failure handling.
//!
//! A recording engine logs every call into a shared journal, so each test
//! can assert the exact sequence the driver produced.

use drift_core::{CancelToken, DriveError, Driven, FrameLoop, FrameReport, StopReason};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

// ─── Helpers ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Surface,
    Construct,
    Evolve,
    Draw,
    Wait,
}

type Journal = Rc<RefCell<Vec<Call>>>;

struct Surface {
    journal: Journal,
    fail_evolve_at: Option<usize>,
    fail_draw_at: Option<usize>,
}

struct Recorder {
    journal: Journal,
    evolves: usize,
    draws: usize,
    fail_evolve_at: Option<usize>,
    fail_draw_at: Option<usize>,
}

impl Driven for Recorder {
    type Surface = Surface;

    fn construct(surface: Surface) -> Result<Self, String> {
        surface.journal.borrow_mut().push(Call::Construct);
        Ok(Self {
            journal: surface.journal,
            evolves: 0,
            draws: 0,
            fail_evolve_at: surface.fail_evolve_at,
            fail_draw_at: surface.fail_draw_at,
        })
    }

    fn evolve(&mut self) -> Result<(), String> {
        self.evolves += 1;
        self.journal.borrow_mut().push(Call::Evolve);
        if self.fail_evolve_at == Some(self.evolves) {
            return Err("solver diverged".into());
        }
        Ok(())
    }

    fn draw(&mut self) -> Result<(), String> {
        self.draws += 1;
        self.journal.borrow_mut().push(Call::Draw);
        if self.fail_draw_at == Some(self.draws) {
            return Err("context lost".into());
        }
        Ok(())
    }
}

fn surface(journal: &Journal) -> Surface {
    journal.borrow_mut().push(Call::Surface);
    Surface {
        journal: journal.clone(),
        fail_evolve_at: None,
        fail_draw_at: None,
    }
}

fn launch(journal: &Journal) -> FrameLoop<Recorder> {
    FrameLoop::launch(|| Ok(()), |()| Ok(surface(journal))).expect("launch should succeed")
}

/// A frame source that reports `frames` frames, then a closed host.
fn frames(mut n: usize) -> impl FnMut() -> bool {
    move || {
        if n == 0 {
            return false;
        }
        n -= 1;
        true
    }
}

/// Like [`frames`], but journals each wait, including the final closed one.
fn journaled_frames(journal: &Journal, mut n: usize) -> impl FnMut() -> bool {
    let journal = journal.clone();
    move || {
        journal.borrow_mut().push(Call::Wait);
        if n == 0 {
            return false;
        }
        n -= 1;
        true
    }
}

// ─── Startup ─────────────────────────────────────────────────────────────

#[test]
fn priming_evolve_precedes_first_draw() {
    let journal = Journal::default();
    let mut frame_loop = launch(&journal);
    frame_loop.run(&mut frames(1)).unwrap();
    assert_eq!(
        *journal.borrow(),
        vec![
            Call::Surface,
            Call::Construct,
            Call::Evolve,
            Call::Evolve,
            Call::Draw,
            Call::Evolve,
            Call::Draw,
        ]
    );
}

#[test]
fn failed_init_never_creates_a_surface() {
    let journal = Journal::default();
    let result = FrameLoop::<Recorder>::launch(
        || Err::<(), _>("wasm module missing".to_string()),
        |()| Ok(surface(&journal)),
    );
    assert_eq!(
        result.err(),
        Some(DriveError::Init("wasm module missing".into()))
    );
    assert!(journal.borrow().is_empty());
}

#[test]
fn surface_failure_is_a_construct_error() {
    let result = FrameLoop::<Recorder>::launch(|| Ok(()), |()| Err("no canvas".to_string()));
    assert_eq!(result.err(), Some(DriveError::Construct("no canvas".into())));
}

#[test]
fn priming_failure_reports_frame_zero() {
    let journal = Journal::default();
    let result = FrameLoop::<Recorder>::launch(
        || Ok(()),
        |()| {
            let mut s = surface(&journal);
            s.fail_evolve_at = Some(1);
            Ok(s)
        },
    );
    assert_eq!(
        result.err(),
        Some(DriveError::Evolve {
            frame: 0,
            reason: "solver diverged".into()
        })
    );
    assert!(!journal.borrow().contains(&Call::Draw));
}

// ─── Steady state ────────────────────────────────────────────────────────

#[test]
fn each_wait_sits_between_two_pairs() {
    let journal = Journal::default();
    let mut frame_loop = launch(&journal);
    let report = frame_loop.run(&mut journaled_frames(&journal, 2)).unwrap();
    assert_eq!(report.frames, 3);
    assert_eq!(
        *journal.borrow(),
        vec![
            Call::Surface,
            Call::Construct,
            Call::Evolve,
            Call::Evolve,
            Call::Draw,
            Call::Wait,
            Call::Evolve,
            Call::Draw,
            Call::Wait,
            Call::Evolve,
            Call::Draw,
            Call::Wait,
        ]
    );
}

#[test]
fn cancel_during_a_wait_runs_no_further_pair() {
    let journal = Journal::default();
    let mut frame_loop = launch(&journal);
    let token = frame_loop.cancel_token();
    let mut wait = journaled_frames(&journal, 100);
    let mut waited = 0;
    let mut source = || {
        waited += 1;
        if waited == 2 {
            token.cancel();
        }
        wait()
    };
    let report = frame_loop.run(&mut source).unwrap();
    assert_eq!(report.stop, StopReason::Cancelled);
    assert_eq!(report.frames, 2);
    let calls = journal.borrow();
    assert_eq!(
        calls[3..].to_vec(),
        vec![Call::Evolve, Call::Draw, Call::Wait, Call::Evolve, Call::Draw, Call::Wait]
    );
}


#[test]
fn evolve_and_draw_alternate() {
    let journal = Journal::default();
    let mut frame_loop = launch(&journal);
    let report = frame_loop.run(&mut frames(9)).unwrap();
    assert_eq!(
        report,
        FrameReport {
            frames: 10,
            stop: StopReason::HostClosed
        }
    );
    let calls = journal.borrow();
    // Surface, Construct, priming Evolve, then pairs.
    let pairs = &calls[3..];
    assert_eq!(pairs.len(), 20);
    for pair in pairs.chunks(2) {
        assert_eq!(pair, &[Call::Evolve, Call::Draw]);
    }
}

#[test]
fn cancel_stops_after_a_complete_pair() {
    let journal = Journal::default();
    let mut frame_loop = launch(&journal);
    let token: CancelToken = frame_loop.cancel_token();
    let mut seen = 0;
    let mut source = || {
        seen += 1;
        if seen == 3 {
            token.cancel();
        }
        true
    };
    let report = frame_loop.run(&mut source).unwrap();
    assert_eq!(report.stop, StopReason::Cancelled);
    assert_eq!(report.frames, 3);
    assert_eq!(journal.borrow().last(), Some(&Call::Draw));
}

#[test]
fn draw_failure_carries_frame_and_stops() {
    let journal = Journal::default();
    let mut frame_loop = FrameLoop::<Recorder>::launch(
        || Ok(()),
        |()| {
            let mut s = surface(&journal);
            s.fail_draw_at = Some(4);
            Ok(s)
        },
    )
    .unwrap();
    let err = frame_loop.run(&mut frames(100)).unwrap_err();
    assert_eq!(
        err,
        DriveError::Draw {
            frame: 4,
            reason: "context lost".into()
        }
    );
    assert_eq!(frame_loop.frames(), 3);
    assert_eq!(journal.borrow().last(), Some(&Call::Draw));
}

#[test]
fn evolve_failure_skips_the_draw() {
    let journal = Journal::default();
    let mut frame_loop = FrameLoop::<Recorder>::launch(
        || Ok(()),
        |()| {
            let mut s = surface(&journal);
            // Priming is evolve #1, so #3 fails on frame 2.
            s.fail_evolve_at = Some(3);
            Ok(s)
        },
    )
    .unwrap();
    let err = frame_loop.run(&mut frames(100)).unwrap_err();
    assert_eq!(err.to_string(), "evolve failed on frame 2: solver diverged");
    assert_eq!(journal.borrow().last(), Some(&Call::Evolve));
    assert_eq!(frame_loop.driven().draws, 1);
}

#[test]
fn exactly_one_instance_is_constructed() {
    let journal = Journal::default();
    let mut frame_loop = launch(&journal);
    frame_loop.run(&mut frames(25)).unwrap();
    let constructs = journal
        .borrow()
        .iter()
        .filter(|c| **c == Call::Construct)
        .count();
    assert_eq!(constructs, 1);
}
