use std::{cell::RefCell, rc::Rc};

use desktop_app_clock::{
    finished_notification, CountdownController, FinishNotifier, StopwatchController, TickListener,
};
use platform_host::{HostServices, Notification};
use pretty_assertions::assert_eq;

#[derive(Default)]
struct Inbox(RefCell<Vec<Notification>>);

impl FinishNotifier for Inbox {
    fn countdown_finished(&self, notification: Notification) {
        self.0.borrow_mut().push(notification);
    }
}

fn quiet() -> TickListener {
    Rc::new(|| {})
}

#[test]
fn stopwatch_and_countdown_share_the_host_scheduler() {
    let (host, memory) = HostServices::memory();
    let inbox = Rc::new(Inbox::default());

    let mut stopwatch = StopwatchController::new(host.scheduler.clone(), quiet());
    let mut countdown =
        CountdownController::new(host.scheduler.clone(), 3_000, inbox.clone(), quiet());

    stopwatch.start().expect("stopwatch");
    countdown.start().expect("countdown");
    assert_eq!(memory.scheduler.active_count(), 2);

    memory.scheduler.advance(2_000);
    countdown.pause();
    assert_eq!(memory.scheduler.active_count(), 1);
    assert_eq!(countdown.remaining_ms(), 1_000);

    memory.scheduler.advance(2_000);
    countdown.start().expect("resume");
    memory.scheduler.advance(1_000);

    assert!(countdown.is_finished());
    assert_eq!(inbox.0.borrow().as_slice(), &[finished_notification()]);
    assert_eq!(stopwatch.elapsed_ms(), 5_000);
    assert_eq!(memory.scheduler.active_count(), 1);

    stopwatch.stop();
    assert_eq!(memory.scheduler.active_count(), 0);
    memory.scheduler.advance(60_000);
    assert_eq!(inbox.0.borrow().len(), 1);
}
