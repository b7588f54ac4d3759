use crossbeam_channel::{Receiver, RecvTimeoutError};

use crate::poller::{PollWork, PollerShared, TickEvent};
use std::{sync::Arc, thread::JoinHandle, time::Duration};

/// Control messages sent by the [`Poller`](crate::Poller) handle to its clock thread.
pub(crate) enum ClockControl {
    Arm,
    Disarm,
    SetInterval(Duration),
    Shutdown,
}

pub(crate) struct ClockLoop;

impl ClockLoop {
    /// ClockLoop runs on a separate thread and owns the timing wait. While disarmed it
    /// blocks on the control channel; while armed it waits with recv_timeout(interval),
    /// so a timeout is a tick and any control message interrupts the wait immediately.
    ///
    /// Ticks dispatch inline on this thread, which serializes work invocations: if a
    /// work call outlasts the interval, overdue ticks are skipped and the next wait
    /// starts only after the call returns.
    pub fn run(
        rx: Receiver<ClockControl>,
        shared: &Arc<PollerShared>,
        work: &Arc<dyn PollWork>,
    ) -> JoinHandle<()> {
        let shared = shared.clone();
        let work = work.clone();

        std::thread::spawn(move || {
            let mut armed = false;
            let mut interval = shared.interval();
            loop {
                let msg = if armed {
                    match rx.recv_timeout(interval) {
                        Ok(msg) => Some(msg),
                        Err(RecvTimeoutError::Timeout) => {
                            // the shared flags are authoritative at dispatch time, so a
                            // tick due at the instant of stop/dispose is not delivered.
                            if shared.is_enabled() && !shared.is_disposed() {
                                Self::dispatch(&shared, &work);
                            }
                            None
                        }
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                } else {
                    match rx.recv() {
                        Ok(msg) => Some(msg),
                        Err(_) => break,
                    }
                };

                match msg {
                    Some(ClockControl::Arm) => armed = true,
                    Some(ClockControl::Disarm) => armed = false,
                    Some(ClockControl::SetInterval(new_interval)) => interval = new_interval,
                    Some(ClockControl::Shutdown) => break,
                    None => {}
                }
            }
        })
    }

    fn dispatch(shared: &Arc<PollerShared>, work: &Arc<dyn PollWork>) {
        let tick = TickEvent::now(shared.name());
        // a failing tick is reported and never disables the ones that follow.
        if let Err(e) = work.do_work(&tick) {
            match tick.poller_name() {
                Some(name) => log::error!("poller [{name}] work failed : {e}"),
                None => log::error!("poller work failed : {e}"),
            }
        }
    }
}
