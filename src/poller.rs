pub use main_type::{Poller, PollerBuilder};
pub(crate) use main_type::PollerShared;
pub use tick_event::TickEvent;
pub use work::{PollWork, WorkError};

mod main_type {
    use std::{
        sync::{
            Arc, Mutex, PoisonError,
            atomic::{AtomicBool, AtomicU64, Ordering},
        },
        thread::JoinHandle,
        time::Duration,
    };

    use crossbeam_channel::Sender;

    use crate::{
        clock_loop::{ClockControl, ClockLoop},
        config::PollerConfig,
        errors::PollerError,
    };

    use super::{
        tick_event::TickEvent,
        work::{PollWork, WorkFn},
    };

    pub struct PollerBuilder {
        work: Option<Arc<dyn PollWork>>,
        config: PollerConfig,
    }
    impl PollerBuilder {
        /// Sets an infallible closure as the work callback. Errors inside the
        /// closure body must be handled by the closure itself; see
        /// [`with_handler`](Self::with_handler) for the fallible form.
        pub fn with_work(
            &mut self,
            work: impl Fn(&TickEvent) + Send + Sync + 'static,
        ) -> &mut Self {
            self.work = Some(Arc::new(WorkFn(work)));
            self
        }
        /// Sets a [`PollWork`] implementation as the work callback.
        pub fn with_handler(&mut self, handler: impl PollWork) -> &mut Self {
            self.work = Some(Arc::new(handler));
            self
        }
        pub fn build(&mut self) -> Result<Poller, PollerError> {
            let work = if let Some(work) = self.work.take() {
                work
            } else {
                return Err(PollerError::BuildErrorNoWorkSet);
            };

            let config = std::mem::take(&mut self.config);
            if config.get_interval().is_zero() {
                return Err(PollerError::ZeroInterval);
            }

            let shared = Arc::new(PollerShared::new(
                config.get_interval(),
                config.get_name().map(str::to_owned),
            ));
            let (control, control_rx) = crossbeam_channel::unbounded();
            let clock = ClockLoop::run(control_rx, &shared, &work);

            Ok(Poller {
                shared,
                control,
                clock: Mutex::new(Some(clock)),
            })
        }
    }

    /// Shared state between the [`Poller`] handle and its clock thread.
    ///
    /// The flags are the authoritative armed/disposed state: the clock thread
    /// re-reads them before every dispatch, the control channel only switches
    /// its wait mode.
    pub(crate) struct PollerShared {
        enabled: AtomicBool,
        disposed: AtomicBool,
        interval_ns: AtomicU64,
        name: Mutex<Option<String>>,
    }

    impl PollerShared {
        fn new(interval: Duration, name: Option<String>) -> Self {
            Self {
                enabled: AtomicBool::new(false),
                disposed: AtomicBool::new(false),
                interval_ns: AtomicU64::new(interval.as_nanos() as u64),
                name: Mutex::new(name),
            }
        }
        pub(crate) fn interval(&self) -> Duration {
            Duration::from_nanos(self.interval_ns.load(Ordering::SeqCst))
        }
        fn store_interval(&self, interval: Duration) {
            self.interval_ns
                .store(interval.as_nanos() as u64, Ordering::SeqCst);
        }
        pub(crate) fn is_enabled(&self) -> bool {
            self.enabled.load(Ordering::SeqCst)
        }
        pub(crate) fn is_disposed(&self) -> bool {
            self.disposed.load(Ordering::SeqCst)
        }
        pub(crate) fn name(&self) -> Option<String> {
            self.name
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }
        fn store_name(&self, name: String) {
            *self.name.lock().unwrap_or_else(PoisonError::into_inner) = Some(name);
        }
        // swaps return the previous armed state.
        fn arm(&self) -> bool {
            self.enabled.swap(true, Ordering::SeqCst)
        }
        fn disarm(&self) -> bool {
            self.enabled.swap(false, Ordering::SeqCst)
        }
        fn mark_disposed(&self) -> bool {
            self.disposed.swap(true, Ordering::SeqCst)
        }
    }

    /// A recurring interval poller.
    ///
    /// Owns one clock thread for its whole lifetime. Construction leaves the
    /// instance disarmed; [`start_timer`](Poller::start_timer) arms it and the
    /// work callback then runs once per elapsed interval until
    /// [`stop_timer`](Poller::stop_timer) or [`dispose`](Poller::dispose).
    ///
    /// ### Example
    /// ```rust
    /// use msg_poller::{Poller, PollerConfig};
    /// use std::time::Duration;
    ///
    /// let poller = Poller::new(PollerConfig::new().interval(Duration::from_millis(500)))
    ///     .with_work(|tick| {
    ///         println!("tick at {:?}", tick.signal_time());
    ///     })
    ///     .build()
    ///     .unwrap();
    /// poller.start_timer().unwrap();
    /// ```
    pub struct Poller {
        shared: Arc<PollerShared>,
        control: Sender<ClockControl>,
        clock: Mutex<Option<JoinHandle<()>>>,
    }

    impl Poller {
        /// Creates a new [`PollerBuilder`] to configure and build a [`Poller`].
        ///
        /// A work callback must be supplied through
        /// [`with_work`](PollerBuilder::with_work) or
        /// [`with_handler`](PollerBuilder::with_handler) before calling
        /// [`build`](PollerBuilder::build).
        pub fn new(config: PollerConfig) -> PollerBuilder {
            PollerBuilder { work: None, config }
        }

        /// Returns the current tick period.
        pub fn interval(&self) -> Duration {
            self.shared.interval()
        }

        /// Updates the tick period. Takes effect immediately, including while
        /// armed: the in-flight wait restarts at the new period.
        ///
        /// Rejects a zero duration with [`PollerError::ZeroInterval`]; the
        /// previous interval is kept. Returns [`PollerError::Disposed`] after
        /// disposal.
        pub fn set_interval(&self, interval: Duration) -> Result<(), PollerError> {
            if self.shared.is_disposed() {
                return Err(PollerError::Disposed);
            }
            if interval.is_zero() {
                return Err(PollerError::ZeroInterval);
            }
            self.shared.store_interval(interval);
            let _ = self.control.send(ClockControl::SetInterval(interval));
            Ok(())
        }

        /// Returns the diagnostic name, if one was set.
        pub fn name(&self) -> Option<String> {
            self.shared.name()
        }

        /// Sets the diagnostic name. Pure data, no scheduling effect.
        pub fn set_name(&self, name: impl Into<String>) -> Result<(), PollerError> {
            if self.shared.is_disposed() {
                return Err(PollerError::Disposed);
            }
            self.shared.store_name(name.into());
            Ok(())
        }

        /// Returns `true` while the poller is armed.
        pub fn is_enabled(&self) -> bool {
            self.shared.is_enabled()
        }

        /// Returns `true` once [`dispose`](Poller::dispose) has been called.
        pub fn is_disposed(&self) -> bool {
            self.shared.is_disposed()
        }

        /// Arms the clock: the work callback runs once per elapsed interval
        /// from now on. Idempotent, calling while already armed has no
        /// additional effect. Returns [`PollerError::Disposed`] after disposal.
        pub fn start_timer(&self) -> Result<(), PollerError> {
            if self.shared.is_disposed() {
                return Err(PollerError::Disposed);
            }
            if !self.shared.arm() {
                log::trace!("poller armed");
                let _ = self.control.send(ClockControl::Arm);
            }
            Ok(())
        }

        /// Disarms the clock. Idempotent. The clock thread is kept, so the
        /// instance can be re-armed with [`start_timer`](Poller::start_timer).
        /// An in-flight work call is not interrupted, but no further tick is
        /// dispatched. Returns [`PollerError::Disposed`] after disposal.
        pub fn stop_timer(&self) -> Result<(), PollerError> {
            if self.shared.is_disposed() {
                return Err(PollerError::Disposed);
            }
            if self.shared.disarm() {
                log::trace!("poller disarmed");
                let _ = self.control.send(ClockControl::Disarm);
            }
            Ok(())
        }

        /// Terminal teardown: disarms, shuts the clock thread down and joins
        /// it. Once this returns no work call is mid-flight and none will
        /// follow. Safe to call any number of times, only the first call has
        /// effect. Also runs on drop.
        ///
        /// Must not be called from inside the work callback, the join would
        /// wait on its own thread.
        pub fn dispose(&self) {
            if self.shared.mark_disposed() {
                return;
            }
            self.shared.disarm();
            let _ = self.control.send(ClockControl::Shutdown);

            let clock = self
                .clock
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            if let Some(handle) = clock {
                let _ = handle.join();
            }
            log::debug!("poller disposed");
        }
    }

    impl Drop for Poller {
        fn drop(&mut self) {
            self.dispose();
        }
    }
}

mod tick_event {
    use std::time::SystemTime;

    /// Information passed to the work callback on each tick.
    ///
    /// Carries the instant the clock signalled and a snapshot of the owning
    /// poller's diagnostic name.
    #[derive(Debug, Clone)]
    pub struct TickEvent {
        signal_time: SystemTime,
        poller_name: Option<String>,
    }

    impl TickEvent {
        pub(crate) fn now(poller_name: Option<String>) -> Self {
            Self {
                signal_time: SystemTime::now(),
                poller_name,
            }
        }
        /// The wall-clock time at which the tick fired.
        pub fn signal_time(&self) -> SystemTime {
            self.signal_time
        }
        /// The owning poller's name at the time the tick fired.
        pub fn poller_name(&self) -> Option<&str> {
            self.poller_name.as_deref()
        }
    }
}

mod work {
    use super::tick_event::TickEvent;

    pub type WorkError = Box<dyn std::error::Error + Send + Sync>;

    /// The work contract invoked once per tick while the poller is armed.
    ///
    /// Any type implementing this single method can be scheduled; concrete
    /// pollers (message retrieval, retry loops) implement their tick work
    /// here. The poller defines *when* it is called, never *what* it does.
    ///
    /// An `Err` return is reported through the `log` facade and scheduling
    /// continues with the next tick.
    ///
    /// ### Blanket implementation
    /// ```rust
    /// # use msg_poller::{TickEvent, WorkError};
    /// # fn take(_: impl msg_poller::PollWork) {}
    /// take(|_tick: &TickEvent| -> Result<(), WorkError> { Ok(()) });
    /// ```
    /// Any `Fn(&TickEvent) -> Result<(), WorkError> + Send + Sync + 'static`
    /// closure is a valid handler.
    pub trait PollWork: Send + Sync + 'static {
        fn do_work(&self, tick: &TickEvent) -> Result<(), WorkError>;
    }

    impl<F> PollWork for F
    where
        F: Fn(&TickEvent) -> Result<(), WorkError> + Send + Sync + 'static,
    {
        fn do_work(&self, tick: &TickEvent) -> Result<(), WorkError> {
            (self)(tick)
        }
    }

    /// Adapter wrapping an infallible closure into the [`PollWork`] contract.
    pub(crate) struct WorkFn<F>(pub F);

    impl<F> PollWork for WorkFn<F>
    where
        F: Fn(&TickEvent) + Send + Sync + 'static,
    {
        fn do_work(&self, tick: &TickEvent) -> Result<(), WorkError> {
            (self.0)(tick);
            Ok(())
        }
    }
}
