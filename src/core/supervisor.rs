//! # Supervisor: runs services together and stops them together.
//!
//! The [`Supervisor`] owns its context reference, the registered services, and the
//! subscribers. [`Supervisor::run`] is one-shot.
//!
//! ## High-level architecture
//! ```text
//! run():
//!   Created ──► Running      (snapshot services; later registrations are rejected)
//!
//!   Logger: ctx.logger() (resolved by the builder)
//!           └─► .with_app(name, version) bound on the supervisor's context
//!
//!   root  = supplied context ─► cancel scope
//!           (no supplied context: bind_interrupt(), canceled on SIGINT/SIGTERM/SIGQUIT)
//!           becomes Supervisor::context(); canceled when run returns
//!   group = root.with_cancel()                   (observed by every service)
//!
//!   service[0]   service[1]   ...   service[N-1]
//!       │            │                    │
//!       └──► JoinSet::spawn(run_service(service, group, logger, bus))
//!                    └──► ctx = group.with_value(logger.with_service(name))
//!
//!   join barrier:
//!     first Err ──► group.cancel() ──► publish GroupCanceled ──► keep it
//!     later Err ──► logged by the runner, discarded
//!     all joined ─► Completed(first Err or Ok)
//! ```
//!
//! ## Rules
//! - The supervisor never aborts a service; it cancels and waits.
//!   A service that ignores its context keeps `run` waiting.
//! - `Canceled`/`DeadlineExceeded` from a service is a normal stop.
//! - Exactly one error (the first) is returned; the rest are only logged.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use servisor::{Context, ServiceError, ServiceFn, Supervisor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (ctx, _cancel) = Context::background().with_timeout(Duration::from_millis(200));
//!     let sup = Supervisor::with_context(ctx, "demo", "1.0.0");
//!
//!     sup.add_service(ServiceFn::arc("ticker", |ctx: Context| async move {
//!         loop {
//!             tokio::select! {
//!                 cause = ctx.done() => return Err::<(), ServiceError>(cause.into()),
//!                 _ = tokio::time::sleep(Duration::from_millis(50)) => ctx.logger().debug("tick"),
//!             }
//!         }
//!     }))?;
//!
//!     sup.run().await?;
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::{
    sync::broadcast::error::RecvError,
    task::{self, JoinHandle, JoinSet},
    time,
};

use crate::{
    context::{CancelHandle, Context},
    core::{SupervisorBuilder, SupervisorConfig, runner::run_service, shutdown},
    error::{ServiceError, SupervisorError},
    events::{Bus, Event, EventKind},
    logging::Logger,
    services::ServiceRef,
    subscribers::{Subscribe, SubscriberSet},
};

/// Lifecycle of a supervisor. There is no way back to `Created`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Created,
    Running,
    Completed,
}

impl State {
    fn as_str(self) -> &'static str {
        match self {
            State::Created => "created",
            State::Running => "running",
            State::Completed => "completed",
        }
    }
}

/// Mutable part of the supervisor, guarded by one lock so that the state check and
/// the mutation it protects are atomic.
struct Registry {
    state: State,
    ctx: Context,
    services: Vec<ServiceRef>,
}

/// Runs registered services concurrently under one cancellable context.
pub struct Supervisor {
    cfg: SupervisorConfig,
    capture_interrupt: bool,
    subscribers: Vec<Arc<dyn Subscribe>>,
    registry: Mutex<Registry>,
}

impl Supervisor {
    /// Creates a supervisor that cancels its services on an interrupt signal.
    ///
    /// Empty `name`/`version` are inferred from the running executable.
    ///
    /// The SIGINT/SIGTERM/SIGQUIT handlers are registered when `run` starts and stay
    /// registered for the life of the process: after `run` returned those signals no
    /// longer terminate it. Exit explicitly once `run` returns.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        SupervisorBuilder::new(SupervisorConfig::new(name, version)).build()
    }

    /// Creates a supervisor on top of `ctx`.
    ///
    /// No interrupt handler is installed: `ctx` alone decides cancellation and deadline.
    pub fn with_context(ctx: Context, name: impl Into<String>, version: impl Into<String>) -> Self {
        SupervisorBuilder::new(SupervisorConfig::new(name, version))
            .with_context(ctx)
            .build()
    }

    /// Returns a builder for full control over configuration and subscribers.
    pub fn builder(cfg: SupervisorConfig) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg)
    }

    pub(super) fn new_internal(
        cfg: SupervisorConfig,
        ctx: Context,
        capture_interrupt: bool,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Self {
        Self {
            cfg,
            capture_interrupt,
            subscribers,
            registry: Mutex::new(Registry {
                state: State::Created,
                ctx,
                services: Vec::new(),
            }),
        }
    }

    /// Application name (attached to every log line as `app`).
    pub fn name(&self) -> &str {
        &self.cfg.name
    }

    /// Application version (attached to every log line as `version`).
    pub fn version(&self) -> &str {
        &self.cfg.version
    }

    /// Returns the supervisor's current context reference.
    ///
    /// Once `run` started this is the run's root scope: it carries the app logger, ends
    /// on an interrupt signal (when no context was supplied), and is canceled when `run`
    /// returns.
    pub fn context(&self) -> Context {
        self.lock().ctx.clone()
    }

    /// Registers a service. Duplicate names are allowed.
    ///
    /// Fails with [`SupervisorError::NotAccepting`] once `run` has started.
    pub fn add_service(&self, service: ServiceRef) -> Result<(), SupervisorError> {
        let mut reg = self.accepting()?;
        reg.services.push(service);
        Ok(())
    }

    /// Binds `value` under its type on the supervisor's context.
    ///
    /// Binding a [`Logger`] here replaces the default logger.
    pub fn set<T>(&self, value: T) -> Result<(), SupervisorError>
    where
        T: Send + Sync + 'static,
    {
        let mut reg = self.accepting()?;
        reg.ctx = reg.ctx.with_value(value);
        Ok(())
    }

    /// Binds `value` under `key` on the supervisor's context.
    pub fn add_value<K, V>(&self, key: K, value: V) -> Result<(), SupervisorError>
    where
        K: PartialEq + Send + Sync + 'static,
        V: Send + Sync + 'static,
    {
        let mut reg = self.accepting()?;
        reg.ctx = reg.ctx.with_keyed(key, value);
        Ok(())
    }

    /// Returns the value bound under type `T`, or `T::default()`.
    pub fn get<T>(&self) -> T
    where
        T: Clone + Default + 'static,
    {
        crate::context::get(&self.context())
    }

    /// Runs every registered service until all of them returned.
    ///
    /// Returns the first non-benign service error, or `Ok(())`. A second call returns
    /// [`SupervisorError::AlreadyStarted`].
    pub async fn run(&self) -> Result<(), SupervisorError> {
        let (ctx, services) = self.start()?;

        let logger = ctx.logger().with_app(self.name(), self.version());
        let ctx = ctx.with_value(logger.clone());

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let listener = self.subscriber_listener(&bus);

        let (root, root_cancel) = if self.capture_interrupt {
            shutdown::bind_interrupt(&ctx, logger.clone(), bus.clone())
        } else {
            ctx.with_cancel()
        };
        self.lock().ctx = root.clone();
        let (group, group_cancel) = root.with_cancel();

        logger.info("starting app");
        bus.publish(Event::new(EventKind::RunStarting).with_service(self.name()));

        let mut set = JoinSet::new();
        let mut names = HashMap::with_capacity(services.len());
        for service in services {
            let name = service.name().to_owned();
            let handle = set.spawn(run_service(service, group.clone(), logger.clone(), bus.clone()));
            names.insert(handle.id(), name);
        }

        let result = Self::join_all(&mut set, &names, &group_cancel, &logger, &bus).await;

        group_cancel.cancel();
        root_cancel.cancel();
        self.lock().state = State::Completed;

        let finished = Event::new(EventKind::RunFinished).with_service(self.name());
        match &result {
            Ok(()) => {
                logger.info("app stopped");
                bus.publish(finished);
            }
            Err(err) => {
                logger.warn(format_args!("app stopped: {err}"));
                bus.publish(finished.with_reason(err.to_string()));
            }
        }
        self.flush(listener).await;
        result
    }

    /// Join barrier: keeps the first error, cancels the group when it arrives, and
    /// waits for every service.
    async fn join_all(
        set: &mut JoinSet<Result<(), SupervisorError>>,
        names: &HashMap<task::Id, String>,
        group_cancel: &CancelHandle,
        logger: &Logger,
        bus: &Bus,
    ) -> Result<(), SupervisorError> {
        let mut first: Option<SupervisorError> = None;

        while let Some(joined) = set.join_next_with_id().await {
            let outcome = match joined {
                Ok((_, outcome)) => outcome,
                Err(join_err) => {
                    let service = names.get(&join_err.id()).cloned().unwrap_or_default();
                    logger.error(format_args!("service {service:?} did not complete: {join_err}"));
                    Err(SupervisorError::Service {
                        service,
                        source: ServiceError::Panicked {
                            info: join_err.to_string(),
                        },
                    })
                }
            };

            let Err(err) = outcome else { continue };
            if first.is_some() {
                continue;
            }

            group_cancel.cancel();
            logger.warn(format_args!("canceling remaining services: {err}"));
            let mut ev = Event::new(EventKind::GroupCanceled).with_reason(err.to_string());
            if let SupervisorError::Service { service, .. } = &err {
                ev = ev.with_service(service.as_str());
            }
            bus.publish(ev);
            first = Some(err);
        }

        first.map_or(Ok(()), Err)
    }

    /// Subscribes to the bus and forwards events to the subscriber set until the run's
    /// last event, then drains the set.
    fn subscriber_listener(&self, bus: &Bus) -> Option<JoinHandle<()>> {
        if self.subscribers.is_empty() {
            return None;
        }
        let mut rx = bus.subscribe();
        let set = SubscriberSet::new(self.subscribers.clone(), bus.clone());

        Some(tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => {
                        set.emit(&ev);
                        if ev.is_terminal() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
            set.shutdown().await;
        }))
    }

    /// Waits (bounded by `flush_timeout`) for subscribers to process the run's events.
    async fn flush(&self, listener: Option<JoinHandle<()>>) {
        let (Some(listener), Some(limit)) = (listener, self.cfg.flush_limit()) else {
            return;
        };
        let _ = time::timeout(limit, listener).await;
    }

    /// Flips `Created → Running` and snapshots the services in one critical section.
    fn start(&self) -> Result<(Context, Vec<ServiceRef>), SupervisorError> {
        let mut reg = self.lock();
        if reg.state != State::Created {
            return Err(SupervisorError::AlreadyStarted);
        }
        reg.state = State::Running;
        Ok((reg.ctx.clone(), std::mem::take(&mut reg.services)))
    }

    fn accepting(&self) -> Result<MutexGuard<'_, Registry>, SupervisorError> {
        let reg = self.lock();
        match reg.state {
            State::Created => Ok(reg),
            other => Err(SupervisorError::NotAccepting {
                state: other.as_str(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::logging::capture::capturing;
    use crate::{Cause, ServiceFn};

    fn quiet(ctx: Context) -> Supervisor {
        Supervisor::with_context(ctx.with_value(Logger::disabled()), "test", "1.0.0")
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Event>>);

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, event: &Event) {
            self.0.lock().unwrap().push(event.clone());
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    #[test]
    fn test_empty_name_and_version_are_inferred() {
        let sup = Supervisor::with_context(Context::background(), "", "");
        assert!(sup.name().starts_with("servisor"));
        assert_eq!(sup.version().len(), 15);

        let named = Supervisor::with_context(Context::background(), "api", "2.0");
        assert_eq!((named.name(), named.version()), ("api", "2.0"));
    }

    #[test]
    fn test_set_and_get_typed_value() {
        #[derive(Clone, Default, PartialEq, Debug)]
        struct Settings {
            name: String,
        }

        let sup = quiet(Context::background());
        sup.set(Settings { name: "test".into() }).unwrap();
        assert_eq!(sup.get::<Settings>().name, "test");
        assert_eq!(sup.get::<u32>(), 0);

        sup.add_value("key", "value").unwrap();
        assert_eq!(sup.context().keyed::<_, &str>(&"key"), Some("value"));
    }

    #[tokio::test]
    async fn test_registration_rejected_after_run() {
        let sup = quiet(Context::background());
        sup.run().await.unwrap();

        let late = ServiceFn::arc("late", |_ctx: Context| async { Ok::<(), ServiceError>(()) });
        assert!(matches!(
            sup.add_service(late),
            Err(SupervisorError::NotAccepting { state: "completed" })
        ));
        assert!(matches!(sup.set(1u8), Err(SupervisorError::NotAccepting { .. })));
        assert!(matches!(sup.run().await, Err(SupervisorError::AlreadyStarted)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_services_receive_app_logger_and_values() {
        let sup = quiet(Context::background());
        sup.set(42u64).unwrap();
        let seen = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let seen = Arc::clone(&seen);
            sup.add_service(ServiceFn::arc("probe", move |ctx: Context| {
                let seen = Arc::clone(&seen);
                async move {
                    if ctx.value::<u64>() == Some(42) && ctx.value::<Logger>().is_some() {
                        seen.fetch_add(1, Ordering::SeqCst);
                    }
                    Ok(())
                }
            }))
            .unwrap();
        }

        sup.run().await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 2);
        assert!(sup.context().value::<Logger>().is_some());
    }

    #[tokio::test]
    async fn test_context_ends_with_run() {
        let sup = Supervisor::builder(SupervisorConfig::new("ctx", "1"))
            .with_logger(Logger::disabled())
            .build();
        sup.add_service(ServiceFn::arc("ok", |_ctx: Context| async { Ok::<(), ServiceError>(()) }))
            .unwrap();
        assert!(sup.context().err().is_none());

        sup.run().await.unwrap();
        assert_eq!(sup.context().err(), Some(Cause::Canceled));
        assert!(sup.context().value::<Logger>().is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_each_service_logs_with_its_own_fields() {
        let (logger, out) = capturing();
        let sup = Supervisor::builder(SupervisorConfig::new("shop", "2.1.0"))
            .with_context(Context::background())
            .with_logger(logger)
            .build();

        for name in ["orders", "billing"] {
            sup.add_service(ServiceFn::arc(name, move |ctx: Context| async move {
                ctx.logger().info(format_args!("hello from {name}"));
                Ok::<(), ServiceError>(())
            }))
            .unwrap();
        }
        sup.run().await.unwrap();

        for (name, sibling) in [("orders", "billing"), ("billing", "orders")] {
            let lines = out.lines_with(&format!("hello from {name}"));
            assert_eq!(lines.len(), 1, "{}", out.text());
            let line = &lines[0];
            assert!(line.contains("app=shop"), "{line}");
            assert!(line.contains("version=2.1.0"), "{line}");
            assert!(line.contains(&format!("service={name}")), "{line}");
            assert!(!line.contains(&format!("service={sibling}")), "{line}");
        }

        let app_lines = out.lines_with("starting app");
        assert_eq!(app_lines.len(), 1, "{}", out.text());
        assert!(!app_lines[0].contains("service="), "{}", app_lines[0]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_group_is_canceled_after_run() {
        let sup = quiet(Context::background());
        let (tx, rx) = tokio::sync::oneshot::channel::<Context>();
        let tx = Mutex::new(Some(tx));
        sup.add_service(ServiceFn::arc("leaks-context", move |ctx: Context| {
            let tx = tx.lock().unwrap().take();
            async move {
                if let Some(tx) = tx {
                    let _ = tx.send(ctx);
                }
                Ok::<(), ServiceError>(())
            }
        }))
        .unwrap();

        sup.run().await.unwrap();
        let leaked = rx.await.unwrap();
        assert_eq!(leaked.err(), Some(Cause::Canceled));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_panicking_service_cancels_siblings() {
        let sup = quiet(Context::background());
        sup.add_service(ServiceFn::arc("panics", |_ctx: Context| async {
            if true {
                panic!("bad state");
            }
            Ok::<(), ServiceError>(())
        }))
        .unwrap();
        sup.add_service(ServiceFn::arc("waits", |ctx: Context| async move {
            Err::<(), ServiceError>(ctx.done().await.into())
        }))
        .unwrap();

        let res = time::timeout(Duration::from_secs(5), sup.run())
            .await
            .expect("run hung");
        match res {
            Err(SupervisorError::Service { service, source }) => {
                assert_eq!(service, "panics");
                assert!(matches!(source, ServiceError::Panicked { .. }));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_subscribers_see_run_markers() {
        let rec = Arc::new(Recorder::default());
        let sup = Supervisor::builder(SupervisorConfig::new("events", "1"))
            .with_context(Context::background())
            .with_logger(Logger::disabled())
            .with_subscribers(vec![rec.clone() as Arc<dyn Subscribe>])
            .build();

        sup.add_service(ServiceFn::arc("ok", |_ctx: Context| async { Ok::<(), ServiceError>(()) }))
            .unwrap();
        sup.add_service(ServiceFn::arc("bad", |_ctx: Context| async {
            Err::<(), ServiceError>(ServiceError::msg("nope"))
        }))
        .unwrap();

        assert!(sup.run().await.is_err());

        let events = rec.0.lock().unwrap().clone();
        let kinds: Vec<EventKind> = events.iter().map(|e| e.kind).collect();
        assert_eq!(kinds.first(), Some(&EventKind::RunStarting));
        assert_eq!(kinds.last(), Some(&EventKind::RunFinished));
        assert_eq!(kinds.iter().filter(|k| **k == EventKind::ServiceStarting).count(), 2);
        assert!(kinds.contains(&EventKind::ServiceFailed));

        let canceled = events
            .iter()
            .find(|e| e.kind == EventKind::GroupCanceled)
            .expect("no GroupCanceled");
        assert_eq!(canceled.service.as_deref(), Some("bad"));
    }
}
