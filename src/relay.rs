use std::collections::HashSet;
use std::marker::PhantomData;
use std::os::raw::{c_uint, c_void};
use std::ptr::{self, NonNull};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use lazy_static::lazy_static;

use crate::engine::Engine;
use crate::collision::Collision;
use crate::handle::{AsHandle, Handle};
use crate::registry::{CallbackKind, Command, Owner, Slot, Table};
use crate::world::World;

/// Source of the ticks the engine uses to profile its update.
pub trait PerformanceClock: 'static {
    fn ticks() -> u32;
}

/// Microseconds elapsed since the clock was first queried, wrapping around
/// `u32::MAX`.
#[derive(Debug)]
pub enum MonotonicClock {}

lazy_static! {
    static ref EPOCH: Instant = Instant::now();
}

impl PerformanceClock for MonotonicClock {
    fn ticks() -> u32 {
        EPOCH.elapsed().as_micros() as u32
    }
}

/// Relay builder.
#[derive(Debug, Default)]
pub struct RelayConfig {
    threads: Option<usize>,
    capacity: usize,
    debug: Option<&'static str>,
}

impl RelayConfig {
    /// Use all CPU cores.
    pub fn max_threads(mut self) -> Self {
        self.threads = Some(num_cpus::get());
        self
    }

    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Number of handlers to preallocate room for.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Name prefixed to the log lines of the relay.
    pub fn debug(mut self, name: &'static str) -> Self {
        self.debug = Some(name);
        self
    }

    pub fn attach<E: Engine>(self, world: World) -> Relay<E> {
        Relay::from_config(world, self)
    }
}

/// Relays engine callbacks of one world to application handlers.
///
/// The relay installs itself as the user data of the world, so there can
/// only be one per world, and it must be dropped before the world is
/// destroyed. Attaching a second relay to the same world takes the world
/// over: the first one stops receiving callbacks.
#[derive(Debug)]
pub struct Relay<E: Engine> {
    world: World,
    table: NonNull<Table>,
    rx: Receiver<Command>,
    // collisions whose user data points at `table`
    collisions: HashSet<Handle>,
    _engine: PhantomData<fn() -> E>,
}

impl<E: Engine> Relay<E> {
    pub fn config() -> RelayConfig {
        RelayConfig::default()
    }

    pub fn attach(world: World) -> Self {
        Self::from_config(world, RelayConfig::default())
    }

    fn from_config(world: World, conf: RelayConfig) -> Self {
        let (tx, rx) = mpsc::channel();
        let table = Box::new(Table::new(conf.debug, conf.capacity, tx));
        let table = unsafe { NonNull::new_unchecked(Box::into_raw(table)) };

        unsafe {
            let previous = E::world_get_user_data(world.as_raw());
            if !previous.is_null() {
                log::warn!(
                    "[{}] world {:?} already has a relay attached, taking it over",
                    conf.debug.unwrap_or("newton"),
                    world.handle()
                );
            }
            E::world_set_user_data(world.as_raw(), table.as_ptr() as *mut c_void);
            if let Some(threads) = conf.threads {
                E::set_threads_count(world.as_raw(), threads as _);
            }
        }

        log::debug!(
            "[{}] attached to world {:?} (threads = {:?})",
            conf.debug.unwrap_or("newton"),
            world.handle(),
            conf.threads
        );

        Self {
            world,
            table,
            rx,
            collisions: HashSet::new(),
            _engine: PhantomData,
        }
    }

    pub fn world(&self) -> World {
        self.world
    }

    pub(crate) fn table(&self) -> &Table {
        unsafe { self.table.as_ref() }
    }

    fn table_mut(&mut self) -> &mut Table {
        unsafe { self.table.as_mut() }
    }

    pub(crate) fn register(&mut self, owner: Owner, slot: Slot) {
        self.collect();
        self.table_mut().insert(owner, slot);
    }

    fn owns_user_data(&self, data: *mut c_void) -> bool {
        data as *const Table == self.table.as_ptr() as *const Table
    }

    /// Points the user data of `collision` at the table, so callbacks that
    /// only know the collision can find their handlers.
    pub(crate) fn claim_collision(&mut self, collision: Collision) {
        unsafe { E::collision_set_user_data(collision.as_raw(), self.table.as_ptr() as *mut c_void) }
        self.collisions.insert(collision.handle());
    }

    unsafe fn unclaim_collision(&self, handle: Handle) {
        let raw = handle.as_ptr() as *const _;
        if self.owns_user_data(E::collision_get_user_data(raw)) {
            E::collision_set_user_data(raw, ptr::null_mut());
        }
    }

    /// Releases the handlers of the objects the engine destroyed since the
    /// last call. Returns the number of objects released.
    ///
    /// Every mutating method of the relay does this first.
    pub fn collect(&mut self) -> usize {
        let mut released = 0;
        while let Ok(command) = self.rx.try_recv() {
            match command {
                Command::Release(handle) => {
                    self.table_mut().release(handle);
                    released += 1;
                }
            }
        }
        released
    }

    /// Drops every handler registered for `object`.
    ///
    /// Bodies and joints are released automatically after their destructor
    /// runs. Collisions must be released by hand, before they are destroyed.
    pub fn release<H: AsHandle>(&mut self, object: H) -> usize {
        self.collect();
        let handle = object.as_handle();
        if self.collisions.remove(&handle) {
            unsafe { self.unclaim_collision(handle) }
        }
        self.table_mut().release(handle)
    }

    /// Whether a handler of `kind` is registered for `object`.
    ///
    /// Does not drain pending releases: handlers of objects the engine has
    /// destroyed still count until the next mutating call or
    /// [`collect`](Relay::collect).
    pub fn is_registered<H: AsHandle>(&self, object: H, kind: CallbackKind) -> bool {
        self.table().contains(Owner::Object(object.as_handle()), kind)
    }

    /// Number of registered handlers, including those of destroyed objects
    /// not yet collected.
    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Steps the simulation by a fixed amount (synchronous).
    pub fn update(&mut self, step: Duration) {
        self.collect();
        unsafe { E::update(self.world.as_raw(), step.as_secs_f32()) }
    }

    /// Installs `C` as the clock the engine profiles its update with.
    pub fn set_performance_clock<C: PerformanceClock>(&mut self) {
        unsafe { E::set_performance_clock(self.world.as_raw(), Some(ticks::<C>)) }

        unsafe extern "C" fn ticks<C: PerformanceClock>() -> c_uint {
            C::ticks() as c_uint
        }
    }
}

impl<E: Engine> Drop for Relay<E> {
    fn drop(&mut self) {
        log::debug!("[{}] detached from world {:?}", self.table().name(), self.world.handle());
        unsafe {
            for &collision in &self.collisions {
                self.unclaim_collision(collision);
            }
            // a relay attached after this one owns the world now
            if self.owns_user_data(E::world_get_user_data(self.world.as_raw())) {
                E::world_set_user_data(self.world.as_raw(), ptr::null_mut());
            }
            let _ = Box::from_raw(self.table.as_ptr());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_clock_advances() {
        let t0 = MonotonicClock::ticks();
        std::thread::sleep(Duration::from_millis(2));
        let t1 = MonotonicClock::ticks();
        assert!(t1.wrapping_sub(t0) >= 2_000);
    }
}
