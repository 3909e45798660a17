use std::collections::HashMap;
use std::fmt;
use std::sync::mpsc::Sender;

use slab::Slab;

use crate::handle::Handle;
use crate::handler::*;
use crate::material::GroupId;

/// Owner of a persistent callback slot.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(crate) enum Owner {
    Object(Handle),
    /// Unordered pair of material groups.
    Materials(GroupId, GroupId),
}

impl Owner {
    pub fn materials(a: GroupId, b: GroupId) -> Self {
        if a <= b {
            Owner::Materials(a, b)
        } else {
            Owner::Materials(b, a)
        }
    }
}

/// Kinds of persistent callbacks held by a relay.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CallbackKind {
    BodyLeaveWorld,
    AabbOverlap,
    ContactsProcess,
    BodyDestructor,
    Transform,
    ForceAndTorque,
    JointDestructor,
    Ball,
    Hinge,
    Slider,
    Corkscrew,
    Universal,
    TreeRayCast,
    StaticDebug,
}

pub(crate) enum Slot {
    BodyLeaveWorld(Box<dyn BodyLeaveWorldHandler>),
    AabbOverlap(Box<dyn AabbOverlapHandler>),
    ContactsProcess(Box<dyn ContactsProcessHandler>),
    BodyDestructor(Box<dyn BodyDestructorHandler>),
    Transform(Box<dyn TransformHandler>),
    ForceAndTorque(Box<dyn ForceAndTorqueHandler>),
    JointDestructor(Box<dyn JointDestructorHandler>),
    Ball(Box<dyn BallHandler>),
    Hinge(Box<dyn HingeHandler>),
    Slider(Box<dyn SliderHandler>),
    Corkscrew(Box<dyn CorkscrewHandler>),
    Universal(Box<dyn UniversalHandler>),
    TreeRayCast(Box<dyn TreeRayCastHandler>),
    StaticDebug(Box<dyn StaticDebugHandler>),
}

impl Slot {
    pub fn kind(&self) -> CallbackKind {
        match self {
            Slot::BodyLeaveWorld(_) => CallbackKind::BodyLeaveWorld,
            Slot::AabbOverlap(_) => CallbackKind::AabbOverlap,
            Slot::ContactsProcess(_) => CallbackKind::ContactsProcess,
            Slot::BodyDestructor(_) => CallbackKind::BodyDestructor,
            Slot::Transform(_) => CallbackKind::Transform,
            Slot::ForceAndTorque(_) => CallbackKind::ForceAndTorque,
            Slot::JointDestructor(_) => CallbackKind::JointDestructor,
            Slot::Ball(_) => CallbackKind::Ball,
            Slot::Hinge(_) => CallbackKind::Hinge,
            Slot::Slider(_) => CallbackKind::Slider,
            Slot::Corkscrew(_) => CallbackKind::Corkscrew,
            Slot::Universal(_) => CallbackKind::Universal,
            Slot::TreeRayCast(_) => CallbackKind::TreeRayCast,
            Slot::StaticDebug(_) => CallbackKind::StaticDebug,
        }
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Slot({:?})", self.kind())
    }
}

/// Messages sent to the relay from inside engine callbacks.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Command {
    /// The engine destroyed the object. Its slots can go.
    Release(Handle),
}

/// Persistent handlers of one world, keyed by owner and callback kind.
///
/// Trampolines only ever read the table. Mutation goes through `&mut Relay`.
#[derive(Debug)]
pub(crate) struct Table {
    debug: Option<&'static str>,
    slots: Slab<Slot>,
    index: HashMap<(Owner, CallbackKind), usize>,
    tx: Sender<Command>,
}

impl Table {
    pub fn new(debug: Option<&'static str>, capacity: usize, tx: Sender<Command>) -> Self {
        Self {
            debug,
            slots: Slab::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            tx,
        }
    }

    pub fn name(&self) -> &'static str {
        self.debug.unwrap_or("newton")
    }

    /// Installs a slot, replacing the previous one of the same kind.
    /// Returns `true` if a slot was replaced.
    pub fn insert(&mut self, owner: Owner, slot: Slot) -> bool {
        let kind = slot.kind();
        match self.index.get(&(owner, kind)) {
            Some(&key) => {
                log::trace!("[{}] replacing {:?} slot of {:?}", self.name(), kind, owner);
                self.slots[key] = slot;
                true
            }
            None => {
                log::debug!("[{}] installing {:?} slot for {:?}", self.name(), kind, owner);
                let key = self.slots.insert(slot);
                self.index.insert((owner, kind), key);
                false
            }
        }
    }

    #[inline]
    pub fn get(&self, owner: Owner, kind: CallbackKind) -> Option<&Slot> {
        self.index.get(&(owner, kind)).and_then(|&key| self.slots.get(key))
    }

    pub fn contains(&self, owner: Owner, kind: CallbackKind) -> bool {
        self.index.contains_key(&(owner, kind))
    }

    /// Drops every slot owned by `handle`. Returns how many were dropped.
    pub fn release(&mut self, handle: Handle) -> usize {
        let slots = &mut self.slots;
        let before = self.index.len();
        self.index.retain(|&(owner, _), &mut key| {
            if owner == Owner::Object(handle) {
                slots.remove(key);
                false
            } else {
                true
            }
        });
        let released = before - self.index.len();
        if released > 0 {
            log::trace!("[{}] released {} slot(s) of {:?}", self.name(), released, handle);
        }
        released
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn notify(&self, command: Command) {
        // the receiver lives in the relay that owns this table
        let _ = self.tx.send(command);
    }
}
