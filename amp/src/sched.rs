//! Cooperative task scheduler
//!
//! One instance per core, polled from the core's main loop. A fixed table of
//! [`config::SCHED_CAPACITY`] slots is scanned in index order on every [`Scheduler::run_once`]
//! call, so a lower index fires first when several tasks are due on the same tick. Due times are
//! compared with wrap-around arithmetic; delays are limited to [`config::MAX_DELAY`] ticks.
//!
//! Tasks run to completion and never preempt one another.

use core::fmt;

use log::warn;

use crate::{config, tick::Clock};

pub const CAPACITY: usize = config::SCHED_CAPACITY;

/// Firing policy of a task
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Kind {
    /// Fires on every `run_once` call; the delay is ignored
    Recurring = 1,
    /// Fires every `delay` ticks, re-armed from the tick it actually fired on
    Periodic = 2,
    /// Fires once, `delay` ticks after insertion, then frees its slot
    OneShot = 3,
}

// Slot code of a free slot
const UNUSED: u8 = 0;

impl Kind {
    fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            1 => Kind::Recurring,
            2 => Kind::Periodic,
            3 => Kind::OneShot,
            _ => return None,
        })
    }
}

/// A zero-argument unit of work
///
/// Slots hold a copy of the handle. `same` tells the `*_by_action` operations which slot a handle
/// belongs to.
pub trait Action: Copy {
    fn run(self);

    fn same(self, other: Self) -> bool;
}

impl Action for fn() {
    fn run(self) {
        self()
    }

    fn same(self, other: Self) -> bool {
        core::ptr::fn_addr_eq(self, other)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// Every slot is in use
    TableFull,
    /// The delay exceeds `MAX_DELAY`
    InvalidDelay(u32),
    /// A slot held an unknown kind code; it was freed without running
    CorruptSlot { slot: usize, code: u8 },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::TableFull => f.write_str("task table full"),
            Error::InvalidDelay(delay) => {
                write!(f, "delay of {} ticks exceeds {}", delay, config::MAX_DELAY)
            }
            Error::CorruptSlot { slot, code } => {
                write!(f, "slot {} has unknown kind {}; freed", slot, code)
            }
        }
    }
}

#[derive(Clone, Copy)]
struct Slot<A> {
    code: u8,
    action: Option<A>,
    due: u32,
    period: u32,
}

impl<A> Slot<A> {
    const FREE: Self = Slot {
        code: UNUSED,
        action: None,
        due: 0,
        period: 0,
    };

    fn is_used(&self) -> bool {
        self.code != UNUSED
    }
}

/// `true` if tick `due` has been reached at tick `now`
fn is_due(now: u32, due: u32) -> bool {
    now.wrapping_sub(due) < 1 << 31
}

pub struct Scheduler<A, C> {
    slots: [Slot<A>; CAPACITY],
    clock: C,
}

impl<A, C> Scheduler<A, C>
where
    A: Action,
    C: Clock,
{
    pub fn new(clock: C) -> Self {
        Scheduler {
            slots: [Slot::FREE; CAPACITY],
            clock,
        }
    }

    /// Current tick, as seen by this scheduler
    pub fn now(&self) -> u32 {
        self.clock.now()
    }

    /// Places `action` in the lowest-indexed free slot and returns that index
    ///
    /// The task is first due `delay` ticks from now. On error the table is left untouched.
    pub fn insert(&mut self, kind: Kind, action: A, delay: u32) -> Result<usize, Error> {
        if delay > config::MAX_DELAY {
            return Err(Error::InvalidDelay(delay));
        }

        let index = self
            .slots
            .iter()
            .position(|slot| !slot.is_used())
            .ok_or(Error::TableFull)?;

        self.slots[index] = Slot {
            code: kind as u8,
            action: Some(action),
            due: self.now().wrapping_add(delay),
            period: delay,
        };

        Ok(index)
    }

    /// Index of the lowest-indexed slot holding `action`
    pub fn find_by_action(&self, action: A) -> Option<usize> {
        self.slots.iter().position(|slot| {
            slot.is_used() && slot.action.map_or(false, |other| other.same(action))
        })
    }

    /// Frees slot `index`; returns `false` if it was already free or out of range
    pub fn delete(&mut self, index: usize) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) if slot.is_used() => {
                *slot = Slot::FREE;
                true
            }
            _ => false,
        }
    }

    /// Frees the first slot holding `action`; a no-op if there is none
    pub fn remove_by_action(&mut self, action: A) -> bool {
        match self.find_by_action(action) {
            Some(index) => self.delete(index),
            None => false,
        }
    }

    /// `remove_by_action` followed by `insert`
    ///
    /// The old slot is freed even when the insertion fails.
    pub fn replace_by_action(&mut self, kind: Kind, action: A, delay: u32) -> Result<usize, Error> {
        self.remove_by_action(action);
        self.insert(kind, action, delay)
    }

    /// Moves the next due time of the first slot holding `action` to `delay` ticks from now
    ///
    /// Kind and period are kept. Returns `false`, changing nothing, if no slot holds `action` or
    /// `delay` exceeds `MAX_DELAY`.
    pub fn reschedule_by_action(&mut self, action: A, delay: u32) -> bool {
        if delay > config::MAX_DELAY {
            return false;
        }

        match self.find_by_action(action) {
            Some(index) => {
                self.slots[index].due = self.now().wrapping_add(delay);
                true
            }
            None => false,
        }
    }

    /// Frees every slot
    pub fn clear(&mut self) {
        self.slots = [Slot::FREE; CAPACITY];
    }

    /// Number of slots in use
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_used()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == CAPACITY
    }

    /// Scans the table once, in index order, running every task that is due
    ///
    /// Returns the number of live tasks found during the scan.
    pub fn run_once(&mut self) -> usize {
        let mut live = 0;

        for index in 0..CAPACITY {
            let slot = self.slots[index];
            if !slot.is_used() {
                continue;
            }

            let (kind, action) = match (Kind::from_code(slot.code), slot.action) {
                (Some(kind), Some(action)) => (kind, action),
                _ => {
                    warn!(
                        "{}",
                        Error::CorruptSlot {
                            slot: index,
                            code: slot.code,
                        }
                    );
                    self.slots[index] = Slot::FREE;
                    continue;
                }
            };

            live += 1;

            match kind {
                Kind::Recurring => action.run(),
                Kind::Periodic => {
                    let now = self.now();
                    if is_due(now, slot.due) {
                        action.run();
                        self.slots[index].due = now.wrapping_add(slot.period);
                    }
                }
                Kind::OneShot => {
                    if is_due(self.now(), slot.due) {
                        self.slots[index] = Slot::FREE;
                        action.run();
                    }
                }
            }
        }

        live
    }

    #[cfg(test)]
    fn corrupt(&mut self, index: usize, code: u8) {
        self.slots[index].code = code;
    }
}
