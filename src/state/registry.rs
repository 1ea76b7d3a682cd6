//! The Registry - central shared state for the chat router.
//!
//! Holds the two record families (staff, customers) in concurrent maps
//! accessible from any async task. The registry is the sole owner of both;
//! other components read cloned snapshots and mutate through the atomic
//! [`Registry::update_staff`] / [`Registry::update_customer`] primitives.
//!
//! ## Why `update` instead of get/set
//!
//! A read-compute-write sequence taken under two separate lock acquisitions
//! loses updates: a concurrent writer can interleave between the read and
//! the write. Every read-modify-write here runs inside one `DashMap` entry
//! lock, so per-id operations are serialized. The closure receives
//! `&mut Option<Record>` - it can mutate, create, or delete the record in
//! the same critical section - and its return value carries any side-effect
//! plan out, to be executed after the lock is released. Closures must not
//! touch the registry again (same-shard reentry deadlocks) and must never
//! await.

use super::conn::ConnId;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// An online staff member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffRecord {
    /// Display label.
    pub name: String,
    /// Customer currently being served, if any.
    pub active_customer: Option<ConnId>,
    /// Customers waiting for this staff member, FIFO, no duplicates.
    pub queue: Vec<ConnId>,
}

impl StaffRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active_customer: None,
            queue: Vec::new(),
        }
    }

    /// Free staff serve the next customer immediately; everyone else queues.
    pub fn is_free(&self) -> bool {
        self.active_customer.is_none() && self.queue.is_empty()
    }
}

/// A connected customer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerRecord {
    /// Staff member this customer is bound to (active or queued).
    pub assigned_staff: Option<ConnId>,
}

/// Central in-memory store of staff and customer records.
pub struct Registry {
    staff: DashMap<ConnId, StaffRecord>,
    customers: DashMap<ConnId, CustomerRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            staff: DashMap::new(),
            customers: DashMap::new(),
        }
    }

    /// Clone the staff record for `id` (dropping the map guard immediately).
    pub fn staff(&self, id: ConnId) -> Option<StaffRecord> {
        self.staff.get(&id).map(|r| r.value().clone())
    }

    /// Clone the customer record for `id` (dropping the map guard immediately).
    pub fn customer(&self, id: ConnId) -> Option<CustomerRecord> {
        self.customers.get(&id).map(|r| r.value().clone())
    }

    /// Snapshot all staff records. Iteration order is arbitrary.
    pub fn staff_snapshot(&self) -> Vec<(ConnId, StaffRecord)> {
        self.staff
            .iter()
            .map(|e| (*e.key(), e.value().clone()))
            .collect()
    }

    /// Number of online staff.
    pub fn staff_count(&self) -> usize {
        self.staff.len()
    }

    /// Number of connected customers.
    pub fn customer_count(&self) -> usize {
        self.customers.len()
    }

    /// Create or overwrite a staff record.
    pub fn insert_staff(&self, id: ConnId, record: StaffRecord) {
        self.staff.insert(id, record);
    }

    /// Create or overwrite a customer record.
    pub fn insert_customer(&self, id: ConnId, record: CustomerRecord) {
        self.customers.insert(id, record);
    }

    /// Remove a staff record, returning it if present.
    pub fn remove_staff(&self, id: ConnId) -> Option<StaffRecord> {
        self.staff.remove(&id).map(|(_, record)| record)
    }

    /// Remove a customer record, returning it if present.
    pub fn remove_customer(&self, id: ConnId) -> Option<CustomerRecord> {
        self.customers.remove(&id).map(|(_, record)| record)
    }

    /// Apply `f` to the staff slot for `id` in one critical section.
    ///
    /// `f` sees the current record (or `None` if absent) and may mutate it,
    /// replace it, or take it to `None` to delete. Returns `f`'s result.
    pub fn update_staff<R>(&self, id: ConnId, f: impl FnOnce(&mut Option<StaffRecord>) -> R) -> R {
        update_slot(&self.staff, id, f)
    }

    /// Apply `f` to the customer slot for `id` in one critical section.
    pub fn update_customer<R>(
        &self,
        id: ConnId,
        f: impl FnOnce(&mut Option<CustomerRecord>) -> R,
    ) -> R {
        update_slot(&self.customers, id, f)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `f` against the slot for `id` while holding the entry lock.
fn update_slot<V: Default, R>(
    map: &DashMap<ConnId, V>,
    id: ConnId,
    f: impl FnOnce(&mut Option<V>) -> R,
) -> R {
    match map.entry(id) {
        Entry::Occupied(mut occupied) => {
            let mut slot = Some(std::mem::take(occupied.get_mut()));
            let result = f(&mut slot);
            match slot {
                Some(value) => *occupied.get_mut() = value,
                None => {
                    occupied.remove();
                }
            }
            result
        }
        Entry::Vacant(vacant) => {
            let mut slot = None;
            let result = f(&mut slot);
            if let Some(value) = slot {
                vacant.insert(value);
            }
            result
        }
    }
}
