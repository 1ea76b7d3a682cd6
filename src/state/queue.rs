//! Per-staff wait queue maintenance.
//!
//! Each operation is one atomic update against the staff record. Release
//! computes its notification side effects into a [`ReleasePlan`] inside the
//! critical section; the caller delivers them after the state change has
//! committed.

use super::conn::ConnId;
use super::registry::Registry;

/// What happened when a customer was released from a staff binding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleasePlan {
    /// Customer promoted from the queue front into the active slot.
    pub promoted: Option<ConnId>,
    /// `(customer, 1-based position)` for everyone still waiting.
    pub positions: Vec<(ConnId, usize)>,
}

/// Append `customer_id` to the staff wait queue.
///
/// The caller has already set the customer's `assigned_staff`. Duplicate
/// enqueues are no-ops. Returns the customer's 1-based queue position, or
/// `None` if the staff member no longer exists.
pub fn enqueue(registry: &Registry, staff_id: ConnId, customer_id: ConnId) -> Option<usize> {
    registry.update_staff(staff_id, |slot| {
        let staff = slot.as_mut()?;
        if staff.active_customer == Some(customer_id) {
            return None;
        }
        if let Some(index) = staff.queue.iter().position(|&c| c == customer_id) {
            return Some(index + 1);
        }
        staff.queue.push(customer_id);
        Some(staff.queue.len())
    })
}

/// Bind `customer_id` as the staff member's active customer.
///
/// Used for immediate matches against free staff. Returns `false` if the
/// staff member no longer exists.
pub fn assign_active(registry: &Registry, staff_id: ConnId, customer_id: ConnId) -> bool {
    registry.update_staff(staff_id, |slot| match slot.as_mut() {
        Some(staff) => {
            staff.active_customer = Some(customer_id);
            true
        }
        None => false,
    })
}

/// Release `customer_id` from its binding to `staff_id`.
///
/// Called when a bound customer goes away (disconnect, idle eviction, staff
/// teardown). If the customer held the active slot, the queue front (if
/// any) is promoted into it; otherwise the customer is removed from
/// wherever it sits in the queue, preserving the order of the rest. Either
/// way the remaining waiters are renumbered.
pub fn release(registry: &Registry, staff_id: ConnId, customer_id: ConnId) -> ReleasePlan {
    registry.update_staff(staff_id, |slot| {
        let Some(staff) = slot.as_mut() else {
            return ReleasePlan::default();
        };

        let mut plan = ReleasePlan::default();
        if staff.active_customer == Some(customer_id) {
            if staff.queue.is_empty() {
                staff.active_customer = None;
            } else {
                let next = staff.queue.remove(0);
                staff.active_customer = Some(next);
                plan.promoted = Some(next);
                plan.positions = renumber(&staff.queue);
            }
        } else if let Some(index) = staff.queue.iter().position(|&c| c == customer_id) {
            staff.queue.remove(index);
            plan.positions = renumber(&staff.queue);
        }
        plan
    })
}

fn renumber(queue: &[ConnId]) -> Vec<(ConnId, usize)> {
    queue
        .iter()
        .enumerate()
        .map(|(index, &customer)| (customer, index + 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::registry::StaffRecord;

    fn registry_with_staff() -> Registry {
        let registry = Registry::new();
        registry.insert_staff(1, StaffRecord::new("Ann"));
        registry
    }

    #[test]
    fn enqueue_returns_one_based_positions() {
        let registry = registry_with_staff();
        assert_eq!(enqueue(&registry, 1, 101), Some(1));
        assert_eq!(enqueue(&registry, 1, 102), Some(2));
        assert_eq!(registry.staff(1).unwrap().queue, vec![101, 102]);
    }

    #[test]
    fn enqueue_duplicate_keeps_original_position() {
        let registry = registry_with_staff();
        enqueue(&registry, 1, 101);
        enqueue(&registry, 1, 102);
        assert_eq!(enqueue(&registry, 1, 101), Some(1));
        assert_eq!(registry.staff(1).unwrap().queue, vec![101, 102]);
    }

    #[test]
    fn enqueue_rejects_the_active_customer() {
        let registry = registry_with_staff();
        assign_active(&registry, 1, 100);
        assert_eq!(enqueue(&registry, 1, 100), None);
        assert!(registry.staff(1).unwrap().queue.is_empty());
    }

    #[test]
    fn enqueue_to_missing_staff_is_none() {
        let registry = Registry::new();
        assert_eq!(enqueue(&registry, 9, 101), None);
    }

    #[test]
    fn release_active_with_empty_queue_frees_the_slot() {
        let registry = registry_with_staff();
        assign_active(&registry, 1, 100);

        let plan = release(&registry, 1, 100);
        assert_eq!(plan, ReleasePlan::default());
        assert_eq!(registry.staff(1).unwrap().active_customer, None);
    }

    #[test]
    fn release_active_promotes_queue_front() {
        let registry = registry_with_staff();
        assign_active(&registry, 1, 100);
        enqueue(&registry, 1, 101);
        enqueue(&registry, 1, 102);
        enqueue(&registry, 1, 103);

        let plan = release(&registry, 1, 100);
        assert_eq!(plan.promoted, Some(101));
        assert_eq!(plan.positions, vec![(102, 1), (103, 2)]);

        let staff = registry.staff(1).unwrap();
        assert_eq!(staff.active_customer, Some(101));
        assert_eq!(staff.queue, vec![102, 103]);
    }

    #[test]
    fn release_queued_customer_from_the_middle() {
        let registry = registry_with_staff();
        assign_active(&registry, 1, 100);
        enqueue(&registry, 1, 101);
        enqueue(&registry, 1, 102);
        enqueue(&registry, 1, 103);

        let plan = release(&registry, 1, 102);
        assert_eq!(plan.promoted, None);
        assert_eq!(plan.positions, vec![(101, 1), (103, 2)]);

        let staff = registry.staff(1).unwrap();
        assert_eq!(staff.active_customer, Some(100));
        assert_eq!(staff.queue, vec![101, 103]);
    }

    #[test]
    fn release_unknown_customer_is_a_noop() {
        let registry = registry_with_staff();
        assign_active(&registry, 1, 100);
        enqueue(&registry, 1, 101);

        let plan = release(&registry, 1, 999);
        assert_eq!(plan, ReleasePlan::default());
        let staff = registry.staff(1).unwrap();
        assert_eq!(staff.active_customer, Some(100));
        assert_eq!(staff.queue, vec![101]);
    }

    #[test]
    fn release_against_missing_staff_is_a_noop() {
        let registry = Registry::new();
        assert_eq!(release(&registry, 9, 100), ReleasePlan::default());
    }

    // Invariant: the active customer never also sits in the queue, across
    // any sequence of queue operations.
    #[test]
    fn active_customer_never_in_own_queue() {
        let registry = registry_with_staff();
        assign_active(&registry, 1, 100);
        enqueue(&registry, 1, 101);
        enqueue(&registry, 1, 102);

        for released in [100, 101] {
            release(&registry, 1, released);
            let staff = registry.staff(1).unwrap();
            if let Some(active) = staff.active_customer {
                assert!(!staff.queue.contains(&active));
            }
        }
    }
}
