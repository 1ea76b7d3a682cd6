//! Staff selection for newly connecting customers.

use super::conn::ConnId;
use super::registry::Registry;

/// Outcome of a staff search.
///
/// `staff == None` means nobody is online. `min_queue == None` with a staff
/// id means that staff member is free and the customer can chat at once;
/// `min_queue == Some(n)` means the customer must queue behind `n` others.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Match {
    pub staff: Option<ConnId>,
    pub min_queue: Option<usize>,
}

/// Select the staff member that should serve a newly connecting customer.
///
/// Free staff (no active customer, empty queue) win outright; otherwise the
/// busy staff member with the shortest queue is chosen. Ties go to the first
/// record encountered, and the underlying map iterates in arbitrary order,
/// so selection among equals is implementation-defined.
pub fn find_available_staff(registry: &Registry) -> Match {
    let mut shortest: Option<(ConnId, usize)> = None;

    for (id, staff) in registry.staff_snapshot() {
        if staff.is_free() {
            return Match {
                staff: Some(id),
                min_queue: None,
            };
        }
        let depth = staff.queue.len();
        if shortest.map_or(true, |(_, best)| depth < best) {
            shortest = Some((id, depth));
        }
    }

    match shortest {
        Some((id, depth)) => Match {
            staff: Some(id),
            min_queue: Some(depth),
        },
        None => Match::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::registry::StaffRecord;

    fn busy_staff(active: ConnId, queue: Vec<ConnId>) -> StaffRecord {
        StaffRecord {
            name: "Ann".to_string(),
            active_customer: Some(active),
            queue,
        }
    }

    #[test]
    fn no_staff_online() {
        let registry = Registry::new();
        assert_eq!(find_available_staff(&registry), Match::default());
    }

    #[test]
    fn free_staff_wins_over_busy() {
        let registry = Registry::new();
        registry.insert_staff(1, busy_staff(100, vec![]));
        registry.insert_staff(2, StaffRecord::new("Bea"));

        let result = find_available_staff(&registry);
        assert_eq!(result.staff, Some(2));
        assert_eq!(result.min_queue, None);
    }

    #[test]
    fn busy_staff_with_shortest_queue_selected() {
        let registry = Registry::new();
        registry.insert_staff(1, busy_staff(100, vec![101, 102]));
        registry.insert_staff(2, busy_staff(200, vec![201]));
        registry.insert_staff(3, busy_staff(300, vec![301, 302, 303]));

        let result = find_available_staff(&registry);
        assert_eq!(result.staff, Some(2));
        assert_eq!(result.min_queue, Some(1));
    }

    #[test]
    fn staff_with_queue_but_no_active_customer_is_not_free() {
        // A queue with no active chat still means waiting, not free.
        let registry = Registry::new();
        registry.insert_staff(
            1,
            StaffRecord {
                name: "Ann".to_string(),
                active_customer: None,
                queue: vec![101],
            },
        );

        let result = find_available_staff(&registry);
        assert_eq!(result.staff, Some(1));
        assert_eq!(result.min_queue, Some(1));
    }

    #[test]
    fn tie_between_busy_staff_selects_one_of_them() {
        let registry = Registry::new();
        registry.insert_staff(1, busy_staff(100, vec![101]));
        registry.insert_staff(2, busy_staff(200, vec![201]));

        let result = find_available_staff(&registry);
        assert!(matches!(result.staff, Some(1) | Some(2)));
        assert_eq!(result.min_queue, Some(1));
    }
}
