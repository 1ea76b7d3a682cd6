//! Connection lifecycle orchestration.
//!
//! [`ChatEngine`] is the single entry point for the four external events
//! (staff-online, customer-connect, message, disconnect) plus idle
//! eviction. It owns the registry and drives matching, queueing, and the
//! timeout supervisor; outbound notifications go through the injected
//! [`Push`] collaborator after each state change commits.

use super::conn::{ConnId, Push};
use super::matching;
use super::queue::{self, ReleasePlan};
use super::registry::{CustomerRecord, Registry, StaffRecord};
use super::timeout::TimeoutSupervisor;
use desk_proto::{Party, ServerFrame};
use std::sync::Arc;
use tracing::{debug, info};

const MSG_NO_STAFF: &str = "No staff is on duty right now";
const MSG_QUEUED: &str = "All staff are busy, you have been placed in the shortest queue";
const MSG_CONNECTED: &str = "You are now connected to staff";
const MSG_QUEUE_ENDED: &str = "Queue finished, staff is ready to chat";
const MSG_NEW_CUSTOMER: &str = "A new customer has connected, you can start chatting";
const MSG_STILL_QUEUED: &str = "You are still in the queue, please wait";
const MSG_STAFF_OFFLINE_CHAT: &str = "Staff has gone offline, the chat has ended";
const MSG_STAFF_OFFLINE_QUEUE: &str = "Staff has gone offline, reconnect to another?";
const MSG_QUEUE_POSITION: &str = "Queue position: ";

/// The matching/queueing/timeout engine behind the transport.
pub struct ChatEngine {
    registry: Registry,
    timeouts: Arc<TimeoutSupervisor>,
    pusher: Arc<dyn Push>,
    default_staff_name: String,
}

impl ChatEngine {
    pub fn new(
        timeouts: Arc<TimeoutSupervisor>,
        pusher: Arc<dyn Push>,
        default_staff_name: impl Into<String>,
    ) -> Self {
        Self {
            registry: Registry::new(),
            timeouts,
            pusher,
            default_staff_name: default_staff_name.into(),
        }
    }

    /// The registry this engine owns. Mutation goes through engine events.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// A staff member announces itself ready to serve.
    ///
    /// Overwrites any existing record for the id, so a repeated announce
    /// resets the staff member to free.
    pub fn staff_online(&self, id: ConnId, name: Option<String>) {
        let name = name.unwrap_or_else(|| self.default_staff_name.clone());
        info!(staff = id, name = %name, "staff online");
        self.registry.insert_staff(id, StaffRecord::new(name));
    }

    /// A staff member goes away; every dependent customer is torn down.
    pub fn staff_offline(&self, id: ConnId) {
        let Some(staff) = self.registry.remove_staff(id) else {
            return;
        };
        info!(
            staff = id,
            active = ?staff.active_customer,
            queued = staff.queue.len(),
            "staff offline"
        );

        if let Some(active) = staff.active_customer {
            self.timeouts.cancel(active);
            self.registry.remove_customer(active);
            self.pusher
                .push(active, ServerFrame::chat_close(MSG_STAFF_OFFLINE_CHAT));
        }
        for waiting in staff.queue {
            self.registry.remove_customer(waiting);
            self.pusher
                .push(waiting, ServerFrame::queue_close(MSG_STAFF_OFFLINE_QUEUE));
        }
    }

    /// A customer asks to chat: match immediately, queue, or turn away.
    pub fn customer_connect(&self, id: ConnId) {
        // Identity verification would hook in here before the record is
        // created.
        self.registry.insert_customer(id, CustomerRecord::default());

        let found = matching::find_available_staff(&self.registry);
        debug!(customer = id, staff = ?found.staff, min_queue = ?found.min_queue, "match result");

        let Some(staff_id) = found.staff else {
            self.turn_away(id);
            return;
        };

        // Bind before touching the staff record; queue operations assume
        // the customer already points at its staff.
        self.registry.update_customer(id, |slot| {
            if let Some(customer) = slot.as_mut() {
                customer.assigned_staff = Some(staff_id);
            }
        });

        if found.min_queue.is_some() {
            match queue::enqueue(&self.registry, staff_id, id) {
                Some(position) => {
                    info!(customer = id, staff = staff_id, position, "customer queued");
                    self.pusher.push(id, ServerFrame::queued(MSG_QUEUED, position));
                }
                // Staff vanished between the match and the enqueue.
                None => self.turn_away(id),
            }
        } else if queue::assign_active(&self.registry, staff_id, id) {
            info!(customer = id, staff = staff_id, "chat started");
            self.timeouts.arm(id);
            self.pusher.push(id, ServerFrame::text(MSG_CONNECTED));
        } else {
            self.turn_away(id);
        }
    }

    /// A connection closed. Customers release their staff binding; staff
    /// take their whole queue down with them. Unknown ids are a no-op, so
    /// repeated disconnects are harmless.
    pub fn disconnect(&self, id: ConnId) {
        if self.registry.customer(id).is_some() {
            self.remove_customer(id);
        } else if self.registry.staff(id).is_some() {
            self.staff_offline(id);
        }
    }

    /// Idle eviction; same removal path as a customer disconnect.
    pub fn evict(&self, customer: ConnId) {
        info!(customer, "customer idle, evicting");
        self.remove_customer(customer);
    }

    /// A chat message from either side of a binding.
    pub fn inbound_message(&self, id: ConnId, text: String) {
        if let Some(customer) = self.registry.customer(id) {
            let Some(staff_id) = customer.assigned_staff else {
                return;
            };
            match self.registry.staff(staff_id) {
                Some(staff) if staff.active_customer == Some(id) => {
                    self.pusher
                        .push(staff_id, ServerFrame::forwarded(text, Party::Customer));
                    // Only the customer's own chatter keeps it alive.
                    self.timeouts.arm(id);
                }
                Some(_) => {
                    self.pusher.push(id, ServerFrame::text(MSG_STILL_QUEUED));
                }
                None => {}
            }
            return;
        }

        if let Some(staff) = self.registry.staff(id) {
            if let Some(active) = staff.active_customer {
                self.pusher
                    .push(active, ServerFrame::forwarded(text, Party::Staff));
            }
            return;
        }

        debug!(conn_id = id, "message from unrecognized sender dropped");
    }

    fn turn_away(&self, id: ConnId) {
        info!(customer = id, "no staff available");
        self.registry.remove_customer(id);
        self.pusher.push(id, ServerFrame::text(MSG_NO_STAFF));
    }

    fn remove_customer(&self, id: ConnId) {
        self.timeouts.cancel(id);
        let Some(customer) = self.registry.remove_customer(id) else {
            return;
        };
        if let Some(staff_id) = customer.assigned_staff {
            let plan = queue::release(&self.registry, staff_id, id);
            self.apply_release(staff_id, plan);
        }
    }

    fn apply_release(&self, staff_id: ConnId, plan: ReleasePlan) {
        if let Some(promoted) = plan.promoted {
            info!(customer = promoted, staff = staff_id, "queued customer promoted");
            self.pusher.push(promoted, ServerFrame::text(MSG_QUEUE_ENDED));
            // A promoted customer gets a fresh idle window.
            self.timeouts.arm(promoted);
            self.pusher.push(staff_id, ServerFrame::text(MSG_NEW_CUSTOMER));
        }
        for (customer, position) in plan.positions {
            self.pusher.push(
                customer,
                ServerFrame::queued(format!("{MSG_QUEUE_POSITION}{position}"), position),
            );
        }
    }
}
